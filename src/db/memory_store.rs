// src/db/memory_store.rs

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::CrmStore,
    models::crm::{
        Activity, Company, Contact, ContactCompany, ContactEmail, ContactUpsert, Lead, NewActivity,
        NewContact, NewLead, COMPANY_TYPE_BRAND,
    },
};

#[derive(Default)]
struct Tables {
    contacts: Vec<Contact>,
    contact_emails: Vec<ContactEmail>,
    companies: Vec<Company>,
    contact_companies: Vec<ContactCompany>,
    activities: Vec<Activity>,
    leads: Vec<Lead>,
}

/// Store em memória com a mesma semântica do Postgres (upserts incluídos).
/// Usado nos testes e em execuções locais sem banco.
#[derive(Default)]
pub struct MemoryCrmStore {
    tables: RwLock<Tables>,
}

impl MemoryCrmStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn contacts(&self) -> Vec<Contact> {
        self.tables.read().await.contacts.clone()
    }

    pub async fn contact_emails(&self) -> Vec<ContactEmail> {
        self.tables.read().await.contact_emails.clone()
    }

    pub async fn companies(&self) -> Vec<Company> {
        self.tables.read().await.companies.clone()
    }

    pub async fn contact_companies(&self) -> Vec<ContactCompany> {
        self.tables.read().await.contact_companies.clone()
    }

    pub async fn activities(&self) -> Vec<Activity> {
        self.tables.read().await.activities.clone()
    }

    pub async fn leads(&self) -> Vec<Lead> {
        self.tables.read().await.leads.clone()
    }

    /// Total de linhas em todas as tabelas.
    pub async fn total_rows(&self) -> usize {
        let t = self.tables.read().await;
        t.contacts.len()
            + t.contact_emails.len()
            + t.companies.len()
            + t.contact_companies.len()
            + t.activities.len()
            + t.leads.len()
    }
}

#[async_trait]
impl CrmStore for MemoryCrmStore {
    async fn upsert_contact(&self, new_contact: &NewContact) -> Result<ContactUpsert, AppError> {
        let mut t = self.tables.write().await;
        let now = Utc::now();

        if let Some(existing) = t
            .contacts
            .iter_mut()
            .find(|c| c.email.eq_ignore_ascii_case(&new_contact.email))
        {
            existing.follow_up = true;
            existing.updated_at = now;
            return Ok(ContactUpsert {
                contact: existing.clone(),
                created: false,
            });
        }

        let contact = Contact {
            id: Uuid::new_v4(),
            first_name: new_contact.first_name.clone(),
            last_name: new_contact.last_name.clone(),
            email: new_contact.email.clone(),
            phone: new_contact.phone.clone(),
            contact_type: new_contact.contact_type.clone(),
            lead_source: new_contact.lead_source.clone(),
            follow_up: true,
            archived: false,
            created_at: now,
            updated_at: now,
        };
        t.contacts.push(contact.clone());

        Ok(ContactUpsert {
            contact,
            created: true,
        })
    }

    async fn insert_contact_email(
        &self,
        contact_id: Uuid,
        email: &str,
    ) -> Result<ContactEmail, AppError> {
        let record = ContactEmail {
            id: Uuid::new_v4(),
            contact_id,
            email: email.to_string(),
            is_primary: true,
            created_at: Utc::now(),
        };
        self.tables.write().await.contact_emails.push(record.clone());
        Ok(record)
    }

    async fn resolve_company(&self, name: &str) -> Result<Company, AppError> {
        let mut t = self.tables.write().await;
        let wanted = name.to_lowercase();

        if let Some(company) = t.companies.iter().find(|c| c.name.to_lowercase() == wanted) {
            return Ok(company.clone());
        }

        let company = Company {
            id: Uuid::new_v4(),
            name: name.to_string(),
            company_type: COMPANY_TYPE_BRAND.to_string(),
            created_at: Utc::now(),
        };
        t.companies.push(company.clone());
        Ok(company)
    }

    async fn has_company_link(&self, contact_id: Uuid) -> Result<bool, AppError> {
        let t = self.tables.read().await;
        Ok(t.contact_companies.iter().any(|l| l.contact_id == contact_id))
    }

    async fn link_company(
        &self,
        contact_id: Uuid,
        company_id: Uuid,
        relationship_type: &str,
    ) -> Result<bool, AppError> {
        let mut t = self.tables.write().await;

        if t
            .contact_companies
            .iter()
            .any(|l| l.contact_id == contact_id && l.is_primary)
        {
            return Ok(false);
        }

        t.contact_companies.push(ContactCompany {
            id: Uuid::new_v4(),
            contact_id,
            company_id,
            relationship_type: relationship_type.to_string(),
            is_primary: true,
        });
        Ok(true)
    }

    async fn append_activity(&self, activity: &NewActivity) -> Result<Activity, AppError> {
        let row = Activity {
            id: Uuid::new_v4(),
            contact_id: activity.contact_id,
            activity_type: activity.activity_type.clone(),
            content: activity.content.clone(),
            source: activity.source.clone(),
            metadata: activity.metadata.clone(),
            created_at: Utc::now(),
        };
        self.tables.write().await.activities.push(row.clone());
        Ok(row)
    }

    async fn append_lead(&self, lead: &NewLead) -> Result<Lead, AppError> {
        let row = Lead {
            id: Uuid::new_v4(),
            email: lead.email.clone(),
            source: lead.source.clone(),
            signup_page: lead.signup_page.clone(),
            created_at: Utc::now(),
        };
        self.tables.write().await.leads.push(row.clone());
        Ok(row)
    }
}
