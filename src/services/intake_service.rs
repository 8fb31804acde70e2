// src/services/intake_service.rs

use std::sync::Arc;

use serde_json::{json, Value};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::CrmStore,
    models::{
        crm::{
            Company, NewActivity, NewContact, ACTIVITY_FORM_SUBMISSION, CONTACT_TYPE_LEAD,
            LEAD_SOURCE_CONTACT_FORM, RELATIONSHIP_EMPLOYEE,
        },
        forms::ContactSubmission,
    },
};

/// O que a reconciliação fez. Não volta para quem enviou o formulário.
#[derive(Debug, Clone, PartialEq)]
pub struct IntakeOutcome {
    pub contact_id: Uuid,
    pub is_repeat: bool,
    pub company_id: Option<Uuid>,
    pub activity_id: Option<Uuid>,
}

#[derive(Clone)]
pub struct IntakeService {
    store: Arc<dyn CrmStore>,
    site_id: String,
}

impl IntakeService {
    pub fn new(store: Arc<dyn CrmStore>, site_id: impl Into<String>) -> Self {
        Self {
            store,
            site_id: site_id.into(),
        }
    }

    /// Converge contato, empresa, vínculo e atividade para o envio recebido.
    ///
    /// Só a gravação do contato é fatal. Empresa, vínculo, e-mail primário e
    /// atividade falham "macio": ficam no log e o fluxo continua.
    pub async fn reconcile(&self, submission: &ContactSubmission) -> Result<IntakeOutcome, AppError> {
        // 1. Contato (upsert atômico pela chave do e-mail normalizado)
        let upsert = self
            .store
            .upsert_contact(&NewContact {
                first_name: submission.first_name.clone(),
                last_name: submission.last_name.clone(),
                email: submission.email.clone(),
                phone: submission.phone.clone(),
                contact_type: CONTACT_TYPE_LEAD.to_string(),
                lead_source: LEAD_SOURCE_CONTACT_FORM.to_string(),
            })
            .await?;

        let contact = upsert.contact;
        let is_repeat = !upsert.created;

        if is_repeat {
            tracing::info!("🔁 Contato existente {} enviou nova mensagem", contact.id);

            // 2a. Contato repetido: atividade primeiro, vínculo só se ainda não houver.
            // `follow_up` e `updated_at` já foram atualizados pelo upsert.
            let activity_id = self.record_activity(contact.id, submission, true).await;

            let company_id = match self.store.has_company_link(contact.id).await {
                Ok(false) => self.link_company(contact.id, &submission.company).await,
                Ok(true) => None,
                Err(e) => {
                    tracing::warn!("⚠️ Falha ao checar vínculo do contato {}: {}", contact.id, e);
                    None
                }
            };

            return Ok(IntakeOutcome {
                contact_id: contact.id,
                is_repeat,
                company_id,
                activity_id,
            });
        }

        tracing::info!("🆕 Novo contato {} criado pelo formulário", contact.id);

        // 2b. Contato novo: empresa + vínculo, e-mail primário, atividade
        let company_id = self.link_company(contact.id, &submission.company).await;

        if let Err(e) = self.store.insert_contact_email(contact.id, &contact.email).await {
            tracing::warn!("⚠️ Falha ao gravar e-mail primário do contato {}: {}", contact.id, e);
        }

        let activity_id = self.record_activity(contact.id, submission, false).await;

        Ok(IntakeOutcome {
            contact_id: contact.id,
            is_repeat,
            company_id,
            activity_id,
        })
    }

    /// Busca-ou-cria a empresa e vincula. Falhas só vão para o log.
    async fn link_company(&self, contact_id: Uuid, company_name: &str) -> Option<Uuid> {
        let company: Company = match self.store.resolve_company(company_name).await {
            Ok(company) => company,
            Err(e) => {
                tracing::error!("🔥 Falha ao resolver a empresa '{}': {}", company_name, e);
                return None;
            }
        };

        match self
            .store
            .link_company(contact_id, company.id, RELATIONSHIP_EMPLOYEE)
            .await
        {
            Ok(true) => {
                tracing::info!("🔗 Contato {} vinculado à empresa {}", contact_id, company.name);
            }
            Ok(false) => {
                tracing::info!("🔗 Contato {} já possuía vínculo primário", contact_id);
            }
            Err(e) => {
                tracing::error!("🔥 Falha ao vincular contato {} à empresa: {}", contact_id, e);
            }
        }

        Some(company.id)
    }

    async fn record_activity(
        &self,
        contact_id: Uuid,
        submission: &ContactSubmission,
        is_repeat: bool,
    ) -> Option<Uuid> {
        let activity = NewActivity {
            contact_id,
            activity_type: ACTIVITY_FORM_SUBMISSION.to_string(),
            content: submission.message.clone(),
            source: LEAD_SOURCE_CONTACT_FORM.to_string(),
            metadata: self.activity_metadata(submission, is_repeat),
        };

        match self.store.append_activity(&activity).await {
            Ok(row) => Some(row.id),
            Err(e) => {
                tracing::error!("🔥 Falha ao registrar atividade do contato {}: {}", contact_id, e);
                None
            }
        }
    }

    fn activity_metadata(&self, submission: &ContactSubmission, is_repeat: bool) -> Value {
        let mut metadata = json!({
            "company": submission.company,
            "has_phone": submission.phone.is_some(),
            "site": self.site_id,
        });
        // `is_repeat` só aparece nas repetições
        if is_repeat {
            metadata["is_repeat"] = Value::Bool(true);
        }
        metadata
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MemoryCrmStore;
    use crate::models::crm::{
        Activity, ContactEmail, ContactUpsert, Lead, NewLead,
    };
    use async_trait::async_trait;

    fn submission(email: &str, company: &str) -> ContactSubmission {
        ContactSubmission {
            first_name: "Jane".into(),
            last_name: "Doe".into(),
            email: email.into(),
            company: company.into(),
            phone: Some("+44 7000".into()),
            message: "Hi".into(),
            subscribed_to_newsletter: false,
        }
    }

    #[tokio::test]
    async fn new_contact_creates_every_record() {
        let store = Arc::new(MemoryCrmStore::new());
        let service = IntakeService::new(store.clone(), "aurion");

        let outcome = service.reconcile(&submission("jane@x.com", "Acme")).await.unwrap();
        assert!(!outcome.is_repeat);
        assert!(outcome.company_id.is_some());
        assert!(outcome.activity_id.is_some());

        let contacts = store.contacts().await;
        assert_eq!(contacts.len(), 1);
        assert!(contacts[0].follow_up);
        assert!(!contacts[0].archived);
        assert_eq!(contacts[0].lead_source, "contact_form");

        assert_eq!(store.companies().await.len(), 1);
        assert_eq!(store.contact_emails().await.len(), 1);

        let links = store.contact_companies().await;
        assert_eq!(links.len(), 1);
        assert_eq!(links[0].relationship_type, "employee");
        assert!(links[0].is_primary);

        let activities = store.activities().await;
        assert_eq!(activities.len(), 1);
        assert_eq!(activities[0].activity_type, "form_submission");
        assert_eq!(activities[0].source, "contact_form");
        assert_eq!(activities[0].metadata["company"], "Acme");
        assert_eq!(activities[0].metadata["has_phone"], true);
        assert_eq!(activities[0].metadata["site"], "aurion");
        assert!(activities[0].metadata.get("is_repeat").is_none());
    }

    #[tokio::test]
    async fn repeat_submission_appends_tagged_activity() {
        let store = Arc::new(MemoryCrmStore::new());
        let service = IntakeService::new(store.clone(), "aurion");

        let first = service.reconcile(&submission("jane@x.com", "Acme")).await.unwrap();
        let second = service.reconcile(&submission("jane@x.com", "ACME")).await.unwrap();

        assert!(second.is_repeat);
        assert_eq!(first.contact_id, second.contact_id);
        // vínculo já existia: não resolve empresa de novo
        assert_eq!(second.company_id, None);

        assert_eq!(store.contacts().await.len(), 1);
        assert_eq!(store.companies().await.len(), 1);
        assert_eq!(store.contact_companies().await.len(), 1);
        assert_eq!(store.contact_emails().await.len(), 1);

        let activities = store.activities().await;
        assert_eq!(activities.len(), 2);
        assert_eq!(activities[1].metadata["is_repeat"], true);
    }

    #[tokio::test]
    async fn repeat_contact_without_link_gets_linked() {
        let store = Arc::new(MemoryCrmStore::new());
        let service = IntakeService::new(store.clone(), "aurion");

        // Contato que já existe no CRM mas nunca foi vinculado a uma empresa
        let seeded = store
            .upsert_contact(&NewContact {
                first_name: "Jane".into(),
                last_name: "Doe".into(),
                email: "jane@x.com".into(),
                phone: None,
                contact_type: CONTACT_TYPE_LEAD.into(),
                lead_source: "import".into(),
            })
            .await
            .unwrap();
        assert!(seeded.created);

        let outcome = service.reconcile(&submission("jane@x.com", "Acme")).await.unwrap();
        assert!(outcome.is_repeat);
        assert_eq!(outcome.contact_id, seeded.contact.id);

        let companies = store.companies().await;
        assert_eq!(companies.len(), 1);
        assert_eq!(outcome.company_id, Some(companies[0].id));

        let links = store.contact_companies().await;
        assert_eq!(links.len(), 1);
        assert_eq!(links[0].contact_id, seeded.contact.id);
        assert_eq!(links[0].company_id, companies[0].id);
        assert_eq!(links[0].relationship_type, RELATIONSHIP_EMPLOYEE);
        assert!(links[0].is_primary);

        let activities = store.activities().await;
        assert_eq!(activities.len(), 1);
        assert_eq!(activities[0].metadata["is_repeat"], true);
        // repetição não grava outro e-mail primário
        assert!(store.contact_emails().await.is_empty());
    }

    // Store que falha nas operações "macias" (empresa/atividade/e-mail)
    struct FlakyStore {
        inner: MemoryCrmStore,
        fail_contact: bool,
    }

    fn boom() -> AppError {
        AppError::InternalServerError(anyhow::anyhow!("store offline"))
    }

    #[async_trait]
    impl CrmStore for FlakyStore {
        async fn upsert_contact(&self, c: &NewContact) -> Result<ContactUpsert, AppError> {
            if self.fail_contact {
                return Err(boom());
            }
            self.inner.upsert_contact(c).await
        }
        async fn insert_contact_email(&self, _: Uuid, _: &str) -> Result<ContactEmail, AppError> {
            Err(boom())
        }
        async fn resolve_company(&self, _: &str) -> Result<Company, AppError> {
            Err(boom())
        }
        async fn has_company_link(&self, _: Uuid) -> Result<bool, AppError> {
            Err(boom())
        }
        async fn link_company(&self, _: Uuid, _: Uuid, _: &str) -> Result<bool, AppError> {
            Err(boom())
        }
        async fn append_activity(&self, _: &NewActivity) -> Result<Activity, AppError> {
            Err(boom())
        }
        async fn append_lead(&self, _: &NewLead) -> Result<Lead, AppError> {
            Err(boom())
        }
    }

    #[tokio::test]
    async fn secondary_failures_are_not_fatal() {
        let store = Arc::new(FlakyStore {
            inner: MemoryCrmStore::new(),
            fail_contact: false,
        });
        let service = IntakeService::new(store.clone(), "aurion");

        let outcome = service.reconcile(&submission("jane@x.com", "Acme")).await.unwrap();
        assert_eq!(outcome.company_id, None);
        assert_eq!(outcome.activity_id, None);
        assert_eq!(store.inner.contacts().await.len(), 1);

        let repeat = service.reconcile(&submission("jane@x.com", "Acme")).await.unwrap();
        assert!(repeat.is_repeat);
    }

    #[tokio::test]
    async fn contact_failure_aborts() {
        let store = Arc::new(FlakyStore {
            inner: MemoryCrmStore::new(),
            fail_contact: true,
        });
        let service = IntakeService::new(store, "aurion");

        assert!(service.reconcile(&submission("jane@x.com", "Acme")).await.is_err());
    }
}
