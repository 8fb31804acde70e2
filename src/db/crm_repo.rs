// src/db/crm_repo.rs

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::CrmStore,
    models::crm::{
        Activity, Company, ContactEmail, ContactUpsert, Lead, NewActivity, NewContact, NewLead,
        COMPANY_TYPE_BRAND,
    },
};

const CONTACT_COLUMNS: &str = "id, first_name, last_name, email, phone, contact_type, \
     lead_source, follow_up, archived, created_at, updated_at";

// Repositório Postgres do CRM
#[derive(Clone)]
pub struct CrmRepository {
    pool: PgPool,
}

impl CrmRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CrmStore for CrmRepository {
    // =========================================================================
    //  CONTATOS
    // =========================================================================

    async fn upsert_contact(&self, new_contact: &NewContact) -> Result<ContactUpsert, AppError> {
        // `xmax = 0` só é verdade para a linha recém-inserida; no conflito o
        // UPDATE preenche o xmax.
        let sql = format!(
            r#"
            INSERT INTO contacts (
                first_name, last_name, email, phone,
                contact_type, lead_source, follow_up, archived
            )
            VALUES ($1, $2, $3, $4, $5, $6, TRUE, FALSE)
            ON CONFLICT ((lower(email))) DO UPDATE
                SET follow_up = TRUE, updated_at = NOW()
            RETURNING {CONTACT_COLUMNS}, (xmax = 0) AS created
            "#
        );

        let upsert = sqlx::query_as::<_, ContactUpsert>(&sql)
            .bind(&new_contact.first_name)
            .bind(&new_contact.last_name)
            .bind(&new_contact.email)
            .bind(new_contact.phone.as_deref())
            .bind(&new_contact.contact_type)
            .bind(&new_contact.lead_source)
            .fetch_one(&self.pool)
            .await?;

        Ok(upsert)
    }

    async fn insert_contact_email(
        &self,
        contact_id: Uuid,
        email: &str,
    ) -> Result<ContactEmail, AppError> {
        let record = sqlx::query_as::<_, ContactEmail>(
            r#"
            INSERT INTO contact_emails (contact_id, email, is_primary)
            VALUES ($1, $2, TRUE)
            RETURNING id, contact_id, email, is_primary, created_at
            "#,
        )
        .bind(contact_id)
        .bind(email)
        .fetch_one(&self.pool)
        .await?;

        Ok(record)
    }

    // =========================================================================
    //  EMPRESAS E VÍNCULOS
    // =========================================================================

    async fn resolve_company(&self, name: &str) -> Result<Company, AppError> {
        // O DO UPDATE "vazio" existe só para o RETURNING devolver a linha já existente
        let company = sqlx::query_as::<_, Company>(
            r#"
            INSERT INTO companies (name, company_type)
            VALUES ($1, $2)
            ON CONFLICT ((lower(name))) DO UPDATE
                SET name = companies.name
            RETURNING id, name, company_type, created_at
            "#,
        )
        .bind(name)
        .bind(COMPANY_TYPE_BRAND)
        .fetch_one(&self.pool)
        .await?;

        Ok(company)
    }

    async fn has_company_link(&self, contact_id: Uuid) -> Result<bool, AppError> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS (SELECT 1 FROM contact_companies WHERE contact_id = $1)",
        )
        .bind(contact_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }

    async fn link_company(
        &self,
        contact_id: Uuid,
        company_id: Uuid,
        relationship_type: &str,
    ) -> Result<bool, AppError> {
        let result = sqlx::query(
            r#"
            INSERT INTO contact_companies (contact_id, company_id, relationship_type, is_primary)
            VALUES ($1, $2, $3, TRUE)
            ON CONFLICT (contact_id) WHERE is_primary DO NOTHING
            "#,
        )
        .bind(contact_id)
        .bind(company_id)
        .bind(relationship_type)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    // =========================================================================
    //  LOGS (append-only)
    // =========================================================================

    async fn append_activity(&self, activity: &NewActivity) -> Result<Activity, AppError> {
        let row = sqlx::query_as::<_, Activity>(
            r#"
            INSERT INTO activities (contact_id, activity_type, content, source, metadata)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, contact_id, activity_type, content, source, metadata, created_at
            "#,
        )
        .bind(activity.contact_id)
        .bind(&activity.activity_type)
        .bind(&activity.content)
        .bind(&activity.source)
        .bind(&activity.metadata)
        .fetch_one(&self.pool)
        .await?;

        Ok(row)
    }

    async fn append_lead(&self, lead: &NewLead) -> Result<Lead, AppError> {
        let row = sqlx::query_as::<_, Lead>(
            r#"
            INSERT INTO leads (email, source, signup_page)
            VALUES ($1, $2, $3)
            RETURNING id, email, source, signup_page, created_at
            "#,
        )
        .bind(&lead.email)
        .bind(&lead.source)
        .bind(lead.signup_page.as_deref())
        .fetch_one(&self.pool)
        .await?;

        Ok(row)
    }
}
