// src/db/crm_store.rs

use async_trait::async_trait;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::crm::{
        Activity, Company, ContactEmail, ContactUpsert, Lead, NewActivity, NewContact, NewLead,
    },
};

/// As tabelas do CRM que o fluxo de entrada toca.
///
/// As operações de criação são upserts atômicos no próprio store, então dois
/// envios simultâneos com o mesmo e-mail (ou a mesma empresa) convergem para
/// uma única linha sem check-then-insert na aplicação.
#[async_trait]
pub trait CrmStore: Send + Sync {
    /// Insere o contato ou, se o e-mail normalizado já existir, apenas marca
    /// `follow_up = true` e atualiza `updated_at`.
    async fn upsert_contact(&self, new_contact: &NewContact) -> Result<ContactUpsert, AppError>;

    async fn insert_contact_email(
        &self,
        contact_id: Uuid,
        email: &str,
    ) -> Result<ContactEmail, AppError>;

    /// Busca a empresa pelo nome (case-insensitive) ou cria uma nova do tipo `brand`.
    async fn resolve_company(&self, name: &str) -> Result<Company, AppError>;

    async fn has_company_link(&self, contact_id: Uuid) -> Result<bool, AppError>;

    /// Cria o vínculo primário. Retorna `false` se o contato já tinha um.
    async fn link_company(
        &self,
        contact_id: Uuid,
        company_id: Uuid,
        relationship_type: &str,
    ) -> Result<bool, AppError>;

    async fn append_activity(&self, activity: &NewActivity) -> Result<Activity, AppError>;

    async fn append_lead(&self, lead: &NewLead) -> Result<Lead, AppError>;
}
