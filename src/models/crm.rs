// src/models/crm.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value; // <--- metadata JSONB das atividades
use sqlx::FromRow;
use uuid::Uuid;

// --- CONSTANTES DO FLUXO DE ENTRADA ---

pub const LEAD_SOURCE_CONTACT_FORM: &str = "contact_form";
pub const CONTACT_TYPE_LEAD: &str = "lead";
pub const COMPANY_TYPE_BRAND: &str = "brand";
pub const RELATIONSHIP_EMPLOYEE: &str = "employee";
pub const ACTIVITY_FORM_SUBMISSION: &str = "form_submission";

// --- CONTATO ---

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Contact {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,

    // Sempre normalizado (trim + minúsculas). É a chave de deduplicação.
    pub email: String,
    pub phone: Option<String>,

    pub contact_type: String,
    pub lead_source: String,

    // Alguém precisa agir sobre esse contato
    pub follow_up: bool,
    pub archived: bool,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Dados para inserir (ou tocar) um contato.
#[derive(Debug, Clone)]
pub struct NewContact {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub contact_type: String,
    pub lead_source: String,
}

/// Resultado do upsert: o contato e se ele acabou de ser criado.
#[derive(Debug, Clone, FromRow)]
pub struct ContactUpsert {
    #[sqlx(flatten)]
    pub contact: Contact,
    pub created: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ContactEmail {
    pub id: Uuid,
    pub contact_id: Uuid,
    pub email: String,
    pub is_primary: bool,
    pub created_at: DateTime<Utc>,
}

// --- EMPRESA ---

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Company {
    pub id: Uuid,
    pub name: String,
    pub company_type: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ContactCompany {
    pub id: Uuid,
    pub contact_id: Uuid,
    pub company_id: Uuid,
    pub relationship_type: String,
    pub is_primary: bool,
}

// --- ATIVIDADES (append-only) ---

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Activity {
    pub id: Uuid,
    pub contact_id: Uuid,
    pub activity_type: String,
    pub content: String,
    pub source: String,

    // { "company": ..., "has_phone": ..., "site": ..., "is_repeat": true? }
    pub metadata: Value,

    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewActivity {
    pub contact_id: Uuid,
    pub activity_type: String,
    pub content: String,
    pub source: String,
    pub metadata: Value,
}

// --- LEADS DE CAMPANHA (newsletter) ---

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Lead {
    pub id: Uuid,
    pub email: String,
    pub source: String,
    pub signup_page: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewLead {
    pub email: String,
    pub source: String,
    pub signup_page: Option<String>,
}
