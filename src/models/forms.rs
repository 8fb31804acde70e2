// src/models/forms.rs

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use utoipa::ToSchema;
use validator::{Validate, ValidateEmail, ValidationError};

use crate::common::error::AppError;

// Usado pelo `#[validate(custom(...))]`: string vazia ou só espaços é "ausente".
pub fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("required"));
    }
    Ok(())
}

// `null` vale o mesmo que campo ausente
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

// Aceita qualquer número JSON (o navegador pode mandar fração). Outro tipo
// conta como ausente e só desliga o teste de tempo.
fn lenient_millis<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let millis = match Option::<Value>::deserialize(deserializer)? {
        Some(Value::Number(n)) => n.as_i64().or_else(|| n.as_f64().map(|f| f.trunc() as i64)),
        _ => None,
    };
    Ok(millis)
}

/// Normaliza o e-mail para a chave de deduplicação.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// `local@domain.tld`: o validador do crate aceita `a@localhost`, então
/// exigimos também um ponto no domínio com rótulos não vazios.
pub fn is_valid_email(email: &str) -> bool {
    if !email.to_string().validate_email() {
        return false;
    }
    let Some((_, domain)) = email.rsplit_once('@') else {
        return false;
    };
    domain.contains('.') && domain.split('.').all(|label| !label.is_empty())
}

// =============================================================================
//  CONTATO
// =============================================================================

#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ContactFormPayload {
    #[serde(default, deserialize_with = "null_as_default")]
    #[schema(example = "Jane")]
    pub first_name: String,

    #[serde(default, deserialize_with = "null_as_default")]
    #[schema(example = "Doe")]
    pub last_name: String,

    #[serde(default, deserialize_with = "null_as_default")]
    #[schema(example = "jane@example.com")]
    pub email: String,

    #[serde(default, deserialize_with = "null_as_default")]
    #[schema(example = "Acme")]
    pub company: String,

    pub phone: Option<String>,

    #[serde(default, deserialize_with = "null_as_default")]
    #[schema(example = "Hi! I'd love to chat.")]
    pub message: String,

    #[serde(default, deserialize_with = "null_as_default")]
    pub subscribed_to_newsletter: bool,

    // Campos anti-spam
    #[serde(rename = "_honeypot")]
    pub honeypot: Option<String>,

    #[serde(rename = "_formLoadTime", default, deserialize_with = "lenient_millis")]
    pub form_load_time: Option<i64>,
}

/// Envio do formulário já validado e normalizado.
#[derive(Debug, Clone, PartialEq)]
pub struct ContactSubmission {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub company: String,
    pub phone: Option<String>,
    pub message: String,
    pub subscribed_to_newsletter: bool,
}

impl ContactSubmission {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

impl ContactFormPayload {
    /// Valida na ordem nome → sobrenome → e-mail → empresa → mensagem e
    /// devolve o primeiro erro encontrado.
    pub fn into_submission(self) -> Result<ContactSubmission, AppError> {
        let required = [
            (&self.first_name, "First name is required"),
            (&self.last_name, "Last name is required"),
            (&self.email, "Email address is required"),
            (&self.company, "Company is required"),
            (&self.message, "Message is required"),
        ];

        for (value, message) in required {
            if not_blank(value).is_err() {
                return Err(AppError::Validation(message.to_string()));
            }
        }

        let email = normalize_email(&self.email);
        if !is_valid_email(&email) {
            return Err(AppError::Validation(
                "Please enter a valid email address".to_string(),
            ));
        }

        let phone = self
            .phone
            .map(|p| p.trim().to_string())
            .filter(|p| !p.is_empty());

        Ok(ContactSubmission {
            first_name: self.first_name.trim().to_string(),
            last_name: self.last_name.trim().to_string(),
            email,
            company: self.company.trim().to_string(),
            phone,
            message: self.message.trim().to_string(),
            subscribed_to_newsletter: self.subscribed_to_newsletter,
        })
    }
}

// =============================================================================
//  NEWSLETTER
// =============================================================================

#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SubscribePayload {
    #[serde(default, deserialize_with = "null_as_default")]
    #[validate(custom(function = "not_blank", message = "Email address is required"))]
    #[schema(example = "jane@example.com")]
    pub email: String,

    // Vira o utm_source; "website" quando ausente
    #[schema(example = "newsletter_form")]
    pub source: Option<String>,

    #[schema(example = "/contact")]
    pub signup_page: Option<String>,

    #[serde(rename = "_honeypot")]
    pub honeypot: Option<String>,

    #[serde(rename = "_formLoadTime", default, deserialize_with = "lenient_millis")]
    pub form_load_time: Option<i64>,
}

#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
pub struct NewsletterCheckPayload {
    #[serde(default, deserialize_with = "null_as_default")]
    #[validate(custom(function = "not_blank", message = "Email address is required"))]
    #[schema(example = "jane@example.com")]
    pub email: String,
}

// =============================================================================
//  RESPOSTAS
// =============================================================================

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SuccessResponse {
    pub success: bool,
}

#[derive(Debug, Default, Serialize, Deserialize, ToSchema)]
pub struct SubscriptionData {
    pub id: Option<String>,
    pub status: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SubscribeResponse {
    pub success: bool,
    pub message: String,
    pub data: SubscriptionData,
}

impl SubscribeResponse {
    pub fn subscribed(data: SubscriptionData) -> Self {
        Self {
            success: true,
            message: "Successfully subscribed to newsletter!".to_string(),
            data,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct NewsletterCheckResponse {
    pub subscribed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}
