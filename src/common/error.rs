use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::services::notification_service::MailError;
use crate::services::newsletter_service::NewsletterError;

// Nosso tipo de erro, com `thiserror` para melhor ergonomia.
#[derive(Debug, Error)]
pub enum AppError {
    // Campo obrigatório ausente ou malformado (mensagem já pronta para o cliente)
    #[error("{0}")]
    Validation(String),

    // Erros do derive `Validate`: usamos a mensagem do primeiro campo inválido
    #[error("Erro de validação")]
    ValidationError(#[from] validator::ValidationErrors),

    // Corpo que nem chega a virar payload (JSON inválido, tipo errado...)
    #[error("Invalid request body")]
    InvalidBody(#[from] JsonRejection),

    // Falha do formulário de contato depois da validação
    #[error("Failed to send message: {0}")]
    SubmissionFailed(String),

    #[error("Newsletter service configuration error")]
    NewsletterNotConfigured,

    // Os e-mails do contato falharam (o CRM já foi gravado)
    #[error("Failed to send message: {0}")]
    Mail(#[from] MailError),

    #[error("Erro no provedor de newsletter: {0}")]
    Newsletter(#[from] NewsletterError),

    // Variante para erros de banco de dados
    #[error("Erro de banco de dados: {0}")]
    DatabaseError(#[from] sqlx::Error),

    // Variante genérica para qualquer outro erro inesperado
    #[error("Erro interno do servidor: {0}")]
    InternalServerError(#[from] anyhow::Error),
}

impl AppError {
    /// Primeira mensagem de um `ValidationErrors`, em ordem alfabética de campo
    /// para a resposta ser estável.
    fn first_validation_message(errors: &validator::ValidationErrors) -> String {
        let mut fields: Vec<_> = errors.field_errors().into_iter().collect();
        fields.sort_by(|a, b| a.0.cmp(&b.0));

        fields
            .into_iter()
            .flat_map(|(_, errs)| errs.iter())
            .find_map(|e| e.message.as_ref().map(|m| m.to_string()))
            .unwrap_or_else(|| "Invalid request".to_string())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::Validation(message) => (StatusCode::BAD_REQUEST, message),
            AppError::ValidationError(ref errors) => (
                StatusCode::BAD_REQUEST,
                AppError::first_validation_message(errors),
            ),
            AppError::InvalidBody(ref rejection) => {
                tracing::warn!("⚠️ Corpo da requisição rejeitado: {}", rejection.body_text());
                (StatusCode::BAD_REQUEST, self.to_string())
            }
            AppError::SubmissionFailed(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, self.to_string())
            }
            AppError::Mail(ref e) => {
                tracing::error!("🔥 Falha no envio dos e-mails do contato: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, self.to_string())
            }
            AppError::NewsletterNotConfigured => {
                tracing::error!("🔥 Configuração do Beehiiv ausente");
                (StatusCode::INTERNAL_SERVER_ERROR, self.to_string())
            }
            // O status do provedor passa direto para o cliente
            AppError::Newsletter(NewsletterError::Upstream { status, ref body }) => {
                tracing::error!("🔥 Erro da API do Beehiiv ({}): {}", status, body);
                let status =
                    StatusCode::from_u16(status).unwrap_or(StatusCode::BAD_GATEWAY);
                (status, "Failed to subscribe to newsletter".to_string())
            }

            // Todos os outros erros viram 500 genérico; o detalhe fica no log.
            ref e => {
                tracing::error!("🔥 Erro Interno do Servidor: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };

        let body = Json(json!({ "error": error_message }));
        (status, body).into_response()
    }
}
