// src/handlers/contact.rs

use axum::{extract::State, Json};
use axum_extra::extract::WithRejection;

use crate::{
    common::error::AppError,
    config::AppState,
    models::forms::{ContactFormPayload, SuccessResponse},
};

// POST /api/contact
#[utoipa::path(
    post,
    path = "/api/contact",
    tag = "Forms",
    request_body = ContactFormPayload,
    responses(
        (status = 200, description = "Mensagem recebida", body = SuccessResponse),
        (status = 400, description = "Campo obrigatório ausente ou e-mail inválido"),
        (status = 500, description = "Falha ao gravar o contato ou enviar os e-mails")
    )
)]
pub async fn submit_contact(
    State(app_state): State<AppState>,
    WithRejection(Json(payload), _): WithRejection<Json<ContactFormPayload>, AppError>,
) -> Result<Json<SuccessResponse>, AppError> {
    // 1. Anti-spam: bot recebe sucesso falso e nada é gravado
    let verdict = app_state
        .contact_spam
        .check_now(payload.honeypot.as_deref(), payload.form_load_time);
    if verdict.is_spam() {
        tracing::info!("🤖 Envio do formulário de contato descartado: {:?}", verdict);
        return Ok(Json(SuccessResponse { success: true }));
    }

    // 2. Validação (400 com a mensagem do primeiro campo inválido)
    let submission = payload.into_submission()?;

    // 3. CRM. Só a gravação do contato derruba a requisição.
    app_state
        .intake_service
        .reconcile(&submission)
        .await
        .map_err(|e| {
            tracing::error!("🔥 Falha ao gravar o contato {}: {}", submission.email, e);
            AppError::SubmissionFailed(e.to_string())
        })?;

    // 4. E-mails. O CRM já está gravado mesmo se o envio falhar.
    app_state.notification_service.dispatch(&submission).await?;

    Ok(Json(SuccessResponse { success: true }))
}
