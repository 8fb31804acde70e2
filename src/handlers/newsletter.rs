// src/handlers/newsletter.rs

use axum::{
    extract::State,
    http::{header, HeaderMap},
    Json,
};
use axum_extra::extract::WithRejection;
use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    models::forms::{
        NewsletterCheckPayload, NewsletterCheckResponse, SubscribePayload, SubscribeResponse,
        SubscriptionData,
    },
};

// POST /api/subscribe
#[utoipa::path(
    post,
    path = "/api/subscribe",
    tag = "Newsletter",
    request_body = SubscribePayload,
    responses(
        (status = 200, description = "Inscrição criada", body = SubscribeResponse),
        (status = 400, description = "E-mail ausente"),
        (status = 500, description = "Newsletter não configurada"),
    )
)]
pub async fn subscribe(
    State(app_state): State<AppState>,
    headers: HeaderMap,
    WithRejection(Json(payload), _): WithRejection<Json<SubscribePayload>, AppError>,
) -> Result<Json<SubscribeResponse>, AppError> {
    let verdict = app_state
        .newsletter_spam
        .check_now(payload.honeypot.as_deref(), payload.form_load_time);
    if verdict.is_spam() {
        tracing::info!("🤖 Inscrição na newsletter descartada: {:?}", verdict);
        return Ok(Json(SubscribeResponse::subscribed(SubscriptionData::default())));
    }

    payload.validate()?;

    let referer = headers
        .get(header::REFERER)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string);

    let data = app_state
        .newsletter_service
        .subscribe(&payload, referer)
        .await?;

    Ok(Json(SubscribeResponse::subscribed(data)))
}

// POST /api/newsletter/check
#[utoipa::path(
    post,
    path = "/api/newsletter/check",
    tag = "Newsletter",
    request_body = NewsletterCheckPayload,
    responses(
        (status = 200, description = "Status da inscrição", body = NewsletterCheckResponse),
        (status = 400, description = "E-mail ausente"),
    )
)]
pub async fn check_subscription(
    State(app_state): State<AppState>,
    WithRejection(Json(payload), _): WithRejection<Json<NewsletterCheckPayload>, AppError>,
) -> Result<Json<NewsletterCheckResponse>, AppError> {
    payload.validate()?;

    // Nunca falha alto: qualquer erro vira `subscribed: false`
    let response = match app_state.newsletter_service.is_subscribed(&payload.email).await {
        Ok(subscribed) => NewsletterCheckResponse {
            subscribed,
            error: None,
        },
        Err(e) => {
            tracing::error!("🔥 Erro ao checar inscrição na newsletter: {}", e);
            NewsletterCheckResponse {
                subscribed: false,
                error: Some("Could not verify subscription status".to_string()),
            }
        }
    };

    Ok(Json(response))
}
