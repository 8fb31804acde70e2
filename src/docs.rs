// src/docs.rs

use utoipa::OpenApi;
use crate::handlers;
use crate::models;
use crate::services;

#[derive(OpenApi)]
#[openapi(
    paths(
        // --- Formulários ---
        handlers::contact::submit_contact,

        // --- Newsletter ---
        handlers::newsletter::subscribe,
        handlers::newsletter::check_subscription,

        // --- Podcast ---
        handlers::podcast::latest_episode,
    ),
    components(
        schemas(
            // --- Payloads ---
            models::forms::ContactFormPayload,
            models::forms::SubscribePayload,
            models::forms::NewsletterCheckPayload,

            // --- Respostas ---
            models::forms::SuccessResponse,
            models::forms::SubscribeResponse,
            models::forms::SubscriptionData,
            models::forms::NewsletterCheckResponse,
            services::podcast_service::LatestEpisode,
        )
    ),
    tags(
        (name = "Forms", description = "Formulário de contato do site"),
        (name = "Newsletter", description = "Inscrição e status na newsletter"),
        (name = "Podcast", description = "Último episódio publicado")
    )
)]
pub struct ApiDoc;
