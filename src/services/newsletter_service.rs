// src/services/newsletter_service.rs

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    common::error::AppError,
    config::BeehiivConfig,
    db::CrmStore,
    models::{
        crm::NewLead,
        forms::{SubscribePayload, SubscriptionData},
    },
};

// Origens de campanha que também viram linha na tabela de leads
pub const LEAD_SOURCES: [&str; 2] = ["recipe_book_launch", "ig_signuppage"];

pub const DEFAULT_SOURCE: &str = "website";

#[derive(Debug, Error)]
pub enum NewsletterError {
    #[error("falha de transporte: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("provedor respondeu {status}")]
    Upstream { status: u16, body: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct SubscriptionRequest {
    pub email: String,
    pub source: String,
    pub referring_site: Option<String>,
}

/// Plataforma de newsletter.
#[async_trait]
pub trait NewsletterClient: Send + Sync {
    async fn subscribe(&self, request: &SubscriptionRequest) -> Result<SubscriptionData, NewsletterError>;

    async fn is_subscribed(&self, email: &str) -> Result<bool, NewsletterError>;
}

// =============================================================================
//  BEEHIIV (API v2)
// =============================================================================

#[derive(Debug, Serialize)]
struct CreateSubscriptionBody<'a> {
    email: &'a str,
    reactivate_existing: bool,
    send_welcome_email: bool,
    utm_source: &'a str,
    utm_medium: &'a str,
    utm_campaign: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    referring_site: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
struct SubscriptionEnvelope {
    data: Option<SubscriptionData>,
}

#[derive(Debug, Deserialize)]
struct SubscriptionStatus {
    status: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SubscriptionList {
    #[serde(default)]
    data: Vec<SubscriptionStatus>,
}

// "active" e "validating" contam como inscrito
fn any_active(list: &SubscriptionList) -> bool {
    list.data
        .iter()
        .any(|s| matches!(s.status.as_deref(), Some("active") | Some("validating")))
}

#[derive(Clone)]
pub struct BeehiivClient {
    http: reqwest::Client,
    config: BeehiivConfig,
}

impl BeehiivClient {
    pub fn new(http: reqwest::Client, config: BeehiivConfig) -> Self {
        Self { http, config }
    }

    fn subscriptions_url(&self) -> String {
        format!(
            "{}/v2/publications/{}/subscriptions",
            self.config.api_base.trim_end_matches('/'),
            self.config.publication_id
        )
    }

    async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, NewsletterError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(NewsletterError::Upstream {
            status: status.as_u16(),
            body,
        })
    }
}

#[async_trait]
impl NewsletterClient for BeehiivClient {
    async fn subscribe(&self, request: &SubscriptionRequest) -> Result<SubscriptionData, NewsletterError> {
        let body = CreateSubscriptionBody {
            email: &request.email,
            reactivate_existing: false,
            send_welcome_email: true,
            utm_source: &request.source,
            utm_medium: "website",
            utm_campaign: "newsletter_signup",
            referring_site: request.referring_site.as_deref(),
        };

        let response = self
            .http
            .post(self.subscriptions_url())
            .bearer_auth(&self.config.api_token)
            .json(&body)
            .send()
            .await?;

        let envelope: SubscriptionEnvelope = Self::check_status(response).await?.json().await?;
        Ok(envelope.data.unwrap_or_default())
    }

    async fn is_subscribed(&self, email: &str) -> Result<bool, NewsletterError> {
        let response = self
            .http
            .get(self.subscriptions_url())
            .bearer_auth(&self.config.api_token)
            .query(&[("email", email)])
            .send()
            .await?;

        let list: SubscriptionList = Self::check_status(response).await?.json().await?;
        Ok(any_active(&list))
    }
}

// =============================================================================
//  SERVIÇO
// =============================================================================

#[derive(Clone)]
pub struct NewsletterService {
    client: Option<Arc<dyn NewsletterClient>>,
    store: Arc<dyn CrmStore>,
}

impl NewsletterService {
    pub fn new(client: Option<Arc<dyn NewsletterClient>>, store: Arc<dyn CrmStore>) -> Self {
        Self { client, store }
    }

    fn client(&self) -> Result<&Arc<dyn NewsletterClient>, AppError> {
        self.client.as_ref().ok_or(AppError::NewsletterNotConfigured)
    }

    /// Inscreve o e-mail. `referer` é o cabeçalho HTTP, usado quando o
    /// formulário não informa `signupPage`.
    pub async fn subscribe(
        &self,
        payload: &SubscribePayload,
        referer: Option<String>,
    ) -> Result<SubscriptionData, AppError> {
        let client = self.client()?;

        let email = payload.email.trim().to_string();
        let source = payload
            .source
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .unwrap_or(DEFAULT_SOURCE)
            .to_string();
        let signup_page = payload
            .signup_page
            .clone()
            .filter(|p| !p.trim().is_empty());

        let request = SubscriptionRequest {
            email: email.clone(),
            source: source.clone(),
            referring_site: signup_page.clone().or(referer),
        };

        let data = client.subscribe(&request).await?;
        tracing::info!("📰 {} inscrito na newsletter (origem: {})", email, source);

        if LEAD_SOURCES.contains(&source.as_str()) {
            let lead = NewLead {
                email,
                source,
                signup_page,
            };
            if let Err(e) = self.store.append_lead(&lead).await {
                tracing::error!("🔥 Falha ao gravar lead de {}: {}", lead.email, e);
            }
        }

        Ok(data)
    }

    pub async fn is_subscribed(&self, email: &str) -> Result<bool, AppError> {
        let subscribed = self.client()?.is_subscribed(email.trim()).await?;
        Ok(subscribed)
    }
}
