#![allow(dead_code)]

use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use serde_json::Value;
use tokio::sync::Mutex;
use tower::ServiceExt;
use uuid::Uuid;

use site_intake::{
    common::error::AppError,
    config::{AppState, Components, Config, MailgunConfig, SiteConfig},
    db::{CrmStore, MemoryCrmStore},
    models::{
        crm::{
            Activity, Company, ContactEmail, ContactUpsert, Lead, NewActivity, NewContact, NewLead,
        },
        forms::SubscriptionData,
    },
    routes::build_router,
    services::{
        email_templates::OutgoingEmail,
        newsletter_service::{NewsletterClient, NewsletterError, SubscriptionRequest},
        notification_service::{MailError, Mailer},
        podcast_service::{LatestEpisode, PodcastError, PodcastFeed},
    },
};

pub const OWNER: &str = "owner@site.com";

pub fn test_config() -> Config {
    Config {
        database_url: "postgres://unused".into(),
        db_max_connections: 1,
        bind_addr: "127.0.0.1:0".into(),
        mailgun: MailgunConfig {
            api_key: "key".into(),
            domain: "mg.site.com".into(),
            from_email: "hello@site.com".into(),
            recipient: OWNER.into(),
            api_base: "http://mailgun.invalid".into(),
        },
        beehiiv: None,
        youtube: None,
        site: SiteConfig {
            site_id: "test-site".into(),
            owner_name: "Site Owner".into(),
            site_url: Some("https://site.com".into()),
        },
        contact_min_form_ms: 3000,
        newsletter_min_form_ms: 2000,
        geo_country_header: "x-vercel-ip-country".into(),
    }
}

/// Timestamp de carregamento do formulário "bem antigo" (passa no anti-spam).
pub fn loaded_long_ago() -> i64 {
    chrono::Utc::now().timestamp_millis() - 60_000
}

pub fn loaded_just_now() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

// =============================================================================
//  FAKES
// =============================================================================

#[derive(Default)]
pub struct RecordingMailer {
    pub sent: Mutex<Vec<OutgoingEmail>>,
    pub fail: bool,
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send(&self, email: &OutgoingEmail) -> Result<(), MailError> {
        self.sent.lock().await.push(email.clone());
        if self.fail {
            return Err(MailError::Rejected {
                status: 401,
                body: "Forbidden".into(),
            });
        }
        Ok(())
    }
}

#[derive(Default)]
pub struct FakeNewsletter {
    pub requests: Mutex<Vec<SubscriptionRequest>>,
    pub checks: Mutex<Vec<String>>,
    pub reject_status: Option<u16>,
    pub subscribed: bool,
}

#[async_trait]
impl NewsletterClient for FakeNewsletter {
    async fn subscribe(
        &self,
        request: &SubscriptionRequest,
    ) -> Result<SubscriptionData, NewsletterError> {
        self.requests.lock().await.push(request.clone());
        if let Some(status) = self.reject_status {
            return Err(NewsletterError::Upstream {
                status,
                body: r#"{"errors":[]}"#.into(),
            });
        }
        Ok(SubscriptionData {
            id: Some("sub_123".into()),
            status: Some("validating".into()),
        })
    }

    async fn is_subscribed(&self, email: &str) -> Result<bool, NewsletterError> {
        self.checks.lock().await.push(email.to_string());
        if let Some(status) = self.reject_status {
            return Err(NewsletterError::Upstream {
                status,
                body: String::new(),
            });
        }
        Ok(self.subscribed)
    }
}

pub struct FakeFeed(pub Option<LatestEpisode>);

#[async_trait]
impl PodcastFeed for FakeFeed {
    async fn latest_episode(&self) -> Result<LatestEpisode, PodcastError> {
        self.0.clone().ok_or(PodcastError::NotFound("No videos found"))
    }
}

/// Store cujo upsert de contato sempre falha.
#[derive(Default)]
pub struct BrokenContactStore {
    pub inner: MemoryCrmStore,
}

fn offline() -> AppError {
    AppError::InternalServerError(anyhow::anyhow!("connection refused"))
}

#[async_trait]
impl CrmStore for BrokenContactStore {
    async fn upsert_contact(&self, _: &NewContact) -> Result<ContactUpsert, AppError> {
        Err(offline())
    }
    async fn insert_contact_email(&self, id: Uuid, email: &str) -> Result<ContactEmail, AppError> {
        self.inner.insert_contact_email(id, email).await
    }
    async fn resolve_company(&self, name: &str) -> Result<Company, AppError> {
        self.inner.resolve_company(name).await
    }
    async fn has_company_link(&self, id: Uuid) -> Result<bool, AppError> {
        self.inner.has_company_link(id).await
    }
    async fn link_company(&self, c: Uuid, co: Uuid, rel: &str) -> Result<bool, AppError> {
        self.inner.link_company(c, co, rel).await
    }
    async fn append_activity(&self, a: &NewActivity) -> Result<Activity, AppError> {
        self.inner.append_activity(a).await
    }
    async fn append_lead(&self, l: &NewLead) -> Result<Lead, AppError> {
        self.inner.append_lead(l).await
    }
}

// =============================================================================
//  HARNESS
// =============================================================================

pub struct TestApp {
    pub router: Router,
    pub store: Arc<MemoryCrmStore>,
    pub mailer: Arc<RecordingMailer>,
    pub newsletter: Option<Arc<FakeNewsletter>>,
}

pub struct TestAppBuilder {
    mailer: RecordingMailer,
    newsletter: Option<FakeNewsletter>,
    podcast: Option<LatestEpisode>,
    podcast_configured: bool,
    store: Option<Arc<dyn CrmStore>>,
}

impl TestAppBuilder {
    pub fn new() -> Self {
        Self {
            mailer: RecordingMailer::default(),
            newsletter: Some(FakeNewsletter::default()),
            podcast: None,
            podcast_configured: false,
            store: None,
        }
    }

    pub fn failing_mailer(mut self) -> Self {
        self.mailer.fail = true;
        self
    }

    pub fn newsletter(mut self, newsletter: Option<FakeNewsletter>) -> Self {
        self.newsletter = newsletter;
        self
    }

    pub fn podcast(mut self, episode: Option<LatestEpisode>) -> Self {
        self.podcast = episode;
        self.podcast_configured = true;
        self
    }

    pub fn store(mut self, store: Arc<dyn CrmStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn build(self) -> TestApp {
        let memory = Arc::new(MemoryCrmStore::new());
        let mailer = Arc::new(self.mailer);
        let newsletter = self.newsletter.map(Arc::new);

        let components = Components {
            store: self
                .store
                .unwrap_or_else(|| memory.clone() as Arc<dyn CrmStore>),
            mailer: mailer.clone(),
            newsletter: newsletter
                .clone()
                .map(|n| n as Arc<dyn NewsletterClient>),
            podcast: self
                .podcast_configured
                .then(|| Arc::new(FakeFeed(self.podcast)) as Arc<dyn PodcastFeed>),
        };

        let state = AppState::with_components(test_config(), components);

        TestApp {
            router: build_router(state),
            store: memory,
            mailer,
            newsletter,
        }
    }
}

impl TestApp {
    pub async fn post_json(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        let request = Request::builder()
            .method(Method::POST)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(serde_json::to_vec(&body).unwrap()))
            .unwrap();
        self.send(request).await
    }

    pub async fn get(&self, uri: &str) -> (StatusCode, Value) {
        let request = Request::builder()
            .method(Method::GET)
            .uri(uri)
            .body(Body::empty())
            .unwrap();
        self.send(request).await
    }

    pub async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, body)
    }

    pub async fn emails_sent(&self) -> usize {
        self.mailer.sent.lock().await.len()
    }
}
