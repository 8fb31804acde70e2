// src/config.rs

use std::{env, sync::Arc};

use anyhow::Context;

use crate::{
    common::spam::SpamFilter,
    db::{self, CrmRepository, CrmStore},
    services::{
        intake_service::IntakeService,
        newsletter_service::{BeehiivClient, NewsletterClient, NewsletterService},
        notification_service::{MailgunMailer, Mailer, NotificationService},
        podcast_service::{PodcastFeed, PodcastService, YouTubeFeed},
    },
};

// =============================================================================
//  CONFIGURAÇÃO (lida do ambiente uma única vez)
// =============================================================================

#[derive(Debug, Clone)]
pub struct MailgunConfig {
    pub api_key: String,
    pub domain: String,
    pub from_email: String,
    // Quem recebe as notificações do formulário de contato
    pub recipient: String,
    pub api_base: String,
}

#[derive(Debug, Clone)]
pub struct BeehiivConfig {
    pub api_token: String,
    pub publication_id: String,
    pub api_base: String,
}

#[derive(Debug, Clone)]
pub struct YouTubeConfig {
    pub api_key: String,
    pub channel_id: String,
    pub api_base: String,
}

#[derive(Debug, Clone)]
pub struct SiteConfig {
    // Vai para o metadata das atividades
    pub site_id: String,
    pub owner_name: String,
    pub site_url: Option<String>,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            site_id: "site".to_string(),
            owner_name: "Site Owner".to_string(),
            site_url: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub db_max_connections: u32,
    pub bind_addr: String,
    pub mailgun: MailgunConfig,
    pub beehiiv: Option<BeehiivConfig>,
    pub youtube: Option<YouTubeConfig>,
    pub site: SiteConfig,
    pub contact_min_form_ms: i64,
    pub newsletter_min_form_ms: i64,
    pub geo_country_header: String,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Monta a configuração a partir de qualquer fonte chave → valor.
    /// Valores vazios contam como ausentes.
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let optional = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let required = |key: &str| {
            optional(key).with_context(|| format!("{key} deve ser definida"))
        };

        let mailgun = MailgunConfig {
            api_key: required("MAILGUN_API_KEY")?,
            domain: required("MAILGUN_DOMAIN")?,
            from_email: required("MAILGUN_FROM_EMAIL")?,
            recipient: required("CONTACT_FORM_RECIPIENT")?,
            api_base: optional("MAILGUN_API_BASE")
                .unwrap_or_else(|| "https://api.mailgun.net".to_string()),
        };

        // Newsletter e podcast são opcionais: sem credenciais, ficam desligados
        let beehiiv = match (optional("BEEHIIV_API_TOKEN"), optional("BEEHIIV_PUBLICATION_ID")) {
            (Some(api_token), Some(publication_id)) => Some(BeehiivConfig {
                api_token,
                publication_id,
                api_base: optional("BEEHIIV_API_BASE")
                    .unwrap_or_else(|| "https://api.beehiiv.com".to_string()),
            }),
            _ => None,
        };

        let youtube = match (optional("YOUTUBE_API_KEY"), optional("YOUTUBE_CHANNEL_ID")) {
            (Some(api_key), Some(channel_id)) => Some(YouTubeConfig {
                api_key,
                channel_id,
                api_base: optional("YOUTUBE_API_BASE")
                    .unwrap_or_else(|| "https://www.googleapis.com".to_string()),
            }),
            _ => None,
        };

        let defaults = SiteConfig::default();
        let site = SiteConfig {
            site_id: optional("SITE_ID").unwrap_or(defaults.site_id),
            owner_name: optional("SITE_OWNER_NAME").unwrap_or(defaults.owner_name),
            site_url: optional("SITE_URL"),
        };

        Ok(Self {
            database_url: required("DATABASE_URL")?,
            db_max_connections: parse_or(optional("DB_MAX_CONNECTIONS"), "DB_MAX_CONNECTIONS", 5)?,
            bind_addr: optional("BIND_ADDR").unwrap_or_else(|| "0.0.0.0:3000".to_string()),
            mailgun,
            beehiiv,
            youtube,
            site,
            contact_min_form_ms: parse_or(optional("CONTACT_MIN_FORM_MS"), "CONTACT_MIN_FORM_MS", 3000)?,
            newsletter_min_form_ms: parse_or(
                optional("NEWSLETTER_MIN_FORM_MS"),
                "NEWSLETTER_MIN_FORM_MS",
                2000,
            )?,
            geo_country_header: optional("GEO_COUNTRY_HEADER")
                .unwrap_or_else(|| "x-vercel-ip-country".to_string())
                .to_lowercase(),
        })
    }
}

fn parse_or<T>(value: Option<String>, key: &str, default: T) -> anyhow::Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match value {
        Some(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("{key} inválida: '{raw}'")),
        None => Ok(default),
    }
}

// =============================================================================
//  ESTADO COMPARTILHADO
// =============================================================================

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub intake_service: IntakeService,
    pub notification_service: NotificationService,
    pub newsletter_service: NewsletterService,
    pub podcast_service: PodcastService,
    pub contact_spam: SpamFilter,
    pub newsletter_spam: SpamFilter,
}

/// Implementações concretas de cada dependência externa.
pub struct Components {
    pub store: Arc<dyn CrmStore>,
    pub mailer: Arc<dyn Mailer>,
    pub newsletter: Option<Arc<dyn NewsletterClient>>,
    pub podcast: Option<Arc<dyn PodcastFeed>>,
}

impl AppState {
    // A assinatura retorna um Result: a configuração falha cedo, sem panic
    pub async fn new() -> anyhow::Result<Self> {
        let config = Config::from_env()?;

        let db_pool = db::connect_and_migrate(&config).await?;
        let http = reqwest::Client::builder()
            .user_agent(concat!("site-intake/", env!("CARGO_PKG_VERSION")))
            .build()?;

        // --- Monta o gráfico de dependências ---
        let components = Components {
            store: Arc::new(CrmRepository::new(db_pool)),
            mailer: Arc::new(MailgunMailer::new(http.clone(), config.mailgun.clone())),
            newsletter: config.beehiiv.clone().map(|c| {
                Arc::new(BeehiivClient::new(http.clone(), c)) as Arc<dyn NewsletterClient>
            }),
            podcast: config
                .youtube
                .clone()
                .map(|c| Arc::new(YouTubeFeed::new(http.clone(), c)) as Arc<dyn PodcastFeed>),
        };

        if components.newsletter.is_none() {
            tracing::warn!("⚠️ Beehiiv não configurado: /api/subscribe responderá 500");
        }

        Ok(Self::with_components(config, components))
    }

    pub fn with_components(config: Config, components: Components) -> Self {
        let Components {
            store,
            mailer,
            newsletter,
            podcast,
        } = components;

        Self {
            intake_service: IntakeService::new(store.clone(), config.site.site_id.clone()),
            notification_service: NotificationService::new(
                mailer,
                &config.mailgun,
                config.site.clone(),
            ),
            newsletter_service: NewsletterService::new(newsletter, store),
            podcast_service: PodcastService::new(podcast),
            contact_spam: SpamFilter::new(config.contact_min_form_ms),
            newsletter_spam: SpamFilter::new(config.newsletter_min_form_ms),
            config: Arc::new(config),
        }
    }
}
