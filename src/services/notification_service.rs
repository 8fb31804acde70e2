// src/services/notification_service.rs

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use crate::{
    config::{MailgunConfig, SiteConfig},
    models::forms::ContactSubmission,
    services::email_templates::{self, OutgoingEmail},
};

#[derive(Debug, Error)]
pub enum MailError {
    #[error("falha de transporte: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("provedor respondeu {status}: {body}")]
    Rejected { status: u16, body: String },
}

/// Envio de e-mail transacional.
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, email: &OutgoingEmail) -> Result<(), MailError>;
}

// =============================================================================
//  MAILGUN
// =============================================================================

#[derive(Clone)]
pub struct MailgunMailer {
    http: reqwest::Client,
    config: MailgunConfig,
}

impl MailgunMailer {
    pub fn new(http: reqwest::Client, config: MailgunConfig) -> Self {
        Self { http, config }
    }

    fn messages_url(&self) -> String {
        format!(
            "{}/v3/{}/messages",
            self.config.api_base.trim_end_matches('/'),
            self.config.domain
        )
    }
}

#[async_trait]
impl Mailer for MailgunMailer {
    async fn send(&self, email: &OutgoingEmail) -> Result<(), MailError> {
        let mut form = vec![
            ("from", email.from.as_str()),
            ("to", email.to.as_str()),
            ("subject", email.subject.as_str()),
            ("html", email.html.as_str()),
            ("text", email.text.as_str()),
        ];
        if let Some(reply_to) = &email.reply_to {
            form.push(("h:Reply-To", reply_to.as_str()));
        }

        let response = self
            .http
            .post(self.messages_url())
            .basic_auth("api", Some(&self.config.api_key))
            .form(&form)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(MailError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        Ok(())
    }
}

// =============================================================================
//  DISPATCHER
// =============================================================================

#[derive(Clone)]
pub struct NotificationService {
    mailer: Arc<dyn Mailer>,
    from_address: String,
    recipient: String,
    site: SiteConfig,
}

impl NotificationService {
    pub fn new(mailer: Arc<dyn Mailer>, mailgun: &MailgunConfig, site: SiteConfig) -> Self {
        Self {
            mailer,
            from_address: mailgun.from_email.clone(),
            recipient: mailgun.recipient.clone(),
            site,
        }
    }

    /// Envia a notificação do dono e a confirmação ao mesmo tempo e espera as
    /// duas terminarem. Se alguma falhar, devolve o primeiro erro (dono primeiro).
    pub async fn dispatch(&self, submission: &ContactSubmission) -> Result<(), MailError> {
        let site_url = self.site.site_url.as_deref();

        let owner_email = email_templates::contact_notification(
            submission,
            &self.from_address,
            &self.recipient,
            site_url,
            &self.site.owner_name,
        );
        let confirmation_email = email_templates::contact_confirmation(
            submission,
            &self.from_address,
            site_url,
            &self.site.owner_name,
        );

        let (owner_result, confirmation_result) = tokio::join!(
            self.mailer.send(&owner_email),
            self.mailer.send(&confirmation_email),
        );

        if let Err(e) = &owner_result {
            tracing::error!("🔥 Falha ao enviar notificação ao dono do site: {}", e);
        }
        if let Err(e) = &confirmation_result {
            tracing::error!("🔥 Falha ao enviar confirmação para {}: {}", submission.email, e);
        }

        owner_result?;
        confirmation_result?;

        tracing::info!("📧 Notificações do contato {} enviadas", submission.email);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::Mutex;

    #[derive(Default)]
    struct RecordingMailer {
        sent: Mutex<Vec<OutgoingEmail>>,
        fail_to: Option<String>,
    }

    #[async_trait]
    impl Mailer for RecordingMailer {
        async fn send(&self, email: &OutgoingEmail) -> Result<(), MailError> {
            self.sent.lock().await.push(email.clone());
            if self.fail_to.as_deref() == Some(email.to.as_str()) {
                return Err(MailError::Rejected {
                    status: 400,
                    body: "bad recipient".into(),
                });
            }
            Ok(())
        }
    }

    fn config() -> MailgunConfig {
        MailgunConfig {
            api_key: "key".into(),
            domain: "mg.site.com".into(),
            from_email: "hello@site.com".into(),
            recipient: "owner@site.com".into(),
            api_base: "https://api.mailgun.net/".into(),
        }
    }

    fn submission() -> ContactSubmission {
        ContactSubmission {
            first_name: "Jane".into(),
            last_name: "Doe".into(),
            email: "jane@x.com".into(),
            company: "Acme".into(),
            phone: None,
            message: "Hi".into(),
            subscribed_to_newsletter: false,
        }
    }

    #[tokio::test]
    async fn sends_exactly_two_emails() {
        let mailer = Arc::new(RecordingMailer::default());
        let service = NotificationService::new(mailer.clone(), &config(), SiteConfig::default());

        service.dispatch(&submission()).await.unwrap();

        let sent = mailer.sent.lock().await;
        assert_eq!(sent.len(), 2);
        assert!(sent.iter().any(|e| e.to == "owner@site.com"));
        assert!(sent.iter().any(|e| e.to == "jane@x.com"));
    }

    #[tokio::test]
    async fn failure_waits_for_both_sends() {
        let mailer = Arc::new(RecordingMailer {
            fail_to: Some("owner@site.com".into()),
            ..Default::default()
        });
        let service = NotificationService::new(mailer.clone(), &config(), SiteConfig::default());

        let err = service.dispatch(&submission()).await.unwrap_err();
        assert!(matches!(err, MailError::Rejected { status: 400, .. }));
        assert_eq!(mailer.sent.lock().await.len(), 2);
    }

    #[test]
    fn mailgun_url_uses_domain() {
        let mailer = MailgunMailer::new(reqwest::Client::new(), config());
        assert_eq!(mailer.messages_url(), "https://api.mailgun.net/v3/mg.site.com/messages");
    }
}
