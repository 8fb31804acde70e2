pub mod email_templates;
pub mod intake_service;
pub mod newsletter_service;
pub mod notification_service;
pub mod podcast_service;
