// src/services/email_templates.rs

use crate::models::forms::ContactSubmission;

/// Um e-mail pronto para o provedor.
#[derive(Debug, Clone, PartialEq)]
pub struct OutgoingEmail {
    pub from: String,
    pub to: String,
    pub reply_to: Option<String>,
    pub subject: String,
    pub html: String,
    pub text: String,
}

pub fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

/// `"Nome" <endereço>` com o nome como quoted-string, para vírgula, aspas ou
/// `<` no nome não quebrarem o cabeçalho. Quebras de linha viram espaço.
pub fn mailbox(display_name: &str, address: &str) -> String {
    let name: String = display_name
        .chars()
        .map(|c| if c == '\r' || c == '\n' { ' ' } else { c })
        .collect();
    let name = name.replace('\\', "\\\\").replace('"', "\\\"");
    format!("\"{name}\" <{address}>")
}

// Escapa e troca quebras de linha por <br>
fn html_paragraph(s: &str) -> String {
    html_escape(s).replace("\r\n", "\n").replace('\n', "<br>")
}

fn newsletter_label(subscribed: bool) -> &'static str {
    if subscribed { "Yes, subscribed" } else { "No" }
}

fn layout(title: &str, site_url: Option<&str>, body: &str, footer: &str) -> String {
    let header = match site_url {
        Some(url) => format!(
            r#"<a href="{url}" style="color: #ffffff; text-decoration: none; font-size: 18px; font-weight: 600;">{title}</a>"#,
            url = html_escape(url),
            title = html_escape(title),
        ),
        None => format!(
            r#"<span style="color: #ffffff; font-size: 18px; font-weight: 600;">{}</span>"#,
            html_escape(title)
        ),
    };

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8">
  <meta name="viewport" content="width=device-width, initial-scale=1.0">
  <title>{title}</title>
</head>
<body style="margin: 0; padding: 0; font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, Arial, sans-serif; background-color: #f5f5f5;">
  <table role="presentation" width="100%" cellspacing="0" cellpadding="0" style="background-color: #f5f5f5;">
    <tr>
      <td align="center" style="padding: 40px 20px;">
        <table role="presentation" width="600" cellspacing="0" cellpadding="0" style="max-width: 600px; width: 100%;">
          <tr>
            <td style="background-color: #000000; padding: 24px 32px; border-radius: 8px 8px 0 0;">{header}</td>
          </tr>
          <tr>
            <td style="background-color: #ffffff; padding: 40px 32px; border-radius: 0 0 8px 8px;">
{body}
            </td>
          </tr>
          <tr>
            <td style="padding: 24px 32px; text-align: center;">
              <p style="margin: 0; font-size: 13px; color: #9ca3af;">{footer}</p>
            </td>
          </tr>
        </table>
      </td>
    </tr>
  </table>
</body>
</html>"#,
        title = html_escape(title),
        header = header,
        body = body,
        footer = html_escape(footer),
    )
}

fn detail_row(label: &str, value_html: &str) -> String {
    format!(
        r#"                <tr>
                  <td style="padding: 8px 0; border-bottom: 1px solid #e5e7eb;"><span style="font-size: 14px; font-weight: 600; color: #6b7280;">{label}</span></td>
                  <td style="padding: 8px 0; border-bottom: 1px solid #e5e7eb; text-align: right;"><span style="font-size: 14px; color: #111827;">{value_html}</span></td>
                </tr>
"#
    )
}

/// E-mail para o dono do site, com Reply-To apontando para quem escreveu.
pub fn contact_notification(
    submission: &ContactSubmission,
    from_address: &str,
    recipient: &str,
    site_url: Option<&str>,
    owner_name: &str,
) -> OutgoingEmail {
    let full_name = submission.full_name();
    let email = html_escape(&submission.email);

    let mut rows = String::new();
    rows.push_str(&detail_row("From", &html_escape(&full_name)));
    rows.push_str(&detail_row(
        "Email",
        &format!(r#"<a href="mailto:{email}" style="color: #000000;">{email}</a>"#),
    ));
    rows.push_str(&detail_row("Company", &html_escape(&submission.company)));
    if let Some(phone) = &submission.phone {
        rows.push_str(&detail_row("Phone", &html_escape(phone)));
    }
    rows.push_str(&detail_row(
        "Newsletter",
        newsletter_label(submission.subscribed_to_newsletter),
    ));

    let body = format!(
        r#"              <h1 style="margin: 0 0 24px 0; font-size: 24px; font-weight: 600; color: #111827;">New Contact Form Submission</h1>
              <table role="presentation" width="100%" cellspacing="0" cellpadding="0" style="margin-bottom: 24px;">
{rows}              </table>
              <p style="margin: 0 0 12px 0; font-size: 14px; font-weight: 600; color: #111827;">Message:</p>
              <div style="background-color: #f9fafb; border-left: 3px solid #000000; padding: 16px 20px;">
                <p style="margin: 0; font-size: 15px; line-height: 1.6; color: #4b5563;">{message}</p>
              </div>"#,
        message = html_paragraph(&submission.message),
    );

    let footer = match site_url {
        Some(url) => format!("Sent from the {url} contact form"),
        None => "Sent from the website contact form".to_string(),
    };

    let mut text = format!(
        "New Contact Form Submission\n\nFrom: {full_name}\nEmail: {}\nCompany: {}\n",
        submission.email, submission.company
    );
    if let Some(phone) = &submission.phone {
        text.push_str(&format!("Phone: {phone}\n"));
    }
    text.push_str(&format!(
        "\nMessage:\n{}\n\nNewsletter: {}",
        submission.message,
        newsletter_label(submission.subscribed_to_newsletter)
    ));

    OutgoingEmail {
        from: mailbox(&full_name, from_address),
        to: recipient.to_string(),
        reply_to: Some(submission.email.clone()),
        subject: format!("New contact form submission from {full_name}"),
        html: layout(owner_name, site_url, &body, &footer),
        text,
    }
}

/// Confirmação para quem enviou o formulário, com cópia da mensagem.
pub fn contact_confirmation(
    submission: &ContactSubmission,
    from_address: &str,
    site_url: Option<&str>,
    owner_name: &str,
) -> OutgoingEmail {
    let first_name = &submission.first_name;

    let body = format!(
        r#"              <h1 style="margin: 0 0 24px 0; font-size: 24px; font-weight: 600; color: #111827;">Thanks for reaching out, {name}!</h1>
              <p style="margin: 0 0 16px 0; font-size: 16px; line-height: 1.6; color: #374151;">I've received your message and will get back to you as soon as possible.</p>
              <p style="margin: 24px 0 12px 0; font-size: 14px; font-weight: 600; color: #111827;">Here's a copy of your message:</p>
              <div style="background-color: #f9fafb; border-left: 3px solid #000000; padding: 16px 20px; margin: 0 0 24px 0;">
                <p style="margin: 0; font-size: 15px; line-height: 1.6; color: #4b5563;">{message}</p>
              </div>
              <p style="margin: 0 0 16px 0; font-size: 16px; line-height: 1.6; color: #374151;">Best regards,</p>
              <p style="margin: 0; font-size: 16px; font-weight: 600; color: #111827;">{owner}</p>"#,
        name = html_escape(first_name),
        message = html_paragraph(&submission.message),
        owner = html_escape(owner_name),
    );

    let text = format!(
        "Thanks for reaching out, {first_name}!\n\nI've received your message and will get back to you as soon as possible.\n\nHere's a copy of your message:\n\n{}\n\nBest regards,\n{owner_name}",
        submission.message
    );

    OutgoingEmail {
        from: mailbox(owner_name, from_address),
        to: submission.email.clone(),
        reply_to: None,
        subject: "Thanks for getting in touch!".to_string(),
        html: layout(owner_name, site_url, &body, owner_name),
        text,
    }
}
