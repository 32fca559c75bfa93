//! Transactional email.
//!
//! Messages are rendered from Askama text and HTML templates and sent over
//! SMTP with lettre. Without SMTP configuration the rendered message is
//! written to the log, which keeps local registration usable.

use askama::Template;
use lettre::{
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
    message::{Mailbox, MultiPart, SinglePart, header::ContentType},
    transport::smtp::{Error as SmtpError, authentication::Credentials},
};
use secrecy::ExposeSecret;
use thiserror::Error;

use crate::config::{EmailConfig, SiteConfig};
use crate::models::User;
use crate::services::auth::VERIFICATION_TOKEN_TTL_HOURS;

const SITE_NAME: &str = "PSS III Personal Website";

#[derive(Template)]
#[template(path = "email/verification.html")]
struct VerificationHtml<'a> {
    first_name: &'a str,
    verify_url: &'a str,
    ttl_hours: i64,
}

#[derive(Template)]
#[template(path = "email/verification.txt")]
struct VerificationText<'a> {
    first_name: &'a str,
    verify_url: &'a str,
    ttl_hours: i64,
}

#[derive(Template)]
#[template(path = "email/admin_notification.html")]
struct AdminNotificationHtml<'a> {
    user: &'a User,
}

#[derive(Template)]
#[template(path = "email/admin_notification.txt")]
struct AdminNotificationText<'a> {
    user: &'a User,
}

#[derive(Template)]
#[template(path = "email/approval.html")]
struct ApprovalHtml<'a> {
    first_name: &'a str,
    approved: bool,
    signin_url: &'a str,
}

#[derive(Template)]
#[template(path = "email/approval.txt")]
struct ApprovalText<'a> {
    first_name: &'a str,
    approved: bool,
    signin_url: &'a str,
}

#[derive(Debug, Error)]
pub enum EmailError {
    #[error("SMTP error: {0}")]
    Smtp(#[from] SmtpError),

    #[error("Failed to build message: {0}")]
    MessageBuild(#[from] lettre::error::Error),

    #[error("Invalid email address: {0}")]
    InvalidAddress(String),

    #[error("Template error: {0}")]
    Template(#[from] askama::Error),
}

/// A rendered message ready to hand to the transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingEmail {
    pub to: String,
    pub subject: String,
    pub text: String,
    pub html: String,
}

#[derive(Clone)]
struct Smtp {
    mailer: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

/// Email service for the account lifecycle messages.
#[derive(Clone)]
pub struct EmailService {
    smtp: Option<Smtp>,
    base_url: String,
    admin_email: String,
}

impl EmailService {
    /// # Errors
    ///
    /// Returns an error if the SMTP relay or sender address is invalid.
    pub fn new(config: &SiteConfig) -> Result<Self, EmailError> {
        let smtp = config.email.as_ref().map(build_smtp).transpose()?;
        if smtp.is_none() {
            tracing::warn!("SMTP not configured; emails will be logged instead of sent");
        }
        Ok(Self {
            smtp,
            base_url: config.base_url.clone(),
            admin_email: config.admin_email.clone(),
        })
    }

    /// A service that only logs, for tests and local runs.
    #[must_use]
    pub fn log_only(base_url: &str, admin_email: &str) -> Self {
        Self {
            smtp: None,
            base_url: base_url.trim_end_matches('/').to_string(),
            admin_email: admin_email.to_string(),
        }
    }

    #[must_use]
    pub const fn is_configured(&self) -> bool {
        self.smtp.is_some()
    }

    /// # Errors
    ///
    /// Returns `Template` if rendering fails.
    pub fn verification(&self, user: &User, token: &str) -> Result<OutgoingEmail, EmailError> {
        let verify_url = format!("{}/verify-email/{token}", self.base_url);
        let first_name = user.first_name.as_str();
        Ok(OutgoingEmail {
            to: user.email.to_string(),
            subject: format!("Verify Your Email - {SITE_NAME}"),
            text: VerificationText {
                first_name,
                verify_url: &verify_url,
                ttl_hours: VERIFICATION_TOKEN_TTL_HOURS,
            }
            .render()?,
            html: VerificationHtml {
                first_name,
                verify_url: &verify_url,
                ttl_hours: VERIFICATION_TOKEN_TTL_HOURS,
            }
            .render()?,
        })
    }

    /// Notice to the site admin that someone registered.
    ///
    /// # Errors
    ///
    /// Returns `Template` if rendering fails.
    pub fn admin_notification(&self, user: &User) -> Result<OutgoingEmail, EmailError> {
        Ok(OutgoingEmail {
            to: self.admin_email.clone(),
            subject: format!("New User Registration - {SITE_NAME}"),
            text: AdminNotificationText { user }.render()?,
            html: AdminNotificationHtml { user }.render()?,
        })
    }

    /// Approval or rejection notice.
    ///
    /// # Errors
    ///
    /// Returns `Template` if rendering fails.
    pub fn approval(&self, user: &User, approved: bool) -> Result<OutgoingEmail, EmailError> {
        let signin_url = format!("{}/signin", self.base_url);
        let first_name = user.first_name.as_str();
        let subject = if approved {
            format!("Account Approved - {SITE_NAME}")
        } else {
            format!("Account Status Update - {SITE_NAME}")
        };
        Ok(OutgoingEmail {
            to: user.email.to_string(),
            subject,
            text: ApprovalText {
                first_name,
                approved,
                signin_url: &signin_url,
            }
            .render()?,
            html: ApprovalHtml {
                first_name,
                approved,
                signin_url: &signin_url,
            }
            .render()?,
        })
    }

    /// Send a message, or log it when SMTP is not configured.
    ///
    /// # Errors
    ///
    /// Returns an error if the message cannot be built or delivered.
    pub async fn send(&self, email: &OutgoingEmail) -> Result<(), EmailError> {
        let Some(smtp) = &self.smtp else {
            tracing::info!(
                to = %email.to,
                subject = %email.subject,
                body = %email.text,
                "Email not sent (SMTP not configured)"
            );
            return Ok(());
        };

        let to: Mailbox = email
            .to
            .parse()
            .map_err(|_| EmailError::InvalidAddress(email.to.clone()))?;
        let message = Message::builder()
            .from(smtp.from.clone())
            .to(to)
            .subject(&email.subject)
            .multipart(
                MultiPart::alternative()
                    .singlepart(
                        SinglePart::builder()
                            .header(ContentType::TEXT_PLAIN)
                            .body(email.text.clone()),
                    )
                    .singlepart(
                        SinglePart::builder()
                            .header(ContentType::TEXT_HTML)
                            .body(email.html.clone()),
                    ),
            )?;

        smtp.mailer.send(message).await?;
        tracing::info!(to = %email.to, subject = %email.subject, "Email sent successfully");
        Ok(())
    }

    /// Send on a background task so the request does not wait on SMTP.
    ///
    /// Rendering failures are logged here; delivery failures are logged by
    /// the task.
    pub fn dispatch(&self, rendered: Result<OutgoingEmail, EmailError>) {
        let email = match rendered {
            Ok(email) => email,
            Err(e) => {
                tracing::error!(error = %e, "Failed to render email");
                return;
            }
        };
        let service = self.clone();
        tokio::spawn(async move {
            if let Err(e) = service.send(&email).await {
                let event_id = sentry::capture_error(&e);
                tracing::error!(
                    error = %e,
                    to = %email.to,
                    sentry_event_id = %event_id,
                    "Failed to send email"
                );
            }
        });
    }
}

fn build_smtp(config: &EmailConfig) -> Result<Smtp, EmailError> {
    let credentials = Credentials::new(
        config.smtp_username.clone(),
        config.smtp_password.expose_secret().to_string(),
    );
    let mailer = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.smtp_host)?
        .port(config.smtp_port)
        .credentials(credentials)
        .build();
    let from = config
        .from_address
        .parse()
        .map_err(|_| EmailError::InvalidAddress(config.from_address.clone()))?;
    Ok(Smtp { mailer, from })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::Utc;
    use pss_core::{Email, UserId, Username};

    use super::*;

    fn user() -> User {
        User {
            id: UserId::new(3),
            username: Username::parse("ljones").unwrap(),
            email: Email::parse("lee@example.com").unwrap(),
            first_name: "Lee".to_string(),
            last_name: "Jones <script>".to_string(),
            is_verified: false,
            is_approved: false,
            is_admin: false,
            created_at: Utc::now(),
            last_login: None,
        }
    }

    fn service() -> EmailService {
        EmailService::log_only("https://pss.example.org/", "owner@example.com")
    }

    #[test]
    fn test_verification_contains_link_and_expiry() {
        let email = service().verification(&user(), "tok123").unwrap();
        assert_eq!(email.to, "lee@example.com");
        assert_eq!(email.subject, "Verify Your Email - PSS III Personal Website");
        assert!(email.text.contains("https://pss.example.org/verify-email/tok123"));
        assert!(email.text.contains("24 hours"));
        assert!(email.html.contains("href=\"https://pss.example.org/verify-email/tok123\""));
    }

    #[test]
    fn test_admin_notification_goes_to_admin_and_escapes_html() {
        let email = service().admin_notification(&user()).unwrap();
        assert_eq!(email.to, "owner@example.com");
        assert_eq!(email.subject, "New User Registration - PSS III Personal Website");
        assert!(email.text.contains("ljones"));
        assert!(email.html.contains("Jones &#60;script&#62;") || email.html.contains("Jones &lt;script&gt;"));
    }

    #[test]
    fn test_approval_and_rejection_subjects() {
        let approved = service().approval(&user(), true).unwrap();
        assert_eq!(approved.subject, "Account Approved - PSS III Personal Website");
        assert!(approved.text.contains("https://pss.example.org/signin"));

        let rejected = service().approval(&user(), false).unwrap();
        assert_eq!(rejected.subject, "Account Status Update - PSS III Personal Website");
        assert!(!rejected.text.contains("/signin"));
    }

    #[tokio::test]
    async fn test_send_without_smtp_is_logged() {
        let svc = service();
        assert!(!svc.is_configured());
        let email = svc.verification(&user(), "abc").unwrap();
        assert!(svc.send(&email).await.is_ok());
    }
}
