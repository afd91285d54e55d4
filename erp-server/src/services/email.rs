//! Outbound email delivery
//!
//! Invitation messages are rendered here as plain text and handed to an HTTP
//! email gateway together with the company's transport settings. The gateway
//! owns the SMTP / Gmail session; this service owns rendering and error
//! mapping.

use serde::Serialize;

use crate::db::models::EmailSettings;
use crate::utils::{AppError, ErrorCode};

/// Application name shown in subjects and bodies
const APP_NAME: &str = "Ncode ERP";

/// Parameters for one invitation message
#[derive(Debug, Clone, Serialize)]
pub struct InvitationEmail {
    pub to_email: String,
    pub to_name: String,
    pub inviter_name: String,
    pub company_name: String,
    pub invite_token: String,
    pub role: String,
}

impl InvitationEmail {
    /// Fixed probe message used by the settings test endpoint
    pub fn test_probe(test_email: &str) -> Self {
        Self {
            to_email: test_email.to_string(),
            to_name: "Test User".to_string(),
            inviter_name: APP_NAME.to_string(),
            company_name: "Test Company".to_string(),
            invite_token: "test-token-123".to_string(),
            role: "user".to_string(),
        }
    }
}

/// Payload posted to the email gateway
#[derive(Debug, Serialize)]
struct GatewayMessage<'a> {
    to: &'a str,
    subject: &'a str,
    body: &'a str,
    transport: &'a EmailSettings,
}

/// Email dispatch service
#[derive(Clone, Debug)]
pub struct EmailService {
    client: reqwest::Client,
    gateway_url: String,
}

impl EmailService {
    pub fn new(gateway_url: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            gateway_url,
        }
    }

    /// Render and deliver an invitation
    ///
    /// Fails with `EmailNotConfigured` when the company's settings are
    /// missing or incomplete, and `EmailSendFailed` when the gateway
    /// rejects the message.
    pub async fn send_invitation(
        &self,
        settings: Option<&EmailSettings>,
        invite: &InvitationEmail,
        invite_base_url: &str,
    ) -> Result<(), AppError> {
        let settings = match settings {
            Some(s) if s.is_configured() => s,
            _ => {
                return Err(AppError::with_message(
                    ErrorCode::EmailNotConfigured,
                    "Configure email settings in the application settings page",
                ));
            }
        };

        let subject = format!("Sei stato invitato su {}", APP_NAME);
        let body = render_invitation_body(invite, invite_base_url);

        self.deliver(settings, &invite.to_email, &subject, &body)
            .await?;

        tracing::info!(to = %invite.to_email, "Invitation email sent");
        Ok(())
    }

    async fn deliver(
        &self,
        settings: &EmailSettings,
        to: &str,
        subject: &str,
        body: &str,
    ) -> Result<(), AppError> {
        let payload = GatewayMessage {
            to,
            subject,
            body,
            transport: settings,
        };

        let response = self
            .client
            .post(&self.gateway_url)
            .json(&payload)
            .send()
            .await
            .map_err(|e| {
                tracing::warn!(error = %e, "Email gateway unreachable");
                AppError::with_message(
                    ErrorCode::EmailSendFailed,
                    format!("Email gateway unreachable: {}", e),
                )
            })?;

        if !response.status().is_success() {
            let status = response.status();
            tracing::warn!(status = %status, "Email gateway returned non-success status");
            return Err(AppError::with_message(
                ErrorCode::EmailSendFailed,
                format!("Email gateway returned {}", status),
            ));
        }

        Ok(())
    }
}

/// Plain-text invitation body with the account setup link
fn render_invitation_body(invite: &InvitationEmail, invite_base_url: &str) -> String {
    let setup_url = format!(
        "{}/setup-account?token={}",
        invite_base_url.trim_end_matches('/'),
        invite.invite_token
    );

    format!(
        "Ciao {name}!\n\n\
         {inviter} ti ha invitato a unirti a {company} su {app}.\n\
         Ruolo assegnato: {role}\n\n\
         Accetta l'invito e completa la registrazione:\n\
         {url}\n\n\
         Questo invito scadrà tra 7 giorni.\n\
         Se non hai richiesto questo invito, puoi ignorare questa email.\n",
        name = invite.to_name,
        inviter = invite.inviter_name,
        company = invite.company_name,
        app = APP_NAME,
        role = role_label(&invite.role),
        url = setup_url,
    )
}

/// Italian role label shown in the invitation body
fn role_label(role: &str) -> &str {
    match role {
        "admin" => "Amministratore",
        "manager" => "Manager",
        "user" => "Utente",
        "viewer" => "Visualizzatore",
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invitation_body_contains_link_and_role() {
        let invite = InvitationEmail {
            to_email: "mario@example.com".to_string(),
            to_name: "Mario Rossi".to_string(),
            inviter_name: "Luca Bianchi".to_string(),
            company_name: "Acme Srl".to_string(),
            invite_token: "abc123".to_string(),
            role: "manager".to_string(),
        };

        let body = render_invitation_body(&invite, "https://erp.example.com/");
        assert!(body.contains("Ciao Mario Rossi!"));
        assert!(body.contains("Luca Bianchi ti ha invitato a unirti a Acme Srl"));
        assert!(body.contains("https://erp.example.com/setup-account?token=abc123"));
        assert!(body.contains("Ruolo assegnato: Manager"));
    }

    #[test]
    fn test_role_labels() {
        assert_eq!(role_label("admin"), "Amministratore");
        assert_eq!(role_label("user"), "Utente");
        assert_eq!(role_label("viewer"), "Visualizzatore");
        // Unknown roles pass through unchanged
        assert_eq!(role_label("owner"), "owner");
    }

    #[test]
    fn test_probe_invitation() {
        let probe = InvitationEmail::test_probe("check@example.com");
        assert_eq!(probe.to_email, "check@example.com");
        assert_eq!(probe.to_name, "Test User");
        assert_eq!(probe.invite_token, "test-token-123");
        assert_eq!(probe.company_name, "Test Company");
        assert_eq!(probe.role, "user");
    }

    #[tokio::test]
    async fn test_unconfigured_settings_rejected() {
        let service = EmailService::new("http://localhost:9/send".to_string());
        let invite = InvitationEmail::test_probe("check@example.com");

        let err = service
            .send_invitation(None, &invite, "http://localhost:5173")
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::EmailNotConfigured);

        // Present but incomplete settings are rejected the same way
        let blank = EmailSettings::default();
        let err = service
            .send_invitation(Some(&blank), &invite, "http://localhost:5173")
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::EmailNotConfigured);
    }
}
