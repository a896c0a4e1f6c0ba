//! Mailtrap sending API client: https://api-docs.mailtrap.io/docs/mailtrap-api-docs

use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{Deserialize, Serialize};
use tracing::{error, info};

use super::{attachment_file_name, EmailError, EmailSender};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct MailtrapConfig {
    /// Full URL of the send endpoint
    pub host: String,
    /// API token, sent as a bearer credential. A leading `Bearer ` is accepted
    /// and not repeated.
    pub token: String,
    pub from_email: String,
}

#[derive(Debug, Serialize, PartialEq)]
struct Address {
    email: String,
}

#[derive(Debug, Serialize, PartialEq)]
struct Attachment {
    content: String,
    filename: String,
}

#[derive(Debug, Serialize, PartialEq)]
struct EmailPayload {
    from: Address,
    to: Vec<Address>,
    subject: String,
    html: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    attachments: Vec<Attachment>,
}

#[derive(Debug, Deserialize)]
struct SendResponse {
    #[serde(default)]
    success: bool,
}

pub struct MailtrapSender {
    config: MailtrapConfig,
    http: reqwest::Client,
}

impl MailtrapSender {
    pub fn new(config: MailtrapConfig) -> Result<Self, EmailError> {
        let http = reqwest::Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self { config, http })
    }

    async fn build_payload(
        &self,
        to: &str,
        subject: &str,
        html_body: &str,
        attachments: &[PathBuf],
    ) -> Result<EmailPayload, EmailError> {
        let mut encoded = Vec::with_capacity(attachments.len());
        for path in attachments {
            let bytes = tokio::fs::read(path).await.map_err(|source| EmailError::Attachment {
                path: path.clone(),
                source,
            })?;
            encoded.push(Attachment {
                content: STANDARD.encode(bytes),
                filename: attachment_file_name(path),
            });
        }

        Ok(EmailPayload {
            from: Address {
                email: self.config.from_email.clone(),
            },
            to: vec![Address { email: to.to_string() }],
            subject: subject.to_string(),
            html: html_body.to_string(),
            attachments: encoded,
        })
    }
}

/// Token without a leading `Bearer ` scheme, if one was configured
fn bare_token(token: &str) -> &str {
    let trimmed = token.trim();
    match trimmed.get(..7) {
        Some(scheme) if scheme.eq_ignore_ascii_case("bearer ") => trimmed[7..].trim_start(),
        _ => trimmed,
    }
}

#[async_trait]
impl EmailSender for MailtrapSender {
    async fn send_email(
        &self,
        to: &str,
        subject: &str,
        html_body: &str,
        attachments: &[PathBuf],
    ) -> Result<(), EmailError> {
        let payload = self.build_payload(to, subject, html_body, attachments).await?;

        let response = self
            .http
            .post(&self.config.host)
            .bearer_auth(bare_token(&self.config.token))
            .json(&payload)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        let accepted = status.is_success()
            && serde_json::from_str::<SendResponse>(&body)
                .map(|parsed| parsed.success)
                .unwrap_or(false);

        if !accepted {
            error!(%status, recipient = to, "Mailtrap rejected email");
            return Err(EmailError::Rejected {
                to: to.to_string(),
                response: body,
            });
        }

        info!(recipient = to, attachments = attachments.len(), "Email sent");
        Ok(())
    }
}
