//! # Email Gateway
//!
//! Outbound email used to deliver daily reports. The pipeline depends on the
//! [`EmailSender`] trait only; [`MailtrapSender`] is the production
//! implementation.

pub mod mailtrap;

use std::path::{Path, PathBuf};

use async_trait::async_trait;

pub use mailtrap::{MailtrapConfig, MailtrapSender};

#[derive(Debug, thiserror::Error)]
pub enum EmailError {
    #[error("unable to read attachment {}: {source}", .path.display())]
    Attachment {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("email transport failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("unable to send email to {to}; error: {response}")]
    Rejected { to: String, response: String },
}

#[async_trait]
pub trait EmailSender: Send + Sync {
    /// Send one HTML email. Each attachment path is read and sent under its
    /// file name.
    async fn send_email(
        &self,
        to: &str,
        subject: &str,
        html_body: &str,
        attachments: &[PathBuf],
    ) -> Result<(), EmailError>;
}

/// Name an attachment is sent under: the final path component
pub(crate) fn attachment_file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
