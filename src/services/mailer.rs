//! Outbound email seam.

use async_trait::async_trait;
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;
use tracing::info;

use crate::config::{EmailBackend, EmailConfig};

#[derive(Debug, Error)]
pub enum MailError {
    #[error("Mail transport failed: {0}")]
    Transport(String),
}

impl From<std::io::Error> for MailError {
    fn from(err: std::io::Error) -> Self {
        Self::Transport(err.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Email {
    pub from: String,
    pub to: String,
    pub subject: String,
    pub body: String,
}

impl Email {
    #[must_use]
    pub fn confirmation(config: &EmailConfig, to: &str, username: &str, code: &str) -> Self {
        Self {
            from: config.from_address.clone(),
            to: to.to_string(),
            subject: config.subject.clone(),
            body: format!(
                "Hello, {username}!\n\nYour confirmation code: {code}\n\n\
                 Exchange it for an access token at /auth/token/."
            ),
        }
    }
}

#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, email: &Email) -> Result<(), MailError>;
}

/// Logs messages instead of delivering them.
pub struct ConsoleMailer;

#[async_trait]
impl Mailer for ConsoleMailer {
    async fn send(&self, email: &Email) -> Result<(), MailError> {
        info!(
            from = %email.from,
            to = %email.to,
            subject = %email.subject,
            "Email:\n{}",
            email.body
        );
        Ok(())
    }
}

/// Writes each message to its own file in a directory.
pub struct FileMailer {
    dir: PathBuf,
}

impl FileMailer {
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

#[async_trait]
impl Mailer for FileMailer {
    async fn send(&self, email: &Email) -> Result<(), MailError> {
        tokio::fs::create_dir_all(&self.dir).await?;

        let name = format!(
            "{}-{}.log",
            chrono::Utc::now().format("%Y%m%d-%H%M%S"),
            uuid::Uuid::new_v4().simple()
        );
        let path = self.dir.join(name);
        let content = format!(
            "From: {}\nTo: {}\nSubject: {}\n\n{}\n",
            email.from, email.to, email.subject, email.body
        );
        tokio::fs::write(&path, content).await?;

        info!(to = %email.to, path = %path.display(), "Email written to file");
        Ok(())
    }
}

#[must_use]
pub fn from_config(config: &EmailConfig) -> Arc<dyn Mailer> {
    match config.backend {
        EmailBackend::Console => Arc::new(ConsoleMailer),
        EmailBackend::File => Arc::new(FileMailer::new(&config.file_path)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_file_mailer_writes_message() {
        let dir = std::env::temp_dir().join(format!("yamdb-mail-{}", uuid::Uuid::new_v4()));
        let mailer = FileMailer::new(&dir);
        let email = Email::confirmation(&EmailConfig::default(), "a@x.com", "alice", "abc-123");

        mailer.send(&email).await.unwrap();

        let mut entries = std::fs::read_dir(&dir).unwrap();
        let path = entries.next().unwrap().unwrap().path();
        let content = std::fs::read_to_string(path).unwrap();
        assert!(content.contains("To: a@x.com"));
        assert!(content.contains("abc-123"));

        std::fs::remove_dir_all(&dir).ok();
    }
}
