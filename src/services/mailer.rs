// src/services/mailer.rs
// DOCUMENTATION: File-based mail backend
// PURPOSE: Deliver confirmation codes by writing one message file per mail

use crate::errors::YamdbError;
use chrono::Utc;
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// Writes outgoing mail to a directory instead of an SMTP server
/// DOCUMENTATION: The deployment mounts this directory so operators can read
/// the codes; swap for SMTP if real delivery is needed
#[derive(Debug, Clone)]
pub struct FileMailer {
    dir: PathBuf,
    from: String,
}

impl FileMailer {
    pub fn new(dir: impl Into<PathBuf>, from: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            from: from.into(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Write a single message and return the file it landed in
    pub async fn send(&self, to: &str, subject: &str, body: &str) -> Result<PathBuf, YamdbError> {
        tokio::fs::create_dir_all(&self.dir).await.map_err(|e| {
            log::error!("Cannot create mail directory {}: {}", self.dir.display(), e);
            YamdbError::InternalError(format!("Mail delivery failed: {}", e))
        })?;

        let now = Utc::now();
        let file_name = format!(
            "{}-{}.log",
            now.format("%Y%m%d-%H%M%S"),
            Uuid::new_v4().simple()
        );
        let path = self.dir.join(file_name);

        let message = format!(
            "Content-Type: text/plain; charset=\"utf-8\"\n\
             Subject: {}\n\
             From: {}\n\
             To: {}\n\
             Date: {}\n\
             \n\
             {}\n",
            subject,
            self.from,
            to,
            now.to_rfc2822(),
            body
        );

        tokio::fs::write(&path, message).await.map_err(|e| {
            log::error!("Cannot write mail to {}: {}", path.display(), e);
            YamdbError::InternalError(format!("Mail delivery failed: {}", e))
        })?;

        log::info!("Mail to {} written to {}", to, path.display());
        Ok(path)
    }

    /// Confirmation code message sent on signup
    pub async fn send_confirmation_code(
        &self,
        username: &str,
        email: &str,
        code: &str,
    ) -> Result<PathBuf, YamdbError> {
        let body = format!("{}, ваш код подтверждения {}", username, code);
        self.send(email, "Код подтверждения", &body).await
    }
}
