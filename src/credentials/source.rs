//! Bearer token resolution.

use std::path::PathBuf;

use crate::config::schema::CredentialConfig;

/// Resolves the outbound bearer token, fresh on every call.
#[derive(Debug, Clone)]
pub struct CredentialSource {
    token_path: PathBuf,
    env_var: String,
}

impl CredentialSource {
    pub fn new(token_path: impl Into<PathBuf>, env_var: impl Into<String>) -> Self {
        Self {
            token_path: token_path.into(),
            env_var: env_var.into(),
        }
    }

    pub fn from_config(config: &CredentialConfig) -> Self {
        Self::new(config.token_path.clone(), config.token_env.clone())
    }

    /// Current token, or an empty string when none is available.
    ///
    /// The file is read first; a non-empty environment override then
    /// replaces whatever the file produced.
    pub async fn resolve(&self) -> String {
        let mut token = self.read_file().await.unwrap_or_default();

        if let Ok(value) = std::env::var(&self.env_var) {
            let value = value.trim();
            if !value.is_empty() {
                token = value.to_string();
            }
        }

        token
    }

    async fn read_file(&self) -> Option<String> {
        let bytes = match tokio::fs::read(&self.token_path).await {
            Ok(bytes) => bytes,
            Err(e) => {
                tracing::debug!(path = ?self.token_path, error = %e, "Token file not readable");
                return None;
            }
        };

        match String::from_utf8(bytes) {
            Ok(content) => {
                let token = content.trim();
                (!token.is_empty()).then(|| token.to_string())
            }
            Err(_) => {
                tracing::debug!(path = ?self.token_path, "Token file is not valid UTF-8");
                None
            }
        }
    }
}
