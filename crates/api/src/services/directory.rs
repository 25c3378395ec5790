//! HTTP employee directory client.
//!
//! Pulls the employee feed as JSON from a configured URL. The feed format
//! is a flat array of objects with `email`, `full_name` and optional
//! `photo_url` fields.

use async_trait::async_trait;
use std::time::Duration;
use tracing::debug;

use domain::services::directory::{DirectoryEmployee, DirectoryError, EmployeeDirectory};

use crate::config::DirectoryConfig;

/// Employee directory backed by an HTTP JSON feed.
#[derive(Clone)]
pub struct HttpEmployeeDirectory {
    client: reqwest::Client,
    config: DirectoryConfig,
}

impl HttpEmployeeDirectory {
    /// Creates a new directory client with the given configuration.
    pub fn new(config: DirectoryConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }

    /// Check if directory sync is enabled and configured.
    pub fn is_enabled(&self) -> bool {
        self.config.enabled && !self.config.url.is_empty()
    }
}

#[async_trait]
impl EmployeeDirectory for HttpEmployeeDirectory {
    async fn fetch(&self) -> Result<Vec<DirectoryEmployee>, DirectoryError> {
        if !self.is_enabled() {
            return Err(DirectoryError::Unavailable(
                "Employee directory sync is disabled".to_string(),
            ));
        }

        let response = self
            .client
            .get(&self.config.url)
            .timeout(Duration::from_millis(self.config.timeout_ms))
            .send()
            .await
            .map_err(|err| DirectoryError::Unavailable(err.to_string()))?;

        if !response.status().is_success() {
            return Err(DirectoryError::Unavailable(format!(
                "Directory feed returned {}",
                response.status()
            )));
        }

        let employees = response
            .json::<Vec<DirectoryEmployee>>()
            .await
            .map_err(|err| DirectoryError::InvalidPayload(err.to_string()))?;

        debug!(employees = employees.len(), "Fetched employee feed");
        Ok(employees)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_disabled_by_default() {
        let directory = HttpEmployeeDirectory::new(DirectoryConfig::default());
        assert!(!directory.is_enabled());
    }

    #[test]
    fn test_enabled_requires_url() {
        let directory = HttpEmployeeDirectory::new(DirectoryConfig {
            enabled: true,
            url: String::new(),
            timeout_ms: 1000,
        });
        assert!(!directory.is_enabled());
    }

    #[tokio::test]
    async fn test_fetch_when_disabled_is_unavailable() {
        let directory = HttpEmployeeDirectory::new(DirectoryConfig::default());
        let err = directory.fetch().await.unwrap_err();
        assert!(matches!(err, DirectoryError::Unavailable(_)));
    }

    #[test]
    fn test_feed_payload_shape() {
        let payload = r#"[
            {"email": "alice@example.com", "full_name": "Alice"},
            {"email": "bob@example.com", "full_name": "Bob", "photo_url": "https://cdn.example.com/bob.png"}
        ]"#;
        let employees: Vec<DirectoryEmployee> = serde_json::from_str(payload).unwrap();
        assert_eq!(employees.len(), 2);
        assert_eq!(employees[0].photo_url, None);
        assert_eq!(
            employees[1].photo_url.as_deref(),
            Some("https://cdn.example.com/bob.png")
        );
    }
}
