//! Connectivity monitor: reduces `GET /health` to a connection status.

use tracing::{info, warn};

use crate::api::ChatBackend;
use crate::error::DeskError;
use crate::state::ConnectionStatus;

/// Run one health check. Never fails; problems are logged and folded into
/// the returned status.
pub async fn check_health<B: ChatBackend + ?Sized>(backend: &B) -> ConnectionStatus {
    match backend.health().await {
        Ok(report) if report.is_ok() => {
            info!(environment = ?report.environment, "backend healthy");
            ConnectionStatus::Connected {
                environment: report.environment,
            }
        }
        Ok(report) => {
            let err = DeskError::HealthCheck(report.status_text());
            warn!(error = %err, "health check failed");
            ConnectionStatus::ApiError
        }
        Err(err @ DeskError::Http { .. }) => {
            warn!(error = %err, "health check failed");
            ConnectionStatus::ApiError
        }
        Err(err) => {
            warn!(error = %err, "health check failed");
            ConnectionStatus::Disconnected
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{ChatReply, ChatRequest, HealthReport};
    use crate::error::DeskResult;
    use async_trait::async_trait;
    use reqwest::StatusCode;

    struct FakeHealth(fn() -> DeskResult<HealthReport>);

    #[async_trait]
    impl ChatBackend for FakeHealth {
        async fn health(&self) -> DeskResult<HealthReport> {
            (self.0)()
        }

        async fn chat(&self, _request: &ChatRequest) -> DeskResult<ChatReply> {
            unreachable!("monitor never chats")
        }
    }

    fn report(status: &str) -> HealthReport {
        HealthReport {
            status: Some(serde_json::Value::from(status)),
            environment: Some("development".to_string()),
            azure_configured: Some(true),
        }
    }

    #[tokio::test]
    async fn test_ok_is_connected() {
        let status = check_health(&FakeHealth(|| Ok(report("ok")))).await;
        assert!(status.is_connected());
        assert_eq!(
            status,
            ConnectionStatus::Connected {
                environment: Some("development".to_string())
            }
        );
    }

    #[tokio::test]
    async fn test_other_status_is_api_error() {
        let status = check_health(&FakeHealth(|| Ok(report("degraded")))).await;
        assert!(!status.is_connected());
        assert_eq!(status.label(), "API Error");
    }

    #[tokio::test]
    async fn test_http_failure_is_api_error() {
        let status = check_health(&FakeHealth(|| {
            Err(DeskError::Http {
                status: StatusCode::INTERNAL_SERVER_ERROR,
            })
        }))
        .await;
        assert_eq!(status, ConnectionStatus::ApiError);
    }

    #[tokio::test]
    async fn test_malformed_body_is_disconnected() {
        let status = check_health(&FakeHealth(|| {
            Err(serde_json::from_str::<HealthReport>("<html>").unwrap_err().into())
        }))
        .await;
        assert_eq!(status, ConnectionStatus::Disconnected);
        assert!(!status.is_connected());
    }
}
