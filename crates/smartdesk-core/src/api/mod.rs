pub mod client;
pub mod types;

use async_trait::async_trait;

use crate::error::DeskResult;

pub use client::DeskClient;
pub use types::{ChatReply, ChatRequest, HealthReport};

/// The two calls the client makes against a SmartDesk backend.
#[async_trait]
pub trait ChatBackend: Send + Sync {
    /// `GET /health`
    async fn health(&self) -> DeskResult<HealthReport>;

    /// `POST /chat`. Any non-2xx status is an error regardless of body.
    async fn chat(&self, request: &ChatRequest) -> DeskResult<ChatReply>;
}
