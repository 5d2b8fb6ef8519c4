pub mod api;
pub mod config;
pub mod error;
pub mod health;
pub mod render;
pub mod scenario;
pub mod session;
pub mod state;

// Re-export main types for convenience
pub use api::{ChatBackend, ChatReply, ChatRequest, DeskClient, HealthReport};
pub use config::Config;
pub use error::{DeskError, DeskResult};
pub use health::check_health;
pub use render::{PaneView, SessionView};
pub use scenario::Scenario;
pub use session::{ConversationSession, SendOutcome};
pub use state::{ActivityRecord, ChatMessage, ChatRole, ConnectionStatus};
