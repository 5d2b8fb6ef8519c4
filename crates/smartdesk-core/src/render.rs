//! View-side projection of a conversation.
//!
//! The session never touches a concrete UI. It calls into a [`SessionView`],
//! and each front end decides how a turn or an activity record is drawn.

use crate::state::{ActivityRecord, ChatMessage, ChatRole};

pub const WELCOME_TEXT: &str =
    "Welcome to SmartDesk! Ask about password resets, PTO balances or your account status.";
pub const LOG_PLACEHOLDER_TEXT: &str = "Agent activities will appear here...";

/// Callback surface the conversation session renders through.
pub trait SessionView {
    fn append_turn(&mut self, turn: &ChatMessage);

    fn append_log_entry(&mut self, record: &ActivityRecord);

    fn clear_log(&mut self) {}

    /// Blocking, user-facing notice (validation failures).
    fn alert(&mut self, _message: &str) {}

    fn set_processing(&mut self, _processing: bool) {}

    fn clear_input(&mut self) {}
}

/// One rendered transcript block
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TurnBlock {
    pub role: ChatRole,
    pub label: &'static str,
    pub content: String,
}

/// One rendered activity block
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogBlock {
    pub label: String,
    pub details: String,
    pub is_error: bool,
}

/// Scrollable transcript region with its welcome placeholder.
#[derive(Debug, Default)]
pub struct TranscriptPane {
    blocks: Vec<TurnBlock>,
    /// Set on every append; the drawing code scrolls to the newest block and
    /// resets it.
    pub follow_tail: bool,
}

impl TranscriptPane {
    pub fn push(&mut self, turn: &ChatMessage) {
        self.blocks.push(TurnBlock {
            role: turn.role,
            label: turn.role.label(),
            content: turn.content.clone(),
        });
        self.follow_tail = true;
    }

    pub fn blocks(&self) -> &[TurnBlock] {
        &self.blocks
    }

    /// The welcome placeholder only shows until the first turn arrives.
    pub fn shows_welcome(&self) -> bool {
        self.blocks.is_empty()
    }
}

/// Activity log region; clearing it restores the placeholder.
#[derive(Debug, Default)]
pub struct ActivityPane {
    blocks: Vec<LogBlock>,
    pub follow_tail: bool,
}

impl ActivityPane {
    pub fn push(&mut self, record: &ActivityRecord) {
        self.blocks.push(LogBlock {
            label: record.label(),
            details: record.details(),
            is_error: record.is_error(),
        });
        self.follow_tail = true;
    }

    pub fn clear(&mut self) {
        self.blocks.clear();
        self.follow_tail = false;
    }

    pub fn blocks(&self) -> &[LogBlock] {
        &self.blocks
    }

    pub fn shows_placeholder(&self) -> bool {
        self.blocks.is_empty()
    }
}

/// In-memory view shared by the full-screen UI and the tests.
#[derive(Debug, Default)]
pub struct PaneView {
    pub transcript: TranscriptPane,
    pub activity: ActivityPane,
    pub alert: Option<String>,
    pub processing: bool,
    pub input_cleared: bool,
}

impl SessionView for PaneView {
    fn append_turn(&mut self, turn: &ChatMessage) {
        self.transcript.push(turn);
    }

    fn append_log_entry(&mut self, record: &ActivityRecord) {
        self.activity.push(record);
    }

    fn clear_log(&mut self) {
        self.activity.clear();
    }

    fn alert(&mut self, message: &str) {
        self.alert = Some(message.to_string());
    }

    fn set_processing(&mut self, processing: bool) {
        self.processing = processing;
    }

    fn clear_input(&mut self) {
        self.input_cleared = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_welcome_removed_after_first_turn() {
        let mut pane = TranscriptPane::default();
        assert!(pane.shows_welcome());

        pane.push(&ChatMessage::user("hello"));
        assert!(!pane.shows_welcome());
        assert!(pane.follow_tail);
        assert_eq!(pane.blocks()[0].label, "You");
    }

    #[test]
    fn test_activity_block_projection() {
        let mut pane = ActivityPane::default();
        pane.push(&ActivityRecord::new("lookup_user", json!({"found": true})));

        let block = &pane.blocks()[0];
        assert_eq!(block.label, "lookup user");
        assert_eq!(block.details, "{\n  \"found\": true\n}");
        assert!(!block.is_error);
    }

    #[test]
    fn test_clear_restores_placeholder() {
        let mut view = PaneView::default();
        view.append_turn(&ChatMessage::user("hi"));
        view.append_log_entry(&ActivityRecord::new("error", json!({"error": "x"})));
        assert!(!view.activity.shows_placeholder());
        assert!(view.activity.blocks()[0].is_error);

        view.clear_log();
        assert!(view.activity.shows_placeholder());
        assert_eq!(view.transcript.blocks().len(), 1);
    }
}
