use ratatui::layout::Rect;
use smartdesk_core::session::SendOutcome;
use smartdesk_core::{
    check_health, Config, ConnectionStatus, ConversationSession, DeskClient, PaneView, Scenario,
};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    UserId,
    Message,
}

/// Convert a character index to a byte index for UTF-8 safe string operations
fn char_to_byte_index(s: &str, char_idx: usize) -> usize {
    s.char_indices()
        .nth(char_idx)
        .map(|(i, _)| i)
        .unwrap_or(s.len())
}

/// Single-line text input with a character cursor
#[derive(Debug, Default, Clone)]
pub struct InputField {
    pub text: String,
    pub cursor: usize,
}

impl InputField {
    pub fn with_text(text: &str) -> Self {
        Self {
            text: text.to_string(),
            cursor: text.chars().count(),
        }
    }

    pub fn insert(&mut self, c: char) {
        let byte_pos = char_to_byte_index(&self.text, self.cursor);
        self.text.insert(byte_pos, c);
        self.cursor += 1;
    }

    pub fn insert_str(&mut self, s: &str) {
        // Single-line field: pasted newlines become spaces
        for c in s.chars() {
            self.insert(if c == '\n' || c == '\r' { ' ' } else { c });
        }
    }

    pub fn backspace(&mut self) {
        if self.cursor > 0 {
            self.cursor -= 1;
            let byte_pos = char_to_byte_index(&self.text, self.cursor);
            self.text.remove(byte_pos);
        }
    }

    pub fn delete(&mut self) {
        if self.cursor < self.text.chars().count() {
            let byte_pos = char_to_byte_index(&self.text, self.cursor);
            self.text.remove(byte_pos);
        }
    }

    pub fn left(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn right(&mut self) {
        self.cursor = (self.cursor + 1).min(self.text.chars().count());
    }

    pub fn home(&mut self) {
        self.cursor = 0;
    }

    pub fn end(&mut self) {
        self.cursor = self.text.chars().count();
    }

    pub fn set(&mut self, text: &str) {
        *self = Self::with_text(text);
    }

    pub fn clear(&mut self) {
        self.text.clear();
        self.cursor = 0;
    }
}

pub struct App {
    pub should_quit: bool,
    pub focus: Focus,

    // Inputs
    pub user_id: InputField,
    pub message: InputField,

    // Conversation
    pub session: ConversationSession<DeskClient>,
    pub view: PaneView,

    // Connectivity
    pub status: ConnectionStatus,
    pub health_task: Option<JoinHandle<ConnectionStatus>>,

    // Scroll state
    pub transcript_scroll: u16,
    pub log_scroll: u16,

    // Animation state
    pub animation_frame: u8,

    // Panel areas for mouse hit-testing (updated during render)
    pub transcript_area: Option<Rect>,
    pub log_area: Option<Rect>,

    // Last user id written to the config file
    saved_user_id: Option<String>,
}

impl App {
    pub fn new(client: DeskClient, user_id: Option<String>) -> Self {
        let user_id = user_id.unwrap_or_default();
        let focus = if user_id.trim().is_empty() {
            Focus::UserId
        } else {
            Focus::Message
        };

        Self {
            should_quit: false,
            focus,

            user_id: InputField::with_text(&user_id),
            message: InputField::default(),

            session: ConversationSession::new(Arc::new(client)),
            view: PaneView::default(),

            status: ConnectionStatus::Checking,
            health_task: None,

            transcript_scroll: 0,
            log_scroll: 0,

            animation_frame: 0,

            transcript_area: None,
            log_area: None,

            saved_user_id: Some(user_id).filter(|id| !id.is_empty()),
        }
    }

    pub fn base_url(&self) -> &str {
        self.session.backend().base_url()
    }

    pub fn is_processing(&self) -> bool {
        self.session.is_processing()
    }

    /// Run the health check in the background; the result lands on a later tick.
    pub fn start_health_check(&mut self) {
        if self.health_task.is_some() {
            return;
        }
        self.status = ConnectionStatus::Checking;
        let backend = Arc::clone(self.session.backend());
        self.health_task = Some(tokio::spawn(async move { check_health(backend.as_ref()).await }));
    }

    /// Send the current inputs. Busy and invalid sends leave the inputs alone.
    pub fn send(&mut self) {
        let user_id = self.user_id.text.clone();
        let message = self.message.text.clone();

        match self.session.begin_turn(&user_id, &message, &mut self.view) {
            Ok(SendOutcome::Started) => {
                self.remember_user_id(user_id.trim());
            }
            Ok(SendOutcome::Busy) => {}
            Err(e) => debug!(error = %e, "send rejected"),
        }

        if self.view.input_cleared {
            self.message.clear();
            self.view.input_cleared = false;
        }
    }

    pub fn clear_activity_log(&mut self) {
        self.session.clear_activity_log(&mut self.view);
        self.log_scroll = 0;
    }

    pub fn load_scenario(&mut self, scenario: Scenario) {
        self.message.set(scenario.prompt());
        self.focus = Focus::Message;
    }

    pub fn dismiss_alert(&mut self) {
        self.view.alert = None;
    }

    /// Settle whatever finished since the last event: the chat request and
    /// the health check.
    pub async fn poll_background(&mut self) {
        self.session.settle_if_ready(&mut self.view).await;

        if self.health_task.as_ref().is_some_and(|task| task.is_finished()) {
            if let Some(task) = self.health_task.take() {
                self.status = task.await.unwrap_or_else(|e| {
                    warn!(error = %e, "health check task failed");
                    ConnectionStatus::Disconnected
                });
            }
        }
    }

    /// Tick animation frame (called by Tick event)
    pub fn tick_animation(&mut self) {
        if self.is_processing() {
            self.animation_frame = (self.animation_frame + 1) % 3;
        }
    }

    pub fn scroll_transcript(&mut self, delta: i32) {
        self.transcript_scroll = apply_scroll(self.transcript_scroll, delta);
        self.view.transcript.follow_tail = false;
    }

    pub fn scroll_log(&mut self, delta: i32) {
        self.log_scroll = apply_scroll(self.log_scroll, delta);
        self.view.activity.follow_tail = false;
    }

    fn remember_user_id(&mut self, user_id: &str) {
        if self.saved_user_id.as_deref() == Some(user_id) {
            return;
        }
        match Config::save_user_id(user_id) {
            Ok(()) => self.saved_user_id = Some(user_id.to_string()),
            Err(e) => warn!(error = %e, "could not save user id"),
        }
    }
}

fn apply_scroll(current: u16, delta: i32) -> u16 {
    if delta < 0 {
        current.saturating_sub(delta.unsigned_abs().min(u16::MAX as u32) as u16)
    } else {
        current.saturating_add(delta.min(u16::MAX as i32) as u16)
    }
}
