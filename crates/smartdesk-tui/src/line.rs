//! Line-mode client: one prompt per line on stdin, replies on stdout.

use std::io::{Stdout, Write};
use std::sync::Arc;

use anyhow::Result;
use smartdesk_core::{
    check_health, ActivityRecord, ChatMessage, ConversationSession, DeskClient, Scenario,
    SessionView,
};
use tokio::io::{AsyncBufReadExt, BufReader};

const DEFAULT_USER_ID: &str = "demo-user";

/// Prints turns and activity records as they arrive
pub struct ConsoleView<W: Write> {
    out: W,
}

impl<W: Write> ConsoleView<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    #[cfg(test)]
    fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> SessionView for ConsoleView<W> {
    fn append_turn(&mut self, turn: &ChatMessage) {
        let _ = writeln!(self.out, "\n[{}] {}", turn.role.label(), turn.content);
    }

    fn append_log_entry(&mut self, record: &ActivityRecord) {
        let details = record.details();
        let mut lines = details.lines();
        let first = lines.next().unwrap_or_default();
        let _ = writeln!(self.out, " - {}: {}", record.label(), first);
        for line in lines {
            let _ = writeln!(self.out, "   {}", line);
        }
    }

    fn clear_log(&mut self) {
        let _ = writeln!(self.out, "(activity log cleared)");
    }

    fn alert(&mut self, message: &str) {
        let _ = writeln!(self.out, "[!] {}", message);
    }
}

#[derive(Debug, PartialEq, Eq)]
enum LineCommand<'a> {
    Quit,
    ClearLog,
    Send(&'a str),
}

fn parse_line(line: &str) -> LineCommand<'_> {
    let line = line.trim();
    if line.eq_ignore_ascii_case("quit") || line.eq_ignore_ascii_case("exit") {
        LineCommand::Quit
    } else if line.eq_ignore_ascii_case("/clear") {
        LineCommand::ClearLog
    } else {
        LineCommand::Send(line)
    }
}

fn prompt(text: &str) -> Result<()> {
    print!("{}", text);
    std::io::stdout().flush()?;
    Ok(())
}

pub async fn run(
    client: DeskClient,
    user_id: Option<String>,
    scenario: Option<Scenario>,
) -> Result<()> {
    println!("SmartDesk CLI ({})", client.base_url());
    let status = check_health(&client).await;
    println!("Backend: {}", status.label());

    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    let user_id = match user_id.filter(|id| !id.trim().is_empty()) {
        Some(id) => id,
        None => {
            prompt("Enter your user id (e.g. jv-123): ")?;
            lines
                .next_line()
                .await?
                .map(|line| line.trim().to_string())
                .filter(|line| !line.is_empty())
                .unwrap_or_else(|| DEFAULT_USER_ID.to_string())
        }
    };

    println!("Type 'quit' to exit, '/clear' to clear the activity log.\n");

    let mut session = ConversationSession::new(Arc::new(client));
    let mut view = ConsoleView::new(std::io::stdout());

    if let Some(scenario) = scenario {
        println!("> {}", scenario.prompt());
        send(&mut session, &user_id, scenario.prompt(), &mut view).await;
    }

    loop {
        prompt("> ")?;
        let Some(line) = lines.next_line().await? else {
            break;
        };

        match parse_line(&line) {
            LineCommand::Quit => break,
            LineCommand::ClearLog => session.clear_activity_log(&mut view),
            LineCommand::Send(message) => send(&mut session, &user_id, message, &mut view).await,
        }
    }

    Ok(())
}

async fn send(
    session: &mut ConversationSession<DeskClient>,
    user_id: &str,
    message: &str,
    view: &mut ConsoleView<Stdout>,
) {
    // Validation failures were already reported through the view
    if session.send_turn(user_id, message, view).await.is_ok() {
        let _ = writeln!(view.out, "\n{}\n", "-".repeat(40));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_console_view_output() {
        let mut view = ConsoleView::new(Vec::new());
        view.append_turn(&ChatMessage::user("hello"));
        view.append_turn(&ChatMessage::assistant("hi"));
        view.append_log_entry(&ActivityRecord::new("lookup_user", json!({"found": true})));
        view.append_log_entry(&ActivityRecord::new("note", json!("plain text")));
        view.alert("Please enter both User ID and message");

        let out = String::from_utf8(view.into_inner()).unwrap();
        assert_eq!(
            out,
            "\n[You] hello\n\n[Assistant] hi\n - lookup user: {\n     \"found\": true\n   }\n - note: plain text\n[!] Please enter both User ID and message\n"
        );
    }

    #[test]
    fn test_quit_words_ignore_case() {
        assert_eq!(parse_line("quit"), LineCommand::Quit);
        assert_eq!(parse_line("  EXIT "), LineCommand::Quit);
        assert_eq!(parse_line("Quit"), LineCommand::Quit);
        assert_eq!(parse_line("/Clear"), LineCommand::ClearLog);
        assert_eq!(parse_line(" quit now "), LineCommand::Send("quit now"));
        assert_eq!(parse_line(""), LineCommand::Send(""));
    }
}
