use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseEvent, MouseEventKind};
use ratatui::layout::Rect;
use smartdesk_core::Scenario;
use crate::app::{App, Focus};
use crate::tui::AppEvent;

const PAGE: i32 = 10;

pub async fn handle_event(app: &mut App, event: AppEvent) -> Result<()> {
    match event {
        AppEvent::Key(key) => handle_key(app, key),
        AppEvent::Mouse(mouse) => handle_mouse(app, mouse),
        AppEvent::Paste(text) => handle_paste(app, &text),
        AppEvent::Resize(_, _) => {}
        AppEvent::Tick => app.tick_animation(),
    }
    app.poll_background().await;
    Ok(())
}

fn handle_key(app: &mut App, key: KeyEvent) {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

    // Global keys that work in any state
    if ctrl && key.code == KeyCode::Char('c') {
        app.should_quit = true;
        return;
    }

    // The alert popup is modal until dismissed
    if app.view.alert.is_some() {
        if matches!(key.code, KeyCode::Enter | KeyCode::Esc | KeyCode::Char(' ')) {
            app.dismiss_alert();
        }
        return;
    }

    match key.code {
        KeyCode::Esc => app.should_quit = true,
        KeyCode::Char('l') if ctrl => app.clear_activity_log(),
        KeyCode::Char('r') if ctrl => app.start_health_check(),
        KeyCode::Tab | KeyCode::BackTab => {
            app.focus = match app.focus {
                Focus::UserId => Focus::Message,
                Focus::Message => Focus::UserId,
            };
        }
        KeyCode::F(n @ 1..=4) => {
            if !app.is_processing() {
                if let Some(&scenario) = Scenario::all().get(n as usize - 1) {
                    app.load_scenario(scenario);
                }
            }
        }
        KeyCode::PageUp => app.scroll_transcript(-PAGE),
        KeyCode::PageDown => app.scroll_transcript(PAGE),
        KeyCode::Up if ctrl => app.scroll_log(-1),
        KeyCode::Down if ctrl => app.scroll_log(1),
        KeyCode::Up => app.scroll_transcript(-1),
        KeyCode::Down => app.scroll_transcript(1),
        KeyCode::Enter => {
            // Input is disabled while a request is in flight
            if !app.is_processing() {
                app.send();
            }
        }
        _ => edit_focused(app, key),
    }
}

fn edit_focused(app: &mut App, key: KeyEvent) {
    if app.is_processing() {
        return;
    }

    let field = match app.focus {
        Focus::UserId => &mut app.user_id,
        Focus::Message => &mut app.message,
    };

    match key.code {
        KeyCode::Backspace => field.backspace(),
        KeyCode::Delete => field.delete(),
        KeyCode::Left => field.left(),
        KeyCode::Right => field.right(),
        KeyCode::Home => field.home(),
        KeyCode::End => field.end(),
        KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => field.insert(c),
        _ => {}
    }
}

fn handle_paste(app: &mut App, text: &str) {
    if app.is_processing() || app.view.alert.is_some() {
        return;
    }
    match app.focus {
        Focus::UserId => app.user_id.insert_str(text),
        Focus::Message => app.message.insert_str(text),
    }
}

/// Check if a point is within a rectangle
fn point_in_rect(x: u16, y: u16, rect: Rect) -> bool {
    x >= rect.x && x < rect.x + rect.width && y >= rect.y && y < rect.y + rect.height
}

fn handle_mouse(app: &mut App, mouse: MouseEvent) {
    let x = mouse.column;
    let y = mouse.row;

    // Position-based scrolling
    let in_transcript = app.transcript_area.map(|r| point_in_rect(x, y, r)).unwrap_or(false);
    let in_log = app.log_area.map(|r| point_in_rect(x, y, r)).unwrap_or(false);

    let delta = match mouse.kind {
        MouseEventKind::ScrollDown => 3,
        MouseEventKind::ScrollUp => -3,
        _ => return,
    };

    if in_log {
        app.scroll_log(delta);
    } else if in_transcript {
        app.scroll_transcript(delta);
    }
}
