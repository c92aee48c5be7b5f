//! Keyboard and mouse dispatch.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseEvent, MouseEventKind};

use crate::app::{App, ConfirmFocus, SelectingFocus, SubtopicChoice};
use crate::session::TopicStage;

/// Actions that need the generator and therefore run in the main loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Quit,
    ConfirmTopic,
    ApplyChoice,
    MoreSubtopics,
    ConfirmSubtopic,
}

/// Handle a key event, mutating app state directly for local edits and
/// returning an [`Action`] when the main loop has work to do.
pub fn handle_key(app: &mut App, key: KeyEvent) -> Option<Action> {
    // The help modal swallows everything except its own close keys
    if app.show_help {
        if key.code == KeyCode::Char('?') || key.code == KeyCode::Esc {
            app.show_help = false;
        }
        return None;
    }

    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        return Some(Action::Quit);
    }

    // '?' and 'q' act globally except while typing a custom topic, where
    // both are ordinary characters
    let typing = app.session.stage == TopicStage::Selecting
        && app.selecting_focus == SelectingFocus::CustomInput;
    if !typing {
        if key.code == KeyCode::Char('?') {
            app.show_help = true;
            return None;
        }
        if key.code == KeyCode::Char('q') {
            return Some(Action::Quit);
        }
    }

    match app.session.stage {
        TopicStage::Selecting => handle_selecting_key(app, key),
        TopicStage::Confirm => handle_confirm_key(app, key),
        TopicStage::Generate => {
            handle_report_key(app, key);
            None
        }
    }
}

fn handle_selecting_key(app: &mut App, key: KeyEvent) -> Option<Action> {
    match key.code {
        KeyCode::Tab => {
            app.selecting_focus = app.selecting_focus.next();
            return None;
        }
        KeyCode::BackTab => {
            app.selecting_focus = app.selecting_focus.prev();
            return None;
        }
        _ => {}
    }

    match app.selecting_focus {
        SelectingFocus::TrendingList => match key.code {
            KeyCode::Char('k') | KeyCode::Up => app.trending_prev(),
            KeyCode::Char('j') | KeyCode::Down => app.trending_next(),
            KeyCode::Char(' ') | KeyCode::Enter => app.mark_trending(),
            _ => {}
        },
        SelectingFocus::CustomInput => match key.code {
            KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                app.insert_char(c);
            }
            KeyCode::Backspace => app.delete_char_before(),
            KeyCode::Delete => app.delete_char_at(),
            KeyCode::Left => app.cursor_left(),
            KeyCode::Right => app.cursor_right(),
            KeyCode::Home => app.cursor_home(),
            KeyCode::End => app.cursor_end(),
            KeyCode::Enter => app.selecting_focus = SelectingFocus::ConfirmButton,
            _ => {}
        },
        SelectingFocus::ConfirmButton => {
            if key.code == KeyCode::Enter || key.code == KeyCode::Char(' ') {
                return Some(Action::ConfirmTopic);
            }
        }
    }

    None
}

fn handle_confirm_key(app: &mut App, key: KeyEvent) -> Option<Action> {
    let panel_open = app.applied_choice == Some(SubtopicChoice::GenerateSubtopics)
        && app.session.show_subtopic_section;
    if !panel_open {
        app.confirm_focus = ConfirmFocus::ChoiceList;
    }

    if key.code == KeyCode::Tab || key.code == KeyCode::BackTab {
        if panel_open {
            app.confirm_focus = app.confirm_focus.toggle();
        }
        return None;
    }

    match app.confirm_focus {
        ConfirmFocus::ChoiceList => match key.code {
            KeyCode::Char('k') | KeyCode::Up => app.choice_prev(),
            KeyCode::Char('j') | KeyCode::Down => app.choice_next(),
            KeyCode::Enter => return Some(Action::ApplyChoice),
            _ => {}
        },
        ConfirmFocus::SubtopicList => match key.code {
            KeyCode::Char('k') | KeyCode::Up => app.subtopic_prev(),
            KeyCode::Char('j') | KeyCode::Down => app.subtopic_next(),
            KeyCode::Char('m') => return Some(Action::MoreSubtopics),
            KeyCode::Enter => return Some(Action::ConfirmSubtopic),
            _ => {}
        },
    }

    None
}

fn handle_report_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('k') | KeyCode::Up => {
            app.scroll_up(1);
        }
        KeyCode::Char('j') | KeyCode::Down => {
            app.scroll_down(1);
        }
        KeyCode::Char('u') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            let half_page = app.main_pane_height / 2;
            app.scroll_up(half_page);
        }
        KeyCode::Char('d') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            let half_page = app.main_pane_height / 2;
            app.scroll_down(half_page);
        }
        KeyCode::Char('b') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            app.scroll_up(app.main_pane_height);
        }
        KeyCode::Char('f') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            app.scroll_down(app.main_pane_height);
        }
        _ => {}
    }
}

/// Handle a mouse event. Wheel scrolling only applies to the report page.
pub fn handle_mouse(app: &mut App, mouse: MouseEvent) {
    if app.session.stage != TopicStage::Generate {
        return;
    }
    match mouse.kind {
        MouseEventKind::ScrollUp => {
            app.scroll_up(3);
        }
        MouseEventKind::ScrollDown => {
            app.scroll_down(3);
        }
        _ => {}
    }
}
