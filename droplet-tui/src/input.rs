use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::app::{App, Screen};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Action {
    None,
    Quit,
    /// Re-fetch the data behind the current screen
    Refresh,
    /// Run `service.submit_photo`(...) for the submit input
    SubmitPhoto,
}

pub(crate) fn handle_key_event(key: KeyEvent, app: &mut App) -> Action {
    use KeyCode::{Backspace, BackTab, Char, Down, Enter, Esc, Tab, Up};

    // Global shortcuts
    if key.code == Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        return Action::Quit;
    }
    if key.code == Tab {
        return switch_to(app, app.screen.next());
    }
    if key.code == BackTab || key.code == Esc {
        return switch_to(app, Screen::Overview);
    }
    if !app.screen.takes_text() && key.modifiers.is_empty() {
        match key.code {
            Char('q') => return Action::Quit,
            Char('r') => return Action::Refresh,
            Char(digit @ '1'..='5') => {
                let index = digit as usize - '1' as usize;
                if let Some(screen) = Screen::ALL.get(index) {
                    return switch_to(app, *screen);
                }
            }
            _ => {}
        }
    }

    let mut action = Action::None;

    match app.screen {
        Screen::Overview => match key.code {
            Up | Char('k') => app.summary_index = app.summary_index.saturating_sub(1),
            Down | Char('j') => {
                if app.summary_index + 1 < app.summaries.len() {
                    app.summary_index += 1;
                }
            }
            _ => {}
        },

        Screen::Readings => match key.code {
            Up | Char('k') => app.readings_index = app.readings_index.saturating_sub(1),
            Down | Char('j') => {
                if app.readings_index + 1 < app.readings.len() {
                    app.readings_index += 1;
                }
            }
            _ => {}
        },

        Screen::Log => match key.code {
            Up | Char('k') => app.log_index = app.log_index.saturating_sub(1),
            Down | Char('j') => {
                if app.log_index + 1 < app.log.len() {
                    app.log_index += 1;
                }
            }
            _ => {}
        },

        Screen::Locate => match key.code {
            Char(character) if is_plain(key.modifiers) => app.locate_input.push(character),
            Backspace => {
                app.locate_input.pop();
            }
            Enter => {
                if app.locate_current_input() {
                    app.error_message = None;
                } else {
                    app.error_message = Some("Enter a position as: latitude, longitude".into());
                }
            }
            _ => {}
        },

        Screen::Submit => match key.code {
            Char(character) if is_plain(key.modifiers) => app.submit_input.push(character),
            Backspace => {
                app.submit_input.pop();
            }
            Enter => action = Action::SubmitPhoto,
            _ => {}
        },
    }
    action
}

fn switch_to(app: &mut App, screen: Screen) -> Action {
    let changed = app.screen != screen;
    app.screen = screen;
    app.error_message = None;
    if changed && screen.shows_data() {
        Action::Refresh
    } else {
        Action::None
    }
}

fn is_plain(modifiers: KeyModifiers) -> bool {
    !modifiers.contains(KeyModifiers::CONTROL) && !modifiers.contains(KeyModifiers::ALT)
}
