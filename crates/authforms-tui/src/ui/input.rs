//! Keyboard input handling for the TUI.
//!
//! This module handles all keyboard events and translates them into
//! application state changes. Pressing Enter on a form's button is the
//! submission event; nothing else sends a request.

use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent};

use crate::app::{can_add_email_char, can_add_password_char, App, AppState, FieldFocus, Page};

/// Handle keyboard input. Returns true if the app should quit.
pub fn handle_input(app: &mut App, key: KeyEvent) -> Result<bool> {
    // Handle help overlay
    if matches!(app.state, AppState::ShowingHelp) {
        if matches!(key.code, KeyCode::Esc | KeyCode::Char('?') | KeyCode::Char('q')) {
            app.state = AppState::Normal;
        }
        return Ok(false);
    }

    match key.code {
        KeyCode::Esc => {
            app.state = AppState::Quitting;
            return Ok(true);
        }
        KeyCode::F(2) => {
            app.switch_page(Page::Register);
            return Ok(false);
        }
        KeyCode::F(3) => {
            app.switch_page(Page::Login);
            return Ok(false);
        }
        _ => {}
    }

    if app.active_form().is_some() {
        handle_form_input(app, key);
    } else {
        handle_landing_input(app, key);
    }
    Ok(false)
}

fn handle_landing_input(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('?') => app.state = AppState::ShowingHelp,
        KeyCode::Char('r') => app.switch_page(Page::Register),
        KeyCode::Char('l') => app.switch_page(Page::Login),
        KeyCode::Char('q') => app.state = AppState::Quitting,
        _ => {}
    }
}

fn handle_form_input(app: &mut App, key: KeyEvent) {
    let Some(form) = app.active_form_mut() else {
        return;
    };

    match key.code {
        KeyCode::Down | KeyCode::Tab => {
            form.focus = form.focus.next();
        }
        KeyCode::Up | KeyCode::BackTab => {
            form.focus = form.focus.prev();
        }
        KeyCode::Enter => match form.focus {
            FieldFocus::Email => form.focus = FieldFocus::Password,
            FieldFocus::Password => form.focus = FieldFocus::Button,
            FieldFocus::Button => app.submit_active_form(),
        },
        KeyCode::Backspace => match form.focus {
            FieldFocus::Email => {
                form.email.pop();
            }
            FieldFocus::Password => {
                form.password.pop();
            }
            FieldFocus::Button => {}
        },
        KeyCode::Char('?') if form.focus == FieldFocus::Button => {
            app.state = AppState::ShowingHelp;
        }
        KeyCode::Char(c) => match form.focus {
            FieldFocus::Email => {
                if can_add_email_char(form.email.chars().count(), c) {
                    form.email.push(c);
                }
            }
            FieldFocus::Password => {
                if can_add_password_char(form.password.chars().count(), c) {
                    form.password.push(c);
                }
            }
            FieldFocus::Button => {}
        },
        _ => {}
    }
}
