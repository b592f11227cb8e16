/*
 * This file is part of gpiopanel.
 *
 * Copyright (C) 2025 gpiopanel contributors
 *
 * gpiopanel is free software: you can redistribute it and/or modify
 * it under the terms of the GNU General Public License as published by
 * the Free Software Foundation, either version 3 of the License, or
 * (at your option) any later version.
 *
 * gpiopanel is distributed in the hope that it will be useful,
 * but WITHOUT ANY WARRANTY; without even the implied warranty of
 * MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
 * GNU General Public License for more details.
 *
 * You should have received a copy of the GNU General Public License
 * along with gpiopanel. If not, see <https://www.gnu.org/licenses/>.
 */

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::app::App;
use crate::nav::View;

/// Decode one key press. Returns Ok(true) when the panel should exit.
pub fn handle_key_event(app: &mut App, key_event: KeyEvent) -> anyhow::Result<bool> {
    let KeyEvent { code, modifiers, kind, .. } = key_event;

    // Windows terminals also report releases
    if kind == KeyEventKind::Release {
        return Ok(false);
    }

    if modifiers.contains(KeyModifiers::CONTROL) && code == KeyCode::Char('c') {
        return Ok(true);
    }

    match app.nav.view() {
        View::List => handle_list_events(app, code),
        View::Detail => handle_detail_events(app, code),
    }
}

fn handle_list_events(app: &mut App, code: KeyCode) -> anyhow::Result<bool> {
    match code {
        KeyCode::Char('q') | KeyCode::Esc => return Ok(true),
        KeyCode::Up | KeyCode::Char('k') => app.previous_pin(),
        KeyCode::Down | KeyCode::Char('j') => app.next_pin(),
        KeyCode::Enter => {
            let cursor = app.nav.cursor();
            app.activate(cursor);
        }
        KeyCode::Char('r') => app.refresh_selected(),
        _ => {}
    }
    Ok(false)
}

fn handle_detail_events(app: &mut App, code: KeyCode) -> anyhow::Result<bool> {
    match code {
        KeyCode::Char('q') => return Ok(true),
        KeyCode::Esc | KeyCode::Backspace | KeyCode::Char('b') => app.back(),
        KeyCode::Up | KeyCode::Char('k') => app.action_up(),
        KeyCode::Down | KeyCode::Char('j') => app.action_down(),
        KeyCode::Left | KeyCode::Char('h') => app.choice_left(),
        KeyCode::Right | KeyCode::Char('l') => app.choice_right(),
        KeyCode::Enter | KeyCode::Char(' ') => app.apply_action(),
        KeyCode::Tab | KeyCode::Char('n') => app.next_pin(),
        KeyCode::BackTab | KeyCode::Char('p') => app.previous_pin(),
        KeyCode::Char('r') => app.refresh_selected(),
        _ => {}
    }
    Ok(false)
}
