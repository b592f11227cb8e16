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

use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::prelude::*;
use ratatui::widgets::{Block, BorderType, Borders, List, ListItem, ListState, Paragraph, Wrap};

use crate::app::{choices_for, App};
use crate::nav::{NavState, View};
use crate::pin::{Attribute, PinController};

pub const EMPTY_MESSAGE: &str = "No GPIO pins found. Try exporting GPIOs first.";

fn attribute_caption(attr: Attribute) -> &'static str {
    match attr {
        Attribute::Direction => " * Direction       : ",
        Attribute::Value => " * Value           : ",
        Attribute::ActiveLow => " * Active Low      : ",
        Attribute::Edge => " * Edge            : ",
    }
}

/// Text shown in the list view for one pin.
pub fn list_entry(pin: &PinController) -> String {
    format!("{} (gpio{})", pin.label(), pin.number())
}

pub fn ui(f: &mut Frame, app: &App) {
    let size = f.area();
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(5), Constraint::Length(1)])
        .split(size);

    render_header(f, app, chunks[0]);
    match app.nav.view() {
        View::List => render_list(f, &app.pins, &app.nav, chunks[1]),
        View::Detail => render_detail(f, app, &app.nav, chunks[1]),
    }

    let status = Paragraph::new(format!("{}  |  {}", app.status, app.help()))
        .style(Style::default().fg(Color::Gray));
    f.render_widget(status, chunks[2]);
}

fn render_header(f: &mut Frame, app: &App, area: Rect) {
    let mut title = String::from("GPIO");
    if !app.board.is_empty() {
        title.push_str(&format!("  |  {}", app.board));
    }
    if let Some(method) = app.method {
        title.push_str(&format!("  |  source: {}", method.as_str()));
    }
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .title(" gpiopanel ");
    let header = Paragraph::new(title).block(block);
    f.render_widget(header, area);
}

fn render_empty(f: &mut Frame, title: &str, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .title(title.to_string());
    let inner = block.inner(area);
    f.render_widget(block, area);
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage(45),
            Constraint::Length(1),
            Constraint::Min(0),
        ])
        .split(inner);
    let msg = Paragraph::new(EMPTY_MESSAGE)
        .alignment(Alignment::Center)
        .style(Style::default().fg(Color::Yellow));
    f.render_widget(msg, rows[1]);
}

pub fn render_list(f: &mut Frame, pins: &[PinController], nav: &NavState, area: Rect) {
    if pins.is_empty() {
        render_empty(f, " GPIO Menu ", area);
        return;
    }
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .title(format!(" GPIO Menu ({}) ", pins.len()))
        .border_style(Style::default().fg(Color::Cyan));
    let items: Vec<ListItem> = pins.iter().map(|p| ListItem::new(list_entry(p))).collect();
    let mut state = ListState::default();
    state.select(nav.selected());
    let list = List::new(items)
        .block(block)
        .highlight_style(Style::default().bg(Color::Blue).fg(Color::White))
        .highlight_symbol("> ");
    f.render_stateful_widget(list, area, &mut state);
}

pub fn render_detail(f: &mut Frame, app: &App, nav: &NavState, area: Rect) {
    let Some(pin) = nav.selected().and_then(|i| app.pins.get(i)) else {
        render_empty(f, " GPIO Control ", area);
        return;
    };
    let st = pin.current_state();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(6), Constraint::Length(6), Constraint::Min(0)])
        .split(area);

    let status_block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .title(format!(" {} Status (gpio{}, {}/{}) ", pin.label(), pin.number(), nav.cursor() + 1, nav.len()));
    let status_lines = vec![
        Line::from(format!("{}{}", attribute_caption(Attribute::Direction), st.direction.as_sysfs())),
        Line::from(format!("{}{}", attribute_caption(Attribute::Value), st.value_text())),
        Line::from(format!("{}{}", attribute_caption(Attribute::ActiveLow), st.active_low_text())),
        Line::from(format!("{}{}", attribute_caption(Attribute::Edge), st.edge.as_sysfs())),
    ];
    f.render_widget(Paragraph::new(status_lines).block(status_block), chunks[0]);

    let actions_block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .title(" Actions ")
        .border_style(Style::default().fg(Color::Cyan));
    let action_lines: Vec<Line> = Attribute::ALL
        .iter()
        .enumerate()
        .map(|(row, attr)| action_line(*attr, app.choices[row], row == app.action_row))
        .collect();
    f.render_widget(
        Paragraph::new(action_lines).block(actions_block).wrap(Wrap { trim: false }),
        chunks[1],
    );
}

fn action_line(attr: Attribute, chosen: usize, focused: bool) -> Line<'static> {
    let caption_style = if focused {
        Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
    } else {
        Style::default()
    };
    let mut spans = vec![Span::styled(attribute_caption(attr), caption_style)];
    for (i, choice) in choices_for(attr).iter().enumerate() {
        let style = if i == chosen && focused {
            Style::default().bg(Color::Blue).fg(Color::White)
        } else if i == chosen {
            Style::default().add_modifier(Modifier::REVERSED)
        } else {
            Style::default().fg(Color::DarkGray)
        };
        spans.push(Span::styled(format!(" {} ", choice), style));
        spans.push(Span::raw(" "));
    }
    Line::from(spans)
}
