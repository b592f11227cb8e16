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

use crate::config::PanelConfig;
use crate::discovery::{self, DiscoveryMethod};
use crate::export::Exporter;
use crate::nav::{NavState, View};
use crate::pin::{Attribute, Direction, Edge, PinController, PinState};
use crate::system::read_board_model;

pub const DIRECTION_CHOICES: [&str; 2] = ["IN", "OUT"];
pub const VALUE_CHOICES: [&str; 2] = ["0", "1"];
pub const ACTIVE_LOW_CHOICES: [&str; 2] = ["Off", "On"];
pub const EDGE_CHOICES: [&str; 4] = ["Rising", "Falling", "Both", "None"];
const EDGE_ORDER: [Edge; 4] = [Edge::Rising, Edge::Falling, Edge::Both, Edge::None];

pub const LIST_HELP: &str = "↑/↓: move | Enter: open | r: refresh | q: quit";
pub const DETAIL_HELP: &str =
    "↑/↓: field | ←/→: choice | Enter: apply | n/p: next/prev pin | r: refresh | Esc: back | q: quit";

pub fn choices_for(attr: Attribute) -> &'static [&'static str] {
    match attr {
        Attribute::Direction => &DIRECTION_CHOICES,
        Attribute::Value => &VALUE_CHOICES,
        Attribute::ActiveLow => &ACTIVE_LOW_CHOICES,
        Attribute::Edge => &EDGE_CHOICES,
    }
}

fn choices_from_state(st: &PinState) -> [usize; 4] {
    [
        match st.direction {
            Direction::In => 0,
            Direction::Out => 1,
        },
        usize::from(st.value),
        usize::from(st.active_low),
        EDGE_ORDER.iter().position(|e| *e == st.edge).unwrap_or(3),
    ]
}

pub struct App {
    pub pins: Vec<PinController>,
    pub nav: NavState,
    pub status: String,
    pub board: String,
    pub method: Option<DiscoveryMethod>,
    // detail view: focused action row and the choice shown on each row
    pub action_row: usize,
    pub choices: [usize; 4],
}

impl App {
    /// Discover, export and open every usable pin. Runs once.
    pub fn new(cfg: &PanelConfig) -> Self {
        let found = discovery::discover_with_config(cfg);
        let exported = Exporter::from_config(cfg).export_all(&found.candidates);
        let pins = exported
            .into_iter()
            .filter_map(|c| PinController::open(c.number, c.label, &cfg.gpio_root).ok())
            .collect();
        let mut app = Self::from_pins(pins);
        app.method = Some(found.method);
        app.board = read_board_model();
        app.status = app.summary();
        app
    }

    pub fn from_pins(pins: Vec<PinController>) -> Self {
        let nav = NavState::new(pins.len());
        let mut app = Self {
            pins,
            nav,
            status: String::new(),
            board: String::new(),
            method: None,
            action_row: 0,
            choices: [0, 0, 0, 3],
        };
        app.sync_choices();
        app.status = app.summary();
        app
    }

    fn summary(&self) -> String {
        if self.pins.is_empty() {
            return "No GPIO pins found".to_string();
        }
        format!("{} pin(s)", self.pins.len())
    }

    pub fn pin_count(&self) -> usize {
        self.pins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pins.is_empty()
    }

    pub fn labels(&self) -> Vec<String> {
        self.pins.iter().map(|p| p.label().to_string()).collect()
    }

    pub fn selected_pin(&self) -> Option<&PinController> {
        self.nav.selected().and_then(|i| self.pins.get(i))
    }

    fn selected_pin_mut(&mut self) -> Option<&mut PinController> {
        let i = self.nav.selected()?;
        self.pins.get_mut(i)
    }

    pub fn help(&self) -> &'static str {
        match self.nav.view() {
            View::List => LIST_HELP,
            View::Detail => DETAIL_HELP,
        }
    }

    /// Reset the detail-view choices to what the selected pin reports.
    pub fn sync_choices(&mut self) {
        if let Some(pin) = self.selected_pin() {
            self.choices = choices_from_state(&pin.current_state());
        }
    }

    pub fn activate(&mut self, index: usize) {
        if self.nav.activate(index) {
            self.action_row = 0;
            self.sync_choices();
        }
    }

    pub fn next_pin(&mut self) {
        self.nav.next();
        self.sync_choices();
    }

    pub fn previous_pin(&mut self) {
        self.nav.previous();
        self.sync_choices();
    }

    pub fn back(&mut self) {
        self.nav.back();
    }

    pub fn action_up(&mut self) {
        self.action_row = (self.action_row + Attribute::ALL.len() - 1) % Attribute::ALL.len();
    }

    pub fn action_down(&mut self) {
        self.action_row = (self.action_row + 1) % Attribute::ALL.len();
    }

    pub fn focused_attribute(&self) -> Attribute {
        Attribute::ALL[self.action_row % Attribute::ALL.len()]
    }

    pub fn choice_left(&mut self) {
        let n = choices_for(self.focused_attribute()).len();
        let c = &mut self.choices[self.action_row];
        *c = (*c + n - 1) % n;
    }

    pub fn choice_right(&mut self) {
        let n = choices_for(self.focused_attribute()).len();
        let c = &mut self.choices[self.action_row];
        *c = (*c + 1) % n;
    }

    /// Store the focused row's choice on the selected pin.
    pub fn apply_action(&mut self) {
        let attr = self.focused_attribute();
        let choice = self.choices[self.action_row];
        let Some(pin) = self.selected_pin_mut() else { return };
        let written = match attr {
            Attribute::Direction => {
                pin.set_direction(if choice == 1 { Direction::Out } else { Direction::In })
            }
            Attribute::Value => pin.set_value(choice == 1),
            Attribute::ActiveLow => pin.set_active_low(choice == 1),
            Attribute::Edge => pin.set_edge(EDGE_ORDER[choice.min(EDGE_ORDER.len() - 1)]),
        };
        let number = pin.number();
        self.status = if written {
            format!("gpio{}: wrote {}", number, attr.file_name())
        } else {
            format!("gpio{}: could not write {}", number, attr.file_name())
        };
        self.sync_choices();
    }

    /// Re-read the selected pin's attribute files.
    pub fn refresh_selected(&mut self) {
        if let Some(pin) = self.selected_pin_mut() {
            pin.refresh();
            let number = pin.number();
            self.status = format!("gpio{}: refreshed", number);
        }
        self.sync_choices();
    }
}
