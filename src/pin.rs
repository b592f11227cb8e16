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

use std::path::{Path, PathBuf};

use serde_json::json;

use crate::logger;
use crate::sysfs::{is_exported, pin_dir, read_trimmed, write_attr, GpioError};

#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
pub enum Direction {
    #[default]
    In,
    Out,
}

impl Direction {
    pub fn as_sysfs(&self) -> &'static str {
        match self {
            Direction::In => "in",
            Direction::Out => "out",
        }
    }

    pub fn from_sysfs(s: &str) -> Option<Self> {
        match s {
            "in" => Some(Direction::In),
            // "high"/"low" are write-only aliases, reads always give "out"
            "out" => Some(Direction::Out),
            _ => None,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
pub enum Edge {
    #[default]
    None,
    Rising,
    Falling,
    Both,
}

impl Edge {
    pub fn as_sysfs(&self) -> &'static str {
        match self {
            Edge::None => "none",
            Edge::Rising => "rising",
            Edge::Falling => "falling",
            Edge::Both => "both",
        }
    }

    pub fn from_sysfs(s: &str) -> Option<Self> {
        match s {
            "none" => Some(Edge::None),
            "rising" => Some(Edge::Rising),
            "falling" => Some(Edge::Falling),
            "both" => Some(Edge::Both),
            _ => None,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Attribute {
    Direction,
    Value,
    ActiveLow,
    Edge,
}

impl Attribute {
    pub const ALL: [Attribute; 4] = [
        Attribute::Direction,
        Attribute::Value,
        Attribute::ActiveLow,
        Attribute::Edge,
    ];

    pub fn file_name(&self) -> &'static str {
        match self {
            Attribute::Direction => "direction",
            Attribute::Value => "value",
            Attribute::ActiveLow => "active_low",
            Attribute::Edge => "edge",
        }
    }
}

fn bit_text(b: bool) -> &'static str {
    if b { "1" } else { "0" }
}

fn parse_bit(s: &str) -> Option<bool> {
    match s {
        "0" => Some(false),
        "1" => Some(true),
        _ => None,
    }
}

/// Last fetched view of a pin's attribute files.
///
/// Defaults double as the substitutes used when a file can't be read.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
pub struct PinState {
    pub direction: Direction,
    pub value: bool,
    pub active_low: bool,
    pub edge: Edge,
}

impl PinState {
    pub fn value_text(&self) -> &'static str {
        bit_text(self.value)
    }

    pub fn active_low_text(&self) -> &'static str {
        bit_text(self.active_low)
    }
}

/// Controls one exported pin through its `gpioN` directory.
#[derive(Debug, Clone)]
pub struct PinController {
    number: u32,
    label: String,
    path: PathBuf,
    state: PinState,
}

impl PinController {
    /// Build a controller and fetch its initial state.
    pub fn new(number: u32, label: impl Into<String>, root: &Path) -> Self {
        let mut pin = Self {
            number,
            label: label.into(),
            path: pin_dir(root, number),
            state: PinState::default(),
        };
        pin.fetch();
        pin
    }

    /// Like `new`, but refuses pins whose directory is missing.
    pub fn open(number: u32, label: impl Into<String>, root: &Path) -> Result<Self, GpioError> {
        if !is_exported(root, number) {
            return Err(GpioError::NotExported(number));
        }
        Ok(Self::new(number, label, root))
    }

    pub fn number(&self) -> u32 {
        self.number
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn current_state(&self) -> PinState {
        self.state
    }

    fn read_attr(&self, attr: Attribute) -> Option<String> {
        read_trimmed(self.path.join(attr.file_name())).ok()
    }

    fn fetch(&mut self) {
        self.state = PinState {
            direction: self
                .read_attr(Attribute::Direction)
                .and_then(|s| Direction::from_sysfs(&s))
                .unwrap_or_default(),
            value: self
                .read_attr(Attribute::Value)
                .and_then(|s| parse_bit(&s))
                .unwrap_or(false),
            active_low: self
                .read_attr(Attribute::ActiveLow)
                .and_then(|s| parse_bit(&s))
                .unwrap_or(false),
            edge: self
                .read_attr(Attribute::Edge)
                .and_then(|s| Edge::from_sysfs(&s))
                .unwrap_or_default(),
        };
    }

    /// Re-read all four attribute files.
    pub fn refresh(&mut self) -> PinState {
        self.fetch();
        self.state
    }

    /// Write `text` to the attribute file, then re-read every attribute.
    ///
    /// Returns whether the write reached the file. Whether the driver
    /// accepted the value only shows in the refreshed state.
    pub fn store(&mut self, attr: Attribute, text: &str) -> bool {
        let written = write_attr(self.path.join(attr.file_name()), text).is_ok();
        logger::log_event(
            "pin_store",
            json!({
                "number": self.number,
                "attribute": attr.file_name(),
                "value": text,
                "written": written,
            }),
        );
        self.fetch();
        written
    }

    pub fn set_direction(&mut self, direction: Direction) -> bool {
        self.store(Attribute::Direction, direction.as_sysfs())
    }

    pub fn set_value(&mut self, high: bool) -> bool {
        self.store(Attribute::Value, bit_text(high))
    }

    pub fn set_active_low(&mut self, active_low: bool) -> bool {
        self.store(Attribute::ActiveLow, bit_text(active_low))
    }

    pub fn set_edge(&mut self, edge: Edge) -> bool {
        self.store(Attribute::Edge, edge.as_sysfs())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::test_utils::FakeGpioTree;

    #[test]
    fn test_fetch_reads_all_attributes() {
        let tree = FakeGpioTree::new();
        tree.add_pin(60, Some("P9.12"));
        tree.write_attr(60, "direction", "out\n");
        tree.write_attr(60, "value", "1\n");
        tree.write_attr(60, "active_low", "1\n");
        tree.write_attr(60, "edge", "both\n");
        let pin = PinController::new(60, "P9.12", tree.root());
        assert_eq!(
            pin.current_state(),
            PinState { direction: Direction::Out, value: true, active_low: true, edge: Edge::Both }
        );
        assert_eq!(pin.label(), "P9.12");
        assert_eq!(pin.number(), 60);
        assert!(pin.path().ends_with("gpio60"));
    }

    #[test]
    fn test_missing_files_use_defaults() {
        let tree = FakeGpioTree::new();
        tree.add_bare_pin(12);
        let pin = PinController::new(12, "P8.12", tree.root());
        let st = pin.current_state();
        assert_eq!(st.direction, Direction::In);
        assert!(!st.value);
        assert!(!st.active_low);
        assert_eq!(st.edge, Edge::None);
    }

    #[test]
    fn test_unrecognized_content_uses_defaults() {
        let tree = FakeGpioTree::new();
        tree.add_pin(5, None);
        tree.write_attr(5, "direction", "sideways");
        tree.write_attr(5, "value", "7");
        tree.write_attr(5, "edge", "up");
        let pin = PinController::new(5, "P8.5", tree.root());
        assert_eq!(pin.current_state(), PinState::default());
    }

    #[test]
    fn test_set_direction_out() {
        let tree = FakeGpioTree::new();
        tree.add_pin(60, Some("P9.12"));
        let mut pin = PinController::new(60, "P9.12", tree.root());
        assert!(pin.set_direction(Direction::Out));
        assert_eq!(pin.current_state().direction, Direction::Out);
        assert_eq!(tree.read_attr(60, "direction"), "out");
    }

    #[test]
    fn test_set_direction_missing_file_keeps_default() {
        let tree = FakeGpioTree::new();
        tree.add_bare_pin(61);
        let mut pin = PinController::new(61, "P9.13", tree.root());
        assert!(!pin.set_direction(Direction::Out));
        assert_eq!(pin.current_state().direction, Direction::In);
    }

    #[test]
    fn test_setters_write_exact_vocabulary() {
        let tree = FakeGpioTree::new();
        tree.add_pin(7, Some("P9.42"));
        let mut pin = PinController::new(7, "P9.42", tree.root());

        pin.set_value(true);
        assert_eq!(tree.read_attr(7, "value"), "1");
        pin.set_active_low(true);
        assert_eq!(tree.read_attr(7, "active_low"), "1");
        for edge in [Edge::Rising, Edge::Falling, Edge::Both, Edge::None] {
            pin.set_edge(edge);
            assert_eq!(tree.read_attr(7, "edge"), edge.as_sysfs());
            assert_eq!(pin.current_state().edge, edge);
        }
        pin.set_value(false);
        assert_eq!(pin.current_state().value_text(), "0");
        assert_eq!(pin.current_state().active_low_text(), "1");
    }

    #[test]
    fn test_store_refetches_every_attribute() {
        let tree = FakeGpioTree::new();
        tree.add_pin(9, Some("P8.9"));
        let mut pin = PinController::new(9, "P8.9", tree.root());
        // changed behind our back; picked up by the next store
        tree.write_attr(9, "edge", "falling\n");
        assert_eq!(pin.current_state().edge, Edge::None);
        pin.set_value(true);
        assert_eq!(pin.current_state().edge, Edge::Falling);
        assert!(pin.current_state().value);
    }

    #[test]
    fn test_refresh_picks_up_external_change() {
        let tree = FakeGpioTree::new();
        tree.add_pin(3, Some("P8.3"));
        let mut pin = PinController::new(3, "P8.3", tree.root());
        tree.write_attr(3, "value", "1\n");
        assert!(!pin.current_state().value);
        assert!(pin.refresh().value);
    }

    #[test]
    fn test_open_requires_exported_dir() {
        let tree = FakeGpioTree::new();
        assert!(matches!(
            PinController::open(44, "P8.12", tree.root()),
            Err(GpioError::NotExported(44))
        ));
        tree.add_pin(44, Some("P8.12"));
        assert!(PinController::open(44, "P8.12", tree.root()).is_ok());
    }

    #[test]
    fn test_enum_sysfs_text() {
        assert_eq!(Direction::from_sysfs("out"), Some(Direction::Out));
        assert_eq!(Direction::from_sysfs("high"), None);
        assert_eq!(Edge::from_sysfs("rising"), Some(Edge::Rising));
        assert_eq!(Edge::Both.as_sysfs(), "both");
        assert_eq!(Attribute::ActiveLow.file_name(), "active_low");
    }
}
