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

//! Pin discovery.
//!
//! The primary source is the text printed by a line-listing tool such as
//! libgpiod's `gpioinfo`:
//!
//! ```text
//! gpiochip0 - 32 lines:
//!         line   0:      "P9_22"       unused   input  active-high
//!         line   1:      unnamed       unused   input  active-high
//! ```
//!
//! Each descriptor is turned into a global sysfs number, filtered by its
//! label and deduplicated. When the tool prints nothing the already exported
//! `gpioN` directories are listed instead.

use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::process::Command;

use regex::Regex;
use serde_json::json;

use crate::config::PanelConfig;
use crate::logger;
use crate::sysfs::{extract_index, read_trimmed};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GpioChip {
    pub index: u32,
    /// Global number of line 0, when the host reports it
    pub base: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GpioLineDescriptor {
    pub chip: u32,
    pub line: u32,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidatePin {
    pub number: u32,
    pub label: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiscoveryMethod {
    Descriptors,
    ExportedScan,
}

impl DiscoveryMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            DiscoveryMethod::Descriptors => "descriptors",
            DiscoveryMethod::ExportedScan => "exported_scan",
        }
    }
}

#[derive(Debug, Clone)]
pub struct Discovery {
    pub method: DiscoveryMethod,
    pub candidates: Vec<CandidatePin>,
}

/// Anything that can print chip/line descriptors.
#[cfg_attr(test, mockall::automock)]
pub trait DescriptorSource {
    /// Raw listing text. Empty when the source is unavailable.
    fn list_descriptors(&self) -> String;
}

/// Runs an external listing command once per call.
#[derive(Debug, Clone)]
pub struct CommandSource {
    program: String,
    args: Vec<String>,
}

impl CommandSource {
    pub fn new(argv: &[String]) -> Option<Self> {
        let (program, args) = argv.split_first()?;
        Some(Self { program: program.clone(), args: args.to_vec() })
    }
}

impl DescriptorSource for CommandSource {
    fn list_descriptors(&self) -> String {
        match Command::new(&self.program).args(&self.args).output() {
            Ok(out) if out.status.success() => String::from_utf8(out.stdout).unwrap_or_default(),
            _ => String::new(),
        }
    }
}

/// Maps a (chip, line) pair to a global sysfs number.
pub trait GlobalNumbering {
    fn global_number(&self, chip: u32, line: u32) -> Option<u32>;
}

/// Authoritative chip bases as reported by the host.
#[derive(Debug, Clone, Default)]
pub struct ChipBaseTable {
    bases: HashMap<u32, u32>,
}

impl ChipBaseTable {
    pub fn new(chips: &[GpioChip]) -> Self {
        let bases = chips
            .iter()
            .filter_map(|c| c.base.map(|b| (c.index, b)))
            .collect();
        Self { bases }
    }

    /// Read bases from `gpiochipB/base`, keyed by the `gpiochipN` device
    /// entry found under `gpiochipB/device/`.
    pub fn from_sysfs(root: &Path) -> Self {
        Self::new(&read_chips(root))
    }

    pub fn base(&self, chip: u32) -> Option<u32> {
        self.bases.get(&chip).copied()
    }

    pub fn len(&self) -> usize {
        self.bases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bases.is_empty()
    }
}

impl GlobalNumbering for ChipBaseTable {
    fn global_number(&self, chip: u32, line: u32) -> Option<u32> {
        self.base(chip)?.checked_add(line)
    }
}

/// Best-effort `chip * multiplier + line`.
///
/// Only correct when every chip below `chip` has exactly `multiplier` lines
/// and numbering starts at 0.
#[derive(Debug, Clone, Copy)]
pub struct MultiplierHeuristic {
    pub multiplier: u32,
}

impl GlobalNumbering for MultiplierHeuristic {
    fn global_number(&self, chip: u32, line: u32) -> Option<u32> {
        chip.checked_mul(self.multiplier)?.checked_add(line)
    }
}

/// Authoritative lookup first, heuristic second.
#[derive(Debug, Clone)]
pub struct Resolver {
    pub bases: ChipBaseTable,
    pub heuristic: MultiplierHeuristic,
}

impl GlobalNumbering for Resolver {
    fn global_number(&self, chip: u32, line: u32) -> Option<u32> {
        self.bases
            .global_number(chip, line)
            .or_else(|| self.heuristic.global_number(chip, line))
    }
}

/// Index of the chip behind a class entry's `device` link.
///
/// Newer kernels point `device` at the `gpiochipN` node itself. Older ones
/// point at the controller, which is only usable when it holds a single
/// `gpiochipN`; with several banks the pairing is unknown and None is
/// returned.
fn chip_index_of(class_dir: &Path) -> Option<u32> {
    let target = fs::canonicalize(class_dir.join("device")).ok()?;
    if let Some(index) = target
        .file_name()
        .and_then(|n| extract_index(&n.to_string_lossy(), "gpiochip"))
    {
        return Some(index);
    }
    let mut found = fs::read_dir(&target)
        .ok()?
        .flatten()
        .filter_map(|e| extract_index(&e.file_name().to_string_lossy(), "gpiochip"));
    let first = found.next()?;
    match found.next() {
        None => Some(first),
        Some(_) => None,
    }
}

fn read_chips(root: &Path) -> Vec<GpioChip> {
    let mut chips = Vec::new();
    let Ok(entries) = fs::read_dir(root) else { return chips };
    for ent in entries.flatten() {
        let name = ent.file_name();
        if extract_index(&name.to_string_lossy(), "gpiochip").is_none() {
            continue;
        }
        let dir = ent.path();
        let Some(index) = chip_index_of(&dir) else { continue };
        let base = read_trimmed(dir.join("base")).ok().and_then(|s| s.parse::<u32>().ok());
        chips.push(GpioChip { index, base });
    }
    chips.sort_by_key(|c| c.index);
    chips
}

/// Parse listing text into line descriptors.
///
/// Descriptors under a chip header that failed to parse are dropped, as are
/// lines of any other shape.
pub fn parse_descriptors(text: &str) -> Vec<GpioLineDescriptor> {
    let mut out = Vec::new();
    let Ok(header_re) = Regex::new(r"^\s*gpiochip(\S*)") else { return out };
    let Ok(line_re) = Regex::new(r#"^\s*line\s+(\d+)\s*:\s*(?:"([^"]*)")?"#) else { return out };

    let mut chip: Option<u32> = None;
    for raw in text.lines() {
        if let Some(caps) = header_re.captures(raw) {
            // "gpiochip0" or "gpiochip0:" (libgpiod 2.x)
            chip = caps
                .get(1)
                .map(|m| m.as_str().trim_end_matches(':'))
                .and_then(|s| s.parse::<u32>().ok());
            continue;
        }
        let Some(current) = chip else { continue };
        let Some(caps) = line_re.captures(raw) else { continue };
        let Some(line) = caps.get(1).and_then(|m| m.as_str().parse::<u32>().ok()) else { continue };
        let label = caps.get(2).map(|m| m.as_str().to_string()).unwrap_or_default();
        out.push(GpioLineDescriptor { chip: current, line, label });
    }
    out
}

/// Header pin names like "P9.12" / "p8_07", or any configured marker.
pub fn is_pin_label(label: &str, markers: &[String]) -> bool {
    let label = label.trim();
    let mut chars = label.chars();
    if let (Some(first), Some(second)) = (chars.next(), chars.next()) {
        if (first == 'P' || first == 'p') && second.is_ascii_digit() {
            return true;
        }
    }
    markers.iter().any(|m| !m.is_empty() && label.contains(m.as_str()))
}

/// Sort ascending by number; equal numbers keep the first label seen.
pub fn sort_and_dedup(mut pins: Vec<CandidatePin>) -> Vec<CandidatePin> {
    pins.sort_by_key(|p| p.number);
    pins.dedup_by_key(|p| p.number);
    pins
}

/// Resolve and filter parsed descriptors.
pub fn candidates_from_descriptors<N: GlobalNumbering + ?Sized>(
    descriptors: &[GpioLineDescriptor],
    numbering: &N,
    markers: &[String],
) -> Vec<CandidatePin> {
    let pins = descriptors
        .iter()
        .filter(|d| is_pin_label(&d.label, markers))
        .filter_map(|d| {
            numbering.global_number(d.chip, d.line).map(|number| CandidatePin {
                number,
                label: d.label.trim().to_string(),
            })
        })
        .collect();
    sort_and_dedup(pins)
}

/// List already exported `gpioN` directories.
pub fn scan_exported(root: &Path) -> Vec<CandidatePin> {
    let mut pins = Vec::new();
    let Ok(entries) = fs::read_dir(root) else { return pins };
    for ent in entries.flatten() {
        let name = ent.file_name();
        let Some(number) = extract_index(&name.to_string_lossy(), "gpio") else { continue };
        let label = read_trimmed(ent.path().join("label"))
            .ok()
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| format!("GPIO_{}", number));
        pins.push(CandidatePin { number, label });
    }
    sort_and_dedup(pins)
}

pub fn discover<S, N>(source: &S, numbering: &N, markers: &[String], root: &Path) -> Discovery
where
    S: DescriptorSource + ?Sized,
    N: GlobalNumbering + ?Sized,
{
    let text = source.list_descriptors();
    let discovery = if text.trim().is_empty() {
        Discovery { method: DiscoveryMethod::ExportedScan, candidates: scan_exported(root) }
    } else {
        let descriptors = parse_descriptors(&text);
        Discovery {
            method: DiscoveryMethod::Descriptors,
            candidates: candidates_from_descriptors(&descriptors, numbering, markers),
        }
    };
    logger::log_event(
        "discovery",
        json!({
            "method": discovery.method.as_str(),
            "candidates": discovery.candidates.len(),
        }),
    );
    discovery
}

pub fn resolver_for(cfg: &PanelConfig) -> Resolver {
    Resolver {
        bases: ChipBaseTable::from_sysfs(&cfg.gpio_root),
        heuristic: MultiplierHeuristic { multiplier: cfg.chip_line_multiplier },
    }
}

pub fn discover_with_config(cfg: &PanelConfig) -> Discovery {
    let resolver = resolver_for(cfg);
    match CommandSource::new(&cfg.descriptor_command) {
        Some(source) => discover(&source, &resolver, &cfg.label_markers, &cfg.gpio_root),
        None => Discovery {
            method: DiscoveryMethod::ExportedScan,
            candidates: scan_exported(&cfg.gpio_root),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::test_utils::FakeGpioTree;

    const LISTING: &str = "\
gpiochip0 - 32 lines:
\tline   0:      \"P9_22 [spi0_sclk]\" unused input active-high
\tline   1:      unnamed       unused   input  active-high
\tline   2:      \"SPI0_CS0\"    unused   input  active-high
gpiochip1 - 32 lines:
\tline  21:      \"USR_LED0\"    \"beaglebone:green:usr0\" output active-high [used]
\tline  28:      \"P9.12\"       unused   input  active-high
";

    fn markers() -> Vec<String> {
        vec!["USR_LED".to_string()]
    }

    fn heuristic() -> MultiplierHeuristic {
        MultiplierHeuristic { multiplier: 32 }
    }

    #[test]
    fn test_parse_descriptors_gpioinfo_output() {
        let ds = parse_descriptors(LISTING);
        assert_eq!(ds.len(), 5);
        assert_eq!(ds[0], GpioLineDescriptor { chip: 0, line: 0, label: "P9_22 [spi0_sclk]".into() });
        assert_eq!(ds[1].label, "");
        assert_eq!(ds[3], GpioLineDescriptor { chip: 1, line: 21, label: "USR_LED0".into() });
        assert_eq!(ds[4].line, 28);
    }

    #[test]
    fn test_parse_descriptors_unknown_chip_skips_lines() {
        let text = "gpiochipX - 4 lines:\n\tline 0: \"P8.3\" unused\ngpiochip2 - 4 lines:\n\tline 1: \"P8.4\"\n";
        let ds = parse_descriptors(text);
        assert_eq!(ds.len(), 1);
        assert_eq!(ds[0].chip, 2);
    }

    #[test]
    fn test_parse_descriptors_ignores_malformed_lines() {
        let text = "garbage\n\tline 3: \"P8.3\"\ngpiochip0:\n\tline: \"P8.4\"\n\tlinefoo 3\n\tline 7: \"P8.7\"\n";
        let ds = parse_descriptors(text);
        assert_eq!(ds, vec![GpioLineDescriptor { chip: 0, line: 7, label: "P8.7".into() }]);
    }

    #[test]
    fn test_is_pin_label() {
        let m = markers();
        assert!(is_pin_label("P9.12", &m));
        assert!(is_pin_label("p8_07", &m));
        assert!(is_pin_label("  P1.04 ", &m));
        assert!(is_pin_label("USR_LED3", &m));
        assert!(is_pin_label("beaglebone USR_LED", &m));
        assert!(!is_pin_label("SPI0_CS0", &m));
        assert!(!is_pin_label("PWR_BUT", &m));
        assert!(!is_pin_label("P", &m));
        assert!(!is_pin_label("", &m));
        assert!(!is_pin_label("USR_LED3", &[]));
    }

    #[test]
    fn test_marker_admits_otherwise_rejected_label() {
        let m = vec!["CS0".to_string()];
        assert!(is_pin_label("SPI0_CS0", &m));
    }

    #[test]
    fn test_heuristic_numbering_matches_multiplier() {
        let h = heuristic();
        assert_eq!(h.global_number(0, 5), Some(5));
        assert_eq!(h.global_number(1, 28), Some(60));
        assert_eq!(h.global_number(3, 0), Some(96));
        assert_eq!(MultiplierHeuristic { multiplier: 16 }.global_number(2, 3), Some(35));
        assert_eq!(h.global_number(u32::MAX, 1), None);
    }

    #[test]
    fn test_chip_base_table_numbering() {
        let table = ChipBaseTable::new(&[
            GpioChip { index: 0, base: Some(512) },
            GpioChip { index: 1, base: None },
        ]);
        assert_eq!(table.len(), 1);
        assert_eq!(table.global_number(0, 7), Some(519));
        assert_eq!(table.global_number(1, 7), None);
        assert_eq!(table.global_number(9, 0), None);
    }

    #[test]
    fn test_resolver_prefers_authoritative_base() {
        let resolver = Resolver {
            bases: ChipBaseTable::new(&[GpioChip { index: 1, base: Some(100) }]),
            heuristic: heuristic(),
        };
        assert_eq!(resolver.global_number(1, 3), Some(103));
        assert_eq!(resolver.global_number(2, 3), Some(67));
    }

    #[test]
    fn test_candidates_sorted_filtered() {
        let ds = parse_descriptors(LISTING);
        let pins = candidates_from_descriptors(&ds, &heuristic(), &markers());
        assert_eq!(
            pins,
            vec![
                CandidatePin { number: 0, label: "P9_22 [spi0_sclk]".into() },
                CandidatePin { number: 53, label: "USR_LED0".into() },
                CandidatePin { number: 60, label: "P9.12".into() },
            ]
        );
    }

    #[test]
    fn test_duplicates_keep_first_label() {
        let ds = vec![
            GpioLineDescriptor { chip: 0, line: 17, label: "P9.23".into() },
            GpioLineDescriptor { chip: 0, line: 3, label: "P8.3".into() },
            GpioLineDescriptor { chip: 0, line: 17, label: "P9.23-dup".into() },
        ];
        let pins = candidates_from_descriptors(&ds, &heuristic(), &markers());
        assert_eq!(pins.len(), 2);
        assert_eq!(pins[1], CandidatePin { number: 17, label: "P9.23".into() });
    }

    #[test]
    fn test_discover_uses_descriptor_source() {
        let tree = FakeGpioTree::new();
        let mut source = MockDescriptorSource::new();
        source.expect_list_descriptors().times(1).return_const(LISTING.to_string());
        let d = discover(&source, &heuristic(), &markers(), tree.root());
        assert_eq!(d.method, DiscoveryMethod::Descriptors);
        assert_eq!(d.candidates.len(), 3);
    }

    #[test]
    fn test_discover_non_empty_output_without_matches_does_not_fall_back() {
        let tree = FakeGpioTree::new();
        tree.add_pin(44, Some("P8.12"));
        let mut source = MockDescriptorSource::new();
        source
            .expect_list_descriptors()
            .return_const("gpiochip0 - 1 lines:\n\tline 0: unnamed unused\n".to_string());
        let d = discover(&source, &heuristic(), &markers(), tree.root());
        assert_eq!(d.method, DiscoveryMethod::Descriptors);
        assert!(d.candidates.is_empty());
    }

    #[test]
    fn test_discover_falls_back_to_exported_scan() {
        let tree = FakeGpioTree::new();
        tree.add_pin(60, Some("P9.12"));
        tree.add_pin(7, None);
        tree.add_chip(0, 0, 32);
        let mut source = MockDescriptorSource::new();
        source.expect_list_descriptors().return_const("  \n".to_string());
        let d = discover(&source, &heuristic(), &markers(), tree.root());
        assert_eq!(d.method, DiscoveryMethod::ExportedScan);
        assert_eq!(
            d.candidates,
            vec![
                CandidatePin { number: 7, label: "GPIO_7".into() },
                CandidatePin { number: 60, label: "P9.12".into() },
            ]
        );
    }

    #[test]
    fn test_discover_empty_everywhere() {
        let tree = FakeGpioTree::new();
        let mut source = MockDescriptorSource::new();
        source.expect_list_descriptors().return_const(String::new());
        let d = discover(&source, &heuristic(), &markers(), tree.root());
        assert!(d.candidates.is_empty());
    }

    #[test]
    fn test_chip_base_table_from_sysfs() {
        let tree = FakeGpioTree::new();
        tree.add_chip(0, 512, 32);
        tree.add_chip(1, 544, 32);
        let table = ChipBaseTable::from_sysfs(tree.root());
        assert_eq!(table.base(0), Some(512));
        assert_eq!(table.base(1), Some(544));
        assert_eq!(table.global_number(1, 28), Some(572));
    }

    #[test]
    fn test_chip_base_table_follows_device_link_to_chip() {
        let tree = FakeGpioTree::new();
        tree.add_linked_chip(512, "soc/gpio@44e07000/gpiochip0");
        tree.add_linked_chip(544, "soc/gpio@4804c000/gpiochip1");
        let table = ChipBaseTable::from_sysfs(tree.root());
        assert_eq!(table.base(0), Some(512));
        assert_eq!(table.base(1), Some(544));
    }

    #[test]
    fn test_chip_base_table_shared_controller_is_not_guessed() {
        let tree = FakeGpioTree::new();
        tree.add_bank(&["dwapb.gpio/gpiochip0", "dwapb.gpio/gpiochip1"]);
        tree.add_linked_chip(512, "dwapb.gpio");
        tree.add_linked_chip(544, "dwapb.gpio");
        let table = ChipBaseTable::from_sysfs(tree.root());
        assert!(table.is_empty());

        let resolver = Resolver { bases: table, heuristic: heuristic() };
        assert_eq!(resolver.global_number(1, 3), Some(35));
    }

    #[test]
    fn test_chip_base_table_single_bank_controller() {
        let tree = FakeGpioTree::new();
        tree.add_bank(&["pl061.gpio/gpiochip3"]);
        tree.add_linked_chip(400, "pl061.gpio");
        let table = ChipBaseTable::from_sysfs(tree.root());
        assert_eq!(table.base(3), Some(400));
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_scan_exported_missing_root() {
        assert!(scan_exported(Path::new("/nonexistent/gpio/root")).is_empty());
    }

    #[test]
    fn test_command_source_failed_exit_is_empty() {
        let argv: Vec<String> = ["sh", "-c", "echo 'gpiochip0 - 1 lines:'; exit 1"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let src = CommandSource::new(&argv).unwrap();
        assert_eq!(src.list_descriptors(), "");
    }

    #[test]
    fn test_command_source_missing_program_is_empty() {
        let src = CommandSource::new(&["gpiopanel-no-such-tool".to_string()]).unwrap();
        assert_eq!(src.list_descriptors(), "");
        assert!(CommandSource::new(&[]).is_none());
    }
}
