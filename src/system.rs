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

use std::fs;

pub fn is_root() -> bool {
    unsafe { libc::geteuid() == 0 }
}

/// Board name for the panel header, empty when unknown.
pub fn read_board_model() -> String {
    // Device tree first: ARM boards name themselves here
    if let Ok(raw) = fs::read_to_string("/proc/device-tree/model") {
        let model = clean_model(&raw);
        if !model.is_empty() {
            return model;
        }
    }
    fs::read_to_string("/proc/cpuinfo")
        .map(|s| model_from_cpuinfo(&s))
        .unwrap_or_default()
}

fn clean_model(raw: &str) -> String {
    raw.chars().filter(|c| *c != '\u{0}').collect::<String>().trim().to_string()
}

fn model_from_cpuinfo(cpuinfo: &str) -> String {
    let mut hardware: Option<String> = None;
    let mut model_name: Option<String> = None;
    for line in cpuinfo.lines() {
        let Some((k, v)) = line.split_once(':') else { continue };
        let val = v.trim();
        if val.is_empty() {
            continue;
        }
        match k.trim().to_ascii_lowercase().as_str() {
            "model" if hardware.is_none() && !val.chars().all(|c| c.is_ascii_digit()) => {
                hardware = Some(val.to_string());
            }
            "hardware" if hardware.is_none() => hardware = Some(val.to_string()),
            "model name" if model_name.is_none() => model_name = Some(val.to_string()),
            _ => {}
        }
    }
    hardware.or(model_name).unwrap_or_default()
}
