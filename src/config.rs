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

use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::sysfs::{GpioError, DEFAULT_GPIO_ROOT};

/// Lines per chip assumed when a chip's real base cannot be read.
pub const DEFAULT_CHIP_LINE_MULTIPLIER: u32 = 32;

fn default_gpio_root() -> PathBuf { PathBuf::from(DEFAULT_GPIO_ROOT) }
fn default_descriptor_command() -> Vec<String> { vec!["gpioinfo".to_string()] }
fn default_multiplier() -> u32 { DEFAULT_CHIP_LINE_MULTIPLIER }
fn default_label_markers() -> Vec<String> { vec!["USR_LED".to_string()] }
fn default_export_timeout_ms() -> u64 { 100 }
fn default_export_poll_ms() -> u64 { 10 }

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct PanelConfig {
    /// Root of the sysfs GPIO class directory
    #[serde(default = "default_gpio_root")]
    pub gpio_root: PathBuf,
    /// Program and arguments printing chip/line descriptors
    #[serde(default = "default_descriptor_command")]
    pub descriptor_command: Vec<String>,
    #[serde(default = "default_multiplier")]
    pub chip_line_multiplier: u32,
    /// Substrings that admit a line label besides the P<digit> header names
    #[serde(default = "default_label_markers")]
    pub label_markers: Vec<String>,
    #[serde(default = "default_export_timeout_ms")]
    pub export_timeout_ms: u64,
    #[serde(default = "default_export_poll_ms")]
    pub export_poll_ms: u64,
}

impl Default for PanelConfig {
    fn default() -> Self {
        Self {
            gpio_root: default_gpio_root(),
            descriptor_command: default_descriptor_command(),
            chip_line_multiplier: default_multiplier(),
            label_markers: default_label_markers(),
            export_timeout_ms: default_export_timeout_ms(),
            export_poll_ms: default_export_poll_ms(),
        }
    }
}

impl PanelConfig {
    pub fn export_timeout(&self) -> Duration {
        Duration::from_millis(self.export_timeout_ms)
    }

    pub fn export_poll(&self) -> Duration {
        Duration::from_millis(self.export_poll_ms)
    }
}

pub fn config_path() -> PathBuf {
    if let Ok(xdg) = env::var("XDG_CONFIG_HOME") {
        return Path::new(&xdg).join("gpiopanel").join("config.json");
    }
    if let Ok(home) = env::var("HOME") {
        return Path::new(&home)
            .join(".config")
            .join("gpiopanel")
            .join("config.json");
    }
    PathBuf::from("/etc/gpiopanel/config.json")
}

pub fn validate_config(cfg: &PanelConfig) -> Result<(), String> {
    if !cfg.gpio_root.is_absolute() {
        return Err("gpio_root must be an absolute path".to_string());
    }
    match cfg.descriptor_command.first() {
        Some(program) if !program.trim().is_empty() => {}
        _ => return Err("descriptor_command must name a program".to_string()),
    }
    if cfg.chip_line_multiplier == 0 {
        return Err("chip_line_multiplier must be greater than 0".to_string());
    }
    if cfg.export_timeout_ms > 10_000 {
        return Err("export_timeout_ms out of range (max 10000)".to_string());
    }
    if cfg.export_poll_ms == 0 || cfg.export_poll_ms > cfg.export_timeout_ms.max(1) {
        return Err("export_poll_ms must be between 1 and export_timeout_ms".to_string());
    }
    if cfg.label_markers.iter().any(|m| m.trim().is_empty()) {
        return Err("label_markers must not contain empty strings".to_string());
    }
    Ok(())
}

pub fn try_load_config(path: &Path) -> Result<PanelConfig, GpioError> {
    let data = fs::read_to_string(path)?;
    let cfg: PanelConfig = serde_json::from_str(&data)
        .map_err(|e| GpioError::Parse(format!("{}: {}", path.display(), e)))?;
    validate_config(&cfg).map_err(GpioError::InvalidConfig)?;
    Ok(cfg)
}
