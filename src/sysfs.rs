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

//! Helpers for the legacy sysfs GPIO control filesystem.
//!
//! Everything lives under one root (normally `/sys/class/gpio`). Exported
//! pins appear as `gpioN` directories, chips as `gpiochipB` where `B` is the
//! chip base, and `export` accepts a decimal global number.

use std::fs::{self, OpenOptions};
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const DEFAULT_GPIO_ROOT: &str = "/sys/class/gpio";

#[derive(Error, Debug)]
pub enum GpioError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("Parse error: {0}")]
    Parse(String),
    #[error("GPIO {0} is not exported")]
    NotExported(u32),
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Directory holding the attribute files of an exported pin.
pub fn pin_dir(root: &Path, number: u32) -> PathBuf {
    root.join(format!("gpio{}", number))
}

pub fn export_file(root: &Path) -> PathBuf {
    root.join("export")
}

pub fn is_exported(root: &Path, number: u32) -> bool {
    pin_dir(root, number).is_dir()
}

pub fn read_trimmed<P: AsRef<Path>>(p: P) -> io::Result<String> {
    let mut s = String::new();
    fs::File::open(p)?.read_to_string(&mut s)?;
    Ok(s.trim().to_string())
}

/// Write `text` into an existing attribute file.
///
/// sysfs attributes cannot be created from user space, so the file is never
/// created here; a missing file surfaces as `NotFound`.
pub fn write_attr<P: AsRef<Path>>(p: P, text: &str) -> io::Result<()> {
    let mut f = OpenOptions::new().write(true).truncate(true).open(p)?;
    f.write_all(text.as_bytes())?;
    f.flush()
}

/// Parse the number out of names like `gpio17` or `gpiochip32`.
pub fn extract_index(name: &str, prefix: &str) -> Option<u32> {
    let rest = name.strip_prefix(prefix)?;
    if rest.is_empty() || !rest.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    rest.parse().ok()
}
