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

//! gpiopanel - console panel for Linux sysfs GPIO
//!
//! This library discovers header pins from the host's line listing, makes
//! sure each one is exported through the legacy sysfs interface, and keeps a
//! mirrored direction/value/polarity/edge state for every pin behind a
//! wraparound list/detail navigation.

pub mod sysfs;
pub mod discovery;
pub mod export;
pub mod pin;
pub mod nav;
pub mod app;
pub mod config;
pub mod system;
pub mod events;
pub mod ui;
pub mod logger;

#[cfg(test)]
pub mod test_utils;
