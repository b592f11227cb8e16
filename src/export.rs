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
use std::thread;
use std::time::{Duration, Instant};

use serde_json::json;

use crate::config::PanelConfig;
use crate::discovery::CandidatePin;
use crate::logger;
use crate::sysfs::{export_file, is_exported, write_attr};

/// Requests sysfs export of pins. Pins are never unexported.
#[derive(Debug, Clone)]
pub struct Exporter {
    root: PathBuf,
    settle_timeout: Duration,
    poll_interval: Duration,
}

impl Exporter {
    pub fn new(root: &Path, settle_timeout: Duration, poll_interval: Duration) -> Self {
        Self {
            root: root.to_path_buf(),
            settle_timeout,
            poll_interval: poll_interval.max(Duration::from_millis(1)),
        }
    }

    pub fn from_config(cfg: &PanelConfig) -> Self {
        Self::new(&cfg.gpio_root, cfg.export_timeout(), cfg.export_poll())
    }

    /// Make sure `gpio<number>` exists, asking the kernel for it if needed.
    ///
    /// Returns true without writing when the directory is already there.
    /// The kernel gives no acknowledgement, so success means the directory
    /// showed up before the settle timeout ran out.
    pub fn ensure_exported(&self, number: u32) -> bool {
        if is_exported(&self.root, number) {
            return true;
        }
        let written = write_attr(export_file(&self.root), &number.to_string()).is_ok();
        let ok = written && self.wait_for(number);
        logger::log_event(
            "export",
            json!({ "number": number, "written": written, "exported": ok }),
        );
        ok
    }

    fn wait_for(&self, number: u32) -> bool {
        let deadline = Instant::now() + self.settle_timeout;
        loop {
            if is_exported(&self.root, number) {
                return true;
            }
            let now = Instant::now();
            if now >= deadline {
                return false;
            }
            thread::sleep(self.poll_interval.min(deadline - now));
        }
    }

    /// Candidates whose directory exists afterwards, in input order.
    pub fn export_all(&self, candidates: &[CandidatePin]) -> Vec<CandidatePin> {
        candidates
            .iter()
            .filter(|c| self.ensure_exported(c.number))
            .cloned()
            .collect()
    }
}
