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

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum View {
    List,
    Detail,
}

/// Cursor and view mode shared by the list and detail views.
///
/// `cursor < len` holds whenever `len > 0`; with no pins it stays 0.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NavState {
    cursor: usize,
    len: usize,
    view: View,
}

impl NavState {
    pub fn new(len: usize) -> Self {
        Self { cursor: 0, len, view: View::List }
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn view(&self) -> View {
        self.view
    }

    /// Cursor as an index, or None when there is nothing to index.
    pub fn selected(&self) -> Option<usize> {
        (self.cursor < self.len).then_some(self.cursor)
    }

    /// Open the detail view for `index`. Out of range only resets the cursor.
    pub fn activate(&mut self, index: usize) -> bool {
        if index < self.len {
            self.cursor = index;
            self.view = View::Detail;
            true
        } else {
            self.cursor = 0;
            false
        }
    }

    pub fn next(&mut self) -> usize {
        self.cursor = if self.len == 0 { 0 } else { (self.cursor + 1) % self.len };
        self.cursor
    }

    pub fn previous(&mut self) -> usize {
        self.cursor = if self.len == 0 { 0 } else { (self.cursor + self.len - 1) % self.len };
        self.cursor
    }

    /// Back to the list; the cursor is kept.
    pub fn back(&mut self) {
        self.view = View::List;
    }
}
