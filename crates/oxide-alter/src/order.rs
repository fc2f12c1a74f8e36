//! Column order reconciliation.
//!
//! When planning an existing table, the planner walks the pending columns in
//! their desired order and asks [`ColumnOrder`] whether each one is already
//! where the backend will find it. The order list starts as the surviving
//! original columns (under their current names) and is consumed from the
//! front. A column that has to be placed explicitly is marked as moved and
//! skipped lazily once it reaches the front, so the whole walk is linear in
//! the number of columns.

use std::collections::{HashSet, VecDeque};

use crate::operation::ColumnPosition;

/// Tracks the column order the backend sees while operations are applied.
#[derive(Debug, Clone, Default)]
pub struct ColumnOrder {
    remaining: VecDeque<String>,
    moved: HashSet<String>,
}

impl ColumnOrder {
    /// Creates an order list from the columns that survive the alteration,
    /// in their current physical order.
    pub fn new<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            remaining: columns.into_iter().map(Into::into).collect(),
            moved: HashSet::new(),
        }
    }

    /// Places the next pending column and returns the position hint the
    /// emitted operation has to carry, if any.
    ///
    /// `existing` tells whether the column is one of the columns the order
    /// list was built from. `previous` is the pending column placed right
    /// before it, `None` for the first one.
    pub fn place(
        &mut self,
        column: &str,
        existing: bool,
        previous: Option<&str>,
    ) -> Option<ColumnPosition> {
        self.skip_moved();

        if existing {
            if self.remaining.front().map(String::as_str) == Some(column) {
                self.remaining.pop_front();
                return None;
            }
            self.moved.insert(column.to_string());
        } else if self.remaining.is_empty() {
            // Appended after every surviving column.
            return None;
        }

        Some(match previous {
            Some(previous) => ColumnPosition::after(previous),
            None => ColumnPosition::First,
        })
    }

    fn skip_moved(&mut self) {
        while let Some(front) = self.remaining.front() {
            if !self.moved.remove(front) {
                break;
            }
            self.remaining.pop_front();
        }
    }
}
