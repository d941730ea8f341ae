//! Windowed review grid for imported rows
//!
//! Only rows intersecting the viewport (plus [`OVERSCAN`] rows on each side)
//! are materialized, whatever the total row count. Row `i` (0-based) sits on
//! spreadsheet line `i + 1` and is flagged when any error names that line.

use std::collections::HashSet;
use std::ops::Range;

use fono_common::models::{ImportedRow, ValidationError};

/// Fixed row height in pixels
pub const ROW_HEIGHT: u32 = 45;

/// Extra rows materialized above and below the viewport
pub const OVERSCAN: usize = 10;

/// Default viewport height in pixels
pub const DEFAULT_VIEWPORT: u32 = 600;

/// One materialized row
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridRow<'a> {
    /// 0-based position
    pub index: usize,
    /// 1-based spreadsheet line
    pub line: u32,
    /// Pixel offset from the top of the scroll area
    pub top: u64,
    pub flagged: bool,
    pub cells: &'a ImportedRow,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReviewGrid {
    columns: Vec<String>,
    rows: Vec<ImportedRow>,
    error_lines: HashSet<u32>,
    viewport: u32,
    scroll_top: u64,
}

impl ReviewGrid {
    /// Columns come from the first row's keys
    pub fn new(rows: Vec<ImportedRow>, errors: &[ValidationError]) -> Self {
        let columns = rows
            .first()
            .map(|row| row.columns().map(str::to_string).collect())
            .unwrap_or_default();

        Self {
            columns,
            rows,
            error_lines: errors.iter().map(|e| e.line).collect(),
            viewport: DEFAULT_VIEWPORT,
            scroll_top: 0,
        }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Upper-cased column headers
    pub fn headers(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.to_uppercase()).collect()
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn rows(&self) -> &[ImportedRow] {
        &self.rows
    }

    /// Height of the whole scroll area
    pub fn total_height(&self) -> u64 {
        self.rows.len() as u64 * u64::from(ROW_HEIGHT)
    }

    pub fn set_viewport(&mut self, height: u32) {
        self.viewport = height;
        self.scroll_to(self.scroll_top);
    }

    /// Scroll, clamped so the last row can reach the bottom edge
    pub fn scroll_to(&mut self, top: u64) {
        let max = self.total_height().saturating_sub(u64::from(self.viewport));
        self.scroll_top = top.min(max);
    }

    /// Bring a 0-based row into view at the top
    pub fn scroll_to_row(&mut self, index: usize) {
        self.scroll_to(index as u64 * u64::from(ROW_HEIGHT));
    }

    pub fn scroll_top(&self) -> u64 {
        self.scroll_top
    }

    /// Indices to materialize: visible rows widened by the overscan
    pub fn visible_range(&self) -> Range<usize> {
        if self.rows.is_empty() {
            return 0..0;
        }
        let row_height = u64::from(ROW_HEIGHT);
        let first = (self.scroll_top / row_height) as usize;
        let bottom = self.scroll_top + u64::from(self.viewport);
        let last = bottom.div_ceil(row_height) as usize;

        let start = first.saturating_sub(OVERSCAN);
        let end = last.saturating_add(OVERSCAN).min(self.rows.len());
        start..end
    }

    pub fn window(&self) -> Vec<GridRow<'_>> {
        self.visible_range()
            .map(|index| {
                let line = index as u32 + 1;
                GridRow {
                    index,
                    line,
                    top: index as u64 * u64::from(ROW_HEIGHT),
                    flagged: self.error_lines.contains(&line),
                    cells: &self.rows[index],
                }
            })
            .collect()
    }

    /// True when an error names this 1-based line
    pub fn is_flagged(&self, line: u32) -> bool {
        self.error_lines.contains(&line)
    }

    /// Rows whose line has no error, in order
    pub fn clean_rows(&self) -> Vec<ImportedRow> {
        self.rows
            .iter()
            .enumerate()
            .filter(|(index, _)| !self.is_flagged(*index as u32 + 1))
            .map(|(_, row)| row.clone())
            .collect()
    }
}
