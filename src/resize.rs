//! Column resize sessions.
//!
//! A drag interaction produces many intermediate widths but only the final
//! one should be persisted. [`ResizeSession`] borrows the config mutably
//! for the duration of the drag (so no second session and no other config
//! mutation can overlap it) and commits the last width into the field's
//! `colWidth` when dropped.

use crate::model::ViewConfig;

/// Widths below this are not useful; drags clamp here.
pub const MIN_COL_WIDTH: f64 = 40.0;

pub struct ResizeSession<'c> {
    config: &'c mut ViewConfig,
    field_index: usize,
    width: f64,
}

impl<'c> ResizeSession<'c> {
    /// Begin a drag on the field at `field_index`. Returns `None` when the
    /// index does not name a configured field.
    pub fn begin(config: &'c mut ViewConfig, field_index: usize, start_width: f64) -> Option<Self> {
        if field_index >= config.fields.len() {
            return None;
        }
        Some(Self {
            config,
            field_index,
            width: start_width.max(MIN_COL_WIDTH),
        })
    }

    /// Record an intermediate drag position. Only the last one survives.
    pub fn drag_to(&mut self, width: f64) {
        self.width = width.max(MIN_COL_WIDTH);
    }

    pub fn current_width(&self) -> f64 {
        self.width
    }
}

impl Drop for ResizeSession<'_> {
    fn drop(&mut self) {
        if let Some(field) = self.config.fields.get_mut(self.field_index) {
            field.set_col_width(Some(self.width));
        }
    }
}
