use std::sync::Arc;

use crate::data::model::{CollisionTable, InjuryCategory};
use crate::data::query;

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
///
/// The collision table is loaded once in `main` and shared read-only; the
/// widget parameters drive which slices of it the views show. The two
/// filtered views are recomputed on every widget change, never mutated in
/// place.
pub struct AppState {
    /// The one-time-loaded dataset, shared and immutable.
    pub table: Arc<CollisionTable>,

    /// Minimum injured-persons threshold for the injury map (0..=19).
    pub min_injured: u32,

    /// Hour of day for the time-of-day views (0..=23).
    pub hour: u32,

    /// Affected class for the dangerous-streets ranking.
    pub category: InjuryCategory,

    /// Whether the raw-data table is shown.
    pub show_raw: bool,

    /// Rows passing the injured-persons threshold (cached).
    pub injured_view: CollisionTable,

    /// Rows within the selected hour (cached).
    pub hour_view: CollisionTable,

    /// Status / error message shown in the top bar.
    pub status_message: Option<String>,
}

impl AppState {
    pub fn new(table: Arc<CollisionTable>) -> Self {
        let mut state = Self {
            table,
            min_injured: 0,
            hour: 0,
            category: InjuryCategory::Pedestrians,
            show_raw: false,
            injured_view: CollisionTable::default(),
            hour_view: CollisionTable::default(),
            status_message: None,
        };
        state.refilter();
        state
    }

    /// Recompute the cached filtered views from the widget parameters.
    ///
    /// The sliders keep both parameters in range, so the rejection branches
    /// are unreachable from the UI; they surface in the status line rather
    /// than panicking if that ever changes.
    pub fn refilter(&mut self) {
        self.status_message = None;
        match query::filter_by_min_injured(&self.table, self.min_injured) {
            Ok(view) => self.injured_view = view,
            Err(e) => {
                log::warn!("injury filter rejected: {e}");
                self.status_message = Some(e.to_string());
            }
        }
        match query::filter_by_hour(&self.table, self.hour) {
            Ok(view) => self.hour_view = view,
            Err(e) => {
                log::warn!("hour filter rejected: {e}");
                self.status_message = Some(e.to_string());
            }
        }
    }
}
