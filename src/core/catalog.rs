use crate::db::queries;
use crate::errors::AppResult;
use crate::models::shift::Shift;
use crate::models::window::ServingWindow;
use chrono::NaiveTime;
use rusqlite::Connection;

/// Serving windows, shifts and their links. Nothing is cached: administrators may
/// edit the schedule at any time and the next evaluation must see it.
pub struct ScheduleCatalog<'a> {
    conn: &'a Connection,
}

impl<'a> ScheduleCatalog<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    /// Every window with `start <= at <= end`, earliest start first (ties by id).
    /// Windows may overlap; callers take the first one that matches.
    pub fn active_windows(&self, at: NaiveTime) -> AppResult<Vec<ServingWindow>> {
        let mut windows: Vec<ServingWindow> = queries::load_windows(self.conn)?
            .into_iter()
            .filter(|w| w.is_active_at(at))
            .collect();
        windows.sort_by_key(|w| (w.start_time, w.id));
        Ok(windows)
    }

    pub fn shifts_for_window(&self, window_id: i64) -> AppResult<Vec<Shift>> {
        queries::shifts_for_window(self.conn, window_id)
    }
}
