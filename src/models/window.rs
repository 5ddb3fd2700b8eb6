use chrono::NaiveTime;
use serde::Serialize;

/// A canteen serving window ("canteen timing").
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ServingWindow {
    pub id: i64,
    pub name: String,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub description: String,
}

impl ServingWindow {
    /// Both bounds inclusive.
    pub fn is_active_at(&self, t: NaiveTime) -> bool {
        self.start_time <= t && t <= self.end_time
    }

    pub fn label(&self) -> String {
        format!(
            "{} ({} - {})",
            self.name,
            self.start_time.format("%H:%M"),
            self.end_time.format("%H:%M")
        )
    }
}
