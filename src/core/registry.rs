use crate::db::queries;
use crate::errors::AppResult;
use crate::models::device::{DeviceClass, DeviceRole};
use rusqlite::Connection;
use std::collections::BTreeSet;

/// Maps scanner device ids to their role. Reads the `devices` table on every call,
/// so administrative changes apply to the next swipe.
pub struct DeviceRegistry<'a> {
    conn: &'a Connection,
}

impl<'a> DeviceRegistry<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    /// Unregistered devices are `Unknown` and never trigger processing.
    pub fn classify(&self, device_id: &str) -> AppResult<DeviceClass> {
        Ok(queries::device_role(self.conn, device_id)?.into())
    }

    pub fn entry_devices(&self) -> AppResult<BTreeSet<String>> {
        Ok(queries::device_ids_with_role(self.conn, DeviceRole::Entry)?
            .into_iter()
            .collect())
    }
}
