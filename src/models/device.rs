use serde::Serialize;

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum DeviceRole {
    Entry,
    Canteen,
}

impl DeviceRole {
    /// Convert enum → DB string
    pub fn to_db_str(&self) -> &'static str {
        match self {
            DeviceRole::Entry => "entry",
            DeviceRole::Canteen => "canteen",
        }
    }

    /// Convert DB string → enum
    pub fn from_db_str(s: &str) -> Option<Self> {
        match s {
            "entry" => Some(DeviceRole::Entry),
            "canteen" => Some(DeviceRole::Canteen),
            _ => None,
        }
    }

    /// Helper: convert input from CLI (any case)
    pub fn from_code(code: &str) -> Option<Self> {
        Self::from_db_str(&code.trim().to_lowercase())
    }
}

/// Result of looking a device up in the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceClass {
    Entry,
    Canteen,
    Unknown,
}

impl From<Option<DeviceRole>> for DeviceClass {
    fn from(role: Option<DeviceRole>) -> Self {
        match role {
            Some(DeviceRole::Entry) => DeviceClass::Entry,
            Some(DeviceRole::Canteen) => DeviceClass::Canteen,
            None => DeviceClass::Unknown,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Device {
    pub device_id: String, // ⇔ devices.device_id (normalised string)
    pub role: DeviceRole,  // ⇔ devices.role ('entry' | 'canteen')
}

/// Device ids reach us as integers from the access-control store and as text from
/// the CLI. Both are compared through this canonical form.
pub fn normalize_device_id(raw: &str) -> String {
    let trimmed = raw.trim();
    match trimmed.parse::<i64>() {
        Ok(n) => n.to_string(),
        Err(_) => trimmed.to_string(),
    }
}
