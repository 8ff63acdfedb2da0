use std::fmt;

use serde::{Deserialize, Serialize};

pub mod chart;
pub mod role;

pub use chart::{ChartData, Metric, MetricSeries};
pub use role::{Capabilities, RoleTag};

// Snapshot structs use `Box<str>` for their string fields: the console
// never resizes a value after it arrives from the backend, so the
// compact representation is enough.
type BoxStr = Box<str>;

/// Unique identifier for a monitored field device.
///
/// Ids are minted by the backend and opaque to the console; we keep the
/// exact string we were given.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DeviceId(pub BoxStr);

/// Unique identifier for a monitoring zone.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ZoneId(pub BoxStr);

/// Percentage value in the range 0–100 (inclusive).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Percentage(pub u8);

impl DeviceId {
    pub fn new(id: impl Into<BoxStr>) -> Self {
        Self(id.into())
    }
}

impl ZoneId {
    pub fn new(id: impl Into<BoxStr>) -> Self {
        Self(id.into())
    }
}

impl fmt::Display for DeviceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Reachability of a device as reported by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DeviceState {
    Online,
    Offline,
}

/// A field device as last reported by the backend.
///
/// The console only ever holds a read-only, periodically refreshed
/// snapshot; nothing mutates these fields locally. A confirmed command
/// round-trip changes device state on the backend, and the change shows
/// up here on the next poll cycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Device {
    /// Stable identity of this device.
    pub id: DeviceId,
    /// Operator-facing display name.
    pub name: BoxStr,
    /// Reachability at the time of the last poll.
    pub state: DeviceState,
    /// When the backend last heard from the device.
    pub last_seen_at: Option<jiff::Timestamp>,
    /// Battery charge level, when the device reports one.
    pub battery_level: Option<Percentage>,
    /// Zone the device is assigned to, for display aggregation.
    pub zone_id: Option<ZoneId>,
}

/// A monitoring zone. Used only to group devices in overviews.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Zone {
    pub id: ZoneId,
    pub name: BoxStr,
}

/// One timestamped telemetry reading.
///
/// The history endpoint delivers batches of these newest-first; chart
/// reconciliation reorders them (see [`ChartData::reconcile`]). Absent
/// metrics stay `None` here and become `0.0` only at the chart boundary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Sample {
    /// When the reading was taken.
    pub timestamp: jiff::Timestamp,
    /// Air temperature in degrees Celsius.
    pub temp: Option<f64>,
    /// Relative air humidity as a percentage.
    pub humidity_air: Option<f64>,
    /// Soil humidity as a percentage.
    pub humidity_soil: Option<f64>,
    /// Light level as a percentage of sensor range.
    pub light: Option<f64>,
}

/// Bearer token for an operator session.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessToken(BoxStr);

impl AccessToken {
    pub fn new(token: impl Into<BoxStr>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

// Tokens must not leak into logs; Debug prints a fixed placeholder.
impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AccessToken(..)")
    }
}

/// An authenticated operator session.
///
/// Owned exclusively by the session store; every other component
/// receives clones as read-only snapshots and goes through the store's
/// operations for any mutation.
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    pub token: AccessToken,
    /// Role string exactly as the backend sent it. Kept so the
    /// diagnostic fallback view can show raw and normalized forms
    /// side by side when the vocabulary drifts.
    pub raw_role: BoxStr,
    /// Canonical role, normalized once via [`RoleTag::parse`].
    pub role: RoleTag,
    pub display_name: BoxStr,
}

/// Imperative command tags dispatched to devices.
///
/// The taxonomy is owned by the backend; the console treats tags as
/// opaque strings and only compares them for capability gating.
pub mod command {
    pub const PUMP_ON: &str = "PUMP_ON";
    pub const PUMP_OFF: &str = "PUMP_OFF";
    pub const LIGHT_ON: &str = "LIGHT_ON";
    pub const LIGHT_OFF: &str = "LIGHT_OFF";
    pub const MIST_ON: &str = "MIST_ON";
    pub const MIST_OFF: &str = "MIST_OFF";
    pub const SYSTEM_REBOOT: &str = "SYSTEM_REBOOT";
}
