use crate::scoring::{rate, Rating};
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;

const GIB: f64 = 1024.0 * 1024.0 * 1024.0;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CpuInfo {
    pub name: String,
    pub physical_cores: Option<u32>,
    pub logical_cores: Option<u32>,
    pub frequency_mhz: Option<f64>,
    pub temperature_celsius: Option<f64>,
}

impl CpuInfo {
    /// Physical core count when known, otherwise the logical one.
    pub fn core_count(&self) -> Option<u32> {
        self.physical_cores.or(self.logical_cores)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MemoryInfo {
    pub total_bytes: Option<u64>,
    pub used_bytes: Option<u64>,
    pub percent_used: Option<f64>,
}

/// Disk capacity as reported by the source that discovered the disk.
///
/// `Raw` keeps the human-readable token printed by `lsblk` (e.g. `476.9G`).
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum DiskSize {
    Bytes(u64),
    Raw(String),
}

impl DiskSize {
    pub fn bytes(&self) -> Option<u64> {
        match self {
            DiskSize::Bytes(b) => Some(*b),
            DiskSize::Raw(raw) => parse_size_token(raw),
        }
    }
}

/// Parses lsblk-style sizes (`931.5G`, `512M`, `1,8T`) using binary multipliers.
pub fn parse_size_token(raw: &str) -> Option<u64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    let split_at = trimmed
        .find(|c: char| c.is_ascii_alphabetic())
        .unwrap_or(trimmed.len());
    let (number, unit) = trimmed.split_at(split_at);
    let value: f64 = number.replace(',', ".").parse().ok()?;
    if !value.is_finite() || value < 0.0 {
        return None;
    }
    let multiplier: f64 = match unit.trim_end_matches(['i', 'B']).to_ascii_uppercase().as_str() {
        "" => 1.0,
        "K" => 1024.0,
        "M" => 1024.0 * 1024.0,
        "G" => GIB,
        "T" => GIB * 1024.0,
        "P" => GIB * 1024.0 * 1024.0,
        _ => return None,
    };
    Some((value * multiplier).round() as u64)
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub enum DiskHealth {
    Passed,
    Failed,
    #[default]
    Unknown,
}

impl DiskHealth {
    pub fn as_str(&self) -> &'static str {
        match self {
            DiskHealth::Passed => "PASSED",
            DiskHealth::Failed => "FAILED",
            DiskHealth::Unknown => "Unknown",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DiskEntry {
    pub model: String,
    pub size: Option<DiskSize>,
    pub serial: Option<String>,
    pub health: DiskHealth,
    pub smart_ok: Option<bool>,
}

impl DiskEntry {
    pub fn new(model: impl Into<String>, size: Option<DiskSize>) -> Self {
        Self {
            model: model.into(),
            size,
            serial: None,
            health: DiskHealth::Unknown,
            smart_ok: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FanReading {
    pub label: String,
    pub rpm: Option<u32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Resolution {
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Snapshot {
    pub taken_at_unix: i64,
    pub cpu: CpuInfo,
    pub memory: MemoryInfo,
    pub disks: Vec<DiskEntry>,
    pub fans: BTreeMap<String, Vec<FanReading>>,
    pub motherboard_serial: Option<String>,
    pub gpu_name: Option<String>,
    pub screen: Option<Resolution>,
    pub cpu_utilization_percent: Option<f64>,
}

/// The collaborator-facing holder: one current snapshot plus the live utilization value.
#[derive(Debug, Clone, Default)]
pub struct State {
    pub started_at_unix: i64,
    pub current: Option<Arc<Snapshot>>,
    pub live_utilization_percent: Option<f64>,
    pub live_updated_at_unix: Option<i64>,
}

impl State {
    pub fn new(now_unix: i64) -> Self {
        Self {
            started_at_unix: now_unix,
            ..Self::default()
        }
    }

    /// Swaps in a freshly assembled snapshot and hands back the one it replaced.
    pub fn replace_snapshot(&mut self, snapshot: Snapshot) -> Option<Arc<Snapshot>> {
        self.current.replace(Arc::new(snapshot))
    }

    pub fn set_live_utilization(&mut self, value: Option<f64>, now_unix: i64) {
        self.live_utilization_percent = value;
        self.live_updated_at_unix = Some(now_unix);
    }

    /// Utilization for rating: the live sample wins over the snapshot's own reading.
    pub fn utilization_for_rating(&self) -> Option<f64> {
        self.live_utilization_percent.or_else(|| {
            self.current
                .as_ref()
                .and_then(|s| s.cpu_utilization_percent)
        })
    }

    /// Rating of the current snapshot against the freshest utilization value.
    pub fn current_rating(&self) -> Option<Rating> {
        let snapshot = self.current.as_ref()?;
        Some(rate(
            snapshot.memory.total_bytes,
            &snapshot.cpu,
            self.utilization_for_rating(),
        ))
    }

    pub fn uptime_secs(&self, now_unix: i64) -> i64 {
        (now_unix - self.started_at_unix).max(0)
    }
}
