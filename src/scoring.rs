//! Heuristic machine scores and the 1..=5 rating.
//!
//! Everything here is a pure function of its inputs. Absent telemetry falls into the
//! lowest branch of each table instead of failing.

use crate::state::{CpuInfo, Snapshot};
use serde::Serialize;

const GIB: f64 = 1024.0 * 1024.0 * 1024.0;

const GPU_BRAND_TOKENS: [&str; 7] = ["rtx", "rx ", "gtx", "radeon", "geforce", "nvidia", "amd"];
const GPU_HIGH_END_TOKENS: [&str; 2] = ["rtx", "rx 6"];
const SSD_TOKENS: [&str; 2] = ["nvme", "ssd"];

/// CPU name fragments that earn the rating bonus.
pub const HIGH_END_CPU_TOKENS: [&str; 9] = [
    "ryzen",
    "xeon",
    "epyc",
    "i7-",
    "i9-",
    "core i7",
    "core i9",
    "ryzen 7",
    "ryzen 9",
];

pub const RATING_MESSAGES: [&str; 5] = [
    "Ancient machine: it struggles with anything made this decade.",
    "Modest machine: fine for documents, mail and light browsing.",
    "Solid machine: handles everyday work and some multitasking.",
    "Strong machine: ready for development, editing and gaming.",
    "NASA-grade machine: nothing you throw at it will slow it down.",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ScoreSet {
    pub cpu: u8,
    pub ram: u8,
    pub disk: u8,
    pub gpu: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Rating {
    pub tier: u8,
    pub message: &'static str,
}

pub fn score(snapshot: &Snapshot) -> ScoreSet {
    ScoreSet {
        cpu: cpu_score(&snapshot.cpu),
        ram: ram_score(snapshot.memory.total_bytes),
        disk: disk_score(snapshot),
        gpu: gpu_score(snapshot.gpu_name.as_deref()),
    }
}

pub fn cpu_score(cpu: &CpuInfo) -> u8 {
    let mut score: i32 = 20;

    score += match cpu.core_count().unwrap_or(0) {
        n if n >= 8 => 40,
        n if n >= 4 => 25,
        n if n >= 2 => 10,
        _ => 0,
    };

    let freq = cpu.frequency_mhz.unwrap_or(0.0);
    if freq >= 3000.0 {
        score += 20;
    } else if freq >= 2000.0 {
        score += 10;
    }

    if matches!(cpu.temperature_celsius, Some(t) if t > 85.0) {
        score -= 10;
    }

    clamp_score(score)
}

pub fn ram_score(total_bytes: Option<u64>) -> u8 {
    let total = match total_bytes {
        Some(t) if t > 0 => t,
        _ => return 0,
    };
    let gib = total as f64 / GIB;
    let score = if gib >= 32.0 {
        100
    } else if gib >= 16.0 {
        85
    } else if gib >= 8.0 {
        65
    } else if gib >= 4.0 {
        40
    } else if gib >= 2.0 {
        20
    } else {
        10
    };
    clamp_score(score)
}

/// Only the first disk counts; a failed SMART check caps it at 30.
pub fn disk_score(snapshot: &Snapshot) -> u8 {
    let Some(first) = snapshot.disks.first() else {
        return 30;
    };

    let model = first.model.to_lowercase();
    let mut score = if SSD_TOKENS.iter().any(|t| model.contains(t)) {
        85
    } else if first
        .size
        .as_ref()
        .and_then(|s| s.bytes())
        .is_some_and(|b| b as f64 / GIB >= 512.0)
    {
        70
    } else {
        45
    };

    if first.smart_ok == Some(false) {
        score = score.min(30);
    }

    clamp_score(score)
}

pub fn gpu_score(name: Option<&str>) -> u8 {
    let Some(name) = name else {
        return 10;
    };
    let lower = name.to_lowercase();
    let score = if GPU_BRAND_TOKENS.iter().any(|t| lower.contains(t)) {
        if GPU_HIGH_END_TOKENS.iter().any(|t| lower.contains(t)) {
            90
        } else {
            70
        }
    } else {
        40
    };
    clamp_score(score)
}

/// Rates the machine from its RAM, nudged by core count, CPU family and current load.
pub fn rate(total_ram_bytes: Option<u64>, cpu: &CpuInfo, utilization_percent: Option<f64>) -> Rating {
    let gib = total_ram_bytes.unwrap_or(0) as f64 / GIB;
    let base: i32 = if gib < 2.0 {
        1
    } else if gib < 3.0 {
        2
    } else if gib < 8.0 {
        3
    } else if gib < 16.0 {
        4
    } else {
        5
    };

    let mut adjustment = 0;
    if cpu.core_count().unwrap_or(0) >= 8 {
        adjustment += 1;
    }
    let name = cpu.name.to_lowercase();
    if HIGH_END_CPU_TOKENS.iter().any(|t| name.contains(t)) {
        adjustment += 1;
    }
    if matches!(utilization_percent, Some(u) if u > 75.0) {
        adjustment -= 1;
    }

    let tier = (base + adjustment).clamp(1, 5) as u8;
    Rating {
        tier,
        message: RATING_MESSAGES[usize::from(tier - 1)],
    }
}

fn clamp_score(score: i32) -> u8 {
    score.clamp(0, 100) as u8
}
