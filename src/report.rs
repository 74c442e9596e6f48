use crate::scoring::{Rating, ScoreSet};
use crate::state::{DiskSize, Snapshot};
use serde::Serialize;
use std::fs;
use std::path::Path;
use std::time::{Duration, UNIX_EPOCH};
use thiserror::Error;

const NOT_AVAILABLE: &str = "n/a";

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("не удалось записать отчёт в {path}: {source}")]
    Write {
        path: String,
        source: std::io::Error,
    },
    #[error("не удалось сериализовать снимок: {0}")]
    Serialize(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportFormat {
    Text,
    Json,
}

#[derive(Serialize)]
struct JsonReport<'a> {
    snapshot: &'a Snapshot,
    scores: &'a ScoreSet,
    #[serde(skip_serializing_if = "Option::is_none")]
    rating: Option<&'a Rating>,
}

/// Plain-text report with one section per telemetry dimension.
pub fn format_snapshot(snapshot: &Snapshot) -> String {
    let mut out = format!("System snapshot ({})\n", format_timestamp(snapshot.taken_at_unix));

    let cpu = &snapshot.cpu;
    out.push_str(&format!(
        "\n[CPU]\nName: {}\nPhysical cores: {}\nLogical cores: {}\nFrequency: {}\nTemperature: {}\nUtilization: {}\n",
        cpu.name,
        opt(cpu.physical_cores),
        opt(cpu.logical_cores),
        opt(cpu.frequency_mhz.map(|f| format!("{f:.0} MHz"))),
        opt(cpu.temperature_celsius.map(|t| format!("{t:.1} °C"))),
        opt(snapshot.cpu_utilization_percent.map(|u| format!("{u:.1}%"))),
    ));

    let mem = &snapshot.memory;
    out.push_str(&format!(
        "\n[Memory]\nTotal: {}\nUsed: {}\nUsed percent: {}\n",
        opt_bytes(mem.total_bytes),
        opt_bytes(mem.used_bytes),
        opt(mem.percent_used.map(|p| format!("{p:.1}%"))),
    ));

    out.push_str("\n[Disks]\n");
    if snapshot.disks.is_empty() {
        out.push_str("No disks detected\n");
    }
    for (i, d) in snapshot.disks.iter().enumerate() {
        let size = match &d.size {
            Some(DiskSize::Bytes(b)) => format_gib(*b),
            Some(DiskSize::Raw(raw)) => raw.clone(),
            None => NOT_AVAILABLE.to_string(),
        };
        let smart = match d.smart_ok {
            Some(true) => "ok",
            Some(false) => "failed",
            None => NOT_AVAILABLE,
        };
        out.push_str(&format!(
            "#{i} {} | size: {size} | serial: {} | health: {} | SMART: {smart}\n",
            d.model,
            d.serial.as_deref().unwrap_or(NOT_AVAILABLE),
            d.health.as_str(),
        ));
    }

    out.push_str("\n[Fans]\n");
    if snapshot.fans.is_empty() {
        out.push_str("No fan sensors\n");
    }
    for (group, readings) in &snapshot.fans {
        for r in readings {
            out.push_str(&format!(
                "{group}/{}: {}\n",
                r.label,
                opt(r.rpm.map(|v| format!("{v} RPM")))
            ));
        }
    }

    out.push_str(&format!(
        "\n[Motherboard]\nSerial: {}\n",
        snapshot.motherboard_serial.as_deref().unwrap_or(NOT_AVAILABLE)
    ));
    out.push_str(&format!(
        "\n[GPU]\nName: {}\n",
        snapshot.gpu_name.as_deref().unwrap_or(NOT_AVAILABLE)
    ));
    out.push_str(&format!(
        "\n[Screen]\nResolution: {}\n",
        opt(snapshot.screen.map(|r| format!("{}x{}", r.width, r.height)))
    ));

    out
}

pub fn format_scores(scores: &ScoreSet) -> String {
    format!(
        "\n[Scores]\nCPU: {}/100\nRAM: {}/100\nDisk: {}/100\nGPU: {}/100\n",
        scores.cpu, scores.ram, scores.disk, scores.gpu
    )
}

pub fn format_rating(rating: &Rating) -> String {
    format!("\n[Rating]\n{}/5: {}\n", rating.tier, rating.message)
}

pub fn render(
    snapshot: &Snapshot,
    scores: &ScoreSet,
    rating: Option<&Rating>,
    format: ReportFormat,
) -> Result<String, ExportError> {
    match format {
        ReportFormat::Text => {
            let mut text = format_snapshot(snapshot);
            text.push_str(&format_scores(scores));
            if let Some(r) = rating {
                text.push_str(&format_rating(r));
            }
            Ok(text)
        }
        ReportFormat::Json => Ok(serde_json::to_string_pretty(&JsonReport {
            snapshot,
            scores,
            rating,
        })?),
    }
}

/// Writes an already rendered report. No retries: the caller shows the error.
pub fn export(contents: &str, path: impl AsRef<Path>) -> Result<(), ExportError> {
    let path_ref = path.as_ref();
    fs::write(path_ref, contents).map_err(|source| ExportError::Write {
        path: path_ref.display().to_string(),
        source,
    })
}

fn format_timestamp(unix: i64) -> String {
    let st = UNIX_EPOCH + Duration::from_secs(unix.max(0) as u64);
    humantime::format_rfc3339_seconds(st).to_string()
}

fn format_gib(bytes: u64) -> String {
    format!("{:.1} GiB", bytes as f64 / 1024.0 / 1024.0 / 1024.0)
}

fn opt<T: ToString>(value: Option<T>) -> String {
    value
        .map(|v| v.to_string())
        .unwrap_or_else(|| NOT_AVAILABLE.to_string())
}

fn opt_bytes(value: Option<u64>) -> String {
    value.map(format_gib).unwrap_or_else(|| NOT_AVAILABLE.to_string())
}
