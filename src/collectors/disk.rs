use crate::collectors::command::{run_command, run_command_any_status};
use crate::collectors::{first_available, Probe};
use crate::state::{DiskEntry, DiskHealth, DiskSize};
use std::collections::HashSet;
use std::path::Path;
use sysinfo::{DiskExt, System, SystemExt};
use tracing::debug;

pub const DEFAULT_SMART_DEVICES: [&str; 3] = ["/dev/sda", "/dev/nvme0n1", "/dev/vda"];

/// Disk inventory with SMART health attached to the first entry.
pub fn disks(system: &mut System, smart_devices: &[String]) -> Vec<DiskEntry> {
    let mut found = first_available(
        "disks",
        [
            Probe::new(DISK_TOOL, || non_empty(discover_with_tool())),
            Probe::new("partitions", || non_empty(partition_disks(system))),
        ],
    )
    .unwrap_or_default();

    if let Some(device) = smart_device(smart_devices, |p| p.exists()) {
        let (health, smart_ok) = read_smart_health("smartctl", device);
        debug!(device, health = health.as_str(), "результат SMART");
        apply_health(&mut found, health, smart_ok);
    }

    found
}

#[cfg(target_os = "windows")]
const DISK_TOOL: &str = "wmic";
#[cfg(not(target_os = "windows"))]
const DISK_TOOL: &str = "lsblk";

#[cfg(target_os = "windows")]
fn discover_with_tool() -> Vec<DiskEntry> {
    parse_wmic_list(&run_command(
        "wmic",
        &["diskdrive", "get", "Model,SerialNumber,Size", "/format:list"],
    ))
}

#[cfg(not(target_os = "windows"))]
fn discover_with_tool() -> Vec<DiskEntry> {
    parse_lsblk(&run_command("lsblk", &["-d", "-o", "NAME,MODEL,SIZE,TYPE"]))
}

/// Parses `wmic ... /format:list` output: `Key=Value` lines, one blank-line separated block per disk.
pub fn parse_wmic_list(text: &str) -> Vec<DiskEntry> {
    let mut out = Vec::new();
    let mut block: Option<DiskEntry> = None;

    for line in text.lines().map(str::trim) {
        if line.is_empty() {
            out.extend(block.take());
            continue;
        }
        let Some((key, value)) = line.split_once('=') else {
            continue;
        };
        let entry = block.get_or_insert_with(|| DiskEntry::new(String::new(), None));
        let value = value.trim();
        match key.trim() {
            "Model" => entry.model = value.to_string(),
            "Size" => entry.size = value.parse::<u64>().ok().map(DiskSize::Bytes),
            "SerialNumber" => entry.serial = Some(value.to_string()).filter(|v| !v.is_empty()),
            _ => {}
        }
    }
    out.extend(block);

    out
}

/// Parses `lsblk -d -o NAME,MODEL,SIZE,TYPE`. MODEL may contain spaces or be blank,
/// so it is whatever sits between NAME and the trailing SIZE TYPE pair.
///
/// Only `disk` rows are kept; `loop` and `rom` devices are skipped.
pub fn parse_lsblk(text: &str) -> Vec<DiskEntry> {
    text.lines()
        .skip(1)
        .filter_map(|line| {
            let tokens: Vec<&str> = line.split_whitespace().collect();
            if tokens.len() < 3 || tokens[tokens.len() - 1] != "disk" {
                return None;
            }
            let name = tokens[0];
            let size = tokens[tokens.len() - 2];
            let model = tokens[1..tokens.len() - 2].join(" ");
            let model = if model.is_empty() {
                format!("/dev/{name}")
            } else {
                model
            };
            Some(DiskEntry::new(model, Some(DiskSize::Raw(size.to_string()))))
        })
        .collect()
}

fn partition_disks(system: &mut System) -> Vec<DiskEntry> {
    system.refresh_disks_list();
    system.refresh_disks();

    dedup_partitions(
        system
            .disks()
            .iter()
            .map(|d| (d.name().to_string_lossy().to_string(), d.total_space())),
    )
}

/// One entry per unique device path, in first-seen order. A zero total means unknown size.
pub fn dedup_partitions(partitions: impl IntoIterator<Item = (String, u64)>) -> Vec<DiskEntry> {
    let mut seen = HashSet::new();
    partitions
        .into_iter()
        .filter_map(|(device, total)| {
            if device.is_empty() || !seen.insert(device.clone()) {
                return None;
            }
            let size = (total > 0).then_some(DiskSize::Bytes(total));
            Some(DiskEntry::new(device, size))
        })
        .collect()
}

/// First candidate whole-disk device that exists on this host. None on Windows.
pub fn smart_device<'a>(candidates: &'a [String], exists: impl Fn(&Path) -> bool) -> Option<&'a str> {
    if cfg!(target_os = "windows") {
        return None;
    }
    candidates
        .iter()
        .map(String::as_str)
        .find(|c| exists(Path::new(c)))
}

/// Runs `<program> -H <device>`. smartctl sets exit status bits on a failing disk, so the
/// output is read whatever the status.
pub fn read_smart_health(program: &str, device: &str) -> (DiskHealth, Option<bool>) {
    parse_smart_health(&run_command_any_status(program, &["-H", device]))
}

pub fn parse_smart_health(text: &str) -> (DiskHealth, Option<bool>) {
    if text.contains("PASSED") {
        (DiskHealth::Passed, Some(true))
    } else if text.contains("FAILED") {
        (DiskHealth::Failed, Some(false))
    } else {
        (DiskHealth::Unknown, None)
    }
}

/// Health is only known for the device smartctl was pointed at, taken to be the first disk.
pub fn apply_health(disks: &mut [DiskEntry], health: DiskHealth, smart_ok: Option<bool>) {
    if let Some(first) = disks.first_mut() {
        first.health = health;
        first.smart_ok = smart_ok;
    }
}

fn non_empty(disks: Vec<DiskEntry>) -> Option<Vec<DiskEntry>> {
    if disks.is_empty() {
        None
    } else {
        Some(disks)
    }
}
