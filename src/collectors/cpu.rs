#[cfg(not(target_os = "windows"))]
use crate::collectors::command::run_command;
use crate::collectors::command::parse_f64_loose;
use crate::collectors::sensors::TempGroups;
use crate::collectors::{first_available, Probe};
use crate::state::CpuInfo;
use std::time::Duration;
use sysinfo::{CpuExt, System, SystemExt};

pub const UNKNOWN_CPU: &str = "Unknown CPU";

/// Sensor chips that carry the package temperature, in lookup order.
pub const CPU_TEMP_CHIPS: [&str; 3] = ["coretemp", "cpu-thermal", "acpitz"];

pub fn cpu_info(system: &mut System, temps: &TempGroups) -> CpuInfo {
    system.refresh_cpu();

    let name = first_available(
        "cpu.name",
        [
            Probe::new("sysinfo", || {
                system
                    .cpus()
                    .first()
                    .map(|c| c.brand().trim().to_string())
                    .filter(|b| !b.is_empty())
            }),
            Probe::new("os", generic_processor_name),
        ],
    )
    .unwrap_or_else(|| UNKNOWN_CPU.to_string());

    let physical_cores = system.physical_core_count().map(|n| n as u32);
    let logical_cores = first_available(
        "cpu.logical_cores",
        [
            Probe::new("sysinfo", || {
                let n = system.cpus().len();
                (n > 0).then_some(n as u32)
            }),
            Probe::new("std", || {
                std::thread::available_parallelism()
                    .ok()
                    .map(|n| n.get() as u32)
            }),
        ],
    );

    let frequency_mhz = first_available(
        "cpu.frequency",
        [
            Probe::new("sysinfo", || {
                system
                    .cpus()
                    .first()
                    .map(|c| c.frequency())
                    .filter(|f| *f > 0)
                    .map(|f| f as f64)
            }),
            Probe::new("procfs", || {
                std::fs::read_to_string("/proc/cpuinfo")
                    .ok()
                    .and_then(|text| cpuinfo_mhz(&text))
            }),
        ],
    );

    CpuInfo {
        name,
        physical_cores,
        logical_cores,
        frequency_mhz,
        temperature_celsius: pick_cpu_temperature(temps),
    }
}

/// Picks the CPU temperature from sensor groups.
///
/// Known CPU chips are consulted in [`CPU_TEMP_CHIPS`] order. Otherwise the first reading
/// reading of the first group that has one is used.
pub fn pick_cpu_temperature(groups: &TempGroups) -> Option<f64> {
    for chip in CPU_TEMP_CHIPS {
        if let Some(readings) = groups.get(chip) {
            if let Some(reading) = readings.first() {
                return Some(reading.current_celsius);
            }
        }
    }

    groups
        .values()
        .find_map(|readings| readings.first())
        .map(|r| r.current_celsius)
}

/// Measures global CPU utilization across a blocking window.
pub fn sample_utilization(window: Duration) -> Option<f64> {
    let mut system = System::new();
    system.refresh_cpu();
    if system.cpus().is_empty() {
        return None;
    }
    std::thread::sleep(window.max(System::MINIMUM_CPU_UPDATE_INTERVAL));
    system.refresh_cpu();

    let usage = system.global_cpu_info().cpu_usage() as f64;
    usage.is_finite().then(|| usage.clamp(0.0, 100.0))
}

#[cfg(target_os = "windows")]
fn generic_processor_name() -> Option<String> {
    std::env::var("PROCESSOR_IDENTIFIER")
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(not(target_os = "windows"))]
fn generic_processor_name() -> Option<String> {
    let out = run_command("uname", &["-p"]);
    let out = out.trim();
    if out.is_empty() || out.eq_ignore_ascii_case("unknown") {
        return None;
    }
    Some(out.to_string())
}

fn cpuinfo_mhz(text: &str) -> Option<f64> {
    text.lines()
        .filter_map(|line| line.split_once(':'))
        .find(|(key, _)| key.trim() == "cpu MHz")
        .and_then(|(_, value)| parse_f64_loose(value))
        .filter(|v| *v > 0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collectors::sensors::TempReading;

    fn reading(c: f64) -> TempReading {
        TempReading {
            label: String::new(),
            current_celsius: c,
        }
    }

    #[test]
    fn known_chips_follow_priority_order() {
        let mut groups = TempGroups::new();
        groups.insert("acpitz".to_string(), vec![reading(30.0)]);
        groups.insert("cpu-thermal".to_string(), vec![reading(45.0)]);
        assert_eq!(pick_cpu_temperature(&groups), Some(45.0));

        groups.insert("coretemp".to_string(), vec![reading(61.0), reading(58.0)]);
        assert_eq!(pick_cpu_temperature(&groups), Some(61.0));
    }

    #[test]
    fn unknown_chips_fall_back_to_some_reading() {
        let mut groups = TempGroups::new();
        groups.insert("nvme".to_string(), vec![reading(38.0)]);
        groups.insert("k10temp".to_string(), vec![reading(52.0)]);
        let picked = pick_cpu_temperature(&groups).expect("some reading");
        assert!(picked == 38.0 || picked == 52.0);
    }

    #[test]
    fn empty_leading_group_does_not_hide_later_readings() {
        let mut groups = TempGroups::new();
        groups.insert("acpi".to_string(), Vec::new());
        groups.insert("nvme".to_string(), vec![reading(41.0)]);
        assert_eq!(pick_cpu_temperature(&groups), Some(41.0));
    }

    #[test]
    fn empty_groups_are_absent() {
        assert_eq!(pick_cpu_temperature(&TempGroups::new()), None);

        let mut groups = TempGroups::new();
        groups.insert("coretemp".to_string(), Vec::new());
        assert_eq!(pick_cpu_temperature(&groups), None);
    }

    #[test]
    fn parses_cpuinfo_frequency() {
        let text = "processor\t: 0\nmodel name\t: Test CPU\ncpu MHz\t\t: 2893.204\n";
        assert_eq!(cpuinfo_mhz(text), Some(2893.204));
        assert_eq!(cpuinfo_mhz("processor\t: 0\n"), None);
    }

    #[test]
    fn utilization_sample_is_bounded() {
        if let Some(v) = sample_utilization(Duration::from_millis(200)) {
            assert!((0.0..=100.0).contains(&v));
        }
    }

    #[test]
    fn cpu_info_never_has_empty_name() {
        let mut system = System::new();
        let info = cpu_info(&mut system, &TempGroups::new());
        assert!(!info.name.is_empty());
        assert_eq!(info.temperature_celsius, None);
    }
}
