// Sensor groups keyed by chip name, the way /sys/class/hwmon exposes them:
// /sys/class/hwmon/hwmonN/name, tempN_input (millidegrees), fanN_input (RPM).

use crate::state::FanReading;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use sysinfo::{ComponentExt, System, SystemExt};

use super::{first_available, Probe};

const HWMON_ROOT: &str = "/sys/class/hwmon";
const MAX_TEMP_INPUTS: u32 = 16;
const MAX_FAN_INPUTS: u32 = 8;

#[derive(Debug, Clone, PartialEq)]
pub struct TempReading {
    pub label: String,
    pub current_celsius: f64,
}

pub type TempGroups = BTreeMap<String, Vec<TempReading>>;
pub type FanGroups = BTreeMap<String, Vec<FanReading>>;

/// Temperature readings grouped by sensor chip. Empty when no source answers.
pub fn temperatures(system: &mut System) -> TempGroups {
    let chain = [
        Probe::new("hwmon", || non_empty(read_hwmon_temps(Path::new(HWMON_ROOT)))),
        Probe::new("sysinfo", || non_empty(component_temps(system))),
    ];
    first_available("temperatures", chain).unwrap_or_default()
}

pub fn fans() -> FanGroups {
    read_hwmon_fans(Path::new(HWMON_ROOT))
}

pub fn read_hwmon_temps(root: &Path) -> TempGroups {
    let mut groups = TempGroups::new();
    for (chip, dir) in hwmon_chips(root) {
        let mut readings = Vec::new();
        for i in 1..=MAX_TEMP_INPUTS {
            let Some(raw) = read_trimmed(&dir.join(format!("temp{i}_input"))) else {
                continue;
            };
            let Ok(millis) = raw.parse::<i64>() else {
                continue;
            };
            let label = read_trimmed(&dir.join(format!("temp{i}_label"))).unwrap_or_default();
            readings.push(TempReading {
                label,
                current_celsius: millis as f64 / 1000.0,
            });
        }
        if !readings.is_empty() {
            groups.entry(chip).or_default().extend(readings);
        }
    }
    groups
}

pub fn read_hwmon_fans(root: &Path) -> FanGroups {
    let mut groups = FanGroups::new();
    for (chip, dir) in hwmon_chips(root) {
        let mut readings = Vec::new();
        for i in 1..=MAX_FAN_INPUTS {
            let input = dir.join(format!("fan{i}_input"));
            if !input.exists() {
                continue;
            }
            let rpm = read_trimmed(&input).and_then(|v| v.parse::<u32>().ok());
            let label = read_trimmed(&dir.join(format!("fan{i}_label")))
                .filter(|l| !l.is_empty())
                .unwrap_or_else(|| "fan".to_string());
            readings.push(FanReading { label, rpm });
        }
        if !readings.is_empty() {
            groups.entry(chip).or_default().extend(readings);
        }
    }
    groups
}

/// Groups sysinfo components by the chip prefix of their label ("coretemp Package id 0").
fn component_temps(system: &mut System) -> TempGroups {
    system.refresh_components_list();
    system.refresh_components();

    let mut groups = TempGroups::new();
    for component in system.components() {
        let label = component.label();
        let (chip, rest) = match label.split_once(' ') {
            Some((chip, rest)) => (chip, rest),
            None => (label, ""),
        };
        if chip.is_empty() {
            continue;
        }
        groups.entry(chip.to_string()).or_default().push(TempReading {
            label: rest.to_string(),
            current_celsius: component.temperature() as f64,
        });
    }
    groups
}

fn hwmon_chips(root: &Path) -> Vec<(String, std::path::PathBuf)> {
    let Ok(entries) = fs::read_dir(root) else {
        return Vec::new();
    };
    let mut chips: Vec<(String, std::path::PathBuf)> = entries
        .flatten()
        .map(|entry| {
            let dir = entry.path();
            let chip = read_trimmed(&dir.join("name"))
                .unwrap_or_else(|| entry.file_name().to_string_lossy().to_string());
            (chip, dir)
        })
        .collect();
    // read_dir order is filesystem dependent; hwmon0, hwmon1, ... keeps readings stable.
    chips.sort_by(|a, b| a.1.cmp(&b.1));
    chips
}

fn read_trimmed(path: &Path) -> Option<String> {
    fs::read_to_string(path).ok().map(|s| s.trim().to_string())
}

fn non_empty<K, V>(map: BTreeMap<K, V>) -> Option<BTreeMap<K, V>> {
    if map.is_empty() {
        None
    } else {
        Some(map)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn chip(root: &Path, dir: &str, name: &str, files: &[(&str, &str)]) {
        let path = root.join(dir);
        fs::create_dir_all(&path).unwrap();
        fs::write(path.join("name"), format!("{name}\n")).unwrap();
        for (file, value) in files {
            fs::write(path.join(file), format!("{value}\n")).unwrap();
        }
    }

    #[test]
    fn reads_temperatures_grouped_by_chip() {
        let tmp = TempDir::new().unwrap();
        chip(
            tmp.path(),
            "hwmon0",
            "coretemp",
            &[
                ("temp1_input", "54000"),
                ("temp1_label", "Package id 0"),
                ("temp2_input", "51500"),
            ],
        );
        chip(tmp.path(), "hwmon1", "acpitz", &[("temp1_input", "40000")]);
        chip(tmp.path(), "hwmon2", "AC", &[]);

        let groups = read_hwmon_temps(tmp.path());
        assert_eq!(groups.len(), 2);
        let core = &groups["coretemp"];
        assert_eq!(core.len(), 2);
        assert_eq!(core[0].label, "Package id 0");
        assert!((core[0].current_celsius - 54.0).abs() < f64::EPSILON);
        assert!((core[1].current_celsius - 51.5).abs() < f64::EPSILON);
        assert_eq!(core[1].label, "");
        assert!((groups["acpitz"][0].current_celsius - 40.0).abs() < f64::EPSILON);
    }

    #[test]
    fn reads_fans_with_default_label() {
        let tmp = TempDir::new().unwrap();
        chip(
            tmp.path(),
            "hwmon3",
            "nct6775",
            &[
                ("fan1_input", "1200"),
                ("fan1_label", "CPU Fan"),
                ("fan2_input", "garbage"),
            ],
        );
        chip(tmp.path(), "hwmon4", "thinkpad", &[("fan1_input", "0")]);

        let groups = read_hwmon_fans(tmp.path());
        assert_eq!(
            groups["nct6775"],
            vec![
                FanReading {
                    label: "CPU Fan".to_string(),
                    rpm: Some(1200),
                },
                FanReading {
                    label: "fan".to_string(),
                    rpm: None,
                },
            ]
        );
        assert_eq!(groups["thinkpad"][0].rpm, Some(0));
    }

    #[test]
    fn missing_root_is_empty() {
        let tmp = TempDir::new().unwrap();
        let missing = tmp.path().join("nope");
        assert!(read_hwmon_temps(&missing).is_empty());
        assert!(read_hwmon_fans(&missing).is_empty());
    }
}
