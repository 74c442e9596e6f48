#[cfg(target_os = "windows")]
use crate::collectors::command::{first_value_after_header, run_powershell};
use crate::collectors::command::run_command;
use crate::collectors::{first_available, Probe};

#[cfg(not(target_os = "windows"))]
const BOARD_SERIAL_PATH: &str = "/sys/class/dmi/id/board_serial";

/// Motherboard serial number, absent when no source can be read.
pub fn motherboard_serial() -> Option<String> {
    first_available("motherboard.serial", serial_chain())
}

#[cfg(target_os = "windows")]
fn serial_chain() -> Vec<Probe<'static, String>> {
    vec![
        Probe::new("cim", || {
            clean_serial(&run_powershell(
                "(Get-CimInstance -ClassName Win32_BaseBoard -ErrorAction SilentlyContinue | Select-Object -First 1).SerialNumber",
            ))
        }),
        Probe::new("wmic", || {
            first_value_after_header(&run_command("wmic", &["baseboard", "get", "serialnumber"]))
                .and_then(|v| clean_serial(&v))
        }),
    ]
}

#[cfg(not(target_os = "windows"))]
fn serial_chain() -> Vec<Probe<'static, String>> {
    vec![
        Probe::new("sysfs", || {
            std::fs::read_to_string(BOARD_SERIAL_PATH)
                .ok()
                .and_then(|v| clean_serial(&v))
        }),
        Probe::new("dmidecode", || {
            clean_serial(&run_command("dmidecode", &["-s", "baseboard-serial-number"]))
        }),
    ]
}

pub fn clean_serial(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_serial_is_absent() {
        assert_eq!(clean_serial("  \n"), None);
        assert_eq!(clean_serial("PF2ABCDE\n").as_deref(), Some("PF2ABCDE"));
    }

    #[test]
    fn serial_lookup_never_panics() {
        if let Some(serial) = motherboard_serial() {
            assert!(!serial.trim().is_empty());
        }
    }
}
