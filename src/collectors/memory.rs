use crate::state::MemoryInfo;
use sysinfo::{System, SystemExt};

pub fn memory_info(system: &mut System) -> MemoryInfo {
    system.refresh_memory();
    from_totals(system.total_memory(), system.available_memory())
}

/// Builds memory figures from sysinfo totals; a zero total means the API gave nothing.
pub fn from_totals(total: u64, available: u64) -> MemoryInfo {
    if total == 0 {
        return MemoryInfo::default();
    }
    let used = total.saturating_sub(available);
    MemoryInfo {
        total_bytes: Some(total),
        used_bytes: Some(used),
        percent_used: Some((used as f64 / total as f64) * 100.0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn used_is_total_minus_available() {
        let info = from_totals(16 * 1024, 4 * 1024);
        assert_eq!(info.total_bytes, Some(16 * 1024));
        assert_eq!(info.used_bytes, Some(12 * 1024));
        assert_eq!(info.percent_used, Some(75.0));
    }

    #[test]
    fn zero_total_is_absent() {
        assert_eq!(from_totals(0, 0), MemoryInfo::default());
    }

    #[test]
    fn available_above_total_saturates() {
        let info = from_totals(100, 150);
        assert_eq!(info.used_bytes, Some(0));
        assert_eq!(info.percent_used, Some(0.0));
    }
}
