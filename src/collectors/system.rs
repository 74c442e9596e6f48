use crate::collectors::{board, cpu, disk, gpu, memory, screen, sensors};
use crate::config::ProbeConfig;
use crate::state::Snapshot;
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use sysinfo::System;
use tracing::debug;

/// Runs every adapter once and stamps the result. Blocks for `sample_window` plus
/// whatever the external tools take.
pub fn assemble(system: &mut System, probes: &ProbeConfig, sample_window: Duration) -> Snapshot {
    let temps = sensors::temperatures(system);
    let cpu = cpu::cpu_info(system, &temps);
    let memory = memory::memory_info(system);
    let disks = disk::disks(system, &probes.smart_devices);
    let fans = sensors::fans();
    let motherboard_serial = board::motherboard_serial();
    let gpu_name = gpu::gpu_name();
    let screen = screen::resolution(probes.reported_screen());
    let cpu_utilization_percent = cpu::sample_utilization(sample_window);

    debug!(
        temp_groups = temps.len(),
        disks = disks.len(),
        fan_groups = fans.len(),
        gpu = gpu_name.is_some(),
        "снимок собран"
    );

    Snapshot {
        taken_at_unix: now_unix(),
        cpu,
        memory,
        disks,
        fans,
        motherboard_serial,
        gpu_name,
        screen,
        cpu_utilization_percent,
    }
}

pub fn now_unix() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::Resolution;
    use sysinfo::SystemExt;

    #[test]
    fn assembles_full_snapshot_on_any_host() {
        let mut system = System::new();
        let probes = ProbeConfig {
            smart_devices: Vec::new(),
            screen: Some(crate::config::ScreenConfig {
                width: 800,
                height: 600,
            }),
        };
        let before = now_unix();
        let snapshot = assemble(&mut system, &probes, Duration::from_millis(200));

        assert!(snapshot.taken_at_unix >= before);
        assert!(!snapshot.cpu.name.is_empty());
        assert_eq!(
            snapshot.screen,
            Some(Resolution {
                width: 800,
                height: 600
            })
        );
        if let Some(u) = snapshot.cpu_utilization_percent {
            assert!((0.0..=100.0).contains(&u));
        }
        if let Some(total) = snapshot.memory.total_bytes {
            assert!(total > 0);
        }
    }
}
