use crate::collectors::cpu::sample_utilization;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info};

/// Publishes a fresh CPU utilization sample every `interval` until `shutdown` flips.
///
/// Each sample blocks for `window` on the blocking pool. A sample already in progress
/// runs to completion before shutdown is noticed.
pub fn spawn_utilization_sampler(
    interval: Duration,
    window: Duration,
    tx: watch::Sender<Option<f64>>,
    mut shutdown: watch::Receiver<bool>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                _ = shutdown.changed() => {
                    info!("получен сигнал остановки сэмплера загрузки CPU");
                    break;
                }
                _ = ticker.tick() => {
                    let sample = tokio::task::spawn_blocking(move || sample_utilization(window)).await;
                    match sample {
                        Ok(value) => {
                            tx.send_replace(value);
                        }
                        Err(err) => {
                            debug!(error = %err, "замер загрузки CPU прерван");
                        }
                    }
                }
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn publishes_samples_until_shutdown() {
        let (tx, mut rx) = watch::channel(None);
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let task = spawn_utilization_sampler(
            Duration::from_millis(50),
            Duration::from_millis(200),
            tx,
            shutdown_rx,
        );

        tokio::time::timeout(Duration::from_secs(10), rx.changed())
            .await
            .expect("sample within timeout")
            .expect("sender alive");
        if let Some(v) = *rx.borrow() {
            assert!((0.0..=100.0).contains(&v));
        }

        shutdown_tx.send(true).unwrap();
        tokio::time::timeout(Duration::from_secs(10), task)
            .await
            .expect("sampler stops")
            .expect("task not panicked");
    }
}
