mod collectors;
mod config;
mod live;
mod report;
mod scoring;
mod state;

use clap::Parser;
use collectors::system::{assemble, now_unix};
use config::Config;
use report::ReportFormat;
use state::{Snapshot, State};
use std::sync::Arc;
use sysinfo::SystemExt;
use tokio::sync::{watch, RwLock};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "hwscope")]
#[command(version)]
struct Cli {
    #[arg(long)]
    config: Option<String>,
    #[arg(long)]
    print_default_config: bool,
    /// Also print the 1..5 machine rating.
    #[arg(long)]
    rate: bool,
    #[arg(long)]
    json: bool,
    /// Write the report to PATH (or the configured export_path).
    #[arg(long, num_args = 0..=1, value_name = "PATH")]
    export: Option<Option<String>>,
    /// Keep printing live CPU utilization until Ctrl+C.
    #[arg(long)]
    watch: bool,
}

#[tokio::main]
async fn main() {
    init_tracing();

    let cli = Cli::parse();
    if cli.print_default_config {
        println!("{}", Config::example_yaml());
        return;
    }

    let cfg = match cli.config.as_deref() {
        Some(path) => match Config::load_from_file(path) {
            Ok(cfg) => cfg,
            Err(err) => {
                error!(error = %err, "не удалось загрузить конфигурацию");
                std::process::exit(1);
            }
        },
        None => Config::default(),
    };

    info!(
        snapshot_sample_ms = cfg.snapshot_sample_ms,
        watch = cli.watch,
        "запуск hwscope"
    );

    let shared_state = Arc::new(RwLock::new(State::new(now_unix())));

    let snapshot = match refresh_snapshot(&cfg).await {
        Some(snapshot) => snapshot,
        None => {
            error!("сбор снимка прерван");
            std::process::exit(1);
        }
    };
    let snapshot = {
        let mut guard = shared_state.write().await;
        guard.replace_snapshot(snapshot);
        guard.current.clone()
    };
    let Some(snapshot) = snapshot else {
        return;
    };

    let scores = scoring::score(&snapshot);
    let rating = if cli.rate {
        shared_state.read().await.current_rating()
    } else {
        None
    };

    let format = if cli.json {
        ReportFormat::Json
    } else {
        ReportFormat::Text
    };
    let rendered = match report::render(&snapshot, &scores, rating.as_ref(), format) {
        Ok(text) => text,
        Err(err) => {
            error!(error = %err, "не удалось сформировать отчёт");
            std::process::exit(1);
        }
    };

    match cli.export {
        Some(path) => {
            let path = path.unwrap_or_else(|| cfg.export_path.clone());
            if let Err(err) = report::export(&rendered, &path) {
                error!(error = %err, "экспорт не выполнен");
                eprintln!("{err}");
                std::process::exit(1);
            }
            info!(path = %path, "отчёт сохранён");
        }
        None => println!("{rendered}"),
    }

    if cli.watch {
        watch_utilization(&cfg, shared_state, cli.rate).await;
    }
}

/// Full assembly on the blocking pool so the runtime stays responsive while tools run.
async fn refresh_snapshot(cfg: &Config) -> Option<Snapshot> {
    let probes = cfg.probes.clone();
    let window = cfg.snapshot_sample_window();
    match tokio::task::spawn_blocking(move || {
        let mut system = sysinfo::System::new_all();
        assemble(&mut system, &probes, window)
    })
    .await
    {
        Ok(snapshot) => Some(snapshot),
        Err(err) => {
            error!(error = %err, "задача сбора снимка завершилась аварийно");
            None
        }
    }
}

async fn watch_utilization(cfg: &Config, shared_state: Arc<RwLock<State>>, rerate: bool) {
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let (util_tx, mut util_rx) = watch::channel(None);
    let sampler = live::spawn_utilization_sampler(
        cfg.utilization_interval(),
        cfg.utilization_window(),
        util_tx,
        shutdown_rx,
    );

    loop {
        tokio::select! {
            res = tokio::signal::ctrl_c() => {
                if let Err(err) = res {
                    error!(error = %err, "не удалось дождаться Ctrl+C");
                }
                info!("получен Ctrl+C, выполняется остановка");
                break;
            }
            changed = util_rx.changed() => {
                if changed.is_err() {
                    break;
                }
                let value = *util_rx.borrow_and_update();
                let now = now_unix();
                let mut guard = shared_state.write().await;
                guard.set_live_utilization(value, now);
                let mut line = match value {
                    Some(v) => format!("[+{}s] CPU: {v:.1}%", guard.uptime_secs(now)),
                    None => format!("[+{}s] CPU: n/a", guard.uptime_secs(now)),
                };
                if rerate {
                    if let Some(r) = guard.current_rating() {
                        line.push_str(&format!(" | rating {}/5", r.tier));
                    }
                }
                drop(guard);
                println!("{line}");
            }
        }
    }

    let _ = shutdown_tx.send(true);
    let _ = sampler.await;
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
