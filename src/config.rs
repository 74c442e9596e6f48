use crate::collectors::disk::DEFAULT_SMART_DEVICES;
use crate::state::Resolution;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    #[serde(default = "default_utilization_interval_secs")]
    pub utilization_interval_secs: u64,
    #[serde(default = "default_utilization_window_ms")]
    pub utilization_window_ms: u64,
    #[serde(default = "default_snapshot_sample_ms")]
    pub snapshot_sample_ms: u64,
    #[serde(default = "default_export_path")]
    pub export_path: String,
    #[serde(default)]
    pub probes: ProbeConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ProbeConfig {
    #[serde(default = "default_smart_devices")]
    pub smart_devices: Vec<String>,
    #[serde(default)]
    pub screen: Option<ScreenConfig>,
}

#[derive(Debug, Clone, Copy, Deserialize, Serialize)]
pub struct ScreenConfig {
    pub width: u32,
    pub height: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            utilization_interval_secs: default_utilization_interval_secs(),
            utilization_window_ms: default_utilization_window_ms(),
            snapshot_sample_ms: default_snapshot_sample_ms(),
            export_path: default_export_path(),
            probes: ProbeConfig::default(),
        }
    }
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            smart_devices: default_smart_devices(),
            screen: None,
        }
    }
}

impl ProbeConfig {
    pub fn reported_screen(&self) -> Option<Resolution> {
        self.screen.map(|s| Resolution {
            width: s.width,
            height: s.height,
        })
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("не удалось прочитать файл конфигурации {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },
    #[error("не удалось разобрать YAML в {path}: {source}")]
    Parse {
        path: String,
        source: serde_yaml::Error,
    },
    #[error("ошибка валидации конфигурации: {0}")]
    Validation(String),
}

impl Config {
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path_ref = path.as_ref();
        let path_display = path_ref.display().to_string();
        let text = fs::read_to_string(path_ref).map_err(|source| ConfigError::Read {
            path: path_display.clone(),
            source,
        })?;

        let cfg: Config = serde_yaml::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path_display,
            source,
        })?;

        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.utilization_interval_secs < 1 {
            return Err(ConfigError::Validation(
                "utilization_interval_secs должно быть >= 1".to_string(),
            ));
        }
        if !(100..=10_000).contains(&self.utilization_window_ms) {
            return Err(ConfigError::Validation(
                "utilization_window_ms должно быть в диапазоне 100..10000".to_string(),
            ));
        }
        if !(100..=10_000).contains(&self.snapshot_sample_ms) {
            return Err(ConfigError::Validation(
                "snapshot_sample_ms должно быть в диапазоне 100..10000".to_string(),
            ));
        }
        if self.export_path.trim().is_empty() {
            return Err(ConfigError::Validation(
                "поле export_path не должно быть пустым".to_string(),
            ));
        }

        validate_probes(&self.probes)?;

        Ok(())
    }

    pub fn utilization_interval(&self) -> Duration {
        Duration::from_secs(self.utilization_interval_secs)
    }

    pub fn utilization_window(&self) -> Duration {
        Duration::from_millis(self.utilization_window_ms)
    }

    pub fn snapshot_sample_window(&self) -> Duration {
        Duration::from_millis(self.snapshot_sample_ms)
    }

    pub fn example_yaml() -> &'static str {
        include_str!("../config.yaml.example")
    }
}

fn validate_probes(cfg: &ProbeConfig) -> Result<(), ConfigError> {
    if cfg.smart_devices.iter().any(|d| d.trim().is_empty()) {
        return Err(ConfigError::Validation(
            "probes.smart_devices[*] не должен быть пустым".to_string(),
        ));
    }
    if let Some(screen) = cfg.screen {
        if screen.width == 0 || screen.height == 0 {
            return Err(ConfigError::Validation(
                "probes.screen width и height должны быть > 0".to_string(),
            ));
        }
    }
    Ok(())
}

const fn default_utilization_interval_secs() -> u64 {
    1
}

const fn default_utilization_window_ms() -> u64 {
    1000
}

const fn default_snapshot_sample_ms() -> u64 {
    500
}

fn default_export_path() -> String {
    "./system_snapshot.txt".to_string()
}

fn default_smart_devices() -> Vec<String> {
    DEFAULT_SMART_DEVICES.iter().map(|d| d.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let cfg = Config::default();
        cfg.validate().expect("конфигурация по умолчанию валидна");
        assert_eq!(cfg.probes.smart_devices, DEFAULT_SMART_DEVICES);
        assert_eq!(cfg.snapshot_sample_window(), Duration::from_millis(500));
        assert_eq!(cfg.utilization_interval(), Duration::from_secs(1));
    }

    #[test]
    fn example_yaml_parses_and_validates() {
        let cfg: Config = serde_yaml::from_str(Config::example_yaml()).expect("пример разбирается");
        cfg.validate().expect("пример валиден");
    }

    #[test]
    fn partial_yaml_fills_defaults() {
        let cfg: Config = serde_yaml::from_str("snapshot_sample_ms: 250\nprobes:\n  screen: {width: 1280, height: 800}\n")
            .expect("разбор");
        assert_eq!(cfg.snapshot_sample_ms, 250);
        assert_eq!(cfg.utilization_interval_secs, 1);
        assert_eq!(cfg.probes.smart_devices.len(), 3);
        assert_eq!(
            cfg.probes.reported_screen(),
            Some(Resolution {
                width: 1280,
                height: 800
            })
        );
    }

    #[test]
    fn rejects_out_of_range_values() {
        let mut cfg = Config::default();
        cfg.utilization_interval_secs = 0;
        assert!(matches!(cfg.validate(), Err(ConfigError::Validation(_))));

        let mut cfg = Config::default();
        cfg.snapshot_sample_ms = 50;
        assert!(cfg.validate().is_err());

        let mut cfg = Config::default();
        cfg.probes.smart_devices.push("  ".to_string());
        assert!(cfg.validate().is_err());

        let mut cfg = Config::default();
        cfg.probes.screen = Some(ScreenConfig {
            width: 0,
            height: 1080,
        });
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn missing_file_is_read_error() {
        let err = Config::load_from_file("/definitely/not/here/hwscope.yaml").unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }
}
