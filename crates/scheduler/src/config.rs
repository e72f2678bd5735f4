// config.rs
// Run configuration: partition parameters, runner settings and workload delays,
// loadable from a JSON file with defaults for every missing field.
use crate::error::{Error, Result};
use crate::scheduler::{RunnerConfig, StartMode};
use crate::task_splitter::RemainderPolicy;
use crate::workload::SquareWorkload;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

/// Everything needed for one partition-and-fan-out run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SchedulerConfig {
    /// Total element count; the range is `1..=max`.
    pub max: i64,
    /// Requested chunk count.
    pub chunks: i64,
    pub policy: RemainderPolicy,
    pub start: StartMode,
    /// Time the caller spends on other work between launch and join.
    pub idle_ms: u64,
    /// Per-task timeout; absent means none.
    pub task_timeout_ms: Option<u64>,
    pub min_delay_ms: u64,
    pub max_delay_ms: u64,
    /// Emit debug-level progress lines.
    pub debug: bool,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            max: 53,
            chunks: 5,
            policy: RemainderPolicy::Even,
            start: StartMode::Eager,
            idle_ms: 0,
            task_timeout_ms: None,
            min_delay_ms: 500,
            max_delay_ms: 2500,
            debug: false,
        }
    }
}

impl SchedulerConfig {
    /// Reads a JSON config file. Missing fields take their default value.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("failed to read config file {}: {e}", path.display()))
        })?;
        let config: SchedulerConfig = serde_json::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks the settings that can be rejected before partitioning. The
    /// partition preconditions themselves are left to the partitioner.
    pub fn validate(&self) -> Result<()> {
        if self.min_delay_ms > self.max_delay_ms {
            return Err(Error::Config(format!(
                "min_delay_ms ({}) must not exceed max_delay_ms ({})",
                self.min_delay_ms, self.max_delay_ms
            )));
        }
        if self.task_timeout_ms == Some(0) {
            return Err(Error::Config(
                "task_timeout_ms must be greater than 0 when set".to_string(),
            ));
        }
        Ok(())
    }

    pub fn runner_config(&self) -> RunnerConfig {
        RunnerConfig {
            start: self.start,
            task_timeout: self.task_timeout_ms.map(Duration::from_millis),
        }
    }

    pub fn workload(&self) -> Result<SquareWorkload> {
        SquareWorkload::new(
            Duration::from_millis(self.min_delay_ms),
            Duration::from_millis(self.max_delay_ms),
        )
    }

    pub fn idle(&self) -> Duration {
        Duration::from_millis(self.idle_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_config(json: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(json.as_bytes()).unwrap();
        file
    }

    #[test]
    fn missing_fields_take_defaults() {
        let file = write_config(r#"{ "max": 101, "policy": "all-in-last" }"#);
        let config = SchedulerConfig::from_json_file(file.path()).unwrap();
        assert_eq!(config.max, 101);
        assert_eq!(config.chunks, 5);
        assert_eq!(config.policy, RemainderPolicy::AllInLast);
        assert_eq!(config.start, StartMode::Eager);
        assert_eq!(config.task_timeout_ms, None);
    }

    #[test]
    fn full_config_round_trips_into_runner_settings() {
        let file = write_config(
            r#"{
                "max": 87, "chunks": 9, "policy": "ADDITIONAL_CHUNK", "start": "lazy",
                "idle_ms": 10, "task_timeout_ms": 3000, "min_delay_ms": 1,
                "max_delay_ms": 2, "debug": true
            }"#,
        );
        let config = SchedulerConfig::from_json_file(file.path()).unwrap();
        assert_eq!(config.policy, RemainderPolicy::AdditionalChunk);
        assert_eq!(
            config.runner_config(),
            RunnerConfig {
                start: StartMode::Lazy,
                task_timeout: Some(Duration::from_secs(3)),
            }
        );
        assert_eq!(config.idle(), Duration::from_millis(10));
        assert!(config.debug);
        assert!(config.workload().is_ok());
    }

    #[test]
    fn rejects_unknown_fields_and_bad_json() {
        let file = write_config(r#"{ "maximum": 5 }"#);
        assert!(matches!(
            SchedulerConfig::from_json_file(file.path()),
            Err(Error::Config(_))
        ));

        let file = write_config("not json");
        assert!(matches!(
            SchedulerConfig::from_json_file(file.path()),
            Err(Error::Config(_))
        ));
    }

    #[test]
    fn rejects_inverted_delays() {
        let config = SchedulerConfig {
            min_delay_ms: 10,
            max_delay_ms: 1,
            ..SchedulerConfig::default()
        };
        assert!(matches!(config.validate(), Err(Error::Config(_))));
    }

    #[test]
    fn missing_file_is_a_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = SchedulerConfig::from_json_file(dir.path().join("absent.json")).unwrap_err();
        assert!(err.to_string().contains("absent.json"), "{err}");
    }
}
