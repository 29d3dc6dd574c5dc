//! Reading snapshots and configuration, writing documents.

use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use marketforge::{EngineConfig, JobError, MarketSnapshot};
use serde::Serialize;

/// Reads a snapshot from a file, or from stdin when the path is `-`.
pub fn read_snapshot(path: &Path) -> Result<MarketSnapshot> {
    let text = if path == Path::new("-") {
        let mut buf = String::new();
        io::stdin()
            .read_to_string(&mut buf)
            .context("failed to read snapshot from stdin")?;
        buf
    } else {
        fs::read_to_string(path)
            .with_context(|| format!("failed to read snapshot {}", path.display()))?
    };
    serde_json::from_str(&text).with_context(|| format!("invalid snapshot {}", path.display()))
}

/// Loads the engine configuration, falling back to defaults when no path is given.
///
/// Files ending in `.yaml` or `.yml` are read as YAML, everything else as TOML.
pub fn load_config(path: Option<&PathBuf>) -> Result<EngineConfig> {
    let Some(path) = path else {
        return Ok(EngineConfig::default());
    };
    let yaml = matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("yaml" | "yml")
    );
    let config = if yaml {
        EngineConfig::from_yaml_file(path)
    } else {
        EngineConfig::load(path)
    };
    Ok(config.map_err(JobError::from)?)
}

/// Writes a document as JSON to a file, or to stdout when no path is given.
pub fn write_document<T: Serialize>(doc: &T, output: Option<&PathBuf>, pretty: bool) -> Result<()> {
    let json = if pretty {
        serde_json::to_string_pretty(doc)?
    } else {
        serde_json::to_string(doc)?
    };
    match output {
        Some(path) => fs::write(path, json + "\n")
            .with_context(|| format!("failed to write {}", path.display())),
        None => {
            let mut stdout = io::stdout().lock();
            writeln!(stdout, "{json}")?;
            stdout.flush()?;
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use marketforge_test::{MarketBuilder, MerchantFixture};

    #[test]
    fn test_snapshot_round_trips_through_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("market.json");
        let snapshot = MarketBuilder::new("centrum")
            .numbered_row(2)
            .merchant(MerchantFixture::soll("m1", 1).anywhere())
            .build();
        write_document(&snapshot, Some(&path), true).unwrap();

        let read = read_snapshot(&path).unwrap();
        assert_eq!(read, snapshot);
    }

    #[test]
    fn test_missing_snapshot_names_path() {
        let err = read_snapshot(Path::new("/nonexistent/market.json")).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/market.json"));
    }

    #[test]
    fn test_config_defaults_without_path() {
        let config = load_config(None).unwrap();
        assert_eq!(config.iteration_limit, EngineConfig::default().iteration_limit);
    }

    #[test]
    fn test_bad_config_is_job_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("engine.toml");
        fs::write(&path, "iteration_limit = \"many\"").unwrap();

        let err = load_config(Some(&path)).unwrap_err();
        assert!(matches!(err.downcast_ref::<JobError>(), Some(JobError::Config(_))));
    }

    #[test]
    fn test_yaml_config_by_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("engine.yaml");
        fs::write(&path, "iteration_limit: 50\n").unwrap();

        let config = load_config(Some(&path)).unwrap();
        assert_eq!(config.iteration_limit, 50);
    }
}
