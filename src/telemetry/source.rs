use super::TelemetryError;
use crate::shared::serde_ext::yaml_to_json;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

/// Where telemetry comes from. `modified` gates reloads; `None` means the source
/// cannot tell and every reload attempt reads it.
pub trait TelemetrySource: Send + Sync {
    fn describe(&self) -> String;
    fn modified(&self) -> Result<Option<SystemTime>, TelemetryError>;
    fn load(&self) -> Result<Value, TelemetryError>;
}

#[derive(Debug, Clone)]
pub struct FileTelemetrySource {
    path: PathBuf,
}

impl FileTelemetrySource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_error(&self, source: std::io::Error) -> TelemetryError {
        if source.kind() == std::io::ErrorKind::NotFound {
            return TelemetryError::Missing {
                path: self.path.display().to_string(),
            };
        }
        TelemetryError::Read {
            path: self.path.display().to_string(),
            source,
        }
    }
}

impl TelemetrySource for FileTelemetrySource {
    fn describe(&self) -> String {
        self.path.display().to_string()
    }

    fn modified(&self) -> Result<Option<SystemTime>, TelemetryError> {
        let metadata = fs::metadata(&self.path).map_err(|e| self.read_error(e))?;
        Ok(metadata.modified().ok())
    }

    fn load(&self) -> Result<Value, TelemetryError> {
        let raw = fs::read_to_string(&self.path).map_err(|e| self.read_error(e))?;
        if raw.trim().is_empty() {
            return Ok(Value::Null);
        }
        let parsed: serde_yaml::Value =
            serde_yaml::from_str(&raw).map_err(|source| TelemetryError::Parse {
                path: self.path.display().to_string(),
                source,
            })?;
        Ok(yaml_to_json(parsed))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loads_yaml_as_json() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("metadata.yaml");
        fs::write(
            &path,
            "DrivingMode: City\nmotors:\n  Track: 55\ncabin_tempreature:\n  value: 19\n  unit: C\n",
        )
        .expect("write");
        let source = FileTelemetrySource::new(&path);
        let raw = source.load().expect("load");
        assert_eq!(raw["DrivingMode"], "City");
        assert_eq!(raw["motors"]["Track"], 55);
        assert!(source.modified().expect("mtime").is_some());
    }

    #[test]
    fn missing_file_and_bad_yaml_are_typed() {
        let dir = tempfile::tempdir().expect("tempdir");
        let source = FileTelemetrySource::new(dir.path().join("absent.yaml"));
        assert!(matches!(source.modified(), Err(TelemetryError::Missing { .. })));

        let path = dir.path().join("broken.yaml");
        fs::write(&path, "motors: [unclosed").expect("write");
        let broken = FileTelemetrySource::new(&path);
        assert!(matches!(broken.load(), Err(TelemetryError::Parse { .. })));
    }
}
