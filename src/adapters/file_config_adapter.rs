//! INI file configuration adapter.

use crate::domain::error::AnalyzerError;
use crate::ports::config_port::ConfigPort;
use configparser::ini::Ini;
use std::path::Path;
use std::str::FromStr;

#[derive(Debug)]
pub struct FileConfigAdapter {
    config: Ini,
}

impl FileConfigAdapter {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, AnalyzerError> {
        let path = path.as_ref();
        let mut config = Ini::new();
        config
            .load(path)
            .map_err(|reason| AnalyzerError::ConfigParse {
                file: path.display().to_string(),
                reason,
            })?;
        Ok(Self { config })
    }

    pub fn from_string(content: &str) -> Result<Self, AnalyzerError> {
        let mut config = Ini::new();
        config
            .read(content.to_string())
            .map_err(|reason| AnalyzerError::ConfigParse {
                file: "<string>".to_string(),
                reason,
            })?;
        Ok(Self { config })
    }

    fn parse<T: FromStr>(&self, section: &str, key: &str) -> Result<Option<T>, AnalyzerError> {
        let Some(raw) = self.config.get(section, key) else {
            return Ok(None);
        };
        let raw = raw.trim();
        if raw.is_empty() {
            return Ok(None);
        }
        raw.parse::<T>()
            .map(Some)
            .map_err(|_| AnalyzerError::ConfigInvalid {
                section: section.to_string(),
                key: key.to_string(),
                reason: format!("{key} is not a valid number: '{raw}'"),
            })
    }
}

impl ConfigPort for FileConfigAdapter {
    fn get_string(&self, section: &str, key: &str) -> Option<String> {
        self.config.get(section, key)
    }

    fn get_int(&self, section: &str, key: &str) -> Result<Option<i64>, AnalyzerError> {
        self.parse(section, key)
    }

    fn get_double(&self, section: &str, key: &str) -> Result<Option<f64>, AnalyzerError> {
        self.parse(section, key)
    }
}
