//! Configuration access port trait.

use crate::domain::error::AnalyzerError;

/// Section/key lookup over a configuration source. Typed getters return
/// `Ok(None)` for a missing or blank key and `ConfigInvalid` for a value
/// that does not parse.
pub trait ConfigPort {
    fn get_string(&self, section: &str, key: &str) -> Option<String>;
    fn get_int(&self, section: &str, key: &str) -> Result<Option<i64>, AnalyzerError>;
    fn get_double(&self, section: &str, key: &str) -> Result<Option<f64>, AnalyzerError>;

    /// Non-negative integer.
    fn get_usize(&self, section: &str, key: &str) -> Result<Option<usize>, AnalyzerError> {
        match self.get_int(section, key)? {
            Some(value) => usize::try_from(value).map(Some).map_err(|_| {
                AnalyzerError::ConfigInvalid {
                    section: section.to_string(),
                    key: key.to_string(),
                    reason: format!("{key} must not be negative"),
                }
            }),
            None => Ok(None),
        }
    }
}
