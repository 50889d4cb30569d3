//! Report output port trait.

use crate::domain::analysis::AnalysisReport;
use crate::domain::error::AnalyzerError;
use std::io::Write;

/// Port for writing analysis reports.
pub trait ReportPort {
    fn write_to(&self, report: &AnalysisReport, out: &mut dyn Write) -> Result<(), AnalyzerError>;

    /// Default implementation: creates `output_path` and delegates to `write_to`.
    fn write(&self, report: &AnalysisReport, output_path: &str) -> Result<(), AnalyzerError> {
        let mut file = std::fs::File::create(output_path)?;
        self.write_to(report, &mut file)?;
        file.flush()?;
        Ok(())
    }
}
