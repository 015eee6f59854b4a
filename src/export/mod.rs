// Export - schema-driven column projection + generic tabular writers
//
// The projector is the only place that knows about report kinds. CSV and PDF
// writers receive a Table and never special-case a report type.

pub mod csv;
pub mod pdf;
pub mod table;

pub use self::csv::CsvWriter;
pub use self::pdf::{PdfDocument, PdfPage, PdfWriter};
pub use self::table::{project, ExportProjector, Table};

use crate::taxonomy::ReportKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Csv,
    Pdf,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Pdf => "pdf",
        }
    }
}

/// Default download name, e.g. `oem_orders_report.csv`
pub fn file_name(kind: ReportKind, format: ExportFormat) -> String {
    format!("{}.{}", kind.file_stem(), format.extension())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::taxonomy::OemSheet;

    #[test]
    fn test_file_names() {
        assert_eq!(file_name(ReportKind::Visit, ExportFormat::Pdf), "visit_report.pdf");
        assert_eq!(
            file_name(ReportKind::Oem(OemSheet::Orders), ExportFormat::Csv),
            "oem_orders_report.csv"
        );
    }
}
