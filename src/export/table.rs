// 📊 Export Projector - Records → ordered header/row table
// Column order comes from the schema, never from field insertion order

use serde::Serialize;

use crate::dates::DisplayFormat;
use crate::record::Record;
use crate::schema::{ReportSchema, SchemaRegistry};
use crate::taxonomy::ReportKind;

/// Generic tabular export: what every writer consumes
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Table {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new(headers: Vec<String>) -> Self {
        Table {
            headers,
            rows: Vec::new(),
        }
    }

    pub fn column_count(&self) -> usize {
        self.headers.len()
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// No data rows (the header row is always present)
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

pub struct ExportProjector<'r> {
    registry: &'r SchemaRegistry,
    display: DisplayFormat,
}

impl ExportProjector<'static> {
    /// Projector over the global registry with `MM/DD/YYYY` dates
    pub fn new() -> Self {
        ExportProjector {
            registry: SchemaRegistry::global(),
            display: DisplayFormat::default(),
        }
    }
}

impl Default for ExportProjector<'static> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'r> ExportProjector<'r> {
    pub fn with_registry(registry: &'r SchemaRegistry) -> Self {
        ExportProjector {
            registry,
            display: DisplayFormat::default(),
        }
    }

    /// Builder: date display format for date columns
    pub fn with_display(mut self, display: DisplayFormat) -> Self {
        self.display = display;
        self
    }

    pub fn project<'a, I>(&self, records: I, kind: ReportKind) -> Table
    where
        I: IntoIterator<Item = &'a Record>,
    {
        self.project_schema(records, self.registry.schema(kind))
    }

    /// Project by wire names. Unknown pairs use the generic schema's columns.
    pub fn project_for<'a, I>(&self, records: I, report_type: &str, subtype: Option<&str>) -> Table
    where
        I: IntoIterator<Item = &'a Record>,
    {
        let resolution = self.registry.resolve(report_type, subtype);
        if let Some(gap) = resolution.gap() {
            tracing::info!(report_type = %gap.report_type, subtype = ?gap.subtype, "Exporting with generic columns");
        }
        self.project_schema(records, resolution.schema())
    }

    fn project_schema<'a, I>(&self, records: I, schema: &ReportSchema) -> Table
    where
        I: IntoIterator<Item = &'a Record>,
    {
        let mut table = Table::new(schema.headers());

        for record in records {
            let row = schema
                .export_columns
                .iter()
                .map(|column| {
                    let value = record.value(column.field);
                    column.format.apply(value.as_ref(), self.display)
                })
                .collect();
            table.rows.push(row);
        }

        if table.is_empty() {
            tracing::debug!(kind = ?schema.kind, "No records to export, header-only table");
        }

        table
    }
}

/// Project with the global registry and default display format
pub fn project<'a, I>(records: I, kind: ReportKind) -> Table
where
    I: IntoIterator<Item = &'a Record>,
{
    ExportProjector::new().project(records, kind)
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{RawRecord, ReportDraft};
    use crate::taxonomy::OemSheet;
    use serde_json::json;

    fn order(id: &str, po: &str, price: Option<&str>) -> Record {
        let mut draft = ReportDraft::new(ReportKind::Oem(OemSheet::Orders))
            .with_date("2024-02-01")
            .with_field("poNumber", po)
            .unwrap()
            .with_field("orderDate", json!([2024, 2, 1]))
            .unwrap()
            .with_field("item", "Compressor \"XL\"")
            .unwrap();
        if let Some(price) = price {
            draft.set_field("xmwPrice", price).unwrap();
        }
        draft.validate(SchemaRegistry::global()).unwrap().into_record(id)
    }

    #[test]
    fn test_projects_in_schema_column_order() {
        let records = vec![order("o1", "PO-1", Some("2500")), order("o2", "PO-2", None)];
        let table = project(&records, ReportKind::Oem(OemSheet::Orders));

        assert_eq!(table.headers[0], "PO Number");
        assert_eq!(table.column_count(), 7);
        assert_eq!(
            table.rows[0],
            vec!["PO-1", "02/01/2024", "Compressor \"XL\"", "-", "2,500.00", "-", "-"]
        );
        assert_eq!(table.rows[1][4], "-");
    }

    #[test]
    fn test_empty_projection_is_header_only() {
        let table = project(&Vec::<Record>::new(), ReportKind::Customer);
        assert!(table.is_empty());
        assert_eq!(table.headers.len(), 9);
    }

    #[test]
    fn test_display_format_applies_to_date_columns() {
        let records = vec![order("o1", "PO-1", None)];
        let table = ExportProjector::new()
            .with_display(DisplayFormat::Long)
            .project(&records, ReportKind::Oem(OemSheet::Orders));
        assert_eq!(table.rows[0][1], "February 1, 2024");
    }

    #[test]
    fn test_unknown_pair_uses_generic_columns() {
        let raw: RawRecord = serde_json::from_value(json!({
            "id": "v1",
            "type": "visit",
            "title": "Site walk",
            "date": "20240105",
            "status": "approved"
        }))
        .unwrap();
        let record = Record::from_raw(&raw, SchemaRegistry::global()).unwrap();

        let table = ExportProjector::new().project_for([&record], "unknown_type", None);
        assert_eq!(table.headers, vec!["Title", "Content", "Date", "Status"]);
        assert_eq!(table.rows[0], vec!["Site walk", "-", "01/05/2024", "Approved"]);
    }

    #[test]
    fn test_accepts_filtered_references() {
        let records = vec![order("o1", "PO-1", None), order("o2", "PO-2", None)];
        let filtered: Vec<&Record> = records.iter().filter(|r| r.id() == "o2").collect();
        let table = project(filtered, ReportKind::Oem(OemSheet::Orders));
        assert_eq!(table.row_count(), 1);
        assert_eq!(table.rows[0][0], "PO-2");
    }
}
