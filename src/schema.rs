// 📐 Schema Registry - field sets, required fields and export columns per report kind
// Single source of truth for what a Record of a given (type, subtype) may hold

use std::collections::{BTreeMap, BTreeSet};
use std::sync::OnceLock;

use serde::Serialize;

use crate::dates::DisplayFormat;
use crate::error::TaxonomyError;
use crate::record::FieldValue;
use crate::taxonomy::{EmployeePeriod, OemSheet, ReportKind, ReportType};

/// Placeholder rendered for absent or empty cells
pub const EMPTY_CELL: &str = "-";

/// Wire names of the fields every schema carries
pub const TITLE: &str = "title";
pub const CONTENT: &str = "content";
pub const DATE: &str = "date";
pub const STATUS: &str = "status";

const STATUS_CHOICES: &[&str] = &["draft", "submitted", "approved"];
const VISIT_OUTCOMES: &[&str] = &["positive", "neutral", "negative", "follow_up"];

// ============================================================================
// FIELD DESCRIPTORS
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum FieldKind {
    Text,
    Number,
    /// A number rendered as money
    Currency,
    Date,
    /// Text restricted to the listed choices
    Enum(&'static [&'static str]),
}

impl FieldKind {
    pub fn describe(&self) -> String {
        match self {
            FieldKind::Text => "text".to_string(),
            FieldKind::Number => "a number".to_string(),
            FieldKind::Currency => "an amount".to_string(),
            FieldKind::Date => "a date".to_string(),
            FieldKind::Enum(choices) => format!("one of {}", choices.join(", ")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldDescriptor {
    /// Wire name (camelCase, as the sync store sends it)
    pub name: &'static str,

    /// Form / column label
    pub label: &'static str,

    pub kind: FieldKind,

    /// Must be populated before the record can be submitted
    pub required: bool,

    /// Inspected by free-text search
    pub searchable: bool,

    /// Inspected by the department filter (department, division, company)
    pub grouping: bool,
}

impl FieldDescriptor {
    pub fn new(name: &'static str, label: &'static str, kind: FieldKind) -> Self {
        FieldDescriptor {
            name,
            label,
            kind,
            required: false,
            searchable: false,
            grouping: false,
        }
    }

    pub fn text(name: &'static str, label: &'static str) -> Self {
        Self::new(name, label, FieldKind::Text)
    }

    pub fn number(name: &'static str, label: &'static str) -> Self {
        Self::new(name, label, FieldKind::Number)
    }

    pub fn currency(name: &'static str, label: &'static str) -> Self {
        Self::new(name, label, FieldKind::Currency)
    }

    pub fn date(name: &'static str, label: &'static str) -> Self {
        Self::new(name, label, FieldKind::Date)
    }

    pub fn choice(name: &'static str, label: &'static str, choices: &'static [&'static str]) -> Self {
        Self::new(name, label, FieldKind::Enum(choices))
    }

    /// Builder: mark required
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Builder: include in free-text search
    pub fn searchable(mut self) -> Self {
        self.searchable = true;
        self
    }

    /// Builder: include in department filtering
    pub fn grouping(mut self) -> Self {
        self.grouping = true;
        self
    }

    /// Whether this is one of the fields every Record stores outside its field bag
    pub fn is_core(&self) -> bool {
        matches!(self.name, TITLE | CONTENT | DATE | STATUS)
    }
}

// ============================================================================
// COLUMN DESCRIPTORS
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ColumnFormat {
    /// String passthrough
    Text,
    /// Canonical date rendered in the configured display format
    Date,
    /// Thousands-grouped with two decimals
    Currency,
    Number,
}

impl ColumnFormat {
    pub fn for_kind(kind: FieldKind) -> Self {
        match kind {
            FieldKind::Text | FieldKind::Enum(_) => ColumnFormat::Text,
            FieldKind::Number => ColumnFormat::Number,
            FieldKind::Currency => ColumnFormat::Currency,
            FieldKind::Date => ColumnFormat::Date,
        }
    }

    /// Render one cell. Absent and empty values become `-`.
    pub fn apply(&self, value: Option<&FieldValue>, display: DisplayFormat) -> String {
        let Some(value) = value else {
            return EMPTY_CELL.to_string();
        };

        let rendered = match (self, value) {
            (_, FieldValue::Date(d)) => d.to_display(display),
            (ColumnFormat::Currency, FieldValue::Number(n)) => format_currency(*n),
            (_, FieldValue::Number(n)) => format_number(*n),
            (_, FieldValue::Text(s)) => s.trim().to_string(),
        };

        if rendered.is_empty() {
            EMPTY_CELL.to_string()
        } else {
            rendered
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnDescriptor {
    pub field: &'static str,
    pub header: &'static str,
    pub format: ColumnFormat,
}

/// `1234.5` → `1,234.50`
pub fn format_currency(amount: f64) -> String {
    if !amount.is_finite() {
        return amount.to_string();
    }

    let fixed = format!("{:.2}", amount.abs());
    let (whole, cents) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, ch) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let sign = if amount < 0.0 && fixed != "0.00" { "-" } else { "" };
    format!("{}{}.{}", sign, grouped, cents)
}

fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        n.to_string()
    }
}

// ============================================================================
// REPORT SCHEMA
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct ReportSchema {
    /// None for the generic fallback schema
    pub kind: Option<ReportKind>,
    pub fields: Vec<FieldDescriptor>,
    pub required: BTreeSet<&'static str>,
    pub export_columns: Vec<ColumnDescriptor>,
}

impl ReportSchema {
    pub fn field(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn has_field(&self, name: &str) -> bool {
        self.field(name).is_some()
    }

    pub fn is_required(&self, name: &str) -> bool {
        self.required.contains(name)
    }

    pub fn searchable_fields(&self) -> impl Iterator<Item = &FieldDescriptor> {
        self.fields.iter().filter(|f| f.searchable)
    }

    pub fn grouping_fields(&self) -> impl Iterator<Item = &FieldDescriptor> {
        self.fields.iter().filter(|f| f.grouping)
    }

    /// Fields stored in a Record's field bag (everything except the core fields)
    pub fn bag_fields(&self) -> impl Iterator<Item = &FieldDescriptor> {
        self.fields.iter().filter(|f| !f.is_core())
    }

    pub fn headers(&self) -> Vec<String> {
        self.export_columns.iter().map(|c| c.header.to_string()).collect()
    }

    pub fn is_generic(&self) -> bool {
        self.kind.is_none()
    }
}

/// Builds a schema: core fields first, then the specialized ones, then the
/// ordered export projection
struct SchemaBuilder {
    kind: Option<ReportKind>,
    fields: Vec<FieldDescriptor>,
    columns: Vec<ColumnDescriptor>,
}

impl SchemaBuilder {
    fn new(kind: Option<ReportKind>) -> Self {
        let with_status = kind.map_or(true, |k| k.has_workflow());

        let mut fields = vec![
            FieldDescriptor::text(TITLE, "Title").searchable(),
            FieldDescriptor::text(CONTENT, "Content").searchable(),
            FieldDescriptor::date(DATE, "Date").required(),
        ];
        if with_status {
            fields.push(FieldDescriptor::choice(STATUS, "Status", STATUS_CHOICES));
        }

        SchemaBuilder {
            kind,
            fields,
            columns: Vec::new(),
        }
    }

    fn field(mut self, field: FieldDescriptor) -> Self {
        self.fields.push(field);
        self
    }

    /// Export column using the field's own label
    fn column(self, field: &'static str) -> Self {
        let header = self
            .fields
            .iter()
            .find(|f| f.name == field)
            .map_or(field, |f| f.label);
        self.column_as(field, header)
    }

    /// Export column with an explicit header
    fn column_as(mut self, field: &'static str, header: &'static str) -> Self {
        let format = self
            .fields
            .iter()
            .find(|f| f.name == field)
            .map_or(ColumnFormat::Text, |f| ColumnFormat::for_kind(f.kind));
        self.columns.push(ColumnDescriptor { field, header, format });
        self
    }

    fn columns(self, fields: &[&'static str]) -> Self {
        fields.iter().fold(self, |b, &f| b.column(f))
    }

    fn build(self) -> ReportSchema {
        let required = self
            .fields
            .iter()
            .filter(|f| f.required)
            .map(|f| f.name)
            .collect();

        ReportSchema {
            kind: self.kind,
            fields: self.fields,
            required,
            export_columns: self.columns,
        }
    }
}

// ============================================================================
// SCHEMA RESOLUTION
// ============================================================================

/// A (type, subtype) combination with no registry entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaGap {
    pub report_type: String,
    pub subtype: Option<String>,
    pub reason: Option<TaxonomyError>,
}

/// Result of a registry lookup. The fallback arm is explicit so callers can
/// tell unspecialized rows apart.
#[derive(Debug, Clone)]
pub enum SchemaResolution<'a> {
    Exact(&'a ReportSchema),
    Fallback {
        schema: &'a ReportSchema,
        gap: SchemaGap,
    },
}

impl<'a> SchemaResolution<'a> {
    pub fn schema(&self) -> &'a ReportSchema {
        match self {
            SchemaResolution::Exact(schema) => *schema,
            SchemaResolution::Fallback { schema, .. } => *schema,
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, SchemaResolution::Fallback { .. })
    }

    pub fn gap(&self) -> Option<&SchemaGap> {
        match self {
            SchemaResolution::Exact(_) => None,
            SchemaResolution::Fallback { gap, .. } => Some(gap),
        }
    }
}

// ============================================================================
// SCHEMA REGISTRY
// ============================================================================

pub struct SchemaRegistry {
    schemas: BTreeMap<ReportKind, ReportSchema>,
    generic: ReportSchema,
}

static GLOBAL_REGISTRY: OnceLock<SchemaRegistry> = OnceLock::new();

impl SchemaRegistry {
    /// Create a registry holding every report kind
    pub fn new() -> Self {
        let mut registry = SchemaRegistry {
            schemas: BTreeMap::new(),
            generic: SchemaBuilder::new(None)
                .columns(&[TITLE, CONTENT, DATE, STATUS])
                .build(),
        };

        registry.register_employee_reports();
        registry.register_visit_report();
        registry.register_oem_sheets();
        registry.register_customer_report();
        registry.register_planning_reports();
        registry
    }

    /// Shared immutable registry
    pub fn global() -> &'static SchemaRegistry {
        GLOBAL_REGISTRY.get_or_init(SchemaRegistry::new)
    }

    fn register(&mut self, schema: ReportSchema) {
        if let Some(kind) = schema.kind {
            self.schemas.insert(kind, schema);
        }
    }

    fn register_employee_reports(&mut self) {
        for period in [
            EmployeePeriod::Daily,
            EmployeePeriod::Weekly,
            EmployeePeriod::Monthly,
            EmployeePeriod::Yearly,
        ] {
            self.register(
                SchemaBuilder::new(Some(ReportKind::Employee(period)))
                    .field(FieldDescriptor::text("employeeName", "Employee Name").required().searchable())
                    .field(FieldDescriptor::text("employeeId", "Employee ID").required().searchable())
                    .field(FieldDescriptor::text("department", "Department").grouping())
                    .field(FieldDescriptor::number("tasksCompleted", "Tasks Completed"))
                    .field(FieldDescriptor::number("hoursWorked", "Hours Worked"))
                    .field(FieldDescriptor::text("remarks", "Remarks"))
                    .columns(&[DATE, "employeeName", "employeeId", "department", TITLE])
                    .column_as(CONTENT, "Report")
                    .columns(&["tasksCompleted", "hoursWorked", "remarks", STATUS])
                    .build(),
            );
        }
    }

    fn register_visit_report(&mut self) {
        self.register(
            SchemaBuilder::new(Some(ReportKind::Visit))
                .field(FieldDescriptor::text("customerName", "Customer Name").required().searchable())
                .field(FieldDescriptor::text("location", "Location").required().searchable())
                .field(FieldDescriptor::text("purpose", "Purpose"))
                .field(FieldDescriptor::text("visitedBy", "Visited By").searchable())
                .field(FieldDescriptor::choice("outcome", "Outcome", VISIT_OUTCOMES))
                .field(FieldDescriptor::date("nextFollowUp", "Next Follow-up"))
                .columns(&[DATE, "customerName", "location", "purpose", "visitedBy", "outcome", "nextFollowUp", TITLE])
                .column_as(CONTENT, "Notes")
                .column(STATUS)
                .build(),
        );
    }

    fn register_oem_sheets(&mut self) {
        // OEM rows are spreadsheet-shaped: no workflow status, sheet columns only
        self.register(
            SchemaBuilder::new(Some(ReportKind::Oem(OemSheet::Orders)))
                .field(FieldDescriptor::text("poNumber", "PO Number").required().searchable())
                .field(FieldDescriptor::date("orderDate", "Order Date").required())
                .field(FieldDescriptor::text("item", "Item").required().searchable())
                .field(FieldDescriptor::text("partNumber", "Part Number").searchable())
                .field(FieldDescriptor::currency("xmwPrice", "XMW Price"))
                .field(FieldDescriptor::currency("totalPoValue", "Total PO Value"))
                .field(FieldDescriptor::text("xmwInvoiceRef", "XMW Invoice Ref"))
                .columns(&["poNumber", "orderDate", "item", "partNumber", "xmwPrice", "totalPoValue", "xmwInvoiceRef"])
                .build(),
        );

        self.register(
            SchemaBuilder::new(Some(ReportKind::Oem(OemSheet::CompetitorAnalysis)))
                .field(FieldDescriptor::number("slNo", "Sl No"))
                .field(FieldDescriptor::text("itemDescription", "Item Description").required().searchable())
                .field(FieldDescriptor::text("competitor", "Competitor").required().searchable())
                .field(FieldDescriptor::text("modelNumber", "Model Number").searchable())
                .field(FieldDescriptor::currency("unitPrice", "Unit Price"))
                .columns(&["slNo", "itemDescription", "competitor", "modelNumber", "unitPrice"])
                .build(),
        );

        self.register(
            SchemaBuilder::new(Some(ReportKind::Oem(OemSheet::OpenTenders)))
                .field(FieldDescriptor::text("tenderNumber", "Tender Number").required().searchable())
                .field(FieldDescriptor::text("customerName", "Customer Name").required().searchable())
                .field(FieldDescriptor::text("itemDescription", "Item Description").searchable())
                .field(FieldDescriptor::date("dueDate", "Due Date"))
                .field(FieldDescriptor::currency("estimatedValue", "Estimated Value"))
                .columns(&["tenderNumber", "customerName", "itemDescription", "dueDate", "estimatedValue"])
                .build(),
        );

        self.register(
            SchemaBuilder::new(Some(ReportKind::Oem(OemSheet::BugetarySubmits)))
                .field(FieldDescriptor::text("quotationNumber", "Quotation Number").required().searchable())
                .field(FieldDescriptor::text("customerName", "Customer Name").required().searchable())
                .field(FieldDescriptor::text("itemDescription", "Item Description").searchable())
                .field(FieldDescriptor::date("submittedOn", "Submitted On"))
                .field(FieldDescriptor::currency("budgetValue", "Budget Value"))
                .columns(&["quotationNumber", "customerName", "itemDescription", "submittedOn", "budgetValue"])
                .build(),
        );

        self.register(
            SchemaBuilder::new(Some(ReportKind::Oem(OemSheet::LostTenders)))
                .field(FieldDescriptor::text("tenderNumber", "Tender Number").required().searchable())
                .field(FieldDescriptor::text("customerName", "Customer Name").required().searchable())
                .field(FieldDescriptor::text("itemDescription", "Item Description").searchable())
                .field(FieldDescriptor::text("winningCompetitor", "Winning Competitor").searchable())
                .field(FieldDescriptor::text("lostReason", "Lost Reason"))
                .field(FieldDescriptor::currency("tenderValue", "Tender Value"))
                .columns(&["tenderNumber", "customerName", "itemDescription", "winningCompetitor", "lostReason", "tenderValue"])
                .build(),
        );

        self.register(
            SchemaBuilder::new(Some(ReportKind::Oem(OemSheet::HoldingProjects)))
                .field(FieldDescriptor::text("projectName", "Project Name").required().searchable())
                .field(FieldDescriptor::text("customerName", "Customer Name").required().searchable())
                .field(FieldDescriptor::text("itemDescription", "Item Description").searchable())
                .field(FieldDescriptor::date("expectedDate", "Expected Date"))
                .field(FieldDescriptor::currency("projectValue", "Project Value"))
                .field(FieldDescriptor::text("remarks", "Remarks"))
                .columns(&["projectName", "customerName", "itemDescription", "expectedDate", "projectValue", "remarks"])
                .build(),
        );
    }

    fn register_customer_report(&mut self) {
        self.register(
            SchemaBuilder::new(Some(ReportKind::Customer))
                .field(FieldDescriptor::text("customerName", "Customer Name").required().searchable())
                .field(FieldDescriptor::text("designation", "Designation"))
                .field(FieldDescriptor::text("landlineOrMobile", "Landline/Mobile").required())
                .field(FieldDescriptor::text("emailId", "Email ID"))
                .field(FieldDescriptor::text("division", "Division").searchable().grouping())
                .field(FieldDescriptor::text("company", "Company").searchable().grouping())
                .columns(&[DATE, "customerName", "designation", "landlineOrMobile", "emailId", "division", "company", TITLE, STATUS])
                .build(),
        );
    }

    /// Blueprint, projection and achievement: department-level planning sheets
    fn register_planning_reports(&mut self) {
        self.register(
            SchemaBuilder::new(Some(ReportKind::Blueprint))
                .field(FieldDescriptor::text("department", "Department").required().searchable().grouping())
                .field(FieldDescriptor::text("period", "Period").required().searchable())
                .field(FieldDescriptor::text("objectives", "Objectives").searchable())
                .columns(&[DATE, "department", "period", TITLE, "objectives", CONTENT, STATUS])
                .build(),
        );

        self.register(
            SchemaBuilder::new(Some(ReportKind::Projection))
                .field(FieldDescriptor::text("department", "Department").required().searchable().grouping())
                .field(FieldDescriptor::text("period", "Period").required().searchable())
                .field(FieldDescriptor::currency("projectedAmount", "Projected Amount").required())
                .columns(&[DATE, "department", "period", "projectedAmount", TITLE, STATUS])
                .build(),
        );

        self.register(
            SchemaBuilder::new(Some(ReportKind::Achievement))
                .field(FieldDescriptor::text("department", "Department").required().searchable().grouping())
                .field(FieldDescriptor::text("period", "Period").required().searchable())
                .field(FieldDescriptor::currency("targetAmount", "Target Amount"))
                .field(FieldDescriptor::currency("achievedAmount", "Achieved Amount").required())
                .columns(&[DATE, "department", "period", "targetAmount", "achievedAmount", TITLE, STATUS])
                .build(),
        );
    }

    /// Generic `{title, content, date, status}` schema
    pub fn generic(&self) -> &ReportSchema {
        &self.generic
    }

    /// Schema for a typed kind
    pub fn lookup(&self, kind: ReportKind) -> SchemaResolution<'_> {
        match self.schemas.get(&kind) {
            Some(schema) => SchemaResolution::Exact(schema),
            None => self.fallback(SchemaGap {
                report_type: kind.report_type().to_string(),
                subtype: Some(kind.subtype().to_string()),
                reason: None,
            }),
        }
    }

    /// Shorthand for `lookup(kind).schema()`
    pub fn schema(&self, kind: ReportKind) -> &ReportSchema {
        self.lookup(kind).schema()
    }

    /// Resolve wire names. Never fails: unknown names resolve to the generic schema.
    pub fn resolve(&self, report_type: &str, subtype: Option<&str>) -> SchemaResolution<'_> {
        match ReportKind::parse(report_type, subtype) {
            Ok(kind) => self.lookup(kind),
            Err(reason) => self.fallback(SchemaGap {
                report_type: report_type.to_string(),
                subtype: subtype.map(str::to_string),
                reason: Some(reason),
            }),
        }
    }

    /// Schemas registered for a report type, in subtype order
    pub fn schemas_for(&self, report_type: ReportType) -> Vec<&ReportSchema> {
        self.schemas
            .iter()
            .filter(|(kind, _)| kind.report_type() == report_type)
            .map(|(_, schema)| schema)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.schemas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
    }

    fn fallback(&self, gap: SchemaGap) -> SchemaResolution<'_> {
        tracing::debug!(
            report_type = %gap.report_type,
            subtype = ?gap.subtype,
            "No schema registered, using generic schema"
        );
        SchemaResolution::Fallback {
            schema: &self.generic,
            gap,
        }
    }
}

impl Default for SchemaRegistry {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dates::CanonicalDate;

    #[test]
    fn test_every_kind_is_registered() {
        let registry = SchemaRegistry::new();
        assert_eq!(registry.len(), ReportKind::all().len());
        for kind in ReportKind::all() {
            assert!(!registry.lookup(kind).is_fallback(), "{} should be registered", kind);
        }
    }

    #[test]
    fn test_unknown_type_falls_back_explicitly() {
        let registry = SchemaRegistry::new();
        let resolution = registry.resolve("unknown_type", None);

        assert!(resolution.is_fallback());
        let schema = resolution.schema();
        assert!(schema.is_generic());
        let names: Vec<_> = schema.fields.iter().map(|f| f.name).collect();
        assert_eq!(names, vec!["title", "content", "date", "status"]);
        assert_eq!(schema.headers(), vec!["Title", "Content", "Date", "Status"]);

        let gap = resolution.gap().unwrap();
        assert_eq!(gap.report_type, "unknown_type");
        assert!(matches!(gap.reason, Some(TaxonomyError::UnknownType(_))));
    }

    #[test]
    fn test_invalid_pair_falls_back() {
        let registry = SchemaRegistry::new();
        assert!(registry.resolve("customer", Some("orders")).is_fallback());
        assert!(registry.resolve("oem", None).is_fallback());
    }

    #[test]
    fn test_oem_orders_schema() {
        let registry = SchemaRegistry::new();
        let schema = registry.schema(ReportKind::Oem(OemSheet::Orders));

        assert!(schema.is_required("poNumber"));
        assert!(schema.is_required("date"));
        assert!(!schema.has_field("status"));
        assert_eq!(
            schema.headers(),
            vec!["PO Number", "Order Date", "Item", "Part Number", "XMW Price", "Total PO Value", "XMW Invoice Ref"]
        );
        assert_eq!(schema.export_columns[4].format, ColumnFormat::Currency);
        assert_eq!(schema.export_columns[1].format, ColumnFormat::Date);
    }

    #[test]
    fn test_customer_grouping_and_search_fields() {
        let registry = SchemaRegistry::new();
        let schema = registry.schema(ReportKind::Customer);

        let grouping: Vec<_> = schema.grouping_fields().map(|f| f.name).collect();
        assert_eq!(grouping, vec!["division", "company"]);

        let searchable: Vec<_> = schema.searchable_fields().map(|f| f.name).collect();
        assert_eq!(searchable, vec!["title", "content", "customerName", "division", "company"]);
    }

    #[test]
    fn test_export_columns_reference_schema_fields() {
        let registry = SchemaRegistry::new();
        for kind in ReportKind::all() {
            let schema = registry.schema(kind);
            for column in &schema.export_columns {
                assert!(schema.has_field(column.field), "{}: column {} has no field", kind, column.field);
            }
        }
    }

    #[test]
    fn test_resolve_by_wire_names() {
        let registry = SchemaRegistry::global();
        let resolution = registry.resolve("OEM", Some("competitor_analysis"));
        assert!(!resolution.is_fallback());
        assert_eq!(resolution.schema().kind, Some(ReportKind::Oem(OemSheet::CompetitorAnalysis)));
        assert_eq!(registry.schemas_for(ReportType::Employee).len(), 4);
    }

    #[test]
    fn test_column_formatters() {
        let display = DisplayFormat::Us;
        assert_eq!(ColumnFormat::Text.apply(None, display), "-");
        assert_eq!(ColumnFormat::Text.apply(Some(&FieldValue::Text("  ".into())), display), "-");
        assert_eq!(ColumnFormat::Text.apply(Some(&FieldValue::Text("abc".into())), display), "abc");
        assert_eq!(ColumnFormat::Currency.apply(Some(&FieldValue::Number(1234567.5)), display), "1,234,567.50");
        assert_eq!(ColumnFormat::Number.apply(Some(&FieldValue::Number(3.0)), display), "3");
        assert_eq!(ColumnFormat::Number.apply(Some(&FieldValue::Number(7.25)), display), "7.25");

        let date = CanonicalDate::from_ymd(2024, 3, 9).unwrap();
        assert_eq!(ColumnFormat::Date.apply(Some(&FieldValue::Date(date)), display), "03/09/2024");
    }

    #[test]
    fn test_format_currency_edges() {
        assert_eq!(format_currency(0.0), "0.00");
        assert_eq!(format_currency(999.999), "1,000.00");
        assert_eq!(format_currency(-1500.0), "-1,500.00");
        assert_eq!(format_currency(-0.001), "0.00");
        assert_eq!(format_currency(100.0), "100.00");
    }
}
