// 🔎 Filter Engine - one parameterized predicate for every report view
//
// All present criteria combine with AND. An absent criterion (or the UI's
// "all" sentinel, or an empty string) matches everything for its dimension.
// Output keeps input order.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::dates::{normalize, CanonicalDate, DateInput};
use crate::error::{DateNormalizationError, TaxonomyError};
use crate::record::{FieldValue, Record};
use crate::schema::SchemaRegistry;
use crate::taxonomy::{ReportStatus, ReportSubtype, ReportType};

/// Sentinel the report views use for "no restriction"
pub const ALL: &str = "all";

#[derive(Debug, Clone, PartialEq, Error)]
pub enum CriteriaError {
    #[error(transparent)]
    Taxonomy(#[from] TaxonomyError),

    #[error("{bound}: {source}")]
    Date {
        bound: &'static str,
        #[source]
        source: DateNormalizationError,
    },

    #[error("date range is empty: {from} is after {to}")]
    InvertedRange { from: CanonicalDate, to: CanonicalDate },
}

// ============================================================================
// FILTER CRITERIA
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FilterCriteria {
    pub report_type: Option<ReportType>,
    pub subtype: Option<ReportSubtype>,
    /// Compared against the schema's grouping fields (department, division, company)
    pub department: Option<String>,
    pub status: Option<ReportStatus>,
    /// Inclusive
    pub date_from: Option<CanonicalDate>,
    /// Inclusive
    pub date_to: Option<CanonicalDate>,
    pub free_text: Option<String>,
}

/// String-valued criteria as a form or command line provides them
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FilterParams {
    pub report_type: Option<String>,
    pub subtype: Option<String>,
    pub department: Option<String>,
    pub status: Option<String>,
    pub date_from: Option<String>,
    pub date_to: Option<String>,
    pub free_text: Option<String>,
}

/// `None`, `""` and `"all"` all mean "no restriction"
fn meaningful(value: Option<&str>) -> Option<&str> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty() && !v.eq_ignore_ascii_case(ALL))
}

impl FilterCriteria {
    /// Matches everything
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse UI/CLI strings, honoring the `all` sentinel
    pub fn from_params(params: &FilterParams) -> Result<Self, CriteriaError> {
        let bound = |name: &'static str, value: Option<&str>| -> Result<Option<CanonicalDate>, CriteriaError> {
            meaningful(value)
                .map(|v| normalize(&DateInput::from(v)).map_err(|source| CriteriaError::Date { bound: name, source }))
                .transpose()
        };

        let criteria = FilterCriteria {
            report_type: meaningful(params.report_type.as_deref())
                .map(ReportType::parse)
                .transpose()?,
            subtype: meaningful(params.subtype.as_deref())
                .map(ReportSubtype::parse)
                .transpose()?,
            department: meaningful(params.department.as_deref()).map(str::to_string),
            status: meaningful(params.status.as_deref())
                .map(ReportStatus::parse)
                .transpose()?,
            date_from: bound("dateFrom", params.date_from.as_deref())?,
            date_to: bound("dateTo", params.date_to.as_deref())?,
            free_text: meaningful(params.free_text.as_deref()).map(str::to_string),
        };

        if let (Some(from), Some(to)) = (criteria.date_from, criteria.date_to) {
            if from > to {
                return Err(CriteriaError::InvertedRange { from, to });
            }
        }

        Ok(criteria)
    }

    pub fn with_type(mut self, report_type: ReportType) -> Self {
        self.report_type = Some(report_type);
        self
    }

    pub fn with_subtype(mut self, subtype: ReportSubtype) -> Self {
        self.subtype = Some(subtype);
        self
    }

    pub fn with_department(mut self, department: impl Into<String>) -> Self {
        let department = department.into();
        self.department = meaningful(Some(&department)).map(str::to_string);
        self
    }

    pub fn with_status(mut self, status: ReportStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn with_date_range(mut self, from: Option<CanonicalDate>, to: Option<CanonicalDate>) -> Self {
        self.date_from = from;
        self.date_to = to;
        self
    }

    pub fn with_free_text(mut self, text: impl Into<String>) -> Self {
        let text = text.into();
        self.free_text = meaningful(Some(&text)).map(str::to_string);
        self
    }

    pub fn is_empty(&self) -> bool {
        *self == FilterCriteria::default()
    }

    /// Check one record against every present criterion
    pub fn matches(&self, record: &Record, registry: &SchemaRegistry) -> bool {
        self.matches_type(record)
            && self.matches_status(record)
            && self.matches_dates(record)
            && self.matches_department(record, registry)
            && self.matches_text(record, registry)
    }

    fn matches_type(&self, record: &Record) -> bool {
        self.report_type.map_or(true, |t| record.report_type() == t)
            && self.subtype.map_or(true, |s| record.subtype() == s)
    }

    fn matches_status(&self, record: &Record) -> bool {
        self.status.map_or(true, |s| record.status() == Some(s))
    }

    fn matches_dates(&self, record: &Record) -> bool {
        let date = record.date();
        self.date_from.map_or(true, |from| date >= from) && self.date_to.map_or(true, |to| date <= to)
    }

    fn matches_department(&self, record: &Record, registry: &SchemaRegistry) -> bool {
        let Some(department) = self.department.as_deref().map(str::trim) else {
            return true;
        };

        registry.schema(record.kind()).grouping_fields().any(|field| {
            record
                .value(field.name)
                .as_ref()
                .and_then(FieldValue::as_text)
                .is_some_and(|v| v.trim().to_lowercase() == department.to_lowercase())
        })
    }

    fn matches_text(&self, record: &Record, registry: &SchemaRegistry) -> bool {
        let Some(needle) = self.free_text.as_deref().map(|t| t.trim().to_lowercase()) else {
            return true;
        };

        registry
            .schema(record.kind())
            .searchable_fields()
            .filter_map(|field| record.value(field.name))
            .any(|value| searchable_text(&value).to_lowercase().contains(&needle))
    }
}

fn searchable_text(value: &FieldValue) -> String {
    match value {
        FieldValue::Text(s) => s.clone(),
        FieldValue::Number(n) => n.to_string(),
        FieldValue::Date(d) => d.to_iso(),
    }
}

// ============================================================================
// FILTER
// ============================================================================

/// Records matching `criteria`, in input order
pub fn filter<'a>(records: &'a [Record], criteria: &FilterCriteria) -> Vec<&'a Record> {
    filter_with(SchemaRegistry::global(), records, criteria)
}

pub fn filter_with<'a>(
    registry: &SchemaRegistry,
    records: &'a [Record],
    criteria: &FilterCriteria,
) -> Vec<&'a Record> {
    records
        .iter()
        .filter(|record| criteria.matches(record, registry))
        .collect()
}

/// Owned variant, for callers that keep the filtered view around
pub fn filter_owned(records: &[Record], criteria: &FilterCriteria) -> Vec<Record> {
    filter(records, criteria).into_iter().cloned().collect()
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::ReportDraft;
    use crate::taxonomy::{EmployeePeriod, OemSheet, ReportKind};

    fn customer(id: &str, division: &str, name: &str, date: &str) -> Record {
        ReportDraft::new(ReportKind::Customer)
            .with_title(format!("Visit to {}", name))
            .with_date(date)
            .with_field("customerName", name)
            .unwrap()
            .with_field("landlineOrMobile", "555-0100")
            .unwrap()
            .with_field("division", division)
            .unwrap()
            .validate(SchemaRegistry::global())
            .unwrap()
            .into_record(id)
    }

    fn order(id: &str, po: &str) -> Record {
        ReportDraft::new(ReportKind::Oem(OemSheet::Orders))
            .with_date("2024-02-01")
            .with_field("poNumber", po)
            .unwrap()
            .with_field("orderDate", "2024-02-01")
            .unwrap()
            .with_field("item", "Compressor")
            .unwrap()
            .validate(SchemaRegistry::global())
            .unwrap()
            .into_record(id)
    }

    fn employee(id: &str, name: &str, status: ReportStatus) -> Record {
        ReportDraft::new(ReportKind::Employee(EmployeePeriod::Daily))
            .with_title("Daily update")
            .with_content("Closed two tickets")
            .with_date("2024-03-15")
            .with_status(status)
            .with_field("employeeName", name)
            .unwrap()
            .with_field("employeeId", "E-77")
            .unwrap()
            .with_field("department", "IT")
            .unwrap()
            .validate(SchemaRegistry::global())
            .unwrap()
            .into_record(id)
    }

    fn sample() -> Vec<Record> {
        vec![
            customer("c1", "Sales", "Acme", "2024-01-10"),
            customer("c2", "IT", "Globex", "2024-02-10"),
            customer("c3", "Sales", "Initech", "2024-03-10"),
            order("o1", "PO-1"),
            employee("e1", "Priya", ReportStatus::Submitted),
        ]
    }

    fn ids(records: &[&Record]) -> Vec<String> {
        records.iter().map(|r| r.id().to_string()).collect()
    }

    #[test]
    fn test_department_matches_division_in_order() {
        let records = sample();
        let criteria = FilterCriteria::new().with_department("Sales");
        assert_eq!(ids(&filter(&records, &criteria)), vec!["c1", "c3"]);
    }

    #[test]
    fn test_department_matches_employee_department_case_insensitive() {
        let records = sample();
        let criteria = FilterCriteria::new().with_department("it");
        assert_eq!(ids(&filter(&records, &criteria)), vec!["c2", "e1"]);
    }

    #[test]
    fn test_empty_criteria_matches_everything() {
        let records = sample();
        assert!(FilterCriteria::new().is_empty());
        assert_eq!(filter(&records, &FilterCriteria::new()).len(), records.len());
    }

    #[test]
    fn test_all_sentinel_is_no_restriction() {
        let records = sample();
        let criteria = FilterCriteria::new().with_department("All").with_free_text("  ");
        assert!(criteria.is_empty());
        assert_eq!(filter(&records, &criteria).len(), records.len());
    }

    #[test]
    fn test_type_and_subtype() {
        let records = sample();
        let oem = FilterCriteria::new().with_type(ReportType::Oem);
        let orders = oem.clone().with_subtype(ReportSubtype::Orders);
        assert_eq!(ids(&filter(&records, &oem)), vec!["o1"]);
        assert_eq!(ids(&filter(&records, &orders)), vec!["o1"]);

        let none = FilterCriteria::new().with_subtype(ReportSubtype::None);
        assert_eq!(ids(&filter(&records, &none)), vec!["c1", "c2", "c3"]);
    }

    #[test]
    fn test_status_excludes_records_without_status() {
        let records = sample();
        let submitted = FilterCriteria::new().with_status(ReportStatus::Submitted);
        assert_eq!(ids(&filter(&records, &submitted)), vec!["e1"]);

        let draft = FilterCriteria::new().with_status(ReportStatus::Draft);
        // Customers default to draft; OEM rows have no status at all
        assert_eq!(ids(&filter(&records, &draft)), vec!["c1", "c2", "c3"]);
    }

    #[test]
    fn test_date_range_inclusive() {
        let records = sample();
        let from = CanonicalDate::from_ymd(2024, 2, 10);
        let to = CanonicalDate::from_ymd(2024, 3, 10);
        let criteria = FilterCriteria::new()
            .with_type(ReportType::Customer)
            .with_date_range(from, to);
        assert_eq!(ids(&filter(&records, &criteria)), vec!["c2", "c3"]);
    }

    #[test]
    fn test_free_text_uses_searchable_fields() {
        let records = sample();

        let by_customer = FilterCriteria::new().with_free_text("GLOBEX");
        assert_eq!(ids(&filter(&records, &by_customer)), vec!["c2"]);

        let by_employee = FilterCriteria::new().with_free_text("priya");
        assert_eq!(ids(&filter(&records, &by_employee)), vec!["e1"]);

        // Phone numbers are not searchable
        let by_phone = FilterCriteria::new().with_free_text("555-0100");
        assert!(filter(&records, &by_phone).is_empty());
    }

    #[test]
    fn test_from_params_parses_strings() {
        let params = FilterParams {
            report_type: Some("customer".into()),
            subtype: Some("all".into()),
            department: Some("Sales".into()),
            status: Some("ALL".into()),
            date_from: Some("20240101".into()),
            date_to: Some("03/31/2024".into()),
            free_text: None,
        };
        let criteria = FilterCriteria::from_params(&params).unwrap();
        assert_eq!(criteria.report_type, Some(ReportType::Customer));
        assert_eq!(criteria.subtype, None);
        assert_eq!(criteria.status, None);
        assert_eq!(criteria.date_to, CanonicalDate::from_ymd(2024, 3, 31));

        let records = sample();
        assert_eq!(ids(&filter(&records, &criteria)), vec!["c1", "c3"]);
    }

    #[test]
    fn test_from_params_rejects_bad_input() {
        let bad_type = FilterParams {
            report_type: Some("payroll".into()),
            ..Default::default()
        };
        assert!(matches!(FilterCriteria::from_params(&bad_type), Err(CriteriaError::Taxonomy(_))));

        let bad_date = FilterParams {
            date_from: Some("yesterday".into()),
            ..Default::default()
        };
        assert!(matches!(
            FilterCriteria::from_params(&bad_date),
            Err(CriteriaError::Date { bound: "dateFrom", .. })
        ));

        let inverted = FilterParams {
            date_from: Some("2024-05-01".into()),
            date_to: Some("2024-04-01".into()),
            ..Default::default()
        };
        assert!(matches!(
            FilterCriteria::from_params(&inverted),
            Err(CriteriaError::InvertedRange { .. })
        ));
    }

    #[test]
    fn test_filter_is_idempotent() {
        let records = sample();
        let criteria = FilterCriteria::new().with_department("Sales").with_free_text("a");
        let once = filter_owned(&records, &criteria);
        let twice = filter_owned(&once, &criteria);
        assert_eq!(once, twice);
    }
}
