// 🗂️ Report Taxonomy - closed set of (type, subtype) pairs
// ReportKind is the tag of every Record: an invalid pair cannot be constructed

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::TaxonomyError;

// ============================================================================
// REPORT TYPE
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportType {
    Employee,
    Visit,
    Oem,
    Customer,
    Blueprint,
    Projection,
    Achievement,
}

impl ReportType {
    pub const ALL: [ReportType; 7] = [
        ReportType::Employee,
        ReportType::Visit,
        ReportType::Oem,
        ReportType::Customer,
        ReportType::Blueprint,
        ReportType::Projection,
        ReportType::Achievement,
    ];

    /// Wire name used by the sync store
    pub fn as_str(&self) -> &'static str {
        match self {
            ReportType::Employee => "employee",
            ReportType::Visit => "visit",
            ReportType::Oem => "oem",
            ReportType::Customer => "customer",
            ReportType::Blueprint => "blueprint",
            ReportType::Projection => "projection",
            ReportType::Achievement => "achievement",
        }
    }

    /// Human-readable name for headings
    pub fn label(&self) -> &'static str {
        match self {
            ReportType::Employee => "Employee Report",
            ReportType::Visit => "Visit Report",
            ReportType::Oem => "OEM Report",
            ReportType::Customer => "Customer Report",
            ReportType::Blueprint => "Blueprint",
            ReportType::Projection => "Projection",
            ReportType::Achievement => "Achievement",
        }
    }

    /// Subtypes defined for this type. Empty means the implicit `none` subtype.
    pub fn subtypes(&self) -> &'static [ReportSubtype] {
        match self {
            ReportType::Employee => &[
                ReportSubtype::Daily,
                ReportSubtype::Weekly,
                ReportSubtype::Monthly,
                ReportSubtype::Yearly,
            ],
            ReportType::Oem => &[
                ReportSubtype::Orders,
                ReportSubtype::CompetitorAnalysis,
                ReportSubtype::OpenTenders,
                ReportSubtype::BugetarySubmits,
                ReportSubtype::LostTenders,
                ReportSubtype::HoldingProjects,
            ],
            _ => &[],
        }
    }

    pub fn parse(value: &str) -> Result<Self, TaxonomyError> {
        let needle = value.trim().to_lowercase();
        ReportType::ALL
            .into_iter()
            .find(|t| t.as_str() == needle)
            .ok_or_else(|| TaxonomyError::UnknownType(value.to_string()))
    }
}

impl fmt::Display for ReportType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// REPORT SUBTYPE
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportSubtype {
    /// Implicit subtype of types without a subtype set
    None,
    Daily,
    Weekly,
    Monthly,
    Yearly,
    Orders,
    CompetitorAnalysis,
    OpenTenders,
    /// Wire spelling kept as-is
    BugetarySubmits,
    LostTenders,
    HoldingProjects,
}

impl ReportSubtype {
    pub const ALL: [ReportSubtype; 11] = [
        ReportSubtype::None,
        ReportSubtype::Daily,
        ReportSubtype::Weekly,
        ReportSubtype::Monthly,
        ReportSubtype::Yearly,
        ReportSubtype::Orders,
        ReportSubtype::CompetitorAnalysis,
        ReportSubtype::OpenTenders,
        ReportSubtype::BugetarySubmits,
        ReportSubtype::LostTenders,
        ReportSubtype::HoldingProjects,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ReportSubtype::None => "none",
            ReportSubtype::Daily => "daily",
            ReportSubtype::Weekly => "weekly",
            ReportSubtype::Monthly => "monthly",
            ReportSubtype::Yearly => "yearly",
            ReportSubtype::Orders => "orders",
            ReportSubtype::CompetitorAnalysis => "competitor_analysis",
            ReportSubtype::OpenTenders => "open_tenders",
            ReportSubtype::BugetarySubmits => "bugetary_submits",
            ReportSubtype::LostTenders => "lost_tenders",
            ReportSubtype::HoldingProjects => "holding_projects",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ReportSubtype::None => "",
            ReportSubtype::Daily => "Daily",
            ReportSubtype::Weekly => "Weekly",
            ReportSubtype::Monthly => "Monthly",
            ReportSubtype::Yearly => "Yearly",
            ReportSubtype::Orders => "Orders",
            ReportSubtype::CompetitorAnalysis => "Competitor Analysis",
            ReportSubtype::OpenTenders => "Open Tenders",
            ReportSubtype::BugetarySubmits => "Budgetary Submits",
            ReportSubtype::LostTenders => "Lost Tenders",
            ReportSubtype::HoldingProjects => "Holding Projects",
        }
    }

    /// Parse a subtype name. Empty input, `none` and the `all` sentinel are not
    /// subtypes; callers decide what an absent subtype means.
    pub fn parse(value: &str) -> Result<Self, TaxonomyError> {
        let needle = value.trim().to_lowercase();
        ReportSubtype::ALL
            .into_iter()
            .find(|s| s.as_str() == needle)
            .ok_or_else(|| TaxonomyError::UnknownSubtype(value.to_string()))
    }
}

impl fmt::Display for ReportSubtype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// REPORT KIND (tagged union of valid pairs)
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EmployeePeriod {
    Daily,
    Weekly,
    Monthly,
    Yearly,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum OemSheet {
    Orders,
    CompetitorAnalysis,
    OpenTenders,
    BugetarySubmits,
    LostTenders,
    HoldingProjects,
}

/// The discriminant of a Record. Fixed at creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ReportKind {
    Employee(EmployeePeriod),
    Visit,
    Oem(OemSheet),
    Customer,
    Blueprint,
    Projection,
    Achievement,
}

impl ReportKind {
    /// Build a kind from a type and an optional subtype.
    ///
    /// Types with a subtype set require one of their own subtypes; types
    /// without one accept only an absent subtype or `none`.
    pub fn new(report_type: ReportType, subtype: Option<ReportSubtype>) -> Result<Self, TaxonomyError> {
        let subtype = subtype.unwrap_or(ReportSubtype::None);
        let kind = match (report_type, subtype) {
            (ReportType::Employee, ReportSubtype::Daily) => ReportKind::Employee(EmployeePeriod::Daily),
            (ReportType::Employee, ReportSubtype::Weekly) => ReportKind::Employee(EmployeePeriod::Weekly),
            (ReportType::Employee, ReportSubtype::Monthly) => ReportKind::Employee(EmployeePeriod::Monthly),
            (ReportType::Employee, ReportSubtype::Yearly) => ReportKind::Employee(EmployeePeriod::Yearly),
            (ReportType::Oem, ReportSubtype::Orders) => ReportKind::Oem(OemSheet::Orders),
            (ReportType::Oem, ReportSubtype::CompetitorAnalysis) => ReportKind::Oem(OemSheet::CompetitorAnalysis),
            (ReportType::Oem, ReportSubtype::OpenTenders) => ReportKind::Oem(OemSheet::OpenTenders),
            (ReportType::Oem, ReportSubtype::BugetarySubmits) => ReportKind::Oem(OemSheet::BugetarySubmits),
            (ReportType::Oem, ReportSubtype::LostTenders) => ReportKind::Oem(OemSheet::LostTenders),
            (ReportType::Oem, ReportSubtype::HoldingProjects) => ReportKind::Oem(OemSheet::HoldingProjects),
            (ReportType::Visit, ReportSubtype::None) => ReportKind::Visit,
            (ReportType::Customer, ReportSubtype::None) => ReportKind::Customer,
            (ReportType::Blueprint, ReportSubtype::None) => ReportKind::Blueprint,
            (ReportType::Projection, ReportSubtype::None) => ReportKind::Projection,
            (ReportType::Achievement, ReportSubtype::None) => ReportKind::Achievement,
            (report_type, subtype) => {
                return Err(TaxonomyError::InvalidPair { report_type, subtype });
            }
        };
        Ok(kind)
    }

    /// Parse wire names, e.g. `("oem", Some("orders"))`
    pub fn parse(report_type: &str, subtype: Option<&str>) -> Result<Self, TaxonomyError> {
        let report_type = ReportType::parse(report_type)?;
        let subtype = match subtype.map(str::trim) {
            None | Some("") => None,
            Some(s) => Some(ReportSubtype::parse(s)?),
        };
        ReportKind::new(report_type, subtype)
    }

    pub fn report_type(&self) -> ReportType {
        match self {
            ReportKind::Employee(_) => ReportType::Employee,
            ReportKind::Visit => ReportType::Visit,
            ReportKind::Oem(_) => ReportType::Oem,
            ReportKind::Customer => ReportType::Customer,
            ReportKind::Blueprint => ReportType::Blueprint,
            ReportKind::Projection => ReportType::Projection,
            ReportKind::Achievement => ReportType::Achievement,
        }
    }

    pub fn subtype(&self) -> ReportSubtype {
        match self {
            ReportKind::Employee(EmployeePeriod::Daily) => ReportSubtype::Daily,
            ReportKind::Employee(EmployeePeriod::Weekly) => ReportSubtype::Weekly,
            ReportKind::Employee(EmployeePeriod::Monthly) => ReportSubtype::Monthly,
            ReportKind::Employee(EmployeePeriod::Yearly) => ReportSubtype::Yearly,
            ReportKind::Oem(OemSheet::Orders) => ReportSubtype::Orders,
            ReportKind::Oem(OemSheet::CompetitorAnalysis) => ReportSubtype::CompetitorAnalysis,
            ReportKind::Oem(OemSheet::OpenTenders) => ReportSubtype::OpenTenders,
            ReportKind::Oem(OemSheet::BugetarySubmits) => ReportSubtype::BugetarySubmits,
            ReportKind::Oem(OemSheet::LostTenders) => ReportSubtype::LostTenders,
            ReportKind::Oem(OemSheet::HoldingProjects) => ReportSubtype::HoldingProjects,
            _ => ReportSubtype::None,
        }
    }

    /// Whether records of this kind carry a draft/submitted/approved status
    pub fn has_workflow(&self) -> bool {
        !matches!(self, ReportKind::Oem(_))
    }

    /// Every valid kind, in registry order
    pub fn all() -> Vec<ReportKind> {
        ReportType::ALL
            .into_iter()
            .flat_map(|t| {
                let subtypes = t.subtypes();
                if subtypes.is_empty() {
                    vec![ReportKind::new(t, None)]
                } else {
                    subtypes.iter().map(|s| ReportKind::new(t, Some(*s))).collect()
                }
            })
            .filter_map(Result::ok)
            .collect()
    }

    /// File stem used by export sinks, e.g. `oem_orders_report`
    pub fn file_stem(&self) -> String {
        match self.subtype() {
            ReportSubtype::None => format!("{}_report", self.report_type()),
            subtype => format!("{}_{}_report", self.report_type(), subtype),
        }
    }

    pub fn label(&self) -> String {
        match self.subtype() {
            ReportSubtype::None => self.report_type().label().to_string(),
            subtype => format!("{} - {}", self.report_type().label(), subtype.label()),
        }
    }
}

impl fmt::Display for ReportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.subtype() {
            ReportSubtype::None => write!(f, "{}", self.report_type()),
            subtype => write!(f, "{}/{}", self.report_type(), subtype),
        }
    }
}

// ============================================================================
// REPORT STATUS
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportStatus {
    Draft,
    Submitted,
    Approved,
}

impl ReportStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReportStatus::Draft => "draft",
            ReportStatus::Submitted => "submitted",
            ReportStatus::Approved => "approved",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ReportStatus::Draft => "Draft",
            ReportStatus::Submitted => "Submitted",
            ReportStatus::Approved => "Approved",
        }
    }

    pub fn parse(value: &str) -> Result<Self, TaxonomyError> {
        match value.trim().to_lowercase().as_str() {
            "draft" => Ok(ReportStatus::Draft),
            "submitted" => Ok(ReportStatus::Submitted),
            "approved" => Ok(ReportStatus::Approved),
            _ => Err(TaxonomyError::UnknownStatus(value.to_string())),
        }
    }
}

impl fmt::Display for ReportStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// TESTS
// ============================================================================
