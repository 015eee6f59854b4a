// 🧾 Record Model - one report instance, tagged by ReportKind
//
// A Record's field bag only ever holds fields its schema declares. Drafts are
// filled progressively and validated as a whole before submission; records
// read back from the store are normalized with the same rules, minus the
// required-field check (that invariant holds at submission time only).

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::dates::{normalize_value, CanonicalDate, DateFallback};
use crate::error::{DateNormalizationError, RecordError, ValidationError, ValidationResult};
use crate::schema::{FieldDescriptor, FieldKind, ReportSchema, SchemaRegistry, CONTENT, DATE, STATUS, TITLE};
use crate::taxonomy::{ReportKind, ReportStatus, ReportSubtype, ReportType};

// ============================================================================
// FIELD VALUES
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    Text(String),
    Number(f64),
    Date(CanonicalDate),
}

impl FieldValue {
    pub fn is_empty(&self) -> bool {
        matches!(self, FieldValue::Text(s) if s.trim().is_empty())
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            FieldValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_date(&self) -> Option<CanonicalDate> {
        match self {
            FieldValue::Date(d) => Some(*d),
            _ => None,
        }
    }

    /// Wire form: dates go back out as ISO strings
    pub fn to_json(&self) -> Value {
        match self {
            FieldValue::Text(s) => Value::String(s.clone()),
            FieldValue::Number(n) => serde_json::Number::from_f64(*n).map_or(Value::Null, Value::Number),
            FieldValue::Date(d) => Value::String(d.to_iso()),
        }
    }

    /// Read a raw JSON value according to the field's declared kind.
    ///
    /// `Ok(None)` means "absent": null, empty strings and missing dates.
    pub fn from_json(
        kind: ReportKind,
        descriptor: &FieldDescriptor,
        value: &Value,
    ) -> Result<Option<FieldValue>, ValidationError> {
        let invalid = || ValidationError::InvalidFieldValue {
            kind,
            field: descriptor.name.to_string(),
            expected: descriptor.kind.describe(),
            found: value.to_string(),
        };

        if value.is_null() {
            return Ok(None);
        }
        if let Value::String(s) = value {
            if s.trim().is_empty() {
                return Ok(None);
            }
        }

        match descriptor.kind {
            FieldKind::Text => match value {
                Value::String(s) => Ok(Some(FieldValue::Text(s.trim().to_string()))),
                // Part numbers and the like sometimes arrive as bare numbers
                Value::Number(n) => Ok(Some(FieldValue::Text(n.to_string()))),
                _ => Err(invalid()),
            },
            FieldKind::Number | FieldKind::Currency => match value {
                Value::Number(n) => n.as_f64().map(FieldValue::Number).map(Some).ok_or_else(invalid),
                Value::String(s) => parse_amount(s).map(|n| Some(FieldValue::Number(n))).ok_or_else(invalid),
                _ => Err(invalid()),
            },
            FieldKind::Date => match normalize_value(value) {
                Ok(date) => Ok(Some(FieldValue::Date(date))),
                Err(DateNormalizationError::Missing) => Ok(None),
                Err(source) => Err(ValidationError::InvalidDate {
                    field: descriptor.name.to_string(),
                    source,
                }),
            },
            FieldKind::Enum(choices) => {
                let choice = value.as_str().map(|s| s.trim().to_lowercase()).ok_or_else(invalid)?;
                if choices.contains(&choice.as_str()) {
                    Ok(Some(FieldValue::Text(choice)))
                } else {
                    Err(invalid())
                }
            }
        }
    }
}

/// "1,200.50", "$ 99", "1200" → f64
fn parse_amount(s: &str) -> Option<f64> {
    let cleaned: String = s
        .trim()
        .chars()
        .filter(|c| !matches!(c, ',' | '$' | ' '))
        .collect();
    cleaned.parse::<f64>().ok().filter(|n| n.is_finite())
}

// ============================================================================
// RAW WIRE SHAPE
// ============================================================================

/// Record as the sync store sends and accepts it. Dates may be triples.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawRecord {
    #[serde(default, deserialize_with = "id_as_string", skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(rename = "type", default, deserialize_with = "null_as_default")]
    pub report_type: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subtype: Option<String>,

    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,

    #[serde(default, deserialize_with = "null_as_default")]
    pub content: String,

    #[serde(default)]
    pub date: Value,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,

    #[serde(default, deserialize_with = "null_as_default")]
    pub attachments: Vec<String>,

    /// Subtype-specific fields, keyed by wire name
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

/// The store sends `null` for blank text and empty lists
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

fn id_as_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s)),
        Some(Value::Number(n)) => Ok(Some(n.to_string())),
        Some(other) => Err(serde::de::Error::custom(format!("unsupported id: {}", other))),
    }
}

// ============================================================================
// RECORD
// ============================================================================

/// A persisted report. `id` and `kind` never change after creation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Record {
    id: String,
    kind: ReportKind,
    title: String,
    content: String,
    date: CanonicalDate,
    status: Option<ReportStatus>,
    attachments: Vec<String>,
    fields: BTreeMap<String, FieldValue>,
}

impl Record {
    /// Normalize a raw store row. Invalid dates reject the row.
    pub fn from_raw(raw: &RawRecord, registry: &SchemaRegistry) -> Result<Record, RecordError> {
        Self::from_raw_with(raw, registry, DateFallback::Reject, crate::dates::today())
    }

    /// Like `from_raw`, with an explicit policy for an unreadable record date
    pub fn from_raw_with(
        raw: &RawRecord,
        registry: &SchemaRegistry,
        fallback: DateFallback,
        today: CanonicalDate,
    ) -> Result<Record, RecordError> {
        let id = raw
            .id
            .clone()
            .filter(|id| !id.trim().is_empty())
            .ok_or(RecordError::MissingId)?;
        let kind = ReportKind::parse(&raw.report_type, raw.subtype.as_deref())?;
        let schema = registry.schema(kind);

        let mut errors = Vec::new();

        let date = match fallback.apply(normalize_value(&raw.date), today) {
            Ok(date) => Some(date),
            Err(source) => {
                errors.push(date_error(kind, source));
                None
            }
        };

        let status = if kind.has_workflow() {
            match raw.status.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
                None => None,
                Some(s) => match ReportStatus::parse(s) {
                    Ok(status) => Some(status),
                    Err(_) => {
                        errors.push(status_error(kind, s));
                        None
                    }
                },
            }
        } else {
            None
        };

        let mut fields = BTreeMap::new();
        for (name, value) in &raw.fields {
            let Some(descriptor) = schema.field(name).filter(|d| !d.is_core()) else {
                tracing::debug!(record = %id, kind = %kind, field = %name, "Ignoring field outside schema");
                continue;
            };
            match FieldValue::from_json(kind, descriptor, value) {
                Ok(Some(v)) => {
                    fields.insert(name.clone(), v);
                }
                Ok(None) => {}
                Err(e) => errors.push(e),
            }
        }

        match date {
            Some(date) if errors.is_empty() => Ok(Record {
                id,
                kind,
                title: raw.title.trim().to_string(),
                content: raw.content.clone(),
                date,
                status,
                attachments: dedup(&raw.attachments),
                fields,
            }),
            _ => Err(RecordError::Invalid { id, errors }),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn kind(&self) -> ReportKind {
        self.kind
    }

    pub fn report_type(&self) -> ReportType {
        self.kind.report_type()
    }

    pub fn subtype(&self) -> ReportSubtype {
        self.kind.subtype()
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn date(&self) -> CanonicalDate {
        self.date
    }

    pub fn status(&self) -> Option<ReportStatus> {
        self.status
    }

    pub fn attachments(&self) -> &[String] {
        &self.attachments
    }

    /// Subtype-specific fields only
    pub fn fields(&self) -> &BTreeMap<String, FieldValue> {
        &self.fields
    }

    /// Bag field by wire name
    pub fn field(&self, name: &str) -> Option<&FieldValue> {
        self.fields.get(name)
    }

    /// Any field by wire name, core fields included. Empty values are absent.
    pub fn value(&self, name: &str) -> Option<FieldValue> {
        let value = match name {
            TITLE => FieldValue::Text(self.title.clone()),
            CONTENT => FieldValue::Text(self.content.clone()),
            DATE => FieldValue::Date(self.date),
            STATUS => FieldValue::Text(self.status?.label().to_string()),
            _ => self.fields.get(name)?.clone(),
        };
        (!value.is_empty()).then_some(value)
    }

    /// Names of every populated field, core fields included
    pub fn populated_fields(&self) -> BTreeSet<&str> {
        let mut names: BTreeSet<&str> = self.fields.keys().map(String::as_str).collect();
        names.insert(DATE);
        if !self.title.trim().is_empty() {
            names.insert(TITLE);
        }
        if !self.content.trim().is_empty() {
            names.insert(CONTENT);
        }
        if self.status.is_some() {
            names.insert(STATUS);
        }
        names
    }

    /// Required fields this record lacks, in schema order
    pub fn missing_required(&self, registry: &SchemaRegistry) -> Vec<&'static str> {
        let populated = self.populated_fields();
        registry
            .schema(self.kind)
            .fields
            .iter()
            .filter(|f| f.required && !populated.contains(f.name))
            .map(|f| f.name)
            .collect()
    }

    pub fn is_submittable(&self, registry: &SchemaRegistry) -> bool {
        self.missing_required(registry).is_empty()
    }

    /// Wire shape with ISO dates
    pub fn to_raw(&self) -> RawRecord {
        RawRecord {
            id: Some(self.id.clone()),
            ..body_to_raw(
                self.kind,
                &self.title,
                &self.content,
                self.date,
                self.status,
                &self.attachments,
                &self.fields,
            )
        }
    }
}

fn body_to_raw(
    kind: ReportKind,
    title: &str,
    content: &str,
    date: CanonicalDate,
    status: Option<ReportStatus>,
    attachments: &[String],
    fields: &BTreeMap<String, FieldValue>,
) -> RawRecord {
    let subtype = match kind.subtype() {
        ReportSubtype::None => None,
        subtype => Some(subtype.to_string()),
    };
    RawRecord {
        id: None,
        report_type: kind.report_type().to_string(),
        subtype,
        title: title.to_string(),
        content: content.to_string(),
        date: Value::String(date.to_iso()),
        status: status.map(|s| s.to_string()),
        attachments: attachments.to_vec(),
        fields: fields.iter().map(|(k, v)| (k.clone(), v.to_json())).collect(),
    }
}

fn date_error(kind: ReportKind, source: DateNormalizationError) -> ValidationError {
    match source {
        DateNormalizationError::Missing => ValidationError::MissingRequiredField {
            kind,
            field: DATE.to_string(),
        },
        source => ValidationError::InvalidDate {
            field: DATE.to_string(),
            source,
        },
    }
}

fn status_error(kind: ReportKind, found: &str) -> ValidationError {
    ValidationError::InvalidFieldValue {
        kind,
        field: STATUS.to_string(),
        expected: "one of draft, submitted, approved".to_string(),
        found: found.to_string(),
    }
}

/// Title and content take strings; null clears them
fn text_value(kind: ReportKind, field: &str, value: &Value) -> Result<String, ValidationError> {
    match value {
        Value::Null => Ok(String::new()),
        Value::String(s) => Ok(s.clone()),
        other => Err(ValidationError::InvalidFieldValue {
            kind,
            field: field.to_string(),
            expected: FieldKind::Text.describe(),
            found: other.to_string(),
        }),
    }
}

fn dedup(paths: &[String]) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(paths.len());
    for path in paths {
        let path = path.trim();
        if !path.is_empty() && !out.iter().any(|p| p == path) {
            out.push(path.to_string());
        }
    }
    out
}

// ============================================================================
// DRAFT
// ============================================================================

/// A report being filled in. Values stay raw until `validate`.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportDraft {
    id: Option<String>,
    kind: ReportKind,
    title: String,
    content: String,
    date: Value,
    status: Option<ReportStatus>,
    attachments: Vec<String>,
    fields: BTreeMap<String, Value>,
}

impl ReportDraft {
    /// Empty draft; workflow kinds start in `draft` status
    pub fn new(kind: ReportKind) -> Self {
        ReportDraft {
            id: None,
            kind,
            title: String::new(),
            content: String::new(),
            date: Value::Null,
            status: kind.has_workflow().then_some(ReportStatus::Draft),
            attachments: Vec::new(),
            fields: BTreeMap::new(),
        }
    }

    /// Draft that replaces an existing record's whole field bag on update
    pub fn from_record(record: &Record) -> Self {
        ReportDraft {
            id: Some(record.id.clone()),
            kind: record.kind,
            title: record.title.clone(),
            content: record.content.clone(),
            date: Value::String(record.date.to_iso()),
            status: record.status,
            attachments: record.attachments.clone(),
            fields: record.fields.iter().map(|(k, v)| (k.clone(), v.to_json())).collect(),
        }
    }

    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    pub fn kind(&self) -> ReportKind {
        self.kind
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.content = content.into();
        self
    }

    /// Any accepted date encoding: `"2024-03-09"`, `"20240309"`, `[2024, 3, 9]`
    pub fn with_date(mut self, date: impl Into<Value>) -> Self {
        self.date = date.into();
        self
    }

    pub fn with_status(mut self, status: ReportStatus) -> Self {
        self.status = Some(status);
        self
    }

    /// Builder form of `set_field`
    pub fn with_field(mut self, name: &str, value: impl Into<Value>) -> Result<Self, ValidationError> {
        self.set_field(name, value)?;
        Ok(self)
    }

    /// Set a schema field. Names outside the kind's schema are rejected.
    pub fn set_field(&mut self, name: &str, value: impl Into<Value>) -> Result<(), ValidationError> {
        let kind = self.kind;
        let schema = SchemaRegistry::global().schema(kind);
        let descriptor = schema.field(name).ok_or_else(|| ValidationError::UnknownField {
            kind,
            field: name.to_string(),
        })?;

        let value = value.into();
        match descriptor.name {
            TITLE => self.title = text_value(kind, TITLE, &value)?,
            CONTENT => self.content = text_value(kind, CONTENT, &value)?,
            DATE => self.date = value,
            STATUS => {
                let raw = value.as_str().unwrap_or_default();
                self.status = Some(ReportStatus::parse(raw).map_err(|_| status_error(kind, raw))?);
            }
            name => {
                self.fields.insert(name.to_string(), value);
            }
        }
        Ok(())
    }

    pub fn clear_field(&mut self, name: &str) {
        self.fields.remove(name);
    }

    /// Append a document store reference; repeats are ignored
    pub fn attach(&mut self, path: impl Into<String>) {
        let path = path.into();
        if !path.trim().is_empty() && !self.attachments.contains(&path) {
            self.attachments.push(path);
        }
    }

    pub fn attachments(&self) -> &[String] {
        &self.attachments
    }

    /// Check every submission rule and return all problems at once
    pub fn validate(&self, registry: &SchemaRegistry) -> ValidationResult<ValidatedDraft> {
        let schema = registry.schema(self.kind);
        let mut errors = Vec::new();

        let date = match normalize_value(&self.date) {
            Ok(date) => Some(date),
            Err(source) => {
                errors.push(date_error(self.kind, source));
                None
            }
        };

        if self.status.is_some() && !self.kind.has_workflow() {
            errors.push(ValidationError::UnexpectedStatus { kind: self.kind });
        }

        let mut fields = BTreeMap::new();
        for (name, value) in &self.fields {
            let Some(descriptor) = schema.field(name) else {
                errors.push(ValidationError::UnknownField {
                    kind: self.kind,
                    field: name.clone(),
                });
                continue;
            };
            match FieldValue::from_json(self.kind, descriptor, value) {
                Ok(Some(v)) => {
                    fields.insert(name.clone(), v);
                }
                Ok(None) => {}
                Err(e) => errors.push(e),
            }
        }

        errors.extend(self.missing_required(schema, &fields));

        match date {
            Some(date) if errors.is_empty() => Ok(ValidatedDraft {
                id: self.id.clone(),
                kind: self.kind,
                title: self.title.trim().to_string(),
                content: self.content.clone(),
                date,
                status: self.status,
                attachments: self.attachments.clone(),
                fields,
            }),
            _ => Err(errors),
        }
    }

    fn missing_required(
        &self,
        schema: &ReportSchema,
        fields: &BTreeMap<String, FieldValue>,
    ) -> Vec<ValidationError> {
        schema
            .fields
            .iter()
            .filter(|f| f.required)
            .filter(|f| match f.name {
                // Date problems are reported by the normalizer
                DATE => false,
                TITLE => self.title.trim().is_empty(),
                CONTENT => self.content.trim().is_empty(),
                STATUS => self.status.is_none(),
                name => !fields.contains_key(name),
            })
            .map(|f| ValidationError::MissingRequiredField {
                kind: self.kind,
                field: f.name.to_string(),
            })
            .collect()
    }
}

/// A draft that passed validation and can be sent to the sync store
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedDraft {
    id: Option<String>,
    kind: ReportKind,
    title: String,
    content: String,
    date: CanonicalDate,
    status: Option<ReportStatus>,
    attachments: Vec<String>,
    fields: BTreeMap<String, FieldValue>,
}

impl ValidatedDraft {
    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    pub fn kind(&self) -> ReportKind {
        self.kind
    }

    pub fn to_raw(&self) -> RawRecord {
        RawRecord {
            id: self.id.clone(),
            ..body_to_raw(
                self.kind,
                &self.title,
                &self.content,
                self.date,
                self.status,
                &self.attachments,
                &self.fields,
            )
        }
    }

    /// Materialize with the id the sync store assigned
    pub fn into_record(self, id: impl Into<String>) -> Record {
        Record {
            id: id.into(),
            kind: self.kind,
            title: self.title,
            content: self.content,
            date: self.date,
            status: self.status,
            attachments: self.attachments,
            fields: self.fields,
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================
