// 🔄 Sync boundary - REST store client + the caller-side record collection
//
// The store speaks RawRecord (dates possibly as triples). ReportSession owns
// the in-memory collection, validates before every write, normalizes every
// response, and discards fetch responses that a newer fetch superseded.

use anyhow::{anyhow, Result};
use std::sync::RwLock;
use thiserror::Error;

use crate::dates::{self, DateFallback};
use crate::error::{RecordError, ValidationError};
use crate::export::{ExportProjector, Table};
use crate::filter::{filter_with, FilterCriteria};
use crate::record::{RawRecord, Record, ReportDraft};
use crate::schema::SchemaRegistry;
use crate::taxonomy::ReportKind;

// ============================================================================
// CLIENT TRAIT
// ============================================================================

/// Fetch/create/update/delete against the report store
pub trait SyncClient: Send + Sync {
    fn list(&self) -> Result<Vec<RawRecord>>;

    /// Store assigns the id
    fn create(&self, draft: &RawRecord) -> Result<RawRecord>;

    /// Replaces the whole record
    fn update(&self, id: &str, draft: &RawRecord) -> Result<RawRecord>;

    /// Hard delete
    fn delete(&self, id: &str) -> Result<()>;
}

// ============================================================================
// IN-MEMORY CLIENT
// ============================================================================

/// Store stand-in for tests and offline use
#[derive(Debug, Default)]
pub struct InMemorySyncClient {
    rows: RwLock<Vec<RawRecord>>,
    triple_dates: bool,
}

impl InMemorySyncClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed with rows as the store would hold them
    pub fn with_rows(rows: Vec<RawRecord>) -> Self {
        InMemorySyncClient {
            rows: RwLock::new(rows),
            triple_dates: false,
        }
    }

    /// Builder: answer with `[year, month, day]` dates, like the legacy endpoints
    pub fn with_triple_dates(mut self) -> Self {
        self.triple_dates = true;
        self
    }

    pub fn len(&self) -> Result<usize> {
        let rows = self.rows.read().map_err(|_| anyhow!("store lock poisoned"))?;
        Ok(rows.len())
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }

    fn encode(&self, mut row: RawRecord) -> RawRecord {
        if self.triple_dates {
            if let Ok(date) = dates::normalize_value(&row.date) {
                row.date = serde_json::json!(date.to_triple());
            }
        }
        row
    }
}

impl SyncClient for InMemorySyncClient {
    fn list(&self) -> Result<Vec<RawRecord>> {
        let rows = self.rows.read().map_err(|_| anyhow!("store lock poisoned"))?;
        Ok(rows.iter().cloned().map(|row| self.encode(row)).collect())
    }

    fn create(&self, draft: &RawRecord) -> Result<RawRecord> {
        let mut row = draft.clone();
        row.id = Some(uuid::Uuid::new_v4().to_string());

        let mut rows = self.rows.write().map_err(|_| anyhow!("store lock poisoned"))?;
        rows.push(row.clone());
        Ok(self.encode(row))
    }

    fn update(&self, id: &str, draft: &RawRecord) -> Result<RawRecord> {
        let mut rows = self.rows.write().map_err(|_| anyhow!("store lock poisoned"))?;
        let slot = rows
            .iter_mut()
            .find(|row| row.id.as_deref() == Some(id))
            .ok_or_else(|| anyhow!("record {} not found", id))?;

        let mut row = draft.clone();
        row.id = Some(id.to_string());
        *slot = row.clone();
        Ok(self.encode(row))
    }

    fn delete(&self, id: &str) -> Result<()> {
        let mut rows = self.rows.write().map_err(|_| anyhow!("store lock poisoned"))?;
        let before = rows.len();
        rows.retain(|row| row.id.as_deref() != Some(id));
        if rows.len() == before {
            return Err(anyhow!("record {} not found", id));
        }
        Ok(())
    }
}

// ============================================================================
// SESSION
// ============================================================================

#[derive(Debug, Error)]
pub enum SubmitError {
    #[error("validation failed: {}", .0.iter().map(ToString::to_string).collect::<Vec<_>>().join("; "))]
    Validation(Vec<ValidationError>),

    #[error("store returned an unreadable record: {0}")]
    Response(#[from] RecordError),

    #[error("record {0} is not loaded")]
    UnknownRecord(String),

    #[error("record {id} is a {existing} report; changing it to {requested} needs a new record")]
    KindChanged {
        id: String,
        existing: ReportKind,
        requested: ReportKind,
    },

    #[error(transparent)]
    Sync(#[from] anyhow::Error),
}

impl SubmitError {
    pub fn validation_errors(&self) -> &[ValidationError] {
        match self {
            SubmitError::Validation(errors) => errors,
            _ => &[],
        }
    }
}

/// Identifies one fetch; only the most recently issued ticket may apply
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct FetchTicket(u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    Applied { loaded: usize, skipped: usize },
    /// A newer fetch was issued; the response was dropped
    Stale,
}

pub struct ReportSession<C: SyncClient> {
    client: C,
    registry: &'static SchemaRegistry,
    records: Vec<Record>,
    date_fallback: DateFallback,
    latest_ticket: u64,
}

impl<C: SyncClient> ReportSession<C> {
    pub fn new(client: C) -> Self {
        ReportSession {
            client,
            registry: SchemaRegistry::global(),
            records: Vec::new(),
            date_fallback: DateFallback::Reject,
            latest_ticket: 0,
        }
    }

    /// Builder: how fetched rows with unreadable dates are treated
    pub fn with_date_fallback(mut self, fallback: DateFallback) -> Self {
        self.date_fallback = fallback;
        self
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn get(&self, id: &str) -> Option<&Record> {
        self.records.iter().find(|r| r.id() == id)
    }

    // ------------------------------------------------------------------------
    // Fetch
    // ------------------------------------------------------------------------

    pub fn begin_fetch(&mut self) -> FetchTicket {
        self.latest_ticket += 1;
        FetchTicket(self.latest_ticket)
    }

    /// Replace the collection with a fetch response, unless a newer fetch
    /// has been issued since. Unreadable rows are skipped, not fatal.
    pub fn apply_fetch(&mut self, ticket: FetchTicket, rows: Vec<RawRecord>) -> FetchOutcome {
        if ticket.0 != self.latest_ticket {
            tracing::debug!(ticket = ticket.0, latest = self.latest_ticket, "Discarding stale fetch response");
            return FetchOutcome::Stale;
        }

        let today = dates::today();
        let mut records = Vec::with_capacity(rows.len());
        let mut skipped = 0;

        for row in &rows {
            match Record::from_raw_with(row, self.registry, self.date_fallback, today) {
                Ok(record) => records.push(record),
                Err(e) => {
                    skipped += 1;
                    tracing::warn!(id = ?row.id, report_type = %row.report_type, error = %e, "Skipping unreadable record");
                }
            }
        }

        let loaded = records.len();
        self.records = records;
        tracing::info!(loaded, skipped, "Report collection refreshed");
        FetchOutcome::Applied { loaded, skipped }
    }

    /// Fetch everything and apply it
    pub fn refresh(&mut self) -> Result<FetchOutcome> {
        let ticket = self.begin_fetch();
        let rows = self.client.list()?;
        Ok(self.apply_fetch(ticket, rows))
    }

    // ------------------------------------------------------------------------
    // Writes
    // ------------------------------------------------------------------------

    /// Validate and create. Bad dates are a validation failure, never "today".
    pub fn submit(&mut self, draft: &ReportDraft) -> Result<Record, SubmitError> {
        let validated = draft.validate(self.registry).map_err(SubmitError::Validation)?;
        let created = self.client.create(&validated.to_raw())?;
        let record = Record::from_raw(&created, self.registry)?;

        tracing::info!(id = %record.id(), kind = %record.kind(), "Report created");
        self.records.push(record.clone());
        Ok(record)
    }

    /// Validate and replace an existing record's fields. Kind cannot change.
    pub fn update(&mut self, id: &str, draft: &ReportDraft) -> Result<Record, SubmitError> {
        let position = self
            .records
            .iter()
            .position(|r| r.id() == id)
            .ok_or_else(|| SubmitError::UnknownRecord(id.to_string()))?;

        let existing = self.records[position].kind();
        if existing != draft.kind() {
            return Err(SubmitError::KindChanged {
                id: id.to_string(),
                existing,
                requested: draft.kind(),
            });
        }

        let validated = draft.validate(self.registry).map_err(SubmitError::Validation)?;
        let mut raw = validated.to_raw();
        raw.id = Some(id.to_string());

        let updated = self.client.update(id, &raw)?;
        let record = Record::from_raw(&updated, self.registry)?;

        tracing::info!(id = %id, kind = %record.kind(), "Report updated");
        self.records[position] = record.clone();
        Ok(record)
    }

    pub fn delete(&mut self, id: &str) -> Result<()> {
        self.client.delete(id)?;
        self.records.retain(|r| r.id() != id);
        tracing::info!(id = %id, "Report deleted");
        Ok(())
    }

    // ------------------------------------------------------------------------
    // Views
    // ------------------------------------------------------------------------

    pub fn filter(&self, criteria: &FilterCriteria) -> Vec<&Record> {
        filter_with(self.registry, &self.records, criteria)
    }

    /// Filter, then project with the kind's export columns
    pub fn export(&self, criteria: &FilterCriteria, kind: ReportKind, projector: &ExportProjector<'_>) -> Table {
        projector.project(self.filter(criteria), kind)
    }
}

// ============================================================================
// TESTS
// ============================================================================
