//! # Filter Predicate Engine
//!
//! ## Purpose
//! Evaluates a structured filter-state object against normalized records.
//! Every listing page drives its client-side re-filtering through this one
//! engine instead of re-implementing per-page predicate logic.
//!
//! ## Input/Output Specification
//! - **Input**: `NormalizedRecord`, `FilterState` (ranges, multi-selects, single selects)
//! - **Output**: Boolean predicate per record, or the filtered collection
//! - **Semantics**: All active criteria are ANDed; empty/default criteria are no-ops
//!
//! ## Key Features
//! - Inclusive numeric ranges over fee and rating
//! - Multi-select sets with substring matching for tag-like fields and exact
//!   membership for enum-like fields
//! - Case-insensitive single-select equality
//! - Composition with the search matcher via `apply_filters`

use crate::normalize::NormalizedRecord;
use crate::search::{search_records, SearchField};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Record fields a criterion can bind to
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterField {
    Fee,
    Rating,
    City,
    CategoryType,
    Name,
    Tags,
}

/// How a multi-select set is matched against the record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchMode {
    /// Case-insensitive exact membership, for enum-like fields (type, city)
    Exact,
    /// Case-insensitive substring intersection, for tag-like fields
    Substring,
}

/// One filter criterion
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Criterion {
    /// Inclusive numeric range. Evaluated even when equal to the configured
    /// defaults; callers that want to skip it must omit the criterion.
    Range { min: f64, max: f64 },
    /// Multi-select set; an empty set passes unconditionally
    MultiSelect { values: Vec<String>, mode: MatchMode },
    /// Single selection; `None` or empty passes unconditionally
    Select(Option<String>),
}

/// User-driven filter state, the sole input to client-side re-filtering.
///
/// Owns no reference to any record; mutated by interaction handlers and
/// handed to the engine on every change.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FilterState {
    criteria: BTreeMap<FilterField, Criterion>,
}

impl FilterState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set or replace the criterion bound to `field`
    pub fn set(&mut self, field: FilterField, criterion: Criterion) -> &mut Self {
        self.criteria.insert(field, criterion);
        self
    }

    /// Remove the criterion bound to `field`
    pub fn remove(&mut self, field: FilterField) -> &mut Self {
        self.criteria.remove(&field);
        self
    }

    /// Drop all criteria (the "reset filters" action)
    pub fn clear(&mut self) {
        self.criteria.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.criteria.is_empty()
    }

    /// Iterate over the active criteria
    pub fn criteria(&self) -> impl Iterator<Item = (&FilterField, &Criterion)> {
        self.criteria.iter()
    }
}

/// Evaluate the full filter state against one record. All active criteria
/// must pass.
pub fn matches(record: &NormalizedRecord, filters: &FilterState) -> bool {
    filters
        .criteria()
        .all(|(field, criterion)| matches_criterion(record, *field, criterion))
}

fn matches_criterion(record: &NormalizedRecord, field: FilterField, criterion: &Criterion) -> bool {
    match criterion {
        Criterion::Range { min, max } => match numeric_value(record, field) {
            // A missing numeric value cannot lie inside an active range
            None => false,
            Some(value) => value >= *min && value <= *max,
        },
        Criterion::MultiSelect { values, mode } => {
            if values.is_empty() {
                return true;
            }
            match field {
                FilterField::Tags => values.iter().any(|selected| {
                    let selected = selected.to_lowercase();
                    record
                        .tags
                        .iter()
                        .any(|tag| match mode {
                            MatchMode::Substring => tag.to_lowercase().contains(&selected),
                            MatchMode::Exact => tag.to_lowercase() == selected,
                        })
                }),
                _ => {
                    let value = match scalar_value(record, field) {
                        Some(value) => value.to_lowercase(),
                        None => return false,
                    };
                    values.iter().any(|selected| {
                        let selected = selected.to_lowercase();
                        match mode {
                            MatchMode::Exact => value == selected,
                            MatchMode::Substring => value.contains(&selected),
                        }
                    })
                }
            }
        }
        Criterion::Select(selection) => match selection.as_deref().map(str::trim) {
            None | Some("") => true,
            Some(selected) => scalar_value(record, field)
                .map(|value| value.eq_ignore_ascii_case(selected))
                .unwrap_or(false),
        },
    }
}

fn numeric_value(record: &NormalizedRecord, field: FilterField) -> Option<f64> {
    match field {
        FilterField::Fee => record.fee,
        FilterField::Rating => Some(record.rating),
        _ => None,
    }
}

fn scalar_value(record: &NormalizedRecord, field: FilterField) -> Option<&str> {
    match field {
        FilterField::City => Some(&record.city),
        FilterField::CategoryType => Some(&record.category_type),
        FilterField::Name => Some(&record.name),
        _ => None,
    }
}

/// Apply predicate filtering and free-text search in one pass.
///
/// This is the client-side half of the listing pipeline: the working set is
/// narrowed by the filter state, then by the debounce-gated query over name
/// and city.
pub fn apply_filters(
    records: &[NormalizedRecord],
    filters: &FilterState,
    query: &str,
) -> Vec<NormalizedRecord> {
    let filtered: Vec<NormalizedRecord> = records
        .iter()
        .filter(|record| matches(record, filters))
        .cloned()
        .collect();

    search_records(filtered, query, &[SearchField::Name, SearchField::City])
}
