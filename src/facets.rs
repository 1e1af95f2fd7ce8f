//! # Facet Construction Module
//!
//! ## Purpose
//! Derives the two-level navigation hierarchy (institution type -> cities
//! offering that type) from normalized records. Sentinel-valued records are
//! excluded so unresolved data never pollutes navigation.
//!
//! ## Input/Output Specification
//! - **Input**: Normalized records, in any order
//! - **Output**: `FacetMap` of type -> lexicographically sorted distinct cities
//! - **Guarantees**: Deterministic, independent of input record order

use crate::normalize::NormalizedRecord;
use crate::{OTHER_TYPE, UNKNOWN_CITY};
use std::collections::BTreeMap;

/// Mapping from institution type to its available cities, sorted ascending
pub type FacetMap = BTreeMap<String, Vec<String>>;

/// Build the facet map from a collection of normalized records.
///
/// City matching is case-insensitive after trimming; the display form of the
/// first occurrence is preserved. Records with sentinel type or city are
/// skipped but remain eligible for plain listing and search elsewhere.
pub fn build_facets(records: &[NormalizedRecord]) -> FacetMap {
    // type -> (lowercased city key -> first-seen display form)
    let mut grouped: BTreeMap<String, BTreeMap<String, String>> = BTreeMap::new();

    for record in records {
        if record.category_type == OTHER_TYPE || record.city == UNKNOWN_CITY {
            continue;
        }

        let display = record.city.trim().to_string();
        let key = display.to_lowercase();
        if key.is_empty() {
            continue;
        }

        grouped
            .entry(record.category_type.clone())
            .or_default()
            .entry(key)
            .or_insert(display);
    }

    grouped
        .into_iter()
        .map(|(category_type, cities)| {
            let mut cities: Vec<String> = cities.into_values().collect();
            cities.sort();
            (category_type, cities)
        })
        .collect()
}
