//! # Field Normalization Module
//!
//! ## Purpose
//! Maps raw, loosely-typed institution records into a canonical shape. The
//! catalog uses different field names per category and sometimes per record
//! (a school carries `typeOfSchool`, a college `typeOfCollege`; city may be
//! `city`, `location`, `addressCity` or nested under `address`), so every
//! canonical field is resolved through an ordered candidate list.
//!
//! ## Input/Output Specification
//! - **Input**: `RawRecord` (arbitrary JSON object), `CategoryKind`
//! - **Output**: `NormalizedRecord` with a fixed field set and sentinel fallbacks
//! - **Guarantees**: Pure, deterministic for a fixed rating policy, never panics
//!   on malformed input
//!
//! ## Key Features
//! - Priority-list field resolution with dotted-path nesting support
//! - Sentinel fallbacks (`"Unknown"` city, `"Other"` type), never empty strings
//! - Array-or-string coercion for tag-like fields with per-category defaults
//! - Injectable rating fallback policy

use crate::{CategoryKind, RawRecord, OTHER_TYPE, UNKNOWN_CITY};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

/// Canonical institution record shared by every category
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedRecord {
    /// Unique identifier within one category fetch
    pub id: String,
    /// Display name
    pub name: String,
    /// Resolved city, `"Unknown"` when unresolvable
    pub city: String,
    /// Resolved institution type, `"Other"` when unresolvable
    pub category_type: String,
    /// Annual fee, `None` when absent or malformed
    pub fee: Option<f64>,
    /// Rating on a 0-5 scale; falls back per the configured policy
    pub rating: f64,
    /// Primary image URL
    pub image: Option<String>,
    /// Subjects/courses/features, never empty (category default when absent)
    pub tags: Vec<String>,
}

/// Policy for filling in a rating when the source record has none.
///
/// The upstream behavior of rolling a fresh random value on every fetch made
/// the displayed rating change between page loads. Hashing the record id keeps
/// the "plausible rating" product behavior while staying stable across
/// fetches; `Fixed` pins the value for tests.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RatingPolicy {
    /// Deterministic fallback derived from the record id, in [4.0, 5.0)
    HashedFallback,
    /// Constant fallback value
    Fixed(f64),
}

impl Default for RatingPolicy {
    fn default() -> Self {
        RatingPolicy::HashedFallback
    }
}

impl RatingPolicy {
    fn fallback_for(&self, id: &str) -> f64 {
        match self {
            RatingPolicy::Fixed(value) => *value,
            RatingPolicy::HashedFallback => {
                let mut hasher = DefaultHasher::new();
                id.hash(&mut hasher);
                4.0 + (hasher.finish() % 1000) as f64 / 1000.0
            }
        }
    }
}

/// Ordered candidate-field lists for one category.
///
/// Candidates may use dotted paths (`"address.city"`) to reach nested objects.
struct CategoryDescriptor {
    id: &'static [&'static str],
    name: &'static [&'static str],
    city: &'static [&'static str],
    category_type: &'static [&'static str],
    fee: &'static [&'static str],
    rating: &'static [&'static str],
    image: &'static [&'static str],
    tags: &'static [&'static str],
    default_tags: &'static [&'static str],
}

const CITY_CANDIDATES: &[&str] = &["city", "location", "addressCity", "address.city"];
const ID_CANDIDATES: &[&str] = &["id", "_id", "instituteId"];
const IMAGE_CANDIDATES: &[&str] = &["image", "imageUrl", "photo", "thumbnail"];

const SCHOOL: CategoryDescriptor = CategoryDescriptor {
    id: ID_CANDIDATES,
    name: &["name", "schoolName", "instituteName", "title"],
    city: CITY_CANDIDATES,
    category_type: &["typeOfSchool", "type", "category"],
    fee: &["feesPerYear", "fees", "fee", "annualFee"],
    rating: &["rating", "averageRating"],
    image: IMAGE_CANDIDATES,
    tags: &["features", "facilities", "tags"],
    default_tags: &["General"],
};

const COLLEGE: CategoryDescriptor = CategoryDescriptor {
    id: ID_CANDIDATES,
    name: &["name", "collegeName", "instituteName", "title"],
    city: CITY_CANDIDATES,
    category_type: &["typeOfCollege", "type", "category"],
    fee: &["feesPerYear", "fees", "fee", "annualFee"],
    rating: &["rating", "averageRating"],
    image: IMAGE_CANDIDATES,
    tags: &["courses", "streams", "tags"],
    default_tags: &["Science", "Commerce", "Arts"],
};

const PU_COLLEGE: CategoryDescriptor = CategoryDescriptor {
    id: ID_CANDIDATES,
    name: &["name", "collegeName", "instituteName", "title"],
    city: CITY_CANDIDATES,
    category_type: &["typeOfPuCollege", "typeOfCollege", "type", "category"],
    fee: &["feesPerYear", "fees", "fee", "annualFee"],
    rating: &["rating", "averageRating"],
    image: IMAGE_CANDIDATES,
    tags: &["streams", "courses", "tags"],
    default_tags: &["Science", "Commerce"],
};

const COACHING: CategoryDescriptor = CategoryDescriptor {
    id: ID_CANDIDATES,
    name: &["name", "centerName", "instituteName", "title"],
    city: CITY_CANDIDATES,
    category_type: &["centerType", "typeOfCoaching", "type", "category"],
    fee: &["feesPerYear", "fees", "fee", "courseFee"],
    rating: &["rating", "averageRating"],
    image: IMAGE_CANDIDATES,
    tags: &["courses", "exams", "tags"],
    default_tags: &["JEE", "NEET"],
};

const TEACHER: CategoryDescriptor = CategoryDescriptor {
    id: ID_CANDIDATES,
    name: &["name", "teacherName", "fullName", "title"],
    city: CITY_CANDIDATES,
    category_type: &["subject", "specialization", "type", "category"],
    fee: &["feesPerHour", "fees", "fee", "hourlyRate"],
    rating: &["rating", "averageRating"],
    image: IMAGE_CANDIDATES,
    tags: &["subjects", "classes", "tags"],
    default_tags: &["Tuition"],
};

fn descriptor(category: CategoryKind) -> &'static CategoryDescriptor {
    match category {
        CategoryKind::School => &SCHOOL,
        CategoryKind::College => &COLLEGE,
        CategoryKind::PuCollege => &PU_COLLEGE,
        CategoryKind::Coaching => &COACHING,
        CategoryKind::Teacher => &TEACHER,
    }
}

/// Normalizer resolving raw records against per-category descriptors
#[derive(Debug, Clone, Default)]
pub struct Normalizer {
    policy: RatingPolicy,
}

impl Normalizer {
    /// Create a normalizer with the default (hashed) rating fallback
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a normalizer with an explicit rating fallback policy
    pub fn with_rating_policy(policy: RatingPolicy) -> Self {
        Self { policy }
    }

    /// Normalize one raw record for the given category.
    ///
    /// Pure function: malformed fields fall back to sentinels or `None`,
    /// never to an error.
    pub fn normalize(&self, raw: &RawRecord, category: CategoryKind) -> NormalizedRecord {
        let desc = descriptor(category);

        let name = first_non_empty_string(raw, desc.name).unwrap_or_default();
        let id = first_non_empty_string(raw, desc.id)
            .or_else(|| (!name.is_empty()).then(|| name.clone()))
            .unwrap_or_else(|| anonymous_id(raw));

        let city = first_non_empty_string(raw, desc.city)
            .unwrap_or_else(|| UNKNOWN_CITY.to_string());
        let category_type = first_non_empty_string(raw, desc.category_type)
            .unwrap_or_else(|| OTHER_TYPE.to_string());

        let fee = first_value(raw, desc.fee).and_then(coerce_number);

        let rating = first_value(raw, desc.rating)
            .and_then(coerce_number)
            .filter(|r| (0.0..=5.0).contains(r))
            .unwrap_or_else(|| self.policy.fallback_for(&id));

        let image = first_non_empty_string(raw, desc.image);

        let tags = first_value(raw, desc.tags)
            .map(coerce_tags)
            .filter(|tags| !tags.is_empty())
            .unwrap_or_else(|| desc.default_tags.iter().map(|t| t.to_string()).collect());

        NormalizedRecord {
            id,
            name,
            city,
            category_type,
            fee,
            rating,
            image,
            tags,
        }
    }

    /// Normalize a whole collection, preserving input order
    pub fn normalize_all(
        &self,
        raws: &[RawRecord],
        category: CategoryKind,
    ) -> Vec<NormalizedRecord> {
        raws.iter().map(|raw| self.normalize(raw, category)).collect()
    }
}

/// Stable identifier for a record carrying neither id nor name, derived from
/// the full record content so distinct records stay distinct through
/// de-duplication
fn anonymous_id(raw: &RawRecord) -> String {
    let mut hasher = DefaultHasher::new();
    Value::Object(raw.clone()).to_string().hash(&mut hasher);
    format!("anon-{:016x}", hasher.finish())
}

/// Resolve a candidate path against the record, following one level of
/// dotted nesting (`"address.city"`).
fn lookup<'a>(raw: &'a RawRecord, path: &str) -> Option<&'a Value> {
    match path.split_once('.') {
        None => raw.get(path),
        Some((head, rest)) => raw.get(head)?.as_object()?.get(rest),
    }
}

/// First candidate whose value is a non-empty string after trimming
fn first_non_empty_string(raw: &RawRecord, candidates: &[&str]) -> Option<String> {
    candidates.iter().find_map(|path| {
        lookup(raw, path)
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    })
}

/// First candidate present at all, regardless of type
fn first_value<'a>(raw: &'a RawRecord, candidates: &[&str]) -> Option<&'a Value> {
    candidates.iter().find_map(|path| lookup(raw, path))
}

/// Coerce a JSON number or numeric string to f64; malformed values are `None`
fn coerce_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().replace(',', "").parse().ok(),
        _ => None,
    }
}

/// Coerce an array or comma-joined string to a trimmed tag list
fn coerce_tags(value: &Value) -> Vec<String> {
    match value {
        Value::Array(items) => items
            .iter()
            .filter_map(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect(),
        Value::String(joined) => joined
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect(),
        _ => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn raw(value: serde_json::Value) -> RawRecord {
        value.as_object().unwrap().clone()
    }

    #[test]
    fn test_priority_list_resolution() {
        let record = raw(json!({
            "id": "s1",
            "name": "Sunrise Public School",
            "typeOfSchool": "CBSE",
            "type": "should-not-win",
            "city": "Bengaluru"
        }));

        let normalized = Normalizer::new().normalize(&record, CategoryKind::School);
        assert_eq!(normalized.category_type, "CBSE");
        assert_eq!(normalized.city, "Bengaluru");
    }

    #[test]
    fn test_sentinel_fallbacks() {
        let record = raw(json!({ "id": "x1", "name": "Nameless Institute" }));
        let normalized = Normalizer::new().normalize(&record, CategoryKind::College);
        assert_eq!(normalized.city, UNKNOWN_CITY);
        assert_eq!(normalized.category_type, OTHER_TYPE);
    }

    #[test]
    fn test_nested_city_lookup() {
        let record = raw(json!({
            "id": "c1",
            "name": "Metro College",
            "address": { "city": "  Mysuru " }
        }));
        let normalized = Normalizer::new().normalize(&record, CategoryKind::College);
        assert_eq!(normalized.city, "Mysuru");
    }

    #[test]
    fn test_tags_from_comma_joined_string() {
        let record = raw(json!({
            "id": "t1",
            "name": "Prime Coaching",
            "courses": "JEE, NEET , KCET"
        }));
        let normalized = Normalizer::new().normalize(&record, CategoryKind::Coaching);
        assert_eq!(normalized.tags, vec!["JEE", "NEET", "KCET"]);
    }

    #[test]
    fn test_tags_default_when_absent() {
        let record = raw(json!({ "id": "t2", "name": "Apex Coaching" }));
        let normalized = Normalizer::new().normalize(&record, CategoryKind::Coaching);
        assert_eq!(normalized.tags, vec!["JEE", "NEET"]);
    }

    #[test]
    fn test_malformed_fee_is_none() {
        let record = raw(json!({
            "id": "s2",
            "name": "Hillside School",
            "fees": "call for details"
        }));
        let normalized = Normalizer::new().normalize(&record, CategoryKind::School);
        assert_eq!(normalized.fee, None);
    }

    #[test]
    fn test_fee_from_numeric_string() {
        let record = raw(json!({
            "id": "s3",
            "name": "Lakeside School",
            "feesPerYear": "1,50,000"
        }));
        let normalized = Normalizer::new().normalize(&record, CategoryKind::School);
        assert_eq!(normalized.fee, Some(150_000.0));
    }

    #[test]
    fn test_rating_fallback_is_deterministic() {
        let record = raw(json!({ "id": "r1", "name": "Some School" }));
        let normalizer = Normalizer::new();
        let first = normalizer.normalize(&record, CategoryKind::School);
        let second = normalizer.normalize(&record, CategoryKind::School);
        assert_eq!(first.rating, second.rating);
        assert!((4.0..5.0).contains(&first.rating));
    }

    #[test]
    fn test_fixed_rating_policy() {
        let record = raw(json!({ "id": "r2", "name": "Some College" }));
        let normalizer = Normalizer::with_rating_policy(RatingPolicy::Fixed(4.5));
        assert_eq!(normalizer.normalize(&record, CategoryKind::College).rating, 4.5);
    }

    #[test]
    fn test_anonymous_records_keep_distinct_identities() {
        let first = raw(json!({ "city": "Bengaluru", "feesPerYear": 120000 }));
        let second = raw(json!({ "city": "Mysuru", "feesPerYear": 90000 }));

        let normalizer = Normalizer::new();
        let records = normalizer.normalize_all(&[first.clone(), second], CategoryKind::School);
        assert_ne!(records[0].id, records[1].id);

        // Identity must be stable across fetches of the same record
        assert_eq!(records[0].id, normalizer.normalize(&first, CategoryKind::School).id);

        let survivors = crate::dedupe::dedupe(records);
        assert_eq!(survivors.len(), 2);
    }

    #[test]
    fn test_out_of_scale_rating_falls_back() {
        let record = raw(json!({ "id": "r3", "name": "Odd School", "rating": 47 }));
        let normalizer = Normalizer::with_rating_policy(RatingPolicy::Fixed(4.2));
        assert_eq!(normalizer.normalize(&record, CategoryKind::School).rating, 4.2);
    }
}
