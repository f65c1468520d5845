//! Shared data model: survey answers, preference payload, species records
//!
//! Species records are kept as loose JSON objects because the backend owns
//! their schema; typed accessors cover the facets the client renders.

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;

/// Korean field names used by the backend dataset
pub mod fields {
    pub const NAME: &str = "종_한글명";
    pub const SPECIES_TYPE: &str = "종류";
    pub const DIFFICULTY: &str = "사육_난이도_5단계";
    pub const ENCLOSURE_GRADE: &str = "사육장_사이즈_3단계";
    pub const ENCLOSURE_TEXT: &str = "필요_공간";
    pub const ACTIVITY: &str = "활동패턴";
    pub const DIET: &str = "식성타입";
    pub const SUMMARY: &str = "사육_요약";
    pub const PHOTO_URL: &str = "사진_URL";
    pub const COST_GRADE: &str = "초기비용_등급_5단계";
}

// ========================================
// Survey answers
// ========================================

/// One answer: a single value, or an ordered sequence for multi-select fields
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AnswerValue {
    Single(String),
    Multi(Vec<String>),
}

impl AnswerValue {
    /// Append a value, promoting a single value to a sequence
    pub fn push(&mut self, value: String) {
        match self {
            AnswerValue::Single(existing) => {
                let first = std::mem::take(existing);
                *self = AnswerValue::Multi(vec![first, value]);
            }
            AnswerValue::Multi(values) => values.push(value),
        }
    }

    /// All values in encounter order
    pub fn values(&self) -> Vec<&str> {
        match self {
            AnswerValue::Single(v) => vec![v.as_str()],
            AnswerValue::Multi(vs) => vs.iter().map(String::as_str).collect(),
        }
    }

    /// Scalar view: the value itself, or the first element of a sequence
    pub fn first(&self) -> Option<&str> {
        match self {
            AnswerValue::Single(v) => Some(v.as_str()),
            AnswerValue::Multi(vs) => vs.first().map(String::as_str),
        }
    }

    /// True for an empty string or an empty sequence
    pub fn is_empty(&self) -> bool {
        match self {
            AnswerValue::Single(v) => v.is_empty(),
            AnswerValue::Multi(vs) => vs.is_empty(),
        }
    }

    pub fn contains(&self, value: &str) -> bool {
        self.values().contains(&value)
    }
}

/// Field values captured from one survey page
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PageAnswers(BTreeMap<String, AnswerValue>);

impl PageAnswers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a value; a field seen more than once becomes a sequence
    pub fn append(&mut self, name: &str, value: impl Into<String>) {
        let value = value.into();
        match self.0.get_mut(name) {
            Some(existing) => existing.push(value),
            None => {
                self.0.insert(name.to_string(), AnswerValue::Single(value));
            }
        }
    }

    pub fn insert(&mut self, name: impl Into<String>, value: AnswerValue) {
        self.0.insert(name.into(), value);
    }

    pub fn get(&self, name: &str) -> Option<&AnswerValue> {
        self.0.get(name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut AnswerValue> {
        self.0.get_mut(name)
    }

    pub fn remove(&mut self, name: &str) -> Option<AnswerValue> {
        self.0.remove(name)
    }

    /// Overlay another page's answers; fields present in `other` win
    pub fn merge(&mut self, other: &PageAnswers) {
        for (k, v) in &other.0 {
            self.0.insert(k.clone(), v.clone());
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &AnswerValue)> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>> FromIterator<(K, AnswerValue)> for PageAnswers {
    fn from_iter<I: IntoIterator<Item = (K, AnswerValue)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}

// ========================================
// Preference payload
// ========================================

/// A resolved preference value
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PreferenceValue {
    Grade(i64),
    Text(String),
    Tags(Vec<String>),
}

/// Weighted preferences sent to `POST /api/recommend`
///
/// Question values are flattened into the top-level object next to the
/// species-type selection, matching the backend's request shape.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreferenceRequest {
    #[serde(rename = "종류", default)]
    pub species_types: Vec<String>,

    #[serde(rename = "종류_가중치", default, skip_serializing_if = "BTreeMap::is_empty")]
    pub species_type_weights: BTreeMap<String, i64>,

    /// Importance per question key; 0 excludes the question from scoring
    #[serde(default)]
    pub custom_weights: BTreeMap<String, i64>,

    #[serde(flatten)]
    pub values: BTreeMap<String, PreferenceValue>,
}

impl PreferenceRequest {
    pub fn value(&self, key: &str) -> Option<&PreferenceValue> {
        self.values.get(key)
    }

    pub fn weight(&self, key: &str) -> Option<i64> {
        self.custom_weights.get(key).copied()
    }
}

/// Fixed request options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecommendOptions {
    pub top_n: u32,
    pub include_reasons: bool,
}

impl Default for RecommendOptions {
    fn default() -> Self {
        Self {
            top_n: 10,
            include_reasons: true,
        }
    }
}

/// Body of `POST /api/recommend`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecommendRequest {
    pub preferences: PreferenceRequest,
    pub options: RecommendOptions,
}

// ========================================
// Species records and results
// ========================================

/// A species record as served by the backend (or stored locally)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SpeciesRecord(Map<String, Value>);

impl SpeciesRecord {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_map(map: Map<String, Value>) -> Self {
        Self(map)
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn into_map(self) -> Map<String, Value> {
        self.0
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.0.insert(key.into(), value.into());
    }

    /// Display name; the record's identity everywhere in the client
    pub fn name(&self) -> Option<&str> {
        self.text(fields::NAME)
    }

    /// Non-empty string facet
    pub fn text(&self, key: &str) -> Option<&str> {
        match self.0.get(key) {
            Some(Value::String(s)) if !s.trim().is_empty() => Some(s.as_str()),
            _ => None,
        }
    }

    /// Integer grade facet; numeric strings are accepted
    pub fn grade(&self, key: &str) -> Option<i64> {
        match self.0.get(key)? {
            Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    /// True when the key is absent, null, or an empty string
    pub fn is_blank(&self, key: &str) -> bool {
        match self.0.get(key) {
            None | Some(Value::Null) => true,
            Some(Value::String(s)) => s.is_empty(),
            _ => false,
        }
    }

    /// Fill fields this record lacks from `other`; existing values win
    pub fn fill_missing_from(&mut self, other: &SpeciesRecord) {
        for (k, v) in &other.0 {
            let missing = matches!(self.0.get(k), None | Some(Value::Null));
            if missing {
                self.0.insert(k.clone(), v.clone());
            }
        }
    }

    /// Overwrite fields with the ones carried by `patch`
    pub fn apply_patch(&mut self, patch: &Map<String, Value>) {
        for (k, v) in patch {
            self.0.insert(k.clone(), v.clone());
        }
    }
}

impl From<Value> for SpeciesRecord {
    fn from(value: Value) -> Self {
        match value {
            Value::Object(map) => Self(map),
            _ => Self::default(),
        }
    }
}

/// One scored species from the recommendation response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendationResult {
    #[serde(default)]
    pub match_score: f64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub match_reasons: Option<Vec<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub question_contributions: Option<QuestionContributions>,

    #[serde(flatten)]
    pub species: SpeciesRecord,
}

impl RecommendationResult {
    pub fn name(&self) -> Option<&str> {
        self.species.name()
    }
}

/// Per-question partial scores in the order the backend sent them
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QuestionContributions(Vec<(String, f64)>);

impl QuestionContributions {
    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.0.iter().map(|(q, s)| (q.as_str(), *s))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(String, f64)> for QuestionContributions {
    fn from_iter<I: IntoIterator<Item = (String, f64)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl Serialize for QuestionContributions {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (question, score) in &self.0 {
            map.serialize_entry(question, score)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for QuestionContributions {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct ContributionsVisitor;

        impl<'de> Visitor<'de> for ContributionsVisitor {
            type Value = QuestionContributions;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a map of question to score")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut entries = Vec::with_capacity(access.size_hint().unwrap_or(0));
                while let Some((question, score)) = access.next_entry::<String, f64>()? {
                    entries.push((question, score));
                }
                Ok(QuestionContributions(entries))
            }
        }

        deserializer.deserialize_map(ContributionsVisitor)
    }
}

/// Response of `POST /api/recommend`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecommendationResponse {
    #[serde(default)]
    pub results: Vec<RecommendationResult>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dataset_version: Option<Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top_n: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scoring_policy_version: Option<String>,
}

/// Response of `GET /api/species/list`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SpeciesListResponse {
    #[serde(default)]
    pub items: Vec<SpeciesRecord>,
}
