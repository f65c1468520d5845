//! Local-only dex edits
//!
//! Two keys in the origin-scoped store:
//! - `dexOverridesV1`: species name to a partial patch
//! - `dexCustomV1`: full records created locally, newest first
//!
//! Neither is ever sent to the backend.

use lzm_common::models::{fields, SpeciesRecord};
use lzm_common::storage::{load_json, save_json};
use lzm_common::{Error, KeyValueStore, Result};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::info;

pub const OVERRIDES_KEY: &str = "dexOverridesV1";
pub const CUSTOM_KEY: &str = "dexCustomV1";

/// Per-name override patches
pub type Overrides = BTreeMap<String, Map<String, Value>>;

/// The editable facets of one dex entry, as filled in the edit form
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DexEntry {
    pub name: String,
    pub species_type: String,
    pub summary: String,
    pub photo_url: String,
    pub difficulty: i64,
    pub enclosure: String,
    pub activity: String,
    pub diet: String,
    pub cost: i64,
}

impl DexEntry {
    /// Blank form for a new species
    pub fn template() -> Self {
        Self {
            name: String::new(),
            species_type: String::new(),
            summary: String::new(),
            photo_url: String::new(),
            difficulty: 1,
            enclosure: String::new(),
            activity: "주행성".to_string(),
            diet: "잡식".to_string(),
            cost: 1,
        }
    }

    /// Edit form prefilled from a record; missing grades default to 1
    pub fn from_record(record: &SpeciesRecord) -> Self {
        let text = |key: &str| record.text(key).unwrap_or_default().to_string();
        let grade = |key: &str| record.grade(key).filter(|g| *g != 0).unwrap_or(1);

        Self {
            name: text(fields::NAME),
            species_type: text(fields::SPECIES_TYPE),
            summary: text(fields::SUMMARY),
            photo_url: text(fields::PHOTO_URL),
            difficulty: grade(fields::DIFFICULTY),
            enclosure: text(fields::ENCLOSURE_TEXT),
            activity: text(fields::ACTIVITY),
            diet: text(fields::DIET),
            cost: grade(fields::COST_GRADE),
        }
    }

    /// Copy with surrounding whitespace stripped from every text facet
    pub fn trimmed(&self) -> Self {
        Self {
            name: self.name.trim().to_string(),
            species_type: self.species_type.trim().to_string(),
            summary: self.summary.trim().to_string(),
            photo_url: self.photo_url.trim().to_string(),
            enclosure: self.enclosure.trim().to_string(),
            activity: self.activity.trim().to_string(),
            diet: self.diet.trim().to_string(),
            ..self.clone()
        }
    }

    /// Patch of every editable facet except the name
    pub fn to_patch(&self) -> Map<String, Value> {
        let mut patch = Map::new();
        patch.insert(fields::SPECIES_TYPE.into(), self.species_type.clone().into());
        patch.insert(fields::SUMMARY.into(), self.summary.clone().into());
        patch.insert(fields::PHOTO_URL.into(), self.photo_url.clone().into());
        patch.insert(fields::DIFFICULTY.into(), self.difficulty.into());
        patch.insert(fields::ENCLOSURE_TEXT.into(), self.enclosure.clone().into());
        patch.insert(fields::ACTIVITY.into(), self.activity.clone().into());
        patch.insert(fields::DIET.into(), self.diet.clone().into());
        patch.insert(fields::COST_GRADE.into(), self.cost.into());
        patch
    }

    /// Full standalone record
    pub fn to_record(&self) -> SpeciesRecord {
        let mut map = Map::new();
        map.insert(fields::NAME.into(), self.name.clone().into());
        map.extend(self.to_patch());
        SpeciesRecord::from_map(map)
    }
}

/// Origin-scoped dex edit storage
#[derive(Clone)]
pub struct DexStore {
    store: Arc<dyn KeyValueStore>,
}

impl DexStore {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    pub fn overrides(&self) -> Overrides {
        load_json(self.store.as_ref(), OVERRIDES_KEY).unwrap_or_default()
    }

    pub fn custom_entries(&self) -> Vec<SpeciesRecord> {
        load_json(self.store.as_ref(), CUSTOM_KEY).unwrap_or_default()
    }

    /// Prepend a locally created species; an older entry of the same name is replaced
    pub fn add_custom(&self, entry: &DexEntry) -> Result<()> {
        let entry = entry.trimmed();
        if entry.name.is_empty() {
            return Err(Error::InvalidInput("species name is required".to_string()));
        }

        let mut custom = self.custom_entries();
        custom.retain(|r| r.name() != Some(entry.name.as_str()));
        custom.insert(0, entry.to_record());
        save_json(self.store.as_ref(), CUSTOM_KEY, &custom)?;

        info!(species = %entry.name, "Added custom dex entry");
        Ok(())
    }

    /// Record an edit of an existing species as an override patch
    pub fn save_override(&self, entry: &DexEntry) -> Result<()> {
        let entry = entry.trimmed();
        if entry.name.is_empty() {
            return Err(Error::InvalidInput("species name is required".to_string()));
        }

        let mut overrides = self.overrides();
        overrides
            .entry(entry.name.clone())
            .or_default()
            .extend(entry.to_patch());
        save_json(self.store.as_ref(), OVERRIDES_KEY, &overrides)?;

        info!(species = %entry.name, "Saved dex override");
        Ok(())
    }

    /// Drop every local edit
    pub fn clear(&self) -> Result<()> {
        self.store.remove(OVERRIDES_KEY)?;
        self.store.remove(CUSTOM_KEY)
    }
}
