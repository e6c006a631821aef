//! Occupancy store: per-person sets of dates already assigned by prior
//! scheduling.
//!
//! The store is the unit of cross-request state. Callers hand it back in
//! whichever shape is convenient (a live store, a plain mapping taken from a
//! previous response, or its serialized text), and [`OccupancyStore::from_input`]
//! normalizes all three to the same representation.

use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Person identifier to the ordered set of dates that person is occupied.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OccupancyStore {
    records: BTreeMap<String, BTreeSet<NaiveDate>>,
}

/// The three shapes an occupancy store may arrive in.
///
/// Serialized as either a string (the text form) or an object mapping
/// person identifiers to arrays of `YYYY-MM-DD` strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RawOccupancy", into = "RawOccupancy")]
pub enum OccupancyInput {
    /// An already-constructed store.
    Store(OccupancyStore),
    /// A plain keyed mapping.
    Mapping(BTreeMap<String, Vec<String>>),
    /// The serialized text form.
    Text(String),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
enum RawOccupancy {
    Text(String),
    Mapping(BTreeMap<String, Vec<String>>),
}

impl From<RawOccupancy> for OccupancyInput {
    fn from(raw: RawOccupancy) -> Self {
        match raw {
            RawOccupancy::Text(text) => OccupancyInput::Text(text),
            RawOccupancy::Mapping(mapping) => OccupancyInput::Mapping(mapping),
        }
    }
}

impl From<OccupancyInput> for RawOccupancy {
    fn from(input: OccupancyInput) -> Self {
        match input {
            OccupancyInput::Store(store) => RawOccupancy::Mapping(store.to_mapping()),
            OccupancyInput::Mapping(mapping) => RawOccupancy::Mapping(mapping),
            OccupancyInput::Text(text) => RawOccupancy::Text(text),
        }
    }
}

impl From<OccupancyStore> for OccupancyInput {
    fn from(store: OccupancyStore) -> Self {
        OccupancyInput::Store(store)
    }
}

impl From<BTreeMap<String, Vec<String>>> for OccupancyInput {
    fn from(mapping: BTreeMap<String, Vec<String>>) -> Self {
        OccupancyInput::Mapping(mapping)
    }
}

impl From<String> for OccupancyInput {
    fn from(text: String) -> Self {
        OccupancyInput::Text(text)
    }
}

impl From<&str> for OccupancyInput {
    fn from(text: &str) -> Self {
        OccupancyInput::Text(text.to_string())
    }
}

impl OccupancyStore {
    /// Creates a store with no records.
    pub fn create_empty() -> Self {
        Self::default()
    }

    /// Builds a store from any accepted input shape.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::MalformedInput`] if the text is not a JSON
    /// object of arrays, or if any value is not a valid `YYYY-MM-DD` date.
    ///
    /// # Examples
    ///
    /// ```
    /// use pto_engine::scheduling::OccupancyStore;
    /// use std::collections::BTreeMap;
    ///
    /// let from_text = OccupancyStore::from_input(r#"{"p1": ["2024-12-01"]}"#).unwrap();
    ///
    /// let mut mapping = BTreeMap::new();
    /// mapping.insert("p1".to_string(), vec!["2024-12-01".to_string()]);
    /// let from_mapping = OccupancyStore::from_input(mapping).unwrap();
    ///
    /// let from_store = OccupancyStore::from_input(from_text.clone()).unwrap();
    ///
    /// assert_eq!(from_text, from_mapping);
    /// assert_eq!(from_text, from_store);
    /// ```
    pub fn from_input(input: impl Into<OccupancyInput>) -> EngineResult<Self> {
        match input.into() {
            OccupancyInput::Store(store) => Ok(store),
            OccupancyInput::Mapping(mapping) => Self::from_mapping(&mapping),
            OccupancyInput::Text(text) => Self::parse(&text),
        }
    }

    /// Parses the serialized text form.
    pub fn parse(serialized_text: &str) -> EngineResult<Self> {
        let mapping: BTreeMap<String, Vec<String>> = serde_json::from_str(serialized_text)
            .map_err(|e| EngineError::malformed(e.to_string()))?;
        Self::from_mapping(&mapping)
    }

    fn from_mapping(mapping: &BTreeMap<String, Vec<String>>) -> EngineResult<Self> {
        let mut records = BTreeMap::new();
        for (person_id, dates) in mapping {
            let mut parsed = BTreeSet::new();
            for raw in dates {
                let date = NaiveDate::parse_from_str(raw, DATE_FORMAT).map_err(|e| {
                    EngineError::malformed(format!(
                        "invalid date '{}' for person '{}': {}",
                        raw, person_id, e
                    ))
                })?;
                // chrono accepts unpadded fields; the wire form is strict YYYY-MM-DD.
                if date.format(DATE_FORMAT).to_string() != *raw {
                    return Err(EngineError::malformed(format!(
                        "invalid date '{}' for person '{}': expected YYYY-MM-DD",
                        raw, person_id
                    )));
                }
                parsed.insert(date);
            }
            records.insert(person_id.clone(), parsed);
        }
        Ok(Self { records })
    }

    /// Returns the store as a plain mapping of ISO date strings.
    pub fn to_mapping(&self) -> BTreeMap<String, Vec<String>> {
        self.records
            .iter()
            .map(|(person_id, dates)| {
                let dates = dates
                    .iter()
                    .map(|d| d.format(DATE_FORMAT).to_string())
                    .collect();
                (person_id.clone(), dates)
            })
            .collect()
    }

    /// Serializes to the deterministic text form.
    ///
    /// Keys and dates are emitted in ascending order, so equal stores always
    /// produce identical text.
    pub fn serialize(&self) -> EngineResult<String> {
        serde_json::to_string(&self.to_mapping()).map_err(|e| EngineError::malformed(e.to_string()))
    }

    /// Marks a person occupied on a date. Inserting an existing date is a
    /// no-op.
    pub fn mark_occupied(&mut self, person_id: &str, date: NaiveDate) {
        self.records
            .entry(person_id.to_string())
            .or_default()
            .insert(date);
    }

    /// Returns the dates a person is occupied; empty for an unknown person.
    pub fn occupied_dates(&self, person_id: &str) -> BTreeSet<NaiveDate> {
        self.records.get(person_id).cloned().unwrap_or_default()
    }

    /// Returns true if the person is occupied on `date`.
    pub fn is_occupied(&self, person_id: &str, date: NaiveDate) -> bool {
        self.records
            .get(person_id)
            .is_some_and(|dates| dates.contains(&date))
    }

    /// Iterates the person identifiers with a record, in order.
    pub fn people(&self) -> impl Iterator<Item = &str> {
        self.records.keys().map(String::as_str)
    }

    /// Number of people with a record.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns true if no person has a record.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
