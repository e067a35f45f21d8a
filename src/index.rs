use crate::transect::Strip;
use log::warn;
use std::collections::HashMap;
use std::collections::hash_map::Entry;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("no strip with id {strip_id:?}")]
pub struct LookupError {
    pub strip_id: String,
}

/// Lookup key of a strip ID.
///
/// Numeric IDs are compared by value, so `01`, `1` and `1.0` name the same strip;
/// anything else is compared as trimmed text.
fn key(strip_id: &str) -> String {
    let strip_id = strip_id.trim();
    match strip_id.parse::<f64>() {
        Ok(value) if value.is_finite() && value.fract() == 0.0 && value.abs() < 9.0e15 => {
            format!("{}", value as i64)
        }
        Ok(value) if value.is_finite() => value.to_string(),
        _ => strip_id.to_string(),
    }
}

/// Strips keyed by their ID. Numeric IDs match by value.
#[derive(Debug, Clone, Default)]
pub struct StripIndex {
    strips: HashMap<String, Strip>,
}

impl StripIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a strip. The first strip seen for an ID is kept; returns `false` for a duplicate.
    pub fn insert(&mut self, strip: Strip) -> bool {
        match self.strips.entry(key(&strip.id)) {
            Entry::Occupied(existing) => {
                warn!(
                    "duplicate strip id {:?}, keeping the first definition",
                    existing.key()
                );
                false
            }
            Entry::Vacant(slot) => {
                slot.insert(strip);
                true
            }
        }
    }

    pub fn get(&self, strip_id: &str) -> Result<&Strip, LookupError> {
        self.strips.get(&key(strip_id)).ok_or_else(|| LookupError {
            strip_id: strip_id.trim().to_string(),
        })
    }

    pub fn len(&self) -> usize {
        self.strips.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strips.is_empty()
    }
}

impl FromIterator<Strip> for StripIndex {
    fn from_iter<I: IntoIterator<Item = Strip>>(iter: I) -> Self {
        let mut index = StripIndex::new();
        for strip in iter {
            index.insert(strip);
        }
        index
    }
}
