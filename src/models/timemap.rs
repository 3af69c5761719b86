//! Timemap: timestamped note-on/note-off groups produced by the engine

use serde::{Deserialize, Serialize};

/// One timemap event group
///
/// Extra fields sent by the engine (`qstamp`, `tempo`, `restsOn`, ...) are ignored.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Default)]
pub struct TimemapEntry {
    /// Time in milliseconds
    pub tstamp: f64,

    /// Elements starting to sound
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub on: Option<Vec<String>>,

    /// Elements stopping
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub off: Option<Vec<String>>,
}

impl TimemapEntry {
    pub fn new(tstamp: f64) -> Self {
        Self { tstamp, on: None, off: None }
    }

    pub fn with_on(mut self, ids: &[&str]) -> Self {
        self.on = Some(ids.iter().map(|id| id.to_string()).collect());
        self
    }

    pub fn with_off(mut self, ids: &[&str]) -> Self {
        self.off = Some(ids.iter().map(|id| id.to_string()).collect());
        self
    }

    pub fn has_on(&self) -> bool {
        self.on.is_some()
    }

    pub fn on_ids(&self) -> &[String] {
        self.on.as_deref().unwrap_or(&[])
    }

    pub fn off_ids(&self) -> &[String] {
        self.off.as_deref().unwrap_or(&[])
    }

    pub fn turns_on(&self, id: &str) -> bool {
        self.on_ids().iter().any(|on| on == id)
    }

    pub fn turns_off(&self, id: &str) -> bool {
        self.off_ids().iter().any(|off| off == id)
    }
}

/// Ordered list of event groups, with the index of the last onset cached
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Default)]
#[serde(from = "Vec<TimemapEntry>", into = "Vec<TimemapEntry>")]
pub struct Timemap {
    entries: Vec<TimemapEntry>,
    last_onset: Option<usize>,
}

impl Timemap {
    pub fn new(entries: Vec<TimemapEntry>) -> Self {
        let last_onset = entries.iter().rposition(TimemapEntry::has_on);
        Self { entries, last_onset }
    }

    pub fn entries(&self) -> &[TimemapEntry] {
        &self.entries
    }

    pub fn get(&self, index: usize) -> Option<&TimemapEntry> {
        self.entries.get(index)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Index of the rightmost entry with an `on` set
    pub fn last_onset_index(&self) -> Option<usize> {
        self.last_onset
    }

    /// First entry after `index` that turns `id` off
    ///
    /// The final entry is not searched: notes ending there are closed by the
    /// end-of-score scheduling done at the last onset.
    pub fn matching_off_after(&self, index: usize, id: &str) -> Option<usize> {
        let end = self.entries.len().saturating_sub(1);
        (index + 1..end).find(|&i| self.entries[i].turns_off(id))
    }
}

impl From<Vec<TimemapEntry>> for Timemap {
    fn from(entries: Vec<TimemapEntry>) -> Self {
        Self::new(entries)
    }
}

impl From<Timemap> for Vec<TimemapEntry> {
    fn from(timemap: Timemap) -> Self {
        timemap.entries
    }
}
