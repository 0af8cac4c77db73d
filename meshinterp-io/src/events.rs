//! Columnar event hit tables.
//!
//! The event file is a JSON array, one object per event:
//!
//! ```json
//! [{ "event": 0,
//!    "rechit_detid": [...], "rechit_z": [...], "rechit_energy": [...],
//!    "rechit_cluster2d": [...], "cluster2d_multicluster": [...] }]
//! ```

use crate::reader::MappedFileReader;
use crate::{Error, Result};
use meshinterp_core::EventHits;
use rayon::prelude::*;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;

#[derive(Deserialize)]
struct RawEvent {
    event: u64,
    #[serde(alias = "detid")]
    rechit_detid: Vec<u32>,
    #[serde(alias = "z")]
    rechit_z: Vec<f64>,
    #[serde(alias = "energy")]
    rechit_energy: Vec<f64>,
    #[serde(alias = "cluster2d")]
    rechit_cluster2d: Vec<i32>,
    cluster2d_multicluster: Vec<i32>,
}

impl RawEvent {
    fn into_hits(self) -> (u64, meshinterp_core::Result<EventHits>) {
        let event_id = self.event;
        let hits = EventHits::from_columns(
            self.event,
            self.rechit_detid,
            self.rechit_z,
            self.rechit_energy,
            self.rechit_cluster2d,
            &self.cluster2d_multicluster,
        );
        (event_id, hits)
    }
}

/// All events of a run, in file order.
///
/// Events whose columns cannot be resolved are kept aside in
/// [`EventTable::rejected`] instead of failing the whole table.
#[derive(Debug, Clone, Default)]
pub struct EventTable {
    events: Vec<EventHits>,
    index: HashMap<u64, usize>,
    rejected: Vec<(u64, meshinterp_core::Error)>,
}

impl EventTable {
    /// Opens and decodes an event file.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read, is not valid JSON, or
    /// repeats an event id. Events with inconsistent columns are rejected
    /// individually.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let reader = MappedFileReader::open(path)?;
        let raw: Vec<RawEvent> = reader.parse_json()?;
        log::debug!(
            "read {} events from {}",
            raw.len(),
            reader.path().display()
        );
        Self::from_raw(raw)
    }

    /// Decodes events from an in-memory JSON document.
    ///
    /// # Errors
    /// See [`Self::open`].
    pub fn from_json_slice(data: &[u8]) -> Result<Self> {
        let raw: Vec<RawEvent> = serde_json::from_slice(data).map_err(|source| Error::Parse {
            path: "<memory>".into(),
            source,
        })?;
        Self::from_raw(raw)
    }

    fn from_raw(raw: Vec<RawEvent>) -> Result<Self> {
        // Column resolution is independent per event.
        let converted: Vec<_> = raw.into_par_iter().map(RawEvent::into_hits).collect();

        let mut events = Vec::with_capacity(converted.len());
        let mut rejected = Vec::new();
        for (event_id, hits) in converted {
            match hits {
                Ok(hits) => events.push(hits),
                Err(e) => {
                    log::warn!("event {event_id} rejected: {e}");
                    rejected.push((event_id, e));
                }
            }
        }

        let mut table = Self::from_events(events)?;
        table.rejected = rejected;
        Ok(table)
    }

    /// Builds a table from already decoded events.
    ///
    /// # Errors
    /// Returns [`Error::InvalidFormat`] if an event id appears twice.
    pub fn from_events(events: Vec<EventHits>) -> Result<Self> {
        let mut index = HashMap::with_capacity(events.len());
        for (pos, event) in events.iter().enumerate() {
            if index.insert(event.event_id, pos).is_some() {
                return Err(Error::InvalidFormat(format!(
                    "event {} appears more than once",
                    event.event_id
                )));
            }
        }
        Ok(Self {
            events,
            index,
            rejected: Vec::new(),
        })
    }

    /// Events dropped while reading, with the reason, in file order.
    #[must_use]
    pub fn rejected(&self) -> &[(u64, meshinterp_core::Error)] {
        &self.rejected
    }

    /// Number of events.
    #[must_use]
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Returns true if the table holds no events.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Looks up an event by id.
    #[must_use]
    pub fn get(&self, event_id: u64) -> Option<&EventHits> {
        self.index.get(&event_id).map(|&pos| &self.events[pos])
    }

    /// Event ids in file order.
    pub fn ids(&self) -> impl Iterator<Item = u64> + '_ {
        self.events.iter().map(|e| e.event_id)
    }

    /// All events in file order.
    #[must_use]
    pub fn events(&self) -> &[EventHits] {
        &self.events
    }

    /// Total number of hits over all events.
    #[must_use]
    pub fn total_hits(&self) -> usize {
        self.events.iter().map(EventHits::len).sum()
    }
}
