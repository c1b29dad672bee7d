//! In-memory guest list and gallery held by the client.
//!
//! Records fetched from the backend are `Confirmed`. A write that could not
//! reach the backend is kept as `Pending` under a `temp_` id, and survives
//! later refreshes until the backend holds a version at least as new.

use chrono::{DateTime, Utc};

use crate::mapper::{format_timestamp, parse_timestamp};
use crate::models::{GalleryImage, Rsvp};

use super::view::{filter_rsvps, Filter};

/// Whether the backend is known to hold this version of a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncState {
    Confirmed,
    Pending,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackedRsvp {
    pub rsvp: Rsvp,
    pub sync: SyncState,
}

impl TrackedRsvp {
    pub fn is_pending(&self) -> bool {
        self.sync == SyncState::Pending
    }
}

/// Where a full snapshot of records came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SnapshotSource {
    Remote { last_modified: String },
    Sample,
}

#[derive(Debug, Clone, Default)]
pub struct ClientState {
    records: Vec<TrackedRsvp>,
    gallery: Vec<GalleryImage>,
    last_modified: Option<String>,
    using_sample_data: bool,
}

impl ClientState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> Vec<Rsvp> {
        self.records.iter().map(|t| t.rsvp.clone()).collect()
    }

    pub fn tracked(&self) -> &[TrackedRsvp] {
        &self.records
    }

    pub fn find_by_name(&self, name: &str) -> Option<&TrackedRsvp> {
        let name = name.trim();
        self.records.iter().find(|t| t.rsvp.name.trim() == name)
    }

    /// Distinct non-blank names, first occurrence first.
    pub fn guest_names(&self) -> Vec<String> {
        let mut names: Vec<String> = Vec::new();
        for tracked in &self.records {
            let name = tracked.rsvp.name.trim();
            if !name.is_empty() && !names.iter().any(|seen| seen == name) {
                names.push(name.to_string());
            }
        }
        names
    }

    pub fn pending_count(&self) -> usize {
        self.records.iter().filter(|t| t.is_pending()).count()
    }

    pub fn last_modified(&self) -> Option<&str> {
        self.last_modified.as_deref()
    }

    pub fn using_sample_data(&self) -> bool {
        self.using_sample_data
    }

    pub fn gallery(&self) -> &[GalleryImage] {
        &self.gallery
    }

    pub fn set_gallery(&mut self, images: Vec<GalleryImage>) {
        self.gallery = images;
    }

    /// Install a full snapshot, merging by name.
    ///
    /// Pending records missing from the snapshot are kept. A pending record
    /// that the snapshot also holds wins only while its timestamp is newer;
    /// against sample data it always wins.
    pub fn apply_snapshot(&mut self, fetched: Vec<Rsvp>, source: SnapshotSource) {
        let pending: Vec<TrackedRsvp> = self
            .records
            .drain(..)
            .filter(TrackedRsvp::is_pending)
            .collect();

        let mut merged: Vec<TrackedRsvp> = fetched
            .into_iter()
            .map(|rsvp| TrackedRsvp {
                rsvp,
                sync: SyncState::Confirmed,
            })
            .collect();

        for local in pending {
            let name = local.rsvp.name.trim().to_string();
            match merged.iter_mut().find(|t| t.rsvp.name.trim() == name) {
                None => merged.push(local),
                Some(remote) => {
                    let keep_local = match &source {
                        SnapshotSource::Sample => true,
                        SnapshotSource::Remote { .. } => {
                            is_newer(&local.rsvp.timestamp, &remote.rsvp.timestamp)
                        }
                    };
                    if keep_local {
                        *remote = local;
                    }
                }
            }
        }

        self.records = merged;
        match source {
            SnapshotSource::Remote { last_modified } => {
                self.last_modified = Some(last_modified);
                self.using_sample_data = false;
            }
            SnapshotSource::Sample => self.using_sample_data = true,
        }
    }

    /// Record a write that has not reached the backend. Returns its temp id.
    pub fn apply_local(&mut self, mut record: Rsvp, at: DateTime<Utc>) -> String {
        let id = Rsvp::temp_id(at.timestamp_millis());
        record.id = id.clone();
        record.row_index = None;
        record.timestamp = format_timestamp(at);

        let tracked = TrackedRsvp {
            rsvp: record,
            sync: SyncState::Pending,
        };
        let name = tracked.rsvp.name.trim().to_string();
        match self.records.iter_mut().find(|t| t.rsvp.name.trim() == name) {
            Some(existing) => *existing = tracked,
            None => self.records.push(tracked),
        }
        id
    }

    /// Filtered, display-ordered view of the current records.
    pub fn view(&self, filter: Filter) -> Vec<Rsvp> {
        filter_rsvps(self.records.iter().map(|t| &t.rsvp), filter)
    }
}

/// A remote timestamp that cannot be read never beats a local edit.
fn is_newer(local: &str, remote: &str) -> bool {
    match (parse_timestamp(local), parse_timestamp(remote)) {
        (Some(local), Some(remote)) => local > remote,
        (Some(_), None) => true,
        (None, _) => false,
    }
}
