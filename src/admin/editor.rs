//! Admin editor flows
//!
//! - Load: read the snapshot and pre-fill one input per tracked entry
//! - Save: clamp inputs, compute changes, roll history, overwrite snapshot
//! - Reset: write an all-zero snapshot, rolling history the same way
//!
//! History only rolls when the snapshot being replaced was itself written by
//! a save or reset, so the very first write never records a spurious trend.

use crate::admin::view::{AdminView, FormRow};
use crate::storage::{KeyValueStore, StorageResult, TallyStore};
use crate::tally::{format_values, Snapshot, Trend, ENTRY_COUNT};
use chrono::{DateTime, Utc};
use thiserror::Error;

/// Invalid edit of the form
#[derive(Error, Debug, PartialEq, Eq)]
pub enum FormError {
    #[error("Entry {slot} is out of range (1-{count})")]
    OutOfRange { slot: usize, count: usize },
}

/// Raw text of the six form inputs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormInput {
    fields: [String; ENTRY_COUNT],
}

impl FormInput {
    /// Inputs pre-filled with the snapshot's values
    pub fn prefilled(snapshot: &Snapshot) -> Self {
        Self {
            fields: std::array::from_fn(|i| snapshot.values[i].to_string()),
        }
    }

    /// Replace the text of a 1-based slot
    pub fn set(&mut self, slot: usize, raw: impl Into<String>) -> Result<(), FormError> {
        if slot == 0 || slot > ENTRY_COUNT {
            return Err(FormError::OutOfRange {
                slot,
                count: ENTRY_COUNT,
            });
        }
        self.fields[slot - 1] = raw.into();
        Ok(())
    }

    pub fn fields(&self) -> &[String] {
        &self.fields
    }
}

/// The admin page bound to a shared namespace
pub struct AdminEditor<S> {
    records: TallyStore<S>,
    labels: Vec<String>,
    snapshot: Snapshot,
}

impl<S: KeyValueStore> AdminEditor<S> {
    /// Activate the page: read the current snapshot
    pub fn load(records: TallyStore<S>, labels: Vec<String>) -> Self {
        let snapshot = records.load_snapshot();
        tracing::debug!(total = snapshot.total(), "Admin editor loaded");

        Self {
            records,
            labels,
            snapshot,
        }
    }

    /// Snapshot as of the last load, save or reset
    pub fn snapshot(&self) -> &Snapshot {
        &self.snapshot
    }

    /// Form inputs pre-filled with the current values
    pub fn form(&self) -> FormInput {
        FormInput::prefilled(&self.snapshot)
    }

    fn label(&self, index: usize) -> String {
        self.labels
            .get(index)
            .cloned()
            .unwrap_or_else(|| format!("Character {}", index + 1))
    }

    /// Render the form, totals, trend badge and last-updated line
    pub fn view(&self) -> AdminView {
        let history = self.records.load_history();
        let current_total = self.snapshot.total();

        AdminView {
            rows: (0..ENTRY_COUNT)
                .map(|i| FormRow {
                    slot: i + 1,
                    label: self.label(i),
                    value: self.snapshot.values[i],
                })
                .collect(),
            current_total,
            previous_total: history.previous_total,
            trend: Trend::between(history.previous_total, f64::from(current_total)),
            updated_at: self.snapshot.updated_at,
        }
    }

    /// Save raw inputs now
    pub fn save<T: AsRef<str>>(&mut self, raw: &[T]) -> StorageResult<AdminView> {
        self.save_at(raw, Utc::now())
    }

    /// Save raw inputs with an explicit timestamp
    pub fn save_at<T: AsRef<str>>(
        &mut self,
        raw: &[T],
        at: DateTime<Utc>,
    ) -> StorageResult<AdminView> {
        // Compare against what is stored now, not what was loaded earlier
        let existing = self.records.load_snapshot();
        let values = format_values(raw);
        let next = existing.successor(values, at);

        self.roll_history(&existing)?;
        self.records.save_snapshot(&next)?;

        tracing::info!(
            total = next.total(),
            total_change = next.total_change,
            "Saved tally snapshot"
        );

        self.snapshot = next;
        Ok(self.view())
    }

    /// Reset every entry to zero now
    pub fn reset(&mut self) -> StorageResult<AdminView> {
        self.reset_at(Utc::now())
    }

    /// Reset every entry to zero with an explicit timestamp
    pub fn reset_at(&mut self, at: DateTime<Utc>) -> StorageResult<AdminView> {
        let existing = self.records.load_snapshot();
        let next = Snapshot::zeroed(at);

        self.roll_history(&existing)?;
        self.records.save_snapshot(&next)?;

        tracing::info!(previous_total = existing.total(), "Reset tally snapshot");

        self.snapshot = next;
        Ok(self.view())
    }

    fn roll_history(&self, existing: &Snapshot) -> StorageResult<()> {
        if existing.is_recorded() {
            self.records.save_history(f64::from(existing.total()))?;
        } else {
            tracing::debug!("No prior snapshot, history left untouched");
        }
        Ok(())
    }
}
