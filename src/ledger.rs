use log::{info, warn};

use crate::aggregate::Settings;
use crate::dashboard::Dashboard;
use crate::entry::{Entry, EntryDraft};
use crate::error::{AddEntryError, StoreError};
use crate::store::Store;

/// The in-memory entry list backing every recomputation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Ledger {
    entries: Vec<Entry>,
}

impl Ledger {
    pub fn new(entries: Vec<Entry>) -> Ledger {
        Ledger { entries }
    }

    /// Loads a full snapshot from the store.
    pub async fn load(store: &Store) -> Result<Ledger, StoreError> {
        Ok(Ledger::new(store.load().await?))
    }

    /// Loads a snapshot, falling back to an empty ledger when the store cannot
    /// be read. The error is handed back so the caller can show it.
    pub async fn load_or_empty(store: &Store) -> (Ledger, Option<StoreError>) {
        match Ledger::load(store).await {
            Ok(ledger) => (ledger, None),
            Err(e) => {
                warn!("Starting with an empty entry set: {e}");
                (Ledger::default(), Some(e))
            }
        }
    }

    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    /// Validates the draft, persists it, and only then appends it in memory.
    /// Any failure leaves the ledger untouched.
    pub async fn add(&mut self, store: &Store, draft: &EntryDraft) -> Result<&Entry, AddEntryError> {
        let entry = draft.validate()?;
        store.append(&entry).await?;
        info!(
            "Added {} entry for {} ({})",
            entry.period(),
            entry.get_fund_name(),
            store.describe()
        );
        self.entries.push(entry);
        Ok(&self.entries[self.entries.len() - 1])
    }

    pub fn dashboard(&self, settings: &Settings) -> Dashboard {
        Dashboard::compute(&self.entries, settings)
    }
}
