//! Append-only JSONL persistence for harvested offers.

use std::collections::HashSet;
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::Path;
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use veille_core::error::AppError;
use veille_core::models::Offer;
use veille_core::traits::OfferStore;

/// One stored line: the offer plus its persistence timestamp.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredOffer {
    pub persisted_at: DateTime<Utc>,
    #[serde(flatten)]
    pub offer: Offer,
}

/// Offer store appending JSON lines to a file.
///
/// Opening an existing file picks up previously stored urls, so a re-run
/// against the same listing rejects already-persisted offers as duplicates.
pub struct JsonlStore {
    inner: Mutex<Inner>,
}

struct Inner {
    file: File,
    seen: HashSet<String>,
}

impl JsonlStore {
    pub fn open(path: &Path) -> Result<Self, AppError> {
        let mut seen = HashSet::new();
        if path.exists() {
            let reader = BufReader::new(File::open(path).map_err(io_err)?);
            for line in reader.lines() {
                let line = line.map_err(io_err)?;
                if line.trim().is_empty() {
                    continue;
                }
                let stored: StoredOffer = serde_json::from_str(&line)?;
                seen.insert(stored.offer.url);
            }
        }
        tracing::debug!(known = seen.len(), path = %path.display(), "Offer store opened");

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(io_err)?;

        Ok(Self {
            inner: Mutex::new(Inner { file, seen }),
        })
    }
}

fn io_err(e: std::io::Error) -> AppError {
    AppError::PersistenceError(e.to_string())
}

impl OfferStore for JsonlStore {
    async fn create(&self, offer: &Offer) -> Result<(), AppError> {
        let line = serde_json::to_string(&StoredOffer {
            persisted_at: Utc::now(),
            offer: offer.clone(),
        })?;

        let mut inner = self
            .inner
            .lock()
            .map_err(|_| AppError::PersistenceError("store mutex poisoned".to_string()))?;

        if !inner.seen.insert(offer.url.clone()) {
            return Err(AppError::PersistenceError(format!(
                "duplicate url: {}",
                offer.url
            )));
        }

        writeln!(inner.file, "{line}").map_err(io_err)
    }
}
