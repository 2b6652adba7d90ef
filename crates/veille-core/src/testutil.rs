//! Test utilities: mock implementations of the collaborator traits.
//!
//! Handwritten mocks for dependency injection in unit tests. All mocks use
//! `Arc<Mutex<_>>` for interior mutability, allowing test assertions on
//! recorded calls.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::error::AppError;
use crate::models::Offer;
use crate::traits::{Classifier, OfferStore, PageFetcher};

// ---------------------------------------------------------------------------
// MockFetcher
// ---------------------------------------------------------------------------

/// Mock fetcher that maps urls to canned HTML.
///
/// Keyed by url rather than by call order so assertions stay deterministic
/// when listing nodes are processed concurrently.
#[derive(Clone, Default, Debug)]
pub struct MockFetcher {
    pages: Arc<Mutex<HashMap<String, String>>>,
    errors: Arc<Mutex<HashMap<String, String>>>,
    /// Every url requested, in call order.
    pub requests: Arc<Mutex<Vec<String>>>,
}

impl MockFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_page(self, url: &str, html: &str) -> Self {
        self.pages
            .lock()
            .unwrap()
            .insert(url.to_string(), html.to_string());
        self
    }

    /// Requests for `url` fail with an HTTP error carrying `message`.
    pub fn with_fetch_error(self, url: &str, message: &str) -> Self {
        self.errors
            .lock()
            .unwrap()
            .insert(url.to_string(), message.to_string());
        self
    }
}

impl PageFetcher for MockFetcher {
    async fn fetch(&self, url: &str) -> Result<String, AppError> {
        self.requests.lock().unwrap().push(url.to_string());
        if let Some(message) = self.errors.lock().unwrap().get(url) {
            return Err(AppError::HttpError(message.clone()));
        }
        match self.pages.lock().unwrap().get(url) {
            Some(html) => Ok(html.clone()),
            None => Ok("<html><body>default</body></html>".to_string()),
        }
    }
}

// ---------------------------------------------------------------------------
// MockClassifier
// ---------------------------------------------------------------------------

/// Mock classifier returning configurable labels, optionally per url.
#[derive(Clone, Default, Debug)]
pub struct MockClassifier {
    default_labels: Arc<Mutex<Vec<String>>>,
    labels_by_url: Arc<Mutex<HashMap<String, Vec<String>>>>,
    error: Arc<Mutex<Option<String>>>,
    /// Urls of every offer categorized, in call order.
    pub calls: Arc<Mutex<Vec<String>>>,
}

impl MockClassifier {
    pub fn with_labels(labels: &[&str]) -> Self {
        let mock = Self::default();
        *mock.default_labels.lock().unwrap() = labels.iter().map(ToString::to_string).collect();
        mock
    }

    pub fn with_labels_for(self, url: &str, labels: &[&str]) -> Self {
        self.labels_by_url.lock().unwrap().insert(
            url.to_string(),
            labels.iter().map(ToString::to_string).collect(),
        );
        self
    }

    pub fn with_error(message: &str) -> Self {
        let mock = Self::default();
        *mock.error.lock().unwrap() = Some(message.to_string());
        mock
    }
}

impl Classifier for MockClassifier {
    async fn categorize(&self, offer: &Offer) -> Result<Vec<String>, AppError> {
        self.calls.lock().unwrap().push(offer.url.clone());
        if let Some(message) = self.error.lock().unwrap().as_ref() {
            return Err(AppError::ClassifierError(message.clone()));
        }
        if let Some(labels) = self.labels_by_url.lock().unwrap().get(&offer.url) {
            return Ok(labels.clone());
        }
        Ok(self.default_labels.lock().unwrap().clone())
    }
}

// ---------------------------------------------------------------------------
// MockStore
// ---------------------------------------------------------------------------

/// Mock store that records every created offer.
#[derive(Clone, Default, Debug)]
pub struct MockStore {
    pub created: Arc<Mutex<Vec<Offer>>>,
    error: Arc<Mutex<Option<String>>>,
}

impl MockStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store whose every create is rejected with a persistence error.
    pub fn with_create_error(message: &str) -> Self {
        let mock = Self::default();
        *mock.error.lock().unwrap() = Some(message.to_string());
        mock
    }
}

impl OfferStore for MockStore {
    async fn create(&self, offer: &Offer) -> Result<(), AppError> {
        if let Some(message) = self.error.lock().unwrap().as_ref() {
            return Err(AppError::PersistenceError(message.clone()));
        }
        self.created.lock().unwrap().push(offer.clone());
        Ok(())
    }
}
