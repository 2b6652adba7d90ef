use std::future::Future;

use crate::error::AppError;
use crate::models::Offer;

/// Fetches raw HTML content from a URL.
pub trait PageFetcher: Send + Sync {
    fn fetch(&self, url: &str) -> impl Future<Output = Result<String, AppError>> + Send;
}

/// Assigns topical category labels to an offer.
pub trait Classifier: Send + Sync {
    fn categorize(&self, offer: &Offer)
    -> impl Future<Output = Result<Vec<String>, AppError>> + Send;
}

/// Persists completed offers.
///
/// Duplicate handling is entirely the store's concern; re-running a listing
/// re-submits the same urls.
pub trait OfferStore: Send + Sync {
    fn create(&self, offer: &Offer) -> impl Future<Output = Result<(), AppError>> + Send;
}

/// Classifier that assigns no tags.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullClassifier;

impl Classifier for NullClassifier {
    async fn categorize(&self, _offer: &Offer) -> Result<Vec<String>, AppError> {
        Ok(Vec::new())
    }
}

/// A no-op OfferStore for dry runs.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullStore;

impl OfferStore for NullStore {
    async fn create(&self, _offer: &Offer) -> Result<(), AppError> {
        Ok(())
    }
}
