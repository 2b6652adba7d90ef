pub mod classifier;
pub mod fetcher;
pub mod store;

pub use classifier::HttpClassifier;
pub use fetcher::ReqwestFetcher;
pub use store::{JsonlStore, StoredOffer};
