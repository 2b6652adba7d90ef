pub mod assembler;
pub mod config;
pub mod error;
pub mod fields;
pub mod models;
pub mod parsers;
pub mod testutil;
pub mod traits;

pub use assembler::OfferAssembler;
pub use config::ScrapeConfig;
pub use error::AppError;
pub use models::{BatchReport, Degree, NodeOutcome, Offer, SkipReason, Tag};
pub use traits::{Classifier, NullClassifier, NullStore, OfferStore, PageFetcher};
