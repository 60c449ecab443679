mod service;
mod types;

pub use service::PricePredictor;
pub use types::{ListingRequest, REQUIRED_FIELDS, is_blank};
