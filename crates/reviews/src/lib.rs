//! Normalized review records shared by every pipeline stage.
//!
//! Both marketplace adapters normalize into the same [`Review`] shape so that
//! downstream stages (sentiment labeling, metrics aggregation, overview
//! generation) never care where a review came from. The types here are:
//!
//! - **Serializable**: JSON via serde, using the marketplace wire names
//! - **Validated**: a rating outside `1..=5` is a construction-time error
//! - **Cloneable and comparable**: cheap to move through the pipeline and
//!   easy to assert on in tests

mod error;
mod types;

pub use error::ReviewError;
pub use types::{Review, ReviewSource, Sentiment};
