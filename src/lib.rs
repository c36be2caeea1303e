//! District performance metrics for the MGNREGA rural employment programme.
//!
//! The core is three pure steps: [`normalize::normalize`] shapes a loosely structured
//! metrics document into one district's sequence, [`stats`] derives totals and trends from
//! it, and [`nearest::nearest`] resolves a coordinate to the closest district. Loading,
//! caching and location lookup live around them in [`source`], [`cache`] and [`locate`].

pub mod cache;
pub mod formatting;
pub mod locate;
pub mod model;
pub mod nearest;
pub mod normalize;
pub mod search;
pub mod session;
pub mod source;
pub mod speech;
pub mod stats;

pub use locate::Coordinates;
pub use model::{Centroid, District, DistrictMetrics, MetricKey, MetricRecord, Trend};
pub use nearest::nearest;
pub use normalize::{MismatchPolicy, normalize};
pub use stats::{Comparison, Summary, summarize, trend};
