pub mod clock;
pub mod datum;
pub mod dimension;
pub mod error;
pub mod publisher;
pub mod summary;
pub mod unit;

pub use clock::{Clock, ManualClock, SystemClock};
pub use datum::{MetricDatum, PublishRequest, DEFAULT_STORAGE_RESOLUTION, HIGH_STORAGE_RESOLUTION};
pub use dimension::{Dimension, Dimensions};
pub use error::{Result, TallyError};
pub use publisher::{DynPublisher, Publisher};
pub use summary::StatisticSummary;
pub use unit::MetricUnit;
