pub mod publishers;
pub mod recorder;
pub mod table;

pub use publishers::{HttpPublisher, JsonLinesPublisher, LogPublisher, MemoryPublisher};
pub use recorder::{Recorder, RecorderBuilder};
pub use table::{AggregateTable, Snapshot};
