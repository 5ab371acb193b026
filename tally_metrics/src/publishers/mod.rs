pub mod http;
pub mod json;
pub mod log;
pub mod memory;

pub use http::HttpPublisher;
pub use json::JsonLinesPublisher;
pub use log::LogPublisher;
pub use memory::MemoryPublisher;
