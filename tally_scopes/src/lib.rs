pub mod config;
pub mod parser;
pub mod runner;
pub mod scheduler;

pub use config::{PublisherConfig, ScopeConfig, ScopeFile};
pub use parser::{parse_scope_from_file, parse_scope_from_str};
pub use runner::{replay_observations, Observation, ObservationKind, ScopeRunner};
pub use scheduler::{FlushScheduler, FlushStats};
