pub mod batch;
pub mod cli;
pub mod config;
pub mod error;
pub mod output;
pub mod prober;
pub mod record;
pub mod report;
pub mod resolver;
pub mod scanner;
pub mod wordlist;

pub use config::EngineConfig;
pub use error::EnumError;
pub use record::{DiscoveredRecord, HttpStatus};
pub use scanner::{DiscoveryEngine, ScanEvent, ScanReport, ScanStats};
