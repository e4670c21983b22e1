use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::time::Duration;

use crate::error::EnumError;

pub const DEFAULT_CONCURRENCY: usize = 50;
pub const DEFAULT_BATCH_SIZE: usize = 100;
pub const DEFAULT_DNS_TIMEOUT_SECS: u64 = 2;
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 5;

pub const DEFAULT_WORDLIST: &str = "subdomains.txt";
pub const DEFAULT_TEXT_OUTPUT: &str = "output.txt";
pub const DEFAULT_JSON_OUTPUT: &str = "discovered_subdomains.json";

pub const DEFAULT_NAMESERVERS: [SocketAddr; 2] = [
    SocketAddr::new(IpAddr::V4(Ipv4Addr::new(8, 8, 8, 8)), 53),
    SocketAddr::new(IpAddr::V4(Ipv4Addr::new(1, 1, 1, 1)), 53),
];

/// Tunables for a discovery run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    /// Max simultaneous in-flight network operations (DNS and HTTP together).
    pub concurrency: usize,
    /// Candidates resolved per barrier round.
    pub batch_size: usize,
    pub dns_timeout: Duration,
    pub http_timeout: Duration,
    /// Deepest level below the target that still gets expanded. `None` keeps
    /// recursing until the wordlist stops producing new names.
    pub max_depth: Option<usize>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            concurrency: DEFAULT_CONCURRENCY,
            batch_size: DEFAULT_BATCH_SIZE,
            dns_timeout: Duration::from_secs(DEFAULT_DNS_TIMEOUT_SECS),
            http_timeout: Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS),
            max_depth: None,
        }
    }
}

impl EngineConfig {
    pub fn validate(&self) -> Result<(), EnumError> {
        if self.concurrency == 0 {
            return Err(EnumError::InvalidConfig(
                "concurrency must be at least 1".to_string(),
            ));
        }
        if self.batch_size == 0 {
            return Err(EnumError::InvalidConfig(
                "batch size must be at least 1".to_string(),
            ));
        }
        if self.max_depth == Some(0) {
            return Err(EnumError::InvalidConfig(
                "max depth must be at least 1 when set".to_string(),
            ));
        }
        Ok(())
    }

    /// Whether a name discovered at `depth` (the target sits at 0) is expanded further.
    pub fn expands(&self, depth: usize) -> bool {
        self.max_depth.is_none_or(|max| depth < max)
    }
}
