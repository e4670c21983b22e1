use std::fmt;
use std::net::IpAddr;

use serde::{Serialize, Serializer};

pub const STATUS_UNAVAILABLE: &str = "N/A";

/// HTTP status of a discovered host, or the sentinel when no response came back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpStatus {
    Code(u16),
    Unavailable,
}

impl From<Option<u16>> for HttpStatus {
    fn from(code: Option<u16>) -> Self {
        code.map_or(HttpStatus::Unavailable, HttpStatus::Code)
    }
}

impl fmt::Display for HttpStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HttpStatus::Code(code) => write!(f, "{}", code),
            HttpStatus::Unavailable => f.write_str(STATUS_UNAVAILABLE),
        }
    }
}

impl Serialize for HttpStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            HttpStatus::Code(code) => serializer.serialize_u16(*code),
            HttpStatus::Unavailable => serializer.serialize_str(STATUS_UNAVAILABLE),
        }
    }
}

/// A subdomain confirmed by DNS, in the order it was found.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DiscoveredRecord {
    #[serde(rename = "Subdomain")]
    pub subdomain: String,
    #[serde(rename = "IP")]
    pub ip: String,
    #[serde(rename = "Status")]
    pub status: HttpStatus,
}

impl DiscoveredRecord {
    pub fn new(subdomain: String, address: IpAddr, status: Option<u16>) -> Self {
        Self {
            subdomain,
            ip: address.to_string(),
            status: status.into(),
        }
    }
}
