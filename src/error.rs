use std::io;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum EnumError {
    #[error("failed to read wordlist {}: {source}", path.display())]
    Wordlist { path: PathBuf, source: io::Error },

    #[error("failed to read resolvers {}: {source}", path.display())]
    Resolvers { path: PathBuf, source: io::Error },

    #[error("no valid DNS resolvers found in {}", .0.display())]
    NoResolvers(PathBuf),

    #[error("failed to read target domain: {0}")]
    Prompt(io::Error),

    #[error("invalid domain '{0}'")]
    InvalidDomain(String),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("failed to build HTTP client: {0}")]
    HttpClient(#[from] reqwest::Error),

    #[error("failed to write {}: {source}", path.display())]
    Output { path: PathBuf, source: io::Error },

    #[error("failed to serialize results: {0}")]
    Serialize(#[from] serde_json::Error),
}
