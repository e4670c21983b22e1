use std::fs::File;
use std::io::{self, BufRead, BufReader, Write};
use std::net::{SocketAddr, ToSocketAddrs};
use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::Parser;
use tracing::{debug, info, warn};

use crate::config::{
    DEFAULT_BATCH_SIZE, DEFAULT_CONCURRENCY, DEFAULT_DNS_TIMEOUT_SECS, DEFAULT_HTTP_TIMEOUT_SECS,
    DEFAULT_JSON_OUTPUT, DEFAULT_NAMESERVERS, DEFAULT_TEXT_OUTPUT, DEFAULT_WORDLIST, EngineConfig,
};
use crate::error::EnumError;
use crate::scanner::normalize_domain;
use crate::wordlist::Wordlist;

#[derive(Parser, Debug)]
#[command(name = "deepsub")]
#[command(version, about = "Recursive subdomain brute-forcer", long_about = None)]
pub struct Cli {
    /// Target domain (prompted for when omitted)
    #[arg(short, long, value_name = "DOMAIN")]
    pub domain: Option<String>,

    /// Wordlist of subdomain labels (one per line)
    #[arg(short, long, default_value = DEFAULT_WORDLIST, value_name = "FILE")]
    pub wordlist: PathBuf,

    /// File containing DNS resolvers (one per line); public resolvers when omitted
    #[arg(short, long, value_name = "FILE")]
    pub resolvers: Option<PathBuf>,

    /// Max simultaneous in-flight DNS and HTTP operations
    #[arg(short, long, default_value_t = DEFAULT_CONCURRENCY, value_name = "N")]
    pub concurrency: usize,

    /// Candidates resolved per round
    #[arg(short, long, default_value_t = DEFAULT_BATCH_SIZE, value_name = "N")]
    pub batch_size: usize,

    /// DNS query timeout in seconds
    #[arg(long, default_value_t = DEFAULT_DNS_TIMEOUT_SECS, value_name = "SECS")]
    pub dns_timeout: u64,

    /// HTTP probe timeout in seconds
    #[arg(long, default_value_t = DEFAULT_HTTP_TIMEOUT_SECS, value_name = "SECS")]
    pub http_timeout: u64,

    /// Stop expanding names this many labels below the target
    #[arg(long, value_name = "N")]
    pub max_depth: Option<usize>,

    /// Stop the run gracefully after this many seconds
    #[arg(long, value_name = "SECS")]
    pub max_time: Option<u64>,

    /// Plain-text output file
    #[arg(short, long, default_value = DEFAULT_TEXT_OUTPUT, value_name = "FILE")]
    pub output: PathBuf,

    /// JSON output file
    #[arg(short, long, default_value = DEFAULT_JSON_OUTPUT, value_name = "FILE")]
    pub json_output: PathBuf,

    /// Show verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

/// Everything a run needs, loaded and validated.
#[derive(Debug)]
pub struct ScanSettings {
    pub engine: EngineConfig,
    pub wordlist: Wordlist,
    pub nameservers: Vec<SocketAddr>,
    pub max_time: Option<Duration>,
    pub text_output: PathBuf,
    pub json_output: PathBuf,
}

impl Cli {
    pub fn to_config(&self) -> Result<ScanSettings, EnumError> {
        let engine = EngineConfig {
            concurrency: self.concurrency,
            batch_size: self.batch_size,
            dns_timeout: Duration::from_secs(self.dns_timeout),
            http_timeout: Duration::from_secs(self.http_timeout),
            max_depth: self.max_depth,
        };
        engine.validate()?;

        let wordlist = Wordlist::load(&self.wordlist)?;
        if wordlist.is_empty() {
            warn!("Wordlist {} has no usable entries", self.wordlist.display());
        }

        let nameservers = match &self.resolvers {
            Some(path) => load_resolvers(path)?,
            None => {
                debug!("Using default resolvers {:?}", DEFAULT_NAMESERVERS);
                DEFAULT_NAMESERVERS.to_vec()
            }
        };

        Ok(ScanSettings {
            engine,
            wordlist,
            nameservers,
            max_time: self.max_time.map(Duration::from_secs),
            text_output: self.output.clone(),
            json_output: self.json_output.clone(),
        })
    }

    /// The target from `--domain`, or read interactively.
    pub fn target(&self) -> Result<String, EnumError> {
        let raw = match &self.domain {
            Some(domain) => domain.clone(),
            None => prompt_target().map_err(EnumError::Prompt)?,
        };
        parse_target(&raw)
    }
}

fn prompt_target() -> io::Result<String> {
    print!("Enter the target domain: ");
    io::stdout().flush()?;
    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    Ok(line)
}

pub fn parse_target(raw: &str) -> Result<String, EnumError> {
    let domain = normalize_domain(raw);
    if !is_valid_domain(&domain) {
        return Err(EnumError::InvalidDomain(raw.trim().to_string()));
    }
    Ok(domain)
}

pub fn load_resolvers(path: &Path) -> Result<Vec<SocketAddr>, EnumError> {
    let resolvers_error = |source| EnumError::Resolvers {
        path: path.to_path_buf(),
        source,
    };

    let file = File::open(path).map_err(resolvers_error)?;
    let reader = BufReader::new(file);
    let mut resolvers = Vec::new();
    let mut invalid_count = 0;

    for (line_num, line) in reader.lines().enumerate() {
        let line = line.map_err(resolvers_error)?;
        let line = line.trim();

        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let addr = if line.contains(':') {
            line.to_string()
        } else {
            format!("{}:53", line)
        };

        match addr.parse::<SocketAddr>() {
            Ok(addr) => resolvers.push(addr),
            Err(_) => match addr.to_socket_addrs().map(|mut addrs| addrs.next()) {
                Ok(Some(addr)) => resolvers.push(addr),
                _ => {
                    invalid_count += 1;
                    warn!(
                        "Invalid resolver at {}:{} - '{}'",
                        path.display(),
                        line_num + 1,
                        line
                    );
                }
            },
        }
    }

    if resolvers.is_empty() {
        return Err(EnumError::NoResolvers(path.to_path_buf()));
    }

    info!(
        "Loaded {} DNS resolvers from {} ({} invalid entries skipped)",
        resolvers.len(),
        path.display(),
        invalid_count
    );
    Ok(resolvers)
}

/// Checks a normalized target: at most 253 bytes, every label 1..=63 bytes of
/// letters, digits, `-` or `_`. An empty string has one empty label and fails.
fn is_valid_domain(domain: &str) -> bool {
    const MAX_NAME: usize = 253;
    const MAX_LABEL: usize = 63;

    let label_ok = |label: &str| {
        (1..=MAX_LABEL).contains(&label.len())
            && label
                .bytes()
                .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_')
    };

    domain.len() <= MAX_NAME && domain.split('.').all(label_ok)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    fn cli(wordlist: &Path) -> Cli {
        Cli::parse_from(["deepsub", "-w", wordlist.to_str().unwrap()])
    }

    #[test]
    fn test_load_resolvers() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "1.1.1.1").unwrap();
        writeln!(file, "8.8.8.8:5353").unwrap();
        writeln!(file, "# Comment").unwrap();
        writeln!(file).unwrap();
        writeln!(file, "10.0.0.1:notaport").unwrap();

        let resolvers = load_resolvers(file.path()).unwrap();
        assert_eq!(resolvers.len(), 2);
        assert_eq!(resolvers[0].port(), 53);
        assert_eq!(resolvers[1].port(), 5353);
    }

    #[test]
    fn test_load_resolvers_none_valid() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "# only a comment").unwrap();

        let err = load_resolvers(file.path()).unwrap_err();
        assert!(matches!(err, EnumError::NoResolvers(_)));
    }

    #[test]
    fn test_to_config_defaults() {
        let mut wordlist = NamedTempFile::new().unwrap();
        writeln!(wordlist, "www").unwrap();
        writeln!(wordlist, "api").unwrap();

        let settings = cli(wordlist.path()).to_config().unwrap();
        assert_eq!(settings.engine, EngineConfig::default());
        assert_eq!(settings.wordlist.len(), 2);
        assert_eq!(settings.nameservers, DEFAULT_NAMESERVERS.to_vec());
        assert_eq!(settings.text_output, PathBuf::from("output.txt"));
        assert_eq!(settings.json_output, PathBuf::from("discovered_subdomains.json"));
        assert_eq!(settings.max_time, None);
    }

    #[test]
    fn test_to_config_overrides() {
        let wordlist = NamedTempFile::new().unwrap();
        let args = Cli::parse_from([
            "deepsub",
            "-w",
            wordlist.path().to_str().unwrap(),
            "-c",
            "8",
            "-b",
            "25",
            "--max-depth",
            "3",
            "--max-time",
            "60",
        ]);

        let settings = args.to_config().unwrap();
        assert_eq!(settings.engine.concurrency, 8);
        assert_eq!(settings.engine.batch_size, 25);
        assert_eq!(settings.engine.max_depth, Some(3));
        assert_eq!(settings.max_time, Some(Duration::from_secs(60)));
    }

    #[test]
    fn test_to_config_rejects_zero_concurrency() {
        let wordlist = NamedTempFile::new().unwrap();
        let args = Cli::parse_from(["deepsub", "-w", wordlist.path().to_str().unwrap(), "-c", "0"]);
        assert!(matches!(args.to_config(), Err(EnumError::InvalidConfig(_))));
    }

    #[test]
    fn test_to_config_missing_wordlist() {
        let err = cli(Path::new("/nonexistent/subdomains.txt"))
            .to_config()
            .unwrap_err();
        assert!(matches!(err, EnumError::Wordlist { .. }));
    }

    #[test]
    fn test_parse_target() {
        assert_eq!(parse_target("  Example.COM.\n").unwrap(), "example.com");
        assert!(matches!(parse_target(""), Err(EnumError::InvalidDomain(_))));
        assert!(parse_target("invalid..domain").is_err());
        assert!(parse_target("bad domain.com").is_err());
    }

    #[test]
    fn test_target_from_flag() {
        let args = Cli::parse_from(["deepsub", "-d", "Example.org"]);
        assert_eq!(args.target().unwrap(), "example.org");
    }

    #[test]
    fn test_is_valid_domain() {
        assert!(is_valid_domain("example.com"));
        assert!(is_valid_domain("dev_1.example.com"));
        assert!(!is_valid_domain(".example.com"));
        assert!(!is_valid_domain(&format!("{}.com", "a".repeat(64))));
        assert!(is_valid_domain(&format!("{}.com", "a".repeat(63))));
        assert!(!is_valid_domain(""));
        assert!(!is_valid_domain("example.com."));
        assert!(!is_valid_domain("a..example.com"));
        assert!(!is_valid_domain(&format!("{}.com", "a.".repeat(126))));
    }
}
