use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::sync::Arc;

use tracing::debug;

use crate::error::EnumError;

/// Labels brute-forced against every base domain, in file order.
#[derive(Debug, Clone, Default)]
pub struct Wordlist {
    words: Arc<[String]>,
}

impl Wordlist {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, EnumError> {
        let path = path.as_ref();
        let wordlist_error = |source| EnumError::Wordlist {
            path: path.to_path_buf(),
            source,
        };

        let file = File::open(path).map_err(wordlist_error)?;
        let lines = BufReader::new(file)
            .lines()
            .collect::<Result<Vec<_>, _>>()
            .map_err(wordlist_error)?;

        let wordlist = Self::from_lines(lines);
        debug!("Loaded {} words from {}", wordlist.len(), path.display());
        Ok(wordlist)
    }

    pub fn from_lines<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let words = lines
            .into_iter()
            .map(|line| line.as_ref().trim().to_string())
            .filter(|line| !line.is_empty())
            .collect::<Vec<_>>();

        Self {
            words: words.into(),
        }
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// Lazily yields `{word}.{base}` for every word.
    pub fn candidates<'a>(&'a self, base: &'a str) -> impl Iterator<Item = String> + 'a {
        self.words.iter().map(move |word| format!("{}.{}", word, base))
    }
}
