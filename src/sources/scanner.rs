use std::io::BufRead;
use std::path::Path;

use regex::Regex;

use crate::error::{Error, Result};

/// Anything that looks like a host/path. A scheme may lead it, and after a
/// scheme the host may carry a port.
const URL_PATTERN: &str = r"(?:(?:https?|ftp)://[\w\-.]+(?::\d+)?)?[\w/\-?=%.]+\.[\w/\-?=%.]+";

pub const JAR_SUFFIX: &str = ".jar";

/// Picks artifact urls out of build log lines.
pub struct Scanner {
    pattern: Regex,
    suffix: String,
}

impl Scanner {
    pub fn new(suffix: &str) -> Result<Self> {
        Ok(Scanner {
            pattern: Regex::new(URL_PATTERN)?,
            suffix: suffix.to_string(),
        })
    }

    pub fn jars() -> Result<Self> {
        Self::new(JAR_SUFFIX)
    }

    /// Matches in one line, left to right. The suffix check is case
    /// sensitive.
    pub fn scan_line<'a>(&'a self, line: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.pattern
            .find_iter(line)
            .map(|m| m.as_str())
            .filter(|candidate| candidate.ends_with(self.suffix.as_str()))
    }

    /// Every matching url in `reader`, in order of appearance. Repeats are
    /// kept.
    pub fn scan<R: BufRead>(&self, reader: R, path: &Path) -> Result<Vec<String>> {
        let mut urls = Vec::new();
        for line in reader.lines() {
            let line = line.map_err(|err| Error::filesystem(path, err))?;
            urls.extend(self.scan_line(&line).map(String::from));
        }
        Ok(urls)
    }

    pub fn scan_file(&self, path: &Path) -> Result<Vec<String>> {
        let file = std::fs::File::open(path).map_err(|err| Error::filesystem(path, err))?;
        self.scan(std::io::BufReader::new(file), path)
    }
}
