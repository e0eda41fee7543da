//! IPv4-looking token extraction from log lines.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use anyhow::{Context, Result};
use regex::Regex;

/// Four dot-separated groups of one to three digits
const IP_PATTERN: &str = r"\b(?:[0-9]{1,3}\.){3}[0-9]{1,3}\b";

pub struct IpExtractor {
    regex: Regex,
}

impl IpExtractor {
    pub fn new() -> Result<Self> {
        let regex = Regex::new(IP_PATTERN).context("compiling IP pattern")?;
        Ok(Self { regex })
    }

    /// Return first IP-like token of `line`
    pub fn extract<'a>(&self, line: &'a str) -> Option<&'a str> {
        self.regex.find(line).map(|m| m.as_str())
    }

    /// Collect the first IP-like token of every line. Invalid UTF-8 is replaced, not rejected.
    pub fn read_ips<R: BufRead>(&self, reader: R) -> Result<Vec<String>> {
        let mut ips = Vec::new();
        for line in reader.split(b'\n') {
            let line = line.context("reading log line")?;
            let line = String::from_utf8_lossy(&line);
            if let Some(ip) = self.extract(&line) {
                ips.push(ip.to_string());
            }
        }
        Ok(ips)
    }
}

/// Load IP-like tokens from the file at `path`
pub fn load_ips(path: &Path) -> Result<Vec<String>> {
    let file = File::open(path)
        .with_context(|| format!("the file '{}' does not exist or cannot be read", path.display()))?;
    IpExtractor::new()?.read_ips(BufReader::new(file))
}
