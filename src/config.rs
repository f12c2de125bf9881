// Fri Feb 6 2026 - Alex

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use serde::{Deserialize, Serialize};

/// Driver-level options for a scan session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub pid: Option<i32>,
    pub unaligned: bool,
    pub filter_pathname: Option<String>,
    pub filter_basename: Option<String>,
    pub filter_regex: Option<String>,
    pub invert_filter: bool,
    pub max_report: usize,
    pub show_progress: bool,
    pub verbosity: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            pid: None,
            unaligned: false,
            filter_pathname: None,
            filter_basename: None,
            filter_regex: None,
            invert_filter: false,
            max_report: 100,
            show_progress: true,
            verbosity: 0,
        }
    }
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_pid(mut self, pid: i32) -> Self {
        self.pid = Some(pid);
        self
    }

    pub fn with_unaligned(mut self, unaligned: bool) -> Self {
        self.unaligned = unaligned;
        self
    }

    pub fn load(path: &Path) -> std::io::Result<Self> {
        let file = File::open(path)?;
        serde_json::from_reader(BufReader::new(file))
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.pid.is_none() {
            return Err("a target pid must be set".to_string());
        }
        let filters = [
            self.filter_pathname.is_some(),
            self.filter_basename.is_some(),
            self.filter_regex.is_some(),
        ];
        if filters.iter().filter(|f| **f).count() > 1 {
            return Err("at most one region filter may be set".to_string());
        }
        if self.max_report == 0 {
            return Err("max_report must be greater than 0".to_string());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_needs_pid() {
        assert!(Config::default().validate().is_err());
        assert!(Config::new().with_pid(1).validate().is_ok());
    }

    #[test]
    fn test_rejects_multiple_filters() {
        let mut config = Config::new().with_pid(1);
        config.filter_basename = Some("libc.so.6".to_string());
        assert!(config.validate().is_ok());
        config.filter_regex = Some("heap".to_string());
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_zero_max_report() {
        let mut config = Config::new().with_pid(1);
        config.max_report = 0;
        assert!(config.validate().is_err());
    }
}
