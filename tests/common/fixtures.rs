//! Sample warning documents and configuration helpers

use flood_warnings::{Config, RepositoryConfig, RetryConfig};
use std::time::Duration;
use tempfile::TempDir;

/// Structured document for a Victorian flood warning
pub const IDV36310_XML: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<amoc xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance" version="1.3">
  <source>
    <sender>Australian Government Bureau of Meteorology</sender>
    <region>Victoria</region>
    <office>VICRO</office>
  </source>
  <identifier>IDV36310</identifier>
  <issue-time-utc>2024-09-05T22:44:29Z</issue-time-utc>
  <expiry-time>2024-09-06T22:44:29Z</expiry-time>
  <status>O</status>
  <service>HFW</service>
  <sub-service>FLD</sub-service>
  <product-type>W</product-type>
  <phase>NEW</phase>
</amoc>"#;

/// Free-text companion of [`IDV36310_XML`]
pub const IDV36310_TXT: &str = "IDV36310\n\
Australian Government Bureau of Meteorology\n\
Victoria\n\n\
MINOR FLOOD WARNING FOR THE YARRA RIVER\n\
Issued at 8:44 am EST on Friday 6 September 2024\n";

/// Structured document with codes missing from the lookup tables
pub const IDQ20885_XML: &str = r#"<amoc>
  <identifier>IDQ20885</identifier>
  <issue-time-utc>2024-02-01T01:00:00Z</issue-time-utc>
  <service>ZZZ</service>
  <product-type>Y</product-type>
</amoc>"#;

/// Configuration pointed at a fake repository with fast retries
///
/// The returned directory is the staging area and must outlive the config.
pub fn test_config() -> (Config, TempDir) {
    let staging = TempDir::new().expect("create staging dir");
    let config = Config {
        repository: RepositoryConfig {
            host: "ftp.example.test".to_string(),
            local_staging_directory: staging.path().to_path_buf(),
            retry: RetryConfig {
                max_attempts: 3,
                initial_delay: Duration::from_millis(100),
                ..Default::default()
            },
            ..Default::default()
        },
        ..Default::default()
    };
    (config, staging)
}

/// Number of entries left in the staging directory
pub fn staged_file_count(staging: &TempDir) -> usize {
    std::fs::read_dir(staging.path())
        .map(|entries| entries.count())
        .unwrap_or(0)
}
