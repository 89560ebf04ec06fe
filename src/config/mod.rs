//! Run configuration
//!
//! A `Config` is read once from TOML, optionally patched with command-line
//! overrides, validated, and then handed to the run as a read-only snapshot.
//! Every key has a default, so a missing file or an empty one is a usable
//! configuration.
//!
//! # Example
//!
//! ```
//! use sumi_scan::config::{parse_config, ConfigOverrides};
//!
//! let mut config = parse_config("[crawler]\nmax-depth = 2").unwrap();
//! config.apply_overrides(&ConfigOverrides {
//!     max_results: Some(5),
//!     ..Default::default()
//! });
//! assert_eq!(config.crawler.max_depth, 2);
//! assert_eq!(config.crawler.max_results, 5);
//! ```

mod parser;
mod types;
mod validation;

pub use parser::{load_config, load_config_or_default, parse_config};
pub use types::{Config, ConfigOverrides, CrawlerConfig, TimeoutConfig};
pub use validation::validate;
