//! Core data types for parsed audit advisories.
//!
//! - [`Advisory`] - One normalized advisory record from the feed
//! - [`Severity`] - npm's severity scale
//!
//! # Example
//!
//! ```
//! use nodeaudit::{Advisory, Severity};
//!
//! let mut advisory = Advisory::new(118);
//! advisory.module_name = Some("minimatch".to_string());
//! advisory.severity = Some("high".to_string());
//!
//! assert_eq!(advisory.severity_level(), Severity::High);
//! ```

mod advisory;
mod severity;

pub use advisory::*;
pub use severity::*;
