//! Parser for npm registry audit responses.
//!
//! Turns the `advisories` object of an audit response into an ordered list of
//! typed [`Advisory`] records. See [`AdvisoryFeedParser`].

pub mod config;
pub mod error;
pub mod model;
pub mod output;
pub mod parser;

pub use config::Config;
pub use error::{ParseError, Result};
pub use model::{Advisory, Severity};
pub use parser::AdvisoryFeedParser;
