//! A fault-tolerant TOML parser for editors and linters.
//!
//! Parsing never fails. Every malformed construct is reported as a
//! [`Problem`] and skipped, and everything that could be understood is kept
//! in the resulting [`Document`]. Each node of the tree records the source
//! spans of its key and value.
//!
//! # Examples
//!
//! ```
//! use lenient_toml::{ProblemKind, Value};
//!
//! let content = r#"
//! title = "example"
//!
//! [owner]
//! name = "Tom"
//! name = "Tim"
//! dob = 1979-05-27T07:32:00-08:00
//!
//! [database]
//! ports = [ 8000, 8001 8002 ]
//! "#;
//!
//! let (doc, problems) = lenient_toml::parse(content, "config.toml", None);
//!
//! // The first definition wins.
//! assert_eq!(doc.get("owner.name").and_then(|v| v.as_str()), Some("Tom"));
//! assert_eq!(doc.get("owner.dob").unwrap().as_literal().unwrap().to_string(), "1979-05-27T15:32:00Z");
//!
//! let ports = doc.get("database.ports").unwrap();
//! assert!(matches!(ports.value(), Value::Array(a) if a.len() == 2));
//!
//! let codes: Vec<String> = problems.iter().map(|p| p.kind.to_string()).collect();
//! assert_eq!(codes, ["duplicate-key", "expected"]);
//! assert!(matches!(problems[0].kind, ProblemKind::DuplicateKey { .. }));
//! assert_eq!(
//!     problems[0].to_string(),
//!     "config.toml: 5:12: Warning: Defining a key (`name`) multiple times is invalid",
//! );
//! ```

mod document;
mod literal;
mod parser;
mod problem;
mod recovery;
mod resolver;
mod scanner;
mod span;
mod time;
mod value;

pub use document::Document;
pub use parser::parse;
pub use problem::{Category, Location, Problem, ProblemKind, ProblemSink, Severity};
pub use span::{LineIndex, Span};
pub use time::{Date, DateTime, Instant, Time, TimeOffset};
pub use value::{Array, ArrayKind, Integer, Item, Key, Literal, Map, MapOrigin, Value};

#[cfg(feature = "serde")]
mod impl_serde;
