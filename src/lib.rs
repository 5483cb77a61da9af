#![doc = include_str!("../README.md")]
#![warn(missing_docs)]

//! # marcdo: MARC21 rule dispatch
//!
//! A registry of transformation rules keyed by tag patterns. Each rule turns
//! one raw MARC field into one semantic value; the registry routes every field
//! of a record to the rules whose pattern matches its tag.
//!
//! ## Quick Start
//!
//! ```
//! use marcdo::transform::rule;
//! use marcdo::{Overdo, TransformExt};
//! use serde_json::json;
//!
//! let mut marc = Overdo::new("marc21");
//! marc.over("international_standard_book_number", "^020..")?
//!     .rule(rule(|_, _, value| Ok(json!({"isbn": value.get("a")}))).for_each_value().filter_values())?;
//!
//! let record = serde_json::from_value(json!({
//!     "020__": [{"a": "0123456789"}, {"z": "bad"}],
//!     "999__": {"a": "local"},
//! })).unwrap();
//!
//! let output = marc.transform(&record)?;
//! assert_eq!(
//!     output["international_standard_book_number"],
//!     json!([{"isbn": "0123456789"}, {}])
//! );
//! assert_eq!(marc.missing(&record), ["999__"]);
//! # Ok::<(), marcdo::MarcdoError>(())
//! ```
//!
//! ## Modules
//!
//! - [`overdo`]: the rule registry (`over`, `transform`, `missing`)
//! - [`index`]: pattern index with most-specific-first lookup
//! - [`transform`]: the transform contract and evaluation context
//! - [`combinators`]: `for_each_value`, `filter_values`, `ignore_value`
//! - [`order`]: record-level field order and the `__order__` hook
//! - [`record`]: raw and output record shapes, typed per-field order
//! - [`rules`]: table-driven MARC21 bibliographic, authority and holdings rule sets
//! - [`formats`]: JSON and MARCXML loaders and dumpers
//! - [`config`]: duplicate and missing-rule policies
//! - [`cli`] / [`logging`]: the `marcdo` command line

pub mod catalog;
pub mod cli;
pub mod combinators;
pub mod config;
pub mod error;
/// Record serialization formats with named loaders and dumpers.
///
/// See the [`formats`] module documentation for the supported formats.
pub mod formats;
pub mod index;
pub mod logging;
pub mod order;
pub mod overdo;
/// Raw and transformed record shapes.
pub mod record;
pub mod rules;
pub mod transform;

pub use catalog::Catalog;
pub use combinators::{filter_values, for_each_value, ignore_value, TransformExt};
pub use config::{DuplicatePolicy, MissingPolicy, OverdoConfig};
pub use error::{MarcdoError, Result, RuleError};
pub use formats::{Dumper, Loader};
pub use index::{Index, Pattern};
pub use order::{field_order, FieldOrder, OrderEntry};
pub use overdo::{Absent, Outcome, Over, Overdo, Rule};
pub use record::{FieldResult, OutputRecord, RawRecord, SubfieldRef, ORDER_KEY};
pub use transform::{Context, Merge, Transform, TransformResult};
