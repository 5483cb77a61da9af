//! Loader and dumper traits.
//!
//! A [`Loader`] turns a serialized input into raw, tag-keyed records; a
//! [`Dumper`] renders transformed records back out. Both are object-safe so the
//! command line can pick them by name from a [`Catalog`](crate::catalog::Catalog).
//!
//! # Example
//!
//! ```
//! use marcdo::formats::{json::JsonFormat, Dumper, Loader};
//!
//! let records = JsonFormat.load_str(r#"{"245__": {"a": "Title"}}"#)?;
//! assert_eq!(records.len(), 1);
//!
//! let text = JsonFormat.dump(&records)?;
//! assert!(text.starts_with('['));
//! # Ok::<(), marcdo::MarcdoError>(())
//! ```

use crate::error::Result;
use crate::record::{OutputRecord, RawRecord};
use std::io::{Read, Write};

/// Produces raw records from a serialized source.
///
/// Implementations must preserve field order and subfield order, either through
/// key order or through explicit `__order__` entries.
pub trait Loader: std::fmt::Debug + Send + Sync {
    /// Read every record from `input`.
    ///
    /// # Errors
    ///
    /// Returns an error if reading fails or the input is malformed.
    fn load(&self, input: &mut dyn Read) -> Result<Vec<RawRecord>>;

    /// Read every record from an in-memory string.
    ///
    /// # Errors
    ///
    /// Returns an error if the input is malformed.
    fn load_str(&self, input: &str) -> Result<Vec<RawRecord>> {
        self.load(&mut input.as_bytes())
    }
}

/// Renders transformed records to a serialized form.
pub trait Dumper: std::fmt::Debug + Send + Sync {
    /// Render all records as one document.
    ///
    /// # Errors
    ///
    /// Returns an error if a record cannot be represented in this format.
    fn dump(&self, records: &[OutputRecord]) -> Result<String>;

    /// Render all records and write the document to `out`.
    ///
    /// # Errors
    ///
    /// Returns an error if rendering or writing fails.
    fn dump_to(&self, records: &[OutputRecord], out: &mut dyn Write) -> Result<()> {
        let text = self.dump(records)?;
        out.write_all(text.as_bytes())?;
        if !text.ends_with('\n') {
            out.write_all(b"\n")?;
        }
        Ok(())
    }
}
