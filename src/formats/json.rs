//! JSON records.
//!
//! The loader accepts a single object (one record) or an array of objects; the
//! dumper always writes a pretty-printed array.

use super::{Dumper, Loader};
use crate::error::{MarcdoError, Result};
use crate::record::{kind_of, OutputRecord, RawRecord};
use serde_json::Value;
use std::io::Read;

/// JSON loader and dumper.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonFormat;

impl Loader for JsonFormat {
    fn load(&self, input: &mut dyn Read) -> Result<Vec<RawRecord>> {
        let value: Value = serde_json::from_reader(input)?;
        match value {
            Value::Object(record) => Ok(vec![record]),
            Value::Array(items) => items
                .into_iter()
                .enumerate()
                .map(|(position, item)| match item {
                    Value::Object(record) => Ok(record),
                    other => Err(MarcdoError::InvalidRecord(format!(
                        "element {position} is {}, expected object",
                        kind_of(&other)
                    ))),
                })
                .collect(),
            other => Err(MarcdoError::InvalidRecord(format!(
                "top-level {} is neither a record nor an array of records",
                kind_of(&other)
            ))),
        }
    }
}

impl Dumper for JsonFormat {
    fn dump(&self, records: &[OutputRecord]) -> Result<String> {
        Ok(serde_json::to_string_pretty(records)?)
    }
}
