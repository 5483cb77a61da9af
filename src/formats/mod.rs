//! Record serialization formats.
//!
//! Every format implements [`Loader`], [`Dumper`] or both, and is reachable by
//! name through [`loaders`] and [`dumpers`].
//!
//! # Supported Formats
//!
//! | Name | Module | Load | Dump |
//! |------|--------|------|------|
//! | `json` | [`json`] | object or array of objects | pretty-printed array |
//! | `marcxml` | [`marcxml`] | `<record>` or `<collection>` | `<collection>` |
//!
//! # Usage
//!
//! ```
//! use marcdo::formats;
//!
//! let loader = formats::loader("marcxml")?;
//! let records = loader.load_str(
//!     r#"<record><controlfield tag="001">ocm0001</controlfield></record>"#,
//! )?;
//!
//! let dumper = formats::dumper("json")?;
//! assert!(dumper.dump(&records)?.contains("ocm0001"));
//! # Ok::<(), marcdo::MarcdoError>(())
//! ```

pub mod json;
pub mod marcxml;
mod traits;

pub use traits::{Dumper, Loader};

use crate::catalog::Catalog;
use crate::error::{MarcdoError, Result};

/// All built-in loaders by name.
#[must_use]
pub fn loaders() -> Catalog<Box<dyn Loader>> {
    let mut catalog: Catalog<Box<dyn Loader>> = Catalog::new("loader");
    catalog.register("json", Box::new(json::JsonFormat));
    catalog.register("marcxml", Box::new(marcxml::MarcxmlFormat));
    catalog
}

/// All built-in dumpers by name.
#[must_use]
pub fn dumpers() -> Catalog<Box<dyn Dumper>> {
    let mut catalog: Catalog<Box<dyn Dumper>> = Catalog::new("dumper");
    catalog.register("json", Box::new(json::JsonFormat));
    catalog.register("marcxml", Box::new(marcxml::MarcxmlFormat));
    catalog
}

/// The built-in loader called `name`.
///
/// # Errors
///
/// Returns [`MarcdoError::UnknownLoader`] for an unknown name.
pub fn loader(name: &str) -> Result<Box<dyn Loader>> {
    let mut catalog = loaders();
    catalog
        .take(name)
        .ok_or_else(|| MarcdoError::UnknownLoader(name.to_string()))
}

/// The built-in dumper called `name`.
///
/// # Errors
///
/// Returns [`MarcdoError::UnknownDumper`] for an unknown name.
pub fn dumper(name: &str) -> Result<Box<dyn Dumper>> {
    let mut catalog = dumpers();
    catalog
        .take(name)
        .ok_or_else(|| MarcdoError::UnknownDumper(name.to_string()))
}
