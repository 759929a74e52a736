//! Core types for building command-line interfaces from XML configuration.
//!
//! This crate defines the configuration model shared by the conversion
//! engine and the dynamic CLI builder:
//!
//! - [`ConversionSpec`]: labels used in the produced JSON plus trimming and
//!   coercion settings for attribute and text values.
//! - [`Matcher`]: an ordered coercion step (boolean, number, symbol, date,
//!   collection, passthrough string).
//! - [`ParseInfo`] / [`ElementInfo`]: per-tag directives (identifying
//!   attribute, inheritance, discards, descendant collection policy) with
//!   `common` and `def` fallbacks.
//! - [`CliSchema`]: where commands and arguments live in the commands XML.
//!
//! Validation ([`validate_spec`], [`validate_parse_info`],
//! [`validate_schema`]) catches structural mistakes before conversion.
//!
//! Merging ([`merge_objects`]) combines two converted objects using a
//! [`MergeStrategy`]; the converter uses it for element inheritance.
//!
//! # Example
//!
//! ```
//! use dyncli_core::*;
//!
//! let spec = ConversionSpec::named("shapes")
//!     .with_matchers(SpecContext::Attributes, vec![Matcher::Boolean, Matcher::Number]);
//! let info = ParseInfo::default()
//!     .with_element("Arguments", ElementInfo::default().with_descendants(DescendantsBy::Index, "name"))
//!     .with_def(ElementInfo::identified_by("name"));
//!
//! assert_eq!(info.resolve("Argument").id, Some("name"));
//! assert!(validate_spec(&spec).is_empty());
//! assert!(validate_parse_info(&info).is_empty());
//! ```

mod merge;
mod parse_info;
mod schema;
mod types;
mod validate;

pub use merge::{MergeStrategy, merge_objects};
pub use parse_info::{DescendantsBy, DescendantsInfo, ElementInfo, ParseInfo, ResolvedElementInfo};
pub use schema::{CliSchema, SchemaLabels};
pub use types::*;
pub use validate::{ValidationError, validate_parse_info, validate_schema, validate_spec};
