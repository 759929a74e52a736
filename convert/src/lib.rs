//! XML to JSON conversion engine for dynamic command-line interfaces.
//!
//! - [`XmlDocument`] owns a parsed XML document.
//! - [`Selectors`] resolves elements by XPath expression or identifying
//!   attribute.
//! - [`SpecService`] and [`Coercer`] apply a [`ConversionSpec`]'s labels,
//!   trimming and coercion matchers.
//! - [`Converter`] walks an element subtree and produces a JSON object,
//!   honouring the per-tag directives of a [`ParseInfo`].
//!
//! # Example
//!
//! ```
//! use dyncli_convert::{Converter, XmlDocument};
//! use dyncli_core::{ConversionSpec, DescendantsBy, ElementInfo, ParseInfo};
//!
//! let doc = XmlDocument::parse(r#"
//!     <Cli>
//!       <Commands>
//!         <Command name="get" describe="Get a shape"/>
//!       </Commands>
//!     </Cli>"#).unwrap();
//!
//! let commands = doc.selectors().select_single("/Cli/Commands", None).unwrap().unwrap();
//! let info = ParseInfo::default().with_element(
//!     "Commands",
//!     ElementInfo::default().with_descendants(DescendantsBy::Index, "name"),
//! );
//!
//! let value = Converter::new(ConversionSpec::default()).build(commands, &info).unwrap();
//! assert_eq!(value["_children"]["get"]["describe"], "Get a shape");
//! ```
//!
//! [`ConversionSpec`]: dyncli_core::ConversionSpec
//! [`ParseInfo`]: dyncli_core::ParseInfo

mod coercion;
mod converter;
mod document;
mod error;
mod selectors;
mod spec_service;

pub use coercion::Coercer;
pub use converter::Converter;
pub use document::{XmlDocument, child_elements, text_segments};
pub use error::{ConvertError, SelectorError, XmlError};
pub use selectors::{Selectors, select_by_id};
pub use spec_service::SpecService;
pub use xmltree::Element;
