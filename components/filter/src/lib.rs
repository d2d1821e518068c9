//! Typed filters over XML content
//!
//! A [`Filter`] looks at a single [`Content`] value and either rejects it or
//! returns it narrowed to the kind the filter is made for:
//!
//! ```
//! use xrs_filter::{Attribute, AttributeFilter, Content, Filter, Namespace};
//!
//! let xlink = Namespace::get("xlink", "http://www.w3.org/1999/xlink");
//! let href = Content::from(Attribute::with_namespace("href", xlink.clone(), "#top"));
//!
//! assert_eq!(Some("#top"), AttributeFilter::with_name("href").filter(&href).map(|a| a.value()));
//! assert!(AttributeFilter::with_namespace(xlink).matches(&href));
//! assert!(!AttributeFilter::with_name("src").matches(&href));
//! ```

pub use crate::content::{
    Attribute, CData, Comment, Content, ContentKind, ContentType, Element, NamedContent,
    ProcessingInstruction, Text,
};
pub use crate::filter::{
    CDataFilter, CommentFilter, Filter, Filtered, KindFilter, NameFilter,
    ProcessingInstructionFilter, TextFilter,
};
pub use crate::namespace::{Namespace, XML_NAMESPACE_URI};

/// Filter for attributes by name and namespace
pub type AttributeFilter = NameFilter<Attribute>;

/// Filter for elements by name and namespace
pub type ElementFilter = NameFilter<Element>;

mod content;
mod filter;
mod namespace;
