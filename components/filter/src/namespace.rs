use std::collections::HashMap;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::{Arc, OnceLock};

use log::trace;
use parking_lot::RwLock;
use serde::de::{self, Deserializer};
use serde::ser::{SerializeStruct, Serializer};
use serde::{Deserialize, Serialize};

/// URI bound to the `xml` prefix
///
/// See https://www.w3.org/TR/xml-names/#ns-decl
pub const XML_NAMESPACE_URI: &str = "http://www.w3.org/XML/1998/namespace";

struct NamespaceDecl {
    prefix: String,
    uri: String,
}

/// XML namespace
///
/// Namespaces are interned: there is exactly one instance per prefix and
/// URI pair, handed out by [`Namespace::get`]. Cloning is cheap.
///
/// Two namespaces are equal when their URIs are equal, the prefix is only
/// the lexical alias used in the document.
#[derive(Clone)]
pub struct Namespace(Arc<NamespaceDecl>);

type Registry = RwLock<HashMap<(String, String), Namespace>>;

fn registry() -> &'static Registry {
    static REGISTRY: OnceLock<Registry> = OnceLock::new();
    REGISTRY.get_or_init(Default::default)
}

impl Namespace {
    /// Canonical namespace for `prefix` and `uri`
    pub fn get(prefix: &str, uri: &str) -> Namespace {
        let key = (prefix.to_string(), uri.to_string());
        if let Some(namespace) = registry().read().get(&key) {
            return namespace.clone();
        }

        // another thread may have interned the pair since the read lock
        registry()
            .write()
            .entry(key)
            .or_insert_with_key(|(prefix, uri)| {
                trace!("intern namespace {:?} = {:?}", prefix, uri);
                Namespace(Arc::new(NamespaceDecl {
                    prefix: prefix.clone(),
                    uri: uri.clone(),
                }))
            })
            .clone()
    }

    /// The empty namespace of unqualified names
    pub fn none() -> Namespace {
        Self::get("", "")
    }

    /// The namespace bound to `xml`
    pub fn xml() -> Namespace {
        Self::get("xml", XML_NAMESPACE_URI)
    }

    pub fn prefix(&self) -> &str {
        &self.0.prefix
    }

    pub fn uri(&self) -> &str {
        &self.0.uri
    }

    pub fn is_none(&self) -> bool {
        self.0.uri.is_empty()
    }

    /// Whether both are the same interned instance
    pub fn ptr_eq(&self, other: &Namespace) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl PartialEq for Namespace {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other) || self.uri() == other.uri()
    }
}

impl Eq for Namespace {}

impl Hash for Namespace {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.uri().hash(state);
    }
}

impl fmt::Debug for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Namespace")
            .field("prefix", &self.prefix())
            .field("uri", &self.uri())
            .finish()
    }
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.prefix().is_empty() {
            write!(f, "xmlns=\"{}\"", self.uri())
        } else {
            write!(f, "xmlns:{}=\"{}\"", self.prefix(), self.uri())
        }
    }
}

impl Default for Namespace {
    fn default() -> Self {
        Self::none()
    }
}

impl Serialize for Namespace {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("Namespace", 2)?;
        state.serialize_field("prefix", self.prefix())?;
        state.serialize_field("uri", self.uri())?;
        state.end()
    }
}

/// Persisted form of a namespace, only ever turned into a [`Namespace`]
/// through the registry
#[derive(Deserialize)]
#[serde(rename = "Namespace")]
struct NamespaceRef {
    prefix: String,
    uri: String,
}

impl<'de> Deserialize<'de> for Namespace {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let NamespaceRef { prefix, uri } = NamespaceRef::deserialize(deserializer)?;
        Ok(Namespace::get(&prefix, &uri))
    }
}

/// Resolves an optional persisted prefix and URI pair
pub(crate) fn resolve<E: de::Error>(
    prefix: Option<String>,
    uri: Option<String>,
) -> Result<Option<Namespace>, E> {
    match (prefix, uri) {
        (Some(prefix), Some(uri)) => Ok(Some(Namespace::get(&prefix, &uri))),
        (None, None) => Ok(None),
        (Some(_), None) => Err(E::missing_field("uri")),
        (None, Some(_)) => Err(E::missing_field("prefix")),
    }
}
