use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;

use serde::de::Deserializer;
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};

use crate::content::{
    CData, Comment, Content, ContentType, NamedContent, ProcessingInstruction, Text,
};
use crate::namespace::{self, Namespace};

/// Typed predicate over [`Content`]
pub trait Filter {
    /// Kind of content accepted by this filter
    type Output: ContentType;

    /// Returns the content narrowed to [`Filter::Output`] when it matches
    fn filter<'a>(&self, content: &'a Content) -> Option<&'a Self::Output>;

    fn matches(&self, content: &Content) -> bool {
        self.filter(content).is_some()
    }

    /// Lazily filters a sequence of content
    fn filter_content<'a, I>(&self, content: I) -> Filtered<'_, Self, I::IntoIter>
    where
        I: IntoIterator<Item = &'a Content>,
    {
        Filtered {
            filter: self,
            iter: content.into_iter(),
        }
    }
}

/// Iterator returned by [`Filter::filter_content`]
pub struct Filtered<'f, F: ?Sized, I> {
    filter: &'f F,
    iter: I,
}

impl<'a, 'f, F, I> Iterator for Filtered<'f, F, I>
where
    F: Filter + ?Sized,
    I: Iterator<Item = &'a Content>,
{
    type Item = &'a F::Output;

    fn next(&mut self) -> Option<Self::Item> {
        let filter = self.filter;
        self.iter.find_map(|content| filter.filter(content))
    }
}

/// Filter for named content by local name and namespace
///
/// Without name and namespace every content of kind `K` matches. Two
/// filters are equal when name and namespace are equal.
pub struct NameFilter<K> {
    name: Option<String>,
    namespace: Option<Namespace>,
    kind: PhantomData<fn() -> K>,
}

impl<K> NameFilter<K> {
    fn create(name: Option<String>, namespace: Option<Namespace>) -> Self {
        Self {
            name,
            namespace,
            kind: PhantomData,
        }
    }

    /// Matches all content of the kind
    pub fn new() -> Self {
        Self::create(None, None)
    }

    /// Matches the name in any namespace
    pub fn with_name(name: impl Into<String>) -> Self {
        Self::create(Some(name.into()), None)
    }

    /// Matches any name in the namespace
    pub fn with_namespace(namespace: Namespace) -> Self {
        Self::create(None, Some(namespace))
    }

    pub fn with_name_and_namespace(name: impl Into<String>, namespace: Namespace) -> Self {
        Self::create(Some(name.into()), Some(namespace))
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn namespace(&self) -> Option<&Namespace> {
        self.namespace.as_ref()
    }
}

impl<K: NamedContent> Filter for NameFilter<K> {
    type Output = K;

    fn filter<'a>(&self, content: &'a Content) -> Option<&'a K> {
        let named = K::narrow(content)?;
        if let Some(name) = &self.name {
            if name != named.name() {
                return None;
            }
        }
        if let Some(namespace) = &self.namespace {
            if namespace != named.namespace() {
                return None;
            }
        }
        Some(named)
    }
}

impl<K> Default for NameFilter<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K> Clone for NameFilter<K> {
    fn clone(&self) -> Self {
        Self::create(self.name.clone(), self.namespace.clone())
    }
}

impl<K> PartialEq for NameFilter<K> {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.namespace == other.namespace
    }
}

impl<K> Eq for NameFilter<K> {}

impl<K> Hash for NameFilter<K> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
        self.namespace.hash(state);
    }
}

impl<K: ContentType> fmt::Debug for NameFilter<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NameFilter")
            .field("kind", &K::KIND)
            .field("name", &self.name)
            .field("namespace", &self.namespace)
            .finish()
    }
}

/// Persisted form of a [`NameFilter`]
///
/// The namespace is stored as prefix and URI and resolved through the
/// namespace registry when read back.
#[derive(Serialize, Deserialize)]
#[serde(rename = "NameFilter")]
struct NameFilterRepr {
    name: Option<String>,
    prefix: Option<String>,
    uri: Option<String>,
}

impl<K> Serialize for NameFilter<K> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        NameFilterRepr {
            name: self.name.clone(),
            prefix: self.namespace.as_ref().map(|ns| ns.prefix().to_string()),
            uri: self.namespace.as_ref().map(|ns| ns.uri().to_string()),
        }
        .serialize(serializer)
    }
}

impl<'de, K> Deserialize<'de> for NameFilter<K> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let repr = NameFilterRepr::deserialize(deserializer)?;
        let namespace = namespace::resolve(repr.prefix, repr.uri)?;
        Ok(Self::create(repr.name, namespace))
    }
}

/// Filter matching every content of kind `K`
pub struct KindFilter<K>(PhantomData<fn() -> K>);

impl<K> KindFilter<K> {
    pub fn new() -> Self {
        Self(PhantomData)
    }
}

impl<K: ContentType> Filter for KindFilter<K> {
    type Output = K;

    #[inline]
    fn filter<'a>(&self, content: &'a Content) -> Option<&'a K> {
        K::narrow(content)
    }
}

impl<K> Default for KindFilter<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K> Clone for KindFilter<K> {
    fn clone(&self) -> Self {
        Self::new()
    }
}

impl<K> Copy for KindFilter<K> {}

impl<K> PartialEq for KindFilter<K> {
    fn eq(&self, _other: &Self) -> bool {
        true
    }
}

impl<K> Eq for KindFilter<K> {}

impl<K> Hash for KindFilter<K> {
    fn hash<H: Hasher>(&self, _state: &mut H) {}
}

impl<K: ContentType> fmt::Debug for KindFilter<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("KindFilter").field(&K::KIND).finish()
    }
}

/// Filter for character data
pub type TextFilter = KindFilter<Text>;

/// Filter for CDATA sections
pub type CDataFilter = KindFilter<CData>;

/// Filter for comments
pub type CommentFilter = KindFilter<Comment>;

/// Filter for processing instructions, optionally by target
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProcessingInstructionFilter {
    target: Option<String>,
}

impl ProcessingInstructionFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_target(target: impl Into<String>) -> Self {
        Self {
            target: Some(target.into()),
        }
    }

    pub fn target(&self) -> Option<&str> {
        self.target.as_deref()
    }
}

impl Filter for ProcessingInstructionFilter {
    type Output = ProcessingInstruction;

    fn filter<'a>(&self, content: &'a Content) -> Option<&'a ProcessingInstruction> {
        let pi = ProcessingInstruction::narrow(content)?;
        match &self.target {
            Some(target) if target != pi.target() => None,
            _ => Some(pi),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::hash_map::DefaultHasher;
    use std::collections::HashSet;

    use assert_matches::assert_matches;

    use crate::content::{Attribute, Element};
    use crate::{AttributeFilter, ElementFilter};

    use super::*;

    fn hash_of<T: Hash>(value: &T) -> u64 {
        let mut hasher = DefaultHasher::new();
        value.hash(&mut hasher);
        hasher.finish()
    }

    fn ns_a() -> Namespace {
        Namespace::get("a", "urn:test:filter:a")
    }

    fn ns_b() -> Namespace {
        Namespace::get("b", "urn:test:filter:b")
    }

    fn attr(name: &str, namespace: Namespace) -> Content {
        Content::from(Attribute::with_namespace(name, namespace, "value"))
    }

    mod attribute {
        use super::*;

        #[test]
        fn matches_every_attribute() {
            let filter = AttributeFilter::new();
            assert!(filter.matches(&attr("id", Namespace::none())));
            assert!(filter.matches(&attr("ref", ns_a())));
        }

        #[test]
        fn rejects_other_kinds() {
            let filter = AttributeFilter::new();
            assert!(!filter.matches(&Content::from(Element::new("id"))));
            assert!(!filter.matches(&Content::from(Text("id".into()))));
        }

        #[test]
        fn name_in_any_namespace() {
            let filter = AttributeFilter::with_name("id");
            assert!(filter.matches(&attr("id", Namespace::none())));
            assert!(filter.matches(&attr("id", ns_a())));
            assert!(!filter.matches(&attr("ref", Namespace::none())));
        }

        #[test]
        fn namespace_with_any_name() {
            let filter = AttributeFilter::with_namespace(ns_a());
            assert!(filter.matches(&attr("id", ns_a())));
            assert!(filter.matches(&attr("ref", ns_a())));
            assert!(!filter.matches(&attr("id", ns_b())));
            assert!(!filter.matches(&attr("id", Namespace::none())));
        }

        #[test]
        fn namespace_is_compared_by_uri() {
            let filter = AttributeFilter::with_namespace(ns_a());
            let alias = Namespace::get("other", ns_a().uri());
            assert!(filter.matches(&attr("id", alias)));
        }

        #[test]
        fn name_and_namespace() {
            let filter = AttributeFilter::with_name_and_namespace("id", ns_a());
            assert!(filter.matches(&attr("id", ns_a())));
            assert!(!filter.matches(&attr("ref", ns_a())));
            assert!(!filter.matches(&attr("id", ns_b())));
        }

        #[test]
        fn returns_narrowed_content() {
            let content = attr("id", ns_a());
            assert_matches!(
                AttributeFilter::with_name("id").filter(&content),
                Some(attribute) if attribute.value() == "value"
            );
        }
    }

    mod element {
        use super::*;

        #[test]
        fn name_and_namespace() {
            let content = Content::from(Element::with_namespace("root", ns_b()));
            assert!(ElementFilter::new().matches(&content));
            assert!(ElementFilter::with_name("root").matches(&content));
            assert!(ElementFilter::with_namespace(ns_b()).matches(&content));
            assert!(!ElementFilter::with_namespace(ns_a()).matches(&content));
            assert!(!ElementFilter::with_name("other").matches(&content));
        }

        #[test]
        fn rejects_attributes() {
            assert!(!ElementFilter::with_name("id").matches(&attr("id", Namespace::none())));
        }
    }

    mod equality {
        use super::*;

        #[test]
        fn unconstrained_filters_are_equal() {
            assert_eq!(AttributeFilter::new(), AttributeFilter::new());
            assert_eq!(
                hash_of(&AttributeFilter::new()),
                hash_of(&AttributeFilter::new())
            );
        }

        #[test]
        fn different_names_are_not_equal() {
            assert_ne!(AttributeFilter::with_name("id"), AttributeFilter::with_name("ref"));
            assert_ne!(AttributeFilter::with_name("id"), AttributeFilter::new());
        }

        #[test]
        fn different_namespaces_are_not_equal() {
            assert_ne!(
                AttributeFilter::with_namespace(ns_a()),
                AttributeFilter::with_namespace(ns_b())
            );
            assert_ne!(AttributeFilter::with_namespace(ns_a()), AttributeFilter::new());
        }

        #[test]
        fn same_constraints_hash_equal() {
            let first = AttributeFilter::with_name_and_namespace("id", ns_a());
            let second = AttributeFilter::with_name_and_namespace("id", ns_a());
            assert_eq!(first, second);
            assert_eq!(hash_of(&first), hash_of(&second));
        }

        #[test]
        fn deduplicate_in_set() {
            let set: HashSet<_> = vec![
                AttributeFilter::with_name("id"),
                AttributeFilter::with_name("id"),
                AttributeFilter::with_name("ref"),
                AttributeFilter::new(),
                AttributeFilter::new(),
            ]
            .into_iter()
            .collect();
            assert_eq!(3, set.len());
        }

        #[test]
        fn clone_is_equal() {
            let filter = AttributeFilter::with_name_and_namespace("id", ns_a());
            assert_eq!(filter, filter.clone());
        }
    }

    mod persistence {
        use super::*;

        #[test]
        fn round_trip_resolves_interned_namespace() {
            let filter = AttributeFilter::with_name_and_namespace("id", ns_a());
            let json = serde_json::to_string(&filter).unwrap();
            assert_eq!(
                r#"{"name":"id","prefix":"a","uri":"urn:test:filter:a"}"#,
                json
            );

            let restored: AttributeFilter = serde_json::from_str(&json).unwrap();
            assert_eq!(filter, restored);
            assert!(restored.namespace().unwrap().ptr_eq(&ns_a()));
        }

        #[test]
        fn without_namespace() {
            let json = serde_json::to_string(&AttributeFilter::with_name("id")).unwrap();
            assert_eq!(r#"{"name":"id","prefix":null,"uri":null}"#, json);

            let restored: AttributeFilter = serde_json::from_str(&json).unwrap();
            assert_eq!(None, restored.namespace());
            assert_eq!(Some("id"), restored.name());
        }

        #[test]
        fn incomplete_namespace() {
            let result: Result<AttributeFilter, _> =
                serde_json::from_str(r#"{"name":null,"prefix":"a","uri":null}"#);
            assert!(result.is_err());
        }
    }

    mod kind {
        use super::*;

        #[test]
        fn text() {
            assert!(TextFilter::new().matches(&Content::from(Text("t".into()))));
            assert!(!TextFilter::new().matches(&Content::from(CData("t".into()))));
        }

        #[test]
        fn comment() {
            let content = Content::from(Comment("note".into()));
            assert_matches!(CommentFilter::new().filter(&content), Some(Comment(text)) if text == "note");
            assert!(!CDataFilter::new().matches(&content));
        }

        #[test]
        fn processing_instruction() {
            let content = Content::from(ProcessingInstruction::new("xml-stylesheet", None));
            assert!(ProcessingInstructionFilter::new().matches(&content));
            assert!(ProcessingInstructionFilter::with_target("xml-stylesheet").matches(&content));
            assert!(!ProcessingInstructionFilter::with_target("php").matches(&content));
            assert!(!ProcessingInstructionFilter::new().matches(&Content::from(Text("t".into()))));
        }
    }

    mod iter {
        use super::*;

        #[test]
        fn filter_content() {
            let element = Element::new("root")
                .child(Text("a".into()))
                .child(Element::new("x"))
                .child(Comment("c".into()))
                .child(Element::with_namespace("y", ns_a()))
                .child(Element::new("x"));

            let names: Vec<_> = ElementFilter::new()
                .filter_content(element.children())
                .map(|e| e.name())
                .collect();
            assert_eq!(vec!["x", "y", "x"], names);

            assert_eq!(
                2,
                ElementFilter::with_name("x")
                    .filter_content(element.children())
                    .count()
            );
            assert_eq!(1, TextFilter::new().filter_content(element.children()).count());
        }
    }
}
