use std::fmt;

use crate::namespace::Namespace;

/// Kind of a [`Content`] value
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ContentKind {
    Element,
    Attribute,
    Text,
    CData,
    Comment,
    ProcessingInstruction,
}

impl fmt::Display for ContentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ContentKind::Element => "element",
            ContentKind::Attribute => "attribute",
            ContentKind::Text => "text",
            ContentKind::CData => "CDATA section",
            ContentKind::Comment => "comment",
            ContentKind::ProcessingInstruction => "processing instruction",
        })
    }
}

/// Attribute
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Attribute {
    name: String,
    namespace: Namespace,
    value: String,
}

impl Attribute {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self::with_namespace(name, Namespace::none(), value)
    }

    pub fn with_namespace(
        name: impl Into<String>,
        namespace: Namespace,
        value: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            namespace,
            value: value.into(),
        }
    }

    /// Local name
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn namespace(&self) -> &Namespace {
        &self.namespace
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    /// Name with namespace prefix as written in a document
    pub fn qualified_name(&self) -> String {
        qualified_name(&self.namespace, &self.name)
    }
}

/// Element
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Element {
    name: String,
    namespace: Namespace,
    attributes: Vec<Attribute>,
    children: Vec<Content>,
}

impl Element {
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_namespace(name, Namespace::none())
    }

    pub fn with_namespace(name: impl Into<String>, namespace: Namespace) -> Self {
        Self {
            name: name.into(),
            namespace,
            attributes: vec![],
            children: vec![],
        }
    }

    // name

    /// Local name
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn namespace(&self) -> &Namespace {
        &self.namespace
    }

    /// Name with namespace prefix as written in a document
    pub fn qualified_name(&self) -> String {
        qualified_name(&self.namespace, &self.name)
    }

    // attributes

    pub fn attributes(&self) -> &[Attribute] {
        &self.attributes
    }

    pub fn push_attribute(&mut self, attribute: Attribute) {
        self.attributes.push(attribute);
    }

    pub fn attribute(mut self, attribute: Attribute) -> Self {
        self.push_attribute(attribute);
        self
    }

    // children

    pub fn children(&self) -> &[Content] {
        &self.children
    }

    pub fn push_child(&mut self, child: impl Into<Content>) {
        self.children.push(child.into());
    }

    pub fn child(mut self, child: impl Into<Content>) -> Self {
        self.push_child(child);
        self
    }
}

fn qualified_name(namespace: &Namespace, name: &str) -> String {
    if namespace.prefix().is_empty() {
        name.to_string()
    } else {
        format!("{}:{}", namespace.prefix(), name)
    }
}

/// Character data
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Text(pub String);

/// CDATA section
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct CData(pub String);

/// Comment
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Comment(pub String);

/// Processing Instruction
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ProcessingInstruction {
    target: String,
    data: Option<String>,
}

impl ProcessingInstruction {
    pub fn new(target: impl Into<String>, data: Option<String>) -> Self {
        Self {
            target: target.into(),
            data,
        }
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    pub fn data(&self) -> Option<&str> {
        self.data.as_deref()
    }
}

/// A single piece of XML content
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Content {
    Element(Element),
    Attribute(Attribute),
    Text(Text),
    CData(CData),
    Comment(Comment),
    ProcessingInstruction(ProcessingInstruction),
}

impl Content {
    pub fn kind(&self) -> ContentKind {
        match self {
            Content::Element(_) => ContentKind::Element,
            Content::Attribute(_) => ContentKind::Attribute,
            Content::Text(_) => ContentKind::Text,
            Content::CData(_) => ContentKind::CData,
            Content::Comment(_) => ContentKind::Comment,
            Content::ProcessingInstruction(_) => ContentKind::ProcessingInstruction,
        }
    }

    /// Narrows to a specific kind
    ///
    /// ```
    /// use xrs_filter::{Comment, Content, Text};
    ///
    /// let content = Content::from(Comment("note".to_string()));
    /// assert!(content.downcast::<Comment>().is_some());
    /// assert!(content.downcast::<Text>().is_none());
    /// ```
    pub fn downcast<T: ContentType>(&self) -> Option<&T> {
        T::narrow(self)
    }
}

/// A concrete kind of [`Content`]
pub trait ContentType: fmt::Debug + 'static {
    const KIND: ContentKind;

    fn narrow(content: &Content) -> Option<&Self>;
}

/// A kind of [`Content`] with name and namespace
pub trait NamedContent: ContentType {
    fn name(&self) -> &str;

    fn namespace(&self) -> &Namespace;
}

macro_rules! content_type {
    ($( $ty:ident ),*) => {
        $(
            impl ContentType for $ty {
                const KIND: ContentKind = ContentKind::$ty;

                #[inline]
                fn narrow(content: &Content) -> Option<&Self> {
                    match content {
                        Content::$ty(inner) => Some(inner),
                        _ => None,
                    }
                }
            }

            impl From<$ty> for Content {
                fn from(inner: $ty) -> Self {
                    Content::$ty(inner)
                }
            }
        )*
    };
}

content_type![Element, Attribute, Text, CData, Comment, ProcessingInstruction];

impl NamedContent for Element {
    fn name(&self) -> &str {
        &self.name
    }

    fn namespace(&self) -> &Namespace {
        &self.namespace
    }
}

impl NamedContent for Attribute {
    fn name(&self) -> &str {
        &self.name
    }

    fn namespace(&self) -> &Namespace {
        &self.namespace
    }
}
