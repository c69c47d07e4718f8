//! In-memory MJCF element tree.
//!
//! The whole XML document is read into a flat arena of [`Element`]s in
//! document order. Every element records the index of its parent, so the
//! child → parent lookup is built once at load time and keyed by element
//! index rather than by object identity.

use std::path::{Path, PathBuf};

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use thiserror::Error;

/// Errors that can occur while reading a scene document.
#[derive(Error, Debug)]
pub enum DocumentError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("XML error: {0}")]
    Xml(String),

    #[error("Closing tag `{0}` has no matching opening tag")]
    UnbalancedElement(String),

    #[error("Element `{0}` is never closed")]
    UnclosedElement(String),

    #[error("Document has no root element")]
    NoRoot,
}

/// Result type for document operations.
pub type DocumentResult<T> = Result<T, DocumentError>;

/// Index of an element inside its [`SceneDocument`].
pub type ElementId = usize;

/// Ordered attribute mapping of one element.
///
/// Attribute order follows the source text. Lookups are linear, which is
/// fine for the handful of attributes an MJCF element carries.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Attributes(Vec<(String, String)>);

impl Attributes {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get an attribute value by name.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Set an attribute, replacing any previous value in place.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.0.iter_mut().find(|(k, _)| *k == key) {
            Some(slot) => slot.1 = value,
            None => self.0.push((key, value)),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Attributes {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut attributes = Attributes::new();
        for (k, v) in iter {
            attributes.insert(k, v);
        }
        attributes
    }
}

/// One XML element of the scene document.
#[derive(Clone, Debug, PartialEq)]
pub struct Element {
    /// Position in document order
    pub id: ElementId,

    /// Tag name (`geom`, `body`, `texture`, ...)
    pub tag: String,

    /// Attributes in source order
    pub attributes: Attributes,

    /// Enclosing element, `None` for the root
    pub parent: Option<ElementId>,

    /// Direct children in document order
    pub children: Vec<ElementId>,
}

impl Element {
    /// Shorthand for `attributes.get(key)`.
    pub fn attr(&self, key: &str) -> Option<&str> {
        self.attributes.get(key)
    }

    /// Tag plus name, for error messages and logs.
    pub fn describe(&self) -> String {
        match self.attr("name") {
            Some(name) => format!("<{} name=\"{}\">", self.tag, name),
            None => format!("<{}> #{}", self.tag, self.id),
        }
    }
}

/// A fully materialized MJCF document.
#[derive(Clone, Debug)]
pub struct SceneDocument {
    elements: Vec<Element>,

    /// Directory relative asset paths are resolved against
    base_dir: Option<PathBuf>,
}

impl SceneDocument {
    /// Parse a document from XML text.
    pub fn parse(xml: &str) -> DocumentResult<Self> {
        let mut reader = Reader::from_str(xml);
        reader.config_mut().trim_text(true);

        let mut elements: Vec<Element> = Vec::new();
        let mut open: Vec<ElementId> = Vec::new();

        loop {
            match reader.read_event() {
                Ok(Event::Start(ref e)) => {
                    let id = push_element(&mut elements, open.last().copied(), e)?;
                    open.push(id);
                }
                Ok(Event::Empty(ref e)) => {
                    push_element(&mut elements, open.last().copied(), e)?;
                }
                Ok(Event::End(ref e)) => {
                    if open.pop().is_none() {
                        let tag = String::from_utf8_lossy(e.name().as_ref()).into_owned();
                        return Err(DocumentError::UnbalancedElement(tag));
                    }
                }
                Ok(Event::Eof) => break,
                // Declarations, comments, text: MJCF carries everything in attributes
                Ok(_) => {}
                Err(e) => return Err(DocumentError::Xml(e.to_string())),
            }
        }

        if let Some(&id) = open.last() {
            return Err(DocumentError::UnclosedElement(elements[id].tag.clone()));
        }
        if elements.is_empty() {
            return Err(DocumentError::NoRoot);
        }

        log::debug!("Read scene document with {} elements", elements.len());

        Ok(Self {
            elements,
            base_dir: None,
        })
    }

    /// Read and parse a document from disk.
    ///
    /// The file's directory becomes the base directory for asset paths.
    pub fn load<P: AsRef<Path>>(path: P) -> DocumentResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        let mut document = Self::parse(&content)?;
        document.base_dir = path.parent().map(|p| p.to_path_buf());
        Ok(document)
    }

    pub fn with_base_dir(mut self, base_dir: impl Into<PathBuf>) -> Self {
        self.base_dir = Some(base_dir.into());
        self
    }

    pub fn base_dir(&self) -> Option<&Path> {
        self.base_dir.as_deref()
    }

    /// The document's root element.
    pub fn root(&self) -> &Element {
        &self.elements[0]
    }

    /// Immediate parent of an element.
    pub fn parent(&self, id: ElementId) -> Option<&Element> {
        self.elements
            .get(id)
            .and_then(|e| e.parent)
            .and_then(|p| self.elements.get(p))
    }

    /// Direct children of an element, in document order.
    pub fn children(&self, id: ElementId) -> impl Iterator<Item = &Element> {
        self.elements
            .get(id)
            .into_iter()
            .flat_map(|e| e.children.iter())
            .filter_map(|&c| self.elements.get(c))
    }

    /// Ancestors of an element, nearest first.
    pub fn ancestors(&self, id: ElementId) -> Ancestors<'_> {
        Ancestors {
            document: self,
            next: self.elements.get(id).and_then(|e| e.parent),
        }
    }

    /// Whether any ancestor of `id` has the given tag.
    pub fn has_ancestor(&self, id: ElementId, tag: &str) -> bool {
        self.ancestors(id).any(|a| a.tag == tag)
    }

    /// All elements with the given tag, in document order.
    pub fn iter_tag<'a>(&'a self, tag: &'a str) -> impl Iterator<Item = &'a Element> + 'a {
        self.elements.iter().filter(move |e| e.tag == tag)
    }

    pub fn elements(&self) -> &[Element] {
        &self.elements
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }
}

/// Iterator over an element's ancestors, nearest first.
pub struct Ancestors<'a> {
    document: &'a SceneDocument,
    next: Option<ElementId>,
}

impl<'a> Iterator for Ancestors<'a> {
    type Item = &'a Element;

    fn next(&mut self) -> Option<Self::Item> {
        let element = self.document.elements.get(self.next?)?;
        self.next = element.parent;
        Some(element)
    }
}

fn push_element(
    elements: &mut Vec<Element>,
    parent: Option<ElementId>,
    start: &BytesStart,
) -> DocumentResult<ElementId> {
    let tag = String::from_utf8_lossy(start.name().as_ref()).into_owned();

    let mut attributes = Attributes::new();
    for attr in start.attributes() {
        let attr = attr.map_err(|e| DocumentError::Xml(e.to_string()))?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let value = attr
            .unescape_value()
            .map_err(|e| DocumentError::Xml(e.to_string()))?
            .into_owned();
        attributes.insert(key, value);
    }

    let id = elements.len();
    elements.push(Element {
        id,
        tag,
        attributes,
        parent,
        children: Vec::new(),
    });
    if let Some(p) = parent {
        elements[p].children.push(id);
    }

    Ok(id)
}
