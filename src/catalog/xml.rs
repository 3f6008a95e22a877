//! Read-only catalog XML tree.
//!
//! Catalog files are parsed once into a flat node arena with parent links so
//! the bootstrap can walk both down (`fs/f/fs/f`) and across the document
//! (looking up the `item` that defines a referenced feature or type).

use anyhow::{Context, Result};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::path::Path;

#[derive(Debug, Clone, Default)]
pub struct CatalogDocument {
    nodes: Vec<NodeData>,
    roots: Vec<usize>,
}

#[derive(Debug, Clone)]
struct NodeData {
    name: String,
    attributes: Vec<(String, String)>,
    text: String,
    parent: Option<usize>,
    children: Vec<usize>,
}

impl CatalogDocument {
    pub fn parse(xml: &str) -> Result<Self> {
        let mut reader = Reader::from_str(xml);
        reader.config_mut().trim_text(true);

        let mut doc = CatalogDocument::default();
        let mut stack: Vec<usize> = Vec::new();

        loop {
            match reader
                .read_event()
                .with_context(|| format!("Malformed catalog XML at byte {}", reader.buffer_position()))?
            {
                Event::Start(e) => {
                    let index = doc.push_element(&e, stack.last().copied())?;
                    stack.push(index);
                }
                Event::Empty(e) => {
                    doc.push_element(&e, stack.last().copied())?;
                }
                Event::End(_) => {
                    stack.pop();
                }
                Event::Text(t) => {
                    if let Some(&current) = stack.last() {
                        doc.nodes[current].text.push_str(&t.unescape()?);
                    }
                }
                Event::CData(c) => {
                    if let Some(&current) = stack.last() {
                        doc.nodes[current]
                            .text
                            .push_str(&String::from_utf8_lossy(&c.into_inner()));
                    }
                }
                Event::Eof => break,
                _ => {}
            }
        }

        Ok(doc)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let xml = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read catalog {}", path.display()))?;
        Self::parse(&xml).with_context(|| format!("Failed to parse catalog {}", path.display()))
    }

    fn push_element(&mut self, e: &BytesStart<'_>, parent: Option<usize>) -> Result<usize> {
        let mut attributes = Vec::new();
        for attr in e.attributes() {
            let attr = attr?;
            attributes.push((
                String::from_utf8_lossy(attr.key.as_ref()).into_owned(),
                attr.unescape_value()?.into_owned(),
            ));
        }

        let index = self.nodes.len();
        self.nodes.push(NodeData {
            name: String::from_utf8_lossy(e.name().as_ref()).into_owned(),
            attributes,
            text: String::new(),
            parent,
            children: Vec::new(),
        });
        match parent {
            Some(p) => self.nodes[p].children.push(index),
            None => self.roots.push(index),
        }
        Ok(index)
    }

    pub fn roots(&self) -> impl Iterator<Item = CatalogNode<'_>> {
        self.roots.iter().map(move |&index| CatalogNode { doc: self, index })
    }

    /// Every element in document order
    pub fn nodes(&self) -> impl Iterator<Item = CatalogNode<'_>> {
        (0..self.nodes.len()).map(move |index| CatalogNode { doc: self, index })
    }

    /// The `item` element with the given `id`, optionally restricted to an
    /// item `type` ("fsType", "feature", "value")
    pub fn find_item(&self, id: &str, item_type: Option<&str>) -> Option<CatalogNode<'_>> {
        self.nodes().find(|n| {
            n.name() == "item"
                && n.attr("id") == Some(id)
                && item_type.map_or(true, |t| n.attr("type") == Some(t))
        })
    }

    pub fn items_of_type<'a>(&'a self, item_type: &'a str) -> impl Iterator<Item = CatalogNode<'a>> {
        self.nodes()
            .filter(move |n| n.name() == "item" && n.attr("type") == Some(item_type))
    }
}

/// Borrowed handle to one element of a [`CatalogDocument`]
#[derive(Debug, Clone, Copy)]
pub struct CatalogNode<'a> {
    doc: &'a CatalogDocument,
    index: usize,
}

impl<'a> CatalogNode<'a> {
    fn data(&self) -> &'a NodeData {
        &self.doc.nodes[self.index]
    }

    pub fn document(&self) -> &'a CatalogDocument {
        self.doc
    }

    pub fn name(&self) -> &'a str {
        &self.data().name
    }

    pub fn attr(&self, name: &str) -> Option<&'a str> {
        self.data()
            .attributes
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    /// Text content (trimmed)
    pub fn text(&self) -> &'a str {
        &self.data().text
    }

    pub fn parent(&self) -> Option<CatalogNode<'a>> {
        self.data().parent.map(|index| CatalogNode {
            doc: self.doc,
            index,
        })
    }

    pub fn ancestors(&self) -> impl Iterator<Item = CatalogNode<'a>> {
        std::iter::successors(self.parent(), |n| n.parent())
    }

    pub fn children(&self) -> impl Iterator<Item = CatalogNode<'a>> {
        let doc = self.doc;
        self.data()
            .children
            .iter()
            .map(move |&index| CatalogNode { doc, index })
    }

    /// First child element with the given name
    pub fn child(&self, name: &str) -> Option<CatalogNode<'a>> {
        self.children().find(|c| c.name() == name)
    }
}
