use std::fs;
use std::path::Path;

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use crate::errors::{Error, Result};

/// One element of a loaded registry tree.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RegistryNode {
    pub name: String,
    pub attributes: Vec<(String, String)>,
    pub children: Vec<RegistryNode>,
    pub text: String,
}

impl RegistryNode {
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// The node's own character content, whitespace-trimmed.
    pub fn content(&self) -> &str {
        self.text.trim()
    }

    pub fn children_named<'a, 'n>(
        &'a self,
        name: &'n str,
    ) -> impl Iterator<Item = &'a RegistryNode> + 'n
    where
        'a: 'n,
    {
        self.children.iter().filter(move |child| child.name == name)
    }
}

/// A read-only XML configuration tree (the game descriptor, user
/// settings), queried by slash-separated paths.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Registry {
    root: RegistryNode,
}

impl Registry {
    pub fn from_str(xml: &str) -> Result<Registry> {
        let mut reader = Reader::from_str(xml);
        reader.trim_text(true);

        // A virtual root holds the document element so lookups can treat
        // its name as the first path segment.
        let mut stack = vec![RegistryNode::default()];

        loop {
            match reader.read_event()? {
                Event::Start(e) => stack.push(node_from(&e)?),
                Event::Empty(e) => {
                    let node = node_from(&e)?;
                    if let Some(parent) = stack.last_mut() {
                        parent.children.push(node);
                    }
                }
                Event::End(_) => {
                    // The reader has already verified tag pairing.
                    if stack.len() > 1 {
                        let node = stack.pop().unwrap_or_default();
                        if let Some(parent) = stack.last_mut() {
                            parent.children.push(node);
                        }
                    }
                }
                Event::Text(t) => {
                    if let Some(node) = stack.last_mut() {
                        node.text.push_str(&t.unescape()?);
                    }
                }
                Event::Eof => break,
                _ => {}
            }
        }

        Ok(Registry {
            root: stack.pop().unwrap_or_default(),
        })
    }

    pub fn from_file(path: &Path) -> Result<Registry> {
        Registry::from_str(&fs::read_to_string(path)?)
    }

    /// All nodes matching a slash-separated path, in document order.
    /// An empty segment (a `//` in the path) matches descendants at any
    /// depth, e.g. `game/filtersystem//filter`.
    pub fn find_path<'a>(&'a self, path: &str) -> Vec<&'a RegistryNode> {
        let mut current: Vec<&RegistryNode> = vec![&self.root];
        let mut descend = false;

        for segment in path.split('/') {
            if segment.is_empty() {
                descend = true;
                continue;
            }
            let mut next = Vec::new();
            for node in current {
                if descend {
                    collect_descendants_named(node, segment, &mut next);
                } else {
                    next.extend(node.children_named(segment));
                }
            }
            current = next;
            descend = false;
        }

        current
    }

    /// The unique node at `path`. Zero or several matches are reported
    /// as a missing configuration node.
    pub fn require(&self, path: &str) -> Result<&RegistryNode> {
        let mut nodes = self.find_path(path);
        match (nodes.pop(), nodes.is_empty()) {
            (Some(node), true) => Ok(node),
            _ => Err(Error::MissingGameNode {
                path: path.to_owned(),
            }),
        }
    }
}

fn collect_descendants_named<'a>(
    node: &'a RegistryNode,
    name: &str,
    out: &mut Vec<&'a RegistryNode>,
) {
    for child in &node.children {
        if child.name == name {
            out.push(child);
        }
        collect_descendants_named(child, name, out);
    }
}

fn node_from(e: &BytesStart) -> Result<RegistryNode> {
    let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
    let mut attributes = Vec::new();
    for attr in e.attributes() {
        let attr = attr.map_err(quick_xml::Error::from)?;
        attributes.push((
            String::from_utf8_lossy(attr.key.as_ref()).into_owned(),
            attr.unescape_value()?.into_owned(),
        ));
    }
    Ok(RegistryNode {
        name,
        attributes,
        children: Vec::new(),
        text: String::new(),
    })
}
