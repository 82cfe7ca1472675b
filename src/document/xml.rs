//! XML → [`DocTree`].
//!
//! Elements become nodes keyed by their tag name, attributes become scalar
//! children keyed by the attribute name, and text content is attached to the
//! enclosing element. An element without attributes or child elements is a
//! scalar. The tree root is a synthetic, unkeyed mapping whose only child is
//! the document element.

use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;

use super::{DocTree, DocumentError, DocumentTree, NodeId, NodeKind};

/// Parse an XML document into a tree. Attributes become scalar children.
pub fn parse(path: &str, text: &str) -> Result<DocTree, DocumentError> {
    let mut reader = Reader::from_str(text);
    reader.config_mut().trim_text(true);

    let mut tree = DocTree::new(path);
    let root = tree.add(None, NodeKind::Mapping, None, None);
    let mut stack: Vec<NodeId> = vec![root];

    loop {
        match reader.read_event()? {
            Event::Start(start) => {
                let parent = stack.last().copied().unwrap_or(root);
                let node = open_element(&mut tree, parent, &start)?;
                stack.push(node);
            }
            Event::Empty(start) => {
                let parent = stack.last().copied().unwrap_or(root);
                let node = open_element(&mut tree, parent, &start)?;
                close_element(&mut tree, node);
            }
            Event::End(end) => {
                if stack.len() <= 1 {
                    let name = String::from_utf8_lossy(end.name().as_ref()).into_owned();
                    return Err(DocumentError::Unbalanced(name));
                }
                if let Some(node) = stack.pop() {
                    close_element(&mut tree, node);
                }
            }
            Event::Text(content) => {
                if let Some(&node) = stack.last() {
                    let content = content.unescape()?;
                    if node != root && !content.is_empty() {
                        tree.append_text(node, &content);
                    }
                }
            }
            Event::CData(data) => {
                if let Some(&node) = stack.last() {
                    let data = data.into_inner();
                    if node != root {
                        tree.append_text(node, &String::from_utf8_lossy(&data));
                    }
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if stack.len() > 1 {
        let open = stack.last().and_then(|&n| tree_key(&tree, n)).unwrap_or_default();
        return Err(DocumentError::Unbalanced(open));
    }
    Ok(tree)
}

fn open_element(
    tree: &mut DocTree,
    parent: NodeId,
    start: &BytesStart<'_>,
) -> Result<NodeId, DocumentError> {
    let name = String::from_utf8_lossy(start.name().as_ref()).into_owned();
    let node = tree.add(Some(parent), NodeKind::Mapping, Some(&name), None);
    for attribute in start.attributes() {
        let attribute = attribute?;
        let key = String::from_utf8_lossy(attribute.key.as_ref()).into_owned();
        let value = attribute.unescape_value()?;
        tree.add(Some(node), NodeKind::Scalar, Some(&key), Some(&value));
    }
    Ok(node)
}

fn close_element(tree: &mut DocTree, node: NodeId) {
    if tree.children(node).is_empty() {
        tree.set_kind(node, NodeKind::Scalar);
    }
}

fn tree_key(tree: &DocTree, node: NodeId) -> Option<String> {
    tree.key(node).map(str::to_string)
}
