//! Thin wrappers around the kuchiki HTML tree.
//!
//! Everything that touches parser internals lives here: parsing markup into a
//! top-level node list, deep cloning, inner markup and text access, and
//! serialization.

use kuchiki::traits::TendrilSink as _;
use kuchiki::{NodeData, NodeRef};

use crate::markers;

/// Elements that never have content.
const VOID_ELEMENTS: [&str; 15] = [
    "area", "base", "br", "col", "embed", "hr", "img", "input", "keygen", "link", "meta", "param",
    "source", "track", "wbr",
];

/// Elements whose children are raw text and must not be escaped on output.
const RAW_TEXT_ELEMENTS: [&str; 8] = [
    "iframe", "noembed", "noframes", "noscript", "plaintext", "script", "style", "xmp",
];

/// Parse markup into the list of top-level nodes that extraction and
/// rendering walk.
///
/// Markup is parsed as a full document. When the parser only synthesized the
/// `<html>`/`<head>`/`<body>` scaffolding around a fragment, the body's
/// children are returned so rendering reproduces the fragment alone.
pub fn parse_nodes(html: &str) -> Vec<NodeRef> {
    let document = kuchiki::parse_html().one(html);
    let top_level: Vec<NodeRef> = document.children().collect();

    if top_level.len() != 1 {
        return top_level;
    }
    return match top_level.first().and_then(synthesized_body) {
        Some(body) => body.children().collect(),
        None => top_level,
    };
}

/// Return the `<body>` of a parser-synthesized wrapper, or `None` if the
/// markup really was a full document.
fn synthesized_body(root: &NodeRef) -> Option<NodeRef> {
    if tag_name(root)? != "html" || has_marker(root) {
        return None;
    }

    let children: Vec<NodeRef> = root.children().filter(|child| child.as_element().is_some()).collect();
    let [head, body] = children.as_slice() else {
        return None;
    };

    if tag_name(head)? != "head" || head.first_child().is_some() {
        return None;
    }
    if tag_name(body)? != "body" || has_marker(body) {
        return None;
    }
    return Some(body.clone());
}

/// Lowercase local name of an element node.
pub fn tag_name(node: &NodeRef) -> Option<String> {
    let element = node.as_element()?;
    return Some((*element.name.local).to_ascii_lowercase());
}

/// Whether the element is one of the fixed void elements.
pub fn is_void(node: &NodeRef) -> bool {
    return tag_name(node).is_some_and(|name| VOID_ELEMENTS.contains(&name.as_str()));
}

/// Value of an attribute, matched case-insensitively.
pub fn attribute(node: &NodeRef, name: &str) -> Option<String> {
    let element = node.as_element()?;
    let attributes = element.attributes.borrow();
    return attributes
        .map
        .iter()
        .find(|(key, _)| (*key.local).eq_ignore_ascii_case(name))
        .map(|(_, value)| value.value.clone());
}

/// Replace the value of an attribute that already exists on the element.
/// Returns `false` if the element has no such attribute.
pub fn replace_attribute(node: &NodeRef, name: &str, value: &str) -> bool {
    let Some(element) = node.as_element() else {
        return false;
    };
    let mut attributes = element.attributes.borrow_mut();
    let Some((_, attribute)) = attributes
        .map
        .iter_mut()
        .find(|(key, _)| (*key.local).eq_ignore_ascii_case(name))
    else {
        return false;
    };
    attribute.value = value.to_string();
    return true;
}

/// True if any attribute lives in the `loc:` namespace.
pub fn has_marker(node: &NodeRef) -> bool {
    let Some(element) = node.as_element() else {
        return false;
    };
    return element.attributes.borrow().map.keys().any(|key| markers::has_prefix(&key.local));
}

/// Names of `loc:` attributes the extraction does not recognize.
pub fn unknown_markers(node: &NodeRef) -> Vec<String> {
    let Some(element) = node.as_element() else {
        return Vec::new();
    };
    return element
        .attributes
        .borrow()
        .map
        .keys()
        .filter(|key| markers::has_prefix(&key.local) && !markers::is_known(&key.local))
        .map(|key| key.local.to_string())
        .collect();
}

/// Remove every `loc:` attribute from the element.
pub fn strip_markers(node: &NodeRef) {
    if let Some(element) = node.as_element() {
        element
            .attributes
            .borrow_mut()
            .map
            .retain(|key, _| !markers::has_prefix(&key.local));
    }
}

/// Number of element children.
pub fn child_element_count(node: &NodeRef) -> usize {
    return node.children().filter(|child| child.as_element().is_some()).count();
}

/// The node holding an element's content: the parser's template contents
/// fragment for a parsed `<template>`, the node itself otherwise.
/// Clones keep template content as ordinary children.
fn content_root(node: &NodeRef) -> NodeRef {
    if let Some(contents) = node.as_element().and_then(|element| element.template_contents.as_ref())
        && contents.first_child().is_some()
    {
        return contents.clone();
    }
    return node.clone();
}

/// Children in document order; template contents for `<template>`.
fn content_children(node: &NodeRef) -> Vec<NodeRef> {
    return content_root(node).children().collect();
}

/// Deep copy of a node and its subtree, detached from any parent.
/// Template contents become ordinary children so the serializer writes them.
pub fn deep_clone(node: &NodeRef) -> NodeRef {
    let copy = match node.data() {
        NodeData::Element(element) => {
            NodeRef::new_element(element.name.clone(), element.attributes.borrow().map.clone())
        },
        NodeData::Text(text) => NodeRef::new_text(text.borrow().clone()),
        NodeData::Comment(text) => NodeRef::new_comment(text.borrow().clone()),
        NodeData::ProcessingInstruction(contents) => {
            let contents = contents.borrow();
            NodeRef::new_processing_instruction(contents.0.clone(), contents.1.clone())
        },
        NodeData::Doctype(doctype) => NodeRef::new_doctype(
            doctype.name.clone(),
            doctype.public_id.clone(),
            doctype.system_id.clone(),
        ),
        NodeData::Document(_) => NodeRef::new_document(),
        NodeData::DocumentFragment => NodeRef::new(NodeData::DocumentFragment),
    };

    for child in content_children(node) {
        copy.append(deep_clone(&child));
    }
    return copy;
}

/// Serialize a node including itself, template contents included.
pub fn outer_html(node: &NodeRef) -> String {
    let mut buffer = Vec::new();
    if deep_clone(node).serialize(&mut buffer).is_err() {
        return String::new();
    }
    return String::from_utf8_lossy(&buffer).into_owned();
}

/// Serialize the children of an element.
pub fn inner_html(node: &NodeRef) -> String {
    if tag_name(node).is_some_and(|name| RAW_TEXT_ELEMENTS.contains(&name.as_str())) {
        return node.text_contents();
    }
    return content_children(node).iter().map(outer_html).collect();
}

/// Flattened text content of the subtree.
pub fn inner_text(node: &NodeRef) -> String {
    return node.text_contents();
}

/// Detach every child (or template content child) of the node.
fn clear_children(node: &NodeRef) {
    for child in content_children(node) {
        child.detach();
    }
}

/// Replace the children with markup parsed in the element's own context.
pub fn set_inner_html(node: &NodeRef, html: &str) {
    let Some(element) = node.as_element() else {
        return;
    };

    let parsed = kuchiki::parse_fragment(element.name.clone(), Vec::new()).one(html);
    let target = content_root(node);
    clear_children(node);

    // Fragment parsing wraps the result in a synthetic <html> root.
    let root = parsed.first_child().unwrap_or(parsed);
    let fragment: Vec<NodeRef> = root.children().collect();
    for child in fragment {
        child.detach();
        target.append(child);
    }
}

/// Replace the children with a single text node.
pub fn set_inner_text(node: &NodeRef, text: &str) {
    let target = content_root(node);
    clear_children(node);
    target.append(NodeRef::new_text(text));
}

/// Breadth-first walk starting at `root`, children enqueued after the visitor
/// runs, so nodes inserted by the visitor are visited too. Template contents
/// are walked like ordinary children.
pub fn walk_breadth_first(root: &NodeRef, mut visit: impl FnMut(&NodeRef)) {
    let mut queue = std::collections::VecDeque::from([root.clone()]);
    while let Some(node) = queue.pop_front() {
        visit(&node);
        queue.extend(content_children(&node));
    }
}
