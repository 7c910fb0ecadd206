//! Shallow XML projection.
//!
//! Only the direct element children of the root become entries, mapped
//! `tag → leading text`. Grandchildren are never unpacked, so
//! `<root><db><user>x</user></db></root>` yields `{"db": null}` when `<db>`
//! has no text of its own.
//!
//! # Design Decisions
//! - Leading text is every text node before the first child element, joined;
//!   comments and processing instructions in between are skipped
//! - Elements without leading text map to `null`
//! - Namespaced tags are written `{namespace}local`
//! - Repeated tags: the last occurrence wins

use std::path::Path;

use roxmltree::{Document, Node, ParsingOptions};
use serde_json::Value;

use super::Format;
use crate::config::error::{ConfigError, ConfigResult};
use crate::config::value::ParsedConfig;

/// Parse an XML document into a flat mapping of the root's children.
pub fn parse_xml(path: &Path, source: &str) -> ConfigResult<ParsedConfig> {
    let mut options = ParsingOptions::default();
    options.allow_dtd = true;
    let doc = Document::parse_with_options(source, options).map_err(|e| {
        ConfigError::malformed(Format::Xml, path, format!("XML parsing error: {}", e))
    })?;

    let mut config = ParsedConfig::new();
    for child in doc.root_element().children().filter(Node::is_element) {
        config.insert(tag_of(&child), leading_text(&child));
    }

    Ok(config)
}

fn leading_text(node: &Node<'_, '_>) -> Value {
    let mut pieces = node
        .children()
        .take_while(|n| !n.is_element())
        .filter(Node::is_text)
        .filter_map(|n| n.text())
        .peekable();

    if pieces.peek().is_none() {
        return Value::Null;
    }
    Value::String(pieces.collect())
}

fn tag_of(node: &Node<'_, '_>) -> String {
    let tag = node.tag_name();
    match tag.namespace() {
        Some(ns) => format!("{{{}}}{}", ns, tag.name()),
        None => tag.name().to_string(),
    }
}
