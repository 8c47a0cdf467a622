//! Front-matter extraction and parsing.
//!
//! A document's metadata lives in a leading `---` fenced YAML block.
//! Only a flat key/value record is understood here; anything fancier
//! in the block is carried through as an ignored extra field or, when
//! the block itself is unusable, degrades the whole document to
//! [`DocumentMeta::Unreadable`]. Parsing never returns an error.

use std::collections::BTreeMap;

use crate::document::{DocKind, DocumentMeta, FrontmatterRecord, Status};

/// Split the front-matter block off a document body.
///
/// Returns the text between the opening `---` line and the closing
/// `---` (or `...`) line, or `None` when the document has no
/// well-formed leading block.
pub fn extract(text: &str) -> Option<&str> {
    let rest = text.strip_prefix("---")?;
    let rest = rest.strip_prefix('\r').unwrap_or(rest);
    let rest = rest.strip_prefix('\n')?;

    let mut offset = 0;
    for line in rest.split_inclusive('\n') {
        let trimmed = line.trim_end_matches(['\r', '\n']);
        if trimmed == "---" || trimmed == "..." {
            return Some(&rest[..offset]);
        }
        offset += line.len();
    }
    None
}

/// Parse a document body into metadata.
///
/// Missing block, malformed YAML, or a record without any usable
/// identity (no id and no title) all yield `Unreadable`.
pub fn parse(text: &str) -> DocumentMeta {
    let Some(block) = extract(text) else {
        return DocumentMeta::Unreadable;
    };

    let fields: BTreeMap<String, serde_yaml::Value> = match serde_yaml::from_str(block) {
        Ok(fields) => fields,
        Err(_) => return DocumentMeta::Unreadable,
    };

    let mut scalars = BTreeMap::new();
    for (key, value) in fields {
        if let Some(scalar) = scalar_to_string(&value) {
            scalars.insert(key, scalar);
        }
    }

    let id = scalars.remove("id");
    let title = scalars.remove("title");
    let (id, title) = match (id, title) {
        (Some(id), Some(title)) => (id, title),
        (Some(id), None) => (id.clone(), id),
        (None, Some(title)) => (title.clone(), title),
        (None, None) => return DocumentMeta::Unreadable,
    };

    let status = scalars
        .remove("status")
        .map(|raw| Status::parse(&raw))
        .unwrap_or(Status::NotStarted);
    let kind = scalars
        .remove("kind")
        .or_else(|| scalars.remove("type"))
        .map(|raw| DocKind::parse(&raw))
        .unwrap_or(DocKind::Story);
    let parent = scalars.remove("parent").filter(|p| !p.trim().is_empty());

    DocumentMeta::Parsed(FrontmatterRecord {
        id,
        title,
        status,
        kind,
        parent,
        extra: scalars,
    })
}

/// Render a YAML scalar as a plain string. Sequences and mappings are
/// not flat key/value data and are dropped.
fn scalar_to_string(value: &serde_yaml::Value) -> Option<String> {
    match value {
        serde_yaml::Value::String(s) => Some(s.clone()),
        serde_yaml::Value::Number(n) => Some(n.to_string()),
        serde_yaml::Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}
