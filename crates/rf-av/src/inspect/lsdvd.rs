//! Parsing of `lsdvd -Ox` output into a [`DiscDocument`].
//!
//! lsdvd writes raw bytes from the disc into `<langcode>` elements, which
//! regularly breaks XML parsers. Those lines are dropped before parsing and
//! the rest is made permissive (stray `&`, control characters) so that the
//! strict parser accepts it.

use std::str::FromStr;

use rf_core::{DiscDocument, Error, Result, Track};

const TOOL: &str = "lsdvd";
const ROOT: &str = "lsdvd";

/// Marker of the sub-element lsdvd emits in an unparseable form.
const MALFORMED_MARKER: &str = "<langcode>";

/// Arguments requesting XML output with audio and verbose track detail.
pub const LSDVD_ARGS: [&str; 3] = ["-Ox", "-a", "-v"];

/// Sanitize and parse raw lsdvd output.
pub fn parse_lsdvd(raw: &str) -> Result<DiscDocument> {
    let cleaned = make_permissive(&strip_malformed_lines(raw));

    let doc = roxmltree::Document::parse(&cleaned)
        .map_err(|e| Error::parse(TOOL, format!("XML parse error: {e}")))?;

    let root = doc.root_element();
    if root.tag_name().name() != ROOT {
        return Err(Error::parse(TOOL, format!("cannot find root element '{ROOT}'")));
    }

    let title = child_text(&root, "title")
        .filter(|t| !t.is_empty())
        .map(str::to_string);

    let tracks = root
        .children()
        .filter(|n| n.is_element() && n.tag_name().name() == "track")
        .enumerate()
        .map(|(position, node)| parse_track(&node, position + 1))
        .collect::<Result<Vec<_>>>()?;

    Ok(DiscDocument { title, tracks })
}

/// Drop every line carrying the malformed marker.
pub fn strip_malformed_lines(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for line in raw.lines().filter(|l| !l.contains(MALFORMED_MARKER)) {
        out.push_str(line);
        out.push('\n');
    }
    out
}

/// Escape stray ampersands and drop control characters the parser rejects.
fn make_permissive(xml: &str) -> String {
    let mut out = String::with_capacity(xml.len());
    for (i, c) in xml.char_indices() {
        match c {
            '&' if !starts_entity(&xml[i + 1..]) => out.push_str("&amp;"),
            '\t' | '\n' | '\r' => out.push(c),
            c if c.is_control() => {}
            c => out.push(c),
        }
    }
    out
}

/// Whether the text after a `&` forms an entity or character reference.
fn starts_entity(rest: &str) -> bool {
    let Some(end) = rest.find(';') else {
        return false;
    };
    let body = &rest[..end];
    if let Some(num) = body.strip_prefix('#') {
        return match num.strip_prefix('x') {
            Some(hex) => !hex.is_empty() && hex.chars().all(|c| c.is_ascii_hexdigit()),
            None => !num.is_empty() && num.chars().all(|c| c.is_ascii_digit()),
        };
    }
    matches!(body, "amp" | "lt" | "gt" | "quot" | "apos")
}

fn parse_track(node: &roxmltree::Node, position: usize) -> Result<Track> {
    Ok(Track {
        index: required(node, "ix", position)?,
        length: required(node, "length", position)?,
        width: required(node, "width", position)?,
    })
}

/// Text of the first direct child element called `name`.
///
/// Only direct children count: `<audio>` and `<chapter>` carry their own `<ix>`.
fn child_text<'a>(node: &roxmltree::Node<'a, '_>, name: &str) -> Option<&'a str> {
    node.children()
        .find(|n| n.is_element() && n.tag_name().name() == name)
        .map(|n| n.text().unwrap_or("").trim())
}

fn required<T: FromStr>(node: &roxmltree::Node, name: &str, position: usize) -> Result<T> {
    let text = child_text(node, name).ok_or_else(|| {
        Error::parse(TOOL, format!("track #{position} has no <{name}> element"))
    })?;
    text.parse().map_err(|_| {
        Error::parse(TOOL, format!("track #{position} has invalid <{name}> '{text}'"))
    })
}
