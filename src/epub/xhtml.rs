/*!
 * XHTML section parsing.
 *
 * Parses a content document into the `ContentNode` tree. The parser is
 * lenient about structure: a mismatched end tag closes the innermost open
 * element with that name, stray end tags are ignored and open elements are
 * closed at end of input. Malformed markup that the tokenizer rejects is an
 * error.
 */

use log::debug;
use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;

use crate::document::ContentNode;
use crate::errors::EpubError;

/// A parsed content document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XhtmlDocument {
    nodes: Vec<ContentNode>,
}

/// An element that is still open while parsing
struct OpenElement {
    tag: String,
    children: Vec<ContentNode>,
}

impl OpenElement {
    fn new(tag: String) -> Self {
        Self {
            tag,
            children: Vec::new(),
        }
    }

    fn push_text(&mut self, value: &str) {
        if value.is_empty() {
            return;
        }
        if let Some(ContentNode::Text(previous)) = self.children.last_mut() {
            previous.push_str(value);
        } else {
            self.children.push(ContentNode::text(value));
        }
    }
}

impl XhtmlDocument {
    /// Parse the bytes of a content document; `path` is only used in errors
    pub fn parse(path: &str, content: &[u8]) -> Result<Self, EpubError> {
        let mut reader = Reader::from_reader(content);
        let config = reader.config_mut();
        config.trim_text(false);
        config.check_end_names = false;
        config.allow_unmatched_ends = true;

        let xml_error = |message: String| EpubError::Xml {
            path: path.to_string(),
            message,
        };

        let mut stack = vec![OpenElement::new(String::new())];
        let mut buf = Vec::with_capacity(256);

        loop {
            match reader.read_event_into(&mut buf) {
                Ok(Event::Start(e)) => {
                    let tag = decode_tag_name(&reader, e.local_name().as_ref());
                    // Void elements never open a frame; a later `</br>` is a stray end tag
                    match leaf_node(&reader, &tag, &e) {
                        Some(node) => current(&mut stack).children.push(node),
                        None => stack.push(OpenElement::new(tag)),
                    }
                }
                Ok(Event::Empty(e)) => {
                    let tag = decode_tag_name(&reader, e.local_name().as_ref());
                    let node = leaf_node(&reader, &tag, &e)
                        .unwrap_or_else(|| ContentNode::container(tag, Vec::new()));
                    current(&mut stack).children.push(node);
                }
                Ok(Event::End(e)) => {
                    let tag = decode_tag_name(&reader, e.local_name().as_ref());
                    match stack.iter().skip(1).rposition(|open| open.tag == tag) {
                        Some(index) => close_until(&mut stack, index + 1),
                        None => debug!("Ignoring stray </{}> in {}", tag, path),
                    }
                }
                Ok(Event::Text(e)) => {
                    let text = e.decode()
                        .map_err(|err| xml_error(format!("Text decode error: {}", err)))?;
                    current(&mut stack).push_text(&text);
                }
                Ok(Event::CData(e)) => {
                    let text = reader.decoder().decode(&e)
                        .map_err(|err| xml_error(format!("CDATA decode error: {}", err)))?;
                    current(&mut stack).push_text(&text);
                }
                Ok(Event::GeneralRef(e)) => {
                    let name = e.decode()
                        .map_err(|err| xml_error(format!("Entity decode error: {}", err)))?;
                    current(&mut stack).push_text(&resolve_reference(&name));
                }
                Ok(Event::Eof) => break,
                // Comments, processing instructions and declarations carry no content
                Ok(_) => {}
                Err(err) => {
                    return Err(xml_error(format!(
                        "{} at byte {}",
                        err,
                        reader.buffer_position()
                    )));
                }
            }
            buf.clear();
        }

        close_until(&mut stack, 1);
        let root = stack.pop().map(|open| open.children).unwrap_or_default();

        Ok(Self { nodes: root })
    }

    /// Children of the first `body` element, if there is one
    pub fn body(&self) -> Option<&[ContentNode]> {
        self.nodes.iter().find_map(find_body)
    }
}

fn find_body(node: &ContentNode) -> Option<&[ContentNode]> {
    match node {
        ContentNode::Container { tag, children } if tag == "body" => Some(children),
        ContentNode::Container { children, .. } => children.iter().find_map(find_body),
        _ => None,
    }
}

fn current(stack: &mut [OpenElement]) -> &mut OpenElement {
    // The root frame is never popped while parsing
    let last = stack.len() - 1;
    &mut stack[last]
}

/// Close open elements until the stack has `depth` entries left
fn close_until(stack: &mut Vec<OpenElement>, depth: usize) {
    while stack.len() > depth {
        let Some(open) = stack.pop() else { break };
        let node = ContentNode::container(open.tag, open.children);
        current(stack).children.push(node);
    }
}

fn decode_tag_name(reader: &Reader<&[u8]>, raw: &[u8]) -> String {
    reader.decoder()
        .decode(raw)
        .map(|name| name.to_ascii_lowercase())
        .unwrap_or_default()
}

/// Image and line-break elements become leaf nodes
fn leaf_node(reader: &Reader<&[u8]>, tag: &str, element: &BytesStart<'_>) -> Option<ContentNode> {
    match tag {
        "br" => Some(ContentNode::Break),
        "img" => Some(ContentNode::image(attribute(reader, element, b"src").unwrap_or_default())),
        // SVG images reference their source through (xlink:)href
        "image" => Some(ContentNode::image(attribute(reader, element, b"href").unwrap_or_default())),
        _ => None,
    }
}

/// Value of the first attribute with the given local name
pub(crate) fn attribute(reader: &Reader<&[u8]>, element: &BytesStart<'_>, name: &[u8]) -> Option<String> {
    element.attributes()
        .flatten()
        .find(|attr| attr.key.local_name().as_ref() == name)
        .and_then(|attr| reader.decoder().decode(&attr.value).ok().map(|raw| unescape_html(&raw)))
}

/// Unescape entity and character references, keeping the input on failure
pub fn unescape_html(raw: &str) -> String {
    quick_xml::escape::unescape_with(raw, html_entity)
        .map(|value| value.into_owned())
        .unwrap_or_else(|_| raw.to_string())
}

/// Text for a general reference such as `amp`, `nbsp` or `#8212`
fn resolve_reference(name: &str) -> String {
    let reference = format!("&{};", name);
    match quick_xml::escape::unescape_with(&reference, html_entity) {
        Ok(value) => value.into_owned(),
        Err(_) => reference,
    }
}

/// Named entities commonly found in EPUB content documents
fn html_entity(name: &str) -> Option<&'static str> {
    let value = match name {
        "amp" => "&",
        "lt" => "<",
        "gt" => ">",
        "quot" => "\"",
        "apos" => "'",
        "nbsp" => "\u{00A0}",
        "ensp" => "\u{2002}",
        "emsp" => "\u{2003}",
        "thinsp" => "\u{2009}",
        "zwnj" => "\u{200C}",
        "zwj" => "\u{200D}",
        "shy" => "\u{00AD}",
        "ndash" => "\u{2013}",
        "mdash" => "\u{2014}",
        "lsquo" => "\u{2018}",
        "rsquo" => "\u{2019}",
        "sbquo" => "\u{201A}",
        "ldquo" => "\u{201C}",
        "rdquo" => "\u{201D}",
        "bdquo" => "\u{201E}",
        "laquo" => "\u{00AB}",
        "raquo" => "\u{00BB}",
        "hellip" => "\u{2026}",
        "middot" => "\u{00B7}",
        "bull" => "\u{2022}",
        "copy" => "\u{00A9}",
        "reg" => "\u{00AE}",
        "trade" => "\u{2122}",
        "deg" => "\u{00B0}",
        "sect" => "\u{00A7}",
        "para" => "\u{00B6}",
        "times" => "\u{00D7}",
        "divide" => "\u{00F7}",
        "eacute" => "\u{00E9}",
        "egrave" => "\u{00E8}",
        "agrave" => "\u{00E0}",
        "ccedil" => "\u{00E7}",
        "uuml" => "\u{00FC}",
        "ouml" => "\u{00F6}",
        "auml" => "\u{00E4}",
        "szlig" => "\u{00DF}",
        _ => return None,
    };
    Some(value)
}
