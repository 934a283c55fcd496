//! Extract `<url><loc>` entries from sitemap markup.

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use crate::diagnostics::DiagnosticSink;
use crate::types::{AttributeSupport, HarvestError, HarvestResult, LocationEntry, SourceDescriptor};

/// A `<loc>` directly inside a `<url>`, collected while reading.
#[derive(Debug)]
struct LocCandidate {
    /// Element depth of the `<loc>` itself.
    depth: usize,
    offset: u64,
    action: Option<String>,
    first_child: Option<FirstChild>,
}

#[derive(Debug)]
enum FirstChild {
    Text(String),
    Other,
}

/// Parse `document` and return one entry per `<loc>` child of a `<url>`, in
/// document order.
///
/// Markup is read leniently: a mismatched or stray end tag closes back to the
/// nearest matching open element (or is ignored), and elements left open at
/// end of input are closed implicitly. Only syntax errors such as an
/// unterminated tag or comment fail the document, and then no entries are
/// returned. Empty `<loc>` elements are reported to `sink` and skipped.
pub fn extract_locations(
    document: &str,
    source: &SourceDescriptor,
    attributes: AttributeSupport,
    sink: &dyn DiagnosticSink,
) -> HarvestResult<Vec<LocationEntry>> {
    let candidates = select_locs(document, attributes)?;

    let mut entries = Vec::with_capacity(candidates.len());
    for loc in candidates {
        match loc.first_child {
            Some(FirstChild::Text(text)) if !text.trim().is_empty() => {
                entries.push(LocationEntry {
                    url: text.trim().to_string(),
                    lang: source.lang.clone(),
                    action: loc.action,
                });
            }
            _ => sink.warn(&format!(
                "No url found for <loc/> at byte {} in {}",
                loc.offset, source.url
            )),
        }
    }
    Ok(entries)
}

fn select_locs(document: &str, attributes: AttributeSupport) -> HarvestResult<Vec<LocCandidate>> {
    let mut reader = Reader::from_str(document);
    let config = reader.config_mut();
    config.check_end_names = false;
    config.allow_unmatched_ends = true;
    let mut buf = Vec::new();

    let mut stack: Vec<String> = Vec::new();
    let mut selected = Vec::new();
    let mut current: Option<LocCandidate> = None;

    loop {
        let offset = reader.buffer_position();
        let event = reader.read_event_into(&mut buf).map_err(|e| HarvestError::Parse {
            message: e.to_string(),
            position: reader.error_position(),
        })?;

        // Anything arriving directly under an open <loc> is one of its children.
        if let Some(loc) = current.as_mut() {
            if loc.first_child.is_none() && stack.len() == loc.depth {
                loc.first_child = match &event {
                    Event::Text(e) => Some(FirstChild::Text(
                        e.unescape()
                            .map(|s| s.into_owned())
                            .unwrap_or_else(|_| String::from_utf8_lossy(e).into_owned()),
                    )),
                    Event::CData(e) => Some(FirstChild::Text(String::from_utf8_lossy(e).into_owned())),
                    Event::Start(_) | Event::Empty(_) | Event::Comment(_) | Event::PI(_) => {
                        Some(FirstChild::Other)
                    }
                    _ => None,
                };
            }
        }

        match event {
            Event::Start(e) => {
                let name = local_name(&e);
                if name == "loc" && is_under_url(&stack) {
                    current = Some(LocCandidate {
                        depth: stack.len() + 1,
                        offset,
                        action: action_of(&e, attributes),
                        first_child: None,
                    });
                }
                stack.push(name);
            }
            Event::Empty(e) => {
                if local_name(&e) == "loc" && is_under_url(&stack) {
                    selected.push(LocCandidate {
                        depth: stack.len() + 1,
                        offset,
                        action: action_of(&e, attributes),
                        first_child: None,
                    });
                }
            }
            Event::End(e) => {
                let name = String::from_utf8_lossy(e.local_name().as_ref()).into_owned();
                // Close back to the nearest matching element; stray end tags are ignored.
                if let Some(open) = stack.iter().rposition(|n| *n == name) {
                    stack.truncate(open);
                    if current.as_ref().is_some_and(|loc| loc.depth > stack.len()) {
                        selected.extend(current.take());
                    }
                }
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    // A <loc> left open at end of input is kept.
    selected.extend(current);
    Ok(selected)
}

fn local_name(e: &BytesStart<'_>) -> String {
    String::from_utf8_lossy(e.local_name().as_ref()).into_owned()
}

fn is_under_url(stack: &[String]) -> bool {
    stack.last().is_some_and(|parent| parent == "url")
}

fn action_of(e: &BytesStart<'_>, attributes: AttributeSupport) -> Option<String> {
    if attributes != AttributeSupport::Action {
        return None;
    }
    let attr = e.try_get_attribute("action").ok().flatten()?;
    let value = attr.unescape_value().ok()?;
    (!value.is_empty()).then(|| value.into_owned())
}
