use std::borrow::Cow;
use std::io::{BufRead, BufReader, Read};

use memchr::memchr3;
use quick_xml::escape::{resolve_predefined_entity, unescape};
use quick_xml::events::{BytesStart, Event};
use quick_xml::name::{QName as XmlQName, ResolveResult};
use quick_xml::reader::NsReader;

use super::Token;
use crate::qname::{Attribute, QName, XML_PREFIX, XMLNS};
use crate::{Error, Result};

/// Reads `xml_reader` with quick-xml and calls `emit` for every token.
///
/// End-tag balancing is left to the consumer: quick-xml is configured not
/// to check end names, so unmatched and mismatched end tags reach `emit`.
/// Adjacent text, CDATA and entity references are coalesced into one
/// `Text` token.
pub(crate) fn emit_tokens(
    xml_reader: impl Read,
    mut emit: impl FnMut(Token<'_>) -> Result<()>,
) -> Result<()> {
    let mut reader = NsReader::from_reader(BufReader::new(xml_reader));
    let config = reader.config_mut();
    config.trim_text(false);
    config.expand_empty_elements = true;
    config.check_end_names = false;
    config.allow_unmatched_ends = true;

    let mut buf = Vec::new();
    // Text-Coalescing: gepufferter Text wird vor jedem Nicht-Text-Token geflusht.
    let mut pending_text: Option<String> = None;
    let mut attributes: Vec<Attribute> = Vec::with_capacity(8);

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => {
                flush_text(&mut pending_text, &mut emit)?;
                let name = resolve_element_name(&reader, e.name())?;
                collect_attributes(&reader, &e, &mut attributes)?;
                emit(Token::StartTag { name: &name, attributes: &attributes })?;
            }
            Ok(Event::Empty(e)) => {
                // Nur ohne expand_empty_elements erreichbar
                flush_text(&mut pending_text, &mut emit)?;
                let name = resolve_element_name(&reader, e.name())?;
                collect_attributes(&reader, &e, &mut attributes)?;
                emit(Token::StartTag { name: &name, attributes: &attributes })?;
                emit(Token::EndTag { name: &name })?;
            }
            Ok(Event::End(e)) => {
                flush_text(&mut pending_text, &mut emit)?;
                let name = resolve_element_name(&reader, e.name())?;
                emit(Token::EndTag { name: &name })?;
            }
            Ok(Event::Text(e)) => {
                let raw = utf8(&e)?;
                let text = unescape(raw).map_err(Error::tokenization)?;
                push_text(&mut pending_text, &escape_text(&text));
            }
            Ok(Event::CData(e)) => {
                let content = e.into_inner();
                push_text(&mut pending_text, &escape_text(utf8(&content)?));
            }
            Ok(Event::GeneralRef(e)) => {
                let name = utf8(&e)?;
                let resolved = resolve_reference(name)?;
                push_text(&mut pending_text, &escape_text(&resolved));
            }
            Ok(Event::Comment(e)) => {
                flush_text(&mut pending_text, &mut emit)?;
                emit(Token::Comment(utf8(&e)?))?;
            }
            Ok(Event::PI(e)) => {
                flush_text(&mut pending_text, &mut emit)?;
                let target = utf8(e.target())?;
                // S zwischen Target und Daten ist Separator, nicht Teil der Daten.
                let instruction = utf8(e.content())?.trim_start();
                emit(Token::ProcessingInstruction { target, instruction })?;
            }
            Ok(Event::Decl(e)) => {
                flush_text(&mut pending_text, &mut emit)?;
                let content = utf8(&e)?;
                let instruction = content.strip_prefix(XML_PREFIX).unwrap_or(content).trim_start();
                emit(Token::ProcessingInstruction { target: XML_PREFIX, instruction })?;
            }
            Ok(Event::DocType(e)) => {
                flush_text(&mut pending_text, &mut emit)?;
                let directive = format!("DOCTYPE {}", utf8(&e)?.trim_start());
                emit(Token::Directive(&directive))?;
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(Error::Tokenization(format!(
                    "at position {}: {e}",
                    reader.buffer_position()
                )));
            }
        }

        buf.clear();
    }

    flush_text(&mut pending_text, &mut emit)
}

/// Flusht gepufferten Text als `Text`-Token.
fn flush_text(
    pending_text: &mut Option<String>,
    emit: &mut impl FnMut(Token<'_>) -> Result<()>,
) -> Result<()> {
    if let Some(text) = pending_text.take() {
        emit(Token::Text(&text))?;
    }
    Ok(())
}

fn push_text(pending_text: &mut Option<String>, value: &str) {
    if value.is_empty() {
        return;
    }
    match pending_text {
        Some(existing) => existing.push_str(value),
        None => *pending_text = Some(value.to_string()),
    }
}

fn collect_attributes(
    reader: &NsReader<impl BufRead>,
    e: &BytesStart<'_>,
    out: &mut Vec<Attribute>,
) -> Result<()> {
    out.clear();
    for attr in e.attributes() {
        let attr = attr.map_err(Error::tokenization)?;
        let key = attr.key.as_ref();
        let name = if key == XMLNS.as_bytes() {
            QName::local(XMLNS)
        } else if let Some(prefix) = key.strip_prefix(b"xmlns:") {
            QName::new(XMLNS, utf8(prefix)?)
        } else {
            let (ns, local) = reader.resolver().resolve_attribute(attr.key);
            QName::new(resolve_to_uri(ns)?, utf8(local.as_ref())?)
        };
        // Gleicher expandierter Name ueber verschiedene Prefixe (`a:x`, `b:x`).
        if out.iter().any(|existing| existing.name == name) {
            return Err(Error::Tokenization(format!("duplicate attribute '{name}'")));
        }
        let value = attribute_value(utf8(&attr.value)?)?;
        out.push(Attribute::new(name, value));
    }
    Ok(())
}

fn resolve_element_name(reader: &NsReader<impl BufRead>, name: XmlQName<'_>) -> Result<QName> {
    let (ns, local) = reader.resolver().resolve_element(name);
    Ok(QName::new(resolve_to_uri(ns)?, utf8(local.as_ref())?))
}

fn resolve_to_uri(ns: ResolveResult<'_>) -> Result<String> {
    match ns {
        ResolveResult::Bound(ns) => Ok(utf8(ns.as_ref())?.to_string()),
        ResolveResult::Unbound => Ok(String::new()),
        ResolveResult::Unknown(prefix) => Err(Error::Tokenization(format!(
            "unknown namespace prefix '{}'",
            String::from_utf8_lossy(&prefix)
        ))),
    }
}

/// Attribute value normalization (XML 1.0 Sec. 3.3.3, CDATA type): literal
/// whitespace becomes a space, references are decoded, and the result is
/// re-escaped in canonical form.
fn attribute_value(raw: &str) -> Result<String> {
    let normalized: Cow<'_, str> = if memchr3(b'\t', b'\n', b'\r', raw.as_bytes()).is_some() {
        Cow::Owned(raw.replace(['\t', '\n', '\r'], " "))
    } else {
        Cow::Borrowed(raw)
    };
    let decoded = unescape(&normalized).map_err(Error::tokenization)?;
    Ok(escape_attr(&decoded).into_owned())
}

/// Resolves a general reference (`name` without `&` and `;`). Only character
/// references and the five predefined entities are known; DTD entities are
/// not processed.
fn resolve_reference(name: &str) -> Result<String> {
    if let Some(digits) = name.strip_prefix('#') {
        let code_point = match digits.strip_prefix('x') {
            Some(hex) => u32::from_str_radix(hex, 16).ok(),
            None => digits.parse::<u32>().ok(),
        };
        return code_point
            .and_then(char::from_u32)
            .map(String::from)
            .ok_or_else(|| Error::Tokenization(format!("invalid character reference '&{name};'")));
    }
    resolve_predefined_entity(name)
        .map(str::to_string)
        .ok_or_else(|| Error::Tokenization(format!("unresolved entity reference '&{name};'")))
}

/// Canonical escaping of character data: `&`, `<`, `>` and CR.
pub(crate) fn escape_text(s: &str) -> Cow<'_, str> {
    if !s.bytes().any(|b| matches!(b, b'&' | b'<' | b'>' | b'\r')) {
        return Cow::Borrowed(s);
    }
    let mut out = String::with_capacity(s.len() + 8);
    for ch in s.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '\r' => out.push_str("&#xD;"),
            _ => out.push(ch),
        }
    }
    Cow::Owned(out)
}

/// Canonical escaping of attribute values: `&`, `<`, `"`, TAB, LF and CR.
pub(crate) fn escape_attr(s: &str) -> Cow<'_, str> {
    if !s.bytes().any(|b| matches!(b, b'&' | b'<' | b'"' | b'\t' | b'\n' | b'\r')) {
        return Cow::Borrowed(s);
    }
    let mut out = String::with_capacity(s.len() + 8);
    for ch in s.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '"' => out.push_str("&quot;"),
            '\t' => out.push_str("&#x9;"),
            '\n' => out.push_str("&#xA;"),
            '\r' => out.push_str("&#xD;"),
            _ => out.push(ch),
        }
    }
    Cow::Owned(out)
}

fn utf8(bytes: &[u8]) -> Result<&str> {
    std::str::from_utf8(bytes).map_err(Error::tokenization)
}
