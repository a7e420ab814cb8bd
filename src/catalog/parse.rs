//! Pull-parser for Qt Linguist `.ts` catalog documents.
//!
//! Produces a [`ParsedCatalog`]: the `<TS>` attributes plus the
//! document-ordered message list with byte-accurate ranges for the editor
//! surface. Duplicate ids are preserved here; the lookup map applies the
//! configured policy later.

use quick_xml::Reader;
use quick_xml::events::{
    BytesStart,
    Event,
};
use thiserror::Error;

use crate::catalog::entry::{
    MessageEntry,
    TranslationStatus,
};
use crate::types::{
    LineIndex,
    SourceRange,
};

/// Error raised when a catalog document cannot be loaded.
#[derive(Error, Debug)]
pub enum CatalogError {
    /// File system error while reading a catalog.
    #[error("Failed to read catalog file: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed XML. The hosting application should fall back to the
    /// source language rather than crash.
    #[error("Malformed catalog XML at byte {position}: {source}")]
    Xml {
        /// Byte offset the reader had reached.
        position: usize,
        /// Underlying XML error.
        source: quick_xml::Error,
    },

    /// The document contains no `<TS>` root element.
    #[error("Missing <TS> root element")]
    MissingRoot,
}

/// A parsed catalog document.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ParsedCatalog {
    /// `language` attribute of `<TS>` (target locale).
    pub language: Option<String>,

    /// `sourcelanguage` attribute of `<TS>`.
    pub source_language: Option<String>,

    /// `version` attribute of `<TS>` (e.g. "2.1").
    pub version: Option<String>,

    /// Text of `<context><name>`, empty in the id-based catalogs this
    /// project consumes.
    pub context_name: String,

    /// Messages in document order, duplicates included.
    pub messages: Vec<ParsedMessage>,
}

/// One `<message>` element with its document ranges.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedMessage {
    /// Message id (`id` attribute).
    pub id: String,

    /// Decoded entry content.
    pub entry: MessageEntry,

    /// Span of the whole `<message>...</message>` element.
    pub element_range: SourceRange,

    /// Span of the id attribute value.
    pub id_range: SourceRange,

    /// Span of the translation text (or of the `<translation>` tag when
    /// the element is empty).
    pub translation_range: SourceRange,
}

/// Which text-bearing element the parser is currently inside.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TextField {
    ContextName,
    Source,
    Translation,
    ExtraComment,
    OldSource,
}

/// Accumulator for the `<message>` element being parsed.
#[derive(Debug, Default)]
struct MessageBuilder {
    id: Option<String>,
    id_span: Option<(usize, usize)>,
    start_offset: usize,
    source: String,
    translation: String,
    status: TranslationStatus,
    extracomment: Option<String>,
    oldsource: Option<String>,
    /// Span of the translation text; falls back to the tag span.
    translation_span: Option<(usize, usize)>,
    translation_tag_span: (usize, usize),
}

impl MessageBuilder {
    fn finish(self, end_offset: usize, index: &LineIndex) -> Option<ParsedMessage> {
        let Some(id) = self.id else {
            tracing::debug!("Skipping <message> without an id attribute");
            return None;
        };

        let (id_start, id_end) = self.id_span.unwrap_or((self.start_offset, self.start_offset));
        let (tr_start, tr_end) = self.translation_span.unwrap_or(self.translation_tag_span);

        Some(ParsedMessage {
            id,
            entry: MessageEntry {
                source: self.source,
                translation: self.translation,
                status: self.status,
                extracomment: self.extracomment,
                oldsource: self.oldsource,
            },
            element_range: index.range(self.start_offset, end_offset),
            id_range: index.range(id_start, id_end),
            translation_range: index.range(tr_start, tr_end),
        })
    }
}

/// Parses a catalog document.
///
/// # Errors
/// Fails fast on malformed XML or a missing `<TS>` root.
pub fn parse_catalog(xml: &str) -> Result<ParsedCatalog, CatalogError> {
    let index = LineIndex::new(xml);
    let mut reader = Reader::from_str(xml);

    let mut catalog = ParsedCatalog::default();
    let mut ts_seen = false;
    let mut message: Option<MessageBuilder> = None;
    let mut field: Option<TextField> = None;

    loop {
        let event_start = buffer_offset(&reader);
        let event = reader.read_event().map_err(|source| CatalogError::Xml {
            position: buffer_offset(&reader),
            source,
        })?;
        let event_end = buffer_offset(&reader);

        match event {
            Event::Start(ref tag) | Event::Empty(ref tag) => {
                let self_closing = matches!(event, Event::Empty(_));
                handle_open_tag(
                    tag,
                    (event_start, event_end),
                    self_closing,
                    xml,
                    &mut catalog,
                    &mut ts_seen,
                    &mut message,
                    &mut field,
                )
                .map_err(|source| CatalogError::Xml { position: event_start, source })?;
            }
            Event::Text(ref text) => {
                if let Some(active) = field {
                    let decoded = text.unescape().map_err(|source| CatalogError::Xml {
                        position: event_start,
                        source: source.into(),
                    })?;
                    append_text(
                        active,
                        &decoded,
                        (event_start, event_end),
                        &mut catalog,
                        &mut message,
                    );
                }
            }
            Event::End(ref tag) => match tag.name().as_ref() {
                b"message" => {
                    if let Some(builder) = message.take()
                        && let Some(parsed) = builder.finish(event_end, &index)
                    {
                        catalog.messages.push(parsed);
                    }
                    field = None;
                }
                b"name" | b"source" | b"translation" | b"extracomment" | b"oldsource" => {
                    field = None;
                }
                _ => {}
            },
            Event::Eof => break,
            // XML declaration, DOCTYPE, comments, CDATA markers
            _ => {}
        }
    }

    if ts_seen { Ok(catalog) } else { Err(CatalogError::MissingRoot) }
}

/// Current byte offset of the reader.
fn buffer_offset(reader: &Reader<&[u8]>) -> usize {
    usize::try_from(reader.buffer_position()).unwrap_or(usize::MAX)
}

#[allow(clippy::too_many_arguments)]
fn handle_open_tag(
    tag: &BytesStart<'_>,
    span: (usize, usize),
    self_closing: bool,
    xml: &str,
    catalog: &mut ParsedCatalog,
    ts_seen: &mut bool,
    message: &mut Option<MessageBuilder>,
    field: &mut Option<TextField>,
) -> Result<(), quick_xml::Error> {
    match tag.name().as_ref() {
        b"TS" => {
            *ts_seen = true;
            for attr in tag.attributes() {
                let attr = attr.map_err(quick_xml::Error::from)?;
                let value = attr.unescape_value()?.into_owned();
                match attr.key.as_ref() {
                    b"language" => catalog.language = Some(value),
                    b"sourcelanguage" => catalog.source_language = Some(value),
                    b"version" => catalog.version = Some(value),
                    _ => {}
                }
            }
        }
        b"name" if message.is_none() => {
            if !self_closing {
                *field = Some(TextField::ContextName);
            }
        }
        b"message" => {
            let mut builder = MessageBuilder { start_offset: span.0, ..MessageBuilder::default() };
            for attr in tag.attributes() {
                let attr = attr.map_err(quick_xml::Error::from)?;
                if attr.key.as_ref() == b"id" {
                    builder.id = Some(attr.unescape_value()?.into_owned());
                    builder.id_span = attribute_value_span(xml, span, "id");
                }
            }
            *message = Some(builder);
            *field = None;
        }
        b"source" if message.is_some() => {
            if !self_closing {
                *field = Some(TextField::Source);
            }
        }
        b"translation" => {
            if let Some(builder) = message.as_mut() {
                builder.translation_tag_span = span;
                for attr in tag.attributes() {
                    let attr = attr.map_err(quick_xml::Error::from)?;
                    if attr.key.as_ref() == b"type" {
                        let value = attr.unescape_value()?;
                        builder.status = TranslationStatus::from_type_attr(Some(&value));
                    }
                }
                if !self_closing {
                    *field = Some(TextField::Translation);
                }
            }
        }
        b"extracomment" if message.is_some() => {
            if !self_closing {
                *field = Some(TextField::ExtraComment);
            }
        }
        b"oldsource" if message.is_some() => {
            if !self_closing {
                *field = Some(TextField::OldSource);
            }
        }
        _ => {}
    }
    Ok(())
}

/// Appends decoded text to the buffer selected by `field`.
///
/// Text inside an element may arrive in several events; spans are merged.
fn append_text(
    field: TextField,
    decoded: &str,
    span: (usize, usize),
    catalog: &mut ParsedCatalog,
    message: &mut Option<MessageBuilder>,
) {
    match (field, message.as_mut()) {
        (TextField::ContextName, _) => catalog.context_name.push_str(decoded),
        (TextField::Source, Some(builder)) => builder.source.push_str(decoded),
        (TextField::Translation, Some(builder)) => {
            builder.translation.push_str(decoded);
            builder.translation_span = Some(match builder.translation_span {
                Some((start, _)) => (start, span.1),
                None => span,
            });
        }
        (TextField::ExtraComment, Some(builder)) => {
            builder.extracomment.get_or_insert_with(String::new).push_str(decoded);
        }
        (TextField::OldSource, Some(builder)) => {
            builder.oldsource.get_or_insert_with(String::new).push_str(decoded);
        }
        _ => {}
    }
}

/// Locates the value span of `attr` within the raw start tag at `span`.
///
/// The tags are machine-written (`id="..."`), so a plain scan is enough.
fn attribute_value_span(xml: &str, span: (usize, usize), attr: &str) -> Option<(usize, usize)> {
    let tag = xml.get(span.0..span.1)?;
    for quote in ['"', '\''] {
        let needle = format!("{attr}={quote}");
        if let Some(found) = tag.find(&needle) {
            let value_start = found + needle.len();
            let rest = tag.get(value_start..)?;
            let value_len = rest.find(quote)?;
            return Some((span.0 + value_start, span.0 + value_start + value_len));
        }
    }
    None
}
