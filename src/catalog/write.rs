//! Catalog serialization.
//!
//! Emits the same shape the original catalogs use: XML declaration,
//! `<!DOCTYPE TS>`, one `<context>`, 4-space indented `<message>` elements.
//! Serializer output is a fixed point: parsing it and serializing again
//! yields the identical document.

use std::fmt::Write as _;

use quick_xml::escape::{
    escape,
    partial_escape,
};

use crate::catalog::parse::ParsedCatalog;

/// Serializes a parsed catalog back to TS XML.
///
/// Preserves all ids, source texts, translation texts, statuses and
/// comments, duplicates included.
#[must_use]
pub fn serialize_catalog(catalog: &ParsedCatalog) -> String {
    let mut out = String::new();

    out.push_str("<?xml version=\"1.0\" encoding=\"utf-8\"?>\n");
    out.push_str("<!DOCTYPE TS>\n");

    out.push_str("<TS");
    for (name, value) in [
        ("version", catalog.version.as_deref()),
        ("language", catalog.language.as_deref()),
        ("sourcelanguage", catalog.source_language.as_deref()),
    ] {
        if let Some(value) = value {
            let _ = write!(out, " {name}=\"{}\"", escape(value));
        }
    }
    out.push_str(">\n");

    out.push_str("<context>\n");
    let _ = writeln!(out, "    <name>{}</name>", partial_escape(&catalog.context_name));

    for message in &catalog.messages {
        let _ = writeln!(out, "    <message id=\"{}\">", escape(&message.id));
        let _ = writeln!(out, "        <source>{}</source>", partial_escape(&message.entry.source));

        if let Some(oldsource) = &message.entry.oldsource {
            let _ = writeln!(out, "        <oldsource>{}</oldsource>", partial_escape(oldsource));
        }
        if let Some(extracomment) = &message.entry.extracomment {
            let _ = writeln!(
                out,
                "        <extracomment>{}</extracomment>",
                partial_escape(extracomment)
            );
        }

        match message.entry.status.type_attr() {
            Some(attr) => {
                let _ = writeln!(
                    out,
                    "        <translation type=\"{attr}\">{}</translation>",
                    partial_escape(&message.entry.translation)
                );
            }
            None => {
                let _ = writeln!(
                    out,
                    "        <translation>{}</translation>",
                    partial_escape(&message.entry.translation)
                );
            }
        }

        out.push_str("    </message>\n");
    }

    out.push_str("</context>\n");
    out.push_str("</TS>\n");
    out
}
