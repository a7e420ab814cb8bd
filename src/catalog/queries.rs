//! Tracked queries over catalog inputs.

use crate::catalog::input::Catalog;
use crate::db::CatalogDatabase;
use crate::interned::MessageId;
use crate::ir::message::Message;
use crate::types::SourcePosition;

/// Derives the message list of a catalog in document order.
#[salsa::tracked]
pub fn catalog_messages(db: &dyn CatalogDatabase, catalog: Catalog) -> Vec<Message<'_>> {
    let entries = catalog.entries(db);
    let spans = catalog.spans(db);

    catalog
        .message_order(db)
        .iter()
        .filter_map(|id| {
            let entry = entries.get(id)?;
            let span = spans.get(id)?;
            Some(Message::new(
                db,
                MessageId::new(db, id.clone()),
                span.element,
                span.id,
                span.translation,
                entry.status,
            ))
        })
        .collect()
}

/// Finds the message element containing `position`, if any.
#[salsa::tracked]
pub fn message_at_position(
    db: &dyn CatalogDatabase,
    catalog: Catalog,
    position: SourcePosition,
) -> Option<Message<'_>> {
    catalog_messages(db, catalog)
        .into_iter()
        .find(|message| message.element_range(db).contains(position))
}
