mod line_item;
mod client_details;
mod invoice_document;

pub use line_item::{ItemDraft, ItemField, ItemId, LineItem};
pub use client_details::ClientDetails;
pub use invoice_document::InvoiceDocument;
