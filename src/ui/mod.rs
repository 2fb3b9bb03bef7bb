pub mod components;
pub mod invoice_builder;
