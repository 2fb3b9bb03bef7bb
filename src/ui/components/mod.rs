pub mod editable_field;
