//! Representation builders: presenters, field/embed selection, serializer

pub mod embed_picker;
pub mod field_picker;
pub mod presenter;
pub mod serializer;

pub use embed_picker::EmbedPicker;
pub use field_picker::FieldPicker;
pub use presenter::{Node, Presenter};
pub use serializer::Serializer;
