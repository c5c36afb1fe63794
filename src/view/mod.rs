//! View surface
//!
//! Inputs, the gallery container and the status line the orchestrators act on,
//! plus HTML rendering of the gallery.

mod elements;
mod templates;

pub use elements::{Gallery, InputField, RenderInstruction, StatusMessage};
pub use templates::Templates;
