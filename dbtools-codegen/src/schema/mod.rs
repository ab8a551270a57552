//! Schema model and XML schema loading

mod model;
mod xml_loader;

pub use model::*;
pub use xml_loader::*;
