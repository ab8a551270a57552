//! Java source emission: a declaration tree and its serializer

mod class;
mod writer;

pub use class::*;
pub use writer::*;
