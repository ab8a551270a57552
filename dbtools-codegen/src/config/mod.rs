//! Configuration for dbtools-codegen

pub mod defaults;
mod settings;

pub use settings::*;
