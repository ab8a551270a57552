//! Code generation module

mod android;
mod code_generator;
mod database_manager;
pub mod ddl;
pub mod entity;
pub mod java;
mod jpa;
pub mod naming;
mod records;
mod type_resolver;

pub use code_generator::*;
pub use type_resolver::*;
