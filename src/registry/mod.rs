//! Reference data consumed by letter numbering: letter (document) types and study programs.

pub mod fields;
pub mod memory;
pub mod model;
pub mod routes;
pub mod service;
pub mod store;


pub use memory::InMemoryRegistryStore;
pub use model::{AdditionalField, DocumentType, FieldKind, Program};
pub use service::RegistryService;
pub use store::RegistryStore;
