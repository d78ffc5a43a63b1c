pub mod case;
pub mod flatten;
pub mod models;

pub use case::{camel_keys, camel_to_snake, snake_keys, snake_to_camel};
pub use flatten::{flatten, resource_payload, MAX_DEPTH};
pub use models::{
    Document, DocumentError, FlattenedDocument, PrimaryData, Relationship, RelationshipData,
    Resource, ResourceRef,
};
