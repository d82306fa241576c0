pub mod error;
pub mod record;
pub mod schema;
pub mod value;

// Trait and derive share the name, as serde's do.
pub use record::Record;
pub use rowbind_api_derive::Record;
