pub mod coerce;
pub mod error;
pub mod layout;
pub mod materialize;
pub mod resolve;
pub mod response;

pub use error::BindError;
pub use layout::{DynamicRecord, RecordLayout};
pub use materialize::{materialize, materialize_with};
pub use response::parse_query_response;
