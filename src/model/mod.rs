pub mod binding;
pub mod pattern;
pub mod schema;
pub mod source;

pub use binding::{Binding, Page, Term};
pub use pattern::{ObjectKind, SchemaPattern};
pub use schema::{MinedSchema, PatternAccumulator, Provenance};
pub use source::{read_sources_csv, SourceRecord};
