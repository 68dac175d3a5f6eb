pub mod jsonld;
pub mod void;

pub use jsonld::to_jsonld;
pub use void::to_void_turtle;
