//! From figures to tagged facts: context/unit registration, the binding
//! table, fact binding, document assembly and inline XBRL rendering.

pub mod assembler;
pub mod binder;
pub mod registry;
pub mod render;
pub mod taxonomy;

pub use assembler::DocumentAssembler;
pub use binder::{BindOptions, BoundFact, FactBinder};
pub use registry::ContextRegistry;
pub use render::render_ixbrl;
pub use taxonomy::{BINDING_RULES, BindingRule, Cardinality, SignRule, SourceField, Taxonomy, ValueKind, tags};
