pub mod expand;
pub mod parser;

pub use expand::{expand_references, ExpandedReferences};
pub use parser::{ModReference, ModSelector};
