pub mod set;
pub mod types;

pub use set::VariableSet;
pub use types::{BaseType, Cardinality, Scalar, Value, Variable, VariableId, VariableKind};
