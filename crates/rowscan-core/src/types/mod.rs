//! Type tags, the type registry, and decoded cell values.

mod cell;
mod registry;

pub use cell::{BufferKind, Cell, RawValue};
pub use registry::{TypeSpec, TypeTag};
