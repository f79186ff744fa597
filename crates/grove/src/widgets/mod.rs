//! Reference widgets built only on the public [`Context`](crate::Context)
//! surface.

pub mod block;
pub mod list;
pub mod stack;

pub use block::Block;
pub use list::List;
pub use stack::Stack;
