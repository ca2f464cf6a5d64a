//! Handler introspection.
//!
//! A [`ViewIntrospector`] wraps one discovered handler and enumerates the operations it
//! exposes; each operation is built by a [`MethodIntrospector`]. Both come in two
//! shapes, selected by [`HandlerKind`](crate::handler::HandlerKind):
//!
//! - **Simple** handlers declare one method per HTTP verb and list their allowed verbs.
//! - **Dispatch** handlers bind named actions to verbs through the route callback's
//!   action map. A dispatch handler whose callback carries no action map cannot be
//!   documented and is reported as [`Error::UnsupportedHandler`](crate::error::Error).

pub mod method;
pub mod view;

pub use method::{merge_parameters, MethodIntrospector, MethodTarget};
pub use view::ViewIntrospector;
