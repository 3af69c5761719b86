//! Viewer data models
//!
//! Plain state types: timemap, pagination, selection and engine options.

pub mod timemap;
pub mod pagination;
pub mod selection;
pub mod options;

pub use timemap::{Timemap, TimemapEntry};
pub use pagination::{PageTarget, Pagination};
pub use selection::SelectionSet;
pub use options::{RenderOptions, Viewport};
