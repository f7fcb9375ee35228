//! Stream combinators for input pipelines.

mod debounce;

pub use debounce::{Debounce, DebounceExt};
