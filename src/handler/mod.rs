//! Request handler module
//!
//! Path resolution, the per-method handlers and the dispatcher that ties them together.

pub mod dispatch;
pub mod methods;
pub mod resolver;

// Re-export main entry points
pub use dispatch::{Dispatcher, MethodTable};
pub use resolver::RootDir;
