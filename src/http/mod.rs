//! HTTP protocol layer module
//!
//! Response descriptors and content-type lookup, decoupled from the method handlers.

pub mod mime;
pub mod response;

pub use response::{ResponseBody, ResponseDescriptor};
