// Application layer - validation at the form boundary and the
// read-side computations every dashboard render needs.

pub mod error;
pub mod reporting;
pub mod service;

pub use error::*;
pub use reporting::*;
pub use service::*;
