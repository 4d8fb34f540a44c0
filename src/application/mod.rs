// Application layer - the ledger service and its error taxonomy.
// Persistence lives in `crate::io` and borrows the service rather than
// owning any state of its own.

pub mod error;
pub mod service;

pub use error::*;
pub use service::*;
