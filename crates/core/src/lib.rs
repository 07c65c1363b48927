//! Core types, schemas, and validation for the landing-page analytics collector.

pub mod error;
pub mod events;
pub mod limits;
pub mod schema;
pub mod session;

pub use error::{Error, Result};
pub use events::*;
pub use session::*;
