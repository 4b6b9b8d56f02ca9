//! Core types, UTM normalization, and categories for the attribution engine.

pub mod campaign;
pub mod category;
pub mod customers;
pub mod error;
pub mod limits;
pub mod records;
pub mod utm;
pub mod window;

pub use campaign::*;
pub use category::*;
pub use customers::*;
pub use error::{Error, InputErrorCode, Result, StoreErrorCode};
pub use records::*;
pub use utm::*;
pub use window::*;
