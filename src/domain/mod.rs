//! Domain types and DTOs
//!
//! These types define the form surface and the documents exchanged with
//! the analysis service.

pub mod analysis;
pub mod form;
pub mod lenient;
pub mod synopsis;

// Re-export commonly used types
pub use analysis::*;
pub use form::*;
pub use synopsis::*;
