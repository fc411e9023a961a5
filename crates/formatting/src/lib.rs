//! Display helpers: input masks, pt-BR number and date formatting,
//! random identifiers and spreadsheet export.

pub mod dates;
pub mod error;
pub mod export;
pub mod locale;
pub mod mask;
pub mod random;

pub use error::{ExportError, ParseError};
