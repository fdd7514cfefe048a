//! # Error Types
//!
//! All errors carry enough location information (part and measure) to find
//! the offending spot in the score document.
//!
//! ## Error Types
//! - `ParseError` - a note token or key change that cannot be read
//! - `MetadataError` - invalid YAML or an invalid header value
//! - `SemanticError` - a score that parses but cannot be engraved
//! - `Io` / `Json` - reading input or writing the accidental report
//!
//! The accidental tracker itself never fails; errors only come from the
//! layers around it.
//!
//! ## Usage
//! ```rust
//! use engrave::{engrave_source, EngraveError};
//!
//! match engrave_source("parts: [{measures: [{notes: [C4, D4, E4, F#4]}]}]") {
//!     Ok(musicxml) => println!("{}", musicxml),
//!     Err(EngraveError::SemanticError { part, measure, message }) => {
//!         eprintln!("{} measure {}: {}", part, measure, message);
//!     }
//!     Err(e) => eprintln!("Error: {}", e),
//! }
//! ```

use thiserror::Error;

#[derive(Error, Debug)]
pub enum EngraveError {
    /// A note token or key change could not be parsed.
    ///
    /// # Example
    /// ```
    /// # use engrave::EngraveError;
    /// let err = EngraveError::ParseError {
    ///     part: "Violin".to_string(),
    ///     measure: 3,
    ///     note: 2,
    ///     message: "Unknown note letter 'H'".to_string(),
    /// };
    /// assert_eq!(
    ///     err.to_string(),
    ///     "Parse error in part 'Violin', measure 3, note 2: Unknown note letter 'H'"
    /// );
    /// ```
    #[error("Parse error in part '{part}', measure {measure}, note {note}: {message}")]
    ParseError {
        part: String,
        measure: usize,
        note: usize,
        message: String,
    },

    /// Invalid document header or YAML structure.
    #[error("Invalid metadata: {0}")]
    MetadataError(String),

    /// Validation error with part and measure information.
    #[error("Semantic error in part '{part}' at measure {measure}: {message}")]
    SemanticError {
        part: String,
        measure: usize,
        message: String,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
