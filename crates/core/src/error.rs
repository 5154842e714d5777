//! Error types for file processing and embedded configuration.

use std::path::PathBuf;

use thiserror::Error;

/// Failure while reading or decoding a watched file.
///
/// None of these are fatal: callers log them and wait for the next change
/// notification to retry.
#[derive(Debug, Error)]
pub enum ProcessError {
    /// The file could not be opened or read, usually because the game is
    /// still writing it.
    #[error("failed to read {}: {source}", path.display())]
    Io {
        /// File being read.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: std::io::Error,
    },
    /// The snapshot was empty or not a valid document.
    #[error("malformed snapshot {}: {source}", path.display())]
    MalformedSnapshot {
        /// Snapshot file.
        path: PathBuf,
        /// Decoder failure.
        #[source]
        source: serde_json::Error,
    },
    /// The file name matched no registered snapshot.
    #[error("{} is not a watched snapshot file", path.display())]
    UnknownSnapshot {
        /// Offending path.
        path: PathBuf,
    },
}

/// Failure while loading the recipe table.
#[derive(Debug, Error)]
pub enum RecipeError {
    /// The table is not valid JSON of the expected shape.
    #[error("invalid recipe table: {0}")]
    Decode(#[from] serde_json::Error),
    /// A recipe key is not a known recipe.
    #[error("unknown recipe {0:?}")]
    UnknownRecipe(String),
    /// A requirement names a material outside the catalog.
    #[error("recipe {recipe:?} requires unknown material {material:?}")]
    UnknownMaterial {
        /// Recipe key.
        recipe: String,
        /// Material identifier.
        material: String,
    },
    /// A requirement asks for zero of a material.
    #[error("recipe {recipe:?} requires zero of {material:?}")]
    ZeroQuantity {
        /// Recipe key.
        recipe: String,
        /// Material identifier.
        material: String,
    },
}
