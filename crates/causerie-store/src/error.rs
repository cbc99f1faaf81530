use thiserror::Error;

/// Errors produced by the store layer.
///
/// Not-found conditions are deliberately not errors: lookups return
/// `Option` and removals return `bool`, so callers branch on return values
/// instead of catching.
#[derive(Error, Debug)]
pub enum StoreError {
    /// A message was added with `generate_id` set, but the storage was
    /// built without a message id generator.
    #[error("id generator not defined")]
    IdGeneratorNotDefined,
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, StoreError>;
