/// Errors raised by the list.
///
/// Lookups on unknown identifiers are not errors; those operations report a
/// miss through their boolean return instead.
#[derive(Debug, thiserror::Error)]
pub enum ListError {
    #[error("item render function was not provided")]
    MissingRenderFunction,

    #[error("item size must be non-zero, got {width}x{height}")]
    InvalidItemSize { width: u32, height: u32 },

    #[error("list is already rendered")]
    AlreadyRendered,

    /// A host, decoration or render callback failed. The render set may be
    /// partially updated; re-running the triggering operation reconciles it.
    #[error("host failure: {0}")]
    Host(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, ListError>;
