//! Error types for BBCode conversion.

/// Error while building a parse tree.
/// # Remarks
/// Malformed markup is never an error; it degrades to text. Only resource limits surface here.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    /// More tags were open at once than [ParserConfig::max_depth][crate::ParserConfig::max_depth] allows.
    #[error("tag nesting exceeds the limit of {limit}")]
    NestingTooDeep { limit: usize },
}
