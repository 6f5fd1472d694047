/// The tessellators' result type.
pub type TessellationResult = Result<(), TessellationError>;

/// Describes an unexpected internal condition reported by a release build
/// (debug builds assert instead).
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum InternalError {
    IncorrectActiveEdgeOrder,
    ErrorCode(i16),
}

impl std::fmt::Display for InternalError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InternalError::IncorrectActiveEdgeOrder => {
                write!(f, "Incorrect active edge order")
            }
            InternalError::ErrorCode(i) => {
                write!(f, "Error code: #{}", i)
            }
        }
    }
}

impl std::error::Error for InternalError {}

/// An error that can happen while tessellating.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum TessellationError {
    /// A specialised fast path rejected the input; the caller must fall
    /// back to the general path.
    Unsupported,
    /// The input produces no output at all, so upper layers can
    /// short-circuit the rest of the pipeline.
    NothingToDo,
    /// An internal invariant failed to hold.
    Internal(InternalError),
}

impl std::fmt::Display for TessellationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TessellationError::Unsupported => {
                write!(f, "Operation not supported by this tessellator")
            }
            TessellationError::NothingToDo => {
                write!(f, "Nothing to do")
            }
            TessellationError::Internal(e) => {
                write!(f, "Internal error: {}", e)
            }
        }
    }
}

impl std::error::Error for TessellationError {}

impl From<InternalError> for TessellationError {
    fn from(value: InternalError) -> Self {
        TessellationError::Internal(value)
    }
}
