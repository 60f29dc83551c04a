use thiserror::Error;

use crate::graph::BlockId;

/// Builds an [`Error::InvariantViolation`] tagged with the source location of the check.
///
/// ```rust,ignore
/// return Err(invariant_error!("block {} marked as entry twice", block));
/// ```
macro_rules! invariant_error {
    // Single string version
    ($msg:expr) => {
        crate::Error::InvariantViolation {
            message: $msg.to_string(),
            file: file!(),
            line: line!(),
        }
    };

    // Format string with arguments version
    ($fmt:expr, $($arg:tt)*) => {
        crate::Error::InvariantViolation {
            message: format!($fmt, $($arg)*),
            file: file!(),
            line: line!(),
        }
    };
}

pub(crate) use invariant_error;

/// The error type for all fallible graph construction and analysis operations.
///
/// Dominance results feed correctness-preserving transformations (SSA construction,
/// code motion), so every detected inconsistency is reported instead of being papered
/// over with a default value.
///
/// # Error Categories
///
/// ## Structural Errors
/// - [`Error::UnknownBlock`] - A block id that is not live in the graph
/// - [`Error::MissingEntry`] / [`Error::MissingExit`] - Sentinel blocks were never designated
///
/// ## Analysis Errors
/// - [`Error::InvariantViolation`] - An internal or caller-side invariant was broken
/// - [`Error::NotFinalized`] - Dominance was queried on a graph modified since the last finalize
///
/// # Examples
///
/// ```rust
/// use cfgdom::{BlockGraph, Error};
///
/// let mut graph: BlockGraph = BlockGraph::new();
/// match graph.finalize() {
///     Err(Error::MissingEntry) => {}
///     other => panic!("unexpected result: {other:?}"),
/// }
/// ```
#[derive(Error, Debug)]
pub enum Error {
    /// A graph or algorithm invariant does not hold.
    ///
    /// Raised for duplicate entry/exit designations, malformed test blocks, a
    /// semi-dominator that exceeds its processing index, or a Lengauer-Tarjan result
    /// that disagrees with the iterative cross-check. The location of the failed
    /// check is recorded for diagnostics.
    #[error("Invariant violated - {file}:{line}: {message}")]
    InvariantViolation {
        /// Description of the violated invariant
        message: String,
        /// The source file in which the violation was detected
        file: &'static str,
        /// The source line in which the violation was detected
        line: u32,
    },

    /// The referenced block does not exist (never created, or removed).
    #[error("Block {0} does not exist in the graph")]
    UnknownBlock(BlockId),

    /// The graph has no entry block.
    #[error("The graph has no entry block")]
    MissingEntry,

    /// The graph has no exit block.
    #[error("The graph has no exit block")]
    MissingExit,

    /// The graph was modified since the dominator tree was last computed.
    #[error("The graph has been modified since the last finalize")]
    NotFinalized,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invariant_error_macro_records_location() {
        let err = invariant_error!("two entries: {} and {}", BlockId::new(0), BlockId::new(3));
        match err {
            Error::InvariantViolation {
                message,
                file,
                line,
            } => {
                assert_eq!(message, "two entries: b0 and b3");
                assert!(file.ends_with("error.rs"));
                assert!(line > 0);
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn test_error_display() {
        assert_eq!(
            Error::UnknownBlock(BlockId::new(7)).to_string(),
            "Block b7 does not exist in the graph"
        );
        assert_eq!(Error::MissingEntry.to_string(), "The graph has no entry block");
        assert!(invariant_error!("boom")
            .to_string()
            .starts_with("Invariant violated - "));
    }
}
