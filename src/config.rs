//! Configuration for the finalize pipeline.
//!
//! [`BlockGraph::finalize`](crate::BlockGraph::finalize) always numbers the graph
//! and builds the dominator tree. The switches here control the optional steps
//! around that core: structural cleanup before numbering, the post-dominator tree,
//! and cross-checking the result.

/// Configuration for [`BlockGraph::finalize`](crate::BlockGraph::finalize).
///
/// # Examples
///
/// ```rust
/// use cfgdom::AnalysisConfig;
///
/// let config = AnalysisConfig::new()
///     .with_drop_empty_blocks(true)
///     .with_post_dominators(true);
/// assert!(config.prune_unreachable);
/// assert!(!config.verify);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisConfig {
    /// Remove blocks unreachable from the entry before numbering (default: `true`).
    ///
    /// The exit block is kept even when unreachable; it is then simply absent from
    /// the numbering and the dominator tree.
    pub prune_unreachable: bool,

    /// Unhook payload-free single-successor blocks before numbering (default: `false`).
    pub drop_empty_blocks: bool,

    /// Also compute the post-dominator tree rooted at the exit (default: `false`).
    pub post_dominators: bool,

    /// Recompute dominators with the iterative algorithm and fail finalize if the
    /// two results differ (default: `false`).
    pub verify: bool,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            prune_unreachable: true,
            drop_empty_blocks: false,
            post_dominators: false,
            verify: false,
        }
    }
}

impl AnalysisConfig {
    /// Creates the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Numbering and dominators only; no pruning, no cleanup, no extras.
    ///
    /// Finalize fails on nothing but malformed graphs, and unreachable blocks stay
    /// in the graph unnumbered.
    #[must_use]
    pub fn minimal() -> Self {
        Self {
            prune_unreachable: false,
            ..Self::default()
        }
    }

    /// Every optional step enabled, including the cross-check.
    ///
    /// Roughly doubles the cost of finalize; intended for tests and fuzzing.
    #[must_use]
    pub fn paranoid() -> Self {
        Self {
            prune_unreachable: true,
            drop_empty_blocks: true,
            post_dominators: true,
            verify: true,
        }
    }

    /// Sets whether unreachable blocks are removed before numbering.
    #[must_use]
    pub fn with_prune_unreachable(mut self, enable: bool) -> Self {
        self.prune_unreachable = enable;
        self
    }

    /// Sets whether empty single-successor blocks are unhooked before numbering.
    #[must_use]
    pub fn with_drop_empty_blocks(mut self, enable: bool) -> Self {
        self.drop_empty_blocks = enable;
        self
    }

    /// Sets whether the post-dominator tree is computed.
    #[must_use]
    pub fn with_post_dominators(mut self, enable: bool) -> Self {
        self.post_dominators = enable;
        self
    }

    /// Sets whether the Lengauer-Tarjan result is cross-checked.
    #[must_use]
    pub fn with_verify(mut self, enable: bool) -> Self {
        self.verify = enable;
        self
    }
}
