//! Generic graph traversals.
//!
//! All traversals are iterative with an explicit heap-allocated stack; control-flow
//! graphs from real programs are deep enough to overflow the call stack.
//!
//! # Algorithms
//!
//! - [`dfs`] - Lazy depth-first pre-order iterator
//! - [`reachable`] - The set of blocks reachable from a start block
//! - [`postorder`] - Depth-first post-order
//! - [`reverse_postorder`] - Reverse post-order (the canonical order for forward data flow)
//!
//! The numbering pass in [`numbering`](crate::analysis::numbering) computes the same
//! orders plus edge classification in one walk; these functions are for callers that
//! need only an order.

use crate::graph::{BlockId, BlockSet, Successors};

/// Iterator performing a depth-first traversal in pre-order.
///
/// Successors are visited in insertion order, so the sequence matches the
/// pre-order numbers assigned by [`DfsNumbering`](crate::analysis::DfsNumbering).
pub struct DfsIterator<'g, G: Successors> {
    graph: &'g G,
    stack: Vec<BlockId>,
    visited: BlockSet,
}

impl<'g, G: Successors> DfsIterator<'g, G> {
    fn new(graph: &'g G, start: BlockId) -> Self {
        let bound = graph.id_bound();
        let stack = if start.index() < bound {
            vec![start]
        } else {
            Vec::new()
        };

        DfsIterator {
            graph,
            stack,
            visited: BlockSet::new(bound),
        }
    }
}

impl<G: Successors> Iterator for DfsIterator<'_, G> {
    type Item = BlockId;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let block = self.stack.pop()?;
            // A block can be pushed by several predecessors before it is visited
            if !self.visited.insert(block) {
                continue;
            }

            let successors: Vec<BlockId> = self.graph.successors(block).collect();
            for &succ in successors.iter().rev() {
                if !self.visited.contains(succ) {
                    self.stack.push(succ);
                }
            }

            return Some(block);
        }
    }
}

/// Performs a depth-first traversal starting from `start`.
///
/// Returns an empty iterator if `start` is outside the graph.
///
/// # Examples
///
/// ```rust
/// use cfgdom::{analysis::dfs, BlockGraph, BlockId};
///
/// let mut graph: BlockGraph = BlockGraph::new();
/// let a = graph.create_block(&[])?;
/// let b = graph.create_block(&[a])?;
/// let c = graph.create_block(&[a])?;
///
/// let order: Vec<BlockId> = dfs(&graph, a).collect();
/// assert_eq!(order, vec![a, b, c]);
/// # Ok::<(), cfgdom::Error>(())
/// ```
pub fn dfs<G: Successors>(graph: &G, start: BlockId) -> DfsIterator<'_, G> {
    DfsIterator::new(graph, start)
}

/// Returns the set of blocks reachable from `start`, `start` included.
pub fn reachable<G: Successors>(graph: &G, start: BlockId) -> BlockSet {
    let mut seen = BlockSet::new(graph.id_bound());
    for block in dfs(graph, start) {
        seen.insert(block);
    }
    seen
}

/// Returns the blocks reachable from `start` in depth-first post-order.
#[allow(clippy::items_after_statements)]
pub fn postorder<G: Successors>(graph: &G, start: BlockId) -> Vec<BlockId> {
    let bound = graph.id_bound();
    if start.index() >= bound {
        return Vec::new();
    }

    let mut visited = BlockSet::new(bound);
    let mut result = Vec::new();

    #[derive(Clone, Copy)]
    enum State {
        Enter,
        Exit,
    }

    let mut stack = vec![(start, State::Enter)];

    while let Some((block, state)) = stack.pop() {
        match state {
            State::Enter => {
                if !visited.insert(block) {
                    continue;
                }

                stack.push((block, State::Exit));

                let successors: Vec<BlockId> = graph.successors(block).collect();
                for &succ in successors.iter().rev() {
                    if !visited.contains(succ) {
                        stack.push((succ, State::Enter));
                    }
                }
            }
            State::Exit => result.push(block),
        }
    }

    result
}

/// Returns the blocks reachable from `start` in reverse post-order.
///
/// Every block appears before its successors, back edges excepted.
pub fn reverse_postorder<G: Successors>(graph: &G, start: BlockId) -> Vec<BlockId> {
    let mut result = postorder(graph, start);
    result.reverse();
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test::{
        b,
        factories::{chain, diamond, lengauer_tarjan_paper, simple_loop},
        TestGraph,
    };

    #[test]
    fn test_dfs_preorder_follows_successor_order() {
        let graph = diamond();
        let order: Vec<BlockId> = dfs(&graph, b(0)).collect();
        assert_eq!(order, vec![b(0), b(1), b(3), b(2)]);
    }

    #[test]
    fn test_dfs_is_a_true_preorder() {
        // b2 is pushed by b0 first but must be visited through b1
        let graph = TestGraph::new(3, &[(0, 1), (0, 2), (1, 2)]);
        let order: Vec<BlockId> = dfs(&graph, b(0)).collect();
        assert_eq!(order, vec![b(0), b(1), b(2)]);
    }

    #[test]
    fn test_dfs_invalid_start() {
        let graph = chain(3);
        assert_eq!(dfs(&graph, b(7)).count(), 0);
        assert!(postorder(&graph, b(7)).is_empty());
    }

    #[test]
    fn test_reachable_skips_disconnected() {
        let graph = TestGraph::new(4, &[(0, 1), (2, 3)]);
        let seen = reachable(&graph, b(0));
        assert_eq!(seen.iter().collect::<Vec<_>>(), vec![b(0), b(1)]);
    }

    #[test]
    fn test_postorder_loop() {
        let graph = simple_loop();
        assert_eq!(postorder(&graph, b(0)), vec![b(3), b(2), b(1), b(0)]);
        assert_eq!(reverse_postorder(&graph, b(0)), vec![b(0), b(1), b(2), b(3)]);
    }

    #[test]
    fn test_reverse_postorder_puts_blocks_before_forward_successors() {
        let graph = lengauer_tarjan_paper();
        let order = reverse_postorder(&graph, b(0));
        assert_eq!(order.len(), 10);
        assert_eq!(order[0], b(0));

        let position = |block: BlockId| order.iter().position(|&x| x == block).unwrap();
        // x1 -> x2 -> x3 is acyclic
        assert!(position(b(1)) < position(b(2)));
        assert!(position(b(2)) < position(b(3)));
    }
}
