#![no_main]

use cfgdom::{AnalysisConfig, BlockGraph, BlockId};
use libfuzzer_sys::fuzz_target;

// First byte: block count. Then pairs of bytes: edges, taken modulo the block count.
// Block 0 is the entry and the last block the exit.
fuzz_target!(|data: &[u8]| {
    let Some((&count, edges)) = data.split_first() else {
        return;
    };
    let count = usize::from(count).max(2);

    let mut graph: BlockGraph = BlockGraph::with_config(AnalysisConfig::paranoid());
    for _ in 0..count {
        let _ = graph.create_block(&[]);
    }
    for pair in edges.chunks_exact(2) {
        let from = BlockId::new(usize::from(pair[0]) % count);
        let to = BlockId::new(usize::from(pair[1]) % count);
        let _ = graph.add_successors(from, &[to]);
    }
    let _ = graph.mark_entry(BlockId::new(0));
    let _ = graph.mark_exit(BlockId::new(count - 1));

    // verify mode cross-checks Lengauer-Tarjan against the iterative algorithm
    if let Err(err) = graph.finalize() {
        panic!("finalize failed on a graph without test blocks: {err}");
    }
    let tree = graph.dominators();
    for &block in tree.preorder() {
        assert!(tree.dominates(tree.root(), block));
        for &member in tree.dominance_frontier(block) {
            assert!(tree.contains(member));
        }
    }
});
