//! End-to-end dominance scenarios through the public API.

use std::collections::BTreeSet;

use cfgdom::prelude::*;

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// The ten-block graph from Lengauer and Tarjan (1979), with `z3` as exit.
///
/// Returns the graph and its blocks in the order
/// `[r, x1, x2, x3, y3, z3, y2, z2, y1, z1]`.
fn lengauer_tarjan() -> Result<(BlockGraph, [BlockId; 10])> {
    let mut graph = BlockGraph::new();
    let mut ids = [BlockId::new(0); 10];
    for id in &mut ids {
        *id = graph.create_block(&[])?;
    }
    let [r, x1, x2, x3, y3, z3, y2, z2, y1, z1] = ids;

    graph.add_successors(r, &[x1, z1])?;
    graph.add_successors(x1, &[x2, y1])?;
    graph.add_successors(x2, &[x3, y2])?;
    graph.add_successors(x3, &[y3])?;
    graph.add_successors(y3, &[z3])?;
    graph.add_successors(y2, &[z2, z3])?;
    graph.add_successors(y1, &[z1, z2])?;
    graph.add_successors(z1, &[y1])?;
    graph.add_successors(z2, &[y2])?;
    graph.add_successors(z3, &[y3])?;
    graph.mark_entry(r)?;
    graph.mark_exit(z3)?;
    Ok((graph, ids))
}

#[test]
fn diamond() -> Result<()> {
    init_logging();
    let mut graph: BlockGraph = BlockGraph::new();
    let (entry, exit) = graph.entry_and_exit()?;
    let a = graph.create_block(&[entry])?;
    let b = graph.create_block(&[entry])?;
    graph.add_predecessors(exit, &[a, b])?;
    graph.finalize()?;

    assert_eq!(graph.idom(a), Some(entry));
    assert_eq!(graph.idom(b), Some(entry));
    assert_eq!(graph.idom(exit), Some(entry));
    assert_eq!(graph.dominance_frontier(a), &[exit]);
    assert_eq!(graph.dominance_frontier(b), &[exit]);
    assert!(graph.dominance_frontier(entry).is_empty());
    assert!(graph.dominates(entry, exit));
    assert!(!graph.dominates(a, exit));
    Ok(())
}

#[test]
fn lengauer_tarjan_paper() -> Result<()> {
    init_logging();
    let (mut graph, [r, x1, x2, x3, y3, z3, y2, z2, y1, z1]) = lengauer_tarjan()?;
    graph.set_config(AnalysisConfig::new().with_verify(true));
    graph.finalize()?;

    assert_eq!(graph.idom(r), None);
    assert_eq!(graph.idom(x1), Some(r));
    assert_eq!(graph.idom(x2), Some(x1));
    assert_eq!(graph.idom(x3), Some(x2));
    for block in [y3, z3, y2, z2, y1, z1] {
        assert_eq!(graph.idom(block), Some(r), "idom({block})");
    }

    let tree = graph.dominators();
    assert_eq!(tree.len(), 10);
    assert_eq!(tree.dominators_of(x3), vec![x3, x2, x1, r]);
    assert_eq!(graph.dominance_frontier(x1), &[y3, y2, y1]);
    assert_eq!(graph.dominance_frontier(x2), &[y3, y2]);
    assert_eq!(graph.dominance_frontier(x3), &[y3]);
    assert_eq!(graph.dominance_frontier(z1), &[y1]);

    let dominated: BTreeSet<BlockId> = graph.blocks_dominated_by(x1).into_iter().collect();
    assert_eq!(dominated, BTreeSet::from([x1, x2, x3]));
    Ok(())
}

#[test]
fn deep_chain_does_not_overflow() -> Result<()> {
    const LENGTH: usize = 100_000;

    let mut graph: BlockGraph = BlockGraph::new();
    let (entry, exit) = graph.entry_and_exit()?;
    let mut last = entry;
    let mut chain = Vec::with_capacity(LENGTH);
    for _ in 0..LENGTH {
        last = graph.create_block(&[last])?;
        chain.push(last);
    }
    graph.add_successors(last, &[exit])?;
    graph.finalize()?;

    let tree = graph.dominators();
    assert_eq!(tree.idom(chain[0]), Some(entry));
    for pair in chain.windows(2) {
        assert_eq!(tree.idom(pair[1]), Some(pair[0]));
    }
    assert_eq!(tree.idom(exit), Some(last));
    assert_eq!(tree.depth(exit), LENGTH + 1);
    assert!(graph.dominates(chain[10], chain[LENGTH - 10]));
    assert_eq!(graph.blocks_dominated_by(chain[LENGTH - 1]), vec![last, exit]);
    Ok(())
}

#[test]
fn wide_switch() -> Result<()> {
    const CASES: usize = 50_000;

    let mut graph: BlockGraph = BlockGraph::new();
    let (entry, exit) = graph.entry_and_exit()?;
    let switch = graph.create_block(&[entry])?;
    let mut cases = Vec::with_capacity(CASES);
    for _ in 0..CASES {
        let case = graph.create_block(&[switch])?;
        graph.add_successors(case, &[exit])?;
        cases.push(case);
    }
    // repeated edges stay single
    graph.add_successors(switch, &[cases[0], cases[CASES - 1]])?;
    graph.add_predecessors(exit, &[cases[3]])?;
    graph.finalize()?;

    assert_eq!(graph.block(switch).map(|b| b.succs().len()), Some(CASES));
    assert_eq!(graph.block(exit).map(|b| b.preds().len()), Some(CASES));
    assert_eq!(graph.edge_list().len(), 2 * CASES + 1);
    assert_eq!(graph.idom(exit), Some(switch));
    assert_eq!(graph.idom(cases[7]), Some(switch));
    assert_eq!(graph.dominance_frontier(cases[7]), &[exit]);
    Ok(())
}

#[test]
fn natural_loop() -> Result<()> {
    init_logging();
    // entry -> a -> b -> exit, b -> a
    let mut graph: BlockGraph = BlockGraph::new();
    let (entry, exit) = graph.entry_and_exit()?;
    let a = graph.create_block(&[entry])?;
    let b = graph.create_block(&[a])?;
    graph.set_true_target(b, a)?;
    graph.set_false_target(b, exit)?;
    graph.finalize()?;

    assert_eq!(graph.idom(a), Some(entry));
    assert_eq!(graph.idom(b), Some(a));
    assert_eq!(graph.idom(exit), Some(b));
    // the header dominates its latch, so the back edge puts it in its own frontier
    assert_eq!(graph.dominance_frontier(b), &[a]);
    assert_eq!(graph.dominance_frontier(a), &[a]);
    assert_eq!(
        graph.edge_list().get(b, a).and_then(|edge| edge.dfs()),
        Some(DfsEdgeKind::Back)
    );
    assert_eq!(graph.iterated_dominance_frontier(b), BTreeSet::from([a]));
    Ok(())
}

#[test]
fn irreducible_region() -> Result<()> {
    // entry -> {a, b}, a <-> b, both -> exit
    let mut graph: BlockGraph = BlockGraph::with_config(AnalysisConfig::paranoid());
    let (entry, exit) = graph.entry_and_exit()?;
    let a = graph.create_block(&[entry])?;
    let b = graph.create_block(&[entry, a])?;
    graph.add_successors(b, &[a])?;
    graph.push_node(a, ())?;
    graph.push_node(b, ())?;
    graph.add_predecessors(exit, &[a, b])?;
    graph.finalize()?;

    assert_eq!(graph.idom(a), Some(entry));
    assert_eq!(graph.idom(b), Some(entry));
    assert_eq!(graph.dominance_frontier(a), &[exit, b]);
    assert_eq!(graph.dominance_frontier(b), &[exit, a]);

    let post = graph.post_dominators().expect("configured");
    assert_eq!(post.idom(entry), Some(exit));
    Ok(())
}

#[test]
fn finalize_is_idempotent() -> Result<()> {
    let (mut graph, _) = lengauer_tarjan()?;
    graph.finalize()?;
    let first = graph.dominators().clone();
    let numbering = graph.numbering().cloned();

    graph.finalize()?;
    assert_eq!(graph.dominators(), &first);
    assert_eq!(graph.numbering().cloned(), numbering);
    Ok(())
}

#[test]
fn iterated_frontier_for_phi_placement() -> Result<()> {
    // entry -> test -> {then, else} -> join -> exit
    let mut graph: BlockGraph<&str> = BlockGraph::new();
    let (entry, exit) = graph.entry_and_exit()?;
    let test = graph.create_block(&[entry])?;
    let then = graph.consequent(test)?;
    let otherwise = graph.alternate(test)?;
    let join = graph.create_block(&[then, otherwise])?;
    graph.add_successors(join, &[exit])?;
    graph.push_node(then, "x = 1")?;
    graph.push_node(otherwise, "x = 2")?;
    graph.finalize()?;

    let tree = graph.dominators();
    let phis = tree.iterated_dominance_frontier_of_set([then, otherwise]);
    assert_eq!(phis, BTreeSet::from([join]));

    let mut seen = Vec::new();
    tree.for_each_in_pruned_iterated_frontier(then, |block| {
        seen.push(block);
        true
    });
    assert_eq!(seen, vec![join]);
    assert_eq!(tree.common_dominator(then, otherwise), test);
    Ok(())
}

#[test]
fn generic_analyses_on_block_graph() -> Result<()> {
    let (graph, [r, x1, ..]) = lengauer_tarjan()?;
    let entry = graph.entry().expect("entry marked");

    let tree = compute_dominators(&Rooted::new(&graph, entry))?;
    assert_eq!(tree.idom(x1), Some(r));

    let numbering = DfsNumbering::compute(&Rooted::new(&graph, entry));
    let iterative = iterative_dominators(&Rooted::new(&graph, entry), &numbering)?;
    for &block in tree.preorder() {
        assert_eq!(tree.idom(block), iterative.idom(block), "idom({block})");
    }
    assert_eq!(numbering.reverse_postorder()[0], r);
    Ok(())
}

#[test]
fn errors_are_reported() {
    let mut graph: BlockGraph = BlockGraph::new();
    assert!(matches!(graph.finalize(), Err(Error::MissingEntry)));

    let (entry, _) = graph.entry_and_exit().expect("fresh graph");
    let other = graph.create_block(&[]).expect("new block");
    assert!(matches!(
        graph.mark_entry(other),
        Err(Error::InvariantViolation { .. })
    ));
    assert!(matches!(
        graph.add_successors(entry, &[BlockId::new(77)]),
        Err(Error::UnknownBlock(_))
    ));
    assert!(matches!(graph.try_dominators(), Err(Error::NotFinalized)));
}
