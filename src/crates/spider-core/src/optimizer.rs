//! Graph optimizer (§4.3): local rewrites on the single-rate graph that
//! collapse redundant FORK/JOIN chains into an equivalent, smaller graph
//! without changing any token stream.
//!
//! Grounded on `original_source/.../transformation/optims/
//! PiSDFForkForkOptimizer.h` and `PiSDFJoinJoinOptimizer.h`: each pass is a
//! local pattern → replacement rewrite, driven to a fixed point. The
//! original dispatches each optimizer through its own visitor subclass; here
//! every pass is a plain `fn(&mut SrGraph) -> bool` returning whether it
//! changed anything, matching the REDESIGN FLAG's "free functions over a
//! tagged enum" approach already used for [`crate::srgraph::SrVertexKind`].

use crate::ids::SrVertexId;
use crate::srgraph::{SrGraph, SrVertexKind};

/// Runs every pass to a fixed point, in deterministic, name-sorted order
/// within each sweep. Returns the number of rewrites applied across all
/// passes (0 means the graph was already a fixed point).
pub fn optimize(sr: &mut SrGraph) -> usize {
    let mut total = 0usize;
    loop {
        let mut changed = false;
        changed |= pass_fork_join_cancel(sr);
        changed |= pass_fork_fork_merge(sr);
        changed |= pass_join_join_merge(sr);
        changed |= pass_unitary_elide(sr);
        changed |= pass_normalize_duplicate(sr);
        if !changed {
            break;
        }
        total += 1;
    }
    total
}

fn sorted_ids(sr: &SrGraph) -> Vec<SrVertexId> {
    let mut ids: Vec<SrVertexId> = sr.vertices().map(|v| v.id()).collect();
    ids.sort_by_key(|id| (sr.vertex(*id).unwrap().name().to_string(), id.get()));
    ids
}

/// Unitary FORK/JOIN (exactly one input, one output) carries no actual
/// splitting or gathering work; splice it out and reconnect its predecessor
/// directly to its successor.
fn pass_unitary_elide(sr: &mut SrGraph) -> bool {
    let mut changed = false;
    for id in sorted_ids(sr) {
        let Some(v) = sr.vertex(id) else { continue };
        if !matches!(v.kind(), SrVertexKind::Fork | SrVertexKind::Join) {
            continue;
        }
        if v.inputs().len() != 1 || v.outputs().len() != 1 {
            continue;
        }
        let in_edge_id = v.inputs().get(0);
        let out_edge_id = v.outputs().get(0);
        let (Some(in_id), Some(out_id)) = (in_edge_id, out_edge_id) else { continue };
        let in_edge = sr.edge(in_id).unwrap();
        let out_edge = sr.edge(out_id).unwrap();
        let source = in_edge.source();
        let sink = out_edge.sink();
        let rate = out_edge.rate();

        sr.remove_edge(in_id);
        sr.remove_edge(out_id);
        sr.remove_vertex(id);
        sr.connect(source.vertex, sink.vertex, rate);
        changed = true;
    }
    changed
}

/// FORK feeding directly into another FORK (as that FORK's sole input):
/// merge into one FORK whose outputs are the parent's remaining outputs plus
/// the child's outputs, in order.
fn pass_fork_fork_merge(sr: &mut SrGraph) -> bool {
    let mut changed = false;
    for child_id in sorted_ids(sr) {
        let Some(child) = sr.vertex(child_id) else { continue };
        if !matches!(child.kind(), SrVertexKind::Fork) || child.inputs().len() != 1 {
            continue;
        }
        let Some(feeding_edge_id) = child.inputs().get(0) else { continue };
        let feeding_edge = sr.edge(feeding_edge_id).unwrap();
        let parent_id = feeding_edge.source().vertex;
        if parent_id == child_id {
            continue;
        }
        let Some(parent) = sr.vertex(parent_id) else { continue };
        if !matches!(parent.kind(), SrVertexKind::Fork) {
            continue;
        }
        let parent_input_edge = match parent.inputs().get(0) {
            Some(e) => e,
            None => continue,
        };
        let parent_source = sr.edge(parent_input_edge).unwrap().source();

        let other_parent_outputs: Vec<(crate::srgraph::SrEndpoint, i64)> = parent
            .outputs()
            .iter()
            .flatten()
            .filter(|&e| e != feeding_edge_id)
            .map(|e| {
                let edge = sr.edge(e).unwrap();
                (edge.sink(), edge.rate())
            })
            .collect();
        let child_outputs: Vec<(crate::srgraph::SrEndpoint, i64)> =
            child.outputs().iter().flatten().map(|e| (sr.edge(e).unwrap().sink(), sr.edge(e).unwrap().rate())).collect();

        let new_fork = sr.add_vertex(format!("fork_merge_{}", child_id.get()), SrVertexKind::Fork);
        sr.connect(parent_source.vertex, new_fork, sr.edge(parent_input_edge).unwrap().rate());
        for (sink, rate) in other_parent_outputs.into_iter().chain(child_outputs) {
            sr.connect(new_fork, sink.vertex, rate);
        }

        // Tear down the old parent/child pair.
        let parent_edges: Vec<_> = sr.vertex(parent_id).unwrap().outputs().iter().flatten().collect();
        for e in parent_edges {
            sr.remove_edge(e);
        }
        sr.remove_edge(parent_input_edge);
        let child_edges: Vec<_> = sr.vertex(child_id).unwrap().outputs().iter().flatten().collect();
        for e in child_edges {
            sr.remove_edge(e);
        }
        sr.remove_vertex(parent_id);
        sr.remove_vertex(child_id);
        changed = true;
    }
    changed
}

/// Symmetric to [`pass_fork_fork_merge`]: a JOIN whose single output feeds
/// directly into one input of another JOIN merges into one JOIN gathering
/// the parent's remaining inputs plus the child's inputs.
fn pass_join_join_merge(sr: &mut SrGraph) -> bool {
    let mut changed = false;
    for child_id in sorted_ids(sr) {
        let Some(child) = sr.vertex(child_id) else { continue };
        if !matches!(child.kind(), SrVertexKind::Join) || child.outputs().len() != 1 {
            continue;
        }
        let Some(out_edge_id) = child.outputs().get(0) else { continue };
        let out_edge = sr.edge(out_edge_id).unwrap();
        let parent_id = out_edge.sink().vertex;
        if parent_id == child_id {
            continue;
        }
        let Some(parent) = sr.vertex(parent_id) else { continue };
        if !matches!(parent.kind(), SrVertexKind::Join) {
            continue;
        }
        let parent_output_edge = match parent.outputs().get(0) {
            Some(e) => e,
            None => continue,
        };
        let parent_sink = sr.edge(parent_output_edge).unwrap().sink();

        let other_parent_inputs: Vec<(crate::srgraph::SrEndpoint, i64)> = parent
            .inputs()
            .iter()
            .flatten()
            .filter(|&e| e != out_edge_id)
            .map(|e| {
                let edge = sr.edge(e).unwrap();
                (edge.source(), edge.rate())
            })
            .collect();
        let child_inputs: Vec<(crate::srgraph::SrEndpoint, i64)> =
            child.inputs().iter().flatten().map(|e| (sr.edge(e).unwrap().source(), sr.edge(e).unwrap().rate())).collect();

        let new_join = sr.add_vertex(format!("join_merge_{}", child_id.get()), SrVertexKind::Join);
        for (source, rate) in other_parent_inputs.into_iter().chain(child_inputs) {
            sr.connect(source.vertex, new_join, rate);
        }
        sr.connect(new_join, parent_sink.vertex, sr.edge(parent_output_edge).unwrap().rate());

        let parent_edges: Vec<_> = sr.vertex(parent_id).unwrap().inputs().iter().flatten().collect();
        for e in parent_edges {
            sr.remove_edge(e);
        }
        sr.remove_edge(parent_output_edge);
        let child_edges: Vec<_> = sr.vertex(child_id).unwrap().inputs().iter().flatten().collect();
        for e in child_edges {
            sr.remove_edge(e);
        }
        sr.remove_vertex(parent_id);
        sr.remove_vertex(child_id);
        changed = true;
    }
    changed
}

/// A FORK whose N outputs feed, in the same order and with matching rates,
/// the N inputs of a single JOIN cancels out entirely: the token stream
/// passes through unchanged, so splice a single direct edge from the FORK's
/// source to the JOIN's sink.
fn pass_fork_join_cancel(sr: &mut SrGraph) -> bool {
    let mut changed = false;
    for fork_id in sorted_ids(sr) {
        let Some(fork) = sr.vertex(fork_id) else { continue };
        if !matches!(fork.kind(), SrVertexKind::Fork) || fork.inputs().len() != 1 {
            continue;
        }
        let outputs: Vec<_> = fork.outputs().iter().collect();
        if outputs.is_empty() || outputs.iter().any(|e| e.is_none()) {
            continue;
        }
        let outputs: Vec<_> = outputs.into_iter().flatten().collect();
        let first_sink = sr.edge(outputs[0]).unwrap().sink().vertex;
        let Some(join) = sr.vertex(first_sink) else { continue };
        if !matches!(join.kind(), SrVertexKind::Join) || join.inputs().len() != outputs.len() {
            continue;
        }
        let join_id = first_sink;

        let matches_positionally = outputs.iter().enumerate().all(|(k, &e)| {
            let edge = sr.edge(e).unwrap();
            let sink = edge.sink();
            sink.vertex == join_id && sink.port == k
        });
        if !matches_positionally {
            continue;
        }

        let fork_in_edge = sr.vertex(fork_id).unwrap().inputs().get(0).unwrap();
        let join_out_edge = match sr.vertex(join_id).unwrap().outputs().get(0) {
            Some(e) if sr.vertex(join_id).unwrap().outputs().len() == 1 => e,
            _ => continue,
        };
        let source = sr.edge(fork_in_edge).unwrap().source();
        let sink = sr.edge(join_out_edge).unwrap().sink();
        let rate = sr.edge(join_out_edge).unwrap().rate();

        sr.remove_edge(fork_in_edge);
        for e in &outputs {
            sr.remove_edge(*e);
        }
        sr.remove_edge(join_out_edge);
        sr.remove_vertex(fork_id);
        sr.remove_vertex(join_id);
        sr.connect(source.vertex, sink.vertex, rate);
        changed = true;
    }
    changed
}

/// A FORK every one of whose outputs replays the *entire* input (rather
/// than a slice of it) is semantically a broadcast, not a split; relabel it
/// DUPLICATE so the FIFO allocator applies the simpler "every output aliases
/// the whole input" rule (§4.5) instead of the offset-slicing FORK rule.
fn pass_normalize_duplicate(sr: &mut SrGraph) -> bool {
    let mut changed = false;
    for id in sorted_ids(sr) {
        let Some(v) = sr.vertex(id) else { continue };
        if !matches!(v.kind(), SrVertexKind::Fork) || v.inputs().len() != 1 || v.outputs().len() < 2 {
            continue;
        }
        let in_rate = sr.edge(v.inputs().get(0).unwrap()).unwrap().rate();
        let all_full_copies = v.outputs().iter().flatten().all(|e| sr.edge(e).unwrap().rate() == in_rate);
        if all_full_copies {
            sr.vertex_mut(id).unwrap().set_kind(SrVertexKind::Duplicate);
            changed = true;
        }
    }
    changed
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chain(sr: &mut SrGraph, n: usize) -> SrVertexId {
        sr.add_vertex(format!("n{n}"), SrVertexKind::Normal { kernel: "k".into() })
    }

    #[test]
    fn unitary_fork_is_elided() {
        let mut sr = SrGraph::new();
        let a = chain(&mut sr, 0);
        let fork = sr.add_vertex("f", SrVertexKind::Fork);
        let b = chain(&mut sr, 1);
        sr.connect(a, fork, 4);
        sr.connect(fork, b, 4);

        let changes = optimize(&mut sr);
        assert!(changes > 0);
        assert_eq!(sr.vertices().count(), 2);
        assert_eq!(sr.edges().count(), 1);
    }

    #[test]
    fn fork_fork_merges_into_one() {
        let mut sr = SrGraph::new();
        let a = chain(&mut sr, 0);
        let fork1 = sr.add_vertex("f1", SrVertexKind::Fork);
        let fork2 = sr.add_vertex("f2", SrVertexKind::Fork);
        let x = chain(&mut sr, 1);
        let y = chain(&mut sr, 2);
        let z = chain(&mut sr, 3);
        sr.connect(a, fork1, 12);
        sr.connect(fork1, fork2, 8);
        sr.connect(fork1, x, 4);
        sr.connect(fork2, y, 4);
        sr.connect(fork2, z, 4);

        optimize(&mut sr);
        let forks: Vec<_> = sr.vertices().filter(|v| matches!(v.kind(), SrVertexKind::Fork)).collect();
        assert_eq!(forks.len(), 1);
        assert_eq!(forks[0].outputs().len(), 3);
    }

    #[test]
    fn fork_join_matching_widths_cancels() {
        let mut sr = SrGraph::new();
        let a = chain(&mut sr, 0);
        let fork = sr.add_vertex("f", SrVertexKind::Fork);
        let join = sr.add_vertex("j", SrVertexKind::Join);
        let b = chain(&mut sr, 1);
        sr.connect(a, fork, 8);
        sr.connect(fork, join, 4);
        sr.connect(fork, join, 4);
        sr.connect(join, b, 8);

        optimize(&mut sr);
        assert_eq!(sr.vertices().count(), 2);
        assert_eq!(sr.edges().count(), 1);
    }

    #[test]
    fn full_copy_fork_normalizes_to_duplicate() {
        let mut sr = SrGraph::new();
        let a = chain(&mut sr, 0);
        let fork = sr.add_vertex("f", SrVertexKind::Fork);
        let b = chain(&mut sr, 1);
        let c = chain(&mut sr, 2);
        sr.connect(a, fork, 4);
        sr.connect(fork, b, 4);
        sr.connect(fork, c, 4);

        optimize(&mut sr);
        assert!(matches!(sr.vertex(fork).unwrap().kind(), SrVertexKind::Duplicate));
    }
}
