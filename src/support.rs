//! Support computation and structural node counting.
//!
//! Both walks use the marks packed next to the reference count instead of a
//! visited set. An edge can reach a node with either polarity, so there are
//! two marks: the p-mark for positive edges and the n-mark for negative
//! ones. The support walk only needs the p-mark (support is polarity
//! independent); the size walk is polarity aware. Every walk ends with a
//! clearing pass over both marks.

use std::collections::HashSet;

use crate::arena::NodeArena;
use crate::bdd::Bdd;
use crate::edge::Edge;
use crate::types::VarId;

impl Bdd {
    /// The variables `e` actually depends on, in ascending id order.
    ///
    /// Constants and sentinels have empty support.
    pub fn support(&self, e: Edge) -> Vec<VarId> {
        let mut slots = HashSet::new();
        self.with_arena(|arena| Self::sup_step(arena, e, &mut slots));
        self.clear_pnmark(e);

        let mut support: Vec<VarId> = slots
            .into_iter()
            .map(|slot| self.var_id_of_slot(slot))
            .collect();
        support.sort();
        support
    }

    /// The support of `e` as a cube of positive literals (`ONE` for
    /// constants).
    pub fn support_cube(&self, e: Edge) -> Edge {
        let mut result = Edge::ONE;
        for id in self.support(e) {
            result = self.and_op(result, self.make_posiliteral(id));
        }
        result
    }

    /// Number of nodes reachable from `e`, counting separately per reaching
    /// polarity.
    pub fn size(&self, e: Edge) -> usize {
        let mut count = 0;
        self.with_arena(|arena| Self::count_step(arena, e, &mut count));
        self.clear_pnmark(e);
        count
    }

    fn sup_step(arena: &mut NodeArena, mut e: Edge, slots: &mut HashSet<u32>) {
        loop {
            let index = e.index();
            if index == 0 || arena.node(index).refmark.p_mark() {
                return;
            }
            arena.node_mut(index).refmark.set_p_mark();
            let (var, e0, e1) = {
                let node = arena.node(index);
                (node.var(), node.edge0(), node.edge1())
            };
            slots.insert(var);
            Self::sup_step(arena, e0, slots);
            e = e1;
        }
    }

    fn count_step(arena: &mut NodeArena, e: Edge, count: &mut usize) {
        let index = e.index();
        if index == 0 || Self::marked(arena, e) {
            return;
        }
        Self::set_mark(arena, e);
        *count += 1;
        let negated = e.is_negated();
        let (e0, e1) = {
            let node = arena.node(index);
            (node.edge0_with(negated), node.edge1_with(negated))
        };
        Self::count_step(arena, e0, count);
        Self::count_step(arena, e1, count);
    }

    /// Whether the node under `e` carries the mark for `e`'s polarity.
    fn marked(arena: &NodeArena, e: Edge) -> bool {
        let refmark = arena.node(e.index()).refmark;
        if e.is_negated() {
            refmark.n_mark()
        } else {
            refmark.p_mark()
        }
    }

    fn set_mark(arena: &mut NodeArena, e: Edge) {
        let refmark = &mut arena.node_mut(e.index()).refmark;
        if e.is_negated() {
            refmark.set_n_mark();
        } else {
            refmark.set_p_mark();
        }
    }

    /// Clears both marks everywhere below `e`.
    pub(crate) fn clear_pnmark(&self, e: Edge) {
        self.with_arena(|arena| Self::clear_step(arena, e));
    }

    fn clear_step(arena: &mut NodeArena, mut e: Edge) {
        loop {
            let index = e.index();
            if index == 0 {
                return;
            }
            let refmark = arena.node(index).refmark;
            if !refmark.p_mark() && !refmark.n_mark() {
                return;
            }
            arena.node_mut(index).refmark.clear_marks();
            let (e0, e1) = {
                let node = arena.node(index);
                (node.edge0(), node.edge1())
            };
            Self::clear_step(arena, e0);
            e = e1;
        }
    }
}
