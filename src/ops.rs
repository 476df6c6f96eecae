//! Boolean combinators over the hash-consing primitive.
//!
//! AND, XOR and ITE are memoized recursive descents over the shared
//! computed table; OR is De Morgan over AND. Every operation propagates the
//! `ERROR` and `OVERFLOW` sentinels without further computation.
//!
//! Automatic collection is suspended for the duration of a recursive
//! operation: intermediate results are not reference-counted, so a sweep in
//! the middle of the recursion could free them out from under the caller.

use log::trace;

use crate::bdd::Bdd;
use crate::edge::Edge;
use crate::types::Level;
use crate::utils::{pairing2, pairing3, MyHash};

/// Key of a memoized operation.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum OpKey {
    And(Edge, Edge),
    Xor(Edge, Edge),
    Ite(Edge, Edge, Edge),
}

impl MyHash for OpKey {
    fn hash(&self) -> u64 {
        match *self {
            OpKey::And(f, g) => pairing3(0, f.code() as u64, g.code() as u64),
            OpKey::Xor(f, g) => pairing3(1, f.code() as u64, g.code() as u64),
            OpKey::Ite(f, g, h) => {
                pairing2(pairing3(2, f.code() as u64, g.code() as u64), h.code() as u64)
            }
        }
    }
}

impl OpKey {
    /// The edges appearing in this key, padded with a constant.
    pub(crate) fn edges(&self) -> [Edge; 3] {
        match *self {
            OpKey::And(f, g) => [f, g, Edge::ONE],
            OpKey::Xor(f, g) => [f, g, Edge::ONE],
            OpKey::Ite(f, g, h) => [f, g, h],
        }
    }
}

impl Bdd {
    /// `f AND g`.
    pub fn and_op(&self, f: Edge, g: Edge) -> Edge {
        if f.is_error() || g.is_error() {
            return Edge::ERROR;
        }
        if f.is_overflow() || g.is_overflow() {
            return Edge::OVERFLOW;
        }
        self.disable_gc();
        let result = self.and_rec(f, g);
        self.enable_gc();
        result
    }

    /// `f OR g`.
    pub fn or_op(&self, f: Edge, g: Edge) -> Edge {
        -self.and_op(-f, -g)
    }

    /// `f XOR g`.
    pub fn xor_op(&self, f: Edge, g: Edge) -> Edge {
        if f.is_error() || g.is_error() {
            return Edge::ERROR;
        }
        if f.is_overflow() || g.is_overflow() {
            return Edge::OVERFLOW;
        }
        self.disable_gc();
        let result = self.xor_rec(f, g);
        self.enable_gc();
        result
    }

    fn and_rec(&self, f: Edge, g: Edge) -> Edge {
        trace!("and_rec(f = {}, g = {})", f, g);

        if f.is_one() {
            return g;
        }
        if g.is_one() {
            return f;
        }
        if f.is_zero() || g.is_zero() {
            return Edge::ZERO;
        }
        if f == g {
            return f;
        }
        if f == -g {
            return Edge::ZERO;
        }

        // Commutative: fix the operand order for the cache.
        let (f, g) = if f.code() <= g.code() { (f, g) } else { (g, f) };

        let key = OpKey::And(f, g);
        if let Some(result) = self.cache.borrow().get(&key) {
            return result;
        }

        let (slot, f0, f1, g0, g1) = self.split2(f, g);
        let r0 = self.and_rec(f0, g0);
        let r1 = self.and_rec(f1, g1);
        let result = self.make_node(slot, r0, r1);
        if !result.is_invalid() {
            self.cache.borrow_mut().insert(key, result);
        }
        result
    }

    fn xor_rec(&self, f: Edge, g: Edge) -> Edge {
        trace!("xor_rec(f = {}, g = {})", f, g);

        if f.is_zero() {
            return g;
        }
        if g.is_zero() {
            return f;
        }
        if f.is_one() {
            return -g;
        }
        if g.is_one() {
            return -f;
        }
        if f == g {
            return Edge::ZERO;
        }
        if f == -g {
            return Edge::ONE;
        }

        // XOR is linear in complement: strip both polarities and put the
        // combined one on the result.
        let negated = f.is_negated() ^ g.is_negated();
        let f = f.with_pol(f.is_negated());
        let g = g.with_pol(g.is_negated());
        let (f, g) = if f.code() <= g.code() { (f, g) } else { (g, f) };

        let key = OpKey::Xor(f, g);
        if let Some(result) = self.cache.borrow().get(&key) {
            return result.with_pol(negated);
        }

        let (slot, f0, f1, g0, g1) = self.split2(f, g);
        let r0 = self.xor_rec(f0, g0);
        let r1 = self.xor_rec(f1, g1);
        let result = self.make_node(slot, r0, r1);
        if !result.is_invalid() {
            self.cache.borrow_mut().insert(key, result);
        }
        result.with_pol(negated)
    }

    /// `ITE(f, g, h)`: `g` where `f` holds, `h` elsewhere.
    pub fn ite_op(&self, f: Edge, g: Edge, h: Edge) -> Edge {
        trace!("ite_op(f = {}, g = {}, h = {})", f, g, h);

        if f.is_error() || g.is_error() || h.is_error() {
            return Edge::ERROR;
        }
        if f.is_overflow() || g.is_overflow() || h.is_overflow() {
            return Edge::OVERFLOW;
        }

        if f.is_one() {
            return g;
        }
        if f.is_zero() {
            return h;
        }
        if g == h {
            return g;
        }
        if g == -h {
            return self.xor_op(f, h);
        }
        if g.is_one() || f == g {
            return self.or_op(f, h);
        }
        if g.is_zero() || f == -g {
            return self.and_op(-f, h);
        }
        if h.is_one() || f == -h {
            return self.or_op(-f, g);
        }
        if h.is_zero() || f == h {
            return self.and_op(f, g);
        }

        // f, g, h are all non-terminal from here on.

        // Swapping the branches costs only a complement on the condition;
        // fix the order for the cache.
        let (mut f, mut g, mut h) = (f, g, h);
        if g.code() > h.code() {
            std::mem::swap(&mut g, &mut h);
            f = -f;
        }
        let negated = g.is_negated();
        g = g.with_pol(negated);
        h = h.with_pol(negated);

        let f_level = self.edge_level(f);
        let g_level = self.edge_level(g);
        let h_level = self.edge_level(h);

        let result = if f_level < g_level
            && f_level < h_level
            && self.edge0(f).is_zero()
            && self.edge1(f).is_one()
        {
            // f is a literal above both branches: the result is one node.
            self.make_node(self.edge_var_slot(f), h, g)
        } else if f_level < g_level
            && f_level < h_level
            && self.edge0(f).is_one()
            && self.edge1(f).is_zero()
        {
            self.make_node(self.edge_var_slot(f), g, h)
        } else {
            let key = OpKey::Ite(f, g, h);
            let cached = self.cache.borrow().get(&key);
            if let Some(result) = cached {
                result
            } else {
                self.disable_gc();
                let top = f_level.min(g_level).min(h_level);
                let slot = if f_level == top {
                    self.edge_var_slot(f)
                } else if g_level == top {
                    self.edge_var_slot(g)
                } else {
                    self.edge_var_slot(h)
                };
                let (f0, f1) = self.split1(f, f_level, top);
                let (g0, g1) = self.split1(g, g_level, top);
                let (h0, h1) = self.split1(h, h_level, top);
                let r0 = self.ite_op(f0, g0, h0);
                let r1 = self.ite_op(f1, g1, h1);
                let result = self.make_node(slot, r0, r1);
                self.enable_gc();
                if !result.is_invalid() {
                    self.cache.borrow_mut().insert(key, result);
                }
                result
            }
        };
        result.with_pol(negated)
    }

    /// Top variable slot and cofactors of two edges.
    fn split2(&self, f: Edge, g: Edge) -> (u32, Edge, Edge, Edge, Edge) {
        let f_level = self.edge_level(f);
        let g_level = self.edge_level(g);
        let top = f_level.min(g_level);
        let slot = if f_level == top {
            self.edge_var_slot(f)
        } else {
            self.edge_var_slot(g)
        };
        let (f0, f1) = self.split1(f, f_level, top);
        let (g0, g1) = self.split1(g, g_level, top);
        (slot, f0, f1, g0, g1)
    }

    /// Cofactors of `e` by the variable at `top`, or `e` itself when its
    /// root sits below.
    fn split1(&self, e: Edge, level: Level, top: Level) -> (Edge, Edge) {
        if level == top {
            (self.edge0(e), self.edge1(e))
        } else {
            (e, e)
        }
    }
}

#[cfg(test)]
mod tests {
    use test_log::test;

    use super::*;
    use crate::types::VarId;

    #[test]
    fn test_and_is_order_independent() {
        let bdd = Bdd::new();
        let x1 = bdd.make_posiliteral(VarId::new(1));
        let x2 = bdd.make_posiliteral(VarId::new(2));

        let f = bdd.and_op(x1, x2);
        let g = bdd.and_op(x2, x1);
        assert_eq!(f, g);
    }

    #[test]
    fn test_xor_with_one_is_complement() {
        let bdd = Bdd::new();
        let x1 = bdd.make_posiliteral(VarId::new(1));
        let x2 = bdd.make_posiliteral(VarId::new(2));
        let f = bdd.and_op(x1, x2);

        let before = bdd.node_count();
        let h = bdd.xor_op(f, Edge::ONE);
        assert_eq!(h, -f);
        // Complementing is a polarity flip; no node is allocated.
        assert_eq!(bdd.node_count(), before);
    }

    #[test]
    fn test_xor_identities() {
        let bdd = Bdd::new();
        let x = bdd.make_posiliteral(VarId::new(1));
        let y = bdd.make_posiliteral(VarId::new(2));
        let f = bdd.and_op(x, y);

        assert_eq!(bdd.xor_op(f, f), Edge::ZERO);
        assert_eq!(bdd.xor_op(f, -f), Edge::ONE);
        assert_eq!(bdd.xor_op(f, Edge::ZERO), f);
        assert_eq!(bdd.xor_op(x, y), bdd.xor_op(y, x));
    }

    #[test]
    fn test_de_morgan() {
        let bdd = Bdd::new();
        let x = bdd.make_posiliteral(VarId::new(1));
        let y = bdd.make_posiliteral(VarId::new(2));

        assert_eq!(-bdd.and_op(x, y), bdd.or_op(-x, -y));
        assert_eq!(-bdd.or_op(x, y), bdd.and_op(-x, -y));
    }

    #[test]
    fn test_excluded_middle() {
        let bdd = Bdd::new();
        let x = bdd.make_posiliteral(VarId::new(1));
        assert_eq!(bdd.or_op(x, -x), Edge::ONE);
        assert_eq!(bdd.and_op(x, -x), Edge::ZERO);
    }

    #[test]
    fn test_ite_matches_its_definition() {
        let bdd = Bdd::new();
        let x = bdd.make_posiliteral(VarId::new(1));
        let y = bdd.make_posiliteral(VarId::new(2));
        let z = bdd.make_posiliteral(VarId::new(3));

        let via_ite = bdd.ite_op(x, y, z);
        let expanded = bdd.or_op(bdd.and_op(x, y), bdd.and_op(-x, z));
        assert_eq!(via_ite, expanded);
    }

    #[test]
    fn test_ite_terminal_cases() {
        let bdd = Bdd::new();
        let x = bdd.make_posiliteral(VarId::new(1));
        let y = bdd.make_posiliteral(VarId::new(2));

        assert_eq!(bdd.ite_op(Edge::ONE, x, y), x);
        assert_eq!(bdd.ite_op(Edge::ZERO, x, y), y);
        assert_eq!(bdd.ite_op(x, Edge::ONE, Edge::ZERO), x);
        assert_eq!(bdd.ite_op(x, Edge::ZERO, Edge::ONE), -x);
        assert_eq!(bdd.ite_op(x, y, y), y);
    }

    #[test]
    fn test_cube_and_clause_match_combinators() {
        let bdd = Bdd::new();
        let x1 = bdd.make_posiliteral(VarId::new(1));
        let x2 = bdd.make_posiliteral(VarId::new(2));
        let x3 = bdd.make_posiliteral(VarId::new(3));

        let f = bdd.and_op(bdd.and_op(x1, -x2), x3);
        assert_eq!(bdd.cube([1, -2, 3]), f);

        let g = bdd.or_op(bdd.or_op(x1, -x2), x3);
        assert_eq!(bdd.clause([1, -2, 3]), g);
    }

    #[test]
    fn test_sentinels_are_infectious_through_ops() {
        let bdd = Bdd::new();
        let x = bdd.make_posiliteral(VarId::new(1));

        assert_eq!(bdd.and_op(Edge::ERROR, x), Edge::ERROR);
        assert_eq!(bdd.or_op(x, Edge::ERROR), Edge::ERROR);
        assert_eq!(bdd.xor_op(Edge::OVERFLOW, x), Edge::OVERFLOW);
        assert_eq!(bdd.ite_op(x, Edge::OVERFLOW, x), Edge::OVERFLOW);
        assert_eq!(bdd.ite_op(Edge::ERROR, x, Edge::OVERFLOW), Edge::ERROR);
    }

    #[test]
    fn test_overflow_propagates_out_of_a_blocked_operation() {
        let bdd = Bdd::new();
        let x1 = bdd.make_posiliteral(VarId::new(1));
        let x2 = bdd.make_posiliteral(VarId::new(2));
        bdd.retain(x1);
        bdd.retain(x2);
        bdd.set_node_limit(2);

        // The conjunction needs a fresh node, but both existing nodes are
        // retained and the limit is exhausted.
        assert_eq!(bdd.and_op(x1, x2), Edge::OVERFLOW);
    }

    #[test]
    fn test_shared_subfunctions_are_shared_nodes() {
        let bdd = Bdd::new();
        let x1 = bdd.make_posiliteral(VarId::new(1));
        let x2 = bdd.make_posiliteral(VarId::new(2));
        let x3 = bdd.make_posiliteral(VarId::new(3));

        // (x1 & x2 & x3) and (x2 & x3) share the lower node.
        let g = bdd.and_op(x2, x3);
        let f = bdd.and_op(x1, g);
        assert_eq!(bdd.edge1(f), g);
    }
}
