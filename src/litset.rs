//! Literal-set and variable-set algebra over cube BDDs.
//!
//! A literal set is a cube: a single path to 1 where every node has exactly
//! one non-zero branch. A variable set is the positive special case. The
//! set operations walk both cubes in level order; two literals are equal
//! only when variable and polarity both match. Decomposition and matching
//! layers consume these.

use crate::bdd::Bdd;
use crate::edge::Edge;

impl Bdd {
    /// Whether `e` is a cube (one path to 1). Constants: 1 yes, 0 no.
    pub fn check_cube(&self, e: Edge) -> bool {
        if e.is_invalid() || e.is_zero() {
            return false;
        }
        let mut e = e;
        while !e.is_one() {
            let e0 = self.edge0(e);
            let e1 = self.edge1(e);
            e = if e0.is_zero() {
                e1
            } else if e1.is_zero() {
                e0
            } else {
                return false;
            };
        }
        true
    }

    /// Whether `e` is a cube of positive literals only.
    pub fn check_posi_cube(&self, e: Edge) -> bool {
        if e.is_invalid() || e.is_zero() {
            return false;
        }
        let mut e = e;
        while !e.is_one() {
            let e0 = self.edge0(e);
            let e1 = self.edge1(e);
            if !e0.is_zero() || e1.is_zero() {
                return false;
            }
            e = e1;
        }
        true
    }

    /// The branch a cube continues along; `true` means the 1-branch (a
    /// positive literal at this node).
    fn select_edge(&self, e: Edge) -> (Edge, bool) {
        let e0 = self.edge0(e);
        if e0.is_zero() {
            (self.edge1(e), true)
        } else {
            (e0, false)
        }
    }

    fn wrap_literal(&self, slot: u32, positive: bool, rest: Edge) -> Edge {
        if positive {
            self.make_node(slot, Edge::ZERO, rest)
        } else {
            self.make_node(slot, rest, Edge::ZERO)
        }
    }

    /// Intersection of two literal sets.
    ///
    /// A constant-0 operand is ill-formed and yields `ERROR`.
    pub fn lscap(&self, e1: Edge, e2: Edge) -> Edge {
        if e1.is_error() || e2.is_error() {
            return Edge::ERROR;
        }
        if e1.is_overflow() || e2.is_overflow() {
            return Edge::OVERFLOW;
        }
        if e1.is_zero() || e2.is_zero() {
            return Edge::ERROR;
        }
        if e1.is_one() || e2.is_one() {
            return Edge::ONE;
        }
        debug_assert!(self.check_cube(e1) && self.check_cube(e2));

        let (mut e1, mut e2) = (e1, e2);
        loop {
            let l1 = self.edge_level(e1);
            let l2 = self.edge_level(e2);
            if l1 == l2 {
                let slot = self.edge_var_slot(e1);
                let (n1, p1) = self.select_edge(e1);
                let (n2, p2) = self.select_edge(e2);
                if p1 == p2 {
                    let rest = self.lscap(n1, n2);
                    return self.wrap_literal(slot, p1, rest);
                }
                if n1.is_one() || n2.is_one() {
                    return Edge::ONE;
                }
                e1 = n1;
                e2 = n2;
            } else if l1 < l2 {
                let (n1, _) = self.select_edge(e1);
                if n1.is_one() {
                    return Edge::ONE;
                }
                e1 = n1;
            } else {
                let (n2, _) = self.select_edge(e2);
                if n2.is_one() {
                    return Edge::ONE;
                }
                e2 = n2;
            }
        }
    }

    /// Difference of two literal sets (`e1` minus `e2`).
    pub fn lsdiff(&self, e1: Edge, e2: Edge) -> Edge {
        if e1.is_error() || e2.is_error() {
            return Edge::ERROR;
        }
        if e1.is_overflow() || e2.is_overflow() {
            return Edge::OVERFLOW;
        }
        if e1.is_zero() || e2.is_zero() {
            return Edge::ERROR;
        }
        if e1.is_one() || e2.is_one() {
            return e1;
        }

        let l1 = self.edge_level(e1);
        let l2 = self.edge_level(e2);
        if l1 < l2 {
            let slot = self.edge_var_slot(e1);
            let (n1, p1) = self.select_edge(e1);
            let rest = self.lsdiff(n1, e2);
            self.wrap_literal(slot, p1, rest)
        } else if l1 > l2 {
            let (n2, _) = self.select_edge(e2);
            self.lsdiff(e1, n2)
        } else {
            let slot = self.edge_var_slot(e1);
            let (n1, p1) = self.select_edge(e1);
            let (n2, p2) = self.select_edge(e2);
            if p1 == p2 {
                self.lsdiff(n1, n2)
            } else {
                // Same variable, opposite polarity: distinct literals.
                let rest = self.lsdiff(n1, n2);
                self.wrap_literal(slot, p1, rest)
            }
        }
    }

    /// Whether two literal sets share a literal.
    pub fn lsintersect(&self, e1: Edge, e2: Edge) -> bool {
        if e1.is_invalid() || e2.is_invalid() || e1.is_zero() || e2.is_zero() {
            return false;
        }
        let (mut e1, mut e2) = (e1, e2);
        loop {
            if e1.is_one() || e2.is_one() {
                return false;
            }
            let l1 = self.edge_level(e1);
            let l2 = self.edge_level(e2);
            if l1 == l2 {
                let (n1, p1) = self.select_edge(e1);
                let (n2, p2) = self.select_edge(e2);
                if p1 == p2 {
                    return true;
                }
                e1 = n1;
                e2 = n2;
            } else if l1 < l2 {
                e1 = self.select_edge(e1).0;
            } else {
                e2 = self.select_edge(e2).0;
            }
        }
    }

    /// Intersection of two variable sets (positive cubes).
    pub fn vscap(&self, e1: Edge, e2: Edge) -> Edge {
        if e1.is_error() || e2.is_error() {
            return Edge::ERROR;
        }
        if e1.is_overflow() || e2.is_overflow() {
            return Edge::OVERFLOW;
        }
        if e1.is_zero() || e2.is_zero() {
            return Edge::ERROR;
        }
        if e1.is_one() || e2.is_one() {
            return Edge::ONE;
        }
        debug_assert!(self.check_posi_cube(e1) && self.check_posi_cube(e2));

        let l1 = self.edge_level(e1);
        let l2 = self.edge_level(e2);
        if l1 == l2 {
            let slot = self.edge_var_slot(e1);
            let rest = self.vscap(self.edge1(e1), self.edge1(e2));
            self.make_node(slot, Edge::ZERO, rest)
        } else if l1 < l2 {
            self.vscap(self.edge1(e1), e2)
        } else {
            self.vscap(e1, self.edge1(e2))
        }
    }

    /// Difference of two variable sets (`e1` minus `e2`).
    pub fn vsdiff(&self, e1: Edge, e2: Edge) -> Edge {
        if e1.is_error() || e2.is_error() {
            return Edge::ERROR;
        }
        if e1.is_overflow() || e2.is_overflow() {
            return Edge::OVERFLOW;
        }
        if e1.is_zero() || e2.is_zero() {
            return Edge::ERROR;
        }
        if e1.is_one() {
            return Edge::ONE;
        }
        if e2.is_one() {
            return e1;
        }

        let l1 = self.edge_level(e1);
        let l2 = self.edge_level(e2);
        if l1 < l2 {
            let slot = self.edge_var_slot(e1);
            let rest = self.vsdiff(self.edge1(e1), e2);
            self.make_node(slot, Edge::ZERO, rest)
        } else if l1 > l2 {
            self.vsdiff(e1, self.edge1(e2))
        } else {
            self.vsdiff(self.edge1(e1), self.edge1(e2))
        }
    }

    /// Whether two variable sets share a variable.
    pub fn vsintersect(&self, e1: Edge, e2: Edge) -> bool {
        if e1.is_invalid() || e2.is_invalid() || e1.is_zero() || e2.is_zero() {
            return false;
        }
        let (mut e1, mut e2) = (e1, e2);
        loop {
            if e1.is_one() || e2.is_one() {
                return false;
            }
            let l1 = self.edge_level(e1);
            let l2 = self.edge_level(e2);
            if l1 == l2 {
                return true;
            } else if l1 < l2 {
                e1 = self.edge1(e1);
            } else {
                e2 = self.edge1(e2);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use test_log::test;

    use super::*;

    #[test]
    fn test_check_cube() {
        let bdd = Bdd::new();
        assert!(bdd.check_cube(Edge::ONE));
        assert!(!bdd.check_cube(Edge::ZERO));
        assert!(!bdd.check_cube(Edge::ERROR));

        let cube = bdd.cube([1, -2, 3]);
        assert!(bdd.check_cube(cube));
        assert!(!bdd.check_posi_cube(cube));

        let posi = bdd.cube([1, 2]);
        assert!(bdd.check_posi_cube(posi));

        let x1 = bdd.make_posiliteral(crate::types::VarId::new(1));
        let x2 = bdd.make_posiliteral(crate::types::VarId::new(2));
        let not_a_cube = bdd.or_op(x1, x2);
        assert!(!bdd.check_cube(not_a_cube));
    }

    #[test]
    fn test_lscap() {
        let bdd = Bdd::new();
        let a = bdd.cube([1, -2, 3]);
        let b = bdd.cube([1, 2, 3]);

        // Variable 2 differs in polarity; 1 and 3 are common.
        assert_eq!(bdd.lscap(a, b), bdd.cube([1, 3]));
        // Disjoint sets meet in the empty set (constant 1).
        assert_eq!(bdd.lscap(bdd.cube([-4]), bdd.cube([4])), Edge::ONE);
        assert_eq!(bdd.lscap(a, Edge::ONE), Edge::ONE);
        assert_eq!(bdd.lscap(a, Edge::ZERO), Edge::ERROR);
    }

    #[test]
    fn test_lsdiff() {
        let bdd = Bdd::new();
        let a = bdd.cube([1, -2, 3]);
        let b = bdd.cube([1, 2, 3]);

        assert_eq!(bdd.lsdiff(a, b), bdd.cube([-2]));
        assert_eq!(bdd.lsdiff(b, a), bdd.cube([2]));
        assert_eq!(bdd.lsdiff(a, a), Edge::ONE);
        assert_eq!(bdd.lsdiff(a, Edge::ONE), a);
    }

    #[test]
    fn test_lsintersect() {
        let bdd = Bdd::new();
        let a = bdd.cube([1, -2]);
        assert!(bdd.lsintersect(a, bdd.cube([1, 2])));
        assert!(!bdd.lsintersect(a, bdd.cube([-1, 2])));
        assert!(!bdd.lsintersect(a, Edge::ONE));
        assert!(!bdd.lsintersect(a, Edge::ERROR));
    }

    #[test]
    fn test_varset_ops() {
        let bdd = Bdd::new();
        let a = bdd.cube([1, 2, 3]);
        let b = bdd.cube([2, 4]);

        assert_eq!(bdd.vscap(a, b), bdd.cube([2]));
        assert_eq!(bdd.vsdiff(a, b), bdd.cube([1, 3]));
        assert_eq!(bdd.vsdiff(b, a), bdd.cube([4]));
        assert!(bdd.vsintersect(a, b));
        assert!(!bdd.vsintersect(bdd.cube([1]), bdd.cube([4])));
        assert_eq!(bdd.vscap(bdd.cube([1]), bdd.cube([4])), Edge::ONE);
    }
}
