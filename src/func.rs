//! Owned function handles.
//!
//! A [`Func`] pairs a manager reference with an edge and keeps the
//! underlying node graph alive across garbage collections: one retain on
//! construction, one release on drop. Raw [`Edge`] values are for transient
//! use inside a single expression; anything stored across operations should
//! be held through a `Func`.

use std::fmt::{Debug, Display, Formatter};

use crate::bdd::Bdd;
use crate::edge::Edge;

pub struct Func<'a> {
    bdd: &'a Bdd,
    edge: Edge,
}

impl Bdd {
    /// Wraps `edge` in an owning handle.
    pub fn func(&self, edge: Edge) -> Func<'_> {
        Func::new(self, edge)
    }
}

impl<'a> Func<'a> {
    pub fn new(bdd: &'a Bdd, edge: Edge) -> Self {
        bdd.retain(edge);
        Self { bdd, edge }
    }

    /// The underlying edge.
    pub fn edge(&self) -> Edge {
        self.edge
    }

    /// Rebinds this handle to `edge`.
    ///
    /// The new target is retained before the old one is released, so
    /// rebinding a handle to its own edge is a no-op.
    pub fn set(&mut self, edge: Edge) {
        self.bdd.retain(edge);
        self.bdd.release(self.edge);
        self.edge = edge;
    }

    pub fn is_zero(&self) -> bool {
        self.edge.is_zero()
    }
    pub fn is_one(&self) -> bool {
        self.edge.is_one()
    }
    pub fn is_invalid(&self) -> bool {
        self.edge.is_invalid()
    }

    fn check_manager(&self, other: &Func<'a>) {
        assert!(
            std::ptr::eq(self.bdd, other.bdd),
            "Functions belong to different managers"
        );
    }

    pub fn and(&self, other: &Func<'a>) -> Func<'a> {
        self.check_manager(other);
        Func::new(self.bdd, self.bdd.and_op(self.edge, other.edge))
    }

    pub fn or(&self, other: &Func<'a>) -> Func<'a> {
        self.check_manager(other);
        Func::new(self.bdd, self.bdd.or_op(self.edge, other.edge))
    }

    pub fn xor(&self, other: &Func<'a>) -> Func<'a> {
        self.check_manager(other);
        Func::new(self.bdd, self.bdd.xor_op(self.edge, other.edge))
    }

    pub fn ite(&self, then: &Func<'a>, otherwise: &Func<'a>) -> Func<'a> {
        self.check_manager(then);
        self.check_manager(otherwise);
        Func::new(
            self.bdd,
            self.bdd.ite_op(self.edge, then.edge, otherwise.edge),
        )
    }

    pub fn complement(&self) -> Func<'a> {
        Func::new(self.bdd, -self.edge)
    }
}

impl Clone for Func<'_> {
    fn clone(&self) -> Self {
        Func::new(self.bdd, self.edge)
    }
}

impl Drop for Func<'_> {
    fn drop(&mut self) {
        self.bdd.release(self.edge);
    }
}

impl PartialEq for Func<'_> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.bdd, other.bdd) && self.edge == other.edge
    }
}
impl Eq for Func<'_> {}

impl Debug for Func<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Func").field("edge", &self.edge).finish()
    }
}

impl Display for Func<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        Display::fmt(&self.edge, f)
    }
}

#[cfg(test)]
mod tests {
    use test_log::test;

    use super::*;
    use crate::types::VarId;

    #[test]
    fn test_handle_keeps_function_alive() {
        let bdd = Bdd::new();
        let x1 = bdd.make_posiliteral(VarId::new(1));
        let x2 = bdd.make_posiliteral(VarId::new(2));

        let f = bdd.func(bdd.and_op(x1, x2));
        bdd.gc(false);
        assert!(!bdd.check_noref(f.edge()));
        assert_eq!(bdd.support(f.edge()), vec![VarId::new(1), VarId::new(2)]);
    }

    #[test]
    fn test_drop_releases() {
        let bdd = Bdd::new();
        let x = bdd.make_posiliteral(VarId::new(1));

        {
            let _f = bdd.func(x);
            bdd.gc(false);
            assert_eq!(bdd.node_count(), 1);
        }
        // The handle is gone; the node is garbage now.
        bdd.gc(false);
        assert_eq!(bdd.node_count(), 0);
    }

    #[test]
    fn test_clone_counts_separately() {
        let bdd = Bdd::new();
        let x = bdd.make_posiliteral(VarId::new(1));

        let f = bdd.func(x);
        let g = f.clone();
        drop(f);
        bdd.gc(false);
        // The clone still pins the node.
        assert_eq!(bdd.node_count(), 1);
        drop(g);
        bdd.gc(false);
        assert_eq!(bdd.node_count(), 0);
    }

    #[test]
    fn test_rebind_to_self_is_safe() {
        let bdd = Bdd::new();
        let x = bdd.make_posiliteral(VarId::new(1));

        let mut f = bdd.func(x);
        f.set(f.edge());
        bdd.gc(false);
        assert_eq!(bdd.node_count(), 1);
        assert!(!bdd.check_noref(f.edge()));
    }

    #[test]
    fn test_rebind_releases_old_target() {
        let bdd = Bdd::new();
        let x1 = bdd.make_posiliteral(VarId::new(1));
        let x2 = bdd.make_posiliteral(VarId::new(2));

        let mut f = bdd.func(x1);
        f.set(x2);
        bdd.gc(false);
        // Only the new target survives.
        assert_eq!(bdd.node_count(), 1);
        assert_eq!(f.edge(), x2);
    }

    #[test]
    fn test_combinators_return_owned_handles() {
        let bdd = Bdd::new();
        let x = bdd.func(bdd.make_posiliteral(VarId::new(1)));
        let y = bdd.func(bdd.make_posiliteral(VarId::new(2)));

        let f = x.and(&y);
        let g = y.and(&x);
        assert_eq!(f, g);

        let h = f.xor(&bdd.func(Edge::ONE));
        assert_eq!(h, f.complement());

        drop((f, g, h, x, y));
        bdd.gc(false);
        assert_eq!(bdd.node_count(), 0);
    }
}
