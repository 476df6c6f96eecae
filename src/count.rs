//! Minterm counting.

use std::collections::HashMap;

use num_bigint::BigUint;

use crate::bdd::Bdd;
use crate::edge::Edge;

impl Bdd {
    /// Number of minterms of `e` over a space of `num_vars` variables.
    ///
    /// Counts are exact at any width thanks to arbitrary precision. The
    /// complement bit costs nothing extra: the count under a negated edge is
    /// the complement against the full space, memoized per node.
    ///
    /// # Panics
    ///
    /// Panics on an `ERROR`/`OVERFLOW` edge; callers check sentinels first.
    pub fn minterm_count(&self, e: Edge, num_vars: u32) -> BigUint {
        assert!(!e.is_invalid(), "Cannot count an invalid edge");
        let max = BigUint::from(1u32) << num_vars;
        let mut cache = HashMap::new();
        self.mterm_step(e, &max, &mut cache)
    }

    fn mterm_step(&self, e: Edge, max: &BigUint, cache: &mut HashMap<u32, BigUint>) -> BigUint {
        if e.is_one() {
            return max.clone();
        }
        if e.is_zero() {
            return BigUint::ZERO;
        }

        let index = e.index();
        let count = if let Some(count) = cache.get(&index) {
            count.clone()
        } else {
            // Count through the plain (non-complemented) view of the node.
            let positive = e.with_pol(e.is_negated());
            let e0 = self.edge0(positive);
            let e1 = self.edge1(positive);
            let count: BigUint =
                (self.mterm_step(e0, max, cache) + self.mterm_step(e1, max, cache)) >> 1;
            cache.insert(index, count.clone());
            count
        };

        if e.is_negated() {
            max - count
        } else {
            count
        }
    }
}

#[cfg(test)]
mod tests {
    use test_log::test;

    use super::*;
    use crate::types::VarId;

    fn count(bdd: &Bdd, e: Edge, n: u32) -> u64 {
        let c = bdd.minterm_count(e, n);
        u64::try_from(c).expect("count fits in u64")
    }

    #[test]
    fn test_constants() {
        let bdd = Bdd::new();
        assert_eq!(count(&bdd, Edge::ONE, 3), 8);
        assert_eq!(count(&bdd, Edge::ZERO, 3), 0);
    }

    #[test]
    fn test_literals_and_combinations() {
        let bdd = Bdd::new();
        let x1 = bdd.make_posiliteral(VarId::new(1));
        let x2 = bdd.make_posiliteral(VarId::new(2));

        assert_eq!(count(&bdd, x1, 2), 2);
        assert_eq!(count(&bdd, -x1, 2), 2);
        assert_eq!(count(&bdd, bdd.and_op(x1, x2), 2), 1);
        assert_eq!(count(&bdd, bdd.or_op(x1, x2), 2), 3);
        assert_eq!(count(&bdd, bdd.xor_op(x1, x2), 2), 2);
    }

    #[test]
    fn test_complement_is_exact() {
        let bdd = Bdd::new();
        let f = bdd.cube([1, 2, -3]);
        let total = bdd.minterm_count(f, 5) + bdd.minterm_count(-f, 5);
        assert_eq!(total, BigUint::from(1u32) << 5);
    }

    #[test]
    fn test_wide_spaces() {
        let bdd = Bdd::new();
        let x1 = bdd.make_posiliteral(VarId::new(1));
        // Half of a 200-variable space; far beyond u64.
        assert_eq!(bdd.minterm_count(x1, 200), BigUint::from(1u32) << 199);
    }
}
