//! Hash mixes used by the node tables and the computed table.

/// Bucket mix for a per-variable node table keyed by two edges.
///
/// The low two bits of an edge code are tag bits, so the second operand is
/// shifted before mixing.
pub fn hash2(a: u64, b: u64) -> u64 {
    a.wrapping_add(b >> 2)
}

/// Bucket mix for keys with a third component (e.g. a variable id).
pub fn hash3(a: u64, b: u64, c: u64) -> u64 {
    a.wrapping_add(b >> 2).wrapping_add(c << 3).wrapping_sub(c)
}

/// [Szudzik pairing function][szudzik-pairing], wrapping on overflow.
///
/// ```text
/// (a, b) -> if (a<b) then (b^2 + a) else (a^2 + a + b)
/// ```
///
/// [szudzik-pairing]: https://en.wikipedia.org/wiki/Pairing_function
pub fn pairing2(a: u64, b: u64) -> u64 {
    if a < b {
        b.wrapping_mul(b).wrapping_add(a)
    } else {
        a.wrapping_mul(a).wrapping_add(a).wrapping_add(b)
    }
}

/// Pairing function for three `u64` values.
pub fn pairing3(a: u64, b: u64, c: u64) -> u64 {
    pairing2(pairing2(a, b), c)
}

pub trait MyHash {
    /// Hash function over the opaque integer encoding of the value.
    fn hash(&self) -> u64;
}

impl MyHash for (u64, u64) {
    fn hash(&self) -> u64 {
        pairing2(self.0, self.1)
    }
}

impl MyHash for (u64, u64, u64) {
    fn hash(&self) -> u64 {
        pairing3(self.0, self.1, self.2)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash2_spreads_pol_bit() {
        // The polarity bit of the first operand must reach the bucket index.
        assert_ne!(hash2(4, 8), hash2(5, 8));
    }

    #[test]
    fn test_pairing2() {
        // a\b  0  1  2  3  4
        // ------------------
        // 0    0  1  4  9 16
        // 1    2  3  5 10 17
        // 2    6  7  8 11 18
        assert_eq!(pairing2(0, 0), 0);
        assert_eq!(pairing2(0, 1), 1);
        assert_eq!(pairing2(1, 0), 2);
        assert_eq!(pairing2(1, 1), 3);
        assert_eq!(pairing2(0, 2), 4);
        assert_eq!(pairing2(1, 2), 5);
        assert_eq!(pairing2(2, 0), 6);
        assert_eq!(pairing2(2, 2), 8);
    }

    #[test]
    fn test_pairing3_distinct_on_permutations() {
        assert_ne!(pairing3(1, 2, 3), pairing3(3, 2, 1));
        assert_ne!(pairing3(1, 2, 3), pairing3(2, 1, 3));
    }
}
