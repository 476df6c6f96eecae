//! Manager tunables.

/// 1 KiB.
const K_UNIT: usize = 1 << 10;
/// 1 MiB.
const M_UNIT: usize = 1 << 20;

/// Resource limits and load factors for a [`Bdd`](crate::bdd::Bdd) manager.
///
/// Fixed at construction via [`Bdd::with_config`](crate::bdd::Bdd::with_config)
/// and adjustable afterwards only through the manager's setter methods.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct BddConfig {
    /// Automatic GC runs once the garbage fraction exceeds this.
    pub gc_threshold: f64,
    /// Node-count limit: below it, releases never trigger a GC; above it,
    /// `new_node` collects once and then reports overflow rather than grow
    /// the node population further.
    pub node_limit: usize,
    /// Node-table growth factor: a variable's table doubles once its node
    /// count exceeds `table_size * nt_load_limit`.
    pub nt_load_limit: f64,
    /// Computed-table growth factor.
    pub rt_load_limit: f64,
    /// Memory budget in bytes for node storage and all tables.
    pub mem_limit: usize,
    /// Danger-zone byte reserve: once `used_mem + dzone` exceeds
    /// `mem_limit`, automatic GC ignores `disable_gc`.
    pub dzone: usize,
}

impl Default for BddConfig {
    fn default() -> Self {
        Self {
            gc_threshold: 0.10,
            node_limit: 64 * K_UNIT,
            nt_load_limit: 2.0,
            rt_load_limit: 0.8,
            mem_limit: 400 * M_UNIT,
            dzone: 10 * M_UNIT,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = BddConfig::default();
        assert_eq!(config.gc_threshold, 0.10);
        assert_eq!(config.node_limit, 65536);
        assert_eq!(config.nt_load_limit, 2.0);
        assert_eq!(config.rt_load_limit, 0.8);
        assert_eq!(config.mem_limit, 400 << 20);
        assert_eq!(config.dzone, 10 << 20);
    }
}
