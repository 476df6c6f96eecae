//! The BDD manager: hash-consed node construction, reference counting, and
//! garbage collection.
//!
//! All nodes live in per-variable hash tables and every construction goes
//! through [`Bdd::new_node`], which enforces the ROBDD invariants:
//!
//! - **Reduction**: a request with equal children returns the child, no node
//!   is created.
//! - **Canonicity**: at most one node exists per `(variable, edge0, edge1)`
//!   triple; complements are polarity bits on edges, never separate nodes.
//!   The stored 1-edge is never complemented, which fixes the representative
//!   between a function and its negation.
//! - **Ordering**: a node's variable sits strictly above the top variables
//!   of its children.
//!
//! Reference counts are exact: [`Bdd::retain`] / [`Bdd::release`] count root
//! references, and a node's count additionally includes one reference per
//! referenced parent (children are locked when a node's count goes 0 to 1 and
//! unlocked on the way back). A count of zero therefore means "unreachable
//! from any live root", and collection is a plain sweep over the tables with
//! no marking phase. Dropping to zero does not free anything by itself; the
//! node merely becomes eligible for the next sweep.
//!
//! The manager is single-threaded; every operation runs to completion on the
//! calling thread.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::fmt::Debug;

use log::{debug, trace};

use crate::arena::{NodeArena, NODE_CHUNK};
use crate::cache::Cache;
use crate::config::BddConfig;
use crate::edge::Edge;
use crate::node::Node;
use crate::ops::OpKey;
use crate::types::{Level, VarId};
use crate::variable::Variable;

pub struct Bdd {
    config: RefCell<BddConfig>,
    arena: RefCell<NodeArena>,
    /// Variables indexed by slot (creation order).
    vars: RefCell<Vec<Variable>>,
    /// Variable id to slot.
    var_map: RefCell<HashMap<VarId, u32>>,
    /// Level to slot; levels are assigned in creation order.
    order: RefCell<Vec<u32>>,
    pub(crate) cache: RefCell<Cache<OpKey, Edge>>,
    node_num: Cell<usize>,
    garbage_num: Cell<usize>,
    gc_runs: Cell<usize>,
    /// Nesting counter; automatic collection runs only at zero (unless the
    /// danger-zone reserve is breached).
    gc_disable: Cell<u32>,
}

impl Bdd {
    pub fn new() -> Self {
        Self::with_config(BddConfig::default())
    }

    pub fn with_config(config: BddConfig) -> Self {
        let cache = Cache::new(16, config.rt_load_limit);
        Self {
            config: RefCell::new(config),
            arena: RefCell::new(NodeArena::new()),
            vars: RefCell::new(Vec::new()),
            var_map: RefCell::new(HashMap::new()),
            order: RefCell::new(Vec::new()),
            cache: RefCell::new(cache),
            node_num: Cell::new(0),
            garbage_num: Cell::new(0),
            gc_runs: Cell::new(0),
            gc_disable: Cell::new(0),
        }
    }

    /// A copy of the current configuration.
    pub fn config(&self) -> BddConfig {
        *self.config.borrow()
    }

    pub fn set_gc_threshold(&self, gc_threshold: f64) {
        self.config.borrow_mut().gc_threshold = gc_threshold;
    }
    pub fn set_node_limit(&self, node_limit: usize) {
        self.config.borrow_mut().node_limit = node_limit;
    }
    pub fn set_nt_load_limit(&self, nt_load_limit: f64) {
        self.config.borrow_mut().nt_load_limit = nt_load_limit;
        for var in self.vars.borrow_mut().iter_mut() {
            var.set_next_limit(nt_load_limit);
        }
    }
    pub fn set_rt_load_limit(&self, rt_load_limit: f64) {
        self.config.borrow_mut().rt_load_limit = rt_load_limit;
        self.cache.borrow_mut().set_load_limit(rt_load_limit);
    }
    pub fn set_mem_limit(&self, mem_limit: usize) {
        self.config.borrow_mut().mem_limit = mem_limit;
    }
    pub fn set_dzone(&self, dzone: usize) {
        self.config.borrow_mut().dzone = dzone;
    }
}

impl Default for Bdd {
    fn default() -> Self {
        Bdd::new()
    }
}

impl Debug for Bdd {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Bdd")
            .field("vars", &self.var_count())
            .field("nodes", &self.node_num.get())
            .field("garbage", &self.garbage_num.get())
            .field("used_mem", &self.used_mem())
            .finish()
    }
}

// Variables and the order table.
impl Bdd {
    fn alloc_var(&self, id: VarId) -> u32 {
        let load_limit = self.config.borrow().nt_load_limit;
        let mut vars = self.vars.borrow_mut();
        let mut order = self.order.borrow_mut();
        let slot = vars.len() as u32;
        // New variables go below every existing one.
        let level = Level::new(order.len());
        vars.push(Variable::new(id, level, load_limit));
        order.push(slot);
        self.var_map.borrow_mut().insert(id, slot);
        slot
    }

    /// Registers a variable at the bottom of the order.
    ///
    /// Returns `false` if the variable already exists.
    pub fn new_var(&self, id: VarId) -> bool {
        if self.slot_of(id).is_some() {
            return false;
        }
        self.alloc_var(id);
        true
    }

    pub(crate) fn slot_of(&self, id: VarId) -> Option<u32> {
        self.var_map.borrow().get(&id).copied()
    }

    pub(crate) fn ensure_var(&self, id: VarId) -> u32 {
        self.slot_of(id).unwrap_or_else(|| self.alloc_var(id))
    }

    pub fn var_count(&self) -> usize {
        self.vars.borrow().len()
    }

    /// The level of a registered variable.
    pub fn level(&self, id: VarId) -> Option<Level> {
        let vars = self.vars.borrow();
        self.slot_of(id).map(|slot| vars[slot as usize].level())
    }

    /// All registered variables in ascending level order.
    pub fn var_list(&self) -> Vec<VarId> {
        let vars = self.vars.borrow();
        self.order
            .borrow()
            .iter()
            .map(|&slot| vars[slot as usize].id())
            .collect()
    }
}

// Edge construction and structure queries.
impl Bdd {
    /// The constant 1 function.
    pub fn make_one(&self) -> Edge {
        Edge::ONE
    }

    /// The constant 0 function.
    pub fn make_zero(&self) -> Edge {
        Edge::ZERO
    }

    /// The positive literal of `id`, registering the variable on demand.
    pub fn make_posiliteral(&self, id: VarId) -> Edge {
        let slot = self.ensure_var(id);
        self.make_node(slot, Edge::ZERO, Edge::ONE)
    }

    /// The negative literal of `id`.
    pub fn make_negaliteral(&self, id: VarId) -> Edge {
        -self.make_posiliteral(id)
    }

    /// Builds the canonical edge for `ITE(id, e1, e0)`.
    ///
    /// Registers the variable on demand. Returns `ERROR`/`OVERFLOW` when an
    /// input carries one, or `OVERFLOW` when the node population or memory
    /// budget is exhausted even after one collection attempt.
    pub fn new_node(&self, id: VarId, e0: Edge, e1: Edge) -> Edge {
        let slot = self.ensure_var(id);
        self.make_node(slot, e0, e1)
    }

    pub(crate) fn make_node(&self, slot: u32, e0: Edge, e1: Edge) -> Edge {
        if e0 == e1 {
            return e0;
        }
        if e0.is_error() || e1.is_error() {
            return Edge::ERROR;
        }
        if e0.is_overflow() || e1.is_overflow() {
            return Edge::OVERFLOW;
        }

        // Normalize so the stored 1-edge is never complemented; the
        // complement moves onto the returned edge.
        let negated = e1.is_negated();
        let e0 = e0.with_pol(negated);
        let e1 = e1.with_pol(negated);

        debug_assert!(
            self.level_of_slot(slot) < self.edge_level(e0)
                && self.level_of_slot(slot) < self.edge_level(e1),
            "Variable order violated"
        );

        trace!("make_node(slot = {}, e0 = {}, e1 = {})", slot, e0, e1);

        let found = {
            let arena = self.arena.borrow();
            let vars = self.vars.borrow();
            vars[slot as usize].find(&arena, e0, e1)
        };
        if let Some(index) = found {
            return Edge::to_node(index, negated);
        }

        if !self.reserve_node(e0, e1) {
            return Edge::OVERFLOW;
        }

        let index = {
            let mut arena = self.arena.borrow_mut();
            let mut vars = self.vars.borrow_mut();
            let index = arena.alloc(Node::new(slot, e0, e1));
            vars[slot as usize].insert(&mut arena, index);
            index
        };
        self.node_num.set(self.node_num.get() + 1);
        // Fresh nodes are garbage until someone retains them.
        self.garbage_num.set(self.garbage_num.get() + 1);

        self.maybe_grow_table(slot);

        Edge::to_node(index, negated)
    }

    /// Makes room for one node within the configured limits.
    ///
    /// When the node population or memory budget is exhausted, one
    /// collection is attempted (with the children pinned, since they may be
    /// unreferenced intermediates) before reporting failure. The attempt is
    /// skipped while automatic collection is disabled; recursive operations
    /// rely on that to keep their intermediate results alive.
    fn reserve_node(&self, e0: Edge, e1: Edge) -> bool {
        let over = || {
            let config = self.config.borrow();
            let over_nodes = self.node_num.get() >= config.node_limit;
            let over_mem = {
                let arena = self.arena.borrow();
                arena.needs_chunk()
                    && self.used_mem() + NODE_CHUNK * std::mem::size_of::<Node>()
                        > config.mem_limit
            };
            over_nodes || over_mem
        };

        if over() && self.gc_disable.get() == 0 {
            self.retain(e0);
            self.retain(e1);
            self.gc(false);
            self.release_quiet(e0);
            self.release_quiet(e1);
        }
        if over() {
            return false;
        }

        let mut arena = self.arena.borrow_mut();
        if arena.needs_chunk() {
            arena.grow_chunk();
        }
        true
    }

    fn maybe_grow_table(&self, slot: u32) {
        let (new_size, delta_bytes, load_limit) = {
            let vars = self.vars.borrow();
            let var = &vars[slot as usize];
            if !var.needs_grow() {
                return;
            }
            let new_size = var.table_size() * 2;
            (
                new_size,
                (new_size - var.table_size()) * std::mem::size_of::<u32>(),
                self.config.borrow().nt_load_limit,
            )
        };
        if self.used_mem() + delta_bytes > self.config.borrow().mem_limit {
            // Soft failure: keep working with the overloaded table.
            debug!("table resize skipped: memory budget exhausted");
            return;
        }
        let mut arena = self.arena.borrow_mut();
        let mut vars = self.vars.borrow_mut();
        vars[slot as usize].resize(&mut arena, new_size, load_limit);
    }

    /// The variable at the root of `e`, if `e` is not a constant/sentinel.
    pub fn root_var(&self, e: Edge) -> Option<VarId> {
        let index = e.index();
        if index == 0 {
            return None;
        }
        let arena = self.arena.borrow();
        let vars = self.vars.borrow();
        Some(vars[arena.node(index).var() as usize].id())
    }

    /// The 0-cofactor seen through `e` (constants and sentinels return
    /// themselves).
    pub fn edge0(&self, e: Edge) -> Edge {
        let index = e.index();
        if index == 0 {
            return e;
        }
        self.arena.borrow().node(index).edge0_with(e.is_negated())
    }

    /// The 1-cofactor seen through `e`.
    pub fn edge1(&self, e: Edge) -> Edge {
        let index = e.index();
        if index == 0 {
            return e;
        }
        self.arena.borrow().node(index).edge1_with(e.is_negated())
    }

    /// Whether the node under `e` is unreferenced (false for terminals).
    pub fn check_noref(&self, e: Edge) -> bool {
        let index = e.index();
        index != 0 && self.arena.borrow().node(index).refmark.noref()
    }

    pub(crate) fn edge_level(&self, e: Edge) -> Level {
        let index = e.index();
        if index == 0 {
            return Level::BOTTOM;
        }
        let arena = self.arena.borrow();
        let vars = self.vars.borrow();
        vars[arena.node(index).var() as usize].level()
    }

    pub(crate) fn edge_var_slot(&self, e: Edge) -> u32 {
        debug_assert_ne!(e.index(), 0, "Terminal edges have no variable");
        self.arena.borrow().node(e.index()).var()
    }

    fn level_of_slot(&self, slot: u32) -> Level {
        self.vars.borrow()[slot as usize].level()
    }

    /// The conjunction of the given non-zero DIMACS-style literals.
    pub fn cube(&self, literals: impl IntoIterator<Item = i32>) -> Edge {
        let mut literals = self.sort_literals(literals);
        debug!("cube(literals = {:?})", literals);
        literals.reverse();
        let mut current = Edge::ONE;
        for (slot, negated) in literals {
            current = if negated {
                self.make_node(slot, current, Edge::ZERO)
            } else {
                self.make_node(slot, Edge::ZERO, current)
            };
        }
        current
    }

    /// The disjunction of the given non-zero DIMACS-style literals.
    pub fn clause(&self, literals: impl IntoIterator<Item = i32>) -> Edge {
        let mut literals = self.sort_literals(literals);
        debug!("clause(literals = {:?})", literals);
        literals.reverse();
        let mut current = Edge::ZERO;
        for (slot, negated) in literals {
            current = if negated {
                self.make_node(slot, Edge::ONE, current)
            } else {
                self.make_node(slot, current, Edge::ONE)
            };
        }
        current
    }

    /// Resolves literals to variable slots and sorts them by level.
    fn sort_literals(&self, literals: impl IntoIterator<Item = i32>) -> Vec<(u32, bool)> {
        let mut resolved: Vec<(u32, bool)> = literals
            .into_iter()
            .map(|lit| {
                assert_ne!(lit, 0, "Literals must be non-zero");
                (self.ensure_var(VarId::new(lit.unsigned_abs())), lit < 0)
            })
            .collect();
        let vars = self.vars.borrow();
        resolved.sort_by_key(|&(slot, _)| vars[slot as usize].level());
        resolved
    }
}

// Reference counting and garbage collection.
impl Bdd {
    /// Adds one root reference to `e`'s node.
    ///
    /// Pairs with exactly one [`Bdd::release`]. When a node's count rises
    /// from zero, its children gain one reference each, recursively.
    pub fn retain(&self, e: Edge) {
        let mut arena = self.arena.borrow_mut();
        self.activate(&mut arena, e);
    }

    /// Removes one root reference from `e`'s node and opportunistically
    /// collects garbage when the configured thresholds are crossed.
    pub fn release(&self, e: Edge) {
        {
            let mut arena = self.arena.borrow_mut();
            self.deactivate(&mut arena, e);
        }
        self.maybe_gc();
    }

    /// `release` without the collection check; used where a sweep must not
    /// run (e.g. while pinning inputs inside the allocator).
    pub(crate) fn release_quiet(&self, e: Edge) {
        let mut arena = self.arena.borrow_mut();
        self.deactivate(&mut arena, e);
    }

    fn activate(&self, arena: &mut NodeArena, e: Edge) {
        let index = e.index();
        if index == 0 {
            return;
        }
        if arena.node_mut(index).refmark.inc() == 1 {
            // First reference: no longer garbage; lock the children.
            self.garbage_num.set(self.garbage_num.get() - 1);
            let (e0, e1) = {
                let node = arena.node(index);
                (node.edge0(), node.edge1())
            };
            self.activate(arena, e0);
            self.activate(arena, e1);
        }
    }

    fn deactivate(&self, arena: &mut NodeArena, e: Edge) {
        let index = e.index();
        if index == 0 {
            return;
        }
        if arena.node_mut(index).refmark.dec() == 0 {
            self.garbage_num.set(self.garbage_num.get() + 1);
            let (e0, e1) = {
                let node = arena.node(index);
                (node.edge0(), node.edge1())
            };
            self.deactivate(arena, e0);
            self.deactivate(arena, e1);
        }
    }

    fn maybe_gc(&self) {
        let (allowed, node_limit, gc_threshold) = {
            let config = self.config.borrow();
            (
                self.gc_disable.get() == 0
                    || self.used_mem() + config.dzone > config.mem_limit,
                config.node_limit,
                config.gc_threshold,
            )
        };
        let node_num = self.node_num.get();
        if allowed
            && node_num > node_limit
            && self.garbage_num.get() > (node_num as f64 * gc_threshold) as usize
        {
            self.gc(false);
        }
    }

    /// Sweeps every unreferenced node out of every variable's table.
    ///
    /// Referenced nodes are left untouched, so any function reachable from a
    /// retained edge survives unchanged. Freed slots go to the free list for
    /// reuse. With `shrink_tables`, each table is shrunk afterwards if its
    /// occupancy allows.
    pub fn gc(&self, shrink_tables: bool) {
        debug!(
            "gc begin: nodes = {}, garbage = {}",
            self.node_num.get(),
            self.garbage_num.get()
        );

        // The computed table must not hold edges into freed slots.
        {
            let arena = self.arena.borrow();
            let alive =
                |e: Edge| e.index() == 0 || !arena.node(e.index()).refmark.noref();
            self.cache
                .borrow_mut()
                .sweep(|key, &result| key.edges().into_iter().all(alive) && alive(result));
        }

        let freed = {
            let mut arena = self.arena.borrow_mut();
            let mut vars = self.vars.borrow_mut();
            let mut freed = 0;
            for &slot in self.order.borrow().iter() {
                freed += vars[slot as usize].sweep(&mut arena);
            }
            freed
        };

        debug_assert_eq!(freed, self.garbage_num.get());
        self.node_num.set(self.node_num.get() - freed);
        self.garbage_num.set(0);
        self.gc_runs.set(self.gc_runs.get() + 1);

        if shrink_tables {
            let load_limit = self.config.borrow().nt_load_limit;
            let mut arena = self.arena.borrow_mut();
            let mut vars = self.vars.borrow_mut();
            for &slot in self.order.borrow().iter() {
                vars[slot as usize].shrink(&mut arena, load_limit);
            }
        }

        debug!("gc end: {} nodes freed", freed);
    }

    /// Suspends automatic collection; nestable.
    pub fn disable_gc(&self) {
        self.gc_disable.set(self.gc_disable.get() + 1);
    }

    /// Re-enables automatic collection after a matching [`Bdd::disable_gc`].
    pub fn enable_gc(&self) {
        let disable = self.gc_disable.get();
        assert!(disable > 0, "enable_gc without a matching disable_gc");
        self.gc_disable.set(disable - 1);
    }
}

// Statistics.
impl Bdd {
    /// Nodes currently stored across all variable tables.
    pub fn node_count(&self) -> usize {
        self.node_num.get()
    }

    /// Stored nodes that are unreferenced (eligible for the next sweep).
    pub fn garbage_count(&self) -> usize {
        self.garbage_num.get()
    }

    /// Freed node slots available for reuse.
    pub fn free_count(&self) -> usize {
        self.arena.borrow().free_num()
    }

    /// Number of collections run so far.
    pub fn gc_runs(&self) -> usize {
        self.gc_runs.get()
    }

    /// Bytes held by node storage and all tables.
    pub fn used_mem(&self) -> usize {
        let arena = self.arena.borrow();
        let vars = self.vars.borrow();
        let cache = self.cache.borrow();
        arena.mem_bytes()
            + vars.iter().map(|v| v.mem_bytes()).sum::<usize>()
            + cache.mem_bytes()
    }

    pub(crate) fn with_arena<R>(&self, f: impl FnOnce(&mut NodeArena) -> R) -> R {
        f(&mut self.arena.borrow_mut())
    }

    pub(crate) fn var_id_of_slot(&self, slot: u32) -> VarId {
        self.vars.borrow()[slot as usize].id()
    }
}
