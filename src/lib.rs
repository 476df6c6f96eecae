//! # robdd: Reduced Ordered Binary Decision Diagrams
//!
//! **`robdd`** is a manager-centric BDD library: a shared, hash-consed,
//! reference-counted node store with incremental garbage collection and
//! per-variable hash tables that grow and shrink with the node population.
//!
//! ## What is a BDD?
//!
//! A Binary Decision Diagram represents a boolean function as a directed
//! acyclic graph. For a fixed variable order the reduced form is
//! **canonical**: every function has exactly one representation, so
//! equivalence checking is pointer comparison. This library uses complement
//! edges, so a function and its negation also share every node.
//!
//! ## Key pieces
//!
//! - **[`bdd::Bdd`]**: the manager. All construction goes through it, which
//!   is what maintains canonicity and structural sharing.
//! - **[`edge::Edge`]**: a compact tagged reference, node index plus
//!   complement bit, with sentinel values for the constants and for the
//!   infectious `ERROR`/`OVERFLOW` conditions.
//! - **[`func::Func`]**: an owning handle. Raw edges are transient; a
//!   `Func` reference-counts its target so it survives garbage collection.
//! - **[`config::BddConfig`]**: resource limits (node count, memory,
//!   danger-zone reserve) and table load factors.
//!
//! ## Basic usage
//!
//! ```rust
//! use robdd::bdd::Bdd;
//! use robdd::types::VarId;
//!
//! let bdd = Bdd::new();
//!
//! let x1 = bdd.make_posiliteral(VarId::new(1));
//! let x2 = bdd.make_posiliteral(VarId::new(2));
//!
//! // f = x1 AND (NOT x2)
//! let f = bdd.and_op(x1, -x2);
//! assert!(!f.is_zero());
//!
//! // Keep f across collections with an owning handle.
//! let f = bdd.func(f);
//! bdd.gc(false);
//! assert_eq!(bdd.support(f.edge()), vec![VarId::new(1), VarId::new(2)]);
//! ```

pub mod arena;
pub mod bdd;
pub mod cache;
pub mod config;
pub mod count;
pub mod edge;
pub mod func;
pub mod litset;
pub mod node;
pub mod ops;
pub mod support;
pub mod types;
pub mod utils;
pub mod variable;
