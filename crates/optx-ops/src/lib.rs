//! # optx-ops: Operator and Expression Substrate
//!
//! This crate implements the operator taxonomy and expression trees that a
//! Cascades-style query optimizer rewrites. Everything the memo and the rules
//! need to know about a node (what it is, what it produces, how its children
//! relate, how NULLs flow through it, how to copy it under a column renaming)
//! is answered here, without the memo ever looking inside a payload.
//!
//! ## Module Overview
//!
//! - **`md`**: Metadata handles: counted shared pointers to catalog descriptors.
//! - **`catalog`**: The `MetadataProvider` trait and an in-memory provider.
//! - **`column`**: Column identifiers, column references and column maps.
//! - **`operator`**: The closed operator set (scalar, logical, physical) and its
//!   uniform capability interface.
//! - **`expr`**: Expression trees, with arity and depth checked at construction.
//! - **`structural`**: Structural hashing and order-aware matching.
//! - **`null`**: The null-propagation classifier.
//! - **`remap`**: The column-remapping copier.
//! - **`builder`**: Catalog-id based construction helpers.
//! - **`cse`**: Common-subexpression detection.
//! - **`explain`**: Indented plan dumps.
//! - **`pattern`** / **`rule`**: Declarative patterns and the rule trait.
//! - **`config`** / **`error`**: Construction limits and the error type.
//! - **`stack`**: Stack growth for the recursive walkers.

pub mod builder;
pub mod catalog;
pub mod column;
pub mod config;
pub mod cse;
pub mod error;
pub mod explain;
pub mod expr;
pub mod md;
pub mod null;
pub mod operator;
pub mod pattern;
pub mod remap;
pub mod rule;
pub mod stack;
pub mod structural;

pub use error::{OptError, Result};
pub use expr::{Expr, RECURSION_LIMIT};
