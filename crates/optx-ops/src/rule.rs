//! # Rule System
//!
//! This module defines the rule trait and rule registry that rewrite operator
//! trees.
//!
//! ## Rule Types
//!
//! There are two kinds of optimization rules:
//!
//! - **Transformation rules** (`RuleType::Transformation`): Rewrite a logical
//!   tree into an equivalent logical tree, for example join commutativity
//!   (A JOIN B -> B JOIN A) or pushing a predicate below a projection. Scalar
//!   simplifications (folding a statically NULL subtree) are transformations
//!   too.
//!
//! - **Implementation rules** (`RuleType::Implementation`): Map a logical
//!   operator to one or more physical operators. A logical join may become a
//!   hash join with either build side, or a nested loop join.
//!
//! ## Pattern Matching
//!
//! Each rule declares a `Pattern` describing the shape it rewrites.
//! [`apply_rule`] checks the pattern before calling `apply`, so rules may rely
//! on the declared shape.
//!
//! ## Results
//!
//! `apply` returns the alternatives it produced, each a complete new tree built
//! through the same constructors as any other tree: a rule cannot yield a node
//! with the wrong arity, and a rule that produces nothing returns an empty
//! vector. Errors (an unknown metadata id, say) abort the application and are
//! reported to the caller.
//!
//! ## Rule Deduplication
//!
//! Each rule has a `rule_hash()` fingerprint so a search driver can record
//! which rules already fired on an expression.

use crate::builder::ExprBuilder;
use crate::catalog::MetadataProvider;
use crate::config::ExprConfig;
use crate::error::Result;
use crate::expr::Expr;
use crate::pattern::{self, Pattern};
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use tracing::trace;

/// Classification of optimization rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleType {
    /// Logical -> Logical transformation (e.g., join commutativity).
    Transformation,
    /// Logical -> Physical implementation (e.g., join -> hash join).
    Implementation,
}

/// Context passed to rules during application.
pub struct OptContext<'a> {
    pub provider: &'a dyn MetadataProvider,
    pub config: ExprConfig,
}

impl<'a> OptContext<'a> {
    pub fn new(provider: &'a dyn MetadataProvider) -> Self {
        Self {
            provider,
            config: ExprConfig::default(),
        }
    }

    /// Builder for new nodes, bound to this context's provider and limits.
    pub fn builder(&self) -> ExprBuilder<'a> {
        ExprBuilder::new(self.provider).with_config(self.config.clone())
    }
}

/// A rule transforms or implements expressions.
pub trait Rule: Send + Sync {
    /// Unique name of this rule.
    fn name(&self) -> &str;

    /// Whether this rule is a transformation or implementation rule.
    fn rule_type(&self) -> RuleType;

    /// Pattern that this rule matches against.
    fn pattern(&self) -> Pattern;

    /// Apply the rule to a matching expression, producing alternatives.
    fn apply(&self, expr: &Expr, ctx: &OptContext) -> Result<Vec<Expr>>;

    /// Hash for fingerprinting (to avoid re-applying rules).
    fn rule_hash(&self) -> u64 {
        let mut hasher = DefaultHasher::new();
        self.name().hash(&mut hasher);
        hasher.finish()
    }
}

/// Apply `rule` to `expr` if its pattern matches; otherwise produce nothing.
pub fn apply_rule(rule: &dyn Rule, expr: &Expr, ctx: &OptContext) -> Result<Vec<Expr>> {
    if !pattern::matches(expr, &rule.pattern()) {
        return Ok(Vec::new());
    }
    let results = rule.apply(expr, ctx)?;
    trace!(
        "Rule {} produced {} alternatives for {}",
        rule.name(),
        results.len(),
        expr.name()
    );
    Ok(results)
}

/// Registry of optimization rules.
pub struct RuleRegistry {
    rules: Vec<Box<dyn Rule>>,
}

impl RuleRegistry {
    pub fn new() -> Self {
        Self { rules: Vec::new() }
    }

    pub fn add_rule(&mut self, rule: Box<dyn Rule>) {
        self.rules.push(rule);
    }

    pub fn rules(&self) -> impl Iterator<Item = &dyn Rule> {
        self.rules.iter().map(|r| r.as_ref())
    }

    pub fn find(&self, name: &str) -> Option<&dyn Rule> {
        self.rules().find(|r| r.name() == name)
    }

    /// Get all transformation rules.
    pub fn transformation_rules(&self) -> Vec<&dyn Rule> {
        self.rules()
            .filter(|r| r.rule_type() == RuleType::Transformation)
            .collect()
    }

    /// Get all implementation rules.
    pub fn implementation_rules(&self) -> Vec<&dyn Rule> {
        self.rules()
            .filter(|r| r.rule_type() == RuleType::Implementation)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

impl Default for RuleRegistry {
    fn default() -> Self {
        Self::new()
    }
}
