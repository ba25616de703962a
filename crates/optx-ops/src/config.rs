//! Expression-construction configuration.
//!
//! Loaded from whatever configuration source the embedding optimizer uses
//! (`serde` deserialization); every field has a default so partial documents
//! are accepted.

use crate::expr::RECURSION_LIMIT;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExprConfig {
    /// Maximum depth of a tree built through [`ExprBuilder`](crate::builder::ExprBuilder).
    /// Values above [`RECURSION_LIMIT`] are capped.
    pub max_depth: usize,
}

impl Default for ExprConfig {
    fn default() -> Self {
        Self {
            max_depth: RECURSION_LIMIT,
        }
    }
}

impl ExprConfig {
    /// The depth limit actually enforced.
    pub fn effective_max_depth(&self) -> usize {
        self.max_depth.min(RECURSION_LIMIT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_document_uses_defaults() {
        let cfg: ExprConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(cfg, ExprConfig::default());

        let cfg: ExprConfig = serde_json::from_str(r#"{"max_depth": 1000000}"#).unwrap();
        assert_eq!(cfg.effective_max_depth(), RECURSION_LIMIT);
    }
}
