//! The token registry.
//!
//! Maps lowercased token names to descriptors. Lookup is case-insensitive;
//! the canonical camelCase names are kept on the descriptors themselves.
//! A registry is built once and then shared immutably through `Arc`
//! snapshots, so an in-flight fill keeps the set of tokens it started with
//! even while the engine rebuilds.

use std::collections::HashMap;
use std::sync::Arc;

use crate::errors::TemplateError;
use crate::tokens::custom::{parse_custom_tokens, CustomEvaluatorFn, CustomToken};
use crate::tokens::Token;

#[derive(Debug, Default, Clone)]
pub struct TokenRegistry {
    tokens: HashMap<String, Arc<Token>>,
}

impl TokenRegistry {
    /// An empty registry. Most callers want [`TokenRegistry::builtins`].
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding the full built-in token set.
    pub fn builtins() -> Self {
        let mut registry = Self::new();
        for token in Token::builtins() {
            registry.register(token);
        }
        registry
    }

    /// Registers a descriptor under its lowercased name. A later
    /// registration of the same name replaces the earlier one.
    pub fn register(&mut self, token: Token) {
        self.tokens
            .insert(token.name().to_lowercase(), Arc::new(token));
    }

    /// Registers a function-backed custom token. Unlike source-loaded
    /// tokens this runs arbitrary code, so it is only reachable from the
    /// embedding application, never from user-provided token source.
    pub fn register_custom_fn(&mut self, name: impl Into<String>, evaluator: CustomEvaluatorFn) {
        self.register(Token::Custom(CustomToken::from_fn(name, evaluator)));
    }

    /// Replaces the full contents: built-ins plus the custom tokens parsed
    /// from `custom_source`. On a parse error the registry is left with the
    /// built-ins only, so templates keep working with a stale custom set.
    pub fn rebuild(&mut self, custom_source: &str) -> Result<(), TemplateError> {
        self.tokens.clear();
        for token in Token::builtins() {
            self.register(token);
        }
        if custom_source.trim().is_empty() {
            return Ok(());
        }
        match parse_custom_tokens(custom_source) {
            Ok(customs) => {
                for custom in customs {
                    self.register(Token::Custom(custom));
                }
                Ok(())
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to parse custom token source");
                Err(e)
            }
        }
    }

    pub fn lookup(&self, name: &str) -> Option<Arc<Token>> {
        self.tokens.get(&name.to_lowercase()).cloned()
    }

    pub fn is_registered(&self, name: &str) -> bool {
        self.tokens.contains_key(&name.to_lowercase())
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Canonical names of every registered token, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .tokens
            .values()
            .map(|t| t.name().to_string())
            .collect();
        names.sort();
        names
    }
}
