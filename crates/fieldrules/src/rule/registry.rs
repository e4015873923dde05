//! Rule registry and overload dispatch
//!
//! The registry maps rule names to their user-registered overloads and falls
//! back to the shared [`BuiltinRules`]. Dispatch picks an overload for a
//! concrete value in this order:
//!
//! 1. exactly one overload whose field type is the value's type (more than
//!    one is [`Error::AmbiguousRule`]);
//! 2. the first registered interface overload that accepts the value;
//! 3. the built-in overload for the value's type.
//!
//! Anything else is [`Error::RuleNotFound`] when the name is unknown
//! everywhere, or [`Error::RuleOverloadNotFound`] listing the types the
//! name does support.

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use parking_lot::RwLock;

use crate::error::Error;
use crate::reflect::Reflect;

use super::{BuiltinRules, Rule};

/// Thread-safe rule registry.
///
/// Reads (dispatch) take a shared lock; registration takes the write lock
/// briefly. Finish registration before sharing the registry with walks:
/// which overloads a concurrent pass sees is unspecified.
pub struct RuleRegistry {
    rules: RwLock<HashMap<String, Vec<Rule>>>,
    builtins: Arc<BuiltinRules>,
}

impl RuleRegistry {
    /// Creates a registry backed by the given built-in set.
    #[must_use]
    pub fn new(builtins: Arc<BuiltinRules>) -> Self {
        Self {
            rules: RwLock::new(HashMap::new()),
            builtins,
        }
    }

    /// Creates a registry backed by the shared standard built-ins.
    #[must_use]
    pub fn with_builtins() -> Self {
        Self::new(BuiltinRules::shared())
    }

    /// Creates a registry with no built-in fallback.
    #[must_use]
    pub fn without_builtins() -> Self {
        Self::new(Arc::new(BuiltinRules::empty()))
    }

    /// Registers an overload.
    ///
    /// Fails with [`Error::DuplicateRuleOverload`] when an overload with the
    /// same name and field type already exists. Built-ins are not checked; a
    /// user overload for a built-in type shadows it.
    pub fn add(&self, rule: Rule) -> Result<(), Error> {
        let mut rules = self.rules.write();
        let overloads = rules.entry(rule.name().to_owned()).or_default();
        if overloads
            .iter()
            .any(|existing| existing.field_type().same_type(rule.field_type()))
        {
            return Err(Error::DuplicateRuleOverload {
                rule: rule.name().to_owned(),
                type_name: rule.field_type().name().to_owned(),
            });
        }

        tracing::debug!(
            rule = rule.name(),
            field_type = rule.field_type().name(),
            interface = rule.field_type().is_interface(),
            "rule registered"
        );
        overloads.push(rule);
        Ok(())
    }

    /// Picks the overload of `name` for `value`.
    ///
    /// `None` stands for a missing value and is rejected with
    /// [`Error::InvalidValue`].
    pub fn resolve(&self, name: &str, value: Option<&dyn Reflect>) -> Result<Rule, Error> {
        let Some(value) = value else {
            return Err(Error::InvalidValue {
                rule: name.to_owned(),
                reason: "no value to validate".to_owned(),
            });
        };

        let rules = self.rules.read();
        let overloads = rules.get(name).map(Vec::as_slice).unwrap_or_default();

        let mut exact = overloads.iter().filter(|r| r.field_type().is_exact(value));
        match (exact.next(), exact.next()) {
            (Some(rule), None) => {
                tracing::trace!(rule = name, value_type = value.type_name(), "exact overload");
                return Ok(rule.clone());
            }
            (Some(_), Some(_)) => {
                return Err(Error::AmbiguousRule {
                    rule: name.to_owned(),
                    type_name: value.type_name().to_owned(),
                });
            }
            _ => {}
        }

        if let Some(rule) = overloads
            .iter()
            .find(|r| r.field_type().is_assignable(value))
        {
            tracing::trace!(
                rule = name,
                value_type = value.type_name(),
                field_type = rule.field_type().name(),
                "interface overload"
            );
            return Ok(rule.clone());
        }

        if let Some(rule) = self.builtins.get(name, value.value_type_id()) {
            tracing::trace!(rule = name, value_type = value.type_name(), "built-in overload");
            return Ok(rule.clone());
        }

        if overloads.is_empty() && !self.builtins.contains(name) {
            return Err(Error::RuleNotFound {
                rule: name.to_owned(),
            });
        }

        let available: BTreeSet<&str> = overloads
            .iter()
            .map(|r| r.field_type().name())
            .chain(self.builtins.type_names(name))
            .collect();
        Err(Error::RuleOverloadNotFound {
            rule: name.to_owned(),
            type_name: value.type_name().to_owned(),
            available: available.into_iter().map(str::to_owned).collect(),
        })
    }

    /// Resolves `name` for `value` and runs it.
    pub fn invoke(&self, name: &str, value: &dyn Reflect, params: &[String]) -> Result<(), Error> {
        self.resolve(name, Some(value))?.invoke(value, params)
    }

    /// Registered overloads of `name`, in registration order.
    #[must_use]
    pub fn overloads(&self, name: &str) -> Vec<Rule> {
        self.rules.read().get(name).cloned().unwrap_or_default()
    }

    /// Names with at least one user overload, sorted.
    #[must_use]
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<_> = self.rules.read().keys().cloned().collect();
        names.sort_unstable();
        names
    }

    /// Whether `name` resolves to anything, user or built-in.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.rules.read().contains_key(name) || self.builtins.contains(name)
    }

    /// Number of user overloads.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rules.read().values().map(Vec::len).sum()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The built-in fallback set.
    #[must_use]
    pub fn builtins(&self) -> &BuiltinRules {
        &self.builtins
    }
}

impl Default for RuleRegistry {
    fn default() -> Self {
        Self::with_builtins()
    }
}

impl std::fmt::Debug for RuleRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RuleRegistry")
            .field("rules", &self.names())
            .field("builtins", &self.builtins.len())
            .finish()
    }
}
