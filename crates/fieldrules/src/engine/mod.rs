//! The engine: default application and validation walks
//!
//! An [`Engine`] owns a [`RuleRegistry`], an [`AnnotationCache`] and an
//! [`EngineConfig`]. It is `Send + Sync`; share it by reference or `Arc`
//! and run any number of walks concurrently.
//!
//! - [`Engine::apply_defaults`] fills zero fields from `default` /
//!   `default_elem` annotations and stops at the first error.
//! - [`Engine::validate_record`] runs `validate` / `validate_elem` /
//!   `validate_key` rule lists and collects every failure.

mod defaults;
mod validate;

use serde::{Deserialize, Serialize};

use crate::annotation::AnnotationCache;
use crate::error::Error;
use crate::reflect::{FieldDescriptor, Record, Reflect, ReflectRef};
use crate::rule::{BuiltinRules, Rule, RuleRegistry};

// ============================================================================
// CONFIGURATION
// ============================================================================

/// Engine configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Fall back to the built-in rule set.
    pub builtins: bool,
    /// Skip fields declared `#[unexported]`. Defaults to `true`; `false`
    /// opts in to defaulting and validating them as well.
    pub skip_unexported: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            builtins: true,
            skip_unexported: true,
        }
    }
}

// ============================================================================
// ENGINE
// ============================================================================

/// Applies defaults to and validates annotated records.
///
/// # Examples
///
/// ```rust,ignore
/// let engine = Engine::new();
/// engine.apply_defaults(&mut server)?;
/// engine.validate(&server)?;
/// ```
#[derive(Debug)]
pub struct Engine {
    registry: RuleRegistry,
    annotations: AnnotationCache,
    config: EngineConfig,
}

impl Engine {
    /// Creates an engine with the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(EngineConfig::default())
    }

    /// Creates an engine with the given configuration.
    #[must_use]
    pub fn with_config(config: EngineConfig) -> Self {
        let builtins = if config.builtins {
            BuiltinRules::shared()
        } else {
            std::sync::Arc::new(BuiltinRules::empty())
        };
        tracing::debug!(
            builtins = config.builtins,
            skip_unexported = config.skip_unexported,
            "engine created"
        );
        Self {
            registry: RuleRegistry::new(builtins),
            annotations: AnnotationCache::new(),
            config,
        }
    }

    /// Starts building an engine.
    #[must_use]
    pub fn builder() -> EngineBuilder {
        EngineBuilder::default()
    }

    /// Registers a rule overload.
    pub fn register_rule(&self, rule: Rule) -> Result<(), Error> {
        self.registry.add(rule)
    }

    #[must_use]
    pub fn registry(&self) -> &RuleRegistry {
        &self.registry
    }

    #[must_use]
    pub fn annotations(&self) -> &AnnotationCache {
        &self.annotations
    }

    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    fn skips(&self, field: &FieldDescriptor) -> bool {
        self.config.skip_unexported && !field.is_exported()
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// BUILDER
// ============================================================================

/// Builder for [`Engine`].
#[derive(Debug, Default)]
pub struct EngineBuilder {
    config: EngineConfig,
    rules: Vec<Rule>,
}

impl EngineBuilder {
    /// Replaces the configuration.
    #[must_use]
    pub fn config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    /// Enables or disables the built-in rule set.
    #[must_use]
    pub fn builtins(mut self, enabled: bool) -> Self {
        self.config.builtins = enabled;
        self
    }

    /// Walks unexported fields too when `false`.
    #[must_use]
    pub fn skip_unexported(mut self, skip: bool) -> Self {
        self.config.skip_unexported = skip;
        self
    }

    /// Queues a rule for registration.
    #[must_use]
    pub fn rule(mut self, rule: Rule) -> Self {
        self.rules.push(rule);
        self
    }

    /// Builds the engine, registering queued rules in order.
    pub fn build(self) -> Result<Engine, Error> {
        let engine = Engine::with_config(self.config);
        for rule in self.rules {
            engine.register_rule(rule)?;
        }
        Ok(engine)
    }
}

// ============================================================================
// HELPERS
// ============================================================================

fn join_path(prefix: &str, name: &str) -> String {
    if prefix.is_empty() {
        name.to_owned()
    } else {
        format!("{prefix}.{name}")
    }
}

fn invalid_target(target: &dyn Reflect) -> Error {
    let reason = match target.reflect_ref() {
        ReflectRef::Pointer(None) => "null pointer to a record",
        ReflectRef::Pointer(Some(_)) => "pointer target is not a record",
        _ => "not a record",
    };
    Error::InvalidTarget {
        type_name: target.type_name().to_owned(),
        reason: reason.to_owned(),
    }
}

fn root_record(target: &dyn Reflect) -> Result<&dyn Record, Error> {
    target.as_record().ok_or_else(|| invalid_target(target))
}
