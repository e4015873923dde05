//! Prelude module for convenient imports.
//!
//! `use nebula_fieldrules::prelude::*;` brings in the engine, the rule and
//! error types, and the reflection traits needed to declare records.

// ============================================================================
// ENGINE
// ============================================================================

pub use crate::engine::{Engine, EngineBuilder, EngineConfig};
pub use tokio_util::sync::CancellationToken;

// ============================================================================
// RULES AND ERRORS
// ============================================================================

pub use crate::error::{Error, ErrorKind, FieldError, ValidationErrors};
pub use crate::rule::{BuiltinRules, Rule, RuleRegistry};

// ============================================================================
// REFLECTION
// ============================================================================

pub use crate::reflect::{FieldDescriptor, Kind, Record, RecordDescriptor, Reflect};
pub use crate::reflect_record;
