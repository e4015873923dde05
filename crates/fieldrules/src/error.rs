//! Error types for rule dispatch, default application and validation.
//!
//! Every failure the engine can surface is a variant of [`Error`], so callers
//! match on [`Error::kind`] rather than on rendered text. Validation failures
//! are collected per field as [`FieldError`] inside a [`ValidationErrors`]
//! aggregate.

use std::fmt;

// ============================================================================
// ERROR
// ============================================================================

/// Error type for every engine operation.
///
/// Dispatch and parsing variants carry the rule name, the value's type name
/// and the offending parameter so they can be matched without parsing the
/// message.
#[derive(Debug, Clone, thiserror::Error)]
pub enum Error {
    /// The walk target is not a record (or is a null pointer to one).
    #[error("invalid target `{type_name}`: {reason}")]
    InvalidTarget { type_name: String, reason: String },

    /// A rule was constructed without a name.
    #[error("rule name must not be empty")]
    EmptyRuleName,

    /// A rule with the same name and exact field type is already registered.
    #[error("rule `{rule}` already has an overload for `{type_name}`")]
    DuplicateRuleOverload { rule: String, type_name: String },

    /// Neither the registry nor the built-in set knows the rule.
    #[error("rule `{rule}` not found")]
    RuleNotFound { rule: String },

    /// The rule exists, but no overload accepts the value's type.
    #[error(
        "rule `{rule}` has no overload for `{type_name}` (available: {})",
        available.join(", ")
    )]
    RuleOverloadNotFound {
        rule: String,
        type_name: String,
        available: Vec<String>,
    },

    /// More than one overload matches the value's type exactly.
    #[error("rule `{rule}` is ambiguous for `{type_name}`")]
    AmbiguousRule { rule: String, type_name: String },

    /// The value handed to dispatch is missing or of an unexpected type.
    #[error("invalid value for rule `{rule}`: {reason}")]
    InvalidValue { rule: String, reason: String },

    /// The rule requires at least one parameter.
    #[error("rule `{rule}` requires a parameter")]
    MissingRuleParameter { rule: String },

    /// A parameter could not be parsed into the type the rule needs.
    #[error("rule `{rule}` has invalid parameter `{param}`: {reason}")]
    InvalidRuleParameter {
        rule: String,
        param: String,
        reason: String,
    },

    /// The value does not satisfy the rule.
    #[error("{message}")]
    RuleConstraintViolated { rule: String, message: String },

    /// A default annotation cannot be applied to the field.
    #[error("cannot set default for `{field}`: {detail}")]
    CannotSetDefault { field: String, detail: String },

    /// `dive` reached an element that is not a record or is a null pointer.
    #[error("cannot dive into `{path}`: `{type_name}` is not a record")]
    DiveMisuse { path: String, type_name: String },

    /// The caller cancelled the walk.
    #[error("validation cancelled")]
    Cancelled,

    /// One or more fields failed validation.
    #[error("{0}")]
    Validation(ValidationErrors),
}

/// Discriminant of [`Error`] for matching without destructuring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    InvalidTarget,
    EmptyRuleName,
    DuplicateRuleOverload,
    RuleNotFound,
    RuleOverloadNotFound,
    AmbiguousRule,
    InvalidValue,
    MissingRuleParameter,
    InvalidRuleParameter,
    RuleConstraintViolated,
    CannotSetDefault,
    DiveMisuse,
    Cancelled,
    Validation,
}

impl Error {
    /// Returns the kind of this error.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidTarget { .. } => ErrorKind::InvalidTarget,
            Self::EmptyRuleName => ErrorKind::EmptyRuleName,
            Self::DuplicateRuleOverload { .. } => ErrorKind::DuplicateRuleOverload,
            Self::RuleNotFound { .. } => ErrorKind::RuleNotFound,
            Self::RuleOverloadNotFound { .. } => ErrorKind::RuleOverloadNotFound,
            Self::AmbiguousRule { .. } => ErrorKind::AmbiguousRule,
            Self::InvalidValue { .. } => ErrorKind::InvalidValue,
            Self::MissingRuleParameter { .. } => ErrorKind::MissingRuleParameter,
            Self::InvalidRuleParameter { .. } => ErrorKind::InvalidRuleParameter,
            Self::RuleConstraintViolated { .. } => ErrorKind::RuleConstraintViolated,
            Self::CannotSetDefault { .. } => ErrorKind::CannotSetDefault,
            Self::DiveMisuse { .. } => ErrorKind::DiveMisuse,
            Self::Cancelled => ErrorKind::Cancelled,
            Self::Validation(_) => ErrorKind::Validation,
        }
    }

    /// Machine-readable error code for programmatic handling.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidTarget { .. } => "FIELDRULES_INVALID_TARGET",
            Self::EmptyRuleName => "FIELDRULES_EMPTY_RULE_NAME",
            Self::DuplicateRuleOverload { .. } => "FIELDRULES_DUPLICATE_OVERLOAD",
            Self::RuleNotFound { .. } => "FIELDRULES_RULE_NOT_FOUND",
            Self::RuleOverloadNotFound { .. } => "FIELDRULES_OVERLOAD_NOT_FOUND",
            Self::AmbiguousRule { .. } => "FIELDRULES_AMBIGUOUS_RULE",
            Self::InvalidValue { .. } => "FIELDRULES_INVALID_VALUE",
            Self::MissingRuleParameter { .. } => "FIELDRULES_MISSING_PARAM",
            Self::InvalidRuleParameter { .. } => "FIELDRULES_INVALID_PARAM",
            Self::RuleConstraintViolated { .. } => "FIELDRULES_CONSTRAINT",
            Self::CannotSetDefault { .. } => "FIELDRULES_CANNOT_SET_DEFAULT",
            Self::DiveMisuse { .. } => "FIELDRULES_DIVE_MISUSE",
            Self::Cancelled => "FIELDRULES_CANCELLED",
            Self::Validation(_) => "FIELDRULES_VALIDATION",
        }
    }

    /// Whether this error comes from dispatch rather than from the value
    /// failing a rule.
    #[must_use]
    pub fn is_dispatch(&self) -> bool {
        matches!(
            self.kind(),
            ErrorKind::RuleNotFound
                | ErrorKind::RuleOverloadNotFound
                | ErrorKind::AmbiguousRule
                | ErrorKind::InvalidValue
        )
    }

    /// Creates a constraint violation for `rule`.
    pub fn violated(rule: impl Into<String>, message: impl Into<String>) -> Self {
        Self::RuleConstraintViolated {
            rule: rule.into(),
            message: message.into(),
        }
    }

    /// Creates a missing-parameter error for `rule`.
    pub fn missing_parameter(rule: impl Into<String>) -> Self {
        Self::MissingRuleParameter { rule: rule.into() }
    }

    /// Creates an invalid-parameter error for `rule`.
    pub fn invalid_parameter(
        rule: impl Into<String>,
        param: impl Into<String>,
        reason: impl fmt::Display,
    ) -> Self {
        Self::InvalidRuleParameter {
            rule: rule.into(),
            param: param.into(),
            reason: reason.to_string(),
        }
    }

    pub(crate) fn cannot_set_default(field: &str, detail: impl Into<String>) -> Self {
        Self::CannotSetDefault {
            field: field.to_owned(),
            detail: detail.into(),
        }
    }
}

// ============================================================================
// FIELD ERROR
// ============================================================================

/// A single validation failure at a dotted field path.
#[derive(Debug, Clone)]
pub struct FieldError {
    /// Dotted path of the field, with `[index]` / `[key]` element suffixes.
    pub path: String,
    /// Name of the rule that failed or could not be dispatched.
    pub rule: String,
    /// Parameters the rule was invoked with.
    pub params: Vec<String>,
    /// Underlying failure.
    pub cause: Error,
}

impl FieldError {
    /// Creates a new field error.
    pub fn new(
        path: impl Into<String>,
        rule: impl Into<String>,
        params: Vec<String>,
        cause: Error,
    ) -> Self {
        Self {
            path: path.into(),
            rule: rule.into(),
            params,
            cause,
        }
    }

    /// Returns the kind of the underlying failure.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        self.cause.kind()
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path, self.rule)?;
        if !self.params.is_empty() {
            write!(f, "({})", self.params.join(","))?;
        }
        write!(f, ": {}", self.cause)
    }
}

impl std::error::Error for FieldError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.cause)
    }
}

// ============================================================================
// ERROR COLLECTION
// ============================================================================

/// Ordered collection of field errors from one validation pass.
///
/// Built fresh per pass. Empty means the target is valid; check
/// [`is_empty`](Self::is_empty) or use [`into_result`](Self::into_result).
#[derive(Debug, Clone, Default)]
pub struct ValidationErrors {
    errors: Vec<FieldError>,
}

impl ValidationErrors {
    /// Creates a new empty error collection.
    #[must_use]
    pub fn new() -> Self {
        Self { errors: Vec::new() }
    }

    /// Appends an error.
    pub fn push(&mut self, error: FieldError) {
        self.errors.push(error);
    }

    /// Returns the number of errors.
    #[must_use]
    pub fn len(&self) -> usize {
        self.errors.len()
    }

    /// Returns true if no field failed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Returns all errors in the order they were found.
    #[must_use]
    pub fn errors(&self) -> &[FieldError] {
        &self.errors
    }

    /// Iterates over the errors.
    pub fn iter(&self) -> std::slice::Iter<'_, FieldError> {
        self.errors.iter()
    }

    /// Returns the errors recorded for `path`.
    pub fn by_path<'a>(&'a self, path: &'a str) -> impl Iterator<Item = &'a FieldError> + 'a {
        self.errors.iter().filter(move |e| e.path == path)
    }

    /// Counts errors of the given kind.
    #[must_use]
    pub fn count_kind(&self, kind: ErrorKind) -> usize {
        self.errors.iter().filter(|e| e.kind() == kind).count()
    }

    /// `Ok(())` when empty, `Err(Error::Validation)` otherwise.
    pub fn into_result(self) -> Result<(), Error> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(Error::Validation(self))
        }
    }
}

impl IntoIterator for ValidationErrors {
    type Item = FieldError;
    type IntoIter = std::vec::IntoIter<FieldError>;

    fn into_iter(self) -> Self::IntoIter {
        self.errors.into_iter()
    }
}

impl<'a> IntoIterator for &'a ValidationErrors {
    type Item = &'a FieldError;
    type IntoIter = std::slice::Iter<'a, FieldError>;

    fn into_iter(self) -> Self::IntoIter {
        self.errors.iter()
    }
}

impl FromIterator<FieldError> for ValidationErrors {
    fn from_iter<I: IntoIterator<Item = FieldError>>(iter: I) -> Self {
        Self {
            errors: iter.into_iter().collect(),
        }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.errors.as_slice() {
            [] => write!(f, "validation passed"),
            [single] => write!(f, "validation failed: {single}"),
            many => {
                write!(f, "validation failed with {} errors:", many.len())?;
                for (i, error) in many.iter().enumerate() {
                    write!(f, "\n  {}. {}", i + 1, error)?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for ValidationErrors {}

// ============================================================================
// TESTS
// ============================================================================
