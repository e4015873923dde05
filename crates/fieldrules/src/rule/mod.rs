//! Named, type-scoped validation rules
//!
//! A [`Rule`] binds a name, the field type it applies to and a type-erased
//! validation function. Several rules may share a name as long as their
//! field types differ; those are the overloads the
//! [`RuleRegistry`](registry::RuleRegistry) picks from at dispatch time.
//!
//! Field types come in two flavours:
//!
//! - **concrete** ([`Rule::new`]) - matches a value whose runtime type is
//!   exactly `T`;
//! - **interface** ([`Rule::for_trait`], [`Rule::for_kind`]) - never matches
//!   exactly, but accepts every value its predicate accepts.

pub mod builtin;
pub mod registry;

pub use builtin::BuiltinRules;
pub use registry::RuleRegistry;

use std::any::TypeId;
use std::fmt;
use std::sync::Arc;

use crate::error::Error;
use crate::reflect::Reflect;

/// Type-erased rule body.
pub type RuleFn = Arc<dyn Fn(&dyn Reflect, &[String]) -> Result<(), Error> + Send + Sync>;

type Matcher = Arc<dyn Fn(&dyn Reflect) -> bool + Send + Sync>;

// ============================================================================
// TYPE DESCRIPTOR
// ============================================================================

/// The field type a rule is declared for.
#[derive(Clone)]
pub struct TypeDescriptor {
    id: TypeId,
    name: &'static str,
    matcher: Option<Matcher>,
}

/// Marker identity for predicate-based field types.
struct KindPredicate;

impl TypeDescriptor {
    /// Concrete type `T`.
    #[must_use]
    pub fn of<T: Reflect>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: std::any::type_name::<T>(),
            matcher: None,
        }
    }

    /// Interface type `I`, implemented by every value `cast` accepts.
    #[must_use]
    pub fn interface<I: ?Sized + 'static>(cast: fn(&dyn Reflect) -> Option<&I>) -> Self {
        Self {
            id: TypeId::of::<I>(),
            name: std::any::type_name::<I>(),
            matcher: Some(Arc::new(move |value: &dyn Reflect| cast(value).is_some())),
        }
    }

    /// Interface described by a predicate and a label.
    #[must_use]
    pub fn predicate(label: &'static str, accepts: fn(&dyn Reflect) -> bool) -> Self {
        Self {
            id: TypeId::of::<KindPredicate>(),
            name: label,
            matcher: Some(Arc::new(accepts)),
        }
    }

    /// `TypeId` of the declared type.
    #[must_use]
    pub fn id(&self) -> TypeId {
        self.id
    }

    /// Name of the declared type.
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Returns true for interface-like field types.
    #[must_use]
    pub fn is_interface(&self) -> bool {
        self.matcher.is_some()
    }

    /// The value's runtime type is the declared type.
    #[must_use]
    pub fn is_exact(&self, value: &dyn Reflect) -> bool {
        value.value_type_id() == self.id
    }

    /// The value satisfies the declared interface.
    #[must_use]
    pub fn is_assignable(&self, value: &dyn Reflect) -> bool {
        self.matcher.as_ref().is_some_and(|accepts| accepts(value))
    }

    /// Both descriptors name the same declared type.
    #[must_use]
    pub fn same_type(&self, other: &Self) -> bool {
        self.id == other.id && self.name == other.name
    }
}

impl fmt::Debug for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeDescriptor")
            .field("name", &self.name)
            .field("interface", &self.is_interface())
            .finish()
    }
}

// ============================================================================
// RULE
// ============================================================================

/// A named validation function scoped to one field type.
///
/// Cheap to clone; the function is shared.
#[derive(Clone)]
pub struct Rule {
    name: String,
    field_type: TypeDescriptor,
    func: RuleFn,
}

impl Rule {
    /// Creates a rule for values of exactly type `T`.
    ///
    /// # Examples
    ///
    /// ```rust,ignore
    /// let even = Rule::new::<i64, _>("even", |value, _params| {
    ///     if value % 2 == 0 {
    ///         Ok(())
    ///     } else {
    ///         Err(Error::violated("even", format!("{value} is odd")))
    ///     }
    /// })?;
    /// ```
    pub fn new<T, F>(name: impl Into<String>, f: F) -> Result<Self, Error>
    where
        T: Reflect,
        F: Fn(&T, &[String]) -> Result<(), Error> + Send + Sync + 'static,
    {
        let name = name.into();
        let func = erase::<T, F>(name.clone(), f);
        Self::checked(name, TypeDescriptor::of::<T>(), func)
    }

    /// Creates a rule for every value that `cast` can view as `I`.
    ///
    /// `I` is usually a trait object such as `dyn Temperature`; `cast`
    /// is the assignability check.
    pub fn for_trait<I, F>(
        name: impl Into<String>,
        cast: fn(&dyn Reflect) -> Option<&I>,
        f: F,
    ) -> Result<Self, Error>
    where
        I: ?Sized + 'static,
        F: Fn(&I, &[String]) -> Result<(), Error> + Send + Sync + 'static,
    {
        let name = name.into();
        let rule_name = name.clone();
        let func: RuleFn = Arc::new(move |value: &dyn Reflect, params: &[String]| match cast(value) {
            Some(target) => f(target, params),
            None => Err(Error::InvalidValue {
                rule: rule_name.clone(),
                reason: format!(
                    "`{}` does not implement `{}`",
                    value.type_name(),
                    std::any::type_name::<I>()
                ),
            }),
        });
        Self::checked(name, TypeDescriptor::interface::<I>(cast), func)
    }

    /// Creates a rule for every value `accepts` returns true for.
    ///
    /// The function receives the value untyped.
    pub fn for_kind<F>(
        name: impl Into<String>,
        label: &'static str,
        accepts: fn(&dyn Reflect) -> bool,
        f: F,
    ) -> Result<Self, Error>
    where
        F: Fn(&dyn Reflect, &[String]) -> Result<(), Error> + Send + Sync + 'static,
    {
        Self::checked(
            name.into(),
            TypeDescriptor::predicate(label, accepts),
            Arc::new(f),
        )
    }

    /// Built-in constructor; names are static and never empty.
    pub(crate) fn builtin<T, F>(name: &'static str, f: F) -> Self
    where
        T: Reflect,
        F: Fn(&T, &[String]) -> Result<(), Error> + Send + Sync + 'static,
    {
        Self {
            name: name.to_owned(),
            field_type: TypeDescriptor::of::<T>(),
            func: erase::<T, F>(name.to_owned(), f),
        }
    }

    fn checked(name: String, field_type: TypeDescriptor, func: RuleFn) -> Result<Self, Error> {
        if name.trim().is_empty() {
            return Err(Error::EmptyRuleName);
        }
        Ok(Self {
            name,
            field_type,
            func,
        })
    }

    /// Rule name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declared field type.
    #[must_use]
    pub fn field_type(&self) -> &TypeDescriptor {
        &self.field_type
    }

    /// Runs the rule against `value`.
    pub fn invoke(&self, value: &dyn Reflect, params: &[String]) -> Result<(), Error> {
        (self.func)(value, params)
    }
}

impl fmt::Debug for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Rule")
            .field("name", &self.name)
            .field("field_type", &self.field_type)
            .field("func", &"<function>")
            .finish()
    }
}

fn erase<T, F>(rule: String, f: F) -> RuleFn
where
    T: Reflect,
    F: Fn(&T, &[String]) -> Result<(), Error> + Send + Sync + 'static,
{
    Arc::new(move |value: &dyn Reflect, params: &[String]| match value.downcast_ref::<T>() {
        Some(typed) => f(typed, params),
        None => Err(Error::InvalidValue {
            rule: rule.clone(),
            reason: format!(
                "expected `{}`, got `{}`",
                std::any::type_name::<T>(),
                value.type_name()
            ),
        }),
    })
}
