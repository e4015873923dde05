//! Built-in rules
//!
//! Consulted by the registry after user overloads. Covers presence checks,
//! string length, numeric and duration bounds, membership and a few string
//! shape checks.

use std::any::TypeId;
use std::collections::HashMap;
use std::fmt::Display;
use std::str::FromStr;
use std::sync::{Arc, LazyLock, OnceLock};
use std::time::Duration;

use crate::error::Error;
use crate::reflect::Reflect;
use crate::reflect::literal::parse_duration;

use super::Rule;

static EMAIL_REGEX: LazyLock<regex::Regex> = LazyLock::new(|| {
    regex::Regex::new(
        r"^[a-zA-Z0-9.!#$%&'*+/=?^_`{|}~-]+@[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?(?:\.[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?)*$",
    )
    .expect("email pattern compiles")
});

static UUID_REGEX: LazyLock<regex::Regex> = LazyLock::new(|| {
    regex::Regex::new(
        r"^[0-9a-fA-F]{8}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{12}$",
    )
    .expect("uuid pattern compiles")
});

static URL_REGEX: LazyLock<regex::Regex> = LazyLock::new(|| {
    regex::Regex::new(r"^https?://[^\s/$.?#].[^\s]*$").expect("url pattern compiles")
});

// ============================================================================
// BUILTIN RULES
// ============================================================================

/// Immutable table of built-in rules, keyed by name then exact type.
#[derive(Debug, Default)]
pub struct BuiltinRules {
    rules: HashMap<&'static str, HashMap<TypeId, Rule>>,
}

impl BuiltinRules {
    /// The process-wide standard set, built on first use.
    #[must_use]
    pub fn shared() -> Arc<Self> {
        static SHARED: OnceLock<Arc<BuiltinRules>> = OnceLock::new();
        SHARED
            .get_or_init(|| {
                let rules = Self::standard();
                tracing::debug!(rules = rules.len(), "built-in rules initialized");
                Arc::new(rules)
            })
            .clone()
    }

    /// A table without any rules.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Builds the standard set.
    #[must_use]
    pub fn standard() -> Self {
        let mut rules = Self::empty();
        rules.add_string_rules();
        rules.add_presence_rules();
        rules.add_number_rules();
        rules.add_duration_rules();
        rules
    }

    /// Overload of `name` for the exact type `type_id`.
    #[must_use]
    pub fn get(&self, name: &str, type_id: TypeId) -> Option<&Rule> {
        self.rules.get(name)?.get(&type_id)
    }

    /// Whether any overload of `name` exists.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.rules.contains_key(name)
    }

    /// Type names of all overloads of `name`.
    #[must_use]
    pub fn type_names(&self, name: &str) -> Vec<&'static str> {
        self.rules
            .get(name)
            .map(|overloads| overloads.values().map(|r| r.field_type().name()).collect())
            .unwrap_or_default()
    }

    /// Names of all built-in rules, sorted.
    #[must_use]
    pub fn names(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.rules.keys().copied().collect();
        names.sort_unstable();
        names
    }

    /// Total number of overloads.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rules.values().map(HashMap::len).sum()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    fn insert<T, F>(&mut self, name: &'static str, f: F)
    where
        T: Reflect,
        F: Fn(&T, &[String]) -> Result<(), Error> + Send + Sync + 'static,
    {
        self.rules
            .entry(name)
            .or_default()
            .insert(TypeId::of::<T>(), Rule::builtin::<T, F>(name, f));
    }

    fn add_string_rules(&mut self) {
        self.insert::<String, _>("nonempty", |value, _| {
            if value.is_empty() {
                Err(Error::violated("nonempty", "must not be empty"))
            } else {
                Ok(())
            }
        });
        self.insert::<String, _>("min", |value, params| {
            let min: usize = first_param("min", params)?;
            let len = value.chars().count();
            if len < min {
                return Err(Error::violated(
                    "min",
                    format!("length {len} is below minimum {min}"),
                ));
            }
            Ok(())
        });
        self.insert::<String, _>("max", |value, params| {
            let max: usize = first_param("max", params)?;
            let len = value.chars().count();
            if len > max {
                return Err(Error::violated(
                    "max",
                    format!("length {len} exceeds maximum {max}"),
                ));
            }
            Ok(())
        });
        self.insert::<String, _>("len", |value, params| {
            let expected: usize = first_param("len", params)?;
            let len = value.chars().count();
            if len != expected {
                return Err(Error::violated(
                    "len",
                    format!("length {len} is not {expected}"),
                ));
            }
            Ok(())
        });
        self.insert::<String, _>("oneof", |value, params| {
            if params.is_empty() {
                return Err(Error::missing_parameter("oneof"));
            }
            if params.iter().any(|p| p == value) {
                Ok(())
            } else {
                Err(Error::violated(
                    "oneof",
                    format!("`{value}` is not one of [{}]", params.join(", ")),
                ))
            }
        });
        self.insert::<String, _>("email", |value, _| {
            shape("email", value, &EMAIL_REGEX, "an email address")
        });
        self.insert::<String, _>("uuid", |value, _| {
            shape("uuid", value, &UUID_REGEX, "a UUID")
        });
        self.insert::<String, _>("url", |value, _| {
            shape("url", value, &URL_REGEX, "an http(s) URL")
        });
    }

    fn add_presence_rules(&mut self) {
        macro_rules! nonzero {
            ($($ty:ty),+) => {
                $( self.insert::<$ty, _>("nonzero", |value, _| nonzero(value)); )+
            };
        }
        nonzero!(
            String, bool, Duration, i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128,
            usize, f32, f64
        );
    }

    fn add_number_rules(&mut self) {
        macro_rules! numeric {
            ($($ty:ty),+) => {
                $(
                    self.insert::<$ty, _>("min", |value, params| {
                        let min: $ty = first_param("min", params)?;
                        if *value < min {
                            return Err(Error::violated("min", format!("{value} is below minimum {min}")));
                        }
                        Ok(())
                    });
                    self.insert::<$ty, _>("max", |value, params| {
                        let max: $ty = first_param("max", params)?;
                        if *value > max {
                            return Err(Error::violated("max", format!("{value} exceeds maximum {max}")));
                        }
                        Ok(())
                    });
                    self.insert::<$ty, _>("oneof", |value, params| one_of::<$ty>(value, params));
                )+
            };
        }
        numeric!(
            i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize, f32, f64
        );
    }

    fn add_duration_rules(&mut self) {
        self.insert::<Duration, _>("min", |value, params| {
            let min = duration_param("min", params)?;
            if *value < min {
                return Err(Error::violated(
                    "min",
                    format!("{value:?} is below minimum {min:?}"),
                ));
            }
            Ok(())
        });
        self.insert::<Duration, _>("max", |value, params| {
            let max = duration_param("max", params)?;
            if *value > max {
                return Err(Error::violated(
                    "max",
                    format!("{value:?} exceeds maximum {max:?}"),
                ));
            }
            Ok(())
        });
    }
}

// ============================================================================
// HELPERS
// ============================================================================

fn first_param<T>(rule: &str, params: &[String]) -> Result<T, Error>
where
    T: FromStr,
    T::Err: Display,
{
    let raw = params.first().ok_or_else(|| Error::missing_parameter(rule))?;
    raw.trim()
        .parse()
        .map_err(|e| Error::invalid_parameter(rule, raw.as_str(), e))
}

fn duration_param(rule: &str, params: &[String]) -> Result<Duration, Error> {
    let raw = params.first().ok_or_else(|| Error::missing_parameter(rule))?;
    parse_duration(raw).map_err(|e| Error::invalid_parameter(rule, raw.as_str(), e.reason))
}

fn one_of<T>(value: &T, params: &[String]) -> Result<(), Error>
where
    T: FromStr + PartialEq + Display,
    T::Err: Display,
{
    if params.is_empty() {
        return Err(Error::missing_parameter("oneof"));
    }
    let mut found = false;
    for raw in params {
        let candidate: T = raw
            .trim()
            .parse()
            .map_err(|e| Error::invalid_parameter("oneof", raw.as_str(), e))?;
        found |= candidate == *value;
    }
    if found {
        Ok(())
    } else {
        Err(Error::violated(
            "oneof",
            format!("{value} is not one of [{}]", params.join(", ")),
        ))
    }
}

fn nonzero(value: &dyn Reflect) -> Result<(), Error> {
    if value.is_zero() {
        Err(Error::violated("nonzero", "must not be the zero value"))
    } else {
        Ok(())
    }
}

fn shape(rule: &str, value: &str, pattern: &regex::Regex, expected: &str) -> Result<(), Error> {
    if pattern.is_match(value) {
        Ok(())
    } else {
        Err(Error::violated(rule, format!("`{value}` is not {expected}")))
    }
}
