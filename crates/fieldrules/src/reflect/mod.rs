//! Structural reflection for annotated records
//!
//! The walks never inspect Rust types directly. Every value they touch is a
//! [`Reflect`] trait object that reports its [`Kind`] and exposes one of a
//! handful of views:
//!
//! - [`Record`] - a struct with a static [`RecordDescriptor`]
//! - [`Pointer`] - a nullable reference (`Option<T>`)
//! - [`List`] - `Vec<T>` and `[T; N]`
//! - [`Map`] - `HashMap<K, V>` and `BTreeMap<K, V>`
//! - [`Scalar`] - strings, booleans, numbers and durations
//!
//! Records declare their fields and annotations with
//! [`reflect_record!`](crate::reflect_record).

pub mod impls;
pub mod literal;
pub mod record;

pub use literal::LiteralError;
pub use record::{FieldDescriptor, Record, RecordDescriptor};

use std::any::{Any, TypeId};
use std::fmt;

// ============================================================================
// KIND
// ============================================================================

/// Broad category of a reflected value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
    Bool,
    Int,
    Uint,
    Float,
    String,
    Duration,
    Record,
    Pointer,
    List,
    Map,
}

impl Kind {
    /// Returns true for kinds with a [`Scalar`] view.
    #[must_use]
    pub fn is_scalar(self) -> bool {
        matches!(
            self,
            Self::Bool | Self::Int | Self::Uint | Self::Float | Self::String | Self::Duration
        )
    }

    /// Returns true for signed, unsigned and floating point numbers.
    #[must_use]
    pub fn is_numeric(self) -> bool {
        matches!(self, Self::Int | Self::Uint | Self::Float)
    }

    /// Returns true for lists and maps.
    #[must_use]
    pub fn is_collection(self) -> bool {
        matches!(self, Self::List | Self::Map)
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Bool => "bool",
            Self::Int => "int",
            Self::Uint => "uint",
            Self::Float => "float",
            Self::String => "string",
            Self::Duration => "duration",
            Self::Record => "record",
            Self::Pointer => "pointer",
            Self::List => "list",
            Self::Map => "map",
        };
        f.write_str(name)
    }
}

// ============================================================================
// REFLECT
// ============================================================================

/// A value the engine can walk.
///
/// Implemented for the supported scalar, pointer and collection types in
/// [`impls`], and for user records by
/// [`reflect_record!`](crate::reflect_record).
pub trait Reflect: Any + Send + Sync + 'static {
    /// Kind of this value.
    fn kind(&self) -> Kind;

    /// Kind of the type, without an instance.
    fn static_kind() -> Kind
    where
        Self: Sized;

    /// Full type name, used in errors.
    fn type_name(&self) -> &'static str;

    /// Upcast for downcasting to the concrete type.
    fn as_any(&self) -> &dyn Any;

    /// Mutable upcast for downcasting to the concrete type.
    fn as_any_mut(&mut self) -> &mut dyn Any;

    /// Whether the value equals its type's zero value.
    fn is_zero(&self) -> bool;

    /// Read-only structural view.
    fn reflect_ref(&self) -> ReflectRef<'_>;

    /// Mutable structural view.
    fn reflect_mut(&mut self) -> ReflectMut<'_>;
}

impl dyn Reflect {
    /// `TypeId` of the concrete value behind the trait object.
    #[must_use]
    pub fn value_type_id(&self) -> TypeId {
        self.as_any().type_id()
    }

    /// Downcasts to a concrete type.
    #[must_use]
    pub fn downcast_ref<T: Reflect>(&self) -> Option<&T> {
        self.as_any().downcast_ref::<T>()
    }

    /// Downcasts to a concrete type mutably.
    pub fn downcast_mut<T: Reflect>(&mut self) -> Option<&mut T> {
        self.as_any_mut().downcast_mut::<T>()
    }

    /// Returns the record behind this value: the value itself, or the
    /// target of a non-null pointer to a record.
    #[must_use]
    pub fn as_record(&self) -> Option<&dyn Record> {
        match self.reflect_ref() {
            ReflectRef::Record(record) => Some(record),
            ReflectRef::Pointer(Some(target)) => target.as_record(),
            _ => None,
        }
    }

    /// Mutable counterpart of [`as_record`](Self::as_record).
    pub fn as_record_mut(&mut self) -> Option<&mut dyn Record> {
        match self.reflect_mut() {
            ReflectMut::Record(record) => Some(record),
            ReflectMut::Pointer(pointer) => pointer.target_mut()?.as_record_mut(),
            _ => None,
        }
    }
}

impl fmt::Debug for dyn Reflect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Reflect")
            .field("type", &self.type_name())
            .field("kind", &self.kind())
            .finish()
    }
}

// ============================================================================
// VIEWS
// ============================================================================

/// Read-only structural view of a value.
pub enum ReflectRef<'a> {
    Scalar(&'a dyn Reflect),
    Record(&'a dyn Record),
    /// Target of a nullable pointer, `None` when null.
    Pointer(Option<&'a dyn Reflect>),
    List(&'a dyn List),
    Map(&'a dyn Map),
}

/// Mutable structural view of a value.
pub enum ReflectMut<'a> {
    Scalar(&'a mut dyn Scalar),
    Record(&'a mut dyn Record),
    Pointer(&'a mut dyn Pointer),
    List(&'a mut dyn List),
    Map(&'a mut dyn Map),
}

/// A scalar that can be overwritten from a default literal.
pub trait Scalar: Reflect + 'static {
    /// Parses `literal` into this value's type and stores it.
    fn apply_literal(&mut self, literal: &str) -> Result<(), LiteralError>;
}

/// A nullable reference.
pub trait Pointer: Reflect + 'static {
    /// The target, or `None` when null.
    fn target(&self) -> Option<&dyn Reflect>;

    /// The mutable target, or `None` when null.
    fn target_mut(&mut self) -> Option<&mut dyn Reflect>;

    /// Kind of the target type, known even when null.
    fn target_kind(&self) -> Kind;

    /// Type name of the target type.
    fn target_type_name(&self) -> &'static str;

    /// Stores the target type's default value if null and returns the target.
    fn allocate(&mut self) -> &mut dyn Reflect;

    /// Resets the pointer to null.
    fn clear(&mut self);
}

/// An indexed sequence.
pub trait List: Reflect + 'static {
    /// Number of elements.
    fn len(&self) -> usize;

    /// Element at `index`.
    fn get(&self, index: usize) -> Option<&dyn Reflect>;

    /// Mutable element at `index`.
    fn get_mut(&mut self, index: usize) -> Option<&mut dyn Reflect>;

    /// Returns true when there are no elements.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// One map entry, with the key rendered for field paths.
pub struct MapEntry<'a> {
    /// Key rendered with `Display`.
    pub label: String,
    pub key: &'a dyn Reflect,
    pub value: &'a dyn Reflect,
}

/// A keyed collection.
///
/// Entries come back in a deterministic order: key order for ordered maps,
/// rendered-key order for hash maps.
pub trait Map: Reflect + 'static {
    /// Number of entries.
    fn len(&self) -> usize;

    /// All entries.
    fn entries(&self) -> Vec<MapEntry<'_>>;

    /// All values, mutable, labelled with their rendered key.
    fn values_mut(&mut self) -> Vec<(String, &mut dyn Reflect)>;

    /// Returns true when there are no entries.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
