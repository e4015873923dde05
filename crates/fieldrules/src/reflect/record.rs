//! Record descriptors
//!
//! A [`RecordDescriptor`] lists a struct's fields in declaration order with
//! their annotations. It is built once per type, on first use, and lives for
//! the rest of the process.

use std::any::TypeId;

use super::Reflect;

/// A struct whose fields the engine can walk.
pub trait Record: Reflect + 'static {
    /// Static field metadata for this type.
    fn descriptor(&self) -> &'static RecordDescriptor;

    /// Field at `index`, in declaration order.
    fn field(&self, index: usize) -> Option<&dyn Reflect>;

    /// Mutable field at `index`, in declaration order.
    fn field_mut(&mut self, index: usize) -> Option<&mut dyn Reflect>;
}

/// Returns true when every field of `record` is zero.
#[must_use]
pub fn record_is_zero(record: &dyn Record) -> bool {
    (0..record.descriptor().len()).all(|i| record.field(i).is_none_or(|f| f.is_zero()))
}

// ============================================================================
// RECORD DESCRIPTOR
// ============================================================================

/// Field layout and annotations of one record type.
#[derive(Debug, Clone)]
pub struct RecordDescriptor {
    type_id: TypeId,
    type_name: &'static str,
    fields: Vec<FieldDescriptor>,
}

impl RecordDescriptor {
    /// Creates a descriptor for `T`, numbering fields by position.
    #[must_use]
    pub fn new<T: Reflect>(type_name: &'static str, fields: Vec<FieldDescriptor>) -> Self {
        let fields = fields
            .into_iter()
            .enumerate()
            .map(|(index, field)| FieldDescriptor { index, ..field })
            .collect();
        Self {
            type_id: TypeId::of::<T>(),
            type_name,
            fields,
        }
    }

    /// `TypeId` of the described record.
    #[must_use]
    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    /// Short type name of the described record.
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Fields in declaration order.
    #[must_use]
    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    /// Looks up a field by name.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Number of fields.
    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns true for records without fields.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

// ============================================================================
// FIELD DESCRIPTOR
// ============================================================================

/// One field of a record and its annotations.
///
/// Built with chained setters; the setter names double as the annotation
/// keys accepted by [`reflect_record!`](crate::reflect_record).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDescriptor {
    name: &'static str,
    index: usize,
    exported: bool,
    default: Option<&'static str>,
    default_elem: Option<&'static str>,
    validate: Option<&'static str>,
    validate_elem: Option<&'static str>,
    validate_key: Option<&'static str>,
}

impl FieldDescriptor {
    /// Creates an exported field without annotations.
    #[must_use]
    pub const fn new(name: &'static str) -> Self {
        Self {
            name,
            index: 0,
            exported: true,
            default: None,
            default_elem: None,
            validate: None,
            validate_elem: None,
            validate_key: None,
        }
    }

    /// Marks the field as unexported; both walks skip it.
    #[must_use]
    pub const fn unexported(mut self) -> Self {
        self.exported = false;
        self
    }

    /// Sets the default annotation: a literal, `dive`, `alloc` or `-`.
    #[must_use]
    pub const fn default(mut self, annotation: &'static str) -> Self {
        self.default = Some(annotation);
        self
    }

    /// Sets the element default annotation: a literal or `dive`.
    #[must_use]
    pub const fn default_elem(mut self, annotation: &'static str) -> Self {
        self.default_elem = Some(annotation);
        self
    }

    /// Sets the rule list applied to the field value.
    #[must_use]
    pub const fn validate(mut self, annotation: &'static str) -> Self {
        self.validate = Some(annotation);
        self
    }

    /// Sets the rule list applied to each element (or `dive`).
    #[must_use]
    pub const fn validate_elem(mut self, annotation: &'static str) -> Self {
        self.validate_elem = Some(annotation);
        self
    }

    /// Sets the rule list applied to each map key.
    #[must_use]
    pub const fn validate_key(mut self, annotation: &'static str) -> Self {
        self.validate_key = Some(annotation);
        self
    }

    /// Field name as it appears in paths.
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Position of the field in declaration order.
    #[must_use]
    pub fn index(&self) -> usize {
        self.index
    }

    /// Whether the field is exported.
    #[must_use]
    pub fn is_exported(&self) -> bool {
        self.exported
    }

    /// The `default` annotation, if any.
    #[must_use]
    pub fn default_annotation(&self) -> Option<&'static str> {
        self.default
    }

    /// The `default_elem` annotation, if any.
    #[must_use]
    pub fn default_elem_annotation(&self) -> Option<&'static str> {
        self.default_elem
    }

    /// The `validate` rule list, if any.
    #[must_use]
    pub fn validate_annotation(&self) -> Option<&'static str> {
        self.validate
    }

    /// The `validate_elem` rule list, if any.
    #[must_use]
    pub fn validate_elem_annotation(&self) -> Option<&'static str> {
        self.validate_elem
    }

    /// The `validate_key` rule list, if any.
    #[must_use]
    pub fn validate_key_annotation(&self) -> Option<&'static str> {
        self.validate_key
    }
}

// ============================================================================
// DECLARATION MACRO
// ============================================================================

/// Implements [`Reflect`] and [`Record`] for a struct.
///
/// Lists the struct's fields in declaration order, each optionally followed
/// by `=> [key = "annotation", ...]` and optionally preceded by
/// `#[unexported]`. Keys are `default`, `default_elem`, `validate`,
/// `validate_elem` and `validate_key`.
///
/// # Examples
///
/// ```rust,ignore
/// #[derive(Default)]
/// struct Server {
///     host: String,
///     port: u16,
///     tags: Vec<String>,
///     token: String,
/// }
///
/// reflect_record! {
///     Server {
///         host => [default = "localhost", validate = "nonempty"],
///         port => [default = "8080", validate = "min(1)"],
///         tags => [validate_elem = "nonempty"],
///         #[unexported] token,
///     }
/// }
/// ```
#[macro_export]
macro_rules! reflect_record {
    ($ty:ident {}) => {
        $crate::reflect_record!(@reflect $ty);

        impl $crate::reflect::Record for $ty {
            fn descriptor(&self) -> &'static $crate::reflect::RecordDescriptor {
                static DESCRIPTOR: ::std::sync::OnceLock<$crate::reflect::RecordDescriptor> =
                    ::std::sync::OnceLock::new();
                DESCRIPTOR.get_or_init(|| {
                    $crate::reflect::RecordDescriptor::new::<$ty>(stringify!($ty), Vec::new())
                })
            }

            fn field(&self, _index: usize) -> Option<&dyn $crate::reflect::Reflect> {
                None
            }

            fn field_mut(&mut self, _index: usize) -> Option<&mut dyn $crate::reflect::Reflect> {
                None
            }
        }
    };

    (
        $ty:ident {
            $(
                $(#[$flag:ident])*
                $field:ident $( => [ $( $key:ident = $annotation:literal ),* $(,)? ] )?
            ),+ $(,)?
        }
    ) => {
        $crate::reflect_record!(@reflect $ty);

        impl $crate::reflect::Record for $ty {
            fn descriptor(&self) -> &'static $crate::reflect::RecordDescriptor {
                static DESCRIPTOR: ::std::sync::OnceLock<$crate::reflect::RecordDescriptor> =
                    ::std::sync::OnceLock::new();
                DESCRIPTOR.get_or_init(|| {
                    $crate::reflect::RecordDescriptor::new::<$ty>(
                        stringify!($ty),
                        vec![
                            $(
                                $crate::reflect::FieldDescriptor::new(stringify!($field))
                                    $( .$flag() )*
                                    $( $( .$key($annotation) )* )?
                            ),+
                        ],
                    )
                })
            }

            fn field(&self, index: usize) -> Option<&dyn $crate::reflect::Reflect> {
                let fields = [$( &self.$field as &dyn $crate::reflect::Reflect ),+];
                fields.get(index).copied()
            }

            fn field_mut(&mut self, index: usize) -> Option<&mut dyn $crate::reflect::Reflect> {
                let fields = [$( &mut self.$field as &mut dyn $crate::reflect::Reflect ),+];
                fields.into_iter().nth(index)
            }
        }
    };

    (@reflect $ty:ident) => {
        impl $crate::reflect::Reflect for $ty {
            fn kind(&self) -> $crate::reflect::Kind {
                $crate::reflect::Kind::Record
            }

            fn static_kind() -> $crate::reflect::Kind {
                $crate::reflect::Kind::Record
            }

            fn type_name(&self) -> &'static str {
                ::std::any::type_name::<$ty>()
            }

            fn as_any(&self) -> &dyn ::std::any::Any {
                self
            }

            fn as_any_mut(&mut self) -> &mut dyn ::std::any::Any {
                self
            }

            fn is_zero(&self) -> bool {
                $crate::reflect::record::record_is_zero(self)
            }

            fn reflect_ref(&self) -> $crate::reflect::ReflectRef<'_> {
                $crate::reflect::ReflectRef::Record(self)
            }

            fn reflect_mut(&mut self) -> $crate::reflect::ReflectMut<'_> {
                $crate::reflect::ReflectMut::Record(self)
            }
        }
    };
}
