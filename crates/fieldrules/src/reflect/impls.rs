//! `Reflect` implementations for standard types.

use std::any::Any;
use std::collections::{BTreeMap, HashMap};
use std::fmt::Display;
use std::hash::{BuildHasher, Hash};
use std::time::Duration;

use super::literal::{LiteralError, parse_bool, parse_duration, parse_number};
use super::{Kind, List, Map, MapEntry, Pointer, Reflect, ReflectMut, ReflectRef, Scalar};

// ============================================================================
// SCALARS
// ============================================================================

macro_rules! impl_scalar {
    ($ty:ty, $kind:ident, |$lit:ident| $parse:expr) => {
        impl Reflect for $ty {
            fn kind(&self) -> Kind {
                Kind::$kind
            }

            fn static_kind() -> Kind {
                Kind::$kind
            }

            fn type_name(&self) -> &'static str {
                std::any::type_name::<$ty>()
            }

            fn as_any(&self) -> &dyn Any {
                self
            }

            fn as_any_mut(&mut self) -> &mut dyn Any {
                self
            }

            fn is_zero(&self) -> bool {
                *self == <$ty>::default()
            }

            fn reflect_ref(&self) -> ReflectRef<'_> {
                ReflectRef::Scalar(self)
            }

            fn reflect_mut(&mut self) -> ReflectMut<'_> {
                ReflectMut::Scalar(self)
            }
        }

        impl Scalar for $ty {
            fn apply_literal(&mut self, $lit: &str) -> Result<(), LiteralError> {
                *self = $parse?;
                Ok(())
            }
        }
    };
}

impl_scalar!(String, String, |literal| Ok::<_, LiteralError>(literal.to_owned()));
impl_scalar!(bool, Bool, |literal| parse_bool(literal));
impl_scalar!(Duration, Duration, |literal| parse_duration(literal));

macro_rules! impl_number {
    ($kind:ident, $label:literal: $($ty:ty),+) => {
        $( impl_scalar!($ty, $kind, |literal| parse_number::<$ty>(literal, $label)); )+
    };
}

impl_number!(Int, "int": i8, i16, i32, i64, i128, isize);
impl_number!(Uint, "uint": u8, u16, u32, u64, u128, usize);
impl_number!(Float, "float": f32, f64);

// ============================================================================
// POINTERS
// ============================================================================

impl<T: Reflect + Default> Reflect for Option<T> {
    fn kind(&self) -> Kind {
        Kind::Pointer
    }

    fn static_kind() -> Kind {
        Kind::Pointer
    }

    fn type_name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn is_zero(&self) -> bool {
        self.is_none()
    }

    fn reflect_ref(&self) -> ReflectRef<'_> {
        ReflectRef::Pointer(self.as_ref().map(|t| t as &dyn Reflect))
    }

    fn reflect_mut(&mut self) -> ReflectMut<'_> {
        ReflectMut::Pointer(self)
    }
}

impl<T: Reflect + Default> Pointer for Option<T> {
    fn target(&self) -> Option<&dyn Reflect> {
        self.as_ref().map(|t| t as &dyn Reflect)
    }

    fn target_mut(&mut self) -> Option<&mut dyn Reflect> {
        self.as_mut().map(|t| t as &mut dyn Reflect)
    }

    fn target_kind(&self) -> Kind {
        T::static_kind()
    }

    fn target_type_name(&self) -> &'static str {
        std::any::type_name::<T>()
    }

    fn allocate(&mut self) -> &mut dyn Reflect {
        self.get_or_insert_with(T::default)
    }

    fn clear(&mut self) {
        *self = None;
    }
}

/// `Box<T>` is transparent: it reports and exposes `T` itself.
impl<T: Reflect> Reflect for Box<T> {
    fn kind(&self) -> Kind {
        (**self).kind()
    }

    fn static_kind() -> Kind {
        T::static_kind()
    }

    fn type_name(&self) -> &'static str {
        (**self).type_name()
    }

    fn as_any(&self) -> &dyn Any {
        (**self).as_any()
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        (**self).as_any_mut()
    }

    fn is_zero(&self) -> bool {
        (**self).is_zero()
    }

    fn reflect_ref(&self) -> ReflectRef<'_> {
        (**self).reflect_ref()
    }

    fn reflect_mut(&mut self) -> ReflectMut<'_> {
        (**self).reflect_mut()
    }
}

// ============================================================================
// LISTS
// ============================================================================

macro_rules! impl_list_reflect {
    () => {
        fn kind(&self) -> Kind {
            Kind::List
        }

        fn static_kind() -> Kind {
            Kind::List
        }

        fn type_name(&self) -> &'static str {
            std::any::type_name::<Self>()
        }

        fn as_any(&self) -> &dyn Any {
            self
        }

        fn as_any_mut(&mut self) -> &mut dyn Any {
            self
        }

        fn reflect_ref(&self) -> ReflectRef<'_> {
            ReflectRef::List(self)
        }

        fn reflect_mut(&mut self) -> ReflectMut<'_> {
            ReflectMut::List(self)
        }
    };
}

impl<T: Reflect> Reflect for Vec<T> {
    impl_list_reflect!();

    fn is_zero(&self) -> bool {
        self.is_empty()
    }
}

impl<T: Reflect> List for Vec<T> {
    fn len(&self) -> usize {
        self.as_slice().len()
    }

    fn get(&self, index: usize) -> Option<&dyn Reflect> {
        self.as_slice().get(index).map(|t| t as &dyn Reflect)
    }

    fn get_mut(&mut self, index: usize) -> Option<&mut dyn Reflect> {
        self.as_mut_slice().get_mut(index).map(|t| t as &mut dyn Reflect)
    }
}

impl<T: Reflect, const N: usize> Reflect for [T; N] {
    impl_list_reflect!();

    fn is_zero(&self) -> bool {
        self.iter().all(Reflect::is_zero)
    }
}

impl<T: Reflect, const N: usize> List for [T; N] {
    fn len(&self) -> usize {
        N
    }

    fn get(&self, index: usize) -> Option<&dyn Reflect> {
        self.as_slice().get(index).map(|t| t as &dyn Reflect)
    }

    fn get_mut(&mut self, index: usize) -> Option<&mut dyn Reflect> {
        self.as_mut_slice().get_mut(index).map(|t| t as &mut dyn Reflect)
    }
}

// ============================================================================
// MAPS
// ============================================================================

macro_rules! impl_map_reflect {
    () => {
        fn kind(&self) -> Kind {
            Kind::Map
        }

        fn static_kind() -> Kind {
            Kind::Map
        }

        fn type_name(&self) -> &'static str {
            std::any::type_name::<Self>()
        }

        fn as_any(&self) -> &dyn Any {
            self
        }

        fn as_any_mut(&mut self) -> &mut dyn Any {
            self
        }

        fn is_zero(&self) -> bool {
            Map::is_empty(self)
        }

        fn reflect_ref(&self) -> ReflectRef<'_> {
            ReflectRef::Map(self)
        }

        fn reflect_mut(&mut self) -> ReflectMut<'_> {
            ReflectMut::Map(self)
        }
    };
}

impl<K, V, S> Reflect for HashMap<K, V, S>
where
    K: Reflect + Display + Eq + Hash,
    V: Reflect,
    S: BuildHasher + Send + Sync + 'static,
{
    impl_map_reflect!();
}

impl<K, V, S> Map for HashMap<K, V, S>
where
    K: Reflect + Display + Eq + Hash,
    V: Reflect,
    S: BuildHasher + Send + Sync + 'static,
{
    fn len(&self) -> usize {
        HashMap::len(self)
    }

    fn entries(&self) -> Vec<MapEntry<'_>> {
        let mut entries: Vec<_> = self
            .iter()
            .map(|(k, v)| MapEntry {
                label: k.to_string(),
                key: k as &dyn Reflect,
                value: v as &dyn Reflect,
            })
            .collect();
        entries.sort_by(|a, b| a.label.cmp(&b.label));
        entries
    }

    fn values_mut(&mut self) -> Vec<(String, &mut dyn Reflect)> {
        let mut values: Vec<_> = self
            .iter_mut()
            .map(|(k, v)| (k.to_string(), v as &mut dyn Reflect))
            .collect();
        values.sort_by(|a, b| a.0.cmp(&b.0));
        values
    }
}

impl<K, V> Reflect for BTreeMap<K, V>
where
    K: Reflect + Display + Ord,
    V: Reflect,
{
    impl_map_reflect!();
}

impl<K, V> Map for BTreeMap<K, V>
where
    K: Reflect + Display + Ord,
    V: Reflect,
{
    fn len(&self) -> usize {
        BTreeMap::len(self)
    }

    fn entries(&self) -> Vec<MapEntry<'_>> {
        self.iter()
            .map(|(k, v)| MapEntry {
                label: k.to_string(),
                key: k as &dyn Reflect,
                value: v as &dyn Reflect,
            })
            .collect()
    }

    fn values_mut(&mut self) -> Vec<(String, &mut dyn Reflect)> {
        self.iter_mut()
            .map(|(k, v)| (k.to_string(), v as &mut dyn Reflect))
            .collect()
    }
}
