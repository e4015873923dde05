//! Default application walk

use std::any::TypeId;

use crate::annotation::{ALLOC, DISABLED, DIVE};
use crate::error::Error;
use crate::reflect::{Kind, Pointer, Record, Reflect, ReflectMut};

use super::{Engine, invalid_target, join_path};

/// Record types whose freshly allocated instances are being filled.
///
/// Everything below a `dive` allocation is a default value, so meeting the
/// same type again inside that chain would allocate forever.
type Chain = Vec<TypeId>;

impl Engine {
    /// Fills zero-valued fields of `target` from their default annotations.
    ///
    /// `target` must be a record or a non-null pointer to one. Nested
    /// records are filled before the enclosing field's own annotation is
    /// applied. Stops at the first error; fields already written stay
    /// written.
    ///
    /// Applying defaults twice leaves the value unchanged: literals are
    /// only written into zero fields.
    ///
    /// A `dive` allocation is skipped (the pointer stays null) when the
    /// record type is already being filled by an enclosing `dive`
    /// allocation, so self-referential types such as linked nodes get one
    /// level allocated per pass.
    pub fn apply_defaults(&self, target: &mut dyn Reflect) -> Result<(), Error> {
        match target.as_record_mut() {
            Some(record) => self.default_record(record, "", &mut Chain::new()),
            None => Err(invalid_target(target)),
        }
    }

    fn default_record(
        &self,
        record: &mut dyn Record,
        prefix: &str,
        chain: &mut Chain,
    ) -> Result<(), Error> {
        let descriptor = record.descriptor();
        for field in descriptor.fields() {
            if self.skips(field) {
                continue;
            }
            let Some(value) = record.field_mut(field.index()) else {
                continue;
            };
            let path = join_path(prefix, field.name());

            if let Some(nested) = value.as_record_mut() {
                self.default_record(nested, &path, chain)?;
            }
            if let Some(annotation) = field.default_annotation() {
                self.apply_default(value, &path, annotation, chain)?;
            }
            if let Some(annotation) = field.default_elem_annotation() {
                self.apply_elem_defaults(value, &path, annotation, chain)?;
            }
        }
        Ok(())
    }

    fn apply_default(
        &self,
        value: &mut dyn Reflect,
        path: &str,
        annotation: &str,
        chain: &mut Chain,
    ) -> Result<(), Error> {
        match annotation.trim() {
            "" | DISABLED => Ok(()),
            DIVE => self.dive_default(value, path, chain),
            ALLOC => {
                allocate_collection(value);
                Ok(())
            }
            _ => set_literal(value, path, annotation),
        }
    }

    fn dive_default(
        &self,
        value: &mut dyn Reflect,
        path: &str,
        chain: &mut Chain,
    ) -> Result<(), Error> {
        let kind = value.kind();
        match value.reflect_mut() {
            // Already walked by the nested-record pass.
            ReflectMut::Record(_) => Ok(()),
            ReflectMut::Pointer(pointer) if pointer.target_kind() == Kind::Record => {
                if pointer.target().is_some() {
                    return Ok(());
                }
                self.allocate_record(pointer, path, chain)
            }
            ReflectMut::Pointer(pointer) => Err(Error::cannot_set_default(
                path,
                format!("`dive` needs a record, found pointer to {}", pointer.target_kind()),
            )),
            _ => Err(Error::cannot_set_default(
                path,
                format!("`dive` needs a record, found {kind}"),
            )),
        }
    }

    /// Allocates the record behind a null pointer and fills it, unless the
    /// record type is already in `chain`.
    fn allocate_record(
        &self,
        pointer: &mut dyn Pointer,
        path: &str,
        chain: &mut Chain,
    ) -> Result<(), Error> {
        let Some(record) = pointer.allocate().as_record_mut() else {
            return Ok(());
        };
        let descriptor = record.descriptor();
        if chain.contains(&descriptor.type_id()) {
            tracing::debug!(
                path,
                record = descriptor.type_name(),
                "recursive dive, pointer left null"
            );
            pointer.clear();
            return Ok(());
        }

        chain.push(descriptor.type_id());
        let result = self.default_record(record, path, chain);
        chain.pop();
        result
    }

    fn apply_elem_defaults(
        &self,
        value: &mut dyn Reflect,
        path: &str,
        annotation: &str,
        chain: &mut Chain,
    ) -> Result<(), Error> {
        let token = annotation.trim();
        if token.is_empty() || token == DISABLED {
            return Ok(());
        }
        let dive = token == DIVE;
        let kind = value.kind();

        match value.reflect_mut() {
            ReflectMut::List(list) => {
                for index in 0..list.len() {
                    if let Some(element) = list.get_mut(index) {
                        let element_path = format!("{path}[{index}]");
                        self.default_element(element, &element_path, annotation, dive, chain)?;
                    }
                }
                Ok(())
            }
            ReflectMut::Map(map) => {
                for (label, element) in map.values_mut() {
                    let element_path = format!("{path}[{label}]");
                    self.default_element(element, &element_path, annotation, dive, chain)?;
                }
                Ok(())
            }
            ReflectMut::Pointer(pointer) => match pointer.target_mut() {
                Some(target) => self.apply_elem_defaults(target, path, annotation, chain),
                None => Ok(()),
            },
            _ => Err(Error::cannot_set_default(
                path,
                format!("element defaults need a list or map, found {kind}"),
            )),
        }
    }

    fn default_element(
        &self,
        element: &mut dyn Reflect,
        path: &str,
        annotation: &str,
        dive: bool,
        chain: &mut Chain,
    ) -> Result<(), Error> {
        if !dive {
            return set_literal(element, path, annotation);
        }

        let type_name = element.type_name();
        match element.reflect_mut() {
            ReflectMut::Record(record) => self.default_record(record, path, chain),
            ReflectMut::Pointer(pointer) if pointer.target_kind() == Kind::Record => {
                if let Some(record) = pointer.target_mut().and_then(|t| t.as_record_mut()) {
                    return self.default_record(record, path, chain);
                }
                self.allocate_record(pointer, path, chain)
            }
            _ => Err(Error::DiveMisuse {
                path: path.to_owned(),
                type_name: type_name.to_owned(),
            }),
        }
    }
}

/// Allocates an empty collection behind a null pointer; no-op otherwise.
fn allocate_collection(value: &mut dyn Reflect) {
    if let ReflectMut::Pointer(pointer) = value.reflect_mut() {
        if pointer.target().is_none() && pointer.target_kind().is_collection() {
            pointer.allocate();
        }
    }
}

/// Writes `literal` into a zero scalar, or into a freshly allocated scalar
/// behind a null pointer.
fn set_literal(value: &mut dyn Reflect, path: &str, literal: &str) -> Result<(), Error> {
    let kind = value.kind();
    match value.reflect_mut() {
        ReflectMut::Scalar(scalar) => {
            if scalar.is_zero() {
                scalar
                    .apply_literal(literal)
                    .map_err(|e| Error::cannot_set_default(path, e.to_string()))?;
            }
            Ok(())
        }
        ReflectMut::Pointer(pointer) => set_pointer_literal(pointer, path, literal),
        _ => Err(Error::cannot_set_default(
            path,
            format!("literal `{literal}` cannot be assigned to a {kind}"),
        )),
    }
}

fn set_pointer_literal(pointer: &mut dyn Pointer, path: &str, literal: &str) -> Result<(), Error> {
    if pointer.target().is_some() {
        return Ok(());
    }
    let target_kind = pointer.target_kind();
    if !target_kind.is_scalar() {
        return Err(Error::cannot_set_default(
            path,
            format!("literal `{literal}` cannot be assigned through a pointer to {target_kind}"),
        ));
    }

    let result = match pointer.allocate().reflect_mut() {
        ReflectMut::Scalar(scalar) => scalar
            .apply_literal(literal)
            .map_err(|e| Error::cannot_set_default(path, e.to_string())),
        _ => Err(Error::cannot_set_default(
            path,
            format!("pointer target is not a {target_kind}"),
        )),
    };
    if result.is_err() {
        pointer.clear();
    }
    result
}
