//! Validation walk

use tokio_util::sync::CancellationToken;

use crate::annotation::{AnnotationKey, AnnotationKind, DIVE, ParsedRule, is_dive};
use crate::error::{Error, FieldError, ValidationErrors};
use crate::reflect::{FieldDescriptor, Record, RecordDescriptor, Reflect, ReflectRef};

use super::{Engine, join_path, root_record};

/// State of one validation pass.
struct Pass<'a> {
    cancel: &'a CancellationToken,
    errors: ValidationErrors,
}

impl Pass<'_> {
    fn checkpoint(&self, path: &str) -> Result<(), Error> {
        if self.cancel.is_cancelled() {
            tracing::debug!(path, collected = self.errors.len(), "validation cancelled");
            return Err(Error::Cancelled);
        }
        Ok(())
    }
}

impl Engine {
    /// Validates `target` and collects every failing rule.
    ///
    /// Field paths are rooted at `prefix` (`""` for none). Returns the
    /// possibly empty aggregate, [`Error::InvalidTarget`] when `target` is
    /// not a record, or [`Error::Cancelled`] once `cancel` fires; errors
    /// found before cancellation are discarded.
    pub fn validate_record(
        &self,
        cancel: &CancellationToken,
        target: &dyn Reflect,
        prefix: &str,
    ) -> Result<ValidationErrors, Error> {
        let record = root_record(target)?;
        let mut pass = Pass {
            cancel,
            errors: ValidationErrors::new(),
        };
        self.validate_fields(&mut pass, record, prefix)?;

        tracing::debug!(
            record = record.descriptor().type_name(),
            errors = pass.errors.len(),
            "validation finished"
        );
        Ok(pass.errors)
    }

    /// Validates `target` without cancellation or path prefix.
    ///
    /// Any field failure is returned as [`Error::Validation`].
    pub fn validate(&self, target: &dyn Reflect) -> Result<(), Error> {
        self.validate_record(&CancellationToken::new(), target, "")?
            .into_result()
    }

    fn validate_fields(
        &self,
        pass: &mut Pass<'_>,
        record: &dyn Record,
        prefix: &str,
    ) -> Result<(), Error> {
        let descriptor = record.descriptor();
        for field in descriptor.fields() {
            let path = join_path(prefix, field.name());
            pass.checkpoint(&path)?;
            if self.skips(field) {
                continue;
            }
            let Some(value) = record.field(field.index()) else {
                continue;
            };

            if let Some(nested) = value.as_record() {
                self.validate_fields(pass, nested, &path)?;
            }
            if let Some(raw) = field.validate_annotation() {
                let rules = self.parsed(descriptor, field, AnnotationKind::Validate, raw);
                self.apply_rules(pass, value, &path, &rules);
            }
            if let Some(raw) = field.validate_elem_annotation() {
                self.validate_elements(pass, descriptor, field, value, &path, raw)?;
            }
            if let Some(raw) = field.validate_key_annotation() {
                self.validate_keys(pass, descriptor, field, value, &path, raw)?;
            }
        }
        Ok(())
    }

    fn validate_elements(
        &self,
        pass: &mut Pass<'_>,
        descriptor: &RecordDescriptor,
        field: &FieldDescriptor,
        value: &dyn Reflect,
        path: &str,
        raw: &str,
    ) -> Result<(), Error> {
        let Some(elements) = collection_elements(value) else {
            pass.errors.push(not_a_collection(path, raw, value, "list or map"));
            return Ok(());
        };

        if is_dive(raw) {
            for (label, element) in elements {
                let element_path = format!("{path}[{label}]");
                pass.checkpoint(&element_path)?;
                match element.as_record() {
                    Some(record) => self.validate_fields(pass, record, &element_path)?,
                    None => {
                        let cause = Error::DiveMisuse {
                            path: element_path.clone(),
                            type_name: element.type_name().to_owned(),
                        };
                        pass.errors
                            .push(FieldError::new(element_path, DIVE, Vec::new(), cause));
                    }
                }
            }
            return Ok(());
        }

        let rules = self.parsed(descriptor, field, AnnotationKind::ValidateElem, raw);
        for (label, element) in elements {
            let element_path = format!("{path}[{label}]");
            pass.checkpoint(&element_path)?;
            self.apply_rules(pass, element, &element_path, &rules);
        }
        Ok(())
    }

    fn validate_keys(
        &self,
        pass: &mut Pass<'_>,
        descriptor: &RecordDescriptor,
        field: &FieldDescriptor,
        value: &dyn Reflect,
        path: &str,
        raw: &str,
    ) -> Result<(), Error> {
        let Some(keys) = map_keys(value) else {
            pass.errors.push(not_a_collection(path, raw, value, "map"));
            return Ok(());
        };

        let rules = self.parsed(descriptor, field, AnnotationKind::ValidateKey, raw);
        for (label, key) in keys {
            let key_path = format!("{path}[{label}]");
            pass.checkpoint(&key_path)?;
            self.apply_rules(pass, key, &key_path, &rules);
        }
        Ok(())
    }

    fn apply_rules(
        &self,
        pass: &mut Pass<'_>,
        value: &dyn Reflect,
        path: &str,
        rules: &[ParsedRule],
    ) {
        for rule in rules.iter().filter(|r| !r.is_reserved()) {
            let outcome = self
                .registry
                .resolve(&rule.name, Some(value))
                .and_then(|resolved| resolved.invoke(value, &rule.params));
            if let Err(cause) = outcome {
                tracing::trace!(path, rule = %rule, "rule failed");
                pass.errors
                    .push(FieldError::new(path, &rule.name, rule.params.clone(), cause));
            }
        }
    }

    fn parsed(
        &self,
        descriptor: &RecordDescriptor,
        field: &FieldDescriptor,
        kind: AnnotationKind,
        raw: &str,
    ) -> std::sync::Arc<[ParsedRule]> {
        let key = AnnotationKey::new(descriptor.type_id(), field.index(), kind);
        self.annotations.get_or_parse(key, raw)
    }
}

/// Elements of a list, or values of a map, labelled for paths. A null
/// pointer to a collection has none.
fn collection_elements(value: &dyn Reflect) -> Option<Vec<(String, &dyn Reflect)>> {
    match value.reflect_ref() {
        ReflectRef::List(list) => Some(
            (0..list.len())
                .filter_map(|i| list.get(i).map(|e| (i.to_string(), e)))
                .collect(),
        ),
        ReflectRef::Map(map) => Some(
            map.entries()
                .into_iter()
                .map(|entry| (entry.label, entry.value))
                .collect(),
        ),
        ReflectRef::Pointer(Some(target)) => collection_elements(target),
        ReflectRef::Pointer(None) => Some(Vec::new()),
        _ => None,
    }
}

/// Keys of a map, labelled for paths.
fn map_keys(value: &dyn Reflect) -> Option<Vec<(String, &dyn Reflect)>> {
    match value.reflect_ref() {
        ReflectRef::Map(map) => Some(
            map.entries()
                .into_iter()
                .map(|entry| (entry.label, entry.key))
                .collect(),
        ),
        ReflectRef::Pointer(Some(target)) => map_keys(target),
        ReflectRef::Pointer(None) => Some(Vec::new()),
        _ => None,
    }
}

fn not_a_collection(path: &str, raw: &str, value: &dyn Reflect, expected: &str) -> FieldError {
    FieldError::new(
        path,
        raw.trim(),
        Vec::new(),
        Error::InvalidValue {
            rule: raw.trim().to_owned(),
            reason: format!("expected a {expected}, found `{}`", value.type_name()),
        },
    )
}
