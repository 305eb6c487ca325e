//! Refreshing caller-owned entities from translated rows.
//!
//! Hydration is destructive: the entity is emptied first, so fields missing
//! from the row end up cleared rather than left stale. Running it twice with
//! the same rows leaves the entity in the same state.

use crate::error::HydrateError;
use crate::translate::{Row, NORMALIZED_KEYS};
use serde_json::{Map, Value};
use std::collections::{BTreeMap, BTreeSet};
use tracing::debug;

/// A domain object that can be refreshed from a result row.
pub trait Entity: Send {
    /// Clear every field.
    fn empty(&mut self);

    /// Assign every field in `fields`.
    ///
    /// With `reset_initial`, the assigned values also become the baseline
    /// that later change tracking compares against.
    fn hydrate(
        &mut self,
        fields: &Map<String, Value>,
        reset_initial: bool,
    ) -> Result<(), HydrateError>;
}

/// Script variable name to the entity refreshed from it.
pub type Bindings<'a> = BTreeMap<String, &'a mut dyn Entity>;

/// Apply every bound row in `rows` to its entity.
///
/// Rows whose binding has no entity in `bindings` are skipped. A bound `null`
/// empties the entity; any other non-mapping bound value is an error. The
/// first entity that cannot be refreshed stops the pass and the error is
/// returned; entities refreshed before it keep their new state.
///
/// Returns the number of entities refreshed.
pub fn hydrate(bindings: &mut Bindings<'_>, rows: &[Row]) -> Result<usize, HydrateError> {
    let mut refreshed = 0;
    for row in rows {
        match row {
            Row::Record(record) => {
                let Some(name) = record.binding() else {
                    continue;
                };
                let Some(entity) = bindings.get_mut(name) else {
                    continue;
                };
                entity.empty();
                entity.hydrate(record.fields(), true)?;
                debug!(binding = name, fields = record.fields().len(), "hydrated entity");
            }
            Row::BoundValue(bound) => {
                let Some(entity) = bindings.get_mut(bound.binding()) else {
                    continue;
                };
                if !bound.value().is_null() {
                    return Err(HydrateError::NotAMapping {
                        binding: bound.binding().to_string(),
                        found: bound.value().clone(),
                    });
                }
                entity.empty();
                entity.hydrate(&Map::new(), true)?;
                debug!(binding = bound.binding(), "bound variable is null; entity emptied");
            }
            Row::Value(_) => continue,
        }
        refreshed += 1;
    }
    Ok(refreshed)
}

/// Map-backed entity for results without a dedicated type.
///
/// By default any field is accepted. [`GenericEntity::with_schema`] restricts
/// it to a declared set of fields (plus `id`, `type` and `label`).
#[derive(Clone, Debug, Default, PartialEq)]
pub struct GenericEntity {
    fields: Map<String, Value>,
    initial: Map<String, Value>,
    schema: Option<BTreeSet<String>>,
}

impl GenericEntity {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// An entity that rejects fields outside `fields`.
    #[must_use]
    pub fn with_schema<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            schema: Some(fields.into_iter().map(Into::into).collect()),
            ..Self::default()
        }
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    pub fn id(&self) -> Option<&Value> {
        self.get("id").filter(|value| !value.is_null())
    }

    pub fn label(&self) -> Option<&str> {
        self.get("label").and_then(Value::as_str)
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }

    /// Set one field, subject to the schema.
    pub fn set(&mut self, field: impl Into<String>, value: Value) -> Result<(), HydrateError> {
        let field = field.into();
        self.check_field(&field)?;
        self.fields.insert(field, value);
        Ok(())
    }

    /// Fields whose value differs from the last baseline, with their new values.
    ///
    /// Removed fields are reported as `null`.
    pub fn changed_fields(&self) -> Map<String, Value> {
        let mut changed = Map::new();
        for (field, value) in &self.fields {
            if self.initial.get(field) != Some(value) {
                changed.insert(field.clone(), value.clone());
            }
        }
        for field in self.initial.keys() {
            if !self.fields.contains_key(field) {
                changed.insert(field.clone(), Value::Null);
            }
        }
        changed
    }

    pub fn is_dirty(&self) -> bool {
        self.fields != self.initial
    }

    fn check_field(&self, field: &str) -> Result<(), HydrateError> {
        match &self.schema {
            Some(schema) if !schema.contains(field) && !NORMALIZED_KEYS.contains(&field) => {
                Err(HydrateError::UnknownField {
                    field: field.to_string(),
                })
            }
            _ => Ok(()),
        }
    }
}

impl Entity for GenericEntity {
    fn empty(&mut self) {
        self.fields.clear();
    }

    fn hydrate(
        &mut self,
        fields: &Map<String, Value>,
        reset_initial: bool,
    ) -> Result<(), HydrateError> {
        for field in fields.keys() {
            self.check_field(field)?;
        }
        for (field, value) in fields {
            self.fields.insert(field.clone(), value.clone());
        }
        if reset_initial {
            self.initial = self.fields.clone();
        }
        Ok(())
    }
}
