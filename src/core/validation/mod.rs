//! Validation and filtering of form input
//!
//! Admin forms declare [`FormRules`]: per field, filters normalize the value,
//! then validators check it. Input that fails never reaches the API.
//!
//! ```rust,ignore
//! let rules = FormRules::new()
//!     .filter("name", filters::trim())
//!     .validate("name", validators::required())
//!     .filter("email", filters::lowercase())
//!     .validate("email", validators::email());
//!
//! let fields = rules.apply(fields)?;
//! ```

pub mod filters;
pub mod validators;

use crate::core::error::{FieldError, ValidationError};
use crate::core::field::FieldValue;
use crate::core::service::Fields;
use indexmap::IndexMap;
use std::fmt;
use std::sync::Arc;

type FilterFn = Arc<dyn Fn(&str, FieldValue) -> FieldValue + Send + Sync>;
type ValidatorFn = Arc<dyn Fn(&str, &FieldValue) -> Result<(), String> + Send + Sync>;

#[derive(Clone, Default)]
struct FieldRules {
    filters: Vec<FilterFn>,
    validators: Vec<ValidatorFn>,
}

/// Filters and validators for the fields of one form
#[derive(Clone, Default)]
pub struct FormRules {
    fields: IndexMap<String, FieldRules>,
}

impl fmt::Debug for FormRules {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FormRules")
            .field("fields", &self.fields.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl FormRules {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a filter applied to `field` before validation
    pub fn filter<F>(mut self, field: &str, filter: F) -> Self
    where
        F: Fn(&str, FieldValue) -> FieldValue + Send + Sync + 'static,
    {
        self.fields
            .entry(field.to_string())
            .or_default()
            .filters
            .push(Arc::new(filter));
        self
    }

    /// Add a validator for `field`
    pub fn validate<V>(mut self, field: &str, validator: V) -> Self
    where
        V: Fn(&str, &FieldValue) -> Result<(), String> + Send + Sync + 'static,
    {
        self.fields
            .entry(field.to_string())
            .or_default()
            .validators
            .push(Arc::new(validator));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Normalize and check a complete form (create)
    ///
    /// Fields with rules that are absent from the form are checked as null.
    pub fn apply(&self, fields: Fields) -> Result<Fields, ValidationError> {
        self.run(fields, false)
    }

    /// Normalize and check a partial form (update)
    ///
    /// Only the submitted fields are checked.
    pub fn apply_partial(&self, fields: Fields) -> Result<Fields, ValidationError> {
        self.run(fields, true)
    }

    fn run(&self, mut fields: Fields, partial: bool) -> Result<Fields, ValidationError> {
        let mut errors = Vec::new();

        for (name, rules) in &self.fields {
            let value = match fields.get(name) {
                Some(v) => v.clone(),
                None if partial => continue,
                None => FieldValue::Null,
            };

            let value = rules
                .filters
                .iter()
                .fold(value, |acc, filter| filter(name, acc));

            for validator in &rules.validators {
                if let Err(message) = validator(name, &value) {
                    errors.push(FieldError {
                        field: name.clone(),
                        message,
                    });
                }
            }

            if fields.contains_key(name) {
                fields.insert(name.clone(), value);
            }
        }

        if errors.is_empty() {
            Ok(fields)
        } else {
            Err(ValidationError::FieldErrors(errors))
        }
    }
}
