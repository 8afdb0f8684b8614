//! Reusable field validators
//!
//! These validators check admin form input before it is sent

use crate::core::field::{FieldFormat, FieldValue};

/// Validator: field is required (not null, not blank)
pub fn required() -> impl Fn(&str, &FieldValue) -> Result<(), String> + Send + Sync + Clone {
    |field: &str, value: &FieldValue| {
        let missing = match value {
            FieldValue::Null => true,
            FieldValue::String(s) => s.trim().is_empty(),
            FieldValue::List(items) => items.is_empty(),
            _ => false,
        };

        if missing {
            Err(format!("Le champ '{}' est requis", field))
        } else {
            Ok(())
        }
    }
}

/// Validator: number must be positive
pub fn positive() -> impl Fn(&str, &FieldValue) -> Result<(), String> + Send + Sync + Clone {
    |field: &str, value: &FieldValue| match value.as_float() {
        Some(num) if num <= 0.0 => Err(format!(
            "Le champ '{}' doit être positif (valeur: {})",
            field, num
        )),
        _ => Ok(()),
    }
}

/// Validator: string length must be within range
pub fn string_length(
    min: usize,
    max: usize,
) -> impl Fn(&str, &FieldValue) -> Result<(), String> + Send + Sync + Clone {
    move |field: &str, value: &FieldValue| {
        let Some(s) = value.as_string() else {
            return Ok(());
        };

        let len = s.chars().count();
        if len < min {
            Err(format!(
                "'{}' doit avoir au moins {} caractères (actuellement: {})",
                field, min, len
            ))
        } else if len > max {
            Err(format!(
                "'{}' ne doit pas dépasser {} caractères (actuellement: {})",
                field, max, len
            ))
        } else {
            Ok(())
        }
    }
}

/// Validator: string must be an email address
pub fn email() -> impl Fn(&str, &FieldValue) -> Result<(), String> + Send + Sync + Clone {
    format(FieldFormat::Email, "une adresse email valide")
}

/// Validator: string must be an http(s) URL
pub fn url() -> impl Fn(&str, &FieldValue) -> Result<(), String> + Send + Sync + Clone {
    format(FieldFormat::Url, "une URL valide")
}

/// Validator: string must match a [`FieldFormat`]
///
/// Null values pass; combine with [`required`] to forbid them.
pub fn format(
    format: FieldFormat,
    description: &'static str,
) -> impl Fn(&str, &FieldValue) -> Result<(), String> + Send + Sync + Clone {
    move |field: &str, value: &FieldValue| {
        if value.is_null() || format.validate(value) {
            Ok(())
        } else {
            Err(format!("'{}' doit être {}", field, description))
        }
    }
}

/// Validator: value must be in allowed list
pub fn one_of(
    allowed: Vec<String>,
) -> impl Fn(&str, &FieldValue) -> Result<(), String> + Send + Sync + Clone {
    move |field: &str, value: &FieldValue| match value.as_string() {
        Some(s) if !allowed.iter().any(|a| a == s) => Err(format!(
            "'{}' doit être l'une des valeurs: {:?} (valeur actuelle: {})",
            field, allowed, s
        )),
        _ => Ok(()),
    }
}
