//! Client-side checks on the registration form.
//!
//! Rules are evaluated on trimmed input and the first violation wins, in
//! this order: missing required field, name length, phone shape, DNI shape.

use validator::{Validate, ValidationError as FieldError};

use crate::error::ValidationError;

pub const NAME_MAX_LEN: usize = 45;
pub const PHONE_LEN: usize = 9;
pub const DNI_MAX_LEN: usize = 11;

/// Per-field shape rules. Presence is checked separately, before these.
#[derive(Debug, Validate)]
struct FieldRules {
    #[validate(length(max = 45))]
    name: String,
    #[validate(length(equal = 9), custom = "all_digits")]
    phone_number: String,
    #[validate(length(max = 11), custom = "all_digits")]
    dni: Option<String>,
}

fn all_digits(value: &str) -> Result<(), FieldError> {
    if !value.is_empty() && value.chars().all(|c| c.is_ascii_digit()) {
        Ok(())
    } else {
        Err(FieldError::new("digits"))
    }
}

/// Trimmed form values that passed every rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidFields {
    pub name: String,
    pub phone_number: String,
    pub dni: Option<String>,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct FieldValidator {
    /// When set, an empty DNI counts as a missing required field.
    pub require_dni: bool,
}

impl FieldValidator {
    pub fn new(require_dni: bool) -> Self {
        Self { require_dni }
    }

    pub fn validate(
        &self,
        name: &str,
        phone_number: &str,
        dni: &str,
        has_photo: bool,
    ) -> Result<ValidFields, ValidationError> {
        let name = name.trim();
        let phone_number = phone_number.trim();
        let dni = Some(dni.trim()).filter(|d| !d.is_empty());

        if name.is_empty()
            || phone_number.is_empty()
            || !has_photo
            || (self.require_dni && dni.is_none())
        {
            return Err(ValidationError::MissingRequiredFields {
                dni_required: self.require_dni,
            });
        }

        let rules = FieldRules {
            name: name.to_string(),
            phone_number: phone_number.to_string(),
            dni: dni.map(str::to_string),
        };

        if let Err(errors) = rules.validate() {
            let fields = errors.field_errors();
            let violation = if fields.contains_key("name") {
                ValidationError::NameTooLong { max: NAME_MAX_LEN }
            } else if fields.contains_key("phone_number") {
                ValidationError::InvalidPhone { len: PHONE_LEN }
            } else {
                ValidationError::InvalidDni { max: DNI_MAX_LEN }
            };
            return Err(violation);
        }

        Ok(ValidFields {
            name: rules.name,
            phone_number: rules.phone_number,
            dni: rules.dni,
        })
    }
}
