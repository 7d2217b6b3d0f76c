//! Generic form state: current field values plus per-field error messages.
//!
//! The controller knows nothing about tasks. A record shape plugs in by
//! implementing [`FormValues`], and validation is an ordinary function from
//! values to an error map.

use std::collections::BTreeMap;
use std::fmt::Debug;

/// Field name to error message. Only failing fields appear.
pub type FieldErrors<F> = BTreeMap<F, String>;

/// A record whose fields can be read and written as text by field id.
pub trait FormValues {
    type Field: Copy + Ord + Debug;

    fn get(&self, field: Self::Field) -> &str;

    fn set(&mut self, field: Self::Field, value: String);
}

/// Values and validation errors for one form instance.
pub struct FormState<V: FormValues> {
    values: V,
    errors: FieldErrors<V::Field>,
    validator: fn(&V) -> FieldErrors<V::Field>,
}

impl<V: FormValues> FormState<V> {
    pub fn new(initial_values: V, validator: fn(&V) -> FieldErrors<V::Field>) -> Self {
        FormState {
            values: initial_values,
            errors: FieldErrors::new(),
            validator,
        }
    }

    pub fn values(&self) -> &V {
        &self.values
    }

    pub fn into_values(self) -> V {
        self.values
    }

    pub fn errors(&self) -> &FieldErrors<V::Field> {
        &self.errors
    }

    pub fn error(&self, field: V::Field) -> Option<&str> {
        self.errors.get(&field).map(String::as_str)
    }

    /// Set a field and drop any error recorded for it. The field is not re-validated.
    pub fn handle_change(&mut self, field: V::Field, value: String) {
        self.values.set(field, value);
        self.errors.remove(&field);
    }

    /// Re-run validation over the current values, replacing all errors.
    /// Returns true when no field failed.
    pub fn validate(&mut self) -> bool {
        self.errors = (self.validator)(&self.values);
        self.errors.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Default)]
    struct Login {
        user: String,
        pass: String,
    }

    #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
    enum LoginField {
        User,
        Pass,
    }

    impl FormValues for Login {
        type Field = LoginField;

        fn get(&self, field: LoginField) -> &str {
            match field {
                LoginField::User => &self.user,
                LoginField::Pass => &self.pass,
            }
        }

        fn set(&mut self, field: LoginField, value: String) {
            match field {
                LoginField::User => self.user = value,
                LoginField::Pass => self.pass = value,
            }
        }
    }

    fn validate_login(v: &Login) -> FieldErrors<LoginField> {
        let mut errors = FieldErrors::new();
        if v.user.is_empty() {
            errors.insert(LoginField::User, "required".into());
        }
        if v.pass.len() < 4 {
            errors.insert(LoginField::Pass, "too short".into());
        }
        errors
    }

    #[test]
    fn test_validate_on_empty_values_reports_every_field() {
        let mut form = FormState::new(Login::default(), validate_login);
        assert!(!form.validate());
        assert_eq!(form.errors().len(), 2);
    }

    #[test]
    fn test_change_clears_only_that_fields_error() {
        let mut form = FormState::new(Login::default(), validate_login);
        form.validate();
        form.handle_change(LoginField::Pass, "x".into());
        // Cleared optimistically even though "x" is still too short.
        assert_eq!(form.error(LoginField::Pass), None);
        assert_eq!(form.error(LoginField::User), Some("required"));
        assert_eq!(form.values().get(LoginField::Pass), "x");
    }

    #[test]
    fn test_validate_replaces_errors() {
        let mut form = FormState::new(Login::default(), validate_login);
        form.validate();
        form.handle_change(LoginField::User, "ana".into());
        form.handle_change(LoginField::Pass, "secret".into());
        assert!(form.validate());
        assert!(form.errors().is_empty());
        assert_eq!(form.into_values().user, "ana");
    }
}
