//! Entity form dialog types.
//!
//! A [`FormSchema`] is the list of field descriptors a create/edit dialog
//! renders. [`FormSchema::validate`] checks submitted values against the
//! descriptors, and [`FormDialog`] is the open/submit/close state machine the
//! dialog runs through.

use chrono::{DateTime, NaiveDate};
use rust_decimal::Decimal;
use serde::Serialize;
use serde_json::{Map, Value};
use thiserror::Error;

use bazaar_core::{Email, FieldErrors};

use super::data_table::FilterOption;
use crate::models::validate::is_valid_url;

/// Submitted form values keyed by field name.
pub type FormValues = Map<String, Value>;

/// Input widget for a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    Text,
    Textarea,
    Email,
    Password,
    Select,
    MultiSelect,
    Url,
    File,
    Number,
    Checkbox,
    Date,
}

/// One field of a form.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FormField {
    pub name: String,
    pub label: String,
    pub kind: FieldKind,
    pub required: bool,
    pub placeholder: Option<String>,
    pub help: Option<String>,
    /// Fixed options for select fields.
    pub options: Vec<FilterOption>,
    /// Entity the client loads options from when they are not fixed
    /// (e.g. `categories` for a product's category select).
    pub options_source: Option<String>,
    pub min: Option<Decimal>,
    pub max: Option<Decimal>,
    pub max_length: Option<usize>,
    /// Initial value in a create dialog.
    pub default: Option<Value>,
}

impl FormField {
    /// Create an optional field.
    #[must_use]
    pub fn new(name: &str, label: &str, kind: FieldKind) -> Self {
        Self {
            name: name.to_string(),
            label: label.to_string(),
            kind,
            required: false,
            placeholder: None,
            help: None,
            options: vec![],
            options_source: None,
            min: None,
            max: None,
            max_length: None,
            default: None,
        }
    }

    #[must_use]
    pub fn text(name: &str, label: &str) -> Self {
        Self::new(name, label, FieldKind::Text)
    }

    #[must_use]
    pub fn textarea(name: &str, label: &str) -> Self {
        Self::new(name, label, FieldKind::Textarea)
    }

    #[must_use]
    pub fn url(name: &str, label: &str) -> Self {
        Self::new(name, label, FieldKind::Url)
    }

    #[must_use]
    pub fn number(name: &str, label: &str) -> Self {
        Self::new(name, label, FieldKind::Number)
    }

    /// A checkbox, initially ticked when `default` is set.
    #[must_use]
    pub fn checkbox(name: &str, label: &str, default: bool) -> Self {
        Self::new(name, label, FieldKind::Checkbox).default_value(Value::Bool(default))
    }

    #[must_use]
    pub fn select(name: &str, label: &str, options: Vec<FilterOption>) -> Self {
        Self {
            options,
            ..Self::new(name, label, FieldKind::Select)
        }
    }

    #[must_use]
    pub const fn required(mut self) -> Self {
        self.required = true;
        self
    }

    #[must_use]
    pub fn placeholder(mut self, placeholder: &str) -> Self {
        self.placeholder = Some(placeholder.to_string());
        self
    }

    #[must_use]
    pub fn help(mut self, help: &str) -> Self {
        self.help = Some(help.to_string());
        self
    }

    #[must_use]
    pub fn options_from(mut self, entity: &str) -> Self {
        self.options_source = Some(entity.to_string());
        self
    }

    #[must_use]
    pub const fn min(mut self, min: Decimal) -> Self {
        self.min = Some(min);
        self
    }

    #[must_use]
    pub const fn max(mut self, max: Decimal) -> Self {
        self.max = Some(max);
        self
    }

    #[must_use]
    pub const fn max_length(mut self, max_length: usize) -> Self {
        self.max_length = Some(max_length);
        self
    }

    #[must_use]
    pub fn default_value(mut self, value: Value) -> Self {
        self.default = Some(value);
        self
    }

    /// Check one submitted value, recording problems in `errors`.
    fn check(&self, value: Option<&Value>, errors: &mut FieldErrors) {
        let name = self.name.as_str();
        let Some(value) = value.filter(|v| !is_blank(v)) else {
            if self.required && self.kind != FieldKind::Checkbox {
                errors.add(name, "is required");
            }
            return;
        };

        match self.kind {
            FieldKind::Text | FieldKind::Textarea | FieldKind::Password | FieldKind::File => {
                self.check_text(value, errors);
            }
            FieldKind::Email => {
                if value.as_str().is_none_or(|s| Email::parse(s).is_err()) {
                    errors.add(name, "must be a valid email address");
                }
            }
            FieldKind::Url => {
                if value.as_str().is_none_or(|s| !is_valid_url(s.trim())) {
                    errors.add(name, "must be a valid URL");
                }
            }
            FieldKind::Number => self.check_number(value, errors),
            FieldKind::Checkbox => {
                if as_bool(value).is_none() {
                    errors.add(name, "must be true or false");
                }
            }
            FieldKind::Date => {
                if value.as_str().is_none_or(|s| !is_date(s.trim())) {
                    errors.add(name, "must be a valid date");
                }
            }
            FieldKind::Select => {
                if !self.accepts_option(value) {
                    errors.add(name, "is not one of the allowed options");
                }
            }
            FieldKind::MultiSelect => match value.as_array() {
                Some(items) if items.iter().all(|v| self.accepts_option(v)) => {}
                Some(_) => errors.add(name, "contains a value that is not allowed"),
                None => errors.add(name, "must be a list"),
            },
        }
    }

    fn check_text(&self, value: &Value, errors: &mut FieldErrors) {
        let Some(text) = value.as_str() else {
            errors.add(&self.name, "must be text");
            return;
        };
        if let Some(max) = self.max_length
            && text.trim().chars().count() > max
        {
            errors.add(&self.name, format!("must be at most {max} characters"));
        }
    }

    fn check_number(&self, value: &Value, errors: &mut FieldErrors) {
        let Some(number) = as_decimal(value) else {
            errors.add(&self.name, "must be a number");
            return;
        };
        if let Some(min) = self.min
            && number < min
        {
            errors.add(&self.name, format!("must be at least {min}"));
        }
        if let Some(max) = self.max
            && number > max
        {
            errors.add(&self.name, format!("must be at most {max}"));
        }
    }

    /// Fields without fixed options (loaded from another entity, or free
    /// lists) accept any scalar.
    fn accepts_option(&self, value: &Value) -> bool {
        let Some(text) = scalar_text(value) else {
            return false;
        };
        self.options.is_empty() || self.options.iter().any(|o| o.value == text)
    }
}

fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.trim().is_empty(),
        Value::Array(items) => items.is_empty(),
        _ => false,
    }
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn as_bool(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::String(s) => match s.trim() {
            "true" | "on" => Some(true),
            "false" | "off" => Some(false),
            _ => None,
        },
        _ => None,
    }
}

fn as_decimal(value: &Value) -> Option<Decimal> {
    match value {
        Value::Number(n) => n.to_string().parse().ok(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn is_date(text: &str) -> bool {
    NaiveDate::parse_from_str(text, "%Y-%m-%d").is_ok() || DateTime::parse_from_rfc3339(text).is_ok()
}

/// Field descriptors for one entity's create/edit dialog.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FormSchema {
    pub form_id: String,
    pub title: String,
    pub fields: Vec<FormField>,
}

impl FormSchema {
    #[must_use]
    pub fn new(form_id: &str, title: &str) -> Self {
        Self {
            form_id: form_id.to_string(),
            title: title.to_string(),
            fields: vec![],
        }
    }

    /// Add a field.
    #[must_use]
    pub fn field(mut self, field: FormField) -> Self {
        self.fields.push(field);
        self
    }

    /// Add a field only when `include` holds.
    #[must_use]
    pub fn field_if(self, include: bool, field: FormField) -> Self {
        if include { self.field(field) } else { self }
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&FormField> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Initial values for a create dialog.
    #[must_use]
    pub fn defaults(&self) -> FormValues {
        self.fields
            .iter()
            .filter_map(|f| f.default.clone().map(|v| (f.name.clone(), v)))
            .collect()
    }

    /// Check every field. Values for names the schema does not know are
    /// ignored.
    ///
    /// # Errors
    ///
    /// Returns every field-level problem found.
    pub fn validate(&self, values: &FormValues) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();
        for field in &self.fields {
            field.check(values.get(&field.name), &mut errors);
        }
        errors.into_result()
    }
}

/// Whether a dialog creates a new row or edits an existing one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DialogMode {
    Create,
    Edit { id: i32 },
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum DialogState {
    #[default]
    Closed,
    Open {
        mode: DialogMode,
        values: FormValues,
        errors: FieldErrors,
    },
    Submitting {
        mode: DialogMode,
        values: FormValues,
    },
}

/// A transition the dialog's current state does not allow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum DialogError {
    #[error("dialog is already open")]
    AlreadyOpen,
    #[error("dialog is not open")]
    NotOpen,
    #[error("dialog is not submitting")]
    NotSubmitting,
    #[error("a submission is in flight")]
    Busy,
}

/// Result of [`FormDialog::submit`].
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    /// Validation failed; the dialog stays open showing these errors.
    Invalid(FieldErrors),
    /// Values passed validation; the dialog is now submitting them.
    Ready { mode: DialogMode, values: FormValues },
}

/// The create/edit dialog state machine.
///
/// `Closed -> Open -> Submitting -> Closed`, or back to `Open` with errors
/// when validation or the server rejects the values. A disallowed
/// transition returns [`DialogError`] and leaves the state untouched.
#[derive(Debug, Clone)]
pub struct FormDialog {
    schema: FormSchema,
    state: DialogState,
}

impl FormDialog {
    #[must_use]
    pub fn new(schema: FormSchema) -> Self {
        Self {
            schema,
            state: DialogState::Closed,
        }
    }

    #[must_use]
    pub const fn state(&self) -> &DialogState {
        &self.state
    }

    #[must_use]
    pub const fn schema(&self) -> &FormSchema {
        &self.schema
    }

    /// Open empty, with the schema defaults.
    ///
    /// # Errors
    ///
    /// Returns `DialogError::AlreadyOpen` unless the dialog is closed.
    pub fn open_create(&mut self) -> Result<(), DialogError> {
        let values = self.schema.defaults();
        self.open(DialogMode::Create, values)
    }

    /// Open prefilled with an existing row's values.
    ///
    /// # Errors
    ///
    /// Returns `DialogError::AlreadyOpen` unless the dialog is closed.
    pub fn open_edit(&mut self, id: i32, values: FormValues) -> Result<(), DialogError> {
        self.open(DialogMode::Edit { id }, values)
    }

    fn open(&mut self, mode: DialogMode, values: FormValues) -> Result<(), DialogError> {
        if self.state != DialogState::Closed {
            return Err(DialogError::AlreadyOpen);
        }
        self.state = DialogState::Open {
            mode,
            values,
            errors: FieldErrors::new(),
        };
        Ok(())
    }

    /// Change one input.
    ///
    /// # Errors
    ///
    /// Returns `DialogError::NotOpen` unless the dialog is open.
    pub fn set_value(&mut self, name: &str, value: Value) -> Result<(), DialogError> {
        match &mut self.state {
            DialogState::Open { values, .. } => {
                values.insert(name.to_string(), value);
                Ok(())
            }
            DialogState::Submitting { .. } => Err(DialogError::Busy),
            DialogState::Closed => Err(DialogError::NotOpen),
        }
    }

    /// Validate the current values and, if they pass, move to submitting.
    ///
    /// # Errors
    ///
    /// Returns `DialogError::NotOpen` from a closed dialog and
    /// `DialogError::Busy` while a submission is already in flight.
    pub fn submit(&mut self) -> Result<SubmitOutcome, DialogError> {
        let DialogState::Open { mode, values, errors } = &mut self.state else {
            return Err(match self.state {
                DialogState::Submitting { .. } => DialogError::Busy,
                _ => DialogError::NotOpen,
            });
        };

        if let Err(invalid) = self.schema.validate(values) {
            errors.clone_from(&invalid);
            return Ok(SubmitOutcome::Invalid(invalid));
        }

        let (mode, values) = (*mode, std::mem::take(values));
        self.state = DialogState::Submitting {
            mode,
            values: values.clone(),
        };
        Ok(SubmitOutcome::Ready { mode, values })
    }

    /// Finish a submission: close on success, reopen with the server's
    /// field errors otherwise.
    ///
    /// # Errors
    ///
    /// Returns `DialogError::NotSubmitting` unless a submission is in flight.
    pub fn complete(&mut self, result: Result<(), FieldErrors>) -> Result<(), DialogError> {
        let DialogState::Submitting { mode, values } = &mut self.state else {
            return Err(DialogError::NotSubmitting);
        };
        let (mode, values) = (*mode, std::mem::take(values));
        self.state = match result {
            Ok(()) => DialogState::Closed,
            Err(errors) => DialogState::Open { mode, values, errors },
        };
        Ok(())
    }

    /// Validate, hand the values to `on_submit`, and finish. Returns whether
    /// the dialog closed.
    ///
    /// # Errors
    ///
    /// Same as [`submit`](Self::submit).
    pub fn submit_with(
        &mut self,
        on_submit: impl FnOnce(DialogMode, &FormValues) -> Result<(), FieldErrors>,
    ) -> Result<bool, DialogError> {
        match self.submit()? {
            SubmitOutcome::Invalid(_) => Ok(false),
            SubmitOutcome::Ready { mode, values } => {
                self.complete(on_submit(mode, &values))?;
                Ok(self.state == DialogState::Closed)
            }
        }
    }

    /// Dismiss the dialog without saving.
    ///
    /// # Errors
    ///
    /// Returns `DialogError::NotOpen` from a closed dialog and
    /// `DialogError::Busy` while submitting.
    pub fn close(&mut self) -> Result<(), DialogError> {
        match self.state {
            DialogState::Open { .. } => {
                self.state = DialogState::Closed;
                Ok(())
            }
            DialogState::Submitting { .. } => Err(DialogError::Busy),
            DialogState::Closed => Err(DialogError::NotOpen),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    fn schema() -> FormSchema {
        FormSchema::new("brand", "Brand")
            .field(FormField::text("name", "Name").required().max_length(10))
            .field(FormField::url("websiteUrl", "Website"))
            .field(FormField::number("sortOrder", "Order").min(Decimal::ZERO))
            .field(FormField::select(
                "discountType",
                "Type",
                vec![FilterOption::new("percentage", "Percentage"), FilterOption::new("fixed", "Fixed")],
            ))
            .field(FormField::checkbox("isActive", "Active", true))
    }

    fn values(value: Value) -> FormValues {
        value.as_object().unwrap().clone()
    }

    #[test]
    fn test_valid_values() {
        let result = schema().validate(&values(json!({
            "name": "Acme",
            "websiteUrl": "https://acme.example",
            "sortOrder": "3",
            "discountType": "fixed",
            "isActive": "on",
            "somethingElse": 42
        })));
        assert!(result.is_ok());
    }

    #[test]
    fn test_every_problem_is_reported() {
        let errors = schema()
            .validate(&values(json!({
                "name": "   ",
                "websiteUrl": "acme",
                "sortOrder": "-1",
                "discountType": "bogus",
                "isActive": "maybe"
            })))
            .unwrap_err();
        assert_eq!(errors.get("name"), ["is required"]);
        assert_eq!(errors.get("websiteUrl"), ["must be a valid URL"]);
        assert_eq!(errors.get("sortOrder"), ["must be at least 0"]);
        assert_eq!(errors.get("discountType"), ["is not one of the allowed options"]);
        assert_eq!(errors.get("isActive"), ["must be true or false"]);
    }

    #[test]
    fn test_length_and_number_parsing() {
        let errors = schema()
            .validate(&values(json!({"name": "a very long name", "sortOrder": "ten"})))
            .unwrap_err();
        assert_eq!(errors.get("name"), ["must be at most 10 characters"]);
        assert_eq!(errors.get("sortOrder"), ["must be a number"]);
    }

    #[test]
    fn test_sourced_select_accepts_ids() {
        let schema = FormSchema::new("product", "Product")
            .field(FormField::select("categoryId", "Category", vec![]).options_from("categories"));
        assert!(schema.validate(&values(json!({"categoryId": 12}))).is_ok());
    }

    #[test]
    fn test_create_flow() {
        let mut dialog = FormDialog::new(schema());
        dialog.open_create().unwrap();
        match dialog.state() {
            DialogState::Open { mode, values, .. } => {
                assert_eq!(*mode, DialogMode::Create);
                assert_eq!(values["isActive"], json!(true));
            }
            other => panic!("unexpected state {other:?}"),
        }

        assert!(matches!(dialog.submit().unwrap(), SubmitOutcome::Invalid(_)));
        assert!(matches!(dialog.state(), DialogState::Open { errors, .. } if errors.has("name")));

        dialog.set_value("name", json!("Acme")).unwrap();
        let SubmitOutcome::Ready { mode, values } = dialog.submit().unwrap() else {
            panic!("expected ready");
        };
        assert_eq!(mode, DialogMode::Create);
        assert_eq!(values["name"], "Acme");
        assert_eq!(dialog.set_value("name", json!("x")), Err(DialogError::Busy));
        assert_eq!(dialog.close(), Err(DialogError::Busy));

        dialog.complete(Ok(())).unwrap();
        assert_eq!(*dialog.state(), DialogState::Closed);
    }

    #[test]
    fn test_server_errors_reopen_dialog() {
        let mut dialog = FormDialog::new(schema());
        dialog
            .open_edit(7, values(json!({"name": "Acme", "isActive": false})))
            .unwrap();
        let closed = dialog
            .submit_with(|mode, _| {
                assert_eq!(mode, DialogMode::Edit { id: 7 });
                Err(FieldErrors::single("slug", "brand already exists"))
            })
            .unwrap();
        assert!(!closed);
        match dialog.state() {
            DialogState::Open { values, errors, .. } => {
                assert_eq!(values["name"], "Acme");
                assert!(errors.has("slug"));
            }
            other => panic!("unexpected state {other:?}"),
        }
        assert!(dialog.submit_with(|_, _| Ok(())).unwrap());
    }

    #[test]
    fn test_invalid_transitions_leave_state_alone() {
        let mut dialog = FormDialog::new(schema());
        assert_eq!(dialog.submit(), Err(DialogError::NotOpen));
        assert_eq!(dialog.close(), Err(DialogError::NotOpen));
        assert_eq!(dialog.complete(Ok(())), Err(DialogError::NotSubmitting));
        assert_eq!(*dialog.state(), DialogState::Closed);

        dialog.open_create().unwrap();
        let before = dialog.state().clone();
        assert_eq!(dialog.open_edit(1, FormValues::new()), Err(DialogError::AlreadyOpen));
        assert_eq!(dialog.complete(Ok(())), Err(DialogError::NotSubmitting));
        assert_eq!(*dialog.state(), before);
        dialog.close().unwrap();
    }
}
