//! TOML configuration validation for provider implementations.
//!
//! Each provider declares a [`Schema`] describing the table it expects, so a
//! bad config section is rejected before the provider is constructed.

use std::fmt;
use thiserror::Error;

/// Errors produced while validating a configuration table.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
	#[error("missing required field: {0}")]
	MissingField(String),
	#[error("invalid value for field '{field}': {message}")]
	InvalidValue { field: String, message: String },
	#[error("field '{field}' must be a {expected}")]
	WrongType { field: String, expected: &'static str },
}

/// Expected type of a configuration field.
#[derive(Debug, Clone, Copy)]
pub enum FieldKind {
	Text,
	Integer { min: Option<i64> },
	Boolean,
}

type FieldCheck = Box<dyn Fn(&toml::Value) -> Result<(), String> + Send + Sync>;

/// A single field declaration: name, expected kind, and whether the field
/// must be present, plus an optional value check.
pub struct Field {
	name: String,
	kind: FieldKind,
	required: bool,
	check: Option<FieldCheck>,
}

impl fmt::Debug for Field {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Field")
			.field("name", &self.name)
			.field("kind", &self.kind)
			.field("required", &self.required)
			.finish()
	}
}

impl Field {
	pub fn required(name: impl Into<String>, kind: FieldKind) -> Self {
		Self {
			name: name.into(),
			kind,
			required: true,
			check: None,
		}
	}

	pub fn optional(name: impl Into<String>, kind: FieldKind) -> Self {
		Self {
			name: name.into(),
			kind,
			required: false,
			check: None,
		}
	}

	pub fn with_check<F>(mut self, check: F) -> Self
	where
		F: Fn(&toml::Value) -> Result<(), String> + Send + Sync + 'static,
	{
		self.check = Some(Box::new(check));
		self
	}

	fn validate(&self, value: &toml::Value) -> Result<(), ValidationError> {
		let wrong_type = |expected| ValidationError::WrongType {
			field: self.name.clone(),
			expected,
		};

		match self.kind {
			FieldKind::Text => {
				if !value.is_str() {
					return Err(wrong_type("string"));
				}
			}
			FieldKind::Integer { min } => {
				let n = value.as_integer().ok_or_else(|| wrong_type("integer"))?;
				if let Some(min) = min {
					if n < min {
						return Err(ValidationError::InvalidValue {
							field: self.name.clone(),
							message: format!("{} is below the minimum of {}", n, min),
						});
					}
				}
			}
			FieldKind::Boolean => {
				if !value.is_bool() {
					return Err(wrong_type("boolean"));
				}
			}
		}

		if let Some(check) = &self.check {
			check(value).map_err(|message| ValidationError::InvalidValue {
				field: self.name.clone(),
				message,
			})?;
		}

		Ok(())
	}
}

/// A flat table schema.
#[derive(Debug, Default)]
pub struct Schema {
	fields: Vec<Field>,
}

impl Schema {
	pub fn new(fields: Vec<Field>) -> Self {
		Self { fields }
	}

	/// Validates a TOML value against this schema.
	pub fn validate(&self, config: &toml::Value) -> Result<(), ValidationError> {
		let table = config.as_table().ok_or(ValidationError::WrongType {
			field: "root".to_string(),
			expected: "table",
		})?;

		for field in &self.fields {
			match table.get(&field.name) {
				Some(value) => field.validate(value)?,
				None if field.required => {
					return Err(ValidationError::MissingField(field.name.clone()))
				}
				None => {}
			}
		}

		Ok(())
	}
}

/// A configuration schema that a provider exposes for its TOML section.
pub trait ConfigSchema: Send + Sync {
	fn validate(&self, config: &toml::Value) -> Result<(), ValidationError>;
}

#[cfg(test)]
mod tests {
	use super::*;

	fn schema() -> Schema {
		Schema::new(vec![
			Field::required("endpoint", FieldKind::Text).with_check(|v| {
				let url = v.as_str().unwrap();
				if url.starts_with("http://") || url.starts_with("https://") {
					Ok(())
				} else {
					Err("must start with http:// or https://".to_string())
				}
			}),
			Field::optional("timeout_secs", FieldKind::Integer { min: Some(1) }),
		])
	}

	fn parse(s: &str) -> toml::Value {
		s.parse().unwrap()
	}

	#[test]
	fn accepts_valid_table() {
		let config = parse("endpoint = \"https://example.com\"\ntimeout_secs = 30");
		assert!(schema().validate(&config).is_ok());
	}

	#[test]
	fn missing_required_field_fails() {
		let config = parse("timeout_secs = 30");
		assert_eq!(
			schema().validate(&config).unwrap_err(),
			ValidationError::MissingField("endpoint".to_string())
		);
	}

	#[test]
	fn check_failures_are_reported() {
		let config = parse("endpoint = \"ftp://example.com\"");
		assert!(matches!(
			schema().validate(&config).unwrap_err(),
			ValidationError::InvalidValue { field, .. } if field == "endpoint"
		));
	}

	#[test]
	fn integer_minimum_is_enforced() {
		let config = parse("endpoint = \"https://example.com\"\ntimeout_secs = 0");
		assert!(matches!(
			schema().validate(&config).unwrap_err(),
			ValidationError::InvalidValue { field, .. } if field == "timeout_secs"
		));
	}

	#[test]
	fn wrong_types_are_rejected() {
		let config = parse("endpoint = 5");
		assert_eq!(
			schema().validate(&config).unwrap_err(),
			ValidationError::WrongType {
				field: "endpoint".to_string(),
				expected: "string",
			}
		);
	}
}
