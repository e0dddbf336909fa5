//! Minimal schema lookup used by the query parser and the reference index.
//!
//! A schema maps field names to a [`FieldType`]. The query core only needs to
//! know which names are valid fields, which fields are numeric, and how query
//! text for a field is normalized before it is compared with the lexicon.

use serde::{Deserialize, Serialize};

use crate::error::{HalberdError, Result};

/// The kind of values a field holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldType {
    /// Tokenized, lowercased free text.
    Text,
    /// A single untokenized value (identifiers, tags, emails).
    Id,
    /// A numeric value; ranges over it are compared numerically.
    Numeric,
}

impl FieldType {
    /// Normalize query or document text the way this field indexes it.
    pub fn normalize(&self, text: &str) -> String {
        match self {
            FieldType::Text => text.to_lowercase(),
            FieldType::Id | FieldType::Numeric => text.to_string(),
        }
    }

    /// Whether this field holds numbers.
    pub fn is_numeric(&self) -> bool {
        matches!(self, FieldType::Numeric)
    }
}

/// A named field definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldEntry {
    /// The field name.
    pub name: String,
    /// The field type.
    pub field_type: FieldType,
}

/// An ordered collection of fields. A field's number is its insertion position.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schema {
    fields: Vec<FieldEntry>,
}

impl Schema {
    /// Create an empty schema.
    pub fn new() -> Self {
        Schema { fields: Vec::new() }
    }

    /// Add a field. Fails if a field with the same name already exists.
    pub fn add_field<S: Into<String>>(&mut self, name: S, field_type: FieldType) -> Result<()> {
        let name = name.into();
        if name.is_empty() {
            return Err(HalberdError::schema("Field name must not be empty"));
        }
        if self.has_field(&name) {
            return Err(HalberdError::schema(format!(
                "Field '{name}' is already defined"
            )));
        }
        self.fields.push(FieldEntry { name, field_type });
        Ok(())
    }

    /// Builder-style variant of [`Schema::add_field`].
    pub fn with_field<S: Into<String>>(mut self, name: S, field_type: FieldType) -> Result<Self> {
        self.add_field(name, field_type)?;
        Ok(self)
    }

    /// Check whether `name` is a field of this schema.
    pub fn has_field(&self, name: &str) -> bool {
        self.fields.iter().any(|entry| entry.name == name)
    }

    /// Get the type of a field.
    pub fn field_type(&self, name: &str) -> Option<FieldType> {
        self.fields
            .iter()
            .find(|entry| entry.name == name)
            .map(|entry| entry.field_type)
    }

    /// Translate a field name to its field number.
    pub fn field_number(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|entry| entry.name == name)
    }

    /// Get the field names in definition order.
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|entry| entry.name.as_str())
    }

    /// Get the number of fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Check whether the schema has no fields.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}
