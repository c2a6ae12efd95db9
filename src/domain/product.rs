use serde::{Deserialize, Deserializer, Serialize};

use crate::action_framework::{FormData, Operation, Resource, ResourceKind};
use crate::domain::null_as_default;
use crate::error::ValidationError;

fn default_duration_days() -> u32 {
    30
}

fn default_true() -> bool {
    true
}

fn duration_days_or_default<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u32, D::Error> {
    Ok(Option::deserialize(deserializer)?.unwrap_or_else(default_duration_days))
}

fn true_if_null<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    Ok(Option::deserialize(deserializer)?.unwrap_or(true))
}

/// A product in the storefront catalogue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub price: f64,
    #[serde(default)]
    pub category_id: Option<i64>,
    #[serde(default = "default_duration_days", deserialize_with = "duration_days_or_default")]
    pub duration_days: u32,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub download_url: Option<String>,
    #[serde(default)]
    pub requirements: Option<String>,
    /// Comma separated.
    #[serde(default)]
    pub tags: Option<String>,
    #[serde(default = "default_true", deserialize_with = "true_if_null")]
    pub is_active: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub is_featured: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub download_count: u32,
}

impl Product {
    pub fn new(id: i64, name: impl Into<String>, price: f64) -> Self {
        Self {
            id,
            name: name.into(),
            description: None,
            price,
            category_id: None,
            duration_days: default_duration_days(),
            image_url: None,
            download_url: None,
            requirements: None,
            tags: None,
            is_active: true,
            is_featured: false,
            download_count: 0,
        }
    }
}

impl Resource for Product {
    type Id = i64;

    const KIND: ResourceKind = ResourceKind::Product;

    fn id(&self) -> &i64 {
        &self.id
    }

    fn supports(operation: Operation) -> bool {
        !matches!(operation, Operation::ToggleStatus)
    }

    /// Field values as the edit form shows them. Missing optional fields become
    /// empty strings; `is_featured` is only present when checked.
    fn to_form(&self) -> FormData {
        let text = |value: &Option<String>| value.clone().unwrap_or_default();
        let mut form = FormData::new()
            .with("name", self.name.clone())
            .with("category_id", self.category_id.map(|c| c.to_string()).unwrap_or_default())
            .with("price", self.price.to_string())
            .with("duration_days", self.duration_days.to_string())
            .with("description", text(&self.description))
            .with("download_url", text(&self.download_url))
            .with("requirements", text(&self.requirements))
            .with("tags", text(&self.tags));
        if self.is_featured {
            form.insert("is_featured", "on");
        }
        form
    }

    /// Name is required and price must parse as a non-negative number.
    fn validate(operation: Operation, form: &FormData) -> Result<(), ValidationError> {
        if !matches!(operation, Operation::Create | Operation::Update) {
            return Ok(());
        }
        if form.non_blank("name").is_none() {
            return Err(ValidationError::RequiredField("nome"));
        }
        let price = form
            .non_blank("price")
            .ok_or(ValidationError::RequiredField("preço"))?;
        match price.replace(',', ".").parse::<f64>() {
            Ok(value) if value.is_finite() && value >= 0.0 => Ok(()),
            _ => Err(ValidationError::InvalidNumber("preço")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn decodes_sparse_representations() {
        let product: Product = serde_json::from_value(json!({
            "id": 7,
            "name": "Bar",
            "price": 49.9,
            "category_id": 2
        }))
        .unwrap();
        assert_eq!(product.duration_days, 30);
        assert!(product.is_active);
        assert!(!product.is_featured);
        assert_eq!(product.category_id, Some(2));
    }

    #[test]
    fn explicit_nulls_fall_back_to_defaults() {
        let product: Product = serde_json::from_value(json!({
            "id": 7,
            "name": "Bar",
            "price": 49.9,
            "duration_days": null,
            "is_active": null,
            "is_featured": null,
            "download_count": null,
            "description": null
        }))
        .unwrap();

        assert_eq!(product.duration_days, 30);
        assert!(product.is_active);
        assert!(!product.is_featured);
        assert_eq!(product.download_count, 0);
        assert_eq!(product.to_form().get("duration_days"), Some("30"));
    }

    #[test]
    fn validation_requires_name_and_numeric_price() {
        let ok = FormData::new().with("name", "Foo").with("price", "19,90");
        assert_eq!(Product::validate(Operation::Update, &ok), Ok(()));

        let unnamed = FormData::new().with("name", "  ").with("price", "1");
        assert_eq!(
            Product::validate(Operation::Create, &unnamed),
            Err(ValidationError::RequiredField("nome"))
        );

        let bad_price = FormData::new().with("name", "Foo").with("price", "-3");
        assert_eq!(
            Product::validate(Operation::Create, &bad_price),
            Err(ValidationError::InvalidNumber("preço"))
        );

        assert_eq!(Product::validate(Operation::Delete, &FormData::new()), Ok(()));
    }

    #[test]
    fn form_round_trips_featured_checkbox() {
        let mut product = Product::new(1, "Foo", 10.0);
        assert_eq!(product.to_form().get("is_featured"), None);
        product.is_featured = true;
        assert_eq!(product.to_form().get("is_featured"), Some("on"));
        assert_eq!(product.to_form().get("duration_days"), Some("30"));
    }
}
