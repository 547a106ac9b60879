use once_cell::sync::Lazy;
use serde_json::json;

use super::{FieldRule, Schema};

/// Olfactory families shared by perfumes and client preferences.
pub const FRAGRANCE_FAMILIES: &[&str] = &[
    "Floral", "Oriental", "Woody", "Fresh", "Citrus", "Fruity", "Aromatic",
];

pub const GENDERS: &[&str] = &["Men", "Women", "Unisex"];

pub static PERFUME_SCHEMA: Lazy<Schema> = Lazy::new(|| {
    Schema::new("perfumes", "Perfume", "perfumes")
        .field(
            FieldRule::string("name")
                .required("Perfume name is required")
                .trim()
                .max_length(100, "Name cannot exceed 100 characters"),
        )
        .field(FieldRule::string("brand").required("Brand is required").trim())
        .field(
            FieldRule::string("fraganceFamily")
                .required("Fragrance family is required")
                .one_of(FRAGRANCE_FAMILIES, "{VALUE} is not a valid fragrance family"),
        )
        .field(
            FieldRule::number("size")
                .required("Size is required")
                .min(1.0, "Size must be at least 1ml"),
        )
        .field(
            FieldRule::number("price")
                .required("Price is required")
                .min(0.0, "Price cannot be negative"),
        )
        .field(
            FieldRule::number("stock")
                .required("Stock quantity is required")
                .default(json!(0))
                .min(0.0, "Stock cannot be negative"),
        )
        .field(
            FieldRule::string("gender")
                .required("Gender category is required")
                .one_of(GENDERS, "{VALUE} is not a valid gender category"),
        )
        .field(FieldRule::string("description").max_length(500, "Description cannot exceed 500 characters"))
        .field(FieldRule::boolean("isAvailable").default(json!(true)))
});

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::Document;
    use crate::types::Operation;
    use serde_json::Value;

    fn input(v: Value) -> Document {
        v.as_object().cloned().unwrap()
    }

    #[test]
    fn valid_perfume_gets_defaults() {
        let doc = PERFUME_SCHEMA
            .prepare(
                Operation::Create,
                &Document::new(),
                &input(json!({
                    "name": "Bleu",
                    "brand": "Chanel",
                    "fraganceFamily": "Woody",
                    "size": 100,
                    "price": 135.5,
                    "gender": "Men"
                })),
            )
            .unwrap();
        assert_eq!(doc["stock"], json!(0));
        assert_eq!(doc["isAvailable"], json!(true));
        assert!(doc.get("description").is_none());
    }

    #[test]
    fn invalid_enum_values_use_schema_messages() {
        let err = PERFUME_SCHEMA
            .prepare(
                Operation::Create,
                &Document::new(),
                &input(json!({
                    "name": "Bleu",
                    "brand": "Chanel",
                    "fraganceFamily": "Smoky",
                    "size": 0,
                    "price": 10,
                    "gender": "Kids"
                })),
            )
            .unwrap_err();
        assert_eq!(
            err.messages(),
            vec![
                "Smoky is not a valid fragrance family".to_string(),
                "Size must be at least 1ml".to_string(),
                "Kids is not a valid gender category".to_string(),
            ]
        );
    }
}
