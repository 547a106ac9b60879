use once_cell::sync::Lazy;
use serde_json::json;

use super::{FieldRule, Schema, FRAGRANCE_FAMILIES};

pub static CLIENT_SCHEMA: Lazy<Schema> = Lazy::new(|| {
    Schema::new("clients", "Client", "clients")
        .field(
            FieldRule::string("firstName")
                .required("First name is required")
                .trim()
                .min_length(2, "First name must be at least 2 characters")
                .max_length(50, "First name cannot exceed 50 characters"),
        )
        .field(
            FieldRule::string("lastName")
                .required("Last name is required")
                .trim()
                .min_length(2, "Last name must be at least 2 characters")
                .max_length(50, "Last name cannot exceed 50 characters"),
        )
        .field(
            FieldRule::string("email")
                .required("Email is required")
                .unique()
                .lowercase()
                .trim()
                .matches(r"^\S+@\S+\.\S+$", "Please provide a valid email address"),
        )
        .field(
            FieldRule::string("phone")
                .required("Phone number is required")
                .matches(r"^[0-9]{10}$", "Phone number must be 10 digits"),
        )
        .field(
            FieldRule::string("address")
                .required("Address is required")
                .min_length(5, "Address must be at least 5 characters"),
        )
        .field(FieldRule::string("city").required("City is required"))
        .field(FieldRule::string_array("preferredFragrances").one_of(FRAGRANCE_FAMILIES, "{VALUE}"))
        .field(FieldRule::boolean("vipStatus").default(json!(false)))
});

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::Document;
    use crate::types::Operation;

    fn maria() -> Document {
        json!({
            "firstName": "Maria",
            "lastName": "Garcia",
            "email": "  Maria@X.com ",
            "phone": "5551234567",
            "address": "123 Main St",
            "city": "CDMX"
        })
        .as_object()
        .cloned()
        .unwrap()
    }

    #[test]
    fn email_is_normalized_and_defaults_applied() {
        let doc = CLIENT_SCHEMA.prepare(Operation::Create, &Document::new(), &maria()).unwrap();
        assert_eq!(doc["email"], json!("maria@x.com"));
        assert_eq!(doc["vipStatus"], json!(false));
        assert_eq!(doc["preferredFragrances"], json!([]));
    }

    #[test]
    fn only_email_is_unique() {
        assert_eq!(CLIENT_SCHEMA.unique_fields(), vec!["email"]);
    }

    #[test]
    fn bad_phone_and_short_names_are_reported_together() {
        let mut input = maria();
        input.insert("phone".into(), json!("555-123"));
        input.insert("firstName".into(), json!("M"));
        let err = CLIENT_SCHEMA.prepare(Operation::Create, &Document::new(), &input).unwrap_err();
        assert_eq!(
            err.messages(),
            vec![
                "First name must be at least 2 characters".to_string(),
                "Phone number must be 10 digits".to_string(),
            ]
        );
    }

    #[test]
    fn preferred_fragrances_must_be_known_families() {
        let mut input = maria();
        input.insert("preferredFragrances".into(), json!(["Floral", "Smoky"]));
        let err = CLIENT_SCHEMA.prepare(Operation::Create, &Document::new(), &input).unwrap_err();
        assert!(err.has_field("preferredFragrances"));
    }
}
