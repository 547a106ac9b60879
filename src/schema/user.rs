use once_cell::sync::Lazy;

use super::{FieldRule, Schema};

/// Local accounts created from GitHub logins.
pub static USER_SCHEMA: Lazy<Schema> = Lazy::new(|| {
    Schema::new("users", "User", "users")
        .field(
            FieldRule::string("githubId")
                .required("GitHub ID is required")
                .unique(),
        )
        .field(FieldRule::string("username").required("Username is required").trim())
        .field(FieldRule::string("displayName"))
        .field(
            FieldRule::string("email")
                .trim()
                .lowercase()
                .matches(
                    r"^\w+([.-]?\w+)*@\w+([.-]?\w+)*(\.\w{2,3})+$",
                    "Please provide a valid email",
                ),
        )
});
