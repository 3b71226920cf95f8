/// Category model
///
/// Categories group a user's tasks and carry a display color tag. Every user
/// is lazily provisioned with [`DEFAULT_CATEGORIES`] the first time their
/// categories are listed.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE categories (
///     id BIGSERIAL PRIMARY KEY,
///     user_id BIGINT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     name TEXT NOT NULL,
///     color TEXT NOT NULL DEFAULT '',
///     is_default BOOLEAN NOT NULL DEFAULT FALSE
/// );
///
/// CREATE UNIQUE INDEX categories_user_default_name
///     ON categories (user_id, name) WHERE is_default;
/// ```
use serde::{Deserialize, Serialize};

/// Default category set as `(name, color)` pairs
pub const DEFAULT_CATEGORIES: [(&str, &str); 4] = [
    ("Work", "blue"),
    ("Personal", "emerald"),
    ("Urgent", "red"),
    ("Study", "amber"),
];

/// Category owned by a single user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Category {
    pub id: i64,

    /// Owning user
    pub user_id: i64,

    pub name: String,

    /// Color tag (tailwind color name or hex code)
    pub color: String,
}

/// Input for creating a category
///
/// Ownership is not part of the input; the store always assigns the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewCategory {
    pub name: String,

    #[serde(default)]
    pub color: String,
}

impl NewCategory {
    pub fn new(name: impl Into<String>, color: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            color: color.into(),
        }
    }

    /// The default set as creation inputs
    pub fn defaults() -> Vec<Self> {
        DEFAULT_CATEGORIES
            .iter()
            .map(|(name, color)| Self::new(*name, *color))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_constant() {
        let defaults = NewCategory::defaults();
        assert_eq!(defaults.len(), 4);
        assert_eq!(defaults[0], NewCategory::new("Work", "blue"));
        assert_eq!(defaults[3], NewCategory::new("Study", "amber"));
    }

    #[test]
    fn test_new_category_color_optional() {
        let input: NewCategory = serde_json::from_str(r#"{"name": "Home"}"#).unwrap();
        assert_eq!(input.color, "");
    }
}
