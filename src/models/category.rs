use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

/// Name of the category every new user starts with. Todos created without an
/// explicit category land here.
pub const DEFAULT_CATEGORY: &str = "Default";

/// A category record. Ownership-scoped: a user only ever sees and mutates
/// their own categories.
#[derive(Debug, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: String,
    pub name: String,
    pub user_id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Category {
    pub fn new(name: String, user_id: String) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            name,
            user_id,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Input for creating or renaming a category.
#[derive(Debug, Deserialize, Validate)]
pub struct CategoryInput {
    #[validate(length(min = 1, max = 50))]
    pub name: String,
}

/// Projection returned by the category listing: id and name only.
#[derive(Debug, Serialize, Deserialize, FromRow)]
pub struct CategoryView {
    pub id: String,
    pub name: String,
}
