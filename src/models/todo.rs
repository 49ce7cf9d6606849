use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

/// Todo status values as stored and served on the wire.
pub const STATUS_PENDING: i32 = 0;
pub const STATUS_COMPLETED: i32 = 1;

/// Fallback page size when the caller supplies none (or a non-positive one).
/// Deliberately small; the reference client renders three cards per page.
pub const DEFAULT_PAGE_SIZE: i64 = 3;
/// Upper bound on a requested page size. Larger requests are clamped, not
/// rejected.
pub const MAX_PAGE_SIZE: i64 = 100;

/// A todo record. Owned by exactly one user; `status` is 0 (pending) or
/// 1 (completed).
#[derive(Debug, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Todo {
    pub id: String,
    pub title: String,
    pub content: String,
    pub status: i32,
    pub category_id: String,
    pub user_id: String,
    pub due_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Todo {
    /// Creates a new pending todo owned by `user_id`.
    pub fn new(input: TodoInput, category_id: String, user_id: String) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            title: input.title,
            content: input.content,
            status: STATUS_PENDING,
            category_id,
            user_id,
            due_date: input.due_date,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Input for creating a todo. A missing `category_id` falls back to the
/// user's default category.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct TodoInput {
    #[validate(length(min = 1, max = 50))]
    pub title: String,
    #[validate(length(min = 1, max = 255))]
    pub content: String,
    pub category_id: Option<String>,
    pub due_date: Option<DateTime<Utc>>,
}

/// Input for updating an existing todo, including flipping its status.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct TodoUpdate {
    #[validate(length(min = 1, max = 50))]
    pub title: String,
    #[validate(length(min = 1, max = 255))]
    pub content: String,
    #[validate(range(min = 0, max = 1))]
    pub status: i32,
    pub category_id: String,
    pub due_date: Option<DateTime<Utc>>,
}

/// Query parameters for the paginated todo listing.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TodoPageQuery {
    pub page: Option<i64>,
    pub page_size: Option<i64>,
    /// Filter by status (0 pending / 1 completed).
    pub status: Option<i32>,
    /// Filter by owning category.
    pub category_id: Option<String>,
}

/// A normalized page window: `page` >= 1 and `page_size` within 1..=100.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    pub page: i64,
    pub page_size: i64,
}

impl PageWindow {
    pub fn limit(&self) -> i64 {
        self.page_size
    }

    pub fn offset(&self) -> i64 {
        (self.page - 1) * self.page_size
    }
}

impl TodoPageQuery {
    /// Applies the pagination rules: page defaults to 1 and is never below 1;
    /// page size defaults to [`DEFAULT_PAGE_SIZE`] when unset or
    /// non-positive, and oversized requests clamp to [`MAX_PAGE_SIZE`]
    /// rather than erroring.
    pub fn window(&self) -> PageWindow {
        let page = match self.page {
            Some(p) if p >= 1 => p,
            _ => 1,
        };
        let page_size = match self.page_size {
            Some(s) if s >= 1 && s <= MAX_PAGE_SIZE => s,
            Some(s) if s > MAX_PAGE_SIZE => MAX_PAGE_SIZE,
            _ => DEFAULT_PAGE_SIZE,
        };
        PageWindow { page, page_size }
    }
}

/// One page of results plus the total matching count, so callers can compute
/// the number of pages. Produced fresh per query; nothing is cached.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageResult<T> {
    pub items: Vec<T>,
    pub total: i64,
    pub page: i64,
    pub page_size: i64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn query(page: Option<i64>, page_size: Option<i64>) -> TodoPageQuery {
        TodoPageQuery {
            page,
            page_size,
            status: None,
            category_id: None,
        }
    }

    #[test]
    fn test_window_defaults() {
        assert_eq!(
            query(None, None).window(),
            PageWindow {
                page: 1,
                page_size: DEFAULT_PAGE_SIZE
            }
        );
    }

    #[test]
    fn test_window_normalizes_page() {
        assert_eq!(query(Some(0), Some(10)).window().page, 1);
        assert_eq!(query(Some(-3), Some(10)).window().page, 1);
        assert_eq!(query(Some(7), Some(10)).window().page, 7);
    }

    #[test]
    fn test_window_normalizes_page_size() {
        // Non-positive sizes fall back to the default.
        assert_eq!(query(None, Some(0)).window().page_size, DEFAULT_PAGE_SIZE);
        assert_eq!(query(None, Some(-5)).window().page_size, DEFAULT_PAGE_SIZE);
        // Oversized requests clamp to the maximum instead of erroring.
        assert_eq!(query(None, Some(500)).window().page_size, MAX_PAGE_SIZE);
        assert_eq!(query(None, Some(100)).window().page_size, 100);
        assert_eq!(query(None, Some(1)).window().page_size, 1);
    }

    #[test]
    fn test_window_offset() {
        let window = query(Some(1), Some(3)).window();
        assert_eq!(window.offset(), 0);
        assert_eq!(window.limit(), 3);

        let window = query(Some(2), Some(3)).window();
        assert_eq!(window.offset(), 3);

        let window = query(Some(4), Some(25)).window();
        assert_eq!(window.offset(), 75);
    }

    #[test]
    fn test_todo_input_validation() {
        let valid = TodoInput {
            title: "Buy milk".to_string(),
            content: "Two liters".to_string(),
            category_id: None,
            due_date: None,
        };
        assert!(valid.validate().is_ok());

        let empty_title = TodoInput {
            title: "".to_string(),
            content: "Two liters".to_string(),
            category_id: None,
            due_date: None,
        };
        assert!(empty_title.validate().is_err());

        let long_content = TodoInput {
            title: "Buy milk".to_string(),
            content: "c".repeat(256),
            category_id: None,
            due_date: None,
        };
        assert!(long_content.validate().is_err());
    }

    #[test]
    fn test_todo_update_status_range() {
        let update = |status| TodoUpdate {
            title: "t".to_string(),
            content: "c".to_string(),
            status,
            category_id: "cat-1".to_string(),
            due_date: None,
        };
        assert!(update(STATUS_PENDING).validate().is_ok());
        assert!(update(STATUS_COMPLETED).validate().is_ok());
        assert!(update(2).validate().is_err());
        assert!(update(-1).validate().is_err());
    }

    #[test]
    fn test_new_todo_starts_pending() {
        let input = TodoInput {
            title: "Buy milk".to_string(),
            content: "Two liters".to_string(),
            category_id: None,
            due_date: None,
        };
        let todo = Todo::new(input, "cat-1".to_string(), "user-1".to_string());
        assert_eq!(todo.status, STATUS_PENDING);
        assert_eq!(todo.user_id, "user-1");
        assert_eq!(todo.category_id, "cat-1");
    }
}
