use crate::{
    auth::CurrentUser,
    error::AppError,
    messages,
    models::{category::DEFAULT_CATEGORY, PageResult, Todo, TodoInput, TodoPageQuery, TodoUpdate},
    response::ApiResponse,
};
use actix_web::{delete, get, post, put, web, HttpResponse, Responder};
use chrono::Utc;
use sqlx::SqlitePool;
use validator::Validate;

/// Paginated todo listing for the authenticated user.
///
/// Supports optional `status` (0 pending / 1 completed) and `categoryId`
/// filters; page and page size are normalized before the query runs. The
/// result set is strictly ownership-scoped and ordered by creation time
/// (newest first) with the id as tiebreaker, so repeated queries paginate
/// deterministically. The total count is computed over the same filter,
/// independent of the page window.
#[get("")]
pub async fn page_todos(
    pool: web::Data<SqlitePool>,
    user: CurrentUser,
    query_params: web::Query<TodoPageQuery>,
) -> Result<impl Responder, AppError> {
    let query_params = query_params.into_inner();
    let window = query_params.window();

    // The listing and the count share one WHERE clause; conditions are
    // appended for each supplied filter.
    let mut where_sql = String::from("WHERE user_id = ?");
    if query_params.status.is_some() {
        where_sql.push_str(" AND status = ?");
    }
    if query_params.category_id.is_some() {
        where_sql.push_str(" AND category_id = ?");
    }

    let count_sql = format!("SELECT COUNT(*) FROM todos {}", where_sql);
    let select_sql = format!(
        "SELECT id, title, content, status, category_id, user_id, due_date, created_at, updated_at
         FROM todos {} ORDER BY created_at DESC, id ASC LIMIT ? OFFSET ?",
        where_sql
    );

    let mut count_query = sqlx::query_scalar::<_, i64>(&count_sql).bind(user.user_id());
    let mut select_query = sqlx::query_as::<_, Todo>(&select_sql).bind(user.user_id());

    if let Some(status) = query_params.status {
        count_query = count_query.bind(status);
        select_query = select_query.bind(status);
    }
    if let Some(category_id) = &query_params.category_id {
        count_query = count_query.bind(category_id);
        select_query = select_query.bind(category_id);
    }

    let total = count_query.fetch_one(&**pool).await?;
    let items = select_query
        .bind(window.limit())
        .bind(window.offset())
        .fetch_all(&**pool)
        .await?;

    Ok(HttpResponse::Ok().json(ApiResponse::ok(
        PageResult {
            items,
            total,
            page: window.page,
            page_size: window.page_size,
        },
        messages::SUCCESS,
    )))
}

/// Creates a pending todo owned by the authenticated user. A missing
/// category id falls back to the user's default category; a supplied one
/// must belong to the user.
#[post("")]
pub async fn create_todo(
    pool: web::Data<SqlitePool>,
    user: CurrentUser,
    input: web::Json<TodoInput>,
) -> Result<impl Responder, AppError> {
    input.validate()?;
    let input = input.into_inner();

    let category_id = resolve_category(&pool, user.user_id(), input.category_id.as_deref()).await?;
    let todo = Todo::new(input, category_id, user.user_id().to_string());

    sqlx::query(
        "INSERT INTO todos (id, title, content, status, category_id, user_id, due_date, created_at, updated_at)
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(&todo.id)
    .bind(&todo.title)
    .bind(&todo.content)
    .bind(todo.status)
    .bind(&todo.category_id)
    .bind(&todo.user_id)
    .bind(todo.due_date)
    .bind(todo.created_at)
    .bind(todo.updated_at)
    .execute(&**pool)
    .await?;

    Ok(HttpResponse::Created().json(ApiResponse::ok(todo, messages::SUCCESS)))
}

/// Updates a todo the authenticated user owns, including flipping its
/// completion status. Another user's todo is reported as not found.
#[put("/{id}")]
pub async fn update_todo(
    pool: web::Data<SqlitePool>,
    user: CurrentUser,
    todo_id: web::Path<String>,
    input: web::Json<TodoUpdate>,
) -> Result<impl Responder, AppError> {
    input.validate()?;
    let input = input.into_inner();

    // The replacement category must also belong to the caller.
    resolve_category(&pool, user.user_id(), Some(&input.category_id)).await?;

    let result = sqlx::query(
        "UPDATE todos
         SET title = ?, content = ?, status = ?, category_id = ?, due_date = ?, updated_at = ?
         WHERE id = ? AND user_id = ?",
    )
    .bind(&input.title)
    .bind(&input.content)
    .bind(input.status)
    .bind(&input.category_id)
    .bind(input.due_date)
    .bind(Utc::now())
    .bind(todo_id.into_inner())
    .bind(user.user_id())
    .execute(&**pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound(messages::TODO_NOT_FOUND.into()));
    }

    Ok(HttpResponse::Ok().json(ApiResponse::message(messages::SUCCESS)))
}

/// Deletes a todo the authenticated user owns.
#[delete("/{id}")]
pub async fn delete_todo(
    pool: web::Data<SqlitePool>,
    user: CurrentUser,
    todo_id: web::Path<String>,
) -> Result<impl Responder, AppError> {
    let result = sqlx::query("DELETE FROM todos WHERE id = ? AND user_id = ?")
        .bind(todo_id.into_inner())
        .bind(user.user_id())
        .execute(&**pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound(messages::TODO_NOT_FOUND.into()));
    }

    Ok(HttpResponse::Ok().json(ApiResponse::message(messages::SUCCESS)))
}

/// Resolves the category a todo should live in: the supplied id when it
/// exists and is owned by the user, otherwise the user's default category.
async fn resolve_category(
    pool: &SqlitePool,
    user_id: &str,
    category_id: Option<&str>,
) -> Result<String, AppError> {
    match category_id {
        Some(id) => {
            let owned = sqlx::query_scalar::<_, String>(
                "SELECT id FROM categories WHERE id = ? AND user_id = ?",
            )
            .bind(id)
            .bind(user_id)
            .fetch_optional(pool)
            .await?;
            owned.ok_or_else(|| AppError::NotFound(messages::CATEGORY_NOT_FOUND.into()))
        }
        None => {
            let default = sqlx::query_scalar::<_, String>(
                "SELECT id FROM categories WHERE user_id = ? AND name = ?",
            )
            .bind(user_id)
            .bind(DEFAULT_CATEGORY)
            .fetch_optional(pool)
            .await?;
            default.ok_or_else(|| AppError::NotFound(messages::CATEGORY_NOT_FOUND.into()))
        }
    }
}
