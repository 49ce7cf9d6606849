use crate::{
    auth::CurrentUser,
    error::AppError,
    messages,
    models::{Category, CategoryInput, CategoryView},
    response::ApiResponse,
};
use actix_web::{delete, get, post, put, web, HttpResponse, Responder};
use chrono::Utc;
use sqlx::SqlitePool;
use validator::Validate;

/// Lists the authenticated user's categories as `{id, name}` projections.
#[get("")]
pub async fn list_categories(
    pool: web::Data<SqlitePool>,
    user: CurrentUser,
) -> Result<impl Responder, AppError> {
    let categories = sqlx::query_as::<_, CategoryView>(
        "SELECT id, name FROM categories WHERE user_id = ? ORDER BY created_at ASC, id ASC",
    )
    .bind(user.user_id())
    .fetch_all(&**pool)
    .await?;

    Ok(HttpResponse::Ok().json(ApiResponse::ok(categories, messages::SUCCESS)))
}

/// Creates a category owned by the authenticated user.
#[post("")]
pub async fn create_category(
    pool: web::Data<SqlitePool>,
    user: CurrentUser,
    input: web::Json<CategoryInput>,
) -> Result<impl Responder, AppError> {
    input.validate()?;

    let category = Category::new(input.into_inner().name, user.user_id().to_string());
    sqlx::query(
        "INSERT INTO categories (id, name, user_id, created_at, updated_at)
         VALUES (?, ?, ?, ?, ?)",
    )
    .bind(&category.id)
    .bind(&category.name)
    .bind(&category.user_id)
    .bind(category.created_at)
    .bind(category.updated_at)
    .execute(&**pool)
    .await?;

    Ok(HttpResponse::Created().json(ApiResponse::ok(
        CategoryView {
            id: category.id,
            name: category.name,
        },
        messages::SUCCESS,
    )))
}

/// Renames a category. Another user's category is reported as not found, so
/// existence never leaks across accounts.
#[put("/{id}")]
pub async fn update_category(
    pool: web::Data<SqlitePool>,
    user: CurrentUser,
    category_id: web::Path<String>,
    input: web::Json<CategoryInput>,
) -> Result<impl Responder, AppError> {
    input.validate()?;

    let result = sqlx::query(
        "UPDATE categories SET name = ?, updated_at = ? WHERE id = ? AND user_id = ?",
    )
    .bind(&input.name)
    .bind(Utc::now())
    .bind(category_id.into_inner())
    .bind(user.user_id())
    .execute(&**pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound(messages::CATEGORY_NOT_FOUND.into()));
    }

    Ok(HttpResponse::Ok().json(ApiResponse::message(messages::SUCCESS)))
}

/// Deletes a category owned by the authenticated user. Todos keep their
/// category id; the store does not cascade.
#[delete("/{id}")]
pub async fn delete_category(
    pool: web::Data<SqlitePool>,
    user: CurrentUser,
    category_id: web::Path<String>,
) -> Result<impl Responder, AppError> {
    let result = sqlx::query("DELETE FROM categories WHERE id = ? AND user_id = ?")
        .bind(category_id.into_inner())
        .bind(user.user_id())
        .execute(&**pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound(messages::CATEGORY_NOT_FOUND.into()));
    }

    Ok(HttpResponse::Ok().json(ApiResponse::message(messages::SUCCESS)))
}
