pub mod categories;
pub mod health;
pub mod todos;
pub mod users;

use actix_web::web;

/// Registers every route under the shared API prefix. The caller applies the
/// prefix scope and the auth middleware; see `main.rs`.
pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/user")
            .service(users::register)
            .service(users::login)
            .service(users::status)
            .service(users::update_theme)
            .service(users::change_password)
            .service(users::send_mail)
            .service(users::check_mail),
    )
    .service(
        web::scope("/category")
            .service(categories::list_categories)
            .service(categories::create_category)
            .service(categories::update_category)
            .service(categories::delete_category),
    )
    .service(
        web::scope("/todo")
            .service(todos::page_todos)
            .service(todos::create_todo)
            .service(todos::update_todo)
            .service(todos::delete_todo),
    );
}
