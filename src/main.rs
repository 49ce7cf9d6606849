use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpServer};

use clear::auth::{AuthMiddleware, TokenService};
use clear::config::Config;
use clear::error::AppError;
use clear::messages;
use clear::{db, routes};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv::dotenv().ok();
    env_logger::init();

    let config = Config::from_env();

    let pool = db::connect(&config.database_url)
        .await
        .expect("Failed to connect to database");
    db::init_schema(&pool)
        .await
        .expect("Failed to initialize database schema");

    let tokens = TokenService::new(&config.jwt_secret, config.token_ttl_hours);

    log::info!("starting clear server at {}", config.server_url());
    let bind_addr = (config.server_host.clone(), config.server_port);

    HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(pool.clone()))
            .app_data(web::Data::new(tokens.clone()))
            .app_data(web::JsonConfig::default().error_handler(|_err, _req| {
                AppError::BadRequest(messages::INVALID_REQUEST_BODY.into()).into()
            }))
            .app_data(web::QueryConfig::default().error_handler(|_err, _req| {
                AppError::BadRequest(messages::INVALID_REQUEST_BODY.into()).into()
            }))
            .wrap(
                Cors::default()
                    .allow_any_origin()
                    .allow_any_method()
                    .allow_any_header()
                    .max_age(3600),
            )
            .wrap(Logger::default())
            .service(routes::health::health)
            .service(
                web::scope("/api")
                    .wrap(AuthMiddleware)
                    .configure(routes::config),
            )
    })
    .bind(bind_addr)?
    .run()
    .await
}
