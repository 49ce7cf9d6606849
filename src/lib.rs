#![doc = "The `clear` library crate."]
#![doc = ""]
#![doc = "This crate contains the core business logic for the Clear task-management"]
#![doc = "backend: the authenticated-request pipeline (password hashing, token"]
#![doc = "issuance/verification, auth middleware, identity extraction), the domain"]
#![doc = "models, the paginated todo query engine, routing configuration, and error"]
#![doc = "handling. The main binary (`main.rs`) uses it to construct and run the"]
#![doc = "application."]

pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod messages;
pub mod models;
pub mod response;
pub mod routes;
