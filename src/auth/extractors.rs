use actix_web::dev::Payload;
use actix_web::{Error as ActixError, FromRequest, HttpMessage, HttpRequest};
use std::future::{ready, Ready};

use crate::auth::token::Claims;
use crate::error::AppError;

/// Extracts the authenticated user's claims from request extensions.
///
/// Intended for routes protected by `AuthMiddleware`, which validates the
/// token and inserts the decoded [`Claims`] into request extensions. If the
/// claims are missing (middleware not applied, or an internal logic error
/// after auth) this extractor fails with 401 rather than guessing an
/// identity.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub Claims);

impl CurrentUser {
    pub fn user_id(&self) -> &str {
        &self.0.sub
    }
}

impl FromRequest for CurrentUser {
    type Error = ActixError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        match req.extensions().get::<Claims>().cloned() {
            Some(claims) => ready(Ok(CurrentUser(claims))),
            None => {
                let err = AppError::Unauthorized(
                    "no authenticated identity on request; is AuthMiddleware active?".to_string(),
                );
                ready(Err(err.into()))
            }
        }
    }
}
