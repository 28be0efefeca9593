use actix_web::dev::Payload;
use actix_web::{FromRequest, HttpMessage, HttpRequest};
use application::auth::dtos::AuthenticatedUser;
use application::AppError;
use futures::future::{ready, Ready};

use crate::handlers::error_handler::HttpAppError;

/// The caller, as resolved by the token middleware. Rejects anonymous requests.
pub struct AuthUser(pub AuthenticatedUser);

impl FromRequest for AuthUser {
    type Error = HttpAppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        match req.extensions().get::<AuthenticatedUser>() {
            Some(user) => ready(Ok(AuthUser(user.clone()))),
            None => ready(Err(HttpAppError(AppError::Authentication(
                "Authentication credentials were not provided".to_string(),
            )))),
        }
    }
}

impl std::ops::Deref for AuthUser {
    type Target = AuthenticatedUser;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}
