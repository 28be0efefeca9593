pub mod config;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod telemetry;

use actix_web::web;

use handlers::error_handler::json_error_handler;
use handlers::{auth, health, locations};
use middleware::rate_limit::PerIpRateLimitMiddleware;

/// JSON extractor settings shared by every route.
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default()
        .limit(64 * 1024)
        .error_handler(json_error_handler)
}

/// Registers every route. `auth_rate_limit` guards the `/api/auth` scope.
pub fn configure(cfg: &mut web::ServiceConfig, auth_rate_limit: PerIpRateLimitMiddleware) {
    cfg.app_data(json_config())
        .service(health::health_check)
        .service(
            web::scope("/api/auth")
                .wrap(auth_rate_limit)
                .service(auth::check_user)
                .service(auth::send_otp)
                .service(auth::resend_otp)
                .service(auth::verify_otp)
                .service(auth::logout)
                .service(auth::get_profile)
                .service(auth::update_profile),
        )
        .service(
            web::scope("/api/locations")
                .service(locations::update_location)
                .service(locations::driver_location)
                .service(locations::van_location)
                .service(locations::location_history)
                .service(locations::toggle_gps),
        );
}
