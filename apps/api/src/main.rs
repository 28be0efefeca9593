use std::sync::Arc;

use actix_cors::Cors;
use actix_web::{middleware::NormalizePath, web, App, HttpServer};
use application::AppContext;
use infrastructure::sms::{DisabledSmsNotifier, SmsNotifier, TwilioSmsNotifier};
use migration::{Migrator, MigratorTrait};
use tracing_actix_web::TracingLogger;

use api::config::Config;
use api::middleware::auth::AuthMiddleware;
use api::middleware::rate_limit::PerIpRateLimitMiddleware;
use api::telemetry::init_tracing;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let config = Config::from_env()?;
    tracing::info!("Starting VanTrack API server...");

    let db = infrastructure::database::init_database(&config.database_url).await?;
    Migrator::up(&db, None).await?;

    let notifier: Arc<dyn SmsNotifier> = match config.twilio.clone() {
        Some(options) => Arc::new(TwilioSmsNotifier::new(
            options,
            config.otp.delivery_timeout,
            config.otp.ttl_seconds,
        )?),
        None => {
            tracing::warn!("Twilio credentials missing; OTP codes will not be delivered");
            Arc::new(DisabledSmsNotifier)
        }
    };
    if config.otp.debug_echo {
        tracing::warn!("OTP_DEBUG_ECHO is on; codes are returned in API responses");
    }

    let ctx = web::Data::new(AppContext::postgres(db, notifier, config.otp.clone()));

    // Built once so every worker shares the same quotas.
    let per_ip_rate_limit = PerIpRateLimitMiddleware::new(config.global_rate_limit_per_minute);
    let auth_rate_limit = PerIpRateLimitMiddleware::new(config.auth_rate_limit_per_minute);

    let server_addr = format!("{}:{}", config.server_host, config.server_port);
    tracing::info!("Server listening on {}", server_addr);

    HttpServer::new(move || {
        let cors = Cors::default()
            .allow_any_origin()
            .allow_any_method()
            .allow_any_header()
            .max_age(3600);
        let auth_rate_limit = auth_rate_limit.clone();

        App::new()
            .wrap(AuthMiddleware)
            .wrap(per_ip_rate_limit.clone())
            .wrap(NormalizePath::trim())
            .wrap(TracingLogger::default())
            .wrap(cors)
            .app_data(ctx.clone())
            .configure(|cfg| api::configure(cfg, auth_rate_limit))
    })
    .bind(&server_addr)?
    .run()
    .await?;

    Ok(())
}
