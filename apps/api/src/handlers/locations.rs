use actix_web::{get, post, web, HttpResponse};
use application::assignments::use_cases::ResolveVanForParentUseCase;
use application::locations::dtos::{PushLocationRequest, ToggleTrackingRequest};
use application::locations::use_cases::{
    GetCurrentLocationUseCase, GetLocationHistoryUseCase, PushLocationUseCase,
    ToggleTrackingUseCase,
};
use application::AppContext;

use crate::extractors::AuthUser;
use crate::handlers::error_handler::HttpAppError;

type HandlerResult = Result<HttpResponse, HttpAppError>;

#[post("/update-location")]
pub async fn update_location(
    ctx: web::Data<AppContext>,
    user: AuthUser,
    req: web::Json<PushLocationRequest>,
) -> HandlerResult {
    let res = PushLocationUseCase::execute(&ctx, &user, req.into_inner()).await?;
    Ok(HttpResponse::Created().json(res))
}

#[get("/driver-location")]
pub async fn driver_location(ctx: web::Data<AppContext>, user: AuthUser) -> HandlerResult {
    let res = GetCurrentLocationUseCase::execute(&ctx, &user).await?;
    Ok(HttpResponse::Ok().json(res))
}

#[get("/van-location")]
pub async fn van_location(ctx: web::Data<AppContext>, user: AuthUser) -> HandlerResult {
    let res = ResolveVanForParentUseCase::execute(&ctx, &user).await?;
    Ok(HttpResponse::Ok().json(res))
}

#[get("/location-history")]
pub async fn location_history(ctx: web::Data<AppContext>, user: AuthUser) -> HandlerResult {
    let res = GetLocationHistoryUseCase::execute(&ctx, &user).await?;
    Ok(HttpResponse::Ok().json(res))
}

#[post("/toggle-gps")]
pub async fn toggle_gps(
    ctx: web::Data<AppContext>,
    user: AuthUser,
    req: web::Json<ToggleTrackingRequest>,
) -> HandlerResult {
    let res = ToggleTrackingUseCase::execute(&ctx, &user, req.into_inner()).await?;
    Ok(HttpResponse::Ok().json(res))
}
