use actix_web::{get, post, routes, web, HttpResponse};
use application::auth::dtos::{CheckUserRequest, ResendOtpRequest, SendOtpRequest, VerifyOtpRequest};
use application::auth::use_cases::{
    CheckUserExistsUseCase, LogoutUseCase, RequestOtpUseCase, ResendOtpUseCase, VerifyOtpUseCase,
};
use application::users::dtos::UpdateProfileRequest;
use application::users::use_cases::{GetProfileUseCase, UpdateProfileUseCase};
use application::AppContext;

use crate::extractors::AuthUser;
use crate::handlers::error_handler::HttpAppError;

type HandlerResult = Result<HttpResponse, HttpAppError>;

#[post("/check-user")]
pub async fn check_user(ctx: web::Data<AppContext>, req: web::Json<CheckUserRequest>) -> HandlerResult {
    let res = CheckUserExistsUseCase::execute(&ctx, req.into_inner()).await?;
    Ok(HttpResponse::Ok().json(res))
}

#[post("/send-otp")]
pub async fn send_otp(ctx: web::Data<AppContext>, req: web::Json<SendOtpRequest>) -> HandlerResult {
    let res = RequestOtpUseCase::execute(&ctx, req.into_inner()).await?;
    Ok(HttpResponse::Ok().json(res))
}

#[post("/resend-otp")]
pub async fn resend_otp(ctx: web::Data<AppContext>, req: web::Json<ResendOtpRequest>) -> HandlerResult {
    let res = ResendOtpUseCase::execute(&ctx, req.into_inner()).await?;
    Ok(HttpResponse::Ok().json(res))
}

#[post("/verify-otp")]
pub async fn verify_otp(ctx: web::Data<AppContext>, req: web::Json<VerifyOtpRequest>) -> HandlerResult {
    let res = VerifyOtpUseCase::execute(&ctx, req.into_inner()).await?;
    Ok(HttpResponse::Ok().json(res))
}

#[post("/logout")]
pub async fn logout(ctx: web::Data<AppContext>, user: AuthUser) -> HandlerResult {
    let res = LogoutUseCase::execute(&ctx, &user).await?;
    Ok(HttpResponse::Ok().json(res))
}

#[get("/profile")]
pub async fn get_profile(ctx: web::Data<AppContext>, user: AuthUser) -> HandlerResult {
    let res = GetProfileUseCase::execute(&ctx, &user).await?;
    Ok(HttpResponse::Ok().json(res))
}

#[routes]
#[put("/profile")]
#[put("/update-profile")]
pub async fn update_profile(
    ctx: web::Data<AppContext>,
    user: AuthUser,
    req: web::Json<UpdateProfileRequest>,
) -> HandlerResult {
    let res = UpdateProfileUseCase::execute(&ctx, &user, req.into_inner()).await?;
    Ok(HttpResponse::Ok().json(res))
}
