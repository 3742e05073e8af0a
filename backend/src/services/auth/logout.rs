use super::SESSION_COOKIE;
use actix_web::cookie::Cookie;
use actix_web::HttpResponse;
use common::requests::LoginResponse;

pub(crate) async fn process() -> HttpResponse {
    let mut cookie = Cookie::build(SESSION_COOKIE, "").path("/").finish();
    cookie.make_removal();
    HttpResponse::Ok()
        .cookie(cookie)
        .json(LoginResponse { success: true })
}
