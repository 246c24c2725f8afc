use salvo::http::cookie::Cookie;
use salvo::http::cookie::time::Duration;
use salvo::{Request, Response, Router, handler, http::StatusCode, writing::Json};
use serde::Deserialize;
use tracing::error;

use crate::app::api::ErrorResponse;
use agendatico_core::constants::{LOCALE_COOKIE, LOCALE_COOKIE_MAX_AGE_DAYS};
use agendatico_core::locale::Locale;

#[derive(Debug, Deserialize)]
struct SwitchLocaleRequest {
    locale: String,
}

/// ## Summary
/// POST /api/locale - persist the visitor's locale choice in a cookie.
///
/// ## Errors
/// Returns HTTP 422 for unsupported locales
#[handler]
async fn switch(req: &mut Request, res: &mut Response) {
    let payload: SwitchLocaleRequest = match req.parse_json().await {
        Ok(p) => p,
        Err(e) => {
            error!(error = ?e, "Failed to parse locale payload");
            res.status_code(StatusCode::BAD_REQUEST);
            res.render(Json(ErrorResponse::new("Invalid request body")));
            return;
        }
    };

    let Ok(locale) = payload.locale.parse::<Locale>() else {
        res.status_code(StatusCode::UNPROCESSABLE_ENTITY);
        res.render(Json(ErrorResponse::new("Unsupported locale")));
        return;
    };

    let cookie = Cookie::build((LOCALE_COOKIE, locale.as_str()))
        .path("/")
        .max_age(Duration::days(LOCALE_COOKIE_MAX_AGE_DAYS))
        .build();
    res.add_cookie(cookie);

    res.render(Json(serde_json::json!({
        "success": true,
        "locale": locale,
    })));
}

#[must_use]
pub fn routes() -> Router {
    Router::with_path("locale").post(switch)
}
