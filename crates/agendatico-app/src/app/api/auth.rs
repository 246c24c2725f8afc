use salvo::{Depot, Request, Response, Router, handler, http::StatusCode, writing::Json};
use serde::{Deserialize, Serialize};
use tracing::error;

use crate::app::api::ErrorResponse;
use crate::config::get_config_from_depot;
use crate::db_handler::get_db_from_depot;
use crate::depot::get_user;
use agendatico_db::model::user::User;
use agendatico_service::auth::{self, session, social::SocialProfile};
use agendatico_service::error::ServiceError;

#[derive(Debug, Deserialize)]
struct RegisterRequest {
    name: String,
    email: String,
    password: String,
}

#[derive(Debug, Deserialize)]
struct LoginRequest {
    email: String,
    password: String,
}

#[derive(Debug, Serialize)]
struct SessionResponse {
    token: String,
    expires_at: chrono::DateTime<chrono::Utc>,
    user: User,
}

/// ## Summary
/// POST /api/auth/register - create an email/password account and a session.
///
/// ## Errors
/// Returns HTTP 400 on empty fields
/// Returns HTTP 409 if the email is already registered
#[handler]
async fn register(req: &mut Request, depot: &mut Depot, res: &mut Response) {
    let payload: RegisterRequest = match req.parse_json().await {
        Ok(p) => p,
        Err(e) => {
            error!(error = ?e, "Failed to parse register payload");
            res.status_code(StatusCode::BAD_REQUEST);
            res.render(Json(ErrorResponse::new("Invalid request body")));
            return;
        }
    };

    if payload.name.trim().is_empty()
        || payload.email.trim().is_empty()
        || payload.password.is_empty()
    {
        res.status_code(StatusCode::BAD_REQUEST);
        res.render(Json(ErrorResponse::new(
            "Name, email, and password are required",
        )));
        return;
    }

    let config = match get_config_from_depot(depot) {
        Ok(c) => c,
        Err(e) => {
            error!(error = ?e, "Failed to get config from depot");
            res.status_code(StatusCode::INTERNAL_SERVER_ERROR);
            res.render(Json(ErrorResponse::new("Internal server error")));
            return;
        }
    };

    let provider = match get_db_from_depot(depot) {
        Ok(p) => p,
        Err(e) => {
            error!(error = ?e, "Failed to get database provider");
            res.status_code(StatusCode::INTERNAL_SERVER_ERROR);
            res.render(Json(ErrorResponse::new("Internal server error")));
            return;
        }
    };
    let mut conn = match provider.get_connection().await {
        Ok(c) => c,
        Err(e) => {
            error!(error = ?e, "Failed to get database connection");
            res.status_code(StatusCode::SERVICE_UNAVAILABLE);
            res.render(Json(ErrorResponse::new("Database unavailable")));
            return;
        }
    };

    let user = match auth::register(&mut conn, &payload.name, &payload.email, &payload.password)
        .await
    {
        Ok(user) => user,
        Err(ServiceError::Conflict(_)) => {
            res.status_code(StatusCode::CONFLICT);
            res.render(Json(ErrorResponse::new("Email already registered")));
            return;
        }
        Err(e) => {
            error!(error = ?e, "Failed to register user");
            res.status_code(StatusCode::INTERNAL_SERVER_ERROR);
            res.render(Json(ErrorResponse::new("Failed to register")));
            return;
        }
    };

    issue_session(&mut conn, user, config.session.ttl_hours, res, StatusCode::CREATED).await;
}

/// ## Summary
/// POST /api/auth/login - verify credentials and issue a session.
///
/// ## Errors
/// Returns HTTP 401 on bad credentials
#[handler]
async fn login(req: &mut Request, depot: &mut Depot, res: &mut Response) {
    let payload: LoginRequest = match req.parse_json().await {
        Ok(p) => p,
        Err(e) => {
            error!(error = ?e, "Failed to parse login payload");
            res.status_code(StatusCode::BAD_REQUEST);
            res.render(Json(ErrorResponse::new("Invalid request body")));
            return;
        }
    };

    let config = match get_config_from_depot(depot) {
        Ok(c) => c,
        Err(e) => {
            error!(error = ?e, "Failed to get config from depot");
            res.status_code(StatusCode::INTERNAL_SERVER_ERROR);
            res.render(Json(ErrorResponse::new("Internal server error")));
            return;
        }
    };

    let provider = match get_db_from_depot(depot) {
        Ok(p) => p,
        Err(e) => {
            error!(error = ?e, "Failed to get database provider");
            res.status_code(StatusCode::INTERNAL_SERVER_ERROR);
            res.render(Json(ErrorResponse::new("Internal server error")));
            return;
        }
    };
    let mut conn = match provider.get_connection().await {
        Ok(c) => c,
        Err(e) => {
            error!(error = ?e, "Failed to get database connection");
            res.status_code(StatusCode::SERVICE_UNAVAILABLE);
            res.render(Json(ErrorResponse::new("Database unavailable")));
            return;
        }
    };

    let user = match auth::login(&mut conn, &payload.email, &payload.password).await {
        Ok(user) => user,
        Err(ServiceError::NotAuthenticated) => {
            res.status_code(StatusCode::UNAUTHORIZED);
            res.render(Json(ErrorResponse::new("Invalid credentials")));
            return;
        }
        Err(e) => {
            error!(error = ?e, "Failed to verify credentials");
            res.status_code(StatusCode::INTERNAL_SERVER_ERROR);
            res.render(Json(ErrorResponse::new("Failed to log in")));
            return;
        }
    };

    issue_session(&mut conn, user, config.session.ttl_hours, res, StatusCode::OK).await;
}

/// ## Summary
/// POST /api/auth/social - session for an externally verified social
/// profile. The OAuth handshake itself lives with the provider; this
/// endpoint only maps the verified profile onto a local account, creating
/// one on first sight.
#[handler]
async fn social(req: &mut Request, depot: &mut Depot, res: &mut Response) {
    let profile: SocialProfile = match req.parse_json().await {
        Ok(p) => p,
        Err(e) => {
            error!(error = ?e, "Failed to parse social profile payload");
            res.status_code(StatusCode::BAD_REQUEST);
            res.render(Json(ErrorResponse::new("Invalid request body")));
            return;
        }
    };

    let config = match get_config_from_depot(depot) {
        Ok(c) => c,
        Err(e) => {
            error!(error = ?e, "Failed to get config from depot");
            res.status_code(StatusCode::INTERNAL_SERVER_ERROR);
            res.render(Json(ErrorResponse::new("Internal server error")));
            return;
        }
    };

    let provider = match get_db_from_depot(depot) {
        Ok(p) => p,
        Err(e) => {
            error!(error = ?e, "Failed to get database provider");
            res.status_code(StatusCode::INTERNAL_SERVER_ERROR);
            res.render(Json(ErrorResponse::new("Internal server error")));
            return;
        }
    };
    let mut conn = match provider.get_connection().await {
        Ok(c) => c,
        Err(e) => {
            error!(error = ?e, "Failed to get database connection");
            res.status_code(StatusCode::SERVICE_UNAVAILABLE);
            res.render(Json(ErrorResponse::new("Database unavailable")));
            return;
        }
    };

    let user = match agendatico_service::auth::social::login_or_register(&mut conn, &profile).await
    {
        Ok(user) => user,
        Err(e) => {
            error!(error = ?e, "Failed social login");
            res.status_code(StatusCode::INTERNAL_SERVER_ERROR);
            res.render(Json(ErrorResponse::new("Failed to log in")));
            return;
        }
    };

    issue_session(&mut conn, user, config.session.ttl_hours, res, StatusCode::OK).await;
}

/// ## Summary
/// POST /api/auth/logout - revoke the presented session token.
#[handler]
async fn logout(req: &mut Request, depot: &mut Depot, res: &mut Response) {
    let token = req
        .header::<String>(salvo::http::header::AUTHORIZATION)
        .and_then(|value| value.strip_prefix("Bearer ").map(str::to_string));

    let Some(token) = token else {
        res.render(Json(serde_json::json!({ "success": true })));
        return;
    };

    let provider = match get_db_from_depot(depot) {
        Ok(p) => p,
        Err(e) => {
            error!(error = ?e, "Failed to get database provider");
            res.status_code(StatusCode::INTERNAL_SERVER_ERROR);
            res.render(Json(ErrorResponse::new("Internal server error")));
            return;
        }
    };
    let mut conn = match provider.get_connection().await {
        Ok(c) => c,
        Err(e) => {
            error!(error = ?e, "Failed to get database connection");
            res.status_code(StatusCode::SERVICE_UNAVAILABLE);
            res.render(Json(ErrorResponse::new("Database unavailable")));
            return;
        }
    };

    if let Err(e) = session::revoke(&mut conn, token.trim()).await {
        error!(error = ?e, "Failed to revoke session");
        res.status_code(StatusCode::INTERNAL_SERVER_ERROR);
        res.render(Json(ErrorResponse::new("Failed to log out")));
        return;
    }

    res.render(Json(serde_json::json!({ "success": true })));
}

/// ## Summary
/// GET /api/auth/me - the authenticated user.
///
/// ## Errors
/// Returns HTTP 401 if not authenticated
#[handler]
async fn me(depot: &mut Depot, res: &mut Response) {
    match get_user(depot) {
        Some(user) => {
            res.render(Json(serde_json::json!({ "user": user })));
        }
        None => {
            res.status_code(StatusCode::UNAUTHORIZED);
            res.render(Json(ErrorResponse::new("Authentication required")));
        }
    }
}

async fn issue_session(
    conn: &mut agendatico_db::db::connection::DbConnection<'_>,
    user: User,
    ttl_hours: i64,
    res: &mut Response,
    status: StatusCode,
) {
    match session::issue(conn, user.id, ttl_hours).await {
        Ok(issued) => {
            res.status_code(status);
            res.render(Json(SessionResponse {
                token: issued.token,
                expires_at: issued.expires_at,
                user,
            }));
        }
        Err(e) => {
            error!(error = ?e, "Failed to issue session");
            res.status_code(StatusCode::INTERNAL_SERVER_ERROR);
            res.render(Json(ErrorResponse::new("Failed to create session")));
        }
    }
}

#[must_use]
pub fn routes() -> Router {
    Router::with_path("auth")
        .push(Router::with_path("register").post(register))
        .push(Router::with_path("login").post(login))
        .push(Router::with_path("social").post(social))
        .push(Router::with_path("logout").post(logout))
        .push(Router::with_path("me").get(me))
}
