use salvo::Depot;
use tracing::error;

use crate::db_handler::get_db_from_depot;
use crate::depot::depot_keys;
use agendatico_db::actor::Actor;

/// ## Summary
/// Resolves the request's bearer session token to an actor and stores it in
/// the depot. Requests without a (valid) token proceed as guests; browsing
/// is public, handlers decide where authentication is required.
///
/// ## Side Effects
/// Inserts an `Actor` into the depot for downstream handlers.
///
/// ## Errors
/// Responds 503 and stops the chain if no database connection is available.
#[salvo::async_trait]
impl salvo::Handler for AuthMiddleware {
    #[tracing::instrument(skip(self, req, depot, res, ctrl), fields(
        method = %req.method(),
        path = %req.uri().path()
    ))]
    async fn handle(
        &self,
        req: &mut salvo::Request,
        depot: &mut Depot,
        res: &mut salvo::Response,
        ctrl: &mut salvo::FlowCtrl,
    ) {
        tracing::trace!("Resolving request actor");

        let Some(token) = bearer_token(req) else {
            depot.insert(depot_keys::ACTOR, Actor::Guest);
            return;
        };

        let provider = match get_db_from_depot(depot) {
            Ok(p) => p,
            Err(e) => {
                error!(error = ?e, "Failed to get database provider from depot");
                res.status_code(salvo::http::StatusCode::INTERNAL_SERVER_ERROR);
                ctrl.skip_rest();
                return;
            }
        };

        let mut conn = match provider.get_connection().await {
            Ok(c) => c,
            Err(e) => {
                error!(error = ?e, "Failed to get database connection");
                res.status_code(salvo::http::StatusCode::SERVICE_UNAVAILABLE);
                ctrl.skip_rest();
                return;
            }
        };

        match agendatico_service::auth::session::authenticate(&mut conn, &token, chrono::Utc::now())
            .await
        {
            Ok(Some(user)) => {
                tracing::debug!(user_id = user.id, "Session token resolved");
                depot.insert(depot_keys::ACTOR, Actor::User(user));
            }
            Ok(None) => {
                tracing::debug!("Unknown or expired session token, treating as guest");
                depot.insert(depot_keys::ACTOR, Actor::Guest);
            }
            Err(service_err) => {
                error!(error = ?service_err, "Session lookup failed");
                res.status_code(salvo::http::StatusCode::INTERNAL_SERVER_ERROR);
                ctrl.skip_rest();
            }
        }
    }
}

/// Middleware handler for session authentication.
pub struct AuthMiddleware;

fn bearer_token(req: &salvo::Request) -> Option<String> {
    req.header::<String>(salvo::http::header::AUTHORIZATION)
        .and_then(|value| {
            value
                .strip_prefix("Bearer ")
                .map(|token| token.trim().to_string())
        })
        .filter(|token| !token.is_empty())
}
