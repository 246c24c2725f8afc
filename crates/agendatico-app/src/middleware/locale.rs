use salvo::Depot;

use crate::depot::depot_keys;
use agendatico_core::constants::LOCALE_COOKIE;
use agendatico_core::locale;

/// ## Summary
/// Negotiates the request locale (cookie, then `Accept-Language`, then the
/// Spanish default) and stores it in the depot.
///
/// ## Side Effects
/// Inserts a `Locale` into the depot for downstream handlers.
#[salvo::async_trait]
impl salvo::Handler for LocaleMiddleware {
    #[tracing::instrument(skip(self, req, depot, _res, _ctrl))]
    async fn handle(
        &self,
        req: &mut salvo::Request,
        depot: &mut Depot,
        _res: &mut salvo::Response,
        _ctrl: &mut salvo::FlowCtrl,
    ) {
        let cookie = req
            .cookie(LOCALE_COOKIE)
            .map(|cookie| cookie.value().to_string());
        let header = req.header::<String>(salvo::http::header::ACCEPT_LANGUAGE);

        let locale = locale::negotiate(cookie.as_deref(), header.as_deref());
        tracing::trace!(%locale, "Locale negotiated");

        depot.insert(depot_keys::LOCALE, locale);
    }
}

/// Middleware handler for locale negotiation.
pub struct LocaleMiddleware;
