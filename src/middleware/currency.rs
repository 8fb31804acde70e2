// src/middleware/currency.rs

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};

use crate::config::AppState;

pub const CURRENCY_COOKIE: &str = "currency";

// GB paga em libras, o resto do mundo em dólar
pub fn currency_for_country(country: &str) -> &'static str {
    if country.trim().eq_ignore_ascii_case("GB") {
        "gbp"
    } else {
        "usd"
    }
}

/// Define o cookie `currency` a partir do país de geolocalização, mas só se o
/// usuário ainda não tiver uma preferência.
pub async fn currency_preference(
    State(app_state): State<AppState>,
    jar: CookieJar,
    request: Request,
    next: Next,
) -> Response {
    if jar.get(CURRENCY_COOKIE).is_some() {
        return next.run(request).await;
    }

    let country = request
        .headers()
        .get(app_state.config.geo_country_header.as_str())
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default();
    let currency = currency_for_country(country);

    let response = next.run(request).await;

    let cookie = Cookie::build((CURRENCY_COOKIE, currency))
        .path("/")
        .max_age(time::Duration::days(365))
        .same_site(SameSite::Lax);

    (jar.add(cookie), response).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_gb_gets_pounds() {
        assert_eq!(currency_for_country("GB"), "gbp");
        assert_eq!(currency_for_country("gb"), "gbp");
        assert_eq!(currency_for_country("US"), "usd");
        assert_eq!(currency_for_country(""), "usd");
    }
}
