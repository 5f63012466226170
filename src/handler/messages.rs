//! Messages endpoint
//!
//! `GET` serves a user's message history as JSON. `POST` stores a new message
//! for the logged-in user: the text is sanitized, media links are rewritten
//! into markup, and the author's country is recorded on a best-effort basis.

use http_body_util::Full;
use hyper::body::{Body, Bytes};
use hyper::{HeaderMap, Response};
use std::error::Error;
use std::net::{IpAddr, SocketAddr};

use crate::config::AppState;
use crate::content;
use crate::geo::GeoError;
use crate::http::{self, BodyError, Params};
use crate::logger;
use crate::store::{self, Message, UserLocation};

/// Read path: messages of the `user` query parameter, `[]` when it is absent or empty
pub async fn get_messages(
    query: Option<&str>,
    is_head: bool,
    state: &AppState,
) -> Response<Full<Bytes>> {
    let params = Params::from_query(query);
    let Some(user) = params.get("user").filter(|u| !u.is_empty()) else {
        return http::build_json_response(&[] as &[Message], is_head);
    };

    let owned = user.to_string();
    match store::blocking(&state.datastore, move |s| s.get_messages(&owned)).await {
        Ok(messages) => http::build_json_response(&messages, is_head),
        Err(e) => {
            logger::log_error(&format!("Failed to load messages for {user}: {e}"));
            http::build_500_response()
        }
    }
}

/// Write path: store the form field `text` as a message of the logged-in user
pub async fn post_message<B>(
    headers: &HeaderMap,
    body: B,
    peer: SocketAddr,
    state: &AppState,
) -> Response<Full<Bytes>>
where
    B: Body<Data = Bytes>,
    B::Error: Into<Box<dyn Error + Send + Sync>>,
{
    let Some(user) = state.users.current_user(headers) else {
        return http::build_redirect_response(&state.config.auth.login_url);
    };

    let limit = usize::try_from(state.config.http.max_body_size).unwrap_or(usize::MAX);
    let body = match http::read_body(body, limit).await {
        Ok(body) => body,
        Err(e @ BodyError::TooLarge(_)) => {
            logger::log_warning(&format!("Rejected post from {}: {e}", user.email));
            return http::build_413_response();
        }
        Err(e) => {
            logger::log_warning(&e.to_string());
            return http::build_400_response("Unreadable request body");
        }
    };

    let params = Params::from_form(&body);
    let Some(raw_text) = params.get("text") else {
        return http::build_400_response("Missing form field: text");
    };

    let message = Message::new(user.email.as_str(), content::prepare(raw_text));
    let stored = message.clone();
    if let Err(e) = store::blocking(&state.datastore, move |s| s.store_message(&stored)).await {
        logger::log_error(&format!("Failed to store message for {}: {e}", user.email));
        return http::build_500_response();
    }
    logger::log_message_stored(&message.user, &message.id, message.text.len());

    let ip = client_ip(headers, peer, state.config.geolocation.trust_forwarded_for);
    record_location(state, &user.email, ip).await;

    let target = format!(
        "{}?{}",
        state.config.routes.user_page,
        http::encode_pair("user", &user.email)
    );
    http::build_redirect_response(&target)
}

/// Address used for geolocation
fn client_ip(headers: &HeaderMap, peer: SocketAddr, trust_forwarded_for: bool) -> IpAddr {
    if trust_forwarded_for {
        let forwarded = headers
            .get("x-forwarded-for")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(',').next())
            .and_then(|first| first.trim().parse().ok());
        if let Some(ip) = forwarded {
            return ip;
        }
    }
    peer.ip()
}

/// Look up the caller's country and store it. Never fails the request.
async fn record_location(state: &AppState, user: &str, ip: IpAddr) {
    let details = match state.locator.lookup(ip).await {
        Ok(details) => details,
        Err(GeoError::RateLimited) => {
            logger::log_warning(&format!(
                "Geolocation rate limit exceeded, no location recorded for {user}"
            ));
            return;
        }
        Err(e) => {
            logger::log_error(&format!("Geolocation of {ip} failed: {e}"));
            return;
        }
    };

    if let Some(hostname) = &details.hostname {
        logger::log_debug(&format!("{ip} resolves to {hostname}"));
    }
    let Some(code) = details.country_code.as_deref().filter(|c| !c.is_empty()) else {
        logger::log_debug(&format!(
            "No country for {ip} (bogon: {}), location not recorded",
            details.bogon
        ));
        return;
    };

    let looked_up = if details.ip.is_empty() {
        ip.to_string()
    } else {
        details.ip.clone()
    };
    logger::log_location(
        user,
        &looked_up,
        code,
        details.country_name(&state.country_names),
    );
    let location = UserLocation::new(user, code);
    if let Err(e) = store::blocking(&state.datastore, move |s| s.store_location(&location)).await {
        logger::log_error(&format!("Failed to store location for {user}: {e}"));
    }
}
