//! The impls and functions
//!
use std::{convert::Infallible, net::SocketAddr, sync::Arc, time::Instant};
use log::*;
use anyhow::{Context, Result};
use warp::{Filter, Rejection, Reply};
use warp::http::{header::SET_COOKIE, HeaderValue, StatusCode};
use warp::reply::Response;
use uuid::Uuid;
use crate::census::LiveRegistry;
use crate::growth::GrowthReport;
use crate::leak::{drip_count, LeakBuffer};
use crate::observer::GrowthObserver;
use crate::server::{GrowthQuery, ServerState};
use crate::session::{is_valid_observer_id, SessionStore};
use crate::utility;

/// Name of the cookie that identifies an observer.
pub const SESSION_COOKIE: &str = "growthz_session";

impl ServerState {
    /// State with a fresh registry, used as census provider and by the leak route.
    pub fn new(
        store: Arc<dyn SessionStore>,
    ) -> Self
    {
        let registry = Arc::new(LiveRegistry::new());
        ServerState {
            observer: GrowthObserver::new(registry.clone(), store),
            registry,
            leaks: LeakBuffer::new(),
        }
    }
}

/// All routes:
/// - `GET /`: leak some objects.
/// - `GET /growth`: growth since the previous visit of this observer.
/// - `GET /typestats`: the current census.
pub fn routes(
    state: Arc<ServerState>,
) -> impl Filter<Extract = (impl Reply,), Error = Rejection> + Clone
{
    let leak = warp::path::end()
        .and(warp::get())
        .and(with_state(state.clone()))
        .map(leak_handler);
    let growth = warp::path("growth")
        .and(warp::path::end())
        .and(warp::get())
        .and(warp::cookie::optional(SESSION_COOKIE))
        .and(warp::query::<GrowthQuery>())
        .and(with_state(state.clone()))
        .and_then(growth_handler);
    let typestats = warp::path("typestats")
        .and(warp::path::end())
        .and(warp::get())
        .and(with_state(state))
        .and_then(typestats_handler);

    leak.or(growth).or(typestats).with(warp::log("growthz"))
}

fn with_state(
    state: Arc<ServerState>,
) -> impl Filter<Extract = (Arc<ServerState>,), Error = Infallible> + Clone
{
    warp::any().map(move || state.clone())
}

/// Bind to `listen` and serve until ctrl-c.
pub async fn serve(
    state: Arc<ServerState>,
    listen: SocketAddr,
) -> Result<()>
{
    let (address, server) = warp::serve(routes(state))
        .try_bind_with_graceful_shutdown(listen, async {
            tokio::signal::ctrl_c().await.ok();
            info!("ctrl-c received, shutting down");
        })
        .with_context(|| format!("Cannot listen on: {}", listen))?;
    info!("listening on http://{}", address);
    server.await;
    Ok(())
}

fn leak_handler(
    state: Arc<ServerState>,
) -> &'static str
{
    state.leaks.drip(&state.registry, drip_count());
    "drip drip"
}

async fn growth_handler(
    session_cookie: Option<String>,
    query: GrowthQuery,
    state: Arc<ServerState>,
) -> Result<Response, Infallible>
{
    let type_name_filter = match utility::set_regex(&query.type_name_match) {
        Ok(type_name_filter) => type_name_filter,
        Err(e) => {
            debug!("invalid match parameter: {:#}", e);
            return Ok(error_response(StatusCode::BAD_REQUEST, "invalid match regex"));
        }
    };

    let (observer_id, new_session) = match session_cookie {
        Some(observer_id) if is_valid_observer_id(&observer_id) => (observer_id, false),
        _ => (new_observer_id(), true),
    };

    let growth = match state.observer.observe(&observer_id).await {
        Ok(growth) => growth.filtered(&type_name_filter),
        Err(e) => {
            error!("growth for observer {} failed: {:#}", observer_id, e);
            return Ok(error_response(StatusCode::INTERNAL_SERVER_ERROR, "growth calculation failed"));
        }
    };

    let mut response = match query.format.as_deref() {
        Some("json") => warp::reply::json(&growth).into_response(),
        _ => warp::reply::html(render_growth(&growth)).into_response(),
    };
    if new_session
    {
        if let Ok(cookie) = HeaderValue::from_str(&format!("{}={}; Path=/; HttpOnly; SameSite=Lax", SESSION_COOKIE, observer_id))
        {
            response.headers_mut().insert(SET_COOKIE, cookie);
        }
    }
    Ok(response)
}

async fn typestats_handler(
    state: Arc<ServerState>,
) -> Result<Response, Infallible>
{
    let timer = Instant::now();
    match state.observer.sample_census().await {
        Ok(census) => {
            debug!("typestats: {} types: {:?}", census.len(), timer.elapsed());
            Ok(warp::reply::json(&census).into_response())
        }
        Err(e) => {
            error!("typestats failed: {:#}", e);
            Ok(error_response(StatusCode::INTERNAL_SERVER_ERROR, "census failed"))
        }
    }
}

fn error_response(
    status: StatusCode,
    message: &'static str,
) -> Response
{
    warp::reply::with_status(message, status).into_response()
}

/// A new observer id, a random (v4) uuid.
///
/// The id is the only thing separating the peak tables of observers, so it must not be guessable.
pub fn new_observer_id() -> String
{
    Uuid::new_v4().to_string()
}

/// The growth report as an html page, biggest growth first.
pub fn render_growth(
    growth: &GrowthReport,
) -> String
{
    let mut html = String::from("<!doctype html>\n<html>\n<head><title>Object growth</title></head>\n<body>\n<h1>Object growth</h1>\n");
    if growth.is_empty()
    {
        html.push_str("<p>No growth since the previous visit.</p>\n");
    }
    else
    {
        html.push_str("<table>\n<tr><th>type</th><th>growth</th></tr>\n");
        for entry in &growth.entries
        {
            html.push_str(&format!("<tr><td>{}</td><td>+{}</td></tr>\n", escape_html(&entry.type_name), entry.delta));
        }
        html.push_str("</table>\n");
    }
    html.push_str("</body>\n</html>\n");
    html
}

// type names contain generics, like alloc::vec::Vec<u8>.
fn escape_html(
    text: &str,
) -> String
{
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::growth::GrowthEntry;
    use crate::session::MemorySessionStore;

    fn state() -> Arc<ServerState> {
        Arc::new(ServerState::new(Arc::new(MemorySessionStore::new())))
    }
    fn session_cookie<B>(response: &warp::http::Response<B>) -> String {
        let set_cookie = response.headers().get(SET_COOKIE).expect("set-cookie header").to_str().unwrap();
        set_cookie.split(';').next().unwrap().to_string()
    }
    fn growth_json(body: &[u8]) -> Vec<GrowthEntry> {
        serde_json::from_slice(body).unwrap()
    }

    #[tokio::test]
    async fn unit_leak_route_drips() {
        let state = state();
        let response = warp::test::request().method("GET").path("/").reply(&routes(state.clone())).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.body(), "drip drip");
        assert!(state.leaks.len() <= crate::leak::MAX_DRIP);
    }
    #[tokio::test]
    async fn unit_growth_issues_session_cookie() {
        let response = warp::test::request().method("GET").path("/growth").reply(&routes(state())).await;
        assert_eq!(response.status(), StatusCode::OK);
        let cookie = session_cookie(&response);
        assert!(cookie.starts_with("growthz_session="));
        let body = String::from_utf8(response.body().to_vec()).unwrap();
        assert!(body.contains("Object growth"));
    }
    #[tokio::test]
    async fn unit_growth_is_per_session() {
        let state = state();
        let routes = routes(state.clone());
        state.leaks.drip(&state.registry, 7);

        let first = warp::test::request().method("GET").path("/growth?format=json").reply(&routes).await;
        let cookie = session_cookie(&first);
        let entries = growth_json(first.body());
        assert_eq!(entries.len(), 1);
        assert!(entries[0].type_name.ends_with("Leaker"));
        assert_eq!(entries[0].delta, 7);

        // same session, nothing leaked in between.
        let second = warp::test::request().method("GET").path("/growth?format=json").header("cookie", &cookie).reply(&routes).await;
        assert!(second.headers().get(SET_COOKIE).is_none());
        assert!(growth_json(second.body()).is_empty());

        state.leaks.drip(&state.registry, 4);
        let third = warp::test::request().method("GET").path("/growth?format=json").header("cookie", &cookie).reply(&routes).await;
        assert_eq!(growth_json(third.body())[0].delta, 4);

        // a new session starts from zero.
        let other = warp::test::request().method("GET").path("/growth?format=json").reply(&routes).await;
        assert_eq!(growth_json(other.body())[0].delta, 11);
    }
    #[tokio::test]
    async fn unit_growth_match_filter() {
        let state = state();
        state.leaks.drip(&state.registry, 2);
        let routes = routes(state.clone());

        let response = warp::test::request().method("GET").path("/growth?format=json&match=NoSuchType").reply(&routes).await;
        assert!(growth_json(response.body()).is_empty());

        let response = warp::test::request().method("GET").path("/growth?match=(").reply(&routes).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
    #[tokio::test]
    async fn unit_invalid_cookie_gets_new_session() {
        let response = warp::test::request()
            .method("GET")
            .path("/growth")
            .header("cookie", "growthz_session=../../etc")
            .reply(&routes(state()))
            .await;
        assert_eq!(response.status(), StatusCode::OK);
        assert!(!session_cookie(&response).contains(".."));
    }
    #[tokio::test]
    async fn unit_typestats_route() {
        let state = state();
        state.leaks.drip(&state.registry, 3);
        let response = warp::test::request().method("GET").path("/typestats").reply(&routes(state)).await;
        assert_eq!(response.status(), StatusCode::OK);
        let census = crate::census::parse_census(std::str::from_utf8(response.body()).unwrap()).unwrap();
        assert_eq!(census.values().sum::<u64>(), 3);
    }
    #[tokio::test]
    async fn unit_unknown_path_is_not_found() {
        let response = warp::test::request().method("GET").path("/nope").reply(&routes(state())).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
    #[test]
    fn unit_render_growth_escapes_type_names() {
        let growth = GrowthReport {
            entries: vec![GrowthEntry { type_name: "alloc::vec::Vec<u8>".to_string(), delta: 12 }],
        };
        let html = render_growth(&growth);
        assert!(html.contains("<td>alloc::vec::Vec&lt;u8&gt;</td><td>+12</td>"));
        assert!(render_growth(&GrowthReport::new()).contains("No growth"));
    }
    #[test]
    fn unit_new_observer_ids_are_random_and_valid() {
        let first = new_observer_id();
        let second = new_observer_id();
        assert!(is_valid_observer_id(&first));
        assert!(is_valid_observer_id(&second));
        assert_eq!(Uuid::parse_str(&first).unwrap().get_version_num(), 4);
        // consecutive ids share no time or counter prefix.
        assert_ne!(&first[..8], &second[..8]);
        let ids: std::collections::HashSet<String> = (0..1000).map(|_| new_observer_id()).collect();
        assert_eq!(ids.len(), 1000);
    }
    #[tokio::test]
    async fn unit_broken_session_file_recovers() {
        let directory = std::env::temp_dir().join(format!("growthz_test_broken_session_{}", std::process::id()));
        let _ = std::fs::remove_dir_all(&directory);
        let store = Arc::new(crate::session::FileSessionStore::new(&directory).unwrap());
        std::fs::write(directory.join("abc.json"), r#"{"Leaker": 1"#).unwrap();
        let state = Arc::new(ServerState::new(store.clone()));
        state.leaks.drip(&state.registry, 6);
        let routes = routes(state.clone());

        let first = warp::test::request().method("GET").path("/growth?format=json").header("cookie", "growthz_session=abc").reply(&routes).await;
        assert_eq!(first.status(), StatusCode::OK);
        assert_eq!(growth_json(first.body())[0].delta, 6);

        // the session file is rewritten, the next visit works from it.
        let second = warp::test::request().method("GET").path("/growth?format=json").header("cookie", "growthz_session=abc").reply(&routes).await;
        assert_eq!(second.status(), StatusCode::OK);
        assert!(growth_json(second.body()).is_empty());
        assert_eq!(store.load_peaks("abc").unwrap().values().copied().collect::<Vec<u64>>(), vec![6]);
        std::fs::remove_dir_all(&directory).unwrap();
    }
}
