use axum::routing::get;
use axum::Router;

mod liveness;

pub fn router<S>() -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    Router::new().route("/livez", get(liveness::handler))
}
