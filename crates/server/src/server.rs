use axum::{
    Router,
    extract::{Request, State},
    http::StatusCode,
    middleware::{self, Next},
    response::Response,
    routing::{get, post},
};
use axum_extra::{
    TypedHeader,
    headers::{Authorization, authorization::Basic},
};
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter};

use std::sync::Arc;

use crate::{expenses, groups, invites, participants, user};
use engine::Engine;

#[derive(Clone)]
pub struct ServerState {
    pub engine: Arc<Engine>,
    pub db: DatabaseConnection,
}

async fn auth(
    auth_header: TypedHeader<Authorization<Basic>>,
    State(state): State<ServerState>,
    mut request: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    if auth_header.username().is_empty() || auth_header.password().is_empty() {
        return Err(StatusCode::UNAUTHORIZED);
    }

    let user: Option<user::Model> = user::Entity::find()
        .filter(user::Column::Username.eq(auth_header.username()))
        .filter(user::Column::Password.eq(auth_header.password()))
        .one(&state.db)
        .await
        .map_err(|_| StatusCode::UNAUTHORIZED)?;

    let Some(user) = user else {
        return Err(StatusCode::UNAUTHORIZED);
    };

    request.extensions_mut().insert(user);
    Ok(next.run(request).await)
}

fn router(state: ServerState) -> Router {
    Router::new()
        .route("/groups", post(groups::create).get(groups::list))
        .route(
            "/groups/{id}",
            get(groups::detail)
                .patch(groups::rename)
                .delete(groups::remove),
        )
        .route("/participants", post(participants::create))
        .route(
            "/participants/{id}",
            axum::routing::patch(participants::update).delete(participants::remove),
        )
        .route("/expenses", post(expenses::create).get(expenses::list))
        .route(
            "/expenses/{id}",
            axum::routing::patch(expenses::update).delete(expenses::remove),
        )
        .route("/invites/accept", post(invites::accept))
        .route_layer(middleware::from_fn_with_state(state.clone(), auth))
        .with_state(state)
}

pub async fn run(engine: Engine, db: DatabaseConnection) {
    let listener = match tokio::net::TcpListener::bind("127.0.0.1:3000").await {
        Ok(listener) => listener,
        Err(err) => {
            tracing::error!("failed to bind server listener: {err}");
            return;
        }
    };
    if let Err(err) = run_with_listener(engine, db, listener).await {
        tracing::error!("server failed: {err}");
    }
}

pub async fn run_with_listener(
    engine: Engine,
    db: DatabaseConnection,
    listener: tokio::net::TcpListener,
) -> Result<(), std::io::Error> {
    let addr = listener.local_addr()?;
    tracing::info!("Server listening on {}", addr);

    let state = ServerState {
        engine: Arc::new(engine),
        db,
    };

    axum::serve(listener, router(state)).await
}

pub fn spawn_with_listener(
    engine: Engine,
    db: DatabaseConnection,
    listener: tokio::net::TcpListener,
) -> Result<std::net::SocketAddr, std::io::Error> {
    let addr = listener.local_addr()?;

    tokio::spawn(async move {
        if let Err(err) = run_with_listener(engine, db, listener).await {
            tracing::error!("server failed: {err}");
        }
    });

    Ok(addr)
}

#[cfg(test)]
mod tests {
    use api_types::group::{GroupCreated, GroupDetailResponse};
    use axum::{
        body::Body,
        http::{Request as HttpRequest, header},
    };
    use base64::{Engine as _, engine::general_purpose::STANDARD};
    use http_body_util::BodyExt;
    use migration::MigratorTrait;
    use serde_json::json;
    use tower::ServiceExt;

    use super::*;

    async fn test_router() -> Router {
        let db = sea_orm::Database::connect("sqlite::memory:").await.unwrap();
        migration::Migrator::up(&db, None).await.unwrap();
        let engine = Engine::builder().database(db.clone()).build().await.unwrap();
        engine
            .new_user("alice", "password", "alice@test.com", Some("Alice"))
            .await
            .unwrap();
        router(ServerState {
            engine: Arc::new(engine),
            db,
        })
    }

    fn authed(method: &str, uri: &str, body: Option<serde_json::Value>) -> HttpRequest<Body> {
        let credentials = STANDARD.encode("alice:password");
        let builder = HttpRequest::builder()
            .method(method)
            .uri(uri)
            .header(header::AUTHORIZATION, format!("Basic {credentials}"))
            .header(header::CONTENT_TYPE, "application/json");
        match body {
            Some(json) => builder.body(Body::from(json.to_string())).unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        }
    }

    async fn json_body<T: serde::de::DeserializeOwned>(response: Response) -> T {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn rejects_missing_credentials() {
        let app = test_router().await;
        let response = app
            .oneshot(
                HttpRequest::builder()
                    .method("GET")
                    .uri("/groups")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        // TypedHeader rejects the absent Authorization header outright.
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn rejects_wrong_password() {
        let app = test_router().await;
        let credentials = STANDARD.encode("alice:nope");
        let response = app
            .oneshot(
                HttpRequest::builder()
                    .method("GET")
                    .uri("/groups")
                    .header(header::AUTHORIZATION, format!("Basic {credentials}"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn group_round_trip_over_http() {
        let app = test_router().await;

        let response = app
            .clone()
            .oneshot(authed(
                "POST",
                "/groups",
                Some(json!({ "name": "Trip", "participants": [] })),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let created: GroupCreated = json_body(response).await;

        let response = app
            .clone()
            .oneshot(authed("GET", &format!("/groups/{}", created.id), None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let detail: GroupDetailResponse = json_body(response).await;
        assert_eq!(detail.group.name, "Trip");
        assert_eq!(detail.participants.len(), 1);
        assert_eq!(detail.summary.total_spent, 0.0);
    }

    #[tokio::test]
    async fn expense_appears_in_group_summary() {
        let app = test_router().await;

        let response = app
            .clone()
            .oneshot(authed(
                "POST",
                "/groups",
                Some(json!({ "name": "Lunch club", "participants": null })),
            ))
            .await
            .unwrap();
        let created: GroupCreated = json_body(response).await;

        let detail: GroupDetailResponse = json_body(
            app.clone()
                .oneshot(authed("GET", &format!("/groups/{}", created.id), None))
                .await
                .unwrap(),
        )
        .await;
        let payer = detail.participants[0].id;

        let response = app
            .clone()
            .oneshot(authed(
                "POST",
                "/expenses",
                Some(json!({
                    "group_id": created.id,
                    "description": "Lunch",
                    "amount": 42.0,
                    "date": "2026-02-05T12:00:00Z",
                    "payer_id": payer,
                    "split_mode": "equal",
                    "splits": null
                })),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let detail: GroupDetailResponse = json_body(
            app.clone()
                .oneshot(authed("GET", &format!("/groups/{}", created.id), None))
                .await
                .unwrap(),
        )
        .await;
        assert_eq!(detail.expenses.len(), 1);
        assert_eq!(detail.summary.total_spent, 42.0);
        // Sole participant pays and owes everything: net zero, nothing to settle.
        assert_eq!(detail.summary.balances[0].net, 0.0);
        assert!(detail.summary.settlements.is_empty());
    }
}
