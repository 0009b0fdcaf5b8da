//! Axum application setup.

use axum::{
    Router,
    routing::{get, post},
};
use tower_http::cors::{Any, CorsLayer};

use super::handlers;
use super::state::AppState;

/// Create the Axum router with all routes.
pub fn create_router(state: AppState) -> Router {
    // CORS configuration for local development
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api_routes = Router::new()
        .route("/profile", get(handlers::get_profile))
        .route("/data", get(handlers::get_data_preview))
        .route("/filter", post(handlers::apply_filters))
        .route("/export", get(handlers::export_data))
        .route("/refresh", post(handlers::refresh));

    Router::new()
        .nest("/api", api_routes)
        .layer(cors)
        .with_state(state)
}

/// Start the web server.
pub async fn run_server(state: AppState, port: u16) -> Result<(), Box<dyn std::error::Error>> {
    let app = create_router(state);
    let addr = std::net::SocketAddr::from(([127, 0, 0, 1], port));

    println!("Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::{Body, to_bytes},
        http::{Request, StatusCode, header},
    };
    use ledgerlens::{LedgerConfig, Session};
    use serde_json::{Value, json};
    use tower::ServiceExt;

    const ORDERS: &str = "supplier,lpo_date,grn_date,ordered_qty,received_qty
Acme,2024-01-10,2024-01-05,50,60
Acme,2024-01-10,2024-01-10,150,150
Globex,2024-01-10,2024-01-20,200,150
";

    fn app() -> Router {
        let session =
            Session::from_bytes("orders.csv", ORDERS.as_bytes(), LedgerConfig::default()).unwrap();
        create_router(AppState::new(session))
    }

    async fn body_json(response: axum::response::Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn post_json(uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_profile_lists_columns() {
        let response = app()
            .oneshot(Request::get("/api/profile").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let json = body_json(response).await;
        assert_eq!(json["profile"]["columns"].as_array().unwrap().len(), 5);
        assert_eq!(json["profile"]["columns"][0]["kind"], "categorical");
        assert_eq!(json["source"]["row_count"], 3);
    }

    #[tokio::test]
    async fn test_data_preview() {
        let response = app()
            .oneshot(Request::get("/api/data").body(Body::empty()).unwrap())
            .await
            .unwrap();
        let json = body_json(response).await;
        assert_eq!(json["rows"].as_array().unwrap().len(), 3);
        assert_eq!(json["rows"][0][1], "2024-01-10");
        assert_eq!(json["truncated"], false);
    }

    #[tokio::test]
    async fn test_filter_returns_stats_and_reconciliation() {
        let body = json!({
            "conditions": [
                {"type": "equality", "column": "supplier", "selection": {"value": "Acme"}},
                {"type": "comparison", "column": "ordered_qty", "op": ">", "rhs": {"literal": "100"}}
            ]
        });
        let response = app().oneshot(post_json("/api/filter", body)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let json = body_json(response).await;
        assert_eq!(json["status"], "matched");
        assert_eq!(json["stats"]["matched_rows"], 1);
        assert_eq!(json["stats"]["total_rows"], 3);
        assert_eq!(json["reconciliation"]["quantities"]["matched"], 1);
    }

    #[tokio::test]
    async fn test_filter_no_rows_matched() {
        let body = json!({
            "conditions": [
                {"type": "equality", "column": "supplier", "selection": {"value": "Umbrella"}}
            ]
        });
        let json = body_json(app().oneshot(post_json("/api/filter", body)).await.unwrap()).await;
        assert_eq!(json["status"], "no_rows_matched");
        assert_eq!(json["rows"].as_array().unwrap().len(), 0);
    }

    #[tokio::test]
    async fn test_unknown_column_is_unprocessable() {
        let body = json!({
            "conditions": [
                {"type": "equality", "column": "region", "selection": "all"}
            ]
        });
        let response = app().oneshot(post_json("/api/filter", body)).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body_json(response).await["error"], "filter_error");
    }

    #[tokio::test]
    async fn test_export_formats() {
        let response = app()
            .oneshot(Request::get("/api/export?format=tsv").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            "text/tab-separated-values; charset=utf-8"
        );
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let text = String::from_utf8(bytes.to_vec()).unwrap();
        assert!(text.starts_with("supplier\tlpo_date"));
        assert!(text.lines().next().unwrap().ends_with("date_status\tqty_status"));

        let response = app()
            .oneshot(Request::get("/api/export?format=xlsx").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::CONTENT_DISPOSITION],
            "attachment; filename=\"filtered_data.xlsx\""
        );
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert!(bytes.starts_with(b"PK"));

        let response = app()
            .oneshot(Request::get("/api/export?format=parquet").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_refresh_requires_file_source() {
        let response = app()
            .oneshot(Request::post("/api/refresh").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
