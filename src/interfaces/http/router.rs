//! API router with Swagger UI

use std::sync::Arc;
use std::time::Instant;

use axum::{
    extract::FromRef,
    middleware,
    routing::{delete, get, post, put},
    Router,
};
use metrics_exporter_prometheus::PrometheusHandle;
use sea_orm::DatabaseConnection;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};
use utoipa_swagger_ui::SwaggerUi;

use super::common::{ApiResponse, EmptyData, PaginatedResponse};
use super::middleware::{auth_middleware, AuthState};
use super::modules::{
    berthings, customs, docks, health, metrics, notifications, request_id, ships,
};
use crate::application::{
    BerthAllocationService, ClearanceService, DockService, NotificationFanout,
    NotificationService, SharedEventBus, ShipService,
};
use crate::domain::RepositoryProvider;
use crate::infrastructure::crypto::jwt::JwtConfig;
use crate::shared::RetryConfig;

/// Unified router state; every handler extracts its own slice via `FromRef`
#[derive(Clone)]
pub struct ApiState {
    pub ships: Arc<ShipService>,
    pub docks: Arc<DockService>,
    pub berthings: Arc<BerthAllocationService>,
    pub customs: Arc<ClearanceService>,
    pub notifications: Arc<NotificationService>,
    pub auth: AuthState,
    pub health: health::HealthState,
}

impl ApiState {
    /// Wire the application services over one repository provider.
    ///
    /// `db` only feeds the health check; pass `None` for the in-memory store.
    pub fn new(
        repos: Arc<dyn RepositoryProvider>,
        event_bus: SharedEventBus,
        jwt_config: JwtConfig,
        retry: RetryConfig,
        db: Option<DatabaseConnection>,
    ) -> Self {
        let fanout = NotificationFanout::new(repos.clone(), event_bus.clone());
        Self {
            ships: Arc::new(ShipService::new(repos.clone())),
            docks: Arc::new(DockService::new(repos.clone())),
            berthings: Arc::new(BerthAllocationService::new(
                repos.clone(),
                fanout.clone(),
                event_bus.clone(),
                retry.clone(),
            )),
            customs: Arc::new(ClearanceService::new(
                repos.clone(),
                fanout.clone(),
                event_bus,
                retry,
            )),
            notifications: Arc::new(NotificationService::new(repos, fanout)),
            auth: AuthState { jwt_config },
            health: health::HealthState {
                db,
                started_at: Arc::new(Instant::now()),
            },
        }
    }
}

impl FromRef<ApiState> for ships::ShipsState {
    fn from_ref(s: &ApiState) -> Self {
        Self {
            service: Arc::clone(&s.ships),
        }
    }
}

impl FromRef<ApiState> for docks::DocksState {
    fn from_ref(s: &ApiState) -> Self {
        Self {
            service: Arc::clone(&s.docks),
        }
    }
}

impl FromRef<ApiState> for berthings::BerthingsState {
    fn from_ref(s: &ApiState) -> Self {
        Self {
            service: Arc::clone(&s.berthings),
        }
    }
}

impl FromRef<ApiState> for customs::CustomsState {
    fn from_ref(s: &ApiState) -> Self {
        Self {
            service: Arc::clone(&s.customs),
        }
    }
}

impl FromRef<ApiState> for notifications::NotificationsState {
    fn from_ref(s: &ApiState) -> Self {
        Self {
            service: Arc::clone(&s.notifications),
        }
    }
}

impl FromRef<ApiState> for health::HealthState {
    fn from_ref(s: &ApiState) -> Self {
        s.health.clone()
    }
}

impl FromRef<ApiState> for AuthState {
    fn from_ref(s: &ApiState) -> Self {
        s.auth.clone()
    }
}

/// Security scheme modifier for OpenAPI
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .description(Some("JWT issued by the port identity provider"))
                        .build(),
                ),
            );
        }
    }
}

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    paths(
        health::health_check,
        ships::register_ship,
        ships::list_ships,
        ships::get_ship,
        docks::register_dock,
        docks::list_docks,
        docks::get_dock,
        docks::set_maintenance,
        docks::delete_dock,
        berthings::create_berthing,
        berthings::list_berthings,
        berthings::get_berthing,
        berthings::update_berthing,
        berthings::approve_berthing,
        berthings::reject_berthing,
        berthings::delete_berthing,
        customs::list_cargo_for_clearance,
        customs::update_customs_status,
        customs::clearance_history,
        notifications::list_notifications,
        notifications::send_notification,
        notifications::unread_count,
        notifications::mark_read,
        notifications::mark_all_read,
        notifications::delete_notification,
        notifications::clear_read,
    ),
    components(
        schemas(
            ApiResponse<EmptyData>,
            EmptyData,
            PaginatedResponse<ships::ShipDto>,
            PaginatedResponse<berthings::BerthingDto>,
            PaginatedResponse<notifications::NotificationDto>,
            health::HealthResponse,
            health::ComponentHealth,
            ships::ShipDto,
            ships::RegisterShipRequest,
            docks::DockDto,
            docks::RegisterDockRequest,
            docks::MaintenanceRequest,
            berthings::BerthingDto,
            berthings::CargoDto,
            berthings::DocumentDto,
            berthings::CargoRequest,
            berthings::CreateBerthingRequest,
            berthings::UpdateBerthingRequest,
            berthings::RejectBerthingRequest,
            customs::UpdateCustomsStatusRequest,
            customs::ClearanceItemDto,
            customs::AuditEntryDto,
            notifications::NotificationDto,
            notifications::SendNotificationRequest,
            notifications::UnreadCountDto,
            notifications::AffectedDto,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Service and database health"),
        (name = "Ships", description = "Ship registry"),
        (name = "Docks", description = "Dock registry and maintenance"),
        (name = "Berthings", description = "Berth allocation workflow: request, approve, reject, start, complete, reschedule, cancel"),
        (name = "Customs", description = "Cargo customs clearance and audit trail"),
        (name = "Notifications", description = "Personal notification inbox"),
    ),
    info(
        title = "Harbor Berth Service API",
        version = "1.0.0",
        description = "Berth allocation and cargo clearance for port operations",
        license(name = "MIT")
    )
)]
pub struct ApiDoc;

/// Build the full HTTP router.
///
/// `/metrics` is mounted only when a Prometheus recorder handle is given,
/// since the global recorder can be installed once per process.
pub fn create_api_router(state: ApiState, metrics_handle: Option<PrometheusHandle>) -> Router {
    let auth_layer = middleware::from_fn_with_state(state.auth.clone(), auth_middleware);

    let ship_routes = Router::new()
        .route("/", get(ships::list_ships).post(ships::register_ship))
        .route("/{id}", get(ships::get_ship));

    let dock_routes = Router::new()
        .route("/", get(docks::list_docks).post(docks::register_dock))
        .route("/{id}", get(docks::get_dock).delete(docks::delete_dock))
        .route("/{id}/maintenance", put(docks::set_maintenance));

    let berthing_routes = Router::new()
        .route(
            "/",
            get(berthings::list_berthings).post(berthings::create_berthing),
        )
        .route(
            "/{id}",
            get(berthings::get_berthing)
                .put(berthings::update_berthing)
                .delete(berthings::delete_berthing),
        )
        .route("/{id}/approve", post(berthings::approve_berthing))
        .route("/{id}/reject", post(berthings::reject_berthing));

    let customs_routes = Router::new()
        .route("/cargo", get(customs::list_cargo_for_clearance))
        .route(
            "/cargo/{cargo_id}/status",
            put(customs::update_customs_status),
        )
        .route(
            "/cargo/{cargo_id}/history",
            get(customs::clearance_history),
        );

    let notification_routes = Router::new()
        .route(
            "/",
            get(notifications::list_notifications).post(notifications::send_notification),
        )
        .route("/unread-count", get(notifications::unread_count))
        .route("/read-all", put(notifications::mark_all_read))
        .route("/read", delete(notifications::clear_read))
        .route("/{id}/read", put(notifications::mark_read))
        .route("/{id}", delete(notifications::delete_notification));

    let api_routes = Router::new()
        .nest("/ships", ship_routes)
        .nest("/docks", dock_routes)
        .nest("/berthings", berthing_routes)
        .nest("/customs", customs_routes)
        .nest("/notifications", notification_routes)
        .layer(auth_layer);

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let mut router = Router::new()
        .merge(SwaggerUi::new("/docs").url("/api-doc/openapi.json", ApiDoc::openapi()))
        .route("/health", get(health::health_check))
        .nest("/api/v1", api_routes)
        .with_state(state);

    if let Some(handle) = metrics_handle {
        router = router.merge(
            Router::new()
                .route("/metrics", get(metrics::prometheus_metrics))
                .with_state(metrics::MetricsState { handle }),
        );
    }

    router
        .layer(middleware::from_fn(metrics::http_metrics_middleware))
        .layer(middleware::from_fn(request_id::request_id_middleware))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{header, Method, Request, StatusCode};
    use serde_json::{json, Value};
    use tower::Service;

    use crate::application::create_event_bus;
    use crate::domain::{User, UserRole};
    use crate::infrastructure::crypto::jwt::create_token;
    use crate::infrastructure::InMemoryRepositoryProvider;

    const SECRET: &str = "router-test-secret";
    const ISSUER: &str = "harbor-identity";

    async fn app() -> Router {
        let repos: Arc<dyn RepositoryProvider> = Arc::new(InMemoryRepositoryProvider::new());
        repos
            .users()
            .save(User::new("root", "root", "root@port.local", UserRole::Admin))
            .await
            .unwrap();
        let state = ApiState::new(
            repos,
            create_event_bus(),
            JwtConfig::new(SECRET, ISSUER),
            RetryConfig::default(),
            None,
        );
        create_api_router(state, None)
    }

    fn token(user_id: &str, role: UserRole) -> String {
        create_token(user_id, user_id, role, &JwtConfig::new(SECRET, ISSUER)).unwrap()
    }

    async fn send(
        app: &Router,
        method: Method,
        uri: &str,
        bearer: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(t) = bearer {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", t));
        }
        let request = match body {
            Some(b) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(b.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let mut svc = app.clone().into_service();
        let resp = svc.call(request).await.unwrap();
        let status = resp.status();
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap();
        let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, value)
    }

    async fn seed_ship_and_dock(app: &Router, agent: &str, admin: &str) -> (String, String) {
        let (status, ship) = send(
            app,
            Method::POST,
            "/api/v1/ships",
            Some(agent),
            Some(json!({
                "imo_number": "9398345",
                "name": "Nordic Breeze",
                "ship_type": "tanker",
                "length": 183.0,
                "gross_tonnage": 29_000.0,
                "flag": "NO"
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED, "{ship}");

        let (status, dock) = send(
            app,
            Method::POST,
            "/api/v1/docks",
            Some(admin),
            Some(json!({ "name": "Tanker Jetty", "length": 250.0, "max_draft": 13.0 })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED, "{dock}");

        (
            ship["data"]["id"].as_str().unwrap().to_string(),
            dock["data"]["id"].as_str().unwrap().to_string(),
        )
    }

    fn berthing_body(ship_id: &str, dock_id: &str) -> Value {
        json!({
            "ship_id": ship_id,
            "dock_id": dock_id,
            "arrival_date": "2024-09-01T06:00:00Z",
            "departure_date": "2024-09-02T18:00:00Z",
            "cargo_details": [{
                "description": "Crude oil",
                "weight": 25_000.0,
                "cargo_type": "liquid",
                "quantity": 30_000.0,
                "unit": "cubic_meters",
                "cargo_owner_id": "owner-1"
            }]
        })
    }

    #[tokio::test]
    async fn health_and_docs_are_public() {
        let app = app().await;
        let (status, body) = send(&app, Method::GET, "/health", None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
        assert_eq!(body["database"]["status"], "in_memory");

        let (status, doc) = send(&app, Method::GET, "/api-doc/openapi.json", None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert!(doc["paths"]["/api/v1/berthings"].is_object());

        let (status, body) = send(&app, Method::GET, "/api/v1/docks", None, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["success"], false);
        assert_eq!(body["code"], "Unauthorized");
    }

    #[tokio::test]
    async fn berthing_workflow_over_http() {
        let app = app().await;
        let agent = token("agent-1", UserRole::MaritimeAgent);
        let admin = token("root", UserRole::Admin);
        let broker = token("broker-1", UserRole::CustomsBroker);
        let owner = token("owner-1", UserRole::CargoOwner);
        let (ship_id, dock_id) = seed_ship_and_dock(&app, &agent, &admin).await;

        let (status, created) = send(
            &app,
            Method::POST,
            "/api/v1/berthings",
            Some(&agent),
            Some(berthing_body(&ship_id, &dock_id)),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED, "{created}");
        assert_eq!(created["success"], true);
        assert_eq!(created["data"]["status"], "pending");
        let id = created["data"]["id"].as_str().unwrap().to_string();
        let cargo_id = created["data"]["cargo_details"][0]["id"]
            .as_str()
            .unwrap()
            .to_string();

        let (_, dock) = send(
            &app,
            Method::GET,
            &format!("/api/v1/docks/{dock_id}"),
            Some(&agent),
            None,
        )
        .await;
        assert_eq!(dock["data"]["status"], "occupied");

        // Same dock again
        let (status, body) = send(
            &app,
            Method::POST,
            "/api/v1/berthings",
            Some(&agent),
            Some(berthing_body(&ship_id, &dock_id)),
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["code"], "Conflict");

        let (status, _) = send(
            &app,
            Method::POST,
            &format!("/api/v1/berthings/{id}/approve"),
            Some(&agent),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (status, approved) = send(
            &app,
            Method::POST,
            &format!("/api/v1/berthings/{id}/approve"),
            Some(&admin),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(approved["data"]["status"], "approved");
        assert_eq!(approved["data"]["approved_by"], "root");

        let (status, queue) =
            send(&app, Method::GET, "/api/v1/customs/cargo", Some(&broker), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(queue["data"].as_array().unwrap().len(), 1);

        let (status, cargo) = send(
            &app,
            Method::PUT,
            &format!("/api/v1/customs/cargo/{cargo_id}/status"),
            Some(&broker),
            Some(json!({ "status": "in_progress", "notes": "Sampling" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK, "{cargo}");
        assert_eq!(cargo["data"]["customs_status"], "in_progress");

        let (status, body) = send(
            &app,
            Method::PUT,
            &format!("/api/v1/customs/cargo/{cargo_id}/status"),
            Some(&broker),
            Some(json!({ "status": "cleared" })),
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["code"], "StateError");

        let (status, history) = send(
            &app,
            Method::GET,
            &format!("/api/v1/customs/cargo/{cargo_id}/history"),
            Some(&owner),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(history["data"].as_array().unwrap().len(), 1);

        let (status, done) = send(
            &app,
            Method::PUT,
            &format!("/api/v1/berthings/{id}"),
            Some(&agent),
            Some(json!({ "status": "completed" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK, "{done}");
        assert_eq!(done["data"]["status"], "completed");

        let (_, dock) = send(
            &app,
            Method::GET,
            &format!("/api/v1/docks/{dock_id}"),
            Some(&agent),
            None,
        )
        .await;
        assert_eq!(dock["data"]["status"], "available");

        let (status, count) = send(
            &app,
            Method::GET,
            "/api/v1/notifications/unread-count",
            Some(&agent),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        // approved + completed
        assert_eq!(count["data"]["count"], 2);

        let (_, owner_inbox) =
            send(&app, Method::GET, "/api/v1/notifications", Some(&owner), None).await;
        assert_eq!(owner_inbox["data"]["total"], 1);
        assert_eq!(
            owner_inbox["data"]["items"][0]["notification_type"],
            "customs_update"
        );
    }

    #[tokio::test]
    async fn reject_needs_reason_and_bad_input_is_400() {
        let app = app().await;
        let agent = token("agent-1", UserRole::MaritimeAgent);
        let admin = token("root", UserRole::Admin);
        let (ship_id, dock_id) = seed_ship_and_dock(&app, &agent, &admin).await;

        let mut backwards = berthing_body(&ship_id, &dock_id);
        backwards["departure_date"] = json!("2024-08-01T00:00:00Z");
        let (status, body) = send(
            &app,
            Method::POST,
            "/api/v1/berthings",
            Some(&agent),
            Some(backwards),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "ValidationError");

        let mut no_weight = berthing_body(&ship_id, &dock_id);
        no_weight["cargo_details"][0]["weight"] = json!(0.0);
        let (status, _) = send(
            &app,
            Method::POST,
            "/api/v1/berthings",
            Some(&agent),
            Some(no_weight),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (_, created) = send(
            &app,
            Method::POST,
            "/api/v1/berthings",
            Some(&agent),
            Some(berthing_body(&ship_id, &dock_id)),
        )
        .await;
        let id = created["data"]["id"].as_str().unwrap().to_string();

        let (status, _) = send(
            &app,
            Method::POST,
            &format!("/api/v1/berthings/{id}/reject"),
            Some(&admin),
            Some(json!({ "reason": "" })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, rejected) = send(
            &app,
            Method::POST,
            &format!("/api/v1/berthings/{id}/reject"),
            Some(&admin),
            Some(json!({ "reason": "Jetty under inspection" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(rejected["data"]["status"], "rejected");
        assert_eq!(rejected["data"]["rejection_reason"], "Jetty under inspection");

        let (status, body) = send(
            &app,
            Method::GET,
            "/api/v1/berthings/does-not-exist",
            Some(&admin),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["code"], "NotFound");
    }

    #[tokio::test]
    async fn agents_only_list_their_own_requests() {
        let app = app().await;
        let agent = token("agent-1", UserRole::MaritimeAgent);
        let other = token("agent-2", UserRole::MaritimeAgent);
        let admin = token("root", UserRole::Admin);
        let (ship_id, dock_id) = seed_ship_and_dock(&app, &agent, &admin).await;

        let (status, _) = send(
            &app,
            Method::POST,
            "/api/v1/berthings",
            Some(&agent),
            Some(berthing_body(&ship_id, &dock_id)),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);

        let (_, mine) = send(&app, Method::GET, "/api/v1/berthings", Some(&agent), None).await;
        assert_eq!(mine["data"]["total"], 1);
        let (_, theirs) = send(&app, Method::GET, "/api/v1/berthings", Some(&other), None).await;
        assert_eq!(theirs["data"]["total"], 0);
        let (_, all) = send(
            &app,
            Method::GET,
            "/api/v1/berthings?status=pending",
            Some(&admin),
            None,
        )
        .await;
        assert_eq!(all["data"]["total"], 1);

        let (status, _) = send(
            &app,
            Method::GET,
            "/api/v1/berthings?status=sailing",
            Some(&admin),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}
