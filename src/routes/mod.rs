use axum::{
    middleware,
    routing::{get, post, put},
    Router,
};

use crate::handlers::{admin, driver, public};
use crate::middleware::auth::{auth_middleware, require_admin, require_motorista};
use crate::AppState;

pub fn create_router(state: AppState) -> Router {
    let public_routes = Router::new()
        .route("/health", get(public::health))
        .route("/sinal", get(public::deposit_quote));

    // Admin routes (requires auth + admin role)
    let admin_routes = Router::new()
        // Bookings
        .route("/reservas", get(admin::list_bookings))
        .route(
            "/reservas/{id}",
            get(admin::get_booking).delete(admin::delete_booking),
        )
        .route("/reservas/{id}/status", put(admin::update_booking_status))
        .route("/reservas/{id}/converter", post(admin::convert_booking))
        // Trips
        .route("/viagens", get(admin::list_trips).post(admin::create_trip))
        .route("/viagens/{id}", get(admin::get_trip))
        .route("/viagens/{id}/motoristas", put(admin::assign_drivers))
        .route("/viagens/{id}/status", put(admin::update_trip_status))
        .route("/viagens/{id}/pagamento", put(admin::update_payment_status))
        .route("/settings/viagens", get(admin::trip_settings))
        .layer(middleware::from_fn(require_admin))
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    // Driver routes (requires auth + motorista role)
    let driver_routes = Router::new()
        .route("/viagens", get(driver::my_trips))
        .route("/viagens/{id}/status", put(driver::update_trip_status))
        .layer(middleware::from_fn(require_motorista))
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    Router::new()
        .nest("/api", public_routes)
        .nest("/api/admin", admin_routes)
        .nest("/api/motorista", driver_routes)
        .with_state(state)
}
