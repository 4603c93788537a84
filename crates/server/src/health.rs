use api_types::health::Health;
use axum::Json;
use chrono::Utc;

/// Liveness probe. Does not touch the database.
pub async fn get() -> Json<Health> {
    Json(Health {
        status: "ok".to_string(),
        timestamp: Utc::now(),
    })
}
