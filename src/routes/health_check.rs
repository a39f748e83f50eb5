use actix_web::HttpResponse;

/// Liveness probe: answers 200 OK without touching the database.
pub async fn health_check() -> HttpResponse {
    HttpResponse::Ok().finish()
}
