use std::io;
use std::net::TcpListener;
use std::sync::Arc;
use std::time::Duration;

use actix_web::dev::Server;
use actix_web::middleware::from_fn;
use actix_web::{App, HttpServer, web};
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use tracing_actix_web::TracingLogger;

use crate::authentication::{JwtSecret, reject_anonymous_users};
use crate::configuration::{DatabaseSettings, Settings};
use crate::domain::{ProfileInputValidator, ProfileValidator};
use crate::routes::{
    all_profiles, current_profile, health_check, profile_body_error, profile_by_handle,
    profile_by_owner, profile_test, save_profile,
};
use crate::store::{PostgresProfileStore, ProfileStore};

// Application struct representing the running application.
pub struct Application {
    port: u16,
    server: Server,
}

impl Application {
    pub async fn build(configuration: Settings) -> Result<Self, io::Error> {
        let connection_pool = get_connection_pool(&configuration.database);

        let address = format!(
            "{}:{}",
            configuration.application.host, configuration.application.port
        );
        let listener = TcpListener::bind(address)?;
        let port = listener.local_addr()?.port();
        let server = run(
            listener,
            connection_pool,
            JwtSecret(configuration.authentication.jwt_secret),
        )?;

        Ok(Self { port, server })
    }

    /// Get the port that the application is listening on.
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Run the application until stopped.
    pub async fn run_until_stopped(self) -> Result<(), io::Error> {
        self.server.await
    }
}

/// Wire the profile routes onto an HTTP server bound to `listener`.
/// The store and validator are registered as trait objects so handlers only
/// see `web::Data<dyn ProfileStore>` and `web::Data<dyn ProfileValidator>`.
/// The raw pool is registered too, for the token middleware's identity lookup.
pub fn run(
    listener: TcpListener,
    db_pool: PgPool,
    jwt_secret: JwtSecret,
) -> Result<Server, io::Error> {
    let store: Arc<dyn ProfileStore> = Arc::new(PostgresProfileStore::new(db_pool.clone()));
    let store = web::Data::from(store);
    let validator: Arc<dyn ProfileValidator> = Arc::new(ProfileInputValidator);
    let validator = web::Data::from(validator);
    let jwt_secret = web::Data::new(jwt_secret);
    let db_pool = web::Data::new(db_pool);
    let server = HttpServer::new(move || {
        App::new()
            // Middleware logger
            .wrap(TracingLogger::default())
            .route("/health_check", web::get().to(health_check))
            .service(
                web::scope("/profile")
                    .route("/test", web::get().to(profile_test))
                    .route("/all", web::get().to(all_profiles))
                    .route("/handle/{handle}", web::get().to(profile_by_handle))
                    .route("/user/{owner_id}", web::get().to(profile_by_owner))
                    .service(
                        web::resource("")
                            .wrap(from_fn(reject_anonymous_users))
                            .app_data(web::JsonConfig::default().error_handler(profile_body_error))
                            .route(web::get().to(current_profile))
                            .route(web::post().to(save_profile)),
                    ),
            )
            .app_data(store.clone())
            .app_data(validator.clone())
            .app_data(jwt_secret.clone())
            .app_data(db_pool.clone())
    })
    .listen(listener)?
    .run();

    Ok(server)
}

/// Get a lazily connected pool for the configured database.
pub fn get_connection_pool(configuration: &DatabaseSettings) -> PgPool {
    PgPoolOptions::new()
        .acquire_timeout(Duration::from_secs(2))
        .connect_lazy_with(configuration.connect_options())
}
