use std::sync::LazyLock;
use std::{env, io};

use actix_web::rt;
use chrono::Duration;
use fake::Fake;
use fake::faker::internet::en::SafeEmail;
use fake::faker::name::en::Name;
use reqwest::{Client, Response};
use secrecy::SecretString;
use sqlx::{Connection, Executor, PgConnection, PgPool};
use uuid::Uuid;

use profile_api::authentication::{JwtSecret, encode_token};
use profile_api::configuration::{DatabaseSettings, get_configuration};
use profile_api::startup::{Application, get_connection_pool};
use profile_api::telemetry::{get_subscriber, init_subscriber};

// Ensure that the tracing stack is only initialized once
static TRACING: LazyLock<()> = LazyLock::new(|| {
    let default_filter_level = "info".to_string();
    let subscriber_name = "test".to_string();
    if env::var("TEST_LOG").is_ok() {
        let subscriber = get_subscriber(subscriber_name, default_filter_level, io::stdout);
        init_subscriber(subscriber).expect("Failed to initialize tracing.");
    } else {
        let subscriber = get_subscriber(subscriber_name, default_filter_level, io::sink);
        init_subscriber(subscriber).expect("Failed to initialize tracing.");
    };
});

// Structure representing the test application.
pub struct TestApp {
    pub address: String,
    pub db_pool: PgPool,
    pub test_user: TestUser,
    pub api_client: Client,
    pub jwt_secret: JwtSecret,
}

impl TestApp {
    /// Register another identity and return it.
    pub async fn create_user(&self) -> TestUser {
        let user = TestUser::generate();
        user.store(&self.db_pool).await;
        user
    }

    /// A valid bearer token for `user`.
    pub fn token_for(&self, user: &TestUser) -> String {
        encode_token(user.user_id, &self.jwt_secret, Duration::hours(1))
            .expect("Failed to issue a test token.")
    }

    /// Send a POST request to the profile endpoint as `user`.
    pub async fn post_profile_as(&self, user: &TestUser, body: &serde_json::Value) -> Response {
        self.api_client
            .post(&format!("{}/profile", &self.address))
            .bearer_auth(self.token_for(user))
            .json(body)
            .send()
            .await
            .expect("Failed to execute request.")
    }

    /// Send a POST request to the profile endpoint as the default test user.
    pub async fn post_profile(&self, body: &serde_json::Value) -> Response {
        self.post_profile_as(&self.test_user, body).await
    }

    pub async fn get_current_profile(&self) -> Response {
        self.api_client
            .get(&format!("{}/profile", &self.address))
            .bearer_auth(self.token_for(&self.test_user))
            .send()
            .await
            .expect("Failed to execute request.")
    }

    pub async fn get_all_profiles(&self) -> Response {
        self.api_client
            .get(&format!("{}/profile/all", &self.address))
            .send()
            .await
            .expect("Failed to execute request.")
    }

    pub async fn get_profile_by_handle(&self, handle: &str) -> Response {
        self.api_client
            .get(&format!("{}/profile/handle/{}", &self.address, handle))
            .send()
            .await
            .expect("Failed to execute request.")
    }

    /// Move the profiles table out of the application's reach so every
    /// profile query fails.
    pub async fn break_profiles_table(&self) {
        sqlx::query("ALTER TABLE profiles RENAME TO profiles_unavailable")
            .execute(&self.db_pool)
            .await
            .expect("Failed to rename the profiles table.");
    }

    pub async fn get_profile_by_user(&self, user_id: &str) -> Response {
        self.api_client
            .get(&format!("{}/profile/user/{}", &self.address, user_id))
            .send()
            .await
            .expect("Failed to execute request.")
    }
}

// An identity record, as the identity provider would have stored it.
pub struct TestUser {
    pub user_id: Uuid,
    pub name: String,
    pub email: String,
    pub avatar: String,
}

impl TestUser {
    pub fn generate() -> Self {
        let email: String = SafeEmail().fake();
        Self {
            user_id: Uuid::new_v4(),
            name: Name().fake(),
            avatar: format!("https://www.gravatar.com/avatar/{}", Uuid::new_v4().simple()),
            // Prefix keeps generated emails unique within a test database.
            email: format!("{}.{}", Uuid::new_v4().simple(), email),
        }
    }

    async fn store(&self, pool: &PgPool) {
        sqlx::query(
            r#"
            INSERT INTO users (id, name, email, avatar)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(self.user_id)
        .bind(&self.name)
        .bind(&self.email)
        .bind(&self.avatar)
        .execute(pool)
        .await
        .expect("Failed to store test user.");
    }
}

/// Spawns the application against a fresh database.
/// # Returns
/// A `TestApp` with the application address, a database connection pool,
/// a stored test user and the token secret the application trusts.
pub async fn spawn_app() -> TestApp {
    LazyLock::force(&TRACING);

    // Randomize configuration to avoid conflicts
    let configuration = {
        let mut c = get_configuration().expect("Failed to read configuration.");
        // Use a different database for each test case
        c.database.database_name = Uuid::new_v4().to_string();
        // Use random OS port
        c.application.port = 0;
        c
    };

    // Create and migrate the database
    configure_database(&configuration.database).await;

    // Launch the application as a background task
    let application = Application::build(configuration.clone())
        .await
        .expect("Failed to build application.");
    let application_port = application.port();
    let _ = rt::spawn(application.run_until_stopped());

    let test_app = TestApp {
        address: format!("http://localhost:{}", application_port),
        db_pool: get_connection_pool(&configuration.database),
        test_user: TestUser::generate(),
        api_client: Client::new(),
        jwt_secret: JwtSecret(configuration.authentication.jwt_secret.clone()),
    };
    test_app.test_user.store(&test_app.db_pool).await;
    test_app
}

/// Configures the database by creating it and running migrations.
/// # Arguments
/// * `config` - A reference to the `DatabaseSettings` containing the database configuration.
/// # Returns
/// A `PgPool` instance connected to the configured database.
pub async fn configure_database(config: &DatabaseSettings) -> PgPool {
    // Create database
    let maintenance_settings = DatabaseSettings {
        database_name: "postgres".to_string(),
        username: "postgres".to_string(),
        password: SecretString::new(Box::from("password")),
        ..config.clone()
    };

    let mut connection = PgConnection::connect_with(&maintenance_settings.connect_options())
        .await
        .expect("Failed to connect to Postgres");
    connection
        .execute(format!(r#"CREATE DATABASE "{}";"#, config.database_name).as_str())
        .await
        .expect("Failed to create database.");

    // Migrate database
    let connection_pool = PgPool::connect_with(config.connect_options())
        .await
        .expect("Failed to connect to Postgres.");
    sqlx::migrate!("./migrations")
        .run(&connection_pool)
        .await
        .expect("Failed to migrate the database");
    connection_pool
}
