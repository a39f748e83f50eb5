use anyhow::Context;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use sqlx::types::Json;
use uuid::Uuid;

use crate::domain::{Owner, Profile, ProfileFields, Social};
use crate::store::{ProfileStore, StoreError};

const HANDLE_CONSTRAINT: &str = "profiles_handle_key";

// Column list shared by every query that yields a profile row. Writes select
// NULL owner columns so they decode into the same row type as joined reads.
const PROFILE_COLUMNS: &str = r#"
    p.id, p.owner_id, p.handle, p.company, p.website, p.location, p.bio,
    p.status, p.github_username, p.skills, p.social, p.created_at
"#;

/// `ProfileStore` backed by the `profiles` table.
pub struct PostgresProfileStore {
    pool: PgPool,
}

impl PostgresProfileStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct ProfileRow {
    id: Uuid,
    owner_id: Uuid,
    handle: Option<String>,
    company: Option<String>,
    website: Option<String>,
    location: Option<String>,
    bio: Option<String>,
    status: Option<String>,
    github_username: Option<String>,
    skills: Option<Vec<String>>,
    social: Json<Social>,
    created_at: DateTime<Utc>,
    owner_name: Option<String>,
    owner_avatar: Option<String>,
}

impl From<ProfileRow> for Profile {
    fn from(row: ProfileRow) -> Self {
        Self {
            id: row.id,
            owner: Owner {
                id: row.owner_id,
                name: row.owner_name,
                avatar: row.owner_avatar,
            },
            handle: row.handle,
            company: row.company,
            website: row.website,
            location: row.location,
            bio: row.bio,
            status: row.status,
            github_username: row.github_username,
            skills: row.skills,
            social: row.social.0,
            date: row.created_at,
        }
    }
}

fn joined_select(filter: &str) -> String {
    format!(
        r#"
        SELECT {PROFILE_COLUMNS}, u.name AS owner_name, u.avatar AS owner_avatar
        FROM profiles p
        LEFT JOIN users u ON u.id = p.owner_id
        {filter}
        "#
    )
}

/// Translate a write failure, singling out collisions on the handle constraint.
fn write_error(e: sqlx::Error, context: &'static str) -> StoreError {
    if let sqlx::Error::Database(db_error) = &e {
        if db_error.is_unique_violation() && db_error.constraint() == Some(HANDLE_CONSTRAINT) {
            return StoreError::HandleTaken;
        }
    }
    StoreError::UnexpectedError(anyhow::Error::new(e).context(context))
}

#[async_trait]
impl ProfileStore for PostgresProfileStore {
    #[tracing::instrument(name = "Fetch profile by owner", skip(self))]
    async fn find_by_owner(&self, owner_id: Uuid) -> Result<Option<Profile>, StoreError> {
        let row = sqlx::query_as::<_, ProfileRow>(&joined_select("WHERE p.owner_id = $1"))
            .bind(owner_id)
            .fetch_optional(&self.pool)
            .await
            .context("Failed to fetch a profile by owner.")?;
        Ok(row.map(Profile::from))
    }

    #[tracing::instrument(name = "Fetch profile by handle", skip(self))]
    async fn find_by_handle(&self, handle: &str) -> Result<Option<Profile>, StoreError> {
        let row = sqlx::query_as::<_, ProfileRow>(&joined_select("WHERE p.handle = $1"))
            .bind(handle)
            .fetch_optional(&self.pool)
            .await
            .context("Failed to fetch a profile by handle.")?;
        Ok(row.map(Profile::from))
    }

    #[tracing::instrument(name = "List profiles", skip(self))]
    async fn list(&self) -> Result<Vec<Profile>, StoreError> {
        let rows = sqlx::query_as::<_, ProfileRow>(&joined_select("ORDER BY p.created_at, p.id"))
            .fetch_all(&self.pool)
            .await
            .context("Failed to list profiles.")?;
        Ok(rows.into_iter().map(Profile::from).collect())
    }

    #[tracing::instrument(name = "Insert new profile", skip(self, fields))]
    async fn create(
        &self,
        owner_id: Uuid,
        fields: &ProfileFields,
    ) -> Result<Option<Profile>, StoreError> {
        let query = format!(
            r#"
            INSERT INTO profiles AS p (
                id, owner_id, handle, company, website, location, bio,
                status, github_username, skills, social, created_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            ON CONFLICT (owner_id) DO NOTHING
            RETURNING {PROFILE_COLUMNS}, NULL::TEXT AS owner_name, NULL::TEXT AS owner_avatar
            "#
        );
        let row = sqlx::query_as::<_, ProfileRow>(&query)
            .bind(Uuid::new_v4())
            .bind(owner_id)
            .bind(&fields.handle)
            .bind(&fields.company)
            .bind(&fields.website)
            .bind(&fields.location)
            .bind(&fields.bio)
            .bind(&fields.status)
            .bind(&fields.github_username)
            .bind(&fields.skills)
            .bind(Json(&fields.social))
            .bind(Utc::now())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| write_error(e, "Failed to insert a new profile."))?;
        Ok(row.map(Profile::from))
    }

    #[tracing::instrument(name = "Update existing profile", skip(self, fields))]
    async fn update(
        &self,
        owner_id: Uuid,
        fields: &ProfileFields,
    ) -> Result<Option<Profile>, StoreError> {
        let query = format!(
            r#"
            UPDATE profiles AS p SET
                handle = COALESCE($2, p.handle),
                company = COALESCE($3, p.company),
                website = COALESCE($4, p.website),
                location = COALESCE($5, p.location),
                bio = COALESCE($6, p.bio),
                status = COALESCE($7, p.status),
                github_username = COALESCE($8, p.github_username),
                skills = COALESCE($9, p.skills),
                social = p.social || $10
            WHERE p.owner_id = $1
            RETURNING {PROFILE_COLUMNS}, NULL::TEXT AS owner_name, NULL::TEXT AS owner_avatar
            "#
        );
        let row = sqlx::query_as::<_, ProfileRow>(&query)
            .bind(owner_id)
            .bind(&fields.handle)
            .bind(&fields.company)
            .bind(&fields.website)
            .bind(&fields.location)
            .bind(&fields.bio)
            .bind(&fields.status)
            .bind(&fields.github_username)
            .bind(&fields.skills)
            .bind(Json(&fields.social))
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| write_error(e, "Failed to update an existing profile."))?;
        Ok(row.map(Profile::from))
    }
}
