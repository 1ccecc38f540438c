use axum::{extract::State, response::Redirect, routing::post, Form, Router};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use sqlx::SqlitePool;
use tracing::{debug, info};

use crate::{db::Country, error::ApiError, session::CurrentUser, time::TimeService, ApiState};

#[derive(Deserialize)]
struct AddVisitRequest {
    #[serde(default)]
    country: String,
}

pub fn routes<T: TimeService>() -> Router<ApiState<T>> {
    Router::new().route("/add", post(add_visit::<T>))
}

/// Country codes the user has visited, oldest first.
pub async fn list_visited(db: &SqlitePool, user_id: i64) -> Result<Vec<String>, sqlx::Error> {
    sqlx::query_scalar(
        r#"SELECT country_code FROM visited_countries WHERE user_id = ? ORDER BY id"#,
    )
    .bind(user_id)
    .fetch_all(db)
    .await
}

/// Resolves lower-cased free text to a reference country by substring match.
///
/// When several names contain `needle`, an exact name match wins, otherwise
/// the alphabetically first name. The needle is matched literally.
pub async fn find_country(db: &SqlitePool, needle: &str) -> Result<Option<Country>, sqlx::Error> {
    sqlx::query_as::<_, Country>(
        r#"
SELECT country_code, country_name FROM various_countries
WHERE instr(LOWER(country_name), ?) > 0
ORDER BY LOWER(country_name) = ? DESC, country_name
LIMIT 1"#,
    )
    .bind(needle)
    .bind(needle)
    .fetch_optional(db)
    .await
}

/// Returns `false` when the user had already visited the country.
pub async fn record_visit(
    db: &SqlitePool,
    user_id: i64,
    country_code: &str,
    visited_at: DateTime<Utc>,
) -> Result<bool, sqlx::Error> {
    let rows = sqlx::query(
        r#"
INSERT INTO visited_countries (user_id, country_code, visited_at) VALUES (?, ?, ?)
ON CONFLICT (user_id, country_code) DO NOTHING"#,
    )
    .bind(user_id)
    .bind(country_code)
    .bind(visited_at)
    .execute(db)
    .await?
    .rows_affected();

    Ok(rows == 1)
}

fn normalize(input: &str) -> Option<String> {
    let needle = input.trim().to_lowercase();
    (!needle.is_empty()).then_some(needle)
}

async fn add_visit<T: TimeService>(
    State(state): State<ApiState<T>>,
    CurrentUser(user): CurrentUser,
    Form(request): Form<AddVisitRequest>,
) -> Result<Redirect, ApiError> {
    let needle =
        normalize(&request.country).ok_or(ApiError::InvalidInput("country must not be empty"))?;

    let country = find_country(&state.db, &needle).await?.ok_or_else(|| {
        debug!(input = needle, "no country matched");
        ApiError::CountryNotFound
    })?;

    if record_visit(&state.db, user.id, &country.country_code, state.time.now()).await? {
        info!(
            user_id = user.id,
            code = country.country_code,
            name = country.country_name,
            "recorded visit"
        );
    } else {
        debug!(user_id = user.id, code = country.country_code, "already visited");
    }

    Ok(Redirect::to("/"))
}
