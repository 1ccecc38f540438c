use axum::{
    extract::State,
    response::{IntoResponse, Redirect, Response},
    routing::post,
    Form, Router,
};
use axum_extra::extract::cookie::CookieJar;
use serde::Deserialize;
use sqlx::SqlitePool;
use tracing::info;

use crate::{db::User, error::ApiError, session, time::TimeService, views, ApiState};

const DEFAULT_COLOR: &str = views::COLORS[0];

#[derive(Deserialize)]
struct SelectUserRequest {
    add: Option<String>,
    user: Option<String>,
}

#[derive(Deserialize)]
struct NewUserRequest {
    #[serde(default)]
    name: String,
    #[serde(default)]
    color: String,
}

pub fn routes<T: TimeService>() -> Router<ApiState<T>> {
    Router::new()
        .route("/user", post(select_user::<T>))
        .route("/new", post(create_user::<T>))
}

pub async fn find_user(db: &SqlitePool, id: i64) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>(r#"SELECT id, name, color, created_at FROM users WHERE id = ?"#)
        .bind(id)
        .fetch_optional(db)
        .await
}

pub async fn list_users(db: &SqlitePool) -> Result<Vec<User>, sqlx::Error> {
    sqlx::query_as::<_, User>(r#"SELECT id, name, color, created_at FROM users ORDER BY id"#)
        .fetch_all(db)
        .await
}

async fn select_user<T: TimeService>(
    State(state): State<ApiState<T>>,
    jar: CookieJar,
    Form(request): Form<SelectUserRequest>,
) -> Result<Response, ApiError> {
    if request.add.as_deref() == Some("new") {
        return Ok(views::new_user(&state.views)?.into_response());
    }

    let id = request
        .user
        .as_deref()
        .and_then(|value| value.trim().parse::<i64>().ok())
        .ok_or(ApiError::InvalidInput("user must be a numeric id"))?;

    let user = find_user(&state.db, id)
        .await?
        .ok_or(ApiError::UserNotFound)?;

    info!(user_id = user.id, "switched current user");

    Ok((session::select(jar, user.id), Redirect::to("/")).into_response())
}

async fn create_user<T: TimeService>(
    State(state): State<ApiState<T>>,
    jar: CookieJar,
    Form(request): Form<NewUserRequest>,
) -> Result<(CookieJar, Redirect), ApiError> {
    let name = request.name.trim();
    if name.is_empty() {
        return Err(ApiError::InvalidInput("name must not be empty"));
    }

    // Colours end up inside a `style` attribute, so only palette names pass.
    let color = match request.color.trim() {
        "" => DEFAULT_COLOR,
        color => views::COLORS
            .into_iter()
            .find(|known| known.eq_ignore_ascii_case(color))
            .ok_or(ApiError::InvalidInput("color must be one of the offered colours"))?,
    };

    let id = sqlx::query(r#"INSERT INTO users (name, color, created_at) VALUES (?, ?, ?)"#)
        .bind(name)
        .bind(color)
        .bind(state.time.now())
        .execute(&state.db)
        .await?
        .last_insert_rowid();

    info!(user_id = id, name, "created user");

    Ok((session::select(jar, id), Redirect::to("/")))
}
