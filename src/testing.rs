use axum::{
    body::Body,
    http::{header, Request},
    response::Response,
};
use axum_extra::extract::cookie::Cookie;
use chrono::Utc;
use http_body_util::BodyExt;
use sqlx::{sqlite::SqlitePoolOptions, SqlitePool};

use crate::{config::Config, db, session};

pub async fn database() -> SqlitePool {
    // Every connection to `sqlite::memory:` opens its own database.
    let db = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .unwrap();
    db::init(&db).await.unwrap();
    db
}

pub fn config() -> Config {
    Config {
        database_url: "sqlite::memory:".into(),
        listen_addr: "127.0.0.1:3000".parse().unwrap(),
        default_user_id: 1,
        static_dir: "public".into(),
        countries_file: None,
    }
}

pub async fn insert_user(db: &SqlitePool, name: &str, color: &str) -> i64 {
    sqlx::query(r#"INSERT INTO users (name, color, created_at) VALUES (?, ?, ?)"#)
        .bind(name)
        .bind(color)
        .bind(Utc::now())
        .execute(db)
        .await
        .unwrap()
        .last_insert_rowid()
}

pub async fn insert_country(db: &SqlitePool, code: &str, name: &str) {
    sqlx::query(r#"INSERT INTO various_countries (country_code, country_name) VALUES (?, ?)"#)
        .bind(code)
        .bind(name)
        .execute(db)
        .await
        .unwrap();
}

pub fn form_post(uri: &str, user_id: Option<i64>, body: &str) -> Request<Body> {
    let mut request = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");

    if let Some(id) = user_id {
        request = request.header(header::COOKIE, format!("{}={id}", session::COOKIE_NAME));
    }

    request.body(Body::from(body.to_string())).unwrap()
}

/// User id carried by the response's `Set-Cookie` header, if any.
pub fn session_cookie(response: &Response) -> Option<i64> {
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|value| Cookie::parse(value.to_str().ok()?).ok())
        .find(|cookie| cookie.name() == session::COOKIE_NAME)
        .and_then(|cookie| cookie.value().parse().ok())
}

pub async fn body_string(response: Response) -> String {
    String::from_utf8(
        response
            .into_body()
            .collect()
            .await
            .unwrap()
            .to_bytes()
            .to_vec(),
    )
    .unwrap()
}
