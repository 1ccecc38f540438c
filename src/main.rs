use std::{fs, path::Path, str::FromStr, sync::Arc};

use axum::{
    extract::State,
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use config::Config;
use error::ApiError;
use session::CurrentUser;
use sqlx::{
    sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous},
    SqlitePool,
};
use tera::Tera;
use time::{SystemTimeService, TimeService};
use tokio::{net::TcpListener, signal};
use tower::ServiceBuilder;
use tower_http::{services::ServeDir, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod config;
mod db;
mod error;
mod session;
#[cfg(test)]
mod testing;
mod time;
mod users;
mod views;
mod visits;

#[derive(Clone)]
pub struct ApiState<T: TimeService> {
    time: T,
    db: SqlitePool,
    views: Arc<Tera>,
    default_user_id: i64,
}

fn api<T: TimeService>(time: T, db: SqlitePool, config: &Config) -> Router {
    let views = Arc::new(views::load().expect("failed to parse templates"));

    Router::new()
        .route("/", get(home::<T>))
        .merge(users::routes::<T>())
        .merge(visits::routes::<T>())
        .fallback_service(ServeDir::new(&config.static_dir))
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()))
        .with_state(ApiState {
            time,
            db,
            views,
            default_user_id: config.default_user_id,
        })
}

async fn home<T: TimeService>(
    State(state): State<ApiState<T>>,
    current: Result<CurrentUser, ApiError>,
) -> Result<Response, ApiError> {
    let users = users::list_users(&state.db).await?;

    let user = match current {
        Ok(CurrentUser(user)) => user,
        // Nobody to select yet on a fresh database.
        Err(ApiError::UserNotFound) if users.is_empty() => {
            return views::new_user(&state.views)
                .map(IntoResponse::into_response)
                .map_err(ApiError::from);
        }
        Err(error) => return Err(error),
    };

    let countries = visits::list_visited(&state.db, user.id).await?;

    views::index(&state.views, &user, &users, &countries)
        .map(IntoResponse::into_response)
        .map_err(ApiError::from)
}

#[tokio::main]
async fn main() {
    // Read before tracing starts so `.env` can carry RUST_LOG too.
    let env_file = config::load_env_file(Path::new(".env"));

    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!("{}=info,tower_http=info", env!("CARGO_CRATE_NAME")).into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    match env_file {
        Ok(true) => info!("Loaded environment from .env"),
        Ok(false) => {}
        Err(e) => warn!("Failed to read .env: {e}"),
    }

    let config = Config::load();

    let db_options = SqliteConnectOptions::from_str(&config.database_url)
        .unwrap_or_else(|_| panic!("bad connection string: {}", config.database_url))
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .synchronous(SqliteSynchronous::Normal);

    let db = SqlitePoolOptions::new()
        .connect_with(db_options)
        .await
        .expect("failed to open SQLite database");

    db::init(&db).await.expect("failed to initialize database");

    if let Some(path) = &config.countries_file {
        let contents = fs::read_to_string(path)
            .unwrap_or_else(|e| panic!("failed to read {}: {e}", path.display()));
        let inserted = db::seed_countries(&db, &contents)
            .await
            .expect("failed to seed reference countries");
        info!(inserted, file = %path.display(), "Seeded reference countries");
    }

    let listener = TcpListener::bind(config.listen_addr)
        .await
        .unwrap_or_else(|e| panic!("failed to bind {}: {e}", config.listen_addr));
    info!("Server running on http://{}", config.listen_addr);

    axum::serve(listener, api(SystemTimeService {}, db, &config))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("server error");

    info!("Server shut down");
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");

        info!("Received Ctrl+C, shutting down");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;

        info!("Received terminate signal, shutting down");
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
