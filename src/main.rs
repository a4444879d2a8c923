use std::{io::BufRead, sync::Arc, time::Duration};

mod app;
mod auth;
mod config;
mod db;
mod session;
mod state;
mod users;
mod views;

use crate::{config::AppConfig, session::SessionStore, state::AppState};

const SESSION_SWEEP_INTERVAL: Duration = Duration::from_secs(60);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let env_filter = std::env::var("RUST_LOG")
        .unwrap_or_else(|_| "bookshelf=debug,axum=info,tower_http=info".to_string());
    let json_logs = std::env::var("LOG_FORMAT")
        .map(|v| v == "json")
        .unwrap_or(false);

    if json_logs {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(false)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(env_filter).init();
    }

    // `bookshelf hash-password` reads a password from stdin and prints the
    // argon2 hash to store in `users.password`.
    if std::env::args().nth(1).as_deref() == Some("hash-password") {
        return print_password_hash();
    }

    let config = AppConfig::from_env()?;
    let pool = db::connect(&config.db).await?;

    if let Err(e) = db::migrate(&pool).await {
        tracing::warn!(error = %e, "migration failed; continuing");
    }

    let app_state = AppState::init(&config, pool)?;
    spawn_session_sweeper(app_state.sessions.clone());

    app::serve(app::build_app(app_state), &config.server).await
}

fn print_password_hash() -> anyhow::Result<()> {
    let mut line = String::new();
    std::io::stdin().lock().read_line(&mut line)?;
    let plain = line.trim_end_matches(['\r', '\n']);
    anyhow::ensure!(!plain.is_empty(), "empty password on stdin");
    println!("{}", auth::password::hash_password(plain)?);
    Ok(())
}

fn spawn_session_sweeper(sessions: Arc<SessionStore>) {
    tokio::spawn(async move {
        let mut tick = tokio::time::interval(SESSION_SWEEP_INTERVAL);
        loop {
            tick.tick().await;
            sessions.cleanup();
            tracing::debug!(live = sessions.len(), "session sweep");
        }
    });
}
