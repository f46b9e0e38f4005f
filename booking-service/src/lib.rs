mod auth;
mod error;
mod mailer;
mod pdf;
mod service;

use std::sync::Arc;

use booking::BookingManager;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tokio::net::TcpListener;
use tokio::sync::mpsc;

pub use auth::AdminAuth;
pub use error::ApiError;
pub use mailer::{MailJob, Mailer};
pub use service::router;

/// Everything the handlers need, cloned per request.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<abi::Config>,
    pub manager: BookingManager,
    /// queue feeding the confirmation mail worker
    pub mail: mpsc::UnboundedSender<MailJob>,
}

/// Connect, migrate and serve until the listener dies.
pub async fn start_server(config: &abi::Config) -> Result<(), anyhow::Error> {
    let pool = PgPoolOptions::new()
        .max_connections(config.db.max_connections)
        .connect(&config.db.url)
        .await?;
    sqlx::migrate!("../migrations").run(&pool).await?;
    serve_with_pool(config, pool).await
}

/// Serve on an already connected pool. Split out so tests can inject the
/// database the pool tester prepared.
pub async fn serve_with_pool(config: &abi::Config, pool: PgPool) -> Result<(), anyhow::Error> {
    let (mail_tx, mail_rx) = mpsc::unbounded_channel();
    // the worker gets its own manager handle: a request scope may be gone by
    // the time its confirmation is sent
    let mailer = Mailer::new(
        config.mail.clone(),
        config.frontend_url.clone(),
        BookingManager::new(pool.clone()),
    );
    tokio::spawn(mailer.run(mail_rx));

    let state = AppState {
        config: Arc::new(config.clone()),
        manager: BookingManager::new(pool),
        mail: mail_tx,
    };

    let listener = TcpListener::bind(config.server.addr()).await?;
    tracing::info!(addr = %config.server.addr(), "booking service listening");
    axum::serve(listener, router(state)).await?;
    Ok(())
}
