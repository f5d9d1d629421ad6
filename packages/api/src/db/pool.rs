use std::time::Duration;

use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tokio::sync::OnceCell;
use tracing::warn;

static POOL: OnceCell<PgPool> = OnceCell::const_new();

const CONNECT_ATTEMPTS: u32 = 5;
const CONNECT_BASE_DELAY: Duration = Duration::from_millis(1000);

/// Initialise the connection pool, retrying the handshake with exponential
/// backoff. The launcher calls this once at startup so that a missing or
/// unreachable database fails the process instead of the first request.
pub async fn init_pool() -> Result<&'static PgPool, sqlx::Error> {
    POOL.get_or_try_init(connect).await
}

/// Get the already-initialised pool, connecting lazily if the launcher has
/// not run (tests, tooling).
pub async fn get_pool() -> Result<&'static PgPool, sqlx::Error> {
    POOL.get_or_try_init(connect).await
}

async fn connect() -> Result<PgPool, sqlx::Error> {
    dotenvy::dotenv().ok();

    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");

    let mut attempt = 0;
    loop {
        match PgPoolOptions::new()
            .max_connections(5)
            .connect(&database_url)
            .await
        {
            Ok(pool) => return Ok(pool),
            Err(err) if attempt + 1 < CONNECT_ATTEMPTS => {
                let delay = CONNECT_BASE_DELAY * 2u32.pow(attempt);
                warn!(
                    %err,
                    attempt = attempt + 1,
                    ?delay,
                    "database connection failed, retrying"
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
            Err(err) => return Err(err),
        }
    }
}
