use std::error::Error;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tracing_subscriber::EnvFilter;

use shop_api::{
    auth::{
        AuthService, MemorySessionStore, PasswordHasher, PgUserRepository, RedisSessionStore,
        SessionManager, SessionStore,
    },
    categories::{CategoryRepository, PgCategoryRepository},
    config::{Config, SessionBackend},
    create_router, db,
    products::{PgProductRepository, ProductService},
    AppState,
};

/// Delay between startup attempts while a dependency is unavailable
const RETRY_DELAY: Duration = Duration::from_millis(700);

/// How often the in-process session store drops expired entries
const SESSION_PURGE_INTERVAL: Duration = Duration::from_secs(60);

#[tokio::main]
async fn main() {
    // Load environment variables from .env file
    dotenv::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .with_level(true)
        .init();

    tracing::info!("Shop API - Starting...");

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Invalid configuration: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = run(config).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}

async fn run(config: Config) -> Result<(), Box<dyn Error>> {
    let database_url = &config.database_url;
    let pool = retry("Database setup", || async move {
        let pool = db::create_pool(database_url).await?;
        db::run_migrations(&pool).await?;
        Ok::<_, Box<dyn Error + Send + Sync>>(pool)
    })
    .await;

    let store: Arc<dyn SessionStore> = match config.session.backend {
        SessionBackend::Redis => {
            let url = &config.session.redis_url;
            let ttl = config.session.ttl;
            Arc::new(retry("Session store connection", || RedisSessionStore::connect(url, ttl)).await)
        }
        SessionBackend::Memory => {
            tracing::warn!("Using in-process session store; sessions are lost on restart");
            let store = Arc::new(MemorySessionStore::new(config.session.ttl));
            let purger = store.clone();
            tokio::spawn(async move {
                let mut interval = tokio::time::interval(SESSION_PURGE_INTERVAL);
                loop {
                    interval.tick().await;
                    let purged = purger.purge_expired().await;
                    if purged > 0 {
                        tracing::debug!("Purged {} expired sessions", purged);
                    }
                }
            });
            store
        }
    };

    let auth = AuthService::new(
        Arc::new(PgUserRepository::new(pool.clone())),
        PasswordHasher::new(&config.password_secret)?,
    );
    if let Some(admin) = &config.admin {
        auth.ensure_admin(admin).await?;
    }

    let categories: Arc<dyn CategoryRepository> =
        Arc::new(PgCategoryRepository::new(pool.clone()));
    let products = ProductService::new(
        Arc::new(PgProductRepository::new(pool.clone())),
        categories.clone(),
    );

    let state = AppState {
        auth,
        sessions: SessionManager::new(store, &config.session)?,
        categories,
        products,
    };
    let app = create_router(state);

    let addr = config.bind_address();
    tracing::info!("Starting server on {}", addr);
    let listener = retry("Listener bind", || tokio::net::TcpListener::bind(addr.clone())).await;

    tracing::info!("Shop API is running on http://{}", addr);
    tracing::info!("Swagger UI available at http://{}/swagger-ui", addr);

    axum::serve(listener, app).await?;
    Ok(())
}

/// Runs `attempt` until it succeeds, logging each failure
async fn retry<T, E, F, Fut>(what: &str, mut attempt: F) -> T
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: std::fmt::Display,
{
    loop {
        match attempt().await {
            Ok(value) => return value,
            Err(e) => {
                tracing::error!(
                    "{} failed: {}. Retrying in {}ms",
                    what,
                    e,
                    RETRY_DELAY.as_millis()
                );
                tokio::time::sleep(RETRY_DELAY).await;
            }
        }
    }
}
