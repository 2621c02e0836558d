use axum::{extract::DefaultBodyLimit, http::Method, Router};
use crm_functions::{
    router, AppState, Config, MemoryStore, MysqlStore, Notifier, StartupError, Store, StoreKind,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), StartupError> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("crm_functions=info,tower_http=info")),
        )
        .init();
    let setting = Config::read()?;
    let notifier = Notifier::new(setting.notify_url().map(str::to_owned));
    match setting.store() {
        StoreKind::Mysql => {
            let url = setting
                .database_url()
                .ok_or(crm_functions::ConfigError::Missing(Config::DATABASE_URL))?;
            let store = MysqlStore::connect(url, setting.service_key())?;
            store.create_table()?;
            tracing::info!("connected to mysql, tables ready");
            serve(&setting, AppState::new(store, notifier)).await
        }
        StoreKind::Memory => {
            tracing::warn!("using in-memory store, data is lost on exit");
            serve(&setting, AppState::new(MemoryStore::new(), notifier)).await
        }
    }
}

async fn serve<S: Store>(setting: &Config, state: AppState<S>) -> Result<(), StartupError> {
    let app: Router = router(state)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods([Method::POST, Method::OPTIONS])
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
        .layer(DefaultBodyLimit::max(2 * 1024 * 1024));
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", setting.port())).await?;
    tracing::info!("listening on {}", listener.local_addr()?);
    axum::serve(listener, app).await?;
    Ok(())
}
