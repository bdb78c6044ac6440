use hb_api::{AppState, api_prefix, create_router, shutdown_signal};
use hb_config::AppConfig;
use hb_storage::{HeartbeatStore, PresenceStore, RECORD_TTL, connect_pool};
use hb_telemetry::init_tracing;
use std::sync::Arc;
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 加载本地 .env（如存在），便于直接 cargo run 启动
    dotenvy::dotenv().ok();
    // 初始化结构化日志（需早于配置解析）
    init_tracing();
    // 从环境变量加载运行配置（解析失败回退默认值，不中断启动）
    let config = AppConfig::from_env();

    let storage = &config.storage;
    info!(
        target: "hb.api",
        pool_size = storage.pool_size,
        handle_timeout_ms = storage.handle_timeout.as_millis() as u64,
        record_ttl_secs = RECORD_TTL.as_secs(),
        ttl_registration_secs = storage.ttl.registration.as_secs(),
        ttl_live_secs = storage.ttl.live.as_secs(),
        ttl_delete_secs = storage.ttl.delete.as_secs(),
        shard_prefix = %storage.shard.prefix,
        "config_loaded"
    );

    // 缓存句柄连接池与在线状态存储
    let pool = connect_pool(storage).await;
    let store: Arc<dyn HeartbeatStore> = Arc::new(PresenceStore::new(pool));
    let app = create_router(AppState::new(store));

    let listener = tokio::net::TcpListener::bind(&config.http_addr)
        .await
        .inspect_err(|err| {
            error!(target: "hb.api", addr = %config.http_addr, error = %err, "listener_bind_failed");
        })?;
    info!(target: "hb.api", addr = %config.http_addr, prefix = %api_prefix(), "server_listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    info!(target: "hb.api", "server_stopped");
    Ok(())
}
