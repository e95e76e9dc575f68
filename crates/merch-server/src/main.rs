mod api;
mod middleware;

use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use crate::{
    api::{build_app, AppState},
    middleware::AuthState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // load_app_config pulls in .env before reading the environment
    let config = merch_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let pool_config = merch_db::PoolConfig::from_app_config(&config);
    let pool = merch_db::connect_pool(&config.database_url, pool_config).await?;
    merch_db::run_migrations(&pool).await?;

    let razorpay = merch_razorpay::RazorpayClient::new(
        &config.razorpay_key_id,
        &config.razorpay_key_secret,
        config.upstream_timeout_secs,
    )?;
    let shiprocket = merch_shiprocket::ShiprocketClient::new(
        &config.shiprocket_email,
        &config.shiprocket_password,
        config.upstream_timeout_secs,
    )?;

    let auth = AuthState::new(pool.clone(), &config.jwt_secret);
    let app = build_app(
        AppState {
            pool,
            razorpay: Arc::new(razorpay),
            shiprocket: Arc::new(shiprocket),
        },
        auth,
    );

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    tracing::info!(addr = %config.bind_addr, env = %config.env, "listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to listen for ctrl-c");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("received shutdown signal, starting graceful shutdown");
}
