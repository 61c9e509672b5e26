use std::path::PathBuf;
use std::sync::Arc;

use tokio::net::TcpListener;
use tokio::signal;
use tracing::info;

use kubedash::AppState;
use kubedash::clients::HttpFetcher;
use kubedash::clients::fixture::FallbackSource;
use kubedash::config::Config;
use kubedash::routes;
use kubedash::store::ResourceStore;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "kubedash=info,tower_http=info".into()),
        )
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let config_path = args
        .windows(2)
        .find_map(|w| match w[0].as_str() {
            "-config" | "--config" => Some(w[1].clone()),
            _ => None,
        })
        .or_else(|| args.first().filter(|a| !a.starts_with('-')).cloned())
        .unwrap_or_else(|| "/etc/kubedash/config.yaml".to_string());

    let cfg = Config::load(&PathBuf::from(&config_path)).unwrap_or_else(|e| {
        eprintln!("error loading config: {}", e);
        std::process::exit(1);
    });

    let fetcher = HttpFetcher::new(
        cfg.backend.base_url.clone(),
        cfg.backend_timeout(),
        FallbackSource::from_path(cfg.fallback_snapshot.clone()),
    )
    .unwrap_or_else(|e| {
        eprintln!("failed to create backend client: {}", e);
        std::process::exit(1);
    });
    info!("using resource backend {}", fetcher.base_url);

    let store = Arc::new(ResourceStore::new(Arc::new(fetcher), cfg.store_settings()));

    // Shutdown signal
    let (shutdown_tx, shutdown_rx) = tokio::sync::watch::channel(());

    // Initial cluster list and snapshot, then periodic refresh
    let store_clone = store.clone();
    let refresh_interval = cfg.refresh_interval();
    tokio::spawn(async move {
        store_clone.list_clusters().await;
        store_clone.refresh().await;
        store_clone
            .run_refresh_loop(refresh_interval, shutdown_rx)
            .await;
    });

    let router = routes::build_router(AppState { store });

    let listen_addr = cfg.listen_addr();
    let listener = TcpListener::bind(&listen_addr).await.unwrap_or_else(|e| {
        eprintln!("failed to bind {}: {}", listen_addr, e);
        std::process::exit(1);
    });

    info!("kubedash listening on {}", listen_addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(async move {
            shutdown_signal().await;
            let _ = shutdown_tx.send(());
        })
        .await
        .unwrap_or_else(|e| {
            eprintln!("server error: {}", e);
            std::process::exit(1);
        });
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c().await.expect("failed to listen for ctrl+c");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to listen for SIGTERM")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
