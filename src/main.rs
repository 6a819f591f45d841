use clap::Parser;
use postgate::cli::{
    Args, build_config, init_logging, load_jwt_secret, open_database, shutdown_signal,
};
use postgate::{init_cleanup, run_server};
use tracing::{error, info};

#[tokio::main]
async fn main() {
    let args = Args::parse();

    init_logging(&args.log_format);

    let Some(jwt_secret) = load_jwt_secret(args.jwt_secret_file.as_deref()) else {
        std::process::exit(1);
    };

    let Some(db) = open_database(&args.database).await else {
        std::process::exit(1);
    };

    let addr = format!("0.0.0.0:{}", args.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .unwrap_or_else(|e| {
            error!(address = %addr, error = %e, "Failed to bind");
            std::process::exit(1);
        });

    let config = build_config(db, jwt_secret, args.session_ttl, args.bcrypt_cost);
    let cleanup = init_cleanup(&config).await;

    match listener.local_addr() {
        Ok(local_addr) => info!(address = %local_addr, "Listening"),
        Err(_) => info!(address = %addr, "Listening"),
    }

    let result = run_server(&config, listener, shutdown_signal()).await;
    cleanup.stop().await;

    if let Err(e) = result {
        error!(error = %e, "Server error");
        std::process::exit(1);
    }

    info!("Server stopped");
}
