//src/main.rs

use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

use vitrine::config::{AppState, Config};

#[tokio::main]
async fn main() {
    // RUST_LOG manda; sem ele, "info".
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .compact()
        .init();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("🔥 Configuração inválida: {:#}", e);
            std::process::exit(1);
        }
    };
    let bind_addr = config.bind_addr.clone();

    // Se o banco não responder, a aplicação não deve iniciar.
    let app_state = match AppState::new(config).await {
        Ok(state) => state,
        Err(e) => {
            tracing::error!("🔥 Falha ao inicializar o estado da aplicação: {:#}", e);
            std::process::exit(1);
        }
    };

    let app = vitrine::app(app_state);

    let listener = match TcpListener::bind(&bind_addr).await {
        Ok(listener) => listener,
        Err(e) => {
            tracing::error!("🔥 Falha ao iniciar o listener TCP em {}: {}", bind_addr, e);
            std::process::exit(1);
        }
    };
    tracing::info!("🚀 Servidor escutando em {}", bind_addr);
    tracing::info!("📚 Documentação em http://{}/swagger-ui", bind_addr);

    if let Err(e) = axum::serve(listener, app).await {
        tracing::error!("🔥 Erro no servidor Axum: {}", e);
    }
}
