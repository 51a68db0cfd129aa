// --- Generador de Horarios sin topes - Archivo principal ---

use quickslot::{run_server, Config};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> std::io::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("quickslot=info,actix_web=info")),
        )
        .init();

    let config = match Config::from_env() {
        Ok(c) => c,
        Err(e) => {
            error!("{}", e);
            return Err(std::io::Error::new(std::io::ErrorKind::InvalidInput, e.to_string()));
        }
    };

    info!("=== Generador de Horarios (API) ===");
    info!("Iniciando servidor en http://{} ({} workers)", config.bind, config.workers);
    run_server(config).await
}
