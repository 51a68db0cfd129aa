// Biblioteca raíz del crate `quickslot`.
// Reexporta el motor de horarios y el servidor HTTP que lo expone.
pub mod algorithm;
pub mod api_json;
pub mod config;
pub mod error;
pub mod models;
pub mod server;
pub mod server_handlers;

pub use algorithm::{generar_horarios, generar_lote, OpcionesGeneracion, ResultadoGeneracion};
pub use api_json::SolicitudHorario;
pub use config::Config;
pub use error::{HorarioError, Result};

/// Ejecuta el servidor HTTP (reexport para facilitar uso desde `main`)
pub use server::run_server;
