use actix_cors::Cors;
use actix_web::{web, App, HttpServer};

use crate::config::Config;
use crate::server_handlers::{elegibles_handler, health_handler, help_handler, solve_handler, solve_lote_handler};

/// Registra las rutas de la API. Compartido por el servidor y los tests.
pub fn configurar_rutas(cfg: &mut web::ServiceConfig) {
    cfg.route("/solve", web::post().to(solve_handler))
        .route("/solve/lote", web::post().to(solve_lote_handler))
        .route("/elegibles", web::post().to(elegibles_handler))
        .route("/help", web::get().to(help_handler))
        .route("/health", web::get().to(health_handler));
}

pub async fn run_server(config: Config) -> std::io::Result<()> {
    let bind = config.bind.clone();
    let workers = config.workers;
    let data = web::Data::new(config);
    HttpServer::new(move || {
        App::new()
            .wrap(Cors::permissive())
            .app_data(data.clone())
            .configure(configurar_rutas)
    })
    .workers(workers)
    .bind(bind)?
    .run()
    .await
}
