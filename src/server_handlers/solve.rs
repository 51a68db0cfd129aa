use std::collections::BTreeMap;
use std::sync::{Arc, OnceLock};

use actix_web::{web, HttpRequest, HttpResponse, Responder};
use chrono::{DateTime, Utc};
use futures_util::future::join_all;
use serde::Serialize;
use serde_json::json;
use tokio::sync::Semaphore;
use tracing::{info, warn};

use crate::algorithm::elegibilidad::{creditos_acumulados, resolver_elegibles, validar_catalogo, GrafoElegibilidad};
use crate::algorithm::generador::{generar_horarios, ResultadoGeneracion};
use crate::api_json::SolicitudHorario;
use crate::config::Config;
use crate::error::{GenerationLimitExceeded, HorarioError, OccupancyDataError};
use crate::models::Combinacion;

#[derive(Serialize)]
struct SolveResponse {
    status: &'static str,
    generado_en: DateTime<Utc>,
    creditos_acumulados: u32,
    elegibles: BTreeMap<u32, Vec<String>>,
    combinaciones_count: usize,
    combinaciones: Vec<Combinacion>,
    descartados: Vec<OccupancyDataError>,
    advertencia: Option<GenerationLimitExceeded>,
}

impl SolveResponse {
    fn desde(r: ResultadoGeneracion) -> Self {
        SolveResponse {
            status: if r.sin_soluciones() { "sin_soluciones" } else { "ok" },
            generado_en: Utc::now(),
            creditos_acumulados: r.creditos_acumulados,
            elegibles: r.elegibles,
            combinaciones_count: r.combinaciones.len(),
            combinaciones: r.combinaciones,
            descartados: r.descartados,
            advertencia: r.advertencia,
        }
    }
}

#[derive(Serialize)]
struct CursoElegible {
    sigla: String,
    nombre: String,
    creditos: u32,
    electivo: bool,
    prerequisitos: Vec<String>,
    /// Ramos del catálogo que tienen a este como prerequisito.
    desbloquea: Vec<String>,
}

fn semaforo() -> Arc<Semaphore> {
    static GLOBAL_SEM: OnceLock<Arc<Semaphore>> = OnceLock::new();
    GLOBAL_SEM
        .get_or_init(|| Arc::new(Semaphore::new(std::cmp::max(1, num_cpus::get()))))
        .clone()
}

/// Parsea y resuelve nombres igual para todas las rutas.
fn leer_solicitud(valor: &serde_json::Value) -> Result<SolicitudHorario, HttpResponse> {
    let json_str = serde_json::to_string(valor).map_err(|e| {
        HttpResponse::BadRequest().json(json!({"status": "error", "error": format!("invalid JSON body: {}", e)}))
    })?;
    crate::api_json::parse_and_resolve_ramos(&json_str).map_err(|e| {
        HttpResponse::BadRequest().json(json!({"status": "error", "error": format!("failed to parse input: {}", e)}))
    })
}

fn error_de_motor(e: &HorarioError) -> HttpResponse {
    HttpResponse::UnprocessableEntity().json(json!({"status": "error", "error": e.to_string()}))
}

/// Corre una generación en el pool bloqueante, con a lo más `num_cpus` a la vez.
async fn generar_en_pool(
    solicitud: SolicitudHorario,
    config: &Config,
) -> Result<Result<ResultadoGeneracion, HorarioError>, HttpResponse> {
    let permit = semaforo().acquire_owned().await.map_err(|_| {
        HttpResponse::InternalServerError().json(json!({"error": "failed to acquire semaphore"}))
    })?;
    let opciones = config.opciones_generacion();
    let handle = tokio::task::spawn_blocking(move || {
        let _permit = permit;
        generar_horarios(&solicitud, &opciones)
    });
    handle.await.map_err(|e| {
        HttpResponse::InternalServerError().json(json!({"error": format!("task join error: {}", e)}))
    })
}

pub async fn solve_handler(
    req: HttpRequest,
    config: web::Data<Config>,
    body: web::Json<serde_json::Value>,
) -> impl Responder {
    let solicitud = match leer_solicitud(&body.into_inner()) {
        Ok(s) => s,
        Err(resp) => return resp,
    };

    let client_ip = req.connection_info().realip_remote_addr().unwrap_or("unknown").to_string();
    let start = std::time::Instant::now();

    let resultado = match generar_en_pool(solicitud, &config).await {
        Ok(r) => r,
        Err(resp) => return resp,
    };

    match resultado {
        Ok(r) => {
            info!(
                "[solve] {} -> {} combinaciones en {} ms",
                client_ip,
                r.combinaciones.len(),
                start.elapsed().as_millis()
            );
            if let Some(a) = &r.advertencia {
                warn!("[solve] {}: {}", client_ip, a);
            }
            HttpResponse::Ok().json(SolveResponse::desde(r))
        }
        Err(e) => {
            warn!("[solve] {} -> {}", client_ip, e);
            error_de_motor(&e)
        }
    }
}

/// POST /solve/lote: arreglo de solicitudes independientes, una respuesta por elemento.
pub async fn solve_lote_handler(config: web::Data<Config>, body: web::Json<serde_json::Value>) -> impl Responder {
    let valores = match body.into_inner() {
        serde_json::Value::Array(v) => v,
        _ => {
            return HttpResponse::BadRequest()
                .json(json!({"status": "error", "error": "se esperaba un arreglo de solicitudes"}));
        }
    };

    let mut solicitudes = Vec::with_capacity(valores.len());
    for (i, v) in valores.iter().enumerate() {
        match leer_solicitud(v) {
            Ok(s) => solicitudes.push(s),
            Err(_) => {
                return HttpResponse::BadRequest()
                    .json(json!({"status": "error", "error": format!("solicitud {} inválida", i)}));
            }
        }
    }

    let start = std::time::Instant::now();
    let total = solicitudes.len();
    let tareas = solicitudes.into_iter().map(|s| generar_en_pool(s, &config));
    let mut resultados: Vec<serde_json::Value> = Vec::with_capacity(total);
    for r in join_all(tareas).await {
        let valor = match r {
            Ok(Ok(res)) => serde_json::to_value(SolveResponse::desde(res)),
            Ok(Err(e)) => Ok(json!({"status": "error", "error": e.to_string()})),
            Err(_) => Ok(json!({"status": "error", "error": "task join error"})),
        };
        match valor {
            Ok(v) => resultados.push(v),
            Err(e) => {
                return HttpResponse::InternalServerError().json(json!({"error": format!("serialize: {}", e)}));
            }
        }
    }
    info!("[solve/lote] {} solicitudes en {} ms", total, start.elapsed().as_millis());

    HttpResponse::Ok().json(json!({"total": total, "resultados": resultados}))
}

/// POST /elegibles: solo la etapa de elegibilidad.
pub async fn elegibles_handler(body: web::Json<serde_json::Value>) -> impl Responder {
    let solicitud = match leer_solicitud(&body.into_inner()) {
        Ok(s) => s,
        Err(resp) => return resp,
    };
    let aprobados = &solicitud.estudiante.aprobados;
    let creditos = creditos_acumulados(&solicitud.catalogo, aprobados);
    let elegibles = match resolver_elegibles(&solicitud.catalogo, aprobados, creditos) {
        Ok(e) => e,
        Err(e) => return error_de_motor(&HorarioError::from(e)),
    };

    let grafo = GrafoElegibilidad::construir(&solicitud.catalogo);
    let mut total = 0usize;
    let cursos: BTreeMap<u32, Vec<CursoElegible>> = elegibles
        .into_iter()
        .map(|(sem, ramos)| {
            total += ramos.len();
            let cursos = ramos
                .into_iter()
                .map(|r| CursoElegible {
                    prerequisitos: grafo.prerequisitos_de(&r.sigla),
                    desbloquea: grafo.desbloqueados_por(&r.sigla),
                    creditos: r.creditos(),
                    electivo: r.electivo,
                    sigla: r.sigla,
                    nombre: r.nombre,
                })
                .collect();
            (sem, cursos)
        })
        .collect();

    // problemas en ramos que no bloquearon la solicitud (aprobados o inactivos)
    let diagnosticos: Vec<String> = validar_catalogo(&solicitud.catalogo).iter().map(|e| e.to_string()).collect();

    HttpResponse::Ok().json(json!({
        "status": "ok",
        "creditos_acumulados": creditos,
        "total_elegibles": total,
        "dependencias": grafo.aristas(),
        "elegibles": cursos,
        "diagnosticos": diagnosticos
    }))
}
