// generador.rs - Punto de entrada único del motor de horarios.
//
// Pipeline:
// PHASE 1: elegibilidad
//   - créditos acumulados a partir de los ramos aprobados
//   - semestre -> ramos desbloqueados (prerequisitos en conjunción)
// PHASE 2: pool de candidatos
//   - fuera los excluidos por el estudiante, secciones colapsadas por sigla
// PHASE 3: modelo de ocupación
//   - huella (día, bloque) por candidato; los datos inválidos se descartan con aviso
// PHASE 4: enumeración + ranking
//   - conjuntos sin topes maximales, perezoso y acotado
//   - orden por cantidad de ramos y tope final
use std::collections::{BTreeMap, BTreeSet};
use std::time::{Duration, Instant};

use serde::Serialize;
use tracing::{info, info_span, warn};

use crate::algorithm::candidatos::construir_pool;
use crate::algorithm::clique::{Enumerador, LimitesBusqueda, Seleccion, TokenCancelacion};
use crate::algorithm::elegibilidad::{creditos_acumulados, resolver_elegibles};
use crate::algorithm::ocupacion::{CandidatoOcupado, ModeloOcupacion};
use crate::algorithm::ranking::{rankear, MAX_COMBINACIONES};
use crate::api_json::SolicitudHorario;
use crate::error::{GenerationLimitExceeded, HorarioError, OccupancyDataError};
use crate::models::{Combinacion, RamoAsignado};

/// Límites de una ejecución. `plazo` es relativo al inicio de la búsqueda.
#[derive(Debug, Clone)]
pub struct OpcionesGeneracion {
    pub max_combinaciones: usize,
    /// Tope duro de combinaciones que produce el enumerador antes del ranking.
    pub limite_generacion: usize,
    pub max_pasos: Option<u64>,
    pub plazo: Option<Duration>,
    pub cancelacion: Option<TokenCancelacion>,
}

impl Default for OpcionesGeneracion {
    fn default() -> Self {
        OpcionesGeneracion {
            max_combinaciones: MAX_COMBINACIONES,
            limite_generacion: 2000,
            max_pasos: Some(5_000_000),
            plazo: None,
            cancelacion: None,
        }
    }
}

impl OpcionesGeneracion {
    fn limites(&self, tope: usize) -> LimitesBusqueda {
        LimitesBusqueda {
            max_generadas: self.limite_generacion.max(tope),
            max_pasos: self.max_pasos,
            plazo: self.plazo.map(|d| Instant::now() + d),
            cancelacion: self.cancelacion.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ResultadoGeneracion {
    pub creditos_acumulados: u32,
    /// Semestre -> siglas elegibles (antes de exclusiones).
    pub elegibles: BTreeMap<u32, Vec<String>>,
    pub combinaciones: Vec<Combinacion>,
    /// Candidatos sacados de la búsqueda por datos de horario inválidos.
    pub descartados: Vec<OccupancyDataError>,
    /// Presente si la búsqueda se cortó antes de terminar: la lista puede estar incompleta.
    pub advertencia: Option<GenerationLimitExceeded>,
}

impl ResultadoGeneracion {
    /// Ninguna combinación contiene ramos: el cliente debe mostrar "sin horarios válidos".
    pub fn sin_soluciones(&self) -> bool {
        self.combinaciones.iter().all(|c| c.ramos.is_empty())
    }
}

fn armar_combinacion(candidatos: &[CandidatoOcupado], seleccion: &Seleccion) -> Combinacion {
    let ramos = seleccion
        .iter()
        .map(|&i| {
            let c = &candidatos[i];
            RamoAsignado {
                sigla: c.candidato.sigla.clone(),
                nombre: c.candidato.nombre.clone(),
                semestre: c.candidato.semestre,
                variante: c.candidato.variante.clone(),
                marcador: c.candidato.variante.marcador(),
                ocupacion: c.ocupacion.franjas().to_vec(),
            }
        })
        .collect();
    Combinacion { ramos }
}

pub fn generar_horarios(
    solicitud: &SolicitudHorario,
    opciones: &OpcionesGeneracion,
) -> Result<ResultadoGeneracion, HorarioError> {
    let _span = info_span!("generar_horarios", catalogo = solicitud.catalogo.len()).entered();
    let est = &solicitud.estudiante;

    // PHASE 1
    let creditos = creditos_acumulados(&solicitud.catalogo, &est.aprobados);
    let elegibles = resolver_elegibles(&solicitud.catalogo, &est.aprobados, creditos)?;
    info!(
        "📋 PHASE 1: {} aprobados, {} créditos, {} semestres con ramos elegibles",
        est.aprobados.len(),
        creditos,
        elegibles.len()
    );

    // PHASE 2
    let pool = construir_pool(&elegibles, solicitud.semestres.as_ref(), est)?;
    info!("📋 PHASE 2: {} candidatos", pool.len());

    // PHASE 3
    let modelo = ModeloOcupacion::construir(pool, &solicitud.grilla);
    if !modelo.descartados.is_empty() {
        warn!("📋 PHASE 3: {} candidatos descartados por horario inválido", modelo.descartados.len());
    }

    // PHASE 4
    let tope = solicitud
        .max_combinaciones
        .map_or(opciones.max_combinaciones, |m| m.min(opciones.max_combinaciones));
    let mut enumerador = Enumerador::new(&modelo.candidatos, opciones.limites(tope));
    let orden = enumerador.orden_emision();
    let selecciones = rankear(enumerador.by_ref(), orden, tope);
    let advertencia = enumerador.interrupcion().cloned();

    let combinaciones: Vec<Combinacion> = selecciones
        .iter()
        .map(|s| armar_combinacion(&modelo.candidatos, s))
        .collect();
    info!(
        "✅ PHASE 4: {} combinaciones (tope {}, {} pasos)",
        combinaciones.len(),
        tope,
        enumerador.pasos()
    );

    Ok(ResultadoGeneracion {
        creditos_acumulados: creditos,
        elegibles: elegibles
            .iter()
            .map(|(sem, ramos)| {
                let siglas: BTreeSet<&str> = ramos.iter().map(|r| r.sigla.as_str()).collect();
                (*sem, siglas.into_iter().map(str::to_string).collect())
            })
            .collect(),
        combinaciones,
        descartados: modelo.descartados,
        advertencia,
    })
}

/// Ejecuta solicitudes independientes en paralelo (no comparten estado).
/// El resultado conserva el orden de entrada.
pub fn generar_lote(
    solicitudes: &[SolicitudHorario],
    opciones: &OpcionesGeneracion,
) -> Vec<Result<ResultadoGeneracion, HorarioError>> {
    let hilos = num_cpus::get().max(1);
    let mut out: Vec<Result<ResultadoGeneracion, HorarioError>> = Vec::with_capacity(solicitudes.len());
    for bloque in solicitudes.chunks(hilos) {
        std::thread::scope(|scope| {
            let handles: Vec<_> = bloque
                .iter()
                .map(|s| scope.spawn(move || generar_horarios(s, opciones)))
                .collect();
            for h in handles {
                out.push(match h.join() {
                    Ok(r) => r,
                    Err(_) => Err(HorarioError::Entrada("worker de generación abortó".to_string())),
                });
            }
        });
    }
    out
}
