// Taxonomía de errores del generador de horarios.
use serde::Serialize;
use thiserror::Error;

use crate::models::Franja;

/// Prerequisito imposible de evaluar. La resolución de elegibilidad falla
/// en vez de asumir el prerequisito como cumplido.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EligibilityError {
    #[error("ramo {ramo}: prerequisito desconocido '{prerequisito}'{}", sugerencia_fmt(.sugerencia))]
    PrerequisitoDesconocido {
        ramo: String,
        prerequisito: String,
        sugerencia: Option<String>,
    },

    #[error("ramo {ramo}: prerequisito malformado ({detalle})")]
    PrerequisitoMalformado { ramo: String, detalle: String },

    #[error("ramo {ramo}: se declara a sí mismo como prerequisito")]
    AutoReferencia { ramo: String },

    /// Dos entradas con la misma sigla que no describen el mismo ramo.
    #[error("sigla {sigla}: entradas duplicadas con semestre o créditos distintos")]
    DuplicadoInconsistente { sigla: String },
}

fn sugerencia_fmt(s: &Option<String>) -> String {
    match s {
        Some(sug) => format!(" (¿quiso decir '{}'?)", sug),
        None => String::new(),
    }
}

/// Datos de horario inválidos para un ramo.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Error)]
#[serde(tag = "tipo", rename_all = "snake_case")]
pub enum OccupancyDataError {
    #[error("ramo {sigla}: la franja {franja} aparece más de una vez en una misma sección")]
    FranjaDuplicada { sigla: String, franja: Franja },

    #[error("ramo {sigla}: día {dia} / bloque {bloque} fuera de la grilla")]
    FueraDeGrilla { sigla: String, dia: u32, bloque: u32 },

    #[error("ramo {sigla}: día desconocido '{dia}'")]
    DiaDesconocido { sigla: String, dia: String },
}

impl OccupancyDataError {
    pub fn sigla(&self) -> &str {
        match self {
            OccupancyDataError::FranjaDuplicada { sigla, .. }
            | OccupancyDataError::FueraDeGrilla { sigla, .. }
            | OccupancyDataError::DiaDesconocido { sigla, .. } => sigla,
        }
    }
}

/// Motivo por el cual la búsqueda se detuvo antes de alcanzar el tope pedido.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MotivoInterrupcion {
    PresupuestoPasos,
    Plazo,
    Cancelado,
}

/// Aviso (no fallo): la lista de combinaciones puede estar incompleta.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Error)]
#[error("generación interrumpida ({motivo:?}) tras {pasos} pasos y {generadas} combinaciones")]
pub struct GenerationLimitExceeded {
    pub motivo: MotivoInterrupcion,
    pub pasos: u64,
    pub generadas: usize,
}

#[derive(Debug, Error)]
pub enum HorarioError {
    #[error(transparent)]
    Elegibilidad(#[from] EligibilityError),

    #[error(transparent)]
    Ocupacion(#[from] OccupancyDataError),

    #[error("configuración inválida: {0}")]
    Configuracion(String),

    #[error("entrada inválida: {0}")]
    Entrada(String),
}

impl From<serde_json::Error> for HorarioError {
    fn from(e: serde_json::Error) -> Self {
        HorarioError::Entrada(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, HorarioError>;
