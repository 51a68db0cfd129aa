use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};

use crate::models::{EstadoEstudiante, GrillaHoraria, Ramo};

/// Solicitud completa de generación de horarios.
///
/// # Estructura del JSON esperado:
/// ```json
/// {
///   "catalogo": [
///     { "sigla": "MAT100", "nombre": "Cálculo I", "semestre": 1,
///       "creditos_teoria": 4, "creditos_practica": 2,
///       "horarios": [[{"dia": "LU", "bloque": 1}, {"dia": "MI", "bloque": 1}]] },
///     { "sigla": "MAT200", "nombre": "Cálculo II", "semestre": 2,
///       "prerequisitos": ["MAT100", 20],
///       "horarios": [[{"dia": "MA", "bloque": 2}]] }
///   ],
///   "estudiante": {
///     "aprobados": ["MAT100"],
///     "excluidos": [],
///     "electivos_elegidos": []
///   },
///   "grilla": { "dias": 6, "bloques_por_dia": 14 },
///   "semestres": [2, 3],
///   "max_combinaciones": 20
/// }
/// ```
///
/// # Campos:
/// - `catalogo`: ramos de la malla (requerido). `prerequisitos` mezcla siglas y un umbral numérico de créditos
/// - `estudiante`: aprobados, excluidos este semestre y electivos de la línea principal
/// - `grilla`: días y bloques por día de la carrera (por defecto 6 x 14)
/// - `semestres`: semestres objetivo (opcional; por defecto todos)
/// - `max_combinaciones`: tope pedido por el cliente (nunca supera el tope del servidor)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SolicitudHorario {
    pub catalogo: Vec<Ramo>,
    #[serde(default)]
    pub estudiante: EstadoEstudiante,
    #[serde(default)]
    pub grilla: GrillaHoraria,
    #[serde(default)]
    pub semestres: Option<BTreeSet<u32>>,
    #[serde(default)]
    pub max_combinaciones: Option<usize>,
}

pub fn parse_json_input(json_str: &str) -> Result<SolicitudHorario, serde_json::Error> {
    serde_json::from_str::<SolicitudHorario>(json_str)
}

/// Parsea la solicitud y resuelve por nombre las entradas del estudiante que
/// no coinciden con ninguna sigla del catálogo.
pub fn parse_and_resolve_ramos(json_str: &str) -> Result<SolicitudHorario, serde_json::Error> {
    let solicitud = parse_json_input(json_str)?;
    Ok(resolve_ramos(solicitud))
}

/// Normaliza un nombre para comparar: sin tildes, minúsculas, sin puntuación
/// y con espacios colapsados.
pub fn normalize_name(s: &str) -> String {
    let mut out = String::new();
    for ch in s.chars() {
        let c = match ch {
            'Á' | 'À' | 'Ä' | 'Â' | 'Ã' | 'á' | 'à' | 'ä' | 'â' | 'ã' => 'a',
            'É' | 'È' | 'Ë' | 'Ê' | 'é' | 'è' | 'ë' | 'ê' => 'e',
            'Í' | 'Ì' | 'Ï' | 'Î' | 'í' | 'ì' | 'ï' | 'î' => 'i',
            'Ó' | 'Ò' | 'Ö' | 'Ô' | 'Õ' | 'ó' | 'ò' | 'ö' | 'ô' | 'õ' => 'o',
            'Ú' | 'Ù' | 'Ü' | 'Û' | 'ú' | 'ù' | 'ü' | 'û' => 'u',
            'Ñ' | 'ñ' => 'n',
            'Ç' | 'ç' => 'c',
            other => other,
        };
        if c.is_alphanumeric() {
            out.push(c.to_ascii_lowercase());
        } else if c.is_whitespace() && !out.ends_with(' ') && !out.is_empty() {
            out.push(' ');
        }
    }
    out.trim_end().to_string()
}

/// Versión parametrizable: `resolver` recibe un nombre y devuelve la sigla si la conoce.
pub fn resolve_ramos_with_resolver<F>(mut solicitud: SolicitudHorario, resolver: F) -> SolicitudHorario
where
    F: Fn(&str) -> Option<String>,
{
    let siglas: BTreeSet<String> = solicitud.catalogo.iter().map(|r| r.sigla.clone()).collect();

    let resolve_one = |r: String| -> String {
        let t = r.trim();
        if siglas.contains(t) {
            return t.to_string();
        }
        resolver(t).unwrap_or(r)
    };

    let est = &mut solicitud.estudiante;
    est.aprobados = std::mem::take(&mut est.aprobados).into_iter().map(resolve_one).collect();
    est.excluidos = std::mem::take(&mut est.excluidos).into_iter().map(resolve_one).collect();
    est.electivos_elegidos = std::mem::take(&mut est.electivos_elegidos).into_iter().map(resolve_one).collect();
    solicitud
}

/// Resolución contra los nombres del propio catálogo.
pub fn resolve_ramos(solicitud: SolicitudHorario) -> SolicitudHorario {
    let mut por_nombre: HashMap<String, String> = HashMap::new();
    for r in &solicitud.catalogo {
        por_nombre.entry(normalize_name(&r.nombre)).or_insert_with(|| r.sigla.clone());
    }
    resolve_ramos_with_resolver(solicitud, |nombre| por_nombre.get(&normalize_name(nombre)).cloned())
}
