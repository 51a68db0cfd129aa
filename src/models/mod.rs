// Estructuras de datos principales
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Códigos de día en el orden de la grilla (índice 0 = lunes).
pub const DIAS: [&str; 7] = ["LU", "MA", "MI", "JU", "VI", "SA", "DO"];

/// Entrada de la lista de prerequisitos. En los datos de origen ambos tipos
/// comparten la misma lista: `["MAT101", "FIS100", 60]`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Prerequisito {
    Ramo(String),
    Creditos(u32),
}

/// Identificador de día tal como llega: índice 1-based o código ("LU", "MAR"...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DiaId {
    Indice(u32),
    Codigo(String),
}

impl DiaId {
    /// Índice 1-based del día, o None si el código no se reconoce.
    pub fn indice(&self) -> Option<u32> {
        match self {
            DiaId::Indice(i) => Some(*i),
            DiaId::Codigo(c) => {
                let token: String = c.trim().to_uppercase().chars().take(3).collect();
                let dn = match token.as_str() {
                    "LUN" | "LU" => "LU",
                    "MAR" | "MA" => "MA",
                    "MIE" | "MI" => "MI",
                    "JUE" | "JU" => "JU",
                    "VIE" | "VI" => "VI",
                    "SAB" | "SA" => "SA",
                    "DOM" | "DO" => "DO",
                    _ => return None,
                };
                DIAS.iter().position(|d| *d == dn).map(|p| p as u32 + 1)
            }
        }
    }
}

impl fmt::Display for DiaId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiaId::Indice(i) => write!(f, "{}", i),
            DiaId::Codigo(c) => write!(f, "{}", c),
        }
    }
}

/// Par (día, bloque) sin validar, tal como viene del catálogo.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BloqueCrudo {
    pub dia: DiaId,
    pub bloque: u32,
}

impl BloqueCrudo {
    pub fn new(dia: &str, bloque: u32) -> Self {
        BloqueCrudo { dia: DiaId::Codigo(dia.to_string()), bloque }
    }
}

/// Celda canónica de la grilla, 0-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Franja {
    pub dia: u8,
    pub bloque: u8,
}

impl fmt::Display for Franja {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let dia = DIAS.get(self.dia as usize).copied().unwrap_or("??");
        write!(f, "{}-{}", dia, self.bloque as u32 + 1)
    }
}

/// Grilla semanal de la carrera: cantidad de días y de bloques por día.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GrillaHoraria {
    pub dias: u8,
    pub bloques_por_dia: u8,
}

impl Default for GrillaHoraria {
    fn default() -> Self {
        GrillaHoraria { dias: 6, bloques_por_dia: 14 }
    }
}

impl GrillaHoraria {
    pub fn total_celdas(&self) -> usize {
        self.dias as usize * self.bloques_por_dia as usize
    }

    /// Posición lineal de una franja dentro de la grilla.
    pub fn celda(&self, franja: Franja) -> usize {
        franja.dia as usize * self.bloques_por_dia as usize + franja.bloque as usize
    }
}

fn default_true() -> bool {
    true
}

/// Ramo de la malla curricular. Puede haber varias entradas con la misma
/// sigla cuando el catálogo lista secciones por separado.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ramo {
    pub sigla: String,
    pub nombre: String,
    pub semestre: u32,
    #[serde(default)]
    pub prerequisitos: Vec<Prerequisito>,
    #[serde(default)]
    pub creditos_teoria: u32,
    #[serde(default)]
    pub creditos_practica: u32,
    #[serde(default)]
    pub electivo: bool,
    #[serde(default = "default_true")]
    pub activo: bool,
    #[serde(default)]
    pub seccion: Option<String>,
    /// Una lista de bloques por sección de clase.
    #[serde(default)]
    pub horarios: Vec<Vec<BloqueCrudo>>,
}

impl Ramo {
    pub fn new(sigla: &str, nombre: &str, semestre: u32) -> Self {
        Ramo {
            sigla: sigla.to_string(),
            nombre: nombre.to_string(),
            semestre,
            prerequisitos: Vec::new(),
            creditos_teoria: 0,
            creditos_practica: 0,
            electivo: false,
            activo: true,
            seccion: None,
            horarios: Vec::new(),
        }
    }

    pub fn creditos(&self) -> u32 {
        self.creditos_teoria + self.creditos_practica
    }
}

/// Estado del estudiante para una solicitud.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EstadoEstudiante {
    #[serde(default)]
    pub aprobados: BTreeSet<String>,
    /// Ramos que el estudiante no quiere tomar este semestre.
    #[serde(default)]
    pub excluidos: BTreeSet<String>,
    /// Electivos de la línea principal. Vacío = todos los electivos son normales.
    #[serde(default)]
    pub electivos_elegidos: BTreeSet<String>,
}

/// Marca de presentación de un candidato.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "tipo", content = "secciones")]
pub enum Variante {
    Normal,
    SeccionAlternativa(Vec<String>),
    /// Electivo fuera de la elección principal del estudiante.
    Opcional,
}

impl Variante {
    pub fn marcador(&self) -> Option<String> {
        match self {
            Variante::Normal => None,
            Variante::SeccionAlternativa(etiquetas) => Some(etiquetas.join("/")),
            Variante::Opcional => Some("OPT".to_string()),
        }
    }
}

/// Unidad del pool de candidatos: un ramo por sigla, con las secciones ya colapsadas.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Candidato {
    pub sigla: String,
    pub nombre: String,
    pub semestre: u32,
    pub creditos: u32,
    pub variante: Variante,
    pub horarios: Vec<Vec<BloqueCrudo>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RamoAsignado {
    pub sigla: String,
    pub nombre: String,
    pub semestre: u32,
    pub variante: Variante,
    pub marcador: Option<String>,
    pub ocupacion: Vec<Franja>,
}

/// Horario sin topes: conjunto de ramos con franjas disjuntas.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Combinacion {
    pub ramos: Vec<RamoAsignado>,
}

impl Combinacion {
    pub fn tamano(&self) -> usize {
        self.ramos.len()
    }

    pub fn siglas(&self) -> Vec<&str> {
        self.ramos.iter().map(|r| r.sigla.as_str()).collect()
    }

    pub fn contiene(&self, sigla: &str) -> bool {
        self.ramos.iter().any(|r| r.sigla == sigla)
    }
}
