// elegibilidad.rs - Qué ramos de la malla quedan desbloqueados para el estudiante.
//
// Un ramo es elegible si está activo, no fue aprobado y TODAS las entradas de
// su lista de prerequisitos se cumplen:
//   - sigla   -> debe estar en el conjunto de aprobados
//   - número  -> los créditos acumulados deben ser >= ese número
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

use petgraph::Direction;
use petgraph::graph::{DiGraph, NodeIndex};
use tracing::{debug, warn};

use crate::error::EligibilityError;
use crate::models::{Prerequisito, Ramo};

const UMBRAL_SUGERENCIA: f64 = 0.85;

/// Suma de créditos (teoría + práctica) de los ramos aprobados. Cada sigla
/// cuenta una sola vez aunque el catálogo la repita por sección.
pub fn creditos_acumulados(catalogo: &[Ramo], aprobados: &BTreeSet<String>) -> u32 {
    let mut vistos: HashSet<&str> = HashSet::new();
    let mut total = 0u32;
    for ramo in catalogo {
        if aprobados.contains(&ramo.sigla) && vistos.insert(ramo.sigla.as_str()) {
            total += ramo.creditos();
        }
    }
    for sigla in aprobados {
        if !vistos.contains(sigla.as_str()) {
            warn!("[elegibilidad] ramo aprobado {} no existe en la malla; no suma créditos", sigla);
        }
    }
    total
}

fn sugerir_sigla(siglas: &HashSet<&str>, buscada: &str) -> Option<String> {
    let mut mejor: Option<(f64, &str)> = None;
    for s in siglas {
        let score = strsim::jaro_winkler(&s.to_uppercase(), &buscada.to_uppercase());
        if score >= UMBRAL_SUGERENCIA && mejor.map_or(true, |(m, ms)| score > m || (score == m && *s < ms)) {
            mejor = Some((score, *s));
        }
    }
    mejor.map(|(_, s)| s.to_string())
}

fn validar_prerequisitos(ramo: &Ramo, siglas: &HashSet<&str>) -> Result<(), EligibilityError> {
    for pr in &ramo.prerequisitos {
        if let Prerequisito::Ramo(code) = pr {
            let code = code.trim();
            if code.is_empty() {
                return Err(EligibilityError::PrerequisitoMalformado {
                    ramo: ramo.sigla.clone(),
                    detalle: "sigla vacía".to_string(),
                });
            }
            if code == ramo.sigla {
                return Err(EligibilityError::AutoReferencia { ramo: ramo.sigla.clone() });
            }
            if !siglas.contains(code) {
                return Err(EligibilityError::PrerequisitoDesconocido {
                    ramo: ramo.sigla.clone(),
                    prerequisito: code.to_string(),
                    sugerencia: sugerir_sigla(siglas, code),
                });
            }
        }
    }
    Ok(())
}

/// Recorre todo el catálogo y devuelve todos los problemas de prerequisitos encontrados.
pub fn validar_catalogo(catalogo: &[Ramo]) -> Vec<EligibilityError> {
    let siglas: HashSet<&str> = catalogo.iter().map(|r| r.sigla.as_str()).collect();
    catalogo
        .iter()
        .filter_map(|r| validar_prerequisitos(r, &siglas).err())
        .collect()
}

/// True si la conjunción de prerequisitos se cumple (vacía => true).
pub fn prerequisitos_cumplidos(ramo: &Ramo, aprobados: &BTreeSet<String>, creditos: u32) -> bool {
    ramo.prerequisitos.iter().all(|pr| match pr {
        Prerequisito::Ramo(code) => aprobados.contains(code.trim()),
        Prerequisito::Creditos(min) => creditos >= *min,
    })
}

/// Mapa semestre -> ramos elegibles. Los semestres sin ramos no aparecen.
pub fn resolver_elegibles(
    catalogo: &[Ramo],
    aprobados: &BTreeSet<String>,
    creditos: u32,
) -> Result<BTreeMap<u32, Vec<Ramo>>, EligibilityError> {
    let siglas: HashSet<&str> = catalogo.iter().map(|r| r.sigla.as_str()).collect();
    let mut out: BTreeMap<u32, Vec<Ramo>> = BTreeMap::new();

    for ramo in catalogo {
        if !ramo.activo || aprobados.contains(&ramo.sigla) {
            continue;
        }
        validar_prerequisitos(ramo, &siglas)?;
        if prerequisitos_cumplidos(ramo, aprobados, creditos) {
            out.entry(ramo.semestre).or_default().push(ramo.clone());
        } else {
            debug!("[elegibilidad] {} bloqueado por prerequisitos", ramo.sigla);
        }
    }

    debug!(
        "[elegibilidad] {} ramos elegibles en {} semestres (créditos={})",
        out.values().map(Vec::len).sum::<usize>(),
        out.len(),
        creditos
    );
    Ok(out)
}

/// Grafo implícito de la malla: arista prerequisito -> ramo dependiente.
/// Las siglas repetidas comparten nodo.
pub struct GrafoElegibilidad {
    grafo: DiGraph<String, ()>,
    indices: HashMap<String, NodeIndex>,
}

impl GrafoElegibilidad {
    pub fn construir(catalogo: &[Ramo]) -> Self {
        let mut grafo: DiGraph<String, ()> = DiGraph::new();
        let mut indices: HashMap<String, NodeIndex> = HashMap::new();

        for ramo in catalogo {
            if !indices.contains_key(&ramo.sigla) {
                let idx = grafo.add_node(ramo.sigla.clone());
                indices.insert(ramo.sigla.clone(), idx);
            }
        }

        for ramo in catalogo {
            for pr in &ramo.prerequisitos {
                if let Prerequisito::Ramo(code) = pr {
                    if let (Some(&from), Some(&to)) = (indices.get(code.trim()), indices.get(&ramo.sigla)) {
                        if from != to && grafo.find_edge(from, to).is_none() {
                            grafo.add_edge(from, to, ());
                        }
                    }
                }
            }
        }

        GrafoElegibilidad { grafo, indices }
    }

    /// Ramos que nombran `sigla` en su lista de prerequisitos (ordenados).
    pub fn desbloqueados_por(&self, sigla: &str) -> Vec<String> {
        let Some(&idx) = self.indices.get(sigla) else { return Vec::new() };
        let mut out: Vec<String> = self
            .grafo
            .neighbors_directed(idx, Direction::Outgoing)
            .map(|n| self.grafo[n].clone())
            .collect();
        out.sort();
        out
    }

    /// Prerequisitos directos (por sigla) de un ramo.
    pub fn prerequisitos_de(&self, sigla: &str) -> Vec<String> {
        let Some(&idx) = self.indices.get(sigla) else { return Vec::new() };
        let mut out: Vec<String> = self
            .grafo
            .neighbors_directed(idx, Direction::Incoming)
            .map(|n| self.grafo[n].clone())
            .collect();
        out.sort();
        out
    }

    pub fn aristas(&self) -> usize {
        self.grafo.edge_count()
    }
}
