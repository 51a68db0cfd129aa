// candidatos.rs - Construcción del pool de candidatos para la búsqueda de horarios.
//
// Recibe la salida de elegibilidad (semestre -> ramos), descarta los ramos que
// el estudiante excluyó y colapsa las entradas repetidas de una misma sigla
// (secciones listadas por separado) en un único candidato.
use std::collections::{BTreeMap, BTreeSet, HashMap};

use tracing::debug;

use crate::error::EligibilityError;
use crate::models::{Candidato, EstadoEstudiante, Ramo, Variante};

#[derive(Debug)]
struct Grupo<'a> {
    representante: &'a Ramo,
    etiquetas: Vec<String>,
    horarios: Vec<Vec<crate::models::BloqueCrudo>>,
}

fn variante_para(grupo: &Grupo<'_>, estudiante: &EstadoEstudiante) -> Variante {
    let r = grupo.representante;
    if r.electivo
        && !estudiante.electivos_elegidos.is_empty()
        && !estudiante.electivos_elegidos.contains(&r.sigla)
    {
        return Variante::Opcional;
    }
    if grupo.etiquetas.is_empty() {
        Variante::Normal
    } else {
        Variante::SeccionAlternativa(grupo.etiquetas.clone())
    }
}

/// Pool plano listo para la búsqueda. `semestres = None` toma todos los semestres.
/// Orden de salida: semestre ascendente y luego primera aparición.
pub fn construir_pool(
    elegibles: &BTreeMap<u32, Vec<Ramo>>,
    semestres: Option<&BTreeSet<u32>>,
    estudiante: &EstadoEstudiante,
) -> Result<Vec<Candidato>, EligibilityError> {
    let mut orden: Vec<String> = Vec::new();
    let mut grupos: HashMap<String, Grupo<'_>> = HashMap::new();
    let mut excluidos = 0usize;

    for (sem, ramos) in elegibles.iter() {
        if let Some(filtro) = semestres {
            if !filtro.contains(sem) {
                continue;
            }
        }
        for ramo in ramos {
            if estudiante.excluidos.contains(&ramo.sigla) {
                excluidos += 1;
                continue;
            }
            match grupos.get_mut(&ramo.sigla) {
                Some(g) => {
                    if g.representante.semestre != ramo.semestre
                        || g.representante.creditos() != ramo.creditos()
                    {
                        return Err(EligibilityError::DuplicadoInconsistente { sigla: ramo.sigla.clone() });
                    }
                    if let Some(et) = &ramo.seccion {
                        if !g.etiquetas.contains(et) {
                            g.etiquetas.push(et.clone());
                        }
                    }
                    g.horarios.extend(ramo.horarios.iter().cloned());
                }
                None => {
                    orden.push(ramo.sigla.clone());
                    grupos.insert(
                        ramo.sigla.clone(),
                        Grupo {
                            representante: ramo,
                            etiquetas: ramo.seccion.iter().cloned().collect(),
                            horarios: ramo.horarios.clone(),
                        },
                    );
                }
            }
        }
    }

    let mut pool: Vec<Candidato> = Vec::with_capacity(orden.len());
    for sigla in orden {
        let Some(g) = grupos.remove(&sigla) else { continue };
        let variante = variante_para(&g, estudiante);
        let r = g.representante;
        pool.push(Candidato {
            sigla: r.sigla.clone(),
            nombre: r.nombre.clone(),
            semestre: r.semestre,
            creditos: r.creditos(),
            variante,
            horarios: g.horarios,
        });
    }

    debug!("[candidatos] pool de {} candidatos ({} entradas excluidas por el estudiante)", pool.len(), excluidos);
    Ok(pool)
}
