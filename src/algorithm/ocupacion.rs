// ocupacion.rs - Huella de ocupación (día, bloque) de cada candidato.
//
// La huella se guarda dos veces: como lista ordenada de franjas (para la
// presentación) y como bitset sobre las celdas de la grilla (para el test de
// solapamiento que el enumerador ejecuta en cada extensión).
use std::collections::BTreeSet;

use tracing::warn;

use crate::error::OccupancyDataError;
use crate::models::{BloqueCrudo, Candidato, Franja, GrillaHoraria};

/// Bitset de celdas de la grilla.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MapaBits {
    palabras: Vec<u64>,
}

impl MapaBits {
    pub fn vacio(celdas: usize) -> Self {
        MapaBits { palabras: vec![0u64; celdas.div_ceil(64)] }
    }

    /// Bitset vacío del mismo tamaño que `otro`.
    pub fn vacio_como(otro: &MapaBits) -> Self {
        MapaBits { palabras: vec![0u64; otro.palabras.len()] }
    }

    #[inline]
    pub fn marcar(&mut self, i: usize) {
        self.palabras[i / 64] |= 1u64 << (i % 64);
    }

    #[inline]
    pub fn contiene(&self, i: usize) -> bool {
        self.palabras.get(i / 64).is_some_and(|w| w & (1u64 << (i % 64)) != 0)
    }

    #[inline]
    pub fn se_solapa(&self, otro: &MapaBits) -> bool {
        self.palabras.iter().zip(otro.palabras.iter()).any(|(a, b)| a & b != 0)
    }

    #[inline]
    pub fn unir(&mut self, otro: &MapaBits) {
        for (a, b) in self.palabras.iter_mut().zip(otro.palabras.iter()) {
            *a |= *b;
        }
    }

    #[inline]
    pub fn quitar(&mut self, otro: &MapaBits) {
        for (a, b) in self.palabras.iter_mut().zip(otro.palabras.iter()) {
            *a &= !*b;
        }
    }

    pub fn es_vacio(&self) -> bool {
        self.palabras.iter().all(|w| *w == 0)
    }

    pub fn cantidad(&self) -> usize {
        self.palabras.iter().map(|w| w.count_ones() as usize).sum()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ocupacion {
    franjas: Vec<Franja>,
    bits: MapaBits,
}

fn canonizar(sigla: &str, b: &BloqueCrudo, grilla: &GrillaHoraria) -> Result<Franja, OccupancyDataError> {
    let dia = b.dia.indice().ok_or_else(|| OccupancyDataError::DiaDesconocido {
        sigla: sigla.to_string(),
        dia: b.dia.to_string(),
    })?;
    if dia == 0 || dia > grilla.dias as u32 || b.bloque == 0 || b.bloque > grilla.bloques_por_dia as u32 {
        return Err(OccupancyDataError::FueraDeGrilla { sigla: sigla.to_string(), dia, bloque: b.bloque });
    }
    Ok(Franja { dia: (dia - 1) as u8, bloque: (b.bloque - 1) as u8 })
}

impl Ocupacion {
    /// Aplana las secciones de un ramo (unión de sus franjas) y valida cada par
    /// contra la grilla. Una franja repetida dentro de una misma sección es un
    /// dato inválido; secciones paralelas pueden compartir franjas.
    pub fn desde_horarios(
        sigla: &str,
        horarios: &[Vec<BloqueCrudo>],
        grilla: &GrillaHoraria,
    ) -> Result<Ocupacion, OccupancyDataError> {
        let mut vistas: BTreeSet<Franja> = BTreeSet::new();
        let mut bits = MapaBits::vacio(grilla.total_celdas());
        for seccion in horarios {
            let mut en_seccion: BTreeSet<Franja> = BTreeSet::new();
            for b in seccion {
                let f = canonizar(sigla, b, grilla)?;
                if !en_seccion.insert(f) {
                    return Err(OccupancyDataError::FranjaDuplicada { sigla: sigla.to_string(), franja: f });
                }
                vistas.insert(f);
                bits.marcar(grilla.celda(f));
            }
        }
        Ok(Ocupacion { franjas: vistas.into_iter().collect(), bits })
    }

    pub fn franjas(&self) -> &[Franja] {
        &self.franjas
    }

    pub fn bits(&self) -> &MapaBits {
        &self.bits
    }

    /// Dos ramos topan si comparten al menos una franja.
    pub fn se_solapa(&self, otra: &Ocupacion) -> bool {
        self.bits.se_solapa(&otra.bits)
    }
}

#[derive(Debug, Clone)]
pub struct CandidatoOcupado {
    pub candidato: Candidato,
    pub ocupacion: Ocupacion,
}

/// Huellas de todo el pool. Los candidatos con datos inválidos quedan fuera
/// de la búsqueda y se reportan en `descartados`.
#[derive(Debug, Clone, Default)]
pub struct ModeloOcupacion {
    pub candidatos: Vec<CandidatoOcupado>,
    pub descartados: Vec<OccupancyDataError>,
}

impl ModeloOcupacion {
    pub fn construir(pool: Vec<Candidato>, grilla: &GrillaHoraria) -> Self {
        let mut modelo = ModeloOcupacion::default();
        for candidato in pool {
            match Ocupacion::desde_horarios(&candidato.sigla, &candidato.horarios, grilla) {
                Ok(ocupacion) => modelo.candidatos.push(CandidatoOcupado { candidato, ocupacion }),
                Err(e) => {
                    warn!("[ocupacion] ⊘ descartando {}: {}", candidato.sigla, e);
                    modelo.descartados.push(e);
                }
            }
        }
        modelo
    }
}
