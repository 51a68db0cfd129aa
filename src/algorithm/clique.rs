// clique.rs - Enumeración perezosa de horarios sin topes.
//
// Sobre el grafo de conflictos (arista = huellas que se solapan) cada horario
// es un conjunto independiente maximal; equivalentemente, una clique maximal
// del grafo de compatibilidad. La búsqueda es un backtracking en profundidad
// incluir/excluir con un acumulador de ocupación en bitset, implementado con
// una pila explícita para poder entregarse como `Iterator`.
//
// El recorrido se hace por pasadas de tamaño objetivo decreciente: la pasada k
// sólo emite horarios maximales de exactamente k ramos, y poda toda rama cuya
// cota (ramos incluidos + cliques de conflicto con algún candidato todavía
// compatible) no alcanza k. Así la salida nunca crece en tamaño y cortar la
// enumeración en cualquier punto conserva los horarios más grandes.
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

use tracing::{debug, warn};

use crate::algorithm::conflict::{grafo_conflictos, particion_cliques, ultimo_conflicto};
use crate::algorithm::ocupacion::{CandidatoOcupado, MapaBits};
use crate::algorithm::ranking::OrdenEmision;
use crate::error::{GenerationLimitExceeded, MotivoInterrupcion};

/// Índices (en el pool) de los candidatos incluidos en un horario.
pub type Seleccion = Vec<usize>;

// El plazo y la cancelación se consultan cada tantos pasos.
const PASOS_ENTRE_CHEQUEOS: u64 = 1024;

/// Señal cooperativa de cancelación compartible entre hilos.
#[derive(Debug, Clone, Default)]
pub struct TokenCancelacion(Arc<AtomicBool>);

impl TokenCancelacion {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancelar(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn cancelado(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

#[derive(Debug, Clone)]
pub struct LimitesBusqueda {
    /// Tope duro de combinaciones producidas por el enumerador.
    pub max_generadas: usize,
    pub max_pasos: Option<u64>,
    pub plazo: Option<Instant>,
    pub cancelacion: Option<TokenCancelacion>,
}

impl Default for LimitesBusqueda {
    fn default() -> Self {
        LimitesBusqueda { max_generadas: usize::MAX, max_pasos: None, plazo: None, cancelacion: None }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Paso {
    Incluir,
    Excluir,
    Hecho,
}

#[derive(Debug)]
struct Marco {
    pos: usize,
    paso: Paso,
    incluido: bool,
}

pub struct Enumerador<'a> {
    candidatos: &'a [CandidatoOcupado],
    ultimo_conflicto: Vec<Option<usize>>,
    clique_de: Vec<usize>,
    marcas: Vec<bool>,
    objetivo: usize,
    limites: LimitesBusqueda,
    pila: Vec<Marco>,
    acumulador: MapaBits,
    seleccion: Seleccion,
    incluidos: Vec<bool>,
    pasos: u64,
    generadas: usize,
    terminado: bool,
    interrupcion: Option<GenerationLimitExceeded>,
}

impl<'a> Enumerador<'a> {
    pub fn new(candidatos: &'a [CandidatoOcupado], limites: LimitesBusqueda) -> Self {
        let grafo = grafo_conflictos(candidatos);
        debug!(
            "🧠 [clique] {} candidatos, {} conflictos, tope {}",
            candidatos.len(),
            grafo.edge_count(),
            limites.max_generadas
        );
        let acumulador = candidatos
            .first()
            .map(|c| MapaBits::vacio_como(c.ocupacion.bits()))
            .unwrap_or_default();
        let clique_de = particion_cliques(&grafo);
        let cliques = clique_de.iter().max().map_or(0, |m| m + 1);
        let terminado = limites.max_generadas == 0;
        Enumerador {
            candidatos,
            ultimo_conflicto: ultimo_conflicto(&grafo),
            clique_de,
            marcas: vec![false; cliques],
            objetivo: cliques,
            limites,
            pila: vec![Marco { pos: 0, paso: Paso::Incluir, incluido: false }],
            acumulador,
            seleccion: Vec::new(),
            incluidos: vec![false; candidatos.len()],
            pasos: 0,
            generadas: 0,
            terminado,
            interrupcion: None,
        }
    }

    /// Si la búsqueda se cortó por presupuesto, plazo o cancelación.
    pub fn interrupcion(&self) -> Option<&GenerationLimitExceeded> {
        self.interrupcion.as_ref()
    }

    pub fn pasos(&self) -> u64 {
        self.pasos
    }

    pub fn generadas(&self) -> usize {
        self.generadas
    }

    /// Las pasadas por tamaño objetivo garantizan orden no creciente.
    pub fn orden_emision(&self) -> OrdenEmision {
        OrdenEmision::TamanoNoCreciente
    }

    fn interrumpir(&mut self, motivo: MotivoInterrupcion) {
        warn!(
            "⚠️  [clique] búsqueda interrumpida ({:?}) tras {} pasos, {} combinaciones",
            motivo, self.pasos, self.generadas
        );
        self.interrupcion = Some(GenerationLimitExceeded { motivo, pasos: self.pasos, generadas: self.generadas });
        self.terminado = true;
    }

    fn presupuesto_agotado(&self) -> Option<MotivoInterrupcion> {
        if let Some(max) = self.limites.max_pasos {
            if self.pasos > max {
                return Some(MotivoInterrupcion::PresupuestoPasos);
            }
        }
        if (self.pasos - 1) % PASOS_ENTRE_CHEQUEOS == 0 {
            if let Some(token) = &self.limites.cancelacion {
                if token.cancelado() {
                    return Some(MotivoInterrupcion::Cancelado);
                }
            }
            if let Some(plazo) = self.limites.plazo {
                if Instant::now() >= plazo {
                    return Some(MotivoInterrupcion::Plazo);
                }
            }
        }
        None
    }

    /// Máximo de ramos alcanzable desde `pos` con la selección actual.
    fn cota(&mut self, pos: usize) -> usize {
        self.marcas.fill(false);
        let mut libres = 0usize;
        for (j, c) in self.candidatos.iter().enumerate().skip(pos) {
            let k = self.clique_de[j];
            if !self.marcas[k] && !c.ocupacion.bits().se_solapa(&self.acumulador) {
                self.marcas[k] = true;
                libres += 1;
            }
        }
        self.seleccion.len() + libres
    }

    /// Un horario es maximal si todo candidato fuera de él topa con el acumulador.
    fn es_maximal(&self) -> bool {
        self.candidatos
            .iter()
            .enumerate()
            .all(|(i, c)| self.incluidos[i] || c.ocupacion.bits().se_solapa(&self.acumulador))
    }

    /// Excluir un candidato compatible sólo sirve si algún candidato posterior topa con él;
    /// de lo contrario la hoja nunca sería maximal.
    fn exclusion_viable(&self, pos: usize) -> bool {
        let c = &self.candidatos[pos];
        if c.ocupacion.bits().se_solapa(&self.acumulador) {
            return true;
        }
        self.ultimo_conflicto[pos].is_some_and(|u| u > pos)
    }
}

impl Iterator for Enumerador<'_> {
    type Item = Seleccion;

    fn next(&mut self) -> Option<Seleccion> {
        if self.terminado {
            return None;
        }
        let n = self.candidatos.len();

        loop {
            if self.pila.is_empty() {
                if self.objetivo == 0 {
                    break;
                }
                self.objetivo -= 1;
                debug!("🧠 [clique] pasada de tamaño {}", self.objetivo);
                self.pila.push(Marco { pos: 0, paso: Paso::Incluir, incluido: false });
            }

            self.pasos += 1;
            if let Some(motivo) = self.presupuesto_agotado() {
                self.interrumpir(motivo);
                return None;
            }

            let top = self.pila.len() - 1;
            let pos = self.pila[top].pos;

            if pos == n {
                self.pila.pop();
                if self.seleccion.len() == self.objetivo && self.es_maximal() {
                    self.generadas += 1;
                    if self.generadas >= self.limites.max_generadas {
                        self.terminado = true;
                    }
                    return Some(self.seleccion.clone());
                }
                continue;
            }

            if self.pila[top].paso == Paso::Incluir {
                let cota = self.cota(pos);
                let llena = self.seleccion.len() == self.objetivo;
                // con la selección llena, cualquier candidato compatible restante impide la maximalidad
                if cota < self.objetivo || (llena && cota > self.objetivo) {
                    self.pila.pop();
                    continue;
                }
            }

            match self.pila[top].paso {
                Paso::Incluir => {
                    self.pila[top].paso = Paso::Excluir;
                    let bits = self.candidatos[pos].ocupacion.bits();
                    if self.seleccion.len() < self.objetivo && !bits.se_solapa(&self.acumulador) {
                        self.acumulador.unir(bits);
                        self.seleccion.push(pos);
                        self.incluidos[pos] = true;
                        self.pila[top].incluido = true;
                        self.pila.push(Marco { pos: pos + 1, paso: Paso::Incluir, incluido: false });
                    }
                }
                Paso::Excluir => {
                    if self.pila[top].incluido {
                        // las huellas dentro de la selección son disjuntas: quitar es exacto
                        self.acumulador.quitar(self.candidatos[pos].ocupacion.bits());
                        self.seleccion.pop();
                        self.incluidos[pos] = false;
                        self.pila[top].incluido = false;
                    }
                    self.pila[top].paso = Paso::Hecho;
                    if self.exclusion_viable(pos) {
                        self.pila.push(Marco { pos: pos + 1, paso: Paso::Incluir, incluido: false });
                    }
                }
                Paso::Hecho => {
                    self.pila.pop();
                }
            }
        }

        debug!("✅ [clique] búsqueda completa: {} combinaciones en {} pasos", self.generadas, self.pasos);
        self.terminado = true;
        None
    }
}
