// Funciones para detectar conflictos entre ramos y sobre una grilla ya armada.
use petgraph::graph::{NodeIndex, UnGraph};

use crate::algorithm::ocupacion::{CandidatoOcupado, Ocupacion};
use crate::models::{Combinacion, Franja, GrillaHoraria};

/// Grafo de conflictos: un nodo por candidato (peso = posición en el pool),
/// arista si sus huellas se solapan.
pub fn grafo_conflictos(candidatos: &[CandidatoOcupado]) -> UnGraph<usize, ()> {
    let mut graph = UnGraph::<usize, ()>::new_undirected();
    let nodes: Vec<NodeIndex> = (0..candidatos.len()).map(|i| graph.add_node(i)).collect();
    for i in 0..nodes.len() {
        for j in (i + 1)..nodes.len() {
            if candidatos[i].ocupacion.se_solapa(&candidatos[j].ocupacion) {
                graph.add_edge(nodes[i], nodes[j], ());
            }
        }
    }
    graph
}

/// Para cada candidato, la mayor posición de un vecino en conflicto (None si no topa con nadie).
pub fn ultimo_conflicto(grafo: &UnGraph<usize, ()>) -> Vec<Option<usize>> {
    grafo
        .node_indices()
        .map(|n| grafo.neighbors(n).map(|v| grafo[v]).max())
        .collect()
}

/// Partición voraz del pool en cliques del grafo de conflictos (todos los
/// miembros de una clique topan entre sí). Devuelve la clique de cada candidato.
/// Un horario sin topes toma a lo más un candidato por clique.
pub fn particion_cliques(grafo: &UnGraph<usize, ()>) -> Vec<usize> {
    let mut cliques: Vec<Vec<NodeIndex>> = Vec::new();
    let mut asignada = vec![0usize; grafo.node_count()];
    for n in grafo.node_indices() {
        let destino = cliques
            .iter()
            .position(|miembros| miembros.iter().all(|&m| grafo.contains_edge(m, n)));
        let id = match destino {
            Some(id) => id,
            None => {
                cliques.push(Vec::new());
                cliques.len() - 1
            }
        };
        cliques[id].push(n);
        asignada[grafo[n]] = id;
    }
    asignada
}

/// Tabla fija día x bloque con la sigla que ocupa cada celda (capa de presentación).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TablaOcupacion {
    grilla: GrillaHoraria,
    celdas: Vec<Option<String>>,
}

impl TablaOcupacion {
    pub fn nueva(grilla: GrillaHoraria) -> Self {
        TablaOcupacion { grilla, celdas: vec![None; grilla.total_celdas()] }
    }

    /// Tabla con todos los ramos de una combinación ya ubicados.
    pub fn desde_combinacion(grilla: GrillaHoraria, combinacion: &Combinacion) -> Self {
        let mut tabla = TablaOcupacion::nueva(grilla);
        for r in &combinacion.ramos {
            for f in &r.ocupacion {
                if let Some(c) = tabla.indice(*f) {
                    tabla.celdas[c] = Some(r.sigla.clone());
                }
            }
        }
        tabla
    }

    fn indice(&self, f: Franja) -> Option<usize> {
        if f.dia < self.grilla.dias && f.bloque < self.grilla.bloques_por_dia {
            Some(self.grilla.celda(f))
        } else {
            None
        }
    }

    pub fn celda(&self, f: Franja) -> Option<&str> {
        self.indice(f).and_then(|c| self.celdas[c].as_deref())
    }

    /// Ubica una huella en la tabla. Si alguna franja ya está tomada no
    /// modifica nada y devuelve esa franja.
    pub fn colocar(&mut self, sigla: &str, ocupacion: &Ocupacion) -> Result<(), Franja> {
        for f in ocupacion.franjas() {
            match self.indice(*f) {
                Some(c) if self.celdas[c].is_none() => {}
                _ => return Err(*f),
            }
        }
        for f in ocupacion.franjas() {
            if let Some(c) = self.indice(*f) {
                self.celdas[c] = Some(sigla.to_string());
            }
        }
        Ok(())
    }

    /// Primera celda tomada en `dia` entre los bloques `desde..=hasta` (0-based),
    /// con la sigla que la ocupa. Bloques fuera de la grilla cuentan como tomados.
    pub fn rango_en_conflicto(&self, dia: u8, desde: u8, hasta: u8) -> Option<(Franja, Option<&str>)> {
        (desde..=hasta).map(|bloque| Franja { dia, bloque }).find_map(|f| match self.indice(f) {
            None => Some((f, None)),
            Some(c) => self.celdas[c].as_deref().map(|s| (f, Some(s))),
        })
    }

    /// Filas por bloque, columnas por día (el formato que usa la grilla de presentación).
    pub fn filas(&self) -> Vec<Vec<Option<String>>> {
        (0..self.grilla.bloques_por_dia)
            .map(|b| {
                (0..self.grilla.dias)
                    .map(|d| self.celda(Franja { dia: d, bloque: b }).map(str::to_string))
                    .collect()
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{BloqueCrudo, Candidato, Variante};

    fn g() -> GrillaHoraria {
        GrillaHoraria { dias: 5, bloques_por_dia: 6 }
    }

    fn cand(sigla: &str, bloques: &[(&str, u32)]) -> CandidatoOcupado {
        let horarios = vec![bloques.iter().map(|(d, b)| BloqueCrudo::new(d, *b)).collect::<Vec<_>>()];
        let ocupacion = Ocupacion::desde_horarios(sigla, &horarios, &g()).unwrap();
        CandidatoOcupado {
            candidato: Candidato {
                sigla: sigla.to_string(),
                nombre: sigla.to_string(),
                semestre: 1,
                creditos: 4,
                variante: Variante::Normal,
                horarios,
            },
            ocupacion,
        }
    }

    #[test]
    fn test_grafo_conflictos() {
        let c = vec![cand("A", &[("LU", 1)]), cand("B", &[("LU", 1)]), cand("C", &[("MA", 2)]), cand("D", &[("MA", 2), ("JU", 1)])];
        let grafo = grafo_conflictos(&c);
        assert_eq!(grafo.edge_count(), 2);
        assert_eq!(ultimo_conflicto(&grafo), vec![Some(1), Some(0), Some(3), Some(2)]);
    }

    #[test]
    fn test_particion_cliques() {
        // A, B y C topan en LU-1; D topa sólo con C; E no topa con nadie
        let c = vec![
            cand("A", &[("LU", 1)]),
            cand("B", &[("LU", 1)]),
            cand("C", &[("LU", 1), ("MA", 1)]),
            cand("D", &[("MA", 1)]),
            cand("E", &[("JU", 3)]),
        ];
        let p = particion_cliques(&grafo_conflictos(&c));
        assert_eq!(p, vec![0, 0, 0, 1, 2]);
    }

    #[test]
    fn test_tabla_colocar_y_filas() {
        let mut t = TablaOcupacion::nueva(g());
        let a = cand("A", &[("LU", 2), ("LU", 3)]);
        let b = cand("B", &[("LU", 3)]);
        assert!(t.colocar("A", &a.ocupacion).is_ok());
        assert_eq!(t.colocar("B", &b.ocupacion), Err(Franja { dia: 0, bloque: 2 }));
        assert_eq!(t.celda(Franja { dia: 0, bloque: 1 }), Some("A"));
        let filas = t.filas();
        assert_eq!(filas.len(), 6);
        assert_eq!(filas[2][0].as_deref(), Some("A"));
        assert_eq!(filas[2][1], None);
    }

    #[test]
    fn test_rango_en_conflicto() {
        let mut t = TablaOcupacion::nueva(g());
        t.colocar("A", &cand("A", &[("LU", 3), ("MI", 1)]).ocupacion).unwrap();
        assert_eq!(t.rango_en_conflicto(0, 0, 1), None);
        assert_eq!(t.rango_en_conflicto(0, 0, 4), Some((Franja { dia: 0, bloque: 2 }, Some("A"))));
        assert_eq!(t.rango_en_conflicto(1, 0, 5), None);
        // fuera de la grilla
        assert_eq!(t.rango_en_conflicto(1, 4, 7), Some((Franja { dia: 1, bloque: 6 }, None)));
        assert_eq!(t.rango_en_conflicto(5, 0, 0), Some((Franja { dia: 5, bloque: 0 }, None)));
    }
}
