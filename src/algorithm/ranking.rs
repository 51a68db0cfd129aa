// ranking.rs - Orden y tope de las combinaciones generadas.
use crate::algorithm::clique::Seleccion;

/// Tope de combinaciones entregadas al usuario.
pub const MAX_COMBINACIONES: usize = 50;

/// Cómo llegan las combinaciones desde el generador.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrdenEmision {
    /// Cada combinación tiene a lo más tantos ramos como la anterior:
    /// basta con tomar las primeras `tope`.
    TamanoNoCreciente,
    /// Hay que consumir todo y ordenar antes de cortar.
    Arbitrario,
}

/// Ordena por cantidad de ramos (descendente, empates por orden de llegada)
/// y corta en `tope`.
pub fn rankear<I>(combinaciones: I, orden: OrdenEmision, tope: usize) -> Vec<Seleccion>
where
    I: Iterator<Item = Seleccion>,
{
    match orden {
        OrdenEmision::TamanoNoCreciente => combinaciones.take(tope).collect(),
        OrdenEmision::Arbitrario => {
            let mut todas: Vec<Seleccion> = combinaciones.collect();
            // sort_by es estable: conserva el orden de llegada en empates
            todas.sort_by(|a, b| b.len().cmp(&a.len()));
            todas.truncate(tope);
            todas
        }
    }
}
