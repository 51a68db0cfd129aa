// Motor de horarios: elegibilidad -> pool -> ocupación -> enumeración -> ranking.
// Declarar submódulos (archivos en la carpeta `src/algorithm`)
pub mod candidatos;
pub mod clique;
pub mod conflict;
pub mod elegibilidad;
pub mod generador;
pub mod ocupacion;
pub mod ranking;

// Reexportar la API pública del motor
pub use crate::algorithm::clique::{Enumerador, LimitesBusqueda, Seleccion, TokenCancelacion};
pub use crate::algorithm::generador::{generar_horarios, generar_lote, OpcionesGeneracion, ResultadoGeneracion};
pub use crate::algorithm::ranking::{OrdenEmision, MAX_COMBINACIONES};
