// Configuración del servidor desde variables de entorno (y `.env` si existe).
use std::env;
use std::str::FromStr;
use std::time::Duration;

use crate::algorithm::generador::OpcionesGeneracion;
use crate::algorithm::ranking::MAX_COMBINACIONES;
use crate::error::HorarioError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub bind: String,
    pub workers: usize,
    pub max_combinaciones: usize,
    pub limite_generacion: usize,
    pub max_pasos: u64,
    /// Plazo por solicitud. 0 desactiva el plazo.
    pub plazo_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            bind: "127.0.0.1:8080".to_string(),
            workers: num_cpus::get().max(1),
            max_combinaciones: MAX_COMBINACIONES,
            limite_generacion: 2000,
            max_pasos: 5_000_000,
            plazo_ms: 2000,
        }
    }
}

fn load_dotenv() {
    let _ = dotenv::dotenv();
}

fn leer<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    clave: &str,
    defecto: T,
) -> Result<T, HorarioError> {
    match lookup(clave) {
        Some(v) if !v.trim().is_empty() => v
            .trim()
            .parse::<T>()
            .map_err(|_| HorarioError::Configuracion(format!("{}='{}' no es un valor válido", clave, v))),
        _ => Ok(defecto),
    }
}

impl Config {
    pub fn from_env() -> Result<Config, HorarioError> {
        load_dotenv();
        Config::from_lookup(|k| env::var(k).ok())
    }

    /// Igual que `from_env` pero con una fuente de variables arbitraria.
    pub fn from_lookup<F>(lookup: F) -> Result<Config, HorarioError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let d = Config::default();
        let cfg = Config {
            bind: lookup("QUICKSLOT_BIND").filter(|s| !s.trim().is_empty()).unwrap_or(d.bind),
            workers: leer(&lookup, "QUICKSLOT_WORKERS", d.workers)?,
            max_combinaciones: leer(&lookup, "QUICKSLOT_MAX_COMBINACIONES", d.max_combinaciones)?,
            limite_generacion: leer(&lookup, "QUICKSLOT_LIMITE_GENERACION", d.limite_generacion)?,
            max_pasos: leer(&lookup, "QUICKSLOT_MAX_PASOS", d.max_pasos)?,
            plazo_ms: leer(&lookup, "QUICKSLOT_PLAZO_MS", d.plazo_ms)?,
        };
        if cfg.workers == 0 {
            return Err(HorarioError::Configuracion("QUICKSLOT_WORKERS debe ser mayor que 0".to_string()));
        }
        if cfg.max_combinaciones == 0 {
            return Err(HorarioError::Configuracion("QUICKSLOT_MAX_COMBINACIONES debe ser mayor que 0".to_string()));
        }
        Ok(cfg)
    }

    pub fn opciones_generacion(&self) -> OpcionesGeneracion {
        OpcionesGeneracion {
            max_combinaciones: self.max_combinaciones,
            limite_generacion: self.limite_generacion,
            max_pasos: Some(self.max_pasos),
            plazo: (self.plazo_ms > 0).then(|| Duration::from_millis(self.plazo_ms)),
            cancelacion: None,
        }
    }
}
