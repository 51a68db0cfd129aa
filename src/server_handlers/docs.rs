use actix_web::{HttpResponse, Responder};
use serde_json::json;

use crate::api_json::SolicitudHorario;
use crate::models::{BloqueCrudo, EstadoEstudiante, GrillaHoraria, Prerequisito, Ramo};

fn ejemplo() -> SolicitudHorario {
    let mut calculo = Ramo::new("MAT100", "Cálculo I", 1);
    calculo.creditos_teoria = 4;
    calculo.creditos_practica = 2;
    calculo.horarios = vec![vec![BloqueCrudo::new("LU", 1), BloqueCrudo::new("MI", 1)]];

    let mut calculo2 = Ramo::new("MAT200", "Cálculo II", 2);
    calculo2.creditos_teoria = 6;
    calculo2.prerequisitos = vec![Prerequisito::Ramo("MAT100".to_string())];
    calculo2.horarios = vec![vec![BloqueCrudo::new("MA", 2), BloqueCrudo::new("JU", 2)]];

    let mut taller = Ramo::new("TAL200", "Taller de Proyecto", 2);
    taller.creditos_practica = 4;
    taller.prerequisitos = vec![Prerequisito::Creditos(6)];
    taller.horarios = vec![vec![BloqueCrudo::new("MA", 2)]];

    let mut estudiante = EstadoEstudiante::default();
    estudiante.aprobados.insert("MAT100".to_string());

    SolicitudHorario {
        catalogo: vec![calculo, calculo2, taller],
        estudiante,
        grilla: GrillaHoraria::default(),
        semestres: None,
        max_combinaciones: Some(10),
    }
}

pub async fn help_handler() -> impl Responder {
    let help = json!({
        "description": "API para generar combinaciones de ramos sin topes de horario. POST /solve recibe el catálogo, el estado del estudiante y la grilla; responde con las combinaciones maximales ordenadas por cantidad de ramos.",
        "post_example": ejemplo(),
        "endpoints": {
            "POST /solve": "una solicitud -> combinaciones",
            "POST /solve/lote": "arreglo de solicitudes independientes -> un resultado por elemento",
            "POST /elegibles": "solo la etapa de elegibilidad (ramos desbloqueados por semestre)",
            "GET /health": "estado del servicio"
        },
        "note": "Las entradas de 'aprobados', 'excluidos' y 'electivos_elegidos' que no coinciden con una sigla se buscan por nombre del ramo (sin tildes ni mayúsculas).",
        "dias": crate::models::DIAS
    });

    HttpResponse::Ok().json(help)
}

pub async fn health_handler() -> impl Responder {
    HttpResponse::Ok().json(json!({"status": "ok", "version": env!("CARGO_PKG_VERSION")}))
}
