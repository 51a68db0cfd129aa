use std::collections::BTreeSet;
use std::time::Duration;

use quickslot::algorithm::clique::TokenCancelacion;
use quickslot::algorithm::conflict::TablaOcupacion;
use quickslot::algorithm::elegibilidad::resolver_elegibles;
use quickslot::error::{EligibilityError, HorarioError, MotivoInterrupcion};
use quickslot::models::{BloqueCrudo, EstadoEstudiante, Franja, GrillaHoraria, Prerequisito, Ramo, Variante};
use quickslot::{generar_horarios, OpcionesGeneracion, SolicitudHorario};

fn ramo(sigla: &str, sem: u32, creditos: u32, prereq: Vec<Prerequisito>, bloques: &[(&str, u32)]) -> Ramo {
    let mut r = Ramo::new(sigla, &format!("Ramo {}", sigla), sem);
    r.creditos_teoria = creditos;
    r.prerequisitos = prereq;
    r.horarios = vec![bloques.iter().map(|(d, b)| BloqueCrudo::new(d, *b)).collect()];
    r
}

fn req(s: &str) -> Prerequisito {
    Prerequisito::Ramo(s.to_string())
}

/// Malla de cuatro semestres con prerequisitos mixtos.
fn malla() -> Vec<Ramo> {
    vec![
        ramo("MAT100", 1, 6, vec![], &[("LU", 1), ("MI", 1)]),
        ramo("FIS100", 1, 6, vec![], &[("MA", 1), ("JU", 1)]),
        ramo("INF100", 1, 4, vec![], &[("VI", 1)]),
        ramo("MAT200", 2, 6, vec![req("MAT100")], &[("LU", 2), ("MI", 2)]),
        ramo("FIS200", 2, 6, vec![req("FIS100"), req("MAT100")], &[("LU", 2)]),
        ramo("INF200", 2, 4, vec![req("INF100")], &[("MA", 3)]),
        ramo("PRA300", 3, 2, vec![Prerequisito::Creditos(12)], &[("MA", 3), ("JU", 3)]),
        ramo("TES400", 4, 10, vec![req("MAT200"), Prerequisito::Creditos(12)], &[("VI", 4)]),
    ]
}

fn solicitud(aprobados: &[&str]) -> SolicitudHorario {
    SolicitudHorario {
        catalogo: malla(),
        estudiante: EstadoEstudiante {
            aprobados: aprobados.iter().map(|s| s.to_string()).collect(),
            ..EstadoEstudiante::default()
        },
        grilla: GrillaHoraria::default(),
        semestres: None,
        max_combinaciones: None,
    }
}

#[test]
fn test_elegibilidad_mixta() {
    let s = solicitud(&["MAT100", "FIS100"]);
    let r = generar_horarios(&s, &OpcionesGeneracion::default()).unwrap();
    assert_eq!(r.creditos_acumulados, 12);

    let todas: BTreeSet<&str> = r.elegibles.values().flatten().map(|s| s.as_str()).collect();
    // aprobados nunca vuelven a aparecer
    assert!(!todas.contains("MAT100"));
    assert!(!todas.contains("FIS100"));
    assert!(todas.contains("MAT200"));
    assert!(todas.contains("FIS200"));
    // numérico: 12 créditos alcanzan
    assert!(todas.contains("PRA300"));
    // INF200 necesita INF100
    assert!(!todas.contains("INF200"));
    // TES400 necesita MAT200 además de los créditos
    assert!(!todas.contains("TES400"));
}

#[test]
fn test_umbral_de_creditos_no_alcanzado() {
    let r = generar_horarios(&solicitud(&["MAT100"]), &OpcionesGeneracion::default()).unwrap();
    assert_eq!(r.creditos_acumulados, 6);
    assert!(!r.elegibles.values().flatten().any(|s| s == "PRA300"));
}

#[test]
fn test_combinaciones_sin_topes_y_ordenadas() {
    let r = generar_horarios(&solicitud(&["MAT100", "FIS100"]), &OpcionesGeneracion::default()).unwrap();
    assert!(!r.sin_soluciones());
    for c in &r.combinaciones {
        let mut vistas = BTreeSet::new();
        for ramo in &c.ramos {
            for f in &ramo.ocupacion {
                assert!(vistas.insert(*f), "franja {} repetida", f);
            }
        }
    }
    for par in r.combinaciones.windows(2) {
        assert!(par[0].tamano() >= par[1].tamano());
    }
    // MAT200 y FIS200 chocan el lunes en el bloque 2
    assert!(r.combinaciones.iter().all(|c| !(c.contiene("MAT200") && c.contiene("FIS200"))));
}

#[test]
fn test_excluidos_no_aparecen() {
    let mut s = solicitud(&["MAT100", "FIS100"]);
    s.estudiante.excluidos.insert("MAT200".to_string());
    let r = generar_horarios(&s, &OpcionesGeneracion::default()).unwrap();
    assert!(r.combinaciones.iter().all(|c| !c.contiene("MAT200")));
    // sigue listado como elegible
    assert!(r.elegibles.values().flatten().any(|s| s == "MAT200"));
}

#[test]
fn test_filtro_de_semestres() {
    let mut s = solicitud(&["MAT100", "FIS100"]);
    s.semestres = Some([3].into_iter().collect());
    let r = generar_horarios(&s, &OpcionesGeneracion::default()).unwrap();
    assert_eq!(r.combinaciones.len(), 1);
    assert_eq!(r.combinaciones[0].siglas(), vec!["PRA300"]);
}

#[test]
fn test_idempotente() {
    let s = solicitud(&["MAT100", "FIS100", "INF100"]);
    let a = generar_horarios(&s, &OpcionesGeneracion::default()).unwrap();
    let b = generar_horarios(&s, &OpcionesGeneracion::default()).unwrap();
    assert_eq!(a.combinaciones, b.combinaciones);
    assert_eq!(a.elegibles, b.elegibles);
}

#[test]
fn test_prerequisito_desconocido_sugiere() {
    let mut cat = malla();
    cat.push(ramo("LAB200", 2, 2, vec![req("MAT10")], &[]));
    let err = resolver_elegibles(&cat, &BTreeSet::new(), 0).unwrap_err();
    match err {
        EligibilityError::PrerequisitoDesconocido { ramo, prerequisito, sugerencia } => {
            assert_eq!(ramo, "LAB200");
            assert_eq!(prerequisito, "MAT10");
            assert_eq!(sugerencia.as_deref(), Some("MAT100"));
        }
        otro => panic!("error inesperado: {:?}", otro),
    }
}

#[test]
fn test_secciones_colapsadas_llevan_marcador() {
    let mut a = ramo("QUI100", 1, 4, vec![], &[("LU", 5)]);
    a.seccion = Some("A".to_string());
    let mut b = ramo("QUI100", 1, 4, vec![], &[("MA", 5)]);
    b.seccion = Some("B".to_string());
    let s = SolicitudHorario { catalogo: vec![a, b], ..solicitud(&[]) };
    let r = generar_horarios(&s, &OpcionesGeneracion::default()).unwrap();
    assert_eq!(r.combinaciones.len(), 1);
    let asignado = &r.combinaciones[0].ramos[0];
    assert_eq!(asignado.variante, Variante::SeccionAlternativa(vec!["A".into(), "B".into()]));
    assert_eq!(asignado.marcador.as_deref(), Some("A/B"));
    assert_eq!(asignado.ocupacion.len(), 2);
}

#[test]
fn test_duplicado_inconsistente_falla() {
    let a = ramo("QUI100", 1, 4, vec![], &[("LU", 5)]);
    let b = ramo("QUI100", 1, 6, vec![], &[("MA", 5)]);
    let s = SolicitudHorario { catalogo: vec![a, b], ..solicitud(&[]) };
    let err = generar_horarios(&s, &OpcionesGeneracion::default()).unwrap_err();
    assert!(matches!(err, HorarioError::Elegibilidad(EligibilityError::DuplicadoInconsistente { .. })));
}

/// Catálogo de `n` pares que chocan dentro de su día: 2^n combinaciones maximales.
fn catalogo_explosivo(n: u32) -> Vec<Ramo> {
    let mut cat = Vec::new();
    for i in 0..n {
        let dia = ["LU", "MA", "MI", "JU", "VI", "SA"][(i % 6) as usize];
        let bloque = i / 6 + 1;
        cat.push(ramo(&format!("X{:02}", i), 1, 2, vec![], &[(dia, bloque)]));
        cat.push(ramo(&format!("Y{:02}", i), 1, 2, vec![], &[(dia, bloque)]));
    }
    cat
}

#[test]
fn test_presupuesto_de_pasos_avisa() {
    let s = SolicitudHorario { catalogo: catalogo_explosivo(20), ..solicitud(&[]) };
    let opciones = OpcionesGeneracion {
        limite_generacion: usize::MAX,
        max_pasos: Some(100),
        ..OpcionesGeneracion::default()
    };
    let r = generar_horarios(&s, &opciones).unwrap();
    let aviso = r.advertencia.expect("debe avisar que la búsqueda se cortó");
    assert_eq!(aviso.motivo, MotivoInterrupcion::PresupuestoPasos);
    assert!(r.combinaciones.len() <= 50);
}

#[test]
fn test_cancelacion_antes_de_empezar() {
    let token = TokenCancelacion::new();
    token.cancelar();
    let s = SolicitudHorario { catalogo: catalogo_explosivo(6), ..solicitud(&[]) };
    let opciones = OpcionesGeneracion { cancelacion: Some(token), ..OpcionesGeneracion::default() };
    let r = generar_horarios(&s, &opciones).unwrap();
    assert_eq!(r.advertencia.map(|a| a.motivo), Some(MotivoInterrupcion::Cancelado));
    assert!(r.combinaciones.is_empty());
}

#[test]
fn test_plazo_vencido() {
    let s = SolicitudHorario { catalogo: catalogo_explosivo(6), ..solicitud(&[]) };
    let opciones = OpcionesGeneracion { plazo: Some(Duration::ZERO), ..OpcionesGeneracion::default() };
    let r = generar_horarios(&s, &opciones).unwrap();
    assert_eq!(r.advertencia.map(|a| a.motivo), Some(MotivoInterrupcion::Plazo));
}

#[test]
fn test_tope_por_defecto_cincuenta() {
    let s = SolicitudHorario { catalogo: catalogo_explosivo(8), ..solicitud(&[]) };
    let r = generar_horarios(&s, &OpcionesGeneracion::default()).unwrap();
    assert_eq!(r.combinaciones.len(), 50);
    assert!(r.combinaciones.iter().all(|c| c.tamano() == 8));
    assert!(r.advertencia.is_none());
}

#[test]
fn test_secciones_paralelas_misma_hora() {
    // dos secciones del mismo ramo en el mismo horario no lo dejan fuera
    let mut a = ramo("QUI100", 1, 4, vec![], &[("LU", 1), ("MI", 1)]);
    a.seccion = Some("A".to_string());
    let mut b = a.clone();
    b.seccion = Some("B".to_string());
    let c = ramo("BIO100", 1, 4, vec![], &[("MA", 2)]);
    let s = SolicitudHorario { catalogo: vec![a, b, c], ..solicitud(&[]) };
    let r = generar_horarios(&s, &OpcionesGeneracion::default()).unwrap();
    assert!(r.descartados.is_empty());
    assert_eq!(r.combinaciones.len(), 1);
    assert_eq!(r.combinaciones[0].siglas(), vec!["QUI100", "BIO100"]);
    assert_eq!(r.combinaciones[0].ramos[0].ocupacion.len(), 2);
}

/// Z ocupa LU-1..3 y choca con W1, W2, W3 (uno por bloque); además 11 pares en conflicto.
/// Hay 2048 horarios de 12 ramos con Z y 2048 de 14 ramos con W1..W3.
fn catalogo_con_grandes_al_final() -> Vec<Ramo> {
    let mut cat = vec![ramo("Z", 1, 2, vec![], &[("LU", 1), ("LU", 2), ("LU", 3)])];
    for b in 1..=3u32 {
        cat.push(ramo(&format!("W{}", b), 1, 2, vec![], &[("LU", b)]));
    }
    for i in 0..11u32 {
        let dia = ["MA", "MI", "JU", "VI", "SA"][(i % 5) as usize];
        let bloque = i / 5 + 1;
        cat.push(ramo(&format!("P{:02}", i), 1, 2, vec![], &[(dia, bloque)]));
        cat.push(ramo(&format!("Q{:02}", i), 1, 2, vec![], &[(dia, bloque)]));
    }
    cat
}

#[test]
fn test_tope_de_generacion_conserva_los_mas_grandes() {
    let s = SolicitudHorario { catalogo: catalogo_con_grandes_al_final(), ..solicitud(&[]) };
    let r = generar_horarios(&s, &OpcionesGeneracion::default()).unwrap();
    assert_eq!(r.combinaciones.len(), 50);
    assert!(r.combinaciones.iter().all(|c| c.tamano() == 14));
    assert!(r.combinaciones.iter().all(|c| !c.contiene("Z")));
    assert!(r.advertencia.is_none());

    let sin_tope = OpcionesGeneracion { limite_generacion: usize::MAX, ..OpcionesGeneracion::default() };
    let r2 = generar_horarios(&s, &sin_tope).unwrap();
    assert_eq!(r.combinaciones, r2.combinaciones);
}

#[test]
fn test_tabla_desde_combinacion() {
    let r = generar_horarios(&solicitud(&["MAT100", "FIS100"]), &OpcionesGeneracion::default()).unwrap();
    let grilla = GrillaHoraria::default();
    for c in &r.combinaciones {
        let tabla = TablaOcupacion::desde_combinacion(grilla, c);
        for ramo in &c.ramos {
            for f in &ramo.ocupacion {
                assert_eq!(tabla.celda(*f), Some(ramo.sigla.as_str()));
            }
        }
        let filas = tabla.filas();
        assert_eq!(filas.len(), grilla.bloques_por_dia as usize);
        let ocupadas = filas.iter().flatten().filter(|x| x.is_some()).count();
        assert_eq!(ocupadas, c.ramos.iter().map(|r| r.ocupacion.len()).sum::<usize>());
    }
    let con_pra = r.combinaciones.iter().find(|c| c.contiene("PRA300")).expect("PRA300 es elegible");
    let tabla = TablaOcupacion::desde_combinacion(grilla, con_pra);
    assert_eq!(tabla.celda(Franja { dia: 1, bloque: 2 }), Some("PRA300"));
}
