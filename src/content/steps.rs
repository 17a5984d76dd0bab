//! Step catalog — the 17 fixed stages of the direct-response copywriting
//! methodology, each with an objective label and a default content type.

/// Total number of wizard steps.
pub const STEP_COUNT: u8 = 17;

/// One stage of the methodology.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepInfo {
    pub number: u8,
    /// Objective of the step, e.g. "Detallar beneficios".
    pub objective: &'static str,
    /// Default content-type description fed to the generator.
    pub content_type: &'static str,
}

static STEPS: [StepInfo; STEP_COUNT as usize] = [
    StepInfo {
        number: 1,
        objective: "Dirigirse a la audiencia",
        content_type: "Mensaje de apertura dirigido a la audiencia ideal",
    },
    StepInfo {
        number: 2,
        objective: "Demandar atención con gran promesa",
        content_type: "Gran promesa que capture la atención",
    },
    StepInfo {
        number: 3,
        objective: "Respaldar la promesa",
        content_type: "Argumentos y datos que respalden la promesa",
    },
    StepInfo {
        number: 4,
        objective: "Crear intriga irresistible",
        content_type: "Texto de intriga irresistible",
    },
    StepInfo {
        number: 5,
        objective: "Iluminar el problema",
        content_type: "Descripción del problema principal del cliente",
    },
    StepInfo {
        number: 6,
        objective: "Proporcionar la solución",
        content_type: "Presentación de la solución propuesta",
    },
    StepInfo {
        number: 7,
        objective: "Mostrar credenciales",
        content_type: "Credenciales y autoridad del negocio",
    },
    StepInfo {
        number: 8,
        objective: "Detallar beneficios",
        content_type: "Lista de beneficios clave",
    },
    StepInfo {
        number: 9,
        objective: "Prueba social",
        content_type: "Testimonios y prueba social",
    },
    StepInfo {
        number: 10,
        objective: "Hacer oferta irresistible",
        content_type: "Oferta irresistible",
    },
    StepInfo {
        number: 11,
        objective: "Agregar bonos",
        content_type: "Bonos adicionales que aumenten el valor",
    },
    StepInfo {
        number: 12,
        objective: "Apilar el valor",
        content_type: "Resumen del valor acumulado de la oferta",
    },
    StepInfo {
        number: 13,
        objective: "Revelar precio",
        content_type: "Revelación y justificación del precio",
    },
    StepInfo {
        number: 14,
        objective: "Inyectar escasez",
        content_type: "Mensaje de escasez y urgencia",
    },
    StepInfo {
        number: 15,
        objective: "Dar garantía poderosa",
        content_type: "Garantía poderosa que elimine el riesgo",
    },
    StepInfo {
        number: 16,
        objective: "Llamada a la acción",
        content_type: "Llamada a la acción clara y directa",
    },
    StepInfo {
        number: 17,
        objective: "Cerrar con P.S.",
        content_type: "Posdata de cierre con último incentivo",
    },
];

/// Look up a step by number. Returns `None` outside 1–17.
pub fn step(number: u8) -> Option<&'static StepInfo> {
    if (1..=STEP_COUNT).contains(&number) {
        Some(&STEPS[(number - 1) as usize])
    } else {
        None
    }
}

/// Whether a (possibly client-supplied) step number is in range.
pub fn is_valid_step(number: i64) -> bool {
    (1..=STEP_COUNT as i64).contains(&number)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_steps_resolvable() {
        for n in 1..=STEP_COUNT {
            let info = step(n).unwrap();
            assert_eq!(info.number, n);
            assert!(!info.objective.is_empty());
            assert!(!info.content_type.is_empty());
        }
    }

    #[test]
    fn out_of_range_is_none() {
        assert!(step(0).is_none());
        assert!(step(18).is_none());
        assert!(!is_valid_step(0));
        assert!(!is_valid_step(18));
        assert!(!is_valid_step(-3));
        assert!(is_valid_step(1));
        assert!(is_valid_step(17));
    }

    #[test]
    fn step_eight_lists_benefits() {
        assert_eq!(step(8).unwrap().objective, "Detallar beneficios");
        assert!(step(8).unwrap().content_type.contains("beneficios"));
    }
}
