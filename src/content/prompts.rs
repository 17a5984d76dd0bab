//! Prompt construction for the content generator.

use crate::funnel::FunnelStage;
use crate::profile::Profile;

use super::steps;

const UNSPECIFIED: &str = "No especificado";

fn field(value: Option<&str>) -> &str {
    match value {
        Some(v) if !v.trim().is_empty() => v,
        _ => UNSPECIFIED,
    }
}

/// Build the generation prompt for one step of the methodology.
///
/// Mirrors the structure the marketing team settled on: client data block,
/// funnel, current step and objective, expected content type, then fixed
/// instructions.
pub fn generation_prompt(
    profile: &Profile,
    funnel: FunnelStage,
    step: u8,
    content_type: &str,
) -> String {
    let objective = steps::step(step).map(|s| s.objective).unwrap_or(UNSPECIFIED);
    let challenges = if profile.challenges.is_empty() {
        "No especificados".to_string()
    } else {
        profile.challenges.join(", ")
    };

    format!(
        "Eres un experto en marketing directo siguiendo una metodología de 17 pasos.\n\
         \n\
         DATOS DEL CLIENTE:\n\
         - Nombre: {name}\n\
         - Negocio: {business}\n\
         - Industria: {industry}\n\
         - Presupuesto: {budget}\n\
         - Desafíos: {challenges}\n\
         \n\
         EMBUDO: {funnel}\n\
         PASO ACTUAL: {step}/17 - {objective}\n\
         TIPO DE CONTENIDO: {content_type}\n\
         \n\
         INSTRUCCIONES:\n\
         1. Aplica específicamente el paso {step} de la metodología\n\
         2. Personaliza para el tipo de negocio indicado\n\
         3. Mantén un tono profesional pero cercano\n\
         4. Incluye datos específicos del formulario\n\
         5. Genera contenido listo para usar\n\
         \n\
         RESULTADO ESPERADO: {content_type}",
        name = field(profile.name.as_deref()),
        business = field(profile.business_name.as_deref()),
        industry = field(profile.industry.as_deref()),
        budget = field(profile.budget.as_deref()),
        challenges = challenges,
        funnel = funnel,
        step = step,
        objective = objective,
        content_type = content_type,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompt_carries_profile_and_step() {
        let profile = Profile {
            name: Some("Ana".into()),
            business_name: Some("Panadería Sol".into()),
            budget: Some("Más de $5000".into()),
            challenges: vec!["pocas ventas".into(), "sin web".into()],
            ..Profile::default()
        };
        let prompt = generation_prompt(&profile, FunnelStage::Relationship, 8, "Lista de beneficios clave");

        assert!(prompt.contains("Panadería Sol"));
        assert!(prompt.contains("pocas ventas, sin web"));
        assert!(prompt.contains("PASO ACTUAL: 8/17 - Detallar beneficios"));
        assert!(prompt.contains("EMBUDO: relationship"));
        assert!(prompt.contains("RESULTADO ESPERADO: Lista de beneficios clave"));
    }

    #[test]
    fn empty_fields_marked_unspecified() {
        let prompt = generation_prompt(&Profile::default(), FunnelStage::Attraction, 1, "Headline");
        assert!(prompt.contains("- Nombre: No especificado"));
        assert!(prompt.contains("- Desafíos: No especificados"));
    }
}
