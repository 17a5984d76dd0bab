//! Structured landing-page copy: section keys, the copy document, and the
//! fixed section tables driven through the generator.

use std::collections::BTreeMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Closed set of landing-page sections.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum SectionKey {
    Headline,
    Subheadline,
    OpeningParagraph,
    Benefits,
    ProblemSolution,
    Features,
    Applications,
    Testimonials,
    Offer,
    Cta,
    Faq,
    Urgency,
    Guarantee,
    Seo,
}

impl SectionKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Headline => "headline",
            Self::Subheadline => "subheadline",
            Self::OpeningParagraph => "opening_paragraph",
            Self::Benefits => "benefits",
            Self::ProblemSolution => "problem_solution",
            Self::Features => "features",
            Self::Applications => "applications",
            Self::Testimonials => "testimonials",
            Self::Offer => "offer",
            Self::Cta => "cta",
            Self::Faq => "faq",
            Self::Urgency => "urgency",
            Self::Guarantee => "guarantee",
            Self::Seo => "seo",
        }
    }
}

impl std::fmt::Display for SectionKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Sections that must be filled for the copy to count as complete.
pub const REQUIRED_SECTIONS: [SectionKey; 5] = [
    SectionKey::Headline,
    SectionKey::Subheadline,
    SectionKey::Benefits,
    SectionKey::Offer,
    SectionKey::Cta,
];

/// The structured copy for a landing page.
///
/// Missing keys read as empty text; an unrecoverable section is stored as
/// an empty string rather than dropped.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CopyDocument {
    sections: BTreeMap<SectionKey, String>,
}

impl CopyDocument {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, key: SectionKey, text: String) {
        self.sections.insert(key, text);
    }

    /// Text for a section; empty if absent.
    pub fn text(&self, key: SectionKey) -> &str {
        self.sections.get(&key).map(String::as_str).unwrap_or("")
    }

    /// Whether a section has non-whitespace content.
    pub fn is_filled(&self, key: SectionKey) -> bool {
        !self.text(key).trim().is_empty()
    }
}

/// One planned section: key plus the (step, content type) pair fed to the
/// generator.
#[derive(Debug, Clone, Copy)]
pub struct SectionSpec {
    pub key: SectionKey,
    pub step: u8,
    pub content_type: &'static str,
}

/// Which variant of the landing page to assemble.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SectionSet {
    /// The five required sections only.
    Minimal,
    /// The full fourteen-section landing page.
    Full,
}

impl SectionSet {
    /// Sections in generation order.
    pub fn sections(&self) -> &'static [SectionSpec] {
        match self {
            SectionSet::Minimal => MINIMAL_SECTIONS,
            SectionSet::Full => FULL_SECTIONS,
        }
    }

    /// Mandatory pause after each generation call. The smaller minimal set
    /// uses a longer pause; both exist to respect provider rate limits.
    pub fn pace(&self) -> Duration {
        match self {
            SectionSet::Minimal => Duration::from_millis(700),
            SectionSet::Full => Duration::from_millis(400),
        }
    }
}

static MINIMAL_SECTIONS: &[SectionSpec] = &[
    SectionSpec { key: SectionKey::Headline, step: 1, content_type: "Headline principal para landing page" },
    SectionSpec { key: SectionKey::Subheadline, step: 2, content_type: "Subheadline persuasivo para landing page" },
    SectionSpec { key: SectionKey::Benefits, step: 8, content_type: "Lista de 5-6 beneficios clave en bullets" },
    SectionSpec { key: SectionKey::Offer, step: 10, content_type: "Oferta irresistible y bonos" },
    SectionSpec { key: SectionKey::Cta, step: 16, content_type: "Llamada a la acción clara y directa" },
];

static FULL_SECTIONS: &[SectionSpec] = &[
    SectionSpec { key: SectionKey::Headline, step: 1, content_type: "Headline principal para landing page" },
    SectionSpec { key: SectionKey::Subheadline, step: 2, content_type: "Subheadline persuasivo para landing page" },
    SectionSpec { key: SectionKey::OpeningParagraph, step: 3, content_type: "Párrafo de apertura que conecte con el dolor del cliente" },
    SectionSpec { key: SectionKey::Benefits, step: 8, content_type: "Lista de 5-6 beneficios clave en bullets" },
    SectionSpec { key: SectionKey::ProblemSolution, step: 5, content_type: "Sección problema-solución" },
    SectionSpec { key: SectionKey::Features, step: 6, content_type: "Lista de características técnicas principales" },
    SectionSpec { key: SectionKey::Applications, step: 8, content_type: "Lista de aplicaciones o usos recomendados" },
    SectionSpec { key: SectionKey::Testimonials, step: 9, content_type: "2 testimonios de clientes simulados" },
    SectionSpec { key: SectionKey::Offer, step: 10, content_type: "Oferta irresistible y bonos" },
    SectionSpec { key: SectionKey::Cta, step: 16, content_type: "Llamada a la acción clara y directa" },
    SectionSpec { key: SectionKey::Faq, step: 13, content_type: "3-5 preguntas frecuentes con respuesta breve" },
    SectionSpec { key: SectionKey::Urgency, step: 14, content_type: "Sección de urgencia y escasez" },
    SectionSpec { key: SectionKey::Guarantee, step: 15, content_type: "Sección de garantías y confianza" },
    SectionSpec { key: SectionKey::Seo, step: 1, content_type: "Título SEO, meta descripción y palabras clave para la landing" },
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn required_sections_present_in_both_sets() {
        for set in [SectionSet::Minimal, SectionSet::Full] {
            for required in REQUIRED_SECTIONS {
                assert!(
                    set.sections().iter().any(|s| s.key == required),
                    "{required} missing from {set:?}"
                );
            }
        }
    }

    #[test]
    fn set_sizes() {
        assert_eq!(SectionSet::Minimal.sections().len(), 5);
        assert_eq!(SectionSet::Full.sections().len(), 14);
    }

    #[test]
    fn document_reads_empty_for_missing_keys() {
        let doc = CopyDocument::new();
        assert_eq!(doc.text(SectionKey::Headline), "");
        assert!(!doc.is_filled(SectionKey::Headline));
    }

    #[test]
    fn whitespace_only_is_not_filled() {
        let mut doc = CopyDocument::new();
        doc.set(SectionKey::Offer, "   \n ".to_string());
        assert!(!doc.is_filled(SectionKey::Offer));
    }

    #[test]
    fn snake_case_wire_keys() {
        let mut doc = CopyDocument::new();
        doc.set(SectionKey::OpeningParagraph, "hola".to_string());
        let json = serde_json::to_string(&doc).unwrap();
        assert_eq!(json, r#"{"opening_paragraph":"hola"}"#);

        let parsed: CopyDocument = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.text(SectionKey::OpeningParagraph), "hola");
    }
}
