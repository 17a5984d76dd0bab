//! Copy assembler — drives the landing-page sections through the generator
//! with mandatory pacing and bounded per-section retry.

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::content::ContentGenerator;
use crate::funnel::FunnelStage;
use crate::profile::Profile;

use super::copy::{CopyDocument, SectionKey, SectionSet, SectionSpec, REQUIRED_SECTIONS};

/// Maximum retry sweeps over the missing sections after the first pass.
/// Each section is therefore attempted at most 1 + MAX_RETRY_SWEEPS times.
pub const MAX_RETRY_SWEEPS: u32 = 2;

/// Result of an assembly run.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssembledCopy {
    pub copy: CopyDocument,
    /// Required sections still empty after exhausting retries. The caller
    /// decides whether to surface an error or accept the partial copy.
    pub missing_sections: Vec<SectionKey>,
}

impl AssembledCopy {
    pub fn is_complete(&self) -> bool {
        self.missing_sections.is_empty()
    }
}

/// Sequential batch generator for landing-page copy.
///
/// Calls are strictly sequential by design: the mandatory inter-call pause
/// is a fixed throttle for the provider's rate limits, not adaptive backoff.
pub struct CopyAssembler {
    generator: Arc<dyn ContentGenerator>,
    /// Overrides the section set's pacing when set (tests pass zero).
    pace_override: Option<Duration>,
}

impl CopyAssembler {
    pub fn new(generator: Arc<dyn ContentGenerator>) -> Self {
        Self {
            generator,
            pace_override: None,
        }
    }

    /// Replace the per-set pacing delay.
    pub fn with_pace(mut self, pace: Duration) -> Self {
        self.pace_override = Some(pace);
        self
    }

    /// Assemble the copy document for a profile.
    ///
    /// First pass generates every section of the set; afterwards only the
    /// still-missing required sections are retried, so no redundant external
    /// calls are made.
    pub async fn assemble(
        &self,
        profile: &Profile,
        funnel: FunnelStage,
        set: SectionSet,
    ) -> AssembledCopy {
        let pace = self.pace_override.unwrap_or_else(|| set.pace());
        let mut copy = CopyDocument::new();

        for spec in set.sections() {
            self.generate_section(&mut copy, profile, funnel, spec).await;
            pause(pace).await;
        }

        let mut sweeps = 0;
        loop {
            let missing = missing_required(&copy);
            if missing.is_empty() || sweeps >= MAX_RETRY_SWEEPS {
                if !missing.is_empty() {
                    warn!(?missing, "Assembly incomplete after retries");
                }
                info!(
                    sections = set.sections().len(),
                    missing = missing.len(),
                    sweeps,
                    "Copy assembly finished"
                );
                return AssembledCopy {
                    copy,
                    missing_sections: missing,
                };
            }

            debug!(sweep = sweeps + 1, ?missing, "Retrying missing sections");
            for spec in set.sections().iter().filter(|s| missing.contains(&s.key)) {
                self.generate_section(&mut copy, profile, funnel, spec).await;
                pause(pace).await;
            }
            sweeps += 1;
        }
    }

    async fn generate_section(
        &self,
        copy: &mut CopyDocument,
        profile: &Profile,
        funnel: FunnelStage,
        spec: &SectionSpec,
    ) {
        match self
            .generator
            .generate(profile, funnel, spec.step, spec.content_type)
            .await
        {
            Ok(text) => copy.set(spec.key, text),
            Err(e) => {
                warn!(section = %spec.key, error = %e, "Section generation failed");
                copy.set(spec.key, String::new());
            }
        }
    }
}

/// Required sections that are still empty or whitespace-only.
fn missing_required(copy: &CopyDocument) -> Vec<SectionKey> {
    REQUIRED_SECTIONS
        .iter()
        .copied()
        .filter(|&key| !copy.is_filled(key))
        .collect()
}

async fn pause(pace: Duration) {
    if !pace.is_zero() {
        tokio::time::sleep(pace).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::Mutex;

    use crate::error::LlmError;

    /// Fake generator that fails for configured content types and counts
    /// attempts per content type.
    struct FlakyGenerator {
        fail_for: Vec<&'static str>,
        attempts: Mutex<HashMap<String, u32>>,
    }

    impl FlakyGenerator {
        fn new(fail_for: Vec<&'static str>) -> Self {
            Self {
                fail_for,
                attempts: Mutex::new(HashMap::new()),
            }
        }

        fn attempts_for(&self, content_type: &str) -> u32 {
            self.attempts
                .lock()
                .unwrap()
                .get(content_type)
                .copied()
                .unwrap_or(0)
        }
    }

    #[async_trait]
    impl ContentGenerator for FlakyGenerator {
        async fn generate(
            &self,
            _profile: &Profile,
            _funnel: FunnelStage,
            _step: u8,
            content_type: &str,
        ) -> Result<String, LlmError> {
            *self
                .attempts
                .lock()
                .unwrap()
                .entry(content_type.to_string())
                .or_insert(0) += 1;
            if self.fail_for.contains(&content_type) {
                return Err(LlmError::RequestFailed {
                    reason: "quota exceeded".to_string(),
                });
            }
            Ok("texto generado con longitud suficiente".to_string())
        }
    }

    fn assembler(generator: &Arc<FlakyGenerator>) -> CopyAssembler {
        let dyn_generator: Arc<dyn ContentGenerator> = Arc::clone(generator) as _;
        CopyAssembler::new(dyn_generator).with_pace(Duration::ZERO)
    }

    #[tokio::test]
    async fn clean_run_fills_everything_in_one_pass() {
        let generator = Arc::new(FlakyGenerator::new(vec![]));
        let result = assembler(&generator)
            .assemble(&Profile::default(), FunnelStage::Attraction, SectionSet::Minimal)
            .await;

        assert!(result.is_complete());
        for key in REQUIRED_SECTIONS {
            assert!(result.copy.is_filled(key), "{key} should be filled");
        }
        // Exactly one attempt per section.
        for spec in SectionSet::Minimal.sections() {
            assert_eq!(generator.attempts_for(spec.content_type), 1);
        }
    }

    #[tokio::test]
    async fn persistent_failure_caps_at_three_attempts_per_section() {
        let generator = Arc::new(FlakyGenerator::new(vec!["Oferta irresistible y bonos"]));
        let result = assembler(&generator)
            .assemble(&Profile::default(), FunnelStage::Conversion, SectionSet::Minimal)
            .await;

        assert_eq!(result.missing_sections, vec![SectionKey::Offer]);
        assert_eq!(generator.attempts_for("Oferta irresistible y bonos"), 3);
        // Healthy sections are never re-attempted.
        assert_eq!(
            generator.attempts_for("Headline principal para landing page"),
            1
        );
        // The failed section is stored as empty text, not dropped.
        assert_eq!(result.copy.text(SectionKey::Offer), "");
    }

    #[tokio::test]
    async fn optional_full_set_sections_are_not_retried() {
        // faq is not required: one failed attempt, no retries, not missing.
        let generator = Arc::new(FlakyGenerator::new(vec![
            "3-5 preguntas frecuentes con respuesta breve",
        ]));
        let result = assembler(&generator)
            .assemble(&Profile::default(), FunnelStage::Relationship, SectionSet::Full)
            .await;

        assert!(result.is_complete());
        assert_eq!(
            generator.attempts_for("3-5 preguntas frecuentes con respuesta breve"),
            1
        );
        assert!(!result.copy.is_filled(SectionKey::Faq));
    }

    #[tokio::test]
    async fn missing_is_empty_iff_all_required_filled() {
        let generator = Arc::new(FlakyGenerator::new(vec![
            "Subheadline persuasivo para landing page",
            "Llamada a la acción clara y directa",
        ]));
        let result = assembler(&generator)
            .assemble(&Profile::default(), FunnelStage::Attraction, SectionSet::Minimal)
            .await;

        assert!(!result.is_complete());
        assert_eq!(
            result.missing_sections,
            vec![SectionKey::Subheadline, SectionKey::Cta]
        );
    }
}
