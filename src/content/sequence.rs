//! Email sequence plans and generation.
//!
//! Each funnel has a fixed plan of (step, content type) pairs. The builder
//! drives the generator sequentially with the same pacing discipline as the
//! copy assembler; a failed email records empty content rather than aborting
//! the sequence.

use std::sync::Arc;
use std::time::Duration;

use tracing::warn;

use crate::crm::model::SequenceEmail;
use crate::funnel::FunnelStage;
use crate::profile::Profile;

use super::generator::ContentGenerator;

/// Pause between sequence generation calls.
pub const SEQUENCE_PACE: Duration = Duration::from_millis(400);

/// One planned email: methodology step plus content-type label.
#[derive(Debug, Clone, Copy)]
pub struct PlannedEmail {
    pub step: u8,
    pub content_type: &'static str,
}

/// The fixed sequence plan for a funnel.
pub fn sequence_plan(funnel: FunnelStage) -> &'static [PlannedEmail] {
    match funnel {
        FunnelStage::Attraction => &[
            PlannedEmail { step: 1, content_type: "Email 1 - Introducción y Valor" },
            PlannedEmail { step: 5, content_type: "Email 2 - Educación y Conexión" },
            PlannedEmail { step: 16, content_type: "Email 3 - Acción y Compromiso" },
        ],
        FunnelStage::Conversion => &[
            PlannedEmail { step: 7, content_type: "Email 1 - Destacando Valor Único" },
            PlannedEmail { step: 10, content_type: "Email 2 - Simplificando Proceso" },
            PlannedEmail { step: 14, content_type: "Email 3 - Creando Urgencia" },
            PlannedEmail { step: 16, content_type: "Email 4 - Eliminación de Dudas" },
        ],
        FunnelStage::Relationship => &[
            PlannedEmail { step: 1, content_type: "Email 1 - Bienvenida + Video" },
            PlannedEmail { step: 3, content_type: "Email 2 - Confirmación y Preparación" },
            PlannedEmail { step: 14, content_type: "Email 3 - Recordatorio de Chat" },
            PlannedEmail { step: 8, content_type: "Email 4 - Preparación Adicional" },
            PlannedEmail { step: 16, content_type: "Email 5 - CTA Final" },
        ],
    }
}

/// Generate the full email sequence for a funnel.
///
/// Calls are strictly sequential; `pace` is inserted after each call to
/// respect the provider's rate limits (pass `Duration::ZERO` in tests).
pub async fn build_sequence(
    generator: &Arc<dyn ContentGenerator>,
    profile: &Profile,
    funnel: FunnelStage,
    pace: Duration,
) -> Vec<SequenceEmail> {
    let plan = sequence_plan(funnel);
    let mut emails = Vec::with_capacity(plan.len());

    for (index, planned) in plan.iter().enumerate() {
        let number = (index + 1) as u32;
        let content = match generator
            .generate(profile, funnel, planned.step, planned.content_type)
            .await
        {
            Ok(text) => text,
            Err(e) => {
                warn!(
                    email_number = number,
                    step = planned.step,
                    error = %e,
                    "Sequence email generation failed"
                );
                String::new()
            }
        };

        emails.push(SequenceEmail {
            email_number: number,
            subject: format!("Email {number} - {funnel}"),
            content,
            step: planned.step,
            content_type: planned.content_type.to_string(),
            sent_at: None,
            opened: false,
            clicked: false,
        });

        if !pace.is_zero() {
            tokio::time::sleep(pace).await;
        }
    }

    emails
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use crate::error::LlmError;

    struct CountingGenerator {
        calls: AtomicUsize,
        fail_on: Option<u8>,
    }

    #[async_trait]
    impl ContentGenerator for CountingGenerator {
        async fn generate(
            &self,
            _profile: &Profile,
            _funnel: FunnelStage,
            step: u8,
            _content_type: &str,
        ) -> Result<String, LlmError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail_on == Some(step) {
                return Err(LlmError::RequestFailed {
                    reason: "quota".to_string(),
                });
            }
            Ok(format!("contenido generado para el paso {step}"))
        }
    }

    #[test]
    fn plan_sizes_match_funnels() {
        assert_eq!(sequence_plan(FunnelStage::Attraction).len(), 3);
        assert_eq!(sequence_plan(FunnelStage::Conversion).len(), 4);
        assert_eq!(sequence_plan(FunnelStage::Relationship).len(), 5);
    }

    #[test]
    fn plans_end_with_call_to_action() {
        for funnel in [
            FunnelStage::Attraction,
            FunnelStage::Conversion,
            FunnelStage::Relationship,
        ] {
            assert_eq!(sequence_plan(funnel).last().unwrap().step, 16);
        }
    }

    #[tokio::test]
    async fn builds_numbered_emails() {
        let generator: Arc<dyn ContentGenerator> = Arc::new(CountingGenerator {
            calls: AtomicUsize::new(0),
            fail_on: None,
        });
        let emails = build_sequence(
            &generator,
            &Profile::default(),
            FunnelStage::Conversion,
            Duration::ZERO,
        )
        .await;

        assert_eq!(emails.len(), 4);
        assert_eq!(emails[0].email_number, 1);
        assert_eq!(emails[3].email_number, 4);
        assert_eq!(emails[0].subject, "Email 1 - conversion");
        assert!(emails.iter().all(|e| e.sent_at.is_none()));
    }

    #[tokio::test]
    async fn failed_email_gets_empty_content() {
        let generator: Arc<dyn ContentGenerator> = Arc::new(CountingGenerator {
            calls: AtomicUsize::new(0),
            fail_on: Some(5),
        });
        let emails = build_sequence(
            &generator,
            &Profile::default(),
            FunnelStage::Attraction,
            Duration::ZERO,
        )
        .await;

        assert_eq!(emails.len(), 3);
        assert!(emails[1].content.is_empty(), "step 5 email should be empty");
        assert!(!emails[0].content.is_empty());
        assert!(!emails[2].content.is_empty());
    }
}
