//! Lead profile — the snapshot of form data passed into every generation call.

use serde::{Deserialize, Serialize};

/// Accumulated lead-qualification data.
///
/// Immutable from the generation side; the API layer merges successive form
/// submissions and wizard answers into it before each call.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Profile {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub business_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub industry: Option<String>,
    /// Declared budget tier, e.g. `"$2000-$2999"` or `"Más de $5000"`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub budget: Option<String>,
    /// Free-text challenges, in the order the lead gave them.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub challenges: Vec<String>,
}

impl Profile {
    /// Merge a later submission into this profile.
    ///
    /// Populated fields of `later` overwrite; unspecified fields are
    /// retained. Challenges are replaced wholesale when `later` carries any,
    /// since a re-submitted form supersedes the earlier answers.
    pub fn merge(&mut self, later: Profile) {
        if later.name.is_some() {
            self.name = later.name;
        }
        if later.email.is_some() {
            self.email = later.email;
        }
        if later.phone.is_some() {
            self.phone = later.phone;
        }
        if later.business_name.is_some() {
            self.business_name = later.business_name;
        }
        if later.industry.is_some() {
            self.industry = later.industry;
        }
        if later.budget.is_some() {
            self.budget = later.budget;
        }
        if !later.challenges.is_empty() {
            self.challenges = later.challenges;
        }
    }

    /// Append a wizard answer to the running challenges list.
    pub fn record_answer(&mut self, answer: &str) {
        let trimmed = answer.trim();
        if !trimmed.is_empty() {
            self.challenges.push(trimmed.to_string());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merge_overwrites_populated_fields_only() {
        let mut base = Profile {
            name: Some("Ana".into()),
            email: Some("ana@example.com".into()),
            industry: Some("retail".into()),
            challenges: vec!["pocas ventas".into()],
            ..Profile::default()
        };
        base.merge(Profile {
            name: Some("Ana María".into()),
            budget: Some("$2000-$2999".into()),
            ..Profile::default()
        });

        assert_eq!(base.name.as_deref(), Some("Ana María"));
        assert_eq!(base.email.as_deref(), Some("ana@example.com"));
        assert_eq!(base.industry.as_deref(), Some("retail"));
        assert_eq!(base.budget.as_deref(), Some("$2000-$2999"));
        assert_eq!(base.challenges, vec!["pocas ventas".to_string()]);
    }

    #[test]
    fn merge_replaces_challenges_when_present() {
        let mut base = Profile {
            challenges: vec!["a".into(), "b".into()],
            ..Profile::default()
        };
        base.merge(Profile {
            challenges: vec!["c".into()],
            ..Profile::default()
        });
        assert_eq!(base.challenges, vec!["c".to_string()]);
    }

    #[test]
    fn record_answer_skips_blank_input() {
        let mut profile = Profile::default();
        profile.record_answer("   ");
        profile.record_answer("necesito más clientes");
        assert_eq!(profile.challenges, vec!["necesito más clientes".to_string()]);
    }

    #[test]
    fn camel_case_wire_format() {
        let profile: Profile = serde_json::from_str(
            r#"{"name":"Ana","businessName":"Panadería Sol","budget":"Más de $5000"}"#,
        )
        .unwrap();
        assert_eq!(profile.business_name.as_deref(), Some("Panadería Sol"));
    }
}
