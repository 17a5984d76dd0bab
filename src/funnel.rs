//! Funnel classification — maps a declared budget to a marketing funnel stage.

use serde::{Deserialize, Serialize};

/// Marketing lifecycle bucket for a lead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FunnelStage {
    Attraction,
    Conversion,
    Relationship,
}

impl FunnelStage {
    /// Classify a declared budget string into a funnel stage.
    ///
    /// Checks are ordered so the highest tier wins: a budget matching both
    /// the Conversion and Relationship markers resolves to Relationship.
    /// Absent or unrecognized budgets yield Attraction.
    pub fn classify(budget: Option<&str>) -> FunnelStage {
        let Some(budget) = budget else {
            return FunnelStage::Attraction;
        };
        let mut stage = FunnelStage::Attraction;
        if budget.contains("$2000") || budget.contains("$3000") {
            stage = FunnelStage::Conversion;
        }
        if budget.contains("$4000") || budget.contains("$5000") || budget.contains("Más de $5000")
        {
            stage = FunnelStage::Relationship;
        }
        stage
    }

    /// Stable string form, matching the serde representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Attraction => "attraction",
            Self::Conversion => "conversion",
            Self::Relationship => "relationship",
        }
    }

    /// Parse the stable string form. Unknown strings fall back to Attraction,
    /// mirroring the classifier's silent default.
    pub fn parse_or_default(s: &str) -> FunnelStage {
        match s {
            "conversion" => Self::Conversion,
            "relationship" => Self::Relationship,
            _ => Self::Attraction,
        }
    }
}

impl std::fmt::Display for FunnelStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relationship_markers_win() {
        for budget in ["$4000-$4999", "Más de $5000", "entre $4000 y $5000"] {
            assert_eq!(
                FunnelStage::classify(Some(budget)),
                FunnelStage::Relationship,
                "{budget}"
            );
        }
    }

    #[test]
    fn relationship_overrides_conversion() {
        // Matches both the "$3000" and "$4000" patterns — highest tier wins.
        assert_eq!(
            FunnelStage::classify(Some("$3000-$3999 o $4000-$4999")),
            FunnelStage::Relationship
        );
    }

    #[test]
    fn conversion_markers() {
        for budget in ["$2000-$2999", "$3000-$3999"] {
            assert_eq!(
                FunnelStage::classify(Some(budget)),
                FunnelStage::Conversion,
                "{budget}"
            );
        }
    }

    #[test]
    fn everything_else_is_attraction() {
        assert_eq!(FunnelStage::classify(None), FunnelStage::Attraction);
        for budget in ["", "Menos de $500", "$500-$999", "$1000-$1999", "no sé"] {
            assert_eq!(
                FunnelStage::classify(Some(budget)),
                FunnelStage::Attraction,
                "{budget:?}"
            );
        }
    }

    #[test]
    fn display_matches_serde() {
        for stage in [
            FunnelStage::Attraction,
            FunnelStage::Conversion,
            FunnelStage::Relationship,
        ] {
            let json = serde_json::to_string(&stage).unwrap();
            assert_eq!(json, format!("\"{stage}\""));
            assert_eq!(FunnelStage::parse_or_default(stage.as_str()), stage);
        }
    }
}
