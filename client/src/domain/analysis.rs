//! Self-analysis result model.
//!
//! The server computes the analysis asynchronously after answers are
//! submitted; see [`crate::domain::AnalysisView`] for how it is acquired.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Shape violations detected while accepting an analysis payload.
#[derive(Debug, Clone, PartialEq)]
pub enum AnalysisShapeError {
    /// A strength carried a confidence outside `[0, 1]` or a non-finite value.
    ConfidenceOutOfRange { strength: String, confidence: f64 },
    /// A strength had no label.
    BlankStrength,
}

impl fmt::Display for AnalysisShapeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ConfidenceOutOfRange {
                strength,
                confidence,
            } => write!(
                f,
                "confidence for strength '{strength}' must be within [0, 1], got {confidence}"
            ),
            Self::BlankStrength => write!(f, "strength label must not be blank"),
        }
    }
}

impl std::error::Error for AnalysisShapeError {}

/// One strength identified by the analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Strength {
    /// Short label for the strength.
    pub strength: String,
    /// Evidence quoted from the user's answers.
    pub evidence: String,
    /// Model confidence in `[0, 1]`.
    pub confidence: f64,
}

/// Computed analysis of a user's strengths, values and keywords.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Analysis {
    /// Keywords characterising the user.
    pub keywords: Vec<String>,
    /// Strengths with supporting evidence.
    pub strengths: Vec<Strength>,
    /// Values the user holds.
    pub values: Vec<String>,
    /// Free-text summary.
    pub summary: String,
}

impl Analysis {
    /// Check invariants the server is expected to uphold.
    ///
    /// # Examples
    /// ```
    /// use selfmap_client::domain::{Analysis, Strength};
    ///
    /// let analysis = Analysis {
    ///     keywords: vec!["curious".to_owned()],
    ///     strengths: vec![Strength {
    ///         strength: "Leadership".to_owned(),
    ///         evidence: "Led the club".to_owned(),
    ///         confidence: 1.5,
    ///     }],
    ///     values: vec![],
    ///     summary: String::new(),
    /// };
    /// assert!(analysis.validate().is_err());
    /// ```
    pub fn validate(&self) -> Result<(), AnalysisShapeError> {
        for item in &self.strengths {
            if item.strength.trim().is_empty() {
                return Err(AnalysisShapeError::BlankStrength);
            }
            if !item.confidence.is_finite() || !(0.0..=1.0).contains(&item.confidence) {
                return Err(AnalysisShapeError::ConfidenceOutOfRange {
                    strength: item.strength.clone(),
                    confidence: item.confidence,
                });
            }
        }
        Ok(())
    }

    /// Strengths ordered from most to least confident.
    pub fn strengths_by_confidence(&self) -> Vec<&Strength> {
        let mut ranked = self.strengths.iter().collect::<Vec<_>>();
        ranked.sort_by(|left, right| right.confidence.total_cmp(&left.confidence));
        ranked
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};

    #[fixture]
    fn analysis() -> Analysis {
        Analysis {
            keywords: vec!["挑戦".to_owned()],
            strengths: vec![
                Strength {
                    strength: "協調性".to_owned(),
                    evidence: "サークルで調整役を務めた".to_owned(),
                    confidence: 0.4,
                },
                Strength {
                    strength: "行動力".to_owned(),
                    evidence: "留学を自分で計画した".to_owned(),
                    confidence: 0.9,
                },
            ],
            values: vec!["成長".to_owned()],
            summary: "周囲を巻き込みながら挑戦する人です。".to_owned(),
        }
    }

    #[rstest]
    fn accepts_confidences_within_unit_interval(analysis: Analysis) {
        assert_eq!(analysis.validate(), Ok(()));
    }

    #[rstest]
    #[case::negative(-0.1)]
    #[case::above_one(1.01)]
    #[case::nan(f64::NAN)]
    fn rejects_confidence_outside_unit_interval(mut analysis: Analysis, #[case] confidence: f64) {
        analysis.strengths[0].confidence = confidence;
        assert!(matches!(
            analysis.validate(),
            Err(AnalysisShapeError::ConfidenceOutOfRange { .. })
        ));
    }

    #[rstest]
    fn rejects_blank_strength_labels(mut analysis: Analysis) {
        analysis.strengths[1].strength = "  ".to_owned();
        assert_eq!(analysis.validate(), Err(AnalysisShapeError::BlankStrength));
    }

    #[rstest]
    fn ranks_strengths_by_confidence(analysis: Analysis) {
        let ranked = analysis.strengths_by_confidence();
        assert_eq!(ranked[0].strength, "行動力");
        assert_eq!(ranked[1].strength, "協調性");
    }
}
