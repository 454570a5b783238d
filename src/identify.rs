//! Species identification boundary.
//!
//! Identification is an external service. A failure never blocks plant
//! creation: it degrades to [`Identification::unknown`].

use serde::{Deserialize, Serialize};

use crate::core::UNKNOWN_SPECIES;
use crate::error::{FailOpen, Result, SprigError};

/// Best species candidate for an image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Identification {
    /// Candidate species name.
    pub species_name: String,
    /// Confidence in [0.0, 1.0].
    pub confidence: f64,
}

impl Identification {
    /// Create an identification, clamping confidence into [0.0, 1.0].
    pub fn new(species_name: impl Into<String>, confidence: f64) -> Self {
        let confidence = if confidence.is_finite() {
            confidence.clamp(0.0, 1.0)
        } else {
            0.0
        };
        Self {
            species_name: species_name.into(),
            confidence,
        }
    }

    /// The "nothing identified" result.
    pub fn unknown() -> Self {
        Self {
            species_name: UNKNOWN_SPECIES.to_string(),
            confidence: 0.0,
        }
    }

    /// Whether this carries a real candidate.
    pub fn is_known(&self) -> bool {
        self.species_name != UNKNOWN_SPECIES && !self.species_name.trim().is_empty()
    }
}

impl Default for Identification {
    fn default() -> Self {
        Self::unknown()
    }
}

/// A service that suggests a species for a stored image.
pub trait SpeciesIdentifier: Send + Sync {
    /// Identify the plant in the image at `image_ref`.
    fn identify(&self, image_ref: &str) -> Result<Identification>;
}

/// Identify a plant, degrading any failure to [`Identification::unknown`].
pub fn identify_or_unknown(identifier: &dyn SpeciesIdentifier, image_ref: &str) -> Identification {
    let result = identifier.identify(image_ref).and_then(|id| {
        if id.species_name.trim().is_empty() {
            Err(SprigError::identification("service returned an empty name"))
        } else {
            Ok(id)
        }
    });
    result.fail_open_default("identifying species")
}

/// Identifier used when no identification service is configured.
///
/// Always fails, so creation falls back to "Unknown".
#[derive(Debug, Clone, Copy, Default)]
pub struct UnconfiguredIdentifier;

impl SpeciesIdentifier for UnconfiguredIdentifier {
    fn identify(&self, _image_ref: &str) -> Result<Identification> {
        Err(SprigError::identification(
            "no identification service configured",
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedIdentifier(Identification);

    impl SpeciesIdentifier for FixedIdentifier {
        fn identify(&self, _image_ref: &str) -> Result<Identification> {
            Ok(self.0.clone())
        }
    }

    #[test]
    fn test_unknown() {
        let id = Identification::unknown();
        assert_eq!(id.species_name, "Unknown");
        assert_eq!(id.confidence, 0.0);
        assert!(!id.is_known());
    }

    #[test]
    fn test_new_clamps_confidence() {
        assert_eq!(Identification::new("Fern", 1.7).confidence, 1.0);
        assert_eq!(Identification::new("Fern", -0.2).confidence, 0.0);
        assert_eq!(Identification::new("Fern", f64::NAN).confidence, 0.0);
        assert_eq!(Identification::new("Fern", 0.42).confidence, 0.42);
    }

    #[test]
    fn test_identify_or_unknown_success() {
        let identifier = FixedIdentifier(Identification::new("Ficus lyrata", 0.93));
        let id = identify_or_unknown(&identifier, "img://ficus");
        assert_eq!(id.species_name, "Ficus lyrata");
        assert!(id.is_known());
    }

    #[test]
    fn test_identify_or_unknown_failure_falls_back() {
        let id = identify_or_unknown(&UnconfiguredIdentifier, "img://ficus");
        assert_eq!(id, Identification::unknown());
    }

    #[test]
    fn test_identify_or_unknown_empty_name_falls_back() {
        let identifier = FixedIdentifier(Identification::new("  ", 0.8));
        let id = identify_or_unknown(&identifier, "img://x");
        assert_eq!(id, Identification::unknown());
    }
}
