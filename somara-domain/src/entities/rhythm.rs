use serde::{Deserialize, Serialize};

#[cfg(feature = "with-api")]
use utoipa::ToSchema;

/// Named breathing techniques
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
pub enum BreathingType {
    #[serde(rename = "conscious-connected")]
    ConsciousConnected,
    #[serde(rename = "box-breathing")]
    BoxBreathing,
    #[serde(rename = "ratio-2-1")]
    Ratio2To1,
    #[serde(rename = "custom")]
    Custom,
}

impl BreathingType {
    pub const ALL: [BreathingType; 4] = [
        BreathingType::ConsciousConnected,
        BreathingType::BoxBreathing,
        BreathingType::Ratio2To1,
        BreathingType::Custom,
    ];

    /// Label shown to the user
    pub fn label(&self) -> &'static str {
        match self {
            BreathingType::ConsciousConnected => "Conscious Connected",
            BreathingType::BoxBreathing => "Box Breathing",
            BreathingType::Ratio2To1 => "2:1 Ratio",
            BreathingType::Custom => "Custom",
        }
    }
}

/// Stage of a breathing cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
#[serde(rename_all = "kebab-case")]
pub enum BreathCue {
    Inhale,
    HoldIn,
    Exhale,
    HoldOut,
}

/// A cycle of inhale/hold/exhale/hold durations, in seconds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct BreathingRhythm {
    #[serde(rename = "type")]
    pub breathing_type: BreathingType,
    pub inhale_seconds: f64,
    pub exhale_seconds: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hold_after_inhale: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hold_after_exhale: Option<f64>,
}

impl BreathingRhythm {
    /// Default rhythm for a breathing technique
    pub fn preset(breathing_type: BreathingType) -> Self {
        let (inhale, exhale, holds) = match breathing_type {
            BreathingType::ConsciousConnected => (4.0, 4.0, None),
            BreathingType::BoxBreathing => (4.0, 4.0, Some(4.0)),
            BreathingType::Ratio2To1 => (4.0, 8.0, None),
            BreathingType::Custom => (4.0, 4.0, None),
        };

        Self {
            breathing_type,
            inhale_seconds: inhale,
            exhale_seconds: exhale,
            hold_after_inhale: holds,
            hold_after_exhale: holds,
        }
    }

    /// All presets in display order
    pub fn presets() -> Vec<BreathingRhythm> {
        BreathingType::ALL.iter().copied().map(Self::preset).collect()
    }

    fn stages(&self) -> [f64; 4] {
        [
            self.inhale_seconds.max(0.0),
            self.hold_after_inhale.unwrap_or(0.0).max(0.0),
            self.exhale_seconds.max(0.0),
            self.hold_after_exhale.unwrap_or(0.0).max(0.0),
        ]
    }

    /// Length of one full breath in seconds
    pub fn cycle_seconds(&self) -> f64 {
        self.stages().iter().sum()
    }

    /// Breath cue for a position inside a phase.
    ///
    /// A cycle of zero length always reads as an inhale.
    pub fn cue_at(&self, elapsed_seconds: f64) -> BreathCue {
        let cycle = self.cycle_seconds();
        if cycle <= 0.0 {
            return BreathCue::Inhale;
        }

        let [inhale, hold_in, exhale, _] = self.stages();
        let position = elapsed_seconds.max(0.0) % cycle;

        if position < inhale {
            BreathCue::Inhale
        } else if position < inhale + hold_in {
            BreathCue::HoldIn
        } else if position < inhale + hold_in + exhale {
            BreathCue::Exhale
        } else {
            BreathCue::HoldOut
        }
    }

    /// Short summary such as `4s in / 4s hold / 4s out / 4s hold`
    pub fn describe(&self) -> String {
        let mut parts = vec![format!("{}s in", self.inhale_seconds)];
        if let Some(hold) = self.hold_after_inhale.filter(|h| *h > 0.0) {
            parts.push(format!("{}s hold", hold));
        }
        parts.push(format!("{}s out", self.exhale_seconds));
        if let Some(hold) = self.hold_after_exhale.filter(|h| *h > 0.0) {
            parts.push(format!("{}s hold", hold));
        }
        parts.join(" / ")
    }
}

impl Default for BreathingRhythm {
    fn default() -> Self {
        Self::preset(BreathingType::ConsciousConnected)
    }
}
