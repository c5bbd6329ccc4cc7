//! Data models for skin analysis inputs and results
//!
//! Defines the core data structures used throughout the application.
//! All values are request-scoped; nothing here survives past one
//! request/response cycle.

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Subject gender, collected for the lifestyle profile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Gender {
    Male,
    Female,
    Other,
}

impl Gender {
    /// Parse a form-field value, case-insensitive
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "male" => Some(Gender::Male),
            "female" => Some(Gender::Female),
            "other" => Some(Gender::Other),
            _ => None,
        }
    }
}

/// Skin type classification
///
/// Variant order matches the type classifier's output classes:
/// index 0 = Oily, 1 = Dry, 2 = Normal, 3 = Combination.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SkinType {
    Oily,
    Dry,
    Normal,
    Combination,
}

impl std::fmt::Display for SkinType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            SkinType::Oily => "Oily",
            SkinType::Dry => "Dry",
            SkinType::Normal => "Normal",
            SkinType::Combination => "Combination",
        };
        write!(f, "{}", label)
    }
}

impl SkinType {
    /// Map a classifier class index to a skin type.
    /// Out-of-range indices fall back to Normal, mirroring the
    /// engine's default-routine semantics.
    pub fn from_class_index(index: usize) -> Self {
        match index {
            0 => SkinType::Oily,
            1 => SkinType::Dry,
            2 => SkinType::Normal,
            3 => SkinType::Combination,
            _ => SkinType::Normal,
        }
    }
}

/// Cosmetic skin condition labels produced by the condition classifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkinCondition {
    Acne,
    Clear,
    DarkSpots,
    Wrinkles,
}

impl SkinCondition {
    /// All condition labels, in classifier output order
    pub const ALL: [SkinCondition; 4] = [
        SkinCondition::Acne,
        SkinCondition::Clear,
        SkinCondition::DarkSpots,
        SkinCondition::Wrinkles,
    ];
}

/// Coarse acne-risk classification derived from lifestyle factors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RiskLevel {
    Low,
    High,
}

/// Session-wide lifestyle parameters shared by all images in one
/// analysis request. Ranges match what the form widgets enforce.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct LifestyleProfile {
    /// Subject name, used in the report title
    pub name: String,

    #[validate(range(min = 10, max = 100, message = "Age must be between 10 and 100"))]
    pub age: u8,

    pub gender: Gender,

    /// Daily water intake in litres
    #[validate(range(min = 0, max = 5, message = "Water intake must be between 0 and 5 litres"))]
    pub water_litres: u8,
}

/// Lifestyle risk factors for the acne-risk screening
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RiskFactors {
    #[validate(range(min = 3, max = 10, message = "Sleep hours must be between 3 and 10"))]
    pub sleep_hours: u8,

    #[validate(range(min = 0, max = 5, message = "Water intake must be between 0 and 5 litres"))]
    pub water_litres: u8,

    pub junk_food: bool,

    #[validate(range(min = 1, max = 3, message = "Stress level must be between 1 and 3"))]
    pub stress_level: u8,
}

/// Per-image analysis result
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageAnalysis {
    /// Display label, "Image N" in upload order
    pub label: String,
    /// Skin health score in [0,100], two-decimal precision
    pub skin_score: f64,
    pub skin_type: SkinType,
    /// Never empty; a fallback tip is appended when no rule fires
    pub tips: Vec<String>,
    /// Never empty; fixed 3-step routine for the skin type
    pub routine: Vec<String>,
}

/// Per-image failure entry; a bad upload never aborts the batch
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageFailure {
    pub label: String,
    pub message: String,
}

/// One row of the score/type summary table
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportRow {
    pub label: String,
    pub score: f64,
    pub skin_type: SkinType,
}

/// Full analysis response: summary table plus one detailed entry per
/// uploaded image, both in upload order
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub name: String,
    pub table: Vec<ReportRow>,
    pub results: Vec<ImageAnalysis>,
    pub failures: Vec<ImageFailure>,
    /// Suggestion from the lifestyle advisor over [age, water]
    pub lifestyle_suggestion: String,
}

/// Additive lifestyle risk score with its Low/High classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskAssessment {
    /// Number of active risk factors, 0..=4
    pub score: u8,
    /// High iff score >= 2
    pub level: RiskLevel,
}

/// Screening response: condition label, advice, and lifestyle risk
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScreeningResult {
    pub condition: SkinCondition,
    pub advice: String,
    pub risk: RiskAssessment,
}

/// Health check response
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthCheck {
    pub status: String,
    pub version: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
    pub uptime_seconds: u64,
}
