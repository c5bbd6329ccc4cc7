//! Rule-based recommendation engine
//!
//! Pure functions mapping scores, skin types, and lifestyle factors to
//! tips, routines, and risk levels. No I/O, no randomness; deterministic
//! given its inputs. The engine assumes inputs are within the ranges the
//! widget layer enforces; score sanity is checked at the boundary in
//! `validation::ensure_unit_score`.

use crate::models::{RiskAssessment, RiskLevel, SkinCondition, SkinType};

/// Generate personalized skincare tips.
///
/// `score` is the model output in [0,1] (not the displayed percentage).
/// Checks are independent and ordered: score, water, age, then exactly
/// one skin-type tip. The skin-type tip is unconditional, so the trailing
/// fallback is unreachable; it preserves the never-empty guarantee.
pub fn generate_tips(score: f64, skin_type: SkinType, water_litres: u8, age: u8) -> Vec<String> {
    let mut tips = Vec::new();

    if score < 0.5 {
        tips.push("Your skin health score is low. Follow a consistent skincare routine.".to_string());
    }
    if water_litres < 2 {
        tips.push("Drink more water daily for healthy skin.".to_string());
    }
    if age > 30 {
        tips.push("Consider using anti-aging creams or serums.".to_string());
    }

    match skin_type {
        SkinType::Oily => {
            tips.push("Use oil-free moisturizers and clean your face regularly.".to_string())
        }
        SkinType::Dry => tips.push("Use hydrating creams and avoid harsh soaps.".to_string()),
        SkinType::Normal | SkinType::Combination => {
            tips.push("Maintain your balanced skin with regular care.".to_string())
        }
    }

    if tips.is_empty() {
        tips.push("Your skin looks good! Keep up your healthy routine.".to_string());
    }

    tips
}

/// Fixed 3-step daily routine for a skin type.
///
/// Total over all skin types; the Normal row doubles as the default for
/// any label the classifier mapping collapses into Normal.
pub fn generate_routine(skin_type: SkinType) -> Vec<String> {
    let steps: [&str; 3] = match skin_type {
        SkinType::Oily => [
            "Cleanse twice daily",
            "Use oil-free moisturizer",
            "Apply sunscreen",
        ],
        SkinType::Dry => [
            "Use gentle cleanser",
            "Apply hydrating moisturizer",
            "Use night cream",
        ],
        SkinType::Combination => [
            "Cleanse daily",
            "Moisturize dry areas",
            "Use mattifying products on oily areas",
        ],
        SkinType::Normal => ["Cleanse daily", "Moisturize", "Use sunscreen"],
    };

    steps.iter().map(|s| s.to_string()).collect()
}

/// Additive lifestyle risk score.
///
/// One point for each of: short sleep (< 5h), low water (< 2L), junk
/// food, high stress (> 2). High iff the total reaches 2.
pub fn compute_risk(sleep_hours: u8, water_litres: u8, junk_food: bool, stress_level: u8) -> RiskAssessment {
    let mut score = 0u8;

    if sleep_hours < 5 {
        score += 1;
    }
    if water_litres < 2 {
        score += 1;
    }
    if junk_food {
        score += 1;
    }
    if stress_level > 2 {
        score += 1;
    }

    let level = if score >= 2 {
        RiskLevel::High
    } else {
        RiskLevel::Low
    };

    RiskAssessment { score, level }
}

/// One-line advice for a detected skin condition.
///
/// `SkinCondition` is a closed enum, so the source's catch-all branch
/// (identical to the clear-skin message) collapses into the Clear arm.
pub fn select_advice(condition: SkinCondition) -> &'static str {
    match condition {
        SkinCondition::Acne => {
            "Use a salicylic acid cleanser and avoid heavy, pore-clogging products."
        }
        SkinCondition::DarkSpots => {
            "Apply a vitamin C serum in the morning and wear sunscreen every day."
        }
        SkinCondition::Wrinkles => {
            "Keep your skin well hydrated and consider a retinol product at night."
        }
        SkinCondition::Clear => "Your skin looks clear. Keep up your current routine.",
    }
}

/// Convert a unit-interval score to the displayed percentage,
/// rounded to two decimals
pub fn score_percent(score: f64) -> f64 {
    (score * 100.0 * 100.0).round() / 100.0
}
