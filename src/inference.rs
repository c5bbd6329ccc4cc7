//! Inference adapters and the process-wide model registry
//!
//! ══════════════════════════════════════════════════════════════════════════════
//! SINGLE SOURCE OF PREDICTIONS
//! ══════════════════════════════════════════════════════════════════════════════
//!
//! Inference is delegated to externally supplied models (a skin-health
//! scorer, a skin-type classifier, a lifestyle advisor, and a condition
//! classifier). Those models do not ship with this service, so every
//! predictor sits behind a trait and the registry wires in PLACEHOLDER
//! implementations:
//!
//! 1. `PixelStatScorer` - deterministic luminance heuristic
//! 2. `PixelStatTypeClassifier` - deterministic channel-statistic heuristic
//! 3. `RuleLifestyleAdvisor` - threshold table over [age, water]
//! 4. `RandomConditionClassifier` - uniform random over the four labels
//!
//! When real models are available, swap the boxed implementations in
//! `ModelRegistry::initialize` without touching the recommendation engine.
//! The registry itself is built once at startup and shared read-only across
//! all requests; a missing model directory aborts startup rather than
//! failing per-request.

use rand::seq::SliceRandom;
use std::path::Path;
use tracing::{info, warn};

use crate::config::ModelSettings;
use crate::error::{AppError, AppResult};
use crate::models::SkinCondition;
use crate::normalize::ImageTensor;

/// Skin health scorer: tensor in, score in [0,1] out
pub trait SkinHealthScorer: Send + Sync {
    fn predict_score(&self, tensor: &ImageTensor) -> AppResult<f64>;
}

/// Skin type classifier: tensor in, probability vector over the four
/// classes out (Oily, Dry, Normal, Combination); argmax taken by the caller
pub trait SkinTypeClassifier: Send + Sync {
    fn predict_type(&self, tensor: &ImageTensor) -> AppResult<[f64; 4]>;
}

/// Lifestyle advisor: [age, water] features in, suggestion label out
pub trait LifestyleAdvisor: Send + Sync {
    fn advise(&self, age: u8, water_litres: u8) -> AppResult<String>;
}

/// Skin condition classifier used by the screening endpoint
pub trait ConditionClassifier: Send + Sync {
    fn classify(&self, tensor: &ImageTensor) -> AppResult<SkinCondition>;
}

/// Process-wide immutable registry of inference backends.
/// Loaded once at startup, reused read-only across all requests.
pub struct ModelRegistry {
    scorer: Box<dyn SkinHealthScorer>,
    type_classifier: Box<dyn SkinTypeClassifier>,
    advisor: Box<dyn LifestyleAdvisor>,
    condition_classifier: Box<dyn ConditionClassifier>,
}

impl ModelRegistry {
    /// Assemble a registry from explicit backends
    pub fn new(
        scorer: Box<dyn SkinHealthScorer>,
        type_classifier: Box<dyn SkinTypeClassifier>,
        advisor: Box<dyn LifestyleAdvisor>,
        condition_classifier: Box<dyn ConditionClassifier>,
    ) -> Self {
        Self {
            scorer,
            type_classifier,
            advisor,
            condition_classifier,
        }
    }

    /// Registry wired with the built-in placeholder predictors
    pub fn with_builtins() -> Self {
        Self::new(
            Box::new(PixelStatScorer),
            Box::new(PixelStatTypeClassifier),
            Box::new(RuleLifestyleAdvisor),
            Box::new(RandomConditionClassifier),
        )
    }

    /// Deterministic startup-time initialization.
    ///
    /// Fails with `ModelUnavailable` when a model directory is configured
    /// but absent; never falls back silently once external models are
    /// expected.
    pub fn initialize(settings: &ModelSettings) -> AppResult<Self> {
        if let Some(dir) = &settings.model_dir {
            if !Path::new(dir).is_dir() {
                return Err(AppError::ModelUnavailable(format!(
                    "Configured model directory '{}' does not exist",
                    dir
                )));
            }
            // External model formats are not wired yet; the directory check
            // keeps startup failures deterministic.
            warn!(
                model_dir = %dir,
                "Model directory found but external loaders are not wired; using placeholders"
            );
        }

        info!("Initializing model registry with built-in placeholder predictors");
        Ok(Self::with_builtins())
    }

    pub fn scorer(&self) -> &dyn SkinHealthScorer {
        self.scorer.as_ref()
    }

    pub fn type_classifier(&self) -> &dyn SkinTypeClassifier {
        self.type_classifier.as_ref()
    }

    pub fn advisor(&self) -> &dyn LifestyleAdvisor {
        self.advisor.as_ref()
    }

    pub fn condition_classifier(&self) -> &dyn ConditionClassifier {
        self.condition_classifier.as_ref()
    }
}

/// PLACEHOLDER scorer: perceptual luminance of the normalized tensor.
/// Deterministic for a given image; carries no cosmetic meaning.
pub struct PixelStatScorer;

impl SkinHealthScorer for PixelStatScorer {
    fn predict_score(&self, tensor: &ImageTensor) -> AppResult<f64> {
        let r = f64::from(tensor.channel_mean(0));
        let g = f64::from(tensor.channel_mean(1));
        let b = f64::from(tensor.channel_mean(2));

        let luminance = 0.299 * r + 0.587 * g + 0.114 * b;
        Ok(luminance.clamp(0.0, 1.0))
    }
}

/// PLACEHOLDER type classifier: channel statistics shaped into a
/// probability vector. Deterministic; sums to 1.
pub struct PixelStatTypeClassifier;

impl SkinTypeClassifier for PixelStatTypeClassifier {
    fn predict_type(&self, tensor: &ImageTensor) -> AppResult<[f64; 4]> {
        let r = f64::from(tensor.channel_mean(0));
        let g = f64::from(tensor.channel_mean(1));
        let b = f64::from(tensor.channel_mean(2));

        // Arbitrary positive weights per class; the 0.25 baseline keeps
        // every weight positive for an all-black image.
        let raw = [0.25 + r, 0.25 + b, 0.25 + g, 0.25 + (r + b) / 2.0];
        let total: f64 = raw.iter().sum();

        Ok([
            raw[0] / total,
            raw[1] / total,
            raw[2] / total,
            raw[3] / total,
        ])
    }
}

/// PLACEHOLDER lifestyle advisor: threshold table over [age, water],
/// standing in for a trained tabular model
pub struct RuleLifestyleAdvisor;

impl LifestyleAdvisor for RuleLifestyleAdvisor {
    fn advise(&self, age: u8, water_litres: u8) -> AppResult<String> {
        let suggestion = if water_litres < 2 {
            "Increase your daily water intake to support skin hydration."
        } else if age > 40 {
            "Prioritize sleep and daily sun protection to support skin elasticity."
        } else {
            "Maintain your current healthy habits."
        };

        Ok(suggestion.to_string())
    }
}

/// PLACEHOLDER condition classifier: uniform random choice over the four
/// labels. NOT real inference; replace with a model-backed implementation.
pub struct RandomConditionClassifier;

impl ConditionClassifier for RandomConditionClassifier {
    fn classify(&self, _tensor: &ImageTensor) -> AppResult<SkinCondition> {
        let mut rng = rand::thread_rng();

        SkinCondition::ALL
            .choose(&mut rng)
            .copied()
            .ok_or_else(|| AppError::InternalError("Empty condition label set".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageOutputFormat, Rgb, RgbImage};
    use std::io::Cursor;

    fn tensor_from_color(color: [u8; 3]) -> ImageTensor {
        let img = RgbImage::from_pixel(8, 8, Rgb(color));
        let mut bytes = Vec::new();
        image::DynamicImage::ImageRgb8(img)
            .write_to(&mut Cursor::new(&mut bytes), ImageOutputFormat::Png)
            .unwrap();
        ImageTensor::from_bytes(&bytes).unwrap()
    }

    #[test]
    fn test_scorer_range_and_determinism() {
        let tensor = tensor_from_color([180, 140, 120]);
        let scorer = PixelStatScorer;

        let first = scorer.predict_score(&tensor).unwrap();
        let second = scorer.predict_score(&tensor).unwrap();

        assert!((0.0..=1.0).contains(&first));
        assert_eq!(first, second);
    }

    #[test]
    fn test_scorer_black_and_white_extremes() {
        let scorer = PixelStatScorer;

        let black = scorer.predict_score(&tensor_from_color([0, 0, 0])).unwrap();
        let white = scorer
            .predict_score(&tensor_from_color([255, 255, 255]))
            .unwrap();

        assert!(black < 0.01);
        assert!(white > 0.99);
    }

    #[test]
    fn test_type_classifier_is_distribution() {
        let tensor = tensor_from_color([90, 120, 200]);
        let classifier = PixelStatTypeClassifier;

        let probs = classifier.predict_type(&tensor).unwrap();
        let total: f64 = probs.iter().sum();

        assert!((total - 1.0).abs() < 1e-9);
        assert!(probs.iter().all(|&p| p > 0.0));
    }

    #[test]
    fn test_advisor_thresholds() {
        let advisor = RuleLifestyleAdvisor;

        let low_water = advisor.advise(25, 1).unwrap();
        assert!(low_water.contains("water"));

        let older = advisor.advise(55, 3).unwrap();
        assert!(older.contains("sun protection"));

        let baseline = advisor.advise(25, 3).unwrap();
        assert!(baseline.contains("Maintain"));
    }

    #[test]
    fn test_random_condition_classifier_yields_known_label() {
        let tensor = tensor_from_color([128, 128, 128]);
        let classifier = RandomConditionClassifier;

        for _ in 0..20 {
            let condition = classifier.classify(&tensor).unwrap();
            assert!(SkinCondition::ALL.contains(&condition));
        }
    }

    #[test]
    fn test_registry_initialize_without_model_dir() {
        let settings = ModelSettings { model_dir: None };
        assert!(ModelRegistry::initialize(&settings).is_ok());
    }

    #[test]
    fn test_registry_initialize_missing_model_dir_fails() {
        let settings = ModelSettings {
            model_dir: Some("/nonexistent/models".to_string()),
        };
        let result = ModelRegistry::initialize(&settings);
        assert!(matches!(result, Err(AppError::ModelUnavailable(_))));
    }
}
