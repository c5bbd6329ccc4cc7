//! Input validation module
//!
//! Provides validation for lifestyle inputs, uploads, and engine-boundary
//! invariants. Range limits mirror what the form widgets enforce; the
//! engine itself assumes in-range values and these checks fail loudly
//! when that assumption is about to break.

use crate::config::UploadSettings;
use crate::error::{AppError, AppResult};
use crate::models::{LifestyleProfile, RiskFactors};
use tracing::{debug, warn};
use validator::Validate;

/// Lifestyle input constraints (widget-enforced ranges)
pub struct LifestyleConstraints;

impl LifestyleConstraints {
    pub const AGE_MIN: u8 = 10;
    pub const AGE_MAX: u8 = 100;

    /// Daily water intake, litres
    pub const WATER_MIN: u8 = 0;
    pub const WATER_MAX: u8 = 5;

    pub const SLEEP_MIN: u8 = 3;
    pub const SLEEP_MAX: u8 = 10;

    pub const STRESS_MIN: u8 = 1;
    pub const STRESS_MAX: u8 = 3;
}

/// Accepted upload file extensions
const ALLOWED_EXTENSIONS: [&str; 3] = ["jpg", "jpeg", "png"];

/// Validate a lifestyle profile
pub fn validate_lifestyle_profile(profile: &LifestyleProfile) -> AppResult<()> {
    // First, run struct-level validation
    collect_validation_errors(profile)?;

    // Additional semantic validation
    if profile.name.trim().is_empty() {
        return Err(AppError::ValidationError("Name must not be empty".to_string()));
    }
    check_range(
        "age",
        profile.age,
        LifestyleConstraints::AGE_MIN,
        LifestyleConstraints::AGE_MAX,
    )?;
    check_range(
        "water intake",
        profile.water_litres,
        LifestyleConstraints::WATER_MIN,
        LifestyleConstraints::WATER_MAX,
    )?;

    debug!("Lifestyle profile validation passed");
    Ok(())
}

/// Validate screening risk factors
pub fn validate_risk_factors(factors: &RiskFactors) -> AppResult<()> {
    collect_validation_errors(factors)?;

    check_range(
        "sleep hours",
        factors.sleep_hours,
        LifestyleConstraints::SLEEP_MIN,
        LifestyleConstraints::SLEEP_MAX,
    )?;
    check_range(
        "water intake",
        factors.water_litres,
        LifestyleConstraints::WATER_MIN,
        LifestyleConstraints::WATER_MAX,
    )?;
    check_range(
        "stress level",
        factors.stress_level,
        LifestyleConstraints::STRESS_MIN,
        LifestyleConstraints::STRESS_MAX,
    )?;

    debug!("Risk factor validation passed");
    Ok(())
}

/// Range check shared by the semantic validators
fn check_range(field: &str, value: u8, min: u8, max: u8) -> AppResult<()> {
    if !(min..=max).contains(&value) {
        return Err(AppError::ValidationError(format!(
            "{} {} out of valid range [{}, {}]",
            field, value, min, max
        )));
    }
    Ok(())
}

/// Validate one uploaded file against the configured limits
pub fn validate_upload(
    filename: &str,
    size_bytes: usize,
    settings: &UploadSettings,
) -> AppResult<()> {
    let extension = filename
        .rsplit('.')
        .next()
        .map(|e| e.to_lowercase())
        .unwrap_or_default();

    if !ALLOWED_EXTENSIONS.contains(&extension.as_str()) {
        return Err(AppError::ValidationError(format!(
            "Unsupported file type '{}'. Accepted: jpg, jpeg, png",
            filename
        )));
    }

    if size_bytes == 0 {
        return Err(AppError::ValidationError(format!(
            "Uploaded file '{}' is empty",
            filename
        )));
    }

    if size_bytes > settings.max_image_bytes {
        return Err(AppError::ValidationError(format!(
            "Uploaded file '{}' exceeds the {} byte limit",
            filename, settings.max_image_bytes
        )));
    }

    Ok(())
}

/// Enforce the batch size limit
pub fn validate_image_count(count: usize, settings: &UploadSettings) -> AppResult<()> {
    if count == 0 {
        return Err(AppError::BadRequest(
            "At least one face image is required".to_string(),
        ));
    }

    if count > settings.max_images {
        return Err(AppError::ValidationError(format!(
            "Too many images: {} uploaded, maximum is {}",
            count, settings.max_images
        )));
    }

    Ok(())
}

/// Engine boundary check: model scores must be finite and inside [0,1].
/// A violation here means a predictor broke its contract.
pub fn ensure_unit_score(score: f64) -> AppResult<f64> {
    if !score.is_finite() || !(0.0..=1.0).contains(&score) {
        return Err(AppError::InvariantViolation(format!(
            "Model score {} outside the unit interval",
            score
        )));
    }
    Ok(score)
}

/// Run derive-based validation and flatten field errors into one message
fn collect_validation_errors<T: Validate>(value: &T) -> AppResult<()> {
    if let Err(validation_errors) = value.validate() {
        let error_messages: Vec<String> = validation_errors
            .field_errors()
            .iter()
            .map(|(field, errors)| {
                let msgs: Vec<&str> = errors
                    .iter()
                    .filter_map(|e| e.message.as_ref().map(|c| c.as_ref()))
                    .collect();
                format!("{}: {}", field, msgs.join(", "))
            })
            .collect();

        warn!(errors = ?error_messages, "Input validation failed");
        return Err(AppError::ValidationError(error_messages.join("; ")));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Gender;

    fn upload_settings() -> UploadSettings {
        UploadSettings {
            max_images: 3,
            max_image_bytes: 1024,
        }
    }

    #[test]
    fn test_valid_profile() {
        let profile = LifestyleProfile {
            name: "User".to_string(),
            age: 25,
            gender: Gender::Female,
            water_litres: 2,
        };

        assert!(validate_lifestyle_profile(&profile).is_ok());
    }

    #[test]
    fn test_age_out_of_range() {
        let profile = LifestyleProfile {
            name: "User".to_string(),
            age: 101,
            gender: Gender::Male,
            water_litres: 2,
        };

        let result = validate_lifestyle_profile(&profile);
        assert!(result.is_err());

        if let Err(AppError::ValidationError(msg)) = result {
            assert!(msg.contains("age") || msg.contains("Age"));
        }
    }

    #[test]
    fn test_blank_name_rejected() {
        let profile = LifestyleProfile {
            name: "   ".to_string(),
            age: 25,
            gender: Gender::Other,
            water_litres: 2,
        };

        assert!(validate_lifestyle_profile(&profile).is_err());
    }

    #[test]
    fn test_risk_factors_ranges() {
        let valid = RiskFactors {
            sleep_hours: 7,
            water_litres: 2,
            junk_food: true,
            stress_level: 2,
        };
        assert!(validate_risk_factors(&valid).is_ok());

        let invalid = RiskFactors {
            sleep_hours: 7,
            water_litres: 2,
            junk_food: true,
            stress_level: 0, // below widget minimum
        };
        assert!(validate_risk_factors(&invalid).is_err());
    }

    #[test]
    fn test_upload_extension_allow_list() {
        let settings = upload_settings();

        assert!(validate_upload("face.jpg", 512, &settings).is_ok());
        assert!(validate_upload("face.JPEG", 512, &settings).is_ok());
        assert!(validate_upload("face.png", 512, &settings).is_ok());
        assert!(validate_upload("face.gif", 512, &settings).is_err());
        assert!(validate_upload("face", 512, &settings).is_err());
    }

    #[test]
    fn test_upload_size_limits() {
        let settings = upload_settings();

        assert!(validate_upload("face.png", 0, &settings).is_err());
        assert!(validate_upload("face.png", 2048, &settings).is_err());
    }

    #[test]
    fn test_image_count_limits() {
        let settings = upload_settings();

        assert!(validate_image_count(0, &settings).is_err());
        assert!(validate_image_count(1, &settings).is_ok());
        assert!(validate_image_count(3, &settings).is_ok());
        assert!(validate_image_count(4, &settings).is_err());
    }

    #[test]
    fn test_unit_score_boundary() {
        assert!(ensure_unit_score(0.0).is_ok());
        assert!(ensure_unit_score(1.0).is_ok());
        assert!(ensure_unit_score(0.42).is_ok());

        assert!(matches!(
            ensure_unit_score(1.01),
            Err(AppError::InvariantViolation(_))
        ));
        assert!(matches!(
            ensure_unit_score(f64::NAN),
            Err(AppError::InvariantViolation(_))
        ));
    }
}
