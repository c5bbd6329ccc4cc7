//! HTTP request handlers
//!
//! Implements the REST endpoints: health check, image analysis (JSON and
//! PDF download), and the lifestyle risk screening. Images within one
//! request are processed sequentially in upload order, and a failing
//! image yields a failure entry instead of aborting the batch.

use actix_multipart::Multipart;
use actix_web::{web, HttpResponse, Result};
use futures::TryStreamExt;
use tracing::{info, warn};

use crate::engine;
use crate::error::{AppError, AppResult};
use crate::inference::ModelRegistry;
use crate::models::{
    AnalysisReport, Gender, HealthCheck, ImageAnalysis, ImageFailure, LifestyleProfile,
    RiskFactors, ScreeningResult, SkinType,
};
use crate::normalize::ImageTensor;
use crate::report;
use crate::state::AppState;
use crate::validation::{
    ensure_unit_score, validate_image_count, validate_lifestyle_profile, validate_risk_factors,
    validate_upload,
};

/// Configure all application routes
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            // Health check
            .route("/health", web::get().to(health_check))
            // Face image analysis
            .route("/analysis", web::post().to(analyze))
            .route("/analysis/report", web::post().to(analyze_report))
            // Lifestyle risk screening
            .route("/screening", web::post().to(screening)),
    );
}

/// Health check endpoint
///
/// GET /api/health
pub async fn health_check(state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    let health = HealthCheck {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: chrono::Utc::now(),
        uptime_seconds: state.uptime_seconds(),
    };

    Ok(HttpResponse::Ok().json(health))
}

/// Analyze uploaded face images
///
/// POST /api/analysis
///
/// Multipart form: text fields `name`, `age`, `gender`, `water`, plus one
/// or more image file parts. Returns the full analysis report as JSON.
pub async fn analyze(
    payload: Multipart,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let form = collect_analysis_form(payload, &state).await?;
    let report = run_analysis(state.registry(), &form)?;

    Ok(HttpResponse::Ok().json(report))
}

/// Analyze uploaded face images and respond with the PDF report
///
/// POST /api/analysis/report
pub async fn analyze_report(
    payload: Multipart,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let form = collect_analysis_form(payload, &state).await?;
    let report = run_analysis(state.registry(), &form)?;

    if report.results.is_empty() {
        return Err(AppError::BadRequest(
            "None of the uploaded images could be analyzed".to_string(),
        ));
    }

    let pdf_bytes = report::render_pdf(&report.name, &report.results)?;

    Ok(HttpResponse::Ok()
        .content_type("application/pdf")
        .insert_header((
            "Content-Disposition",
            "attachment; filename=\"skincare_report.pdf\"",
        ))
        .body(pdf_bytes))
}

/// Screen one face image plus lifestyle factors for acne risk
///
/// POST /api/screening
///
/// Multipart form: text fields `sleep`, `water`, `junk`, `stress`, plus
/// exactly one image file part.
pub async fn screening(
    payload: Multipart,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let form = collect_screening_form(payload, &state).await?;
    validate_risk_factors(&form.factors)?;

    let tensor = ImageTensor::from_bytes(&form.image.bytes)?;
    let condition = state.registry().condition_classifier().classify(&tensor)?;

    let advice = engine::select_advice(condition).to_string();
    let risk = engine::compute_risk(
        form.factors.sleep_hours,
        form.factors.water_litres,
        form.factors.junk_food,
        form.factors.stress_level,
    );

    info!(
        condition = ?condition,
        risk_score = risk.score,
        risk_level = ?risk.level,
        "Screening completed"
    );

    Ok(HttpResponse::Ok().json(ScreeningResult {
        condition,
        advice,
        risk,
    }))
}

/// One uploaded image, labeled in upload order
struct UploadedImage {
    label: String,
    bytes: Vec<u8>,
}

/// Parsed analysis request. Image parts rejected during collection are
/// carried as failure entries so one bad upload never aborts the batch.
struct AnalysisForm {
    profile: LifestyleProfile,
    images: Vec<UploadedImage>,
    rejected: Vec<ImageFailure>,
}

/// Parsed screening request
struct ScreeningForm {
    factors: RiskFactors,
    image: UploadedImage,
}

/// Run the full pipeline over an analysis form: normalize, infer,
/// recommend, aggregate. Sequential, upload order preserved; per-image
/// failures are collected instead of aborting the batch.
fn run_analysis(registry: &ModelRegistry, form: &AnalysisForm) -> AppResult<AnalysisReport> {
    let mut results = Vec::new();
    let mut failures = form.rejected.clone();

    for image in &form.images {
        match analyze_single(registry, image, &form.profile) {
            Ok(result) => results.push(result),
            Err(e) => {
                warn!(label = %image.label, error = %e, "Image analysis failed, continuing batch");
                failures.push(ImageFailure {
                    label: image.label.clone(),
                    message: e.to_string(),
                });
            }
        }
    }

    let suggestion = registry
        .advisor()
        .advise(form.profile.age, form.profile.water_litres)?;

    info!(
        analyzed = results.len(),
        failed = failures.len(),
        "Analysis batch completed"
    );

    Ok(report::build_report(
        &form.profile.name,
        results,
        failures,
        suggestion,
    ))
}

/// Analyze one image: normalize, score, classify, recommend
fn analyze_single(
    registry: &ModelRegistry,
    image: &UploadedImage,
    profile: &LifestyleProfile,
) -> AppResult<ImageAnalysis> {
    let tensor = ImageTensor::from_bytes(&image.bytes)?;

    let score = ensure_unit_score(registry.scorer().predict_score(&tensor)?)?;
    let probs = registry.type_classifier().predict_type(&tensor)?;
    let skin_type = SkinType::from_class_index(argmax(&probs));

    let tips = engine::generate_tips(score, skin_type, profile.water_litres, profile.age);
    let routine = engine::generate_routine(skin_type);

    Ok(ImageAnalysis {
        label: image.label.clone(),
        skin_score: engine::score_percent(score),
        skin_type,
        tips,
        routine,
    })
}

/// Index of the largest probability; ties resolve to the first maximum
fn argmax(probs: &[f64; 4]) -> usize {
    probs
        .iter()
        .enumerate()
        .max_by(|a, b| a.1.total_cmp(b.1))
        .map(|(i, _)| i)
        // Unreachable for a fixed-size vector; Normal as the safe default
        .unwrap_or(2)
}

/// Collect and validate the analysis multipart form
async fn collect_analysis_form(
    mut payload: Multipart,
    state: &AppState,
) -> AppResult<AnalysisForm> {
    let mut name: Option<String> = None;
    let mut age: Option<u8> = None;
    let mut gender: Option<Gender> = None;
    let mut water: Option<u8> = None;
    let mut images: Vec<UploadedImage> = Vec::new();
    let mut rejected: Vec<ImageFailure> = Vec::new();
    let mut image_parts = 0usize;

    while let Some(mut field) = next_field(&mut payload).await? {
        let field_name = field.name().to_string();
        let filename = field
            .content_disposition()
            .get_filename()
            .map(|f| f.to_string());
        let data = read_field_bytes(&mut field).await?;

        match filename {
            Some(filename) => {
                // Labels follow upload order, rejected parts included
                image_parts += 1;
                let label = format!("Image {}", image_parts);

                match validate_upload(&filename, data.len(), state.upload_settings()) {
                    Ok(()) => images.push(UploadedImage { label, bytes: data }),
                    Err(e) => {
                        warn!(label = %label, error = %e, "Rejected upload, continuing batch");
                        rejected.push(ImageFailure {
                            label,
                            message: e.to_string(),
                        });
                    }
                }
            }
            None => {
                let value = text_value(&field_name, data)?;
                match field_name.as_str() {
                    "name" => name = Some(value),
                    "age" => age = Some(parse_number(&field_name, &value)?),
                    "gender" => {
                        gender = Some(Gender::parse(&value).ok_or_else(|| {
                            AppError::ValidationError(format!(
                                "Field 'gender' has invalid value '{}'. Valid: Male, Female, Other",
                                value
                            ))
                        })?)
                    }
                    "water" => water = Some(parse_number(&field_name, &value)?),
                    other => {
                        warn!(field = %other, "Ignoring unknown form field");
                    }
                }
            }
        }
    }

    let profile = LifestyleProfile {
        name: require_field("name", name)?,
        age: require_field("age", age)?,
        gender: require_field("gender", gender)?,
        water_litres: require_field("water", water)?,
    };

    validate_lifestyle_profile(&profile)?;
    // The count check covers every image part; only a request with no
    // image parts at all is rejected outright.
    validate_image_count(image_parts, state.upload_settings())?;

    Ok(AnalysisForm {
        profile,
        images,
        rejected,
    })
}

/// Collect and validate the screening multipart form
async fn collect_screening_form(
    mut payload: Multipart,
    state: &AppState,
) -> AppResult<ScreeningForm> {
    let mut sleep: Option<u8> = None;
    let mut water: Option<u8> = None;
    let mut junk: Option<bool> = None;
    let mut stress: Option<u8> = None;
    let mut image: Option<UploadedImage> = None;

    while let Some(mut field) = next_field(&mut payload).await? {
        let field_name = field.name().to_string();
        let filename = field
            .content_disposition()
            .get_filename()
            .map(|f| f.to_string());
        let data = read_field_bytes(&mut field).await?;

        match filename {
            Some(filename) => {
                if image.is_some() {
                    return Err(AppError::ValidationError(
                        "Screening accepts exactly one image".to_string(),
                    ));
                }
                validate_upload(&filename, data.len(), state.upload_settings())?;
                image = Some(UploadedImage {
                    label: "Image 1".to_string(),
                    bytes: data,
                });
            }
            None => {
                let value = text_value(&field_name, data)?;
                match field_name.as_str() {
                    "sleep" => sleep = Some(parse_number(&field_name, &value)?),
                    "water" => water = Some(parse_number(&field_name, &value)?),
                    "junk" => junk = Some(parse_flag(&field_name, &value)?),
                    "stress" => stress = Some(parse_number(&field_name, &value)?),
                    other => {
                        warn!(field = %other, "Ignoring unknown form field");
                    }
                }
            }
        }
    }

    let factors = RiskFactors {
        sleep_hours: require_field("sleep", sleep)?,
        water_litres: require_field("water", water)?,
        junk_food: require_field("junk", junk)?,
        stress_level: require_field("stress", stress)?,
    };

    let image = image.ok_or_else(|| {
        AppError::BadRequest("At least one face image is required".to_string())
    })?;

    Ok(ScreeningForm { factors, image })
}

/// Pull the next multipart field, mapping transport errors
async fn next_field(
    payload: &mut Multipart,
) -> AppResult<Option<actix_multipart::Field>> {
    payload
        .try_next()
        .await
        .map_err(|e| AppError::BadRequest(format!("Malformed multipart payload: {}", e)))
}

/// Drain one multipart field into memory
async fn read_field_bytes(field: &mut actix_multipart::Field) -> AppResult<Vec<u8>> {
    let mut data = Vec::new();
    while let Some(chunk) = field
        .try_next()
        .await
        .map_err(|e| AppError::BadRequest(format!("Malformed multipart payload: {}", e)))?
    {
        data.extend_from_slice(&chunk);
    }
    Ok(data)
}

fn text_value(field_name: &str, data: Vec<u8>) -> AppResult<String> {
    String::from_utf8(data).map_err(|_| {
        AppError::ValidationError(format!("Field '{}' is not valid UTF-8", field_name))
    })
}

fn parse_number<T: std::str::FromStr>(field_name: &str, value: &str) -> AppResult<T> {
    value.trim().parse().map_err(|_| {
        AppError::ValidationError(format!(
            "Field '{}' has invalid value '{}'",
            field_name, value
        ))
    })
}

/// Boolean form flag; the widget layer sends 0/1
fn parse_flag(field_name: &str, value: &str) -> AppResult<bool> {
    match value.trim() {
        "0" | "false" => Ok(false),
        "1" | "true" => Ok(true),
        other => Err(AppError::ValidationError(format!(
            "Field '{}' has invalid value '{}'",
            field_name, other
        ))),
    }
}

fn require_field<T>(field_name: &str, value: Option<T>) -> AppResult<T> {
    value.ok_or_else(|| AppError::BadRequest(format!("Missing form field '{}'", field_name)))
}
