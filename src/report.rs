//! Report aggregation and PDF export
//!
//! Collects per-image results into the summary table and renders the
//! downloadable PDF document. Produces bytes only; handing them to the
//! client is the handler's job.

use printpdf::{BuiltinFont, Mm, PdfDocument};

use crate::error::{AppError, AppResult};
use crate::models::{AnalysisReport, ImageAnalysis, ImageFailure, ReportRow};

const PAGE_WIDTH: f32 = 210.0;
const PAGE_HEIGHT: f32 = 297.0;
const MARGIN: f32 = 20.0;

const TITLE_SIZE: f32 = 16.0;
const BODY_SIZE: f32 = 12.0;

/// Vertical advance per field line, mm
const FIELD_STEP: f32 = 10.0;
/// Vertical advance per routine bullet, mm
const BULLET_STEP: f32 = 8.0;
/// Extra gap between image sections, mm
const SECTION_GAP: f32 = 5.0;
/// Gap below the title, mm
const TITLE_GAP: f32 = 10.0;

/// Assemble the full analysis report. Row order matches upload order;
/// the summary table is a projection of the per-image results.
pub fn build_report(
    name: &str,
    results: Vec<ImageAnalysis>,
    failures: Vec<ImageFailure>,
    lifestyle_suggestion: String,
) -> AnalysisReport {
    let table = results
        .iter()
        .map(|r| ReportRow {
            label: r.label.clone(),
            score: r.skin_score,
            skin_type: r.skin_type,
        })
        .collect();

    AnalysisReport {
        name: name.to_string(),
        table,
        results,
        failures,
        lifestyle_suggestion,
    }
}

/// Render the per-image results as a paginated PDF document.
///
/// Layout: centered bold title "Skincare Report for {name}", then one
/// section per image with a bold label, score and skin-type lines, and
/// the routine as a bulleted list.
pub fn render_pdf(name: &str, results: &[ImageAnalysis]) -> AppResult<Vec<u8>> {
    let title = format!("Skincare Report for {}", name);
    let (doc, first_page, first_layer) =
        PdfDocument::new(title.as_str(), Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), "Layer 1");

    let bold = doc
        .add_builtin_font(BuiltinFont::HelveticaBold)
        .map_err(|e| AppError::ReportError(e.to_string()))?;
    let regular = doc
        .add_builtin_font(BuiltinFont::Helvetica)
        .map_err(|e| AppError::ReportError(e.to_string()))?;

    let mut layer = doc.get_page(first_page).get_layer(first_layer);
    let mut y = PAGE_HEIGHT - MARGIN;

    // Builtin fonts expose no glyph metrics; center with an average-width
    // approximation.
    let title_width = approx_text_width_mm(&title, TITLE_SIZE);
    let title_x = ((PAGE_WIDTH - title_width) / 2.0).max(MARGIN);
    layer.use_text(title.clone(), TITLE_SIZE, Mm(title_x), Mm(y), &bold);
    y -= TITLE_GAP + FIELD_STEP;

    for result in results {
        let section_height =
            4.0 * FIELD_STEP + BULLET_STEP * result.routine.len() as f32 + SECTION_GAP;

        if y - section_height < MARGIN {
            let (page, page_layer) = doc.add_page(Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), "Layer 1");
            layer = doc.get_page(page).get_layer(page_layer);
            y = PAGE_HEIGHT - MARGIN;
        }

        layer.use_text(format!("{}:", result.label), BODY_SIZE, Mm(MARGIN), Mm(y), &bold);
        y -= FIELD_STEP;

        layer.use_text(
            format!("Score: {:.2}%", result.skin_score),
            BODY_SIZE,
            Mm(MARGIN),
            Mm(y),
            &regular,
        );
        y -= FIELD_STEP;

        layer.use_text(
            format!("Skin Type: {}", result.skin_type),
            BODY_SIZE,
            Mm(MARGIN),
            Mm(y),
            &regular,
        );
        y -= FIELD_STEP;

        layer.use_text("Recommended Routine:", BODY_SIZE, Mm(MARGIN), Mm(y), &regular);
        y -= FIELD_STEP;

        for step in &result.routine {
            layer.use_text(format!("- {}", step), BODY_SIZE, Mm(MARGIN), Mm(y), &regular);
            y -= BULLET_STEP;
        }

        y -= SECTION_GAP;
    }

    doc.save_to_bytes()
        .map_err(|e| AppError::ReportError(e.to_string()))
}

/// Rough width of Helvetica text in millimetres (average glyph ~0.5em)
fn approx_text_width_mm(text: &str, font_size_pt: f32) -> f32 {
    const PT_TO_MM: f32 = 0.352_778;
    text.chars().count() as f32 * font_size_pt * 0.5 * PT_TO_MM
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SkinType;

    fn sample_result(index: usize) -> ImageAnalysis {
        ImageAnalysis {
            label: format!("Image {}", index),
            skin_score: 75.5,
            skin_type: SkinType::Dry,
            tips: vec!["Use hydrating creams and avoid harsh soaps.".to_string()],
            routine: vec![
                "Use gentle cleanser".to_string(),
                "Apply hydrating moisturizer".to_string(),
                "Use night cream".to_string(),
            ],
        }
    }

    #[test]
    fn test_report_row_count_and_order() {
        let results: Vec<ImageAnalysis> = (1..=4).map(sample_result).collect();
        let report = build_report("User", results, Vec::new(), "ok".to_string());

        assert_eq!(report.table.len(), 4);
        for (i, row) in report.table.iter().enumerate() {
            assert_eq!(row.label, format!("Image {}", i + 1));
        }
        assert_eq!(report.table.len(), report.results.len());
    }

    #[test]
    fn test_report_keeps_failures() {
        let results = vec![sample_result(1)];
        let failures = vec![ImageFailure {
            label: "Image 2".to_string(),
            message: "Invalid or unsupported image".to_string(),
        }];

        let report = build_report("User", results, failures, "ok".to_string());

        assert_eq!(report.results.len(), 1);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].label, "Image 2");
    }

    #[test]
    fn test_render_pdf_produces_pdf_bytes() {
        let results = vec![sample_result(1), sample_result(2)];
        let bytes = render_pdf("User", &results).unwrap();

        assert!(bytes.len() > 100);
        assert_eq!(&bytes[..5], b"%PDF-");
    }

    #[test]
    fn test_render_pdf_paginates_large_batches() {
        // Enough sections to overflow a single A4 page
        let results: Vec<ImageAnalysis> = (1..=30).map(sample_result).collect();
        let bytes = render_pdf("User", &results).unwrap();

        assert_eq!(&bytes[..5], b"%PDF-");
    }

    #[test]
    fn test_render_pdf_empty_name_still_renders() {
        let bytes = render_pdf("", &[sample_result(1)]).unwrap();
        assert_eq!(&bytes[..5], b"%PDF-");
    }
}
