#![warn(missing_docs)]
//! # cv-lens-analysis-contract
//!
//! ## Purpose
//! Maps raw analysis responses into presentation-ready display results.
//!
//! ## Responsibilities
//! - Parse raw response payloads against the canonical wire contract.
//! - Clamp percentages and resolve area categories to display metadata.
//! - Map percentages to qualitative fit levels.
//! - Format share text for the results screen.
//!
//! ## Data flow
//! Raw JSON response -> [`parse_analysis_response`] ->
//! [`map_display_results`] -> results list rendering and
//! [`build_share_text`].
//!
//! ## Ownership and lifetimes
//! Display results own their strings; category icons and colors are static
//! table entries, never allocated.
//!
//! ## Error model
//! Invalid JSON returns [`AnalysisContractError`]. Mapping itself is total:
//! absent or failed data yields an empty list, not an error.
//!
//! ## Contract notes
//! Unknown area categories map to a default icon and neutral color so newly
//! introduced service categories never crash client rendering.

use cv_lens_core::AnalysisResponse;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Neutral color assigned to categories outside the fixed table.
pub const DEFAULT_AREA_COLOR: &str = "#757575";

/// Share-sheet payload type for formatted results.
pub const SHARE_MIME_TYPE: &str = "text/plain";

/// Header line prepended to every share payload.
pub const SHARE_HEADER: &str = "📊 Resultados del análisis de CV:";

/// Icon reference for one professional-area category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AreaIcon {
    /// Legal practice.
    Legal,
    /// Finance.
    Finanzas,
    /// Marketing.
    Marketing,
    /// IT / systems.
    Sistemas,
    /// Administration.
    Administrativo,
    /// Human resources.
    Rrhh,
    /// Fallback for categories outside the fixed table.
    Default,
}

impl AreaIcon {
    /// Returns the host asset identifier for this icon.
    pub fn asset_name(&self) -> &'static str {
        match self {
            Self::Legal => "ic_area_legal",
            Self::Finanzas => "ic_area_finanzas",
            Self::Marketing => "ic_area_marketing",
            Self::Sistemas => "ic_area_sistemas",
            Self::Administrativo => "ic_area_administrativo",
            Self::Rrhh => "ic_area_rrhh",
            Self::Default => "ic_area_default",
        }
    }
}

/// Qualitative fit level derived from a percentage score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FitLevel {
    /// 85 and above.
    Excelente,
    /// 70 to 84.
    MuyBueno,
    /// 50 to 69.
    Bueno,
    /// 30 to 49.
    Regular,
    /// Below 30.
    NecesitaMejorar,
}

impl FitLevel {
    /// Returns the display label for this level.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Excelente => "Excelente",
            Self::MuyBueno => "Muy bueno",
            Self::Bueno => "Bueno",
            Self::Regular => "Regular",
            Self::NecesitaMejorar => "Necesita mejorar",
        }
    }
}

/// Maps a clamped percentage to its qualitative level.
///
/// Thresholds are evaluated highest-first and do not overlap.
pub fn level_for_percentage(percentage: u8) -> FitLevel {
    match percentage {
        85..=100 => FitLevel::Excelente,
        70..=84 => FitLevel::MuyBueno,
        50..=69 => FitLevel::Bueno,
        30..=49 => FitLevel::Regular,
        _ => FitLevel::NecesitaMejorar,
    }
}

/// One presentation-ready area score.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayResult {
    /// Area name as reported by the service.
    pub area: String,
    /// Percentage clamped to [0, 100].
    pub percentage: u8,
    /// Qualitative confidence indicator from the service.
    pub confianza: String,
    /// Resolved category icon.
    pub icon: AreaIcon,
    /// Resolved category color.
    pub color_hex: &'static str,
    /// Qualitative fit level for the clamped percentage.
    pub level: FitLevel,
}

/// Parses raw JSON into a validated analysis response.
///
/// Parsing is deliberately lenient beyond JSON validity: the service omits
/// optional fields freely and the client treats partial data as empty
/// results downstream.
///
/// # Errors
/// Returns [`AnalysisContractError::Decode`] for invalid JSON.
pub fn parse_analysis_response(raw: &str) -> Result<AnalysisResponse, AnalysisContractError> {
    serde_json::from_str(raw).map_err(AnalysisContractError::Decode)
}

/// Resolves a category key to its display icon and color.
///
/// The key is matched after lower-casing and trimming; misses resolve to the
/// default icon and neutral color.
pub fn area_display(area: &str) -> (AreaIcon, &'static str) {
    match area.trim().to_lowercase().as_str() {
        "legal" => (AreaIcon::Legal, "#4CAF50"),
        "finanzas" => (AreaIcon::Finanzas, "#FF9800"),
        "marketing" => (AreaIcon::Marketing, "#E91E63"),
        "sistemas" => (AreaIcon::Sistemas, "#9C27B0"),
        "administrativo" => (AreaIcon::Administrativo, "#2196F3"),
        "rrhh" => (AreaIcon::Rrhh, "#FFC107"),
        _ => (AreaIcon::Default, DEFAULT_AREA_COLOR),
    }
}

/// Clamps a raw wire percentage into the displayable [0, 100] range.
pub fn clamp_percentage(raw: i64) -> u8 {
    raw.clamp(0, 100) as u8
}

/// Maps an analysis response into presentation-ready results.
///
/// Total function: a failed response or an empty/absent area list yields an
/// empty vector, and the caller is responsible for surfacing the response's
/// `error` or a generic fallback message.
pub fn map_display_results(response: &AnalysisResponse) -> Vec<DisplayResult> {
    if !response.success {
        return Vec::new();
    }

    response
        .todas_las_areas
        .iter()
        .map(|area| {
            let (icon, color_hex) = area_display(&area.area);
            let percentage = clamp_percentage(area.porcentaje);
            DisplayResult {
                area: area.area.clone(),
                percentage,
                confianza: area.confianza.clone(),
                icon,
                color_hex,
                level: level_for_percentage(percentage),
            }
        })
        .collect()
}

/// Formats the share payload for a results list.
///
/// Returns `None` for an empty list so callers can show "nothing to share"
/// instead of sending an empty body.
pub fn build_share_text(results: &[DisplayResult]) -> Option<String> {
    if results.is_empty() {
        return None;
    }

    let body = results
        .iter()
        .map(|result| {
            format!(
                "- {}: {}% ({}, Confianza: {})",
                result.area,
                result.percentage,
                result.level.label(),
                result.confianza
            )
        })
        .collect::<Vec<_>>()
        .join("\n");

    Some(format!("{SHARE_HEADER}\n{body}"))
}

/// Analysis contract errors.
#[derive(Debug, Error)]
pub enum AnalysisContractError {
    /// JSON decode failure.
    #[error("analysis decode failure: {0}")]
    Decode(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    //! Unit tests for category resolution and share formatting.

    use cv_lens_core::AreaResult;

    use super::*;

    #[test]
    fn unknown_category_resolves_to_neutral_display() {
        let (icon, color) = area_display("quantum");
        assert_eq!(icon, AreaIcon::Default);
        assert_eq!(color, DEFAULT_AREA_COLOR);
    }

    #[test]
    fn mapping_clamps_out_of_range_percentages() {
        let response = AnalysisResponse {
            success: true,
            prediccion_principal: None,
            confianza_principal: None,
            todas_las_areas: vec![
                AreaResult {
                    area: "Sistemas".to_string(),
                    porcentaje: 140,
                    confianza: "alta".to_string(),
                },
                AreaResult {
                    area: "Legal".to_string(),
                    porcentaje: -3,
                    confianza: "baja".to_string(),
                },
            ],
            metadatos: None,
            archivo_info: None,
            error: None,
        };

        let results = map_display_results(&response);
        assert_eq!(results[0].percentage, 100);
        assert_eq!(results[1].percentage, 0);
    }

    #[test]
    fn share_text_is_withheld_for_empty_results() {
        assert_eq!(build_share_text(&[]), None);
    }
}
