//! Monthly electricity readings appended to a tracking workbook.

use chrono::NaiveDate;
use log::info;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::xlsx::append_sheet_copy;
use super::TemplateError;

pub const CELL_PREVIOUS_BPO: &str = "F5";
pub const CELL_CURRENT_BPO: &str = "G5";
pub const CELL_PREVIOUS_DORMITORY: &str = "F6";
pub const CELL_CURRENT_DORMITORY: &str = "G6";

/// Meter readings for the BPO building and the dormitory.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct MeterReadings {
    pub previous_bpo: String,
    pub current_bpo: String,
    pub previous_dormitory: String,
    pub current_dormitory: String,
}

/// Title of the sheet added for `date`, e.g. `March 2025`.
pub fn month_title(date: NaiveDate) -> String {
    date.format("%B %Y").to_string()
}

/// Copies the last sheet of `workbook` into a new month sheet and writes the
/// readings into it. Returns the updated workbook and the sheet title used.
pub fn append_month_sheet(
    workbook: &[u8],
    date: NaiveDate,
    readings: &MeterReadings,
) -> Result<(Vec<u8>, String), TemplateError> {
    let cells = [
        (CELL_PREVIOUS_BPO, readings.previous_bpo.trim().to_string()),
        (CELL_CURRENT_BPO, readings.current_bpo.trim().to_string()),
        (CELL_PREVIOUS_DORMITORY, readings.previous_dormitory.trim().to_string()),
        (CELL_CURRENT_DORMITORY, readings.current_dormitory.trim().to_string()),
    ];
    let (bytes, title) = append_sheet_copy(workbook, &month_title(date), &cells)?;
    info!("Appended electricity sheet '{}'", title);
    Ok((bytes, title))
}
