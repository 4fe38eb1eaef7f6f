//! Roster spreadsheet import.
//!
//! Course rosters arrive as `.xlsx` files with one row per trainee. The
//! importer reads the first worksheet, maps the school's French column
//! headers, converts Excel serial dates, and validates every row locally
//! before the file is uploaded for server-side record creation. Any invalid
//! row blocks the upload so the operator can fix the spreadsheet instead of
//! ending up with a half-imported group.

mod dates;

pub use dates::{age_on, excel_serial_to_date};

use crate::client::ApiClient;
use crate::config::ImportConfig;
use crate::error::{Error, Result};
use crate::types::{ImportReport, RowOutcome};
use calamine::{Data, Range, Reader, open_workbook_auto};
use chrono::{NaiveDate, Utc};
use std::collections::HashMap;
use std::path::Path;

// Column headers as they appear in the school's roster spreadsheets
const COL_FULL_NAME: &str = "Nom complet";
const COL_BIRTH_DATE: &str = "Date de naissance";
const COL_BIRTH_PLACE: &str = "Lieu de naissance";
const COL_LEVEL: &str = "Niveau de référence";
const COL_START_DATE: &str = "Date de début";
const COL_END_DATE: &str = "Date de fin";
const COL_LESSON_UNITS: &str = "Nombre de leçons";
const COL_LESSONS_ATTENDED: &str = "Leçons suivies";
const COL_COMMENTS: &str = "Commentaires";
const COL_EVALUATION: &str = "Évaluation";

/// A date cell from a roster
///
/// Cells that held an Excel serial number are converted to a calendar date;
/// anything else is kept verbatim so the backend can decide what to do with
/// it. Validation only applies to converted dates, matching how operators
/// actually fill these sheets.
#[derive(Clone, Debug, PartialEq)]
pub enum RosterDate {
    /// Converted from an Excel serial number
    Date(NaiveDate),
    /// Raw text carried through unchanged
    Text(String),
}

impl std::fmt::Display for RosterDate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RosterDate::Date(date) => write!(f, "{}", date.format("%d/%m/%Y")),
            RosterDate::Text(text) => write!(f, "{text}"),
        }
    }
}

/// One trainee row from a roster spreadsheet
#[derive(Clone, Debug, Default)]
pub struct RosterRow {
    /// Trainee's full name
    pub full_name: Option<String>,
    /// Trainee's date of birth
    pub date_of_birth: Option<RosterDate>,
    /// Trainee's place of birth
    pub place_of_birth: Option<String>,
    /// CEFR reference level
    pub reference_level: Option<String>,
    /// First day of the course
    pub course_start_date: Option<RosterDate>,
    /// Last day of the course
    pub course_end_date: Option<RosterDate>,
    /// Number of lesson units in the course
    pub lesson_units: Option<u32>,
    /// Number of lessons attended
    pub lessons_attended: Option<u32>,
    /// Free-form comments
    pub comments: Option<String>,
    /// Evaluation result
    pub evaluation: Option<String>,
}

impl RosterRow {
    fn is_empty(&self) -> bool {
        self.full_name.is_none()
            && self.date_of_birth.is_none()
            && self.place_of_birth.is_none()
            && self.reference_level.is_none()
            && self.course_start_date.is_none()
            && self.course_end_date.is_none()
    }
}

/// Reads and validates roster spreadsheets
pub struct RosterImporter {
    config: ImportConfig,
}

impl RosterImporter {
    /// Create an importer with the given validation settings
    pub fn new(config: ImportConfig) -> Self {
        Self { config }
    }

    /// Read all trainee rows from the first worksheet of a spreadsheet file
    pub fn read_roster(&self, path: &Path) -> Result<Vec<RosterRow>> {
        let mut workbook = open_workbook_auto(path)?;
        let range = workbook
            .worksheet_range_at(0)
            .ok_or_else(|| Error::InvalidRoster("workbook has no worksheets".to_string()))??;

        let rows = rows_from_range(&range)?;
        tracing::info!(path = %path.display(), rows = rows.len(), "Roster read");
        Ok(rows)
    }

    /// Validate rows against today's date
    pub fn validate(&self, rows: &[RosterRow]) -> ImportReport {
        self.validate_on(rows, Utc::now().date_naive())
    }

    /// Validate rows against a fixed date
    ///
    /// Checks the minimum trainee age and that the course starts strictly
    /// before it ends. Both checks only apply when the relevant cells held
    /// convertible dates.
    pub fn validate_on(&self, rows: &[RosterRow], today: NaiveDate) -> ImportReport {
        let results: Vec<RowOutcome> = rows
            .iter()
            .map(|row| {
                let mut problems = Vec::new();

                if let Some(RosterDate::Date(birth)) = &row.date_of_birth
                    && age_on(*birth, today) < self.config.min_age_years as i32
                {
                    problems.push(format!(
                        "minimum trainee age is {} years",
                        self.config.min_age_years
                    ));
                }

                if let (Some(RosterDate::Date(start)), Some(RosterDate::Date(end))) =
                    (&row.course_start_date, &row.course_end_date)
                    && start >= end
                {
                    problems.push("course start date must be before the end date".to_string());
                }

                let success = problems.is_empty();
                RowOutcome {
                    full_name: row.full_name.clone(),
                    success,
                    message: if success {
                        "validation passed".to_string()
                    } else {
                        problems.join(", ")
                    },
                }
            })
            .collect();

        let success = results.iter().filter(|r| r.success).count();
        ImportReport {
            success,
            total: results.len(),
            results,
        }
    }

    /// Read, validate, and upload a roster file into a group
    ///
    /// When local validation rejects any row, the validation report is
    /// returned and nothing is uploaded. Otherwise the raw file goes to the
    /// backend, whose own per-row report is returned.
    pub async fn import_into(
        &self,
        client: &ApiClient,
        path: &Path,
        group_code: &str,
    ) -> Result<ImportReport> {
        let rows = self.read_roster(path)?;
        let preview = self.validate(&rows);
        if !preview.all_ok() {
            tracing::warn!(
                rejected = preview.total - preview.success,
                total = preview.total,
                "Roster rejected by local validation; nothing uploaded"
            );
            return Ok(preview);
        }

        let file = tokio::fs::read(path).await?;
        let filename = path
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or("roster.xlsx");
        client.import_roster(file, filename, group_code).await
    }
}

/// Extract trainee rows from a worksheet range
///
/// The first row must be the header row; a repeated header further down
/// (operators sometimes paste sheets together) is skipped, as are rows with
/// no identifying content at all.
pub fn rows_from_range(range: &Range<Data>) -> Result<Vec<RosterRow>> {
    let mut rows_iter = range.rows();
    let header = rows_iter
        .next()
        .ok_or_else(|| Error::InvalidRoster("worksheet is empty".to_string()))?;

    let columns: HashMap<String, usize> = header
        .iter()
        .enumerate()
        .filter_map(|(index, cell)| cell_string(cell).map(|name| (name, index)))
        .collect();

    if !columns.contains_key(COL_FULL_NAME) {
        return Err(Error::InvalidRoster(format!(
            "missing required column '{COL_FULL_NAME}'"
        )));
    }

    let cell = |row: &[Data], name: &str| -> Data {
        columns
            .get(name)
            .and_then(|&index| row.get(index))
            .cloned()
            .unwrap_or(Data::Empty)
    };

    let mut rows = Vec::new();
    for raw in rows_iter {
        let row = RosterRow {
            full_name: cell_string(&cell(raw, COL_FULL_NAME)),
            date_of_birth: cell_date(&cell(raw, COL_BIRTH_DATE)),
            place_of_birth: cell_string(&cell(raw, COL_BIRTH_PLACE)),
            reference_level: cell_string(&cell(raw, COL_LEVEL)),
            course_start_date: cell_date(&cell(raw, COL_START_DATE)),
            course_end_date: cell_date(&cell(raw, COL_END_DATE)),
            lesson_units: cell_u32(&cell(raw, COL_LESSON_UNITS)),
            lessons_attended: cell_u32(&cell(raw, COL_LESSONS_ATTENDED)),
            comments: cell_string(&cell(raw, COL_COMMENTS)),
            evaluation: cell_string(&cell(raw, COL_EVALUATION)),
        };

        // Repeated header row pasted into the data area
        if row.full_name.as_deref() == Some(COL_FULL_NAME) {
            continue;
        }
        if row.is_empty() {
            continue;
        }

        rows.push(row);
    }

    Ok(rows)
}

fn cell_string(data: &Data) -> Option<String> {
    match data {
        Data::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                None
            } else {
                Some(trimmed.to_string())
            }
        }
        Data::Float(f) => Some(f.to_string()),
        Data::Int(i) => Some(i.to_string()),
        Data::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn cell_date(data: &Data) -> Option<RosterDate> {
    match data {
        Data::Float(serial) => Some(serial_or_text(*serial)),
        Data::Int(serial) => Some(serial_or_text(*serial as f64)),
        Data::DateTime(dt) => Some(serial_or_text(dt.as_f64())),
        Data::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                None
            } else {
                Some(RosterDate::Text(trimmed.to_string()))
            }
        }
        _ => None,
    }
}

fn serial_or_text(serial: f64) -> RosterDate {
    match excel_serial_to_date(serial) {
        Some(date) => RosterDate::Date(date),
        None => RosterDate::Text(serial.to_string()),
    }
}

fn cell_u32(data: &Data) -> Option<u32> {
    match data {
        Data::Float(f) if *f >= 0.0 => Some(*f as u32),
        Data::Int(i) if *i >= 0 => Some(*i as u32),
        Data::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}
