//! Roster preview example
//!
//! Reads a roster spreadsheet, shows what would be imported, and validates
//! every row locally without uploading anything.

use cert_desk::{Config, RosterImporter};
use std::path::Path;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "roster.xlsx".to_string());

    let config = Config::default();
    let importer = RosterImporter::new(config.import);

    let rows = importer.read_roster(Path::new(&path))?;
    println!("{} trainee rows in {}", rows.len(), path);

    for row in &rows {
        let name = row.full_name.as_deref().unwrap_or("(no name)");
        let start = row
            .course_start_date
            .as_ref()
            .map(|d| d.to_string())
            .unwrap_or_else(|| "-".to_string());
        let end = row
            .course_end_date
            .as_ref()
            .map(|d| d.to_string())
            .unwrap_or_else(|| "-".to_string());
        println!("  {name}: {start} -> {end}");
    }

    let report = importer.validate(&rows);
    println!("{}/{} rows pass validation", report.success, report.total);
    for result in report.results.iter().filter(|r| !r.success) {
        println!(
            "  ✗ {}: {}",
            result.full_name.as_deref().unwrap_or("(no name)"),
            result.message
        );
    }

    if report.all_ok() {
        println!("Roster is ready to import; use RosterImporter::import_into to upload it");
    }

    Ok(())
}
