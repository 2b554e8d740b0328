//! Spreadsheet export of the application list

use crate::model::ApplicationRecord;
use crate::{Error, Result};

pub const CSV_HEADERS: [&str; 8] = [
    "Name",
    "Phone",
    "Birth Date",
    "Marital Status",
    "Ministry",
    "Status",
    "Registered At",
    "Observation",
];

/// Render applications as CSV, one row each, in the given order
pub fn applications_csv<'a>(
    applications: impl IntoIterator<Item = &'a ApplicationRecord>,
) -> Result<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(CSV_HEADERS).map_err(csv_error)?;

    for app in applications {
        let birth_date = app
            .answers
            .birth_date
            .map(|d| d.format("%Y-%m-%d").to_string())
            .unwrap_or_default();
        let registered_at = app.registered_at.format("%Y-%m-%d %H:%M").to_string();

        writer
            .write_record([
                app.answers.full_name.as_str(),
                app.answers.phone.as_str(),
                birth_date.as_str(),
                app.answers.marital_status.as_str(),
                app.answers.ministry.as_str(),
                app.status.label(),
                registered_at.as_str(),
                app.observation.as_str(),
            ])
            .map_err(csv_error)?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| Error::Internal(format!("CSV flush failed: {}", e)))?;
    String::from_utf8(bytes).map_err(|e| Error::Internal(format!("CSV is not UTF-8: {}", e)))
}

fn csv_error(e: csv::Error) -> Error {
    Error::Internal(format!("CSV export failed: {}", e))
}
