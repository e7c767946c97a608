//! Export file construction

use super::types::ExportFile;
use crate::error::{Error, Result};
use serde_json::Value;
use time::Date;
use time::macros::format_description;

/// Build the download for `document`, stamped with `date`
///
/// # Errors
///
/// Returns `Error::ExportFailed` if the date or document cannot be formatted.
pub fn build_export(document: &Value, date: Date) -> Result<ExportFile> {
    let stamp = date
        .format(format_description!("[year]-[month]-[day]"))
        .map_err(|e| Error::ExportFailed(e.to_string()))?;
    let body =
        serde_json::to_string_pretty(document).map_err(|e| Error::ExportFailed(e.to_string()))?;

    Ok(ExportFile {
        file_name: format!("settings-export-{stamp}.json"),
        body,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use time::macros::date;

    #[test]
    fn test_file_name_is_date_stamped() {
        let file = build_export(&json!({}), date!(2024 - 02 - 09)).unwrap();
        assert_eq!(file.file_name, "settings-export-2024-02-09.json");
    }

    #[test]
    fn test_body_is_pretty_and_keeps_unicode() {
        let doc = json!({"general": {"description": "Café für alle ✓"}});
        let file = build_export(&doc, date!(2024 - 01 - 01)).unwrap();

        assert!(file.body.contains("Café für alle ✓"));
        assert!(file.body.contains("\n  \"general\""));
        assert_eq!(serde_json::from_str::<Value>(&file.body).unwrap(), doc);
    }
}
