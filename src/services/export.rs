// SPDX-License-Identifier: MIT

//! Marketplace CSV export.
//!
//! Each marketplace is a fixed column list, where a column is a header plus
//! a value extractor over one analysis result. Adding a marketplace means
//! adding a table entry, not another branch.
//!
//! Every cell is quoted with embedded quotes doubled, and the output starts
//! with a UTF-8 BOM so spreadsheet applications detect the encoding for
//! non-Latin scripts.

use crate::models::AnalysisResult;

const BOM: &str = "\u{FEFF}";

/// Target stock-media marketplace.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Marketplace {
    Shutterstock,
    AdobeStock,
    Freepik,
    Vecteezy,
    Generic,
}

impl Marketplace {
    /// Parse the client's marketplace identifier; unknown values get the
    /// generic layout.
    pub fn parse(value: &str) -> Self {
        match value.to_ascii_lowercase().as_str() {
            "shutterstock" => Self::Shutterstock,
            "adobestock" => Self::AdobeStock,
            "freepik" => Self::Freepik,
            "vecteezy" => Self::Vecteezy,
            _ => Self::Generic,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Shutterstock => "shutterstock",
            Self::AdobeStock => "adobestock",
            Self::Freepik => "freepik",
            Self::Vecteezy => "vecteezy",
            Self::Generic => "generic",
        }
    }

    /// Suggested download filename.
    pub fn export_filename(self) -> String {
        format!("{}_results.csv", self.name())
    }

    fn columns(self) -> &'static [Column] {
        match self {
            Self::Shutterstock => &[
                Column("Filename", |r| normalized_filename(&r.filename)),
                Column("Description", |r| title(r)),
                Column("Keywords", |r| keywords(r, ",")),
                // Shutterstock takes a single category
                Column("Categories", |r| first_category(r)),
                Column("Editorial", |_| "no".to_string()),
                Column("Mature content", |_| "no".to_string()),
                Column("Illustration", |_| "no".to_string()),
            ],
            Self::AdobeStock => &[
                Column("Filename", |r| normalized_filename(&r.filename)),
                Column("Title", |r| title(r)),
                Column("Keywords", |r| keywords(r, ",")),
                Column("Description", |r| description(r)),
                Column("Category", |r| categories(r, ", ")),
            ],
            // Freepik has no description column
            Self::Freepik => &[
                Column("Filename", |r| normalized_filename(&r.filename)),
                Column("Title", |r| title(r)),
                Column("Keywords", |r| keywords(r, ",")),
            ],
            Self::Vecteezy => &[
                Column("Filename", |r| normalized_filename(&r.filename)),
                Column("Title", |r| title(r)),
                Column("Description", |r| description(r)),
                Column("Keywords", |r| keywords(r, ",")),
                Column("Image Type", |_| "Photo".to_string()),
            ],
            Self::Generic => &[
                Column("Filename", |r| normalized_filename(&r.filename)),
                Column("Title", |r| title(r)),
                Column("Keywords", |r| keywords(r, "|")),
                Column("Description", |r| description(r)),
                Column("Category", |r| categories(r, "|")),
            ],
        }
    }
}

struct Column(&'static str, fn(&AnalysisResult) -> String);

/// Render metadata results as CSV for a marketplace.
pub fn write_csv(results: &[AnalysisResult], marketplace: Marketplace) -> String {
    let columns = marketplace.columns();
    let mut out = String::from(BOM);

    let header: Vec<String> = columns.iter().map(|c| quote(c.0)).collect();
    out.push_str(&header.join(","));

    for result in results {
        out.push('\n');
        let row: Vec<String> = columns.iter().map(|c| quote(&(c.1)(result))).collect();
        out.push_str(&row.join(","));
    }

    out
}

/// Render prompt-mode results as a single-column CSV, marketplace ignored.
pub fn write_prompt_csv(results: &[AnalysisResult]) -> String {
    let mut out = String::from(BOM);
    out.push_str(&quote("Prompt"));
    for result in results {
        out.push('\n');
        out.push_str(&quote(result.prompt.as_deref().unwrap_or_default()));
    }
    out
}

/// Quote a cell, doubling embedded quote characters.
fn quote(value: &str) -> String {
    format!("\"{}\"", value.replace('"', "\"\""))
}

/// Original name with its extension replaced by the normalized output
/// extension.
fn normalized_filename(original: &str) -> String {
    let stem = match original.rsplit_once('.') {
        Some((stem, _)) if !stem.is_empty() => stem,
        _ => original,
    };
    format!("{}.jpg", stem)
}

fn title(result: &AnalysisResult) -> String {
    result
        .metadata
        .as_ref()
        .map(|m| m.title.clone())
        .unwrap_or_default()
}

fn description(result: &AnalysisResult) -> String {
    result
        .metadata
        .as_ref()
        .map(|m| m.description.clone())
        .unwrap_or_default()
}

fn keywords(result: &AnalysisResult, separator: &str) -> String {
    result
        .metadata
        .as_ref()
        .map(|m| m.keywords.join(separator))
        .unwrap_or_default()
}

fn categories(result: &AnalysisResult, separator: &str) -> String {
    result
        .metadata
        .as_ref()
        .map(|m| m.category.join(separator))
        .unwrap_or_default()
}

fn first_category(result: &AnalysisResult) -> String {
    result
        .metadata
        .as_ref()
        .and_then(|m| m.category.first().cloned())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ImageMetadata;

    fn result(filename: &str, title: &str) -> AnalysisResult {
        AnalysisResult {
            filename: filename.to_string(),
            mime_type: "image/jpeg".to_string(),
            content_sha256: "00".repeat(32),
            metadata: Some(ImageMetadata {
                title: title.to_string(),
                keywords: vec!["car".to_string(), "red".to_string(), "vehicle".to_string()],
                description: "A red car".to_string(),
                category: vec!["Transportation".to_string(), "Auto".to_string()],
            }),
            prompt: Some("A red car on a road".to_string()),
            raw_response: String::new(),
        }
    }

    #[test]
    fn test_marketplace_parse() {
        assert_eq!(Marketplace::parse("shutterstock"), Marketplace::Shutterstock);
        assert_eq!(Marketplace::parse("Shutterstock"), Marketplace::Shutterstock);
        assert_eq!(Marketplace::parse("adobestock"), Marketplace::AdobeStock);
        assert_eq!(Marketplace::parse("something-else"), Marketplace::Generic);
        assert_eq!(Marketplace::parse(""), Marketplace::Generic);
    }

    #[test]
    fn test_output_starts_with_bom() {
        let csv = write_csv(&[result("a.png", "T")], Marketplace::Generic);
        assert!(csv.starts_with('\u{FEFF}'));
        let csv = write_prompt_csv(&[result("a.png", "T")]);
        assert!(csv.starts_with('\u{FEFF}'));
    }

    #[test]
    fn test_all_cells_quoted_and_quotes_doubled() {
        let csv = write_csv(
            &[result("a.png", "A \"quoted\" title, with comma")],
            Marketplace::Generic,
        );
        let lines: Vec<&str> = csv.trim_start_matches('\u{FEFF}').lines().collect();
        assert_eq!(
            lines[0],
            "\"Filename\",\"Title\",\"Keywords\",\"Description\",\"Category\""
        );
        assert!(lines[1].contains("\"A \"\"quoted\"\" title, with comma\""));
        assert!(lines[1].starts_with("\"a.jpg\""));
    }

    #[test]
    fn test_filename_extension_normalized() {
        assert_eq!(normalized_filename("photo.png"), "photo.jpg");
        assert_eq!(normalized_filename("archive.tar.webp"), "archive.tar.jpg");
        assert_eq!(normalized_filename("noextension"), "noextension.jpg");
        assert_eq!(normalized_filename(".hidden"), ".hidden.jpg");
    }

    #[test]
    fn test_shutterstock_layout() {
        let csv = write_csv(&[result("car.webp", "Red Car")], Marketplace::Shutterstock);
        let lines: Vec<&str> = csv.trim_start_matches('\u{FEFF}').lines().collect();
        assert_eq!(
            lines[0],
            "\"Filename\",\"Description\",\"Keywords\",\"Categories\",\"Editorial\",\"Mature content\",\"Illustration\""
        );
        // Single category and the boolean columns
        assert_eq!(
            lines[1],
            "\"car.jpg\",\"Red Car\",\"car,red,vehicle\",\"Transportation\",\"no\",\"no\",\"no\""
        );
    }

    #[test]
    fn test_freepik_omits_description() {
        let csv = write_csv(&[result("a.png", "T")], Marketplace::Freepik);
        let lines: Vec<&str> = csv.trim_start_matches('\u{FEFF}').lines().collect();
        assert_eq!(lines[0], "\"Filename\",\"Title\",\"Keywords\"");
        assert!(!csv.contains("A red car"));
    }

    #[test]
    fn test_vecteezy_image_type_column() {
        let csv = write_csv(&[result("a.png", "T")], Marketplace::Vecteezy);
        assert!(csv.lines().nth(1).unwrap().ends_with("\"Photo\""));
    }

    #[test]
    fn test_generic_joins_lists_with_pipe() {
        let csv = write_csv(&[result("a.png", "T")], Marketplace::Generic);
        let row = csv.lines().nth(1).unwrap();
        assert!(row.contains("\"car|red|vehicle\""));
        assert!(row.contains("\"Transportation|Auto\""));
    }

    #[test]
    fn test_prompt_export_single_column() {
        let csv = write_prompt_csv(&[result("a.png", "T"), result("b.png", "U")]);
        let lines: Vec<&str> = csv.trim_start_matches('\u{FEFF}').lines().collect();
        assert_eq!(lines[0], "\"Prompt\"");
        assert_eq!(lines[1], "\"A red car on a road\"");
        assert_eq!(lines.len(), 3);
    }

    #[test]
    fn test_missing_metadata_yields_empty_cells() {
        let mut r = result("a.png", "T");
        r.metadata = None;
        let csv = write_csv(&[r], Marketplace::AdobeStock);
        assert_eq!(
            csv.lines().nth(1).unwrap(),
            "\"a.jpg\",\"\",\"\",\"\",\"\""
        );
    }
}
