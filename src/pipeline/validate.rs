//! Upload validation: decide from the file name alone whether an upload is accepted.
//!
//! The extension is the text after the last `.`, compared case-insensitively
//! against a fixed allow-list. File contents are never inspected, so a
//! renamed file passes as whatever its name claims.

/// Extensions accepted for upload.
pub const ALLOWED_EXTENSIONS: [&str; 4] = ["pdf", "jpg", "jpeg", "png"];

/// How an accepted upload is processed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    /// Rasterised page by page, each page recognised and logged.
    Pdf,
    /// Recognised directly; the text is echoed back to the user.
    Image,
}

impl DocumentKind {
    /// Classify a file name, or `None` if its extension is not allowed.
    pub fn from_filename(filename: &str) -> Option<Self> {
        match extension(filename).as_str() {
            "pdf" => Some(DocumentKind::Pdf),
            "jpg" | "jpeg" | "png" => Some(DocumentKind::Image),
            _ => None,
        }
    }
}

/// Lower-cased text after the last `.`; the whole name when there is no `.`.
pub fn extension(filename: &str) -> String {
    filename
        .rsplit('.')
        .next()
        .unwrap_or(filename)
        .to_lowercase()
}

/// `true` if the file name carries one of [`ALLOWED_EXTENSIONS`].
pub fn validate(filename: &str) -> bool {
    ALLOWED_EXTENSIONS.contains(&extension(filename).as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_allow_listed_extensions_in_any_case() {
        assert!(validate("report.PDF"));
        assert!(validate("report.pdf"));
        assert!(validate("scan.JpG"));
        assert!(validate("scan.jpeg"));
        assert!(validate("floorplan.png"));
    }

    #[test]
    fn rejects_other_extensions() {
        assert!(!validate("image.bmp"));
        assert!(!validate("archive.pdf.zip"));
        assert!(!validate("trailing."));
    }

    #[test]
    fn rejects_names_without_extension() {
        assert!(!validate("noext"));
        assert!(!validate(""));
        // the whole name is the "extension" when there is no dot
        assert!(!validate("pdf_report"));
    }

    #[test]
    fn only_last_extension_counts() {
        assert!(validate("backup.zip.pdf"));
        assert_eq!(extension("a.b.C"), "c");
    }

    #[test]
    fn classifies_kind() {
        assert_eq!(DocumentKind::from_filename("x.Pdf"), Some(DocumentKind::Pdf));
        assert_eq!(DocumentKind::from_filename("x.jpeg"), Some(DocumentKind::Image));
        assert_eq!(DocumentKind::from_filename("x.gif"), None);
    }
}
