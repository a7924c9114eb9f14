use docsift_core::{FileKind, SuffixTable};

fn matches_any(name: &str, suffixes: &[String]) -> bool {
    suffixes.iter().any(|s| name.ends_with(s.as_str()))
}

/// Map a file name to its kind by suffix.
///
/// Checked in a fixed order: pdf, markdown, image, text, word, spreadsheet.
/// Matching ignores ASCII case.
pub fn classify(file_name: &str, suffixes: &SuffixTable) -> FileKind {
    let name = file_name.to_ascii_lowercase();

    if matches_any(&name, &suffixes.pdf) {
        FileKind::Pdf
    } else if matches_any(&name, &suffixes.markdown) {
        FileKind::Markdown
    } else if matches_any(&name, &suffixes.image) {
        FileKind::Image
    } else if matches_any(&name, &suffixes.text) {
        FileKind::Text
    } else if matches_any(&name, &suffixes.word) {
        FileKind::Word
    } else if matches_any(&name, &suffixes.excel) {
        FileKind::Excel
    } else {
        FileKind::Unknown
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kind(name: &str) -> FileKind {
        classify(name, &SuffixTable::default())
    }

    #[test]
    fn recognizes_every_default_suffix() {
        assert_eq!(kind("a.pdf"), FileKind::Pdf);
        assert_eq!(kind("a.md"), FileKind::Markdown);
        assert_eq!(kind("a.txt"), FileKind::Text);
        assert_eq!(kind("a.text"), FileKind::Text);
        assert_eq!(kind("a.docx"), FileKind::Word);
        assert_eq!(kind("a.doc"), FileKind::Word);
        assert_eq!(kind("a.xlsx"), FileKind::Excel);
        assert_eq!(kind("a.xls"), FileKind::Excel);
        assert_eq!(kind("a.csv"), FileKind::Excel);
        for image in ["a.jpg", "a.jpeg", "a.png", "a.bmp"] {
            assert_eq!(kind(image), FileKind::Image);
        }
    }

    #[test]
    fn unmatched_names_are_unknown() {
        assert_eq!(kind("archive.tar.gz"), FileKind::Unknown);
        assert_eq!(kind("Makefile"), FileKind::Unknown);
        assert_eq!(kind("notes.md.bak"), FileKind::Unknown);
        assert_eq!(kind(""), FileKind::Unknown);
    }

    #[test]
    fn ignores_case() {
        assert_eq!(kind("REPORT.PDF"), FileKind::Pdf);
        assert_eq!(kind("Sheet.XLSX"), FileKind::Excel);
    }

    #[test]
    fn repeated_calls_agree() {
        for name in ["x.pdf", "y.csv", "z.bin", "w.png"] {
            assert_eq!(kind(name), kind(name));
        }
    }

    #[test]
    fn uses_the_supplied_table() {
        let mut table = SuffixTable::default();
        table.text.push(".log".to_string());
        assert_eq!(classify("server.log", &table), FileKind::Text);
        assert_eq!(kind("server.log"), FileKind::Unknown);
    }
}
