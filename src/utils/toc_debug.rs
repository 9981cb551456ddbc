// src/utils/toc_debug.rs
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use crate::extractors::{IssueExtraction, LineOutcome, TocExtractor};
use crate::utils::error::AppError;

// Patterns highlighted in the annotated TOC region
const DEBUG_PATTERNS: [(&str, &str); 3] = [
    (r"\.{3,}", "leader"),
    (r"\d+$", "page"),
    (r"(?i)e-?mail", "email"),
];

fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;").replace('<', "&lt;").replace('>', "&gt;")
}

/// Saves text to an HTML file with debug highlights
pub fn save_debug_html(text: &str, filename: &Path, highlights: &[(usize, usize, &str)]) -> Result<(), AppError> {
    let mut file = File::create(filename)?;

    let mut debug_html = String::from("<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n<style>\n");

    // CSS for highlight colors
    debug_html.push_str("body { white-space: pre-wrap; font-family: monospace; }\n");
    debug_html.push_str(".highlight-leader { background-color: #FFFF00; }\n");
    debug_html.push_str(".highlight-page { background-color: #90EE90; }\n");
    debug_html.push_str(".highlight-email { background-color: #ADD8E6; }\n");
    debug_html.push_str(".highlight-custom { background-color: #FFC0CB; }\n");
    debug_html.push_str("</style>\n</head>\n<body>\n");

    let mut last_pos = 0;
    let mut sorted_highlights = highlights.to_vec();
    sorted_highlights.sort_by_key(|h| h.0); // Sort by position

    for (start, end, highlight_type) in sorted_highlights {
        // Overlapping matches keep the earlier highlight
        if start < last_pos {
            continue;
        }
        debug_html.push_str(&escape_html(&text[last_pos..start]));

        let css_class = match highlight_type {
            "leader" => "highlight-leader",
            "page" => "highlight-page",
            "email" => "highlight-email",
            _ => "highlight-custom",
        };

        debug_html.push_str(&format!("<span class=\"{}\" title=\"Position: {}-{}, Type: {}\">",
            css_class, start, end, highlight_type));
        debug_html.push_str(&escape_html(&text[start..end]));
        debug_html.push_str("</span>");

        last_pos = end;
    }

    if last_pos < text.len() {
        debug_html.push_str(&escape_html(&text[last_pos..]));
    }

    debug_html.push_str("\n</body>\n</html>");

    file.write_all(debug_html.as_bytes())?;

    tracing::info!("Saved debug HTML to {}", filename.display());
    Ok(())
}

/// Creates an HTML view of `text` with every match of the given patterns highlighted.
/// Patterns are matched line by line so `$` anchors to each line end.
pub fn create_debug_html(text: &str, filename: &Path, patterns: &[(&str, &str)]) -> Result<(), AppError> {
    use regex::RegexBuilder;

    let mut highlights = Vec::new();

    for (pattern, highlight_type) in patterns {
        let re = RegexBuilder::new(pattern)
            .multi_line(true)
            .build()
            .map_err(|e| AppError::Config(format!("Invalid regex pattern '{}': {}", pattern, e)))?;

        for mat in re.find_iter(text) {
            highlights.push((mat.start(), mat.end(), *highlight_type));
        }
    }

    save_debug_html(text, filename, &highlights)
}

/// Renders each logical TOC line with its parse outcome.
pub fn annotate_lines(toc: &TocExtractor, logical_lines: &[String]) -> String {
    let mut report = String::new();
    for line in logical_lines {
        let tag = match toc.classify_line(line) {
            LineOutcome::Parsed(entry) => format!("[p.{}]", entry.start_page),
            LineOutcome::Skipped => "[skip]".to_string(),
            LineOutcome::Dropped => "[DROP]".to_string(),
        };
        report.push_str(&format!("{:<8} {}\n", tag, line));
    }
    report
}

/// Writes the TOC debug artifacts into `dir`: raw region text, its annotated
/// HTML view and the per-line parse report.
pub fn save_toc_debug(dir: &Path, toc: &TocExtractor, extraction: &IssueExtraction) -> Result<Vec<PathBuf>, AppError> {
    fs::create_dir_all(dir)?;

    let raw_path = dir.join("toc_region.txt");
    fs::write(&raw_path, &extraction.toc_text)?;

    let html_path = dir.join("toc_region_annotated.html");
    create_debug_html(&extraction.toc_text, &html_path, &DEBUG_PATTERNS)?;

    let lines_path = dir.join("toc_lines.txt");
    fs::write(&lines_path, annotate_lines(toc, &extraction.logical_lines))?;

    Ok(vec![raw_path, html_path, lines_path])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_annotate_lines() {
        let toc = TocExtractor::default();
        let lines = vec![
            "Intro ..... 3".to_string(),
            "Broken ... here".to_string(),
            "Plain heading".to_string(),
        ];
        let report = annotate_lines(&toc, &lines);
        let rows: Vec<&str> = report.lines().collect();
        assert_eq!(rows[0], "[p.3]    Intro ..... 3");
        assert!(rows[1].starts_with("[DROP]"));
        assert!(rows[2].starts_with("[skip]"));
    }

    #[test]
    fn test_create_debug_html_escapes_and_highlights() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("toc.html");
        create_debug_html("A <b> ..... 12\nNext", &path, &DEBUG_PATTERNS).unwrap();

        let html = fs::read_to_string(&path).unwrap();
        assert!(html.contains("A &lt;b&gt; "));
        assert!(html.contains("<span class=\"highlight-leader\""));
        assert!(html.contains(">12</span>"));
    }

    #[test]
    fn test_invalid_pattern_is_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = create_debug_html("x", &dir.path().join("x.html"), &[("(", "custom")]);
        assert!(matches!(result, Err(AppError::Config(_))));
    }
}
