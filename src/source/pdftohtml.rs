// src/source/pdftohtml.rs
use std::collections::HashMap;
use std::path::Path;
use std::process::Command;

use roxmltree::{Node, ParsingOptions};

use crate::source::models::{Document, Fragment, Page};
use crate::utils::error::SourceError;

// Font-name marker that identifies a bold (header) font
const BOLD_FONT_MARKER: &str = "Bold";

/// Converts a PDF with poppler's `pdftohtml -xml` and parses the result.
pub fn convert_pdf(pdftohtml_bin: &str, pdf_path: &Path) -> Result<Document, SourceError> {
    tracing::info!("Converting {} with {}", pdf_path.display(), pdftohtml_bin);

    let output = Command::new(pdftohtml_bin)
        .arg("-xml")
        .arg("-i") // Ignore images
        .arg("-q")
        .arg("-stdout")
        .arg(pdf_path)
        .output()
        .map_err(|e| {
            SourceError::Unavailable(format!("Failed to execute {}: {}", pdftohtml_bin, e))
        })?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        tracing::error!("{} exited with {} for {}", pdftohtml_bin, output.status, pdf_path.display());
        return Err(SourceError::Unavailable(format!(
            "{} returned non-zero exit status for {}: {}",
            pdftohtml_bin,
            pdf_path.display(),
            stderr.trim()
        )));
    }

    let xml = String::from_utf8_lossy(&output.stdout);
    tracing::debug!("Converter produced {} bytes of XML", xml.len());
    parse_xml(&xml)
}

/// Parses a `pdf2xml` document (the `pdftohtml -xml` output format).
///
/// Every `<page>` becomes a [`Page`], every `<text>` element a [`Fragment`].
/// A fragment is emphasized when all of its visible text is wrapped in `<b>`
/// or when its font family names a bold face.
pub fn parse_xml(xml: &str) -> Result<Document, SourceError> {
    let options = ParsingOptions {
        allow_dtd: true, // pdftohtml emits <!DOCTYPE pdf2xml SYSTEM "pdf2xml.dtd">
        ..ParsingOptions::default()
    };
    let tree = roxmltree::Document::parse_with_options(xml, options)
        .map_err(|e| SourceError::Unavailable(format!("Invalid pdf2xml document: {}", e)))?;

    if !tree.root_element().has_tag_name("pdf2xml") {
        return Err(SourceError::Unavailable(format!(
            "Unexpected root element <{}>, expected <pdf2xml>",
            tree.root_element().tag_name().name()
        )));
    }

    // Font specs are declared once and referenced from any later page
    let bold_fonts: HashMap<&str, bool> = tree
        .descendants()
        .filter(|n| n.has_tag_name("fontspec"))
        .filter_map(|n| {
            let id = n.attribute("id")?;
            let family = n.attribute("family").unwrap_or_default();
            Some((id, family.contains(BOLD_FONT_MARKER)))
        })
        .collect();

    let mut pages = Vec::new();
    for page_node in tree.root_element().children().filter(|n| n.has_tag_name("page")) {
        let fragments: Vec<Fragment> = page_node
            .descendants()
            .filter(|n| n.has_tag_name("text"))
            .map(|text_node| {
                let text: String = text_node
                    .descendants()
                    .filter(|n| n.is_text())
                    .filter_map(|n| n.text())
                    .collect();
                let bold_font = text_node
                    .attribute("font")
                    .and_then(|id| bold_fonts.get(id).copied())
                    .unwrap_or(false);
                let emphasized = bold_font || is_wrapped_in_bold(text_node);
                Fragment::new(text, emphasized, 0)
            })
            .collect();
        tracing::trace!(
            "Page {:?}: {} fragments",
            page_node.attribute("number"),
            fragments.len()
        );
        pages.push(Page::new(fragments));
    }

    tracing::debug!("Parsed {} pages from pdf2xml", pages.len());
    Ok(Document::new(pages))
}

/// True when every non-blank text run under `text_node` has a `<b>` ancestor.
fn is_wrapped_in_bold(text_node: Node) -> bool {
    let mut runs = text_node
        .descendants()
        .filter(|n| n.is_text())
        .filter(|n| n.text().map_or(false, |t| !t.trim().is_empty()))
        .peekable();

    if runs.peek().is_none() {
        return false;
    }

    runs.all(|run| {
        run.ancestors()
            .take_while(|a| *a != text_node)
            .any(|a| a.has_tag_name("b"))
    })
}
