//! Recovery of the XML data fragment from a raw response body.
//!
//! The service wraps its `<data>...</data>` payload in a variable number of
//! preamble and postamble lines whose count is not contractually fixed.
//! Extraction is therefore heuristic: scan for the data-container markers,
//! falling back to the fixed line offsets older response shapes used.

use thiserror::Error;

/// Substring marking the line where the data container opens.
const DATA_START_MARKER: &str = "<data";

/// Substring marking the line where the data container closes.
const DATA_END_MARKER: &str = "</data>";

/// Line offset of the payload in the legacy response shape.
const LEGACY_HEADER_LINES: usize = 8;

/// Error returned when a response body is not valid UTF-8 text.
#[derive(Error, Debug)]
#[error("response body is not valid UTF-8: {0}")]
pub struct DecodeError(#[from] std::str::Utf8Error);

/// The data-bearing lines recovered from one response body.
///
/// A fragment is still missing an enclosing root element unless the body
/// already arrived as a full self-describing document, in which case
/// [`Fragment::has_prolog`] is set and [`Fragment::to_document`] passes it
/// through untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Fragment {
    lines: Vec<String>,
    has_prolog: bool,
}

impl Fragment {
    /// Returns an empty fragment.
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            lines: Vec::new(),
            has_prolog: false,
        }
    }

    /// Returns true if the fragment holds no meaningful lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.iter().all(|line| line.trim().is_empty())
    }

    /// Returns the fragment's lines.
    #[must_use]
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// Returns true if the fragment is already a full document with an
    /// XML prolog.
    #[must_use]
    pub const fn has_prolog(&self) -> bool {
        self.has_prolog
    }

    /// Produces a parseable document from the fragment.
    ///
    /// Fragments are wrapped in a synthetic `<x>` root; bodies that already
    /// carried a prolog are returned as-is.
    #[must_use]
    pub fn to_document(&self) -> String {
        if self.has_prolog {
            return self.lines.join("\n");
        }
        let mut doc = String::from("<x>\n");
        for line in &self.lines {
            doc.push_str(line);
            doc.push('\n');
        }
        doc.push_str("</x>");
        doc
    }

    #[cfg(test)]
    pub(crate) fn from_lines(lines: Vec<String>) -> Self {
        Self {
            lines,
            has_prolog: false,
        }
    }
}

/// Extracts the data fragment from a raw response body.
///
/// The scan tolerates extra blank lines, a full self-describing document
/// already present, and completely empty bodies.
///
/// # Errors
///
/// Returns [`DecodeError`] if the body is not valid UTF-8 text.
pub fn extract(raw: &[u8]) -> Result<Fragment, DecodeError> {
    let text = std::str::from_utf8(raw)?;
    let lines: Vec<&str> = text.lines().collect();

    if lines.is_empty() {
        return Ok(Fragment::empty());
    }

    // A body whose first meaningful line declares a prolog is already a
    // complete document; take it whole.
    if lines
        .iter()
        .find(|line| !line.trim().is_empty())
        .is_some_and(|line| line.trim_start().starts_with("<?xml"))
    {
        return Ok(Fragment {
            lines: lines.iter().map(ToString::to_string).collect(),
            has_prolog: true,
        });
    }

    // Missing markers fall back to the legacy fixed offsets: skip the
    // first 8 lines and drop the trailing line.
    let start = lines
        .iter()
        .position(|line| line.contains(DATA_START_MARKER))
        .unwrap_or(LEGACY_HEADER_LINES);
    let end = lines
        .iter()
        .rposition(|line| line.contains(DATA_END_MARKER))
        .unwrap_or_else(|| lines.len().saturating_sub(2));

    if start <= end && start < lines.len() {
        return Ok(slice_fragment(&lines, start, end));
    }

    // Malformed scan; retry the legacy slice only when the body is long
    // enough to hold one.
    if lines.len() > LEGACY_HEADER_LINES + 1 {
        return Ok(slice_fragment(
            &lines,
            LEGACY_HEADER_LINES,
            lines.len() - 2,
        ));
    }

    Ok(Fragment::empty())
}

/// Builds a fragment from the inclusive line range `[start, end]`.
fn slice_fragment(lines: &[&str], start: usize, end: usize) -> Fragment {
    Fragment {
        lines: lines[start..=end].iter().map(ToString::to_string).collect(),
        has_prolog: false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DATA_LINES: [&str; 3] = [
        "<data num_results=\"1\">",
        "<METAR station_id=\"KORD\"></METAR>",
        "</data>",
    ];

    fn body(header: usize, footer: usize) -> Vec<u8> {
        let mut lines: Vec<String> = Vec::new();
        for i in 0..header {
            lines.push(format!("header {i}"));
        }
        lines.extend(DATA_LINES.iter().map(ToString::to_string));
        for i in 0..footer {
            lines.push(format!("footer {i}"));
        }
        lines.join("\n").into_bytes()
    }

    #[test]
    fn test_marker_scan_at_default_offset() {
        let fragment = extract(&body(8, 1)).unwrap();
        let lines: Vec<&str> = fragment.lines().iter().map(String::as_str).collect();
        assert_eq!(lines, DATA_LINES);
    }

    #[test]
    fn test_marker_scan_at_non_default_offset() {
        // Markers well away from the legacy offsets must still be found.
        let fragment = extract(&body(3, 5)).unwrap();
        let lines: Vec<&str> = fragment.lines().iter().map(String::as_str).collect();
        assert_eq!(lines, DATA_LINES);
    }

    #[test]
    fn test_fixed_offset_fallback_without_markers() {
        // 8 header lines + payload without the container tags + 1 footer.
        let mut lines: Vec<String> = (0..8).map(|i| format!("header {i}")).collect();
        lines.push("<METAR station_id=\"KJFK\"></METAR>".to_string());
        lines.push("footer".to_string());

        let fragment = extract(lines.join("\n").as_bytes()).unwrap();
        assert_eq!(
            fragment.lines(),
            ["<METAR station_id=\"KJFK\"></METAR>".to_string()]
        );
    }

    #[test]
    fn test_missing_end_marker_drops_trailing_line() {
        let mut lines: Vec<String> = (0..8).map(|i| format!("header {i}")).collect();
        lines.push("<data num_results=\"1\">".to_string());
        lines.push("<METAR station_id=\"KJFK\"></METAR>".to_string());
        lines.push("footer".to_string());

        let fragment = extract(lines.join("\n").as_bytes()).unwrap();
        let got: Vec<&str> = fragment.lines().iter().map(String::as_str).collect();
        assert_eq!(
            got,
            [
                "<data num_results=\"1\">",
                "<METAR station_id=\"KJFK\"></METAR>"
            ]
        );
    }

    #[test]
    fn test_prolog_body_taken_whole() {
        let text = "\n<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<response>\n<data num_results=\"0\"></data>\n</response>";
        let fragment = extract(text.as_bytes()).unwrap();
        assert!(fragment.has_prolog());
        assert_eq!(fragment.to_document(), text);
    }

    #[test]
    fn test_empty_body() {
        let fragment = extract(b"").unwrap();
        assert!(fragment.is_empty());
    }

    #[test]
    fn test_short_body_without_markers_is_empty() {
        let fragment = extract(b"one\ntwo\nthree").unwrap();
        assert!(fragment.is_empty());
    }

    #[test]
    fn test_invalid_utf8_is_decode_error() {
        assert!(extract(&[0xff, 0xfe, 0x00]).is_err());
    }

    #[test]
    fn test_to_document_wraps_fragment() {
        let fragment = extract(&body(8, 1)).unwrap();
        let doc = fragment.to_document();
        assert!(doc.starts_with("<x>\n"));
        assert!(doc.ends_with("</x>"));
        assert!(doc.contains("<data num_results=\"1\">"));
    }

    #[test]
    fn test_blank_lines_tolerated() {
        let text = "\n\n<data num_results=\"0\"></data>\n\n";
        let fragment = extract(text.as_bytes()).unwrap();
        assert!(!fragment.is_empty());
        assert!(fragment.lines()[0].contains("<data"));
    }
}
