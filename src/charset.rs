//! Character-set normalization for surnames.
//!
//! The wire is UTF-8 end to end, so "transcoding" here is a normalization
//! hook rather than a codec: it strips control characters and collapses
//! surrounding whitespace before validation sees the text. Kept as its own
//! seam so a real encoding conversion can slot in without touching the
//! handlers.

/// Normalize surname text for the target locale.
pub fn transcode(text: &str) -> String {
    text.trim()
        .chars()
        .filter(|c| !c.is_control())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trims_and_strips_controls() {
        assert_eq!(transcode("  Stone \r"), "Stone");
        assert_eq!(transcode("St\u{0007}one"), "Stone");
    }

    #[test]
    fn non_ascii_passes_through() {
        assert_eq!(transcode("李"), "李");
    }
}
