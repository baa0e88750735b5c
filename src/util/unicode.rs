use unicode_segmentation::UnicodeSegmentation;
use unicode_width::UnicodeWidthStr;

const ELLIPSIS: char = '\u{2026}';

/// Width of `s` in terminal cells
pub fn display_width(s: &str) -> usize {
    UnicodeWidthStr::width(s)
}

/// Cut `s` down to at most `max_cells` cells, ending in `…` when shortened.
/// Never splits a grapheme cluster.
pub fn truncate_to_width(s: &str, max_cells: usize) -> String {
    if display_width(s) <= max_cells {
        return s.to_string();
    }
    if max_cells == 0 {
        return String::new();
    }

    let budget = max_cells - 1;
    let mut width = 0;
    let mut out = String::new();
    for grapheme in s.graphemes(true) {
        let w = UnicodeWidthStr::width(grapheme);
        if width + w > budget {
            break;
        }
        width += w;
        out.push_str(grapheme);
    }
    out.push(ELLIPSIS);
    out
}

/// Truncate to `cells`, then right-pad with spaces to exactly `cells` wide
pub fn fit_to_width(s: &str, cells: usize) -> String {
    let mut out = truncate_to_width(s, cells);
    let w = display_width(&out);
    out.extend(std::iter::repeat_n(' ', cells.saturating_sub(w)));
    out
}
