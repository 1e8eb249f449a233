use std::borrow::Cow;

use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

const ELLIPSIS: &str = "...";
const ELLIPSIS_WIDTH: usize = 3;

/// Display width of a string in terminal columns.
pub fn display_width(s: &str) -> usize {
    UnicodeWidthStr::width(s)
}

/// Truncates a string to at most `max_width` terminal columns.
///
/// Appends "..." when text is cut. Widths of 3 or less never carry an
/// ellipsis; they keep as many leading characters as fit.
///
/// # Examples
///
/// ```
/// use paperstream::util::truncate_to_width;
///
/// assert_eq!(truncate_to_width("Attention", 20), "Attention");
/// assert_eq!(truncate_to_width("Attention Is All You Need", 12), "Attention...");
/// assert_eq!(truncate_to_width("Attention", 3), "Att");
/// ```
pub fn truncate_to_width(s: &str, max_width: usize) -> Cow<'_, str> {
    if display_width(s) <= max_width {
        return Cow::Borrowed(s);
    }

    let (budget, suffix) = if max_width <= ELLIPSIS_WIDTH {
        (max_width, "")
    } else {
        (max_width - ELLIPSIS_WIDTH, ELLIPSIS)
    };

    let mut used = 0;
    let mut end = 0;
    for (idx, c) in s.char_indices() {
        let w = UnicodeWidthChar::width(c).unwrap_or(0);
        if used + w > budget {
            break;
        }
        used += w;
        end = idx + c.len_utf8();
    }

    Cow::Owned(format!("{}{}", &s[..end], suffix))
}

/// Normalizes upstream text for terminal display.
///
/// arXiv wraps titles and abstracts at fixed columns, so runs of whitespace
/// (including newlines) collapse to one space and the result is trimmed.
/// ANSI escape sequences and other control characters are dropped so that
/// feed content cannot drive the terminal.
///
/// # Examples
///
/// ```
/// use paperstream::util::clean_text;
///
/// assert_eq!(clean_text("  Deep\n  Residual   Learning "), "Deep Residual Learning");
/// assert_eq!(clean_text("\x1b[31mred\x1b[0m"), "red");
/// ```
pub fn clean_text(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut pending_space = false;
    let mut chars = s.chars().peekable();

    while let Some(c) = chars.next() {
        if c == '\x1b' {
            match chars.peek() {
                // CSI: parameters until a final byte in 0x40..=0x7e
                Some('[') => {
                    chars.next();
                    for n in chars.by_ref() {
                        if ('\x40'..='\x7e').contains(&n) {
                            break;
                        }
                    }
                }
                // OSC: until BEL or ST
                Some(']') => {
                    chars.next();
                    while let Some(n) = chars.next() {
                        if n == '\x07' {
                            break;
                        }
                        if n == '\x1b' && chars.peek() == Some(&'\\') {
                            chars.next();
                            break;
                        }
                    }
                }
                _ => {}
            }
            continue;
        }

        if c.is_whitespace() {
            pending_space = !out.is_empty();
            continue;
        }

        if c.is_control() {
            continue;
        }

        if pending_space {
            out.push(' ');
            pending_space = false;
        }
        out.push(c);
    }

    out
}
