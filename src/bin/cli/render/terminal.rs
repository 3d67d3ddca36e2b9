use studyflow_lib::grades::{Span, SpanKind};

/// ANSI color codes
#[allow(dead_code)]
pub struct Color;

#[allow(dead_code)]
impl Color {
    pub const RESET: &str = "\x1b[0m";
    pub const BOLD: &str = "\x1b[1m";
    pub const DIM: &str = "\x1b[2m";
    pub const UNDERLINE: &str = "\x1b[4m";
    pub const STRIKETHROUGH: &str = "\x1b[9m";
    pub const RED: &str = "\x1b[31m";
    pub const GREEN: &str = "\x1b[32m";
    pub const YELLOW: &str = "\x1b[33m";
    pub const BLUE: &str = "\x1b[34m";
    pub const MAGENTA: &str = "\x1b[35m";
    pub const CYAN: &str = "\x1b[36m";
    pub const GRAY: &str = "\x1b[90m";
}

/// Wrap text in an ANSI style when color is on
pub fn paint(text: &str, style: &str, use_color: bool) -> String {
    if use_color {
        format!("{}{}{}", style, text, Color::RESET)
    } else {
        text.to_string()
    }
}

/// 24-bit foreground escape for a `#rrggbb` color
pub fn hex_fg(hex: &str) -> Option<String> {
    let hex = hex.strip_prefix('#')?;
    if hex.len() != 6 || !hex.is_ascii() {
        return None;
    }
    let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
    let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
    let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
    Some(format!("\x1b[38;2;{};{};{}m", r, g, b))
}

/// A colored bullet for a subject color
pub fn swatch(hex: &str, use_color: bool) -> String {
    match hex_fg(hex) {
        Some(fg) if use_color => format!("{}\u{25cf}{}", fg, Color::RESET),
        _ => "\u{25cf}".to_string(),
    }
}

/// Render highlighted formula spans to one terminal line.
///
/// Operators use their display glyphs. Without color, unmatched brackets
/// are marked by surrounding them with `!`.
pub fn render_formula(spans: &[Span], use_color: bool) -> String {
    let mut out = String::new();
    for span in spans {
        let text = span.display_text();
        let piece = match &span.kind {
            SpanKind::Variable => paint(text, &format!("{}{}", Color::BOLD, Color::CYAN), use_color),
            SpanKind::Number => paint(text, Color::YELLOW, use_color),
            SpanKind::Operator => paint(text, Color::GRAY, use_color),
            SpanKind::Bracket { color, .. } => match hex_fg(color) {
                Some(fg) if use_color => format!("{}{}{}", fg, text, Color::RESET),
                _ => text.to_string(),
            },
            SpanKind::UnmatchedBracket => {
                if use_color {
                    format!("{}{}{}{}", Color::RED, Color::UNDERLINE, text, Color::RESET)
                } else {
                    format!("!{}!", text)
                }
            }
            SpanKind::Text => text.to_string(),
        };
        out.push_str(&piece);
    }
    out
}

/// Fixed-width progress bar such as `[#####-----]`
pub fn progress_bar(percent: u32, width: usize) -> String {
    let filled = (percent.min(100) as usize * width + 50) / 100;
    format!("[{}{}]", "#".repeat(filled), "-".repeat(width - filled))
}

/// Truncate to a column width, char-safe
pub fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        return text.to_string();
    }
    let kept: String = text.chars().take(width.saturating_sub(3)).collect();
    format!("{}...", kept)
}

/// Format a grade with one decimal
pub fn grade(value: f64) -> String {
    format!("{:.1}", value)
}
