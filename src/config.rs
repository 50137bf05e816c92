/// Knobs that change how a report looks, not what it contains.
#[derive(Clone, Debug, PartialEq)]
pub struct ReportConfig {
    /// RGB color for section titles, underlines, borders, headings and bullets.
    pub highlight: [u8; 3],
    /// Flate-compress page content streams.
    pub compress: bool,
}

pub const DEFAULT_HIGHLIGHT: [u8; 3] = [41, 128, 185];

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            highlight: DEFAULT_HIGHLIGHT,
            compress: true,
        }
    }
}

impl ReportConfig {
    /// Defaults overridden by `TPM_REPORT_HIGHLIGHT` (hex `RRGGBB`) and
    /// `TPM_REPORT_NO_COMPRESS` (any value).
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(val) = std::env::var("TPM_REPORT_HIGHLIGHT") {
            match parse_hex_color(&val) {
                Some(color) => config.highlight = color,
                None => log::warn!("Ignoring TPM_REPORT_HIGHLIGHT={val:?}: expected RRGGBB"),
            }
        }
        if std::env::var("TPM_REPORT_NO_COMPRESS").is_ok() {
            config.compress = false;
        }
        config
    }
}

/// Parse `RRGGBB` (optionally prefixed with `#`).
pub fn parse_hex_color(val: &str) -> Option<[u8; 3]> {
    let val = val.trim().trim_start_matches('#');
    if val.len() != 6 || !val.is_ascii() {
        return None;
    }
    let r = u8::from_str_radix(&val[0..2], 16).ok()?;
    let g = u8::from_str_radix(&val[2..4], 16).ok()?;
    let b = u8::from_str_radix(&val[4..6], 16).ok()?;
    Some([r, g, b])
}
