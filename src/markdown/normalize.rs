/// Text rendered in place of an absent or blank field.
pub const PLACEHOLDER: &str = "No data provided.";

pub(crate) fn is_blank(raw: Option<&str>) -> bool {
    raw.is_none_or(|s| s.trim().is_empty())
}

/// Repair the markdown slips users make most often in free-text fields.
///
/// Total over all inputs and idempotent: running it on its own output changes nothing.
pub fn normalize(raw: Option<&str>) -> String {
    let raw = match raw {
        Some(s) if !s.trim().is_empty() => s,
        _ => return PLACEHOLDER.to_string(),
    };
    let text = raw.replace("\r\n", "\n").replace('\r', "\n");
    let text = space_after_heading_markers(&text);
    let text = space_after_dash_bullets(&text);
    blank_line_before_headings(&text)
}

/// "##Title" → "## Title". Applies to any run of two or more `#`.
fn space_after_heading_markers(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 8);
    let mut hashes = 0usize;
    for ch in text.chars() {
        if ch == '#' {
            hashes += 1;
            out.push(ch);
            continue;
        }
        if hashes >= 2 && !ch.is_whitespace() {
            out.push(' ');
        }
        hashes = 0;
        out.push(ch);
    }
    out
}

/// "-item" at line start → "- item". Lines made only of dashes are rules, left alone.
fn space_after_dash_bullets(text: &str) -> String {
    let lines: Vec<String> = text
        .split('\n')
        .map(|line| {
            let mut chars = line.chars();
            let is_rule = line.chars().all(|c| c == '-');
            match (chars.next(), chars.next()) {
                (Some('-'), Some(next)) if !next.is_whitespace() && !is_rule => {
                    format!("- {}", &line[1..])
                }
                _ => line.to_string(),
            }
        })
        .collect();
    lines.join("\n")
}

fn blank_line_before_headings(text: &str) -> String {
    let mut out: Vec<&str> = Vec::new();
    for line in text.split('\n') {
        let needs_gap = line.starts_with("##")
            && out.last().is_some_and(|prev: &&str| !prev.trim().is_empty());
        if needs_gap {
            out.push("");
        }
        out.push(line);
    }
    out.join("\n")
}
