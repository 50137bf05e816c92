use crate::model::{Style, StyledRun};

enum Lexeme<'a> {
    Text(&'a str),
    Strong,
    Underscore,
}

enum Token<'a> {
    Text(&'a str),
    Open(Style),
    Close,
}

fn lex(text: &str) -> Vec<Lexeme<'_>> {
    let bytes = text.as_bytes();
    let mut out = Vec::new();
    let mut start = 0usize;
    let mut i = 0usize;
    while i < bytes.len() {
        let delim = match bytes[i] {
            b'*' if bytes.get(i + 1) == Some(&b'*') => Some((Lexeme::Strong, 2)),
            b'_' => Some((Lexeme::Underscore, 1)),
            _ => None,
        };
        match delim {
            Some((lexeme, len)) => {
                if start < i {
                    out.push(Lexeme::Text(&text[start..i]));
                }
                out.push(lexeme);
                i += len;
                start = i;
            }
            None => i += 1,
        }
    }
    if start < bytes.len() {
        out.push(Lexeme::Text(&text[start..]));
    }
    out
}

/// Pair delimiters of each kind left to right; a leftover delimiter stays literal.
fn pair(lexemes: Vec<Lexeme<'_>>) -> Vec<Token<'_>> {
    let strong_total = lexemes.iter().filter(|l| matches!(l, Lexeme::Strong)).count();
    let under_total = lexemes.iter().filter(|l| matches!(l, Lexeme::Underscore)).count();
    let strong_paired = strong_total - strong_total % 2;
    let under_paired = under_total - under_total % 2;

    let mut strong_seen = 0usize;
    let mut under_seen = 0usize;
    lexemes
        .into_iter()
        .map(|lexeme| match lexeme {
            Lexeme::Text(s) => Token::Text(s),
            Lexeme::Strong => {
                strong_seen += 1;
                if strong_seen > strong_paired {
                    Token::Text("**")
                } else if strong_seen % 2 == 1 {
                    Token::Open(Style::Bold)
                } else {
                    Token::Close
                }
            }
            Lexeme::Underscore => {
                under_seen += 1;
                if under_seen > under_paired {
                    Token::Text("_")
                } else if under_seen % 2 == 1 {
                    Token::Open(Style::Italic)
                } else {
                    Token::Close
                }
            }
        })
        .collect()
}

fn flush(runs: &mut Vec<StyledRun>, buf: &mut String, style: Style) {
    if buf.is_empty() {
        return;
    }
    match runs.last_mut() {
        Some(prev) if prev.style == style => prev.text.push_str(buf),
        _ => runs.push(StyledRun::new(buf.as_str(), style)),
    }
    buf.clear();
}

/// Split block text on `**bold**` and `_italic_` delimiters into styled runs.
///
/// One style is active at a time: opening a delimiter switches to its style and
/// any closing delimiter drops back to plain. Stray delimiters render literally.
pub fn tokenize(text: &str) -> Vec<StyledRun> {
    let mut runs = Vec::new();
    let mut buf = String::new();
    let mut style = Style::Plain;

    for token in pair(lex(text)) {
        match token {
            Token::Text(s) => buf.push_str(s),
            Token::Open(next) => {
                flush(&mut runs, &mut buf, style);
                style = next;
            }
            Token::Close => {
                flush(&mut runs, &mut buf, style);
                style = Style::Plain;
            }
        }
    }
    flush(&mut runs, &mut buf, style);
    runs
}

/// True when the text still shows something once delimiters are consumed.
pub(crate) fn has_visible_text(text: &str) -> bool {
    tokenize(text)
        .iter()
        .any(|run| !run.text.trim().is_empty())
}
