//! LaTeX escaping for user-supplied text.

use regex::{Captures, Regex};

/// Sequences the escaper itself produces for `~` and `^`.
const ESCAPED_WORDS: [&str; 2] = ["\\textasciitilde{}", "\\textasciicircum{}"];

const TOKEN_OPEN: char = '\u{E000}';
const TOKEN_CLOSE: char = '\u{E001}';

/// Escapes `& % $ # _ { } ~ ^` so the text renders literally.
///
/// `None` yields an empty string. Specials that are already escaped
/// (`\&`, `\%`, `\textasciitilde{}`, ...) are copied through unchanged, so a
/// pre-escaped ampersand never turns into `\\&` and `escape(escape(x)) == escape(x)`.
/// Backslashes are otherwise left alone.
pub fn escape(text: Option<&str>) -> String {
    let Some(text) = text else {
        return String::new();
    };

    let mut out = String::with_capacity(text.len() + text.len() / 8);
    let mut rest = text;

    while let Some(c) = rest.chars().next() {
        if c == '\\' {
            if let Some(word) = ESCAPED_WORDS.iter().find(|w| rest.starts_with(*w)) {
                out.push_str(word);
                rest = &rest[word.len()..];
                continue;
            }
            match rest[1..].chars().next() {
                Some(next) if is_backslash_escapable(next) => {
                    out.push('\\');
                    out.push(next);
                    rest = &rest[1 + next.len_utf8()..];
                }
                _ => {
                    out.push('\\');
                    rest = &rest[1..];
                }
            }
            continue;
        }

        match c {
            '~' => out.push_str("\\textasciitilde{}"),
            '^' => out.push_str("\\textasciicircum{}"),
            c if is_backslash_escapable(c) => {
                out.push('\\');
                out.push(c);
            }
            c => out.push(c),
        }
        rest = &rest[c.len_utf8()..];
    }

    out
}

fn is_backslash_escapable(c: char) -> bool {
    matches!(c, '&' | '%' | '$' | '#' | '_' | '{' | '}')
}

/// Escapes `text` except for the markup built from each match of `pattern`.
///
/// Every match is handed to `markup`, and the markup it returns is swapped
/// for an opaque token. The remaining plain text is escaped, then the tokens
/// are replaced by their markup, which therefore reaches the output untouched.
pub fn escape_preserving<F>(text: &str, pattern: &Regex, mut markup: F) -> String
where
    F: FnMut(&Captures<'_>) -> String,
{
    let text = text.replace([TOKEN_OPEN, TOKEN_CLOSE], "");

    let mut kept: Vec<String> = Vec::new();
    let tokenized = pattern.replace_all(&text, |caps: &Captures<'_>| {
        kept.push(markup(caps));
        token(kept.len() - 1)
    });

    let mut escaped = escape(Some(&tokenized));
    for (i, original) in kept.iter().enumerate() {
        escaped = escaped.replacen(&token(i), original, 1);
    }
    escaped
}

fn token(index: usize) -> String {
    format!("{TOKEN_OPEN}{index}{TOKEN_CLOSE}")
}
