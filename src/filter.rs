use crate::{escape::escape_html_keep_entities, types::FilterSettings};

pub const DEFAULT_REPLACEMENT: &str = "***";

/// Splits a raw comma-separated term list into trimmed, non-empty terms.
///
/// Blank entries (`"bad, ,mean,"`) are dropped so they can never match the
/// empty string at every position of the content.
pub fn parse_terms(raw: &str) -> Vec<&str> {
    raw.split(',')
        .map(str::trim)
        .filter(|term| !term.is_empty())
        .collect()
}

/// Replaces every case-insensitive occurrence of each configured term with
/// `replacement` (or [`DEFAULT_REPLACEMENT`] when `None`).
///
/// Terms are applied in list order. Text produced by an earlier replacement is
/// never scanned again, and later terms cannot match across it. Matching is
/// plain substring containment, so `cat` also matches inside `category`.
///
/// The replacement is inserted verbatim. Callers rendering into markup should
/// go through [`ContentFilter`], which escapes it first.
pub fn filter(content: &str, raw_terms: &str, replacement: Option<&str>) -> String {
    let terms = parse_terms(raw_terms);
    if terms.is_empty() {
        return content.to_owned();
    }

    replace_terms(content, &terms, replacement.unwrap_or(DEFAULT_REPLACEMENT))
}

/// The render-time hook. Only exists when a term list is configured.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentFilter {
    raw_terms: String,
    replacement: String,
}

impl ContentFilter {
    pub fn from_settings(settings: &FilterSettings) -> Option<Self> {
        let raw_terms = settings
            .filter_terms
            .as_deref()
            .filter(|raw| !raw.trim().is_empty())?;

        Some(Self {
            raw_terms: raw_terms.to_owned(),
            replacement: escape_html_keep_entities(settings.replacement()),
        })
    }

    pub fn term_count(&self) -> usize {
        parse_terms(&self.raw_terms).len()
    }

    pub fn apply(&self, content: &str) -> String {
        filter(content, &self.raw_terms, Some(&self.replacement))
    }
}

/// Runs the render hook if one is registered for these settings.
pub fn render_content(settings: &FilterSettings, content: &str) -> String {
    match ContentFilter::from_settings(settings) {
        Some(hook) => hook.apply(content),
        None => content.to_owned(),
    }
}

#[derive(Debug, Clone, Copy)]
enum Piece<'a> {
    Original(&'a str),
    Replaced,
}

fn replace_terms(content: &str, terms: &[&str], replacement: &str) -> String {
    let mut pieces = vec![Piece::Original(content)];

    for term in terms {
        let mut next = Vec::with_capacity(pieces.len());
        for piece in pieces {
            match piece {
                Piece::Original(text) => split_on_term(text, term, &mut next),
                Piece::Replaced => next.push(Piece::Replaced),
            }
        }
        pieces = next;
    }

    let mut output = String::with_capacity(content.len());
    for piece in pieces {
        match piece {
            Piece::Original(text) => output.push_str(text),
            Piece::Replaced => output.push_str(replacement),
        }
    }
    output
}

fn split_on_term<'a>(text: &'a str, term: &str, out: &mut Vec<Piece<'a>>) {
    let mut pending = 0;
    let mut cursor = 0;

    while cursor < text.len() {
        let rest = &text[cursor..];
        if let Some(len) = match_len_at(rest, term) {
            if pending < cursor {
                out.push(Piece::Original(&text[pending..cursor]));
            }
            out.push(Piece::Replaced);
            cursor += len;
            pending = cursor;
        } else {
            cursor += rest.chars().next().map_or(rest.len(), char::len_utf8);
        }
    }

    if pending < text.len() {
        out.push(Piece::Original(&text[pending..]));
    }
}

/// Byte length of the prefix of `haystack` matching `needle`, if any.
fn match_len_at(haystack: &str, needle: &str) -> Option<usize> {
    let mut hay = haystack.char_indices();
    for expected in needle.chars() {
        let (_, actual) = hay.next()?;
        if !chars_match(actual, expected) {
            return None;
        }
    }
    Some(hay.next().map_or(haystack.len(), |(index, _)| index))
}

fn chars_match(left: char, right: char) -> bool {
    left == right || left.to_lowercase().eq(right.to_lowercase())
}
