use std::collections::HashSet;

/// Encodes the five HTML-significant characters. Safe for text nodes,
/// quoted attribute values and `<textarea>` bodies alike.
pub fn escape_html(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#039;"),
            other => escaped.push(other),
        }
    }
    escaped
}

/// Like [`escape_html`], but well-formed character references (`&hearts;`,
/// `&#9829;`, `&#x2665;`) are left as they are instead of being encoded again.
pub fn escape_html_keep_entities(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for (index, ch) in input.char_indices() {
        match ch {
            '&' if is_entity(&input[index..]) => escaped.push('&'),
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#039;"),
            other => escaped.push(other),
        }
    }
    escaped
}

/// Whether `rest` (starting at `&`) opens a named, decimal or hex reference.
fn is_entity(rest: &str) -> bool {
    let Some(body) = rest.strip_prefix('&') else {
        return false;
    };
    let Some(end) = body.find(';') else {
        return false;
    };
    let name = &body[..end];

    if let Some(hex) = name.strip_prefix("#x").or_else(|| name.strip_prefix("#X")) {
        !hex.is_empty() && hex.chars().all(|ch| ch.is_ascii_hexdigit())
    } else if let Some(decimal) = name.strip_prefix('#') {
        !decimal.is_empty() && decimal.chars().all(|ch| ch.is_ascii_digit())
    } else {
        name.chars().next().is_some_and(|ch| ch.is_ascii_alphabetic())
            && name.chars().all(|ch| ch.is_ascii_alphanumeric())
    }
}

/// Reduces user input to a single clean line of text: markup is stripped
/// (`<script>` and `<style>` together with their contents), percent-encoded
/// octets are dropped until none remain, and all whitespace runs (including
/// line breaks and tabs) collapse to one space.
pub fn sanitize_text_field(input: &str) -> String {
    let mut text = strip_tags(input);
    loop {
        let stripped = strip_percent_octets(&text);
        if stripped == text {
            break;
        }
        text = stripped;
    }
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn strip_tags(input: &str) -> String {
    let cleaned = ammonia::Builder::empty()
        .clean_content_tags(HashSet::from(["script", "style"]))
        .clean(input)
        .to_string();

    // Lone `<` stays encoded; `&` and `>` go back to plain text so terms
    // like "R&D" survive the round trip.
    cleaned.replace("&gt;", ">").replace("&amp;", "&")
}

fn strip_percent_octets(input: &str) -> String {
    let bytes = input.as_bytes();
    let mut output = String::with_capacity(input.len());
    let mut index = 0;

    while index < input.len() {
        if bytes[index] == b'%'
            && index + 2 < bytes.len()
            && bytes[index + 1].is_ascii_hexdigit()
            && bytes[index + 2].is_ascii_hexdigit()
        {
            index += 3;
            continue;
        }
        let ch = input[index..].chars().next().unwrap_or_default();
        output.push(ch);
        index += ch.len_utf8();
    }
    output
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escapes_markup_characters() {
        assert_eq!(
            escape_html(r#"<a href="x">Tom & 'Jerry'</a>"#),
            "&lt;a href=&quot;x&quot;&gt;Tom &amp; &#039;Jerry&#039;&lt;/a&gt;"
        );
        assert_eq!(escape_html("***"), "***");
    }

    #[test]
    fn sanitize_collapses_whitespace_and_newlines() {
        assert_eq!(
            sanitize_text_field("  bad,\n mean,\t\tawful  "),
            "bad, mean, awful"
        );
    }

    #[test]
    fn sanitize_strips_tags() {
        assert_eq!(sanitize_text_field("bad, <em>mean</em>"), "bad, mean");
        assert_eq!(
            sanitize_text_field("bad, <script>alert(1)</script>mean"),
            "bad, mean"
        );
        assert_eq!(
            sanitize_text_field("<style>p { color: red }</style>awful"),
            "awful"
        );
        assert_eq!(sanitize_text_field("bad <b"), "bad");
    }

    #[test]
    fn sanitize_keeps_lone_angle_brackets_encoded() {
        assert_eq!(sanitize_text_field("a < b"), "a &lt; b");
    }

    #[test]
    fn sanitize_drops_percent_octets() {
        assert_eq!(sanitize_text_field("bad%20word, 100%"), "badword, 100%");
    }

    #[test]
    fn sanitize_repeats_until_no_octets_remain() {
        assert_eq!(sanitize_text_field("%%2020bad"), "bad");
    }

    #[test]
    fn sanitize_keeps_ampersands_and_closing_brackets() {
        assert_eq!(sanitize_text_field("R&D, a > b"), "R&D, a > b");
    }

    #[test]
    fn entity_aware_escaping_leaves_references_alone() {
        assert_eq!(escape_html_keep_entities("&hearts; &amp;"), "&hearts; &amp;");
        assert_eq!(escape_html_keep_entities("&#9829;&#x2665;"), "&#9829;&#x2665;");
        assert_eq!(
            escape_html_keep_entities("Tom & <Jerry> &#xZZ; &;"),
            "Tom &amp; &lt;Jerry&gt; &amp;#xZZ; &amp;;"
        );
    }
}
