use crate::{admin::PERMISSION_DENIED_MESSAGE, escape::escape_html};

pub static WORD_FILTER_CSS: &str = include_str!("word-filter.css");

pub const STYLESHEET_PATH: &str = "/assets/word-filter.css";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Notice {
    Saved,
    Denied,
}

impl Notice {
    fn render(self) -> String {
        let (class, message) = match self {
            Notice::Saved => ("updated", "Your filtered words were saved."),
            Notice::Denied => ("error", PERMISSION_DENIED_MESSAGE),
        };
        format!("<div class=\"{class}\">\n  <p>{message}</p>\n</div>\n")
    }
}

fn layout(title: &str, stylesheet: bool, body: &str) -> String {
    let link = if stylesheet {
        format!("<link rel=\"stylesheet\" href=\"{STYLESHEET_PATH}\">\n")
    } else {
        String::new()
    };
    format!(
        "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n<title>{title}</title>\n{link}</head>\n<body>\n<div class=\"wrap\">\n{body}</div>\n</body>\n</html>\n"
    )
}

/// The word list page. The stylesheet is linked here and nowhere else.
pub fn word_filter_page(terms: Option<&str>, nonce: &str, notice: Option<Notice>) -> String {
    let notice = notice.map(Notice::render).unwrap_or_default();
    let terms = escape_html(terms.unwrap_or_default());
    let nonce = escape_html(nonce);
    let body = format!(
        r#"<h1>Word Filter.</h1>
{notice}<form method="POST">
  <input type="hidden" name="word-filter-submit" value="true">
  <input type="hidden" name="word-filter-nonce" value="{nonce}">
  <label for="plugin_words_to_filter">
    <p>Enter a <strong>comma-separated</strong> list of words to filter from your site's content.</p>
  </label>
  <div class="word-filter__flex-container">
    <textarea name="plugin_words_to_filter" id="plugin_words_to_filter" placeholder="bad, mean, awful, horrible">{terms}</textarea>
  </div>
  <input type="submit" name="submit" id="submit" class="button button-primary" value="Save changes">
</form>
"#
    );
    layout("Words To Filter", true, &body)
}

pub fn options_page(replacement: &str, nonce: &str, saved: bool) -> String {
    let notice = if saved {
        "<div class=\"updated\">\n  <p>Settings saved.</p>\n</div>\n"
    } else {
        ""
    };
    let replacement = escape_html(replacement);
    let nonce = escape_html(nonce);
    let body = format!(
        r#"<h1>Word Filter Options</h1>
{notice}<form method="POST">
  <input type="hidden" name="replacement-fields-nonce" value="{nonce}">
  <table class="form-table">
    <tr>
      <th scope="row">Filtered Text</th>
      <td>
        <input type="text" name="replacement-text" value="{replacement}">
        <p class="description">Leave blank to simply remove the filtered words.</p>
      </td>
    </tr>
  </table>
  <input type="submit" name="submit" id="submit" class="button button-primary" value="Save Changes">
</form>
"#
    );
    layout("Word Filter Options", false, &body)
}

pub fn permission_denied_page() -> String {
    layout("Word Filter", false, &Notice::Denied.render())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn word_filter_page_escapes_terms_and_links_stylesheet() {
        let html = word_filter_page(Some("</textarea><script>"), "abc123", None);
        assert!(html.contains("&lt;/textarea&gt;&lt;script&gt;</textarea>"));
        assert!(html.contains(r#"name="word-filter-nonce" value="abc123""#));
        assert!(html.contains(STYLESHEET_PATH));
        assert!(!html.contains("class=\"updated\""));
    }

    #[test]
    fn word_filter_page_renders_notices() {
        let saved = word_filter_page(Some("bad"), "n", Some(Notice::Saved));
        assert!(saved.contains("Your filtered words were saved."));

        let denied = word_filter_page(None, "n", Some(Notice::Denied));
        assert!(denied.contains(PERMISSION_DENIED_MESSAGE));
        assert!(denied.contains("placeholder=\"bad, mean, awful, horrible\"></textarea>"));
    }

    #[test]
    fn options_page_escapes_replacement_attribute() {
        let html = options_page("\"><b>", "n", false);
        assert!(html.contains(r#"name="replacement-text" value="&quot;&gt;&lt;b&gt;""#));
        assert!(html.contains("Leave blank to simply remove the filtered words."));
        assert!(!html.contains(STYLESHEET_PATH));
        assert!(!html.contains("Settings saved."));

        assert!(options_page("***", "n", true).contains("Settings saved."));
    }
}
