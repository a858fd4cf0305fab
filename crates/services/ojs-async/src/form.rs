//! Minimal HTML scraping for the OJS login and grid forms.
//!
//! Only what the two forms need: locate a `<form>` by id, read its action and
//! hidden inputs, and read a named input's value.

use std::sync::LazyLock;

use regex::Regex;

static FORM: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"(?is)<form\b([^>]*)>(.*?)</form>").ok());

static INPUT: LazyLock<Option<Regex>> = LazyLock::new(|| Regex::new(r"(?is)<input\b([^>]*)>").ok());

/// One `name=value` attribute; the value may be double-, single- or unquoted.
static ATTR: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(r#"(?i)(?:^|\s)([\w:.-]+)\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s"'>]+))"#).ok()
});

/// A form found in an HTML page
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScrapedForm {
    /// The `action` attribute, if present
    pub action: Option<String>,
    /// Hidden inputs as `(name, value)` pairs in document order
    pub hidden: Vec<(String, String)>,
}

/// Finds the form with the given id, falling back to the first form on the page
#[must_use]
pub fn find_form(html: &str, id: &str) -> Option<ScrapedForm> {
    let re = FORM.as_ref()?;
    let mut first = None;

    for cap in re.captures_iter(html) {
        let attrs = cap.get(1).map_or("", |m| m.as_str());
        let body = cap.get(2).map_or("", |m| m.as_str());
        let form = ScrapedForm {
            action: attr(attrs, "action"),
            hidden: hidden_inputs(body),
        };
        if attr(attrs, "id").as_deref() == Some(id) {
            return Some(form);
        }
        if first.is_none() {
            first = Some(form);
        }
    }

    first
}

/// Returns the `value` of the first `<input>` with the given name
#[must_use]
pub fn input_value(html: &str, name: &str) -> Option<String> {
    inputs(html)
        .into_iter()
        .find(|attrs| attr(attrs, "name").as_deref() == Some(name))
        .map(|attrs| attr(&attrs, "value").unwrap_or_default())
}

fn hidden_inputs(body: &str) -> Vec<(String, String)> {
    inputs(body)
        .into_iter()
        .filter(|attrs| {
            attr(attrs, "type").is_some_and(|t| t.eq_ignore_ascii_case("hidden"))
        })
        .filter_map(|attrs| {
            let name = attr(&attrs, "name").filter(|n| !n.is_empty())?;
            Some((name, attr(&attrs, "value").unwrap_or_default()))
        })
        .collect()
}

fn inputs(html: &str) -> Vec<String> {
    let Some(re) = INPUT.as_ref() else {
        return Vec::new();
    };
    re.captures_iter(html)
        .filter_map(|c| c.get(1).map(|m| m.as_str().to_string()))
        .collect()
}

fn attr(attrs: &str, name: &str) -> Option<String> {
    ATTR.as_ref()?
        .captures_iter(attrs)
        .find(|cap| cap.get(1).is_some_and(|n| n.as_str().eq_ignore_ascii_case(name)))
        .and_then(|cap| cap.get(2).or_else(|| cap.get(3)).or_else(|| cap.get(4)))
        .map(|raw| decode_entities(raw.as_str()))
}

fn decode_entities(s: &str) -> String {
    s.replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&amp;", "&")
}
