use crate::html::values::FormValues;
use scraper::{ElementRef, Html, Selector};
use serde::Serialize;
use std::fmt::Write as _;
use std::sync::LazyLock;

static FORM_SELECTOR: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse("form").expect("Failed to parse form selector - this is a bug")
});

static INPUT_SELECTOR: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse("input").expect("Failed to parse input selector - this is a bug")
});

static SELECT_SELECTOR: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse("select").expect("Failed to parse select selector - this is a bug")
});

static OPTION_SELECTOR: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse("option").expect("Failed to parse option selector - this is a bug")
});

/// A `<form>` and the values it would submit as-is.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Form {
    /// `method` attribute verbatim, "GET" when absent or empty.
    pub method: String,
    pub id: String,
    pub name: String,
    pub action: String,
    pub fields: FormValues,
}

impl Form {
    /// Human-readable dump: a `form#<id>` line, then one `name:[values]`
    /// line per non-empty field, names sorted and right-aligned.
    pub fn print(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "form#{}", self.id);
        let width = self.fields.iter().map(|(k, _)| k.len()).max().unwrap_or(0);
        for (name, values) in self.fields.iter() {
            if values.is_empty() {
                continue;
            }
            let _ = writeln!(out, "{:>width$}:[{}]", name, values.join(" "), width = width);
        }
        out
    }
}

fn attr_or<'a>(element: &ElementRef<'a>, name: &str, default: &'a str) -> &'a str {
    element.value().attr(name).unwrap_or(default)
}

/// Every `<form>` in document order.
pub fn parse_forms(document: &Html) -> Vec<Form> {
    document.select(&FORM_SELECTOR).map(parse_form).collect()
}

fn parse_form(form: ElementRef<'_>) -> Form {
    let method = match attr_or(&form, "method", "") {
        "" => "GET",
        m => m,
    };
    let mut parsed = Form {
        method: method.to_string(),
        id: attr_or(&form, "id", "").to_string(),
        name: attr_or(&form, "name", "").to_string(),
        action: attr_or(&form, "action", "").to_string(),
        fields: FormValues::new(),
    };
    tracing::trace!(id = %parsed.id, action = %parsed.action, method = %parsed.method, "found form");

    for input in form.select(&INPUT_SELECTOR) {
        let name = attr_or(&input, "name", "");
        let value = attr_or(&input, "value", "");
        match attr_or(&input, "type", "").to_ascii_lowercase().as_str() {
            "text" | "hidden" | "" => parsed.fields.add(name, value),
            "radio" => {
                // Boolean attribute: presence counts, whatever its value.
                if attr_or(&input, "checked", "unchecked") != "unchecked" {
                    parsed.fields.set(name, value);
                }
            }
            "submit" if !name.is_empty() => parsed.fields.set(name, value),
            _ => {}
        }
    }

    for select in form.select(&SELECT_SELECTOR) {
        let name = attr_or(&select, "name", "");
        if name.is_empty() {
            continue;
        }
        for option in select.select(&OPTION_SELECTOR) {
            if attr_or(&option, "selected", "notselected") == "notselected" {
                continue;
            }
            match option.value().attr("value") {
                Some(value) => parsed.fields.add(name, value),
                None => {
                    let text = option.text().collect::<String>();
                    parsed.fields.add(name, text.trim());
                }
            }
        }
    }

    parsed
}
