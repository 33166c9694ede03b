//! Client-side glue for the adCAPTCHA widget.
//!
//! Everything here is static markup or script source that a host integration
//! embeds in its pages. The widget script fires [`SUCCESS_EVENT`] when a
//! challenge is completed; the capture snippet copies the event's token into
//! every hidden [`TOKEN_FIELD`] input on the page so it is posted with
//! whichever form is submitted.

use once_cell::sync::Lazy;
use regex::{Captures, Regex, RegexBuilder};

/// DOM event fired by the widget once the challenge is solved.
pub const SUCCESS_EVENT: &str = "adcaptcha_onSuccess";

/// Name of the hidden input carrying the success token.
pub const TOKEN_FIELD: &str = "adcaptcha_successToken";

/// Handle under which the widget script (and inline snippets) are registered.
pub const SCRIPT_HANDLE: &str = "adcaptcha-script";

/// Widget script source.
pub const SCRIPT_URL: &str = "https://widget.adcaptcha.com/index.js";

/// Attribute marking the element the widget renders into.
pub const PLACEHOLDER_ATTRIBUTE: &str = "data-adcaptcha";

const PLACEHOLDER_STYLE: &str =
    "margin-bottom: 20px; max-width: 400px; width: 100%; outline: none !important;";

static SUBMIT_CONTROL_RE: Lazy<Regex> = Lazy::new(|| {
    RegexBuilder::new(r#"<(?:input|button)\b[^>]*?\btype\s*=\s*["']?submit\b["']?"#)
        .case_insensitive(true)
        .build()
        .expect("submit control regex")
});

/// Script that copies the widget's success token into every [`TOKEN_FIELD`] input.
///
/// Pure: every call returns the same source.
pub fn emit_capture_script() -> String {
    capture_script_for(TOKEN_FIELD)
}

/// Capture script filling every input named `field_name`, for hosts that post
/// the token under their own field (e.g. Contact Form 7).
pub fn capture_script_for(field_name: &str) -> String {
    let selector = js_string(&format!(r#"input[name="{field_name}"]"#));
    format!(
        r#"document.addEventListener("DOMContentLoaded", function() {{
    document.addEventListener("{SUCCESS_EVENT}", function(e) {{
        var fields = document.querySelectorAll({selector});
        for (var i = 0; i < fields.length; i++) {{
            fields[i].value = e.detail.successToken;
        }}
    }});
}});"#
    )
}

/// Hidden input that transports the token with the form.
///
/// No `id`: a page may carry one per form.
pub fn hidden_token_field() -> String {
    format!(r#"<input type="hidden" class="{TOKEN_FIELD}" name="{TOKEN_FIELD}">"#)
}

/// Widget container followed by the hidden token field.
pub fn placeholder_markup(placement_id: &str) -> String {
    let placement = html_escape::encode_double_quoted_attribute(placement_id);
    format!(
        r#"<div {PLACEHOLDER_ATTRIBUTE}="{placement}" style="{PLACEHOLDER_STYLE}"></div>{}"#,
        hidden_token_field()
    )
}

/// Re-attaches the widget to placeholders rendered after page load.
pub fn setup_script() -> String {
    String::from("if (window.adcap && typeof window.adcap.setupTriggers === \"function\") { window.adcap.setupTriggers(); }")
}

/// Clears the widget state whenever `event_name` fires on `document`.
///
/// Hosts that submit forms asynchronously use this so the next submission
/// needs a fresh challenge.
pub fn reset_script(event_name: &str) -> String {
    let event = js_string(event_name);
    format!(
        r#"document.addEventListener({event}, function() {{
    if (window.adcap && typeof window.adcap.reset === "function") {{
        window.adcap.reset();
    }}
    {setup}
    if (window.adcap) {{
        window.adcap.successToken = "";
    }}
}}, false);"#,
        setup = setup_script()
    )
}

/// Inserts the widget before every submit control in `html`.
///
/// When the markup already carries a widget placeholder only the hidden token
/// field is inserted.
pub fn insert_before_submit(html: &str, placement_id: &str) -> String {
    let insert = if html.contains(PLACEHOLDER_ATTRIBUTE) {
        hidden_token_field()
    } else {
        placeholder_markup(placement_id)
    };

    SUBMIT_CONTROL_RE
        .replace_all(html, |caps: &Captures| format!("{insert}{}", &caps[0]))
        .into_owned()
}

fn js_string(value: &str) -> String {
    serde_json::to_string(value).unwrap_or_else(|_| String::from("\"\""))
}
