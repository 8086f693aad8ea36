//! HTML rendering of scan results.

use base64::{engine::general_purpose::STANDARD, Engine};
use facegate_core::{Alert, AlertLevel, Panel};
use std::fmt::Write;

const INDEX_HTML: &str = include_str!("ui/index.html");
const RESULT_SLOT: &str = "<!--RESULT-->";

/// The bare upload page.
pub fn index_page() -> String {
    INDEX_HTML.replace(RESULT_SLOT, "")
}

/// Upload page followed by the uploaded image and its result panel.
pub fn result_page(upload: Option<(&[u8], &str)>, panel: &Panel) -> String {
    let mut html = String::new();
    if let Some((bytes, mime)) = upload {
        let _ = write!(
            html,
            "<figure><img src=\"data:{};base64,{}\" alt=\"Live Feed\"><figcaption>Live Feed</figcaption></figure>",
            escape(mime),
            STANDARD.encode(bytes)
        );
    }
    html.push_str("<hr>");
    html.push_str(&render_panel(panel));
    INDEX_HTML.replace(RESULT_SLOT, &html)
}

/// Metric column, status alert with optional progress bar, analysis block.
pub fn render_panel(panel: &Panel) -> String {
    let mut html = String::from("<section class=\"panel\"><div class=\"row\"><div class=\"main\">");
    html.push_str(&render_alert(&panel.alert));
    if let Some(fill) = panel.progress {
        let _ = write!(
            html,
            "<div class=\"progress\" role=\"progressbar\" aria-valuenow=\"{fill}\" aria-valuemin=\"0\" aria-valuemax=\"100\"><div style=\"width: {fill}%\"></div></div>"
        );
    }
    html.push_str("</div>");
    if let Some(metric) = &panel.metric {
        let _ = write!(
            html,
            "<div class=\"metric\"><div class=\"label\">Confidence</div><div class=\"value\">{}</div></div>",
            escape(metric)
        );
    }
    html.push_str("</div>");
    if let Some(analysis) = &panel.analysis {
        html.push_str(&render_alert(analysis));
    }
    html.push_str("</section>");
    html
}

fn render_alert(alert: &Alert) -> String {
    let class = match alert.level {
        AlertLevel::Success => "success",
        AlertLevel::Error => "error",
        AlertLevel::Warning => "warning",
        AlertLevel::Info => "info",
    };
    if alert.heading.is_empty() {
        format!("<div class=\"alert {class}\">{}</div>", escape(&alert.body))
    } else {
        format!(
            "<div class=\"alert {class}\"><strong>{}</strong> {}</div>",
            escape(&alert.heading),
            escape(&alert.body)
        )
    }
}

/// Minimal HTML text escaping for model-supplied strings.
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
