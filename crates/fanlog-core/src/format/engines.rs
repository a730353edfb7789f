//! Built-in formatting strategies.

use super::FormattingEngine;
use crate::level::LogLevel;

pub const FORMATTER_DEFAULT: &str = "Default";
pub const FORMATTER_RICH_TEXT: &str = "Rich Text";
pub const FORMATTER_XML: &str = "XML";
pub const FORMATTER_HTML: &str = "HTML";
pub const FORMATTER_NATIVE: &str = "Native";

fn timestamp() -> String {
    chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true)
}

/// Plain text: `2026-08-29T10:00:00.000Z [Warning] part0 part1 ...`
pub struct DefaultFormatter;

impl FormattingEngine for DefaultFormatter {
    fn name(&self) -> &str {
        FORMATTER_DEFAULT
    }

    fn file_extension(&self) -> &str {
        "log"
    }

    fn format_message(&self, level: LogLevel, parts: &[String]) -> String {
        format!("{} [{}] {}", timestamp(), level, parts.join(" "))
    }
}

/// Single-line rich text with the level in bold. No file association.
pub struct RichTextFormatter;

impl FormattingEngine for RichTextFormatter {
    fn name(&self) -> &str {
        FORMATTER_RICH_TEXT
    }

    fn format_message(&self, level: LogLevel, parts: &[String]) -> String {
        format!("<b>[{}]</b> {}", level, escape_markup(&parts.join(" ")))
    }
}

/// One self-contained XML element per message.
pub struct XmlFormatter;

impl FormattingEngine for XmlFormatter {
    fn name(&self) -> &str {
        FORMATTER_XML
    }

    fn file_extension(&self) -> &str {
        "xml"
    }

    fn format_message(&self, level: LogLevel, parts: &[String]) -> String {
        let mut out = format!("<message level=\"{}\" time=\"{}\">", level, timestamp());
        for part in parts {
            out.push_str("<part>");
            out.push_str(&escape_markup(part));
            out.push_str("</part>");
        }
        out.push_str("</message>");
        out
    }
}

/// One HTML paragraph per message, colored by severity.
pub struct HtmlFormatter;

impl FormattingEngine for HtmlFormatter {
    fn name(&self) -> &str {
        FORMATTER_HTML
    }

    fn file_extension(&self) -> &str {
        "html"
    }

    fn format_message(&self, level: LogLevel, parts: &[String]) -> String {
        let color = match level {
            LogLevel::Warning => "orange",
            LogLevel::Error | LogLevel::Fatal => "red",
            _ => "black",
        };
        format!(
            "<p><font color=\"{}\">{} [{}] {}</font></p>",
            color,
            timestamp(),
            level,
            escape_markup(&parts.join(" "))
        )
    }
}

/// Terse format for the native debug channel: `Warning: part0 part1`.
pub struct NativeFormatter;

impl FormattingEngine for NativeFormatter {
    fn name(&self) -> &str {
        FORMATTER_NATIVE
    }

    fn format_message(&self, level: LogLevel, parts: &[String]) -> String {
        format!("{}: {}", level, parts.join(" "))
    }
}

fn escape_markup(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}
