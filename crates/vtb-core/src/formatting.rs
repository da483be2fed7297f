//! Telegram-HTML message builders.
//!
//! Anything user- or admin-supplied goes through `escape_html` before it is
//! interpolated: resource names and links are free text, and the admin trust
//! boundary alone is not a defense against broken markup.

use std::collections::BTreeMap;

use crate::dialog::AdminCodeSession;

/// Escape HTML special characters for Telegram HTML parse mode.
pub fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

pub fn otp_message(code: &str) -> String {
    format!(
        "✅ Your verification code:\n\n<code>{}</code>\n\nEnter it on the website to finish signing in.",
        escape_html(code)
    )
}

pub fn preview_message(session: &AdminCodeSession) -> String {
    let mut out = format!(
        "🎟 <b>{} access code(s)</b> for <b>{}</b>\n🔗 {}\n\n",
        session.codes.len(),
        escape_html(&session.name),
        escape_html(&session.link)
    );
    for code in &session.codes {
        out.push_str(&format!("<code>{}</code>\n", escape_html(code)));
    }
    out.push_str("\nSave these codes, regenerate, or cancel?");
    out
}

pub fn committed_message(count: usize, name: &str) -> String {
    format!(
        "✅ Saved {count} access code(s) for <b>{}</b>.",
        escape_html(name)
    )
}

pub fn unused_codes_message(grouped: &BTreeMap<String, Vec<String>>) -> String {
    if grouped.is_empty() {
        return "No unused access codes.".to_string();
    }

    let mut out = String::from("📋 <b>Unused access codes</b>\n");
    for (name, codes) in grouped {
        out.push_str(&format!("\n<b>{}</b> ({})\n", escape_html(name), codes.len()));
        for code in codes {
            out.push_str(&format!("<code>{}</code>\n", escape_html(code)));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialog::DialogStep;

    #[test]
    fn escapes_html_specials() {
        assert_eq!(
            escape_html(r#"<b>&"x"</b>"#),
            "&lt;b&gt;&amp;&quot;x&quot;&lt;/b&gt;"
        );
    }

    #[test]
    fn preview_escapes_admin_supplied_text() {
        let session = AdminCodeSession {
            step: DialogStep::Preview,
            count: 1,
            name: "<script>alert(1)</script>".into(),
            link: "http://example.com/?a=1&b=2".into(),
            codes: vec!["REDM-ABC123".into()],
        };
        let msg = preview_message(&session);
        assert!(!msg.contains("<script>"));
        assert!(msg.contains("&lt;script&gt;"));
        assert!(msg.contains("&amp;b=2"));
        assert!(msg.contains("<code>REDM-ABC123</code>"));
    }

    #[test]
    fn unused_codes_grouped_output() {
        let mut grouped = BTreeMap::new();
        grouped.insert("Pack".to_string(), vec!["REDM-AAAAAA".to_string()]);
        let msg = unused_codes_message(&grouped);
        assert!(msg.contains("<b>Pack</b> (1)"));
        assert!(msg.contains("<code>REDM-AAAAAA</code>"));

        assert_eq!(
            unused_codes_message(&BTreeMap::new()),
            "No unused access codes."
        );
    }
}
