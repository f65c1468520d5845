//! Small markup helpers shared by the results and dex renderers

/// Escape text for use in HTML content or a double-quoted attribute
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

/// Link to the species detail page
pub fn detail_href(species_name: &str) -> String {
    format!("detail.html?species={}", urlencoding::encode(species_name))
}
