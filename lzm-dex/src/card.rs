//! Dex card markup

use lzm_common::html::{detail_href, escape};
use lzm_common::images::img_tag;
use lzm_common::models::{fields, SpeciesRecord};

/// `Lv.{n}` for a non-zero grade, `-` otherwise
pub fn difficulty_label(grade: Option<i64>) -> String {
    match grade {
        Some(n) if n != 0 => format!("Lv.{}", n),
        _ => "-".to_string(),
    }
}

/// One species card
pub fn render_card(record: &SpeciesRecord) -> String {
    let name = record.name().unwrap_or("-");
    let mut html = String::from("<article class=\"dex-card\">");

    html.push_str("<div class=\"dex-card-image\">");
    match record.text(fields::PHOTO_URL) {
        Some(url) => html.push_str(&img_tag(url, name, None)),
        None => html.push_str("<div class=\"dex-card-placeholder\">이미지 없음</div>"),
    }
    html.push_str(&format!(
        "<span class=\"dex-badge\">{}</span>",
        difficulty_label(record.grade(fields::DIFFICULTY))
    ));
    html.push_str("</div>");

    html.push_str("<div class=\"dex-card-body\">");
    html.push_str("<div class=\"dex-card-title-row\"><div>");
    html.push_str(&format!("<div class=\"dex-card-name\">{}</div>", escape(name)));
    if let Some(species_type) = record.text(fields::SPECIES_TYPE) {
        html.push_str(&format!("<div class=\"dex-card-type\">{}</div>", escape(species_type)));
    }
    html.push_str("</div>");
    html.push_str(&format!(
        "<button type=\"button\" class=\"dex-edit\" data-species=\"{}\" aria-label=\"정보 수정\"><i class=\"ph ph-pencil-simple\" aria-hidden=\"true\"></i></button>",
        escape(name)
    ));
    html.push_str("</div>");

    if let Some(summary) = record.text(fields::SUMMARY) {
        html.push_str(&format!("<p class=\"dex-card-desc\">{}</p>", escape(summary)));
    }

    html.push_str("<div class=\"dex-chips\">");
    for key in [fields::ACTIVITY, fields::DIET] {
        if let Some(chip) = record.text(key) {
            html.push_str(&format!("<span class=\"dex-chip\">{}</span>", escape(chip)));
        }
    }
    html.push_str("</div>");

    html.push_str(&format!(
        "<div class=\"dex-card-actions\"><a class=\"dex-detail\" href=\"{}\">상세 보기</a></div>",
        escape(&detail_href(name))
    ));
    html.push_str("</div>");
    html.push_str("</article>");
    html
}

/// All cards in display order
pub fn render_grid(records: &[SpeciesRecord]) -> String {
    let mut html = String::from("<div class=\"dex-grid\">");
    for record in records {
        html.push_str(&render_card(record));
    }
    html.push_str("</div>");
    html
}
