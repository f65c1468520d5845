//! Recommendation results rendering
//!
//! Produces the results page markup from a stored recommendation response.
//! Leading results that lack display facets are enriched from the species
//! detail endpoint before rendering.

use crate::detail_cache::DetailCache;
use futures::future::join_all;
use lzm_common::html::{detail_href, escape};
use lzm_common::images::img_tag;
use lzm_common::models::{fields, RecommendationResponse, RecommendationResult};
use std::str::FromStr;
use tracing::debug;

/// Results eligible for detail enrichment
pub const ENRICH_LIMIT: usize = 7;

/// "Other matches" shown under the hero card
pub const OTHERS_LIMIT: usize = 6;

pub const NO_RESULTS_MESSAGE: &str = "추천 결과가 없습니다.";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ResultsLayout {
    /// Best match card plus a short grid of runners-up
    #[default]
    Hero,
    /// Every result as a numbered card with reasons and contributions
    Ranked,
}

impl FromStr for ResultsLayout {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "hero" => Ok(ResultsLayout::Hero),
            "ranked" => Ok(ResultsLayout::Ranked),
            other => Err(format!("unknown layout '{}' (expected hero or ranked)", other)),
        }
    }
}

/// What the results view shows
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResultsView {
    NoResults(String),
    Html(String),
}

impl ResultsView {
    pub fn into_text(self) -> String {
        match self {
            ResultsView::NoResults(msg) | ResultsView::Html(msg) => msg,
        }
    }
}

// ========================================
// Formatting helpers
// ========================================

/// Initial cost grade as a won range
pub fn format_currency(grade: Option<i64>) -> &'static str {
    match grade {
        Some(1) => "10만원 이하",
        Some(2) => "10만원 ~ 30만원",
        Some(3) => "30만원 ~ 50만원",
        Some(4) => "50만원 ~ 100만원",
        Some(5) => "100만원 이상",
        _ => "-",
    }
}

/// Enclosure size grade as approximate dimensions
pub fn format_enclosure(grade: Option<i64>) -> &'static str {
    match grade {
        Some(1) => "가로 ≤45cm · 깊이 ≤30cm · 높이 ≈30cm",
        Some(2) => "가로 45~60cm · 깊이 30~45cm · 높이 45~60cm",
        Some(3) => "가로 ≥60cm(90/120cm) · 깊이 ≥45cm · 높이 ≥60cm",
        _ => "-",
    }
}

pub fn format_activity_pattern(value: Option<&str>) -> &'static str {
    let v = value.unwrap_or("").trim();
    if v.contains("야행성") {
        "야행성"
    } else if v.contains("주행성") {
        "주행성"
    } else {
        "-"
    }
}

/// Five star icons, the first `level` filled
pub fn render_stars(level: Option<i64>) -> String {
    let filled = level.unwrap_or(0).clamp(0, 5);
    let mut html = String::from("<span class=\"stars\" aria-label=\"난이도\">");
    for i in 1..=5 {
        if i <= filled {
            html.push_str("<i class=\"ph-fill ph-star\" aria-hidden=\"true\"></i>");
        } else {
            html.push_str("<i class=\"ph ph-star\" aria-hidden=\"true\"></i>");
        }
    }
    html.push_str("</span>");
    html
}

/// Match score rounded and clamped to 0..=100
pub fn score_percent(score: f64) -> u32 {
    if !score.is_finite() {
        return 0;
    }
    score.round().clamp(0.0, 100.0) as u32
}

fn lv(grade: Option<i64>) -> Option<String> {
    grade.filter(|g| *g != 0).map(|g| format!("Lv.{}", g))
}

// ========================================
// Enrichment
// ========================================

/// Whether a result lacks one of the facets the cards display
pub fn needs_enrichment(result: &RecommendationResult) -> bool {
    [fields::DIFFICULTY, fields::ENCLOSURE_GRADE, fields::ACTIVITY]
        .iter()
        .any(|key| result.species.is_blank(key))
}

/// Fill missing facets of the leading results from species detail
///
/// Lookups run concurrently through `cache`; result fields win over fetched
/// detail. Results past [`ENRICH_LIMIT`] are returned untouched.
pub async fn enrich_results(
    results: &[RecommendationResult],
    cache: &DetailCache,
) -> Vec<RecommendationResult> {
    let head = results.iter().take(ENRICH_LIMIT).map(|result| async move {
        let mut result = result.clone();
        if needs_enrichment(&result) {
            if let Some(name) = result.name().map(str::to_string) {
                if let Some(detail) = cache.get(&name).await {
                    result.species.fill_missing_from(&detail);
                }
            }
        }
        result
    });

    let mut merged = join_all(head).await;
    merged.extend(results.iter().skip(ENRICH_LIMIT).cloned());
    merged
}

// ========================================
// Renderer
// ========================================

#[derive(Debug, Clone, Copy, Default)]
pub struct ResultsRenderer {
    layout: ResultsLayout,
}

impl ResultsRenderer {
    pub fn new(layout: ResultsLayout) -> Self {
        Self { layout }
    }

    /// Render the stored response; absent or empty responses show the no-results message
    pub async fn render(
        &self,
        response: Option<&RecommendationResponse>,
        cache: &DetailCache,
    ) -> ResultsView {
        let Some(response) = response.filter(|r| !r.results.is_empty()) else {
            return ResultsView::NoResults(NO_RESULTS_MESSAGE.to_string());
        };

        let results = enrich_results(&response.results, cache).await;
        debug!(results = results.len(), layout = ?self.layout, "Rendering results");

        let html = match self.layout {
            ResultsLayout::Hero => render_hero(&results),
            ResultsLayout::Ranked => render_ranked(&results),
        };
        ResultsView::Html(html)
    }
}

fn display_name(result: &RecommendationResult) -> &str {
    result.name().unwrap_or("-")
}

fn photo(result: &RecommendationResult, class: Option<&str>, placeholder_class: &str) -> String {
    match result.species.text(fields::PHOTO_URL) {
        Some(url) => img_tag(url, display_name(result), class),
        None => format!("<div class=\"{}\">이미지 없음</div>", placeholder_class),
    }
}

fn render_hero(results: &[RecommendationResult]) -> String {
    let mut html = String::new();
    let Some(best) = results.first() else {
        return html;
    };

    let pct = score_percent(best.match_score);
    let activity = format_activity_pattern(best.species.text(fields::ACTIVITY));
    let enclosure = format_enclosure(best.species.grade(fields::ENCLOSURE_GRADE));
    let difficulty = best.species.grade(fields::DIFFICULTY);
    let cost = lv(best.species.grade(fields::COST_GRADE)).unwrap_or_else(|| "-".to_string());
    let name = escape(display_name(best));

    html.push_str("<div class=\"results-hero-head\">");
    html.push_str("<span class=\"results-pill\">최고의 매칭 결과</span>");
    html.push_str("<h2 class=\"results-title\">당신을 위한 <span class=\"results-title-accent\">완벽한 파트너</span></h2>");
    html.push_str("</div>");

    html.push_str("<section class=\"best-card\">");
    html.push_str("<div class=\"best-image\">");
    html.push_str(&photo(best, Some("best-photo"), "best-photo placeholder"));
    html.push_str(&format!("<span class=\"best-badge\">{}% 일치</span>", pct));
    html.push_str("</div>");

    html.push_str("<div class=\"best-info\">");
    html.push_str("<div class=\"best-meta\">");
    html.push_str(&format!(
        "<span class=\"best-type\">{}</span>",
        escape(best.species.text(fields::SPECIES_TYPE).unwrap_or("-"))
    ));
    if activity != "-" {
        html.push_str(&format!("<span class=\"best-chip\">{}</span>", activity));
    }
    html.push_str("</div>");
    html.push_str(&format!("<h3 class=\"best-name\">{}</h3>", name));

    html.push_str("<div class=\"best-rating\">");
    if let Some(level) = lv(difficulty) {
        html.push_str(&format!(
            "난이도: {} <span class=\"best-lv\">({})</span>",
            render_stars(difficulty),
            level
        ));
    }
    html.push_str("</div>");
    if let Some(summary) = best.species.text(fields::SUMMARY) {
        html.push_str(&format!("<p class=\"best-desc\">{}</p>", escape(summary)));
    }

    let cost_line = match lv(difficulty) {
        Some(level) => format!("{} · {}", cost, level),
        None => cost,
    };
    html.push_str("<div class=\"best-stats\">");
    for (icon, label, value) in [
        ("ph-ruler", "필요 공간", enclosure.to_string()),
        ("ph-moon-stars", "활동 시간", activity.to_string()),
        ("ph-heartbeat", "매칭 점수", format!("{}/100", pct)),
        ("ph-currency-dollar", "초기 비용", cost_line),
    ] {
        html.push_str(&format!(
            "<div class=\"stat\"><i class=\"ph {}\" aria-hidden=\"true\"></i><div><div class=\"stat-label\">{}</div><div class=\"stat-value\">{}</div></div></div>",
            icon, label, value
        ));
    }
    html.push_str("</div>");

    html.push_str(&format!(
        "<a href=\"{}\" class=\"best-cta\">사육 정보 더보기</a>",
        escape(&detail_href(display_name(best)))
    ));
    html.push_str("</div>");
    html.push_str("</section>");

    let others: Vec<&RecommendationResult> = results.iter().skip(1).take(OTHERS_LIMIT).collect();
    if !others.is_empty() {
        html.push_str("<section class=\"others\">");
        html.push_str("<h3 class=\"others-title\">다른 추천 친구들</h3>");
        html.push_str("<div class=\"others-grid\">");
        for other in others {
            render_other_card(&mut html, other);
        }
        html.push_str("</div></section>");
    }

    html
}

fn render_other_card(html: &mut String, result: &RecommendationResult) {
    let activity = format_activity_pattern(result.species.text(fields::ACTIVITY));
    let difficulty = result.species.grade(fields::DIFFICULTY);

    html.push_str("<div class=\"other-card\">");
    html.push_str(&format!(
        "<div class=\"other-top\"><div class=\"other-name\">{}</div><span class=\"other-badge\">{}%</span></div>",
        escape(display_name(result)),
        score_percent(result.match_score)
    ));
    if activity != "-" {
        html.push_str(&format!("<div class=\"other-meta\">{}</div>", activity));
    }
    if lv(difficulty).is_some() {
        html.push_str(&format!("<div class=\"other-stars\">{}</div>", render_stars(difficulty)));
    }
    html.push_str("<div class=\"other-image\">");
    html.push_str(&photo(result, None, "placeholder"));
    html.push_str("</div>");
    if let Some(summary) = result.species.text(fields::SUMMARY) {
        html.push_str(&format!("<p class=\"other-desc\">{}</p>", escape(summary)));
    }
    html.push_str(&format!(
        "<a class=\"other-btn\" href=\"{}\">상세 보기</a>",
        escape(&detail_href(display_name(result)))
    ));
    html.push_str("</div>");
}

fn render_ranked(results: &[RecommendationResult]) -> String {
    let mut html = String::new();

    html.push_str("<div class=\"results-header\">");
    html.push_str(&format!("<h2>추천 결과 ({}개)</h2>", results.len()));
    html.push_str("</div>");
    html.push_str("<div class=\"results-grid\">");

    for (index, result) in results.iter().enumerate() {
        let href = escape(&detail_href(display_name(result)));

        html.push_str("<div class=\"result-card\">");
        html.push_str(&format!("<div class=\"result-rank\">{}</div>", index + 1));
        html.push_str(&photo(result, Some("result-image"), "result-image-placeholder"));

        html.push_str("<div class=\"result-info\">");
        html.push_str(&format!(
            "<h3><a href=\"{}\">{}</a></h3>",
            href,
            escape(display_name(result))
        ));
        html.push_str(&format!(
            "<p class=\"result-type\">{}</p>",
            escape(result.species.text(fields::SPECIES_TYPE).unwrap_or("-"))
        ));
        html.push_str(&format!(
            "<p class=\"result-score\">매칭 점수: <strong>{}</strong>점</p>",
            result.match_score
        ));
        html.push_str(&format!(
            "<div class=\"result-costs\"><p>초기 비용: <strong>{}</strong></p></div>",
            format_currency(result.species.grade(fields::COST_GRADE))
        ));
        if let Some(summary) = result.species.text(fields::SUMMARY) {
            html.push_str(&format!("<p class=\"result-summary\">{}</p>", escape(summary)));
        }

        if let Some(reasons) = result.match_reasons.as_ref().filter(|r| !r.is_empty()) {
            html.push_str("<div class=\"result-reasons\"><h4>추천 근거</h4><ul>");
            for reason in reasons {
                html.push_str(&format!("<li>{}</li>", escape(reason)));
            }
            html.push_str("</ul></div>");
        }

        if let Some(contributions) = &result.question_contributions {
            html.push_str("<div class=\"result-contributions\"><h4>질문별 기여도</h4><ul>");
            for (question, score) in contributions.iter() {
                html.push_str(&format!("<li>{}: {:.1}점</li>", escape(question), score));
            }
            html.push_str("</ul></div>");
        }

        html.push_str(&format!(
            "<div class=\"result-actions\"><a href=\"{}\" class=\"btn btn-secondary btn-detail\">세부 정보 보기</a></div>",
            href
        ));
        html.push_str("</div>");
        html.push_str("</div>");
    }

    html.push_str("</div>");
    html
}
