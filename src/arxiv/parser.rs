use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::Url;
use scraper::{ElementRef, Html, Selector};

// Selectors and patterns for the arXiv search result markup, compiled once
static RESULT_SELECTOR: Lazy<Selector> = Lazy::new(|| {
    Selector::parse("li.arxiv-result").expect("Invalid result selector")
});
static DATE_SELECTOR: Lazy<Selector> = Lazy::new(|| {
    Selector::parse("p.is-size-7").expect("Invalid date selector")
});
static TITLE_SELECTOR: Lazy<Selector> = Lazy::new(|| {
    Selector::parse("p.title").expect("Invalid title selector")
});
static ANCHOR_SELECTOR: Lazy<Selector> = Lazy::new(|| {
    Selector::parse("a").expect("Invalid anchor selector")
});
// "Submitted" may be glued to the day when the markup has no whitespace
static SUBMITTED_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"Submitted\s*(\d{1,2})\s+([A-Za-z]+),\s*(\d{4})").expect("Invalid submission date regex pattern")
});

/// One `li.arxiv-result` entry as it appears on a search page
#[derive(Debug, Clone, PartialEq)]
pub struct SearchResult {
    pub title: Option<String>,
    pub submitted: Option<NaiveDate>,
    pub pdf_url: Option<Url>,
    /// Every anchor href in the entry, kept for diagnostics
    pub hrefs: Vec<String>,
}

/// Parse all results on a search page. Relative links resolve against `page_url`.
pub fn parse_search_page(html: &str, page_url: &Url) -> Vec<SearchResult> {
    let document = Html::parse_document(html);
    document
        .select(&RESULT_SELECTOR)
        .map(|result| parse_result(result, page_url))
        .collect()
}

fn parse_result(result: ElementRef<'_>, page_url: &Url) -> SearchResult {
    let submitted = result
        .select(&DATE_SELECTOR)
        .next()
        .and_then(|p| parse_submission_date(&p.text().collect::<String>()));

    let title = result
        .select(&TITLE_SELECTOR)
        .next()
        .map(|p| collapse_whitespace(&p.text().collect::<String>()))
        .filter(|t| !t.is_empty());

    let hrefs: Vec<String> = result
        .select(&ANCHOR_SELECTOR)
        .filter_map(|a| a.value().attr("href"))
        .map(|href| href.to_string())
        .collect();

    let pdf_url = find_pdf_url(&hrefs, page_url);

    SearchResult {
        title,
        submitted,
        pdf_url,
        hrefs,
    }
}

/// Extract the date following "Submitted", e.g. "Submitted 4 March, 2025"
pub fn parse_submission_date(text: &str) -> Option<NaiveDate> {
    let caps = SUBMITTED_REGEX.captures(text)?;
    let normalized = format!("{} {} {}", &caps[1], &caps[2], &caps[3]);
    NaiveDate::parse_from_str(&normalized, "%d %B %Y").ok()
}

/// First link whose href mentions "pdf", resolved to an absolute URL
pub fn find_pdf_url(hrefs: &[String], page_url: &Url) -> Option<Url> {
    hrefs
        .iter()
        .find(|href| href.to_lowercase().contains("pdf"))
        .and_then(|href| page_url.join(href).ok())
}

/// Paper identifier taken from the last path segment of a PDF link
pub fn paper_id_from_url(url: &Url) -> Option<String> {
    let last = url.path_segments()?.filter(|s| !s.is_empty()).last()?;
    let id = last.strip_suffix(".pdf").unwrap_or(last);
    if id.is_empty() {
        None
    } else {
        Some(id.to_string())
    }
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
