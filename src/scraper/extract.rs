//! Markup extraction for listing pages and chapter pages.
//!
//! Both roles are tolerant of missing structure: every absent region falls through
//! to the next strategy and the chain ends in an empty-but-valid result. Errors are
//! only returned for selectors that fail to parse.

use crate::model::ChapterLocator;
use crate::scraper::error::ScraperError;
use crate::scraper::{absolutize, parse_selector};
use reqwest::Url;
use scraper::{ElementRef, Html};

/// Top-level chapter sections on a listing page. The first is a "latest chapters" teaser.
const SECTION_SELECTOR: &str = ".section-box";
const LINK_SELECTOR: &str = ".section-list.fix li a";

const TITLE_PRIMARY: &str = ".reader-main .title";
const TITLE_HEADING: &str = "h1";
const BODY_PRIMARY: &str = "#content";
const BODY_SECONDARY: &str = ".content";
const PARAGRAPH: &str = "p";
/// Ads, scripts, embeds, and the mobile-only wrapper. Removed before any body text is read.
const NON_CONTENT: &str = ".adsbygoogle, script, ins, iframe, .mobile-div";

/// One extraction strategy: `Ok(None)` means the region is absent and the next one is tried.
type Strategy = fn(&Html) -> Result<Option<String>, ScraperError>;

const TITLE_STRATEGIES: &[Strategy] = &[title_from_reader_main, title_from_heading];
const BODY_STRATEGIES: &[Strategy] = &[
    body_from_primary_region,
    body_from_secondary_region,
    body_from_all_paragraphs,
];

/// Links pulled from one listing page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListingExtract {
    /// How many chapter sections the page had. Fewer than two means no usable list.
    pub section_count: usize,
    /// Links of the second section in document order, targets made absolute.
    pub locators: Vec<ChapterLocator>,
}

impl ListingExtract {
    pub fn has_chapter_section(&self) -> bool {
        self.section_count >= 2
    }
}

/// Title and body pulled from one chapter page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChapterPage {
    pub title: String,
    /// Paragraph texts joined by `\n`. May be empty.
    pub body: String,
}

/// Extract `(label, absolute URL)` pairs from the second chapter section of a listing page.
pub fn extract_listing(markup: &str, origin: &Url) -> Result<ListingExtract, ScraperError> {
    let doc = Html::parse_document(markup);
    let section_sel = parse_selector(SECTION_SELECTOR)?;
    let link_sel = parse_selector(LINK_SELECTOR)?;

    let sections: Vec<ElementRef> = doc.root_element().select(&section_sel).collect();
    let locators = match sections.get(1) {
        Some(section) => section
            .select(&link_sel)
            .filter_map(|a| {
                let href = a.value().attr("href")?;
                let location = absolutize(origin, href)?;
                Some(ChapterLocator::new(element_text(a), location))
            })
            .collect(),
        None => Vec::new(),
    };

    Ok(ListingExtract {
        section_count: sections.len(),
        locators,
    })
}

/// Extract the chapter title and body. `fallback_title` is used when no title region exists.
pub fn extract_chapter(markup: &str, fallback_title: &str) -> Result<ChapterPage, ScraperError> {
    let mut doc = Html::parse_document(markup);

    let title = first_match(&doc, TITLE_STRATEGIES)?.unwrap_or_else(|| fallback_title.to_string());

    strip_non_content(&mut doc)?;
    let body = first_match(&doc, BODY_STRATEGIES)?.unwrap_or_default();

    Ok(ChapterPage { title, body })
}

fn first_match(doc: &Html, strategies: &[Strategy]) -> Result<Option<String>, ScraperError> {
    for strategy in strategies {
        if let Some(text) = strategy(doc)? {
            return Ok(Some(text));
        }
    }
    Ok(None)
}

fn element_text(el: ElementRef<'_>) -> String {
    el.text().collect::<String>().trim().to_string()
}

fn first_non_empty_text(doc: &Html, selector: &str) -> Result<Option<String>, ScraperError> {
    let sel = parse_selector(selector)?;
    Ok(doc
        .root_element()
        .select(&sel)
        .next()
        .map(element_text)
        .filter(|s| !s.is_empty()))
}

fn title_from_reader_main(doc: &Html) -> Result<Option<String>, ScraperError> {
    // A whitespace-only title counts as absent, so the heading or the label is used instead.
    first_non_empty_text(doc, TITLE_PRIMARY)
}

fn title_from_heading(doc: &Html) -> Result<Option<String>, ScraperError> {
    first_non_empty_text(doc, TITLE_HEADING)
}

/// Paragraphs inside the first element matching `region`. A present region wins even with no paragraphs.
fn region_paragraphs(doc: &Html, region: &str) -> Result<Option<String>, ScraperError> {
    let region_sel = parse_selector(region)?;
    let p_sel = parse_selector(PARAGRAPH)?;
    Ok(doc.root_element().select(&region_sel).next().map(|el| {
        el.select(&p_sel)
            .map(element_text)
            .collect::<Vec<_>>()
            .join("\n")
    }))
}

fn body_from_primary_region(doc: &Html) -> Result<Option<String>, ScraperError> {
    region_paragraphs(doc, BODY_PRIMARY)
}

fn body_from_secondary_region(doc: &Html) -> Result<Option<String>, ScraperError> {
    region_paragraphs(doc, BODY_SECONDARY)
}

/// Last resort: every non-empty paragraph in the document.
fn body_from_all_paragraphs(doc: &Html) -> Result<Option<String>, ScraperError> {
    let p_sel = parse_selector(PARAGRAPH)?;
    let text = doc
        .root_element()
        .select(&p_sel)
        .map(element_text)
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("\n");
    Ok(Some(text))
}

/// Detach ads, scripts, embeds and the mobile-only wrapper (with everything nested in it).
///
/// Detached nodes stay in the arena and `Html::select` still walks them, so every later
/// query goes through `root_element()`, which only visits attached nodes.
fn strip_non_content(doc: &mut Html) -> Result<(), ScraperError> {
    let sel = parse_selector(NON_CONTENT)?;
    let ids: Vec<_> = doc.root_element().select(&sel).map(|el| el.id()).collect();
    for id in ids {
        if let Some(mut node) = doc.tree.get_mut(id) {
            node.detach();
        }
    }
    Ok(())
}
