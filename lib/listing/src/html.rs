//! Listing extraction from HTML.
//!
//! Only generic page metadata (Open Graph, `meta` tags) and schema.org
//! microdata are read. Uses `scraper` for parsing.

use crate::record::ListingRecord;
use scraper::{Html, Selector};

const MAX_HTML_LENGTH: usize = 2_000_000;
const MAX_DESCRIPTION_CHARS: usize = 1_200;
const MAX_FEATURES: usize = 20;

/// Extracts a listing record from an HTML document.
#[must_use]
pub fn parse_listing(html: &str, url: &str) -> ListingRecord {
    let html = truncate_chars(html, MAX_HTML_LENGTH);
    let document = Html::parse_document(&html);

    let mut record = ListingRecord::new(url);
    record.address = extract_address(&document);
    record.price = extract_price(&document);
    record.description = extract_description(&document)
        .map(|d| truncate_chars(&d, MAX_DESCRIPTION_CHARS));
    record.features = select_all_text(&document, r#"[itemprop="amenityFeature"]"#)
        .into_iter()
        .take(MAX_FEATURES)
        .collect();
    record.agent_name = select_text(
        &document,
        r#"[itemprop="seller"] [itemprop="name"], [itemprop="agent"] [itemprop="name"]"#,
    );
    record.agent_phone = select_text(&document, r#"[itemprop="telephone"]"#).or_else(|| {
        select_attr(&document, r#"a[href^="tel:"]"#, "href")
            .map(|href| href.trim_start_matches("tel:").to_string())
    });

    record
}

fn extract_address(doc: &Html) -> Option<String> {
    // Priority: microdata street address → og:title → <h1> → <title>
    select_text(doc, r#"[itemprop="streetAddress"]"#)
        .or_else(|| select_attr(doc, r#"meta[property="og:title"]"#, "content"))
        .or_else(|| select_text(doc, "h1"))
        .or_else(|| select_text(doc, "title"))
}

fn extract_price(doc: &Html) -> Option<String> {
    if let Some(amount) = select_attr(doc, r#"meta[property="product:price:amount"]"#, "content")
    {
        return Some(
            match select_attr(doc, r#"meta[property="product:price:currency"]"#, "content") {
                Some(currency) => format!("{currency} {amount}"),
                None => amount,
            },
        );
    }

    select_attr(doc, r#"[itemprop="price"]"#, "content")
        .or_else(|| select_text(doc, r#"[itemprop="price"]"#))
}

fn extract_description(doc: &Html) -> Option<String> {
    // Priority: meta[name=description] → og:description → microdata
    select_attr(doc, r#"meta[name="description"]"#, "content")
        .or_else(|| select_attr(doc, r#"meta[property="og:description"]"#, "content"))
        .or_else(|| select_text(doc, r#"[itemprop="description"]"#))
}

fn select_text(doc: &Html, selector: &str) -> Option<String> {
    let selector = Selector::parse(selector).ok()?;
    doc.select(&selector)
        .map(|el| collapse_whitespace(&el.text().collect::<String>()))
        .find(|text| !text.is_empty())
}

fn select_all_text(doc: &Html, selector: &str) -> Vec<String> {
    let Ok(selector) = Selector::parse(selector) else {
        return Vec::new();
    };
    doc.select(&selector)
        .map(|el| collapse_whitespace(&el.text().collect::<String>()))
        .filter(|text| !text.is_empty())
        .collect()
}

fn select_attr(doc: &Html, selector: &str, attr: &str) -> Option<String> {
    let selector = Selector::parse(selector).ok()?;
    doc.select(&selector)
        .filter_map(|el| el.value().attr(attr))
        .map(collapse_whitespace)
        .find(|text| !text.is_empty())
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn truncate_chars(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((idx, _)) => text[..idx].to_string(),
        None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LISTING: &str = r#"
        <html>
          <head>
            <title>Iepstraat 3 - Huizen te koop</title>
            <meta property="og:title" content="Iepstraat 3, Utrecht">
            <meta name="description" content="Ruime   eengezinswoning met tuin.">
            <meta property="product:price:amount" content="450.000">
            <meta property="product:price:currency" content="EUR">
          </head>
          <body>
            <ul>
              <li itemprop="amenityFeature">3 slaapkamers</li>
              <li itemprop="amenityFeature"> Energielabel A </li>
            </ul>
            <div itemprop="seller" itemscope>
              <span itemprop="name">Makelaar Jansen</span>
              <a href="tel:030-1234567">Bel ons</a>
            </div>
          </body>
        </html>
    "#;

    #[test]
    fn extracts_metadata_and_microdata() {
        let record = parse_listing(LISTING, "https://example.test/iepstraat-3");

        assert_eq!(record.url, "https://example.test/iepstraat-3");
        assert_eq!(record.address.as_deref(), Some("Iepstraat 3, Utrecht"));
        assert_eq!(record.price.as_deref(), Some("EUR 450.000"));
        assert_eq!(
            record.description.as_deref(),
            Some("Ruime eengezinswoning met tuin.")
        );
        assert_eq!(record.features, vec!["3 slaapkamers", "Energielabel A"]);
        assert_eq!(record.agent_name.as_deref(), Some("Makelaar Jansen"));
        assert_eq!(record.agent_phone.as_deref(), Some("030-1234567"));
    }

    #[test]
    fn falls_back_to_heading_and_microdata_price() {
        let html = r#"<html><body><h1>Damstraat 1</h1>
            <span itemprop="price" content="325000">€ 325.000</span></body></html>"#;
        let record = parse_listing(html, "u");

        assert_eq!(record.address.as_deref(), Some("Damstraat 1"));
        assert_eq!(record.price.as_deref(), Some("325000"));
    }

    #[test]
    fn page_without_facts_is_empty() {
        let record = parse_listing("<html><body><p>Niets</p></body></html>", "u");
        assert!(record.is_empty());
    }

    #[test]
    fn long_descriptions_are_truncated() {
        let long = "é".repeat(MAX_DESCRIPTION_CHARS + 50);
        let html = format!(r#"<meta name="description" content="{long}">"#);
        let record = parse_listing(&html, "u");

        let description = record.description.expect("description");
        assert_eq!(description.chars().count(), MAX_DESCRIPTION_CHARS);
    }
}
