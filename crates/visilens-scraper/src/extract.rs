//! HTML extraction: title, meta tags, paragraphs, links, keywords, body text.

use std::collections::BTreeMap;

use regex::Regex;
use reqwest::Url;
use visilens_core::ContentDocument;

const FULL_TEXT_CAP: usize = 10_000;
const KEYWORD_LIMIT: usize = 20;
const STOP_WORDS: &[&str] = &[
    "and", "the", "that", "this", "with", "for", "from", "have", "what",
];

pub(crate) fn document_from_html(url: &str, html: &str) -> ContentDocument {
    let title = extract_title(html);
    let title = if title.is_empty() {
        url.to_string()
    } else {
        title
    };

    let description = extract_meta_description(html);
    let meta_tags = extract_meta_tags(html);
    let paragraphs = extract_paragraphs(html);
    let links = extract_links(html, url);
    let full_text = truncate_chars(&body_text(html), FULL_TEXT_CAP);

    // Keywords come from the meta tag when the site declares one, otherwise
    // from the most frequent body-text tokens.
    let keywords = match extract_keywords_meta(html) {
        Some(meta) => meta
            .split(',')
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .map(ToString::to_string)
            .collect(),
        None => fallback_keywords(&full_text),
    };

    ContentDocument {
        url: url.to_string(),
        title,
        description,
        paragraphs,
        keywords,
        meta_tags,
        links,
        full_text,
    }
}

fn extract_title(html: &str) -> String {
    let re = Regex::new(r"(?is)<title[^>]*>(.*?)</title>").expect("valid title regex");
    let Some(cap) = re.captures(html) else {
        return String::new();
    };
    clean_text(cap.get(1).map_or("", |m| m.as_str()))
}

fn extract_meta_description(html: &str) -> String {
    extract_named_meta(html, "description").unwrap_or_default()
}

fn extract_keywords_meta(html: &str) -> Option<String> {
    extract_named_meta(html, "keywords").filter(|v| !v.is_empty())
}

/// Pull one named `<meta>` tag's content, tolerating either attribute order.
fn extract_named_meta(html: &str, name: &str) -> Option<String> {
    let re = Regex::new(&format!(
        r#"(?is)<meta[^>]+name\s*=\s*["']{name}["'][^>]+content\s*=\s*["'](.*?)["'][^>]*>"#
    ))
    .expect("valid named meta regex");

    if let Some(cap) = re.captures(html) {
        return cap.get(1).map(|m| clean_text(m.as_str()));
    }

    let re_swapped = Regex::new(&format!(
        r#"(?is)<meta[^>]+content\s*=\s*["'](.*?)["'][^>]+name\s*=\s*["']{name}["'][^>]*>"#
    ))
    .expect("valid named meta fallback regex");

    re_swapped
        .captures(html)
        .and_then(|cap| cap.get(1).map(|m| clean_text(m.as_str())))
}

fn extract_meta_tags(html: &str) -> BTreeMap<String, String> {
    let tag_re = Regex::new(r"(?is)<meta\b[^>]*>").expect("valid meta tag regex");
    let name_re = Regex::new(r#"(?is)\b(?:name|property)\s*=\s*["']([^"']+)["']"#)
        .expect("valid meta name regex");
    let content_re =
        Regex::new(r#"(?is)\bcontent\s*=\s*["']([^"']*)["']"#).expect("valid meta content regex");

    let mut tags = BTreeMap::new();
    for tag in tag_re.find_iter(html) {
        let tag = tag.as_str();
        let Some(name) = name_re.captures(tag).and_then(|cap| cap.get(1)) else {
            continue;
        };
        let Some(content) = content_re.captures(tag).and_then(|cap| cap.get(1)) else {
            continue;
        };
        if content.as_str().trim().is_empty() {
            continue;
        }
        tags.insert(
            name.as_str().to_string(),
            clean_text(content.as_str()),
        );
    }
    tags
}

fn extract_paragraphs(html: &str) -> Vec<String> {
    let re = Regex::new(r"(?is)<p[^>]*>(.*?)</p>").expect("valid paragraph regex");
    re.captures_iter(html)
        .map(|cap| clean_text(cap.get(1).map_or("", |m| m.as_str())))
        .filter(|p| !p.is_empty())
        .collect()
}

fn extract_links(html: &str, base: &str) -> Vec<String> {
    let re = Regex::new(r#"(?is)href\s*=\s*["']([^"']+)["']"#).expect("valid href regex");
    let base_url = Url::parse(base).ok();

    re.captures_iter(html)
        .filter_map(|cap| cap.get(1).map(|m| m.as_str().trim().to_string()))
        .filter(|href| {
            !href.is_empty()
                && !href.starts_with('#')
                && !href.starts_with("mailto:")
                && !href.starts_with("javascript:")
        })
        .map(|href| resolve_link(&href, base_url.as_ref()))
        .collect()
}

/// Resolve a href against the page URL; hrefs that won't resolve are kept raw.
fn resolve_link(href: &str, base: Option<&Url>) -> String {
    base.and_then(|b| b.join(href).ok())
        .map_or_else(|| href.to_string(), |u| u.to_string())
}

fn body_text(html: &str) -> String {
    let body_re = Regex::new(r"(?is)<body[^>]*>(.*?)</body>").expect("valid body regex");
    let region = body_re
        .captures(html)
        .and_then(|cap| cap.get(1))
        .map_or(html, |m| m.as_str());

    let script_re = Regex::new(r"(?is)<script[^>]*>.*?</script>").expect("valid script regex");
    let style_re = Regex::new(r"(?is)<style[^>]*>.*?</style>").expect("valid style regex");
    let no_scripts = script_re.replace_all(region, " ");
    let no_styles = style_re.replace_all(&no_scripts, " ");
    clean_text(&no_styles)
}

/// Most frequent body-text tokens: lowercased, punctuation dropped, tokens of
/// length <= 3 and stop words excluded. Ties keep first-seen order.
fn fallback_keywords(text: &str) -> Vec<String> {
    let cleaned_re = Regex::new(r"[^\w\s]").expect("valid token regex");
    let lowered = text.to_lowercase();
    let cleaned = cleaned_re.replace_all(&lowered, " ");

    let mut counts: Vec<(String, u32)> = Vec::new();
    let mut index: std::collections::HashMap<String, usize> = std::collections::HashMap::new();

    for word in cleaned.split_whitespace() {
        if word.chars().count() <= 3 || STOP_WORDS.contains(&word) {
            continue;
        }
        match index.get(word) {
            Some(&i) => counts[i].1 += 1,
            None => {
                index.insert(word.to_string(), counts.len());
                counts.push((word.to_string(), 1));
            }
        }
    }

    counts.sort_by(|a, b| b.1.cmp(&a.1));
    counts
        .into_iter()
        .take(KEYWORD_LIMIT)
        .map(|(word, _)| word)
        .collect()
}

fn truncate_chars(text: &str, cap: usize) -> String {
    text.chars().take(cap).collect()
}

fn clean_text(input: &str) -> String {
    let tags = Regex::new(r"(?is)<[^>]+>").expect("valid tags regex");
    let no_tags = tags.replace_all(input, " ");
    no_tags
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .trim()
        .to_string()
}

#[cfg(test)]
#[path = "extract_test.rs"]
mod tests;
