//! Result reshaping and merging
//!
//! Each request's raw hits become a partial [`DocumentMap`]; partials are
//! merged in issue order with last-writer-wins per URL.

use once_cell::sync::Lazy;
use regex::Regex;

use super::{DocumentMap, SearchHit, SearchResult};

static MARKDOWN_LINK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[([^\]]*)\]\([^)]*\)").expect("Invalid regex"));
static BOLD: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\*\*([^*]+)\*\*|__([^_]+)__").expect("Invalid regex"));
static LEADING_MARKER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?:#{1,6}|[*\-•>])\s+").expect("Invalid regex"));
static EDGE_EMPHASIS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[*_`]+|[*_`]+$").expect("Invalid regex"));
static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("Invalid regex"));

/// Strip markup decoration from a title
///
/// Unwraps markdown links and bold text, drops heading/bullet markers and
/// stray edge emphasis, decodes the common HTML entities and collapses
/// whitespace.
pub fn clean_title(title: &str) -> String {
    let title = MARKDOWN_LINK.replace_all(title, "$1");
    let title = BOLD.replace_all(&title, "$1$2");
    let title = WHITESPACE.replace_all(title.trim(), " ");
    let title = LEADING_MARKER.replace(&title, "");
    let title = EDGE_EMPHASIS.replace_all(&title, "");
    title
        .replace("&amp;", "&")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .trim()
        .to_string()
}

/// Clean a title; one that is blank or just repeats the URL becomes `""`
pub fn normalize_title(title: &str, url: &str) -> String {
    if title.is_empty() {
        return String::new();
    }
    let cleaned = clean_title(title);
    if cleaned.trim().is_empty() || cleaned.to_lowercase() == url.to_lowercase() {
        String::new()
    } else {
        cleaned
    }
}

/// Reshape one response into a partial map
///
/// Hits without both a URL and non-empty content are dropped.
pub fn documents_from_hits(query: &str, hits: Vec<SearchHit>) -> DocumentMap {
    let mut docs = DocumentMap::new();

    for hit in hits {
        let (Some(url), Some(content)) = (hit.url, hit.content) else {
            continue;
        };
        if url.is_empty() || content.is_empty() {
            continue;
        }

        let title = normalize_title(hit.title.as_deref().unwrap_or_default(), &url);
        tracing::debug!("Search result for '{}': URL={}, Title='{}'", query, url, title);

        docs.insert(
            url.clone(),
            SearchResult::new(
                url,
                title,
                content,
                query.to_string(),
                hit.score.unwrap_or(0.0),
            ),
        );
    }

    docs
}

/// Merge partial maps in order; later entries overwrite earlier ones
pub fn merge_partials<I>(partials: I) -> DocumentMap
where
    I: IntoIterator<Item = DocumentMap>,
{
    let mut merged = DocumentMap::new();
    for docs in partials {
        merged.extend(docs);
    }
    merged
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hit(url: &str, title: Option<&str>, content: Option<&str>) -> SearchHit {
        SearchHit {
            url: Some(url.to_string()),
            title: title.map(str::to_string),
            content: content.map(str::to_string),
            score: Some(0.5),
        }
    }

    #[test]
    fn test_clean_title_strips_decoration() {
        assert_eq!(clean_title("## **Acme Corp**  Annual   Report"), "Acme Corp Annual Report");
        assert_eq!(clean_title("  **Acme Corp**  "), "Acme Corp");
        assert_eq!(clean_title("[Acme News](https://acme.com/news)"), "Acme News");
        assert_eq!(clean_title("Q3 Results &amp; Outlook"), "Q3 Results & Outlook");
        assert_eq!(clean_title("- Investor relations"), "Investor relations");
    }

    #[test]
    fn test_normalize_title_equal_to_url() {
        assert_eq!(normalize_title("HTTPS://Acme.com/About", "https://acme.com/about"), "");
        assert_eq!(normalize_title("   ", "https://acme.com"), "");
        assert_eq!(normalize_title("", "https://acme.com"), "");
        assert_eq!(normalize_title("About Acme", "https://acme.com"), "About Acme");
    }

    #[test]
    fn test_documents_from_hits_filters() {
        let hits = vec![
            hit("https://a.com", Some("A"), Some("content a")),
            hit("https://b.com", Some("B"), Some("")),
            hit("https://c.com", Some("C"), None),
            SearchHit {
                url: None,
                title: Some("D".to_string()),
                content: Some("content d".to_string()),
                score: None,
            },
        ];

        let docs = documents_from_hits("Acme Corp overview 2024", hits);
        assert_eq!(docs.len(), 1);
        let doc = &docs["https://a.com"];
        assert_eq!(doc.title, "A");
        assert_eq!(doc.query, "Acme Corp overview 2024");
        assert_eq!(doc.source, "web_search");
        assert!((doc.score - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_missing_score_defaults_to_zero() {
        let mut h = hit("https://a.com", None, Some("content"));
        h.score = None;
        let docs = documents_from_hits("q w e", vec![h]);
        assert_eq!(docs["https://a.com"].score, 0.0);
        assert_eq!(docs["https://a.com"].title, "");
    }

    #[test]
    fn test_merge_last_writer_wins() {
        let first = documents_from_hits(
            "first query here",
            vec![
                hit("https://shared.com", Some("Shared"), Some("from first")),
                hit("https://only-first.com", Some("F"), Some("f")),
            ],
        );
        let second = documents_from_hits(
            "second query here",
            vec![hit("https://shared.com", Some("Shared"), Some("from second"))],
        );

        let merged = merge_partials(vec![first, second]);
        assert_eq!(merged.len(), 2);
        assert_eq!(merged["https://shared.com"].content, "from second");
        assert_eq!(merged["https://shared.com"].query, "second query here");
    }

    #[test]
    fn test_merge_empty() {
        assert!(merge_partials(Vec::<DocumentMap>::new()).is_empty());
    }
}
