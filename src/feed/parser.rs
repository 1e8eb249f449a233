use super::paper::Paper;
use crate::util::clean_text;
use feed_rs::model::Entry;
use feed_rs::parser::{self, ParseFeedError};
use std::sync::Arc;
use thiserror::Error;

/// Marker in the id of the synthetic entry arXiv returns for a bad query.
const ARXIV_ERROR_ID: &str = "arxiv.org/api/errors";

#[derive(Debug, Error)]
pub enum ParseError {
    /// Body is not a feed document at all.
    #[error("malformed feed document: {0}")]
    Document(#[from] ParseFeedError),
    /// The API answered with its error entry instead of results.
    #[error("upstream error: {0}")]
    Upstream(String),
}

/// Papers recovered from one response body.
#[derive(Debug)]
pub struct ParseResult {
    pub papers: Vec<Paper>,
    /// Entries present in the document, including dropped ones.
    pub raw_len: usize,
    /// Entries dropped for missing an id or a title.
    pub skipped: usize,
}

/// Parses an Atom response into papers.
///
/// Entries without an id or a non-blank title are dropped rather than
/// failing the page. Only a document that cannot be read at all is an error.
pub fn parse_papers(bytes: &[u8]) -> Result<ParseResult, ParseError> {
    // Keep missing ids empty instead of synthesizing one from links/title
    let feed = parser::Builder::new()
        .id_generator(|_links, _title, _uri| String::new())
        .build()
        .parse(bytes)?;

    if let Some(message) = upstream_error(&feed.entries) {
        return Err(ParseError::Upstream(message));
    }

    let raw_len = feed.entries.len();
    let papers: Vec<Paper> = feed.entries.into_iter().filter_map(paper_from_entry).collect();
    let skipped = raw_len - papers.len();

    Ok(ParseResult {
        papers,
        raw_len,
        skipped,
    })
}

fn upstream_error(entries: &[Entry]) -> Option<String> {
    let [entry] = entries else {
        return None;
    };
    if !entry.id.contains(ARXIV_ERROR_ID) {
        return None;
    }
    let message = entry
        .summary
        .as_ref()
        .map(|s| clean_text(&s.content))
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| "unknown error".to_string());
    Some(message)
}

fn paper_from_entry(entry: Entry) -> Option<Paper> {
    let id = entry.id.trim();
    if id.is_empty() {
        return None;
    }

    let title = entry
        .title
        .as_ref()
        .map(|t| clean_text(&t.content))
        .filter(|t| !t.is_empty())?;

    let summary = entry
        .summary
        .as_ref()
        .map(|s| clean_text(&s.content))
        .unwrap_or_default();

    let authors: Vec<String> = entry
        .authors
        .iter()
        .map(|a| clean_text(&a.name))
        .filter(|name| !name.is_empty())
        .collect();

    let mut categories: Vec<String> = Vec::with_capacity(entry.categories.len());
    for category in &entry.categories {
        let term = clean_text(&category.term);
        if !term.is_empty() && !categories.contains(&term) {
            categories.push(term);
        }
    }

    let link = entry
        .links
        .iter()
        .find(|l| l.rel.as_deref() == Some("alternate"))
        .or_else(|| entry.links.first())
        .map(|l| l.href.trim().to_string())
        .filter(|href| !href.is_empty())
        .unwrap_or_else(|| id.to_string());

    Some(Paper {
        id: Arc::from(id),
        title,
        summary,
        authors,
        published: entry.published.or(entry.updated),
        categories,
        link,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use pretty_assertions::assert_eq;

    fn atom(entries: &str) -> String {
        format!(
            r#"<?xml version="1.0" encoding="UTF-8"?>
<feed xmlns="http://www.w3.org/2005/Atom">
  <title type="html">ArXiv Query: search_query=cat:cs.AI</title>
  <id>http://arxiv.org/api/abc</id>
  <updated>2024-01-02T00:00:00-05:00</updated>
  {entries}
</feed>"#
        )
    }

    fn entry(n: usize) -> String {
        format!(
            r#"<entry>
    <id>http://arxiv.org/abs/2401.{n:05}v1</id>
    <updated>2024-01-02T10:00:00Z</updated>
    <published>2024-01-01T10:00:00Z</published>
    <title>Paper number
      {n}</title>
    <summary>  An abstract that wraps
  across lines.
    </summary>
    <author><name>First Author</name></author>
    <author><name>Second Author</name></author>
    <link href="http://arxiv.org/abs/2401.{n:05}v1" rel="alternate" type="text/html"/>
    <link title="pdf" href="http://arxiv.org/pdf/2401.{n:05}v1" rel="related" type="application/pdf"/>
    <category term="cs.AI" scheme="http://arxiv.org/schemas/atom"/>
    <category term="cs.CL" scheme="http://arxiv.org/schemas/atom"/>
  </entry>"#
        )
    }

    #[test]
    fn test_parses_full_entry() {
        let xml = atom(&entry(7));
        let result = parse_papers(xml.as_bytes()).unwrap();

        assert_eq!(result.raw_len, 1);
        assert_eq!(result.skipped, 0);
        let paper = &result.papers[0];
        assert_eq!(&*paper.id, "http://arxiv.org/abs/2401.00007v1");
        assert_eq!(paper.title, "Paper number 7");
        assert_eq!(paper.summary, "An abstract that wraps across lines.");
        assert_eq!(paper.authors, vec!["First Author", "Second Author"]);
        assert_eq!(paper.categories, vec!["cs.AI", "cs.CL"]);
        assert_eq!(paper.link, "http://arxiv.org/abs/2401.00007v1");
        assert_eq!(
            paper.published,
            Some(Utc.with_ymd_and_hms(2024, 1, 1, 10, 0, 0).unwrap())
        );
    }

    #[test]
    fn test_entry_without_title_is_dropped() {
        let mut entries: Vec<String> = (0..10).map(entry).collect();
        entries[4] = r#"<entry>
    <id>http://arxiv.org/abs/2401.99999v1</id>
    <summary>No title here</summary>
  </entry>"#
            .to_string();
        let xml = atom(&entries.join("\n"));

        let result = parse_papers(xml.as_bytes()).unwrap();
        assert_eq!(result.raw_len, 10);
        assert_eq!(result.papers.len(), 9);
        assert_eq!(result.skipped, 1);
        assert!(result
            .papers
            .iter()
            .all(|p| &*p.id != "http://arxiv.org/abs/2401.99999v1"));
    }

    #[test]
    fn test_entry_with_blank_title_is_dropped() {
        let xml = atom(
            r#"<entry><id>http://arxiv.org/abs/1</id><title>
        </title></entry>"#,
        );
        let result = parse_papers(xml.as_bytes()).unwrap();
        assert!(result.papers.is_empty());
        assert_eq!(result.skipped, 1);
    }

    #[test]
    fn test_entry_without_id_is_dropped() {
        let xml = atom(r#"<entry><title>Orphan</title><summary>x</summary></entry>"#);
        let result = parse_papers(xml.as_bytes()).unwrap();
        assert!(result.papers.is_empty());
        assert_eq!(result.raw_len, 1);
    }

    #[test]
    fn test_missing_optional_fields_use_defaults() {
        let xml = atom(r#"<entry><id>http://arxiv.org/abs/42</id><title>Bare</title></entry>"#);
        let result = parse_papers(xml.as_bytes()).unwrap();
        let paper = &result.papers[0];
        assert_eq!(paper.summary, "");
        assert!(paper.authors.is_empty());
        assert!(paper.categories.is_empty());
        assert_eq!(paper.published, None);
        // No links: fall back to the id
        assert_eq!(paper.link, "http://arxiv.org/abs/42");
    }

    #[test]
    fn test_duplicate_categories_collapse() {
        let xml = atom(
            r#"<entry><id>http://arxiv.org/abs/1</id><title>T</title>
  <category term="cs.AI"/><category term="cs.AI"/><category term="stat.ML"/></entry>"#,
        );
        let result = parse_papers(xml.as_bytes()).unwrap();
        assert_eq!(result.papers[0].categories, vec!["cs.AI", "stat.ML"]);
    }

    #[test]
    fn test_empty_feed_has_no_entries() {
        let result = parse_papers(atom("").as_bytes()).unwrap();
        assert!(result.papers.is_empty());
        assert_eq!(result.raw_len, 0);
    }

    #[test]
    fn test_upstream_error_entry() {
        let xml = atom(
            r#"<entry><id>http://arxiv.org/api/errors#incorrect_id_format_for_1234</id>
  <title>Error</title><summary>incorrect id format for 1234</summary></entry>"#,
        );
        match parse_papers(xml.as_bytes()) {
            Err(ParseError::Upstream(msg)) => assert_eq!(msg, "incorrect id format for 1234"),
            other => panic!("Expected Upstream error, got {:?}", other.map(|r| r.raw_len)),
        }
    }

    #[test]
    fn test_garbage_is_document_error() {
        let result = parse_papers(b"<not valid xml");
        assert!(matches!(result, Err(ParseError::Document(_))));
    }
}
