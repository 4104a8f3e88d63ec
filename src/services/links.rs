// src/services/links.rs

//! Candidate file-link extraction and resolution.

use scraper::{ElementRef, Selector};
use url::Url;

/// Collect the downloadable-file anchors inside the content region, in
/// document order, resolved against the canonical host. Discarded links
/// keep their position as `None` so downstream processing stays aligned
/// with the document.
pub fn extract_candidate_links(
    region: Option<ElementRef<'_>>,
    selector: &Selector,
    canonical_host: &str,
) -> Vec<Option<String>> {
    let Some(region) = region else {
        return Vec::new();
    };

    region
        .select(selector)
        .filter_map(|anchor| anchor.value().attr("href"))
        .map(|href| resolve(href, canonical_host))
        .collect()
}

/// Resolve one raw href against the canonical site host.
///
/// Absolute http(s) links pass through unchanged. Links carrying any other
/// scheme (`mailto:`, `javascript:`, ...) are discarded. Scheme-less links
/// whose own authority differs from the canonical host — including the
/// empty authority of path-only links — are rewritten to an absolute URL
/// on the canonical host, keeping only the path.
pub fn resolve(href: &str, canonical_host: &str) -> Option<String> {
    match Url::parse(href) {
        Ok(url) => match url.scheme() {
            "http" | "https" => Some(href.to_string()),
            _ => None,
        },
        Err(url::ParseError::RelativeUrlWithoutBase) => {
            if raw_authority(href) == Some(canonical_host) {
                return Some(href.to_string());
            }
            let base = Url::parse(&format!("https://{canonical_host}/")).ok()?;
            let joined = base.join(href).ok()?;
            Some(format!("https://{}{}", canonical_host, joined.path()))
        }
        Err(_) => None,
    }
}

/// Authority component of a protocol-relative link, if it carries one.
fn raw_authority(href: &str) -> Option<&str> {
    let rest = href.strip_prefix("//")?;
    rest.split(['/', '?', '#']).next()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::parse_selector;
    use scraper::Html;

    const HOST: &str = "www.isel.pt";

    #[test]
    fn absolute_http_links_pass_through() {
        let href = "https://www.isel.pt/sites/default/files/doc.pdf";
        assert_eq!(resolve(href, HOST), Some(href.to_string()));
        let foreign = "http://other.example/file.pdf";
        assert_eq!(resolve(foreign, HOST), Some(foreign.to_string()));
    }

    #[test]
    fn non_http_schemes_are_discarded() {
        assert_eq!(resolve("mailto:someone@isel.pt", HOST), None);
        assert_eq!(resolve("javascript:void(0)", HOST), None);
        assert_eq!(resolve("ftp://www.isel.pt/file.pdf", HOST), None);
    }

    #[test]
    fn path_only_links_are_rooted_at_canonical_host() {
        assert_eq!(
            resolve("/sites/default/files/doc.pdf", HOST),
            Some("https://www.isel.pt/sites/default/files/doc.pdf".to_string())
        );
        assert_eq!(
            resolve("files/doc.pdf", HOST),
            Some("https://www.isel.pt/files/doc.pdf".to_string())
        );
    }

    #[test]
    fn foreign_protocol_relative_links_are_rewritten() {
        assert_eq!(
            resolve("//cdn.example.org/files/doc.pdf", HOST),
            Some("https://www.isel.pt/files/doc.pdf".to_string())
        );
    }

    #[test]
    fn canonical_protocol_relative_links_are_unchanged() {
        assert_eq!(
            resolve("//www.isel.pt/files/doc.pdf", HOST),
            Some("//www.isel.pt/files/doc.pdf".to_string())
        );
    }

    #[test]
    fn extraction_preserves_order_and_placeholders() {
        let html = r#"
            <div id="content">
              <a href="/a.pdf" rel="noopener noreferrer">A</a>
              <a href="mailto:sec@isel.pt" rel="noopener">write us</a>
              <a href="/b.pdf" rel="noopener">B</a>
              <a href="/nav">plain navigation</a>
            </div>
        "#;
        let document = Html::parse_document(html);
        let region_sel = parse_selector("div#content").unwrap();
        let link_sel = parse_selector("a[href][rel*='noopener']").unwrap();
        let region = document.select(&region_sel).next();

        let links = extract_candidate_links(region, &link_sel, HOST);
        assert_eq!(
            links,
            vec![
                Some("https://www.isel.pt/a.pdf".to_string()),
                None,
                Some("https://www.isel.pt/b.pdf".to_string()),
            ]
        );
    }

    #[test]
    fn missing_region_yields_no_links() {
        let link_sel = parse_selector("a[href]").unwrap();
        assert!(extract_candidate_links(None, &link_sel, HOST).is_empty());
    }
}
