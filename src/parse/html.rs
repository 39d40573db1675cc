//! Heuristic text extraction from HTML/XML pages.

use scraper::{ElementRef, Html, Node, Selector};

use crate::utils::normalize_whitespace;

/// Elements whose text is never part of the readable body
const SKIPPED_ELEMENTS: &[&str] = &["script", "style", "noscript", "template"];

/// Which heuristic produced the text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HtmlBranch {
    Article,
    Main,
    Paragraphs,
}

/// Extract readable text from a markup document.
///
/// The first `<article>` wins; without one, the element with `id="main"`;
/// without either, every `<p>` joined by a space. Only one branch is used
/// even if it yields nothing.
pub fn extract_html_text(markup: &str) -> (String, HtmlBranch) {
    let document = Html::parse_document(markup);

    if let Some(article) = first_element(&document, "article") {
        return (element_text(article), HtmlBranch::Article);
    }

    if let Some(main) = first_element(&document, "#main") {
        return (element_text(main), HtmlBranch::Main);
    }

    let paragraphs = match Selector::parse("p") {
        Ok(selector) => document
            .select(&selector)
            .map(element_text)
            .filter(|text| !text.is_empty())
            .collect::<Vec<_>>()
            .join(" "),
        Err(_) => String::new(),
    };

    (paragraphs, HtmlBranch::Paragraphs)
}

fn first_element<'a>(document: &'a Html, selector: &str) -> Option<ElementRef<'a>> {
    let selector = Selector::parse(selector).ok()?;
    document.select(&selector).next()
}

/// Normalized text content of an element, skipping scripts and styles
fn element_text(element: ElementRef<'_>) -> String {
    let mut out = String::new();
    collect_text(element, &mut out);
    normalize_whitespace(&out)
}

fn collect_text(element: ElementRef<'_>, out: &mut String) {
    for child in element.children() {
        match child.value() {
            Node::Text(text) => out.push_str(text),
            Node::Element(el) if SKIPPED_ELEMENTS.contains(&el.name()) => {}
            Node::Element(_) => {
                if let Some(child) = ElementRef::wrap(child) {
                    collect_text(child, out);
                }
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_article_wins_over_main_and_paragraphs() {
        let html = r#"
            <html><body>
              <div id="main"><p>Main content</p></div>
              <p>Loose paragraph</p>
              <article>
                <h1>Title</h1>
                <p>Article   body
                   text.</p>
              </article>
            </body></html>"#;

        let (text, branch) = extract_html_text(html);
        assert_eq!(branch, HtmlBranch::Article);
        assert_eq!(text, "Title Article body text.");
    }

    #[test]
    fn test_main_used_without_article() {
        let html = r#"<body><nav><p>Menu</p></nav><section id="main"> Only <b>this</b> </section></body>"#;
        let (text, branch) = extract_html_text(html);
        assert_eq!(branch, HtmlBranch::Main);
        assert_eq!(text, "Only this");
    }

    #[test]
    fn test_paragraphs_concatenated() {
        let html = "<body><p>First  para.</p><div><p>Second\npara.</p></div><p>  </p><p>Third.</p></body>";
        let (text, branch) = extract_html_text(html);
        assert_eq!(branch, HtmlBranch::Paragraphs);
        assert_eq!(text, "First para. Second para. Third.");
    }

    #[test]
    fn test_empty_article_does_not_fall_through() {
        let html = "<body><article>   </article><p>Paragraph</p></body>";
        let (text, branch) = extract_html_text(html);
        assert_eq!(branch, HtmlBranch::Article);
        assert!(text.is_empty());
    }

    #[test]
    fn test_scripts_and_styles_skipped() {
        let html = "<article><style>p{color:red}</style><p>Visible</p><script>var x = 1;</script></article>";
        let (text, _) = extract_html_text(html);
        assert_eq!(text, "Visible");
    }

    #[test]
    fn test_no_text_at_all() {
        let (text, branch) = extract_html_text("<html><body><div>no paragraphs</div></body></html>");
        assert_eq!(branch, HtmlBranch::Paragraphs);
        assert!(text.is_empty());
    }

    #[test]
    fn test_xml_input_is_tolerated() {
        let xml = r#"<?xml version="1.0"?><doc><p>Parsed as markup</p></doc>"#;
        let (text, _) = extract_html_text(xml);
        assert_eq!(text, "Parsed as markup");
    }
}
