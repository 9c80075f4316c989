use scraper::{ElementRef, Html, Selector};

/// Thin query facade over the HTML parser. Extraction code only sees
/// `query_first`/`query_all` plus [`Element`], so the backing parser can be
/// swapped without touching field logic.
pub struct Document {
    html: Html,
}

impl Document {
    pub fn parse(raw: &str) -> Self {
        Document {
            html: Html::parse_document(raw),
        }
    }

    /// First element matching `selector`, if any. An unparsable selector
    /// behaves like a non-matching one.
    pub fn query_first(&self, selector: &str) -> Option<Element<'_>> {
        let selector = Selector::parse(selector).ok()?;
        self.html
            .select(&selector)
            .next()
            .map(|inner| Element { inner })
    }

    /// All elements matching `selector`, in document order.
    pub fn query_all(&self, selector: &str) -> Vec<Element<'_>> {
        let Ok(selector) = Selector::parse(selector) else {
            return Vec::new();
        };
        self.html
            .select(&selector)
            .map(|inner| Element { inner })
            .collect()
    }
}

/// A matched element exposing only what extraction needs.
#[derive(Clone, Copy)]
pub struct Element<'a> {
    inner: ElementRef<'a>,
}

impl<'a> Element<'a> {
    pub fn attr(&self, name: &str) -> Option<&'a str> {
        self.inner.value().attr(name)
    }

    /// Concatenated text content of the element's descendants.
    pub fn text(&self) -> String {
        self.inner.text().collect::<String>()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_first_returns_first_match() {
        let doc = Document::parse(r#"<p id="a">one</p><p id="b">two</p>"#);
        let first = doc.query_first("p").unwrap();
        assert_eq!(first.attr("id"), Some("a"));
        assert_eq!(first.text(), "one");
    }

    #[test]
    fn query_all_preserves_document_order() {
        let doc = Document::parse("<i>x</i><i>y</i><i>z</i>");
        let texts: Vec<String> = doc.query_all("i").iter().map(|e| e.text()).collect();
        assert_eq!(texts, ["x", "y", "z"]);
    }

    #[test]
    fn missing_selector_yields_nothing() {
        let doc = Document::parse("<p>hi</p>");
        assert!(doc.query_first("article").is_none());
        assert!(doc.query_all("article").is_empty());
    }

    #[test]
    fn bad_selector_behaves_like_no_match() {
        let doc = Document::parse("<p>hi</p>");
        assert!(doc.query_first("p[[").is_none());
        assert!(doc.query_all("p[[").is_empty());
    }
}
