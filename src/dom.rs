//! Document tree abstraction
//!
//! The extraction engine only talks to [`DocumentNode`]. The scraper-backed
//! adapter lives here so the rest of the crate never touches a concrete
//! HTML representation.

use scraper::{ElementRef, Html, Selector};

use crate::error::{ExtractError, Result};

/// Read-only view of one element in an already-loaded document tree.
pub trait DocumentNode: Clone {
    /// Compiled form of a selector string.
    type Query;

    /// Compile a selector once so it can be reused across containers.
    fn compile(selector: &str) -> Result<Self::Query>;

    /// All matching descendants in document order.
    fn find_all(&self, query: &Self::Query) -> Vec<Self>;

    /// First matching descendant in document order.
    fn find_first(&self, query: &Self::Query) -> Option<Self> {
        self.find_all(query).into_iter().next()
    }

    /// Rendered text, roughly what a browser reports as `innerText`:
    /// whitespace collapsed inside lines, `<br>` and block boundaries as
    /// newlines, lines trimmed.
    fn inner_text(&self) -> String;

    fn attribute(&self, name: &str) -> Option<String>;

    /// Lowercase tag name.
    fn tag_name(&self) -> &str;

    fn next_element_sibling(&self) -> Option<Self>;

    /// True when `ancestor` strictly encloses this element.
    fn is_descendant_of(&self, ancestor: &Self) -> bool;
}

impl<'a> DocumentNode for ElementRef<'a> {
    type Query = Selector;

    fn compile(selector: &str) -> Result<Selector> {
        Selector::parse(selector).map_err(|e| ExtractError::InvalidSelector {
            selector: selector.to_string(),
            reason: format!("{:?}", e),
        })
    }

    fn find_all(&self, query: &Selector) -> Vec<Self> {
        self.select(query).collect()
    }

    fn find_first(&self, query: &Selector) -> Option<Self> {
        self.select(query).next()
    }

    fn inner_text(&self) -> String {
        let mut raw = String::new();
        render_into(*self, &mut raw);
        raw.lines()
            .map(collapse_whitespace)
            .filter(|line| !line.is_empty())
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn attribute(&self, name: &str) -> Option<String> {
        self.value().attr(name).map(String::from)
    }

    fn tag_name(&self) -> &str {
        self.value().name()
    }

    fn next_element_sibling(&self) -> Option<Self> {
        self.next_siblings().find_map(ElementRef::wrap)
    }

    fn is_descendant_of(&self, ancestor: &Self) -> bool {
        self.ancestors().any(|node| node.id() == ancestor.id())
    }
}

/// Root element of a parsed HTML document, the usual entry point for
/// [`crate::ProductExtractor::extract`].
pub fn document_root(document: &Html) -> ElementRef<'_> {
    document.root_element()
}

/// Collapse every run of whitespace to a single space and trim the ends.
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn render_into(element: ElementRef<'_>, out: &mut String) {
    for child in element.children() {
        if let Some(text) = child.value().as_text() {
            // Source newlines are layout, not content
            let mut last_space = out.ends_with(' ');
            for ch in text.chars() {
                if ch.is_whitespace() {
                    if !last_space {
                        out.push(' ');
                        last_space = true;
                    }
                } else {
                    out.push(ch);
                    last_space = false;
                }
            }
        } else if let Some(child_el) = ElementRef::wrap(child) {
            match child_el.value().name() {
                "br" => out.push('\n'),
                "script" | "style" | "template" => {}
                name if is_block(name) => {
                    out.push('\n');
                    render_into(child_el, out);
                    out.push('\n');
                }
                _ => render_into(child_el, out),
            }
        }
    }
}

fn is_block(tag: &str) -> bool {
    matches!(
        tag,
        "p" | "div"
            | "li"
            | "ul"
            | "ol"
            | "tr"
            | "table"
            | "section"
            | "article"
            | "header"
            | "footer"
            | "h1"
            | "h2"
            | "h3"
            | "h4"
            | "h5"
            | "h6"
            | "td"
            | "th"
            | "dl"
            | "dt"
            | "dd"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_renders_line_breaks() {
        let html = Html::parse_fragment("<p>Nước bão hòa CO2,<br>đường   mía</p>");
        let sel = ElementRef::compile("p").unwrap();
        let p = document_root(&html).find_first(&sel).unwrap();

        assert_eq!(p.inner_text(), "Nước bão hòa CO2,\nđường mía");
    }

    #[test]
    fn test_text_ignores_source_newlines() {
        let html = Html::parse_fragment(
            r#"<p>
                Water, Sugar,
                Caffeine
            </p>"#,
        );
        let sel = ElementRef::compile("p").unwrap();
        let p = document_root(&html).find_first(&sel).unwrap();

        assert_eq!(p.inner_text(), "Water, Sugar, Caffeine");
    }

    #[test]
    fn test_next_element_sibling_skips_text() {
        let html = Html::parse_fragment("<div><h3>Ingredients</h3>\n  <p>Water</p></div>");
        let sel = ElementRef::compile("h3").unwrap();
        let h3 = document_root(&html).find_first(&sel).unwrap();
        let next = h3.next_element_sibling().unwrap();

        assert_eq!(next.tag_name(), "p");
        assert_eq!(next.inner_text(), "Water");
    }

    #[test]
    fn test_table_cells_render_on_separate_lines() {
        let html = Html::parse_fragment(
            "<table><tr><td>Servings Per Container</td><td>6</td></tr></table>",
        );
        let sel = ElementRef::compile("tr").unwrap();
        let tr = document_root(&html).find_first(&sel).unwrap();

        assert_eq!(tr.inner_text(), "Servings Per Container\n6");
    }

    #[test]
    fn test_is_descendant_of() {
        let html = Html::parse_fragment("<p>Crisp <label>lemon-lime</label></p><p>x</p>");
        let root = document_root(&html);
        let p = root.find_all(&ElementRef::compile("p").unwrap());
        let label = root.find_first(&ElementRef::compile("label").unwrap()).unwrap();

        assert!(label.is_descendant_of(&p[0]));
        assert!(!label.is_descendant_of(&p[1]));
        assert!(!p[0].is_descendant_of(&p[0]));
    }

    #[test]
    fn test_invalid_selector_is_error() {
        let err = ElementRef::compile("div[").unwrap_err();
        assert!(matches!(err, ExtractError::InvalidSelector { .. }));
    }

    #[test]
    fn test_collapse_whitespace() {
        assert_eq!(collapse_whitespace("  a \n\t b  "), "a b");
        assert_eq!(collapse_whitespace("   "), "");
    }
}
