//! Page model
//!
//! An owned, in-memory stand-in for the browser document: a fixed set of
//! containers (shows list, episodes area and list), the search form's term
//! field, a status line, and a tree of rendered elements. Elements carry a
//! unique identity and a link to their parent so that "closest ancestor"
//! queries work no matter how deeply a clicked element is nested.
//!
//! The page can be serialized to a standalone HTML document or flattened to
//! plain text for a terminal.

use askama::Template;
use std::collections::HashMap;
use std::fmt;
use ulid::Ulid;

/// Unique identity of a rendered element
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ElementId(Ulid);

impl ElementId {
    fn new() -> Self {
        Self(Ulid::new())
    }
}

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The fixed containers every page provides
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Container {
    /// `#showsList`, holds one block per show
    ShowsList,
    /// `#episodesList`, holds one item per episode (inside `#episodesArea`)
    EpisodesList,
}

/// Where an element is mounted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Parent {
    Container(Container),
    Element(ElementId),
}

/// Content of an element
#[derive(Debug, Clone, PartialEq)]
pub enum Content {
    /// No direct content, only children
    Empty,
    /// Plain text
    Text(String),
    /// Trusted markup, converted to text for terminal output
    Markup(String),
}

/// Description of an element subtree before it is mounted
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub tag: &'static str,
    pub classes: Vec<String>,
    pub attributes: Vec<(String, String)>,
    pub content: Content,
    pub children: Vec<Node>,
    /// Rendered HTML for the whole subtree, set on container roots
    pub fragment: Option<String>,
}

impl Node {
    /// Starts a node for the given tag with no classes, content or children
    pub fn new(tag: &'static str) -> Self {
        Self {
            tag,
            classes: Vec::new(),
            attributes: Vec::new(),
            content: Content::Empty,
            children: Vec::new(),
            fragment: None,
        }
    }

    /// Adds whitespace separated classes
    pub fn class(mut self, classes: &str) -> Self {
        self.classes
            .extend(classes.split_whitespace().map(str::to_string));
        self
    }

    /// Adds an attribute
    pub fn attr(mut self, name: &str, value: impl Into<String>) -> Self {
        self.attributes.push((name.to_string(), value.into()));
        self
    }

    /// Sets plain text content
    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.content = Content::Text(text.into());
        self
    }

    /// Sets trusted markup content
    pub fn markup(mut self, markup: impl Into<String>) -> Self {
        self.content = Content::Markup(markup.into());
        self
    }

    /// Appends a child node
    pub fn child(mut self, child: Node) -> Self {
        self.children.push(child);
        self
    }

    /// Attaches the HTML this subtree serializes to
    pub fn rendered(mut self, fragment: impl Into<String>) -> Self {
        self.fragment = Some(fragment.into());
        self
    }
}

/// A mounted element
#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    pub id: ElementId,
    pub parent: Parent,
    pub tag: &'static str,
    pub classes: Vec<String>,
    pub attributes: Vec<(String, String)>,
    pub content: Content,
    pub children: Vec<ElementId>,
    pub fragment: Option<String>,
}

impl Element {
    /// Whether the element carries the given class
    pub fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c == class)
    }

    /// Value of an attribute, if set
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }
}

/// Document skeleton with the already rendered container contents
#[derive(Template)]
#[template(path = "page.html")]
struct PageTemplate<'a> {
    search_term: &'a str,
    status: Option<&'a str>,
    shows: Vec<&'a str>,
    episodes_visible: bool,
    episodes: Vec<&'a str>,
}

/// The document the renderer writes into and the controller reads from
#[derive(Debug, Default)]
pub struct Page {
    elements: HashMap<ElementId, Element>,
    shows_list: Vec<ElementId>,
    episodes_list: Vec<ElementId>,
    episodes_area_visible: bool,
    search_term: String,
    status: Option<String>,
}

impl Page {
    /// Creates an empty page with the episodes area hidden
    pub fn new() -> Self {
        Self::default()
    }

    /// Current value of the search form's term input
    pub fn search_term(&self) -> &str {
        &self.search_term
    }

    /// Replaces the value of the search form's term input
    pub fn set_search_term(&mut self, term: impl Into<String>) {
        self.search_term = term.into();
    }

    /// Message shown to the user after a failed action
    pub fn status(&self) -> Option<&str> {
        self.status.as_deref()
    }

    /// Sets or clears the status line
    pub fn set_status(&mut self, status: Option<String>) {
        self.status = status;
    }

    /// Whether `#episodesArea` is currently shown
    pub fn is_episodes_area_visible(&self) -> bool {
        self.episodes_area_visible
    }

    /// Reveals `#episodesArea`
    pub fn show_episodes_area(&mut self) {
        self.episodes_area_visible = true;
    }

    /// Hides `#episodesArea`
    pub fn hide_episodes_area(&mut self) {
        self.episodes_area_visible = false;
    }

    /// Top-level elements of a container, in document order
    pub fn children(&self, container: Container) -> &[ElementId] {
        match container {
            Container::ShowsList => &self.shows_list,
            Container::EpisodesList => &self.episodes_list,
        }
    }

    /// Looks up a mounted element
    pub fn element(&self, id: ElementId) -> Option<&Element> {
        self.elements.get(&id)
    }

    /// Number of mounted elements across the whole page
    pub fn element_count(&self) -> usize {
        self.elements.len()
    }

    /// Removes every element mounted under a container
    pub fn clear(&mut self, container: Container) {
        let roots = match container {
            Container::ShowsList => std::mem::take(&mut self.shows_list),
            Container::EpisodesList => std::mem::take(&mut self.episodes_list),
        };

        let mut pending = roots;
        while let Some(id) = pending.pop() {
            if let Some(element) = self.elements.remove(&id) {
                pending.extend(element.children);
            }
        }
    }

    /// Mounts a node subtree as the last child of a container
    ///
    /// Returns the identity of the subtree's root element.
    pub fn append(&mut self, container: Container, node: Node) -> ElementId {
        let id = self.mount(Parent::Container(container), node);
        match container {
            Container::ShowsList => self.shows_list.push(id),
            Container::EpisodesList => self.episodes_list.push(id),
        }
        id
    }

    fn mount(&mut self, parent: Parent, node: Node) -> ElementId {
        let id = ElementId::new();
        let children = node
            .children
            .into_iter()
            .map(|child| self.mount(Parent::Element(id), child))
            .collect();

        self.elements.insert(
            id,
            Element {
                id,
                parent,
                tag: node.tag,
                classes: node.classes,
                attributes: node.attributes,
                content: node.content,
                children,
                fragment: node.fragment,
            },
        );
        id
    }

    /// Finds the element itself or its nearest ancestor carrying a class
    pub fn closest(&self, id: ElementId, class: &str) -> Option<ElementId> {
        let mut current = self.elements.get(&id)?;
        loop {
            if current.has_class(class) {
                return Some(current.id);
            }
            match current.parent {
                Parent::Element(parent) => current = self.elements.get(&parent)?,
                Parent::Container(_) => return None,
            }
        }
    }

    /// Finds the first descendant (depth first, document order) carrying a class
    pub fn find_descendant(&self, id: ElementId, class: &str) -> Option<ElementId> {
        let element = self.elements.get(&id)?;
        element.children.iter().find_map(|child| {
            let child_element = self.elements.get(child)?;
            if child_element.has_class(class) {
                Some(*child)
            } else {
                self.find_descendant(*child, class)
            }
        })
    }

    /// Concatenated plain text of an element and its descendants
    pub fn text_content(&self, id: ElementId) -> String {
        let mut text = String::new();
        self.collect_text(id, &mut text);
        text.trim().to_string()
    }

    fn collect_text(&self, id: ElementId, out: &mut String) {
        let Some(element) = self.elements.get(&id) else {
            return;
        };

        match &element.content {
            Content::Empty => {}
            Content::Text(text) => out.push_str(text),
            Content::Markup(markup) => out.push_str(nanohtml2text::html2text(markup).trim()),
        }

        for child in &element.children {
            self.collect_text(*child, out);
        }
    }

    /// Serializes the page into a standalone HTML document
    ///
    /// Each top-level element contributes the fragment it was rendered with;
    /// elements mounted without one are skipped.
    pub fn to_html(&self) -> Result<String, askama::Error> {
        PageTemplate {
            search_term: &self.search_term,
            status: self.status.as_deref(),
            shows: self.fragments(&self.shows_list),
            episodes_visible: self.episodes_area_visible,
            episodes: self.fragments(&self.episodes_list),
        }
        .render()
    }

    fn fragments(&self, roots: &[ElementId]) -> Vec<&str> {
        roots
            .iter()
            .filter_map(|id| self.elements.get(id)?.fragment.as_deref())
            .collect()
    }

    /// Flattens the page to plain text for terminal output
    ///
    /// Show blocks become numbered entries; the episode list is only
    /// included while the episodes area is visible.
    pub fn to_text(&self) -> String {
        let mut text = String::new();

        if let Some(status) = &self.status {
            text.push_str(&format!("! {}\n\n", status));
        }

        for (index, id) in self.shows_list.iter().enumerate() {
            let Some(block) = self.elements.get(id) else {
                continue;
            };
            let name = self
                .find_descendant(*id, "Show-name")
                .map(|name| self.text_content(name))
                .unwrap_or_default();
            let summary = self
                .find_descendant(*id, "Show-summary")
                .map(|summary| self.text_content(summary))
                .unwrap_or_default();
            let show_id = block.attribute("data-show-id").unwrap_or("?");

            text.push_str(&format!("[{}] {} (#{})\n", index + 1, name, show_id));
            if !summary.is_empty() {
                for line in summary.lines() {
                    text.push_str(&format!("    {}\n", line));
                }
            }
        }

        if self.episodes_area_visible {
            text.push_str("\nEpisodes:\n");
            for id in &self.episodes_list {
                text.push_str(&format!("  - {}\n", self.text_content(*id)));
            }
        }

        text
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn nested_block() -> Node {
        Node::new("div").class("Outer").child(
            Node::new("div")
                .class("Middle")
                .child(Node::new("span").class("Inner").text("deep")),
        )
    }

    #[test]
    fn test_new_page_is_empty_and_hidden() {
        let page = Page::new();
        assert!(page.children(Container::ShowsList).is_empty());
        assert!(page.children(Container::EpisodesList).is_empty());
        assert!(!page.is_episodes_area_visible());
        assert_eq!(page.element_count(), 0);
    }

    #[test]
    fn test_closest_walks_up_through_nesting() {
        let mut page = Page::new();
        let outer = page.append(Container::ShowsList, nested_block());
        let inner = page.find_descendant(outer, "Inner").unwrap();

        assert_eq!(page.closest(inner, "Outer"), Some(outer));
        assert_eq!(page.closest(inner, "Inner"), Some(inner));
        assert_eq!(page.closest(outer, "Inner"), None);
    }

    #[test]
    fn test_clear_removes_descendants() {
        let mut page = Page::new();
        page.append(Container::ShowsList, nested_block());
        page.append(Container::EpisodesList, Node::new("li").text("kept"));
        assert_eq!(page.element_count(), 4);

        page.clear(Container::ShowsList);

        assert!(page.children(Container::ShowsList).is_empty());
        assert_eq!(page.element_count(), 1);
        assert_eq!(page.children(Container::EpisodesList).len(), 1);
    }

    #[test]
    fn test_text_content_converts_markup() {
        let mut page = Page::new();
        let id = page.append(
            Container::ShowsList,
            Node::new("div").markup("<p>Hello <b>world</b></p>"),
        );
        assert_eq!(page.text_content(id), "Hello world");
    }

    #[test]
    fn test_to_html_escapes_search_term_and_status() {
        let mut page = Page::new();
        page.set_search_term("<b>\"x\"</b>");
        page.set_status(Some("HTTP 500 <oops>".to_string()));

        let html = page.to_html().unwrap();
        assert!(html.contains("&lt;b&gt;"));
        assert!(!html.contains("value=\"<b>"));
        assert!(html.contains("HTTP 500 &lt;oops&gt;"));
        assert!(html.contains("id=\"episodesArea\" style=\"display: none\""));
    }

    #[test]
    fn test_to_html_embeds_rendered_fragments_in_order() {
        let mut page = Page::new();
        page.append(
            Container::ShowsList,
            Node::new("div").rendered("<div class=\"first\"><p>raw</p></div>"),
        );
        page.append(Container::ShowsList, Node::new("div").rendered("<div class=\"second\"></div>"));
        page.append(Container::ShowsList, nested_block());

        let html = page.to_html().unwrap();
        let first = html.find("class=\"first\"").unwrap();
        let second = html.find("class=\"second\"").unwrap();
        assert!(first < second);
        assert!(html.contains("<p>raw</p>"));
        assert!(!html.contains("Outer"));
    }

    #[test]
    fn test_to_html_shows_visible_episodes_area() {
        let mut page = Page::new();
        page.show_episodes_area();
        let html = page.to_html().unwrap();
        assert!(html.contains("<section id=\"episodesArea\">"));
        assert!(!html.contains("id=\"status\""));
    }
}
