//! Owned element tree produced by the document builder.
//!
//! Builders return finished subtrees and parents take ownership of them, so
//! element order is exactly the order of the `child` calls.

/// A node below an element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Element(Element),
    Text(String),
}

/// An XML element with ordered attributes and children.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    pub name: &'static str,
    pub attrs: Vec<(&'static str, String)>,
    pub children: Vec<Node>,
}

impl Element {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            attrs: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Leaf element holding `text`.
    pub fn text(name: &'static str, text: impl Into<String>) -> Self {
        Self {
            name,
            attrs: Vec::new(),
            children: vec![Node::Text(text.into())],
        }
    }

    pub fn attr(mut self, name: &'static str, value: impl Into<String>) -> Self {
        self.attrs.push((name, value.into()));
        self
    }

    pub fn child(mut self, child: Element) -> Self {
        self.children.push(Node::Element(child));
        self
    }

    /// Append `child` when present.
    pub fn child_opt(mut self, child: Option<Element>) -> Self {
        if let Some(child) = child {
            self.children.push(Node::Element(child));
        }
        self
    }

    pub fn children(mut self, children: impl IntoIterator<Item = Element>) -> Self {
        self.children
            .extend(children.into_iter().map(Node::Element));
        self
    }

    /// `<name><inner/></name>`: the common one-child wrapper.
    pub fn wrap(name: &'static str, inner: Element) -> Self {
        Self::new(name).child(inner)
    }

    pub fn push(&mut self, child: Element) {
        self.children.push(Node::Element(child));
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(k, _)| *k == name)
            .map(|(_, v)| v.as_str())
    }

    /// Concatenated text children, or `None` when the element has no text.
    pub fn text_content(&self) -> Option<&str> {
        self.children.iter().find_map(|n| match n {
            Node::Text(t) => Some(t.as_str()),
            Node::Element(_) => None,
        })
    }

    /// Child elements in document order.
    pub fn elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(|n| match n {
            Node::Element(e) => Some(e),
            Node::Text(_) => None,
        })
    }

    /// First descendant reached by a `/`-separated path of element names.
    pub fn find(&self, path: &str) -> Option<&Element> {
        let mut current = self;
        for step in path.split('/').filter(|s| !s.is_empty()) {
            current = current.elements().find(|e| e.name == step)?;
        }
        Some(current)
    }

    /// All descendants matching a `/`-separated path.
    pub fn find_all<'a>(&'a self, path: &str) -> Vec<&'a Element> {
        let mut current = vec![self];
        for step in path.split('/').filter(|s| !s.is_empty()) {
            current = current
                .into_iter()
                .flat_map(|e| e.elements().filter(move |c| c.name == step))
                .collect();
        }
        current
    }

    /// Text of the element at `path`.
    pub fn find_text(&self, path: &str) -> Option<&str> {
        self.find(path).and_then(Element::text_content)
    }

    /// Names of the direct child elements, in order.
    pub fn child_names(&self) -> Vec<&'static str> {
        self.elements().map(|e| e.name).collect()
    }
}
