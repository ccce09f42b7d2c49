/*!
 * Core content types for section translation.
 *
 * A parsed section is a tree of `ContentNode`s. The tree is closed over four
 * node kinds so every walk over it is checked for exhaustiveness.
 */

/// One node of a parsed content document
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentNode {
    /// Any element other than an image or a line break
    Container {
        /// Lowercased local element name
        tag: String,
        /// Child nodes in document order
        children: Vec<ContentNode>,
    },

    /// Literal character data, whitespace included
    Text(String),

    /// Image reference with its unresolved source path (possibly empty)
    Image {
        src: String,
    },

    /// Explicit line break
    Break,
}

impl ContentNode {
    /// Create a container node
    pub fn container(tag: impl Into<String>, children: Vec<ContentNode>) -> Self {
        Self::Container {
            tag: tag.into(),
            children,
        }
    }

    /// Create a text node
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(value.into())
    }

    /// Create an image node
    pub fn image(src: impl Into<String>) -> Self {
        Self::Image { src: src.into() }
    }

    /// Element name of a container
    pub fn tag(&self) -> Option<&str> {
        match self {
            Self::Container { tag, .. } => Some(tag),
            _ => None,
        }
    }

    /// Children of a container; other nodes have none
    pub fn children(&self) -> &[ContentNode] {
        match self {
            Self::Container { children, .. } => children,
            _ => &[],
        }
    }

    /// All descendant containers whose tag is in `tags`, in document order
    ///
    /// The node itself is not included. Matches nested inside a match are
    /// returned as well.
    pub fn find_all<'a>(&'a self, tags: &[&str]) -> Vec<&'a ContentNode> {
        let mut found = Vec::new();
        for child in self.children() {
            child.collect_tagged(tags, &mut found);
        }
        found
    }

    fn collect_tagged<'a>(&'a self, tags: &[&str], found: &mut Vec<&'a ContentNode>) {
        if let Self::Container { tag, children } = self {
            if tags.contains(&tag.as_str()) {
                found.push(self);
            }
            for child in children {
                child.collect_tagged(tags, found);
            }
        }
    }

    /// Every descendant text value in document order
    pub fn strings(&self) -> Vec<&str> {
        let mut strings = Vec::new();
        self.collect_strings(&mut strings);
        strings
    }

    fn collect_strings<'a>(&'a self, strings: &mut Vec<&'a str>) {
        match self {
            Self::Text(value) => strings.push(value),
            Self::Container { children, .. } => {
                for child in children {
                    child.collect_strings(strings);
                }
            }
            Self::Image { .. } | Self::Break => {}
        }
    }
}

/// An atomic inline unit of a block
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    /// Literal text, line breaks included as `\n`
    Text(String),

    /// Image reference, not yet resolved against the image map
    Image {
        src: String,
    },
}

impl Segment {
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(value.into())
    }

    pub fn image(src: impl Into<String>) -> Self {
        Self::Image { src: src.into() }
    }
}
