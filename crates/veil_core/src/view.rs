//! View description
//!
//! Components describe their output as a [`ViewNode`] tree. Materializing that
//! tree (DOM, native widgets, a test recorder) is the host's job; the only thing
//! a host must do on behalf of Veil is bind every [`ElementRef`] it finds to the
//! id of the node it created, see [`ViewNode::bind_refs`].

use indexmap::IndexMap;
use veil_platform::ElementId;

use crate::element_ref::ElementRef;
use crate::style::Style;

#[derive(Clone, Debug, Default)]
pub struct ViewNode {
    pub tag: String,
    pub test_id: Option<String>,
    pub attrs: IndexMap<String, String>,
    pub style: Style,
    pub element_ref: Option<ElementRef>,
    pub text: Option<String>,
    pub children: Vec<ViewNode>,
}

impl ViewNode {
    pub fn element(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            ..Default::default()
        }
    }

    /// A bare text node
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            text: Some(content.into()),
            ..Default::default()
        }
    }

    pub fn test_id(mut self, id: impl Into<String>) -> Self {
        self.test_id = Some(id.into());
        self
    }

    pub fn attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attrs.insert(name.into(), value.into());
        self
    }

    /// Set an attribute only when a value is present
    pub fn attr_opt(self, name: impl Into<String>, value: Option<&str>) -> Self {
        match value {
            Some(value) => self.attr(name, value),
            None => self,
        }
    }

    /// Append attributes, later entries overriding earlier ones
    pub fn attrs<'a>(mut self, attrs: impl IntoIterator<Item = (&'a String, &'a String)>) -> Self {
        for (name, value) in attrs {
            self.attrs.insert(name.clone(), value.clone());
        }
        self
    }

    pub fn style(mut self, style: Style) -> Self {
        self.style = style;
        self
    }

    pub fn with_ref(mut self, element_ref: &ElementRef) -> Self {
        self.element_ref = Some(element_ref.clone());
        self
    }

    pub fn child(mut self, child: ViewNode) -> Self {
        self.children.push(child);
        self
    }

    pub fn child_opt(self, child: Option<ViewNode>) -> Self {
        match child {
            Some(child) => self.child(child),
            None => self,
        }
    }

    pub fn is_text(&self) -> bool {
        self.text.is_some() && self.tag.is_empty()
    }

    pub fn get_attr(&self, name: &str) -> Option<&str> {
        self.attrs.get(name).map(String::as_str)
    }

    pub fn has_attr(&self, name: &str) -> bool {
        self.attrs.contains_key(name)
    }

    /// Depth-first, pre-order traversal
    pub fn walk<'a>(&'a self, visit: &mut impl FnMut(&'a ViewNode)) {
        visit(self);
        for child in &self.children {
            child.walk(visit);
        }
    }

    /// Find the first node with the given test id
    pub fn find(&self, test_id: &str) -> Option<&ViewNode> {
        if self.test_id.as_deref() == Some(test_id) {
            return Some(self);
        }
        self.children.iter().find_map(|child| child.find(test_id))
    }

    pub fn contains(&self, test_id: &str) -> bool {
        self.find(test_id).is_some()
    }

    /// Concatenated text content of the subtree
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        self.walk(&mut |node| {
            if let Some(text) = &node.text {
                out.push_str(text);
            }
        });
        out
    }

    /// Bind every unbound element handle in the tree
    ///
    /// Handles that are already bound keep their element, the same way a
    /// renderer reuses the node it created on a previous pass. Returns the
    /// number of handles bound by this call.
    pub fn bind_refs(&self, alloc: &mut impl FnMut(&ViewNode) -> ElementId) -> usize {
        let mut bound = 0;
        if let Some(handle) = &self.element_ref {
            if !handle.is_attached() {
                handle.attach(alloc(self));
                bound += 1;
            }
        }
        for child in &self.children {
            bound += child.bind_refs(alloc);
        }
        bound
    }
}

pub fn div() -> ViewNode {
    ViewNode::element("div")
}

pub fn img() -> ViewNode {
    ViewNode::element("img")
}

pub fn text(content: impl Into<String>) -> ViewNode {
    ViewNode::text(content)
}
