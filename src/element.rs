//! Element and document contract required by the template engine.
//!
//! The engine never touches a concrete DOM; it walks and mutates the tree through
//! these two traits. [`crate::dom`] provides the in-memory implementation.

use std::fmt;

use serde_json::Value;

/// Key and value fragments cached by the `map`/`omap` operators.
#[derive(Debug, Clone)]
pub struct MapTemplates<E> {
    pub key: E,
    pub value: E,
}

/// Typed per-element state that survives re-renders of the same element.
///
/// Lives as long as the element it is attached to and is never copied by
/// [`ElementHandle::clone_deep`].
#[derive(Debug, Clone)]
pub struct ElementCache<E> {
    pub item_template: Option<E>,
    pub map_templates: Option<MapTemplates<E>>,
    pub item_value: Option<Value>,
}

impl<E> Default for ElementCache<E> {
    fn default() -> Self {
        Self {
            item_template: None,
            map_templates: None,
            item_value: None,
        }
    }
}

/// Handle to one element of an owned, mutable tree.
///
/// Handles are cheap to clone and compare by identity; all mutation goes
/// through `&self`.
pub trait ElementHandle: Clone + fmt::Debug {
    fn tag(&self) -> String;

    /// Attributes in document order.
    fn attrs(&self) -> Vec<(String, String)>;
    fn get_attr(&self, name: &str) -> Option<String>;
    fn set_attr(&self, name: &str, value: &str);
    fn remove_attr(&self, name: &str);

    fn has_attr(&self, name: &str) -> bool {
        self.get_attr(name).is_some()
    }

    fn has_css_class(&self, class: &str) -> bool {
        self.get_attr("class")
            .map(|classes| classes.split_whitespace().any(|c| c == class))
            .unwrap_or(false)
    }

    fn add_css_class(&self, class: &str) {
        if self.has_css_class(class) {
            return;
        }
        let classes = match self.get_attr("class") {
            Some(existing) if !existing.trim().is_empty() => {
                format!("{} {}", existing.trim(), class)
            }
            _ => class.to_string(),
        };
        self.set_attr("class", &classes);
    }

    fn remove_css_class(&self, class: &str) {
        let Some(existing) = self.get_attr("class") else {
            return;
        };
        let remaining: Vec<&str> = existing.split_whitespace().filter(|c| *c != class).collect();
        if remaining.is_empty() {
            self.remove_attr("class");
        } else {
            self.set_attr("class", &remaining.join(" "));
        }
    }

    /// Concatenated text of all descendant text nodes.
    fn text(&self) -> String;
    /// Replace every child node with a single text node.
    fn set_text(&self, text: &str);
    /// Remove the element's own text nodes, keeping child elements.
    fn remove_text(&self);

    fn inner_html(&self) -> String;
    /// Replace every child node with the parsed markup.
    fn set_html(&self, html: &str);
    fn append_html(&self, html: &str);

    /// Immediate child elements in document order.
    fn children(&self) -> Vec<Self>;

    fn first_child(&self) -> Option<Self> {
        self.children().into_iter().next()
    }

    fn has_children(&self) -> bool {
        !self.children().is_empty()
    }

    /// Deep copy of the subtree, detached, without cached state.
    fn clone_deep(&self) -> Self;
    /// Detach from the parent, if any. The subtree stays intact.
    fn detach(&self);
    /// Append `child` as last child, detaching it from its previous parent first.
    fn append_child(&self, child: &Self);
    /// Remove every child node, elements and text alike.
    fn remove_children(&self);

    fn item_template(&self) -> Option<Self>;
    fn set_item_template(&self, template: Self);
    fn map_templates(&self) -> Option<MapTemplates<Self>>;
    fn set_map_templates(&self, templates: MapTemplates<Self>);
    /// Value a list item was rendered from.
    fn item_value(&self) -> Option<Value>;
    fn set_item_value(&self, value: Value);

    /// Human readable location for diagnostics, e.g. `html > body > ul#menu`.
    fn trace(&self) -> String;
}

/// Owning document of an element tree.
pub trait DocumentHandle {
    type Element: ElementHandle;

    fn root(&self) -> Self::Element;
    fn get_by_id(&self, id: &str) -> Option<Self::Element>;
}
