//! # Declarative DOM Templating
//!
//! Injects a JSON model into an HTML element tree driven by `data-*`
//! instruction attributes (`data-text`, `data-list`, `data-if`, ...).
//!
//! ## Engine Invariants
//!
//! 1. **One Slot Per Type**: an element carries at most one JUMP, one CONDITIONAL
//!    and one CONTENT operator. ATTRIBUTE operators are unbounded. A second
//!    operator competing for a slot is an authoring error, never a silent override.
//!
//! 2. **Fixed Evaluation Order**: exclude, jump, conditional, inline, attributes,
//!    content, descent. See [`template`].
//!
//! 3. **Absolute Paths**: a property path starting with `.` always resolves from the
//!    root model, whatever the current scope is.
//!
//! 4. **Null vs Undefined**: `null` is a legal empty value (lists and maps render
//!    nothing, single values are removed). A missing property is an error.
//!
//! 5. **Containment**: content errors are caught per operator execution and only
//!    blank the element that triggered them. Authoring errors abort the render.
//!
//! 6. **Template Reuse**: list and map templates are detached and cached on their
//!    element at first render, so re-injecting the same model yields the same tree.
//!
//! 7. **Index Stack**: one counter per enclosing `olist`/`omap`, pushed and popped
//!    exactly once per ordered iteration.
//!
//! ## Example
//!
//! ```
//! use dom_template::{Document, ElementHandle, Template};
//! use serde_json::json;
//!
//! let doc = Document::parse(r#"<ul data-list="items"><li data-text="name"></li></ul>"#).unwrap();
//! let template = Template::new(doc);
//! template
//!     .inject_value(json!({ "items": [{ "name": "a" }, { "name": "b" }] }))
//!     .unwrap();
//! let body = template.document().body().unwrap();
//! assert_eq!(
//!     body.inner_html(),
//!     r#"<ul data-list="items"><li data-text="name">a</li><li data-text="name">b</li></ul>"#
//! );
//! ```

pub mod content;
pub mod dom;
pub mod element;
pub mod error;
pub mod numbering;
pub mod opcode;
pub mod operators;
pub mod operators_list;
pub mod options;
pub mod template;

#[cfg(test)]
mod operators_tests;

pub use content::{Content, ContentResolver};
pub use dom::{Document, Element};
pub use element::{DocumentHandle, ElementHandle};
pub use error::{ContentError, DomError, TemplateError};
pub use opcode::{Opcode, OpcodeType, OPCODE_PREFIX};
pub use operators::{Operator, OperatorFactory, Outcome};
pub use operators_list::{OperatorMeta, OperatorsList};
pub use options::TemplateOptions;
pub use template::Template;
