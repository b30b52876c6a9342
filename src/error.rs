//! Error taxonomy for template injection.
//!
//! Two families, handled differently by the walker:
//!
//! - [`ContentError`]: the data model does not match a property path. Caught at
//!   operator execution, logged, and degraded to "no content" for that one element.
//! - [`TemplateError`]: the template or document is malformed. Returned from
//!   `inject`/`subinject` and aborts the render.

use thiserror::Error;

use crate::opcode::{Opcode, OpcodeType};

// ═══════════════════════════════════════════════════════════════════════════════
// CONTENT RESOLUTION
// ═══════════════════════════════════════════════════════════════════════════════

/// Missing or mistyped property while resolving a path against the model.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ContentError {
    #[error("undefined content value for property `{path}`")]
    Undefined { path: String },

    #[error("property path `{path}` used on a scope that is not an object (got {found})")]
    NotAnObject { path: String, found: &'static str },

    #[error("invalid content type for property `{path}`: expected {expected} but got {found}")]
    InvalidType {
        path: String,
        expected: &'static str,
        found: &'static str,
    },
}

impl ContentError {
    /// Property path that triggered the error.
    pub fn path(&self) -> &str {
        match self {
            Self::Undefined { path }
            | Self::NotAnObject { path, .. }
            | Self::InvalidType { path, .. } => path,
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// AUTHORING / DOCUMENT STRUCTURE
// ═══════════════════════════════════════════════════════════════════════════════

/// Malformed template, malformed document, or incomplete operator registry.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TemplateError {
    #[error("invalid operators list on element `{element}`: only one {kind} operator is allowed")]
    DuplicateOperator { element: String, kind: OpcodeType },

    #[error("empty operand on element `{element}` for opcode {opcode}")]
    EmptyOperand { element: String, opcode: Opcode },

    #[error("operator {0} is not implemented")]
    UnregisteredOpcode(Opcode),

    #[error("subtree entry point `{element}` forbids {opcode} operator")]
    ForbiddenSubtreeOperator { element: String, opcode: Opcode },

    #[error("subtree entry point `{element}` mandates a content or inline operator")]
    MissingSubtreeOperator { element: String },

    #[error("invalid element `{element}`: missing {kind} template")]
    MissingTemplate { element: String, kind: &'static str },

    #[error("numbering on element `{element}` requires an enclosing ordered list or map")]
    MissingIndex { element: String },

    #[error("invalid numbering format `{format}`: {reason}")]
    InvalidNumberingFormat { format: String, reason: String },

    #[error("goto target `{id}` referenced from `{element}` does not exist")]
    MissingGotoTarget { id: String, element: String },

    #[error("goto target `{id}` referenced from `{element}` is already being rendered")]
    GotoCycle { id: String, element: String },

    #[error("invalid expression `{expression}`: {reason}")]
    InvalidExpression { expression: String, reason: String },

    #[error("{operator} operator is not supported on element `{element}`")]
    UnsupportedElement {
        operator: &'static str,
        element: String,
    },

    #[error("{operator} operator requires element `{element}` to have no child elements")]
    ElementHasChildren {
        operator: &'static str,
        element: String,
    },

    #[error("scope object is null")]
    NullScope,
}

// ═══════════════════════════════════════════════════════════════════════════════
// DOM
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Error)]
pub enum DomError {
    #[error("failed to parse HTML: {0}")]
    Parse(#[from] std::io::Error),

    #[error("document has no root element")]
    MissingRoot,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_error_path() {
        let err = ContentError::InvalidType {
            path: "items".to_string(),
            expected: "array",
            found: "string",
        };
        assert_eq!(err.path(), "items");
        assert_eq!(
            err.to_string(),
            "invalid content type for property `items`: expected array but got string"
        );
    }

    #[test]
    fn test_template_error_display() {
        let err = TemplateError::DuplicateOperator {
            element: "html > body > div".to_string(),
            kind: OpcodeType::Content,
        };
        assert_eq!(
            err.to_string(),
            "invalid operators list on element `html > body > div`: only one CONTENT operator is allowed"
        );
    }
}
