//! Single-value content operators: `text`, `html`, `numbering`, `object`.

use serde_json::Value;
use tracing::{debug, warn};

use super::{scalar_string, ExecError, Outcome};
use crate::content::{type_name, ContentResolver};
use crate::element::ElementHandle;
use crate::error::{ContentError, TemplateError};
use crate::numbering::{format_numbering, IndexStack};

pub(crate) fn text<E: ElementHandle>(
    content: &dyn ContentResolver,
    element: &E,
    scope: &Value,
    path: &str,
) -> Result<Outcome, ExecError> {
    if element.has_children() {
        return Err(TemplateError::ElementHasChildren {
            operator: "TEXT",
            element: element.trace(),
        }
        .into());
    }

    let value = content.get_value(scope, path)?;
    match &value {
        Value::Null => {
            warn!(path = %path, element = %element.trace(), "Null property. Remove text content.");
            element.remove_text();
        }
        Value::String(s) if s.is_empty() => {
            warn!(path = %path, element = %element.trace(), "Empty property. Remove text content.");
            element.remove_text();
        }
        _ => {
            let text = scalar_string(path, &value)?;
            debug!(path = %path, element = %element.trace(), "Set text content.");
            element.set_text(&text);
        }
    }
    Ok(Outcome::Done)
}

/// Replaces the element's children with the parsed markup.
pub(crate) fn html<E: ElementHandle>(
    content: &dyn ContentResolver,
    element: &E,
    scope: &Value,
    path: &str,
) -> Result<Outcome, ExecError> {
    let value = content.get_value(scope, path)?;
    match &value {
        Value::Null => {
            warn!(path = %path, element = %element.trace(), "Null property. Remove children.");
            element.remove_children();
        }
        Value::String(markup) => {
            debug!(path = %path, element = %element.trace(), "Set inner HTML.");
            element.set_html(markup);
        }
        other => {
            return Err(ContentError::InvalidType {
                path: path.to_string(),
                expected: "string",
                found: type_name(other),
            }
            .into())
        }
    }
    Ok(Outcome::Done)
}

pub(crate) fn numbering<E: ElementHandle>(
    indexes: &IndexStack,
    element: &E,
    format: &str,
) -> Result<Outcome, ExecError> {
    if indexes.is_empty() {
        return Err(TemplateError::MissingIndex {
            element: element.trace(),
        }
        .into());
    }
    let label = format_numbering(format, indexes.entries())?;
    element.set_text(&label);
    Ok(Outcome::Done)
}

/// Rescope to the resolved value. With a property path the value must be an object.
pub(crate) fn object<E: ElementHandle>(
    content: &dyn ContentResolver,
    element: &E,
    scope: &Value,
    path: &str,
) -> Result<Outcome, ExecError> {
    let value = content.get_value(scope, path)?;
    match value {
        Value::Null => {
            warn!(path = %path, element = %element.trace(), "Null scope for property.");
            Ok(Outcome::Scope(Value::Null))
        }
        Value::Object(_) => Ok(Outcome::Scope(value)),
        other if path == "." => Ok(Outcome::Scope(other)),
        other => Err(ContentError::InvalidType {
            path: path.to_string(),
            expected: "object",
            found: type_name(&other),
        }
        .into()),
    }
}
