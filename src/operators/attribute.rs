//! Attribute operators: `attr`, `id`, `src`, `href`, `title`, `value`, `css-class`.
//!
//! None of them changes scope or stops descent. A `null` value removes what the
//! operator would otherwise set.

use serde_json::Value;
use tracing::{debug, warn};

use super::{parse_name_values, scalar_string, string_value, ExecError, Outcome};
use crate::content::ContentResolver;
use crate::element::ElementHandle;
use crate::error::TemplateError;

/// Elements the `src` operator may target.
const SRC_ELEMENTS: [&str; 7] = ["iframe", "script", "img", "input", "textarea", "video", "audio"];

/// Elements whose value is their text content.
const GENERIC_VALUE_ELEMENTS: [&str; 1] = ["div"];

const CONTROL_ELEMENTS: [&str; 3] = ["input", "textarea", "select"];

/// `name:path;name:path` sets each named attribute.
pub(crate) fn attr<E: ElementHandle>(
    content: &dyn ContentResolver,
    element: &E,
    scope: &Value,
    expression: &str,
) -> Result<Outcome, ExecError> {
    for (name, path) in parse_name_values(expression)? {
        let value = content.get_value(scope, &path)?;
        if value.is_null() {
            warn!(path = %path, element = %element.trace(), "Null property. Remove {} attribute.", name);
            element.remove_attr(&name);
            continue;
        }
        let text = scalar_string(&path, &value)?;
        debug!(path = %path, element = %element.trace(), "Set {} attribute.", name);
        element.set_attr(&name, &text);
    }
    Ok(Outcome::Void)
}

pub(crate) fn id<E: ElementHandle>(
    content: &dyn ContentResolver,
    element: &E,
    scope: &Value,
    path: &str,
) -> Result<Outcome, ExecError> {
    let value = content.get_value(scope, path)?;
    if value.is_null() {
        warn!(path = %path, element = %element.trace(), "Null property. Remove id attribute.");
        element.remove_attr("id");
        return Ok(Outcome::Void);
    }
    element.set_attr("id", &scalar_string(path, &value)?);
    Ok(Outcome::Void)
}

pub(crate) fn src<E: ElementHandle>(
    content: &dyn ContentResolver,
    element: &E,
    scope: &Value,
    path: &str,
) -> Result<Outcome, ExecError> {
    let tag = element.tag();
    if !SRC_ELEMENTS.contains(&tag.as_str()) {
        return Err(TemplateError::UnsupportedElement {
            operator: "SRC",
            element: element.trace(),
        }
        .into());
    }
    set_string_attr(content, element, scope, path, "src")
}

pub(crate) fn href<E: ElementHandle>(
    content: &dyn ContentResolver,
    element: &E,
    scope: &Value,
    path: &str,
) -> Result<Outcome, ExecError> {
    set_string_attr(content, element, scope, path, "href")
}

pub(crate) fn title<E: ElementHandle>(
    content: &dyn ContentResolver,
    element: &E,
    scope: &Value,
    path: &str,
) -> Result<Outcome, ExecError> {
    set_string_attr(content, element, scope, path, "title")
}

fn set_string_attr<E: ElementHandle>(
    content: &dyn ContentResolver,
    element: &E,
    scope: &Value,
    path: &str,
    name: &str,
) -> Result<Outcome, ExecError> {
    let value = content.get_value(scope, path)?;
    if value.is_null() {
        warn!(path = %path, element = %element.trace(), "Null property. Remove {} attribute.", name);
        element.remove_attr(name);
        return Ok(Outcome::Void);
    }
    let text = string_value(path, &value)?;
    debug!(path = %path, element = %element.trace(), "Set {} attribute.", name);
    element.set_attr(name, &text);
    Ok(Outcome::Void)
}

/// Form control value. `div` is a generic holder and takes the value as text.
pub(crate) fn value<E: ElementHandle>(
    content: &dyn ContentResolver,
    element: &E,
    scope: &Value,
    path: &str,
) -> Result<Outcome, ExecError> {
    let value = content.get_value(scope, path)?;
    let tag = element.tag();

    if GENERIC_VALUE_ELEMENTS.contains(&tag.as_str()) {
        element.set_text(&scalar_string(path, &value)?);
        return Ok(Outcome::Void);
    }
    if !CONTROL_ELEMENTS.contains(&tag.as_str()) {
        return Err(TemplateError::UnsupportedElement {
            operator: "VALUE",
            element: element.trace(),
        }
        .into());
    }

    if value.is_null() {
        warn!(path = %path, element = %element.trace(), "Null property. Reset control value.");
        reset_control(element);
        return Ok(Outcome::Void);
    }

    let text = scalar_string(path, &value)?;
    debug!(path = %path, element = %element.trace(), "Set control value.");
    set_control_value(element, &value, &text);
    Ok(Outcome::Void)
}

fn input_type<E: ElementHandle>(element: &E) -> String {
    element
        .get_attr("type")
        .map(|t| t.to_ascii_lowercase())
        .unwrap_or_else(|| "text".to_string())
}

fn set_control_value<E: ElementHandle>(element: &E, value: &Value, text: &str) {
    match element.tag().as_str() {
        "textarea" => element.set_text(text),
        "select" => {
            for option in select_options(element) {
                let option_value = option.get_attr("value").unwrap_or_else(|| option.text());
                if option_value == text {
                    option.set_attr("selected", "");
                } else {
                    option.remove_attr("selected");
                }
            }
        }
        _ => match input_type(element).as_str() {
            "checkbox" | "radio" => {
                let checked = match value {
                    Value::Bool(b) => *b,
                    _ => element.get_attr("value").as_deref() == Some(text),
                };
                if checked {
                    element.set_attr("checked", "");
                } else {
                    element.remove_attr("checked");
                }
            }
            _ => element.set_attr("value", text),
        },
    }
}

fn reset_control<E: ElementHandle>(element: &E) {
    match element.tag().as_str() {
        "textarea" => element.set_text(""),
        "select" => {
            for option in select_options(element) {
                option.remove_attr("selected");
            }
        }
        _ => match input_type(element).as_str() {
            "checkbox" | "radio" => element.remove_attr("checked"),
            _ => element.remove_attr("value"),
        },
    }
}

/// `option` children of a `select`, including those inside `optgroup`.
fn select_options<E: ElementHandle>(select: &E) -> Vec<E> {
    let mut options = Vec::new();
    for child in select.children() {
        match child.tag().as_str() {
            "option" => options.push(child),
            "optgroup" => options.extend(child.children().into_iter().filter(|c| c.tag() == "option")),
            _ => {}
        }
    }
    options
}

/// `class:path;class:path` toggles each class on the resolved value.
///
/// A string enables the class when it equals the class name, an array when it
/// contains it; other values by their truthiness.
pub(crate) fn css_class<E: ElementHandle>(
    content: &dyn ContentResolver,
    element: &E,
    scope: &Value,
    expression: &str,
) -> Result<Outcome, ExecError> {
    for (class, path) in parse_name_values(expression)? {
        let value = content.get_value(scope, &path)?;
        let enabled = match &value {
            Value::Null => {
                warn!(path = %path, element = %element.trace(), "Null property. Remove CSS class {}.", class);
                element.remove_css_class(&class);
                continue;
            }
            Value::String(s) => *s == class,
            Value::Array(items) => items.iter().any(|item| item.as_str() == Some(class.as_str())),
            Value::Bool(b) => *b,
            Value::Number(n) => n.as_f64() != Some(0.0),
            Value::Object(_) => true,
        };
        if enabled {
            debug!(element = %element.trace(), "Add CSS class {}.", class);
            element.add_css_class(&class);
        } else {
            debug!(element = %element.trace(), "Remove CSS class {}.", class);
            element.remove_css_class(&class);
        }
    }
    Ok(Outcome::Void)
}
