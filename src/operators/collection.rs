//! Collection operators: `list`, `olist`, `map`, `omap`.
//!
//! On first execution the item template (lists) or the key and value templates
//! (maps) are detached from the element and cached on it. Every execution then
//! clears the element and renders one clone per entry, delegating each clone
//! back to the walker as a list item. Ordered variants bracket the iteration
//! with an index stack entry.

use serde_json::Value;
use tracing::debug;

use super::{ExecError, Outcome};
use crate::element::{DocumentHandle, ElementHandle, MapTemplates};
use crate::error::TemplateError;
use crate::template::Injection;

pub(crate) fn list<D: DocumentHandle>(
    cx: &mut Injection<'_, D>,
    element: &D::Element,
    scope: &Value,
    path: &str,
    ordered: bool,
) -> Result<Outcome, ExecError> {
    let template = item_template(element)?;
    element.remove_children();
    debug!(path = %path, element = %element.trace(), ordered, "Process list element.");

    let items = cx.content().get_iterable(scope, path)?;
    if ordered {
        cx.indexes.push();
    }
    let rendered = render_items(cx, element, &template, items, ordered);
    if ordered {
        cx.indexes.pop();
    }
    rendered?;
    Ok(Outcome::Done)
}

fn render_items<D: DocumentHandle>(
    cx: &mut Injection<'_, D>,
    element: &D::Element,
    template: &D::Element,
    items: Vec<Value>,
    ordered: bool,
) -> Result<(), TemplateError> {
    for item in items {
        if ordered {
            cx.indexes.increment();
        }
        let item_element = template.clone_deep();
        item_element.set_item_value(item.clone());
        element.append_child(&item_element);
        cx.inject_item(&item_element, &item)?;
    }
    Ok(())
}

pub(crate) fn map<D: DocumentHandle>(
    cx: &mut Injection<'_, D>,
    element: &D::Element,
    scope: &Value,
    path: &str,
    ordered: bool,
) -> Result<Outcome, ExecError> {
    let templates = map_templates(element)?;
    element.remove_children();
    debug!(path = %path, element = %element.trace(), ordered, "Process map element.");

    let entries = cx.content().get_map(scope, path)?;
    if ordered {
        cx.indexes.push();
    }
    let rendered = render_entries(cx, element, &templates, entries, ordered);
    if ordered {
        cx.indexes.pop();
    }
    rendered?;
    Ok(Outcome::Done)
}

fn render_entries<D: DocumentHandle>(
    cx: &mut Injection<'_, D>,
    element: &D::Element,
    templates: &MapTemplates<D::Element>,
    entries: serde_json::Map<String, Value>,
    ordered: bool,
) -> Result<(), TemplateError> {
    for (key, value) in entries {
        if ordered {
            cx.indexes.increment();
        }
        let key_element = templates.key.clone_deep();
        let value_element = templates.value.clone_deep();
        element.append_child(&key_element);
        element.append_child(&value_element);
        cx.inject_item(&key_element, &Value::String(key))?;
        cx.inject_item(&value_element, &value)?;
    }
    Ok(())
}

fn item_template<E: ElementHandle>(element: &E) -> Result<E, TemplateError> {
    if let Some(template) = element.item_template() {
        return Ok(template);
    }
    let template = take_first_child(element, "item")?;
    element.set_item_template(template.clone());
    Ok(template)
}

fn map_templates<E: ElementHandle>(element: &E) -> Result<MapTemplates<E>, TemplateError> {
    if let Some(templates) = element.map_templates() {
        return Ok(templates);
    }
    let mut children = element.children().into_iter();
    let key = children.next().ok_or_else(|| missing_template(element, "key"))?;
    let value = children.next().ok_or_else(|| missing_template(element, "value"))?;
    key.detach();
    value.detach();
    let templates = MapTemplates { key, value };
    element.set_map_templates(templates.clone());
    Ok(templates)
}

fn take_first_child<E: ElementHandle>(element: &E, kind: &'static str) -> Result<E, TemplateError> {
    let child = element
        .first_child()
        .ok_or_else(|| missing_template(element, kind))?;
    child.detach();
    Ok(child)
}

fn missing_template<E: ElementHandle>(element: &E, kind: &'static str) -> TemplateError {
    TemplateError::MissingTemplate {
        element: element.trace(),
        kind,
    }
}
