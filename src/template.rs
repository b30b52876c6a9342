//! Template walker.
//!
//! Injection walks the element tree depth first. For every element it builds
//! an [`OperatorsList`] and runs the fixed evaluation order:
//!
//! 1. exclude: skip the element and its subtree
//! 2. jump: continue with the `goto` target element and the current scope
//! 3. conditional: a disabled branch gets the hidden class and is not descended
//! 4. inline: subinjection entry points only; execute and stop
//! 5. attribute operators, in document order
//! 6. content operator: its scope replaces the current one, or descent stops
//! 7. descent into child elements

use serde_json::Value;
use tracing::{debug, instrument};

use crate::content::{Content, ContentResolver};
use crate::element::{DocumentHandle, ElementHandle};
use crate::error::TemplateError;
use crate::numbering::IndexStack;
use crate::operators::{OperatorFactory, Outcome};
use crate::operators_list::{OperatorMeta, OperatorsList};
use crate::options::TemplateOptions;

/// Declarative template bound to a document.
#[derive(Debug)]
pub struct Template<D: DocumentHandle> {
    doc: D,
    options: TemplateOptions,
}

impl<D: DocumentHandle> Template<D> {
    pub fn new(doc: D) -> Self {
        Self::with_options(doc, TemplateOptions::default())
    }

    pub fn with_options(doc: D, options: TemplateOptions) -> Self {
        Self { doc, options }
    }

    pub fn document(&self) -> &D {
        &self.doc
    }

    pub fn options(&self) -> &TemplateOptions {
        &self.options
    }

    /// Render the whole document, starting at the root with the model as scope.
    #[instrument(skip_all)]
    pub fn inject(&self, content: &dyn ContentResolver) -> Result<(), TemplateError> {
        let model = content.model();
        if model.is_null() {
            return Err(TemplateError::NullScope);
        }
        let mut cx = Injection::new(&self.doc, content, &self.options);
        cx.inject_element(&self.doc.root(), model)
    }

    pub fn inject_value(&self, model: Value) -> Result<(), TemplateError> {
        self.inject(&Content::new(model))
    }

    /// Render `element` alone, feeding it the model as value.
    ///
    /// The element must carry a content operator other than `text`, `html` or
    /// `numbering`, or a single-value attribute operator; that operator is
    /// applied to the model itself.
    #[instrument(skip_all, fields(element = %element.trace()))]
    pub fn subinject(
        &self,
        element: &D::Element,
        content: &dyn ContentResolver,
    ) -> Result<(), TemplateError> {
        let model = content.model();
        if model.is_null() {
            return Err(TemplateError::NullScope);
        }
        let operators = OperatorsList::init_subtree(element, &self.options.prefix)?;
        let mut cx = Injection::new(&self.doc, content, &self.options);
        cx.inject(element, operators, model)
    }

    pub fn subinject_value(&self, element: &D::Element, value: Value) -> Result<(), TemplateError> {
        self.subinject(element, &Content::new(value))
    }
}

/// State of one `inject`/`subinject` call.
pub(crate) struct Injection<'a, D: DocumentHandle> {
    doc: &'a D,
    content: &'a dyn ContentResolver,
    options: &'a TemplateOptions,
    factory: OperatorFactory,
    pub(crate) indexes: IndexStack,
    /// Ids of `goto` targets currently being rendered.
    jumps: Vec<String>,
}

impl<'a, D: DocumentHandle> Injection<'a, D> {
    fn new(doc: &'a D, content: &'a dyn ContentResolver, options: &'a TemplateOptions) -> Self {
        Self {
            doc,
            content,
            options,
            factory: OperatorFactory::new(),
            indexes: IndexStack::new(),
            jumps: Vec::new(),
        }
    }

    pub(crate) fn content(&self) -> &'a dyn ContentResolver {
        self.content
    }

    pub(crate) fn indexes(&self) -> &IndexStack {
        &self.indexes
    }

    fn inject_element(&mut self, element: &D::Element, scope: &Value) -> Result<(), TemplateError> {
        let operators = OperatorsList::init_element(element, &self.options.prefix)?;
        self.inject(element, operators, scope)
    }

    /// Render a list or map item cloned from its template.
    pub(crate) fn inject_item(&mut self, element: &D::Element, scope: &Value) -> Result<(), TemplateError> {
        let operators = OperatorsList::init_item(element, &self.options.prefix)?;
        self.inject(element, operators, scope)
    }

    fn inject(
        &mut self,
        element: &D::Element,
        operators: OperatorsList,
        scope: &Value,
    ) -> Result<(), TemplateError> {
        let mut operators = operators;

        if let Some(meta) = &operators.exclude {
            if self.exec_operator(element, scope, meta)? == Outcome::Branch(true) {
                debug!(element = %element.trace(), "Element rejected by exclusion operator.");
                return Ok(());
            }
        }

        if let Some(meta) = operators.jump.take() {
            if let Outcome::Target(id) = self.exec_operator(element, scope, &meta)? {
                return self.jump(element, id, scope);
            }
        }

        self.render(element, operators, scope)
    }

    /// Continue at the `goto` target. A target already being rendered through
    /// a jump would recurse forever.
    fn jump(&mut self, element: &D::Element, id: String, scope: &Value) -> Result<(), TemplateError> {
        if self.jumps.contains(&id) {
            return Err(TemplateError::GotoCycle {
                id,
                element: element.trace(),
            });
        }
        let target = self
            .doc
            .get_by_id(&id)
            .ok_or_else(|| TemplateError::MissingGotoTarget {
                id: id.clone(),
                element: element.trace(),
            })?;
        debug!(from = %element.trace(), to = %target.trace(), "Jump to element.");

        self.jumps.push(id);
        let result = OperatorsList::init_element(&target, &self.options.prefix)
            .and_then(|operators| self.render(&target, operators, scope));
        self.jumps.pop();
        result
    }

    /// Conditional, inline, attributes, content and descent.
    fn render(
        &mut self,
        element: &D::Element,
        operators: OperatorsList,
        scope: &Value,
    ) -> Result<(), TemplateError> {
        if let Some(meta) = &operators.conditional {
            let enabled = self.exec_operator(element, scope, meta)? == Outcome::Branch(true);
            if !enabled {
                debug!(element = %element.trace(), "Element rejected by conditional operator.");
                element.add_css_class(&self.options.hidden_class);
                return Ok(());
            }
            element.remove_css_class(&self.options.hidden_class);
        }

        if let Some(meta) = &operators.inline {
            self.exec_operator(element, scope, meta)?;
            return Ok(());
        }

        for meta in &operators.attributes {
            self.exec_operator(element, scope, meta)?;
        }

        let rescoped;
        let scope = match &operators.content {
            Some(meta) => match self.exec_operator(element, scope, meta)? {
                Outcome::Scope(value) if !value.is_null() => {
                    rescoped = value;
                    &rescoped
                }
                _ => return Ok(()),
            },
            None => scope,
        };

        for child in element.children() {
            self.inject_element(&child, scope)?;
        }
        Ok(())
    }

    fn exec_operator(
        &mut self,
        element: &D::Element,
        scope: &Value,
        meta: &OperatorMeta,
    ) -> Result<Outcome, TemplateError> {
        let operator = self.factory.instance(meta.opcode)?;
        operator.exec(self, element, scope, &meta.operand)
    }
}
