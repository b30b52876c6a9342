//! Operators: one strategy per opcode.
//!
//! Every operator consumes `(element, scope, operand)` and yields an
//! [`Outcome`]: a DOM mutation with nothing to report, a branch decision, a
//! jump target, or a new scope for descent. The closed [`Operator`] enum is
//! dispatched with a `match`; [`OperatorFactory`] is the per-session registry
//! the walker looks operators up in.
//!
//! Content resolution failures are contained here: [`Operator::exec`] logs
//! them and reports [`Outcome::Void`], so one bad property path only blanks
//! the element that used it. Authoring errors pass through unchanged.

pub mod attribute;
pub mod collection;
pub mod content;
pub mod control;

use std::collections::HashMap;

use serde_json::{Number, Value};
use tracing::{error, warn};

use crate::content::type_name;
use crate::element::{DocumentHandle, ElementHandle};
use crate::error::{ContentError, TemplateError};
use crate::opcode::Opcode;
use crate::template::Injection;

// ═══════════════════════════════════════════════════════════════════════════════
// OPERATOR SET
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    Attr,
    Id,
    Src,
    Href,
    Title,
    Value,
    CssClass,
    Exclude,
    Goto,
    If,
    IfNot,
    Case,
    Text,
    Html,
    Numbering,
    Object,
    List,
    OList,
    Map,
    OMap,
}

/// Result of one operator execution, interpreted by the walker.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// Side effect only. Also reported when a content error was contained.
    Void,
    /// Conditional decision; for `exclude`, `true` means skip.
    Branch(bool),
    /// Id of the element processing jumps to.
    Target(String),
    /// Scope for descent. `Null` stops descent.
    Scope(Value),
    /// The operator owns the element's subtree; do not descend.
    Done,
}

/// Failure inside an operator body, before containment.
#[derive(Debug)]
pub(crate) enum ExecError {
    Content(ContentError),
    Template(TemplateError),
}

impl From<ContentError> for ExecError {
    fn from(err: ContentError) -> Self {
        ExecError::Content(err)
    }
}

impl From<TemplateError> for ExecError {
    fn from(err: TemplateError) -> Self {
        ExecError::Template(err)
    }
}

impl Operator {
    /// Implementation registered for `opcode`. `Opcode::None` has none.
    pub fn for_opcode(opcode: Opcode) -> Option<Operator> {
        let operator = match opcode {
            Opcode::None => return None,
            Opcode::Attr => Operator::Attr,
            Opcode::Id => Operator::Id,
            Opcode::Src => Operator::Src,
            Opcode::Href => Operator::Href,
            Opcode::Title => Operator::Title,
            Opcode::Value => Operator::Value,
            Opcode::CssClass => Operator::CssClass,
            Opcode::Exclude => Operator::Exclude,
            Opcode::Goto => Operator::Goto,
            Opcode::If => Operator::If,
            Opcode::IfNot => Operator::IfNot,
            Opcode::Case => Operator::Case,
            Opcode::Text => Operator::Text,
            Opcode::Html => Operator::Html,
            Opcode::Numbering => Operator::Numbering,
            Opcode::Object => Operator::Object,
            Opcode::List => Operator::List,
            Opcode::OList => Operator::OList,
            Opcode::Map => Operator::Map,
            Opcode::OMap => Operator::OMap,
        };
        Some(operator)
    }

    pub fn opcode(self) -> Opcode {
        match self {
            Operator::Attr => Opcode::Attr,
            Operator::Id => Opcode::Id,
            Operator::Src => Opcode::Src,
            Operator::Href => Opcode::Href,
            Operator::Title => Opcode::Title,
            Operator::Value => Opcode::Value,
            Operator::CssClass => Opcode::CssClass,
            Operator::Exclude => Opcode::Exclude,
            Operator::Goto => Opcode::Goto,
            Operator::If => Opcode::If,
            Operator::IfNot => Opcode::IfNot,
            Operator::Case => Opcode::Case,
            Operator::Text => Opcode::Text,
            Operator::Html => Opcode::Html,
            Operator::Numbering => Opcode::Numbering,
            Operator::Object => Opcode::Object,
            Operator::List => Opcode::List,
            Operator::OList => Opcode::OList,
            Operator::Map => Opcode::Map,
            Operator::OMap => Opcode::OMap,
        }
    }

    /// Execute against `element`, containing content resolution errors.
    pub(crate) fn exec<D: DocumentHandle>(
        self,
        cx: &mut Injection<'_, D>,
        element: &D::Element,
        scope: &Value,
        operand: &str,
    ) -> Result<Outcome, TemplateError> {
        match self.dispatch(cx, element, scope, operand) {
            Ok(outcome) => Ok(outcome),
            Err(ExecError::Content(err @ ContentError::InvalidType { .. })) => {
                error!(
                    element = %element.trace(),
                    path = %err.path(),
                    operator = %self.opcode(),
                    "Invalid content type: {}", err
                );
                Ok(Outcome::Void)
            }
            Err(ExecError::Content(err)) => {
                warn!(
                    element = %element.trace(),
                    path = %err.path(),
                    operator = %self.opcode(),
                    "Undefined or invalid property: {}", err
                );
                Ok(Outcome::Void)
            }
            Err(ExecError::Template(err)) => Err(err),
        }
    }

    fn dispatch<D: DocumentHandle>(
        self,
        cx: &mut Injection<'_, D>,
        element: &D::Element,
        scope: &Value,
        operand: &str,
    ) -> Result<Outcome, ExecError> {
        let resolver = cx.content();
        match self {
            Operator::Attr => attribute::attr(resolver, element, scope, operand),
            Operator::Id => attribute::id(resolver, element, scope, operand),
            Operator::Src => attribute::src(resolver, element, scope, operand),
            Operator::Href => attribute::href(resolver, element, scope, operand),
            Operator::Title => attribute::title(resolver, element, scope, operand),
            Operator::Value => attribute::value(resolver, element, scope, operand),
            Operator::CssClass => attribute::css_class(resolver, element, scope, operand),
            Operator::Exclude => Ok(control::exclude(operand)),
            Operator::Goto => Ok(control::goto(operand)),
            Operator::If => control::if_present(resolver, scope, operand),
            Operator::IfNot => control::if_absent(resolver, scope, operand),
            Operator::Case => control::case(resolver, element, scope, operand),
            Operator::Text => content::text(resolver, element, scope, operand),
            Operator::Html => content::html(resolver, element, scope, operand),
            Operator::Numbering => content::numbering(cx.indexes(), element, operand),
            Operator::Object => content::object(resolver, element, scope, operand),
            Operator::List => collection::list(cx, element, scope, operand, false),
            Operator::OList => collection::list(cx, element, scope, operand, true),
            Operator::Map => collection::map(cx, element, scope, operand, false),
            Operator::OMap => collection::map(cx, element, scope, operand, true),
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// REGISTRY
// ═══════════════════════════════════════════════════════════════════════════════

/// Opcode to operator registry for one injection session.
#[derive(Debug, Clone)]
pub struct OperatorFactory {
    operators: HashMap<Opcode, Operator>,
}

impl OperatorFactory {
    /// Registry with an implementation for every opcode.
    pub fn new() -> Self {
        let mut factory = Self::empty();
        for opcode in Opcode::ALL {
            if let Some(operator) = Operator::for_opcode(opcode) {
                factory.register(operator);
            }
        }
        factory
    }

    pub fn empty() -> Self {
        Self {
            operators: HashMap::new(),
        }
    }

    pub fn register(&mut self, operator: Operator) {
        self.operators.insert(operator.opcode(), operator);
    }

    pub fn instance(&self, opcode: Opcode) -> Result<Operator, TemplateError> {
        self.operators
            .get(&opcode)
            .copied()
            .ok_or(TemplateError::UnregisteredOpcode(opcode))
    }

    pub fn len(&self) -> usize {
        self.operators.len()
    }

    pub fn is_empty(&self) -> bool {
        self.operators.is_empty()
    }
}

impl Default for OperatorFactory {
    fn default() -> Self {
        Self::new()
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// OPERAND HELPERS
// ═══════════════════════════════════════════════════════════════════════════════

/// Split `name:value;name:value` pairs. A trailing `;` is allowed.
pub(crate) fn parse_name_values(expression: &str) -> Result<Vec<(String, String)>, TemplateError> {
    let mut pairs = Vec::new();
    for chunk in expression.split(';') {
        if chunk.trim().is_empty() {
            continue;
        }
        let Some((name, value)) = chunk.split_once(':') else {
            return Err(TemplateError::InvalidExpression {
                expression: expression.to_string(),
                reason: format!("missing `:` separator near `{}`", chunk),
            });
        };
        let (name, value) = (name.trim(), value.trim());
        if name.is_empty() || value.is_empty() {
            return Err(TemplateError::InvalidExpression {
                expression: expression.to_string(),
                reason: format!("empty name or value near `{}`", chunk),
            });
        }
        pairs.push((name.to_string(), value.to_string()));
    }
    if pairs.is_empty() {
        return Err(TemplateError::InvalidExpression {
            expression: expression.to_string(),
            reason: "no name:value pairs".to_string(),
        });
    }
    Ok(pairs)
}

/// String form of a scalar. Arrays and objects have none.
pub(crate) fn scalar_string(path: &str, value: &Value) -> Result<String, ContentError> {
    match value {
        Value::Null => Ok(String::new()),
        Value::Bool(b) => Ok(b.to_string()),
        Value::Number(n) => Ok(number_string(n)),
        Value::String(s) => Ok(s.clone()),
        other => Err(ContentError::InvalidType {
            path: path.to_string(),
            expected: "scalar",
            found: type_name(other),
        }),
    }
}

/// Integral floats print without a fractional part (`3.0` is `"3"`).
fn number_string(n: &Number) -> String {
    match n.as_f64() {
        Some(f) if n.is_f64() && f == 0.0 => "0".to_string(),
        Some(f) if n.is_f64() && f.fract() == 0.0 && f.abs() < 1e21 => format!("{:.0}", f),
        _ => n.to_string(),
    }
}

/// The value itself when it is a string.
pub(crate) fn string_value(path: &str, value: &Value) -> Result<String, ContentError> {
    match value {
        Value::String(s) => Ok(s.clone()),
        other => Err(ContentError::InvalidType {
            path: path.to_string(),
            expected: "string",
            found: type_name(other),
        }),
    }
}
