//! Control operators: `exclude`, `goto`, `if`, `ifnot`, `case`.

use serde_json::Value;
use tracing::{debug, warn};

use super::{scalar_string, ExecError, Outcome};
use crate::content::ContentResolver;
use crate::element::ElementHandle;
use crate::error::TemplateError;

/// Exclusion operand test. Only the literal `true` excludes.
pub fn excludes(operand: &str) -> bool {
    operand == "true"
}

pub(crate) fn exclude(operand: &str) -> Outcome {
    Outcome::Branch(excludes(operand))
}

pub(crate) fn goto(operand: &str) -> Outcome {
    Outcome::Target(operand.to_string())
}

/// Branch enabled when the value is not empty.
pub(crate) fn if_present(
    content: &dyn ContentResolver,
    scope: &Value,
    path: &str,
) -> Result<Outcome, ExecError> {
    Ok(Outcome::Branch(!content.is_empty(scope, path)?))
}

/// Branch enabled when the value is empty.
pub(crate) fn if_absent(
    content: &dyn ContentResolver,
    scope: &Value,
    path: &str,
) -> Result<Outcome, ExecError> {
    Ok(Outcome::Branch(content.is_empty(scope, path)?))
}

/// `path:literal`, split at the first `:`. Enabled when the value's string form equals the literal.
pub(crate) fn case<E: ElementHandle>(
    content: &dyn ContentResolver,
    element: &E,
    scope: &Value,
    expression: &str,
) -> Result<Outcome, ExecError> {
    let Some((path, literal)) = expression.split_once(':') else {
        return Err(TemplateError::InvalidExpression {
            expression: expression.to_string(),
            reason: "missing separator".to_string(),
        }
        .into());
    };
    if literal.is_empty() {
        return Err(TemplateError::InvalidExpression {
            expression: expression.to_string(),
            reason: "missing literal".to_string(),
        }
        .into());
    }

    let value = content.get_value(scope, path)?;
    if value.is_null() {
        warn!(path = %path, element = %element.trace(), "Null property. Disable branch.");
        return Ok(Outcome::Branch(false));
    }

    let enabled = scalar_string(path, &value)? == literal;
    debug!(
        path = %path,
        element = %element.trace(),
        enabled,
        "Case branch evaluated."
    );
    Ok(Outcome::Branch(enabled))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_excludes_is_case_sensitive() {
        assert!(excludes("true"));
        assert!(!excludes("TRUE"));
        assert!(!excludes("True"));
        assert!(!excludes("false"));
        assert!(!excludes("yes"));
    }

    #[test]
    fn test_goto_returns_operand_verbatim() {
        assert_eq!(goto("section-2"), Outcome::Target("section-2".to_string()));
    }
}
