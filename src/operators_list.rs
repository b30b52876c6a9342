//! Per-element operator classification.
//!
//! One scan over an element's attributes yields an immutable [`OperatorsList`]:
//! at most one jump, one conditional and one content operator, plus any number
//! of attribute operators in document order. The walker builds a fresh list
//! for every element it visits.

use crate::element::ElementHandle;
use crate::error::TemplateError;
use crate::opcode::{Opcode, OpcodeType};
use crate::operators::control;

/// `{opcode, operand}` pair extracted from one instruction attribute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperatorMeta {
    pub opcode: Opcode,
    pub operand: String,
}

impl OperatorMeta {
    pub fn new(opcode: Opcode, operand: impl Into<String>) -> Self {
        Self {
            opcode,
            operand: operand.into(),
        }
    }

    /// Same opcode, operand replaced by the current scope marker `.`.
    fn on_scope(&self) -> Self {
        Self::new(self.opcode, ".")
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OperatorsList {
    pub exclude: Option<OperatorMeta>,
    pub jump: Option<OperatorMeta>,
    pub conditional: Option<OperatorMeta>,
    pub inline: Option<OperatorMeta>,
    pub content: Option<OperatorMeta>,
    pub attributes: Vec<OperatorMeta>,
}

impl OperatorsList {
    /// Scan the instruction attributes of `element`.
    ///
    /// An `exclude` operator whose operand is `true` ends the scan; any other
    /// exclude operand is ignored.
    pub fn init_element<E: ElementHandle>(element: &E, prefix: &str) -> Result<Self, TemplateError> {
        let mut list = OperatorsList::default();

        for (name, operand) in element.attrs() {
            let opcode = Opcode::from_attr_name(&name, prefix);
            if opcode == Opcode::None {
                continue;
            }

            if opcode == Opcode::Exclude {
                if control::excludes(&operand) {
                    list.exclude = Some(OperatorMeta::new(opcode, operand));
                    break;
                }
                continue;
            }

            if operand.is_empty() {
                return Err(TemplateError::EmptyOperand {
                    element: element.trace(),
                    opcode,
                });
            }

            let meta = OperatorMeta::new(opcode, operand);
            let kind = opcode.opcode_type();
            match kind {
                OpcodeType::Jump => place(&mut list.jump, meta, element, kind)?,
                OpcodeType::Conditional => place(&mut list.conditional, meta, element, kind)?,
                OpcodeType::Content => place(&mut list.content, meta, element, kind)?,
                OpcodeType::Attribute => list.attributes.push(meta),
                OpcodeType::None => {}
            }
        }

        Ok(list)
    }

    /// Scan a list or map item. Without an explicit content operator the item
    /// renders itself: `object` when it has child elements, `text` otherwise.
    pub fn init_item<E: ElementHandle>(element: &E, prefix: &str) -> Result<Self, TemplateError> {
        let mut list = Self::init_element(element, prefix)?;
        list.inline = None;
        if list.content.is_none() {
            let opcode = if element.has_children() {
                Opcode::Object
            } else {
                Opcode::Text
            };
            list.content = Some(OperatorMeta::new(opcode, "."));
        }
        Ok(list)
    }

    /// Scan an element used as a subinjection entry point.
    ///
    /// The entry point consumes the injected value directly: its content
    /// operator, or failing that its first single-value attribute operator
    /// (promoted to the inline slot), is rebound to `.`.
    pub fn init_subtree<E: ElementHandle>(element: &E, prefix: &str) -> Result<Self, TemplateError> {
        let mut list = Self::init_element(element, prefix)?;

        if let Some(content) = list.content.take() {
            if matches!(content.opcode, Opcode::Text | Opcode::Html | Opcode::Numbering) {
                return Err(TemplateError::ForbiddenSubtreeOperator {
                    element: element.trace(),
                    opcode: content.opcode,
                });
            }
            list.content = Some(content.on_scope());
            return Ok(list);
        }

        let promoted = list.attributes.iter().position(|meta| {
            matches!(
                meta.opcode,
                Opcode::Id | Opcode::Src | Opcode::Href | Opcode::Title | Opcode::Value
            )
        });
        if let Some(position) = promoted {
            let meta = list.attributes.remove(position);
            list.inline = Some(meta.on_scope());
            return Ok(list);
        }

        Err(TemplateError::MissingSubtreeOperator {
            element: element.trace(),
        })
    }

    pub fn is_empty(&self) -> bool {
        self.exclude.is_none()
            && self.jump.is_none()
            && self.conditional.is_none()
            && self.inline.is_none()
            && self.content.is_none()
            && self.attributes.is_empty()
    }
}

fn place<E: ElementHandle>(
    slot: &mut Option<OperatorMeta>,
    meta: OperatorMeta,
    element: &E,
    kind: OpcodeType,
) -> Result<(), TemplateError> {
    if slot.is_some() {
        return Err(TemplateError::DuplicateOperator {
            element: element.trace(),
            kind,
        });
    }
    *slot = Some(meta);
    Ok(())
}
