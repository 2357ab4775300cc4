use std::{cell::RefCell, rc::Rc};

use crate::{
    parser::ast::ArrayLiteral,
    typechecker::{
        context::Context, types::Type, TypeCheckable, TypeInformation, TypeResult,
        TypeValidationError, TypedConstruct, ValidatedTypeInformation,
    },
};

impl TypeCheckable for ArrayLiteral<()> {
    type Typed = ArrayLiteral<TypeInformation>;

    /// Element types must agree; a hinted element type (or the first
    /// element) anchors the rest. An empty literal stays open unless a
    /// hint closes it.
    fn check(self, ctx: &mut Context, hint: Option<&Type>) -> TypeResult<Self::Typed> {
        let ArrayLiteral {
            elements, position, ..
        } = self;

        let hinted_element = match hint.map(|h| h.deref(ctx)) {
            Some(Ok(Type::Array(inner))) => Some(*inner),
            _ => None,
        };

        let mut checked = vec![];
        let mut element_type = hinted_element;

        for element in elements {
            let element = element.check(ctx, element_type.as_ref())?;
            if element_type.is_none() {
                element_type = { element.get_info().type_id.borrow().clone() };
            }
            checked.push(element);
        }

        let ty = Type::Array(Box::new(element_type.unwrap_or(Type::Unset)));

        Ok(ArrayLiteral {
            elements: checked,
            info: TypeInformation {
                type_id: Rc::new(RefCell::new(Some(ty))),
                context: ctx.clone(),
            },
            position,
        })
    }

    fn revert(this: &Self::Typed) -> Self {
        ArrayLiteral {
            elements: this.elements.iter().map(TypeCheckable::revert).collect(),
            info: (),
            position: this.position.clone(),
        }
    }
}

impl TypedConstruct for ArrayLiteral<TypeInformation> {
    type Validated = ArrayLiteral<ValidatedTypeInformation>;

    fn validate(self) -> Result<Self::Validated, TypeValidationError> {
        let ArrayLiteral {
            elements,
            info,
            position,
        } = self;

        let mut validated = vec![];
        for element in elements {
            validated.push(element.validate()?);
        }

        Ok(ArrayLiteral {
            elements: validated,
            info: info.validate(&position)?,
            position,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::{cell::RefCell, rc::Rc};

    use anyhow::Result;

    use crate::{
        lexer::Span,
        parser::ast::{ArrayLiteral, Expression, IntKind, Num},
        typechecker::{
            context::Context,
            types::{BasicType, Type},
            TypeCheckable,
        },
    };

    #[test]
    fn test_elements_share_first_type() -> Result<()> {
        let mut ctx = Context::default();

        let array = ArrayLiteral {
            elements: vec![
                Expression::Num(Num::Integer(1, IntKind::Decimal, (), Span::default())),
                Expression::Num(Num::Integer(2, IntKind::Decimal, (), Span::default())),
            ],
            info: (),
            position: Span::default(),
        }
        .check(&mut ctx, None)?;

        assert_eq!(
            array.info.type_id,
            Rc::new(RefCell::new(Some(Type::Array(Box::new(Type::Basic(
                BasicType::U8
            ))))))
        );
        Ok(())
    }

    #[test]
    fn test_hint_anchors_element_type() -> Result<()> {
        let mut ctx = Context::default();
        let hint = Type::Array(Box::new(Type::Basic(BasicType::I64)));

        let array = ArrayLiteral {
            elements: vec![Expression::Num(Num::Integer(
                1,
                IntKind::Decimal,
                (),
                Span::default(),
            ))],
            info: (),
            position: Span::default(),
        }
        .check(&mut ctx, Some(&hint))?;

        assert_eq!(array.info.type_id, Rc::new(RefCell::new(Some(hint))));
        Ok(())
    }
}
