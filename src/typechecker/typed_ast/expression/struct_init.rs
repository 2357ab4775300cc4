use std::{cell::RefCell, rc::Rc};

use crate::{
    parser::ast::{StructInit, StructInitField},
    typechecker::{
        context::Context,
        types::{StructType, Type},
        TypeCheckable, TypeInformation, TypeResult, TypeValidationError, TypedConstruct,
        ValidatedTypeInformation,
    },
};

impl TypeCheckable for StructInit<()> {
    type Typed = StructInit<TypeInformation>;

    /// A struct literal assembles a structural type from its field
    /// initializers; a struct hint contributes per-field hints.
    fn check(self, ctx: &mut Context, hint: Option<&Type>) -> TypeResult<Self::Typed> {
        let StructInit {
            fields, position, ..
        } = self;

        let hinted = match hint.map(|h| h.deref(ctx)) {
            Some(Ok(Type::Struct(s))) => Some(s),
            _ => None,
        };

        let mut checked = vec![];
        let mut field_types = vec![];

        for StructInitField {
            name,
            value,
            position: field_position,
            ..
        } in fields
        {
            let field_hint = hinted.as_ref().and_then(|s| {
                s.fields
                    .iter()
                    .find(|(field, _)| *field == name)
                    .map(|(_, ty)| ty.clone())
            });

            let value = value.check(ctx, field_hint.as_ref())?;
            let ty = { value.get_info().type_id.borrow().clone() }.unwrap_or(Type::Unset);
            field_types.push((name.clone(), ty));

            checked.push(StructInitField {
                name,
                info: value.get_info(),
                value,
                position: field_position,
            });
        }

        Ok(StructInit {
            fields: checked,
            info: TypeInformation {
                type_id: Rc::new(RefCell::new(Some(Type::Struct(StructType {
                    fields: field_types,
                })))),
                context: ctx.clone(),
            },
            position,
        })
    }

    fn revert(this: &Self::Typed) -> Self {
        StructInit {
            fields: this
                .fields
                .iter()
                .map(|field| StructInitField {
                    name: field.name.clone(),
                    value: TypeCheckable::revert(&field.value),
                    info: (),
                    position: field.position.clone(),
                })
                .collect(),
            info: (),
            position: this.position.clone(),
        }
    }
}

impl TypedConstruct for StructInit<TypeInformation> {
    type Validated = StructInit<ValidatedTypeInformation>;

    fn validate(self) -> Result<Self::Validated, TypeValidationError> {
        let StructInit {
            fields,
            info,
            position,
        } = self;

        let mut validated = vec![];
        for field in fields {
            let position = field.position.clone();
            validated.push(StructInitField {
                name: field.name,
                value: field.value.validate()?,
                info: field.info.validate(&position)?,
                position,
            });
        }

        Ok(StructInit {
            fields: validated,
            info: info.validate(&position)?,
            position,
        })
    }
}

#[cfg(test)]
mod tests {
    use anyhow::Result;

    use crate::{
        lexer::Span,
        parser::ast::{Expression, IntKind, Num, StructInit, StructInitField},
        typechecker::{
            context::Context,
            types::{BasicType, StructType, Type},
            TypeCheckable,
        },
    };

    #[test]
    fn test_structural_type_assembly() -> Result<()> {
        let mut ctx = Context::default();

        let init = StructInit {
            fields: vec![StructInitField {
                name: "x".into(),
                value: Expression::Num(Num::Integer(1, IntKind::Decimal, (), Span::default())),
                info: (),
                position: Span::default(),
            }],
            info: (),
            position: Span::default(),
        }
        .check(&mut ctx, None)?;

        assert_eq!(
            { init.info.type_id.borrow().clone() },
            Some(Type::Struct(StructType {
                fields: vec![("x".into(), Type::Basic(BasicType::U8))]
            }))
        );
        Ok(())
    }

    #[test]
    fn test_hint_types_fields() -> Result<()> {
        let mut ctx = Context::default();
        let hint = Type::Struct(StructType {
            fields: vec![("x".into(), Type::Basic(BasicType::I32))],
        });

        let init = StructInit {
            fields: vec![StructInitField {
                name: "x".into(),
                value: Expression::Num(Num::Integer(1, IntKind::Decimal, (), Span::default())),
                info: (),
                position: Span::default(),
            }],
            info: (),
            position: Span::default(),
        }
        .check(&mut ctx, Some(&hint))?;

        assert_eq!({ init.info.type_id.borrow().clone() }, Some(hint));
        Ok(())
    }
}
