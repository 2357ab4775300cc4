mod array;
mod binary;
mod block;
mod cast;
mod id;
mod lambda;
mod let_in;
mod literals;
mod match_expression;
mod new_spawn;
mod postfix;
mod prefix;
mod struct_init;

pub(crate) use postfix::member_access;

use crate::{
    parser::ast::Expression,
    typechecker::{
        context::Context,
        error::{TypeCheckError, TypeMismatch},
        matcher, TypeCheckable, TypeInformation, TypeResult, TypeValidationError, TypedConstruct,
        ValidatedTypeInformation,
    },
    typechecker::types::Type,
};

impl TypeCheckable for Expression<()> {
    type Typed = Expression<TypeInformation>;

    /// Dispatch per expression kind, then reconcile the hint against the
    /// inferred type. A mismatch is reported and checking continues with
    /// the inferred type so downstream diagnostics still surface; a node
    /// whose bottom-up inference stayed open adopts the hint.
    fn check(self, ctx: &mut Context, hint: Option<&Type>) -> TypeResult<Self::Typed> {
        let checked = match self {
            // Parentheses delegate wholesale; the inner dispatch reconciles.
            Expression::Parens(expr) => {
                return Ok(Expression::Parens(Box::new(expr.check(ctx, hint)?)))
            }
            Expression::Id(id) => Expression::Id(id.check(ctx, hint)?),
            Expression::Num(num) => Expression::Num(num.check(ctx, hint)?),
            Expression::Bool(b) => Expression::Bool(b.check(ctx, hint)?),
            Expression::Null(null) => Expression::Null(null.check(ctx, hint)?),
            Expression::AstString(string) => Expression::AstString(string.check(ctx, hint)?),
            Expression::BinaryString(string) => {
                Expression::BinaryString(string.check(ctx, hint)?)
            }
            Expression::Array(array) => Expression::Array(array.check(ctx, hint)?),
            Expression::StructInit(init) => Expression::StructInit(init.check(ctx, hint)?),
            Expression::Binary(binary) => Expression::Binary(Box::new(binary.check(ctx, hint)?)),
            Expression::Prefix(prefix) => Expression::Prefix(Box::new(prefix.check(ctx, hint)?)),
            Expression::Postfix(postfix) => {
                Expression::Postfix(Box::new(postfix.check(ctx, hint)?))
            }
            Expression::Cast(cast) => Expression::Cast(Box::new(cast.check(ctx, hint)?)),
            Expression::InstanceCheck(check) => {
                Expression::InstanceCheck(Box::new(check.check(ctx, hint)?))
            }
            Expression::New(new) => Expression::New(new.check(ctx, hint)?),
            Expression::Spawn(spawn) => Expression::Spawn(spawn.check(ctx, hint)?),
            Expression::Lambda(lambda) => Expression::Lambda(lambda.check(ctx, hint)?),
            Expression::LetIn(let_in) => Expression::LetIn(Box::new(let_in.check(ctx, hint)?)),
            Expression::Match(match_expr) => {
                Expression::Match(Box::new(match_expr.check(ctx, hint)?))
            }
            Expression::Block(block) => Expression::Block(block.check(ctx, hint)?),
        };

        if let Some(hint) = hint {
            let inferred = { checked.get_info().type_id.borrow().clone() };
            match inferred {
                Some(inferred) => {
                    if inferred.serialize() != hint.serialize() {
                        let outcome = matcher::matches(ctx, hint, &inferred, false);
                        if !outcome.success {
                            ctx.report(TypeCheckError::TypeMismatch(
                                TypeMismatch {
                                    expected: hint.clone(),
                                    actual: inferred,
                                },
                                checked.position(),
                            ));
                        }
                    }
                }
                None => {
                    *checked.get_info().type_id.borrow_mut() = Some(hint.clone());
                }
            }
        }

        Ok(checked)
    }

    fn revert(this: &Self::Typed) -> Self {
        match this {
            Expression::Id(id) => Expression::Id(TypeCheckable::revert(id)),
            Expression::Num(num) => Expression::Num(TypeCheckable::revert(num)),
            Expression::Bool(b) => Expression::Bool(TypeCheckable::revert(b)),
            Expression::Null(null) => Expression::Null(TypeCheckable::revert(null)),
            Expression::AstString(string) => Expression::AstString(TypeCheckable::revert(string)),
            Expression::BinaryString(string) => {
                Expression::BinaryString(TypeCheckable::revert(string))
            }
            Expression::Array(array) => Expression::Array(TypeCheckable::revert(array)),
            Expression::StructInit(init) => Expression::StructInit(TypeCheckable::revert(init)),
            Expression::Binary(binary) => {
                Expression::Binary(Box::new(TypeCheckable::revert(binary.as_ref())))
            }
            Expression::Prefix(prefix) => {
                Expression::Prefix(Box::new(TypeCheckable::revert(prefix.as_ref())))
            }
            Expression::Postfix(postfix) => {
                Expression::Postfix(Box::new(TypeCheckable::revert(postfix.as_ref())))
            }
            Expression::Cast(cast) => {
                Expression::Cast(Box::new(TypeCheckable::revert(cast.as_ref())))
            }
            Expression::InstanceCheck(check) => {
                Expression::InstanceCheck(Box::new(TypeCheckable::revert(check.as_ref())))
            }
            Expression::New(new) => Expression::New(TypeCheckable::revert(new)),
            Expression::Spawn(spawn) => Expression::Spawn(TypeCheckable::revert(spawn)),
            Expression::Lambda(lambda) => Expression::Lambda(TypeCheckable::revert(lambda)),
            Expression::LetIn(let_in) => {
                Expression::LetIn(Box::new(TypeCheckable::revert(let_in.as_ref())))
            }
            Expression::Match(match_expr) => {
                Expression::Match(Box::new(TypeCheckable::revert(match_expr.as_ref())))
            }
            Expression::Block(block) => Expression::Block(TypeCheckable::revert(block)),
            Expression::Parens(expr) => {
                Expression::Parens(Box::new(TypeCheckable::revert(expr.as_ref())))
            }
        }
    }
}

impl TypedConstruct for Expression<TypeInformation> {
    type Validated = Expression<ValidatedTypeInformation>;

    fn validate(self) -> Result<Self::Validated, TypeValidationError> {
        match self {
            Expression::Id(id) => Ok(Expression::Id(id.validate()?)),
            Expression::Num(num) => Ok(Expression::Num(num.validate()?)),
            Expression::Bool(b) => Ok(Expression::Bool(b.validate()?)),
            Expression::Null(null) => Ok(Expression::Null(null.validate()?)),
            Expression::AstString(string) => Ok(Expression::AstString(string.validate()?)),
            Expression::BinaryString(string) => Ok(Expression::BinaryString(string.validate()?)),
            Expression::Array(array) => Ok(Expression::Array(array.validate()?)),
            Expression::StructInit(init) => Ok(Expression::StructInit(init.validate()?)),
            Expression::Binary(binary) => Ok(Expression::Binary(Box::new(binary.validate()?))),
            Expression::Prefix(prefix) => Ok(Expression::Prefix(Box::new(prefix.validate()?))),
            Expression::Postfix(postfix) => {
                Ok(Expression::Postfix(Box::new(postfix.validate()?)))
            }
            Expression::Cast(cast) => Ok(Expression::Cast(Box::new(cast.validate()?))),
            Expression::InstanceCheck(check) => {
                Ok(Expression::InstanceCheck(Box::new(check.validate()?)))
            }
            Expression::New(new) => Ok(Expression::New(new.validate()?)),
            Expression::Spawn(spawn) => Ok(Expression::Spawn(spawn.validate()?)),
            Expression::Lambda(lambda) => Ok(Expression::Lambda(lambda.validate()?)),
            Expression::LetIn(let_in) => Ok(Expression::LetIn(Box::new(let_in.validate()?))),
            Expression::Match(match_expr) => {
                Ok(Expression::Match(Box::new(match_expr.validate()?)))
            }
            Expression::Block(block) => Ok(Expression::Block(block.validate()?)),
            Expression::Parens(expr) => Ok(Expression::Parens(Box::new(expr.validate()?))),
        }
    }
}
