mod assignment;
mod control_flow;
mod ffi_declaration;
mod function_declaration;
mod if_statement;
mod loops;
mod type_declaration;
mod variable_declaration;

use crate::{
    parser::ast::{Statement, TopLevelStatement},
    typechecker::{
        context::Context, types::Type, ShallowCheck, TypeCheckable, TypeInformation, TypeResult,
        TypeValidationError, TypedConstruct, ValidatedTypeInformation,
    },
};

impl TypeCheckable for Statement<()> {
    type Typed = Statement<TypeInformation>;

    fn check(self, ctx: &mut Context, hint: Option<&Type>) -> TypeResult<Self::Typed> {
        match self {
            Statement::Expression(expression) => {
                Ok(Statement::Expression(expression.check(ctx, None)?))
            }
            Statement::YieldingExpression(expression) => Ok(Statement::YieldingExpression(
                expression.check(ctx, hint)?,
            )),
            Statement::VariableDeclaration(declaration) => Ok(Statement::VariableDeclaration(
                declaration.check(ctx, None)?,
            )),
            Statement::Assignment(assignment) => {
                Ok(Statement::Assignment(assignment.check(ctx, None)?))
            }
            Statement::Return(statement) => Ok(Statement::Return(statement.check(ctx, None)?)),
            Statement::Break(statement) => Ok(Statement::Break(statement.check(ctx, None)?)),
            Statement::Continue(statement) => {
                Ok(Statement::Continue(statement.check(ctx, None)?))
            }
            Statement::If(statement) => Ok(Statement::If(statement.check(ctx, None)?)),
            Statement::While(statement) => Ok(Statement::While(statement.check(ctx, None)?)),
            Statement::DoWhile(statement) => {
                Ok(Statement::DoWhile(statement.check(ctx, None)?))
            }
            Statement::For(statement) => {
                Ok(Statement::For(Box::new(statement.check(ctx, None)?)))
            }
            // Foreach lowers itself into the plain loop forms; the checked
            // result is whatever shape the desugaring produced.
            Statement::Foreach(statement) => statement.check_statement(ctx),
            Statement::Match(match_expression) => Ok(Statement::Match(Box::new(
                match_expression.check_match(ctx, None, true)?,
            ))),
            Statement::Function(declaration) => {
                Ok(Statement::Function(declaration.check(ctx, None)?))
            }
            Statement::Block(block) => Ok(Statement::Block(block.check(ctx, None)?)),
        }
    }

    fn revert(this: &Self::Typed) -> Self {
        match this {
            Statement::Expression(expression) => {
                Statement::Expression(TypeCheckable::revert(expression))
            }
            Statement::YieldingExpression(expression) => {
                Statement::YieldingExpression(TypeCheckable::revert(expression))
            }
            Statement::VariableDeclaration(declaration) => {
                Statement::VariableDeclaration(TypeCheckable::revert(declaration))
            }
            Statement::Assignment(assignment) => {
                Statement::Assignment(TypeCheckable::revert(assignment))
            }
            Statement::Return(statement) => Statement::Return(TypeCheckable::revert(statement)),
            Statement::Break(statement) => Statement::Break(TypeCheckable::revert(statement)),
            Statement::Continue(statement) => {
                Statement::Continue(TypeCheckable::revert(statement))
            }
            Statement::If(statement) => Statement::If(TypeCheckable::revert(statement)),
            Statement::While(statement) => Statement::While(TypeCheckable::revert(statement)),
            Statement::DoWhile(statement) => {
                Statement::DoWhile(TypeCheckable::revert(statement))
            }
            Statement::For(statement) => {
                Statement::For(Box::new(TypeCheckable::revert(statement.as_ref())))
            }
            Statement::Foreach(statement) => {
                Statement::Foreach(Box::new(TypeCheckable::revert(statement.as_ref())))
            }
            Statement::Match(match_expression) => {
                Statement::Match(Box::new(TypeCheckable::revert(match_expression.as_ref())))
            }
            Statement::Function(declaration) => {
                Statement::Function(TypeCheckable::revert(declaration))
            }
            Statement::Block(block) => Statement::Block(TypeCheckable::revert(block)),
        }
    }
}

impl TypedConstruct for Statement<TypeInformation> {
    type Validated = Statement<ValidatedTypeInformation>;

    fn validate(self) -> Result<Self::Validated, TypeValidationError> {
        match self {
            Statement::Expression(expression) => {
                Ok(Statement::Expression(expression.validate()?))
            }
            Statement::YieldingExpression(expression) => {
                Ok(Statement::YieldingExpression(expression.validate()?))
            }
            Statement::VariableDeclaration(declaration) => {
                Ok(Statement::VariableDeclaration(declaration.validate()?))
            }
            Statement::Assignment(assignment) => {
                Ok(Statement::Assignment(assignment.validate()?))
            }
            Statement::Return(statement) => Ok(Statement::Return(statement.validate()?)),
            Statement::Break(statement) => Ok(Statement::Break(statement.validate()?)),
            Statement::Continue(statement) => Ok(Statement::Continue(statement.validate()?)),
            Statement::If(statement) => Ok(Statement::If(statement.validate()?)),
            Statement::While(statement) => Ok(Statement::While(statement.validate()?)),
            Statement::DoWhile(statement) => Ok(Statement::DoWhile(statement.validate()?)),
            Statement::For(statement) => Ok(Statement::For(Box::new(statement.validate()?))),
            Statement::Foreach(statement) => {
                Ok(Statement::Foreach(Box::new(statement.validate()?)))
            }
            Statement::Match(match_expression) => {
                Ok(Statement::Match(Box::new(match_expression.validate()?)))
            }
            Statement::Function(declaration) => {
                Ok(Statement::Function(declaration.validate()?))
            }
            Statement::Block(block) => Ok(Statement::Block(block.validate()?)),
        }
    }
}

impl TypeCheckable for TopLevelStatement<()> {
    type Typed = TopLevelStatement<TypeInformation>;

    fn check(self, ctx: &mut Context, _hint: Option<&Type>) -> TypeResult<Self::Typed> {
        match self {
            TopLevelStatement::Function(declaration) => {
                Ok(TopLevelStatement::Function(declaration.check(ctx, None)?))
            }
            TopLevelStatement::TypeDeclaration(declaration) => Ok(
                TopLevelStatement::TypeDeclaration(declaration.check(ctx, None)?),
            ),
            TopLevelStatement::Ffi(declaration) => {
                Ok(TopLevelStatement::Ffi(declaration.check(ctx, None)?))
            }
            TopLevelStatement::VariableDeclaration(declaration) => Ok(
                TopLevelStatement::VariableDeclaration(declaration.check(ctx, None)?),
            ),
        }
    }

    fn revert(this: &Self::Typed) -> Self {
        match this {
            TopLevelStatement::Function(declaration) => {
                TopLevelStatement::Function(TypeCheckable::revert(declaration))
            }
            TopLevelStatement::TypeDeclaration(declaration) => {
                TopLevelStatement::TypeDeclaration(TypeCheckable::revert(declaration))
            }
            TopLevelStatement::Ffi(declaration) => {
                TopLevelStatement::Ffi(TypeCheckable::revert(declaration))
            }
            TopLevelStatement::VariableDeclaration(declaration) => {
                TopLevelStatement::VariableDeclaration(TypeCheckable::revert(declaration))
            }
        }
    }
}

impl ShallowCheck for TopLevelStatement<()> {
    fn shallow_check(&self, ctx: &mut Context) -> TypeResult<()> {
        match self {
            TopLevelStatement::Function(declaration) => declaration.shallow_check(ctx),
            TopLevelStatement::TypeDeclaration(declaration) => declaration.shallow_check(ctx),
            TopLevelStatement::Ffi(declaration) => declaration.shallow_check(ctx),
            TopLevelStatement::VariableDeclaration(_) => Ok(()),
        }
    }
}

impl TypedConstruct for TopLevelStatement<TypeInformation> {
    type Validated = TopLevelStatement<ValidatedTypeInformation>;

    fn validate(self) -> Result<Self::Validated, TypeValidationError> {
        match self {
            TopLevelStatement::Function(declaration) => {
                Ok(TopLevelStatement::Function(declaration.validate()?))
            }
            TopLevelStatement::TypeDeclaration(declaration) => Ok(
                TopLevelStatement::TypeDeclaration(declaration.validate()?),
            ),
            TopLevelStatement::Ffi(declaration) => {
                Ok(TopLevelStatement::Ffi(declaration.validate()?))
            }
            TopLevelStatement::VariableDeclaration(declaration) => Ok(
                TopLevelStatement::VariableDeclaration(declaration.validate()?),
            ),
        }
    }
}
