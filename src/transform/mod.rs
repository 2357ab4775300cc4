//! AST desugaring helpers. These construct the lowered shapes the rest of
//! the pipeline understands without special cases: `foreach` becomes a
//! plain `for` (counted over arrays, protocol driven otherwise) and match
//! arm blocks become yielding expressions. The statement checker invokes
//! the foreach rewrites once the iterable's kind is known; the produced
//! nodes are fresh and untyped so they re-enter inference normally.

use crate::lexer::Span;
use crate::parser::ast::{
    Assignment, BinaryExpression, BinaryOperator, Block, Expression, ForLoop, ForeachLoop, Id,
    IntKind, MatchArmBody, Num, Postfix, Statement, TypeName, VariableDeclaration,
};

pub(crate) fn int(value: u64, position: &Span) -> Expression<()> {
    Expression::Num(Num::Integer(value, IntKind::Decimal, (), position.clone()))
}

pub(crate) fn binary(
    left: Expression<()>,
    operator: BinaryOperator,
    right: Expression<()>,
    position: &Span,
) -> Expression<()> {
    Expression::Binary(Box::new(BinaryExpression {
        left,
        right,
        operator,
        info: (),
        position: position.clone(),
    }))
}

pub(crate) fn property(expr: Expression<()>, name: &str, position: &Span) -> Expression<()> {
    Expression::Postfix(Box::new(Postfix::Property {
        expr,
        property: name.to_string(),
        info: (),
        position: position.clone(),
    }))
}

pub(crate) fn call(expr: Expression<()>, args: Vec<Expression<()>>, position: &Span) -> Expression<()> {
    Expression::Postfix(Box::new(Postfix::Call {
        expr,
        args,
        info: (),
        position: position.clone(),
    }))
}

pub(crate) fn index(expr: Expression<()>, idx: Expression<()>, position: &Span) -> Expression<()> {
    Expression::Postfix(Box::new(Postfix::Index {
        expr,
        index: idx,
        overload: None,
        info: (),
        position: position.clone(),
    }))
}

pub(crate) fn declare(
    id: Id<()>,
    mutable: bool,
    type_name: Option<TypeName>,
    value: Expression<()>,
    position: &Span,
) -> Statement<()> {
    Statement::VariableDeclaration(VariableDeclaration {
        id,
        mutable,
        constant: false,
        strict: false,
        type_name,
        value,
        info: (),
        position: position.clone(),
    })
}

/// `foreach (i, v in xs)` over an array becomes a counted `for` over
/// `xs.length` with `v = xs[i]` at the top of the body.
pub fn foreach_to_counted_for(foreach: ForeachLoop<()>) -> Statement<()> {
    let ForeachLoop {
        index: index_id,
        value,
        iterable,
        block,
        position,
        ..
    } = foreach;

    let index_id = index_id.unwrap_or_else(|| Id::new("__idx", position.clone()));

    let init = declare(
        index_id.clone(),
        true,
        Some(TypeName::named("u64", position.clone())),
        int(0, &position),
        &position,
    );

    let condition = binary(
        Expression::Id(index_id.clone()),
        BinaryOperator::LessThan,
        property(iterable.clone(), "length", &position),
        &position,
    );

    let update = Statement::Assignment(Assignment {
        target: Expression::Id(index_id.clone()),
        value: binary(
            Expression::Id(index_id.clone()),
            BinaryOperator::Add,
            int(1, &position),
            &position,
        ),
        info: (),
        position: position.clone(),
    });

    let mut statements = vec![declare(
        value,
        false,
        None,
        index(iterable, Expression::Id(index_id), &position),
        &position,
    )];
    statements.extend(block.statements);

    Statement::For(Box::new(ForLoop {
        init: Some(init),
        condition,
        update: Some(update),
        block: Block {
            statements,
            info: (),
            position: block.position,
        },
        info: (),
        position,
    }))
}

/// `foreach` over a type exposing `getIterable()` becomes a block that
/// drives the `hasNext()` / `next()` protocol; the optional index is a
/// counter bumped at the end of each round.
pub fn foreach_to_iterator_loop(foreach: ForeachLoop<()>) -> Statement<()> {
    let ForeachLoop {
        index: index_id,
        value,
        iterable,
        block,
        position,
        ..
    } = foreach;

    let iter_id = Id::new("__iter", position.clone());

    let mut statements = vec![declare(
        iter_id.clone(),
        false,
        None,
        call(property(iterable, "getIterable", &position), vec![], &position),
        &position,
    )];

    if let Some(index_id) = &index_id {
        statements.push(declare(
            index_id.clone(),
            true,
            Some(TypeName::named("u64", position.clone())),
            int(0, &position),
            &position,
        ));
    }

    let condition = call(
        property(Expression::Id(iter_id.clone()), "hasNext", &position),
        vec![],
        &position,
    );

    let mut body = vec![declare(
        value,
        false,
        None,
        call(
            property(Expression::Id(iter_id), "next", &position),
            vec![],
            &position,
        ),
        &position,
    )];
    body.extend(block.statements);

    if let Some(index_id) = index_id {
        body.push(Statement::Assignment(Assignment {
            target: Expression::Id(index_id.clone()),
            value: binary(
                Expression::Id(index_id),
                BinaryOperator::Add,
                int(1, &position),
                &position,
            ),
            info: (),
            position: position.clone(),
        }));
    }

    statements.push(Statement::While(crate::parser::ast::WhileLoop {
        condition,
        block: Block {
            statements: body,
            info: (),
            position: block.position.clone(),
        },
        info: (),
        position: position.clone(),
    }));

    Statement::Block(Block {
        statements,
        info: (),
        position,
    })
}

/// Match arm bodies in expression position must be expressions; block
/// bodies become block expressions.
pub fn arm_body_to_expression(body: MatchArmBody<()>) -> Expression<()> {
    match body {
        MatchArmBody::Expression(expression) => expression,
        MatchArmBody::Block(block) => Expression::Block(block),
    }
}
