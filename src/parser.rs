use crate::ast::*;
use crate::lexer::{Lexer, Token, TokenKind};
use crate::stack::ensure_sufficient_stack;
use crate::trace::{LogTracer, NoopTracer, Tracer};
use std::rc::Rc;
use thiserror::Error;

#[derive(Debug, PartialEq, Eq, Clone, Copy, PartialOrd, Ord)]
pub enum Precedence {
    Lowest,
    Equals,      // == !=
    LessGreater, // < >
    Sum,         // + -
    Product,     // * /
    Prefix,      // -x !x
    Call,        // f(x)
}

fn token_to_precedence(kind: TokenKind) -> Precedence {
    match kind {
        TokenKind::Equal | TokenKind::NotEqual => Precedence::Equals,
        TokenKind::LessThan | TokenKind::GreaterThan => Precedence::LessGreater,
        TokenKind::Plus | TokenKind::Minus => Precedence::Sum,
        TokenKind::Asterisk | TokenKind::Slash => Precedence::Product,
        TokenKind::LeftParen => Precedence::Call,
        _ => Precedence::Lowest,
    }
}

#[derive(Debug, PartialEq, Eq, Clone, Error)]
pub enum ParseError {
    #[error("expected next token to be {want}. got {got} instead")]
    UnexpectedToken { want: TokenKind, got: TokenKind },
    #[error("no prefix parse function for {0}")]
    NoPrefixParseFn(TokenKind),
    #[error("could not parse {0} as integer")]
    InvalidInteger(String),
}

pub type ParseErrors = Vec<ParseError>;

type PrefixParseFn<I, T> = fn(&mut Parser<I, T>) -> Option<Expression>;
type InfixParseFn<I, T> = fn(&mut Parser<I, T>, Expression) -> Option<Expression>;

/// Parse a whole token stream, returning the (possibly partial) program and
/// every error met along the way. The program must not be evaluated when
/// the error list is non-empty.
pub fn parse<S>(tokens: S) -> (Program, ParseErrors)
where
    S: IntoIterator<Item = Token>,
{
    finish(Parser::new(tokens))
}

/// Lex and parse `source`, logging every grammar rule when `trace` is set.
pub fn parse_source(source: &str, trace: bool) -> (Program, ParseErrors) {
    let parser = Parser::new(Lexer::new(source));
    if trace {
        finish(parser.with_tracer(LogTracer))
    } else {
        finish(parser)
    }
}

fn finish<I, T>(mut parser: Parser<I, T>) -> (Program, ParseErrors)
where
    I: Iterator<Item = Token>,
    T: Tracer,
{
    let program = parser.parse_program();
    (program, parser.errors)
}

pub struct Parser<I, T = NoopTracer> {
    tokens: I,
    curr: Token,
    peek: Token,
    errors: ParseErrors,
    tracer: T,
    depth: usize,
}

impl<I> Parser<I, NoopTracer>
where
    I: Iterator<Item = Token>,
{
    pub fn new<S>(tokens: S) -> Self
    where
        S: IntoIterator<Item = Token, IntoIter = I>,
    {
        let mut parser = Parser {
            tokens: tokens.into_iter(),
            curr: Token::eof(),
            peek: Token::eof(),
            errors: Vec::new(),
            tracer: NoopTracer,
            depth: 0,
        };
        parser.next_token();
        parser.next_token();
        parser
    }
}

impl<I, T> Parser<I, T>
where
    I: Iterator<Item = Token>,
    T: Tracer,
{
    /// Replace the tracer that observes grammar rule entry and exit.
    pub fn with_tracer<U: Tracer>(self, tracer: U) -> Parser<I, U> {
        Parser {
            tokens: self.tokens,
            curr: self.curr,
            peek: self.peek,
            errors: self.errors,
            tracer,
            depth: self.depth,
        }
    }

    pub fn tracer(&self) -> &T {
        &self.tracer
    }

    fn next_token(&mut self) {
        let next = self.tokens.next().unwrap_or_else(Token::eof);
        self.curr = std::mem::replace(&mut self.peek, next);
    }

    fn traced<R>(&mut self, rule: &'static str, f: impl FnOnce(&mut Self) -> R) -> R {
        self.tracer.enter(rule, self.depth);
        self.depth += 1;
        let result = f(self);
        self.depth -= 1;
        self.tracer.exit(rule, self.depth);
        result
    }

    fn prefix_parse_fn(kind: TokenKind) -> Option<PrefixParseFn<I, T>> {
        let prefix: PrefixParseFn<I, T> = match kind {
            TokenKind::Ident => Self::parse_identifier,
            TokenKind::Int => Self::parse_integer_literal,
            TokenKind::True | TokenKind::False => Self::parse_boolean,
            TokenKind::Bang | TokenKind::Minus => Self::parse_prefix_expression,
            TokenKind::LeftParen => Self::parse_grouped_expression,
            TokenKind::If => Self::parse_if_expression,
            TokenKind::Function => Self::parse_function_literal,
            _ => return None,
        };
        Some(prefix)
    }

    fn infix_parse_fn(kind: TokenKind) -> Option<InfixParseFn<I, T>> {
        let infix: InfixParseFn<I, T> = match kind {
            TokenKind::Plus
            | TokenKind::Minus
            | TokenKind::Asterisk
            | TokenKind::Slash
            | TokenKind::LessThan
            | TokenKind::GreaterThan
            | TokenKind::Equal
            | TokenKind::NotEqual => Self::parse_infix_expression,
            TokenKind::LeftParen => Self::parse_call_expression,
            _ => return None,
        };
        Some(infix)
    }

    pub fn parse_program(&mut self) -> Program {
        let mut program = Program::default();
        while !self.curr_token_is(TokenKind::Eof) {
            if let Some(statement) = self.parse_statement() {
                program.statements.push(statement);
            }
            self.next_token();
        }
        program
    }

    fn parse_statement(&mut self) -> Option<Statement> {
        self.traced("parse_statement", |p| match p.curr.kind {
            TokenKind::Let => p.parse_let_statement(),
            TokenKind::Return => p.parse_return_statement(),
            _ => p.parse_expression_statement(),
        })
    }

    fn parse_let_statement(&mut self) -> Option<Statement> {
        self.traced("parse_let_statement", |p| {
            if !p.expect_peek(TokenKind::Ident) {
                return None;
            }
            let name = p.curr.literal.clone();

            if !p.expect_peek(TokenKind::Assign) {
                return None;
            }
            p.next_token();

            let value = p.parse_expression(Precedence::Lowest)?;
            p.skip_semicolon();

            Some(Statement::Let { name, value })
        })
    }

    fn parse_return_statement(&mut self) -> Option<Statement> {
        self.traced("parse_return_statement", |p| {
            p.next_token();
            let value = p.parse_expression(Precedence::Lowest)?;
            p.skip_semicolon();

            Some(Statement::Return(value))
        })
    }

    fn parse_expression_statement(&mut self) -> Option<Statement> {
        self.traced("parse_expression_statement", |p| {
            let expr = p.parse_expression(Precedence::Lowest)?;
            p.skip_semicolon();

            Some(Statement::Expression(expr))
        })
    }

    fn skip_semicolon(&mut self) {
        if self.peek_token_is(TokenKind::SemiColon) {
            self.next_token();
        }
    }

    fn curr_token_is(&self, kind: TokenKind) -> bool {
        self.curr.kind == kind
    }

    fn peek_token_is(&self, kind: TokenKind) -> bool {
        self.peek.kind == kind
    }

    fn peek_error(&mut self, kind: TokenKind) {
        self.errors.push(ParseError::UnexpectedToken {
            want: kind,
            got: self.peek.kind,
        });
    }

    fn expect_peek(&mut self, kind: TokenKind) -> bool {
        if self.peek_token_is(kind) {
            self.next_token();
            true
        } else {
            self.peek_error(kind);
            false
        }
    }

    fn peek_precedence(&self) -> Precedence {
        token_to_precedence(self.peek.kind)
    }

    fn curr_precedence(&self) -> Precedence {
        token_to_precedence(self.curr.kind)
    }

    fn no_prefix_parse_fn_error(&mut self, kind: TokenKind) {
        self.errors.push(ParseError::NoPrefixParseFn(kind));
    }

    fn parse_expression(&mut self, precedence: Precedence) -> Option<Expression> {
        ensure_sufficient_stack(|| {
            self.traced("parse_expression", |p| {
                let prefix = match Self::prefix_parse_fn(p.curr.kind) {
                    Some(prefix) => prefix,
                    None => {
                        p.no_prefix_parse_fn_error(p.curr.kind);
                        return None;
                    }
                };
                let mut left = prefix(p)?;

                while !p.peek_token_is(TokenKind::SemiColon) && precedence < p.peek_precedence() {
                    let infix = match Self::infix_parse_fn(p.peek.kind) {
                        Some(infix) => infix,
                        None => return Some(left),
                    };
                    p.next_token();
                    left = infix(p, left)?;
                }

                Some(left)
            })
        })
    }

    fn parse_identifier(&mut self) -> Option<Expression> {
        self.traced("parse_identifier", |p| {
            Some(Expression::Identifier(p.curr.literal.clone()))
        })
    }

    fn parse_integer_literal(&mut self) -> Option<Expression> {
        self.traced("parse_integer_literal", |p| match p.curr.literal.parse::<i64>() {
            Ok(value) => Some(Expression::Integer(value)),
            Err(_) => {
                p.errors
                    .push(ParseError::InvalidInteger(p.curr.literal.clone()));
                None
            }
        })
    }

    fn parse_boolean(&mut self) -> Option<Expression> {
        self.traced("parse_boolean", |p| {
            Some(Expression::Boolean(p.curr_token_is(TokenKind::True)))
        })
    }

    fn parse_prefix_expression(&mut self) -> Option<Expression> {
        self.traced("parse_prefix_expression", |p| {
            let operator = match p.curr.kind {
                TokenKind::Bang => Prefix::Bang,
                TokenKind::Minus => Prefix::Minus,
                _ => return None,
            };

            p.next_token();
            let right = p.parse_expression(Precedence::Prefix)?;

            Some(Expression::Prefix {
                operator,
                right: Box::new(right),
            })
        })
    }

    fn parse_infix_expression(&mut self, left: Expression) -> Option<Expression> {
        self.traced("parse_infix_expression", |p| {
            let operator = match p.curr.kind {
                TokenKind::Plus => Infix::Plus,
                TokenKind::Minus => Infix::Minus,
                TokenKind::Asterisk => Infix::Asterisk,
                TokenKind::Slash => Infix::Slash,
                TokenKind::LessThan => Infix::LessThan,
                TokenKind::GreaterThan => Infix::GreaterThan,
                TokenKind::Equal => Infix::Equal,
                TokenKind::NotEqual => Infix::NotEqual,
                _ => return None,
            };

            let precedence = p.curr_precedence();
            p.next_token();
            let right = p.parse_expression(precedence)?;

            Some(Expression::Infix {
                operator,
                left: Box::new(left),
                right: Box::new(right),
            })
        })
    }

    fn parse_grouped_expression(&mut self) -> Option<Expression> {
        self.traced("parse_grouped_expression", |p| {
            p.next_token();
            let expr = p.parse_expression(Precedence::Lowest)?;
            if !p.expect_peek(TokenKind::RightParen) {
                return None;
            }
            Some(expr)
        })
    }

    fn parse_if_expression(&mut self) -> Option<Expression> {
        self.traced("parse_if_expression", |p| {
            if !p.expect_peek(TokenKind::LeftParen) {
                return None;
            }
            p.next_token();
            let condition = p.parse_expression(Precedence::Lowest)?;

            if !p.expect_peek(TokenKind::RightParen) || !p.expect_peek(TokenKind::LeftBrace) {
                return None;
            }
            let consequence = p.parse_block_statement();

            let mut alternative = None;
            if p.peek_token_is(TokenKind::Else) {
                p.next_token();
                if !p.expect_peek(TokenKind::LeftBrace) {
                    return None;
                }
                alternative = Some(p.parse_block_statement());
            }

            Some(Expression::If {
                condition: Box::new(condition),
                consequence,
                alternative,
            })
        })
    }

    // Starts on '{' and ends on '}' (or EOF when the block is unterminated).
    fn parse_block_statement(&mut self) -> BlockStatement {
        self.traced("parse_block_statement", |p| {
            let mut block = BlockStatement::default();
            p.next_token();

            while !p.curr_token_is(TokenKind::RightBrace) && !p.curr_token_is(TokenKind::Eof) {
                if let Some(statement) = p.parse_statement() {
                    block.statements.push(statement);
                }
                p.next_token();
            }

            block
        })
    }

    fn parse_function_literal(&mut self) -> Option<Expression> {
        self.traced("parse_function_literal", |p| {
            if !p.expect_peek(TokenKind::LeftParen) {
                return None;
            }
            let parameters = p.parse_function_parameters()?;

            if !p.expect_peek(TokenKind::LeftBrace) {
                return None;
            }
            let body = p.parse_block_statement();

            Some(Expression::Function {
                parameters,
                body: Rc::new(body),
            })
        })
    }

    fn parse_function_parameters(&mut self) -> Option<Vec<Identifier>> {
        self.traced("parse_function_parameters", |p| {
            let mut params = vec![];
            if p.peek_token_is(TokenKind::RightParen) {
                p.next_token();
                return Some(params);
            }

            if !p.expect_peek(TokenKind::Ident) {
                return None;
            }
            params.push(p.curr.literal.clone());

            while p.peek_token_is(TokenKind::Comma) {
                p.next_token();
                if !p.expect_peek(TokenKind::Ident) {
                    return None;
                }
                params.push(p.curr.literal.clone());
            }

            if !p.expect_peek(TokenKind::RightParen) {
                return None;
            }
            Some(params)
        })
    }

    fn parse_call_expression(&mut self, function: Expression) -> Option<Expression> {
        self.traced("parse_call_expression", |p| {
            let arguments = p.parse_call_arguments()?;
            Some(Expression::Call {
                function: Box::new(function),
                arguments,
            })
        })
    }

    fn parse_call_arguments(&mut self) -> Option<Vec<Expression>> {
        self.traced("parse_call_arguments", |p| {
            let mut arguments = vec![];
            if p.peek_token_is(TokenKind::RightParen) {
                p.next_token();
                return Some(arguments);
            }

            p.next_token();
            arguments.push(p.parse_expression(Precedence::Lowest)?);

            while p.peek_token_is(TokenKind::Comma) {
                p.next_token();
                p.next_token();
                arguments.push(p.parse_expression(Precedence::Lowest)?);
            }

            if !p.expect_peek(TokenKind::RightParen) {
                return None;
            }
            Some(arguments)
        })
    }
}

#[cfg(test)]
mod tests;
