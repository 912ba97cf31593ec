use crate::ast::*;
use crate::environment::{Env, EnvId};
use crate::object::{EvalError, Function, Object, BOOLEAN};
use crate::stack::ensure_sufficient_stack;
use std::rc::Rc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EvalConfig {
    /// Deepest chain of nested function calls before `StackOverflow` is raised.
    pub max_depth: usize,
}

impl EvalConfig {
    pub const DEFAULT_MAX_DEPTH: usize = 1024;
}

impl Default for EvalConfig {
    fn default() -> Self {
        Self {
            max_depth: Self::DEFAULT_MAX_DEPTH,
        }
    }
}

/// Evaluate `program` against `env` with the default configuration.
pub fn eval(program: &Program, env: &mut Env) -> Object {
    let mut evaluator = Evaluator::new(std::mem::take(env));
    let result = evaluator.eval(program);
    *env = evaluator.into_env();
    result
}

/// Walks a parsed [`Program`] and produces its value.
///
/// The evaluator owns its environment, so reusing one evaluator across
/// programs keeps earlier `let` bindings visible. Scopes captured by
/// closures are reclaimed between top-level statements once nothing bound
/// reaches them; a function value handed back by [`Evaluator::eval`] stays
/// callable only through a binding.
pub struct Evaluator {
    env: Env,
    config: EvalConfig,
    depth: usize,
}

fn error(err: EvalError) -> Object {
    tracing::debug!(kind = ?err.kind(), "{}", err);
    Object::from(err)
}

// Errors and pending returns both stop the enclosing expression.
fn is_abrupt(obj: &Object) -> bool {
    matches!(obj, Object::Error(_) | Object::ReturnValue(_))
}

impl Evaluator {
    pub fn new(env: Env) -> Self {
        Self {
            env,
            config: EvalConfig::default(),
            depth: 0,
        }
    }

    pub fn with_config(mut self, config: EvalConfig) -> Self {
        self.config = config;
        self
    }

    pub fn env(&self) -> &Env {
        &self.env
    }

    pub fn into_env(self) -> Env {
        self.env
    }

    pub fn eval(&mut self, program: &Program) -> Object {
        self.eval_program(program).unwrap_or(Object::Null)
    }

    /// Evaluate `program`, yielding `None` when it ends with a `let` binding,
    /// which has no value of its own.
    pub fn eval_program(&mut self, program: &Program) -> Option<Object> {
        let global = self.env.global();
        let mut result = None;
        for statement in &program.statements {
            let value = self.eval_statement(statement, global);
            let abrupt = is_abrupt(&value);
            result = match value {
                Object::ReturnValue(value) => Some(*value),
                _ if !abrupt && matches!(statement, Statement::Let { .. }) => None,
                value => Some(value),
            };
            // Only closures leave scopes behind once their call returns.
            if self.env.live_scopes() > 1 {
                self.env.collect(result.iter());
            }
            if abrupt {
                break;
            }
        }
        result
    }

    fn eval_block(&mut self, block: &BlockStatement, scope: EnvId) -> Object {
        let mut result = Object::Null;
        for statement in &block.statements {
            result = self.eval_statement(statement, scope);
            if is_abrupt(&result) {
                return result;
            }
        }
        result
    }

    fn eval_statement(&mut self, statement: &Statement, scope: EnvId) -> Object {
        match statement {
            Statement::Let { name, value } => {
                let value = self.eval_expression(value, scope);
                if is_abrupt(&value) {
                    return value;
                }
                self.env.set(scope, name.clone(), value);
                Object::Null
            }
            Statement::Return(value) => {
                let value = self.eval_expression(value, scope);
                if is_abrupt(&value) {
                    return value;
                }
                Object::ReturnValue(Box::new(value))
            }
            Statement::Expression(expression) => self.eval_expression(expression, scope),
        }
    }

    fn eval_expression(&mut self, expression: &Expression, scope: EnvId) -> Object {
        ensure_sufficient_stack(|| match expression {
            Expression::Identifier(name) => eval_identifier(&self.env, scope, name),
            Expression::Integer(value) => Object::Integer(*value),
            Expression::Boolean(value) => Object::from(*value),
            Expression::Prefix { operator, right } => {
                let right = self.eval_expression(right, scope);
                if is_abrupt(&right) {
                    return right;
                }
                eval_prefix_expression(*operator, &right)
            }
            Expression::Infix {
                operator,
                left,
                right,
            } => {
                let left = self.eval_expression(left, scope);
                if is_abrupt(&left) {
                    return left;
                }
                let right = self.eval_expression(right, scope);
                if is_abrupt(&right) {
                    return right;
                }
                eval_infix_expression(*operator, &left, &right)
            }
            Expression::If {
                condition,
                consequence,
                alternative,
            } => self.eval_if_expression(condition, consequence, alternative.as_ref(), scope),
            Expression::Function { parameters, body } => {
                self.env.capture(scope);
                Object::Function(Rc::new(Function {
                    parameters: parameters.clone(),
                    body: Rc::clone(body),
                    env: scope,
                }))
            }
            Expression::Call {
                function,
                arguments,
            } => self.eval_call_expression(function, arguments, scope),
        })
    }

    fn eval_if_expression(
        &mut self,
        condition: &Expression,
        consequence: &BlockStatement,
        alternative: Option<&BlockStatement>,
        scope: EnvId,
    ) -> Object {
        let condition = self.eval_expression(condition, scope);
        if is_abrupt(&condition) {
            return condition;
        }

        if condition.is_truthy() {
            self.eval_block(consequence, scope)
        } else if let Some(alternative) = alternative {
            self.eval_block(alternative, scope)
        } else {
            Object::Null
        }
    }

    fn eval_call_expression(
        &mut self,
        function: &Expression,
        arguments: &[Expression],
        scope: EnvId,
    ) -> Object {
        let callee = self.eval_expression(function, scope);
        if is_abrupt(&callee) {
            return callee;
        }
        let function = match callee {
            Object::Function(function) => function,
            other => return error(EvalError::NotAFunction(other.type_name())),
        };

        let mut args = Vec::with_capacity(arguments.len());
        for argument in arguments {
            let value = self.eval_expression(argument, scope);
            if is_abrupt(&value) {
                return value;
            }
            args.push(value);
        }

        self.apply_function(&function, args)
    }

    fn apply_function(&mut self, function: &Function, args: Vec<Object>) -> Object {
        if args.len() != function.parameters.len() {
            return error(EvalError::ArityMismatch {
                expected: function.parameters.len(),
                got: args.len(),
            });
        }
        if self.depth >= self.config.max_depth {
            return error(EvalError::StackOverflow(self.config.max_depth));
        }
        tracing::trace!(depth = self.depth, params = ?function.parameters, "call");

        let scope = self.env.new_enclosed(function.env);
        for (name, value) in function.parameters.iter().zip(args) {
            self.env.set(scope, name.clone(), value);
        }

        self.depth += 1;
        let result = self.eval_block(&function.body, scope);
        self.depth -= 1;
        self.env.release(scope);

        match result {
            Object::ReturnValue(value) => *value,
            other => other,
        }
    }
}

fn eval_identifier(env: &Env, scope: EnvId, name: &str) -> Object {
    match env.get(scope, name) {
        Some(value) => value,
        None => error(EvalError::UnboundIdentifier(name.to_string())),
    }
}

fn eval_prefix_expression(operator: Prefix, right: &Object) -> Object {
    match operator {
        Prefix::Bang => eval_bang_operator_expression(right),
        Prefix::Minus => eval_minus_operator_expression(right),
    }
}

fn eval_bang_operator_expression(right: &Object) -> Object {
    match right {
        Object::Boolean(true) => Object::FALSE,
        Object::Boolean(false) | Object::Null => Object::TRUE,
        _ => Object::FALSE,
    }
}

fn eval_minus_operator_expression(right: &Object) -> Object {
    match right {
        Object::Integer(value) => Object::Integer(value.wrapping_neg()),
        _ => error(EvalError::UnknownPrefixOperator {
            operator: Prefix::Minus,
            right: right.type_name(),
        }),
    }
}

fn eval_infix_expression(operator: Infix, left: &Object, right: &Object) -> Object {
    match (left, right) {
        (Object::Integer(left), Object::Integer(right)) => {
            eval_integer_infix_expression(operator, *left, *right)
        }
        (Object::Boolean(left), Object::Boolean(right)) => {
            eval_boolean_infix_expression(operator, *left, *right)
        }
        _ if left.type_name() != right.type_name() => error(EvalError::TypeMismatch {
            left: left.type_name(),
            operator,
            right: right.type_name(),
        }),
        _ => error(EvalError::UnknownInfixOperator {
            left: left.type_name(),
            operator,
            right: right.type_name(),
        }),
    }
}

fn eval_integer_infix_expression(operator: Infix, left: i64, right: i64) -> Object {
    match operator {
        Infix::Plus => Object::Integer(left.wrapping_add(right)),
        Infix::Minus => Object::Integer(left.wrapping_sub(right)),
        Infix::Asterisk => Object::Integer(left.wrapping_mul(right)),
        Infix::Slash if right == 0 => error(EvalError::DivisionByZero),
        Infix::Slash => Object::Integer(left.wrapping_div(right)),
        Infix::LessThan => Object::from(left < right),
        Infix::GreaterThan => Object::from(left > right),
        Infix::Equal => Object::from(left == right),
        Infix::NotEqual => Object::from(left != right),
    }
}

fn eval_boolean_infix_expression(operator: Infix, left: bool, right: bool) -> Object {
    match operator {
        Infix::Equal => Object::from(left == right),
        Infix::NotEqual => Object::from(left != right),
        _ => error(EvalError::UnknownInfixOperator {
            left: BOOLEAN,
            operator,
            right: BOOLEAN,
        }),
    }
}
