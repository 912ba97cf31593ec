use crate::ast::{BlockStatement, Identifier, Infix, Prefix};
use crate::environment::EnvId;
use std::fmt;
use std::rc::Rc;
use thiserror::Error;

pub const INTEGER: &str = "INTEGER";
pub const BOOLEAN: &str = "BOOLEAN";
pub const NULL: &str = "NULL";
pub const RETURN_VALUE: &str = "RETURN_VALUE";
pub const ERROR: &str = "ERROR";
pub const FUNCTION: &str = "FUNCTION";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    UnboundIdentifier,
    UnknownOperator,
    TypeMismatch,
    NotAFunction,
    ArityMismatch,
    DivisionByZero,
    StackOverflow,
}

/// A failure raised while evaluating. Carried through evaluation as
/// [`Object::Error`] rather than unwinding.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EvalError {
    #[error("identifier not found: {0}")]
    UnboundIdentifier(String),
    #[error("unknown operator: {operator}{right}")]
    UnknownPrefixOperator {
        operator: Prefix,
        right: &'static str,
    },
    #[error("unknown operator: {left} {operator} {right}")]
    UnknownInfixOperator {
        left: &'static str,
        operator: Infix,
        right: &'static str,
    },
    #[error("type mismatch: {left} {operator} {right}")]
    TypeMismatch {
        left: &'static str,
        operator: Infix,
        right: &'static str,
    },
    #[error("not a function: {0}")]
    NotAFunction(&'static str),
    #[error("expected {expected} arguments. got={got}")]
    ArityMismatch { expected: usize, got: usize },
    #[error("division by zero")]
    DivisionByZero,
    #[error("stack overflow: maximum call depth of {0} exceeded")]
    StackOverflow(usize),
}

impl EvalError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            EvalError::UnboundIdentifier(_) => ErrorKind::UnboundIdentifier,
            EvalError::UnknownPrefixOperator { .. } | EvalError::UnknownInfixOperator { .. } => {
                ErrorKind::UnknownOperator
            }
            EvalError::TypeMismatch { .. } => ErrorKind::TypeMismatch,
            EvalError::NotAFunction(_) => ErrorKind::NotAFunction,
            EvalError::ArityMismatch { .. } => ErrorKind::ArityMismatch,
            EvalError::DivisionByZero => ErrorKind::DivisionByZero,
            EvalError::StackOverflow(_) => ErrorKind::StackOverflow,
        }
    }
}

/// A closure: parameters and body plus the scope it was defined in.
#[derive(Debug)]
pub struct Function {
    pub parameters: Vec<Identifier>,
    pub body: Rc<BlockStatement>,
    pub env: EnvId,
}

/// A runtime value. Values are never mutated after construction; operators
/// always build new ones.
#[derive(Debug, Clone)]
pub enum Object {
    Integer(i64),
    Boolean(bool),
    Null,
    ReturnValue(Box<Object>),
    Error(EvalError),
    Function(Rc<Function>),
}

impl Object {
    pub const TRUE: Object = Object::Boolean(true);
    pub const FALSE: Object = Object::Boolean(false);

    pub fn type_name(&self) -> &'static str {
        match self {
            Object::Integer(_) => INTEGER,
            Object::Boolean(_) => BOOLEAN,
            Object::Null => NULL,
            Object::ReturnValue(_) => RETURN_VALUE,
            Object::Error(_) => ERROR,
            Object::Function(_) => FUNCTION,
        }
    }

    /// Null and false are falsy; every other value, including 0, is truthy.
    pub fn is_truthy(&self) -> bool {
        !matches!(self, Object::Null | Object::Boolean(false))
    }
}

impl From<bool> for Object {
    fn from(value: bool) -> Self {
        if value {
            Object::TRUE
        } else {
            Object::FALSE
        }
    }
}

impl From<EvalError> for Object {
    fn from(error: EvalError) -> Self {
        Object::Error(error)
    }
}

// Functions compare by identity.
impl PartialEq for Object {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Object::Integer(a), Object::Integer(b)) => a == b,
            (Object::Boolean(a), Object::Boolean(b)) => a == b,
            (Object::Null, Object::Null) => true,
            (Object::ReturnValue(a), Object::ReturnValue(b)) => a == b,
            (Object::Error(a), Object::Error(b)) => a == b,
            (Object::Function(a), Object::Function(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl fmt::Display for Object {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Object::Integer(value) => write!(f, "{}", value),
            Object::Boolean(value) => write!(f, "{}", value),
            Object::Null => write!(f, "null"),
            Object::ReturnValue(value) => write!(f, "{}", value),
            Object::Error(error) => write!(f, "ERROR: {}", error),
            Object::Function(function) => {
                write!(f, "fn({}) {}", function.parameters.join(", "), function.body)
            }
        }
    }
}
