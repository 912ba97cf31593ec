use std::fmt;
use std::rc::Rc;

pub type Identifier = String;

#[derive(PartialEq, Debug, Clone, Default)]
pub struct Program {
    pub statements: Vec<Statement>,
}

#[derive(PartialEq, Debug, Clone, Default)]
pub struct BlockStatement {
    pub statements: Vec<Statement>,
}

#[derive(PartialEq, Debug, Clone)]
pub enum Statement {
    Let { name: Identifier, value: Expression },
    Return(Expression),
    Expression(Expression),
}

#[derive(PartialEq, Debug, Clone)]
pub enum Expression {
    Identifier(Identifier),
    Integer(i64),
    Boolean(bool),
    Prefix {
        operator: Prefix,
        right: Box<Expression>,
    },
    Infix {
        operator: Infix,
        left: Box<Expression>,
        right: Box<Expression>,
    },
    If {
        condition: Box<Expression>,
        consequence: BlockStatement,
        alternative: Option<BlockStatement>,
    },
    Function {
        parameters: Vec<Identifier>,
        body: Rc<BlockStatement>,
    },
    Call {
        function: Box<Expression>,
        arguments: Vec<Expression>,
    },
}

impl Statement {
    fn into_expression(self) -> Expression {
        match self {
            Statement::Let { value, .. } => value,
            Statement::Return(value) | Statement::Expression(value) => value,
        }
    }
}

// Nested expressions are torn down from a worklist on the heap, so dropping
// an arbitrarily deep tree never recurses on the native stack.
impl Drop for Expression {
    fn drop(&mut self) {
        let mut pending = Vec::new();
        self.take_children(&mut pending);
        while let Some(mut expr) = pending.pop() {
            expr.take_children(&mut pending);
        }
    }
}

impl Expression {
    fn take_children(&mut self, into: &mut Vec<Expression>) {
        fn take(expr: &mut Expression) -> Expression {
            std::mem::replace(expr, Expression::Boolean(false))
        }
        fn drain(block: &mut BlockStatement, into: &mut Vec<Expression>) {
            into.extend(block.statements.drain(..).map(Statement::into_expression));
        }

        match self {
            Expression::Identifier(_) | Expression::Integer(_) | Expression::Boolean(_) => {}
            Expression::Prefix { right, .. } => into.push(take(right)),
            Expression::Infix { left, right, .. } => {
                into.push(take(left));
                into.push(take(right));
            }
            Expression::If {
                condition,
                consequence,
                alternative,
            } => {
                into.push(take(condition));
                drain(consequence, into);
                if let Some(alternative) = alternative {
                    drain(alternative, into);
                }
            }
            // A body still shared with a live function is dropped with it.
            Expression::Function { body, .. } => {
                if let Some(body) = Rc::get_mut(body) {
                    drain(body, into);
                }
            }
            Expression::Call {
                function,
                arguments,
            } => {
                into.push(take(function));
                into.append(arguments);
            }
        }
    }
}

#[derive(PartialEq, Eq, Debug, Clone, Copy)]
pub enum Prefix {
    Bang,
    Minus,
}

#[derive(PartialEq, Eq, Debug, Clone, Copy)]
pub enum Infix {
    Plus,
    Minus,
    Asterisk,
    Slash,
    LessThan,
    GreaterThan,
    Equal,
    NotEqual,
}

impl fmt::Display for Prefix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Prefix::Bang => write!(f, "!"),
            Prefix::Minus => write!(f, "-"),
        }
    }
}

impl fmt::Display for Infix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let op = match self {
            Infix::Plus => "+",
            Infix::Minus => "-",
            Infix::Asterisk => "*",
            Infix::Slash => "/",
            Infix::LessThan => "<",
            Infix::GreaterThan => ">",
            Infix::Equal => "==",
            Infix::NotEqual => "!=",
        };
        write!(f, "{}", op)
    }
}

fn join<T: fmt::Display>(items: &[T], sep: &str) -> String {
    items
        .iter()
        .map(|item| item.to_string())
        .collect::<Vec<_>>()
        .join(sep)
}

// Statements are separated by "; " so the printed form parses back to the
// same tree.
impl fmt::Display for Program {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", join(&self.statements, "; "))
    }
}

impl fmt::Display for BlockStatement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.statements.is_empty() {
            write!(f, "{{ }}")
        } else {
            write!(f, "{{ {} }}", join(&self.statements, "; "))
        }
    }
}

impl fmt::Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Statement::Let { name, value } => write!(f, "let {} = {}", name, value),
            Statement::Return(value) => write!(f, "return {}", value),
            Statement::Expression(expr) => write!(f, "{}", expr),
        }
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expression::Identifier(name) => write!(f, "{}", name),
            Expression::Integer(value) => write!(f, "{}", value),
            Expression::Boolean(value) => write!(f, "{}", value),
            Expression::Prefix { operator, right } => write!(f, "({}{})", operator, right),
            Expression::Infix {
                operator,
                left,
                right,
            } => write!(f, "({} {} {})", left, operator, right),
            Expression::If {
                condition,
                consequence,
                alternative,
            } => {
                write!(f, "if ({}) {}", condition, consequence)?;
                if let Some(alternative) = alternative {
                    write!(f, " else {}", alternative)?;
                }
                Ok(())
            }
            Expression::Function { parameters, body } => {
                write!(f, "fn({}) {}", parameters.join(", "), body)
            }
            Expression::Call {
                function,
                arguments,
            } => write!(f, "{}({})", function, join(arguments, ", ")),
        }
    }
}
