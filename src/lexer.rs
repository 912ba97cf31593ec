use std::fmt;

#[derive(PartialEq, Eq, Debug, Clone, Copy, Hash)]
pub enum TokenKind {
    Illegal,
    Eof,

    // Identifiers and literals
    Ident,
    Int,

    // Operators
    Assign,      // =
    Plus,        // +
    Minus,       // -
    Bang,        // !
    Asterisk,    // *
    Slash,       // /
    LessThan,    // <
    GreaterThan, // >
    Equal,       // ==
    NotEqual,    // !=

    // Delimiters
    Comma,      // ,
    SemiColon,  // ;
    LeftParen,  // (
    RightParen, // )
    LeftBrace,  // {
    RightBrace, // }

    // Keywords
    Function,
    Let,
    True,
    False,
    If,
    Else,
    Return,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TokenKind::Illegal => "ILLEGAL",
            TokenKind::Eof => "EOF",
            TokenKind::Ident => "IDENT",
            TokenKind::Int => "INT",
            TokenKind::Assign => "=",
            TokenKind::Plus => "+",
            TokenKind::Minus => "-",
            TokenKind::Bang => "!",
            TokenKind::Asterisk => "*",
            TokenKind::Slash => "/",
            TokenKind::LessThan => "<",
            TokenKind::GreaterThan => ">",
            TokenKind::Equal => "==",
            TokenKind::NotEqual => "!=",
            TokenKind::Comma => ",",
            TokenKind::SemiColon => ";",
            TokenKind::LeftParen => "(",
            TokenKind::RightParen => ")",
            TokenKind::LeftBrace => "{",
            TokenKind::RightBrace => "}",
            TokenKind::Function => "FUNCTION",
            TokenKind::Let => "LET",
            TokenKind::True => "TRUE",
            TokenKind::False => "FALSE",
            TokenKind::If => "IF",
            TokenKind::Else => "ELSE",
            TokenKind::Return => "RETURN",
        };
        write!(f, "{}", name)
    }
}

#[derive(PartialEq, Eq, Debug, Clone)]
pub struct Token {
    pub kind: TokenKind,
    pub literal: String,
}

impl Token {
    pub fn new(kind: TokenKind, literal: impl Into<String>) -> Self {
        Token {
            kind,
            literal: literal.into(),
        }
    }

    pub fn eof() -> Self {
        Token::new(TokenKind::Eof, "")
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{{}: {}}}", self.kind, self.literal)
    }
}

fn lookup_keyword(ident: &str) -> TokenKind {
    match ident {
        "fn" => TokenKind::Function,
        "let" => TokenKind::Let,
        "true" => TokenKind::True,
        "false" => TokenKind::False,
        "if" => TokenKind::If,
        "else" => TokenKind::Else,
        "return" => TokenKind::Return,
        _ => TokenKind::Ident,
    }
}

/// Turns source text into a stream of [`Token`]s.
///
/// The lexer is an iterator: it yields every token in order, then exactly
/// one `Eof` token, then `None`.
#[derive(Debug)]
pub struct Lexer {
    input: Vec<char>,
    cur: usize,
    next_cur: usize,
    ch: char,
    done: bool,
}

fn is_whitespace(c: char) -> bool {
    c == ' ' || c == '\t' || c == '\n' || c == '\r'
}

fn is_letter(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

impl Lexer {
    pub fn new(input: &str) -> Lexer {
        let mut lexer = Lexer {
            input: input.chars().collect(),
            cur: 0,
            next_cur: 0,
            ch: '\0',
            done: false,
        };
        lexer.read();
        lexer
    }

    fn read(&mut self) {
        self.ch = self.input.get(self.next_cur).copied().unwrap_or('\0');
        self.cur = self.next_cur;
        self.next_cur += 1;
    }

    fn peek(&self) -> char {
        self.input.get(self.next_cur).copied().unwrap_or('\0')
    }

    fn at_end(&self) -> bool {
        self.cur >= self.input.len()
    }

    fn slice(&self, start: usize) -> String {
        self.input[start..self.cur].iter().collect()
    }

    fn read_number(&mut self) -> Token {
        let start = self.cur;
        while self.ch.is_ascii_digit() {
            self.read();
        }
        Token::new(TokenKind::Int, self.slice(start))
    }

    fn read_identifier(&mut self) -> Token {
        let start = self.cur;
        while is_letter(self.ch) || self.ch.is_ascii_digit() {
            self.read();
        }
        let literal = self.slice(start);
        Token::new(lookup_keyword(&literal), literal)
    }

    /// Reads one operator that may be followed by `=` (`==`, `!=`).
    fn read_with_equals(&mut self, single: TokenKind, double: TokenKind) -> Token {
        if self.peek() == '=' {
            let first = self.ch;
            self.read();
            Token::new(double, format!("{}=", first))
        } else {
            Token::new(single, self.ch.to_string())
        }
    }

    pub fn next_token(&mut self) -> Token {
        while is_whitespace(self.ch) {
            self.read();
        }

        if self.at_end() {
            return Token::eof();
        }

        let token = match self.ch {
            '=' => self.read_with_equals(TokenKind::Assign, TokenKind::Equal),
            '!' => self.read_with_equals(TokenKind::Bang, TokenKind::NotEqual),
            '+' => Token::new(TokenKind::Plus, "+"),
            '-' => Token::new(TokenKind::Minus, "-"),
            '*' => Token::new(TokenKind::Asterisk, "*"),
            '/' => Token::new(TokenKind::Slash, "/"),
            '<' => Token::new(TokenKind::LessThan, "<"),
            '>' => Token::new(TokenKind::GreaterThan, ">"),
            ',' => Token::new(TokenKind::Comma, ","),
            ';' => Token::new(TokenKind::SemiColon, ";"),
            '(' => Token::new(TokenKind::LeftParen, "("),
            ')' => Token::new(TokenKind::RightParen, ")"),
            '{' => Token::new(TokenKind::LeftBrace, "{"),
            '}' => Token::new(TokenKind::RightBrace, "}"),
            c if c.is_ascii_digit() => return self.read_number(),
            c if is_letter(c) => return self.read_identifier(),
            c => Token::new(TokenKind::Illegal, c.to_string()),
        };

        self.read();
        token
    }
}

impl Iterator for Lexer {
    type Item = Token;

    fn next(&mut self) -> Option<Token> {
        if self.done {
            return None;
        }
        let token = self.next_token();
        if token.kind == TokenKind::Eof {
            self.done = true;
        }
        Some(token)
    }
}
