// ABOUTME: Pull-driven lexer turning Chi source bytes into tokens

use crate::token::{self, Token, TokenKind, TokenSubkind};

pub struct Lexer {
    input: Vec<u8>,
    position: usize,
    peek_position: usize,
    ch: u8,
}

impl Lexer {
    pub fn new(input: &str) -> Self {
        let mut lexer = Lexer {
            input: input.as_bytes().to_vec(),
            position: 0,
            peek_position: 0,
            ch: 0,
        };
        lexer.read_char();
        lexer
    }

    /// Yields the next token; returns `Eof` indefinitely past end of input.
    pub fn next_token(&mut self) -> Token {
        self.skip_whitespace_and_comments();

        let token = match self.ch {
            0 => return Token::eof(),
            b'"' => return self.read_string(),
            b'_' if !is_identifier_continuation(self.peek_char()) => Token::new(
                TokenKind::Delimiter,
                TokenSubkind::Underscore,
                "_",
            ),
            ch if is_letter(ch) || ch == b'_' => return self.read_word(),
            ch if ch.is_ascii_digit() => return self.read_number(),
            ch => {
                if let Some(two) = token::lookup_two_chars(ch, self.peek_char()) {
                    self.read_char();
                    two
                } else if let Some(one) = token::lookup_char(ch) {
                    one
                } else {
                    Token::illegal((ch as char).to_string())
                }
            }
        };

        self.read_char();
        token
    }

    fn read_char(&mut self) {
        self.ch = self.input.get(self.peek_position).copied().unwrap_or(0);
        self.position = self.peek_position;
        self.peek_position += 1;
    }

    fn peek_char(&self) -> u8 {
        self.input.get(self.peek_position).copied().unwrap_or(0)
    }

    fn skip_whitespace_and_comments(&mut self) {
        loop {
            while self.ch.is_ascii_whitespace() {
                self.read_char();
            }
            if self.ch != b'#' {
                return;
            }
            while self.ch != b'\n' && self.ch != 0 {
                self.read_char();
            }
        }
    }

    fn read_word(&mut self) -> Token {
        let start = self.position;
        while is_identifier_continuation(self.ch) {
            self.read_char();
        }
        let word = String::from_utf8_lossy(&self.input[start..self.position]).into_owned();
        token::lookup_word(&word)
    }

    fn read_number(&mut self) -> Token {
        let start = self.position;
        let mut subkind = TokenSubkind::I64;
        while self.ch.is_ascii_digit() {
            self.read_char();
        }
        if self.ch == b'.' && self.peek_char().is_ascii_digit() {
            subkind = TokenSubkind::F64;
            self.read_char();
            while self.ch.is_ascii_digit() {
                self.read_char();
            }
        }
        let literal = String::from_utf8_lossy(&self.input[start..self.position]).into_owned();
        Token::new(TokenKind::Literal, subkind, literal)
    }

    fn read_string(&mut self) -> Token {
        self.read_char();
        let start = self.position;
        while self.ch != b'"' && self.ch != 0 {
            self.read_char();
        }
        let literal = String::from_utf8_lossy(&self.input[start..self.position]).into_owned();
        if self.ch == 0 {
            // Unterminated string: surface what was collected as illegal
            // rather than reading past the buffer.
            return Token::illegal(literal);
        }
        self.read_char();
        Token::new(TokenKind::Literal, TokenSubkind::Str, literal)
    }
}

fn is_letter(ch: u8) -> bool {
    ch.is_ascii_alphabetic()
}

fn is_identifier_continuation(ch: u8) -> bool {
    ch.is_ascii_alphanumeric() || ch == b'_'
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::TokenKind;

    fn check(input: &str, expected: &[(TokenKind, TokenSubkind, &str)]) {
        let mut lexer = Lexer::new(input);
        for (i, (kind, subkind, literal)) in expected.iter().enumerate() {
            let token = lexer.next_token();
            assert_eq!(token.kind, *kind, "token {} kind, got {:?}", i, token);
            assert_eq!(token.subkind, *subkind, "token {} subkind, got {:?}", i, token);
            assert_eq!(token.literal, *literal, "token {} literal", i);
        }
    }

    use TokenKind::*;
    use TokenSubkind as S;

    #[test]
    fn test_comments() {
        let input = "
        # This is the first comment
        # This is another comment
        # This is a third comment
        let foo: i64 = 5 # This is a comment after a statement
        ";
        check(
            input,
            &[
                (Keyword, S::Let, "let"),
                (Identifier, S::Identifier, "foo"),
                (Delimiter, S::Colon, ":"),
                (Type, S::I64, "i64"),
                (Operator, S::Assign, "="),
                (Literal, S::I64, "5"),
                (Eof, S::Eof, "EOF"),
            ],
        );
    }

    #[test]
    fn test_let_statements() {
        let input = r#"
        let foo: i64 = 5
        let pi: f64 = 3.14
        let done: bool = false
        let message: str = "Hello, World!"
        let my_list: list(i64) = list(1, 2)

        let foo_2 be 5
        "#;
        check(
            input,
            &[
                (Keyword, S::Let, "let"),
                (Identifier, S::Identifier, "foo"),
                (Delimiter, S::Colon, ":"),
                (Type, S::I64, "i64"),
                (Operator, S::Assign, "="),
                (Literal, S::I64, "5"),
                (Keyword, S::Let, "let"),
                (Identifier, S::Identifier, "pi"),
                (Delimiter, S::Colon, ":"),
                (Type, S::F64, "f64"),
                (Operator, S::Assign, "="),
                (Literal, S::F64, "3.14"),
                (Keyword, S::Let, "let"),
                (Identifier, S::Identifier, "done"),
                (Delimiter, S::Colon, ":"),
                (Type, S::Bool, "bool"),
                (Operator, S::Assign, "="),
                (Literal, S::False, "false"),
                (Keyword, S::Let, "let"),
                (Identifier, S::Identifier, "message"),
                (Delimiter, S::Colon, ":"),
                (Type, S::Str, "str"),
                (Operator, S::Assign, "="),
                (Literal, S::Str, "Hello, World!"),
                (Keyword, S::Let, "let"),
                (Identifier, S::Identifier, "my_list"),
                (Delimiter, S::Colon, ":"),
                (Type, S::List, "list"),
                (Delimiter, S::Lparen, "("),
                (Type, S::I64, "i64"),
                (Delimiter, S::Rparen, ")"),
                (Operator, S::Assign, "="),
                (Type, S::List, "list"),
                (Delimiter, S::Lparen, "("),
                (Literal, S::I64, "1"),
                (Delimiter, S::Comma, ","),
                (Literal, S::I64, "2"),
                (Delimiter, S::Rparen, ")"),
                (Keyword, S::Let, "let"),
                (Identifier, S::Identifier, "foo_2"),
                (Keyword, S::Be, "be"),
                (Literal, S::I64, "5"),
                (Eof, S::Eof, "EOF"),
            ],
        );
    }

    #[test]
    fn test_functions() {
        let input = "let add be fn(x: i64, y: i64): i64 {return x + y}";
        check(
            input,
            &[
                (Keyword, S::Let, "let"),
                (Identifier, S::Identifier, "add"),
                (Keyword, S::Be, "be"),
                (Type, S::Fn, "fn"),
                (Delimiter, S::Lparen, "("),
                (Identifier, S::Identifier, "x"),
                (Delimiter, S::Colon, ":"),
                (Type, S::I64, "i64"),
                (Delimiter, S::Comma, ","),
                (Identifier, S::Identifier, "y"),
                (Delimiter, S::Colon, ":"),
                (Type, S::I64, "i64"),
                (Delimiter, S::Rparen, ")"),
                (Delimiter, S::Colon, ":"),
                (Type, S::I64, "i64"),
                (Delimiter, S::Lbrace, "{"),
                (Keyword, S::Return, "return"),
                (Identifier, S::Identifier, "x"),
                (Operator, S::Plus, "+"),
                (Identifier, S::Identifier, "y"),
                (Delimiter, S::Rbrace, "}"),
                (Eof, S::Eof, "EOF"),
            ],
        );
    }

    #[test]
    fn test_conditionals() {
        let input = "if foo > 0 and foo is 5 { return false } else if bar is not 10 { pass }";
        check(
            input,
            &[
                (Keyword, S::If, "if"),
                (Identifier, S::Identifier, "foo"),
                (Operator, S::Gt, ">"),
                (Literal, S::I64, "0"),
                (Operator, S::And, "and"),
                (Identifier, S::Identifier, "foo"),
                (Operator, S::Is, "is"),
                (Literal, S::I64, "5"),
                (Delimiter, S::Lbrace, "{"),
                (Keyword, S::Return, "return"),
                (Literal, S::False, "false"),
                (Delimiter, S::Rbrace, "}"),
                (Keyword, S::Else, "else"),
                (Keyword, S::If, "if"),
                (Identifier, S::Identifier, "bar"),
                (Operator, S::Is, "is"),
                (Operator, S::Not, "not"),
                (Literal, S::I64, "10"),
                (Delimiter, S::Lbrace, "{"),
                (Keyword, S::Pass, "pass"),
                (Delimiter, S::Rbrace, "}"),
                (Eof, S::Eof, "EOF"),
            ],
        );
    }

    #[test]
    fn test_loops() {
        let input = "for i, _ in values { print(i) } while i < 10 { break }";
        check(
            input,
            &[
                (Keyword, S::For, "for"),
                (Identifier, S::Identifier, "i"),
                (Delimiter, S::Comma, ","),
                (Delimiter, S::Underscore, "_"),
                (Keyword, S::In, "in"),
                (Identifier, S::Identifier, "values"),
                (Delimiter, S::Lbrace, "{"),
                (Identifier, S::Identifier, "print"),
                (Delimiter, S::Lparen, "("),
                (Identifier, S::Identifier, "i"),
                (Delimiter, S::Rparen, ")"),
                (Delimiter, S::Rbrace, "}"),
                (Keyword, S::While, "while"),
                (Identifier, S::Identifier, "i"),
                (Operator, S::Lt, "<"),
                (Literal, S::I64, "10"),
                (Delimiter, S::Lbrace, "{"),
                (Keyword, S::Break, "break"),
                (Delimiter, S::Rbrace, "}"),
                (Eof, S::Eof, "EOF"),
            ],
        );
    }

    #[test]
    fn test_operators() {
        let input = "5 + 5 - 5 * 5 / 5 % 5 < 5 > 5 <= 5 >= 5";
        check(
            input,
            &[
                (Literal, S::I64, "5"),
                (Operator, S::Plus, "+"),
                (Literal, S::I64, "5"),
                (Operator, S::Minus, "-"),
                (Literal, S::I64, "5"),
                (Operator, S::Asterisk, "*"),
                (Literal, S::I64, "5"),
                (Operator, S::Slash, "/"),
                (Literal, S::I64, "5"),
                (Operator, S::Percent, "%"),
                (Literal, S::I64, "5"),
                (Operator, S::Lt, "<"),
                (Literal, S::I64, "5"),
                (Operator, S::Gt, ">"),
                (Literal, S::I64, "5"),
                (Operator, S::Lte, "<="),
                (Literal, S::I64, "5"),
                (Operator, S::Gte, ">="),
                (Literal, S::I64, "5"),
                (Eof, S::Eof, "EOF"),
            ],
        );
    }

    #[test]
    fn test_mut_and_exe() {
        let input = "mut x to 5 exe x";
        check(
            input,
            &[
                (Keyword, S::Mut, "mut"),
                (Identifier, S::Identifier, "x"),
                (Keyword, S::To, "to"),
                (Literal, S::I64, "5"),
                (Keyword, S::Exe, "exe"),
                (Identifier, S::Identifier, "x"),
                (Eof, S::Eof, "EOF"),
            ],
        );
    }

    #[test]
    fn test_method_call() {
        let input = "x.len()";
        check(
            input,
            &[
                (Identifier, S::Identifier, "x"),
                (Delimiter, S::Dot, "."),
                (Identifier, S::Identifier, "len"),
                (Delimiter, S::Lparen, "("),
                (Delimiter, S::Rparen, ")"),
                (Eof, S::Eof, "EOF"),
            ],
        );
    }

    #[test]
    fn test_map_literal() {
        let input = "let m be map(\"key\": \"value\",)";
        check(
            input,
            &[
                (Keyword, S::Let, "let"),
                (Identifier, S::Identifier, "m"),
                (Keyword, S::Be, "be"),
                (Type, S::Map, "map"),
                (Delimiter, S::Lparen, "("),
                (Literal, S::Str, "key"),
                (Delimiter, S::Colon, ":"),
                (Literal, S::Str, "value"),
                (Delimiter, S::Comma, ","),
                (Delimiter, S::Rparen, ")"),
                (Eof, S::Eof, "EOF"),
            ],
        );
    }

    #[test]
    fn test_underscore_identifier() {
        let input = "_ _foo";
        check(
            input,
            &[
                (Delimiter, S::Underscore, "_"),
                (Identifier, S::Identifier, "_foo"),
                (Eof, S::Eof, "EOF"),
            ],
        );
    }

    #[test]
    fn test_unterminated_string() {
        let mut lexer = Lexer::new("\"abc");
        let token = lexer.next_token();
        assert_eq!(token.kind, TokenKind::Illegal);
        assert_eq!(token.literal, "abc");
        assert_eq!(lexer.next_token().kind, TokenKind::Eof);
    }

    #[test]
    fn test_eof_is_sticky() {
        let mut lexer = Lexer::new("x");
        lexer.next_token();
        for _ in 0..3 {
            assert_eq!(lexer.next_token().kind, TokenKind::Eof);
        }
    }
}
