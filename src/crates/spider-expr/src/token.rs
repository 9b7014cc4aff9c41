//! Infix tokenizer.
//!
//! Grounded on `original_source/.../RPNConverter.h`'s `cleanInfixExpression`
//! / `checkInfixExpression` pass: this module performs the same job,
//! scanning the raw string once and rejecting malformed character sequences
//! before the Shunting-Yard pass ever sees them.

use spider_types::error::{Error, Result};

#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    Number(f64),
    Ident(String),
    Op(char),
    LParen,
    RParen,
    Comma,
}

pub fn tokenize(input: &str) -> Result<Vec<Token>> {
    let chars: Vec<char> = input.chars().collect();
    let mut tokens = Vec::new();
    let mut i = 0;
    while i < chars.len() {
        let c = chars[i];
        match c {
            c if c.is_whitespace() => {
                i += 1;
            }
            '(' => {
                tokens.push(Token::LParen);
                i += 1;
            }
            ')' => {
                tokens.push(Token::RParen);
                i += 1;
            }
            ',' => {
                tokens.push(Token::Comma);
                i += 1;
            }
            '+' | '-' | '*' | '/' | '%' | '^' => {
                tokens.push(Token::Op(c));
                i += 1;
            }
            c if c.is_ascii_digit() || c == '.' => {
                let start = i;
                while i < chars.len() && (chars[i].is_ascii_digit() || chars[i] == '.') {
                    i += 1;
                }
                let text: String = chars[start..i].iter().collect();
                let value = text
                    .parse::<f64>()
                    .map_err(|e| Error::Expression(format!("invalid numeric literal '{text}': {e}")))?;
                tokens.push(Token::Number(value));
            }
            c if c.is_alphabetic() || c == '_' => {
                let start = i;
                while i < chars.len() && (chars[i].is_alphanumeric() || chars[i] == '_') {
                    i += 1;
                }
                let text: String = chars[start..i].iter().collect();
                tokens.push(Token::Ident(text));
            }
            other => {
                return Err(Error::Expression(format!("unexpected character '{other}' at offset {i}")));
            }
        }
    }
    Ok(tokens)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokenizes_simple_arithmetic() {
        let tokens = tokenize("2 + 3 * x").unwrap();
        assert_eq!(
            tokens,
            vec![
                Token::Number(2.0),
                Token::Op('+'),
                Token::Number(3.0),
                Token::Op('*'),
                Token::Ident("x".to_string()),
            ]
        );
    }

    #[test]
    fn rejects_unknown_character() {
        assert!(tokenize("a @ b").is_err());
    }

    #[test]
    fn tokenizes_function_call_with_commas() {
        let tokens = tokenize("max(a, 2)").unwrap();
        assert_eq!(
            tokens,
            vec![
                Token::Ident("max".to_string()),
                Token::LParen,
                Token::Ident("a".to_string()),
                Token::Comma,
                Token::Number(2.0),
                Token::RParen,
            ]
        );
    }
}
