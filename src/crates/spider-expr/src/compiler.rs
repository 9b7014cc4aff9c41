//! Infix-to-postfix compiler.
//!
//! The original converts infix to RPN with an explicit Shunting-Yard
//! operator stack (`RPNConverter::buildPostFix`,
//! `original_source/.../RPNConverter.h`). This crate reaches the same
//! postfix form with a recursive-descent parser instead, which makes
//! variable-arity function calls (`max(a, b)`) straightforward to emit
//! while keeping single-pass Shunting-Yard precedence for the `+ - * / % ^`
//! ladder via the grammar's own nesting.

use crate::function::Function;
use crate::operator::Operator;
use crate::token::{tokenize, Token};
use spider_types::error::{Error, Result};

/// One element of the compiled postfix program.
#[derive(Debug, Clone, PartialEq)]
pub enum RpnElement {
    Value(f64),
    Param(String),
    Op(Operator),
    Func(Function),
    Neg,
}

struct Parser<'a> {
    tokens: &'a [Token],
    pos: usize,
    out: Vec<RpnElement>,
}

impl<'a> Parser<'a> {
    fn new(tokens: &'a [Token]) -> Self {
        Self {
            tokens,
            pos: 0,
            out: Vec::new(),
        }
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn advance(&mut self) -> Option<&Token> {
        let t = self.tokens.get(self.pos);
        self.pos += 1;
        t
    }

    fn expect(&mut self, tok: &Token) -> Result<()> {
        match self.advance() {
            Some(t) if t == tok => Ok(()),
            Some(t) => Err(Error::Expression(format!("expected {tok:?}, found {t:?}"))),
            None => Err(Error::Expression(format!("expected {tok:?}, found end of expression"))),
        }
    }

    fn parse_expr(&mut self) -> Result<()> {
        self.parse_term()?;
        while let Some(Token::Op(c @ ('+' | '-'))) = self.peek() {
            let op = Operator::from_char(*c).unwrap();
            self.advance();
            self.parse_term()?;
            self.out.push(RpnElement::Op(op));
        }
        Ok(())
    }

    fn parse_term(&mut self) -> Result<()> {
        self.parse_power()?;
        while let Some(Token::Op(c @ ('*' | '/' | '%'))) = self.peek() {
            let op = Operator::from_char(*c).unwrap();
            self.advance();
            self.parse_power()?;
            self.out.push(RpnElement::Op(op));
        }
        Ok(())
    }

    fn parse_power(&mut self) -> Result<()> {
        self.parse_unary()?;
        if let Some(Token::Op('^')) = self.peek() {
            self.advance();
            self.parse_power()?;
            self.out.push(RpnElement::Op(Operator::Pow));
        }
        Ok(())
    }

    fn parse_unary(&mut self) -> Result<()> {
        if let Some(Token::Op('-')) = self.peek() {
            self.advance();
            self.parse_unary()?;
            self.out.push(RpnElement::Neg);
            return Ok(());
        }
        if let Some(Token::Op('+')) = self.peek() {
            self.advance();
            return self.parse_unary();
        }
        self.parse_primary()
    }

    fn parse_primary(&mut self) -> Result<()> {
        match self.advance().cloned() {
            Some(Token::Number(v)) => {
                self.out.push(RpnElement::Value(v));
                Ok(())
            }
            Some(Token::LParen) => {
                self.parse_expr()?;
                self.expect(&Token::RParen)
            }
            Some(Token::Ident(name)) => self.parse_ident(name),
            Some(other) => Err(Error::Expression(format!("unexpected token {other:?} in expression"))),
            None => Err(Error::Expression("unexpected end of expression".to_string())),
        }
    }

    fn parse_ident(&mut self, name: String) -> Result<()> {
        if name.eq_ignore_ascii_case("pi") {
            self.out.push(RpnElement::Value(std::f64::consts::PI));
            return Ok(());
        }
        if self.peek() != Some(&Token::LParen) {
            self.out.push(RpnElement::Param(name));
            return Ok(());
        }
        self.advance(); // consume '('
        let args = self.parse_arg_list()?;
        self.expect(&Token::RParen)?;
        match name.as_str() {
            "max" | "min" => {
                if args != 2 {
                    return Err(Error::Expression(format!("'{name}' takes exactly 2 arguments, got {args}")));
                }
                let op = if name == "max" { Operator::Max } else { Operator::Min };
                self.out.push(RpnElement::Op(op));
            }
            _ => {
                let f = Function::from_name(&name)
                    .ok_or_else(|| Error::Expression(format!("unknown function '{name}'")))?;
                if args != 1 {
                    return Err(Error::Expression(format!("'{name}' takes exactly 1 argument, got {args}")));
                }
                self.out.push(RpnElement::Func(f));
            }
        }
        Ok(())
    }

    /// Parses a comma-separated argument list, leaving the closing paren
    /// unconsumed. Returns the argument count.
    fn parse_arg_list(&mut self) -> Result<usize> {
        if self.peek() == Some(&Token::RParen) {
            return Ok(0);
        }
        let mut count = 1;
        self.parse_expr()?;
        while self.peek() == Some(&Token::Comma) {
            self.advance();
            self.parse_expr()?;
            count += 1;
        }
        Ok(count)
    }
}

/// Compiles an infix expression string into postfix form.
pub fn compile(expression: &str) -> Result<Vec<RpnElement>> {
    let tokens = tokenize(expression)?;
    if tokens.is_empty() {
        return Err(Error::Expression("empty expression".to_string()));
    }
    let mut parser = Parser::new(&tokens);
    parser.parse_expr()?;
    if parser.pos != tokens.len() {
        return Err(Error::Expression(format!(
            "unexpected trailing token at position {} in '{}'",
            parser.pos, expression
        )));
    }
    Ok(parser.out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compiles_precedence_correctly() {
        // 2 + 3 * 4 -> 2 3 4 * +
        let rpn = compile("2 + 3 * 4").unwrap();
        assert_eq!(
            rpn,
            vec![
                RpnElement::Value(2.0),
                RpnElement::Value(3.0),
                RpnElement::Value(4.0),
                RpnElement::Op(Operator::Mul),
                RpnElement::Op(Operator::Add),
            ]
        );
    }

    #[test]
    fn power_is_right_associative() {
        // 2 ^ 3 ^ 2 == 2 ^ (3 ^ 2) == 512
        let rpn = compile("2 ^ 3 ^ 2").unwrap();
        assert_eq!(
            rpn,
            vec![
                RpnElement::Value(2.0),
                RpnElement::Value(3.0),
                RpnElement::Value(2.0),
                RpnElement::Op(Operator::Pow),
                RpnElement::Op(Operator::Pow),
            ]
        );
    }

    #[test]
    fn parses_parameter_identifiers() {
        let rpn = compile("N * 2").unwrap();
        assert_eq!(
            rpn,
            vec![RpnElement::Param("N".to_string()), RpnElement::Value(2.0), RpnElement::Op(Operator::Mul)]
        );
    }

    #[test]
    fn parses_function_calls() {
        let rpn = compile("sqrt(N)").unwrap();
        assert_eq!(rpn, vec![RpnElement::Param("N".to_string()), RpnElement::Func(Function::Sqrt)]);
    }

    #[test]
    fn parses_max_as_binary() {
        let rpn = compile("max(N, 4)").unwrap();
        assert_eq!(
            rpn,
            vec![RpnElement::Param("N".to_string()), RpnElement::Value(4.0), RpnElement::Op(Operator::Max)]
        );
    }

    #[test]
    fn rejects_unbalanced_parens() {
        assert!(compile("(1 + 2").is_err());
        assert!(compile("1 + 2)").is_err());
    }

    #[test]
    fn rejects_unknown_function() {
        assert!(compile("frobnicate(1)").is_err());
    }

    #[test]
    fn rejects_wrong_arity() {
        assert!(compile("sqrt(1, 2)").is_err());
        assert!(compile("max(1)").is_err());
    }

    #[test]
    fn unary_minus_and_pi_constant() {
        let rpn = compile("-pi").unwrap();
        assert_eq!(rpn, vec![RpnElement::Value(std::f64::consts::PI), RpnElement::Neg]);
    }
}
