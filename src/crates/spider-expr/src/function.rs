//! Unary functions, carried over from `RPNOperatorType::COS..SQRT`
//! (`original_source/.../RPNConverter.h`). `max`/`min` are parsed as
//! two-argument function calls by this crate even though the original
//! modeled them as binary operators; see [`crate::operator::Operator::Max`]
//! for the binary form used when they appear infix.

use spider_types::error::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Function {
    Cos,
    Sin,
    Tan,
    Exp,
    Log,
    Log2,
    Ceil,
    Floor,
    Sqrt,
}

impl Function {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "cos" => Some(Function::Cos),
            "sin" => Some(Function::Sin),
            "tan" => Some(Function::Tan),
            "exp" => Some(Function::Exp),
            "log" => Some(Function::Log),
            "log2" => Some(Function::Log2),
            "ceil" => Some(Function::Ceil),
            "floor" => Some(Function::Floor),
            "sqrt" => Some(Function::Sqrt),
            _ => None,
        }
    }

    pub fn apply(&self, x: f64) -> Result<f64> {
        let value = match self {
            Function::Cos => x.cos(),
            Function::Sin => x.sin(),
            Function::Tan => x.tan(),
            Function::Exp => x.exp(),
            Function::Log => x.log10(),
            Function::Log2 => x.log2(),
            Function::Ceil => x.ceil(),
            Function::Floor => x.floor(),
            Function::Sqrt => {
                if x < 0.0 {
                    return Err(Error::Expression(format!("sqrt of negative value {x}")));
                }
                x.sqrt()
            }
        };
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_known_names() {
        assert_eq!(Function::from_name("sqrt"), Some(Function::Sqrt));
        assert_eq!(Function::from_name("bogus"), None);
    }

    #[test]
    fn sqrt_of_negative_is_an_error() {
        assert!(Function::Sqrt.apply(-1.0).is_err());
    }

    #[test]
    fn floor_and_ceil() {
        assert_eq!(Function::Floor.apply(1.7).unwrap(), 1.0);
        assert_eq!(Function::Ceil.apply(1.2).unwrap(), 2.0);
    }
}
