//! Integer constant expressions of `#if` and `#elif`.

use crate::pp::token::PpToken;
use crate::syntax::kind::SyntaxKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Value {
    Signed(i64),
    Unsigned(u64),
}

impl Value {
    fn is_true(self) -> bool {
        match self {
            Value::Signed(v) => v != 0,
            Value::Unsigned(v) => v != 0,
        }
    }

    fn as_u64(self) -> u64 {
        match self {
            Value::Signed(v) => v as u64,
            Value::Unsigned(v) => v,
        }
    }

    fn from_bool(value: bool) -> Value {
        Value::Signed(value as i64)
    }
}

/// Evaluates a fully expanded condition; identifiers still present count as 0.
pub(crate) fn evaluate(
    tokens: &[PpToken],
    is_cpp: bool,
) -> Result<bool, String> {
    if tokens.is_empty() {
        return Err("#if with no expression".to_string());
    }
    let mut evaluator = Evaluator {
        tokens,
        pos: 0,
        is_cpp,
    };
    let value = evaluator.conditional(true)?;
    if let Some(token) = evaluator.peek() {
        return Err(format!("missing binary operator before token \"{}\"", token.text));
    }
    Ok(value.is_true())
}

struct Evaluator<'a> {
    tokens: &'a [PpToken],
    pos: usize,
    is_cpp: bool,
}

fn precedence(kind: SyntaxKind) -> Option<u8> {
    let prec = match kind {
        SyntaxKind::OrOr => 1,
        SyntaxKind::AndAnd => 2,
        SyntaxKind::Pipe => 3,
        SyntaxKind::Caret => 4,
        SyntaxKind::Amp => 5,
        SyntaxKind::EqualEqual | SyntaxKind::NotEqual => 6,
        SyntaxKind::Less | SyntaxKind::Greater | SyntaxKind::LessEqual | SyntaxKind::GreaterEqual => 7,
        SyntaxKind::LeftShift | SyntaxKind::RightShift => 8,
        SyntaxKind::Plus | SyntaxKind::Minus => 9,
        SyntaxKind::Star | SyntaxKind::Slash | SyntaxKind::Percent => 10,
        _ => return None,
    };
    Some(prec)
}

impl<'a> Evaluator<'a> {
    fn peek(&self) -> Option<&'a PpToken> {
        self.tokens.get(self.pos)
    }

    fn at(
        &self,
        kind: SyntaxKind,
    ) -> bool {
        self.peek().is_some_and(|token| token.kind == kind)
    }

    fn expect(
        &mut self,
        kind: SyntaxKind,
        what: &str,
    ) -> Result<(), String> {
        if self.at(kind) {
            self.pos += 1;
            Ok(())
        } else {
            Err(format!("expected '{what}' in preprocessor expression"))
        }
    }

    /// `live` is false inside operands that are never evaluated, such as the
    /// right side of `0 && ...`; errors like division by zero are not raised there.
    fn conditional(
        &mut self,
        live: bool,
    ) -> Result<Value, String> {
        let condition = self.binary(1, live)?;
        if !self.at(SyntaxKind::Question) {
            return Ok(condition);
        }
        self.pos += 1;
        let taken = condition.is_true();
        let then_value = self.conditional(live && taken)?;
        self.expect(SyntaxKind::Colon, ":")?;
        let else_value = self.conditional(live && !taken)?;
        let chosen = if taken { then_value } else { else_value };
        Ok(match (then_value, else_value) {
            (Value::Unsigned(_), _) | (_, Value::Unsigned(_)) => Value::Unsigned(chosen.as_u64()),
            _ => chosen,
        })
    }

    fn binary(
        &mut self,
        min_prec: u8,
        live: bool,
    ) -> Result<Value, String> {
        let mut lhs = self.unary(live)?;
        while let Some(op) = self.peek().map(|token| token.kind)
            && let Some(prec) = precedence(op)
            && prec >= min_prec
        {
            self.pos += 1;
            let rhs_live = match op {
                SyntaxKind::AndAnd => live && lhs.is_true(),
                SyntaxKind::OrOr => live && !lhs.is_true(),
                _ => live,
            };
            let rhs = self.binary(prec + 1, rhs_live)?;
            lhs = apply(op, lhs, rhs, live)?;
        }
        Ok(lhs)
    }

    fn unary(
        &mut self,
        live: bool,
    ) -> Result<Value, String> {
        let Some(token) = self.peek() else {
            return Err("expected value in expression".to_string());
        };
        match token.kind {
            SyntaxKind::Plus => {
                self.pos += 1;
                self.unary(live)
            },
            SyntaxKind::Minus => {
                self.pos += 1;
                Ok(match self.unary(live)? {
                    Value::Signed(v) => Value::Signed(v.wrapping_neg()),
                    Value::Unsigned(v) => Value::Unsigned(v.wrapping_neg()),
                })
            },
            SyntaxKind::Tilde => {
                self.pos += 1;
                Ok(match self.unary(live)? {
                    Value::Signed(v) => Value::Signed(!v),
                    Value::Unsigned(v) => Value::Unsigned(!v),
                })
            },
            SyntaxKind::Exclaim => {
                self.pos += 1;
                let value = self.unary(live)?;
                Ok(Value::from_bool(!value.is_true()))
            },
            SyntaxKind::LParen => {
                self.pos += 1;
                let value = self.conditional(live)?;
                self.expect(SyntaxKind::RParen, ")")?;
                Ok(value)
            },
            SyntaxKind::Integer => {
                self.pos += 1;
                parse_integer(&token.text)
            },
            SyntaxKind::Char => {
                self.pos += 1;
                parse_char(&token.text)
            },
            SyntaxKind::Float => Err("floating constant in preprocessor expression".to_string()),
            SyntaxKind::String => Err("token is not valid in preprocessor expressions".to_string()),
            SyntaxKind::Ident => {
                self.pos += 1;
                let value = self.is_cpp && &*token.text == "true";
                Ok(Value::from_bool(value))
            },
            _ => Err(format!("token \"{}\" is not valid in preprocessor expressions", token.text)),
        }
    }
}

fn apply(
    op: SyntaxKind,
    lhs: Value,
    rhs: Value,
    live: bool,
) -> Result<Value, String> {
    if matches!(op, SyntaxKind::AndAnd) {
        return Ok(Value::from_bool(lhs.is_true() && rhs.is_true()));
    }
    if matches!(op, SyntaxKind::OrOr) {
        return Ok(Value::from_bool(lhs.is_true() || rhs.is_true()));
    }
    if matches!(op, SyntaxKind::LeftShift | SyntaxKind::RightShift) {
        let amount = (rhs.as_u64().min(63)) as u32;
        let left = op == SyntaxKind::LeftShift;
        return Ok(match lhs {
            Value::Signed(v) if left => Value::Signed(v.wrapping_shl(amount)),
            Value::Signed(v) => Value::Signed(v.wrapping_shr(amount)),
            Value::Unsigned(v) if left => Value::Unsigned(v.wrapping_shl(amount)),
            Value::Unsigned(v) => Value::Unsigned(v.wrapping_shr(amount)),
        });
    }
    if matches!(op, SyntaxKind::Slash | SyntaxKind::Percent) && rhs.as_u64() == 0 {
        if live {
            return Err("division by zero in #if".to_string());
        }
        return Ok(Value::Signed(0));
    }

    match (lhs, rhs) {
        (Value::Signed(a), Value::Signed(b)) => Ok(match op {
            SyntaxKind::Star => Value::Signed(a.wrapping_mul(b)),
            SyntaxKind::Slash => Value::Signed(a.wrapping_div(b)),
            SyntaxKind::Percent => Value::Signed(a.wrapping_rem(b)),
            SyntaxKind::Plus => Value::Signed(a.wrapping_add(b)),
            SyntaxKind::Minus => Value::Signed(a.wrapping_sub(b)),
            SyntaxKind::Less => Value::from_bool(a < b),
            SyntaxKind::Greater => Value::from_bool(a > b),
            SyntaxKind::LessEqual => Value::from_bool(a <= b),
            SyntaxKind::GreaterEqual => Value::from_bool(a >= b),
            SyntaxKind::EqualEqual => Value::from_bool(a == b),
            SyntaxKind::NotEqual => Value::from_bool(a != b),
            SyntaxKind::Amp => Value::Signed(a & b),
            SyntaxKind::Caret => Value::Signed(a ^ b),
            SyntaxKind::Pipe => Value::Signed(a | b),
            _ => return Err("invalid operator in preprocessor expression".to_string()),
        }),
        _ => {
            let (a, b) = (lhs.as_u64(), rhs.as_u64());
            Ok(match op {
                SyntaxKind::Star => Value::Unsigned(a.wrapping_mul(b)),
                SyntaxKind::Slash => Value::Unsigned(a / b),
                SyntaxKind::Percent => Value::Unsigned(a % b),
                SyntaxKind::Plus => Value::Unsigned(a.wrapping_add(b)),
                SyntaxKind::Minus => Value::Unsigned(a.wrapping_sub(b)),
                SyntaxKind::Less => Value::from_bool(a < b),
                SyntaxKind::Greater => Value::from_bool(a > b),
                SyntaxKind::LessEqual => Value::from_bool(a <= b),
                SyntaxKind::GreaterEqual => Value::from_bool(a >= b),
                SyntaxKind::EqualEqual => Value::from_bool(a == b),
                SyntaxKind::NotEqual => Value::from_bool(a != b),
                SyntaxKind::Amp => Value::Unsigned(a & b),
                SyntaxKind::Caret => Value::Unsigned(a ^ b),
                SyntaxKind::Pipe => Value::Unsigned(a | b),
                _ => return Err("invalid operator in preprocessor expression".to_string()),
            })
        },
    }
}

pub(crate) fn parse_integer(text: &str) -> Result<Value, String> {
    let cleaned: String = text.chars().filter(|&c| c != '\'').collect();
    let lower = cleaned.to_ascii_lowercase();
    let digits_end = lower.trim_end_matches(['u', 'l']).len();
    let (digits, suffix) = lower.split_at(digits_end);
    if suffix.chars().filter(|&c| c == 'u').count() > 1 || suffix.chars().filter(|&c| c == 'l').count() > 2 {
        return Err(format!("invalid suffix \"{suffix}\" on integer constant"));
    }
    let (radix, body) = if let Some(hex) = digits.strip_prefix("0x") {
        (16, hex)
    } else if let Some(bin) = digits.strip_prefix("0b") {
        (2, bin)
    } else if digits.len() > 1 && digits.starts_with('0') {
        (8, &digits[1..])
    } else {
        (10, digits)
    };
    let value = u64::from_str_radix(body, radix).map_err(|_| format!("invalid integer constant \"{text}\""))?;
    if suffix.contains('u') || value > i64::MAX as u64 {
        Ok(Value::Unsigned(value))
    } else {
        Ok(Value::Signed(value as i64))
    }
}

pub(crate) fn parse_char(text: &str) -> Result<Value, String> {
    let wide = !text.starts_with('\'');
    let start = text.find('\'').ok_or_else(|| "invalid character constant".to_string())?;
    let body = text
        .get(start + 1..text.len().saturating_sub(1))
        .ok_or_else(|| "invalid character constant".to_string())?;
    let mut chars = body.chars().peekable();
    let mut values = Vec::new();
    while let Some(ch) = chars.next() {
        if ch != '\\' {
            values.push(ch as u32);
            continue;
        }
        let Some(escape) = chars.next() else {
            return Err("invalid escape in character constant".to_string());
        };
        let value = match escape {
            'n' => 10,
            't' => 9,
            'r' => 13,
            'a' => 7,
            'b' => 8,
            'f' => 12,
            'v' => 11,
            'e' => 27,
            'x' => {
                let mut value = 0u32;
                while let Some(digit) = chars.peek().and_then(|c| c.to_digit(16)) {
                    value = value.wrapping_mul(16).wrapping_add(digit);
                    chars.next();
                }
                value
            },
            '0'..='7' => {
                let mut value = escape.to_digit(8).unwrap_or(0);
                for _ in 0..2 {
                    match chars.peek().and_then(|c| c.to_digit(8)) {
                        Some(digit) => {
                            value = value * 8 + digit;
                            chars.next();
                        },
                        None => break,
                    }
                }
                value
            },
            other => other as u32,
        };
        values.push(value);
    }
    if values.is_empty() {
        return Err("empty character constant".to_string());
    }
    if wide {
        return Ok(Value::Signed(values[values.len() - 1] as i64));
    }
    if values.len() == 1 {
        // Plain `char` is signed.
        return Ok(Value::Signed(values[0] as u8 as i8 as i64));
    }
    let combined = values.iter().fold(0i64, |acc, &v| (acc << 8) | (v as i64 & 0xff));
    Ok(Value::Signed(combined))
}

#[cfg(test)]
#[path = "../../tests/src/pp/condition_tests.rs"]
mod tests;
