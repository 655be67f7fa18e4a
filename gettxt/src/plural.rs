/* Copyright (C) 2018 Olivier Goffart <ogoffart@woboq.com>

Permission is hereby granted, free of charge, to any person obtaining a copy of this software and
associated documentation files (the "Software"), to deal in the Software without restriction,
including without limitation the rights to use, copy, modify, merge, publish, distribute, sublicense,
and/or sell copies of the Software, and to permit persons to whom the Software is furnished to do so,
subject to the following conditions:

The above copyright notice and this permission notice shall be included in all copies or substantial
portions of the Software.

THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR IMPLIED, INCLUDING BUT
NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY, FITNESS FOR A PARTICULAR PURPOSE AND
NONINFRINGEMENT. IN NO EVENT SHALL THE AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES
OR OTHER LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM, OUT OF OR IN
CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE SOFTWARE.
*/

//! `Plural-Forms` support.
//!
//! The expression of the header, such as
//! `nplurals=3; plural=n%10==1 && n%100!=11 ? 0 : n%10>=2 && n%10<=4 && (n%100<10 || n%100>=20) ? 1 : 2;`
//! is converted once to reverse polish notation with the shunting-yard algorithm,
//! then run on a small stack machine for every count.

use std::cell::RefCell;
use std::collections::HashMap;

use crate::error::PluralError;

/// Used when the catalog has no `Plural-Forms` header line.
pub const DEFAULT_PLURAL_FORMS: &str = "nplurals=2; plural=n == 1 ? 0 : 1;";

const PLURAL_FORMS_PREFIX: &str = "plural-forms:";
const OPERATOR_CHARS: &[u8] = b"|&><!=%?:";

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Operator {
    Modulo,
    Smaller,
    SmallerOrEqual,
    Greater,
    GreaterOrEqual,
    Equal,
    NotEqual,
    And,
    Or,
    /// `?` whose `:` has not been seen yet.
    Question,
    Ternary,
}

impl Operator {
    fn from_bytes(s: &[u8]) -> Option<Self> {
        Some(match s {
            b"%" => Self::Modulo,
            b"<" => Self::Smaller,
            b"<=" => Self::SmallerOrEqual,
            b">" => Self::Greater,
            b">=" => Self::GreaterOrEqual,
            b"==" => Self::Equal,
            b"!=" => Self::NotEqual,
            b"&&" => Self::And,
            b"||" => Self::Or,
            b"?" => Self::Question,
            b"?:" => Self::Ternary,
            _ => return None,
        })
    }

    fn precedence(self) -> u8 {
        match self {
            Self::Modulo => 6,
            Self::Smaller | Self::SmallerOrEqual | Self::Greater | Self::GreaterOrEqual => 5,
            Self::Equal | Self::NotEqual => 4,
            Self::And => 3,
            Self::Or => 2,
            Self::Question | Self::Ternary => 1,
        }
    }

    fn is_ternary(self) -> bool {
        matches!(self, Self::Question | Self::Ternary)
    }

    fn as_str(self) -> &'static str {
        match self {
            Self::Modulo => "%",
            Self::Smaller => "<",
            Self::SmallerOrEqual => "<=",
            Self::Greater => ">",
            Self::GreaterOrEqual => ">=",
            Self::Equal => "==",
            Self::NotEqual => "!=",
            Self::And => "&&",
            Self::Or => "||",
            Self::Question => "?",
            Self::Ternary => "?:",
        }
    }
}

/// One element of the postfix token stream.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Token {
    /// The count `n`.
    Var,
    Value(u64),
    Op(Operator),
}

/// Operator stack entry of the shunting-yard algorithm.
#[derive(Copy, Clone)]
enum Pending {
    Op(Operator),
    OpenParen,
}

impl Pending {
    fn precedence(self) -> u8 {
        match self {
            Pending::Op(op) => op.precedence(),
            Pending::OpenParen => 0,
        }
    }
}

/// Converts an infix plural expression to postfix tokens.
pub fn parse(expr: &str) -> Result<Vec<Token>, PluralError> {
    let expr = expr.as_bytes();
    let mut output = Vec::new();
    let mut stack: Vec<Pending> = Vec::new();
    let mut pos = 0;

    while pos < expr.len() {
        let next = expr[pos];
        match next {
            c if c.is_ascii_whitespace() => pos += 1,
            b'n' => {
                output.push(Token::Var);
                pos += 1;
            }
            b'(' => {
                stack.push(Pending::OpenParen);
                pos += 1;
            }
            b')' => {
                loop {
                    match stack.pop() {
                        Some(Pending::Op(op)) => output.push(Token::Op(op)),
                        Some(Pending::OpenParen) => break,
                        None => return Err(PluralError::Syntax("mismatched parentheses".into())),
                    }
                }
                pos += 1;
            }
            b'|' | b'&' | b'>' | b'<' | b'!' | b'=' | b'%' | b'?' => {
                let span = expr[pos..]
                    .iter()
                    .take_while(|c| OPERATOR_CHARS.contains(*c))
                    .count();
                let text = &expr[pos..pos + span];
                let operator = Operator::from_bytes(text).ok_or_else(|| {
                    PluralError::Syntax(format!(
                        "unknown operator \"{}\"",
                        String::from_utf8_lossy(text)
                    ))
                })?;
                while let Some(&top) = stack.last() {
                    // ternary is right-associative
                    let stop = if operator.is_ternary() {
                        operator.precedence() >= top.precedence()
                    } else {
                        operator.precedence() > top.precedence()
                    };
                    if stop {
                        break;
                    }
                    if let Pending::Op(op) = top {
                        output.push(Token::Op(op));
                    }
                    stack.pop();
                }
                stack.push(Pending::Op(operator));
                pos += span;
            }
            b':' => {
                loop {
                    match stack.last_mut() {
                        Some(top @ Pending::Op(Operator::Question)) => {
                            *top = Pending::Op(Operator::Ternary);
                            break;
                        }
                        Some(Pending::Op(op)) => {
                            output.push(Token::Op(*op));
                            stack.pop();
                        }
                        Some(Pending::OpenParen) => {
                            return Err(PluralError::Syntax("mismatched parentheses".into()))
                        }
                        None => {
                            return Err(PluralError::Syntax(
                                "missing starting \"?\" ternary operator".into(),
                            ))
                        }
                    }
                }
                pos += 1;
            }
            c if c.is_ascii_digit() => {
                let span = expr[pos..].iter().take_while(|c| c.is_ascii_digit()).count();
                let value = expr[pos..pos + span]
                    .iter()
                    .fold(0u64, |acc, d| acc.saturating_mul(10).saturating_add((d - b'0') as u64));
                output.push(Token::Value(value));
                pos += span;
            }
            _ => {
                let symbol = String::from_utf8_lossy(&expr[pos..])
                    .chars()
                    .next()
                    .unwrap_or(char::REPLACEMENT_CHARACTER);
                return Err(PluralError::Syntax(format!("unknown symbol \"{}\"", symbol)));
            }
        }
    }

    while let Some(pending) = stack.pop() {
        match pending {
            Pending::Op(op) => output.push(Token::Op(op)),
            Pending::OpenParen => {
                return Err(PluralError::Syntax("mismatched parentheses".into()))
            }
        }
    }
    Ok(output)
}

/// Runs postfix tokens for the count `n`.
pub fn execute(tokens: &[Token], n: u64) -> Result<u64, PluralError> {
    let mut stack: Vec<u64> = Vec::with_capacity(tokens.len());
    let underflow = || PluralError::Eval("not enough values on the stack".into());

    for token in tokens {
        let op = match *token {
            Token::Var => {
                stack.push(n);
                continue;
            }
            Token::Value(value) => {
                stack.push(value);
                continue;
            }
            Token::Op(op) => op,
        };

        let result = match op {
            Operator::Ternary => {
                let v3 = stack.pop().ok_or_else(underflow)?;
                let v2 = stack.pop().ok_or_else(underflow)?;
                let v1 = stack.pop().ok_or_else(underflow)?;
                if v1 != 0 {
                    v2
                } else {
                    v3
                }
            }
            Operator::Question => {
                return Err(PluralError::Eval(format!(
                    "unknown operator \"{}\"",
                    op.as_str()
                )))
            }
            _ => {
                let v2 = stack.pop().ok_or_else(underflow)?;
                let v1 = stack.pop().ok_or_else(underflow)?;
                match op {
                    Operator::Modulo => v1
                        .checked_rem(v2)
                        .ok_or_else(|| PluralError::Eval("modulo by zero".into()))?,
                    Operator::Or => (v1 != 0 || v2 != 0) as u64,
                    Operator::And => (v1 != 0 && v2 != 0) as u64,
                    Operator::Smaller => (v1 < v2) as u64,
                    Operator::SmallerOrEqual => (v1 <= v2) as u64,
                    Operator::Greater => (v1 > v2) as u64,
                    Operator::GreaterOrEqual => (v1 >= v2) as u64,
                    Operator::NotEqual => (v1 != v2) as u64,
                    Operator::Equal => (v1 == v2) as u64,
                    Operator::Question | Operator::Ternary => unreachable!(),
                }
            }
        };
        stack.push(result);
    }

    match stack.as_slice() {
        [value] => Ok(*value),
        [] => Err(PluralError::Eval("empty expression".into())),
        _ => Err(PluralError::Eval("too many values remaining on the stack".into())),
    }
}

/// A plural expression parsed once, with the results memoized per count.
#[derive(Debug)]
pub struct PluralExpression {
    tokens: Result<Vec<Token>, PluralError>,
    cache: RefCell<HashMap<u64, u64>>,
}

impl PluralExpression {
    pub fn new(expr: &str) -> Self {
        Self {
            tokens: parse(expr),
            cache: RefCell::new(HashMap::new()),
        }
    }

    pub fn tokens(&self) -> Result<&[Token], &PluralError> {
        self.tokens.as_deref()
    }

    pub fn evaluate(&self, n: u64) -> Result<u64, PluralError> {
        if let Some(value) = self.cache.borrow().get(&n) {
            return Ok(*value);
        }
        let tokens = self.tokens.as_ref().map_err(Clone::clone)?;
        let value = execute(tokens, n)?;
        tracing::trace!(n, value, "evaluated plural expression");
        self.cache.borrow_mut().insert(n, value);
        Ok(value)
    }
}

/// The plural rule of a catalog: how many forms it has and which one a count uses.
#[derive(Debug)]
pub struct PluralForms {
    nplurals: usize,
    expression: String,
    rule: PluralExpression,
}

impl PluralForms {
    /// Reads the rule from the header entry of a catalog.
    pub fn from_header(header: &str) -> Self {
        Self::from_rule(extract_plural_forms(header))
    }

    /// `rule` is the value of a `Plural-Forms` header, such as
    /// `nplurals=2; plural=n != 1;`.
    pub fn from_rule(rule: &str) -> Self {
        let expression = sanitize_expression(rule);
        Self {
            nplurals: extract_plural_count(rule),
            rule: PluralExpression::new(&expression),
            expression,
        }
    }

    pub fn nplurals(&self) -> usize {
        self.nplurals
    }

    /// The sanitized expression.
    pub fn expression(&self) -> &str {
        &self.expression
    }

    pub fn rule(&self) -> &PluralExpression {
        &self.rule
    }

    /// Index of the plural form to use for `n`, always below [`Self::nplurals`].
    pub fn resolve(&self, n: u64) -> usize {
        let slot = match self.rule.evaluate(n) {
            Ok(slot) => slot,
            Err(error) => {
                tracing::debug!(n, expression = %self.expression, "{}, using form 0", error);
                0
            }
        };
        let last = self.nplurals.saturating_sub(1);
        usize::try_from(slot).map_or(last, |slot| slot.min(last))
    }
}

impl Default for PluralForms {
    fn default() -> Self {
        Self::from_rule(DEFAULT_PLURAL_FORMS)
    }
}

/// Value of the last `Plural-Forms:` line of a catalog header.
pub fn extract_plural_forms(header: &str) -> &str {
    header
        .split('\n')
        .filter(|line| {
            line.get(..PLURAL_FORMS_PREFIX.len())
                .is_some_and(|prefix| prefix.eq_ignore_ascii_case(PLURAL_FORMS_PREFIX))
        })
        .last()
        .map_or(DEFAULT_PLURAL_FORMS, |line| &line[PLURAL_FORMS_PREFIX.len()..])
}

/// Extracts the `plural=` expression and removes everything that cannot be part of it.
pub fn sanitize_expression(rule: &str) -> String {
    let mut parts = rule.split(';');
    let first = parts.next().unwrap_or_default();
    let expr = parts.next().unwrap_or(first).trim().to_lowercase();
    let mut expr = expr.as_str();
    if let Some(rest) = expr.strip_prefix("plural") {
        expr = rest.trim_start();
    }
    if let Some(rest) = expr.strip_prefix('=') {
        expr = rest.trim_start();
    }
    expr.chars()
        .filter(|c| c.is_ascii_digit() || "n:()?=!<>/%&| ".contains(*c))
        .collect()
}

/// Number of plural forms declared by `nplurals=`, at least 1. Values too large
/// for `usize` saturate.
pub fn extract_plural_count(rule: &str) -> usize {
    let first = rule.split(';').next().unwrap_or_default().trim();
    let Some((key, value)) = first.split_once('=') else {
        return 1;
    };
    if !key.trim_end().eq_ignore_ascii_case("nplurals") {
        return 1;
    }
    let value = value.trim();
    let digits = value.len() - value.trim_start_matches(|c: char| c.is_ascii_digit()).len();
    if digits == 0 {
        return 1;
    }
    match value[..digits].parse::<usize>() {
        Ok(0) => 1,
        Ok(count) => count,
        // only digits left, so the value is too large
        Err(_) => usize::MAX,
    }
}
