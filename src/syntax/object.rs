//! Object-literal format grammar.
//!
//! A format clause is one bounded JSON5-ish object literal. Two independent
//! operations are exposed: [`object_end`] finds the exclusive end of the
//! object expression (full grammar, not brace counting - string literals may
//! contain unbalanced braces), and [`parse_format_object`] parses the
//! object's contents into key/value pairs with a permissive literal grammar:
//! unquoted keys, single quotes, hex and signed numbers, trailing commas,
//! `//` and `/* */` comments.

use serde_json::{Map, Number, Value};

/// A format-grammar failure: byte offset into the parsed fragment plus a
/// descriptive message. Callers rebase the offset into the full template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectSyntaxError {
    pub offset: usize,
    pub message: String,
}

impl std::fmt::Display for ObjectSyntaxError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} at offset {}", self.message, self.offset)
    }
}

/// Finds the exclusive end offset of the object literal starting at the
/// beginning of `src`. Content after the object is allowed and ignored.
pub fn object_end(src: &str) -> Result<usize, ObjectSyntaxError> {
    let mut cursor = Cursor::new(src);
    if cursor.peek() != Some('{') {
        return Err(cursor.error("expected '{' to open a format object"));
    }
    cursor.parse_object()?;
    Ok(cursor.pos())
}

/// Parses a complete format fragment into its key/value pairs. The fragment
/// must contain exactly one object literal (plus trivia).
pub fn parse_format_object(text: &str) -> Result<Map<String, Value>, ObjectSyntaxError> {
    let mut cursor = Cursor::new(text);
    cursor.skip_trivia()?;
    let value = cursor.parse_value()?;
    cursor.skip_trivia()?;
    if !cursor.at_end() {
        return Err(cursor.error("unexpected characters after format object"));
    }
    match value {
        Value::Object(map) => Ok(map),
        _ => Err(ObjectSyntaxError {
            offset: 0,
            message: "format must be an object".to_string(),
        }),
    }
}

// ============================================================================
// CURSOR - shared by the format grammar and the custom-token loader
// ============================================================================

pub(crate) struct Cursor<'a> {
    src: &'a str,
    pos: usize,
}

impl<'a> Cursor<'a> {
    pub(crate) fn new(src: &'a str) -> Self {
        Self { src, pos: 0 }
    }

    pub(crate) fn pos(&self) -> usize {
        self.pos
    }

    pub(crate) fn at_end(&self) -> bool {
        self.pos >= self.src.len()
    }

    pub(crate) fn peek(&self) -> Option<char> {
        self.src[self.pos..].chars().next()
    }

    pub(crate) fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    pub(crate) fn error(&self, message: impl Into<String>) -> ObjectSyntaxError {
        ObjectSyntaxError {
            offset: self.pos,
            message: message.into(),
        }
    }

    /// Skips whitespace and `//` / `/* */` comments.
    pub(crate) fn skip_trivia(&mut self) -> Result<(), ObjectSyntaxError> {
        loop {
            match self.peek() {
                Some(c) if c.is_whitespace() => {
                    self.bump();
                }
                Some('/') if self.src[self.pos..].starts_with("//") => {
                    while let Some(c) = self.bump() {
                        if c == '\n' {
                            break;
                        }
                    }
                }
                Some('/') if self.src[self.pos..].starts_with("/*") => {
                    let start = self.pos;
                    self.pos += 2;
                    match self.src[self.pos..].find("*/") {
                        Some(i) => self.pos += i + 2,
                        None => {
                            self.pos = start;
                            return Err(self.error("unterminated block comment"));
                        }
                    }
                }
                _ => return Ok(()),
            }
        }
    }

    pub(crate) fn parse_value(&mut self) -> Result<Value, ObjectSyntaxError> {
        match self.peek() {
            Some('{') => self.parse_object().map(Value::Object),
            Some('[') => self.parse_array().map(Value::Array),
            Some('"') | Some('\'') => self.parse_string().map(Value::String),
            Some(c) if c.is_ascii_digit() || c == '-' || c == '+' || c == '.' => {
                self.parse_number()
            }
            Some(c) if c.is_alphabetic() || c == '_' || c == '$' => {
                let start = self.pos;
                let word = self.take_identifier();
                match word {
                    "true" => Ok(Value::Bool(true)),
                    "false" => Ok(Value::Bool(false)),
                    "null" => Ok(Value::Null),
                    other => {
                        let message = format!("unexpected identifier '{}'", other);
                        self.pos = start;
                        Err(self.error(message))
                    }
                }
            }
            Some(c) => Err(self.error(format!("unexpected character '{}'", c))),
            None => Err(self.error("unexpected end of format object")),
        }
    }

    fn parse_object(&mut self) -> Result<Map<String, Value>, ObjectSyntaxError> {
        self.expect('{')?;
        let mut map = Map::new();
        loop {
            self.skip_trivia()?;
            if self.peek() == Some('}') {
                self.bump();
                return Ok(map);
            }
            let key = self.parse_key()?;
            self.skip_trivia()?;
            self.expect(':')?;
            self.skip_trivia()?;
            let value = self.parse_value()?;
            map.insert(key, value);
            self.skip_trivia()?;
            match self.peek() {
                Some(',') => {
                    self.bump();
                }
                Some('}') => {
                    self.bump();
                    return Ok(map);
                }
                _ => return Err(self.error("expected ',' or '}' in object")),
            }
        }
    }

    fn parse_array(&mut self) -> Result<Vec<Value>, ObjectSyntaxError> {
        self.expect('[')?;
        let mut items = Vec::new();
        loop {
            self.skip_trivia()?;
            if self.peek() == Some(']') {
                self.bump();
                return Ok(items);
            }
            items.push(self.parse_value()?);
            self.skip_trivia()?;
            match self.peek() {
                Some(',') => {
                    self.bump();
                }
                Some(']') => {
                    self.bump();
                    return Ok(items);
                }
                _ => return Err(self.error("expected ',' or ']' in array")),
            }
        }
    }

    fn parse_key(&mut self) -> Result<String, ObjectSyntaxError> {
        match self.peek() {
            Some('"') | Some('\'') => self.parse_string(),
            Some(c) if c.is_alphanumeric() || c == '_' || c == '$' => {
                Ok(self.take_identifier().to_string())
            }
            _ => Err(self.error("expected property name")),
        }
    }

    pub(crate) fn take_identifier(&mut self) -> &'a str {
        let start = self.pos;
        while let Some(c) = self.peek() {
            if c.is_alphanumeric() || c == '_' || c == '$' {
                self.bump();
            } else {
                break;
            }
        }
        &self.src[start..self.pos]
    }

    pub(crate) fn parse_string(&mut self) -> Result<String, ObjectSyntaxError> {
        let quote = match self.peek() {
            Some(q @ ('"' | '\'')) => q,
            _ => return Err(self.error("expected string literal")),
        };
        self.bump();
        let mut out = String::new();
        loop {
            let Some(c) = self.bump() else {
                return Err(self.error("unterminated string literal"));
            };
            if c == quote {
                return Ok(out);
            }
            if c != '\\' {
                out.push(c);
                continue;
            }
            let Some(escaped) = self.bump() else {
                return Err(self.error("unterminated escape sequence"));
            };
            match escaped {
                'n' => out.push('\n'),
                't' => out.push('\t'),
                'r' => out.push('\r'),
                'b' => out.push('\u{0008}'),
                'f' => out.push('\u{000C}'),
                'v' => out.push('\u{000B}'),
                '0' => out.push('\0'),
                '\n' => {} // line continuation
                'x' => out.push(self.parse_hex_escape(2)?),
                'u' => out.push(self.parse_hex_escape(4)?),
                other => out.push(other),
            }
        }
    }

    fn parse_hex_escape(&mut self, digits: usize) -> Result<char, ObjectSyntaxError> {
        let start = self.pos;
        for _ in 0..digits {
            match self.bump() {
                Some(c) if c.is_ascii_hexdigit() => {}
                _ => {
                    self.pos = start;
                    return Err(self.error("invalid hex escape"));
                }
            }
        }
        let code = u32::from_str_radix(&self.src[start..self.pos], 16)
            .expect("hex digits were just checked");
        char::from_u32(code).ok_or_else(|| ObjectSyntaxError {
            offset: start,
            message: "escape is not a valid character".to_string(),
        })
    }

    fn parse_number(&mut self) -> Result<Value, ObjectSyntaxError> {
        let negative = match self.peek() {
            Some('-') => {
                self.bump();
                true
            }
            Some('+') => {
                self.bump();
                false
            }
            _ => false,
        };

        if self.src[self.pos..].starts_with("0x") || self.src[self.pos..].starts_with("0X") {
            self.pos += 2;
            let start = self.pos;
            while matches!(self.peek(), Some(c) if c.is_ascii_hexdigit()) {
                self.bump();
            }
            if start == self.pos {
                return Err(self.error("expected hex digits"));
            }
            let magnitude = i64::from_str_radix(&self.src[start..self.pos], 16)
                .map_err(|_| self.error("hex literal out of range"))?;
            let value = if negative { -magnitude } else { magnitude };
            return Ok(Value::Number(Number::from(value)));
        }

        let start = self.pos;
        let mut saw_digit = false;
        let mut is_float = false;
        while matches!(self.peek(), Some(c) if c.is_ascii_digit()) {
            saw_digit = true;
            self.bump();
        }
        if self.peek() == Some('.') {
            is_float = true;
            self.bump();
            while matches!(self.peek(), Some(c) if c.is_ascii_digit()) {
                saw_digit = true;
                self.bump();
            }
        }
        if !saw_digit {
            return Err(self.error("invalid number"));
        }
        if matches!(self.peek(), Some('e') | Some('E')) {
            is_float = true;
            self.bump();
            if matches!(self.peek(), Some('+') | Some('-')) {
                self.bump();
            }
            let exp_start = self.pos;
            while matches!(self.peek(), Some(c) if c.is_ascii_digit()) {
                self.bump();
            }
            if exp_start == self.pos {
                return Err(self.error("expected exponent digits"));
            }
        }

        let text = &self.src[start..self.pos];
        if !is_float {
            if let Ok(magnitude) = text.parse::<i64>() {
                let value = if negative { -magnitude } else { magnitude };
                return Ok(Value::Number(Number::from(value)));
            }
        }
        let magnitude: f64 = text
            .parse()
            .map_err(|_| self.error("invalid number"))?;
        let value = if negative { -magnitude } else { magnitude };
        Number::from_f64(value)
            .map(Value::Number)
            .ok_or_else(|| self.error("number out of range"))
    }

    fn expect(&mut self, expected: char) -> Result<(), ObjectSyntaxError> {
        if self.peek() == Some(expected) {
            self.bump();
            Ok(())
        } else {
            Err(self.error(format!("expected '{}'", expected)))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn end_of_simple_object() {
        assert_eq!(object_end("{a: 1}"), Ok(6));
    }

    #[test]
    fn end_ignores_trailing_content() {
        assert_eq!(object_end("{a: 1} }trailing"), Ok(6));
    }

    #[test]
    fn end_skips_braces_inside_strings() {
        let src = r#"{msg: "un{balanced}}"} rest"#;
        let end = object_end(src).unwrap();
        assert_eq!(&src[..end], r#"{msg: "un{balanced}}"}"#);
    }

    #[test]
    fn end_handles_nested_objects() {
        let src = "{trim: {side: 'left', length: 3}}!";
        assert_eq!(object_end(src), Ok(src.len() - 1));
    }

    #[test]
    fn parse_permissive_syntax() {
        let map = parse_format_object(
            "{unquoted: 'single', \"quoted\": 2, nested: {x: [1, 2,],}, flag: true,}",
        )
        .unwrap();
        assert_eq!(map["unquoted"], json!("single"));
        assert_eq!(map["quoted"], json!(2));
        assert_eq!(map["nested"], json!({"x": [1, 2]}));
        assert_eq!(map["flag"], json!(true));
    }

    #[test]
    fn parse_numbers() {
        let map =
            parse_format_object("{hex: 0x1F, neg: -3, plus: +4, frac: .5, exp: 2e3}").unwrap();
        assert_eq!(map["hex"], json!(31));
        assert_eq!(map["neg"], json!(-3));
        assert_eq!(map["plus"], json!(4));
        assert_eq!(map["frac"], json!(0.5));
        assert_eq!(map["exp"], json!(2000.0));
    }

    #[test]
    fn parse_comments_and_escapes() {
        let map = parse_format_object(
            "{ // line\n key: 'a\\'b', /* block */ other: \"tab\\t\" }",
        )
        .unwrap();
        assert_eq!(map["key"], json!("a'b"));
        assert_eq!(map["other"], json!("tab\t"));
    }

    #[test]
    fn rejects_trailing_garbage() {
        let err = parse_format_object("{a: 1} nonsense").unwrap_err();
        assert!(err.message.contains("unexpected characters"));
    }

    #[test]
    fn rejects_non_object() {
        let err = parse_format_object("[1, 2]").unwrap_err();
        assert!(err.message.contains("must be an object"));
    }

    #[test]
    fn rejects_unterminated_string() {
        assert!(object_end("{a: 'oops}").is_err());
    }

    #[test]
    fn rejects_bare_identifier_value() {
        let err = parse_format_object("{a: bogus}").unwrap_err();
        assert!(err.message.contains("unexpected identifier"));
    }
}
