//! Recursive-descent parser for the trajectory log subset of JSON.
//!
//! The grammar is deliberately narrow: a top-level object mapping trajectory
//! ids to arrays of frame objects with the fields `t_id`, `t`, `x`, `y`,
//! `p_x`, `p_y`. Unrecognized frame fields are skipped with full awareness of
//! nested delimiters and quoted strings. Any structural violation aborts the
//! whole parse; errors carry the byte offset and what was expected there.

use hashbrown::HashMap;
use thiserror::Error;

use crate::data::Frame;

/// Structural failure while parsing a trajectory document.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// The document does not start with `{` after leading whitespace.
    #[error("unsupported format: top-level value must be an object")]
    UnsupportedFormat,
    #[error("expected {expected} at byte {offset}")]
    Expected {
        expected: &'static str,
        offset: usize,
    },
    #[error("unterminated string starting at byte {offset}")]
    UnterminatedString { offset: usize },
    #[error("invalid number {token:?} at byte {offset}")]
    InvalidNumber { token: String, offset: usize },
    #[error("unexpected end of input at byte {offset}")]
    UnexpectedEof { offset: usize },
}

/// Parse a complete trajectory document into frames keyed by trajectory id.
///
/// Returns the first structural error encountered; partial results are never
/// surfaced.
pub fn parse_trajectory_json(text: &str) -> Result<HashMap<String, Vec<Frame>>, ParseError> {
    let mut cursor = Cursor::new(text);
    cursor.skip_ws();
    if cursor.peek() != Some(b'{') {
        return Err(ParseError::UnsupportedFormat);
    }
    cursor.bump();

    let mut trajectories = HashMap::new();
    cursor.skip_ws();
    if cursor.eat(b'}') {
        return Ok(trajectories);
    }
    loop {
        cursor.skip_ws();
        let key = cursor.parse_string()?;
        cursor.skip_ws();
        cursor.expect(b':', "':' after trajectory key")?;
        let frames = cursor.parse_frame_array()?;
        trajectories.insert(key, frames);
        cursor.skip_ws();
        if cursor.eat(b',') {
            continue;
        }
        cursor.expect(b'}', "',' or '}' after trajectory entry")?;
        break;
    }
    Ok(trajectories)
}

struct Cursor<'a> {
    src: &'a str,
    buf: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn new(src: &'a str) -> Self {
        Self {
            src,
            buf: src.as_bytes(),
            pos: 0,
        }
    }

    #[inline]
    fn peek(&self) -> Option<u8> {
        self.buf.get(self.pos).copied()
    }

    #[inline]
    fn bump(&mut self) -> Option<u8> {
        let byte = self.peek()?;
        self.pos += 1;
        Some(byte)
    }

    #[inline]
    fn eat(&mut self, byte: u8) -> bool {
        if self.peek() == Some(byte) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expect(&mut self, byte: u8, expected: &'static str) -> Result<(), ParseError> {
        if self.eat(byte) {
            Ok(())
        } else {
            Err(ParseError::Expected {
                expected,
                offset: self.pos,
            })
        }
    }

    fn skip_ws(&mut self) {
        while let Some(b' ' | b'\t' | b'\n' | b'\r') = self.peek() {
            self.pos += 1;
        }
    }

    /// Parse a double-quoted string. `\"` is the only escape honored; any
    /// other backslash sequence is carried through verbatim.
    fn parse_string(&mut self) -> Result<String, ParseError> {
        let start = self.pos;
        self.expect(b'"', "'\"' to open string")?;
        let mut bytes = Vec::new();
        loop {
            match self.bump() {
                None => return Err(ParseError::UnterminatedString { offset: start }),
                Some(b'"') => break,
                Some(b'\\') => match self.bump() {
                    None => return Err(ParseError::UnterminatedString { offset: start }),
                    Some(b'"') => bytes.push(b'"'),
                    Some(other) => {
                        bytes.push(b'\\');
                        bytes.push(other);
                    }
                },
                Some(byte) => bytes.push(byte),
            }
        }
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }

    /// Consume a numeric token greedily: optional leading `-`, then digits,
    /// `.`, `e`, `E`, `+`, `-`.
    fn number_token(&mut self) -> Result<(&'a str, usize), ParseError> {
        self.skip_ws();
        let start = self.pos;
        if self.peek() == Some(b'-') {
            self.pos += 1;
        }
        while let Some(b'0'..=b'9' | b'.' | b'e' | b'E' | b'+' | b'-') = self.peek() {
            self.pos += 1;
        }
        if self.pos == start {
            return Err(ParseError::Expected {
                expected: "number",
                offset: start,
            });
        }
        Ok((&self.src[start..self.pos], start))
    }

    fn parse_f32(&mut self) -> Result<f32, ParseError> {
        let (token, offset) = self.number_token()?;
        token.parse().map_err(|_| ParseError::InvalidNumber {
            token: token.to_string(),
            offset,
        })
    }

    fn parse_i64(&mut self) -> Result<i64, ParseError> {
        let (token, offset) = self.number_token()?;
        token.parse().map_err(|_| ParseError::InvalidNumber {
            token: token.to_string(),
            offset,
        })
    }

    fn parse_i32(&mut self) -> Result<i32, ParseError> {
        let (token, offset) = self.number_token()?;
        token.parse().map_err(|_| ParseError::InvalidNumber {
            token: token.to_string(),
            offset,
        })
    }

    fn parse_float_array(&mut self) -> Result<Vec<f32>, ParseError> {
        self.skip_ws();
        self.expect(b'[', "'[' to open number array")?;
        let mut values = Vec::new();
        self.skip_ws();
        if self.eat(b']') {
            return Ok(values);
        }
        loop {
            values.push(self.parse_f32()?);
            self.skip_ws();
            if self.eat(b',') {
                continue;
            }
            self.expect(b']', "',' or ']' in number array")?;
            break;
        }
        Ok(values)
    }

    fn parse_frame_array(&mut self) -> Result<Vec<Frame>, ParseError> {
        self.skip_ws();
        self.expect(b'[', "'[' to open frame array")?;
        let mut frames = Vec::new();
        self.skip_ws();
        if self.eat(b']') {
            return Ok(frames);
        }
        loop {
            frames.push(self.parse_frame()?);
            self.skip_ws();
            if self.eat(b',') {
                continue;
            }
            self.expect(b']', "',' or ']' after frame object")?;
            break;
        }
        Ok(frames)
    }

    fn parse_frame(&mut self) -> Result<Frame, ParseError> {
        self.skip_ws();
        self.expect(b'{', "'{' to open frame object")?;
        let mut frame = Frame::default();
        self.skip_ws();
        if self.eat(b'}') {
            return Ok(frame);
        }
        loop {
            self.skip_ws();
            let key = self.parse_string()?;
            self.skip_ws();
            self.expect(b':', "':' after frame key")?;
            match key.as_str() {
                "t_id" => frame.trajectory_id = self.parse_i32()?,
                "t" => frame.timestamp = self.parse_i64()?,
                "x" => frame.x = self.parse_f32()?,
                "y" => frame.y = self.parse_f32()?,
                "p_x" => frame.predicted_x = self.parse_float_array()?,
                "p_y" => frame.predicted_y = self.parse_float_array()?,
                _ => self.skip_value()?,
            }
            self.skip_ws();
            if self.eat(b',') {
                continue;
            }
            self.expect(b'}', "',' or '}' after frame field")?;
            break;
        }
        Ok(frame)
    }

    /// Skip one value of any shape without interpreting it. Structural
    /// characters inside quoted strings do not count toward balancing.
    fn skip_value(&mut self) -> Result<(), ParseError> {
        self.skip_ws();
        match self.peek() {
            None => Err(ParseError::UnexpectedEof { offset: self.pos }),
            Some(b'"') => self.skip_string(),
            Some(b'{') => self.skip_balanced(b'{', b'}'),
            Some(b'[') => self.skip_balanced(b'[', b']'),
            // Number or literal: consume up to the next structural character.
            Some(_) => {
                while let Some(byte) = self.peek() {
                    match byte {
                        b',' | b'}' | b']' | b' ' | b'\t' | b'\n' | b'\r' => break,
                        _ => self.pos += 1,
                    }
                }
                Ok(())
            }
        }
    }

    fn skip_string(&mut self) -> Result<(), ParseError> {
        let start = self.pos;
        self.bump(); // opening quote
        loop {
            match self.bump() {
                None => return Err(ParseError::UnterminatedString { offset: start }),
                Some(b'\\') => {
                    self.bump();
                }
                Some(b'"') => return Ok(()),
                Some(_) => {}
            }
        }
    }

    fn skip_balanced(&mut self, open: u8, close: u8) -> Result<(), ParseError> {
        let mut depth = 0usize;
        loop {
            match self.peek() {
                None => {
                    return Err(ParseError::UnexpectedEof { offset: self.pos });
                }
                Some(b'"') => self.skip_string()?,
                Some(byte) => {
                    self.pos += 1;
                    if byte == open {
                        depth += 1;
                    } else if byte == close {
                        depth -= 1;
                        if depth == 0 {
                            return Ok(());
                        }
                    }
                }
            }
        }
    }
}
