//! Tokenizer for the XML subset ontology documents use.
//!
//! Handles tags with quoted attributes, character data, entity
//! references, comments, CDATA sections and the XML declaration.
//! Namespaces, DTD internals and processing instructions beyond the
//! declaration are out of scope.

use std::iter::Peekable;
use std::str::Chars;

#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    StartTag {
        name: String,
        attributes: Vec<(String, String)>,
        self_closing: bool,
    },
    EndTag(String),
    Text(String),
}

#[derive(Debug, thiserror::Error)]
pub enum XmlError {
    #[error("Unexpected character: {0}")]
    UnexpectedChar(char),
    #[error("Unexpected end of document")]
    UnexpectedEof,
    #[error("Unterminated attribute value")]
    UnterminatedValue,
    #[error("Unknown entity reference: &{0};")]
    UnknownEntity(String),
    #[error("Mismatched closing tag: expected </{expected}>, found </{found}>")]
    MismatchedTag { expected: String, found: String },
    #[error("No root element")]
    NoRoot,
    #[error("Content after the root element")]
    TrailingContent,
}

pub struct Lexer<'a> {
    chars: Peekable<Chars<'a>>,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        Self {
            chars: input.chars().peekable(),
        }
    }

    pub fn tokenize(mut self) -> Result<Vec<Token>, XmlError> {
        let mut tokens = Vec::new();

        while let Some(&c) = self.chars.peek() {
            if c == '<' {
                self.chars.next();
                if let Some(token) = self.read_markup()? {
                    tokens.push(token);
                }
            } else {
                let text = self.read_text()?;
                tokens.push(Token::Text(text));
            }
        }

        Ok(tokens)
    }

    /// Markup after a consumed `<`. Returns None for declarations,
    /// comments and DOCTYPE, which carry no content.
    fn read_markup(&mut self) -> Result<Option<Token>, XmlError> {
        match self.chars.peek() {
            Some('?') => {
                self.skip_until("?>")?;
                Ok(None)
            }
            Some('!') => {
                self.chars.next();
                if self.try_consume("--") {
                    self.skip_until("-->")?;
                    Ok(None)
                } else if self.try_consume("[CDATA[") {
                    let text = self.read_until("]]>")?;
                    Ok(Some(Token::Text(text)))
                } else {
                    // DOCTYPE and friends
                    self.skip_until(">")?;
                    Ok(None)
                }
            }
            Some('/') => {
                self.chars.next();
                let name = self.read_name()?;
                self.skip_whitespace();
                match self.chars.next() {
                    Some('>') => Ok(Some(Token::EndTag(name))),
                    Some(c) => Err(XmlError::UnexpectedChar(c)),
                    None => Err(XmlError::UnexpectedEof),
                }
            }
            Some(_) => self.read_start_tag().map(Some),
            None => Err(XmlError::UnexpectedEof),
        }
    }

    fn read_start_tag(&mut self) -> Result<Token, XmlError> {
        let name = self.read_name()?;
        let mut attributes = Vec::new();

        loop {
            self.skip_whitespace();
            match self.chars.peek() {
                Some('>') => {
                    self.chars.next();
                    return Ok(Token::StartTag {
                        name,
                        attributes,
                        self_closing: false,
                    });
                }
                Some('/') => {
                    self.chars.next();
                    match self.chars.next() {
                        Some('>') => {
                            return Ok(Token::StartTag {
                                name,
                                attributes,
                                self_closing: true,
                            });
                        }
                        Some(c) => return Err(XmlError::UnexpectedChar(c)),
                        None => return Err(XmlError::UnexpectedEof),
                    }
                }
                Some(_) => {
                    attributes.push(self.read_attribute()?);
                }
                None => return Err(XmlError::UnexpectedEof),
            }
        }
    }

    fn read_attribute(&mut self) -> Result<(String, String), XmlError> {
        let name = self.read_name()?;
        self.skip_whitespace();
        match self.chars.next() {
            Some('=') => {}
            Some(c) => return Err(XmlError::UnexpectedChar(c)),
            None => return Err(XmlError::UnexpectedEof),
        }
        self.skip_whitespace();

        let quote = match self.chars.next() {
            Some(q @ ('"' | '\'')) => q,
            Some(c) => return Err(XmlError::UnexpectedChar(c)),
            None => return Err(XmlError::UnexpectedEof),
        };

        let mut value = String::new();
        loop {
            match self.chars.next() {
                Some(c) if c == quote => return Ok((name, value)),
                Some('&') => value.push(self.read_entity()?),
                Some(c) => value.push(c),
                None => return Err(XmlError::UnterminatedValue),
            }
        }
    }

    fn read_name(&mut self) -> Result<String, XmlError> {
        let mut name = String::new();
        while let Some(&c) = self.chars.peek() {
            if c.is_alphanumeric() || matches!(c, '_' | '-' | '.' | ':') {
                name.push(c);
                self.chars.next();
            } else {
                break;
            }
        }
        if name.is_empty() {
            match self.chars.peek() {
                Some(&c) => Err(XmlError::UnexpectedChar(c)),
                None => Err(XmlError::UnexpectedEof),
            }
        } else {
            Ok(name)
        }
    }

    /// Character data up to the next `<`, entities decoded.
    fn read_text(&mut self) -> Result<String, XmlError> {
        let mut text = String::new();
        while let Some(&c) = self.chars.peek() {
            match c {
                '<' => break,
                '&' => {
                    self.chars.next();
                    text.push(self.read_entity()?);
                }
                _ => {
                    text.push(c);
                    self.chars.next();
                }
            }
        }
        Ok(text)
    }

    /// Entity reference after a consumed `&`.
    fn read_entity(&mut self) -> Result<char, XmlError> {
        let mut name = String::new();
        loop {
            match self.chars.next() {
                Some(';') => break,
                Some(c) if name.len() < 8 => name.push(c),
                Some(_) => return Err(XmlError::UnknownEntity(name)),
                None => return Err(XmlError::UnexpectedEof),
            }
        }

        match name.as_str() {
            "amp" => Ok('&'),
            "lt" => Ok('<'),
            "gt" => Ok('>'),
            "quot" => Ok('"'),
            "apos" => Ok('\''),
            _ => {
                if let Some(digits) = name.strip_prefix("#x").or(name.strip_prefix("#X")) {
                    u32::from_str_radix(digits, 16)
                        .ok()
                        .and_then(char::from_u32)
                        .ok_or(XmlError::UnknownEntity(name.clone()))
                } else if let Some(digits) = name.strip_prefix('#') {
                    digits
                        .parse::<u32>()
                        .ok()
                        .and_then(char::from_u32)
                        .ok_or(XmlError::UnknownEntity(name.clone()))
                } else {
                    Err(XmlError::UnknownEntity(name))
                }
            }
        }
    }

    fn skip_whitespace(&mut self) {
        while let Some(&c) = self.chars.peek() {
            if c.is_whitespace() {
                self.chars.next();
            } else {
                break;
            }
        }
    }

    fn try_consume(&mut self, literal: &str) -> bool {
        let mut probe = self.chars.clone();
        for expected in literal.chars() {
            if probe.next() != Some(expected) {
                return false;
            }
        }
        self.chars = probe;
        true
    }

    fn read_until(&mut self, terminator: &str) -> Result<String, XmlError> {
        let mut text = String::new();
        loop {
            if self.try_consume(terminator) {
                return Ok(text);
            }
            match self.chars.next() {
                Some(c) => text.push(c),
                None => return Err(XmlError::UnexpectedEof),
            }
        }
    }

    fn skip_until(&mut self, terminator: &str) -> Result<(), XmlError> {
        self.read_until(terminator).map(|_| ())
    }
}
