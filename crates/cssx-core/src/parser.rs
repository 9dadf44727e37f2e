use crate::ast::{Declaration, Document, RuleNode};
use crate::error::{Span, SyntaxError};

/// Deepest block nesting accepted. Parsing and emitting both recurse per level.
pub const MAX_DEPTH: usize = 256;

/// Parse nested `selector { property: value; ... }` source into a rule tree.
pub fn parse(input: &str) -> Result<Document, SyntaxError> {
    let mut cursor = Cursor::new(input);
    let (_, nodes) = parse_block_body(&mut cursor, None, 0)?;
    Ok(Document { nodes })
}

/// Parse declarations and nested rules until the closing brace of the block
/// opened at `opened`, or until end of input at the top level.
fn parse_block_body(
    cursor: &mut Cursor<'_>,
    opened: Option<Span>,
    depth: usize,
) -> Result<(Vec<Declaration>, Vec<RuleNode>), SyntaxError> {
    let mut declarations = Vec::new();
    let mut children = Vec::new();

    loop {
        cursor.skip_trivia()?;
        let start = cursor.span();

        match cursor.peek() {
            None => {
                return match opened {
                    Some(span) => Err(SyntaxError::new("unterminated block", span)),
                    None => Ok((declarations, children)),
                };
            }
            Some('}') => {
                if opened.is_none() {
                    return Err(SyntaxError::new("stray '}'", start));
                }
                cursor.bump();
                return Ok((declarations, children));
            }
            Some(';') => {
                cursor.bump();
                continue;
            }
            Some(_) => {}
        }

        let (text, terminator) = cursor.read_statement()?;
        match terminator {
            Some('{') => {
                let selector = text.trim();
                if selector.is_empty() {
                    return Err(SyntaxError::new("missing selector before '{'", start));
                }
                if depth >= MAX_DEPTH {
                    return Err(SyntaxError::new("nesting too deep", start));
                }
                cursor.bump();
                let (inner_decls, inner_children) =
                    parse_block_body(cursor, Some(start), depth + 1)?;
                children.push(RuleNode {
                    selector: selector.to_string(),
                    declarations: inner_decls,
                    children: inner_children,
                    span: start,
                });
            }
            terminator => {
                let Some(block) = opened else {
                    let message = if terminator.is_none() {
                        format!("expected '{{' after '{}'", text.trim())
                    } else {
                        format!("declaration '{}' outside of a block", text.trim())
                    };
                    return Err(SyntaxError::new(message, start));
                };
                match terminator {
                    Some(';') => {
                        cursor.bump();
                    }
                    Some(_) => {}
                    None => return Err(SyntaxError::new("unterminated block", block)),
                }
                declarations.push(parse_declaration(&text, start)?);
            }
        }
    }
}

fn parse_declaration(text: &str, span: Span) -> Result<Declaration, SyntaxError> {
    let Some((property, value)) = text.split_once(':') else {
        return Err(SyntaxError::new(
            format!("invalid declaration '{}': expected ':'", text.trim()),
            span,
        ));
    };

    let property = property.trim();
    if property.is_empty() {
        return Err(SyntaxError::new("missing property name before ':'", span));
    }

    Ok(Declaration {
        property: property.to_string(),
        value: value.trim().to_string(),
        span,
    })
}

struct Cursor<'a> {
    src: &'a str,
    pos: usize,
    line: usize,
    column: usize,
}

impl<'a> Cursor<'a> {
    fn new(src: &'a str) -> Self {
        Self {
            src,
            pos: 0,
            line: 1,
            column: 1,
        }
    }

    fn span(&self) -> Span {
        Span::new(self.line, self.column)
    }

    fn peek(&self) -> Option<char> {
        self.src[self.pos..].chars().next()
    }

    fn peek_second(&self) -> Option<char> {
        self.src[self.pos..].chars().nth(1)
    }

    fn bump(&mut self) -> Option<char> {
        let ch = self.peek()?;
        self.pos += ch.len_utf8();
        if ch == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(ch)
    }

    fn at_comment(&self) -> bool {
        self.peek() == Some('/') && self.peek_second() == Some('*')
    }

    fn skip_comment(&mut self) -> Result<(), SyntaxError> {
        let start = self.span();
        self.bump();
        self.bump();
        loop {
            match self.bump() {
                Some('*') if self.peek() == Some('/') => {
                    self.bump();
                    return Ok(());
                }
                Some(_) => {}
                None => return Err(SyntaxError::new("unterminated comment", start)),
            }
        }
    }

    fn skip_trivia(&mut self) -> Result<(), SyntaxError> {
        loop {
            match self.peek() {
                Some(ch) if ch.is_whitespace() => {
                    self.bump();
                }
                Some('/') if self.at_comment() => self.skip_comment()?,
                _ => return Ok(()),
            }
        }
    }

    /// Read up to (not including) the next `{`, `;` or `}` that is outside
    /// strings and parentheses. Comments are dropped from the returned text.
    fn read_statement(&mut self) -> Result<(String, Option<char>), SyntaxError> {
        let mut text = String::new();
        let mut parens = 0usize;

        loop {
            let Some(ch) = self.peek() else {
                return Ok((text, None));
            };
            match ch {
                '{' | ';' | '}' if parens == 0 => return Ok((text, Some(ch))),
                '"' | '\'' => self.read_string(&mut text)?,
                '/' if self.at_comment() => self.skip_comment()?,
                '(' => {
                    parens += 1;
                    text.push(ch);
                    self.bump();
                }
                ')' => {
                    parens = parens.saturating_sub(1);
                    text.push(ch);
                    self.bump();
                }
                _ => {
                    text.push(ch);
                    self.bump();
                }
            }
        }
    }

    fn read_string(&mut self, text: &mut String) -> Result<(), SyntaxError> {
        let start = self.span();
        let Some(quote) = self.bump() else {
            return Ok(());
        };
        text.push(quote);

        loop {
            match self.bump() {
                Some('\\') => {
                    text.push('\\');
                    if let Some(escaped) = self.bump() {
                        text.push(escaped);
                    }
                }
                Some(ch) if ch == quote => {
                    text.push(ch);
                    return Ok(());
                }
                Some(ch) => text.push(ch),
                None => return Err(SyntaxError::new("unterminated string", start)),
            }
        }
    }
}
