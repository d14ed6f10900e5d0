//! Tokenizer for the expression language.

use super::CompileError;

#[derive(Debug, Clone, PartialEq)]
pub(super) enum Token {
    Number(f64),
    Str(String),
    Ident(String),
    True,
    False,
    Null,
    // Operators and punctuation
    OrOr,
    AndAnd,
    EqEq,
    NotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    Bang,
    Dot,
    Comma,
    LParen,
    RParen,
}

#[derive(Debug, Clone, PartialEq)]
pub(super) struct Spanned {
    pub token: Token,
    pub offset: usize,
}

pub(super) fn tokenize(source: &str) -> Result<Vec<Spanned>, CompileError> {
    let mut tokens = Vec::new();
    let bytes = source.as_bytes();
    let mut i = 0;

    while i < bytes.len() {
        let start = i;
        let c = bytes[i] as char;

        match c {
            c if c.is_whitespace() => {
                i += 1;
                continue;
            }
            '(' => push_single(&mut tokens, Token::LParen, &mut i, start),
            ')' => push_single(&mut tokens, Token::RParen, &mut i, start),
            ',' => push_single(&mut tokens, Token::Comma, &mut i, start),
            '.' => push_single(&mut tokens, Token::Dot, &mut i, start),
            '+' => push_single(&mut tokens, Token::Plus, &mut i, start),
            '-' => push_single(&mut tokens, Token::Minus, &mut i, start),
            '*' => push_single(&mut tokens, Token::Star, &mut i, start),
            '/' => push_single(&mut tokens, Token::Slash, &mut i, start),
            '%' => push_single(&mut tokens, Token::Percent, &mut i, start),
            '&' => {
                if bytes.get(i + 1) == Some(&b'&') {
                    tokens.push(Spanned {
                        token: Token::AndAnd,
                        offset: start,
                    });
                    i += 2;
                } else {
                    return Err(CompileError::new("expected '&&'", start));
                }
            }
            '|' => {
                if bytes.get(i + 1) == Some(&b'|') {
                    tokens.push(Spanned {
                        token: Token::OrOr,
                        offset: start,
                    });
                    i += 2;
                } else {
                    return Err(CompileError::new("expected '||'", start));
                }
            }
            '=' => {
                if bytes.get(i + 1) == Some(&b'=') {
                    tokens.push(Spanned {
                        token: Token::EqEq,
                        offset: start,
                    });
                    i += 2;
                } else {
                    return Err(CompileError::new("expected '==' (assignment is not supported)", start));
                }
            }
            '!' => {
                if bytes.get(i + 1) == Some(&b'=') {
                    tokens.push(Spanned {
                        token: Token::NotEq,
                        offset: start,
                    });
                    i += 2;
                } else {
                    push_single(&mut tokens, Token::Bang, &mut i, start);
                }
            }
            '<' => {
                if bytes.get(i + 1) == Some(&b'=') {
                    tokens.push(Spanned {
                        token: Token::LtEq,
                        offset: start,
                    });
                    i += 2;
                } else {
                    push_single(&mut tokens, Token::Lt, &mut i, start);
                }
            }
            '>' => {
                if bytes.get(i + 1) == Some(&b'=') {
                    tokens.push(Spanned {
                        token: Token::GtEq,
                        offset: start,
                    });
                    i += 2;
                } else {
                    push_single(&mut tokens, Token::Gt, &mut i, start);
                }
            }
            '\'' | '"' => {
                let (value, next) = lex_string(source, i, c)?;
                tokens.push(Spanned {
                    token: Token::Str(value),
                    offset: start,
                });
                i = next;
            }
            c if c.is_ascii_digit() => {
                let (value, next) = lex_number(source, i)?;
                tokens.push(Spanned {
                    token: Token::Number(value),
                    offset: start,
                });
                i = next;
            }
            c if is_ident_start(c) => {
                let (word, next) = lex_ident(source, i);
                let token = match word.as_str() {
                    "true" => Token::True,
                    "false" => Token::False,
                    "null" => Token::Null,
                    _ => Token::Ident(word),
                };
                tokens.push(Spanned {
                    token,
                    offset: start,
                });
                i = next;
            }
            other => {
                return Err(CompileError::new(
                    format!("unexpected character '{other}'"),
                    start,
                ));
            }
        }
    }

    Ok(tokens)
}

fn push_single(tokens: &mut Vec<Spanned>, token: Token, i: &mut usize, offset: usize) {
    tokens.push(Spanned { token, offset });
    *i += 1;
}

fn is_ident_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

fn is_ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '-'
}

fn lex_ident(source: &str, start: usize) -> (String, usize) {
    let mut end = start;
    for (idx, c) in source[start..].char_indices() {
        if is_ident_char(c) {
            end = start + idx + c.len_utf8();
        } else {
            break;
        }
    }
    (source[start..end].to_string(), end)
}

fn lex_number(source: &str, start: usize) -> Result<(f64, usize), CompileError> {
    let mut end = start;
    let mut seen_dot = false;
    for (idx, c) in source[start..].char_indices() {
        if c.is_ascii_digit() {
            end = start + idx + 1;
        } else if c == '.' && !seen_dot {
            // A dot is part of the number only when followed by a digit;
            // otherwise it belongs to a dotted path like `1.foo` (an error
            // the parser will report).
            let after = source[start + idx + 1..].chars().next();
            if after.is_some_and(|c| c.is_ascii_digit()) {
                seen_dot = true;
                end = start + idx + 1;
            } else {
                break;
            }
        } else {
            break;
        }
    }
    source[start..end]
        .parse::<f64>()
        .map(|n| (n, end))
        .map_err(|_| CompileError::new("invalid number literal", start))
}

fn lex_string(source: &str, start: usize, quote: char) -> Result<(String, usize), CompileError> {
    let mut value = String::new();
    let mut chars = source[start + 1..].char_indices();

    while let Some((idx, c)) = chars.next() {
        if c == quote {
            return Ok((value, start + 1 + idx + c.len_utf8()));
        }
        if c == '\\' {
            match chars.next() {
                Some((_, 'n')) => value.push('\n'),
                Some((_, 't')) => value.push('\t'),
                Some((_, '\\')) => value.push('\\'),
                Some((_, c)) if c == quote => value.push(c),
                Some((_, other)) => {
                    return Err(CompileError::new(
                        format!("unknown escape '\\{other}'"),
                        start + 1 + idx,
                    ));
                }
                None => break,
            }
        } else {
            value.push(c);
        }
    }

    Err(CompileError::new("unterminated string literal", start))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<Token> {
        tokenize(source).unwrap().into_iter().map(|s| s.token).collect()
    }

    #[test]
    fn lexes_operators_and_idents() {
        assert_eq!(
            kinds("status == \"open\" && size >= 10"),
            vec![
                Token::Ident("status".into()),
                Token::EqEq,
                Token::Str("open".into()),
                Token::AndAnd,
                Token::Ident("size".into()),
                Token::GtEq,
                Token::Number(10.0),
            ]
        );
    }

    #[test]
    fn lexes_dotted_paths_as_separate_tokens() {
        assert_eq!(
            kinds("a.name"),
            vec![
                Token::Ident("a".into()),
                Token::Dot,
                Token::Ident("name".into()),
            ]
        );
    }

    #[test]
    fn lexes_decimal_numbers() {
        assert_eq!(kinds("3.25"), vec![Token::Number(3.25)]);
        assert_eq!(kinds("10"), vec![Token::Number(10.0)]);
    }

    #[test]
    fn string_escapes() {
        assert_eq!(
            kinds(r#""a\"b\n""#),
            vec![Token::Str("a\"b\n".into())]
        );
        assert_eq!(kinds(r#"'it''s'"#).len(), 2); // two adjacent strings
    }

    #[test]
    fn keywords() {
        assert_eq!(kinds("true false null"), vec![Token::True, Token::False, Token::Null]);
    }

    #[test]
    fn rejects_single_equals() {
        let err = tokenize("a = 1").unwrap_err();
        assert!(err.message.contains("=="));
        assert_eq!(err.offset, 2);
    }

    #[test]
    fn rejects_unterminated_string() {
        let err = tokenize("\"oops").unwrap_err();
        assert!(err.message.contains("unterminated"));
    }

    #[test]
    fn rejects_unknown_characters() {
        assert!(tokenize("a # b").is_err());
    }
}
