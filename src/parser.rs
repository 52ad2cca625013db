use logos::Logos;

use crate::error::WispError;
use crate::value::Value;

#[derive(Debug, Logos)]
#[logos(skip r"[ \t\r\n\f]+")]
pub enum Token<'a> {
    #[token("(")]
    LeftParen,

    #[token(")")]
    RightParen,

    #[regex(r"[^()\s]+", |lex| lex.slice())]
    Atom(&'a str),
}

type ParseResult<O> = Result<O, WispError>;

pub fn tokenize(input: &str) -> ParseResult<Vec<Token<'_>>> {
    let mut tokens = vec![];
    let mut tokenizer = Token::lexer(input);

    while let Some(result) = tokenizer.next() {
        match result {
            Ok(token) => tokens.push(token),
            Err(_) => {
                return Err(WispError::Syntax(format!(
                    "unrecognized input: {:?}",
                    tokenizer.slice()
                )))
            }
        }
    }

    Ok(tokens)
}

// Tokens that scan as base-10 integers become integers; every other
// token is a symbol.
fn atom(token: &str) -> Value {
    match token.parse::<i64>() {
        Ok(number) => Value::Integer(number),
        Err(_) => Value::Symbol(token.to_string()),
    }
}

/// Read one expression from the front of `tokens`, returning it
/// together with the tokens left over. Calling `read` again on the
/// leftovers yields the next top-level form.
pub fn read<'a, 'b>(tokens: &'a [Token<'b>]) -> ParseResult<(Value, &'a [Token<'b>])> {
    let (token, mut tokens) = match tokens.split_first() {
        Some(split) => split,
        None => return Err(WispError::Syntax("unexpected end of input".to_string())),
    };

    match token {
        Token::Atom(text) => Ok((atom(text), tokens)),
        Token::RightParen => Err(WispError::Syntax("unexpected close paren".to_string())),
        Token::LeftParen => {
            let mut elements = vec![];
            loop {
                match tokens.first() {
                    Some(Token::RightParen) => return Ok((Value::List(elements), &tokens[1..])),
                    Some(_) => {
                        let (element, rest) = read(tokens)?;
                        elements.push(element);
                        tokens = rest;
                    }
                    None => {
                        return Err(WispError::Syntax("unexpected end of input".to_string()))
                    }
                }
            }
        }
    }
}

/// Parse exactly one expression from `input`.
pub fn parse(input: &str) -> ParseResult<Value> {
    let tokens = tokenize(input)?;

    let (value, rest) = read(&tokens)?;
    if !rest.is_empty() {
        return Err(WispError::Syntax(
            "trailing tokens after expression".to_string(),
        ));
    }

    Ok(value)
}
