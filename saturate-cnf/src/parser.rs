//! Recursive-descent parser over the token stream from [`crate::lexer`].
use crate::ast::{Atom, Literal, Role, Term, Unit};
use crate::lexer::{tokenize, Token, TokenKind};
use crate::ParseError;

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    fn peek(&self) -> Option<&TokenKind> {
        self.tokens.get(self.pos).map(|t| &t.kind)
    }

    fn line(&self) -> usize {
        self.tokens
            .get(self.pos)
            .or_else(|| self.tokens.last())
            .map(|t| t.line)
            .unwrap_or(0)
    }

    fn advance(&mut self) -> Option<TokenKind> {
        let kind = self.tokens.get(self.pos).map(|t| t.kind.clone());
        self.pos += 1;
        kind
    }

    fn expect(&mut self, expected: &TokenKind) -> Result<(), ParseError> {
        match self.advance() {
            Some(ref kind) if kind == expected => Ok(()),
            Some(kind) => Err(ParseError::Unexpected {
                line: self.line(),
                found: format!("{:?}", kind),
                expected: format!("{:?}", expected),
            }),
            None => Err(ParseError::UnexpectedEof {
                expected: format!("{:?}", expected),
            }),
        }
    }

    fn expect_lower(&mut self) -> Result<String, ParseError> {
        match self.advance() {
            Some(TokenKind::Lower(word)) => Ok(word),
            Some(kind) => Err(ParseError::Unexpected {
                line: self.line(),
                found: format!("{:?}", kind),
                expected: "a lower-case word".to_owned(),
            }),
            None => Err(ParseError::UnexpectedEof {
                expected: "a lower-case word".to_owned(),
            }),
        }
    }

    fn expect_upper(&mut self) -> Result<String, ParseError> {
        match self.advance() {
            Some(TokenKind::Upper(word)) => Ok(word),
            Some(kind) => Err(ParseError::Unexpected {
                line: self.line(),
                found: format!("{:?}", kind),
                expected: "an upper-case word (variable)".to_owned(),
            }),
            None => Err(ParseError::UnexpectedEof {
                expected: "an upper-case word (variable)".to_owned(),
            }),
        }
    }

    fn parse_units(&mut self) -> Result<Vec<Unit>, ParseError> {
        let mut units = Vec::new();
        while self.peek().is_some() {
            units.push(self.parse_unit()?);
        }
        Ok(units)
    }

    fn parse_unit(&mut self) -> Result<Unit, ParseError> {
        let keyword = self.expect_lower()?;
        self.expect(&TokenKind::LParen)?;
        let name = self.parse_name()?;
        self.expect(&TokenKind::Comma)?;
        let role_name = self.expect_lower()?;
        self.expect(&TokenKind::Comma)?;

        let unit = match keyword.as_str() {
            "cnf" => {
                let role = Role::from_name(&role_name).ok_or_else(|| ParseError::UnknownRole {
                    line: self.line(),
                    role: role_name.clone(),
                })?;
                let paren = self.peek() == Some(&TokenKind::LParen);
                if paren {
                    self.expect(&TokenKind::LParen)?;
                }
                let literals = self.parse_disjunction()?;
                if paren {
                    self.expect(&TokenKind::RParen)?;
                }
                Unit::Cnf { name, role, literals }
            }
            "fof" => {
                if role_name != "conjecture" {
                    return Err(ParseError::UnsupportedFofRole {
                        line: self.line(),
                        role: role_name,
                    });
                }
                self.expect(&TokenKind::Question)?;
                self.expect(&TokenKind::LBracket)?;
                let mut vars = vec![self.expect_upper()?];
                while self.peek() == Some(&TokenKind::Comma) {
                    self.advance();
                    vars.push(self.expect_upper()?);
                }
                self.expect(&TokenKind::RBracket)?;
                self.expect(&TokenKind::Colon)?;
                self.expect(&TokenKind::LParen)?;
                let literals = self.parse_conjunction()?;
                self.expect(&TokenKind::RParen)?;
                Unit::FofConjecture { name, vars, literals }
            }
            other => {
                return Err(ParseError::UnknownFormulaKind {
                    line: self.line(),
                    kind: other.to_owned(),
                })
            }
        };

        self.expect(&TokenKind::RParen)?;
        self.expect(&TokenKind::Dot)?;
        Ok(unit)
    }

    fn parse_name(&mut self) -> Result<String, ParseError> {
        match self.advance() {
            Some(TokenKind::Lower(word)) => Ok(word),
            Some(TokenKind::Upper(word)) => Ok(word),
            Some(kind) => Err(ParseError::Unexpected {
                line: self.line(),
                found: format!("{:?}", kind),
                expected: "a formula name".to_owned(),
            }),
            None => Err(ParseError::UnexpectedEof {
                expected: "a formula name".to_owned(),
            }),
        }
    }

    fn parse_disjunction(&mut self) -> Result<Vec<Literal>, ParseError> {
        let mut literals = vec![self.parse_literal()?];
        while self.peek() == Some(&TokenKind::Pipe) {
            self.advance();
            literals.push(self.parse_literal()?);
        }
        Ok(literals)
    }

    fn parse_conjunction(&mut self) -> Result<Vec<Literal>, ParseError> {
        let mut literals = vec![self.parse_literal()?];
        while self.peek() == Some(&TokenKind::Amp) {
            self.advance();
            literals.push(self.parse_literal()?);
        }
        Ok(literals)
    }

    fn parse_literal(&mut self) -> Result<Literal, ParseError> {
        let positive = if self.peek() == Some(&TokenKind::Tilde) {
            self.advance();
            false
        } else {
            true
        };
        let first = self.parse_term()?;
        let atom = match self.peek() {
            Some(TokenKind::Eq) => {
                self.advance();
                let rhs = self.parse_term()?;
                Atom::Equality(first, rhs)
            }
            Some(TokenKind::Neq) => {
                self.advance();
                let rhs = self.parse_term()?;
                // `X != Y` is `~(X = Y)`; the surrounding literal's polarity is inverted here,
                // matching TPTP's "!=" as syntactic sugar rather than a separate connective.
                return Ok(Literal {
                    positive: !positive,
                    atom: Atom::Equality(first, rhs),
                });
            }
            _ => match first {
                Term::App(name, args) => Atom::Pred(name, args),
                Term::Var(_) => {
                    return Err(ParseError::Unexpected {
                        line: self.line(),
                        found: "a bare variable".to_owned(),
                        expected: "a predicate application or equality".to_owned(),
                    })
                }
            },
        };
        Ok(Literal { positive, atom })
    }

    fn parse_term(&mut self) -> Result<Term, ParseError> {
        match self.advance() {
            Some(TokenKind::Upper(word)) => Ok(Term::Var(word)),
            Some(TokenKind::Lower(word)) => {
                if self.peek() == Some(&TokenKind::LParen) {
                    self.advance();
                    let mut args = vec![self.parse_term()?];
                    while self.peek() == Some(&TokenKind::Comma) {
                        self.advance();
                        args.push(self.parse_term()?);
                    }
                    self.expect(&TokenKind::RParen)?;
                    Ok(Term::App(word, args))
                } else {
                    Ok(Term::App(word, Vec::new()))
                }
            }
            Some(kind) => Err(ParseError::Unexpected {
                line: self.line(),
                found: format!("{:?}", kind),
                expected: "a term".to_owned(),
            }),
            None => Err(ParseError::UnexpectedEof {
                expected: "a term".to_owned(),
            }),
        }
    }
}

pub fn parse(input: &str) -> Result<Vec<Unit>, ParseError> {
    let tokens = tokenize(input).map_err(|(line, unexpected)| ParseError::UnexpectedChar { line, unexpected })?;
    let mut parser = Parser { tokens, pos: 0 };
    parser.parse_units()
}
