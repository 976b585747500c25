//! Zinc tokenizer.
//!
//! Turns a character stream into [`Token`]s, one per call to
//! [`Tokenizer::next_token`]. Scanning keeps two characters of lookahead
//! (`cur` and `peek`) and tracks a 1-based line counter for error messages.
//!
//! ## Token Types
//!
//! - **Identifiers**: `site`, `ver`, keywords such as `T` or `NA`
//! - **Literals**: numbers with units, strings, refs, URIs, dates, times,
//!   timestamps and symbols
//! - **Punctuation**: `: , ; - == != <= >= < > << >> [ ] { } ( ) -> / =`
//! - **Newline** and **Eof**
//!
//! Whitespace (space, tab, non-breaking space) and `//` or nested `/* */`
//! comments are skipped.
//!
//! ## Numeric Literals
//!
//! A run starting with a digit (or `-` and a digit) is scanned greedily and
//! classified afterwards by its dashes and colons:
//!
//! - `2011-06-07` is a date
//! - `9:30` or `09:30:00.5` is a time
//! - `2011-06-07T09:30:00-04:00 New_York` is a timestamp
//! - anything else is a number, optionally with a unit suffix such as
//!   `12.5kW` or `2.4e-3fl_oz`; `0xff_ff` is hexadecimal
//!
//! ## Usage Example
//!
//! ```rust
//! use haystack_zinc::tokenizer::{Token, Tokenizer};
//!
//! let mut tokens = Tokenizer::new("dis:\"Alpha\"");
//! assert_eq!(tokens.next_token().unwrap(), Token::Id("dis".to_string()));
//! assert_eq!(tokens.next_token().unwrap(), Token::Colon);
//! assert_eq!(tokens.next_token().unwrap(), Token::Str("Alpha".to_string()));
//! assert_eq!(tokens.next_token().unwrap(), Token::Eof);
//! ```

use crate::{Date, DateTime, Error, Number, Ref, Result, Symbol, Time};
use std::fmt;
use std::str::Chars;

#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    Id(String),
    Num(Number),
    Str(String),
    Ref(Ref),
    Uri(String),
    Date(Date),
    Time(Time),
    DateTime(DateTime),
    Symbol(Symbol),
    Colon,
    Comma,
    Semicolon,
    Minus,
    Eq,
    NotEq,
    LtEq,
    GtEq,
    Lt,
    Gt,
    Lt2,
    Gt2,
    LBracket,
    RBracket,
    LBrace,
    RBrace,
    LParen,
    RParen,
    Arrow,
    Slash,
    Assign,
    Newline,
    Eof,
}

impl Token {
    fn symbol(&self) -> &'static str {
        match self {
            Token::Colon => ":",
            Token::Comma => ",",
            Token::Semicolon => ";",
            Token::Minus => "-",
            Token::Eq => "==",
            Token::NotEq => "!=",
            Token::LtEq => "<=",
            Token::GtEq => ">=",
            Token::Lt => "<",
            Token::Gt => ">",
            Token::Lt2 => "<<",
            Token::Gt2 => ">>",
            Token::LBracket => "[",
            Token::RBracket => "]",
            Token::LBrace => "{",
            Token::RBrace => "}",
            Token::LParen => "(",
            Token::RParen => ")",
            Token::Arrow => "->",
            Token::Slash => "/",
            Token::Assign => "=",
            Token::Newline => "\n",
            _ => "",
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Id(s) => write!(f, "identifier {}", s),
            Token::Num(n) => write!(f, "number {}", n),
            Token::Str(s) => write!(f, "string {:?}", s),
            Token::Ref(r) => write!(f, "ref @{}", r.id()),
            Token::Uri(s) => write!(f, "uri `{}`", s),
            Token::Date(d) => write!(f, "date {}", d),
            Token::Time(t) => write!(f, "time {}", t),
            Token::DateTime(ts) => write!(f, "datetime {}", ts),
            Token::Symbol(s) => write!(f, "symbol {}", s),
            Token::Newline => f.write_str("newline"),
            Token::Eof => f.write_str("end of file"),
            other => write!(f, "'{}'", other.symbol()),
        }
    }
}

pub struct Tokenizer<'a> {
    chars: Chars<'a>,
    cur: Option<char>,
    peek: Option<char>,
    line: usize,
    token_line: usize,
}

impl<'a> Tokenizer<'a> {
    pub fn new(input: &'a str) -> Self {
        let mut chars = input.chars();
        let cur = chars.next();
        let peek = chars.next();
        Tokenizer {
            chars,
            cur,
            peek,
            line: 1,
            token_line: 1,
        }
    }

    /// Line on which the most recently returned token started.
    pub fn line(&self) -> usize {
        self.token_line
    }

    pub fn next_token(&mut self) -> Result<Token> {
        self.skip_trivia()?;
        self.token_line = self.line;

        let c = match self.cur {
            Some(c) => c,
            None => return Ok(Token::Eof),
        };

        match c {
            '\n' => {
                self.consume();
                self.line += 1;
                Ok(Token::Newline)
            }
            '\r' => {
                self.consume();
                if self.cur == Some('\n') {
                    self.consume();
                }
                self.line += 1;
                Ok(Token::Newline)
            }
            c if c.is_ascii_alphabetic() => Ok(self.scan_id()),
            '"' => self.scan_str(),
            '@' => self.scan_ref(),
            '^' => self.scan_symbol(),
            '`' => self.scan_uri(),
            c if c.is_ascii_digit() => self.scan_number(),
            '-' if self.peek.is_some_and(|p| p.is_ascii_digit()) => self.scan_number(),
            _ => self.scan_punct(c),
        }
    }

    /// Next character that is not a space or tab, without consuming it.
    pub(crate) fn peek_char(&self) -> Option<char> {
        std::iter::once(self.cur)
            .chain(std::iter::once(self.peek))
            .flatten()
            .chain(self.chars.clone())
            .find(|c| !matches!(c, ' ' | '\t'))
    }

    /// Consumes raw characters up to and including `end`, returning the text
    /// in between. The text may not span lines.
    pub(crate) fn raw_until(&mut self, end: char) -> Result<String> {
        let mut s = String::new();
        loop {
            match self.cur {
                Some(c) if c == end => {
                    self.consume();
                    return Ok(s);
                }
                None | Some('\n' | '\r') => {
                    return Err(self.err(format!("Expecting '{}'", end)));
                }
                Some(c) => {
                    s.push(c);
                    self.consume();
                }
            }
        }
    }

    fn consume(&mut self) {
        self.cur = self.peek;
        self.peek = self.chars.next();
    }

    fn err(&self, msg: impl Into<String>) -> Error {
        Error::syntax(self.line, msg)
    }

    fn skip_trivia(&mut self) -> Result<()> {
        loop {
            match (self.cur, self.peek) {
                (Some(' ' | '\t' | '\u{a0}'), _) => self.consume(),
                (Some('/'), Some('/')) => {
                    while !matches!(self.cur, None | Some('\n' | '\r')) {
                        self.consume();
                    }
                }
                (Some('/'), Some('*')) => self.skip_block_comment()?,
                _ => return Ok(()),
            }
        }
    }

    fn skip_block_comment(&mut self) -> Result<()> {
        self.consume();
        self.consume();
        let mut depth = 1;
        loop {
            match (self.cur, self.peek) {
                (None, _) => return Err(self.err("Multi-line comment not closed")),
                (Some('*'), Some('/')) => {
                    self.consume();
                    self.consume();
                    depth -= 1;
                    if depth == 0 {
                        return Ok(());
                    }
                }
                (Some('/'), Some('*')) => {
                    self.consume();
                    self.consume();
                    depth += 1;
                }
                (Some('\n'), _) => {
                    self.consume();
                    self.line += 1;
                }
                (Some('\r'), next) => {
                    self.consume();
                    if next != Some('\n') {
                        self.line += 1;
                    }
                }
                _ => self.consume(),
            }
        }
    }

    fn scan_id(&mut self) -> Token {
        let mut s = String::new();
        while let Some(c) = self.cur.filter(|c| c.is_ascii_alphanumeric() || *c == '_') {
            s.push(c);
            self.consume();
        }
        Token::Id(s)
    }

    fn scan_ref(&mut self) -> Result<Token> {
        self.consume();
        let mut s = String::new();
        while let Some(c) = self.cur.filter(|c| Ref::is_id_char(*c)) {
            s.push(c);
            self.consume();
        }
        if s.is_empty() {
            return Err(self.err("Invalid empty ref"));
        }
        Ref::new(s)
            .map(Token::Ref)
            .map_err(|e| self.err(e.to_string()))
    }

    fn scan_symbol(&mut self) -> Result<Token> {
        self.consume();
        let mut s = String::new();
        while let Some(c) = self.cur.filter(|c| Symbol::is_symbol_char(*c) || *c == ':') {
            s.push(c);
            self.consume();
        }
        Symbol::new(s)
            .map(Token::Symbol)
            .map_err(|e| self.err(e.to_string()))
    }

    fn scan_str(&mut self) -> Result<Token> {
        self.consume();
        let mut s = String::new();
        loop {
            match self.cur {
                None => return Err(self.err("Unexpected end of str")),
                Some('"') => {
                    self.consume();
                    return Ok(Token::Str(s));
                }
                Some('\n' | '\r') => return Err(self.err("Unexpected newline in str")),
                Some('\\') => s.push(self.escape()?),
                Some(c) => {
                    s.push(c);
                    self.consume();
                }
            }
        }
    }

    fn scan_uri(&mut self) -> Result<Token> {
        self.consume();
        let mut s = String::new();
        loop {
            match self.cur {
                None => return Err(self.err("Unexpected end of uri")),
                Some('`') => {
                    self.consume();
                    return Ok(Token::Uri(s));
                }
                Some('\n' | '\r') => return Err(self.err("Unexpected newline in uri")),
                Some('\\') => match self.peek {
                    Some(
                        p @ (':' | '/' | '?' | '#' | '[' | ']' | '@' | '\\' | '&' | '=' | ';'),
                    ) => {
                        s.push('\\');
                        s.push(p);
                        self.consume();
                        self.consume();
                    }
                    _ => s.push(self.escape()?),
                },
                Some(c) => {
                    s.push(c);
                    self.consume();
                }
            }
        }
    }

    fn escape(&mut self) -> Result<char> {
        // cur is the backslash
        self.consume();
        let c = self.cur.ok_or_else(|| self.err("Unexpected end of escape"))?;
        self.consume();
        let ch = match c {
            'b' => '\u{8}',
            'f' => '\u{c}',
            'n' => '\n',
            'r' => '\r',
            't' => '\t',
            '"' => '"',
            '$' => '$',
            '\'' => '\'',
            '`' => '`',
            '\\' => '\\',
            'u' => return self.unicode_escape(),
            other => return Err(self.err(format!("Invalid escape sequence: \\{}", other))),
        };
        Ok(ch)
    }

    fn unicode_escape(&mut self) -> Result<char> {
        let hi = self.hex4()?;
        if (0xD800..0xDC00).contains(&hi) {
            if self.cur != Some('\\') || self.peek != Some('u') {
                return Err(self.err("Invalid unicode escape: unpaired surrogate"));
            }
            self.consume();
            self.consume();
            let lo = self.hex4()?;
            if !(0xDC00..0xE000).contains(&lo) {
                return Err(self.err("Invalid unicode escape: unpaired surrogate"));
            }
            let code = 0x10000 + ((hi - 0xD800) << 10) + (lo - 0xDC00);
            return char::from_u32(code).ok_or_else(|| self.err("Invalid unicode escape"));
        }
        char::from_u32(hi).ok_or_else(|| self.err("Invalid unicode escape: unpaired surrogate"))
    }

    fn hex4(&mut self) -> Result<u32> {
        let mut code = 0;
        for _ in 0..4 {
            let digit = self
                .cur
                .and_then(|c| c.to_digit(16))
                .ok_or_else(|| self.err("Expecting hex digit in unicode escape"))?;
            code = code * 16 + digit;
            self.consume();
        }
        Ok(code)
    }

    fn scan_number(&mut self) -> Result<Token> {
        if self.cur == Some('0')
            && self.peek == Some('x')
            && self.chars.clone().next().is_some_and(|c| c.is_ascii_hexdigit())
        {
            return self.scan_hex();
        }

        let mut s = String::new();
        if let Some(c) = self.cur {
            s.push(c);
        }
        self.consume();

        let mut dashes = 0;
        let mut colons = 0;
        let mut unit_start: Option<usize> = None;
        let mut exp = false;
        while let Some(c) = self.cur {
            let peek_digit = self.peek.is_some_and(|p| p.is_ascii_digit());
            if !c.is_ascii_digit() {
                if exp && (c == '+' || c == '-') {
                } else if c == '-' {
                    dashes += 1;
                } else if c == ':' && peek_digit {
                    colons += 1;
                } else if (exp || colons >= 1) && c == '+' {
                } else if c == '.' {
                    if !peek_digit {
                        break;
                    }
                } else if (c == 'e' || c == 'E')
                    && (peek_digit || matches!(self.peek, Some('+' | '-')))
                {
                    exp = true;
                } else if c.is_alphabetic() || matches!(c, '%' | '$' | '/') || !c.is_ascii() {
                    unit_start.get_or_insert(s.len());
                } else if c == '_' {
                    if unit_start.is_none() && peek_digit {
                        // digit separator
                        self.consume();
                        continue;
                    }
                    unit_start.get_or_insert(s.len());
                } else {
                    break;
                }
            }
            s.push(c);
            self.consume();
        }

        if dashes == 2 && colons == 0 {
            return s
                .parse::<Date>()
                .map(Token::Date)
                .map_err(|e| self.err(e.to_string()));
        }
        if dashes == 0 && colons >= 1 {
            return self.time_literal(s, colons == 1);
        }
        if dashes >= 2 {
            return self.datetime_literal(s);
        }

        let (digits, unit) = match unit_start {
            Some(i) => (&s[..i], Some(&s[i..])),
            None => (s.as_str(), None),
        };
        let val: f64 = digits
            .parse()
            .map_err(|_| self.err(format!("Invalid number literal: {}", s)))?;
        let num = match unit {
            Some(unit) => Number::with_unit(val, unit).map_err(|e| self.err(e.to_string()))?,
            None => Number::new(val),
        };
        Ok(Token::Num(num))
    }

    fn scan_hex(&mut self) -> Result<Token> {
        self.consume();
        self.consume();
        let mut s = String::new();
        while let Some(c) = self.cur {
            if c.is_ascii_hexdigit() {
                s.push(c);
            } else if c != '_' {
                break;
            }
            self.consume();
        }
        let val = i64::from_str_radix(&s, 16)
            .map_err(|_| self.err(format!("Invalid hex literal: 0x{}", s)))?;
        Ok(Token::Num(Number::new(val as f64)))
    }

    fn time_literal(&self, mut s: String, add_seconds: bool) -> Result<Token> {
        if s.as_bytes().get(1) == Some(&b':') {
            s.insert(0, '0');
        }
        if add_seconds {
            s.push_str(":00");
        }
        s.parse::<Time>()
            .map(Token::Time)
            .map_err(|e| self.err(e.to_string()))
    }

    fn datetime_literal(&mut self, mut s: String) -> Result<Token> {
        if self.cur == Some(' ') && self.peek.is_some_and(|p| p.is_ascii_uppercase()) {
            self.consume();
            s.push(' ');
            while let Some(c) = self.cur.filter(|c| DateTime::is_tz_char(*c)) {
                s.push(c);
                self.consume();
            }
        } else if !s.ends_with('Z') {
            return Err(self.err(format!("Expecting timezone after {}", s)));
        }
        s.parse::<DateTime>()
            .map(Token::DateTime)
            .map_err(|e| self.err(e.to_string()))
    }

    fn scan_punct(&mut self, c: char) -> Result<Token> {
        self.consume();
        let tok = match c {
            ',' => Token::Comma,
            ':' => Token::Colon,
            ';' => Token::Semicolon,
            '[' => Token::LBracket,
            ']' => Token::RBracket,
            '{' => Token::LBrace,
            '}' => Token::RBrace,
            '(' => Token::LParen,
            ')' => Token::RParen,
            '/' => Token::Slash,
            '<' => match self.cur {
                Some('<') => self.two(Token::Lt2),
                Some('=') => self.two(Token::LtEq),
                _ => Token::Lt,
            },
            '>' => match self.cur {
                Some('>') => self.two(Token::Gt2),
                Some('=') => self.two(Token::GtEq),
                _ => Token::Gt,
            },
            '-' => match self.cur {
                Some('>') => self.two(Token::Arrow),
                _ => Token::Minus,
            },
            '=' => match self.cur {
                Some('=') => self.two(Token::Eq),
                _ => Token::Assign,
            },
            '!' if self.cur == Some('=') => self.two(Token::NotEq),
            other => return Err(self.err(format!("Unexpected symbol: {:?}", other))),
        };
        Ok(tok)
    }

    fn two(&mut self, tok: Token) -> Token {
        self.consume();
        tok
    }
}

impl Iterator for Tokenizer<'_> {
    type Item = Result<Token>;

    /// Yields tokens up to, not including, [`Token::Eof`].
    fn next(&mut self) -> Option<Result<Token>> {
        match self.next_token() {
            Ok(Token::Eof) => None,
            other => Some(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(s: &str) -> Vec<Token> {
        Tokenizer::new(s).collect::<Result<Vec<_>>>().unwrap()
    }

    fn one(s: &str) -> Token {
        let mut t = Tokenizer::new(s);
        let tok = t.next_token().unwrap();
        assert_eq!(t.next_token().unwrap(), Token::Eof, "trailing input in {:?}", s);
        tok
    }

    fn num(val: f64, unit: Option<&str>) -> Token {
        Token::Num(match unit {
            Some(u) => Number::with_unit(val, u).unwrap(),
            None => Number::new(val),
        })
    }

    #[test]
    fn test_identifiers_and_punct() {
        assert_eq!(
            tokens("a_1 , : ; [ ] { } ( ) < > << >> <= >= == != = -> /"),
            vec![
                Token::Id("a_1".to_string()),
                Token::Comma,
                Token::Colon,
                Token::Semicolon,
                Token::LBracket,
                Token::RBracket,
                Token::LBrace,
                Token::RBrace,
                Token::LParen,
                Token::RParen,
                Token::Lt,
                Token::Gt,
                Token::Lt2,
                Token::Gt2,
                Token::LtEq,
                Token::GtEq,
                Token::Eq,
                Token::NotEq,
                Token::Assign,
                Token::Arrow,
                Token::Slash,
            ]
        );
    }

    #[test]
    fn test_numbers() {
        assert_eq!(one("5"), num(5.0, None));
        assert_eq!(one("-5.25"), num(-5.25, None));
        assert_eq!(one("123.4m/s"), num(123.4, Some("m/s")));
        assert_eq!(one("2.4e-3fl_oz"), num(0.0024, Some("fl_oz")));
        assert_eq!(one("1E5"), num(100000.0, None));
        assert_eq!(one("1_000_000"), num(1_000_000.0, None));
        assert_eq!(one("10_kW"), num(10.0, Some("_kW")));
        assert_eq!(one("0xff_ff"), num(65535.0, None));
        assert_eq!(one("75°F"), num(75.0, Some("°F")));
        assert_eq!(one("5%"), num(5.0, Some("%")));
        assert_eq!(one("3em"), num(3.0, Some("em")));
    }

    #[test]
    fn test_zero_with_x_unit_is_not_hex() {
        assert_eq!(one("0xy"), num(0.0, Some("xy")));
        assert_eq!(one("0x"), num(0.0, Some("x")));
        assert_eq!(one("0.0xa"), num(0.0, Some("xa")));
        assert_eq!(one("0xA"), num(10.0, None));
    }

    #[test]
    fn test_dash_is_minus_without_digit() {
        assert_eq!(
            tokens("- INF"),
            vec![Token::Minus, Token::Id("INF".to_string())]
        );
    }

    #[test]
    fn test_dates_and_times() {
        assert_eq!(one("2011-06-07"), Token::Date(Date::new(2011, 6, 7).unwrap()));
        assert_eq!(one("9:30"), Token::Time(Time::new(9, 30, 0, 0).unwrap()));
        assert_eq!(one("09:30:05.5"), Token::Time(Time::new(9, 30, 5, 500).unwrap()));
    }

    #[test]
    fn test_datetimes() {
        let Token::DateTime(ts) = one("2011-06-07T09:51:27-04:00 New_York") else {
            panic!("expected datetime");
        };
        assert_eq!(ts.tz(), "New_York");
        assert_eq!(ts.tz_offset(), -4 * 3600);

        let Token::DateTime(ts) = one("2011-06-07T09:51:27Z") else {
            panic!("expected datetime");
        };
        assert_eq!(ts.tz(), "UTC");

        let Token::DateTime(ts) = one("2011-06-07T09:51:27+05:00 GMT-5") else {
            panic!("expected datetime");
        };
        assert_eq!(ts.tz(), "GMT-5");

        assert!(Tokenizer::new("2011-06-07T09:51:27-04:00").next_token().is_err());
    }

    #[test]
    fn test_strings() {
        assert_eq!(one(r#""a\tb\"c\$""#), Token::Str("a\tb\"c$".to_string()));
        assert_eq!(
            one(r#""[\uABCD \u1234]""#),
            Token::Str("[\u{ABCD} \u{1234}]".to_string())
        );
        assert_eq!(
            one(r#""[\uabcd \u1234]""#),
            Token::Str("[\u{ABCD} \u{1234}]".to_string())
        );
        assert_eq!(one(r#""\uD83D\uDE00""#), Token::Str("\u{1F600}".to_string()));
    }

    #[test]
    fn test_string_errors_carry_line() {
        let mut t = Tokenizer::new("\n\n\"abc");
        assert_eq!(t.next_token().unwrap(), Token::Newline);
        assert_eq!(t.next_token().unwrap(), Token::Newline);
        let err = t.next_token().unwrap_err();
        assert_eq!(err.line(), Some(3));

        assert!(Tokenizer::new("\"a\nb\"").next_token().is_err());
        assert!(Tokenizer::new(r#""\q""#).next_token().is_err());
        assert!(Tokenizer::new(r#""\u12G4""#).next_token().is_err());
        assert!(Tokenizer::new(r#""\uDE00""#).next_token().is_err());
    }

    #[test]
    fn test_uri_escapes() {
        assert_eq!(
            one(r"`http://x/\?a\=b\`c`"),
            Token::Uri(r"http://x/\?a\=b`c".to_string())
        );
        assert_eq!(one(r"`a\nb`"), Token::Uri("a\nb".to_string()));
    }

    #[test]
    fn test_refs_and_symbols() {
        assert_eq!(one("@a-b:c.d~e"), Token::Ref(Ref::new("a-b:c.d~e").unwrap()));
        assert_eq!(one("^lib:elec"), Token::Symbol(Symbol::new("lib:elec").unwrap()));
        assert!(Tokenizer::new("@ ").next_token().is_err());
    }

    #[test]
    fn test_comments_and_newlines() {
        let mut t = Tokenizer::new("a // c\r\n/* x\n /* y */\n */ b\rc");
        assert_eq!(t.next_token().unwrap(), Token::Id("a".to_string()));
        assert_eq!(t.next_token().unwrap(), Token::Newline);
        assert_eq!(t.next_token().unwrap(), Token::Id("b".to_string()));
        assert_eq!(t.line(), 4);
        assert_eq!(t.next_token().unwrap(), Token::Newline);
        assert_eq!(t.next_token().unwrap(), Token::Id("c".to_string()));
        assert_eq!(t.line(), 5);
    }

    #[test]
    fn test_unclosed_block_comment() {
        assert!(Tokenizer::new("/* open").next_token().is_err());
    }

    #[test]
    fn test_non_breaking_space_is_whitespace() {
        assert_eq!(
            tokens("a\u{a0}b"),
            vec![Token::Id("a".to_string()), Token::Id("b".to_string())]
        );
    }
}
