//! Zinc reader.
//!
//! This module provides [`ZincReader`], a recursive-descent parser over the
//! token stream produced by [`Tokenizer`]. It keeps two tokens of lookahead
//! and never backtracks.
//!
//! ## Usage
//!
//! Most users should use the high-level functions in the crate root:
//!
//! ```rust
//! use haystack_zinc::{read_grid, read_value, Value};
//!
//! let grid = read_grid("ver:\"3.0\"\nid,dis\n@a,\"Alpha\"\n").unwrap();
//! assert_eq!(grid.num_rows(), 1);
//!
//! assert_eq!(read_value("M").unwrap(), Some(Value::MARKER));
//! assert_eq!(read_value("N").unwrap(), None);
//! ```
//!
//! ## Grammar
//!
//! ```text
//! grid   := "ver:" str meta? nl cols nl row*
//! cols   := col ("," col)*
//! col    := tag meta?
//! row    := cell ("," cell)* nl
//! cell   := val?
//! meta   := (tag (":" val)?)*
//! val    := keyword | literal | coord | xstr | list | dict | "<<" grid ">>"
//! ```
//!
//! A grid ends at a blank line, the end of input or, when nested, `>>`.

use crate::options::Version;
use crate::tokenizer::{Token, Tokenizer};
use crate::{Bin, Coord, Dict, DictBuilder, Error, Grid, GridBuilder, List, Number, Ref, Result, Value, XStr};
use std::mem;
use tracing::{debug, trace};

/// The Zinc reader.
///
/// Created via [`ZincReader::from_str`]; each `read_*` call consumes the
/// whole input.
pub struct ZincReader<'a> {
    tokenizer: Tokenizer<'a>,
    cur: Token,
    cur_line: usize,
    peek: Token,
    peek_line: usize,
    version: Version,
    primed: bool,
}

impl<'a> ZincReader<'a> {
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(input: &'a str) -> Self {
        ZincReader {
            tokenizer: Tokenizer::new(input),
            cur: Token::Eof,
            cur_line: 1,
            peek: Token::Eof,
            peek_line: 1,
            version: Version::default(),
            primed: false,
        }
    }

    /// Version declared by the last top-level grid header read.
    pub fn version(&self) -> Version {
        self.version
    }

    /// Reads exactly one value. A leading `ver:` reads a grid.
    ///
    /// Returns `None` for the null literal `N`.
    pub fn read_value(&mut self) -> Result<Option<Value>> {
        self.init()?;
        let val = if self.cur == Token::Id("ver".to_string()) && self.peek == Token::Colon {
            Some(Value::Grid(self.parse_grid()?))
        } else {
            self.parse_val()?
        };
        self.expect_end()?;
        Ok(val)
    }

    /// Reads exactly one grid.
    pub fn read_grid(&mut self) -> Result<Grid> {
        self.init()?;
        self.skip_newlines()?;
        let grid = self.parse_grid()?;
        self.expect_end()?;
        Ok(grid)
    }

    /// Reads grids separated by blank lines until the end of input.
    pub fn read_grids(&mut self) -> Result<Vec<Grid>> {
        self.init()?;
        let mut grids = Vec::new();
        self.skip_newlines()?;
        while self.cur != Token::Eof {
            grids.push(self.parse_grid()?);
            self.skip_newlines()?;
        }
        Ok(grids)
    }

    /// Reads a dict, with or without braces.
    pub fn read_dict(&mut self) -> Result<Dict> {
        self.init()?;
        let dict = self.parse_dict()?;
        self.expect_end()?;
        Ok(dict)
    }

    fn init(&mut self) -> Result<()> {
        if !self.primed {
            self.primed = true;
            self.consume()?;
            self.consume()?;
        }
        Ok(())
    }

    fn consume(&mut self) -> Result<()> {
        let next = self.tokenizer.next_token()?;
        self.cur = mem::replace(&mut self.peek, next);
        self.cur_line = mem::replace(&mut self.peek_line, self.tokenizer.line());
        Ok(())
    }

    fn expect(&mut self, tok: Token) -> Result<()> {
        if self.cur != tok {
            return Err(Error::unexpected_token(self.cur_line, tok.to_string(), &self.cur));
        }
        self.consume()
    }

    fn expect_end(&mut self) -> Result<()> {
        self.skip_newlines()?;
        if self.cur != Token::Eof {
            return Err(Error::unexpected_token(self.cur_line, "end of file", &self.cur));
        }
        Ok(())
    }

    fn skip_newlines(&mut self) -> Result<()> {
        while self.cur == Token::Newline {
            self.consume()?;
        }
        Ok(())
    }

    fn err(&self, msg: impl Into<String>) -> Error {
        Error::syntax(self.cur_line, msg)
    }

    fn consume_tag_name(&mut self) -> Result<String> {
        let name = match &self.cur {
            Token::Id(id) if id.starts_with(|c: char| c.is_ascii_lowercase()) => id.clone(),
            Token::Id(id) => return Err(self.err(format!("Invalid tag name: {}", id))),
            other => return Err(Error::unexpected_token(self.cur_line, "tag name", other)),
        };
        self.consume()?;
        Ok(name)
    }

    fn consume_str(&mut self) -> Result<String> {
        let s = match &self.cur {
            Token::Str(s) => s.clone(),
            other => return Err(Error::unexpected_token(self.cur_line, "string", other)),
        };
        self.consume()?;
        Ok(s)
    }

    fn consume_num(&mut self) -> Result<f64> {
        let n = match &self.cur {
            Token::Num(n) => n.val(),
            other => return Err(Error::unexpected_token(self.cur_line, "number", other)),
        };
        self.consume()?;
        Ok(n)
    }

    fn parse_val(&mut self) -> Result<Option<Value>> {
        if self.at_legacy_bin() {
            return self.parse_legacy_bin().map(Some);
        }

        if let Token::Id(id) = &self.cur {
            let id = id.clone();
            let line = self.cur_line;
            self.consume()?;

            if self.cur == Token::LParen {
                return if matches!(self.peek, Token::Num(_)) {
                    self.parse_coord(&id, line).map(Some)
                } else {
                    self.parse_xstr(&id, line).map(Some)
                };
            }

            return match id.as_str() {
                "T" => Ok(Some(Value::TRUE)),
                "F" => Ok(Some(Value::FALSE)),
                "N" => Ok(None),
                "M" => Ok(Some(Value::MARKER)),
                "NA" => Ok(Some(Value::NA)),
                "R" => Ok(Some(Value::REMOVE)),
                "NaN" => Ok(Some(Value::Num(Number::NAN))),
                "INF" => Ok(Some(Value::Num(Number::POS_INF))),
                _ => Err(Error::syntax(line, format!("Unexpected identifier: {}", id))),
            };
        }

        if let Some(val) = self.parse_literal()? {
            return Ok(Some(val));
        }

        if self.cur == Token::Minus && self.peek == Token::Id("INF".to_string()) {
            self.consume()?;
            self.consume()?;
            return Ok(Some(Value::Num(Number::NEG_INF)));
        }

        match self.cur {
            Token::LBracket => self.parse_list().map(|l| Some(Value::List(l))),
            Token::LBrace => self.parse_dict().map(|d| Some(Value::Dict(d))),
            Token::Lt2 => {
                let outer = self.version;
                let grid = self.parse_grid()?;
                self.version = outer;
                Ok(Some(Value::Grid(grid)))
            }
            _ => Err(Error::unexpected_token(self.cur_line, "value", &self.cur)),
        }
    }

    // a ref directly followed by a string takes it as its display text
    fn parse_literal(&mut self) -> Result<Option<Value>> {
        let val = match &self.cur {
            Token::Num(n) => Value::Num(n.clone()),
            Token::Str(s) => Value::Str(s.clone()),
            Token::Uri(s) => Value::Uri(s.clone()),
            Token::Date(d) => Value::Date(*d),
            Token::Time(t) => Value::Time(*t),
            Token::DateTime(ts) => Value::DateTime(ts.clone()),
            Token::Symbol(s) => Value::Symbol(s.clone()),
            Token::Ref(r) => match &self.peek {
                Token::Str(dis) => {
                    let r = Ref::with_dis(r.id(), dis.clone()).map_err(|e| self.err(e.to_string()))?;
                    self.consume()?;
                    Value::Ref(r)
                }
                _ => Value::Ref(r.clone()),
            },
            _ => return Ok(None),
        };
        self.consume()?;
        Ok(Some(val))
    }

    fn parse_coord(&mut self, id: &str, line: usize) -> Result<Value> {
        if id != "C" {
            return Err(Error::syntax(line, format!("Expecting 'C' for coord, not {}", id)));
        }
        self.expect(Token::LParen)?;
        let lat = self.consume_num()?;
        self.expect(Token::Comma)?;
        let lng = self.consume_num()?;
        self.expect(Token::RParen)?;
        Coord::new(lat, lng)
            .map(Value::Coord)
            .map_err(|e| Error::syntax(line, e.to_string()))
    }

    fn parse_xstr(&mut self, id: &str, line: usize) -> Result<Value> {
        if !id.starts_with(|c: char| c.is_ascii_uppercase()) {
            return Err(Error::syntax(line, format!("Invalid XStr type: {}", id)));
        }
        self.expect(Token::LParen)?;
        let val = self.consume_str()?;
        self.expect(Token::RParen)?;
        let result = if id == "Bin" {
            Bin::new(val).map(Value::Bin)
        } else {
            XStr::new(id, val).map(Value::XStr)
        };
        result.map_err(|e| Error::syntax(line, e.to_string()))
    }

    // 2.0 grids may carry Bin(text/plain) with the mime type unquoted
    fn at_legacy_bin(&self) -> bool {
        self.version == Version::V2
            && self.cur == Token::Id("Bin".to_string())
            && self.peek == Token::LParen
            && self.tokenizer.peek_char() != Some('"')
    }

    fn parse_legacy_bin(&mut self) -> Result<Value> {
        let line = self.cur_line;
        let mime = self.tokenizer.raw_until(')')?;
        // cur and peek still hold `Bin` and `(`
        self.consume()?;
        self.consume()?;
        Bin::new(mime)
            .map(Value::Bin)
            .map_err(|e| Error::syntax(line, e.to_string()))
    }

    fn parse_list(&mut self) -> Result<List> {
        self.expect(Token::LBracket)?;
        let mut items = Vec::new();
        while !matches!(self.cur, Token::RBracket | Token::Eof) {
            let line = self.cur_line;
            let val = self
                .parse_val()?
                .ok_or_else(|| Error::syntax(line, "Null is not allowed in a list"))?;
            items.push(val);
            if self.cur != Token::Comma {
                break;
            }
            self.consume()?;
        }
        self.expect(Token::RBracket)?;
        Ok(List::new(items))
    }

    fn parse_dict(&mut self) -> Result<Dict> {
        let braces = self.cur == Token::LBrace;
        if braces {
            self.consume()?;
        }
        let mut b = DictBuilder::new();
        loop {
            match self.cur {
                Token::Id(_) => self.parse_pair(&mut b)?,
                Token::Comma => self.consume()?,
                _ => break,
            }
        }
        if braces {
            self.expect(Token::RBrace)?;
        }
        Ok(b.build())
    }

    fn parse_meta(&mut self, b: &mut DictBuilder) -> Result<()> {
        while let Token::Id(_) = self.cur {
            self.parse_pair(b)?;
        }
        Ok(())
    }

    fn parse_pair(&mut self, b: &mut DictBuilder) -> Result<()> {
        let name = self.consume_tag_name()?;
        let val = if self.cur == Token::Colon {
            self.consume()?;
            self.parse_val()?
        } else {
            Some(Value::Marker)
        };
        if let Some(val) = val {
            b.add(name, val);
        }
        Ok(())
    }

    fn parse_grid(&mut self) -> Result<Grid> {
        let nested = self.cur == Token::Lt2;
        if nested {
            self.consume()?;
            if self.cur == Token::Newline {
                self.consume()?;
            }
        }
        let start_line = self.cur_line;

        if self.cur != Token::Id("ver".to_string()) {
            return Err(Error::unexpected_token(self.cur_line, "'ver'", &self.cur));
        }
        self.consume()?;
        self.expect(Token::Colon)?;
        let ver_line = self.cur_line;
        let ver = self.consume_str()?;
        self.version = ver
            .parse()
            .map_err(|_| Error::unsupported_version(ver_line, &ver))?;
        debug!(version = %self.version, line = ver_line, "zinc grid header");

        let mut b = GridBuilder::new();
        if let Token::Id(_) = self.cur {
            self.parse_meta(b.meta())?;
        }
        self.expect(Token::Newline)?;

        let mut num_cols = 0;
        while let Token::Id(_) = self.cur {
            let name = self.consume_tag_name()?;
            let col_meta = b.add_col(name)?;
            if let Token::Id(_) = self.cur {
                self.parse_meta(col_meta)?;
            }
            num_cols += 1;
            if self.cur != Token::Comma {
                break;
            }
            self.consume()?;
        }
        if num_cols == 0 {
            return Err(self.err("No columns defined"));
        }
        match self.cur {
            Token::Eof => {}
            Token::Gt2 if nested => {}
            _ => self.expect(Token::Newline)?,
        }

        loop {
            if matches!(self.cur, Token::Newline | Token::Eof) || (nested && self.cur == Token::Gt2) {
                break;
            }
            let mut cells = Vec::with_capacity(num_cols);
            for i in 0..num_cols {
                let absent = matches!(self.cur, Token::Comma | Token::Newline | Token::Eof)
                    || (nested && self.cur == Token::Gt2);
                cells.push(if absent { None } else { self.parse_val()? });
                if i + 1 < num_cols {
                    self.expect(Token::Comma)?;
                }
            }
            b.add_row(cells)?;

            if (nested && self.cur == Token::Gt2) || self.cur == Token::Eof {
                break;
            }
            self.expect(Token::Newline)?;
        }

        if nested {
            self.expect(Token::Gt2)?;
        }

        let grid = b.build()?;
        trace!(
            line = start_line,
            cols = grid.num_cols(),
            rows = grid.num_rows(),
            nested,
            "parsed zinc grid"
        );
        Ok(grid)
    }
}
