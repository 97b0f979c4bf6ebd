//! SQL output buffer
//!
//! [`QueryBuilder`] accumulates statement text. Raw text goes in through
//! [`QueryBuilder::put`]; anything user-controlled goes through a quoted
//! region opened with [`QueryBuilder::identifier`] or
//! [`QueryBuilder::string_literal`].
//!
//! A [`QuotedRegion`] holds the builder's only mutable borrow: it writes the
//! opening delimiter when created, escapes everything pushed through it, and
//! writes the closing delimiter when dropped. Raw output while a quote is open,
//! or a second region nested inside the first, is rejected by the borrow
//! checker.
//!
//! ```
//! use xcrud_sql::query_builder::QueryBuilder;
//!
//! let mut qb = QueryBuilder::new();
//! qb.put("SELECT ").put_string("it's").put(" AS ").put_identifier("x");
//! assert_eq!(qb.finish(), "SELECT 'it\\'s' AS `x`");
//! ```

use std::fmt;

use crate::error::Result;
use crate::generator::GeneratorConfig;
use crate::quoting::{escape_identifier_into, escape_string_into, hex_literal};

/// The quoting context a [`QuotedRegion`] writes into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuoteContext {
    Identifier,
    StringLiteral,
}

/// Append-only SQL text accumulator.
#[derive(Debug, Clone)]
pub struct QueryBuilder {
    buf: String,
    identifier_quote: char,
    string_quote: char,
    backslash_escapes: bool,
}

impl Default for QueryBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl QueryBuilder {
    /// Create a builder using MySQL defaults.
    pub fn new() -> Self {
        Self::with_config(&GeneratorConfig::default())
    }

    /// Create a builder using the quoting rules of `config`.
    pub fn with_config(config: &GeneratorConfig) -> Self {
        Self {
            buf: String::new(),
            identifier_quote: config.identifier_quote,
            string_quote: config.string_quote,
            backslash_escapes: config.backslash_escapes,
        }
    }

    /// Append text verbatim. Only for keywords and punctuation.
    pub fn put(&mut self, text: &str) -> &mut Self {
        self.buf.push_str(text);
        self
    }

    /// Append `name` as a quoted identifier.
    pub fn put_identifier(&mut self, name: &str) -> &mut Self {
        self.identifier().push_str(name);
        self
    }

    /// Append `value` as a quoted string literal.
    pub fn put_string(&mut self, value: &str) -> &mut Self {
        self.string_literal().push_str(value);
        self
    }

    /// Append a byte payload as a literal.
    ///
    /// UTF-8 payloads are written as an escaped string literal, anything else
    /// as a hex literal so no byte is lost.
    pub fn put_bytes(&mut self, value: &[u8]) -> &mut Self {
        match std::str::from_utf8(value) {
            Ok(text) => self.put_string(text),
            Err(_) => {
                self.buf.push_str(&hex_literal(value));
                self
            }
        }
    }

    /// Append a number in canonical, locale-independent form.
    pub fn put_number<N: SqlNumber>(&mut self, value: N) -> &mut Self {
        value.write_sql(&mut self.buf);
        self
    }

    /// Append `items` rendered by `f`, separated by `sep`.
    pub fn put_list<T, F>(&mut self, items: &[T], sep: &str, mut f: F) -> Result<&mut Self>
    where
        F: FnMut(&mut Self, &T) -> Result<()>,
    {
        for (i, item) in items.iter().enumerate() {
            if i > 0 {
                self.buf.push_str(sep);
            }
            f(self, item)?;
        }
        Ok(self)
    }

    /// Open a quoted identifier region.
    pub fn identifier(&mut self) -> QuotedRegion<'_> {
        QuotedRegion::open(self, QuoteContext::Identifier)
    }

    /// Open a quoted string literal region.
    pub fn string_literal(&mut self) -> QuotedRegion<'_> {
        QuotedRegion::open(self, QuoteContext::StringLiteral)
    }

    /// The text accumulated so far.
    pub fn as_str(&self) -> &str {
        &self.buf
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Consume the builder and return the statement text.
    pub fn finish(self) -> String {
        self.buf
    }

    fn delimiter(&self, context: QuoteContext) -> char {
        match context {
            QuoteContext::Identifier => self.identifier_quote,
            QuoteContext::StringLiteral => self.string_quote,
        }
    }
}

/// An open quoted region of a [`QueryBuilder`]. Closed on drop.
pub struct QuotedRegion<'a> {
    builder: &'a mut QueryBuilder,
    context: QuoteContext,
}

impl<'a> QuotedRegion<'a> {
    fn open(builder: &'a mut QueryBuilder, context: QuoteContext) -> Self {
        let quote = builder.delimiter(context);
        builder.buf.push(quote);
        Self { builder, context }
    }

    pub fn context(&self) -> QuoteContext {
        self.context
    }

    /// Append `text`, escaped for this region's context.
    pub fn push_str(&mut self, text: &str) -> &mut Self {
        let quote = self.builder.delimiter(self.context);
        let backslash_escapes = self.builder.backslash_escapes;
        let buf = &mut self.builder.buf;
        match self.context {
            QuoteContext::Identifier => escape_identifier_into(buf, text, quote),
            QuoteContext::StringLiteral => escape_string_into(buf, text, quote, backslash_escapes),
        }
        self
    }

    pub fn push_char(&mut self, c: char) -> &mut Self {
        let mut tmp = [0u8; 4];
        self.push_str(c.encode_utf8(&mut tmp))
    }
}

impl fmt::Write for QuotedRegion<'_> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.push_str(s);
        Ok(())
    }
}

impl Drop for QuotedRegion<'_> {
    fn drop(&mut self) {
        let quote = self.builder.delimiter(self.context);
        self.builder.buf.push(quote);
    }
}

/// Numbers that [`QueryBuilder::put_number`] can render.
pub trait SqlNumber {
    fn write_sql(&self, out: &mut String);
}

macro_rules! impl_sql_integer {
    ($($t:ty),*) => {
        $(
            impl SqlNumber for $t {
                fn write_sql(&self, out: &mut String) {
                    use std::fmt::Write as _;
                    let _ = write!(out, "{}", self);
                }
            }
        )*
    };
}

impl_sql_integer!(u32, u64, i32, i64, usize);

// `Debug` gives the shortest representation that round-trips and switches to
// exponent notation for very large or small magnitudes.
macro_rules! impl_sql_float {
    ($($t:ty),*) => {
        $(
            impl SqlNumber for $t {
                fn write_sql(&self, out: &mut String) {
                    use std::fmt::Write as _;
                    let _ = write!(out, "{:?}", self);
                }
            }
        )*
    };
}

impl_sql_float!(f32, f64);
