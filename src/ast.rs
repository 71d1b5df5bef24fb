//! The syntax tree handed over by the grammar stage.
//!
//! Every node carries the [`Span`] it was lexed from, so that diagnostics and
//! forecasts can point back into the query text. The tree is treated as
//! already validated: the compiler never looks at raw text except inside a
//! single [`Str`] leaf.

// used to read queries handed over as JSON and to echo them back
use serde::{Deserialize, Serialize};

// used to revert a node into query text
use std::fmt;

// ------------- Span -------------
/// Half-open `[begin, end)` character offsets into the query text.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Span {
    pub begin: usize,
    pub end: usize,
}
impl Span {
    pub fn new(begin: usize, end: usize) -> Self {
        Self { begin, end }
    }
    /// Cursor containment is inclusive at both ends, so a cursor placed right
    /// behind the last character still belongs to the token.
    pub fn contains(&self, cursor: usize) -> bool {
        self.begin <= cursor && cursor <= self.end
    }
    /// The smallest span covering both.
    pub fn to(&self, other: Span) -> Span {
        Span::new(self.begin.min(other.begin), self.end.max(other.end))
    }
    pub fn within(&self, outer: Span) -> bool {
        outer.begin <= self.begin && self.end <= outer.end
    }
}

// ------------- Str -------------
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrType {
    /// bare word, eligible for fuzzy matching and for keywords
    Restricted,
    Apostrophe,
    DoubleQuotes,
    /// backtick quoted, always matched exactly
    Backticks,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Str {
    pub value: String,
    pub kind: StrType,
    pub span: Span,
}
impl Str {
    pub fn new(value: impl Into<String>, kind: StrType, span: Span) -> Self {
        Self { value: value.into(), kind, span }
    }
    pub fn is_precise(&self) -> bool {
        self.kind == StrType::Backticks
    }
    pub fn is_restricted(&self) -> bool {
        self.kind == StrType::Restricted
    }
}
impl fmt::Display for Str {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.kind {
            StrType::Restricted => write!(f, "{}", self.value),
            StrType::Apostrophe => write!(f, "'{}'", self.value),
            StrType::DoubleQuotes => write!(f, "\"{}\"", self.value),
            StrType::Backticks => write!(f, "`{}`", self.value),
        }
    }
}

fn write_joined<T: fmt::Display>(f: &mut fmt::Formatter, items: &[T], separator: &str) -> fmt::Result {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            f.write_str(separator)?;
        }
        write!(f, "{}", item)?;
    }
    Ok(())
}

// ------------- Predicative shapes -------------
/// A dotted address such as `a.b.c`. A single item is the scalar case.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StrList {
    pub items: Vec<Str>,
    pub span: Span,
}
impl StrList {
    /// The only item, if this list is not an address.
    pub fn single(&self) -> Option<&Str> {
        match self.items.as_slice() {
            [only] => Some(only),
            _ => None,
        }
    }
    /// Index of the segment under the cursor.
    pub fn segment_at(&self, cursor: usize) -> Option<usize> {
        self.items.iter().position(|s| s.span.contains(cursor))
    }
}
impl fmt::Display for StrList {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write_joined(f, &self.items, ".")
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Col {
    pub items: Vec<Str>,
    pub span: Span,
}
impl fmt::Display for Col {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("{")?;
        write_joined(f, &self.items, ", ")?;
        f.write_str("}")
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Range {
    pub from: Str,
    pub to: Str,
    pub include_from: bool,
    pub include_to: bool,
    pub span: Span,
}
impl fmt::Display for Range {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let open = if self.include_from { '[' } else { '(' };
        let close = if self.include_to { ']' } else { ')' };
        write!(f, "{}{}, {}{}", open, self.from, self.to, close)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortItem {
    pub value: Str,
    /// `^` in front of the key, selecting the source-data variant
    pub source: bool,
    /// `1` ascending, `-1` descending, `0` unspecified
    pub direction: i8,
    pub span: Span,
}
impl fmt::Display for SortItem {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.direction {
            d if d > 0 => f.write_str("+")?,
            d if d < 0 => f.write_str("-")?,
            _ => {}
        }
        if self.source {
            f.write_str("^")?;
        }
        write!(f, "{}", self.value)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortList {
    pub items: Vec<SortItem>,
    pub span: Span,
}
impl fmt::Display for SortList {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write_joined(f, &self.items, ",")
    }
}

/// The predicate shapes named in diagnostics.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ValueType {
    Address,
    Collection,
    Range,
    SortList,
}
impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ValueType::Address => write!(f, "ADDRESS"),
            ValueType::Collection => write!(f, "COLLECTION"),
            ValueType::Range => write!(f, "RANGE"),
            ValueType::SortList => write!(f, "SORT_LIST"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Predicative {
    StrList(StrList),
    Col(Col),
    Range(Range),
    SortList(SortList),
}
impl Predicative {
    pub fn span(&self) -> Span {
        match self {
            Predicative::StrList(p) => p.span,
            Predicative::Col(p) => p.span,
            Predicative::Range(p) => p.span,
            Predicative::SortList(p) => p.span,
        }
    }
    pub fn value_type(&self) -> ValueType {
        match self {
            Predicative::StrList(_) => ValueType::Address,
            Predicative::Col(_) => ValueType::Collection,
            Predicative::Range(_) => ValueType::Range,
            Predicative::SortList(_) => ValueType::SortList,
        }
    }
    /// The value token under the cursor, for shapes made of plain tokens.
    pub fn leaf_at(&self, cursor: usize) -> Option<&Str> {
        let items = match self {
            Predicative::StrList(p) => &p.items,
            Predicative::Col(p) => &p.items,
            Predicative::Range(p) => {
                return [&p.from, &p.to].into_iter().find(|s| s.span.contains(cursor));
            }
            Predicative::SortList(_) => return None,
        };
        items.iter().find(|s| s.span.contains(cursor))
    }
}
impl fmt::Display for Predicative {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Predicative::StrList(p) => write!(f, "{}", p),
            Predicative::Col(p) => write!(f, "{}", p),
            Predicative::Range(p) => write!(f, "{}", p),
            Predicative::SortList(p) => write!(f, "{}", p),
        }
    }
}

// ------------- Family -------------
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Relation {
    #[serde(rename = ":")]
    Is,
    #[serde(rename = ">")]
    Greater,
    #[serde(rename = ">=")]
    GreaterEqual,
    #[serde(rename = "<")]
    Less,
    #[serde(rename = "<=")]
    LessEqual,
    #[serde(rename = "~")]
    To,
    #[serde(rename = "~+")]
    Next,
    #[serde(rename = "~-")]
    Previous,
}
impl Relation {
    pub fn symbol(&self) -> &'static str {
        match self {
            Relation::Is => ":",
            Relation::Greater => ">",
            Relation::GreaterEqual => ">=",
            Relation::Less => "<",
            Relation::LessEqual => "<=",
            Relation::To => "~",
            Relation::Next => "~+",
            Relation::Previous => "~-",
        }
    }
    pub fn from_symbol(symbol: &str) -> Option<Relation> {
        match symbol {
            ":" => Some(Relation::Is),
            ">" => Some(Relation::Greater),
            ">=" => Some(Relation::GreaterEqual),
            "<" => Some(Relation::Less),
            "<=" => Some(Relation::LessEqual),
            "~" => Some(Relation::To),
            "~+" => Some(Relation::Next),
            "~-" => Some(Relation::Previous),
            _ => None,
        }
    }
    pub fn is_comparison(&self) -> bool {
        matches!(self, Relation::Greater | Relation::GreaterEqual | Relation::Less | Relation::LessEqual)
    }
    /// `~+` and `~-` never take a predicative.
    pub fn is_unary(&self) -> bool {
        matches!(self, Relation::Next | Relation::Previous)
    }
}
impl fmt::Display for Relation {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Family {
    pub relation: Relation,
    pub span: Span,
}

// ------------- Clauses -------------
/// Subject, family and predicative of one clause, e.g. `score:>5`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sfp {
    pub subject: StrList,
    pub family: Option<Family>,
    pub predicative: Option<Predicative>,
    pub span: Span,
}
impl fmt::Display for Sfp {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.subject)?;
        if let Some(family) = &self.family {
            write!(f, "{}", family.relation)?;
        }
        if let Some(predicative) = &self.predicative {
            write!(f, "{}", predicative)?;
        }
        Ok(())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Prefix {
    #[serde(rename = "@")]
    At,
    #[serde(rename = "#")]
    Hash,
    #[serde(rename = "$")]
    Dollar,
}
impl Prefix {
    pub fn symbol(&self) -> char {
        match self {
            Prefix::At => '@',
            Prefix::Hash => '#',
            Prefix::Dollar => '$',
        }
    }
}
impl fmt::Display for Prefix {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrefixSymbol {
    pub value: Prefix,
    pub span: Span,
}

/// `a|b.c:d` style alternatives.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Element {
    pub prefix: Option<PrefixSymbol>,
    pub items: Vec<Sfp>,
    pub span: Span,
}
impl fmt::Display for Element {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if let Some(prefix) = &self.prefix {
            write!(f, "{}", prefix.value)?;
        }
        write_joined(f, &self.items, "|")
    }
}

/// `[a|b]` style annotation references.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Annotation {
    pub prefix: Option<PrefixSymbol>,
    pub items: Vec<Str>,
    pub span: Span,
}
impl fmt::Display for Annotation {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("[")?;
        if let Some(prefix) = &self.prefix {
            write!(f, "{}", prefix.value)?;
        }
        write_joined(f, &self.items, "|")?;
        f.write_str("]")
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bracket {
    pub items: Vec<Str>,
    pub span: Span,
}
impl fmt::Display for Bracket {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("(")?;
        write_joined(f, &self.items, " ")?;
        f.write_str(")")
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SequenceBody {
    Element(Element),
    Annotation(Annotation),
    Bracket(Bracket),
}

/// One conjunct of the query, optionally negated (`-`) and/or source flagged (`^`).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SequenceItem {
    pub minus: bool,
    pub source: bool,
    pub body: SequenceBody,
    pub span: Span,
}
impl fmt::Display for SequenceItem {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.minus {
            f.write_str("-")?;
        }
        if self.source {
            f.write_str("^")?;
        }
        match &self.body {
            SequenceBody::Element(e) => write!(f, "{}", e),
            SequenceBody::Annotation(a) => write!(f, "{}", a),
            SequenceBody::Bracket(b) => write!(f, "{}", b),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SemanticRoot {
    pub items: Vec<SequenceItem>,
    pub span: Span,
}
impl fmt::Display for SemanticRoot {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write_joined(f, &self.items, " & ")
    }
}
