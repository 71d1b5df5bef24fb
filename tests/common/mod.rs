#![allow(dead_code)]
//! A sketch of the query grammar, enough to write tests as query text instead
//! of hand built trees. Offsets are char indices into the query.

use hedge_compiler::ast::*;
use hedge_compiler::datatype::FieldEnum;
use hedge_compiler::dialect::Dialect;
use hedge_compiler::forecast::Forecast;
use hedge_compiler::plan::QueryPlan;
use hedge_compiler::{Analysis, Engine, SemanticError};

const STOP: &str = ":><~|&,.{}[]()'\"`";

struct Sketch {
    chars: Vec<char>,
    pos: usize,
}
impl Sketch {
    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }
    fn peek_at(&self, offset: usize) -> Option<char> {
        self.chars.get(self.pos + offset).copied()
    }
    fn eat(&mut self, c: char) -> bool {
        if self.peek() == Some(c) {
            self.pos += 1;
            true
        }
        else {
            false
        }
    }
    fn expect(&mut self, c: char) {
        assert!(self.eat(c), "expected '{}' at {}", c, self.pos);
    }
    fn skip(&mut self, chars: &str) {
        while matches!(self.peek(), Some(c) if c.is_whitespace() || chars.contains(c)) {
            self.pos += 1;
        }
    }
    fn at_end_of_clause(&self) -> bool {
        match self.peek() {
            None => true,
            Some(c) => c.is_whitespace() || "&|]".contains(c),
        }
    }

    fn root(&mut self) -> SemanticRoot {
        let mut items = Vec::new();
        loop {
            self.skip("&");
            if self.peek().is_none() {
                break;
            }
            items.push(self.item());
        }
        SemanticRoot { items, span: Span::new(0, self.chars.len()) }
    }

    fn item(&mut self) -> SequenceItem {
        let begin = self.pos;
        let minus = self.eat('-');
        let source = self.eat('^');
        let body = match self.peek() {
            Some('[') => SequenceBody::Annotation(self.annotation()),
            Some('(') => SequenceBody::Bracket(self.bracket()),
            _ => SequenceBody::Element(self.element()),
        };
        SequenceItem { minus, source, body, span: Span::new(begin, self.pos) }
    }

    fn prefix(&mut self) -> Option<PrefixSymbol> {
        let value = match self.peek()? {
            '@' => Prefix::At,
            '#' => Prefix::Hash,
            '$' => Prefix::Dollar,
            _ => return None,
        };
        self.pos += 1;
        Some(PrefixSymbol { value, span: Span::new(self.pos - 1, self.pos) })
    }

    fn annotation(&mut self) -> Annotation {
        let begin = self.pos;
        self.expect('[');
        let prefix = self.prefix();
        let mut items = Vec::new();
        loop {
            self.skip("|,");
            if self.eat(']') {
                break;
            }
            items.push(self.str());
        }
        Annotation { prefix, items, span: Span::new(begin, self.pos) }
    }

    fn bracket(&mut self) -> Bracket {
        let begin = self.pos;
        self.expect('(');
        let mut items = Vec::new();
        loop {
            self.skip("");
            if self.eat(')') {
                break;
            }
            items.push(self.str());
        }
        Bracket { items, span: Span::new(begin, self.pos) }
    }

    fn element(&mut self) -> Element {
        let begin = self.pos;
        let prefix = self.prefix();
        let mut items = vec![self.sfp()];
        while self.eat('|') {
            items.push(self.sfp());
        }
        Element { prefix, items, span: Span::new(begin, self.pos) }
    }

    fn sfp(&mut self) -> Sfp {
        let begin = self.pos;
        let subject = self.str_list();
        let family = self.family();
        let predicative = match family {
            Some(_) if !self.at_end_of_clause() => Some(self.predicative()),
            _ => None,
        };
        Sfp { subject, family, predicative, span: Span::new(begin, self.pos) }
    }

    fn family(&mut self) -> Option<Family> {
        let begin = self.pos;
        let symbol = |len: usize| -> String { self.chars[begin..(begin + len).min(self.chars.len())].iter().collect() };
        let (relation, len) = [2, 1]
            .into_iter()
            .find_map(|len| Relation::from_symbol(&symbol(len)).map(|relation| (relation, len)))?;
        self.pos += len;
        Some(Family { relation, span: Span::new(begin, self.pos) })
    }

    fn predicative(&mut self) -> Predicative {
        match self.peek() {
            Some('{') => Predicative::Col(self.col()),
            Some('[') | Some('(') => Predicative::Range(self.range()),
            Some('+') | Some('-') | Some('^') => Predicative::SortList(self.sort_list(Vec::new())),
            _ => {
                let list = self.str_list();
                if self.peek() == Some(',') {
                    let first = list.single().expect("sort item is a single token").clone();
                    let item = SortItem { span: first.span, value: first, source: false, direction: 0 };
                    self.pos += 1;
                    Predicative::SortList(self.sort_list(vec![item]))
                }
                else {
                    Predicative::StrList(list)
                }
            }
        }
    }

    fn col(&mut self) -> Col {
        let begin = self.pos;
        self.expect('{');
        let mut items = Vec::new();
        loop {
            self.skip(",");
            if self.eat('}') {
                break;
            }
            items.push(self.str());
        }
        Col { items, span: Span::new(begin, self.pos) }
    }

    fn range(&mut self) -> Range {
        let begin = self.pos;
        let include_from = self.eat('[');
        if !include_from {
            self.expect('(');
        }
        self.skip("");
        let from = self.str();
        self.skip(",");
        let to = self.str();
        self.skip("");
        let include_to = self.eat(']');
        if !include_to {
            self.expect(')');
        }
        Range { from, to, include_from, include_to, span: Span::new(begin, self.pos) }
    }

    fn sort_list(&mut self, mut items: Vec<SortItem>) -> SortList {
        let begin = items.first().map(|i: &SortItem| i.span.begin).unwrap_or(self.pos);
        loop {
            let item_begin = self.pos;
            let direction = if self.eat('+') { 1 } else if self.eat('-') { -1 } else { 0 };
            let source = self.eat('^');
            let value = self.str();
            items.push(SortItem { value, source, direction, span: Span::new(item_begin, self.pos) });
            if !self.eat(',') {
                break;
            }
        }
        SortList { items, span: Span::new(begin, self.pos) }
    }

    fn str_list(&mut self) -> StrList {
        let begin = self.pos;
        let mut items = vec![self.str()];
        while self.eat('.') {
            items.push(self.str());
        }
        StrList { items, span: Span::new(begin, self.pos) }
    }

    fn str(&mut self) -> Str {
        let begin = self.pos;
        let kind = match self.peek() {
            Some('\'') => StrType::Apostrophe,
            Some('"') => StrType::DoubleQuotes,
            Some('`') => StrType::Backticks,
            _ => StrType::Restricted,
        };
        if kind == StrType::Restricted {
            while matches!(self.peek(), Some(c) if !c.is_whitespace() && !STOP.contains(c)) {
                self.pos += 1;
            }
            assert!(self.pos > begin, "expected a token at {}", begin);
            let value: String = self.chars[begin..self.pos].iter().collect();
            return Str::new(value, kind, Span::new(begin, self.pos));
        }
        let quote = self.chars[begin];
        self.pos += 1;
        while self.peek().is_some_and(|c| c != quote) {
            self.pos += 1;
        }
        let value: String = self.chars[begin + 1..self.pos].iter().collect();
        self.expect(quote);
        Str::new(value, kind, Span::new(begin, self.pos))
    }
}

pub fn parse(text: &str) -> SemanticRoot {
    Sketch { chars: text.chars().collect(), pos: 0 }.root()
}

pub fn compile<O: FieldEnum>(dialect: &Dialect<O>, text: &str) -> Analysis<O> {
    Engine::new(dialect).compile(&parse(text))
}

/// The plan of a query expected to compile cleanly.
pub fn plan<O: FieldEnum>(dialect: &Dialect<O>, text: &str) -> QueryPlan<O> {
    let analysis = compile(dialect, text);
    assert!(analysis.errors.is_empty(), "unexpected errors for '{}': {:?}", text, analysis.errors);
    analysis.plan.expect("plan of a clean compile")
}

pub fn errors<O: FieldEnum>(dialect: &Dialect<O>, text: &str) -> Vec<SemanticError> {
    compile(dialect, text).errors
}

/// The only error of a query expected to fail.
pub fn error<O: FieldEnum>(dialect: &Dialect<O>, text: &str) -> SemanticError {
    let mut errors = errors(dialect, text);
    assert_eq!(errors.len(), 1, "expected one error for '{}': {:?}", text, errors);
    errors.remove(0)
}

pub fn forecast<O: FieldEnum>(dialect: &Dialect<O>, text: &str, cursor: usize) -> Option<Forecast> {
    Engine::new(dialect).forecast(&parse(text), cursor)
}

/// Span of the first occurrence of `needle` in `text`.
pub fn token(text: &str, needle: &str) -> Span {
    let byte = text.find(needle).expect("needle in text");
    let begin = text[..byte].chars().count();
    Span::new(begin, begin + needle.chars().count())
}
