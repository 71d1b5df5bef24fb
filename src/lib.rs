//! Hedge compiler – the semantic stage of the hedge search language.
//!
//! Queries arrive as an already parsed tree of *subject-family-predicate*
//! clauses (see [`ast`]). Compiling one against a [`dialect::Dialect`] yields a
//! [`plan::QueryPlan`]: the filters, joinable elements and sort orders a
//! storage layer needs, each remembering the span of the text it came from.
//!
//! ## Modules
//! * [`ast`] – The tree handed over by the parser.
//! * [`datatype`] – Typed values and the capabilities fields rely on.
//! * [`parser`] – Conversions of single tokens into typed values
//!   (numbers, sizes, durations, ratios, dates, enums, digit patterns).
//! * [`field`] – Generators turning keyword clauses into filters.
//! * [`element`] – Generators for meta tags, source tags, names and annotations.
//! * [`sort`] – Sort keys and their aliases.
//! * [`dialect`] – Keyword tables per resource type, with the built-in ones.
//! * [`semantic`] – The [`semantic::Engine`] driving a compile or a forecast.
//! * [`forecast`] – Autocomplete suggestions for the token under a cursor.
//! * [`settings`] – Compiler settings read through `config`.
//!
//! ## Quick Start
//! ```
//! use hedge_compiler::ast::*;
//! use hedge_compiler::dialect::ILLUST;
//! use hedge_compiler::semantic::Engine;
//!
//! // favorite
//! let keyword = Str::new("favorite", StrType::Restricted, Span::new(0, 8));
//! let sfp = Sfp {
//!     subject: StrList { items: vec![keyword], span: Span::new(0, 8) },
//!     family: None,
//!     predicative: None,
//!     span: Span::new(0, 8),
//! };
//! let element = Element { prefix: None, items: vec![sfp], span: Span::new(0, 8) };
//! let item = SequenceItem { minus: false, source: false, body: SequenceBody::Element(element), span: Span::new(0, 8) };
//! let root = SemanticRoot { items: vec![item], span: Span::new(0, 8) };
//!
//! let analysis = Engine::new(&ILLUST).compile(&root);
//! assert!(analysis.is_ok());
//! assert_eq!(analysis.plan().map(|p| p.filters.len()), Some(1));
//! ```

use seahash::SeaHasher;
use std::hash::BuildHasherDefault;

pub type OtherHasher = BuildHasherDefault<SeaHasher>;

pub mod ast;
pub mod datatype;
pub mod dialect;
pub mod element;
pub mod error;
pub mod field;
pub mod forecast;
pub mod parser;
pub mod plan;
pub mod semantic;
pub mod settings;
pub mod sort;

pub use error::{CompilerError, Diagnostic, Result, SemanticError};
pub use semantic::{Analysis, Engine};
pub use settings::CompilerSettings;
