pub mod compilation_unit;
pub(crate) mod declaration_parser;
pub mod fragment;
pub mod lexer;

pub use compilation_unit::{ImportDecl, JavaFile};
pub use fragment::{FragmentParser, JavaFragmentParser, ParseContext};
