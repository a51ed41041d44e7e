//! The pest-generated line tokenizer. `Rule::program` is the entry point;
//! callers (`lib.rs`) walk the resulting pairs into [`crate::ast::ParsedLine`]
//! records.

use pest_derive::Parser;

#[derive(Parser)]
#[grammar = "grammar.pest"]
pub struct LineParser;
