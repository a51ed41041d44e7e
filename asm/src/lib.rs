//! `vm16-asm`: the two-pass assembler for `vm16`'s line-oriented assembly
//! language. Pure over its input: no filesystem access, no architectural
//! state. `vm16-exec`'s `asm` subcommand is the only caller that touches a
//! file.

mod ast;
mod error;
mod labels;
mod mnemonics;
mod numeric;
mod parser;

#[cfg(test)]
mod test;

use std::collections::HashMap;

use pest::iterators::Pair;
use pest::Parser;

pub use ast::{Operand, ParsedLine};
pub use error::AssembleError;
pub use labels::LabelTable;

use ast::InstructionRecord;
use parser::{LineParser, Rule};

/// Assembles `source` into a code-word sequence plus the final label table.
/// The label table is advisory: it is not embedded in the returned words.
pub fn assemble(source: &str) -> Result<(Vec<u16>, HashMap<String, u16>), AssembleError> {
    let lines = parse_lines(source)?;
    let (records, labels) = first_pass(lines)?;
    let words = second_pass(&records, &labels)?;
    Ok((words, labels.into_map()))
}

fn parse_lines(source: &str) -> Result<Vec<ParsedLine>, AssembleError> {
    let program = LineParser::parse(Rule::program, source)
        .map_err(Box::new)
        .map_err(|source| AssembleError::Lex {
            line: line_of(&source),
            source,
        })?
        .next()
        .expect("program rule always produces exactly one pair");

    program
        .into_inner()
        .filter(|pair| pair.as_rule() == Rule::line)
        .map(to_parsed_line)
        .collect()
}

fn line_of(err: &pest::error::Error<Rule>) -> usize {
    match err.line_col {
        pest::error::LineColLocation::Pos((l, _)) => l,
        pest::error::LineColLocation::Span((l, _), _) => l,
    }
}

fn to_parsed_line(pair: Pair<Rule>) -> Result<ParsedLine, AssembleError> {
    let line_number = pair.as_span().start_pos().line_col().0;
    let mut label = None;
    let mut mnemonic = None;
    let mut operands = Vec::new();

    for inner in pair.into_inner() {
        match inner.as_rule() {
            Rule::label_def => {
                let ident = inner.into_inner().next().expect("label_def wraps an identifier");
                label = Some(ident.as_str().to_string());
            }
            Rule::instruction => {
                let mut fields = inner.into_inner();
                let mnemonic_pair = fields.next().expect("instruction always starts with a mnemonic");
                mnemonic = Some(mnemonic_pair.as_str().to_string());
                for operand_pair in fields {
                    operands.push(to_operand(operand_pair, line_number)?);
                }
            }
            other => unreachable!("unexpected rule inside line: {other:?}"),
        }
    }

    Ok(ParsedLine {
        label,
        mnemonic,
        operands,
        line_number,
    })
}

fn to_operand(pair: Pair<Rule>, line: usize) -> Result<Operand, AssembleError> {
    let inner = pair.into_inner().next().expect("operand always wraps one alternative");
    match inner.as_rule() {
        Rule::indexed => {
            let mut fields = inner.into_inner();
            let offset = numeric::parse_int_literal(fields.next().unwrap(), line)?;
            let rs = parse_register(fields.next().unwrap());
            Ok(Operand::Indexed(offset, rs))
        }
        Rule::register => Ok(Operand::Register(parse_register(inner))),
        Rule::int_literal => Ok(Operand::Immediate(numeric::parse_int_literal(inner, line)?)),
        Rule::identifier => Ok(Operand::Label(inner.as_str().to_string())),
        other => unreachable!("unexpected operand alternative: {other:?}"),
    }
}

fn parse_register(pair: Pair<Rule>) -> u8 {
    let text = pair.as_str();
    u8::from_str_radix(&text[1..], 16).expect("register rule guarantees a single hex nibble")
}

fn first_pass(lines: Vec<ParsedLine>) -> Result<(Vec<InstructionRecord>, LabelTable), AssembleError> {
    let mut address: u16 = 0;
    let mut labels = LabelTable::new();
    let mut records = Vec::new();

    for line in lines {
        if let Some(label) = &line.label {
            labels.define(label, address, line.line_number)?;
        }
        if let Some(mnemonic) = line.mnemonic {
            records.push(InstructionRecord {
                mnemonic,
                operands: line.operands,
                address,
                line_number: line.line_number,
            });
            address = address.wrapping_add(2);
        }
    }

    Ok((records, labels))
}

fn second_pass(records: &[InstructionRecord], labels: &LabelTable) -> Result<Vec<u16>, AssembleError> {
    records
        .iter()
        .map(|record| {
            let instr = mnemonics::to_instruction(
                &record.mnemonic,
                &record.operands,
                record.address,
                record.line_number,
                labels,
            )?;
            Ok(vm16::encode(&instr))
        })
        .collect()
}
