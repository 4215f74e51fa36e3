// src/lib.rs
//! Compiler for a small C subset targeting a MIPS-style stack machine.
//!
//! The pipeline is a strict left-to-right composition: the scanner turns the
//! source into a token buffer by running a longest-match scan over a DFA
//! built from an NFA of token specifications; the LR(1) parser, whose states
//! are constructed from the grammar at startup, drives the code generator on
//! every reduction; the generator accumulates the assembly listing.

pub mod codegen;
pub mod lexer;
pub mod parser;
pub mod tokens;

use std::io::Write;

use codegen::CodeGen;
use lexer::Scanner;
use parser::{grammar::Grammar, states::StateTable};

/// Compile `source` and write the assembly listing to `out`. A failed parse
/// reports an error and writes nothing.
pub fn compile(source: &str, out: &mut dyn Write) -> Result<(), String> {
    let scanner = Scanner::new();
    let tokens = scanner.scan(source);
    log::debug!(
        "[pipeline] scanned tokens: {:?}",
        tokens.iter().map(|t| t.tag).collect::<Vec<_>>()
    );

    let table = StateTable::construct(Grammar::c_subset());

    let mut gen = CodeGen::new();
    parser::parse(&table, &tokens, &mut gen)?;

    for line in gen.listing() {
        writeln!(out, "{line}").map_err(|e| format!("write listing: {e}"))?;
    }
    Ok(())
}
