// src/bin/dump_tables.rs
// Print size statistics for the scanner DFA and the LR(1) state table.

use std::time::Instant;

use simplc::lexer::Scanner;
use simplc::parser::{grammar::Grammar, states::StateTable};

fn main() {
    env_logger::init();

    let t0 = Instant::now();
    let scanner = Scanner::new();
    let ms = t0.elapsed().as_secs_f64() * 1e3;
    println!(
        "[dump] scanner: {} dfa states ({ms:.2} ms)",
        scanner.dfa().states.len()
    );

    let t0 = Instant::now();
    let table = StateTable::construct(Grammar::c_subset());
    let ms = t0.elapsed().as_secs_f64() * 1e3;
    println!(
        "[dump] parser: {} lr(1) states from {} productions ({ms:.2} ms)",
        table.states.len(),
        table.grammar.prods.len()
    );

    for (i, st) in table.states.iter().enumerate() {
        println!(
            "state {i:3}: {:2} kernel, {:3} closure, {:2} transitions",
            st.kernel.len(),
            st.closure.len(),
            st.transitions.len()
        );
    }
}
