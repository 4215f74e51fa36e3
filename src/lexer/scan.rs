// src/lexer/scan.rs
// Token specifications and the longest-match scan driver.

use super::{dfa::Dfa, nfa::Nfa};
use crate::tokens::{Tag, Token};

const KEYWORDS: &[(&str, Tag)] = &[
    ("int", Tag::Int),
    ("main", Tag::Main),
    ("void", Tag::Void),
    ("break", Tag::Break),
    ("do", Tag::Do),
    ("else", Tag::Else),
    ("if", Tag::If),
    ("while", Tag::While),
    ("return", Tag::Return),
    ("scanf", Tag::Read),
    ("printf", Tag::Write),
];

const SYMBOLS: &[(&str, Tag)] = &[
    ("{", Tag::LBrace),
    ("}", Tag::RBrace),
    ("[", Tag::LSquare),
    ("]", Tag::RSquare),
    ("(", Tag::LPar),
    (")", Tag::RPar),
    (";", Tag::Semi),
    ("+", Tag::Plus),
    ("-", Tag::Minus),
    ("*", Tag::MulOp),
    ("/", Tag::DivOp),
    ("&", Tag::AndOp),
    ("|", Tag::OrOp),
    ("!", Tag::NotOp),
    ("=", Tag::Assign),
    ("<", Tag::Lt),
    (">", Tag::Gt),
    ("<<", Tag::ShlOp),
    (">>", Tag::ShrOp),
    ("==", Tag::Eq),
    ("!=", Tag::NotEq),
    ("<=", Tag::LtEq),
    (">=", Tag::GtEq),
    ("&&", Tag::AndAnd),
    ("||", Tag::OrOr),
    (",", Tag::Comma),
];

#[inline]
fn is_separator(b: u8) -> bool {
    matches!(b, b' ' | b'\t' | b'\r' | b'\n' | 0)
}

/// Printable preview of the input around byte `i`, for lexical-error reports.
fn context_preview(src: &[u8], i: usize) -> (usize, String) {
    let lo = i.saturating_sub(16);
    let hi = (i + 16).min(src.len());
    let mut s = String::new();
    for &b in &src[lo..hi] {
        s.push(if b.is_ascii_graphic() || b == b' ' {
            b as char
        } else {
            '.'
        });
    }
    (lo, s)
}

pub struct Scanner {
    dfa: Dfa,
}

impl Default for Scanner {
    fn default() -> Self {
        Self::new()
    }
}

impl Scanner {
    /// Build the token NFA — integer literals, then every literal word, then
    /// the identifier rule last so it can graft onto keyword branches — and
    /// run subset construction.
    pub fn new() -> Self {
        let mut nfa = Nfa::new();
        nfa.add_int_literal();
        for &(word, tag) in KEYWORDS {
            nfa.add_word(word, tag);
        }
        for &(sym, tag) in SYMBOLS {
            nfa.add_word(sym, tag);
        }
        nfa.add_identifier();

        let dfa = Dfa::from_nfa(&nfa);
        log::debug!(
            "[scanner] {} nfa states -> {} dfa states",
            nfa.states.len(),
            dfa.states.len()
        );
        Scanner { dfa }
    }

    pub fn dfa(&self) -> &Dfa {
        &self.dfa
    }

    /// Longest-match scan. Whitespace separates tokens and is never emitted;
    /// a byte no state can consume is reported and skipped. The returned
    /// stream always ends with a `ScanEof` sentinel.
    pub fn scan(&self, input: &str) -> Vec<Token> {
        let bytes = input.as_bytes();
        let mut out = Vec::new();
        let mut state = self.dfa.start;
        let mut lexeme = String::new();
        let mut i = 0;

        while i < bytes.len() {
            let b = bytes[i];

            if is_separator(b) {
                if state != self.dfa.start {
                    if let Some(tag) = self.dfa.accept_of(state) {
                        out.push(Token::new(tag, std::mem::take(&mut lexeme)));
                    } else {
                        log::warn!("[scanner] dropping incomplete token {lexeme:?}");
                        lexeme.clear();
                    }
                    state = self.dfa.start;
                }
                i += 1;
                continue;
            }

            match self.dfa.step(state, b) {
                Some(next) => {
                    state = next;
                    lexeme.push(b as char);
                    i += 1;
                }
                None => {
                    if let Some(tag) = self.dfa.accept_of(state) {
                        // Token ended just before `b`; re-scan `b` from the top.
                        out.push(Token::new(tag, std::mem::take(&mut lexeme)));
                    } else {
                        let (lo, ctx) = context_preview(bytes, i);
                        log::warn!(
                            "[scanner] no rule matches byte 0x{b:02X} ({:?}) at offset {i}; \
                             context [{lo}..): {ctx}",
                            b as char
                        );
                        lexeme.clear();
                        i += 1;
                    }
                    state = self.dfa.start;
                }
            }
        }

        if state != self.dfa.start {
            if let Some(tag) = self.dfa.accept_of(state) {
                out.push(Token::new(tag, lexeme));
            } else {
                log::warn!("[scanner] dropping incomplete token {lexeme:?} at end of input");
            }
        }

        out.push(Token::new(Tag::ScanEof, ""));
        out
    }
}
