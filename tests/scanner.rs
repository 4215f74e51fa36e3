//! Scanner behavior over the full token language: maximal munch, keyword
//! against identifier overlap, error recovery, and the rescan round-trip.

use rand::{rngs::StdRng, Rng, SeedableRng};
use simplc::lexer::Scanner;
use simplc::tokens::{Tag, Token};

fn scan(input: &str) -> Vec<Token> {
    Scanner::new().scan(input)
}

fn tags(tokens: &[Token]) -> Vec<Tag> {
    tokens.iter().map(|t| t.tag).collect()
}

#[test]
fn empty_input_yields_single_scaneof() {
    assert_eq!(tags(&scan("")), vec![Tag::ScanEof]);
    assert_eq!(tags(&scan("  \t\r\n")), vec![Tag::ScanEof]);
}

#[test]
fn maximal_munch_on_two_char_operators() {
    assert_eq!(tags(&scan("<=")), vec![Tag::LtEq, Tag::ScanEof]);
    assert_eq!(tags(&scan(">>")), vec![Tag::ShrOp, Tag::ScanEof]);
    assert_eq!(tags(&scan("==")), vec![Tag::Eq, Tag::ScanEof]);
    assert_eq!(tags(&scan("&&")), vec![Tag::AndAnd, Tag::ScanEof]);
    // a third '<' cannot extend '<<'
    assert_eq!(tags(&scan("<<<")), vec![Tag::ShlOp, Tag::Lt, Tag::ScanEof]);
    assert_eq!(
        tags(&scan("a<=b")),
        vec![Tag::Id, Tag::LtEq, Tag::Id, Tag::ScanEof]
    );
}

#[test]
fn keyword_prefix_continues_as_identifier() {
    let toks = scan("intx");
    assert_eq!(tags(&toks), vec![Tag::Id, Tag::ScanEof]);
    assert_eq!(toks[0].text, "intx");

    assert_eq!(tags(&scan("int")), vec![Tag::Int, Tag::ScanEof]);
    assert_eq!(tags(&scan("in")), vec![Tag::Id, Tag::ScanEof]);
    assert_eq!(tags(&scan("whilex")), vec![Tag::Id, Tag::ScanEof]);
    assert_eq!(tags(&scan("mainly")), vec![Tag::Id, Tag::ScanEof]);
    assert_eq!(tags(&scan("printf_")), vec![Tag::Id, Tag::ScanEof]);
}

#[test]
fn all_keywords_scan_to_their_tags() {
    let cases = [
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
    let scanner = Scanner::new();
    for (word, tag) in cases {
        let toks = scanner.scan(word);
        assert_eq!(toks[0].tag, tag, "keyword {word}");
        assert_eq!(toks[0].text, word);
    }
}

#[test]
fn number_then_letter_splits() {
    assert_eq!(tags(&scan("12x")), vec![Tag::IntNum, Tag::Id, Tag::ScanEof]);
}

#[test]
fn unknown_byte_is_skipped() {
    assert_eq!(tags(&scan("a @ b")), vec![Tag::Id, Tag::Id, Tag::ScanEof]);
    assert_eq!(tags(&scan("a@b")), vec![Tag::Id, Tag::Id, Tag::ScanEof]);
    assert_eq!(tags(&scan("#")), vec![Tag::ScanEof]);
}

#[test]
fn statement_scans_in_order() {
    let toks = scan("int x = 10; while (x > 0) x = x - 1;");
    assert_eq!(
        tags(&toks),
        vec![
            Tag::Int,
            Tag::Id,
            Tag::Assign,
            Tag::IntNum,
            Tag::Semi,
            Tag::While,
            Tag::LPar,
            Tag::Id,
            Tag::Gt,
            Tag::IntNum,
            Tag::RPar,
            Tag::Id,
            Tag::Assign,
            Tag::Id,
            Tag::Minus,
            Tag::IntNum,
            Tag::Semi,
            Tag::ScanEof,
        ]
    );
}

#[test]
fn rescan_of_joined_lexemes_roundtrips() {
    let scanner = Scanner::new();
    let src = "int a[3]; a[0] = 1 + 2 * 3; if (a[0] >= 7) printf(a[0]);";
    let first = scanner.scan(src);
    let joined = first
        .iter()
        .filter(|t| t.tag != Tag::ScanEof)
        .map(|t| t.text.as_str())
        .collect::<Vec<_>>()
        .join(" ");
    let second = scanner.scan(&joined);
    assert_eq!(tags(&first), tags(&second));
}

#[test]
fn seeded_random_streams_roundtrip() {
    let pool: &[(&str, Tag)] = &[
        ("while", Tag::While),
        ("int", Tag::Int),
        ("whale", Tag::Id),
        ("x", Tag::Id),
        ("ifs", Tag::Id),
        ("42", Tag::IntNum),
        ("0", Tag::IntNum),
        ("<=", Tag::LtEq),
        ("<", Tag::Lt),
        ("<<", Tag::ShlOp),
        ("&&", Tag::AndAnd),
        ("&", Tag::AndOp),
        ("(", Tag::LPar),
        (";", Tag::Semi),
    ];

    let scanner = Scanner::new();
    let mut rng = StdRng::seed_from_u64(42);
    for _ in 0..20 {
        let picks: Vec<usize> = (0..200).map(|_| rng.gen_range(0..pool.len())).collect();
        let source = picks
            .iter()
            .map(|&i| pool[i].0)
            .collect::<Vec<_>>()
            .join(" ");
        let mut expected: Vec<Tag> = picks.iter().map(|&i| pool[i].1).collect();
        expected.push(Tag::ScanEof);
        assert_eq!(tags(&scanner.scan(&source)), expected);
    }
}
