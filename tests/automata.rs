//! Automaton kernel: ε-closure, Thompson primitives, and subset
//! construction, exercised on small hand-built machines.

use simplc::lexer::{dfa::Dfa, nfa::Nfa};
use simplc::tokens::Tag;

/// Walk `input` through the DFA and return the accept tag of the final
/// state, or None if the walk dies or ends in a non-accepting state.
fn accepts(dfa: &Dfa, input: &str) -> Option<Tag> {
    let mut state = dfa.start;
    for &b in input.as_bytes() {
        state = dfa.step(state, b)?;
    }
    dfa.accept_of(state)
}

#[test]
fn epsilon_closure_is_reflexive_and_transitive() {
    let mut nfa = Nfa::new();
    let a = nfa.atom(b'a');
    let starred = nfa.star(a);
    nfa.link(nfa.start, None, starred.0);

    let closure = nfa.epsilon_closure(nfa.start);
    assert!(closure.contains(&nfa.start), "closure contains the state itself");
    assert!(closure.contains(&starred.0));
    assert!(
        closure.contains(&starred.1),
        "star start reaches star accept through epsilon"
    );
    assert!(
        closure.contains(&a.0),
        "two epsilon hops: start -> star accept -> atom start"
    );
}

#[test]
fn alternation_concatenation_and_star_compose() {
    // (ab|cd)*
    let mut nfa = Nfa::new();
    let a = nfa.atom(b'a');
    let b = nfa.atom(b'b');
    let ab = nfa.concat(a, b);
    let c = nfa.atom(b'c');
    let d = nfa.atom(b'd');
    let cd = nfa.concat(c, d);
    let alt = nfa.alternate(ab, cd);
    let starred = nfa.star(alt);
    nfa.link(nfa.start, None, starred.0);
    nfa.mark_accept(starred.1, Tag::Id);

    let dfa = Dfa::from_nfa(&nfa);
    assert_eq!(accepts(&dfa, ""), Some(Tag::Id), "star accepts empty");
    assert_eq!(accepts(&dfa, "ab"), Some(Tag::Id));
    assert_eq!(accepts(&dfa, "cd"), Some(Tag::Id));
    assert_eq!(accepts(&dfa, "abcdab"), Some(Tag::Id));
    assert_eq!(accepts(&dfa, "a"), None, "mid-word state does not accept");
    assert_eq!(accepts(&dfa, "ba"), None, "no transition kills the walk");
}

#[test]
fn dfa_start_state_is_the_start_closure() {
    let mut nfa = Nfa::new();
    nfa.add_int_literal();
    let dfa = Dfa::from_nfa(&nfa);
    assert_eq!(
        dfa.states[dfa.start as usize].members,
        nfa.epsilon_closure(nfa.start)
    );
}

#[test]
fn integer_literal_machine() {
    let mut nfa = Nfa::new();
    nfa.add_int_literal();
    let dfa = Dfa::from_nfa(&nfa);

    assert_eq!(accepts(&dfa, "0"), Some(Tag::IntNum));
    assert_eq!(accepts(&dfa, "007"), Some(Tag::IntNum));
    assert_eq!(accepts(&dfa, "123456"), Some(Tag::IntNum));
    assert_eq!(accepts(&dfa, ""), None);
    assert_eq!(accepts(&dfa, "1a"), None);
}

#[test]
fn word_chains_share_their_trunk() {
    let mut nfa = Nfa::new();
    nfa.add_word("int", Tag::Int);
    let before = nfa.states.len();
    nfa.add_word("if", Tag::If);
    // "if" reuses the 'i' pair and adds exactly one atom for 'f'
    assert_eq!(nfa.states.len(), before + 2);

    let dfa = Dfa::from_nfa(&nfa);
    assert_eq!(accepts(&dfa, "int"), Some(Tag::Int));
    assert_eq!(accepts(&dfa, "if"), Some(Tag::If));
    assert_eq!(accepts(&dfa, "in"), None, "no identifier rule installed yet");
}

#[test]
fn keyword_outranks_identifier_in_shared_states() {
    let mut nfa = Nfa::new();
    nfa.add_word("do", Tag::Do);
    nfa.add_identifier();
    let dfa = Dfa::from_nfa(&nfa);

    assert_eq!(accepts(&dfa, "do"), Some(Tag::Do));
    assert_eq!(accepts(&dfa, "d"), Some(Tag::Id));
    assert_eq!(accepts(&dfa, "dot"), Some(Tag::Id));
    assert_eq!(accepts(&dfa, "done"), Some(Tag::Id));
    assert_eq!(accepts(&dfa, "x_9"), Some(Tag::Id));
}
