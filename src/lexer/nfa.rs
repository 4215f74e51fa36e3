// src/lexer/nfa.rs
// Thompson-style NFA the token language is assembled into before subset
// construction turns it into the scanning DFA.

use std::collections::BTreeSet;

use crate::tokens::Tag;

/// A transition label is a literal byte, or `None` for epsilon.
pub type Label = Option<u8>;

#[derive(Debug, Default)]
pub struct NfaState {
    pub transitions: Vec<(Label, u32)>,
    pub accept: Option<Tag>,
}

/// NFA over a dense state table. State 0 is the shared start state; every
/// token specification hangs off it.
#[derive(Debug)]
pub struct Nfa {
    pub states: Vec<NfaState>,
    pub start: u32,
}

const IDENT_TAIL: &[std::ops::RangeInclusive<u8>] =
    &[b'0'..=b'9', b'A'..=b'Z', b'a'..=b'z', b'_'..=b'_'];

fn ident_tail_bytes() -> impl Iterator<Item = u8> {
    IDENT_TAIL.iter().cloned().flatten()
}

impl Default for Nfa {
    fn default() -> Self {
        Self::new()
    }
}

impl Nfa {
    pub fn new() -> Self {
        Self {
            states: vec![NfaState::default()],
            start: 0,
        }
    }

    fn add_state(&mut self) -> u32 {
        self.states.push(NfaState::default());
        (self.states.len() - 1) as u32
    }

    /// Add one transition, ignoring exact duplicates.
    pub fn link(&mut self, from: u32, label: Label, to: u32) {
        let edges = &mut self.states[from as usize].transitions;
        if !edges.contains(&(label, to)) {
            edges.push((label, to));
        }
    }

    pub fn mark_accept(&mut self, state: u32, tag: Tag) {
        self.states[state as usize].accept = Some(tag);
    }

    // ---------- Thompson primitives; each returns (start, accept) ----------

    /// Two fresh states joined by a single byte edge.
    pub fn atom(&mut self, b: u8) -> (u32, u32) {
        let s = self.add_state();
        let f = self.add_state();
        self.link(s, Some(b), f);
        (s, f)
    }

    pub fn concat(&mut self, a: (u32, u32), b: (u32, u32)) -> (u32, u32) {
        self.link(a.1, None, b.0);
        (a.0, b.1)
    }

    pub fn alternate(&mut self, a: (u32, u32), b: (u32, u32)) -> (u32, u32) {
        let s = self.add_state();
        let f = self.add_state();
        self.link(s, None, a.0);
        self.link(s, None, b.0);
        self.link(a.1, None, f);
        self.link(b.1, None, f);
        (s, f)
    }

    pub fn star(&mut self, a: (u32, u32)) -> (u32, u32) {
        let s = self.add_state();
        let f = self.add_state();
        self.link(s, None, f);
        self.link(f, None, a.0);
        self.link(a.1, None, f);
        (s, f)
    }

    /// One state pair with a parallel byte edge per member of the class.
    pub fn class(&mut self, bytes: impl Iterator<Item = u8>) -> (u32, u32) {
        let s = self.add_state();
        let f = self.add_state();
        for b in bytes {
            self.link(s, Some(b), f);
        }
        (s, f)
    }

    /// Follow a byte edge out of `state`, looking through a single epsilon
    /// hop. This is what lets word chains share their trunk: a chain is
    /// `state -ε-> atom_start -b-> atom_end`, and the hop sees through the ε.
    pub(crate) fn step(&self, state: u32, b: u8) -> Option<u32> {
        for &(label, to) in &self.states[state as usize].transitions {
            match label {
                Some(edge) if edge == b => return Some(to),
                None => {
                    for &(label2, to2) in &self.states[to as usize].transitions {
                        if label2 == Some(b) {
                            return Some(to2);
                        }
                    }
                }
                _ => {}
            }
        }
        None
    }

    // ---------- token-specification builders ----------

    /// Extend the trunk with a chain recognizing `word` exactly. A shared
    /// prefix with previously added words is reused rather than duplicated.
    pub fn add_word(&mut self, word: &str, tag: Tag) {
        let bytes = word.as_bytes();
        let mut cur = self.start;
        for (i, &b) in bytes.iter().enumerate() {
            cur = match self.step(cur, b) {
                Some(next) => next,
                None => {
                    let (s, f) = self.atom(b);
                    self.link(cur, None, s);
                    f
                }
            };
            if i == bytes.len() - 1 {
                self.mark_accept(cur, tag);
            }
        }
    }

    /// `[0-9][0-9]*`, accepting as `IntNum`.
    pub fn add_int_literal(&mut self) {
        let first = self.class(b'0'..=b'9');
        let rest = self.class(b'0'..=b'9');
        let rest_star = self.star(rest);
        let chain = self.concat(first, rest_star);
        self.link(self.start, None, chain.0);
        self.mark_accept(chain.1, Tag::IntNum);
    }

    /// `[A-Za-z][A-Za-z0-9_]*`, accepting as `Id`. Must be added after every
    /// literal word: letters that begin a keyword are grafted onto the
    /// keyword branch so that an exact keyword keeps its tag while any longer
    /// continuation falls through to `Id`.
    pub fn add_identifier(&mut self) {
        let tail = self.class(ident_tail_bytes());
        let tail_star = self.star(tail);
        self.mark_accept(tail_star.1, Tag::Id);

        for b in (b'A'..=b'Z').chain(b'a'..=b'z') {
            match self.step(self.start, b) {
                None => self.link(self.start, Some(b), tail_star.0),
                Some(node) => self.graft_identifier_tail(node, tail_star.0),
            }
        }
    }

    /// Walk a keyword branch and attach the identifier continuation at every
    /// node. Interior prefix states become `Id`-accepting; the keyword's own
    /// accept state keeps its tag and only gains the continuation edges.
    fn graft_identifier_tail(&mut self, node: u32, tail_entry: u32) {
        if self.states[node as usize].accept.is_some() {
            for b in ident_tail_bytes() {
                self.link(node, Some(b), tail_entry);
            }
            return;
        }
        self.mark_accept(node, Tag::Id);

        for b in ident_tail_bytes().filter(|b| !b.is_ascii_lowercase()) {
            self.link(node, Some(b), tail_entry);
        }
        // lowercase letters may continue a longer keyword
        for b in b'a'..=b'z' {
            match self.step(node, b) {
                None => self.link(node, Some(b), tail_entry),
                Some(next) => self.graft_identifier_tail(next, tail_entry),
            }
        }
    }

    /// States reachable from `state` through epsilon edges alone, including
    /// `state` itself.
    pub fn epsilon_closure(&self, state: u32) -> BTreeSet<u32> {
        let mut closure = BTreeSet::new();
        let mut pending = vec![state];
        while let Some(s) = pending.pop() {
            if !closure.insert(s) {
                continue;
            }
            for &(label, to) in &self.states[s as usize].transitions {
                if label.is_none() {
                    pending.push(to);
                }
            }
        }
        closure
    }
}
