// src/lexer/dfa.rs
// Canonical subset construction over the token NFA, and the byte-keyed
// automaton the scan driver runs.

use std::collections::{BTreeMap, BTreeSet};

use hashbrown::HashMap;

use super::nfa::Nfa;
use crate::tokens::Tag;

#[derive(Debug)]
pub struct DfaState {
    /// The NFA states this DFA state stands for (kept for introspection and
    /// for the accept-priority rule).
    pub members: BTreeSet<u32>,
    pub transitions: HashMap<u8, u32>,
    pub accept: Option<Tag>,
}

#[derive(Debug)]
pub struct Dfa {
    pub states: Vec<DfaState>,
    pub start: u32,
}

impl Dfa {
    /// Subset construction: the start state is the ε-closure of the NFA
    /// start; each distinct closure-of-targets subset reached on some byte is
    /// interned as one DFA state.
    pub fn from_nfa(nfa: &Nfa) -> Self {
        let closures: Vec<BTreeSet<u32>> = (0..nfa.states.len() as u32)
            .map(|s| nfa.epsilon_closure(s))
            .collect();

        // Intern subsets to stable state ids.
        let mut interned: HashMap<Vec<u32>, u32> = HashMap::new();
        let mut states: Vec<DfaState> = Vec::new();

        let intern =
            |set: BTreeSet<u32>, states: &mut Vec<DfaState>, interned: &mut HashMap<Vec<u32>, u32>| {
                let key: Vec<u32> = set.iter().copied().collect();
                if let Some(&id) = interned.get(&key) {
                    return (id, false);
                }
                let id = states.len() as u32;
                interned.insert(key, id);
                states.push(DfaState {
                    accept: accept_of(nfa, &set),
                    members: set,
                    transitions: HashMap::new(),
                });
                (id, true)
            };

        let start_set = closures[nfa.start as usize].clone();
        let (start, _) = intern(start_set, &mut states, &mut interned);

        let mut pending = vec![start];
        while let Some(id) = pending.pop() {
            // Group single-step byte targets of all members, then close.
            let mut targets: BTreeMap<u8, BTreeSet<u32>> = BTreeMap::new();
            for &m in &states[id as usize].members {
                for &(label, to) in &nfa.states[m as usize].transitions {
                    if let Some(b) = label {
                        targets.entry(b).or_default().insert(to);
                    }
                }
            }
            for (b, set) in targets {
                let mut closed = BTreeSet::new();
                for t in set {
                    closed.extend(closures[t as usize].iter().copied());
                }
                let (succ, fresh) = intern(closed, &mut states, &mut interned);
                states[id as usize].transitions.insert(b, succ);
                if fresh {
                    pending.push(succ);
                }
            }
        }

        Dfa { states, start }
    }

    #[inline]
    pub fn step(&self, state: u32, b: u8) -> Option<u32> {
        self.states[state as usize].transitions.get(&b).copied()
    }

    #[inline]
    pub fn accept_of(&self, state: u32) -> Option<Tag> {
        self.states[state as usize].accept
    }
}

/// Accepting tag of a subset: the lowest-numbered accepting member wins.
/// Keyword chains are registered before the identifier machinery, so an
/// exact keyword outranks `Id`.
fn accept_of(nfa: &Nfa, members: &BTreeSet<u32>) -> Option<Tag> {
    members
        .iter()
        .find_map(|&m| nfa.states[m as usize].accept)
}
