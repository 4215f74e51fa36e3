// src/parser/states.rs
// LR(1) item sets and the state table built from them.

use std::collections::{BTreeMap, BTreeSet};

use hashbrown::HashMap;

use super::grammar::Grammar;
use crate::tokens::Tag;

/// A production with a dot position and a lookahead set. Two items are equal
/// only when every component matches; items differing in lookaheads alone
/// are core-equivalent and get merged inside an item set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Item {
    pub prod: usize,
    pub dot: usize,
    pub lookaheads: BTreeSet<Tag>,
}

impl Item {
    #[inline]
    pub fn core(&self) -> (usize, usize) {
        (self.prod, self.dot)
    }

    pub fn is_end(&self, grammar: &Grammar) -> bool {
        self.dot >= grammar.prods[self.prod].rhs.len()
    }

    pub fn next_symbol(&self, grammar: &Grammar) -> Option<Tag> {
        grammar.prods[self.prod].rhs.get(self.dot).copied()
    }

    fn advanced(&self) -> Item {
        Item {
            prod: self.prod,
            dot: self.dot + 1,
            lookaheads: self.lookaheads.clone(),
        }
    }
}

/// One LR(1) state: the kernel it was reached by, its closure, and the
/// outgoing transitions keyed by tag.
#[derive(Debug)]
pub struct ItemSet {
    pub kernel: Vec<Item>,
    pub closure: Vec<Item>,
    pub transitions: HashMap<Tag, u32>,
}

impl ItemSet {
    #[inline]
    pub fn goto(&self, tag: Tag) -> Option<u32> {
        self.transitions.get(&tag).copied()
    }

    /// First closure item with the dot at the end whose lookaheads hold
    /// `tag`, if any.
    pub fn reduction_on(&self, grammar: &Grammar, tag: Tag) -> Option<&Item> {
        self.closure
            .iter()
            .find(|it| it.is_end(grammar) && it.lookaheads.contains(&tag))
    }

    /// FOLLOW of `target` in the context of this item set: the lookaheads of
    /// an item deriving `target` if one exists, otherwise assembled from
    /// FIRST of whatever can follow `target` inside this set's items.
    pub fn follow(&self, grammar: &Grammar, target: Tag, visited: &mut BTreeSet<Tag>) -> BTreeSet<Tag> {
        let mut out = BTreeSet::new();
        if target == grammar.start {
            out.insert(Tag::ScanEof);
        }
        for it in &self.closure {
            if grammar.prods[it.prod].lhs == target && !it.lookaheads.is_empty() {
                out.extend(it.lookaheads.iter().copied());
                return out;
            }
        }
        for it in &self.closure {
            let rhs = &grammar.prods[it.prod].rhs;
            for (i, &sym) in rhs.iter().enumerate() {
                if sym != target {
                    continue;
                }
                if i + 1 == rhs.len() {
                    let lhs = grammar.prods[it.prod].lhs;
                    if lhs != target && visited.insert(lhs) {
                        let f = self.follow(grammar, lhs, visited);
                        out.extend(f);
                    }
                } else {
                    let next = rhs[i + 1];
                    let f = grammar.first(next);
                    if f.contains(&Tag::Lambda) {
                        out.extend(f.into_iter().filter(|t| *t != Tag::Lambda));
                        if visited.insert(next) {
                            let more = self.follow(grammar, next, visited);
                            out.extend(more);
                        }
                    } else {
                        out.extend(f);
                    }
                }
            }
        }
        out
    }
}

/// The constructed parser: grammar plus every LR(1) state. State 0 is the
/// synthetic start state.
#[derive(Debug)]
pub struct StateTable {
    pub grammar: Grammar,
    pub states: Vec<ItemSet>,
}

impl StateTable {
    pub fn construct(grammar: Grammar) -> Self {
        let start_prod = grammar
            .prods
            .iter()
            .find(|p| p.lhs == grammar.start)
            .expect("grammar has a start production")
            .index;
        let start_item = Item {
            prod: start_prod,
            dot: 0,
            lookaheads: BTreeSet::from([Tag::ScanEof]),
        };

        let mut table = StateTable {
            grammar,
            states: Vec::new(),
        };
        table.add_or_query(vec![start_item]);

        let mut i = 0;
        while i < table.states.len() {
            // Dot-advanced kernels grouped by the symbol after the dot;
            // BTreeMap keeps successor numbering deterministic.
            let mut advanced: BTreeMap<Tag, Vec<Item>> = BTreeMap::new();
            for item in &table.states[i].closure {
                if let Some(sym) = item.next_symbol(&table.grammar) {
                    merge_into(advanced.entry(sym).or_default(), item.advanced());
                }
            }
            for (sym, kernel) in advanced {
                let succ = table.add_or_query(kernel);
                table.states[i].transitions.insert(sym, succ);
            }
            i += 1;
        }

        log::debug!(
            "[parser] {} lr(1) states from {} productions",
            table.states.len(),
            table.grammar.prods.len()
        );
        table
    }

    /// Reuse an existing state for `kernel` when the kernel sits inside the
    /// state's closure and the state's own kernel sits inside it — the same
    /// LR(1) configuration modulo closure expansion. Otherwise allocate.
    fn add_or_query(&mut self, kernel: Vec<Item>) -> u32 {
        for (i, st) in self.states.iter().enumerate() {
            if is_subset(&kernel, &st.closure) && is_subset(&st.kernel, &kernel) {
                return i as u32;
            }
        }
        let closure = close(&self.grammar, &kernel);
        self.states.push(ItemSet {
            kernel,
            closure,
            transitions: HashMap::new(),
        });
        (self.states.len() - 1) as u32
    }
}

fn is_subset(a: &[Item], b: &[Item]) -> bool {
    a.iter().all(|it| b.contains(it))
}

/// Add `item` to a kernel under construction, merging lookaheads on a core
/// collision.
fn merge_into(kernel: &mut Vec<Item>, item: Item) {
    for existing in kernel.iter_mut() {
        if existing.core() == item.core() {
            existing.lookaheads.extend(item.lookaheads);
            return;
        }
    }
    kernel.push(item);
}

/// Item-set closure: for every `A -> α · B β, L`, add `B -> · γ` with
/// lookaheads FIRST(β), plus L when β derives lambda (or is empty).
/// Core-equivalent items merge; iterate until a full pass changes nothing.
fn close(grammar: &Grammar, kernel: &[Item]) -> Vec<Item> {
    let mut items: Vec<Item> = Vec::new();
    for it in kernel {
        merge_into(&mut items, it.clone());
    }

    let mut changed = true;
    while changed {
        changed = false;
        let mut idx = 0;
        while idx < items.len() {
            let item = items[idx].clone();
            if let Some(sym) = item.next_symbol(grammar) {
                if !sym.is_terminal() {
                    let beta = &grammar.prods[item.prod].rhs[item.dot + 1..];
                    let (mut la, passthrough) = grammar.first_of_seq(beta);
                    if passthrough {
                        la.extend(item.lookaheads.iter().copied());
                    }
                    let expansions: Vec<usize> =
                        grammar.prods_of(sym).map(|p| p.index).collect();
                    for prod in expansions {
                        changed |= merge_closure_item(&mut items, prod, &la);
                    }
                }
            }
            idx += 1;
        }
    }
    items
}

fn merge_closure_item(items: &mut Vec<Item>, prod: usize, la: &BTreeSet<Tag>) -> bool {
    for it in items.iter_mut() {
        if it.prod == prod && it.dot == 0 {
            let before = it.lookaheads.len();
            it.lookaheads.extend(la.iter().copied());
            return it.lookaheads.len() != before;
        }
    }
    items.push(Item {
        prod,
        dot: 0,
        lookaheads: la.clone(),
    });
    true
}
