// src/parser/driver.rs
// Shift-reduce loop with the operator-stack precedence arbitration.

use crate::codegen::Attr;
use crate::tokens::{Tag, Token};

use super::grammar::{is_operator, precedence, Production};
use super::states::StateTable;

/// The parser's view of the reduction consumer. `reduce` receives the rule
/// and the popped RHS attributes in source order and returns the synthesized
/// LHS attribute; the scope hooks fire when braces are shifted.
pub trait Semantics {
    fn reduce(&mut self, rule: &Production, children: Vec<Attr>) -> Attr;
    fn scope_begin(&mut self) {}
    fn scope_end(&mut self) {}
}

/// Render the symbol stack for the trace, with a bar at `pos`.
fn render_stack(syms: &[Tag], pos: usize) -> String {
    let mut s = String::new();
    for (i, tag) in syms.iter().enumerate() {
        if i == pos {
            s.push_str("| ");
        }
        s.push_str(&format!("{tag:?} "));
    }
    if pos == syms.len() {
        s.push_str("| ");
    }
    s
}

/// Drive the token stream to acceptance or error. The stream is expected to
/// end with `ScanEof`; reading past the end keeps yielding it.
pub fn parse<S: Semantics>(
    table: &StateTable,
    tokens: &[Token],
    sem: &mut S,
) -> Result<(), String> {
    let mut state_stack: Vec<u32> = vec![0];
    let mut attr_stack: Vec<Attr> = Vec::new();
    let mut op_stack: Vec<Tag> = Vec::new();
    let mut syms: Vec<Tag> = Vec::new();
    let mut pos = 0usize;

    loop {
        let next = tokens
            .get(pos)
            .cloned()
            .unwrap_or_else(|| Token::new(Tag::ScanEof, ""));
        let state = *state_stack.last().expect("state 0 is never popped");
        let cur = &table.states[state as usize];

        log::debug!("state: {state}\tnext: {:?}", next.tag);

        let can_shift = cur.goto(next.tag).is_some();
        let reduction = cur.reduction_on(&table.grammar, next.tag);

        let mut do_reduce = reduction.is_some();
        if can_shift && do_reduce {
            // Shift-reduce conflict, intentional in the expression grammar.
            if op_stack.is_empty() {
                do_reduce = false;
            } else if precedence(next.tag) > precedence(*op_stack.last().expect("non-empty")) {
                do_reduce = false;
            }
            // ties reduce: left associativity
        }
        if !can_shift && !do_reduce {
            log::debug!("error");
            return Err(format!(
                "parse error at {:?} ({:?}) in state {state}",
                next.text, next.tag
            ));
        }

        if do_reduce {
            let item = reduction.expect("reduction candidate").clone();
            let rule = &table.grammar.prods[item.prod];
            if rule.lhs == Tag::SystemGoal {
                log::debug!("accept");
                return Ok(());
            }
            log::debug!(
                "reduce by grammar {}: {:?} -> {:?}",
                rule.index + 1,
                rule.lhs,
                rule.rhs
            );

            for &tag in &rule.rhs {
                if is_operator(tag) {
                    op_stack.pop();
                }
            }
            let n = rule.rhs.len();
            let children = attr_stack.split_off(attr_stack.len() - n);
            state_stack.truncate(state_stack.len() - n);
            syms.truncate(syms.len() - n);

            let from = *state_stack.last().expect("state 0 is never popped");
            let goto = table.states[from as usize].goto(rule.lhs).ok_or_else(|| {
                format!("no goto on {:?} from state {from}", rule.lhs)
            })?;
            let attr = sem.reduce(rule, children);
            state_stack.push(goto);
            attr_stack.push(attr);
            syms.push(rule.lhs);
            log::trace!("{}", render_stack(&syms, syms.len() - 1));
            continue;
        }

        // shift
        if is_operator(next.tag) {
            op_stack.push(next.tag);
        }
        match next.tag {
            Tag::LBrace => sem.scope_begin(),
            Tag::RBrace => sem.scope_end(),
            _ => {}
        }
        let target = cur.goto(next.tag).expect("checked can_shift");
        log::debug!("shift to state {target}");
        state_stack.push(target);
        attr_stack.push(Attr::terminal(&next.text));
        syms.push(next.tag);
        log::trace!("{}", render_stack(&syms, syms.len()));
        pos += 1;
    }
}
