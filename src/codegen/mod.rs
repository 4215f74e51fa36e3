// src/codegen/mod.rs
// Reduction-driven emission of MIPS-style assembly. Every subexpression is
// materialized through $t0-$t2 and spilled to a fresh stack slot; labels are
// numbered from a monotonic counter.

pub mod attr;
pub mod symtab;

pub use attr::{Attr, Value};
pub use symtab::SymbolTable;

use crate::parser::driver::Semantics;
use crate::parser::grammar::Production;

pub struct CodeGen {
    symbols: SymbolTable,
    next_label: u32,
    listing: Vec<String>,
}

impl Default for CodeGen {
    fn default() -> Self {
        Self::new()
    }
}

impl CodeGen {
    pub fn new() -> Self {
        Self {
            symbols: SymbolTable::new(),
            next_label: 0,
            listing: Vec::new(),
        }
    }

    /// The finished program listing; empty until the program rule reduces.
    pub fn listing(&self) -> &[String] {
        &self.listing
    }

    fn label(&mut self) -> u32 {
        let n = self.next_label;
        self.next_label += 1;
        n
    }

    /// Materialize an expression-position value into `reg`.
    fn load(&mut self, out: &mut Attr, value: &Value, reg: &str) {
        match value {
            Value::Literal(k) => out.push_op(format!("li {reg}, {k}")),
            Value::Id(name) => {
                let offset = self.symbols.lookup(name);
                out.push_op(format!("lw {reg}, {offset}($sp)"));
            }
            Value::Expression(slot) => out.push_op(format!("lw {reg}, {slot}($sp)")),
            other => unreachable!("expression operand expected, found {other:?}"),
        }
    }

    /// Spill $t0 to a fresh slot and return the slot.
    fn spill(&mut self, out: &mut Attr) -> i32 {
        let slot = self.symbols.fresh_slot();
        out.push_op(format!("sw $t0, {slot}($sp)"));
        slot
    }

    /// Base address offset of array `name`: the slot of its element 0.
    fn array_base(&mut self, name: &str) -> i32 {
        self.symbols.lookup(&format!("{name}[0]"))
    }

    /// Point $t2 at element `$t1` (already word-scaled) of `name`. Slots
    /// grow downward, so the element address is base minus the scaled index.
    fn index_address(&mut self, out: &mut Attr, name: &str) {
        let base = self.array_base(name);
        out.push_op("sll $t1, $t1, 2".to_string());
        out.push_op(format!("addiu $t2, $sp, {base}"));
        out.push_op("sub $t2, $t2, $t1".to_string());
    }

    /// `L op R`: operands in $t1/$t2, result in $t0, spilled.
    fn binary(&mut self, descriptor: &str, mut children: Vec<Attr>) -> Attr {
        let rhs = children.pop().expect("binary rhs");
        children.pop(); // operator terminal
        let lhs = children.pop().expect("binary lhs");

        let mut out = Attr::stmt();
        out.code = lhs.code;
        out.code.extend(rhs.code);
        self.load(&mut out, &lhs.value, "$t1");
        self.load(&mut out, &rhs.value, "$t2");

        match descriptor {
            "plus" => out.push_op("add $t0, $t1, $t2".to_string()),
            "minus" => out.push_op("sub $t0, $t1, $t2".to_string()),
            "mul" => out.push_op("mul $t0, $t1, $t2".to_string()),
            "div" => out.push_op("div $t0, $t1, $t2".to_string()),
            "shl" => out.push_op("sllv $t0, $t1, $t2".to_string()),
            "shr" => out.push_op("srav $t0, $t1, $t2".to_string()),
            "bit_and" => out.push_op("and $t0, $t1, $t2".to_string()),
            "bit_or" => out.push_op("or $t0, $t1, $t2".to_string()),
            "lt" => out.push_op("slt $t0, $t1, $t2".to_string()),
            "gt" => out.push_op("slt $t0, $t2, $t1".to_string()),
            "lteq" => {
                // l <= r  is  l < r+1
                out.push_op("addi $t2, $t2, 1".to_string());
                out.push_op("slt $t0, $t1, $t2".to_string());
            }
            "gteq" => {
                // l >= r  is  l+1 > r
                out.push_op("addi $t1, $t1, 1".to_string());
                out.push_op("slt $t0, $t2, $t1".to_string());
            }
            "eq" => {
                out.push_op("sub $t0, $t1, $t2".to_string());
                out.push_op("sltiu $t0, $t0, 1".to_string());
            }
            "noteq" => {
                out.push_op("sub $t0, $t1, $t2".to_string());
                out.push_op("sltiu $t0, $t0, 1".to_string());
                out.push_op("xori $t0, $t0, 1".to_string());
            }
            "and_and" => {
                // !(!L | !R), no short circuit
                out.push_op("sltiu $t1, $t1, 1".to_string());
                out.push_op("sltiu $t2, $t2, 1".to_string());
                out.push_op("or $t0, $t1, $t2".to_string());
                out.push_op("xori $t0, $t0, 1".to_string());
            }
            "or_or" => {
                // !(!L & !R)
                out.push_op("sltiu $t1, $t1, 1".to_string());
                out.push_op("sltiu $t2, $t2, 1".to_string());
                out.push_op("and $t0, $t1, $t2".to_string());
                out.push_op("xori $t0, $t0, 1".to_string());
            }
            other => unreachable!("not a binary descriptor: {other}"),
        }

        let slot = self.spill(&mut out);
        out.value = Value::Expression(slot);
        out
    }
}

impl Semantics for CodeGen {
    fn reduce(&mut self, rule: &Production, mut children: Vec<Attr>) -> Attr {
        match rule.descriptor {
            // single child: attribute passes through unchanged
            "pass" => children.into_iter().next().expect("one child"),

            // wrapper productions: instructions concatenate, value is stmt
            "merge" => {
                let mut out = Attr::stmt();
                for child in children {
                    out.absorb(child);
                }
                out
            }

            "block" => {
                let mut out = Attr::stmt();
                out.absorb(children.swap_remove(1));
                out
            }

            // ---------- declarations ----------
            "id_decl" => {
                let name = children[0].text().to_string();
                let slot = self.symbols.fresh_slot();
                self.symbols.insert(&name, slot);
                let mut out = Attr::stmt();
                out.push_op(format!("sw $zero, {slot}($sp)"));
                out.value = Value::Id(name);
                out
            }
            "id_decl_init" => {
                let name = children[0].text().to_string();
                let init = parse_int(children[2].text());
                let slot = self.symbols.fresh_slot();
                self.symbols.insert(&name, slot);
                let mut out = Attr::stmt();
                out.push_op(format!("li $t0, {init}"));
                out.push_op(format!("sw $t0, {slot}($sp)"));
                out.value = Value::Id(name);
                out
            }
            "id_decl_array" => {
                let name = children[0].text().to_string();
                let len = parse_int(children[2].text());
                for i in 0..len {
                    let slot = self.symbols.fresh_slot();
                    self.symbols.insert(&format!("{name}[{i}]"), slot);
                }
                let mut out = Attr::stmt();
                out.value = Value::Id(name);
                out
            }

            // ---------- expressions ----------
            "exp_int" => Attr {
                value: Value::Literal(parse_int(children[0].text())),
                code: Vec::new(),
            },
            "exp_id" => Attr {
                value: Value::Id(children[0].text().to_string()),
                code: Vec::new(),
            },
            "id_idx" => {
                let name = children[0].text().to_string();
                let index = children.swap_remove(2);
                let mut out = Attr::stmt();
                out.code = index.code;
                self.load(&mut out, &index.value, "$t1");
                self.index_address(&mut out, &name);
                out.push_op("lw $t0, 0($t2)".to_string());
                let slot = self.spill(&mut out);
                out.value = Value::Expression(slot);
                out
            }
            "not_exp" => {
                let operand = children.swap_remove(1);
                if let Value::Literal(v) = operand.value {
                    return Attr {
                        value: Value::Literal(i32::from(v == 0)),
                        code: operand.code,
                    };
                }
                let mut out = Attr::stmt();
                out.code = operand.code;
                self.load(&mut out, &operand.value, "$t0");
                out.push_op("sltiu $t0, $t0, 1".to_string());
                let slot = self.spill(&mut out);
                out.value = Value::Expression(slot);
                out
            }
            "minusexp" => {
                let operand = children.swap_remove(1);
                if let Value::Literal(v) = operand.value {
                    return Attr {
                        value: Value::Literal(v.wrapping_neg()),
                        code: operand.code,
                    };
                }
                let mut out = Attr::stmt();
                out.code = operand.code;
                self.load(&mut out, &operand.value, "$t0");
                out.push_op("sub $t0, $zero, $t0".to_string());
                let slot = self.spill(&mut out);
                out.value = Value::Expression(slot);
                out
            }
            "plusexp" | "parexp" => children.swap_remove(1),

            "plus" | "minus" | "mul" | "div" | "shl" | "shr" | "bit_and" | "bit_or"
            | "and_and" | "or_or" | "eq" | "noteq" | "lt" | "gt" | "lteq" | "gteq" => {
                self.binary(rule.descriptor, children)
            }

            // ---------- statements ----------
            "assign" => {
                let exp = children.swap_remove(2);
                let name = children[0].text().to_string();
                let mut out = Attr::stmt();
                out.code = exp.code;
                self.load(&mut out, &exp.value, "$t0");
                let offset = self.symbols.lookup(&name);
                out.push_op(format!("sw $t0, {offset}($sp)"));
                out
            }
            "assign_array" => {
                let rhs = children.swap_remove(5);
                let index = children.swap_remove(2);
                let name = children[0].text().to_string();
                let mut out = Attr::stmt();
                out.code = rhs.code;
                out.code.extend(index.code);
                self.load(&mut out, &rhs.value, "$t0");
                self.load(&mut out, &index.value, "$t1");
                self.index_address(&mut out, &name);
                out.push_op("sw $t0, 0($t2)".to_string());
                out
            }
            "read" => {
                let name = children[2].text().to_string();
                let offset = self.symbols.lookup(&name);
                let mut out = Attr::stmt();
                out.push_op("li $v0, 5".to_string());
                out.push_op("syscall".to_string());
                out.push_op(format!("sw $v0, {offset}($sp)"));
                out
            }
            "write" => {
                let exp = children.swap_remove(2);
                let mut out = Attr::stmt();
                out.code = exp.code;
                self.load(&mut out, &exp.value, "$a0");
                out.push_op("li $v0, 1".to_string());
                out.push_op("syscall".to_string());
                // trailing newline
                out.push_op("li $v0, 11".to_string());
                out.push_op("li $a0, 10".to_string());
                out.push_op("syscall".to_string());
                out
            }
            "return" => {
                let mut out = Attr::stmt();
                out.push_op("b end".to_string());
                out
            }

            // ---------- control flow ----------
            "if" => {
                let block = children.swap_remove(4);
                let cond = children.swap_remove(2);
                let l_then = self.label();
                let l_exit = self.label();
                let mut out = Attr::stmt();
                out.code = cond.code;
                self.load(&mut out, &cond.value, "$t0");
                out.push_op(format!("beq $t0, $zero, label{l_exit}"));
                out.push_op(format!("b label{l_then}"));
                out.push_label(l_then);
                out.absorb(block);
                out.push_label(l_exit);
                out
            }
            "if_else" => {
                let else_block = children.swap_remove(2);
                let mut out = children.swap_remove(0);
                // the plain-if shape ends with its exit label; the else
                // branch slots in just before it
                let exit_label = out.code.pop().expect("if shape ends with a label");
                let l_join = self.label();
                out.push_op(format!("b label{l_join}"));
                out.code.push(exit_label);
                out.absorb(else_block);
                out.push_label(l_join);
                out
            }
            "while" => {
                let block = children.swap_remove(4);
                let cond = children.swap_remove(2);
                let l_top = self.label();
                let l_exit = self.label();
                let mut out = Attr::stmt();
                out.push_label(l_top);
                out.code.extend(cond.code);
                self.load(&mut out, &cond.value, "$t0");
                out.push_op(format!("beq $t0, $zero, label{l_exit}"));
                out.absorb(block);
                out.push_op(format!("b label{l_top}"));
                out.push_label(l_exit);
                out
            }
            "do_while" => {
                let cond = children.swap_remove(4);
                let block = children.swap_remove(1);
                let l_top = self.label();
                let l_exit = self.label();
                let mut out = Attr::stmt();
                out.push_label(l_top);
                out.absorb(block);
                out.code.extend(cond.code);
                self.load(&mut out, &cond.value, "$t0");
                out.push_op(format!("beq $t0, $zero, label{l_exit}"));
                out.push_op(format!("b label{l_top}"));
                out.push_label(l_exit);
                out
            }

            "program" => {
                let mut listing = vec!["main:".to_string()];
                for child in children {
                    listing.extend(child.code);
                }
                listing.push("end:".to_string());
                listing.push("\tnop".to_string());
                self.listing = listing;
                Attr::stmt()
            }

            // system_goal never reduces: the driver accepts first
            other => unreachable!("unknown descriptor {other:?}"),
        }
    }

    fn scope_begin(&mut self) {
        self.symbols.push_scope();
    }

    fn scope_end(&mut self) {
        self.symbols.pop_scope();
    }
}

/// Integer literal text to value; out-of-range literals degrade to 0 with a
/// diagnostic rather than aborting the compile.
fn parse_int(text: &str) -> i32 {
    match text.parse() {
        Ok(v) => v,
        Err(_) => {
            log::warn!("[codegen] integer literal {text:?} out of range, using 0");
            0
        }
    }
}
