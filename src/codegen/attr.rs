// src/codegen/attr.rs
// Semantic attribute propagated up the parse stack.

/// Which fields of an attribute mean anything.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    /// Raw lexeme as delivered by the scanner.
    Terminal(String),
    /// A named variable; its slot comes from the symbol table at use time.
    Id(String),
    /// A compile-time integer.
    Literal(i32),
    /// A computed value spilled to the stack slot at this offset from `$sp`.
    Expression(i32),
    /// A statement; only the accumulated instructions matter.
    Stmt,
}

/// An attribute is a value plus the instructions accumulated for the
/// subtree below it, in source order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attr {
    pub value: Value,
    pub code: Vec<String>,
}

impl Attr {
    pub fn terminal(text: &str) -> Self {
        Attr {
            value: Value::Terminal(text.to_string()),
            code: Vec::new(),
        }
    }

    pub fn stmt() -> Self {
        Attr {
            value: Value::Stmt,
            code: Vec::new(),
        }
    }

    /// Lexeme of a terminal attribute. Only the emitter calls this, and only
    /// on RHS positions the grammar guarantees to be terminals.
    pub fn text(&self) -> &str {
        match &self.value {
            Value::Terminal(s) => s,
            other => unreachable!("terminal attribute expected, found {other:?}"),
        }
    }

    /// Append one tab-indented instruction.
    pub fn push_op(&mut self, instr: String) {
        self.code.push(format!("\t{instr}"));
    }

    /// Place a label definition, flush-left.
    pub fn push_label(&mut self, n: u32) {
        self.code.push(format!("label{n}:"));
    }

    /// Append another attribute's instructions after this one's.
    pub fn absorb(&mut self, other: Attr) {
        self.code.extend(other.code);
    }
}
