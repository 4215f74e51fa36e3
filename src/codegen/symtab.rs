// src/codegen/symtab.rs
// Scoped symbol table handing out word-sized stack slots at negative
// offsets from $sp.

use hashbrown::HashMap;

pub const WORD: i32 = 4;

pub struct SymbolTable {
    /// Innermost frame last. The global frame at the bottom is never popped.
    frames: Vec<HashMap<String, i32>>,
    /// Next slot to hand out; decreases by `WORD`, never reused.
    next_offset: i32,
}

impl Default for SymbolTable {
    fn default() -> Self {
        Self::new()
    }
}

impl SymbolTable {
    pub fn new() -> Self {
        Self {
            frames: vec![HashMap::new()],
            next_offset: -WORD,
        }
    }

    pub fn push_scope(&mut self) {
        self.frames.push(HashMap::new());
    }

    pub fn pop_scope(&mut self) {
        if self.frames.len() > 1 {
            self.frames.pop();
        } else {
            log::warn!("[symtab] scope underflow ignored");
        }
    }

    /// A fresh, never-reused slot.
    pub fn fresh_slot(&mut self) -> i32 {
        let slot = self.next_offset;
        self.next_offset -= WORD;
        slot
    }

    /// Bind `name` in the innermost frame.
    pub fn insert(&mut self, name: &str, offset: i32) {
        self.frames
            .last_mut()
            .expect("global frame always present")
            .insert(name.to_string(), offset);
    }

    /// Innermost-outward lookup. A miss allocates a fresh slot in the
    /// innermost frame: implicitly-declared names become addressable, which
    /// keeps otherwise-broken inputs compiling.
    pub fn lookup(&mut self, name: &str) -> i32 {
        for frame in self.frames.iter().rev() {
            if let Some(&offset) = frame.get(name) {
                return offset;
            }
        }
        let offset = self.fresh_slot();
        log::warn!("[symtab] implicit declaration of {name:?} at {offset}($sp)");
        self.insert(name, offset);
        offset
    }
}
