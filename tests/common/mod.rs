// tests/common/mod.rs
// A small interpreter for the emitted MIPS subset, used as an execution
// oracle: compile a source snippet, run the listing, and observe registers,
// stack slots, and console output.

use std::collections::{HashMap, VecDeque};
use std::sync::OnceLock;

use simplc::codegen::CodeGen;
use simplc::lexer::Scanner;
use simplc::parser::{grammar::Grammar, parse, states::StateTable};

pub struct Machine {
    regs: HashMap<String, i64>,
    mem: HashMap<i64, i64>,
    pub output: String,
}

impl Machine {
    fn new() -> Self {
        Machine {
            regs: HashMap::new(),
            mem: HashMap::new(),
            output: String::new(),
        }
    }

    fn get(&self, reg: &str) -> i64 {
        if reg == "$zero" {
            return 0;
        }
        *self.regs.get(reg).unwrap_or(&0)
    }

    fn set(&mut self, reg: &str, value: i64) {
        if reg != "$zero" {
            self.regs.insert(reg.to_string(), value);
        }
    }

    /// Word at a byte address; $sp is 0, so slots sit at negative addresses.
    pub fn word(&self, addr: i64) -> i64 {
        *self.mem.get(&addr).unwrap_or(&0)
    }
}

static TABLE: OnceLock<StateTable> = OnceLock::new();

/// Compile and return the listing lines. The LR(1) table is shared across
/// the whole test binary; the pipeline is otherwise the library's.
pub fn compile(source: &str) -> Vec<String> {
    let table = TABLE.get_or_init(|| StateTable::construct(Grammar::c_subset()));
    let tokens = Scanner::new().scan(source);
    let mut gen = CodeGen::new();
    parse(table, &tokens, &mut gen).expect("source should compile");
    gen.listing().to_vec()
}

/// "-16($sp)" -> (-16, "$sp")
fn mem_operand(s: &str) -> (i64, String) {
    let open = s.find('(').expect("memory operand");
    let off = s[..open].parse().expect("offset");
    let base = s[open + 1..s.len() - 1].to_string();
    (off, base)
}

pub fn run(listing: &[String], input: &[i64]) -> Machine {
    let mut labels: HashMap<String, usize> = HashMap::new();
    for (i, line) in listing.iter().enumerate() {
        if let Some(name) = line.trim().strip_suffix(':') {
            labels.insert(name.to_string(), i);
        }
    }

    let mut m = Machine::new();
    let mut input: VecDeque<i64> = input.iter().copied().collect();
    let mut pc = 0usize;
    let mut steps = 0u64;

    while pc < listing.len() {
        steps += 1;
        assert!(steps < 1_000_000, "runaway program");

        let line = listing[pc].trim().to_string();
        pc += 1;
        if line.is_empty() || line.ends_with(':') {
            continue;
        }
        let cleaned = line.replace(',', " ");
        let p: Vec<&str> = cleaned.split_whitespace().collect();

        match p[0] {
            "li" => {
                let v = p[2].parse().expect("immediate");
                m.set(p[1], v);
            }
            "lw" => {
                let (off, base) = mem_operand(p[2]);
                let v = m.word(m.get(&base) + off);
                m.set(p[1], v);
            }
            "sw" => {
                let (off, base) = mem_operand(p[2]);
                let addr = m.get(&base) + off;
                let v = m.get(p[1]);
                m.mem.insert(addr, v);
            }
            "add" => {
                let v = m.get(p[2]) + m.get(p[3]);
                m.set(p[1], v);
            }
            "sub" => {
                let v = m.get(p[2]) - m.get(p[3]);
                m.set(p[1], v);
            }
            "mul" => {
                let v = m.get(p[2]) * m.get(p[3]);
                m.set(p[1], v);
            }
            "div" => {
                let v = m.get(p[2]) / m.get(p[3]);
                m.set(p[1], v);
            }
            "and" => {
                let v = m.get(p[2]) & m.get(p[3]);
                m.set(p[1], v);
            }
            "or" => {
                let v = m.get(p[2]) | m.get(p[3]);
                m.set(p[1], v);
            }
            "slt" => {
                let v = i64::from(m.get(p[2]) < m.get(p[3]));
                m.set(p[1], v);
            }
            "sllv" => {
                let v = m.get(p[2]) << (m.get(p[3]) & 31);
                m.set(p[1], v);
            }
            "srav" => {
                let v = m.get(p[2]) >> (m.get(p[3]) & 31);
                m.set(p[1], v);
            }
            "sll" => {
                let sh: u32 = p[3].parse().expect("shift amount");
                let v = m.get(p[2]) << sh;
                m.set(p[1], v);
            }
            "addi" | "addiu" => {
                let imm: i64 = p[3].parse().expect("immediate");
                let v = m.get(p[2]) + imm;
                m.set(p[1], v);
            }
            "sltiu" => {
                let imm: u64 = p[3].parse().expect("immediate");
                let v = i64::from(((m.get(p[2]) as u32) as u64) < imm);
                m.set(p[1], v);
            }
            "xori" => {
                let imm: i64 = p[3].parse().expect("immediate");
                let v = m.get(p[2]) ^ imm;
                m.set(p[1], v);
            }
            "beq" => {
                if m.get(p[1]) == m.get(p[2]) {
                    pc = *labels.get(p[3]).expect("branch target");
                }
            }
            "b" => {
                pc = *labels.get(p[1]).expect("branch target");
            }
            "nop" => {}
            "syscall" => match m.get("$v0") {
                1 => {
                    let v = m.get("$a0");
                    m.output.push_str(&v.to_string());
                }
                5 => {
                    let v = input.pop_front().expect("read past end of input");
                    m.set("$v0", v);
                }
                11 => {
                    let v = m.get("$a0");
                    m.output.push((v as u8) as char);
                }
                other => panic!("unsupported syscall {other}"),
            },
            other => panic!("unhandled instruction {other:?} in {line:?}"),
        }
    }
    m
}

/// Compile then run in one go.
pub fn exec(source: &str, input: &[i64]) -> Machine {
    let listing = compile(source);
    run(&listing, input)
}
