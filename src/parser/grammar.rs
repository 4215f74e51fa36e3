// src/parser/grammar.rs
// Production rules of the C subset, plus the derives-lambda and FIRST
// machinery the item-set construction feeds on.

use std::collections::BTreeSet;

use hashbrown::HashMap;

use crate::tokens::Tag;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Production {
    pub lhs: Tag,
    pub rhs: Vec<Tag>,
    /// Stable registration index.
    pub index: usize,
    /// Names the emit routine run when this rule is reduced; the only
    /// contract between the parser and the code generator.
    pub descriptor: &'static str,
}

#[derive(Debug)]
pub struct Grammar {
    pub prods: Vec<Production>,
    pub start: Tag,
    derives_lambda: HashMap<Tag, bool>,
}

impl Grammar {
    pub fn new(start: Tag) -> Self {
        Self {
            prods: Vec::new(),
            start,
            derives_lambda: HashMap::new(),
        }
    }

    pub fn rule(&mut self, lhs: Tag, rhs: &[Tag], descriptor: &'static str) {
        let index = self.prods.len();
        self.prods.push(Production {
            lhs,
            rhs: rhs.to_vec(),
            index,
            descriptor,
        });
    }

    /// Fixed point over all rules: a nonterminal derives lambda iff some
    /// production's RHS is empty or consists only of lambda-deriving
    /// nonterminals. Call once after the last `rule`.
    pub fn seal(&mut self) {
        let mut vocabulary: BTreeSet<Tag> = BTreeSet::new();
        for p in &self.prods {
            vocabulary.insert(p.lhs);
            vocabulary.extend(p.rhs.iter().copied());
        }
        for tag in vocabulary {
            self.derives_lambda.insert(tag, false);
        }

        let mut change = true;
        while change {
            change = false;
            for i in 0..self.prods.len() {
                let lhs = self.prods[i].lhs;
                if self.derives_lambda[&lhs] {
                    continue;
                }
                let all = self.prods[i]
                    .rhs
                    .iter()
                    .all(|t| *self.derives_lambda.get(t).unwrap_or(&false));
                if all {
                    self.derives_lambda.insert(lhs, true);
                    change = true;
                }
            }
        }
    }

    pub fn derives_lambda(&self, tag: Tag) -> bool {
        *self.derives_lambda.get(&tag).unwrap_or(&false)
    }

    pub fn prods_of(&self, lhs: Tag) -> impl Iterator<Item = &Production> {
        self.prods.iter().filter(move |p| p.lhs == lhs)
    }

    /// FIRST of a single tag. Self-recursion is broken by skipping
    /// productions whose leading RHS symbol is the tag itself.
    pub fn first(&self, x: Tag) -> BTreeSet<Tag> {
        let mut out = BTreeSet::new();
        if self.derives_lambda(x) {
            out.insert(Tag::Lambda);
        }
        if x.is_terminal() {
            out.insert(x);
            return out;
        }
        for p in self.prods_of(x) {
            if p.rhs.first() == Some(&x) {
                continue;
            }
            for &y in &p.rhs {
                let f = self.first(y);
                let has_lambda = f.contains(&Tag::Lambda);
                out.extend(f.into_iter().filter(|t| *t != Tag::Lambda));
                if !has_lambda {
                    break;
                }
            }
        }
        debug_assert!(out.iter().all(|t| t.is_terminal()), "FIRST({x:?}) = {out:?}");
        out
    }

    /// FIRST of a sentential tail, lambda stripped. The flag is true when
    /// every symbol (or an empty tail) derives lambda, i.e. the caller's
    /// inherited lookaheads pass through.
    pub fn first_of_seq(&self, seq: &[Tag]) -> (BTreeSet<Tag>, bool) {
        let mut out = BTreeSet::new();
        for &y in seq {
            let f = self.first(y);
            let has_lambda = f.contains(&Tag::Lambda);
            out.extend(f.into_iter().filter(|t| *t != Tag::Lambda));
            if !has_lambda {
                return (out, false);
            }
        }
        (out, true)
    }

    /// The hard-coded grammar of the accepted language.
    pub fn c_subset() -> Grammar {
        use Tag::*;
        let mut g = Grammar::new(SystemGoal);

        g.rule(Program, &[VarDeclarations, Statements], "program");
        g.rule(Program, &[Statements], "program");

        g.rule(VarDeclarations, &[VarDeclaration], "pass");
        g.rule(VarDeclarations, &[VarDeclarations, VarDeclaration], "merge");
        g.rule(VarDeclaration, &[Int, DeclarationList, Semi], "merge");

        g.rule(DeclarationList, &[Declaration], "pass");
        g.rule(DeclarationList, &[DeclarationList, Comma, Declaration], "merge");
        g.rule(Declaration, &[Id], "id_decl");
        g.rule(Declaration, &[Id, Assign, IntNum], "id_decl_init");
        g.rule(Declaration, &[Id, LSquare, IntNum, RSquare], "id_decl_array");

        g.rule(CodeBlock, &[Statement], "pass");
        g.rule(CodeBlock, &[LBrace, Statements, RBrace], "block");

        g.rule(Statements, &[Statement], "pass");
        g.rule(Statements, &[Statements, Statement], "merge");

        g.rule(Statement, &[AssignStatement, Semi], "merge");
        g.rule(Statement, &[ControlStatement], "pass");
        g.rule(Statement, &[ReadWriteStatement, Semi], "merge");
        g.rule(Statement, &[Semi], "merge");

        g.rule(ControlStatement, &[IfStatement], "pass");
        g.rule(ControlStatement, &[WhileStatement], "pass");
        g.rule(ControlStatement, &[DoWhileStatement, Semi], "merge");
        g.rule(ControlStatement, &[ReturnStatement, Semi], "merge");

        g.rule(ReadWriteStatement, &[ReadStatement], "pass");
        g.rule(ReadWriteStatement, &[WriteStatement], "pass");

        g.rule(
            AssignStatement,
            &[Id, LSquare, Exp, RSquare, Assign, Exp],
            "assign_array",
        );
        g.rule(AssignStatement, &[Id, Assign, Exp], "assign");

        g.rule(IfStatement, &[IfStmt], "pass");
        g.rule(IfStatement, &[IfStmt, Else, CodeBlock], "if_else");
        g.rule(IfStmt, &[If, LPar, Exp, RPar, CodeBlock], "if");

        g.rule(WhileStatement, &[While, LPar, Exp, RPar, CodeBlock], "while");
        g.rule(
            DoWhileStatement,
            &[Do, CodeBlock, While, LPar, Exp, RPar],
            "do_while",
        );
        g.rule(ReturnStatement, &[Return], "return");
        g.rule(ReadStatement, &[Read, LPar, Id, RPar], "read");
        g.rule(WriteStatement, &[Write, LPar, Exp, RPar], "write");

        g.rule(Exp, &[IntNum], "exp_int");
        g.rule(Exp, &[Id], "exp_id");
        g.rule(Exp, &[Id, LSquare, Exp, RSquare], "id_idx");
        g.rule(Exp, &[NotOp, Exp], "not_exp");
        g.rule(Exp, &[Exp, Plus, Exp], "plus");
        g.rule(Exp, &[Exp, Minus, Exp], "minus");
        g.rule(Exp, &[Exp, MulOp, Exp], "mul");
        g.rule(Exp, &[Exp, DivOp, Exp], "div");
        g.rule(Exp, &[Exp, ShlOp, Exp], "shl");
        g.rule(Exp, &[Exp, ShrOp, Exp], "shr");
        g.rule(Exp, &[Exp, AndOp, Exp], "bit_and");
        g.rule(Exp, &[Exp, OrOp, Exp], "bit_or");
        g.rule(Exp, &[Exp, AndAnd, Exp], "and_and");
        g.rule(Exp, &[Exp, OrOr, Exp], "or_or");
        g.rule(Exp, &[Exp, Eq, Exp], "eq");
        g.rule(Exp, &[Exp, NotEq, Exp], "noteq");
        g.rule(Exp, &[Exp, Lt, Exp], "lt");
        g.rule(Exp, &[Exp, Gt, Exp], "gt");
        g.rule(Exp, &[Exp, LtEq, Exp], "lteq");
        g.rule(Exp, &[Exp, GtEq, Exp], "gteq");
        g.rule(Exp, &[LPar, Exp, RPar], "parexp");
        g.rule(Exp, &[Minus, Exp], "minusexp");
        g.rule(Exp, &[Plus, Exp], "plusexp");

        g.rule(SystemGoal, &[Program, ScanEof], "accept");

        g.seal();
        g
    }
}

/// Operator binding strength, after the C operator table. Tokens that are
/// not operators rank 0, which is also what resolves the dangling-else
/// conflict toward shift.
pub fn precedence(tag: Tag) -> i32 {
    use Tag::*;
    match tag {
        NotOp => 14,
        MulOp | DivOp => 12,
        Plus | Minus => 11,
        ShlOp | ShrOp => 10,
        Lt | Gt | LtEq | GtEq => 8,
        Eq | NotEq => 7,
        AndOp => 6,
        OrOp => 4,
        AndAnd => 3,
        OrOr => 2,
        _ => 0,
    }
}

#[inline]
pub fn is_operator(tag: Tag) -> bool {
    precedence(tag) > 0
}
