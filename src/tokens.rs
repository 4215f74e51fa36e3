// src/tokens.rs

/// Token tags shared by the scanner, the grammar, and the emitter.
///
/// Variant order is significant: everything up to and including `Lambda` is a
/// terminal, and `is_terminal` relies on the derived ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Tag {
    // keywords
    Int,
    Main,
    Void,
    Break,
    Do,
    Else,
    If,
    While,
    Return,
    Read,
    Write,

    // punctuation and operators
    LBrace,
    RBrace,
    LSquare,
    RSquare,
    LPar,
    RPar,
    Semi,
    Comma,
    Plus,
    Minus,
    MulOp,
    DivOp,
    AndOp,
    OrOp,
    NotOp,
    Assign,
    Lt,
    Gt,
    ShlOp,
    ShrOp,
    Eq,
    NotEq,
    LtEq,
    GtEq,
    AndAnd,
    OrOr,

    // literal families
    IntNum,
    Id,

    // end of input, and the empty-production marker used by FIRST sets
    ScanEof,
    Lambda,

    // nonterminals
    Program,
    VarDeclarations,
    VarDeclaration,
    DeclarationList,
    Declaration,
    CodeBlock,
    Statements,
    Statement,
    ControlStatement,
    WhileStatement,
    DoWhileStatement,
    ReturnStatement,
    ReadWriteStatement,
    ReadStatement,
    WriteStatement,
    AssignStatement,
    IfStatement,
    IfStmt,
    Exp,
    SystemGoal,
}

impl Tag {
    #[inline]
    pub fn is_terminal(self) -> bool {
        self <= Tag::Lambda
    }
}

/// A scanned token: the tag plus the raw lexeme it came from. The tag alone
/// does not reconstruct `IntNum` or `Id` values, so the text rides along.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub tag: Tag,
    pub text: String,
}

impl Token {
    pub fn new(tag: Tag, text: impl Into<String>) -> Self {
        Self {
            tag,
            text: text.into(),
        }
    }
}
