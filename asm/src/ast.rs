//! Parsed-line and operand shapes, independent of any particular mnemonic.

/// One operand as written in source, before it is matched against the shape
/// a mnemonic expects.
#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    Register(u8),
    Immediate(i32),
    /// `offset(Rs)`, the LOAD/STORE addressing form.
    Indexed(i32, u8),
    /// A bare identifier that isn't `R<hex>` — a label reference.
    Label(String),
}

#[derive(Debug, Clone)]
pub struct ParsedLine {
    pub label: Option<String>,
    pub mnemonic: Option<String>,
    pub operands: Vec<Operand>,
    pub line_number: usize,
}

/// A mnemonic with its operands, already placed at a byte address by pass 1.
#[derive(Debug, Clone)]
pub struct InstructionRecord {
    pub mnemonic: String,
    pub operands: Vec<Operand>,
    pub address: u16,
    pub line_number: usize,
}
