use std::fmt::{Display, Formatter};

use strum_macros::{Display as StrumDisplay, EnumIter, EnumString, IntoStaticStr};
use num_enum::{TryFromPrimitive, IntoPrimitive};

use crate::memory::Word;

/**
  Opcodes of the virtual machine.

  The discriminant of each variant is the opcode written to memory, so the numbering below is
  the wire format. Never reuse or renumber a shipped opcode; add new ones at the end.

  Names print and parse as their Forth mnemonics.
*/
#[derive(
StrumDisplay, IntoStaticStr, EnumString, EnumIter, TryFromPrimitive, IntoPrimitive,
Clone,        Copy,          Eq,         PartialEq, Debug,           Hash
)]
#[repr(u8)]
pub enum Operation {
  #[strum(serialize = "NOP")]  Noop         =  0, // no effect
  #[strum(serialize = "!")]    Store        =  1, // ( addr n -- )      memory[addr] = n
  #[strum(serialize = "@")]    Fetch        =  2, // ( addr -- n )      n = memory[addr]
  #[strum(serialize = "DROP")] Drop         =  3, // ( n -- )
  #[strum(serialize = "DUP")]  Dup          =  4, // ( n -- n n )
  #[strum(serialize = ">R")]   Push         =  5, // ( n -- )   R: ( -- n )
  #[strum(serialize = "R>")]   Pop          =  6, // ( -- n )   R: ( n -- )
  #[strum(serialize = "SWAP")] Swap         =  7, // ( a b -- b a )
  #[strum(serialize = "LIT")]  Literal      =  8, // ( -- n )           operand n
  #[strum(serialize = "IF")]   BranchIfZero =  9, // ( flag -- )        operand target
  #[strum(serialize = "CALL")] Call         = 10, // R: ( -- return )   operand target
  #[strum(serialize = "XOR")]  Xor          = 11, // ( a b -- a^b )
  #[strum(serialize = "OVER")] Over         = 12, // ( a b -- a b a )
  #[strum(serialize = "EXIT")] Exit         = 13, // halt
  #[strum(serialize = "+")]    Plus         = 14, // ( a b -- a+b )
  #[strum(serialize = "-")]    Minus        = 15, // ( a b -- a-b )
}

impl Operation {
  pub fn code(&self) -> u8 {
    Into::<u8>::into(*self)
  }

  /// Whether an operand cell follows the opcode.
  pub fn has_operand(&self) -> bool {
    match self {
      | Operation::Literal
      | Operation::BranchIfZero
      | Operation::Call => true,
      _                 => false
    }
  }

  /// The number of memory cells an instruction with this opcode occupies.
  pub fn size(&self) -> usize {
    match self.has_operand() {
      true  => 2,
      false => 1
    }
  }

  pub fn is_terminal(&self) -> bool {
    *self == Operation::Exit
  }
}

/**
  A decoded instruction: the opcode together with its operand, if it has one. Instructions
  without an operand are plain unit variants, so equal instructions compare equal regardless of
  where they were decoded from.
*/
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum Instruction {
  Noop,
  Store,
  Fetch,
  Drop,
  Dup,
  Push,
  Pop,
  Swap,
  Literal(Word),
  BranchIfZero(Word),
  Call(Word),
  Xor,
  Over,
  Exit,
  Plus,
  Minus,
}

impl Instruction {

  pub fn operation(&self) -> Operation {
    match self {
      Instruction::Noop            => Operation::Noop,
      Instruction::Store           => Operation::Store,
      Instruction::Fetch           => Operation::Fetch,
      Instruction::Drop            => Operation::Drop,
      Instruction::Dup             => Operation::Dup,
      Instruction::Push            => Operation::Push,
      Instruction::Pop             => Operation::Pop,
      Instruction::Swap            => Operation::Swap,
      Instruction::Literal(_)      => Operation::Literal,
      Instruction::BranchIfZero(_) => Operation::BranchIfZero,
      Instruction::Call(_)         => Operation::Call,
      Instruction::Xor             => Operation::Xor,
      Instruction::Over            => Operation::Over,
      Instruction::Exit            => Operation::Exit,
      Instruction::Plus            => Operation::Plus,
      Instruction::Minus           => Operation::Minus,
    }
  }

  pub fn opcode(&self) -> u8 {
    self.operation().code()
  }

  pub fn size(&self) -> usize {
    self.operation().size()
  }

  pub fn operand(&self) -> Option<Word> {
    match self {
      | Instruction::Literal(n)
      | Instruction::BranchIfZero(n)
      | Instruction::Call(n) => Some(*n),
      _                      => None
    }
  }

  pub fn is_terminal(&self) -> bool {
    self.operation().is_terminal()
  }
}

impl Display for Instruction {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    match self.operand() {
      Some(n) => write!(f, "{} {}", self.operation(), n),
      None    => write!(f, "{}", self.operation())
    }
  }
}
