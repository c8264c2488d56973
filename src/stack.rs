//! The two last-in-first-out stacks of the machine. Both hold `Word`s; they differ only in name,
//! which is carried so that an underflow reports which stack ran dry.

use std::fmt::{Display, Formatter};

use strum_macros::Display as StrumDisplay;

use crate::error::{VmError, VmResult};
use crate::memory::Word;

#[derive(StrumDisplay, Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum StackKind {
  #[strum(serialize = "data")]
  Data,
  #[strum(serialize = "return")]
  Return
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Stack {
  kind  : StackKind,
  items : Vec<Word>
}

impl Stack {

  pub fn new(kind: StackKind) -> Stack {
    Stack {
      kind,
      items: vec![]
    }
  }

  pub fn kind(&self) -> StackKind {
    self.kind
  }

  pub fn push(&mut self, value: Word) {
    self.items.push(value);
  }

  pub fn pop(&mut self) -> VmResult<Word> {
    self.items.pop().ok_or(self.underflow())
  }

  pub fn peek(&self) -> VmResult<Word> {
    self.peek_at(0)
  }

  /// Reads the element `depth` places below the top without removing it; `peek_at(0)` is the top.
  pub fn peek_at(&self, depth: usize) -> VmResult<Word> {
    match self.items.len().checked_sub(depth + 1) {
      Some(i) => Ok(self.items[i]),
      None    => Err(self.underflow())
    }
  }

  /**
    Fails with an underflow unless at least `count` elements are present. Instructions that pop
    more than once call this first so that a fault leaves the stack untouched.
  */
  pub fn require(&self, count: usize) -> VmResult {
    match self.items.len() >= count {
      true  => Ok(()),
      false => Err(self.underflow())
    }
  }

  pub fn depth(&self) -> usize {
    self.items.len()
  }

  pub fn is_empty(&self) -> bool {
    self.items.is_empty()
  }

  /// Bottom first, top last.
  pub fn as_slice(&self) -> &[Word] {
    &self.items
  }

  fn underflow(&self) -> VmError {
    VmError::StackUnderflow { stack: self.kind }
  }
}

impl Display for Stack {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    write!(
      f,
      "[{}]",
      self.items
          .iter()
          .map(Word::to_string)
          .collect::<Vec<String>>()
          .join(", ")
    )
  }
}
