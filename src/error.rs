//! The single error type of the machine. Every fault is fatal to the current run; the caller
//! decides whether to build a fresh `Machine` or give up.

use thiserror::Error;

use crate::address::Address;
use crate::memory::Word;
use crate::stack::StackKind;

#[derive(Error, Clone, Copy, Debug, Eq, PartialEq)]
pub enum VmError {
  /// The cell at `address` holds an opcode with no registry entry.
  #[error("cannot decode opcode {opcode} at address {address}")]
  Decode {
    address: Address,
    opcode: Word
  },

  /// Encoding the program would write past the end of memory. Nothing has been written.
  #[error("program of {size} cells loaded at {address} does not fit in {capacity} cells of memory")]
  MemoryOverflow {
    address: Address,
    size: usize,
    capacity: usize
  },

  /// A read or write outside of memory, or a negative address word.
  #[error("address {address} is outside of memory (capacity {capacity})")]
  InvalidAddress {
    address: i64,
    capacity: usize
  },

  #[error("{stack} stack underflow")]
  StackUnderflow {
    stack: StackKind
  },

  #[error("opcode {opcode} is already registered")]
  DuplicateOpcode {
    opcode: u8
  },

  #[error("the program has not been encoded into memory")]
  NotEncoded,

  #[error("the program has already been encoded into memory")]
  AlreadyEncoded,
}

pub type VmResult<T = ()> = Result<T, VmError>;
