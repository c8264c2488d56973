//! Addresses index cells of the machine's memory. Code and data share the one address space, so
//! the same type serves for the program counter, branch targets and store/fetch operands.

use crate::error::{VmError, VmResult};
use crate::memory::Word;

// `Address` is `usize`, as it is naturally an index into a memory store.
pub type Address = usize;

/// Interprets a stack or operand word as an address into a memory of `capacity` cells.
pub fn word_to_address(word: Word, capacity: usize) -> VmResult<Address> {
  match word >= 0 && (word as usize) < capacity {
    true  => Ok(word as Address),
    false => Err(VmError::InvalidAddress { address: word as i64, capacity })
  }
}

/// The inverse of `word_to_address`, used when an address is pushed onto a stack.
pub fn address_to_word(address: Address) -> Word {
  address as Word
}
