/*!
  The machine's memory is a fixed number of cells, each holding one `Word`. Code and data live
  in the same cells: an encoded program is just a run of opcode and operand words, and a running
  program may `store` over its own code.

  Cells are `i32` rather than bytes so that a literal operand can hold any value the stacks can,
  while every instruction still occupies exactly one cell per component.
*/

use std::fmt::{Display, Formatter};

use crate::address::Address;
use crate::error::{VmError, VmResult};

pub type Word = i32;

/// The default number of cells of memory.
pub const MEMORY_SIZE: usize = 128;

// Hex dump layout: cells per group, groups per line.
const DUMP_GROUP: usize = 8;
const DUMP_GROUPS_PER_LINE: usize = 2;

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Memory {
  cells: Vec<Word>
}

impl Memory {

  pub fn new(capacity: usize) -> Memory {
    Memory {
      cells: vec![0; capacity]
    }
  }

  pub fn capacity(&self) -> usize {
    self.cells.len()
  }

  pub fn read(&self, address: Address) -> VmResult<Word> {
    self.cells
        .get(address)
        .copied()
        .ok_or(self.invalid(address))
  }

  pub fn write(&mut self, address: Address, value: Word) -> VmResult {
    let invalid = self.invalid(address);
    match self.cells.get_mut(address) {
      Some(cell) => {
        *cell = value;
        Ok(())
      }
      None       => Err(invalid)
    }
  }

  /// Succeeds if the `size` cells starting at `address` all lie within memory.
  pub fn check_span(&self, address: Address, size: usize) -> VmResult {
    match address.checked_add(size) {
      Some(end) if end <= self.capacity() => Ok(()),
      _ => Err(VmError::MemoryOverflow { address, size, capacity: self.capacity() })
    }
  }

  pub fn cells(&self) -> &[Word] {
    &self.cells
  }

  fn invalid(&self, address: Address) -> VmError {
    VmError::InvalidAddress { address: address as i64, capacity: self.capacity() }
  }
}

/**
  Hex dump, sixteen cells to a line in two groups of eight. Each cell is shown as its low byte,
  so `-3` prints as `FD` and the columns stay two digits wide.
*/
impl Display for Memory {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    let lines =
      self.cells
          .chunks(DUMP_GROUP * DUMP_GROUPS_PER_LINE)
          .map(|line| {
            line.chunks(DUMP_GROUP)
                .map(|group| {
                  group.iter()
                       .map(|cell| format!("{:02X}", *cell as u8))
                       .collect::<Vec<String>>()
                       .join(" ")
                })
                .collect::<Vec<String>>()
                .join("  ")
          })
          .collect::<Vec<String>>();

    write!(f, "{}", lines.join("\n"))
  }
}
