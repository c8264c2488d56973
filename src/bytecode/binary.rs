/*!
  This module is responsible for the encoding and decoding of binary instructions.

*/

use crate::address::Address;
use crate::error::VmResult;
use crate::memory::{Memory, Word};

use super::Instruction;
use super::registry::{Registry, REGISTRY};

/// An instruction read out of memory, paired with the address immediately following it.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Decoded {
  pub instruction: Instruction,
  pub next: Address
}

impl Decoded {
  pub fn new(instruction: Instruction, next: Address) -> Decoded {
    Decoded { instruction, next }
  }
}

/**
  Writes `instruction` into memory at `address`: the opcode in the first cell and, for
  instructions that carry one, the operand in the second. Returns the address following the
  instruction. Nothing is written if the instruction does not fit.
*/
pub fn encode_instruction(instruction: &Instruction, address: Address, memory: &mut Memory)
  -> VmResult<Address>
{
  memory.check_span(address, instruction.size())?;
  memory.write(address, instruction.opcode() as Word)?;
  if let Some(operand) = instruction.operand() {
    memory.write(address + 1, operand)?;
  }
  Ok(address + instruction.size())
}

/// Decodes the instruction at `address` using the process-wide registry.
pub fn decode_instruction(address: Address, memory: &Memory) -> VmResult<Decoded> {
  decode_with(&REGISTRY, address, memory)
}

pub fn decode_with(registry: &Registry, address: Address, memory: &Memory) -> VmResult<Decoded> {
  let opcode = memory.read(address)?;
  let decode = registry.lookup(address, opcode)?;
  decode(address, memory)
}

/// The total number of cells `program` occupies once encoded.
pub fn program_size(program: &[Instruction]) -> usize {
  program.iter().map(Instruction::size).sum()
}

/**
  Lays `program` out contiguously starting at `start`, with no padding. The whole program is
  sized before any cell is written, so either all of it lands in memory or none of it does.
  Returns the address following the last instruction.
*/
pub fn encode_program(program: &[Instruction], start: Address, memory: &mut Memory)
  -> VmResult<Address>
{
  memory.check_span(start, program_size(program))?;

  let mut address = start;
  for instruction in program {
    address = encode_instruction(instruction, address, memory)?;
  }
  Ok(address)
}
