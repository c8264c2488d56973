/*!
  The opcode registry maps an opcode to the routine that decodes an instruction with that
  opcode. The standard registry is built once, exhaustively, from the table at the bottom of this
  module and is read-only thereafter.
*/

use std::collections::HashMap;

use crate::address::Address;
use crate::error::{VmError, VmResult};
use crate::memory::{Memory, Word};

use super::{Decoded, Instruction, Operation};

/// Decodes the instruction whose opcode sits at the given address.
pub type DecodeFn = fn(Address, &Memory) -> VmResult<Decoded>;

#[derive(Clone, Default)]
pub struct Registry {
  decoders: HashMap<u8, DecodeFn>
}

impl Registry {

  pub fn new() -> Registry {
    Registry::default()
  }

  /// A registry holding a decoder for every opcode of the instruction set.
  pub fn standard() -> VmResult<Registry> {
    let mut registry = Registry::new();
    for (operation, decode) in DECODERS.iter() {
      registry.register(operation.code(), *decode)?;
    }
    Ok(registry)
  }

  /// Registering an opcode twice is an error; the first registration stays in place.
  pub fn register(&mut self, opcode: u8, decode: DecodeFn) -> VmResult {
    match self.decoders.contains_key(&opcode) {
      true  => Err(VmError::DuplicateOpcode { opcode }),
      false => {
        self.decoders.insert(opcode, decode);
        Ok(())
      }
    }
  }

  /// `address` only serves to locate the failure when `opcode` is unregistered.
  pub fn lookup(&self, address: Address, opcode: Word) -> VmResult<DecodeFn> {
    let not_found = VmError::Decode { address, opcode };
    if opcode < 0 || opcode > u8::MAX as Word {
      return Err(not_found);
    }
    self.decoders
        .get(&(opcode as u8))
        .copied()
        .ok_or(not_found)
  }

  pub fn contains(&self, opcode: u8) -> bool {
    self.decoders.contains_key(&opcode)
  }

  pub fn len(&self) -> usize {
    self.decoders.len()
  }

  pub fn is_empty(&self) -> bool {
    self.decoders.is_empty()
  }
}

lazy_static! {
  pub static ref REGISTRY: Registry =
    Registry::standard()
      .unwrap_or_else(|e| unreachable!("The opcode table is inconsistent: {}", e));
}

// region Decoders

macro_rules! decoder {
  ($name:ident, $variant:ident) => {
    fn $name(address: Address, _memory: &Memory) -> VmResult<Decoded> {
      Ok(Decoded::new(Instruction::$variant, address + 1))
    }
  };

  ($name:ident, $variant:ident, operand) => {
    fn $name(address: Address, memory: &Memory) -> VmResult<Decoded> {
      let operand = memory.read(address + 1)?;
      Ok(Decoded::new(Instruction::$variant(operand), address + 2))
    }
  };
}

decoder!(decode_noop,  Noop);
decoder!(decode_store, Store);
decoder!(decode_fetch, Fetch);
decoder!(decode_drop,  Drop);
decoder!(decode_dup,   Dup);
decoder!(decode_push,  Push);
decoder!(decode_pop,   Pop);
decoder!(decode_swap,  Swap);
decoder!(decode_literal,        Literal,      operand);
decoder!(decode_branch_if_zero, BranchIfZero, operand);
decoder!(decode_call,           Call,         operand);
decoder!(decode_xor,   Xor);
decoder!(decode_over,  Over);
decoder!(decode_exit,  Exit);
decoder!(decode_plus,  Plus);
decoder!(decode_minus, Minus);

const DECODERS: [(Operation, DecodeFn); 16] = [
  (Operation::Noop,         decode_noop           as DecodeFn),
  (Operation::Store,        decode_store          as DecodeFn),
  (Operation::Fetch,        decode_fetch          as DecodeFn),
  (Operation::Drop,         decode_drop           as DecodeFn),
  (Operation::Dup,          decode_dup            as DecodeFn),
  (Operation::Push,         decode_push           as DecodeFn),
  (Operation::Pop,          decode_pop            as DecodeFn),
  (Operation::Swap,         decode_swap           as DecodeFn),
  (Operation::Literal,      decode_literal        as DecodeFn),
  (Operation::BranchIfZero, decode_branch_if_zero as DecodeFn),
  (Operation::Call,         decode_call           as DecodeFn),
  (Operation::Xor,          decode_xor            as DecodeFn),
  (Operation::Over,         decode_over           as DecodeFn),
  (Operation::Exit,         decode_exit           as DecodeFn),
  (Operation::Plus,         decode_plus           as DecodeFn),
  (Operation::Minus,        decode_minus          as DecodeFn),
];

// endregion
