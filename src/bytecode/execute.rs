/*!
  The effect of each instruction on a machine's stacks and memory.

  Every instruction checks the stack depth and addresses it needs before it mutates anything, so
  an instruction that faults leaves the machine exactly as it found it.
*/

use crate::address::{address_to_word, word_to_address, Address};
use crate::error::VmResult;
use crate::machine::Machine;
use crate::memory::Word;
use crate::stack::Stack;

use super::Instruction;

/// What the machine does after an instruction has executed.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Control {
  /// Continue with the instruction immediately following.
  Next,
  /// Transfer control to the given address.
  Jump(Address),
  /// Stop the machine.
  Halt
}

/// Pops `a` (the top) then `b` and pushes `op(b, a)`.
fn binary(stack: &mut Stack, op: fn(Word, Word) -> Word) -> VmResult {
  stack.require(2)?;
  let a = stack.pop()?;
  let b = stack.pop()?;
  stack.push(op(b, a));
  Ok(())
}

impl Instruction {

  /**
    Applies this instruction to `machine`, whose program counter must be the address this
    instruction was decoded from. Arithmetic wraps on overflow.
  */
  pub fn execute(&self, machine: &mut Machine) -> VmResult<Control> {
    let capacity = machine.memory.capacity();
    let data     = &mut machine.data_stack;

    match *self {

      Instruction::Noop => {}

      Instruction::Store => {
        let value   = data.peek_at(0)?;
        let address = word_to_address(data.peek_at(1)?, capacity)?;
        machine.memory.write(address, value)?;
        data.pop()?;
        data.pop()?;
      }

      Instruction::Fetch => {
        let address = word_to_address(data.peek()?, capacity)?;
        let value   = machine.memory.read(address)?;
        data.pop()?;
        data.push(value);
      }

      Instruction::Drop => {
        data.pop()?;
      }

      Instruction::Dup => {
        let top = data.peek()?;
        data.push(top);
      }

      Instruction::Push => {
        let top = data.pop()?;
        machine.return_stack.push(top);
      }

      Instruction::Pop => {
        let top = machine.return_stack.pop()?;
        data.push(top);
      }

      Instruction::Swap => {
        data.require(2)?;
        let a = data.pop()?;
        let b = data.pop()?;
        data.push(a);
        data.push(b);
      }

      Instruction::Literal(n) => {
        data.push(n);
      }

      Instruction::BranchIfZero(target) => {
        match data.peek()? {
          0 => {
            let target = word_to_address(target, capacity)?;
            data.pop()?;
            return Ok(Control::Jump(target));
          }
          _ => {
            data.pop()?;
          }
        }
      }

      Instruction::Call(target) => {
        let target = word_to_address(target, capacity)?;
        let return_address = machine.pc + self.size();
        machine.return_stack.push(address_to_word(return_address));
        return Ok(Control::Jump(target));
      }

      Instruction::Xor => {
        binary(data, |b, a| b ^ a)?;
      }

      Instruction::Over => {
        let second = data.peek_at(1)?;
        data.push(second);
      }

      Instruction::Exit => {
        return Ok(Control::Halt);
      }

      Instruction::Plus => {
        binary(data, Word::wrapping_add)?;
      }

      Instruction::Minus => {
        binary(data, Word::wrapping_sub)?;
      }

    } // end match on instruction

    Ok(Control::Next)
  }
}
