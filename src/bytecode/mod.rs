/*!

  The machine's memory is an array of cells, and an encoded program is a contiguous run of
  instructions within it. Each instruction occupies one or two consecutive cells:

    [Opcode]             zero-operand instructions
    [Opcode][Operand]    `LIT n`, `IF target`, `CALL target`

  There is no header, magic number, padding or length prefix. The address a program is loaded
  at is supplied out of band, by the machine that encoded it.

  Decoding reads the opcode cell, finds the opcode's decoder in the registry, and lets the
  decoder read whatever operand follows. The registry is built once from a fixed table; an
  opcode missing from it is a decode error, never skipped.

  The opcode itself is the `Operation` enum, a single byte. The decoded form is `Instruction`, a
  sum type with one variant per opcode carrying that opcode's operand, so every match over
  instructions is checked for exhaustiveness at compile time.

*/

mod binary;
mod execute;
mod instruction;
mod registry;

pub use binary::{encode_instruction, encode_program, decode_instruction, decode_with,
                 program_size, Decoded};
pub use execute::Control;
pub use instruction::{Instruction, Operation};
pub use registry::{DecodeFn, Registry, REGISTRY};
