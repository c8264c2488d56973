//! A minimal stack-based bytecode virtual machine. Programs are built instruction by instruction,
//! encoded into a small unified code/data memory, and run against a data stack and a return
//! stack.

#[macro_use] extern crate prettytable;
#[macro_use] extern crate lazy_static;

mod address;
mod error;
mod memory;
mod stack;
mod machine;
pub mod bytecode;

pub use address::Address;
pub use error::{VmError, VmResult};
pub use memory::{Memory, Word, MEMORY_SIZE};
pub use stack::{Stack, StackKind};
pub use machine::{Machine, MachineConfig, Phase, Status};
pub use bytecode::{Instruction, Operation};
