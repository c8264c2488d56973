//! Structures and functions for the stack machine: a program under construction, the memory it
//! is encoded into, and the data and return stacks it runs against.

use std::fmt::{Display, Formatter};

use prettytable::{format as TableFormat, Table};
use strum_macros::Display as StrumDisplay;

use crate::address::Address;
use crate::bytecode::*;
use crate::error::{VmError, VmResult};
use crate::memory::{Memory, Word, MEMORY_SIZE};
use crate::stack::{Stack, StackKind};

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct MachineConfig {
  /// Number of cells of memory.
  pub memory_size: usize
}

impl Default for MachineConfig {
  fn default() -> Self {
    MachineConfig {
      memory_size: MEMORY_SIZE
    }
  }
}

/**
  A machine is built, then encoded, then run. Builder calls belong to the `Building` phase;
  `encode` moves the machine to `Encoded`, after which it can be run (and rerun) but not
  re-encoded.
*/
#[derive(StrumDisplay, Clone, Copy, Debug, Eq, PartialEq)]
pub enum Phase {
  Building,
  Encoded
}

#[derive(StrumDisplay, Clone, Copy, Debug, Eq, PartialEq)]
pub enum Status {
  Running,
  Halted
}

pub struct Machine {
  /// Instructions in the order they were appended.
  pub(crate) program      : Vec<Instruction>,
  /// Unified code and data store.
  pub(crate) memory       : Memory,
  pub(crate) data_stack   : Stack,
  pub(crate) return_stack : Stack,
  /// Address the program is encoded at and runs from.
  start                   : Address,
  /// Address of the instruction being (or about to be) executed.
  pub(crate) pc           : Address,
  phase                   : Phase,
  status                  : Status,
}

impl Machine {

  // region Construction

  pub fn new() -> Machine {
    Machine::with_config(MachineConfig::default())
  }

  pub fn with_config(config: MachineConfig) -> Machine {
    Machine {
      program      : vec![],
      memory       : Memory::new(config.memory_size),
      data_stack   : Stack::new(StackKind::Data),
      return_stack : Stack::new(StackKind::Return),
      start        : 0,
      pc           : 0,
      phase        : Phase::Building,
      status       : Status::Running,
    }
  }

  /**
    Builds a machine by running `init` against a fresh one, then appends `exit`, so every
    program built this way ends in a terminator.

    ```
    let mut machine = stackvm::Machine::build(|m| {
      m.literal(3);
      m.literal(5);
      m.plus();
    });
    machine.encode().unwrap();
    machine.run().unwrap();
    assert_eq!(machine.data_stack().as_slice(), &[8]);
    ```
  */
  pub fn build<F>(init: F) -> Machine
    where F: FnOnce(&mut Machine)
  {
    Machine::build_with(MachineConfig::default(), init)
  }

  pub fn build_with<F>(config: MachineConfig, init: F) -> Machine
    where F: FnOnce(&mut Machine)
  {
    let mut machine = Machine::with_config(config);
    init(&mut machine);
    machine.exit();
    machine
  }

  // endregion

  // region Builder methods

  /**
    Appends `instruction` to the program. Instructions appended after `encode` are recorded but
    never reach memory.
  */
  pub fn append(&mut self, instruction: Instruction) -> &mut Machine {
    self.program.push(instruction);
    self
  }

  /// Sets the load address. Defaults to 0. Has no effect once the program is encoded.
  pub fn start(&mut self, address: Address) -> &mut Machine {
    if self.phase == Phase::Building {
      self.start = address;
      self.pc    = address;
    }
    self
  }

  pub fn noop(&mut self)                     -> &mut Machine { self.append(Instruction::Noop) }
  pub fn store(&mut self)                    -> &mut Machine { self.append(Instruction::Store) }
  pub fn fetch(&mut self)                    -> &mut Machine { self.append(Instruction::Fetch) }
  pub fn drop(&mut self)                     -> &mut Machine { self.append(Instruction::Drop) }
  pub fn dup(&mut self)                      -> &mut Machine { self.append(Instruction::Dup) }
  pub fn push(&mut self)                     -> &mut Machine { self.append(Instruction::Push) }
  pub fn pop(&mut self)                      -> &mut Machine { self.append(Instruction::Pop) }
  pub fn swap(&mut self)                     -> &mut Machine { self.append(Instruction::Swap) }
  pub fn literal(&mut self, n: Word)         -> &mut Machine { self.append(Instruction::Literal(n)) }
  pub fn branch_if_zero(&mut self, to: Word) -> &mut Machine { self.append(Instruction::BranchIfZero(to)) }
  pub fn call(&mut self, to: Word)           -> &mut Machine { self.append(Instruction::Call(to)) }
  pub fn xor(&mut self)                      -> &mut Machine { self.append(Instruction::Xor) }
  pub fn over(&mut self)                     -> &mut Machine { self.append(Instruction::Over) }
  pub fn exit(&mut self)                     -> &mut Machine { self.append(Instruction::Exit) }
  pub fn plus(&mut self)                     -> &mut Machine { self.append(Instruction::Plus) }
  pub fn minus(&mut self)                    -> &mut Machine { self.append(Instruction::Minus) }

  /// Same as `plus`.
  pub fn add(&mut self) -> &mut Machine {
    self.plus()
  }

  // endregion

  // region Encoding and execution

  /**
    Lays the program out in memory from the load address, in program order, with no padding.
    Fails without writing anything if the program does not fit.
  */
  pub fn encode(&mut self) -> VmResult {
    if self.phase == Phase::Encoded {
      return Err(VmError::AlreadyEncoded);
    }

    let _end = encode_program(&self.program, self.start, &mut self.memory)?;

    #[cfg(feature = "trace_computation")]
      println!("Encoded {} instructions into {} cells at {}.", self.program.len(), _end - self.start, self.start);

    self.phase  = Phase::Encoded;
    self.pc     = self.start;
    self.status = Status::Running;
    Ok(())
  }

  /**
    Runs from the load address until `exit` executes. A program with no reachable `exit` runs
    forever. May be called again after halting; the stacks are kept as they were left.
  */
  pub fn run(&mut self) -> VmResult {
    self.require_encoded()?;
    self.pc     = self.start;
    self.status = Status::Running;

    while self.step()? == Status::Running {}
    Ok(())
  }

  /// Same as `run`.
  pub fn decode(&mut self) -> VmResult {
    self.run()
  }

  /**
    Fetches, decodes and executes the single instruction at the program counter, then moves the
    program counter to the next instruction or the control-transfer target. On a fault the
    program counter is left at the faulting instruction.
  */
  pub fn step(&mut self) -> VmResult<Status> {
    self.require_encoded()?;
    if self.status == Status::Halted {
      return Ok(Status::Halted);
    }

    let result = self.execute_next();

    #[cfg(feature = "trace_computation")]
      {
        match &result {
          Err(e)              => println!("Fault at {}: {}\n{}", self.pc, e, self),
          Ok(Status::Halted)  => println!("Halted at {}.\n{}", self.pc, self),
          Ok(Status::Running) => {}
        }
      }

    result
  }

  fn execute_next(&mut self) -> VmResult<Status> {
    let decoded = decode_instruction(self.pc, &self.memory)?;

    #[cfg(feature = "trace_computation")]
      println!("{:>4}: {:<8} {}", self.pc, decoded.instruction.to_string(), self.data_stack);

    match decoded.instruction.execute(self)? {
      Control::Next           => self.pc = decoded.next,
      Control::Jump(target)   => self.pc = target,
      Control::Halt           => self.status = Status::Halted,
    }
    Ok(self.status)
  }

  /**
    Decodes memory from the load address up to and including the first `exit`, without
    executing anything. Stops early at the end of memory.
  */
  pub fn disassemble(&self) -> VmResult<Vec<(Address, Instruction)>> {
    self.require_encoded()?;

    let mut listing = vec![];
    let mut address = self.start;
    while address < self.memory.capacity() {
      let decoded = decode_instruction(address, &self.memory)?;
      listing.push((address, decoded.instruction));
      if decoded.instruction.is_terminal() {
        break;
      }
      address = decoded.next;
    }
    Ok(listing)
  }

  fn require_encoded(&self) -> VmResult {
    match self.phase {
      Phase::Encoded  => Ok(()),
      Phase::Building => Err(VmError::NotEncoded)
    }
  }

  // endregion

  // region Accessors

  pub fn program(&self) -> &[Instruction] {
    &self.program
  }

  pub fn memory(&self) -> &Memory {
    &self.memory
  }

  pub fn data_stack(&self) -> &Stack {
    &self.data_stack
  }

  pub fn return_stack(&self) -> &Stack {
    &self.return_stack
  }

  pub fn start_address(&self) -> Address {
    self.start
  }

  pub fn pc(&self) -> Address {
    self.pc
  }

  pub fn phase(&self) -> Phase {
    self.phase
  }

  pub fn status(&self) -> Status {
    self.status
  }

  // endregion

  // region Display methods

  fn make_stack_table(name: char, stack: &Stack) -> Table {
    let mut table = Table::new();

    table.set_format(*TABLE_DISPLAY_FORMAT);
    table.set_titles(row![ubr->"Depth", ubl->"Contents"]);

    // Top of stack first.
    for (depth, value) in stack.as_slice().iter().rev().enumerate() {
      match depth == 0 {

        true  => {
          table.add_row(row![r->format!("* --> {}[{}] =", name, depth), format!("{}", value)]);
        }

        false => {
          table.add_row(row![r->format!("{}[{}] =", name, depth), format!("{}", value)]);
        }

      }
    }
    table
  }

  fn make_program_table(&self) -> Table {
    let mut table = Table::new();

    table.set_format(*TABLE_DISPLAY_FORMAT);
    table.set_titles(row![ubr->"Address", ubl->"Instruction"]);

    let mut address = self.start;
    for instruction in &self.program {
      match address == self.pc {

        true  => {
          table.add_row(row![r->format!("* --> M[{}]", address), format!("{}", instruction)]);
        }

        false => {
          table.add_row(row![r->format!("M[{}]", address), format!("{}", instruction)]);
        }

      }
      address += instruction.size();
    }
    table
  }

  // endregion

}

impl Default for Machine {
  fn default() -> Self {
    Machine::new()
  }
}

lazy_static! {
  static ref TABLE_DISPLAY_FORMAT: TableFormat::TableFormat =
    TableFormat::FormatBuilder::new()
      .column_separator('│')
      .borders(' ')
      .separator(
        TableFormat::LinePosition::Title,
        TableFormat::LineSeparator::new('─', '┼', ' ', ' ')
      )
      .separator(
        TableFormat::LinePosition::Bottom,
        TableFormat::LineSeparator::new('─', '┴', ' ', ' ')
      )
      .padding(1, 1)
      .build();
}

impl Display for Machine {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    let d_table = Machine::make_stack_table('D', &self.data_stack);
    let r_table = Machine::make_stack_table('R', &self.return_stack);
    let p_table = self.make_program_table();

    let mut combined_table = table!([d_table, r_table, p_table]);

    combined_table.set_titles(row![ub->"Data Stack", ub->"Return Stack", ub->"Program"]);
    combined_table.set_format(*TABLE_DISPLAY_FORMAT);

    write!(f, "Phase: {}\tStatus: {}\tPC: {}\n{}", self.phase, self.status, self.pc, combined_table)
  }
}


#[cfg(test)]
mod tests {
  use super::*;

  fn reference_machine() -> Machine {
    Machine::build(|m| {
      m.literal(3);
      m.literal(5);
      m.add();
      m.drop();
      m.fetch();
    })
  }

  #[test]
  fn build_appends_exit(){
    let machine = Machine::build(|_| {});
    assert_eq!(machine.program(), &[Instruction::Exit]);

    let machine = reference_machine();
    assert_eq!(machine.program().last(), Some(&Instruction::Exit));
    assert_eq!(machine.program().len(), 6);
  }

  #[test]
  fn reference_program_encodes(){
    let mut machine = reference_machine();
    assert_eq!(machine.phase(), Phase::Building);
    machine.encode().unwrap();
    assert_eq!(machine.phase(), Phase::Encoded);
    assert_eq!(&machine.memory().cells()[..8], &[0x08, 0x03, 0x08, 0x05, 0x0E, 0x03, 0x02, 0x0D]);
    assert!(machine.memory().to_string().starts_with("08 03 08 05 0E 03 02 0D  00"));
  }

  #[test]
  fn reference_program_faults_on_fetch(){
    let mut machine = reference_machine();
    machine.encode().unwrap();
    assert_eq!(
      machine.run(),
      Err(VmError::StackUnderflow { stack: StackKind::Data })
    );
    // literal, literal, plus and drop ran; fetch at address 6 faulted.
    assert_eq!(machine.pc(), 6);
    assert!(machine.data_stack().is_empty());
    assert_eq!(machine.status(), Status::Running);
  }

  #[test]
  fn stepping_through_the_reference_program(){
    let mut machine = reference_machine();
    machine.encode().unwrap();

    assert_eq!(machine.step(), Ok(Status::Running));
    assert_eq!(machine.data_stack().as_slice(), &[3]);
    assert_eq!(machine.step(), Ok(Status::Running));
    assert_eq!(machine.data_stack().as_slice(), &[3, 5]);
    assert_eq!(machine.step(), Ok(Status::Running));
    assert_eq!(machine.data_stack().as_slice(), &[8]);
    assert_eq!(machine.step(), Ok(Status::Running));
    assert!(machine.data_stack().is_empty());
    assert_eq!(machine.pc(), 6);
    assert!(machine.step().is_err());
  }

  #[test]
  fn straight_line_program_halts_after_each_instruction_once(){
    let mut machine = Machine::build(|m| {
      m.literal(6).literal(3).xor();
      m.literal(100).literal(42).store();
      m.literal(100).fetch();
      m.dup().over().swap().minus();
      m.push().pop().noop();
    });
    machine.encode().unwrap();

    let mut steps = 0;
    while machine.step().unwrap() == Status::Running {
      steps += 1;
    }
    // Every instruction but the final `exit` returned `Running`.
    assert_eq!(steps, machine.program().len() - 1);
    assert_eq!(machine.data_stack().as_slice(), &[5, 42, 0]);
    assert_eq!(machine.memory().read(100), Ok(42));
    assert_eq!(machine.step(), Ok(Status::Halted));
  }

  #[test]
  fn load_address_is_honoured(){
    let mut machine = Machine::build(|m| {
      m.start(20);
      m.literal(1).literal(2).plus();
    });
    machine.encode().unwrap();
    assert!(machine.memory().cells()[..20].iter().all(|c| *c == 0));
    assert_eq!(&machine.memory().cells()[20..26], &[8, 1, 8, 2, 14, 13]);
    machine.run().unwrap();
    assert_eq!(machine.data_stack().as_slice(), &[3]);
    assert_eq!(machine.pc(), 25);
  }

  #[test]
  fn start_after_encode_is_ignored(){
    let mut machine = Machine::build(|m| {
      m.literal(1).literal(2).plus();
    });
    machine.encode().unwrap();
    machine.start(40);
    assert_eq!(machine.start_address(), 0);
    assert_eq!(machine.pc(), 0);
    machine.run().unwrap();
    assert_eq!(machine.data_stack().as_slice(), &[3]);
    assert_eq!(machine.pc(), 5);
  }

  #[test]
  fn phase_violations(){
    let mut machine = reference_machine();
    assert_eq!(machine.run(), Err(VmError::NotEncoded));
    assert_eq!(machine.step(), Err(VmError::NotEncoded));
    assert_eq!(machine.disassemble(), Err(VmError::NotEncoded));
    machine.encode().unwrap();
    assert_eq!(machine.encode(), Err(VmError::AlreadyEncoded));
  }

  #[test]
  fn oversized_program_is_not_written(){
    let config = MachineConfig { memory_size: 8 };
    // Exactly fills memory.
    let mut machine = Machine::build_with(config, |m| {
      m.literal(1).literal(2).literal(3).plus();
    });
    assert_eq!(machine.encode(), Ok(()));

    let mut machine = Machine::build_with(config, |m| {
      m.start(4);
      m.literal(1).literal(2);
    });
    assert_eq!(
      machine.encode(),
      Err(VmError::MemoryOverflow { address: 4, size: 5, capacity: 8 })
    );
    assert!(machine.memory().cells().iter().all(|c| *c == 0));
    assert_eq!(machine.phase(), Phase::Building);
  }

  #[test]
  fn unknown_opcode_in_memory(){
    let mut machine = Machine::build(|m| {
      // Overwrite the `exit` at address 5 with opcode 99.
      m.literal(5).literal(99).store();
    });
    machine.encode().unwrap();
    assert_eq!(machine.run(), Err(VmError::Decode { address: 5, opcode: 99 }));
    assert_eq!(machine.pc(), 5);
  }

  #[test]
  fn countdown_loop(){
    // Decrement from 3 until zero; `LIT 0 IF` is an unconditional jump back.
    let mut machine = Machine::build(|m| {
      m.literal(3);          // 0
      m.literal(1);          // 2
      m.minus();             // 4
      m.dup();               // 5
      m.branch_if_zero(13);  // 6
      m.literal(0);          // 8
      m.branch_if_zero(2);   // 10
      m.noop();              // 12
    });                      // 13: EXIT
    machine.encode().unwrap();
    machine.run().unwrap();
    assert_eq!(machine.data_stack().as_slice(), &[0]);
    assert_eq!(machine.pc(), 13);
    assert_eq!(machine.status(), Status::Halted);
  }

  #[test]
  fn running_off_the_end_of_memory(){
    // Jump past `exit`; the zeroed cells from 8 on decode as `NOP` up to the end of memory.
    let mut machine = Machine::build_with(MachineConfig { memory_size: 16 }, |m| {
      m.literal(0);          // 0
      m.branch_if_zero(8);   // 2
    });                      // 4: EXIT
    machine.encode().unwrap();
    assert_eq!(
      machine.run(),
      Err(VmError::InvalidAddress { address: 16, capacity: 16 })
    );
    assert_eq!(machine.pc(), 16);
    assert!(machine.data_stack().is_empty());
    assert_eq!(machine.status(), Status::Running);
  }

  #[test]
  fn call_transfers_control(){
    let mut machine = Machine::build(|m| {
      m.call(4);           // 0
      m.literal(99);       // 2, skipped
      m.literal(7);        // 4
    });                    // 6: EXIT
    machine.encode().unwrap();
    machine.run().unwrap();
    assert_eq!(machine.data_stack().as_slice(), &[7]);
    assert_eq!(machine.return_stack().as_slice(), &[2]);
  }

  #[test]
  fn rerun_keeps_stacks(){
    let mut machine = Machine::build(|m| { m.literal(1); });
    machine.encode().unwrap();
    machine.run().unwrap();
    machine.run().unwrap();
    assert_eq!(machine.data_stack().as_slice(), &[1, 1]);
  }

  #[test]
  fn disassembly_matches_program(){
    let mut machine = reference_machine();
    machine.start(3);
    machine.encode().unwrap();
    let listing = machine.disassemble().unwrap();
    let addresses: Vec<Address> = listing.iter().map(|(a, _)| *a).collect();
    let instructions: Vec<Instruction> = listing.iter().map(|(_, i)| *i).collect();
    assert_eq!(addresses, vec![3, 5, 7, 8, 9, 10]);
    assert_eq!(instructions.as_slice(), machine.program());
  }

  #[test]
  fn disassembly_stops_at_end_of_memory(){
    let mut machine = Machine::with_config(MachineConfig { memory_size: 4 });
    machine.start(1).noop();
    machine.encode().unwrap();
    // No `exit`: zeroed memory decodes as `NOP` up to the last cell.
    assert_eq!(
      machine.disassemble(),
      Ok(vec![(1, Instruction::Noop), (2, Instruction::Noop), (3, Instruction::Noop)])
    );
  }

  #[test]
  fn state_table_renders(){
    let mut machine = reference_machine();
    machine.encode().unwrap();
    machine.step().unwrap();
    let text = machine.to_string();
    assert!(text.starts_with("Phase: Encoded\tStatus: Running\tPC: 2"));
    assert!(text.contains("Data Stack"));
    assert!(text.contains("* --> M[2]"));
    assert!(text.contains("LIT 5"));
  }
}
