use std::process;

use stackvm::Machine;

fn main() {

  #[cfg(feature = "trace_computation")]
  println!("Computation Tracing ENABLED");

  let mut machine = Machine::build(|m| {
    m.literal(3);
    m.literal(5);
    m.add();
    m.drop();
    m.fetch();
  });

  if let Err(e) = machine.encode() {
    eprintln!("Error: {}", e);
    process::exit(1);
  }
  println!("{}", machine.memory());

  match machine.run() {
    Ok(()) => {
      println!("Data stack: {}", machine.data_stack());
    }
    Err(e) => {
      eprintln!("Error at address {}: {}", machine.pc(), e);
      process::exit(1);
    }
  }
}
