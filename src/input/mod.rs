mod parser;

pub use parser::{parse_command, Command};
