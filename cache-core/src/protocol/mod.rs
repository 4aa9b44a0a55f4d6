mod command;
mod result;

pub use command::{Command, CommandName};
pub use result::{DispatchResult, StateCode};
