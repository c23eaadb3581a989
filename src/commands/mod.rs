//! CLI commands for tootmirror

pub mod dispatch;
pub mod evaluate;
pub mod preview;
pub mod run;
pub mod verify;

use std::fs;
use std::io::{self, Read};
use std::path::Path;

use tootmirror_core::error::Result;

/// Read a whole file, or stdin when no path is given
pub(crate) fn read_input(path: Option<&Path>) -> Result<String> {
    match path {
        Some(path) => Ok(fs::read_to_string(path)?),
        None => {
            let mut buffer = String::new();
            io::stdin().read_to_string(&mut buffer)?;
            Ok(buffer)
        }
    }
}
