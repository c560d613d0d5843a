use std::io::Read;

use anyhow::{Context, Result};

/// Value of a positional argument, read from stdin when it is `-`.
///
/// One trailing newline is dropped so `echo secret | captable-secrets hash -`
/// hashes `secret`.
pub fn read_arg(value: &str) -> Result<String> {
    if value != "-" {
        return Ok(value.to_string());
    }
    read_from(std::io::stdin().lock())
}

fn read_from(mut reader: impl Read) -> Result<String> {
    let mut buf = String::new();
    reader
        .read_to_string(&mut buf)
        .context("failed to read stdin")?;
    Ok(strip_newline(buf))
}

fn strip_newline(mut s: String) -> String {
    if s.ends_with('\n') {
        s.pop();
        if s.ends_with('\r') {
            s.pop();
        }
    }
    s
}
