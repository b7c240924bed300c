//! Address trace parsing.
//!
//! One access per line:
//!
//! ```text
//! # op  address     [value]
//! R     0x1000
//! W     1040        7f
//!  L    04000000,8
//! 0x2000
//! ```
//!
//! Addresses and values are hexadecimal, with or without `0x`. A missing op
//! means a read.

use std::fs;
use std::path::Path;

use serde::Serialize;
use thiserror::Error;

/// Direction of a memory access.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum AccessKind {
    Read,
    Write,
}

/// One entry of a trace.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct Access {
    pub kind: AccessKind,
    pub address: u64,
    /// Byte stored by a write.
    pub value: u8,
}

impl Access {
    pub fn read(address: u64) -> Self {
        Self {
            kind: AccessKind::Read,
            address,
            value: 0,
        }
    }

    pub fn write(address: u64, value: u8) -> Self {
        Self {
            kind: AccessKind::Write,
            address,
            value,
        }
    }
}

#[derive(Debug, Error)]
pub enum TraceError {
    #[error("failed to read trace: {0}")]
    Io(#[from] std::io::Error),
    #[error("line {line}: {reason}: `{content}`")]
    Parse {
        line: usize,
        content: String,
        reason: String,
    },
}

fn parse_hex(token: &str) -> Result<u64, String> {
    let digits = token
        .strip_prefix("0x")
        .or_else(|| token.strip_prefix("0X"))
        .unwrap_or(token);
    u64::from_str_radix(digits, 16).map_err(|e| format!("bad hex number `{token}` ({e})"))
}

/// Parses one trace line. Returns `Ok(None)` for blank and comment lines.
pub fn parse_line(line: &str) -> Result<Option<Access>, String> {
    let line = line.split('#').next().unwrap_or("").trim();
    if line.is_empty() {
        return Ok(None);
    }

    let mut tokens = line.split_whitespace();
    let first = tokens.next().unwrap_or("");
    let (kind, addr_token) = match first.to_ascii_uppercase().as_str() {
        "R" | "L" | "I" => (AccessKind::Read, tokens.next()),
        "W" | "S" | "M" => (AccessKind::Write, tokens.next()),
        _ => (AccessKind::Read, Some(first)),
    };

    let addr_token = addr_token.ok_or_else(|| "missing address".to_string())?;
    let addr_token = addr_token.split(',').next().unwrap_or(addr_token);
    let address = parse_hex(addr_token)?;

    let value = match (kind, tokens.next()) {
        (AccessKind::Write, Some(v)) => {
            let v = parse_hex(v)?;
            u8::try_from(v).map_err(|_| format!("value {v:#x} does not fit in a byte"))?
        }
        (AccessKind::Write, None) => 0,
        (AccessKind::Read, Some(extra)) => return Err(format!("unexpected token `{extra}`")),
        (AccessKind::Read, None) => 0,
    };
    if let Some(extra) = tokens.next() {
        return Err(format!("unexpected token `{extra}`"));
    }

    Ok(Some(Access {
        kind,
        address,
        value,
    }))
}

/// Parses a whole trace.
pub fn parse_trace(text: &str) -> Result<Vec<Access>, TraceError> {
    let mut accesses = Vec::new();
    for (i, raw) in text.lines().enumerate() {
        match parse_line(raw) {
            Ok(Some(access)) => accesses.push(access),
            Ok(None) => {}
            Err(reason) => {
                return Err(TraceError::Parse {
                    line: i + 1,
                    content: raw.to_string(),
                    reason,
                });
            }
        }
    }
    Ok(accesses)
}

/// Reads and parses a trace file.
pub fn load_trace(path: impl AsRef<Path>) -> Result<Vec<Access>, TraceError> {
    let text = fs::read_to_string(path)?;
    parse_trace(&text)
}
