//! Binary command opcodes.
//!
//! A binary command stores its opcode in the first payload byte and the
//! argument text right after it.

use serde::{Deserialize, Serialize};

/// Operation requested from the remote module.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum Opcode {
    /// Run calculator code, discarding any result.
    ExecuteCalculatorCode = 0,
    /// Read a named variable, answered with an `f64`.
    GetNamedVariable = 1,
}

impl Opcode {
    /// Wire byte for this opcode.
    #[must_use]
    pub fn as_byte(self) -> u8 {
        self as u8
    }

    /// Parse an opcode byte. Unknown bytes yield `None`.
    #[must_use]
    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            0 => Some(Self::ExecuteCalculatorCode),
            1 => Some(Self::GetNamedVariable),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_bytes() {
        assert_eq!(Opcode::from_byte(0), Some(Opcode::ExecuteCalculatorCode));
        assert_eq!(Opcode::from_byte(1), Some(Opcode::GetNamedVariable));
        assert_eq!(Opcode::GetNamedVariable.as_byte(), 1);
    }

    #[test]
    fn test_unknown_byte() {
        assert_eq!(Opcode::from_byte(0x7f), None);
    }
}
