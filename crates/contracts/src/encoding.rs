//! ByteOrder - binary number encoding selector
//!
//! The three encodings found in legacy motion-capture files. Readers pick one
//! from the file header; there is no auto-detection below that level.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Binary number encoding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ByteOrder {
    /// DEC VAX: word-swapped integers, F/G-floating reals
    VaxLittleEndian,
    /// Intel and most modern hosts
    IeeeLittleEndian,
    /// MIPS / SGI / PowerPC
    IeeeBigEndian,
}

impl ByteOrder {
    /// All encodings, in processor-id order
    pub const ALL: [ByteOrder; 3] = [
        ByteOrder::IeeeLittleEndian,
        ByteOrder::VaxLittleEndian,
        ByteOrder::IeeeBigEndian,
    ];

    /// Encoding of the host running this code
    pub const fn native() -> Self {
        if cfg!(target_endian = "big") {
            ByteOrder::IeeeBigEndian
        } else {
            ByteOrder::IeeeLittleEndian
        }
    }

    /// Processor byte written in the C3D parameter section header
    pub const fn processor_id(self) -> u8 {
        match self {
            ByteOrder::IeeeLittleEndian => 84,
            ByteOrder::VaxLittleEndian => 85,
            ByteOrder::IeeeBigEndian => 86,
        }
    }

    /// Inverse of [`ByteOrder::processor_id`]
    pub const fn from_processor_id(id: u8) -> Option<Self> {
        match id {
            84 => Some(ByteOrder::IeeeLittleEndian),
            85 => Some(ByteOrder::VaxLittleEndian),
            86 => Some(ByteOrder::IeeeBigEndian),
            _ => None,
        }
    }

    /// Stable name, also used as the option registry choice
    pub const fn as_str(self) -> &'static str {
        match self {
            ByteOrder::VaxLittleEndian => "VaxLittleEndian",
            ByteOrder::IeeeLittleEndian => "IeeeLittleEndian",
            ByteOrder::IeeeBigEndian => "IeeeBigEndian",
        }
    }
}

impl Default for ByteOrder {
    fn default() -> Self {
        Self::native()
    }
}

impl fmt::Display for ByteOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ByteOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ByteOrder::ALL
            .into_iter()
            .find(|order| order.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown byte order: {s}"))
    }
}
