//! # Codec
//!
//! Bit-exact binary primitives for legacy motion-capture files.
//!
//! Responsibilities:
//! - `BinaryStream` contract with memory and file backends
//! - `ByteOrderCodec`: fixed-width numbers under VAX, IEEE LE and IEEE BE
//! - Frame data block encoding of a synchronized `Acquisition`
//!
//! ## Usage Example
//!
//! ```
//! use codec::{BinaryStream, ByteOrderCodec, MemoryStream, SeekOrigin};
//! use contracts::ByteOrder;
//!
//! let codec = ByteOrderCodec::new(ByteOrder::VaxLittleEndian);
//! let mut stream = MemoryStream::new();
//! codec.write_f32(1.0, &mut stream).unwrap();
//! stream.seek(0, SeekOrigin::Begin).unwrap();
//! assert_eq!(codec.read_f32(&mut stream).unwrap(), 1.0);
//! ```

mod codec;
mod error;
pub mod frames;
mod stream;

pub use codec::ByteOrderCodec;
pub use error::{Result, StreamError};
pub use frames::{read_frames, write_frames, DataStorage, FrameLayout, FrameOptions};
pub use stream::{BinaryStream, FileMode, FileStream, MemoryStream, SeekOrigin};
