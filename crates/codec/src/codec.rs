//! ByteOrderCodec - fixed-width numbers over a BinaryStream
//!
//! Byte layouts per encoding:
//! - IEEE LE / BE: plain byte order, IEEE-754 bit patterns unchanged.
//! - VAX: 16-bit values as IEEE LE; wider values word-swapped
//!   (`[2,3,0,1]` and `[6,7,4,5,2,3,0,1]` relative to LE). Reals are
//!   word-swapped too. F-floating (f32): the byte carrying the exponent LSB
//!   is adjusted by -1 on read / +1 on write unless it is zero.
//!   G-floating (f64): the 11-bit exponent is 2 above IEEE; exponents of 2
//!   or less flush to zero instead of wrapping.

use contracts::ByteOrder;

use crate::error::{Result, StreamError};
use crate::stream::{BinaryStream, SeekOrigin};

/// Reverse the order of the 16-bit words, keeping bytes within a word.
/// Identity for 2 bytes, and its own inverse.
fn swap_words<const N: usize>(bytes: [u8; N]) -> [u8; N] {
    let mut out = [0u8; N];
    for word in 0..N / 2 {
        let src = N - 2 * (word + 1);
        out[2 * word] = bytes[src];
        out[2 * word + 1] = bytes[src + 1];
    }
    out
}

/// Generates the read/write pair of one integer type
macro_rules! integer_codec {
    ($read:ident, $write:ident, $ty:ty, $n:literal) => {
        pub fn $read<S: BinaryStream + ?Sized>(&self, stream: &mut S) -> Result<$ty> {
            let bytes: [u8; $n] = self.read_array(stream)?;
            Ok(match self.order {
                ByteOrder::IeeeLittleEndian => <$ty>::from_le_bytes(bytes),
                ByteOrder::IeeeBigEndian => <$ty>::from_be_bytes(bytes),
                ByteOrder::VaxLittleEndian => <$ty>::from_le_bytes(swap_words(bytes)),
            })
        }

        pub fn $write<S: BinaryStream + ?Sized>(&self, value: $ty, stream: &mut S) -> Result<()> {
            let bytes = match self.order {
                ByteOrder::IeeeLittleEndian => value.to_le_bytes(),
                ByteOrder::IeeeBigEndian => value.to_be_bytes(),
                ByteOrder::VaxLittleEndian => swap_words(value.to_le_bytes()),
            };
            self.write_all(stream, &bytes)
        }
    };
}

/// Stateless codec bound to one encoding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ByteOrderCodec {
    order: ByteOrder,
}

impl ByteOrderCodec {
    pub const fn new(order: ByteOrder) -> Self {
        Self { order }
    }

    /// Codec for the host encoding
    pub const fn native() -> Self {
        Self::new(ByteOrder::native())
    }

    pub const fn order(&self) -> ByteOrder {
        self.order
    }

    integer_codec!(read_i16, write_i16, i16, 2);
    integer_codec!(read_u16, write_u16, u16, 2);
    integer_codec!(read_i32, write_i32, i32, 4);
    integer_codec!(read_u32, write_u32, u32, 4);
    integer_codec!(read_i64, write_i64, i64, 8);
    integer_codec!(read_u64, write_u64, u64, 8);

    pub fn read_f32<S: BinaryStream + ?Sized>(&self, stream: &mut S) -> Result<f32> {
        let bytes: [u8; 4] = self.read_array(stream)?;
        Ok(match self.order {
            ByteOrder::IeeeLittleEndian => f32::from_le_bytes(bytes),
            ByteOrder::IeeeBigEndian => f32::from_be_bytes(bytes),
            ByteOrder::VaxLittleEndian => {
                let mut le = swap_words(bytes);
                le[3] = exponent_from_vax(le[3]);
                f32::from_le_bytes(le)
            }
        })
    }

    pub fn read_f64<S: BinaryStream + ?Sized>(&self, stream: &mut S) -> Result<f64> {
        let bytes: [u8; 8] = self.read_array(stream)?;
        Ok(match self.order {
            ByteOrder::IeeeLittleEndian => f64::from_le_bytes(bytes),
            ByteOrder::IeeeBigEndian => f64::from_be_bytes(bytes),
            ByteOrder::VaxLittleEndian => {
                let mut le = swap_words(bytes);
                let word = g_float_from_vax(u16::from_le_bytes([le[6], le[7]]));
                le[6..].copy_from_slice(&word.to_le_bytes());
                if word & 0x7FF0 == 0 {
                    le[..6].fill(0);
                }
                f64::from_le_bytes(le)
            }
        })
    }

    /// Write a real. Under VAX, values whose high byte is 0xFF
    /// (NaN, -inf, huge negatives) have no F-floating form and do not
    /// read back.
    pub fn write_f32<S: BinaryStream + ?Sized>(&self, value: f32, stream: &mut S) -> Result<()> {
        let bytes = match self.order {
            ByteOrder::IeeeLittleEndian => value.to_le_bytes(),
            ByteOrder::IeeeBigEndian => value.to_be_bytes(),
            ByteOrder::VaxLittleEndian => {
                let mut le = value.to_le_bytes();
                le[3] = exponent_to_vax(le[3]);
                swap_words(le)
            }
        };
        self.write_all(stream, &bytes)
    }

    pub fn read_u8<S: BinaryStream + ?Sized>(&self, stream: &mut S) -> Result<u8> {
        let [byte] = self.read_array::<1, S>(stream)?;
        Ok(byte)
    }

    pub fn read_i8<S: BinaryStream + ?Sized>(&self, stream: &mut S) -> Result<i8> {
        Ok(self.read_u8(stream)? as i8)
    }

    pub fn write_u8<S: BinaryStream + ?Sized>(&self, value: u8, stream: &mut S) -> Result<()> {
        self.write_all(stream, &[value])
    }

    pub fn write_i8<S: BinaryStream + ?Sized>(&self, value: i8, stream: &mut S) -> Result<()> {
        self.write_all(stream, &[value as u8])
    }

    /// Read `len` bytes of text; invalid UTF-8 is replaced
    pub fn read_string<S: BinaryStream + ?Sized>(
        &self,
        stream: &mut S,
        len: usize,
    ) -> Result<String> {
        let mut buf = vec![0u8; len];
        self.read_exact(stream, &mut buf)?;
        Ok(String::from_utf8_lossy(&buf).into_owned())
    }

    pub fn write_string<S: BinaryStream + ?Sized>(&self, value: &str, stream: &mut S) -> Result<()> {
        self.write_all(stream, value.as_bytes())
    }

    fn read_array<const N: usize, S: BinaryStream + ?Sized>(
        &self,
        stream: &mut S,
    ) -> Result<[u8; N]> {
        let mut buf = [0u8; N];
        self.read_exact(stream, &mut buf)?;
        Ok(buf)
    }

    /// Fill `buf` or fail with the cursor back at its starting position
    fn read_exact<S: BinaryStream + ?Sized>(&self, stream: &mut S, buf: &mut [u8]) -> Result<()> {
        if !stream.is_good() {
            return Err(StreamError::Closed);
        }
        let start = stream.tell();
        let available = stream.read(buf)?;
        if available < buf.len() {
            stream.seek(start as i64, SeekOrigin::Begin)?;
            return Err(StreamError::Read {
                requested: buf.len(),
                available,
            });
        }
        Ok(())
    }

    /// Write all of `bytes` or fail with the cursor back at its starting position
    fn write_all<S: BinaryStream + ?Sized>(&self, stream: &mut S, bytes: &[u8]) -> Result<()> {
        if !stream.is_good() {
            return Err(StreamError::Closed);
        }
        let start = stream.tell();
        let written = stream.write(bytes)?;
        if written < bytes.len() {
            stream.seek(start as i64, SeekOrigin::Begin)?;
            return Err(StreamError::Write {
                requested: bytes.len(),
                written,
            });
        }
        Ok(())
    }
}

fn exponent_from_vax(byte: u8) -> u8 {
    if byte != 0 {
        byte.wrapping_sub(1)
    } else {
        0
    }
}

/// Rebias the sign/exponent word of a G_float. Biased exponents up to 2
/// have no normal IEEE counterpart and become a signed zero.
fn g_float_from_vax(word: u16) -> u16 {
    let exponent = (word >> 4) & 0x7FF;
    if exponent <= 2 {
        return word & 0x8000;
    }
    (word & 0x800F) | ((exponent - 2) << 4)
}

fn exponent_to_vax(byte: u8) -> u8 {
    if byte != 0 {
        byte.wrapping_add(1)
    } else {
        0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stream::MemoryStream;

    const VAX: ByteOrderCodec = ByteOrderCodec::new(ByteOrder::VaxLittleEndian);
    const LE: ByteOrderCodec = ByteOrderCodec::new(ByteOrder::IeeeLittleEndian);
    const BE: ByteOrderCodec = ByteOrderCodec::new(ByteOrder::IeeeBigEndian);

    fn rewind(stream: &mut MemoryStream) {
        stream.seek(0, SeekOrigin::Begin).unwrap();
    }

    #[test]
    fn test_swap_words_is_involution() {
        let bytes = [0u8, 1, 2, 3, 4, 5, 6, 7];
        assert_eq!(swap_words(bytes), [6, 7, 4, 5, 2, 3, 0, 1]);
        assert_eq!(swap_words(swap_words(bytes)), bytes);
        assert_eq!(swap_words([0u8, 1, 2, 3]), [2, 3, 0, 1]);
        assert_eq!(swap_words([0u8, 1]), [0, 1]);
    }

    #[test]
    fn test_minus_one_round_trip_big_endian_and_vax() {
        for codec in [BE, VAX] {
            let mut stream = MemoryStream::new();
            codec.write_i32(-1, &mut stream).unwrap();
            rewind(&mut stream);
            assert_eq!(codec.read_i32(&mut stream).unwrap(), -1);
            assert!(stream.at_end());
        }
    }

    #[test]
    fn test_integer_layouts() {
        let mut stream = MemoryStream::new();
        BE.write_u32(0x0102_0304, &mut stream).unwrap();
        LE.write_u32(0x0102_0304, &mut stream).unwrap();
        VAX.write_u32(0x0102_0304, &mut stream).unwrap();
        VAX.write_u16(0x0102, &mut stream).unwrap();
        assert_eq!(
            stream.as_slice(),
            &[1, 2, 3, 4, 4, 3, 2, 1, 2, 1, 4, 3, 2, 1]
        );
    }

    #[test]
    fn test_integer_round_trips() {
        for codec in [VAX, LE, BE] {
            let mut stream = MemoryStream::new();
            codec.write_i16(-12345, &mut stream).unwrap();
            codec.write_u16(54321, &mut stream).unwrap();
            codec.write_i32(i32::MIN, &mut stream).unwrap();
            codec.write_u32(0xDEAD_BEEF, &mut stream).unwrap();
            codec.write_i64(-9_876_543_210, &mut stream).unwrap();
            codec.write_u64(u64::MAX - 7, &mut stream).unwrap();
            assert_eq!(stream.len(), 2 + 2 + 4 + 4 + 8 + 8);

            rewind(&mut stream);
            assert_eq!(codec.read_i16(&mut stream).unwrap(), -12345);
            assert_eq!(codec.read_u16(&mut stream).unwrap(), 54321);
            assert_eq!(codec.read_i32(&mut stream).unwrap(), i32::MIN);
            assert_eq!(codec.read_u32(&mut stream).unwrap(), 0xDEAD_BEEF);
            assert_eq!(codec.read_i64(&mut stream).unwrap(), -9_876_543_210);
            assert_eq!(codec.read_u64(&mut stream).unwrap(), u64::MAX - 7);
        }
    }

    #[test]
    fn test_f32_round_trips_bit_exact() {
        let values = [0.0f32, 1.0, -1.0, 0.1, -273.15, 1.5e10, 3.0e-30];
        for codec in [VAX, LE, BE] {
            let mut stream = MemoryStream::new();
            for v in values {
                codec.write_f32(v, &mut stream).unwrap();
            }
            rewind(&mut stream);
            for v in values {
                let back = codec.read_f32(&mut stream).unwrap();
                assert_eq!(back.to_bits(), v.to_bits(), "{:?} {v}", codec.order());
            }
        }
    }

    #[test]
    fn test_vax_one_layout() {
        let mut stream = MemoryStream::new();
        VAX.write_f32(1.0, &mut stream).unwrap();
        assert_eq!(stream.as_slice(), &[0x80, 0x40, 0x00, 0x00]);
    }

    #[test]
    fn test_vax_zero_exponent_byte_not_wrapped() {
        // high byte 0x00: tiny positive value, exponent byte stays 0 both ways
        let tiny = f32::from_le_bytes([0x01, 0x02, 0x03, 0x00]);
        let mut stream = MemoryStream::new();
        VAX.write_f32(tiny, &mut stream).unwrap();
        assert_eq!(stream.as_slice(), &[0x03, 0x00, 0x01, 0x02]);

        rewind(&mut stream);
        assert_eq!(VAX.read_f32(&mut stream).unwrap().to_bits(), tiny.to_bits());

        // raw zero exponent byte must decode without wrapping to 0xFF
        let mut raw = MemoryStream::from_bytes(vec![0x00u8, 0x00, 0x00, 0x00]);
        assert_eq!(VAX.read_f32(&mut raw).unwrap(), 0.0);
    }

    #[test]
    fn test_vax_read_f64() {
        // DEC G_float: sign/exponent/high mantissa in the first word
        let raw = vec![
            0x10u8, 0x40, 0, 0, 0, 0, 0, 0, // 1.0
            0x24, 0xC0, 0, 0, 0, 0, 0, 0, // -2.5
            0x00, 0x00, 0, 0, 0, 0, 0, 0, // 0.0
            0x10, 0x00, 0x11, 0x22, 0x33, 0x44, 0x55, 0x66, // biased exponent 1
        ];
        let mut stream = MemoryStream::from_bytes(raw);
        assert_eq!(VAX.read_f64(&mut stream).unwrap(), 1.0);
        assert_eq!(VAX.read_f64(&mut stream).unwrap(), -2.5);
        assert_eq!(VAX.read_f64(&mut stream).unwrap().to_bits(), 0);
        assert_eq!(VAX.read_f64(&mut stream).unwrap().to_bits(), 0);
        assert!(stream.at_end());

        let mut stream = MemoryStream::from_bytes(2.5f64.to_be_bytes().to_vec());
        assert_eq!(BE.read_f64(&mut stream).unwrap(), 2.5);
    }

    #[test]
    fn test_vax_bytes_differ_under_ieee() {
        let mut stream = MemoryStream::new();
        VAX.write_i32(0x0102_0304, &mut stream).unwrap();
        VAX.write_f32(1.0, &mut stream).unwrap();

        rewind(&mut stream);
        assert_ne!(LE.read_i32(&mut stream).unwrap(), 0x0102_0304);
        assert_ne!(LE.read_f32(&mut stream).unwrap(), 1.0);
    }

    #[test]
    fn test_truncated_read_keeps_cursor() {
        let mut stream = MemoryStream::from_bytes(vec![0xAAu8, 0xBB, 0xCC]);
        stream.seek(2, SeekOrigin::Begin).unwrap();

        let err = LE.read_i16(&mut stream).unwrap_err();
        assert!(matches!(
            err,
            StreamError::Read {
                requested: 2,
                available: 1
            }
        ));
        assert_eq!(stream.tell(), 2);
        assert_eq!(LE.read_u8(&mut stream).unwrap(), 0xCC);
    }

    #[test]
    fn test_short_write_rewinds_cursor() {
        let mut stream = MemoryStream::with_capacity_limit(6);
        BE.write_u32(7, &mut stream).unwrap();

        let err = BE.write_u32(0xAABB_CCDD, &mut stream).unwrap_err();
        assert!(matches!(
            err,
            StreamError::Write {
                requested: 4,
                written: 0
            }
        ));
        assert_eq!(stream.tell(), 4);
        assert_eq!(stream.len(), 4);
        assert_eq!(stream.as_slice(), &[0, 0, 0, 7]);
        BE.write_u16(9, &mut stream).unwrap();
        assert_eq!(stream.as_slice(), &[0, 0, 0, 7, 0, 9]);
    }

    #[test]
    fn test_closed_stream_rejected() {
        let mut stream = MemoryStream::from_bytes(vec![0u8; 8]);
        stream.close();
        assert!(matches!(LE.read_u32(&mut stream), Err(StreamError::Closed)));
        assert!(matches!(LE.write_f32(1.0, &mut stream), Err(StreamError::Closed)));
    }

    #[test]
    fn test_bytes_and_strings() {
        let mut stream = MemoryStream::new();
        VAX.write_i8(-3, &mut stream).unwrap();
        VAX.write_string("POINT", &mut stream).unwrap();
        rewind(&mut stream);
        assert_eq!(VAX.read_i8(&mut stream).unwrap(), -3);
        assert_eq!(VAX.read_string(&mut stream, 5).unwrap(), "POINT");
    }
}
