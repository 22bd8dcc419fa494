/**
 * Pack Bit Streams
 *
 * Bit-level writer and reader used by the pack codec. Bits are written most
 * significant first; strings are byte aligned.
 */

use crate::error::PackError;

/// Collects bits into bytes.
#[derive(Debug, Default)]
pub struct PackWriter {
    bytes: Vec<u8>,
    current: u8,
    used: u8,
}

impl PackWriter {
    pub fn new() -> Self {
        PackWriter::default()
    }

    pub fn write_bool(&mut self, value: bool) {
        self.current |= u8::from(value) << (7 - self.used);
        self.used += 1;
        if self.used == 8 {
            self.bytes.push(self.current);
            self.current = 0;
            self.used = 0;
        }
    }

    /// Writes the lowest `width` bits of `value`.
    pub fn write_bits(&mut self, value: u64, width: u8) {
        for bit in (0..width).rev() {
            self.write_bool((value >> bit) & 1 == 1);
        }
    }

    /// Writes an unsigned value: `0vvv` for 0..7, `10vvv` for 8..15, otherwise
    /// `11` followed by a variable length integer.
    pub fn write_small_var(&mut self, value: usize) {
        match value {
            0..=7 => self.write_bits(value as u64, 4),
            8..=15 => self.write_bits(0b10_000 | (value as u64 - 8), 5),
            _ => {
                self.write_bits(0b11, 2);
                self.write_long_var(value as i64);
            }
        }
    }

    /// Writes a signed value with a prefix selecting the value range:
    ///
    /// | prefix   | range                      | bits |
    /// |----------|----------------------------|------|
    /// | `00`     | 0..=7                      | 3    |
    /// | `01`     | -8..=-1                    | 3    |
    /// | `100`    | 8..=135                    | 7    |
    /// | `101`    | -1032..=-9                 | 10   |
    /// | `110`    | 136..=1159                 | 10   |
    /// | `1110`   | 1160..=132231              | 17   |
    /// | `11110`  | 132232..=i64::MAX          | 63   |
    /// | `111110` | -132104..=-1033            | 17   |
    /// | `111111` | i64::MIN..=-132105         | 63   |
    pub fn write_long_var(&mut self, value: i64) {
        match value {
            0..=7 => self.write_bits(value as u64, 5),
            8..=135 => {
                self.write_bits(0b100, 3);
                self.write_bits((value - 8) as u64, 7);
            }
            136..=1159 => {
                self.write_bits(0b110, 3);
                self.write_bits((value - 136) as u64, 10);
            }
            1160..=132_231 => {
                self.write_bits(0b1110, 4);
                self.write_bits((value - 1160) as u64, 17);
            }
            132_232..=i64::MAX => {
                self.write_bits(0b11110, 5);
                self.write_bits((value - 132_232) as u64, 63);
            }
            -8..=-1 => {
                self.write_bits(0b01, 2);
                self.write_bits((value + 8) as u64, 3);
            }
            -1032..=-9 => {
                self.write_bits(0b101, 3);
                self.write_bits((value + 1032) as u64, 10);
            }
            -132_104..=-1033 => {
                self.write_bits(0b111110, 6);
                self.write_bits((value + 132_104) as u64, 17);
            }
            _ => {
                self.write_bits(0b111111, 6);
                self.write_bits((-(value + 132_105)) as u64, 63);
            }
        }
    }

    /// Writes an optional string: `00` when absent, then the UTF-8 length as
    /// `01` + 4 bits, `10` + 8 bits or `11` + variable length integer,
    /// followed by the byte aligned UTF-8 bytes.
    pub fn write_string(&mut self, value: Option<&str>) {
        let Some(s) = value else {
            self.write_bits(0b00, 2);
            return;
        };

        let len = s.len();
        if len < 16 {
            self.write_bits(0b01_0000 | len as u64, 6);
        } else if len < 256 {
            self.write_bits(0b10_0000_0000 | len as u64, 10);
        } else {
            self.write_bits(0b11, 2);
            self.write_long_var(len as i64);
        }

        if len > 0 {
            self.align();
            self.bytes.extend_from_slice(s.as_bytes());
        }
    }

    fn align(&mut self) {
        if self.used > 0 {
            self.bytes.push(self.current);
            self.current = 0;
            self.used = 0;
        }
    }

    /// The written bytes; a partial last byte is padded with zero bits.
    pub fn finish(mut self) -> Vec<u8> {
        self.align();
        self.bytes
    }
}

/// Reads bits written by [`PackWriter`].
#[derive(Debug)]
pub struct PackReader<'a> {
    bytes: &'a [u8],
    /// Position in bits
    position: usize,
}

impl<'a> PackReader<'a> {
    pub fn new(bytes: &'a [u8]) -> Self {
        PackReader { bytes, position: 0 }
    }

    pub fn read_bool(&mut self) -> Result<bool, PackError> {
        let byte = self
            .bytes
            .get(self.position / 8)
            .ok_or(PackError::UnexpectedEof)?;
        let bit = (byte >> (7 - self.position % 8)) & 1;
        self.position += 1;
        Ok(bit == 1)
    }

    pub fn read_bits(&mut self, width: u8) -> Result<u64, PackError> {
        let mut value = 0u64;
        for _ in 0..width {
            value = (value << 1) | u64::from(self.read_bool()?);
        }
        Ok(value)
    }

    /// Reads a value of at most 8 bits, e.g. a tag.
    pub fn read_small(&mut self, width: u8) -> Result<u8, PackError> {
        debug_assert!(width <= 8);
        Ok(self.read_bits(width)? as u8)
    }

    pub fn read_small_var(&mut self) -> Result<usize, PackError> {
        if !self.read_bool()? {
            return Ok(self.read_bits(3)? as usize);
        }
        if !self.read_bool()? {
            return Ok(self.read_bits(3)? as usize + 8);
        }

        let value = self.read_long_var()?;
        usize::try_from(value).map_err(|_| PackError::Inconsistent(format!("negative count {value}")))
    }

    pub fn read_long_var(&mut self) -> Result<i64, PackError> {
        // 0 -> 0x
        if !self.read_bool()? {
            if !self.read_bool()? {
                return Ok(self.read_bits(3)? as i64);
            }
            return Ok(self.read_bits(3)? as i64 - 8);
        }

        // 1 -> 10x
        if !self.read_bool()? {
            if !self.read_bool()? {
                return Ok(self.read_bits(7)? as i64 + 8);
            }
            return Ok(self.read_bits(10)? as i64 - 1032);
        }

        // 11 -> 110
        if !self.read_bool()? {
            return Ok(self.read_bits(10)? as i64 + 136);
        }
        if !self.read_bool()? {
            return Ok(self.read_bits(17)? as i64 + 1160);
        }
        if !self.read_bool()? {
            return (self.read_bits(63)? as i64)
                .checked_add(132_232)
                .ok_or_else(|| PackError::Inconsistent("integer out of range".to_string()));
        }
        if !self.read_bool()? {
            return Ok(self.read_bits(17)? as i64 - 132_104);
        }

        (self.read_bits(63)? as i64)
            .checked_neg()
            .and_then(|v| v.checked_sub(132_105))
            .ok_or_else(|| PackError::Inconsistent("integer out of range".to_string()))
    }

    pub fn read_string(&mut self) -> Result<Option<String>, PackError> {
        let len = match self.read_bits(2)? {
            0b00 => return Ok(None),
            0b01 => self.read_bits(4)? as usize,
            0b10 => self.read_bits(8)? as usize,
            _ => {
                let len = self.read_long_var()?;
                usize::try_from(len).map_err(|_| PackError::Inconsistent(format!("negative string length {len}")))?
            }
        };

        if len == 0 {
            return Ok(Some(String::new()));
        }

        self.align();
        let start = self.position / 8;
        let bytes = start
            .checked_add(len)
            .and_then(|end| self.bytes.get(start..end))
            .ok_or(PackError::UnexpectedEof)?;
        self.position += len * 8;

        Ok(Some(String::from_utf8(bytes.to_vec())?))
    }

    /// Reads a string that must be present.
    pub fn read_required_string(&mut self, what: &str) -> Result<String, PackError> {
        self.read_string()?
            .ok_or_else(|| PackError::Inconsistent(format!("missing {what}")))
    }

    fn align(&mut self) {
        self.position = self.position.div_ceil(8) * 8;
    }
}
