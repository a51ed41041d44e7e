//! Byte-addressed, word-aligned main memory.

use byteorder::{ByteOrder, LittleEndian};

use crate::constants::MEMORY_BYTES;

/// 64 KiB of byte-addressable storage, accessed only through word-aligned
/// loads and stores.
#[derive(Clone)]
pub struct Memory {
    bytes: Vec<u8>,
}

impl Memory {
    pub fn new() -> Memory {
        Memory {
            bytes: vec![0; MEMORY_BYTES],
        }
    }

    pub fn clear(&mut self) {
        self.bytes.iter_mut().for_each(|b| *b = 0);
    }

    fn word_fits(&self, address: u16) -> bool {
        (address as usize) + 1 < self.bytes.len()
    }

    /// Reads the 16-bit word whose low byte is at `address`. Returns `None`
    /// if the two-byte span does not fit in memory (unreachable for a full
    /// 64 KiB image and a `u16` address, kept for parity with `write_word`).
    pub fn read_word(&self, address: u16) -> Option<u16> {
        if self.word_fits(address) {
            let i = address as usize;
            Some(LittleEndian::read_u16(&self.bytes[i..i + 2]))
        } else {
            None
        }
    }

    pub fn write_word(&mut self, address: u16, value: u16) -> bool {
        if self.word_fits(address) {
            let i = address as usize;
            LittleEndian::write_u16(&mut self.bytes[i..i + 2], value);
            true
        } else {
            false
        }
    }

    /// Copies `words` into memory as little-endian bytes starting at
    /// `start_byte_addr`. Returns `false` without modifying memory if the
    /// program does not fit.
    pub fn load_words(&mut self, start_byte_addr: u16, words: &[u16]) -> bool {
        let start = start_byte_addr as usize;
        let len_bytes = words.len() * 2;
        if start + len_bytes > self.bytes.len() {
            return false;
        }
        for (i, word) in words.iter().enumerate() {
            let offset = start + i * 2;
            LittleEndian::write_u16(&mut self.bytes[offset..offset + 2], *word);
        }
        true
    }
}

impl Default for Memory {
    fn default() -> Memory {
        Memory::new()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn round_trips_a_word() {
        let mut mem = Memory::new();
        assert!(mem.write_word(10, 0xBEEF));
        assert_eq!(mem.read_word(10), Some(0xBEEF));
    }

    #[test]
    fn rejects_out_of_range_word() {
        let mem = Memory::new();
        assert_eq!(mem.read_word(0xFFFF), None);
    }

    #[test]
    fn load_words_is_little_endian() {
        let mut mem = Memory::new();
        assert!(mem.load_words(0, &[0xC12A]));
        assert_eq!(mem.read_word(0), Some(0xC12A));
    }

    #[test]
    fn load_words_refuses_overflow() {
        let mut mem = Memory::new();
        assert!(!mem.load_words(0xFFFE, &[0x0001, 0x0002]));
    }
}
