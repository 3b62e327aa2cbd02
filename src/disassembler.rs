//! walking a buffer of code an instruction at a time.

use alloc::string::{String, ToString};
use core::fmt;

use yaxpeax_arch::{Arch, Decoder, Reader, U8Reader};

use crate::{InstDecoder, Instruction, NS32000};

/// one decoded instruction and the address it was decoded at.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Line {
    address: u32,
    instruction: Instruction,
}

impl Line {
    pub fn address(&self) -> u32 {
        self.address
    }

    pub fn instruction(&self) -> &Instruction {
        &self.instruction
    }
}

impl fmt::Display for Line {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{:08x}\t{}", self.address, self.instruction)
    }
}

/// an iterator over the instructions in a buffer.
///
/// decoding never stops early: bytes that do not form an instruction, including a truncated
/// instruction at the end of the buffer, are yielded as `???` lines covering the bytes that were
/// read. every line advances by at least one byte.
#[derive(Debug, Clone)]
pub struct Disassembler<'a> {
    decoder: InstDecoder,
    data: &'a [u8],
    offset: usize,
    base: u32,
}

impl<'a> Disassembler<'a> {
    /// disassemble `data` as if it were loaded at address zero.
    pub fn new(data: &'a [u8]) -> Disassembler<'a> {
        Disassembler::with_base(data, 0)
    }

    /// disassemble `data` as if it were loaded at `base`.
    pub fn with_base(data: &'a [u8], base: u32) -> Disassembler<'a> {
        Disassembler {
            decoder: InstDecoder::default(),
            data,
            offset: 0,
            base,
        }
    }

    /// use `decoder` for the instructions decoded from here on.
    ///
    /// decode errors, including `Undefined` from a strict decoder, are still yielded as `???`
    /// lines.
    pub fn with_decoder(mut self, decoder: InstDecoder) -> Disassembler<'a> {
        self.decoder = decoder;
        self
    }

    /// the offset into the buffer of the next instruction to decode.
    pub fn offset(&self) -> usize {
        self.offset
    }
}

impl<'a> Iterator for Disassembler<'a> {
    type Item = Line;

    fn next(&mut self) -> Option<Line> {
        let rest = self.data.get(self.offset..).filter(|rest| !rest.is_empty())?;

        let mut reader = U8Reader::new(rest);
        let mut instruction = Instruction::default();
        let instruction = match self.decoder.decode_into(&mut instruction, &mut reader) {
            Ok(()) => instruction,
            Err(_) => {
                let read = Reader::<<NS32000 as Arch>::Address, <NS32000 as Arch>::Word>::total_offset(&mut reader);
                Instruction::undefined((read as u8).max(1))
            }
        };

        let line = Line {
            address: self.base.wrapping_add(self.offset as u32),
            instruction,
        };
        self.offset += line.instruction.len() as usize;
        Some(line)
    }
}

/// disassemble the first instruction of `data`, returning its length and text.
///
/// an empty buffer yields `(0, "")`.
///
/// ```
/// use yaxpeax_ns32k::disassemble;
///
/// assert_eq!(disassemble(&[0x27, 0xc0, 0x08]), (3, "addr\t8(fp),r0".to_string()));
/// assert_eq!(disassemble(&[]), (0, String::new()));
/// ```
pub fn disassemble(data: &[u8]) -> (usize, String) {
    match Disassembler::new(data).next() {
        Some(line) => (line.instruction.len() as usize, line.instruction.to_string()),
        None => (0, String::new()),
    }
}
