//! displacement, immediate, and general operand decoding.

use yaxpeax_arch::{Arch, Reader, U8Reader};

use crate::{AddressingMode, DecodeError, Instruction, NS32000, Operand, OperandLength, Register, Scale, ScaledIndex};

/// sign-extend the low `bits` bits of `value`.
fn sign_extend(value: u32, bits: u32) -> i32 {
    let shift = 32 - bits;
    ((value << shift) as i32) >> shift
}

/// read one displacement, returning its value and how many bytes it occupied.
///
/// the top bits of the first byte select the size:
/// ```text
/// 0xxxxxxx                             7-bit signed, one byte
/// 10xxxxxx xxxxxxxx                    14-bit signed, two bytes
/// 11xxxxxx xxxxxxxx xxxxxxxx xxxxxxxx  30-bit signed, four bytes
/// ```
/// with the remaining bits most significant byte first.
pub(crate) fn read_displacement<T: Reader<<NS32000 as Arch>::Address, <NS32000 as Arch>::Word>>(words: &mut T) -> Result<(i32, u8), DecodeError> {
    let b0 = words.next()?;

    if b0 & 0x80 == 0 {
        Ok((sign_extend((b0 & 0x7f) as u32, 7), 1))
    } else if b0 & 0x40 == 0 {
        let b1 = words.next()?;
        let value = (((b0 & 0x3f) as u32) << 8) | b1 as u32;
        Ok((sign_extend(value, 14), 2))
    } else {
        let mut rest = [0u8; 3];
        words.next_n(&mut rest)?;
        let value = u32::from_be_bytes([b0 & 0x3f, rest[0], rest[1], rest[2]]);
        Ok((sign_extend(value, 30), 4))
    }
}

fn read_disp<T: Reader<<NS32000 as Arch>::Address, <NS32000 as Arch>::Word>>(words: &mut T) -> Result<i32, DecodeError> {
    read_displacement(words).map(|(value, _)| value)
}

/// read a big-endian immediate of `length`, sign-extended from the top bit of its first byte.
fn read_immediate<T: Reader<<NS32000 as Arch>::Address, <NS32000 as Arch>::Word>>(words: &mut T, length: OperandLength) -> Result<i32, DecodeError> {
    let mut value: u32 = 0;
    for i in 0..length.bytes() {
        let b = words.next()?;
        if i == 0 && b & 0x80 != 0 {
            value = 0xffff_ffff;
        }
        value = (value << 8) | b as u32;
    }
    Ok(value as i32)
}

/// decode the operand for a five-bit general addressing mode.
///
/// the scaled-index modes `28` through `31` are resolved by [`read_index`] before this is called,
/// so here they (and the reserved mode `19`) are `Invalid`.
pub(crate) fn read_operand<T: Reader<<NS32000 as Arch>::Address, <NS32000 as Arch>::Word>>(words: &mut T, mode: u8, length: OperandLength) -> Result<Operand, DecodeError> {
    let operand = match mode {
        0..=7 => {
            Operand::register(AddressingMode::Register, Register::gpr(mode))
        }
        8..=15 => {
            let disp = read_disp(words)?;
            Operand::new(AddressingMode::RegisterRelative, Some(Register::gpr(mode)), disp, 0)
        }
        16..=18 => {
            let reg = [Register::FP, Register::SP, Register::SB][(mode - 16) as usize];
            let disp0 = read_disp(words)?;
            let disp1 = read_disp(words)?;
            Operand::new(AddressingMode::MemoryRelative, Some(reg), disp0, disp1)
        }
        20 => {
            Operand::value(AddressingMode::Immediate, read_immediate(words, length)?)
        }
        21 => {
            Operand::value(AddressingMode::Absolute, read_disp(words)?)
        }
        22 => {
            let disp0 = read_disp(words)?;
            let disp1 = read_disp(words)?;
            Operand::new(AddressingMode::External, None, disp0, disp1)
        }
        23 => {
            Operand::new(AddressingMode::TopOfStack, None, 0, 0)
        }
        24..=27 => {
            let reg = [Register::FP, Register::SP, Register::SB, Register::PC][(mode - 24) as usize];
            let disp = read_disp(words)?;
            Operand::new(AddressingMode::MemorySpace, Some(reg), disp, 0)
        }
        _ => {
            Operand::new(AddressingMode::Invalid, None, 0, 0)
        }
    };
    Ok(operand)
}

/// one general operand field of an instruction: its addressing mode and the length an immediate
/// in that position would have.
#[derive(Copy, Clone)]
pub(crate) struct GenField {
    pub(crate) mode: u8,
    pub(crate) length: OperandLength,
}

impl GenField {
    pub(crate) fn new(mode: u8, length: OperandLength) -> GenField {
        GenField { mode, length }
    }
}

/// the first general operand field, in the top five bits of the last header byte.
pub(crate) fn gen_a(last: u8) -> u8 {
    last >> 3
}

/// the second general operand field, split across the top two bits of the second-to-last header
/// byte and the low three bits of the last.
pub(crate) fn gen_b(prev: u8, last: u8) -> u8 {
    (prev >> 6) | ((last & 0b111) << 2)
}

/// the four-bit `short` field, split the same way as `gen_b` but one bit narrower.
pub(crate) fn short(prev: u8, last: u8) -> u8 {
    (prev >> 7) | ((last & 0b111) << 1)
}

/// read the index byte of a scaled-index field, if `mode` is one of the scaled-index modes.
///
/// returns the addressing mode of the operand proper (from the top five bits of the index byte)
/// and the index. a scaled-index mode inside an index byte cannot be indexed again and decodes as
/// `Invalid` in [`read_operand`].
fn read_index<T: Reader<<NS32000 as Arch>::Address, <NS32000 as Arch>::Word>>(words: &mut T, mode: u8) -> Result<(u8, Option<ScaledIndex>), DecodeError> {
    match Scale::from_mode(mode) {
        Some(scale) => {
            let index = words.next()?;
            Ok((index >> 3, Some(ScaledIndex { reg: Register::gpr(index), scale })))
        }
        None => Ok((mode, None)),
    }
}

/// decode up to two general operands into the next free operand slots of `inst`.
///
/// index bytes for scaled-index operands come first, in field order, followed by each operand's
/// displacements or immediate in field order.
pub(crate) fn read_general_operands<T: Reader<<NS32000 as Arch>::Address, <NS32000 as Arch>::Word>>(words: &mut T, inst: &mut Instruction, fields: &[GenField]) -> Result<(), DecodeError> {
    debug_assert!(fields.len() <= 2);

    let mut modes = [0u8; 2];
    let mut indices: [Option<ScaledIndex>; 2] = [None, None];

    for (i, field) in fields.iter().enumerate() {
        let (mode, index) = read_index(words, field.mode)?;
        modes[i] = mode;
        indices[i] = index;
    }

    for (i, field) in fields.iter().enumerate() {
        let mut operand = read_operand(words, modes[i], field.length)?;
        operand.index = indices[i];
        inst.push_operand(operand);
    }

    Ok(())
}

/// decode a displacement from the start of `bytes`, returning its value and length in bytes.
///
/// ```
/// use yaxpeax_ns32k::decode_displacement;
///
/// assert_eq!(decode_displacement(&[0x7c]), Ok((-4, 1)));
/// assert_eq!(decode_displacement(&[0x81, 0x00]), Ok((256, 2)));
/// ```
pub fn decode_displacement(bytes: &[u8]) -> Result<(i32, u8), DecodeError> {
    read_displacement(&mut U8Reader::new(bytes))
}

/// decode the operand for general addressing mode `mode` from the bytes following the
/// instruction header, returning the operand and how many bytes it consumed.
///
/// `length` is the integer operand length of the instruction, and sizes immediates. for the
/// scaled-index modes `28` through `31`, `bytes` starts with the index byte, which is counted in
/// the bytes consumed.
///
/// ```
/// use yaxpeax_ns32k::{decode_operand, AddressingMode, OperandLength, Register};
///
/// let (operand, consumed) = decode_operand(&[0x4a, 0x04], 29, OperandLength::Double).unwrap();
/// assert_eq!(operand.mode(), AddressingMode::RegisterRelative);
/// assert_eq!(operand.index_reg(), Some(Register::R2));
/// assert_eq!(consumed, 2);
/// ```
pub fn decode_operand(bytes: &[u8], mode: u8, length: OperandLength) -> Result<(Operand, usize), DecodeError> {
    let mut reader = U8Reader::new(bytes);
    Reader::<<NS32000 as Arch>::Address, <NS32000 as Arch>::Word>::mark(&mut reader);
    let (mode, index) = read_index(&mut reader, mode)?;
    let mut operand = read_operand(&mut reader, mode, length)?;
    operand.index = index;
    let consumed = Reader::<<NS32000 as Arch>::Address, <NS32000 as Arch>::Word>::offset(&mut reader);
    Ok((operand, consumed as usize))
}
