//! # `yaxpeax-ns32k`, a decoder for the NS32000 instruction set
//!
//! the NS32000 family (ns32016, ns32032, ns32332, ns32532) is National Semiconductor's 32-bit
//! CISC architecture from the early 1980s. instructions are a variable number of bytes: a one to
//! three byte opcode header selects one of the instruction "formats", and up to two "general"
//! operands follow, each of which may carry an index byte, displacements, or an immediate.
//!
//! decoding is byte-at-a-time through a [`yaxpeax_arch::Reader`]. the first byte alone picks the
//! format (see [`classify`]), the format's fixed fields pick the operation, and the general
//! operand fields are then decoded in instruction order. displacements use the NS32000
//! self-describing 1/2/4 byte encoding ([`decode_displacement`]), immediates are big-endian.
//!
//! mnemonics and operand syntax follow the style of the ns32532 ROM monitor's disassembler:
//! `movd 4(8(sp)),r0`, `addqw -1,r0`, `save [r0,r1,r2]`, with a tab between mnemonic and
//! operands.
//!
//! ## usage
//!
//! the fastest way to decode an ns32k instruction is through [`InstDecoder::decode_slice()`]:
//! ```
//! use yaxpeax_ns32k::InstDecoder;
//!
//! let inst = InstDecoder::decode_slice(&[0x0a, 0x04]).unwrap();
//!
//! assert_eq!("beq\t4", inst.to_string());
//! assert_eq!(inst.len(), 2);
//! ```
//!
//! undefined encodings are not an error by default; they decode as `???` so a walk over memory
//! never stops on bad bytes. [`InstDecoder::strict()`] reports them as
//! [`DecodeError::Undefined`] instead:
//! ```
//! use yaxpeax_arch::Decoder;
//! use yaxpeax_ns32k::{DecodeError, InstDecoder};
//!
//! let inst = InstDecoder::decode_slice(&[0x06]).unwrap();
//! assert_eq!("???", inst.to_string());
//!
//! let mut reader = yaxpeax_arch::U8Reader::new(&[0x06]);
//! assert_eq!(InstDecoder::strict().decode(&mut reader).err(), Some(DecodeError::Undefined));
//! ```
//!
//! to walk a buffer, [`Disassembler`] yields one [`Line`] per instruction:
//! ```
//! use yaxpeax_ns32k::Disassembler;
//!
//! let code = [0xa2, 0x0a, 0x04, 0x12, 0x00];
//! let lines: Vec<String> = Disassembler::with_base(&code, 0x1000)
//!     .map(|line| line.to_string())
//!     .collect();
//!
//! assert_eq!(lines, ["00001000\tnop", "00001001\tbeq\t4", "00001003\tret\t0"]);
//! ```
//!
//! ## `#![no_std]`
//!
//! `yaxpeax-ns32k` is `no_std`, and needs `alloc` only for the `String` returned by
//! [`disassemble`].

#![no_std]

extern crate alloc;

mod disassembler;
mod display;
mod formats;
mod operand;
mod tables;

use yaxpeax_arch::{AddressDiff, Arch, Decoder, LengthedInstruction, Reader, U8Reader};

pub use crate::disassembler::{disassemble, Disassembler, Line};
pub use crate::operand::{decode_displacement, decode_operand};

/// the longest possible ns32k instruction, in bytes: a three-byte header, two index bytes, two
/// general operands of up to eight bytes each, and a trailing four-byte displacement.
pub const MAX_INSTRUCTION_LENGTH: usize = 25;

/// a trivial struct for [`yaxpeax_arch::Arch`] to be implemented on. it's only interesting for the
/// associated type parameters.
#[derive(Hash, Eq, PartialEq, Debug, Copy, Clone)]
pub struct NS32000;

impl Arch for NS32000 {
    type Address = u32;
    type Word = u8;
    type Instruction = Instruction;
    type Decoder = InstDecoder;
    type DecodeError = DecodeError;
    type Operand = Operand;
}

#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum DecodeError {
    /// no input available but the instruction would require at least one more byte to decode
    ExhaustedInput,
    /// the bytes to decode this instruction do not map to a defined instruction
    Undefined,
}

impl From<yaxpeax_arch::ReadError> for DecodeError {
    fn from(_e: yaxpeax_arch::ReadError) -> Self {
        DecodeError::ExhaustedInput
    }
}

impl core::fmt::Display for DecodeError {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        use yaxpeax_arch::DecodeError;
        f.write_str(self.description())
    }
}

impl yaxpeax_arch::DecodeError for DecodeError {
    fn data_exhausted(&self) -> bool {
        *self == DecodeError::ExhaustedInput
    }
    fn bad_opcode(&self) -> bool {
        *self == DecodeError::Undefined
    }
    fn bad_operand(&self) -> bool {
        *self == DecodeError::Undefined
    }
    fn description(&self) -> &'static str {
        match self {
            DecodeError::ExhaustedInput => "exhausted input",
            DecodeError::Undefined => "undefined encoding",
        }
    }
}

/// the instruction format selected by the first byte of an instruction.
///
/// numbering follows the National Semiconductor manuals. `Nop` occupies slot 10, which the
/// architecture leaves unused, and catches the two one-byte no-op encodings (`0xa2`, `0xfa`).
/// `Undefined` (slot 13) is both the classification of bytes no format claims and the format of
/// any instruction found to be illegal part way through decoding.
#[derive(Debug, Copy, Clone, Hash, PartialEq, Eq, Ord, PartialOrd)]
pub enum Format {
    /// conditional branch
    Format0,
    /// no operand or displacement-only control transfer
    Format1,
    /// quick immediate and processor-register ops
    Format2,
    /// single general operand control ops
    Format3,
    /// dyadic integer ops
    Format4,
    /// string ops and `setcfg`
    Format5,
    /// shifts, bit ops, monadic integer ops
    Format6,
    /// multiply, divide, move-multiple, field ops
    Format7,
    /// bit-field and bounds ops with an embedded register
    Format8,
    /// floating point conversions
    Format9,
    Nop,
    /// floating point arithmetic
    Format11,
    /// ns32532 floating point extensions
    Format12,
    Undefined,
    /// memory management
    Format14,
    /// custom slave
    Format15,
}

impl Format {
    /// the format number, `0` through `15`.
    pub fn id(&self) -> u8 {
        *self as u8
    }
}

/// select the instruction format from the first byte of an instruction.
///
/// this is a pure table lookup; every byte maps to some format, possibly
/// [`Format::Undefined`].
pub fn classify(first_byte: u8) -> Format {
    tables::FORMAT_TABLE[first_byte as usize]
}

/// the integer operand length of an instruction, from its two `i` bits.
#[derive(Debug, Copy, Clone, Hash, PartialEq, Eq)]
pub enum OperandLength {
    Byte,
    Word,
    /// the `i` encoding `10`, which no integer length uses. also the length of instructions that
    /// have no integer operand length at all.
    NotApplicable,
    Double,
}

impl OperandLength {
    /// decode the low two bits of `bits` as an `i` field.
    pub fn from_bits(bits: u8) -> OperandLength {
        match bits & 0b11 {
            0b00 => OperandLength::Byte,
            0b01 => OperandLength::Word,
            0b10 => OperandLength::NotApplicable,
            _ => OperandLength::Double,
        }
    }

    /// the number of bytes an immediate of this length occupies.
    pub fn bytes(&self) -> u8 {
        match self {
            OperandLength::Byte => 1,
            OperandLength::Word => 2,
            OperandLength::NotApplicable => 3,
            OperandLength::Double => 4,
        }
    }

    /// the mnemonic suffix for this length.
    pub fn suffix(&self) -> &'static str {
        match self {
            OperandLength::Byte => "b",
            OperandLength::Word => "w",
            OperandLength::NotApplicable => "?",
            OperandLength::Double => "d",
        }
    }
}

/// floating point operand type, from a format 9/11/12 `f` bit.
#[derive(Debug, Copy, Clone, Hash, PartialEq, Eq)]
pub enum FloatType {
    Long,
    Single,
}

impl FloatType {
    pub fn from_bit(bit: u8) -> FloatType {
        if bit & 1 == 0 {
            FloatType::Long
        } else {
            FloatType::Single
        }
    }

    pub fn suffix(&self) -> &'static str {
        match self {
            FloatType::Long => "l",
            FloatType::Single => "f",
        }
    }
}

/// element size of a scaled-index operand.
#[derive(Debug, Copy, Clone, Hash, PartialEq, Eq)]
pub enum Scale {
    Byte,
    Word,
    Double,
    Quad,
}

impl Scale {
    /// the scale selected by a general addressing mode, if that mode is one of the four
    /// scaled-index modes (`28` through `31`).
    pub fn from_mode(mode: u8) -> Option<Scale> {
        match mode {
            28 => Some(Scale::Byte),
            29 => Some(Scale::Word),
            30 => Some(Scale::Double),
            31 => Some(Scale::Quad),
            _ => None,
        }
    }

    pub fn suffix(&self) -> &'static str {
        match self {
            Scale::Byte => "b",
            Scale::Word => "w",
            Scale::Double => "d",
            Scale::Quad => "q",
        }
    }
}

/// a register an operand can name.
///
/// general and floating point registers are distinct variants so that the general-to-float
/// renaming done for floating point instructions goes through [`Register::to_float`] rather than
/// index arithmetic.
#[derive(Debug, Copy, Clone, Hash, PartialEq, Eq)]
pub enum Register {
    R0,
    R1,
    R2,
    R3,
    R4,
    R5,
    R6,
    R7,
    F0,
    F1,
    F2,
    F3,
    F4,
    F5,
    F6,
    F7,
    /// program counter
    PC,
    /// frame pointer
    FP,
    /// stack pointer, as used by memory-relative and memory-space modes
    SP,
    /// static base
    SB,
    /// user stack pointer
    USP,
    /// processor status register
    PSR,
    /// user processor status register (low byte of `PSR`)
    UPSR,
    /// interrupt base
    INTBASE,
    /// module register
    MOD,
    /// debug condition register
    DCR,
    /// breakpoint program counter
    BPC,
    /// debug status register
    DSR,
    /// compare address register
    CAR,
    /// configuration register
    CFG,
    /// page table base 0
    PTB0,
    /// page table base 1
    PTB1,
    /// invalidate virtual address 0
    IVAR0,
    /// invalidate virtual address 1
    IVAR1,
    /// translation exception address register
    TEAR,
    /// memory management control register
    MCR,
    /// memory management status register
    MSR,
    /// a register-select encoding that names no register
    Nil,
}

impl Register {
    /// the general register `r<n>`, for the low three bits of `n`.
    pub fn gpr(n: u8) -> Register {
        match n & 0b111 {
            0 => Register::R0,
            1 => Register::R1,
            2 => Register::R2,
            3 => Register::R3,
            4 => Register::R4,
            5 => Register::R5,
            6 => Register::R6,
            _ => Register::R7,
        }
    }

    /// the floating point register with the same number as this general register, or `None` if
    /// this is not a general register.
    pub fn to_float(self) -> Option<Register> {
        let float = match self {
            Register::R0 => Register::F0,
            Register::R1 => Register::F1,
            Register::R2 => Register::F2,
            Register::R3 => Register::F3,
            Register::R4 => Register::F4,
            Register::R5 => Register::F5,
            Register::R6 => Register::F6,
            Register::R7 => Register::F7,
            _ => { return None; }
        };
        Some(float)
    }

    /// the dedicated register `lpr`/`spr` select with a four-bit `short` field.
    pub fn cpu(select: u8) -> Register {
        tables::CPU_REGISTERS[(select & 0xf) as usize]
    }

    /// the memory management register `lmr`/`smr` select with a four-bit `short` field.
    pub fn mmu(select: u8) -> Register {
        tables::MMU_REGISTERS[(select & 0xf) as usize]
    }

    /// the name of this register as it appears in disassembly.
    pub fn name(&self) -> &'static str {
        match self {
            Register::R0 => "r0",
            Register::R1 => "r1",
            Register::R2 => "r2",
            Register::R3 => "r3",
            Register::R4 => "r4",
            Register::R5 => "r5",
            Register::R6 => "r6",
            Register::R7 => "r7",
            Register::F0 => "f0",
            Register::F1 => "f1",
            Register::F2 => "f2",
            Register::F3 => "f3",
            Register::F4 => "f4",
            Register::F5 => "f5",
            Register::F6 => "f6",
            Register::F7 => "f7",
            Register::PC => "pc",
            Register::FP => "fp",
            Register::SP => "sp",
            Register::SB => "sb",
            Register::USP => "usp",
            Register::PSR => "psr",
            Register::UPSR => "upsr",
            Register::INTBASE => "intbase",
            Register::MOD => "mod",
            Register::DCR => "dcr",
            Register::BPC => "bpc",
            Register::DSR => "dsr",
            Register::CAR => "car",
            Register::CFG => "cfg",
            Register::PTB0 => "ptb0",
            Register::PTB1 => "ptb1",
            Register::IVAR0 => "ivar0",
            Register::IVAR1 => "ivar1",
            Register::TEAR => "tear",
            Register::MCR => "mcr",
            Register::MSR => "msr",
            Register::Nil => "???",
        }
    }
}

/// how an [`Operand`] is to be interpreted.
#[derive(Debug, Copy, Clone, Hash, PartialEq, Eq)]
pub enum AddressingMode {
    /// no operand in this position.
    None,
    /// `reg0`
    Register,
    /// `disp0(reg0)`, for a general register
    RegisterRelative,
    /// `disp1(disp0(reg0))`
    MemoryRelative,
    /// the value `disp0`. branch targets and other displacements relative to the instruction are
    /// also immediates, with `reg0` set to `PC`.
    Immediate,
    /// `@disp0`
    Absolute,
    /// `ext(disp0)+disp1`
    External,
    TopOfStack,
    /// `disp0(reg0)`, for one of `FP`, `SP`, `SB`, `PC`
    MemorySpace,
    /// the registers set in the low eight bits of `disp0`
    RegisterList,
    /// the four-bit signed value `disp0`
    Quick,
    /// a reserved or otherwise unusable addressing mode
    Invalid,
    /// a CPU dedicated register, `reg0`
    DedicatedRegister,
    /// the low eight bits of `disp0` as a bit list
    BitListByte,
    /// the low sixteen bits of `disp0` as a bit list
    BitListWord,
    /// `disp0` as a bit list
    BitListDouble,
    /// string instruction options, from bits 1-3 of `disp0`
    StringOption,
    /// `setcfg` configuration bits in `disp0`
    ConfigBits,
    /// a memory management register, `reg0`
    MmuRegister,
    /// `cinv` flags in `disp0`
    CacheInvalidateFlags,
}

/// the index register and scale of a scaled-index operand.
#[derive(Debug, Copy, Clone, Hash, PartialEq, Eq)]
pub struct ScaledIndex {
    reg: Register,
    scale: Scale,
}

/// an operand for an ns32k instruction.
///
/// which fields are meaningful depends on [`Operand::mode`]; see [`AddressingMode`].
#[derive(Debug, Copy, Clone, Hash, PartialEq, Eq)]
pub struct Operand {
    mode: AddressingMode,
    reg0: Option<Register>,
    disp0: i32,
    disp1: i32,
    index: Option<ScaledIndex>,
}

impl Default for Operand {
    fn default() -> Operand {
        Operand::nothing()
    }
}

impl Operand {
    pub(crate) const fn nothing() -> Operand {
        Operand::new(AddressingMode::None, None, 0, 0)
    }

    pub(crate) const fn new(mode: AddressingMode, reg0: Option<Register>, disp0: i32, disp1: i32) -> Operand {
        Operand { mode, reg0, disp0, disp1, index: None }
    }

    pub(crate) fn register(mode: AddressingMode, reg: Register) -> Operand {
        Operand::new(mode, Some(reg), 0, 0)
    }

    pub(crate) fn value(mode: AddressingMode, value: i32) -> Operand {
        Operand::new(mode, None, value, 0)
    }

    pub fn mode(&self) -> AddressingMode {
        self.mode
    }

    pub fn reg0(&self) -> Option<Register> {
        self.reg0
    }

    pub fn disp0(&self) -> i32 {
        self.disp0
    }

    pub fn disp1(&self) -> i32 {
        self.disp1
    }

    /// the scale of this operand's index, if it is a scaled-index operand.
    pub fn index_scale(&self) -> Option<Scale> {
        self.index.map(|index| index.scale)
    }

    /// the index register of this operand, if it is a scaled-index operand.
    pub fn index_reg(&self) -> Option<Register> {
        self.index.map(|index| index.reg)
    }

    pub fn is_nothing(&self) -> bool {
        self.mode == AddressingMode::None
    }

    fn rename_to_float(&mut self) {
        if self.mode == AddressingMode::Register {
            if let Some(float) = self.reg0.and_then(Register::to_float) {
                self.reg0 = Some(float);
            }
        }
    }
}

/// an instruction's mnemonic, built up from a base name and suffixes as the instruction is
/// decoded. the longest ns32k mnemonic is seven characters.
#[derive(Copy, Clone, Hash, PartialEq, Eq)]
pub(crate) struct Mnemonic {
    text: [u8; 8],
    len: u8,
}

impl Mnemonic {
    const fn empty() -> Mnemonic {
        Mnemonic { text: [0; 8], len: 0 }
    }

    fn set(&mut self, s: &str) {
        *self = Mnemonic::empty();
        self.push(s);
    }

    fn push(&mut self, s: &str) {
        for b in s.bytes() {
            if (self.len as usize) < self.text.len() {
                self.text[self.len as usize] = b;
                self.len += 1;
            }
        }
    }

    fn as_str(&self) -> &str {
        // only ever built from the ascii tables
        core::str::from_utf8(&self.text[..self.len as usize]).unwrap_or("???")
    }
}

impl core::fmt::Debug for Mnemonic {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        core::fmt::Debug::fmt(self.as_str(), f)
    }
}

/// an ns32k instruction.
///
/// ns32k instructions have a mnemonic and up to four [`Operand`]s, in source order. unused
/// trailing operand slots are [`AddressingMode::None`].
#[derive(Debug, Copy, Clone, Hash, PartialEq, Eq)]
pub struct Instruction {
    format: Format,
    /// the format-specific operation field. for format 0 and `s<cond>` this is the condition.
    opcode: u8,
    mnemonic: Mnemonic,
    operand_length: OperandLength,
    operands: [Operand; 4],
    length: u8,
}

impl Default for Instruction {
    fn default() -> Instruction {
        Instruction {
            format: Format::Undefined,
            opcode: 0,
            mnemonic: Mnemonic::empty(),
            operand_length: OperandLength::NotApplicable,
            operands: [Operand::nothing(); 4],
            length: 0,
        }
    }
}

impl Instruction {
    fn reset(&mut self) {
        self.format = Format::Undefined;
        self.opcode = 0;
        self.mnemonic = Mnemonic::empty();
        self.operand_length = OperandLength::NotApplicable;
        self.operands = [Operand::nothing(); 4];
        self.length = 0;
    }

    /// replace whatever was decoded so far with the canonical undefined instruction, keeping only
    /// the length consumed.
    fn make_undefined(&mut self) {
        let length = self.length;
        self.reset();
        self.mnemonic.set("???");
        self.length = length;
    }

    /// an undefined instruction covering `length` bytes.
    pub(crate) fn undefined(length: u8) -> Instruction {
        let mut inst = Instruction::default();
        inst.length = length;
        inst.make_undefined();
        inst
    }

    /// put `operand` in the first unused operand slot.
    fn push_operand(&mut self, operand: Operand) {
        if let Some(slot) = self.operands.iter_mut().find(|op| op.is_nothing()) {
            *slot = operand;
        }
    }

    /// the length of this instruction, in bytes.
    pub fn len(&self) -> u8 {
        self.length
    }

    /// the format this instruction decoded as. instructions found to be illegal are
    /// [`Format::Undefined`] regardless of their first byte.
    pub fn format(&self) -> Format {
        self.format
    }

    /// the format-specific operation number of this instruction.
    pub fn opcode(&self) -> u8 {
        self.opcode
    }

    /// the full mnemonic, including operand length and float type suffixes.
    pub fn mnemonic(&self) -> &str {
        self.mnemonic.as_str()
    }

    /// the integer operand length decoded from this instruction.
    pub fn operand_length(&self) -> OperandLength {
        self.operand_length
    }

    /// get the number of operands in this instruction.
    ///
    /// calls to `Instruction::operand` for indices between 0 and this value will return an operand
    /// other than `AddressingMode::None`.
    pub fn operand_count(&self) -> u8 {
        self.operands.iter().take_while(|op| !op.is_nothing()).count() as u8
    }

    /// get the `Operand` at the provided index.
    ///
    /// indices at or above `4` will always yield an operand with mode `AddressingMode::None`.
    pub fn operand(&self, idx: u8) -> Operand {
        self.operands.get(idx as usize).copied().unwrap_or_else(Operand::nothing)
    }

    /// the operands of this instruction, without unused slots.
    pub fn operands(&self) -> &[Operand] {
        &self.operands[..self.operand_count() as usize]
    }

    /// true if this instruction is the `???` placeholder for an undefined encoding.
    pub fn is_undefined(&self) -> bool {
        self.format == Format::Undefined
    }
}

impl LengthedInstruction for Instruction {
    type Unit = AddressDiff<<NS32000 as Arch>::Address>;
    fn min_size() -> Self::Unit {
        AddressDiff::from_const(1)
    }
    fn len(&self) -> Self::Unit {
        AddressDiff::from_const(self.length as u32)
    }
}

impl yaxpeax_arch::Instruction for Instruction {
    fn well_defined(&self) -> bool {
        !self.is_undefined()
    }
}

/// an ns32k instruction decoder.
///
/// the only decode option is whether undefined encodings are reported as errors
/// ([`InstDecoder::strict`]) or decoded as a `???` instruction (the default).
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct InstDecoder {
    strict: bool,
}

impl Default for InstDecoder {
    fn default() -> Self {
        InstDecoder { strict: false }
    }
}

impl InstDecoder {
    /// a decoder that returns [`DecodeError::Undefined`] for undefined encodings rather than
    /// decoding them as `???`.
    pub fn strict() -> Self {
        InstDecoder { strict: true }
    }

    pub fn is_strict(&self) -> bool {
        self.strict
    }

    /// decode a slice of bytes into an instruction (or error)
    ///
    /// this is just a higher-level interface to the [`InstDecoder`] impl of
    /// [`yaxpeax_arch::Decoder`].
    pub fn decode_slice(data: &[u8]) -> Result<Instruction, <NS32000 as Arch>::DecodeError> {
        InstDecoder::default()
            .decode(&mut U8Reader::new(data))
    }
}

impl Decoder<NS32000> for InstDecoder {
    fn decode_into<T: Reader<<NS32000 as Arch>::Address, <NS32000 as Arch>::Word>>(&self, inst: &mut Instruction, words: &mut T) -> Result<(), <NS32000 as Arch>::DecodeError> {
        inst.reset();
        words.mark();

        let res = formats::decode_inst(inst, words);
        inst.length = words.offset() as u8;

        match res {
            Err(DecodeError::Undefined) if !self.strict => {
                inst.make_undefined();
                Ok(())
            }
            other => other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Mnemonic;

    #[test]
    fn mnemonic_set_replaces_old_text() {
        let mut long = Mnemonic::empty();
        long.set("restore");
        long.set("ret");

        let mut short = Mnemonic::empty();
        short.set("ret");

        assert_eq!(long.as_str(), "ret");
        assert!(long == short);
    }
}
