//! static decode tables: format classification, per-format mnemonics, and the register-select
//! tables for `lpr`/`spr` and `lmr`/`smr`.

use crate::{Format, Register};

const F0: Format = Format::Format0;
const F1: Format = Format::Format1;
const F2: Format = Format::Format2;
const F3: Format = Format::Format3;
const F4: Format = Format::Format4;
const F5: Format = Format::Format5;
const F6: Format = Format::Format6;
const F7: Format = Format::Format7;
const F8: Format = Format::Format8;
const F9: Format = Format::Format9;
const NOP: Format = Format::Nop;
const F11: Format = Format::Format11;
const F12: Format = Format::Format12;
const UND: Format = Format::Undefined;
const F14: Format = Format::Format14;
const F15: Format = Format::Format15;

/// instruction format by first byte.
///
/// formats 16 through 19 of the architecture (`0x5e`, `0x8e`, `0x9e`, `0xde`, and the `x6` column)
/// have no instructions and fold into `Undefined`, as do format 10 (`0x7e`) and the format 3
/// bytes with bit 7 set.
pub(crate) const FORMAT_TABLE: [Format; 256] = [
    F4, F4, F1, F4, F4, F4, UND, F4, F4, F4, F0, F4, F2, F2, F5, F2, // 0x00
    F4, F4, F1, F4, F4, F4, F15, F4, F4, F4, F0, F4, F2, F2, F14, F2, // 0x10
    F4, F4, F1, F4, F4, F4, UND, F4, F4, F4, F0, F4, F2, F2, F8, F2, // 0x20
    F4, F4, F1, F4, F4, F4, F15, F4, F4, F4, F0, F4, F2, F2, F9, F2, // 0x30
    F4, F4, F1, F4, F4, F4, UND, F4, F4, F4, F0, F4, F2, F2, F6, F2, // 0x40
    F4, F4, F1, F4, F4, F4, F15, F4, F4, F4, F0, F4, F2, F2, UND, F2, // 0x50
    F4, F4, F1, F4, F4, F4, UND, F4, F4, F4, F0, F4, F2, F2, F8, F2, // 0x60
    F4, F4, F1, F4, F4, F4, F15, F4, F4, F4, F0, F4, F3, F3, UND, F3, // 0x70
    F4, F4, F1, F4, F4, F4, UND, F4, F4, F4, F0, F4, F2, F2, UND, F2, // 0x80
    F4, F4, F1, F4, F4, F4, F15, F4, F4, F4, F0, F4, F2, F2, UND, F2, // 0x90
    F4, F4, NOP, F4, F4, F4, UND, F4, F4, F4, F0, F4, F2, F2, F8, F2, // 0xa0
    F4, F4, F1, F4, F4, F4, F15, F4, F4, F4, F0, F4, F2, F2, F11, F2, // 0xb0
    F4, F4, F1, F4, F4, F4, UND, F4, F4, F4, F0, F4, F2, F2, F7, F2, // 0xc0
    F4, F4, F1, F4, F4, F4, F15, F4, F4, F4, F0, F4, F2, F2, UND, F2, // 0xd0
    F4, F4, F1, F4, F4, F4, UND, F4, F4, F4, F0, F4, F2, F2, F8, F2, // 0xe0
    F4, F4, F1, F4, F4, F4, F15, F4, F4, F4, NOP, F4, UND, UND, F12, UND, // 0xf0
];

/// condition names, for `b<cond>` and `s<cond>`.
pub(crate) const CONDITIONS: [&str; 16] = [
    "eq", "ne", "cs", "cc", "hi", "ls", "gt", "le",
    "fs", "fc", "lo", "hs", "lt", "ge", "r", "??",
];

pub(crate) const FORMAT1: [&str; 16] = [
    "bsr", "ret", "cxp", "rxp", "rett", "reti", "save", "restore",
    "enter", "exit", "nop", "wait", "dia", "flag", "svc", "bpt",
];

pub(crate) const FORMAT2: [&str; 7] = [
    "addq", "cmpq", "spr", "s", "acb", "movq", "lpr",
];

/// indexed by bits 0-2 of the second byte. slot 4 has no instruction.
pub(crate) const FORMAT3: [&str; 8] = [
    "cxpd", "bicpsr", "jump", "bispsr", "", "adjsp", "jsr", "case",
];

/// slots 3, 7, 11 and 15 are format 2 and 5 opcode bytes, never format 4.
pub(crate) const FORMAT4: [&str; 16] = [
    "add", "cmp", "bic", "", "addc", "mov", "or", "",
    "sub", "addr", "and", "", "subc", "tbit", "xor", "",
];

pub(crate) const FORMAT5: [&str; 4] = [
    "movs", "cmps", "setcfg", "skps",
];

pub(crate) const FORMAT6: [&str; 16] = [
    "rot", "ash", "cbit", "cbiti", "", "lsh", "sbit", "sbiti",
    "neg", "not", "", "subp", "abs", "com", "ibit", "addp",
];

pub(crate) const FORMAT7: [&str; 16] = [
    "movm", "cmpm", "inss", "exts", "movxb", "movzb", "movz", "movx",
    "mul", "mei", "", "dei", "quo", "rem", "mod", "div",
];

pub(crate) const FORMAT8: [&str; 8] = [
    "ext", "cvtp", "ins", "check", "index", "ffs", "mov", "",
];

pub(crate) const FORMAT9: [&str; 8] = [
    "mov", "lfsr", "movlf", "movfl", "round", "trunc", "sfsr", "floor",
];

pub(crate) const FORMAT11: [&str; 16] = [
    "add", "mov", "cmp", "", "sub", "neg", "", "",
    "div", "", "", "", "mul", "abs", "", "",
];

pub(crate) const FORMAT12: [&str; 16] = [
    "", "", "poly", "dot", "scalb", "logb", "", "",
    "", "", "", "", "", "", "", "",
];

pub(crate) const FORMAT14: [&str; 10] = [
    "rdval", "wrval", "lmr", "smr", "", "", "", "", "", "cinv",
];

/// `movs`/`cmps`/`skps` options, indexed by the `short` field shifted past its `t` bit.
pub(crate) const STRING_OPTIONS: [&str; 8] = [
    "", "b", "w", "b,w", "?", "b,?", "u", "b,u",
];

/// `setcfg` flags for bits 0 through 2: vectored interrupts, floating point, memory management.
pub(crate) const CONFIG_FLAGS: [&str; 3] = ["i", "f", "m"];

/// `cinv` flags: all-lines, instruction cache, data cache.
pub(crate) const CACHE_INVALIDATE_FLAGS: [(i32, &str); 3] = [(4, "A"), (2, "I"), (1, "D")];

pub(crate) const CPU_REGISTERS: [Register; 16] = [
    Register::UPSR, Register::DCR, Register::BPC, Register::DSR,
    Register::CAR, Register::Nil, Register::Nil, Register::Nil,
    Register::FP, Register::SP, Register::SB, Register::USP,
    Register::CFG, Register::PSR, Register::INTBASE, Register::MOD,
];

pub(crate) const MMU_REGISTERS: [Register; 16] = [
    Register::Nil, Register::Nil, Register::Nil, Register::Nil,
    Register::Nil, Register::Nil, Register::Nil, Register::Nil,
    Register::Nil, Register::MCR, Register::MSR, Register::TEAR,
    Register::PTB0, Register::PTB1, Register::IVAR0, Register::IVAR1,
];
