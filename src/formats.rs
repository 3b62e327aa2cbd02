//! per-format decoding.
//!
//! each format reads its fixed header bytes, builds the mnemonic from the format's table, and
//! decodes operands in instruction order. an illegal encoding is reported as
//! `DecodeError::Undefined` from wherever it is detected; the caller decides whether that becomes
//! a `???` instruction or an error. bytes already read stay consumed either way.

use yaxpeax_arch::{Arch, Reader};

use crate::operand::{gen_a, gen_b, read_displacement, read_general_operands, short, GenField};
use crate::tables;
use crate::{AddressingMode, DecodeError, FloatType, Format, Instruction, NS32000, Operand, OperandLength, Register};

/// look up `op` in a mnemonic table. empty and missing entries are undefined operations.
fn mnemonic(table: &[&'static str], op: u8) -> Result<&'static str, DecodeError> {
    match table.get(op as usize) {
        Some(name) if !name.is_empty() => Ok(*name),
        _ => Err(DecodeError::Undefined),
    }
}

fn pc_relative<T: Reader<<NS32000 as Arch>::Address, <NS32000 as Arch>::Word>>(words: &mut T) -> Result<Operand, DecodeError> {
    let (disp, _) = read_displacement(words)?;
    Ok(Operand::new(AddressingMode::Immediate, Some(Register::PC), disp, 0))
}

fn displacement<T: Reader<<NS32000 as Arch>::Address, <NS32000 as Arch>::Word>>(words: &mut T) -> Result<Operand, DecodeError> {
    let (disp, _) = read_displacement(words)?;
    Ok(Operand::value(AddressingMode::Immediate, disp))
}

pub(crate) fn decode_inst<T: Reader<<NS32000 as Arch>::Address, <NS32000 as Arch>::Word>>(inst: &mut Instruction, words: &mut T) -> Result<(), DecodeError> {
    let byte0 = words.next()?;
    let format = crate::classify(byte0);
    inst.format = format;

    match format {
        Format::Format0 => decode_format0(inst, words, byte0),
        Format::Format1 => decode_format1(inst, words, byte0),
        Format::Format2 => decode_format2(inst, words, byte0),
        Format::Format3 => decode_format3(inst, words, byte0),
        Format::Format4 => decode_format4(inst, words, byte0),
        Format::Format5 => decode_format5(inst, words),
        Format::Format6 => decode_format6(inst, words),
        Format::Format7 => decode_format7(inst, words),
        Format::Format8 => decode_format8(inst, words, byte0),
        Format::Format9 => decode_format9(inst, words),
        Format::Nop => {
            inst.opcode = byte0;
            inst.mnemonic.set("nop");
            Ok(())
        }
        Format::Format11 => decode_float(inst, words, &tables::FORMAT11),
        Format::Format12 => decode_float(inst, words, &tables::FORMAT12),
        Format::Format14 => decode_format14(inst, words),
        Format::Undefined |
        Format::Format15 => Err(DecodeError::Undefined),
    }
}

/// `b<cond> disp`
fn decode_format0<T: Reader<<NS32000 as Arch>::Address, <NS32000 as Arch>::Word>>(inst: &mut Instruction, words: &mut T, byte0: u8) -> Result<(), DecodeError> {
    let cond = byte0 >> 4;
    inst.opcode = cond;
    inst.mnemonic.set("b");
    inst.mnemonic.push(tables::CONDITIONS[cond as usize]);
    inst.operands[0] = pc_relative(words)?;
    Ok(())
}

fn decode_format1<T: Reader<<NS32000 as Arch>::Address, <NS32000 as Arch>::Word>>(inst: &mut Instruction, words: &mut T, byte0: u8) -> Result<(), DecodeError> {
    let op = byte0 >> 4;
    inst.opcode = op;
    inst.mnemonic.set(tables::FORMAT1[op as usize]);

    match op {
        // bsr
        0x0 => {
            inst.operands[0] = pc_relative(words)?;
        }
        // ret, cxp, rxp, rett
        0x1 | 0x2 | 0x3 | 0x4 => {
            inst.operands[0] = displacement(words)?;
        }
        // save, restore, enter, exit
        0x6 | 0x7 | 0x8 | 0x9 => {
            let mut list = words.next()?;
            // `restore` and `exit` list r0 in the high bit
            if op == 0x7 || op == 0x9 {
                list = list.reverse_bits();
            }
            inst.operands[0] = Operand::value(AddressingMode::RegisterList, list as i32);
            if op == 0x8 {
                inst.operands[1] = pc_relative(words)?;
            }
        }
        _ => {}
    }
    Ok(())
}

/// quick and processor-register ops:
/// ```text
/// |  gen  | short | op | 11 | i |
/// ```
fn decode_format2<T: Reader<<NS32000 as Arch>::Address, <NS32000 as Arch>::Word>>(inst: &mut Instruction, words: &mut T, byte0: u8) -> Result<(), DecodeError> {
    let byte1 = words.next()?;
    let op = (byte0 >> 4) & 0b111;
    let short = short(byte0, byte1);
    let length = OperandLength::from_bits(byte0);
    inst.opcode = op;
    inst.operand_length = length;
    inst.mnemonic.set(mnemonic(&tables::FORMAT2, op)?);

    match op {
        // s<cond>
        0x3 => {
            inst.mnemonic.push(tables::CONDITIONS[short as usize]);
        }
        // addq, cmpq, acb, movq
        0x0 | 0x1 | 0x4 | 0x5 => {
            let quick = ((short << 4) as i8 >> 4) as i32;
            inst.operands[0] = Operand::value(AddressingMode::Quick, quick);
        }
        // spr, lpr
        _ => {
            inst.operands[0] = Operand::register(AddressingMode::DedicatedRegister, Register::cpu(short));
        }
    }

    read_general_operands(words, inst, &[GenField::new(gen_a(byte1), length)])?;
    inst.mnemonic.push(length.suffix());

    if op == 0x4 {
        inst.operands[2] = pc_relative(words)?;
    }
    Ok(())
}

fn decode_format3<T: Reader<<NS32000 as Arch>::Address, <NS32000 as Arch>::Word>>(inst: &mut Instruction, words: &mut T, byte0: u8) -> Result<(), DecodeError> {
    let byte1 = words.next()?;
    let op = byte1 & 0b111;
    let length = OperandLength::from_bits(byte0);
    inst.opcode = op;
    inst.operand_length = length;

    read_general_operands(words, inst, &[GenField::new(gen_a(byte1), length)])?;
    inst.mnemonic.set(mnemonic(&tables::FORMAT3, op)?);

    match op {
        // cxpd, jump, jsr
        0x0 | 0x2 | 0x6 => {
            if length != OperandLength::Double {
                return Err(DecodeError::Undefined);
            }
        }
        // bicpsr, bispsr
        0x1 | 0x3 => {
            if length == OperandLength::Double {
                return Err(DecodeError::Undefined);
            }
            let operand = &mut inst.operands[0];
            if operand.mode == AddressingMode::Immediate {
                operand.mode = if length == OperandLength::Byte {
                    AddressingMode::BitListByte
                } else {
                    AddressingMode::BitListWord
                };
            }
            inst.mnemonic.push(length.suffix());
        }
        // adjsp, case
        _ => {
            inst.mnemonic.push(length.suffix());
        }
    }
    Ok(())
}

fn decode_format4<T: Reader<<NS32000 as Arch>::Address, <NS32000 as Arch>::Word>>(inst: &mut Instruction, words: &mut T, byte0: u8) -> Result<(), DecodeError> {
    let byte1 = words.next()?;
    let op = (byte0 >> 2) & 0xf;
    let length = OperandLength::from_bits(byte0);
    inst.opcode = op;
    inst.operand_length = length;
    inst.mnemonic.set(mnemonic(&tables::FORMAT4, op)?);

    read_general_operands(words, inst, &[
        GenField::new(gen_a(byte1), length),
        GenField::new(gen_b(byte0, byte1), length),
    ])?;

    // addr
    if op == 0x9 {
        if length != OperandLength::Double {
            return Err(DecodeError::Undefined);
        }
    } else {
        inst.mnemonic.push(length.suffix());
    }
    Ok(())
}

/// string ops. the `short` field carries the options: bit 0 translates, bit 1 runs backward, and
/// bits 2-3 select while-match or until-match.
fn decode_format5<T: Reader<<NS32000 as Arch>::Address, <NS32000 as Arch>::Word>>(inst: &mut Instruction, words: &mut T) -> Result<(), DecodeError> {
    let byte1 = words.next()?;
    let op = (byte1 >> 2) & 0xf;
    inst.opcode = op;
    inst.mnemonic.set(mnemonic(&tables::FORMAT5, op)?);

    let byte2 = words.next()?;
    let options = short(byte1, byte2) as i32;
    let length = OperandLength::from_bits(byte1);
    inst.operand_length = length;

    // setcfg
    if op == 0x2 {
        inst.operands[0] = Operand::value(AddressingMode::ConfigBits, options);
    } else {
        if options & 1 != 0 {
            inst.mnemonic.push("t");
        } else {
            inst.mnemonic.push(length.suffix());
        }
        inst.operands[0] = Operand::value(AddressingMode::StringOption, options);
    }
    Ok(())
}

fn decode_format6<T: Reader<<NS32000 as Arch>::Address, <NS32000 as Arch>::Word>>(inst: &mut Instruction, words: &mut T) -> Result<(), DecodeError> {
    let byte1 = words.next()?;
    let byte2 = words.next()?;
    let op = (byte1 >> 2) & 0xf;
    let length = OperandLength::from_bits(byte1);
    inst.opcode = op;
    inst.operand_length = length;
    inst.mnemonic.set(mnemonic(&tables::FORMAT6, op)?);
    inst.mnemonic.push(length.suffix());

    // rot, ash, lsh take a byte shift count whatever the destination length
    let count_length = match op {
        0x0 | 0x1 | 0x5 => OperandLength::Byte,
        _ => length,
    };

    read_general_operands(words, inst, &[
        GenField::new(gen_a(byte2), count_length),
        GenField::new(gen_b(byte1, byte2), length),
    ])
}

fn decode_format7<T: Reader<<NS32000 as Arch>::Address, <NS32000 as Arch>::Word>>(inst: &mut Instruction, words: &mut T) -> Result<(), DecodeError> {
    let byte1 = words.next()?;
    let byte2 = words.next()?;
    let op = (byte1 >> 2) & 0xf;
    let length = OperandLength::from_bits(byte1);
    inst.opcode = op;
    inst.operand_length = length;

    read_general_operands(words, inst, &[
        GenField::new(gen_a(byte2), length),
        GenField::new(gen_b(byte1, byte2), length),
    ])?;

    inst.mnemonic.set(mnemonic(&tables::FORMAT7, op)?);
    inst.mnemonic.push(length.suffix());

    match op {
        // movm, cmpm: block length in bytes, minus one
        0x0 | 0x1 => {
            inst.operands[2] = displacement(words)?;
        }
        // inss, exts: offset and field length packed in one byte
        0x2 | 0x3 => {
            let field = words.next()?;
            inst.operands[2] = Operand::value(AddressingMode::Immediate, (field >> 5) as i32);
            inst.operands[3] = Operand::value(AddressingMode::Immediate, (field & 0x1f) as i32 + 1);
        }
        // movzd, movxd
        0x6 | 0x7 => {
            inst.mnemonic.push("d");
        }
        _ => {}
    }
    Ok(())
}

/// bit-field ops. the operation is split between the top two bits of the first byte and bit 2 of
/// the second, and a register operand sits in bits 3-5 of the second.
fn decode_format8<T: Reader<<NS32000 as Arch>::Address, <NS32000 as Arch>::Word>>(inst: &mut Instruction, words: &mut T, byte0: u8) -> Result<(), DecodeError> {
    let byte1 = words.next()?;
    let byte2 = words.next()?;
    let op = (byte0 >> 6) | (byte1 & 0b100);
    let reg = (byte1 >> 3) & 0b111;
    let length = OperandLength::from_bits(byte1);
    inst.opcode = op;
    inst.operand_length = length;
    inst.mnemonic.set(mnemonic(&tables::FORMAT8, op)?);

    match op {
        // mov: movsu or movus, by the register field
        0x6 => {
            inst.mnemonic.push(match reg {
                1 => "su",
                3 => "us",
                _ => "??",
            });
            inst.mnemonic.push(length.suffix());
        }
        // cvtp
        0x1 => {}
        // ext, ins, check, index, ffs
        _ => {
            inst.mnemonic.push(length.suffix());
        }
    }

    // ffs has no register operand
    if op != 0x5 {
        inst.operands[0] = Operand::register(AddressingMode::Register, Register::gpr(reg));
    }

    read_general_operands(words, inst, &[
        GenField::new(gen_a(byte2), length),
        GenField::new(gen_b(byte1, byte2), length),
    ])?;

    // ext, ins: field length
    if op == 0x0 || op == 0x2 {
        inst.operands[3] = displacement(words)?;
    }
    Ok(())
}

/// floating point conversions. which operands name floating point registers depends on the
/// direction of the conversion.
fn decode_format9<T: Reader<<NS32000 as Arch>::Address, <NS32000 as Arch>::Word>>(inst: &mut Instruction, words: &mut T) -> Result<(), DecodeError> {
    let byte1 = words.next()?;
    let byte2 = words.next()?;
    let op = (byte1 >> 3) & 0b111;
    let float = FloatType::from_bit(byte1 >> 2);
    let length = OperandLength::from_bits(byte1);
    inst.opcode = op;
    inst.operand_length = length;
    inst.mnemonic.set(tables::FORMAT9[op as usize]);

    let src = GenField::new(gen_a(byte2), length);
    let dest = GenField::new(gen_b(byte1, byte2), length);

    match op {
        // mov<i><f>: integer to float
        0x0 => {
            inst.mnemonic.push(length.suffix());
            inst.mnemonic.push(float.suffix());
            read_general_operands(words, inst, &[src, dest])?;
            inst.operands[1].rename_to_float();
        }
        // lfsr
        0x1 => {
            read_general_operands(words, inst, &[src])?;
        }
        // sfsr
        0x6 => {
            read_general_operands(words, inst, &[dest])?;
        }
        // movlf, movfl
        0x2 | 0x3 => {
            read_general_operands(words, inst, &[src, dest])?;
            inst.operands[0].rename_to_float();
            inst.operands[1].rename_to_float();
        }
        // round, trunc, floor: float to integer
        _ => {
            inst.mnemonic.push(float.suffix());
            inst.mnemonic.push(length.suffix());
            read_general_operands(words, inst, &[src, dest])?;
            inst.operands[0].rename_to_float();
        }
    }
    Ok(())
}

/// formats 11 and 12: dyadic floating point ops on two floating point operands.
fn decode_float<T: Reader<<NS32000 as Arch>::Address, <NS32000 as Arch>::Word>>(inst: &mut Instruction, words: &mut T, table: &[&'static str; 16]) -> Result<(), DecodeError> {
    let byte1 = words.next()?;
    let byte2 = words.next()?;
    let op = (byte1 >> 2) & 0xf;
    let float = FloatType::from_bit(byte1);
    inst.opcode = op;
    inst.mnemonic.set(mnemonic(table, op)?);
    inst.mnemonic.push(float.suffix());

    let length = inst.operand_length;
    read_general_operands(words, inst, &[
        GenField::new(gen_a(byte2), length),
        GenField::new(gen_b(byte1, byte2), length),
    ])?;
    inst.operands[0].rename_to_float();
    inst.operands[1].rename_to_float();
    Ok(())
}

/// memory management ops, all double-word.
fn decode_format14<T: Reader<<NS32000 as Arch>::Address, <NS32000 as Arch>::Word>>(inst: &mut Instruction, words: &mut T) -> Result<(), DecodeError> {
    let byte1 = words.next()?;
    let byte2 = words.next()?;
    let op = (byte1 >> 2) & 0xf;
    let short = short(byte1, byte2);
    let length = OperandLength::Double;
    inst.opcode = op;
    inst.operand_length = length;
    inst.mnemonic.set(mnemonic(&tables::FORMAT14, op)?);

    match op {
        // cinv
        0x9 => {
            inst.operands[0] = Operand::value(AddressingMode::CacheInvalidateFlags, short as i32);
        }
        // lmr, smr
        0x2 | 0x3 => {
            inst.operands[0] = Operand::register(AddressingMode::MmuRegister, Register::mmu(short));
        }
        // rdval, wrval
        _ => {}
    }

    read_general_operands(words, inst, &[GenField::new(gen_a(byte2), length)])
}
