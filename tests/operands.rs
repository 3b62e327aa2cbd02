use yaxpeax_arch::Decoder;
use yaxpeax_ns32k::{
    classify, decode_displacement, decode_operand, disassemble, AddressingMode, DecodeError,
    Disassembler, Format, InstDecoder, OperandLength, Register, Scale,
};

/// the shortest encoding of `value`, which must fit in 30 signed bits.
fn encode_displacement(value: i32) -> Vec<u8> {
    if value >= -64 && value <= 63 {
        vec![(value as u8) & 0x7f]
    } else if value >= -8192 && value <= 8191 {
        let bits = (value as u16) & 0x3fff;
        vec![0x80 | (bits >> 8) as u8, bits as u8]
    } else {
        let bits = (value as u32) & 0x3fff_ffff;
        let mut bytes = bits.to_be_bytes();
        bytes[0] |= 0xc0;
        bytes.to_vec()
    }
}

#[test]
fn test_displacements() {
    assert_eq!(decode_displacement(&[0x04]), Ok((4, 1)));
    assert_eq!(decode_displacement(&[0x40]), Ok((-64, 1)));
    assert_eq!(decode_displacement(&[0x3f]), Ok((63, 1)));
    assert_eq!(decode_displacement(&[0xa0, 0x00]), Ok((-8192, 2)));
    assert_eq!(decode_displacement(&[0x80, 0x01]), Ok((1, 2)));
    assert_eq!(decode_displacement(&[0xe0, 0x00, 0x00, 0x00]), Ok((-536870912, 4)));
    assert_eq!(decode_displacement(&[0xc0, 0x00, 0x00, 0x04]), Ok((4, 4)));
    assert_eq!(decode_displacement(&[0xdf, 0xff, 0xff, 0xff]), Ok((536870911, 4)));
}

#[test]
fn test_displacement_truncated() {
    assert_eq!(decode_displacement(&[]), Err(DecodeError::ExhaustedInput));
    assert_eq!(decode_displacement(&[0x81]), Err(DecodeError::ExhaustedInput));
    assert_eq!(decode_displacement(&[0xc0, 0x00, 0x00]), Err(DecodeError::ExhaustedInput));
}

#[test]
fn test_displacement_sizes() {
    let values = [
        0, 1, -1, 63, -64, 64, -65, 8191, -8192, 8192, -8193,
        0x1234567, -0x1234567, 536870911, -536870912,
    ];
    for value in values.iter() {
        let bytes = encode_displacement(*value);
        assert_eq!(decode_displacement(&bytes), Ok((*value, bytes.len() as u8)), "displacement {}", value);
    }
}

#[test]
fn test_register_relative_operand() {
    let (operand, consumed) = decode_operand(&[0x05], 8, OperandLength::Double).unwrap();
    assert_eq!(operand.mode(), AddressingMode::RegisterRelative);
    assert_eq!(operand.reg0(), Some(Register::R0));
    assert_eq!(operand.disp0(), 5);
    assert_eq!(consumed, 1);
}

#[test]
fn test_immediate_operand_lengths() {
    let bytes = [0x80, 0x01, 0x02, 0x03];
    let (operand, consumed) = decode_operand(&bytes, 20, OperandLength::Byte).unwrap();
    assert_eq!((operand.mode(), operand.disp0(), consumed), (AddressingMode::Immediate, -128, 1));
    let (operand, consumed) = decode_operand(&bytes, 20, OperandLength::Word).unwrap();
    assert_eq!((operand.disp0(), consumed), (-32767, 2));
    let (operand, consumed) = decode_operand(&bytes, 20, OperandLength::Double).unwrap();
    assert_eq!((operand.disp0(), consumed), (0x80010203u32 as i32, 4));
    let (operand, consumed) = decode_operand(&bytes, 20, OperandLength::NotApplicable).unwrap();
    assert_eq!((operand.disp0(), consumed), (-0x7ffefe, 3));
}

#[test]
fn test_operands_without_extension() {
    let (operand, consumed) = decode_operand(&[], 3, OperandLength::Byte).unwrap();
    assert_eq!((operand.mode(), operand.reg0(), consumed), (AddressingMode::Register, Some(Register::R3), 0));
    let (operand, consumed) = decode_operand(&[], 23, OperandLength::Byte).unwrap();
    assert_eq!((operand.mode(), consumed), (AddressingMode::TopOfStack, 0));
    let (operand, consumed) = decode_operand(&[], 19, OperandLength::Byte).unwrap();
    assert_eq!((operand.mode(), consumed), (AddressingMode::Invalid, 0));
    assert_eq!(decode_operand(&[], 8, OperandLength::Byte), Err(DecodeError::ExhaustedInput));
}

#[test]
fn test_scaled_index() {
    let inst = InstDecoder::decode_slice(&[0xd4, 0xe8, 0x4a, 0x04]).unwrap();
    let operand = inst.operand(0);
    assert_eq!(operand.mode(), AddressingMode::RegisterRelative);
    assert_eq!(operand.reg0(), Some(Register::R1));
    assert_eq!(operand.index_reg(), Some(Register::R2));
    assert_eq!(operand.index_scale(), Some(Scale::Word));
    assert_eq!(inst.operand(1).index_scale(), None);
    assert_eq!(inst.operand_count(), 2);
    assert!(inst.operand(2).is_nothing());
    assert!(inst.operand(7).is_nothing());
}

#[test]
fn test_scaled_index_operand() {
    let (operand, consumed) = decode_operand(&[0x4a, 0x04], 29, OperandLength::Double).unwrap();
    assert_eq!(operand.mode(), AddressingMode::RegisterRelative);
    assert_eq!(operand.reg0(), Some(Register::R1));
    assert_eq!(operand.disp0(), 4);
    assert_eq!(operand.index_reg(), Some(Register::R2));
    assert_eq!(operand.index_scale(), Some(Scale::Word));
    assert_eq!(consumed, 2);

    // an index byte cannot name another scaled-index mode
    let (operand, consumed) = decode_operand(&[0xe2], 28, OperandLength::Byte).unwrap();
    assert_eq!(operand.mode(), AddressingMode::Invalid);
    assert_eq!(operand.index_reg(), Some(Register::R2));
    assert_eq!(operand.index_scale(), Some(Scale::Byte));
    assert_eq!(consumed, 1);

    assert_eq!(decode_operand(&[], 31, OperandLength::Byte), Err(DecodeError::ExhaustedInput));
}

#[test]
fn test_two_scaled_operands() {
    // both index bytes precede both displacements
    let inst = InstDecoder::decode_slice(&[0x97, 0xef, 0x4a, 0x5c, 0x04, 0x08]).unwrap();
    assert_eq!(inst.len(), 6);
    let src = inst.operand(0);
    assert_eq!((src.reg0(), src.disp0()), (Some(Register::R1), 4));
    assert_eq!((src.index_reg(), src.index_scale()), (Some(Register::R2), Some(Scale::Word)));
    let dest = inst.operand(1);
    assert_eq!((dest.reg0(), dest.disp0()), (Some(Register::R3), 8));
    assert_eq!((dest.index_reg(), dest.index_scale()), (Some(Register::R4), Some(Scale::Double)));
}

#[test]
fn test_classify() {
    assert_eq!(classify(0x0a), Format::Format0);
    assert_eq!(classify(0x02), Format::Format1);
    assert_eq!(classify(0x0c), Format::Format2);
    assert_eq!(classify(0x7c), Format::Format3);
    assert_eq!(classify(0x00), Format::Format4);
    assert_eq!(classify(0x0e), Format::Format5);
    assert_eq!(classify(0x4e), Format::Format6);
    assert_eq!(classify(0xce), Format::Format7);
    assert_eq!(classify(0x2e), Format::Format8);
    assert_eq!(classify(0x3e), Format::Format9);
    assert_eq!(classify(0xa2), Format::Nop);
    assert_eq!(classify(0xfa), Format::Nop);
    assert_eq!(classify(0xbe), Format::Format11);
    assert_eq!(classify(0xfe), Format::Format12);
    assert_eq!(classify(0x1e), Format::Format14);
    assert_eq!(classify(0x16), Format::Format15);
    assert_eq!(classify(0x06), Format::Undefined);
    assert_eq!(classify(0x7e), Format::Undefined);
    assert_eq!(classify(0xff), Format::Undefined);
    assert_eq!(Format::Format14.id(), 14);
    assert_eq!(Format::Nop.id(), 10);

    for b in 0..=255u8 {
        assert_eq!(classify(b), classify(b));
    }
}

#[test]
fn test_instruction_fields() {
    let inst = InstDecoder::decode_slice(&[0x8d, 0x07]).unwrap();
    assert_eq!(inst.format(), Format::Format2);
    assert_eq!(inst.opcode(), 0);
    assert_eq!(inst.mnemonic(), "addqw");
    assert_eq!(inst.operand_length(), OperandLength::Word);
    assert_eq!(inst.operands().len(), 2);
    assert_eq!(inst.operand(0).mode(), AddressingMode::Quick);
    assert_eq!(inst.operand(0).disp0(), -1);
    assert!(!inst.is_undefined());

    let inst = InstDecoder::decode_slice(&[0x0a, 0x04]).unwrap();
    assert_eq!(inst.operand(0).mode(), AddressingMode::Immediate);
    assert_eq!(inst.operand(0).reg0(), Some(Register::PC));
}

#[test]
fn test_strict_decoder() {
    assert!(!InstDecoder::default().is_strict());
    assert!(InstDecoder::strict().is_strict());

    let mut reader = yaxpeax_arch::U8Reader::new(&[0x06]);
    assert_eq!(InstDecoder::strict().decode(&mut reader), Err(DecodeError::Undefined));

    let mut reader = yaxpeax_arch::U8Reader::new(&[0x25, 0x00]);
    assert_eq!(InstDecoder::strict().decode(&mut reader), Err(DecodeError::Undefined));

    let inst = InstDecoder::decode_slice(&[0x25, 0x00]).unwrap();
    assert!(inst.is_undefined());
    assert_eq!(inst.format(), Format::Undefined);
    assert_eq!(inst.operand_count(), 0);
    assert_eq!(inst.len(), 2);
    assert!(!yaxpeax_arch::Instruction::well_defined(&inst));
}

#[test]
fn test_truncated_instruction() {
    assert_eq!(InstDecoder::decode_slice(&[0x0a]), Err(DecodeError::ExhaustedInput));
    assert_eq!(InstDecoder::decode_slice(&[]), Err(DecodeError::ExhaustedInput));
    assert_eq!(InstDecoder::decode_slice(&[0x15, 0xa0, 0x12]), Err(DecodeError::ExhaustedInput));
}

#[test]
fn test_disassembler_lines() {
    let code = [0xa2, 0x27, 0xc0, 0x08, 0x06, 0x62, 0x07];
    let lines: Vec<String> = Disassembler::with_base(&code, 0x2000)
        .map(|line| line.to_string())
        .collect();
    assert_eq!(lines, [
        "00002000\tnop",
        "00002001\taddr\t8(fp),r0",
        "00002004\t???",
        "00002005\tsave\t[r0,r1,r2]",
    ]);

    let mut disassembler = Disassembler::new(&code);
    let line = disassembler.next().unwrap();
    assert_eq!(line.address(), 0);
    assert_eq!(line.instruction().mnemonic(), "nop");
    assert_eq!(disassembler.offset(), 1);
}

#[test]
fn test_disassembler_truncated_tail() {
    // a branch whose displacement runs off the end of the buffer
    let code = [0xa2, 0x0a, 0x81];
    let lines: Vec<(u32, u8, bool)> = Disassembler::new(&code)
        .map(|line| (line.address(), line.instruction().len(), line.instruction().is_undefined()))
        .collect();
    assert_eq!(lines, [(0, 1, false), (1, 2, true)]);
}

#[test]
fn test_disassembler_strict() {
    let code = [0x06, 0xa2];
    let lines: Vec<String> = Disassembler::new(&code)
        .with_decoder(InstDecoder::strict())
        .map(|line| line.to_string())
        .collect();
    assert_eq!(lines, ["00000000\t???", "00000001\tnop"]);
}

#[test]
fn test_disassemble() {
    assert_eq!(disassemble(&[0x0a, 0x04]), (2, "beq\t4".to_string()));
    assert_eq!(disassemble(&[0x0a, 0x04, 0xa2]), (2, "beq\t4".to_string()));
    assert_eq!(disassemble(&[0x0a]), (1, "???".to_string()));
    assert_eq!(disassemble(&[]), (0, String::new()));
}
