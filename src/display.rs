use core::fmt;

use crate::tables;
use crate::{AddressingMode, Instruction, Operand, Register};

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.mnemonic.as_str())?;

        let mut operands = self.operands.iter().take_while(|op| !op.is_nothing());
        if let Some(first) = operands.next() {
            f.write_str("\t")?;
            fmt::Display::fmt(first, f)?;
            for op in operands {
                f.write_str(",")?;
                fmt::Display::fmt(op, f)?;
            }
        }
        Ok(())
    }
}

impl fmt::Display for Register {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.name())
    }
}

fn write_reg(f: &mut fmt::Formatter, reg: Option<Register>) -> fmt::Result {
    f.write_str(reg.map(|reg| reg.name()).unwrap_or("???"))
}

/// `bits` binary digits of `value`, most significant first.
fn write_bit_list(f: &mut fmt::Formatter, value: i32, bits: u32) -> fmt::Result {
    f.write_str("B'")?;
    for bit in (0..bits).rev() {
        f.write_str(if ((value as u32) >> bit) & 1 != 0 { "1" } else { "0" })?;
    }
    Ok(())
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.mode {
            AddressingMode::None => {}
            AddressingMode::Register |
            AddressingMode::DedicatedRegister |
            AddressingMode::MmuRegister => {
                write_reg(f, self.reg0)?;
            }
            AddressingMode::RegisterRelative |
            AddressingMode::MemorySpace => {
                write!(f, "{}(", self.disp0)?;
                write_reg(f, self.reg0)?;
                f.write_str(")")?;
            }
            AddressingMode::MemoryRelative => {
                write!(f, "{}({}(", self.disp1, self.disp0)?;
                write_reg(f, self.reg0)?;
                f.write_str("))")?;
            }
            AddressingMode::Quick |
            AddressingMode::Immediate => {
                write!(f, "{}", self.disp0)?;
            }
            AddressingMode::Absolute => {
                write!(f, "@{}", self.disp0)?;
            }
            AddressingMode::External => {
                write!(f, "ext({})", self.disp0)?;
                if self.disp1 != 0 {
                    write!(f, "+{}", self.disp1)?;
                }
            }
            AddressingMode::TopOfStack => {
                f.write_str("tos")?;
            }
            AddressingMode::RegisterList => {
                f.write_str("[")?;
                let mut first = true;
                for reg in 0..8u8 {
                    if self.disp0 & (1 << reg) != 0 {
                        if !first {
                            f.write_str(",")?;
                        }
                        first = false;
                        f.write_str(Register::gpr(reg).name())?;
                    }
                }
                f.write_str("]")?;
            }
            AddressingMode::BitListByte => {
                write_bit_list(f, self.disp0, 8)?;
            }
            AddressingMode::BitListWord => {
                write_bit_list(f, self.disp0, 16)?;
            }
            AddressingMode::BitListDouble => {
                write_bit_list(f, self.disp0, 32)?;
            }
            AddressingMode::StringOption => {
                f.write_str(tables::STRING_OPTIONS[((self.disp0 >> 1) & 0b111) as usize])?;
            }
            AddressingMode::ConfigBits => {
                f.write_str("[")?;
                let mut first = true;
                for (bit, flag) in tables::CONFIG_FLAGS.iter().enumerate() {
                    if self.disp0 & (1 << bit) != 0 {
                        if !first {
                            f.write_str(",")?;
                        }
                        first = false;
                        f.write_str(flag)?;
                    }
                }
                f.write_str("]")?;
            }
            AddressingMode::CacheInvalidateFlags => {
                let mut first = true;
                for (bit, flag) in tables::CACHE_INVALIDATE_FLAGS.iter() {
                    if self.disp0 & bit != 0 {
                        if !first {
                            f.write_str(",")?;
                        }
                        first = false;
                        f.write_str(flag)?;
                    }
                }
            }
            AddressingMode::Invalid => {
                f.write_str("?")?;
            }
        }

        if let Some(index) = self.index {
            write!(f, "[{}:{}]", index.reg, index.scale.suffix())?;
        }
        Ok(())
    }
}
