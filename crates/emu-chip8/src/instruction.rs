//! Instruction decoding.
//!
//! One 16-bit big-endian word decodes into an [`Instruction`] with all
//! operand fields extracted, so execution is a single exhaustive match.
//! Operand fields follow the usual CHIP-8 convention: `x` = bits 8-11,
//! `y` = bits 4-7, `n`/`nn`/`nnn` = low nibble/byte/12-bit immediate.

/// A decoded CHIP-8 / SUPER-CHIP instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Instruction {
    /// 00E0: clear the selected display plane(s).
    ClearScreen,
    /// 00EE: return from subroutine.
    Return,
    /// 00CN: scroll the selected plane(s) down N rows.
    ScrollDown(u8),
    /// 00DN: scroll the selected plane(s) up N rows.
    ScrollUp(u8),
    /// 00FB: scroll right by the fixed step.
    ScrollRight,
    /// 00FC: scroll left by the fixed step.
    ScrollLeft,
    /// 00FA: toggle compatibility mode.
    ToggleCompat,
    /// 00FD: stop the interpreter.
    Exit,
    /// 00FE: switch to 64x32 resolution.
    LowRes,
    /// 00FF: switch to 128x64 resolution.
    HighRes,
    /// 1NNN: jump.
    Jump(u16),
    /// 2NNN: call subroutine.
    Call(u16),
    /// 3XNN: skip next if VX == NN.
    SkipEqImm(u8, u8),
    /// 4XNN: skip next if VX != NN.
    SkipNeImm(u8, u8),
    /// 5XY0: skip next if VX == VY.
    SkipEq(u8, u8),
    /// 9XY0: skip next if VX != VY.
    SkipNe(u8, u8),
    /// 6XNN: VX = NN.
    SetImm(u8, u8),
    /// 7XNN: VX += NN (mod 256, VF untouched).
    AddImm(u8, u8),
    /// 8XY0: VX = VY.
    Assign(u8, u8),
    /// 8XY1: VX |= VY.
    Or(u8, u8),
    /// 8XY2: VX &= VY.
    And(u8, u8),
    /// 8XY3: VX ^= VY.
    Xor(u8, u8),
    /// 8XY4: VX += VY, VF = carry.
    Add(u8, u8),
    /// 8XY5: VX -= VY, VF = 1 iff no borrow.
    Sub(u8, u8),
    /// 8XY7: VX = VY - VX, VF = 1 iff no borrow.
    SubFrom(u8, u8),
    /// 8XY6: shift right, VF = bit shifted out.
    ShiftRight(u8, u8),
    /// 8XYE: shift left, VF = bit shifted out.
    ShiftLeft(u8, u8),
    /// ANNN: I = NNN.
    SetIndex(u16),
    /// BNNN: jump to NNN + V0.
    JumpOffset(u16),
    /// CXNN: VX = random byte AND NN.
    Random(u8, u8),
    /// DXYN: XOR-draw an 8-wide, N-tall sprite from I at (VX, VY).
    Draw(u8, u8, u8),
    /// EX9E: skip next if key VX is down.
    SkipKeyDown(u8),
    /// EXA1: skip next if key VX is up.
    SkipKeyUp(u8),
    /// FX07: VX = delay timer.
    ReadDelay(u8),
    /// FX0A: block until a key press, store the key in VX.
    WaitKey(u8),
    /// FX15: delay timer = VX.
    SetDelay(u8),
    /// FX18: sound timer = VX.
    SetSound(u8),
    /// FX1E: I += VX.
    AddIndex(u8),
    /// FX29: I = font glyph address for digit VX.
    FontGlyph(u8),
    /// FX33: store VX as three decimal digits at I, I+1, I+2.
    StoreBcd(u8),
    /// FX55: store V0..=VX at I.
    StoreRegisters(u8),
    /// FX65: load V0..=VX from I.
    LoadRegisters(u8),
}

impl Instruction {
    /// Decode one instruction word. Returns `None` for opcodes outside
    /// the recognized set; the caller reports those and carries on.
    #[must_use]
    pub fn decode(word: u16) -> Option<Self> {
        let x = ((word >> 8) & 0xF) as u8;
        let y = ((word >> 4) & 0xF) as u8;
        let n = (word & 0xF) as u8;
        let nn = (word & 0xFF) as u8;
        let nnn = word & 0xFFF;

        match word >> 12 {
            0x0 if x == 0 => match nn {
                0xE0 => Some(Self::ClearScreen),
                0xEE => Some(Self::Return),
                0xC0..=0xCF => Some(Self::ScrollDown(n)),
                0xD0..=0xDF => Some(Self::ScrollUp(n)),
                0xFA => Some(Self::ToggleCompat),
                0xFB => Some(Self::ScrollRight),
                0xFC => Some(Self::ScrollLeft),
                0xFD => Some(Self::Exit),
                0xFE => Some(Self::LowRes),
                0xFF => Some(Self::HighRes),
                _ => None,
            },
            0x1 => Some(Self::Jump(nnn)),
            0x2 => Some(Self::Call(nnn)),
            0x3 => Some(Self::SkipEqImm(x, nn)),
            0x4 => Some(Self::SkipNeImm(x, nn)),
            0x5 if n == 0 => Some(Self::SkipEq(x, y)),
            0x6 => Some(Self::SetImm(x, nn)),
            0x7 => Some(Self::AddImm(x, nn)),
            0x8 => match n {
                0x0 => Some(Self::Assign(x, y)),
                0x1 => Some(Self::Or(x, y)),
                0x2 => Some(Self::And(x, y)),
                0x3 => Some(Self::Xor(x, y)),
                0x4 => Some(Self::Add(x, y)),
                0x5 => Some(Self::Sub(x, y)),
                0x6 => Some(Self::ShiftRight(x, y)),
                0x7 => Some(Self::SubFrom(x, y)),
                0xE => Some(Self::ShiftLeft(x, y)),
                _ => None,
            },
            0x9 if n == 0 => Some(Self::SkipNe(x, y)),
            0xA => Some(Self::SetIndex(nnn)),
            0xB => Some(Self::JumpOffset(nnn)),
            0xC => Some(Self::Random(x, nn)),
            0xD => Some(Self::Draw(x, y, n)),
            0xE => match nn {
                0x9E => Some(Self::SkipKeyDown(x)),
                0xA1 => Some(Self::SkipKeyUp(x)),
                _ => None,
            },
            0xF => match nn {
                0x07 => Some(Self::ReadDelay(x)),
                0x0A => Some(Self::WaitKey(x)),
                0x15 => Some(Self::SetDelay(x)),
                0x18 => Some(Self::SetSound(x)),
                0x1E => Some(Self::AddIndex(x)),
                0x29 => Some(Self::FontGlyph(x)),
                0x33 => Some(Self::StoreBcd(x)),
                0x55 => Some(Self::StoreRegisters(x)),
                0x65 => Some(Self::LoadRegisters(x)),
                _ => None,
            },
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_system_opcodes() {
        assert_eq!(Instruction::decode(0x00E0), Some(Instruction::ClearScreen));
        assert_eq!(Instruction::decode(0x00EE), Some(Instruction::Return));
        assert_eq!(Instruction::decode(0x00FD), Some(Instruction::Exit));
        assert_eq!(Instruction::decode(0x00FE), Some(Instruction::LowRes));
        assert_eq!(Instruction::decode(0x00FF), Some(Instruction::HighRes));
        assert_eq!(Instruction::decode(0x00FA), Some(Instruction::ToggleCompat));
    }

    #[test]
    fn decodes_scroll_with_count() {
        assert_eq!(Instruction::decode(0x00C6), Some(Instruction::ScrollDown(6)));
        assert_eq!(Instruction::decode(0x00CC), Some(Instruction::ScrollDown(12)));
        assert_eq!(Instruction::decode(0x00D3), Some(Instruction::ScrollUp(3)));
        assert_eq!(Instruction::decode(0x00FB), Some(Instruction::ScrollRight));
        assert_eq!(Instruction::decode(0x00FC), Some(Instruction::ScrollLeft));
    }

    #[test]
    fn decodes_operand_fields() {
        assert_eq!(Instruction::decode(0x1A5F), Some(Instruction::Jump(0xA5F)));
        assert_eq!(Instruction::decode(0x62C5), Some(Instruction::SetImm(2, 0xC5)));
        assert_eq!(Instruction::decode(0x8AB4), Some(Instruction::Add(0xA, 0xB)));
        assert_eq!(Instruction::decode(0xD01F), Some(Instruction::Draw(0, 1, 0xF)));
        assert_eq!(Instruction::decode(0xF355), Some(Instruction::StoreRegisters(3)));
    }

    #[test]
    fn rejects_malformed_words() {
        // 5XYN and 9XYN require N = 0
        assert_eq!(Instruction::decode(0x5121), None);
        assert_eq!(Instruction::decode(0x9127), None);
        // 8XY8..8XYD are not defined
        assert_eq!(Instruction::decode(0x8128), None);
        // machine-subroutine words (0NNN with X != 0) are unrecognized
        assert_eq!(Instruction::decode(0x0123), None);
        assert_eq!(Instruction::decode(0xE19F), None);
        assert_eq!(Instruction::decode(0xF1FF), None);
    }
}
