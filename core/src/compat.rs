/// Which historical interpreter the shift (8XY6/8XYE) and jump-with-offset
/// (BNNN/BXNN) instructions follow.
#[allow(non_camel_case_types)]
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum Chip8Mode {
    /// Original COSMAC VIP interpreter: shifts copy VY into VX first, BNNN jumps to NNN + V0.
    COSMAC_VIP,
    /// CHIP-48 / SUPER-CHIP: shifts operate on VX in place, BXNN jumps to NN + VX.
    #[default]
    SUPER_CHIP,
}

/// What happens to sprite rows that would be drawn below the bottom edge.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum VerticalEdge {
    /// Rows continue from the top of the display.
    Wrap,
    /// Rows past the bottom are not drawn at all.
    #[default]
    Skip,
}

/// Compatibility policy, fixed when the machine is built.
///
/// Only the shift, jump-with-offset and draw handlers look at this.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct Compatibility {
    pub mode: Chip8Mode,
    pub vertical: VerticalEdge,
}

impl Compatibility {
    pub const fn new(mode: Chip8Mode, vertical: VerticalEdge) -> Compatibility {
        Compatibility { mode, vertical }
    }

    /// Builds the policy from the two configuration switches.
    pub const fn from_flags(cosmac_compatible: bool, vertical_wrapping: bool) -> Compatibility {
        let mode = if cosmac_compatible {
            Chip8Mode::COSMAC_VIP
        } else {
            Chip8Mode::SUPER_CHIP
        };
        let vertical = if vertical_wrapping {
            VerticalEdge::Wrap
        } else {
            VerticalEdge::Skip
        };
        Compatibility { mode, vertical }
    }

    /// Target row for sprite row `offset` drawn from `base`, or `None` when the row is skipped.
    pub(crate) fn sprite_row(&self, base: usize, offset: usize, height: usize) -> Option<usize> {
        let row = base + offset;
        match self.vertical {
            VerticalEdge::Wrap => Some(row % height),
            VerticalEdge::Skip if row < height => Some(row),
            VerticalEdge::Skip => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_flags() {
        let compat = Compatibility::from_flags(true, false);
        assert_eq!(compat.mode, Chip8Mode::COSMAC_VIP);
        assert_eq!(compat.vertical, VerticalEdge::Skip);

        let compat = Compatibility::from_flags(false, true);
        assert_eq!(compat.mode, Chip8Mode::SUPER_CHIP);
        assert_eq!(compat.vertical, VerticalEdge::Wrap);
    }

    #[test]
    fn test_sprite_row_wrap() {
        let compat = Compatibility::new(Chip8Mode::SUPER_CHIP, VerticalEdge::Wrap);
        assert_eq!(compat.sprite_row(30, 1, 32), Some(31));
        assert_eq!(compat.sprite_row(30, 2, 32), Some(0));
        assert_eq!(compat.sprite_row(31, 4, 32), Some(3));
    }

    #[test]
    fn test_sprite_row_skip() {
        let compat = Compatibility::new(Chip8Mode::SUPER_CHIP, VerticalEdge::Skip);
        assert_eq!(compat.sprite_row(30, 1, 32), Some(31));
        assert_eq!(compat.sprite_row(30, 2, 32), None);
    }
}
