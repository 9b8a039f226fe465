#![no_std]

//! Metadata for 16-bit device registers: bit fields, per-bit labels and units.

use core::fmt::{self, Write};

use heapless::{String, Vec};

/// Number of bits in a register word.
pub const REGISTER_BITS: usize = 16;

/// Labels of every bit in a register, MSB first.
pub type BitLabels = [&'static str; REGISTER_BITS];

/// Human readable name of the unit a register value is expressed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct UnitLabel {
    pub full: &'static str,
    pub plural: &'static str,
    pub short: &'static str,
}

impl UnitLabel {
    pub const fn new(full: &'static str, plural: &'static str, short: &'static str) -> Self {
        Self {
            full,
            plural,
            short,
        }
    }
}

/// A contiguous group of bits inside a 16-bit register word.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct BitField {
    pos: u8,
    width: u8,
}

impl BitField {
    pub const fn new(pos: u8, width: u8) -> Self {
        assert!(width > 0 && pos as usize + width as usize <= REGISTER_BITS);
        Self { pos, width }
    }

    pub const fn pos(&self) -> u8 {
        self.pos
    }

    pub const fn width(&self) -> u8 {
        self.width
    }

    /// Mask of the field, not shifted into position.
    #[inline(always)]
    pub const fn value_mask(&self) -> u16 {
        ((1u32 << self.width) - 1) as u16
    }

    /// Mask covering exactly the bits of this field.
    #[inline(always)]
    pub const fn mask(&self) -> u16 {
        self.value_mask() << self.pos
    }

    #[inline(always)]
    pub const fn read(&self, word: u16) -> u16 {
        (word >> self.pos) & self.value_mask()
    }

    /// Replaces the field in `word` with `value`, leaving every other bit alone.
    #[inline(always)]
    pub fn write(&self, word: u16, value: u16) -> u16 {
        // make sure value fits into field
        debug_assert!(value <= self.value_mask());

        (word & !self.mask()) | ((value & self.value_mask()) << self.pos)
    }
}

/// One register bit paired with its label.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct LabelBit {
    pub label: &'static str,
    pub set: bool,
}

impl fmt::Display for LabelBit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.label, self.set as u8)
    }
}

/// Diagnostic rendering of a raw register: every bit with its label, and the
/// whole word as a binary string.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ExtendedView {
    pub bits: Vec<LabelBit, REGISTER_BITS>,
    pub binary: String<REGISTER_BITS>,
}

impl ExtendedView {
    /// Builds the view of a big-endian register buffer.
    ///
    /// ```rust
    /// # use device_descriptor::ExtendedView;
    /// let labels = [
    ///     "B15", "B14", "B13", "B12", "B11", "B10", "B9", "B8",
    ///     "B7", "B6", "B5", "B4", "B3", "B2", "B1", "B0",
    /// ];
    /// let view = ExtendedView::new(&labels, [0x80, 0x01]);
    ///
    /// assert_eq!(view.binary.as_str(), "1000000000000001");
    /// assert!(view.bits[0].set);
    /// assert!(view.bits[15].set);
    /// assert!(!view.bits[7].set);
    /// ```
    pub fn new(labels: &BitLabels, bytes: [u8; 2]) -> Self {
        let mut binary = String::new();
        // 16 characters always fit
        _ = write!(binary, "{:08b}{:08b}", bytes[0], bytes[1]);

        let bits = labels
            .iter()
            .zip(binary.as_bytes())
            .map(|(&label, &digit)| LabelBit {
                label,
                set: digit == b'1',
            })
            .collect();

        Self { bits, binary }
    }

    /// View of a value that is calculated rather than read from a register.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.bits.is_empty()
    }
}

/// Declares a closed set of field settings and its conversions to and from the
/// raw field bits.
#[macro_export]
macro_rules! field_enum {
    (
        $(#[$meta:meta])*
        $vis:vis enum $type:ident {
            $(
                $(#[$vmeta:meta])*
                $name:ident = $value:expr
            ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, PartialEq, Eq, Copy, Clone)]
        #[cfg_attr(feature = "defmt", derive(defmt::Format))]
        $vis enum $type {
            $(
                $(#[$vmeta])*
                $name = $value
            ),+
        }

        impl $type {
            pub const ALL: &'static [$type] = &[$($type::$name),+];
        }

        impl core::convert::TryFrom<u16> for $type {
            type Error = u16;

            fn try_from(data: u16) -> Result<Self, Self::Error> {
                match data {
                    $(x if x == $value => Ok($type::$name),)+
                    _ => Err(data)
                }
            }
        }

        impl From<$type> for u16 {
            fn from(data: $type) -> u16 {
                data as u16
            }
        }
    };
}

#[cfg(test)]
mod test {
    use super::*;

    const LABELS: BitLabels = [
        "RST", "-", "BRNG", "PG1", "PG0", "BADC4", "BADC3", "BADC2", "BADC1", "SADC4", "SADC3",
        "SADC2", "SADC1", "MODE3", "MODE2", "MODE1",
    ];

    field_enum! {
        enum Sample {
            One = 0,
            Two = 2,
            Three = 3
        }
    }

    #[test]
    fn field_write_only_touches_its_bits() {
        let field = BitField::new(11, 2);

        assert_eq!(field.mask(), 0b0001_1000_0000_0000);
        assert_eq!(field.write(0xFFFF, 0), 0xE7FF);
        assert_eq!(field.write(0x0000, 3), 0x1800);
        assert_eq!(field.read(0x1800), 3);
    }

    #[test]
    fn full_width_field() {
        let field = BitField::new(0, 16);

        assert_eq!(field.mask(), 0xFFFF);
        assert_eq!(field.write(0x1234, 0xBEEF), 0xBEEF);
    }

    #[test]
    fn extended_view_labels_every_bit() {
        let view = ExtendedView::new(&LABELS, [0x3E, 0xEF]);

        assert_eq!(view.binary.as_str(), "0011111011101111");
        assert_eq!(view.bits.len(), REGISTER_BITS);

        for (bit, (label, digit)) in view
            .bits
            .iter()
            .zip(LABELS.iter().zip(view.binary.chars()))
        {
            assert_eq!(bit.label, *label);
            assert_eq!(bit.set, digit == '1');
        }
    }

    #[test]
    fn label_bit_renders_as_pair() {
        let mut rendered = String::<16>::new();
        write!(rendered, "{}", LabelBit { label: "CNVR", set: true }).unwrap();

        assert_eq!(rendered.as_str(), "CNVR:1");
    }

    #[test]
    fn field_enum_conversions() {
        assert_eq!(Sample::try_from(2), Ok(Sample::Two));
        assert_eq!(Sample::try_from(1), Err(1));
        assert_eq!(u16::from(Sample::Three), 3);
        assert_eq!(Sample::ALL.len(), 3);
    }
}
