//! Reduced-precision pixel packing.
//!
//! Each packer keeps the most significant bits of every 8-bit channel and
//! places them at a fixed offset in the output word. Layouts are written
//! most significant bit first, matching the GL packed pixel types
//! `UNSIGNED_BYTE_3_3_2`, `UNSIGNED_SHORT_4_4_4_4` and
//! `UNSIGNED_SHORT_5_5_5_1`. The masks must stay exactly as written: the
//! software texture is only a useful reference if it matches what a correct
//! driver conversion produces bit for bit.
//!
//! The `unpack_*` functions go the other way, expanding each field back to
//! 8 bits by bit replication so that an all-zero field maps to 0 and an
//! all-ones field maps to 255.

use crate::color::Rgba8;

/// `rrrgggbb`
pub fn pack_r3g3b2(c: Rgba8) -> u8 {
    (c.r & 0xE0) | ((c.g >> 3) & 0x1C) | ((c.b >> 6) & 0x03)
}

/// `rrggbbaa`
pub fn pack_rgba2222(c: Rgba8) -> u8 {
    (c.r & 0xC0) | ((c.g >> 2) & 0x30) | ((c.b >> 4) & 0x0C) | ((c.a >> 6) & 0x03)
}

/// `rrrrggggbbbbaaaa`
pub fn pack_rgba4444(c: Rgba8) -> u16 {
    let (r, g, b, a) = (c.r as u16, c.g as u16, c.b as u16, c.a as u16);
    (0xF000 & (r << 8)) | (0x0F00 & (g << 4)) | (0x00F0 & b) | (0x000F & (a >> 4))
}

/// `rrrrrgggggbbbbba`
pub fn pack_rgb5a1(c: Rgba8) -> u16 {
    let (r, g, b, a) = (c.r as u16, c.g as u16, c.b as u16, c.a as u16);
    (0xF800 & (r << 8)) | (0x07C0 & (g << 3)) | (0x003E & (b >> 2)) | (0x0001 & (a >> 7))
}

/// Keeps the top two bits of a channel in place.
///
/// This is the per-channel form of the 2-2-2-2 layout, used for uploads
/// since GL has no packed 2-2-2-2 pixel type.
pub fn quantize_channel_2bit(c: u8) -> u8 {
    c & 0xC0
}

/// Returns the `bits` most significant bits of `c`, right-aligned.
///
/// `bits` must be in `1..=8`.
pub fn top_bits(c: u8, bits: u32) -> u8 {
    debug_assert!((1..=8).contains(&bits));
    c >> (8 - bits)
}

/// Widens a right-aligned `bits`-wide field to 8 bits by bit replication.
///
/// `bits` must be in `1..=8` and `field` must fit in `bits` bits.
pub fn expand_bits(field: u8, bits: u32) -> u8 {
    debug_assert!((1..=8).contains(&bits));
    debug_assert!(bits == 8 || field >> bits == 0);
    let mut out = field << (8 - bits);
    let mut filled = bits;
    while filled < 8 {
        out |= out >> filled;
        filled *= 2;
    }
    out
}

/// Expands a 3-3-2 byte. The layout has no alpha, so alpha is opaque.
pub fn unpack_r3g3b2(p: u8) -> Rgba8 {
    Rgba8::new(
        expand_bits(p >> 5, 3),
        expand_bits((p >> 2) & 0x07, 3),
        expand_bits(p & 0x03, 2),
        255,
    )
}

pub fn unpack_rgba2222(p: u8) -> Rgba8 {
    Rgba8::new(
        expand_bits(p >> 6, 2),
        expand_bits((p >> 4) & 0x03, 2),
        expand_bits((p >> 2) & 0x03, 2),
        expand_bits(p & 0x03, 2),
    )
}

pub fn unpack_rgba4444(p: u16) -> Rgba8 {
    let field = |shift: u16| ((p >> shift) & 0x0F) as u8;
    Rgba8::new(
        expand_bits(field(12), 4),
        expand_bits(field(8), 4),
        expand_bits(field(4), 4),
        expand_bits(field(0), 4),
    )
}

pub fn unpack_rgb5a1(p: u16) -> Rgba8 {
    let field = |shift: u16| ((p >> shift) & 0x1F) as u8;
    Rgba8::new(
        expand_bits(field(11), 5),
        expand_bits(field(6), 5),
        expand_bits(field(1), 5),
        expand_bits((p & 0x01) as u8, 1),
    )
}

/// Spreads a 2-2-2-2 byte into four bytes, each field at its channel's top
/// bits. Equal to quantizing every channel of the source with
/// [`quantize_channel_2bit`].
pub fn spread_rgba2222(p: u8) -> [u8; 4] {
    [p & 0xC0, (p << 2) & 0xC0, (p << 4) & 0xC0, (p << 6) & 0xC0]
}

#[cfg(test)]
mod tests {
    use super::*;

    const RED: Rgba8 = Rgba8::new(255, 0, 0, 255);

    #[test]
    fn opaque_red_packs_to_e0_in_332() {
        assert_eq!(pack_r3g3b2(RED), 0xE0);
    }

    #[test]
    fn primaries_land_in_their_332_fields() {
        assert_eq!(pack_r3g3b2(Rgba8::new(0, 255, 0, 0)), 0x1C);
        assert_eq!(pack_r3g3b2(Rgba8::new(0, 0, 255, 0)), 0x03);
        assert_eq!(pack_r3g3b2(Rgba8::WHITE), 0xFF);
        assert_eq!(pack_r3g3b2(Rgba8::BLACK), 0x00);
    }

    #[test]
    fn pack_332_ignores_alpha() {
        let c = Rgba8::new(0x9A, 0x5C, 0xC3, 0);
        assert_eq!(pack_r3g3b2(c), pack_r3g3b2(Rgba8 { a: 255, ..c }));
    }

    #[test]
    fn primaries_land_in_their_2222_fields() {
        assert_eq!(pack_rgba2222(Rgba8::new(255, 0, 0, 0)), 0xC0);
        assert_eq!(pack_rgba2222(Rgba8::new(0, 255, 0, 0)), 0x30);
        assert_eq!(pack_rgba2222(Rgba8::new(0, 0, 255, 0)), 0x0C);
        assert_eq!(pack_rgba2222(Rgba8::new(0, 0, 0, 255)), 0x03);
    }

    #[test]
    fn primaries_land_in_their_4444_fields() {
        assert_eq!(pack_rgba4444(Rgba8::new(255, 0, 0, 0)), 0xF000);
        assert_eq!(pack_rgba4444(Rgba8::new(0, 255, 0, 0)), 0x0F00);
        assert_eq!(pack_rgba4444(Rgba8::new(0, 0, 255, 0)), 0x00F0);
        assert_eq!(pack_rgba4444(Rgba8::new(0, 0, 0, 255)), 0x000F);
    }

    #[test]
    fn primaries_land_in_their_5551_fields() {
        assert_eq!(pack_rgb5a1(Rgba8::new(255, 0, 0, 0)), 0xF800);
        assert_eq!(pack_rgb5a1(Rgba8::new(0, 255, 0, 0)), 0x07C0);
        assert_eq!(pack_rgb5a1(Rgba8::new(0, 0, 255, 0)), 0x003E);
        assert_eq!(pack_rgb5a1(Rgba8::new(0, 0, 0, 255)), 0x0001);
    }

    #[test]
    fn mixed_color_packs_to_known_words() {
        // r = 1011_0110, g = 0101_1001, b = 1110_0011, a = 1000_0001
        let c = Rgba8::new(0xB6, 0x59, 0xE3, 0x81);
        assert_eq!(pack_r3g3b2(c), 0b101_010_11);
        assert_eq!(pack_rgba2222(c), 0b10_01_11_10);
        assert_eq!(pack_rgba4444(c), 0xB5E8);
        assert_eq!(pack_rgb5a1(c), 0b10110_01011_11100_1);
    }

    #[test]
    fn quantize_channel_2bit_keeps_top_two_bits() {
        assert_eq!(quantize_channel_2bit(0xFF), 0xC0);
        assert_eq!(quantize_channel_2bit(0x7F), 0x40);
        assert_eq!(quantize_channel_2bit(0x3F), 0x00);
    }

    #[test]
    fn expand_bits_maps_extremes_to_extremes() {
        for bits in 1..=8 {
            let max = ((1u16 << bits) - 1) as u8;
            assert_eq!(expand_bits(0, bits), 0, "{bits} bits");
            assert_eq!(expand_bits(max, bits), 255, "{bits} bits");
        }
    }

    #[test]
    fn expand_bits_replicates_pattern() {
        assert_eq!(expand_bits(0b101, 3), 0b101_101_10);
        assert_eq!(expand_bits(0b10, 2), 0b10_10_10_10);
        assert_eq!(expand_bits(0b10011, 5), 0b10011_100);
        assert_eq!(expand_bits(0x9, 4), 0x99);
    }

    #[test]
    fn unpack_332_of_red_is_red() {
        assert_eq!(unpack_r3g3b2(0xE0), RED);
    }

    #[test]
    fn spread_2222_matches_channel_quantization() {
        let c = Rgba8::new(0xB6, 0x59, 0xE3, 0x81);
        let spread = spread_rgba2222(pack_rgba2222(c));
        let expected = c.to_array().map(quantize_channel_2bit);
        assert_eq!(spread, expected);
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        fn any_color() -> impl Strategy<Value = Rgba8> {
            any::<[u8; 4]>().prop_map(Rgba8::from)
        }

        /// Asserts every channel of `expanded` is within one quantization
        /// step of `original` and shares its top `bits`.
        fn within_one_step(original: u8, expanded: u8, bits: u32) -> Result<(), TestCaseError> {
            prop_assert_eq!(top_bits(expanded, bits), top_bits(original, bits));
            let step = 1i32 << (8 - bits);
            prop_assert!(
                (expanded as i32 - original as i32).abs() < step,
                "{} -> {} exceeds step {} at {} bits", original, expanded, step, bits
            );
            Ok(())
        }

        proptest! {
            #[test]
            fn r3g3b2_fields_hold_top_bits(c in any_color()) {
                let p = pack_r3g3b2(c);
                prop_assert_eq!(p >> 5, top_bits(c.r, 3));
                prop_assert_eq!((p >> 2) & 0x07, top_bits(c.g, 3));
                prop_assert_eq!(p & 0x03, top_bits(c.b, 2));

                let e = unpack_r3g3b2(p);
                within_one_step(c.r, e.r, 3)?;
                within_one_step(c.g, e.g, 3)?;
                within_one_step(c.b, e.b, 2)?;
            }

            #[test]
            fn rgba2222_fields_hold_top_bits(c in any_color()) {
                let p = pack_rgba2222(c);
                prop_assert_eq!(p >> 6, top_bits(c.r, 2));
                prop_assert_eq!((p >> 4) & 0x03, top_bits(c.g, 2));
                prop_assert_eq!((p >> 2) & 0x03, top_bits(c.b, 2));
                prop_assert_eq!(p & 0x03, top_bits(c.a, 2));

                let e = unpack_rgba2222(p);
                for (o, x) in c.to_array().into_iter().zip(e.to_array()) {
                    within_one_step(o, x, 2)?;
                }
            }

            #[test]
            fn rgba4444_fields_hold_top_bits(c in any_color()) {
                let p = pack_rgba4444(c);
                prop_assert_eq!((p >> 12) as u8, top_bits(c.r, 4));
                prop_assert_eq!(((p >> 8) & 0x0F) as u8, top_bits(c.g, 4));
                prop_assert_eq!(((p >> 4) & 0x0F) as u8, top_bits(c.b, 4));
                prop_assert_eq!((p & 0x0F) as u8, top_bits(c.a, 4));

                let e = unpack_rgba4444(p);
                for (o, x) in c.to_array().into_iter().zip(e.to_array()) {
                    within_one_step(o, x, 4)?;
                }
            }

            #[test]
            fn rgb5a1_fields_hold_top_bits(c in any_color()) {
                let p = pack_rgb5a1(c);
                prop_assert_eq!((p >> 11) as u8, top_bits(c.r, 5));
                prop_assert_eq!(((p >> 6) & 0x1F) as u8, top_bits(c.g, 5));
                prop_assert_eq!(((p >> 1) & 0x1F) as u8, top_bits(c.b, 5));
                prop_assert_eq!((p & 0x01) as u8, top_bits(c.a, 1));

                let e = unpack_rgb5a1(p);
                within_one_step(c.r, e.r, 5)?;
                within_one_step(c.g, e.g, 5)?;
                within_one_step(c.b, e.b, 5)?;
                within_one_step(c.a, e.a, 1)?;
            }

            #[test]
            fn packing_is_pure(c in any_color()) {
                prop_assert_eq!(pack_r3g3b2(c), pack_r3g3b2(c));
                prop_assert_eq!(pack_rgba2222(c), pack_rgba2222(c));
                prop_assert_eq!(pack_rgba4444(c), pack_rgba4444(c));
                prop_assert_eq!(pack_rgb5a1(c), pack_rgb5a1(c));
            }

            #[test]
            fn repacking_an_expansion_is_stable(c in any_color()) {
                let p = pack_rgb5a1(c);
                prop_assert_eq!(pack_rgb5a1(unpack_rgb5a1(p)), p);
                let p = pack_r3g3b2(c);
                prop_assert_eq!(pack_r3g3b2(unpack_r3g3b2(p)), p);
            }
        }
    }
}
