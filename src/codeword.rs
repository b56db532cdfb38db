// Quantized block tuple <-> 32-bit codeword layout:
//
//   bits 31..23 : A        (9 bits, unsigned)
//   bits 22..18 : B        (5 bits, signed)
//   bits 17..13 : C        (5 bits, signed)
//   bits 12..8  : D        (5 bits, signed)
//   bits  7..4  : Pb_idx   (4 bits, unsigned)
//   bits  3..0  : Pr_idx   (4 bits, unsigned)

use crate::bitpack;

const A_WIDTH: u32 = 9;
const BCD_WIDTH: u32 = 5;
const PBR_WIDTH: u32 = 4;

const A_LSB: u32 = 23;
const B_LSB: u32 = 18;
const C_LSB: u32 = 13;
const D_LSB: u32 = 8;
const PB_LSB: u32 = 4;
const PR_LSB: u32 = 0;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct QuantTuple {
  pub a: u32,
  pub b: i32,
  pub c: i32,
  pub d: i32,
  pub pb_idx: u8,
  pub pr_idx: u8,
}

// Quantization guarantees every field fits its width; a failure here is a
// pipeline bug, not a data error, so it panics rather than returning Result.
pub fn pack(t: QuantTuple) -> u32 {
  let mut word = 0u64;
  word = bitpack::new_u(word, A_WIDTH, A_LSB, t.a as u64).expect("quantized A out of range");
  word = bitpack::new_s(word, BCD_WIDTH, B_LSB, t.b as i64).expect("quantized B out of range");
  word = bitpack::new_s(word, BCD_WIDTH, C_LSB, t.c as i64).expect("quantized C out of range");
  word = bitpack::new_s(word, BCD_WIDTH, D_LSB, t.d as i64).expect("quantized D out of range");
  word = bitpack::new_u(word, PBR_WIDTH, PB_LSB, t.pb_idx as u64).expect("Pb index out of range");
  word = bitpack::new_u(word, PBR_WIDTH, PR_LSB, t.pr_idx as u64).expect("Pr index out of range");
  word as u32
}

pub fn unpack(word: u32) -> QuantTuple {
  let word = word as u64;
  QuantTuple {
    a: bitpack::get_u(word, A_WIDTH, A_LSB) as u32,
    b: bitpack::get_s(word, BCD_WIDTH, B_LSB) as i32,
    c: bitpack::get_s(word, BCD_WIDTH, C_LSB) as i32,
    d: bitpack::get_s(word, BCD_WIDTH, D_LSB) as i32,
    pb_idx: bitpack::get_u(word, PBR_WIDTH, PB_LSB) as u8,
    pr_idx: bitpack::get_u(word, PBR_WIDTH, PR_LSB) as u8,
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn pack_known_value() {
    let t = QuantTuple { a: 256, b: 0, c: 0, d: 0, pb_idx: 0, pr_idx: 0 };
    assert_eq!(pack(t), 0x8000_0000);
  }

  #[test]
  fn pack_unpack_roundtrip() {
    let t = QuantTuple { a: 511, b: -15, c: 15, d: -1, pb_idx: 15, pr_idx: 3 };
    let word = pack(t);
    assert_eq!(unpack(word), t);
  }
}
