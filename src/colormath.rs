// Pure per-pixel and per-block numeric transforms, all in f32.
//
// Every output is clamped to its stated range after computation, to guard
// against floating-point drift accumulating across repeated transforms.

pub const Y_RANGE: (f32, f32) = (0.0, 1.0);
pub const PBR_RANGE: (f32, f32) = (-0.5, 0.5);
pub const BCD_RANGE: (f32, f32) = (-0.5, 0.5);

fn clamp(x: f32, lo: f32, hi: f32) -> f32 {
  if x < lo {
    lo
  } else if x > hi {
    hi
  } else {
    x
  }
}

// Normalized RGB pixel, each channel in [0, 1].
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct NormRgb {
  pub r: f32,
  pub g: f32,
  pub b: f32,
}

pub fn normalize(value: u16, denom: u16) -> f32 {
  clamp(value as f32 / denom as f32, 0.0, 1.0)
}

pub fn denormalize(value: f32, denom: u16) -> u16 {
  clamp(value, 0.0, 1.0).mul_add(denom as f32, 0.0).round() as u16
}

// y in [0, 1], pb/pr in [-0.5, 0.5].
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct YPbPr {
  pub y: f32,
  pub pb: f32,
  pub pr: f32,
}

pub fn rgb_to_ypbpr(rgb: NormRgb) -> YPbPr {
  let NormRgb { r, g, b } = rgb;

  let y = 0.299 * r + 0.587 * g + 0.114 * b;
  let pb = -0.168736 * r - 0.331264 * g + 0.5 * b;
  let pr = 0.5 * r - 0.418688 * g - 0.081312 * b;

  YPbPr {
    y: clamp(y, Y_RANGE.0, Y_RANGE.1),
    pb: clamp(pb, PBR_RANGE.0, PBR_RANGE.1),
    pr: clamp(pr, PBR_RANGE.0, PBR_RANGE.1),
  }
}

pub fn ypbpr_to_rgb(cv: YPbPr) -> NormRgb {
  let YPbPr { y, pb, pr } = cv;

  let r = y + 1.402 * pr;
  let g = y - 0.344136 * pb - 0.714136 * pr;
  let b = y + 1.772 * pb;

  NormRgb {
    r: clamp(r, 0.0, 1.0),
    g: clamp(g, 0.0, 1.0),
    b: clamp(b, 0.0, 1.0),
  }
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct BlockTuple {
  pub a: f32,
  pub b: f32,
  pub c: f32,
  pub d: f32,
  pub pb_avg: f32,
  pub pr_avg: f32,
}

// y1..y4 in row-major order: y1 at (col, row), y2 at (col+1, row), y3 at
// (col, row+1), y4 at (col+1, row+1).
pub fn forward_block(y1: f32, y2: f32, y3: f32, y4: f32, pb_avg: f32, pr_avg: f32) -> BlockTuple {
  let a = (y1 + y2 + y3 + y4) / 4.0;
  let b = (y4 + y3 - y2 - y1) / 4.0;
  let c = (y4 - y3 + y2 - y1) / 4.0;
  let d = (y4 - y3 - y2 + y1) / 4.0;

  BlockTuple {
    a: clamp(a, Y_RANGE.0, Y_RANGE.1),
    b: clamp(b, BCD_RANGE.0, BCD_RANGE.1),
    c: clamp(c, BCD_RANGE.0, BCD_RANGE.1),
    d: clamp(d, BCD_RANGE.0, BCD_RANGE.1),
    pb_avg: clamp(pb_avg, PBR_RANGE.0, PBR_RANGE.1),
    pr_avg: clamp(pr_avg, PBR_RANGE.0, PBR_RANGE.1),
  }
}

// Returns (y1, y2, y3, y4) in the same order as forward_block's inputs.
pub fn inverse_block(t: BlockTuple) -> (f32, f32, f32, f32) {
  let y1 = t.a - t.b - t.c + t.d;
  let y2 = t.a - t.b + t.c - t.d;
  let y3 = t.a + t.b - t.c - t.d;
  let y4 = t.a + t.b + t.c + t.d;

  (
    clamp(y1, Y_RANGE.0, Y_RANGE.1),
    clamp(y2, Y_RANGE.0, Y_RANGE.1),
    clamp(y3, Y_RANGE.0, Y_RANGE.1),
    clamp(y4, Y_RANGE.0, Y_RANGE.1),
  )
}

pub fn quantize(x: f32, denom: f32, upper: f32) -> i32 {
  ((x / denom) * upper).round() as i32
}

pub fn dequantize(q: i32, denom: f32, upper: f32) -> f32 {
  (q as f32 / upper) * denom
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn normalize_clamps() {
    assert_eq!(normalize(0, 255), 0.0);
    assert_eq!(normalize(255, 255), 1.0);
  }

  #[test]
  fn rgb_ypbpr_roundtrip_gray() {
    let rgb = NormRgb { r: 0.5, g: 0.5, b: 0.5 };
    let cv = rgb_to_ypbpr(rgb);
    assert!((cv.y - 0.5).abs() < 1e-5);
    assert!(cv.pb.abs() < 1e-5);
    assert!(cv.pr.abs() < 1e-5);

    let back = ypbpr_to_rgb(cv);
    assert!((back.r - 0.5).abs() < 1e-4);
    assert!((back.g - 0.5).abs() < 1e-4);
    assert!((back.b - 0.5).abs() < 1e-4);
  }

  #[test]
  fn block_transform_roundtrip() {
    let (y1, y2, y3, y4) = (0.1, 0.4, 0.6, 0.9);
    let t = forward_block(y1, y2, y3, y4, 0.1, -0.2);
    let (r1, r2, r3, r4) = inverse_block(t);
    assert!((r1 - y1).abs() < 1e-5);
    assert!((r2 - y2).abs() < 1e-5);
    assert!((r3 - y3).abs() < 1e-5);
    assert!((r4 - y4).abs() < 1e-5);
  }

  #[test]
  fn quantize_a_roundtrips_within_step() {
    let a = 0.7f32;
    let q = quantize(a, 1.0, 511.0);
    assert_eq!(q, 358);
    let back = dequantize(q, 1.0, 511.0);
    assert!((back - a).abs() < 1.0 / 511.0);
  }

  #[test]
  fn quantize_bcd_preclamped() {
    let v = clamp(0.4, -0.3, 0.3);
    let q = quantize(v, 0.3, 15.0);
    assert_eq!(q, 15);
  }
}
