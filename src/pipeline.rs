// Drives the per-pixel and per-block stages across the image grid, in both
// directions. Every stage is a pure map: it builds a new grid from the
// previous one and never mutates its input.

use log::info;

use crate::chroma;
use crate::codeword::{self, QuantTuple};
use crate::colormath::{self, BlockTuple, NormRgb, YPbPr};
use crate::grid::Grid;

// Raw RGB pixel, channels in [0, denom].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Rgb {
  pub r: u16,
  pub g: u16,
  pub b: u16,
}

pub struct Image {
  pub denom: u16,
  pub pixels: Grid<Rgb>,
}

impl Image {
  pub fn width(&self) -> usize {
    self.pixels.width()
  }

  pub fn height(&self) -> usize {
    self.pixels.height()
  }
}

// Not written to the wire format: the compressed stream carries no metadata
// beyond width/height.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CompressionStats {
  pub input_bytes: usize,
  pub output_bytes: usize,
  pub block_count: usize,
}

impl CompressionStats {
  pub fn ratio(&self) -> f64 {
    if self.output_bytes == 0 {
      0.0
    } else {
      self.input_bytes as f64 / self.output_bytes as f64
    }
  }
}

pub fn trim(image: &Image) -> Image {
  let width = if image.width() % 2 == 0 { image.width() } else { image.width() - 1 };
  let height = if image.height() % 2 == 0 { image.height() } else { image.height() - 1 };

  let pixels = Grid::build(width, height, |col, row| *image.pixels.at(col, row));
  Image { denom: image.denom, pixels }
}

fn normalize_rgb(image: &Image) -> Grid<NormRgb> {
  let denom = image.denom;
  Grid::build(image.width(), image.height(), |col, row| {
    let px = image.pixels.at(col, row);
    NormRgb {
      r: colormath::normalize(px.r, denom),
      g: colormath::normalize(px.g, denom),
      b: colormath::normalize(px.b, denom),
    }
  })
}

fn rgb_to_ypbpr_grid(rgb: &Grid<NormRgb>) -> Grid<YPbPr> {
  Grid::build(rgb.width(), rgb.height(), |col, row| colormath::rgb_to_ypbpr(*rgb.at(col, row)))
}

// The four pixels of block (I, J) live at image positions
// (2I, 2J), (2I+1, 2J), (2I, 2J+1), (2I+1, 2J+1) - y1..y4 respectively.
fn ypbpr_to_dct_blocks(cv: &Grid<YPbPr>) -> Grid<BlockTuple> {
  let block_width = cv.width() / 2;
  let block_height = cv.height() / 2;

  Grid::build(block_width, block_height, |bi, bj| {
    let p1 = *cv.at(2 * bi, 2 * bj);
    let p2 = *cv.at(2 * bi + 1, 2 * bj);
    let p3 = *cv.at(2 * bi, 2 * bj + 1);
    let p4 = *cv.at(2 * bi + 1, 2 * bj + 1);

    let pb_avg = (p1.pb + p2.pb + p3.pb + p4.pb) / 4.0;
    let pr_avg = (p1.pr + p2.pr + p3.pr + p4.pr) / 4.0;

    colormath::forward_block(p1.y, p2.y, p3.y, p4.y, pb_avg, pr_avg)
  })
}

fn quantize_blocks(blocks: &Grid<BlockTuple>) -> Grid<QuantTuple> {
  Grid::build(blocks.width(), blocks.height(), |col, row| {
    let t = blocks.at(col, row);
    let clamp_bcd = |v: f32| v.clamp(-0.3, 0.3);

    QuantTuple {
      a: colormath::quantize(t.a, 1.0, 511.0) as u32,
      b: colormath::quantize(clamp_bcd(t.b), 0.3, 15.0),
      c: colormath::quantize(clamp_bcd(t.c), 0.3, 15.0),
      d: colormath::quantize(clamp_bcd(t.d), 0.3, 15.0),
      pb_idx: chroma::chroma_to_index(t.pb_avg),
      pr_idx: chroma::chroma_to_index(t.pr_avg),
    }
  })
}

fn pack_words(tuples: &Grid<QuantTuple>) -> Grid<u32> {
  Grid::build(tuples.width(), tuples.height(), |col, row| codeword::pack(*tuples.at(col, row)))
}

pub fn compress(image: &Image) -> (usize, usize, Grid<u32>, CompressionStats) {
  let trimmed = trim(image);
  let norm = normalize_rgb(&trimmed);
  let cv = rgb_to_ypbpr_grid(&norm);
  let blocks = ypbpr_to_dct_blocks(&cv);
  let quantized = quantize_blocks(&blocks);
  let words = pack_words(&quantized);

  let input_bytes = trimmed.width() * trimmed.height() * 3;
  let output_bytes = words.width() * words.height() * 4;
  let stats = CompressionStats {
    input_bytes,
    output_bytes,
    block_count: words.width() * words.height(),
  };
  info!(
    "compressed {}x{} image ({} bytes) into {} codewords ({} bytes, {:.2}:1)",
    trimmed.width(),
    trimmed.height(),
    input_bytes,
    stats.block_count,
    output_bytes,
    stats.ratio()
  );

  (trimmed.width(), trimmed.height(), words, stats)
}

fn unpack_words(words: &Grid<u32>) -> Grid<QuantTuple> {
  Grid::build(words.width(), words.height(), |col, row| codeword::unpack(*words.at(col, row)))
}

fn unquantize_blocks(tuples: &Grid<QuantTuple>) -> Grid<BlockTuple> {
  Grid::build(tuples.width(), tuples.height(), |col, row| {
    let t = tuples.at(col, row);
    BlockTuple {
      a: colormath::dequantize(t.a as i32, 1.0, 511.0),
      b: colormath::dequantize(t.b, 0.3, 15.0),
      c: colormath::dequantize(t.c, 0.3, 15.0),
      d: colormath::dequantize(t.d, 0.3, 15.0),
      pb_avg: chroma::index_to_chroma(t.pb_idx),
      pr_avg: chroma::index_to_chroma(t.pr_idx),
    }
  })
}

fn dct_blocks_to_ypbpr(blocks: &Grid<BlockTuple>) -> Grid<YPbPr> {
  let width = blocks.width() * 2;
  let height = blocks.height() * 2;

  Grid::build(width, height, |col, row| {
    let bi = col / 2;
    let bj = row / 2;
    let t = *blocks.at(bi, bj);
    let (y1, y2, y3, y4) = colormath::inverse_block(t);

    let y = match (col % 2, row % 2) {
      (0, 0) => y1,
      (1, 0) => y2,
      (0, 1) => y3,
      _ => y4,
    };

    YPbPr { y, pb: t.pb_avg, pr: t.pr_avg }
  })
}

fn ypbpr_to_rgb_grid(cv: &Grid<YPbPr>) -> Grid<NormRgb> {
  Grid::build(cv.width(), cv.height(), |col, row| colormath::ypbpr_to_rgb(*cv.at(col, row)))
}

fn denormalize_rgb(norm: &Grid<NormRgb>, denom: u16) -> Grid<Rgb> {
  Grid::build(norm.width(), norm.height(), |col, row| {
    let px = norm.at(col, row);
    Rgb {
      r: colormath::denormalize(px.r, denom),
      g: colormath::denormalize(px.g, denom),
      b: colormath::denormalize(px.b, denom),
    }
  })
}

// denom is the output image's channel denominator (255 for the PPM the CLI
// writes).
pub fn decompress(words: &Grid<u32>, denom: u16) -> Image {
  let tuples = unpack_words(words);
  let blocks = unquantize_blocks(&tuples);
  let cv = dct_blocks_to_ypbpr(&blocks);
  let norm = ypbpr_to_rgb_grid(&cv);
  let pixels = denormalize_rgb(&norm, denom);

  info!("decompressed {} codewords into a {}x{} image", words.width() * words.height(), pixels.width(), pixels.height());

  Image { denom, pixels }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn checkerboard(width: usize, height: usize) -> Image {
    let pixels = Grid::build(width, height, |col, row| {
      if (col + row) % 2 == 0 {
        Rgb { r: 200, g: 50, b: 10 }
      } else {
        Rgb { r: 10, g: 60, b: 220 }
      }
    });
    Image { denom: 255, pixels }
  }

  #[test]
  fn trim_drops_odd_row_and_column() {
    let image = checkerboard(5, 3);
    let trimmed = trim(&image);
    assert_eq!(trimmed.width(), 4);
    assert_eq!(trimmed.height(), 2);
  }

  #[test]
  fn compress_produces_expected_block_grid_size() {
    let image = checkerboard(8, 4);
    let (w, h, words, stats) = compress(&image);
    assert_eq!((w, h), (8, 4));
    assert_eq!(words.width(), 4);
    assert_eq!(words.height(), 2);
    assert_eq!(stats.block_count, 8);
    assert_eq!(stats.output_bytes, 32);
  }

  #[test]
  fn roundtrip_rmse_below_threshold() {
    let image = checkerboard(16, 16);
    let (_, _, words, _) = compress(&image);
    let decompressed = decompress(&words, 255);

    let mut sum_sq = 0.0f64;
    let mut n = 0usize;
    for row in 0..decompressed.height() {
      for col in 0..decompressed.width() {
        let orig = image.pixels.at(col, row);
        let recon = decompressed.pixels.at(col, row);
        for (a, b) in [(orig.r, recon.r), (orig.g, recon.g), (orig.b, recon.b)] {
          let diff = a as f64 - b as f64;
          sum_sq += diff * diff;
          n += 1;
        }
      }
    }
    let rmse = (sum_sq / n as f64).sqrt() / 255.0;
    assert!(rmse < 0.05, "rmse {} exceeded threshold", rmse);
  }

  #[test]
  fn codeword_byte_count_matches_block_grid_size() {
    let image = checkerboard(4, 2);
    let (w, h, words, _) = compress(&image);
    let expected_bytes = 4 * (w / 2) * (h / 2);
    assert_eq!(words.width() * words.height() * 4, expected_bytes);
  }

  #[test]
  fn compression_is_deterministic() {
    let image = checkerboard(10, 6);
    let (_, _, words1, _) = compress(&image);
    let (_, _, words2, _) = compress(&image);
    for row in 0..words1.height() {
      for col in 0..words1.width() {
        assert_eq!(words1.at(col, row), words2.at(col, row));
      }
    }
  }
}
