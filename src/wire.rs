// Compressed-stream container: an ASCII header followed by a row-major
// sequence of big-endian 32-bit codewords, one per 2x2 block.

use std::io::{Read, Write};

use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};
use thiserror::Error;

use crate::grid::Grid;

const HEADER_PREFIX: &str = "COMP40 Compressed image format 2\n";

#[derive(Error, Debug)]
pub enum WireError {
  #[error("not a COMP40 compressed stream (bad header)")]
  BadHeader,
  #[error("compressed stream truncated")]
  Truncated,
  #[error(transparent)]
  Io(#[from] std::io::Error),
}

pub fn write_codewords<W: Write>(w: &mut W, width: usize, height: usize, words: &Grid<u32>) -> Result<(), WireError> {
  write!(w, "{}{} {}", HEADER_PREFIX, width, height)?;
  w.write_u8(b'\n')?;

  for row in 0..words.height() {
    for col in 0..words.width() {
      w.write_u32::<BigEndian>(*words.at(col, row))?;
    }
  }

  Ok(())
}

// EOF or a byte-count mismatch is Truncated, not a panic.
pub fn read_codewords<R: Read>(r: &mut R) -> Result<(usize, usize, Grid<u32>), WireError> {
  let mut prefix_buf = vec![0u8; HEADER_PREFIX.len()];
  r.read_exact(&mut prefix_buf).map_err(|_| WireError::BadHeader)?;
  if prefix_buf != HEADER_PREFIX.as_bytes() {
    return Err(WireError::BadHeader);
  }

  let (width, sep) = read_decimal(r)?;
  if sep != b' ' {
    return Err(WireError::BadHeader);
  }
  let (height, sep) = read_decimal(r)?;
  if sep != b'\n' {
    return Err(WireError::BadHeader);
  }

  if width % 2 != 0 || height % 2 != 0 {
    return Err(WireError::BadHeader);
  }

  let block_width = width / 2;
  let block_height = height / 2;

  let mut words = Grid::build(block_width, block_height, |_col, _row| 0u32);
  for row in 0..block_height {
    for col in 0..block_width {
      let word = r.read_u32::<BigEndian>().map_err(|_| WireError::Truncated)?;
      *words.at_mut(col, row) = word;
    }
  }

  Ok((width, height, words))
}

// Read decimal digits, returning the parsed value and the non-digit byte
// that terminated it. A run with no digits is a malformed header.
fn read_decimal<R: Read>(r: &mut R) -> Result<(usize, u8), WireError> {
  let mut v: usize = 0;
  let mut saw_digit = false;
  loop {
    let byte = r.read_u8().map_err(|_| WireError::BadHeader)?;
    match byte {
      b'0'..=b'9' => {
        saw_digit = true;
        v = v * 10 + (byte - b'0') as usize;
      }
      _ if saw_digit => return Ok((v, byte)),
      _ => return Err(WireError::BadHeader),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn roundtrip_header_and_body() {
    let words = Grid::build(2, 1, |col, _row| if col == 0 { 0x8000_0000u32 } else { 0x0000_0001u32 });

    let mut buf = Vec::new();
    write_codewords(&mut buf, 4, 2, &words).unwrap();

    let expected_header = b"COMP40 Compressed image format 2\n4 2\n";
    assert_eq!(&buf[..expected_header.len()], expected_header);
    assert_eq!(buf.len(), expected_header.len() + 8);

    let (w, h, read_back) = read_codewords(&mut &buf[..]).unwrap();
    assert_eq!((w, h), (4, 2));
    assert_eq!(*read_back.at(0, 0), 0x8000_0000);
    assert_eq!(*read_back.at(1, 0), 0x0000_0001);
  }

  #[test]
  fn truncated_body_is_an_error() {
    let mut buf = b"COMP40 Compressed image format 2\n4 2\n".to_vec();
    buf.extend_from_slice(&[0x80, 0x00, 0x00]); // 3 bytes instead of 8
    assert!(matches!(read_codewords(&mut &buf[..]), Err(WireError::Truncated)));
  }

  #[test]
  fn bad_header_is_an_error() {
    let buf = b"not a compressed stream".to_vec();
    assert!(matches!(read_codewords(&mut &buf[..]), Err(WireError::BadHeader)));
  }
}
