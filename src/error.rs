// Top-level error type for the CLI: any data/format failure that should be
// reported as a diagnostic and a non-zero exit, distinct from programmer
// errors (fatal asserts), which this enum does not represent.

use thiserror::Error;

use crate::ppm::PpmError;
use crate::wire::WireError;

#[derive(Error, Debug)]
pub enum CodecError {
  /// PPM container could not be parsed.
  #[error("PPM error: {0}")]
  Ppm(#[from] PpmError),

  /// Compressed stream header or body is malformed.
  #[error("compressed stream error: {0}")]
  Wire(#[from] WireError),

  /// Underlying file or stream I/O failed.
  #[error(transparent)]
  Io(#[from] std::io::Error),
}
