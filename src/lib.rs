// comp40-codec: a lossy 24-bit image codec.
//
// RGB pixel grid -> normalized RGB -> YPbPr -> per-2x2-block DCT
// coefficients -> quantized tuple -> packed 32-bit codeword -> wire bytes,
// and the exact reverse for decompression.

pub mod bitpack;
pub mod chroma;
pub mod codeword;
pub mod colormath;
pub mod error;
pub mod grid;
pub mod pipeline;
pub mod ppm;
pub mod wire;

pub use error::CodecError;
pub use pipeline::{CompressionStats, Image};
