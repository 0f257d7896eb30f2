/// Primitive value encoders and decoders (unsigned, signed, real, strings, dates).
pub mod primitives;
/// Bounds-checked byte reader used by every decoder.
pub mod reader;
/// Application, context, opening and closing tag headers.
pub mod tag;
/// Bounds-checked byte writer over a caller-owned buffer.
pub mod writer;
