mod dex;

pub use dex::{encode_mutf8, write_uleb128, ClassSpec, DexBuilder};
