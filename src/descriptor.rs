//! Type descriptor decoding.
//!
//! DEX stores every type as a compact descriptor: one letter for a primitive, `L...;` around a
//! slash-separated class name, and one leading `[` per array dimension. This module turns
//! descriptors into the names a Java reader expects.
//!
//! | Descriptor            | Display                |
//! |-----------------------|------------------------|
//! | `I`                   | `int`                  |
//! | `Ljava/lang/String;`  | `java.lang.String`     |
//! | `[[Ljava/lang/String;`| `java.lang.String[][]` |
//! | `V`                   | `V`                    |
//!
//! ```rust
//! use dextree::type_string;
//!
//! assert_eq!(type_string("[I")?, "int[]");
//! assert_eq!(type_string("Landroid/app/Activity;")?, "android.app.Activity");
//! # Ok::<(), dextree::Error>(())
//! ```

use std::str::FromStr;

use strum::{Display, EnumString, IntoStaticStr};

use crate::{Error::InvalidDescriptor, Result};

/// Primitive type codes with their Java display names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, IntoStaticStr)]
pub enum Primitive {
    /// `Z`
    #[strum(to_string = "boolean", serialize = "Z")]
    Boolean,
    /// `B`
    #[strum(to_string = "byte", serialize = "B")]
    Byte,
    /// `C`
    #[strum(to_string = "char", serialize = "C")]
    Char,
    /// `S`
    #[strum(to_string = "short", serialize = "S")]
    Short,
    /// `I`
    #[strum(to_string = "int", serialize = "I")]
    Int,
    /// `J`
    #[strum(to_string = "long", serialize = "J")]
    Long,
    /// `F`
    #[strum(to_string = "float", serialize = "F")]
    Float,
    /// `D`
    #[strum(to_string = "double", serialize = "D")]
    Double,
}

impl Primitive {
    /// Looks up the primitive for a one-letter descriptor.
    #[must_use]
    pub fn from_code(code: &str) -> Option<Primitive> {
        if code.len() != 1 {
            return None;
        }
        Primitive::from_str(code).ok()
    }
}

/// Decodes a type descriptor into its display form.
///
/// Leading `[` markers become trailing `[]` pairs. Primitive codes are spelled out, class
/// descriptors lose their `L` and `;` and use `.` as package separator. Anything else,
/// including `V` and the nameless `L;`, is returned unchanged, so the result is never empty.
///
/// # Errors
///
/// Returns [`crate::Error::InvalidDescriptor`] if the descriptor is empty or consists of
/// array markers only.
pub fn type_string(descriptor: &str) -> Result<String> {
    let element = descriptor.trim_start_matches('[');
    let depth = descriptor.len() - element.len();

    if element.is_empty() {
        return Err(InvalidDescriptor(descriptor.to_string()));
    }

    let mut name = if let Some(primitive) = Primitive::from_code(element) {
        String::from(<&'static str>::from(primitive))
    } else if let Some(class) = element
        .strip_prefix('L')
        .and_then(|rest| rest.strip_suffix(';'))
        .filter(|class| !class.is_empty())
    {
        class.replace('/', ".")
    } else {
        element.to_string()
    };

    name.reserve(depth * 2);
    for _ in 0..depth {
        name.push_str("[]");
    }

    Ok(name)
}

/// Like [`type_string`], but returns the descriptor itself if it cannot be decoded.
#[must_use]
pub fn type_string_lossy(descriptor: &str) -> String {
    type_string(descriptor).unwrap_or_else(|_| descriptor.to_string())
}
