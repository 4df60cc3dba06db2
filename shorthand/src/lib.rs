//! Shorthand token codec for LSB galaxy classifications.
//!
//! Classifiers type a compact token such as `"1r"` or `"-12a"` into the quick
//! input field instead of clicking through the form. This crate is the pure,
//! DOM-free half of that feature: [`decode`] turns a token into a
//! [`Classification`] record and [`encode`] turns a record back into its
//! canonical token. Both are total functions with no state and no errors:
//! incomplete or garbled input decodes to `Unset`/`false` defaults so the form
//! can track a half-typed token keystroke by keystroke.
//!
//! The token alphabet is `{'-', '0', '1', '2', 'r', 'a'}`. Input sanitization
//! and the `'c'` contrast-cycle control character are handled by the form
//! layer in `lsbmorph-core`; `decode` never sees `'c'` but tolerates any
//! string without panicking.
//!
//! ```
//! use lsbmorph_shorthand::{decode, encode, LsbClass, Morphology};
//!
//! let c = decode("-12ra");
//! assert_eq!(c.lsb_class, LsbClass::Failed);
//! assert_eq!(c.morphology, Morphology::EarlyType);
//! assert!(c.valid_redshift && c.awesome);
//!
//! // Re-encoding yields the canonical spelling of the same record.
//! assert_eq!(encode(c), "-2ra");
//! ```

use serde::Deserialize;
use serde::Serialize;
use strum_macros::AsRefStr;
use strum_macros::EnumIter;
use strum_macros::EnumString;
use strum_macros::IntoStaticStr;

/// Characters that may appear in a shorthand token.
pub const TOKEN_ALPHABET: &[char] = &['-', '0', '1', '2', 'r', 'a'];

/// Low-surface-brightness classification axis.
///
/// The string forms (`yes`, `no`, `failed`, `unset`) are what the CLI and
/// serialized records use; the catalog stores the integer codes from
/// [`LsbClass::code`].
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    EnumString,
    EnumIter,
    AsRefStr,
    IntoStaticStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "kebab-case")]
pub enum LsbClass {
    /// The galaxy is a genuine LSB galaxy (catalog code `1`).
    Yes,
    /// Not an LSB galaxy (catalog code `0`).
    No,
    /// The surface-brightness fit failed (catalog code `-1`).
    Failed,
    /// No selection yet.
    #[default]
    Unset,
}

impl LsbClass {
    /// Catalog integer code, `None` for [`LsbClass::Unset`].
    pub fn code(self) -> Option<i8> {
        match self {
            LsbClass::Yes => Some(1),
            LsbClass::No => Some(0),
            LsbClass::Failed => Some(-1),
            LsbClass::Unset => None,
        }
    }

    /// Inverse of [`LsbClass::code`]; out-of-range codes yield `None`.
    pub fn from_code(code: i8) -> Option<Self> {
        match code {
            1 => Some(LsbClass::Yes),
            0 => Some(LsbClass::No),
            -1 => Some(LsbClass::Failed),
            _ => None,
        }
    }
}

/// Galaxy morphology classification axis.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    EnumString,
    EnumIter,
    AsRefStr,
    IntoStaticStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "kebab-case")]
pub enum Morphology {
    /// Late-type / spiral (catalog code `1`).
    LateType,
    /// Early-type / elliptical (catalog code `2`).
    EarlyType,
    /// Featureless (catalog code `-1`).
    Featureless,
    /// Irregular or otherwise unclear (catalog code `0`).
    Unsure,
    /// No selection yet.
    #[default]
    Unset,
}

impl Morphology {
    /// Catalog integer code, `None` for [`Morphology::Unset`].
    pub fn code(self) -> Option<i8> {
        match self {
            Morphology::LateType => Some(1),
            Morphology::EarlyType => Some(2),
            Morphology::Featureless => Some(-1),
            Morphology::Unsure => Some(0),
            Morphology::Unset => None,
        }
    }

    /// Inverse of [`Morphology::code`]; out-of-range codes yield `None`.
    pub fn from_code(code: i8) -> Option<Self> {
        match code {
            1 => Some(Morphology::LateType),
            2 => Some(Morphology::EarlyType),
            -1 => Some(Morphology::Featureless),
            0 => Some(Morphology::Unsure),
            _ => None,
        }
    }
}

/// One galaxy classification as entered in the form.
///
/// Produced fresh by every [`decode`] call. Whether a record is complete
/// enough to submit (`lsb_class` set, `morphology` set unless the fit failed)
/// is a form-layer concern, not enforced here.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Classification {
    pub lsb_class: LsbClass,
    pub morphology: Morphology,
    pub valid_redshift: bool,
    pub awesome: bool,
}

/// Decode a shorthand token into a [`Classification`].
///
/// Two independent left-to-right scans, each stopping at its first match: the
/// earliest `-`/`0`/`1` decides the LSB class, and the earliest `-`/`0`/`1`/`2`
/// *after* the characters consumed by the LSB match decides the morphology.
/// The flags are positional-independent: `r` and `a` anywhere in the token set
/// `valid_redshift` and `awesome`.
///
/// Characters outside [`TOKEN_ALPHABET`] are skipped over; callers are
/// expected to pre-filter, but unfiltered input only dilutes the token, it
/// never panics.
///
/// ```
/// use lsbmorph_shorthand::{decode, LsbClass, Morphology};
///
/// assert_eq!(decode("1-").morphology, Morphology::Featureless);
/// assert_eq!(decode("-1").lsb_class, LsbClass::Failed);
/// assert_eq!(decode("-1").morphology, Morphology::Unset);
/// assert_eq!(decode("").lsb_class, LsbClass::Unset);
/// ```
pub fn decode(input: &str) -> Classification {
    let chars: Vec<char> = input.chars().collect();
    let (lsb_class, after_lsb) = scan_lsb_class(&chars);
    let morphology = match after_lsb {
        Some(start) => scan_morphology(&chars[start..]),
        // The morphology scan only starts once an LSB token has been seen.
        None => Morphology::Unset,
    };
    Classification {
        lsb_class,
        morphology,
        valid_redshift: chars.contains(&'r'),
        awesome: chars.contains(&'a'),
    }
}

/// First scan: the earliest `-`/`0`/`1` decides the LSB class.
///
/// A `-` immediately followed by `1` is the two-character failed-fit token and
/// is consumed as one unit; a `-` followed by anything else (or end of input)
/// is already a complete failed-fit match on its own. Returns the class and
/// the index just past the consumed token so the morphology scan never
/// reconsiders those characters.
fn scan_lsb_class(chars: &[char]) -> (LsbClass, Option<usize>) {
    for (i, &ch) in chars.iter().enumerate() {
        match ch {
            '-' if chars.get(i + 1) == Some(&'1') => return (LsbClass::Failed, Some(i + 2)),
            '-' => return (LsbClass::Failed, Some(i + 1)),
            '0' => return (LsbClass::No, Some(i + 1)),
            '1' => return (LsbClass::Yes, Some(i + 1)),
            _ => {}
        }
    }
    (LsbClass::Unset, None)
}

/// Second scan over the remainder of the token: the earliest `-`/`0`/`1`/`2`
/// decides the morphology. A lone trailing `-` and the `-1` pair both mean
/// featureless, so no lookahead is needed here.
fn scan_morphology(tail: &[char]) -> Morphology {
    for &ch in tail {
        match ch {
            '-' => return Morphology::Featureless,
            '0' => return Morphology::Unsure,
            '1' => return Morphology::LateType,
            '2' => return Morphology::EarlyType,
            _ => {}
        }
    }
    Morphology::Unset
}

/// Encode a [`Classification`] into its canonical shorthand token.
///
/// Fixed concatenation order: LSB token, morphology token, `r` flag, `a`
/// flag. Unset fields contribute nothing, so a blank form encodes to `""`.
///
/// `decode(encode(c)) == c` holds for every record with both class fields
/// set. The reverse direction is not identity for arbitrary input: `decode`
/// ignores repeated and out-of-alphabet characters that `encode` never emits.
pub fn encode(c: Classification) -> String {
    let mut token = String::new();
    // Failed + LateType needs the explicit `-1` pair: a bare `-` directly
    // followed by the morphology `1` would be folded back into the
    // failed-fit token by `decode`.
    token.push_str(match (c.lsb_class, c.morphology) {
        (LsbClass::Failed, Morphology::LateType) => "-1",
        (LsbClass::Failed, _) => "-",
        (LsbClass::No, _) => "0",
        (LsbClass::Yes, _) => "1",
        (LsbClass::Unset, _) => "",
    });
    token.push_str(match c.morphology {
        Morphology::Featureless => "-",
        Morphology::Unsure => "0",
        Morphology::LateType => "1",
        Morphology::EarlyType => "2",
        Morphology::Unset => "",
    });
    if c.valid_redshift {
        token.push('r');
    }
    if c.awesome {
        token.push('a');
    }
    token
}
