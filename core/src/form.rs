//! Form-sync layer around the shorthand codec.
//!
//! Keeps the quick-input text field and the exclusive-choice controls
//! describing one classification in lockstep: every keystroke is sanitized,
//! checked for the `'c'` contrast-cycle control character and decoded into
//! the form state; every control change re-encodes the state back into the
//! canonical token. Completeness validation and submission-record assembly
//! live here too; the codec itself accepts any input.

use lsbmorph_shorthand::{Classification, LsbClass, Morphology, TOKEN_ALPHABET, decode, encode};
use serde::Deserialize;
use serde::Serialize;
use strum_macros::AsRefStr;
use thiserror::Error;

/// Control character that requests a contrast-cycle action. Stripped before
/// the codec ever sees the text.
pub const CONTRAST_CONTROL: char = 'c';

/// Raw field text lowercased and reduced to the characters the form
/// understands: the token alphabet plus [`CONTRAST_CONTROL`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SanitizedInput {
    pub text: String,
    /// Whether sanitization dropped anything, so the caller knows to rewrite
    /// the visible field.
    pub changed: bool,
}

/// Lowercase `raw` and drop every character outside the input alphabet.
pub fn sanitize(raw: &str) -> SanitizedInput {
    let lowered = raw.to_lowercase();
    let text: String = lowered
        .chars()
        .filter(|ch| *ch == CONTRAST_CONTROL || TOKEN_ALPHABET.contains(ch))
        .collect();
    let changed = text != raw;
    SanitizedInput { text, changed }
}

/// Outcome of feeding one keystroke's worth of field text into the form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenUpdate {
    /// Cleaned text to write back into the field (control characters
    /// stripped).
    pub text: String,
    /// The record now reflected by the controls.
    pub classification: Classification,
    /// The field contained [`CONTRAST_CONTROL`]; the caller should advance
    /// its contrast cycle once.
    pub cycle_contrast: bool,
}

/// Fields a submission can be missing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, AsRefStr)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum FormField {
    LsbClass,
    Morphology,
}

/// A required selection is missing. `missing` lists the offending fields so
/// the UI can highlight each card, in form order.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("incomplete classification: missing {}", format_missing(.missing))]
pub struct IncompleteClassification {
    pub missing: Vec<FormField>,
}

fn format_missing(missing: &[FormField]) -> String {
    missing
        .iter()
        .map(AsRef::as_ref)
        .collect::<Vec<_>>()
        .join(", ")
}

/// The record POSTed for one galaxy, carrying the catalog integer codes.
///
/// `morphology` is absent only for a failed fit, the one case a submission
/// is complete without it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Submission {
    pub galaxy_id: String,
    pub lsb_class: i8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub morphology: Option<i8>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub comments: String,
    pub awesome_flag: bool,
    pub valid_redshift: bool,
}

/// State of one classification form.
///
/// Owns the current [`Classification`] and the free-text comment. All
/// mutation goes through [`FormState::apply_token`] (text → controls) or the
/// control setters (controls → text); both directions keep the two views
/// consistent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormState {
    classification: Classification,
    comments: String,
}

impl FormState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rehydrate a form from an existing record, e.g. when revisiting an
    /// already-classified galaxy.
    pub fn from_classification(classification: Classification) -> Self {
        Self {
            classification,
            comments: String::new(),
        }
    }

    pub fn classification(&self) -> Classification {
        self.classification
    }

    pub fn comments(&self) -> &str {
        &self.comments
    }

    pub fn set_comments(&mut self, comments: impl Into<String>) {
        self.comments = comments.into();
    }

    /// Feed the current field text through sanitize → control interception →
    /// decode, replacing the form's record.
    ///
    /// A `'c'` anywhere in the text requests one contrast cycle per call, no
    /// matter how many are present; all of them are stripped from the text
    /// written back.
    pub fn apply_token(&mut self, raw: &str) -> TokenUpdate {
        let sanitized = sanitize(raw);
        let cycle_contrast = sanitized.text.contains(CONTRAST_CONTROL);
        let text: String = sanitized
            .text
            .chars()
            .filter(|ch| *ch != CONTRAST_CONTROL)
            .collect();
        self.classification = decode(&text);
        tracing::trace!(token = %text, cycle_contrast, "applied shorthand token");
        TokenUpdate {
            text,
            classification: self.classification,
            cycle_contrast,
        }
    }

    /// The canonical token for the current controls, to be written into the
    /// text field after any control change.
    pub fn token(&self) -> String {
        encode(self.classification)
    }

    pub fn set_lsb_class(&mut self, lsb_class: LsbClass) -> String {
        self.classification.lsb_class = lsb_class;
        self.token()
    }

    pub fn set_morphology(&mut self, morphology: Morphology) -> String {
        self.classification.morphology = morphology;
        self.token()
    }

    pub fn set_valid_redshift(&mut self, valid_redshift: bool) -> String {
        self.classification.valid_redshift = valid_redshift;
        self.token()
    }

    pub fn set_awesome(&mut self, awesome: bool) -> String {
        self.classification.awesome = awesome;
        self.token()
    }

    /// Completeness check gating submission: the LSB class is always
    /// required; the morphology is required unless the fit failed.
    ///
    /// Mirrors the form's inline validation: a missing morphology is only
    /// reported once an LSB class has been chosen.
    pub fn validate(&self) -> Result<(), IncompleteClassification> {
        let mut missing = Vec::new();
        let lsb_class = self.classification.lsb_class;
        if lsb_class == LsbClass::Unset {
            missing.push(FormField::LsbClass);
        } else if lsb_class != LsbClass::Failed
            && self.classification.morphology == Morphology::Unset
        {
            missing.push(FormField::Morphology);
        }
        if missing.is_empty() {
            Ok(())
        } else {
            Err(IncompleteClassification { missing })
        }
    }

    /// Assemble the submission record for `galaxy_id`, or the per-field
    /// error list when the form is incomplete.
    pub fn submission(&self, galaxy_id: &str) -> Result<Submission, IncompleteClassification> {
        self.validate()?;
        let lsb_class = match self.classification.lsb_class.code() {
            Some(code) => code,
            // validate() already rejects an unset LSB class.
            None => {
                return Err(IncompleteClassification {
                    missing: vec![FormField::LsbClass],
                });
            }
        };
        Ok(Submission {
            galaxy_id: galaxy_id.to_string(),
            lsb_class,
            morphology: self.classification.morphology.code(),
            comments: self.comments.clone(),
            awesome_flag: self.classification.awesome,
            valid_redshift: self.classification.valid_redshift,
        })
    }
}
