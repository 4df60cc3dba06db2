//! Contrast cycling and image-filename templating.
//!
//! Every galaxy has six server-rendered image variants, addressed by a
//! deterministic filename scheme: percentile-stretched bands carry a
//! `_vmax<slug>` suffix (`masked_r_band_vmax99p5.png`), the color composites
//! do not (`aplpy.png`). The contrast button cycles through two parallel
//! percentile tables and every image re-resolves its filename at the new
//! step. Nothing here touches the filesystem; the files are pre-rendered and
//! this module only computes the names.

use serde::Deserialize;
use serde::Serialize;
use strum_macros::AsRefStr;
use strum_macros::Display;
use strum_macros::EnumIter;
use strum_macros::EnumString;
use strum_macros::IntoStaticStr;
use thiserror::Error;

/// Default contrast percentile for the masked/model/residual bands.
pub const DEFAULT_VMAX_PERCENTILE: f64 = 99.0;

/// Default contrast percentile for the raw band.
pub const DEFAULT_VMAX_PERCENTILE_RAW: f64 = 99.7;

/// Contrast-cycle table for the masked/model/residual bands.
pub const DEFAULT_CONTRAST_PERCENTILES: [f64; 6] = [99.0, 99.5, 99.9, 99.95, 80.0, 90.0];

/// Contrast-cycle table for the raw band, stepped in lockstep with
/// [`DEFAULT_CONTRAST_PERCENTILES`].
pub const DEFAULT_CONTRAST_PERCENTILES_RAW: [f64; 6] = [99.7, 99.7, 99.9, 99.95, 90.0, 99.0];

/// The six server-rendered image variants of a galaxy, in display order.
///
/// String forms are the on-disk base names (`masked_r_band`, ...).
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    EnumString,
    EnumIter,
    AsRefStr,
    Display,
    IntoStaticStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ImageBand {
    MaskedRBand,
    GalfitModel,
    Residual,
    RawRBand,
    Aplpy,
    Lupton,
}

/// Which percentile table a band's contrast stretch comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PercentileSource {
    /// The masked-image percentile (masked band, model, residual).
    Masked,
    /// The raw-image percentile.
    Raw,
}

impl ImageBand {
    /// Card caption shown above the image.
    pub fn title(self) -> &'static str {
        match self {
            ImageBand::MaskedRBand => "Masked r-Band",
            ImageBand::GalfitModel => "GalfitModel",
            ImageBand::Residual => "Residual",
            ImageBand::RawRBand => "Raw r-band",
            ImageBand::Aplpy => "APLpy",
            ImageBand::Lupton => "Zoomed out",
        }
    }

    /// The percentile table this band stretches with; `None` for the
    /// pre-rendered color composites, which have no contrast variants.
    pub fn percentile_source(self) -> Option<PercentileSource> {
        match self {
            ImageBand::MaskedRBand | ImageBand::GalfitModel | ImageBand::Residual => {
                Some(PercentileSource::Masked)
            }
            ImageBand::RawRBand => Some(PercentileSource::Raw),
            ImageBand::Aplpy | ImageBand::Lupton => None,
        }
    }
}

/// Format a percentile with one decimal place, or two when the value does
/// not land on an exact tenth (99.5 → `"99.5"`, 99.95 → `"99.95"`).
pub fn format_percentile(value: f64) -> String {
    let tenths = (value.abs() % 1.0) * 10.0;
    let places = if (tenths - tenths.round()).abs() < 1e-3 {
        1
    } else {
        2
    };
    format!("{value:.places$}")
}

/// Filename-safe spelling of a percentile: `'.'` becomes `'p'`, `'-'`
/// becomes `'m'` (99.5 → `"99p5"`).
pub fn percentile_slug(value: f64) -> String {
    format_percentile(value).replace('.', "p").replace('-', "m")
}

/// Resolve the filename of one image variant at the given contrast
/// percentiles.
pub fn image_filename(band: ImageBand, vmax: f64, vmax_raw: f64) -> String {
    match band.percentile_source() {
        Some(PercentileSource::Masked) => format!("{band}_vmax{}.png", percentile_slug(vmax)),
        Some(PercentileSource::Raw) => format!("{band}_vmax{}.png", percentile_slug(vmax_raw)),
        None => format!("{band}.png"),
    }
}

/// Path of one image variant relative to the static images root.
pub fn image_relpath(galaxy_id: &str, band: ImageBand, vmax: f64, vmax_raw: f64) -> String {
    format!("galaxy_images/{galaxy_id}/{}", image_filename(band, vmax, vmax_raw))
}

/// The parenthesized percentile caption shown under a card (`"(99.5)"`);
/// `None` for the color composites.
pub fn vmax_label(band: ImageBand, vmax: f64, vmax_raw: f64) -> Option<String> {
    band.percentile_source().map(|source| match source {
        PercentileSource::Masked => format!("({})", format_percentile(vmax)),
        PercentileSource::Raw => format!("({})", format_percentile(vmax_raw)),
    })
}

/// A filename split back into its base name and contrast percentiles.
///
/// `band` is set when the base name is one of the six known bands; unknown
/// base names are preserved so the caller can reject them itself.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedImageFilename {
    pub base_name: String,
    pub band: Option<ImageBand>,
    pub vmax: f64,
    pub vmax_raw: f64,
}

/// Parse an image filename back into base name and percentiles.
///
/// Inverse of [`image_filename`]: a trailing `_vmax<slug>` names the
/// percentile of the band's own table; the other percentile keeps its
/// default. Filenames without the suffix (or with a slug that does not
/// decode to a number) keep both defaults.
pub fn parse_image_filename(
    filename: &str,
    default_vmax: f64,
    default_vmax_raw: f64,
) -> ParsedImageFilename {
    let name = filename.rsplit('/').next().unwrap_or(filename);
    let stem = name.rsplit_once('.').map_or(name, |(stem, _ext)| stem);

    let (base_name, encoded) = match split_vmax_suffix(stem) {
        Some((base, slug)) => (base, decode_percentile_slug(slug)),
        None => (stem, None),
    };
    let band = base_name.parse::<ImageBand>().ok();

    let (vmax, vmax_raw) = match (encoded, band.and_then(ImageBand::percentile_source)) {
        (Some(value), Some(PercentileSource::Raw)) => (default_vmax, value),
        (Some(value), _) => (value, default_vmax_raw),
        (None, _) => (default_vmax, default_vmax_raw),
    };

    ParsedImageFilename {
        base_name: base_name.to_string(),
        band,
        vmax,
        vmax_raw,
    }
}

/// Split `base_vmax99p5` into (`base`, `99p5`). The slug must be non-empty
/// and consist of digits, `p` and `m` only.
fn split_vmax_suffix(stem: &str) -> Option<(&str, &str)> {
    let (base, slug) = stem.rsplit_once("_vmax")?;
    if slug.is_empty() || !slug.chars().all(|ch| ch.is_ascii_digit() || ch == 'p' || ch == 'm') {
        return None;
    }
    Some((base, slug))
}

fn decode_percentile_slug(slug: &str) -> Option<f64> {
    let decoded = slug.replace('p', ".").replace('m', "-");
    match decoded.parse::<f64>() {
        Ok(value) => Some(value),
        Err(err) => {
            tracing::debug!("unparseable vmax slug {slug:?}: {err}");
            None
        }
    }
}

/// One resolved image card: band, caption, relative path and the percentile
/// actually applied to it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GalaxyImage {
    pub band: ImageBand,
    pub title: &'static str,
    pub path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vmax: Option<f64>,
}

/// Resolve all six image cards for a galaxy at the given percentiles, in
/// display order.
pub fn galaxy_images(galaxy_id: &str, vmax: f64, vmax_raw: f64) -> Vec<GalaxyImage> {
    use strum::IntoEnumIterator;

    ImageBand::iter()
        .map(|band| GalaxyImage {
            band,
            title: band.title(),
            path: image_relpath(galaxy_id, band, vmax, vmax_raw),
            vmax: band.percentile_source().map(|source| match source {
                PercentileSource::Masked => vmax,
                PercentileSource::Raw => vmax_raw,
            }),
        })
        .collect()
}

/// Errors constructing a [`ContrastCycle`] from configured tables.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ContrastTableError {
    #[error("contrast percentile tables must not be empty")]
    Empty,

    #[error("contrast percentile tables differ in length: {vmax} vs {raw}")]
    MismatchedLengths { vmax: usize, raw: usize },
}

/// The `(vmax, vmax_raw)` pair in effect at one step of the cycle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ContrastStep {
    pub index: usize,
    pub vmax: f64,
    pub vmax_raw: f64,
}

/// Cycling contrast state for one classification view.
///
/// Owns the two parallel percentile tables and the current index; the
/// contrast button advances the index modulo the table length. One instance
/// per view, created at its initial step; there is no process-wide state.
#[derive(Debug, Clone, PartialEq)]
pub struct ContrastCycle {
    vmax: Vec<f64>,
    vmax_raw: Vec<f64>,
    index: usize,
}

impl Default for ContrastCycle {
    fn default() -> Self {
        Self {
            vmax: DEFAULT_CONTRAST_PERCENTILES.to_vec(),
            vmax_raw: DEFAULT_CONTRAST_PERCENTILES_RAW.to_vec(),
            index: 0,
        }
    }
}

impl ContrastCycle {
    /// Build a cycle from two parallel tables.
    pub fn new(vmax: Vec<f64>, vmax_raw: Vec<f64>) -> Result<Self, ContrastTableError> {
        if vmax.is_empty() || vmax_raw.is_empty() {
            return Err(ContrastTableError::Empty);
        }
        if vmax.len() != vmax_raw.len() {
            return Err(ContrastTableError::MismatchedLengths {
                vmax: vmax.len(),
                raw: vmax_raw.len(),
            });
        }
        Ok(Self {
            vmax,
            vmax_raw,
            index: 0,
        })
    }

    /// Number of steps in the cycle.
    pub fn len(&self) -> usize {
        self.vmax.len()
    }

    /// Always `false`; tables are validated non-empty at construction.
    pub fn is_empty(&self) -> bool {
        self.vmax.is_empty()
    }

    /// The step currently in effect.
    pub fn current(&self) -> ContrastStep {
        self.step(self.index)
    }

    /// The step at index `n`, wrapping around the table.
    pub fn step(&self, n: usize) -> ContrastStep {
        let index = n % self.vmax.len();
        ContrastStep {
            index,
            vmax: self.vmax[index],
            vmax_raw: self.vmax_raw[index],
        }
    }

    /// Advance to the next step and return it.
    pub fn advance(&mut self) -> ContrastStep {
        self.index = (self.index + 1) % self.vmax.len();
        self.current()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn band_names_match_the_on_disk_base_names() {
        assert_eq!(ImageBand::MaskedRBand.as_ref(), "masked_r_band");
        assert_eq!(ImageBand::GalfitModel.as_ref(), "galfit_model");
        assert_eq!(ImageBand::RawRBand.as_ref(), "raw_r_band");
        assert_eq!("lupton".parse::<ImageBand>(), Ok(ImageBand::Lupton));
    }

    #[test]
    fn percentile_formatting_uses_one_or_two_places() {
        assert_eq!(format_percentile(99.0), "99.0");
        assert_eq!(format_percentile(99.5), "99.5");
        assert_eq!(format_percentile(99.95), "99.95");
        assert_eq!(format_percentile(80.0), "80.0");
    }

    #[test]
    fn slug_replaces_dot_and_minus() {
        assert_eq!(percentile_slug(99.5), "99p5");
        assert_eq!(percentile_slug(99.95), "99p95");
        assert_eq!(percentile_slug(-1.5), "m1p5");
    }

    #[test]
    fn filenames_carry_the_right_percentile() {
        assert_eq!(
            image_filename(ImageBand::MaskedRBand, 99.5, 99.7),
            "masked_r_band_vmax99p5.png"
        );
        assert_eq!(
            image_filename(ImageBand::RawRBand, 99.5, 99.7),
            "raw_r_band_vmax99p7.png"
        );
        assert_eq!(image_filename(ImageBand::Aplpy, 99.5, 99.7), "aplpy.png");
    }

    #[test]
    fn relpath_nests_under_the_galaxy_directory() {
        assert_eq!(
            image_relpath("KiDSDR4_J000000.000+000000.00", ImageBand::Lupton, 99.0, 99.7),
            "galaxy_images/KiDSDR4_J000000.000+000000.00/lupton.png"
        );
    }

    #[test]
    fn parse_inverts_filename_for_masked_bands() {
        let parsed = parse_image_filename("masked_r_band_vmax99p5.png", 99.0, 99.7);
        assert_eq!(parsed.band, Some(ImageBand::MaskedRBand));
        assert_eq!(parsed.vmax, 99.5);
        assert_eq!(parsed.vmax_raw, 99.7);
    }

    #[test]
    fn parse_assigns_raw_band_percentile_to_the_raw_slot() {
        let parsed = parse_image_filename("raw_r_band_vmax99p95.png", 99.0, 99.7);
        assert_eq!(parsed.band, Some(ImageBand::RawRBand));
        assert_eq!(parsed.vmax, 99.0);
        assert_eq!(parsed.vmax_raw, 99.95);
    }

    #[test]
    fn parse_without_suffix_keeps_defaults() {
        let parsed = parse_image_filename("aplpy.png", 99.0, 99.7);
        assert_eq!(parsed.band, Some(ImageBand::Aplpy));
        assert_eq!((parsed.vmax, parsed.vmax_raw), (99.0, 99.7));
    }

    #[test]
    fn parse_preserves_unknown_base_names() {
        let parsed = parse_image_filename("thumbnail_vmax90p0.png", 99.0, 99.7);
        assert_eq!(parsed.band, None);
        assert_eq!(parsed.base_name, "thumbnail");
        assert_eq!(parsed.vmax, 90.0);
    }

    #[test]
    fn parse_ignores_leading_directories() {
        let parsed = parse_image_filename("galaxy_images/g1/residual_vmax80p0.png", 99.0, 99.7);
        assert_eq!(parsed.band, Some(ImageBand::Residual));
        assert_eq!(parsed.vmax, 80.0);
    }

    #[test]
    fn garbled_slug_falls_back_to_defaults() {
        let parsed = parse_image_filename("residual_vmax9p9p.png", 99.0, 99.7);
        assert_eq!(parsed.base_name, "residual");
        assert_eq!((parsed.vmax, parsed.vmax_raw), (99.0, 99.7));
    }

    #[test]
    fn vmax_labels_follow_the_band_source() {
        assert_eq!(vmax_label(ImageBand::Residual, 99.5, 99.7), Some("(99.5)".into()));
        assert_eq!(vmax_label(ImageBand::RawRBand, 99.5, 99.95), Some("(99.95)".into()));
        assert_eq!(vmax_label(ImageBand::Lupton, 99.5, 99.7), None);
    }

    #[test]
    fn galaxy_images_resolves_all_six_cards_in_order() {
        let images = galaxy_images("g42", 99.5, 99.7);
        assert_eq!(images.len(), 6);
        assert_eq!(images[0].band, ImageBand::MaskedRBand);
        assert_eq!(images[0].path, "galaxy_images/g42/masked_r_band_vmax99p5.png");
        assert_eq!(images[0].vmax, Some(99.5));
        assert_eq!(images[3].vmax, Some(99.7));
        assert_eq!(images[5].vmax, None);
    }

    #[test]
    fn cycle_advances_and_wraps() {
        let mut cycle = ContrastCycle::default();
        assert_eq!(cycle.current().vmax, 99.0);

        let step = cycle.advance();
        assert_eq!((step.index, step.vmax, step.vmax_raw), (1, 99.5, 99.7));

        for _ in 0..5 {
            cycle.advance();
        }
        assert_eq!(cycle.current().index, 0);
    }

    #[test]
    fn cycle_rejects_bad_tables() {
        assert_eq!(
            ContrastCycle::new(vec![], vec![]),
            Err(ContrastTableError::Empty)
        );
        assert_eq!(
            ContrastCycle::new(vec![99.0], vec![99.7, 99.9]),
            Err(ContrastTableError::MismatchedLengths { vmax: 1, raw: 2 })
        );
    }
}
