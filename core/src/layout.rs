//! Responsive layout state machine.
//!
//! The classification view rearranges itself at the mobile breakpoint: the
//! form moves below the images, the image cards re-sort into a
//! priority-first order and the submit buttons collapse into paired rows on
//! mid-width screens. All of that state lives in one [`LayoutController`]
//! per view; resize events come in as plain widths and come out as
//! [`ReflowPlan`] values describing where everything goes.

use crate::display::ImageBand;
use strum::IntoEnumIterator;

/// Below this width the view uses the mobile arrangement.
pub const MOBILE_BREAKPOINT: u32 = 768;

/// Upper bound (exclusive) of the mid-width range in which the submit
/// buttons pair up into two-column rows.
pub const BUTTON_GRID_BREAKPOINT: u32 = 1280;

/// Card order on mobile: the color composites first, the fit diagnostics
/// last.
pub const MOBILE_CARD_ORDER: [ImageBand; 6] = [
    ImageBand::Aplpy,
    ImageBand::Lupton,
    ImageBand::MaskedRBand,
    ImageBand::Residual,
    ImageBand::RawRBand,
    ImageBand::GalfitModel,
];

/// Cards per row in the mobile arrangement's first row.
const MOBILE_FIRST_ROW_COUNT: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayoutMode {
    Desktop,
    Mobile,
}

impl LayoutMode {
    pub fn from_width(width: u32) -> Self {
        if width < MOBILE_BREAKPOINT {
            LayoutMode::Mobile
        } else {
            LayoutMode::Desktop
        }
    }
}

/// Where the classification form sits relative to the image grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormPlacement {
    /// Desktop: text inputs and secondary controls beside the images.
    BesideImages,
    /// Mobile: the whole form after the images.
    AfterImages,
}

/// Arrangement of the submit-button strip.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ButtonArrangement {
    /// One full-width button group.
    SingleRow,
    /// Two-column rows, mid-width screens only.
    PairedRows,
}

impl ButtonArrangement {
    /// Evaluated on every resize; unlike the card reflow this is not gated
    /// on a mode change because it has its own upper breakpoint.
    pub fn from_width(width: u32) -> Self {
        if (MOBILE_BREAKPOINT..BUTTON_GRID_BREAKPOINT).contains(&width) {
            ButtonArrangement::PairedRows
        } else {
            ButtonArrangement::SingleRow
        }
    }

    /// Row layout for `count` buttons: chunks of two for paired rows, one
    /// row of everything otherwise. Indices refer to the caller's button
    /// list; an odd count leaves a lone trailing cell.
    pub fn rows(self, count: usize) -> Vec<Vec<usize>> {
        match self {
            ButtonArrangement::SingleRow => vec![(0..count).collect()],
            ButtonArrangement::PairedRows => {
                (0..count).collect::<Vec<_>>().chunks(2).map(<[usize]>::to_vec).collect()
            }
        }
    }
}

/// One arrangement of the view, produced when the breakpoint is crossed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReflowPlan {
    pub mode: LayoutMode,
    pub form_placement: FormPlacement,
    /// The two image-card rows, top row first.
    pub image_rows: [Vec<ImageBand>; 2],
}

/// Owns every piece of layout state for one classification view: the last
/// applied mode and the captured original card order for restoring the
/// desktop arrangement.
#[derive(Debug, Clone)]
pub struct LayoutController {
    prev_mode: Option<LayoutMode>,
    original_order: Vec<ImageBand>,
    original_first_row_count: usize,
}

impl Default for LayoutController {
    fn default() -> Self {
        Self {
            prev_mode: None,
            original_order: ImageBand::iter().collect(),
            original_first_row_count: MOBILE_FIRST_ROW_COUNT,
        }
    }
}

impl LayoutController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the server-rendered card order once at startup so the desktop
    /// arrangement can be restored after a round-trip through mobile.
    pub fn capture_original_order(&mut self, cards: &[ImageBand], first_row_count: usize) {
        self.original_order = cards.to_vec();
        self.original_first_row_count = first_row_count.min(cards.len());
    }

    /// React to a viewport width.
    ///
    /// Returns a plan only when the mobile/desktop mode actually changed
    /// since the last call (the first call always produces one); repeated
    /// widths on the same side of the breakpoint are no-ops so resize storms
    /// do not thrash the view.
    pub fn reflow(&mut self, width: u32) -> Option<ReflowPlan> {
        let mode = LayoutMode::from_width(width);
        if self.prev_mode == Some(mode) {
            return None;
        }
        self.prev_mode = Some(mode);
        tracing::debug!(width, ?mode, "layout breakpoint crossed");
        Some(self.plan(mode))
    }

    /// The arrangement for `mode`, independent of the change gate.
    pub fn plan(&self, mode: LayoutMode) -> ReflowPlan {
        let (mut cards, first_row_count) = match mode {
            LayoutMode::Mobile => {
                let mut cards = self.original_order.clone();
                cards.sort_by_key(|band| mobile_rank(*band));
                (cards, MOBILE_FIRST_ROW_COUNT)
            }
            LayoutMode::Desktop => (self.original_order.clone(), self.original_first_row_count),
        };
        let second = cards.split_off(first_row_count.min(cards.len()));
        ReflowPlan {
            mode,
            form_placement: match mode {
                LayoutMode::Mobile => FormPlacement::AfterImages,
                LayoutMode::Desktop => FormPlacement::BesideImages,
            },
            image_rows: [cards, second],
        }
    }
}

fn mobile_rank(band: ImageBand) -> usize {
    MOBILE_CARD_ORDER
        .iter()
        .position(|ordered| *ordered == band)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn mode_splits_at_the_breakpoint() {
        assert_eq!(LayoutMode::from_width(767), LayoutMode::Mobile);
        assert_eq!(LayoutMode::from_width(768), LayoutMode::Desktop);
    }

    #[test]
    fn first_reflow_always_produces_a_plan() {
        let mut controller = LayoutController::new();
        let plan = controller.reflow(1440).expect("first call plans");
        assert_eq!(plan.mode, LayoutMode::Desktop);
        assert_eq!(plan.form_placement, FormPlacement::BesideImages);
    }

    #[test]
    fn resize_within_the_same_mode_is_a_no_op() {
        let mut controller = LayoutController::new();
        controller.reflow(1440);
        assert_eq!(controller.reflow(1200), None);
        assert_eq!(controller.reflow(800), None);
        assert!(controller.reflow(700).is_some());
        assert_eq!(controller.reflow(500), None);
    }

    #[test]
    fn mobile_plan_reorders_cards_color_composites_first() {
        let mut controller = LayoutController::new();
        let plan = controller.reflow(500).expect("mode change");
        assert_eq!(plan.form_placement, FormPlacement::AfterImages);
        assert_eq!(
            plan.image_rows[0],
            vec![ImageBand::Aplpy, ImageBand::Lupton, ImageBand::MaskedRBand]
        );
        assert_eq!(
            plan.image_rows[1],
            vec![ImageBand::Residual, ImageBand::RawRBand, ImageBand::GalfitModel]
        );
    }

    #[test]
    fn desktop_plan_restores_the_captured_order() {
        let mut controller = LayoutController::new();
        let original = [
            ImageBand::MaskedRBand,
            ImageBand::GalfitModel,
            ImageBand::Residual,
            ImageBand::RawRBand,
            ImageBand::Aplpy,
            ImageBand::Lupton,
        ];
        controller.capture_original_order(&original, 3);

        controller.reflow(500);
        let plan = controller.reflow(1024).expect("back to desktop");
        assert_eq!(plan.image_rows[0], original[..3].to_vec());
        assert_eq!(plan.image_rows[1], original[3..].to_vec());
    }

    #[test]
    fn captured_first_row_count_is_clamped_to_the_card_count() {
        let mut controller = LayoutController::new();
        controller.capture_original_order(&[ImageBand::Aplpy, ImageBand::Lupton], 5);
        let plan = controller.plan(LayoutMode::Desktop);
        assert_eq!(plan.image_rows[0].len(), 2);
        assert!(plan.image_rows[1].is_empty());
    }

    #[test]
    fn buttons_pair_up_only_on_mid_width_screens() {
        assert_eq!(ButtonArrangement::from_width(767), ButtonArrangement::SingleRow);
        assert_eq!(ButtonArrangement::from_width(768), ButtonArrangement::PairedRows);
        assert_eq!(ButtonArrangement::from_width(1279), ButtonArrangement::PairedRows);
        assert_eq!(ButtonArrangement::from_width(1280), ButtonArrangement::SingleRow);
    }

    #[test]
    fn paired_rows_chunk_buttons_in_twos() {
        let rows = ButtonArrangement::PairedRows.rows(5);
        assert_eq!(rows, vec![vec![0, 1], vec![2, 3], vec![4]]);
        assert_eq!(ButtonArrangement::SingleRow.rows(3), vec![vec![0, 1, 2]]);
    }
}
