//! Data-driven positioning rules.
//!
//! Every widget carries an ordered list of [`LayoutRule`]s; `update_layout`
//! applies them in storage order against the parent's extent, then recurses
//! into children. Rules work in pixel coordinates and bypass DPI scaling,
//! like the `_nodpiscale` setters they are built on.

use crate::geometry::{Point, Size};
use crate::widget::WidgetCore;

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum LayoutRule {
    /// Centre horizontally within the parent.
    CentreHorizontally,
    /// Centre vertically within the parent.
    CentreVertically,
    /// Centre on both axes.
    Centre,
    /// Distance in from the left edge of the parent.
    OffsetLeft(f32),
    /// Distance in from the bottom edge of the parent.
    OffsetBottom(f32),
    /// Distance in from the right edge of the parent.
    OffsetRight(f32),
    /// Distance in from the top edge of the parent.
    OffsetTop(f32),
    /// Fill the parent's width, inset by a margin on both sides.
    FitHorizontally(f32),
    /// Fill the parent's height, inset by a margin on both sides.
    FitVertically(f32),
    /// Fill the parent on both axes, inset by a margin.
    Fit(f32),
    /// Offset relative to the current position.
    Move(f32, f32),
}

impl LayoutRule {
    pub(crate) fn apply(self, core: &mut WidgetCore, parent_size: Size) {
        let position = core.get_position_nodpiscale();
        let size = core.get_size_nodpiscale();
        match self {
            LayoutRule::CentreHorizontally => {
                core.set_position_nodpiscale(Point::new(
                    (parent_size.width - size.width) / 2.0,
                    position.y,
                ));
            }
            LayoutRule::CentreVertically => {
                core.set_position_nodpiscale(Point::new(
                    position.x,
                    (parent_size.height - size.height) / 2.0,
                ));
            }
            LayoutRule::Centre => {
                core.set_position_nodpiscale(Point::new(
                    (parent_size.width - size.width) / 2.0,
                    (parent_size.height - size.height) / 2.0,
                ));
            }
            LayoutRule::OffsetLeft(distance) => {
                core.set_position_nodpiscale(Point::new(distance, position.y));
            }
            LayoutRule::OffsetBottom(distance) => {
                core.set_position_nodpiscale(Point::new(position.x, distance));
            }
            LayoutRule::OffsetRight(distance) => {
                core.set_position_nodpiscale(Point::new(
                    (parent_size.width - size.width) - distance,
                    position.y,
                ));
            }
            LayoutRule::OffsetTop(distance) => {
                core.set_position_nodpiscale(Point::new(
                    position.x,
                    (parent_size.height - size.height) - distance,
                ));
            }
            LayoutRule::FitHorizontally(margin) => {
                core.set_position_nodpiscale(Point::new(margin, position.y));
                core.set_size_nodpiscale(Size::new(parent_size.width - margin * 2.0, size.height));
            }
            LayoutRule::FitVertically(margin) => {
                core.set_position_nodpiscale(Point::new(position.x, margin));
                core.set_size_nodpiscale(Size::new(size.width, parent_size.height - margin * 2.0));
            }
            LayoutRule::Fit(margin) => {
                core.set_position_nodpiscale(Point::new(margin, margin));
                core.set_size_nodpiscale(Size::new(
                    parent_size.width - margin * 2.0,
                    parent_size.height - margin * 2.0,
                ));
            }
            LayoutRule::Move(offset_x, offset_y) => {
                core.set_position_nodpiscale(Point::new(
                    position.x + offset_x,
                    position.y + offset_y,
                ));
            }
        }
    }
}

#[allow(clippy::unwrap_used)]
#[cfg(test)]
mod tests {
    use super::*;
    use crate::colour::ColourSet;

    fn test_core() -> WidgetCore {
        WidgetCore::new(
            ColourSet::default(),
            "",
            None,
            Size::new(40.0, 20.0),
            Point::new(5.0, 5.0),
        )
    }

    const PARENT: Size = Size::new(200.0, 100.0);

    #[test]
    fn centre_rules() {
        let mut core = test_core();
        LayoutRule::CentreHorizontally.apply(&mut core, PARENT);
        assert_eq!(core.get_position_nodpiscale(), Point::new(80.0, 5.0));

        LayoutRule::CentreVertically.apply(&mut core, PARENT);
        assert_eq!(core.get_position_nodpiscale(), Point::new(80.0, 40.0));

        let mut core = test_core();
        LayoutRule::Centre.apply(&mut core, PARENT);
        assert_eq!(core.get_position_nodpiscale(), Point::new(80.0, 40.0));
    }

    #[test]
    fn offset_rules() {
        let mut core = test_core();
        LayoutRule::OffsetLeft(3.0).apply(&mut core, PARENT);
        assert_eq!(core.get_position_nodpiscale().x, 3.0);

        LayoutRule::OffsetRight(3.0).apply(&mut core, PARENT);
        assert_eq!(core.get_position_nodpiscale().x, 200.0 - 40.0 - 3.0);

        LayoutRule::OffsetBottom(4.0).apply(&mut core, PARENT);
        assert_eq!(core.get_position_nodpiscale().y, 4.0);

        LayoutRule::OffsetTop(4.0).apply(&mut core, PARENT);
        assert_eq!(core.get_position_nodpiscale().y, 100.0 - 20.0 - 4.0);
    }

    #[test]
    fn fit_rules() {
        let mut core = test_core();
        LayoutRule::FitHorizontally(10.0).apply(&mut core, PARENT);
        assert_eq!(core.get_position_nodpiscale().x, 10.0);
        assert_eq!(core.get_size_nodpiscale(), Size::new(180.0, 20.0));

        LayoutRule::FitVertically(5.0).apply(&mut core, PARENT);
        assert_eq!(core.get_size_nodpiscale(), Size::new(180.0, 90.0));

        let mut core = test_core();
        LayoutRule::Fit(1.0).apply(&mut core, PARENT);
        assert_eq!(core.get_position_nodpiscale(), Point::new(1.0, 1.0));
        assert_eq!(core.get_size_nodpiscale(), Size::new(198.0, 98.0));
    }

    #[test]
    fn move_rule_is_relative() {
        let mut core = test_core();
        LayoutRule::Move(10.0, -2.0).apply(&mut core, PARENT);
        assert_eq!(core.get_position_nodpiscale(), Point::new(15.0, 3.0));
        LayoutRule::Move(10.0, -2.0).apply(&mut core, PARENT);
        assert_eq!(core.get_position_nodpiscale(), Point::new(25.0, 1.0));
    }

    #[test]
    fn rules_apply_in_order() {
        let mut core = test_core();
        // the later rule wins where they touch the same axis
        for rule in [LayoutRule::OffsetLeft(0.0), LayoutRule::Move(7.0, 0.0)] {
            rule.apply(&mut core, PARENT);
        }
        assert_eq!(core.get_position_nodpiscale().x, 7.0);
    }
}
