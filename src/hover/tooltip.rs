use crate::hover::picker::HoverTarget;
use crate::{ScreenPoint, Viewport};

pub const TOOLTIP_OFFSET_PX: f64 = 15.0;
pub const TOOLTIP_MARGIN_PX: f64 = 5.0;

/// Text shown next to a hovered system.
pub fn tooltip_lines(target: &HoverTarget) -> Vec<String> {
    let wp = &target.waypoint;
    vec![
        wp.name.clone(),
        format!("ID: {}", wp.id),
        format!("Hop: {}", wp.hop_index + 1),
        format!("X: {:.1}", wp.position.x),
        format!("Z: {:.1}", wp.position.z),
    ]
}

/// Top-left corner of a `width` x `height` tooltip for a marker at `anchor`.
///
/// Sits to the right of the marker unless that would leave the viewport, in
/// which case it flips to the left. Vertically centred on the marker and kept
/// inside the margins.
pub fn place_tooltip(anchor: ScreenPoint, width: f64, height: f64, viewport: Viewport) -> ScreenPoint {
    let mut x = anchor.x + TOOLTIP_OFFSET_PX;
    if x + width > viewport.width - TOOLTIP_MARGIN_PX {
        x = anchor.x - TOOLTIP_OFFSET_PX - width;
    }
    let max_y = (viewport.height - height - TOOLTIP_MARGIN_PX).max(TOOLTIP_MARGIN_PX);
    let y = (anchor.y - height / 2.0).clamp(TOOLTIP_MARGIN_PX, max_y);
    ScreenPoint::new(x, y)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::route::model::Waypoint;
    use crate::WorldPoint;

    #[test]
    fn lines_show_one_based_hop_and_rounded_coordinates() {
        let target = HoverTarget {
            waypoint: Waypoint {
                id: 2300001,
                name: "Relay".into(),
                position: WorldPoint::new(10_400.04, -3.0, 20_299.96),
                hop_index: 1,
            },
            screen: ScreenPoint::new(0.0, 0.0),
            screen_distance: 0.0,
        };
        assert_eq!(
            tooltip_lines(&target),
            vec!["Relay", "ID: 2300001", "Hop: 2", "X: 10400.0", "Z: 20300.0"]
        );
    }

    #[test]
    fn tooltip_flips_at_right_edge_and_stays_inside() {
        let view = Viewport::new(400.0, 300.0);
        let right = place_tooltip(ScreenPoint::new(100.0, 150.0), 120.0, 80.0, view);
        assert_eq!(right, ScreenPoint::new(115.0, 110.0));

        let flipped = place_tooltip(ScreenPoint::new(350.0, 2.0), 120.0, 80.0, view);
        assert_eq!(flipped.x, 350.0 - 15.0 - 120.0);
        assert_eq!(flipped.y, TOOLTIP_MARGIN_PX);

        let bottom = place_tooltip(ScreenPoint::new(100.0, 299.0), 120.0, 80.0, view);
        assert_eq!(bottom.y, 300.0 - 80.0 - TOOLTIP_MARGIN_PX);
    }
}
