use serde::{Deserialize, Serialize};

use crate::projection::camera::WorldBounds;
use crate::{SystemId, WorldPoint};

#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub enum Metric {
    #[serde(rename = "2d")]
    Planar,
    #[default]
    #[serde(rename = "3d")]
    Spatial,
}

#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Optimize {
    Distance,
    /// Fewest jumps.
    #[default]
    Hops,
}

/// Payload sent to the routing collaborator.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RouteRequest {
    pub from: SystemId,
    pub to: SystemId,
    pub metric: Metric,
    /// Maximum jump range of the ship; required and positive.
    pub ship_jump_max: Option<f64>,
    pub optimize: Optimize,
}

/// A star system as it appears on the wire inside a hop.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct RouteSystem {
    pub id: SystemId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl RouteSystem {
    pub fn position(&self) -> WorldPoint {
        WorldPoint::new(self.x, self.y, self.z)
    }

    /// Name to show, falling back to the numeric id.
    pub fn display_name(&self) -> String {
        match self.name.as_deref() {
            Some(name) if !name.is_empty() => name.to_owned(),
            _ => format!("System {}", self.id),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Hop {
    pub from: RouteSystem,
    pub to: RouteSystem,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distance: Option<f64>,
}

/// Response of the routing collaborator. Treated as an immutable snapshot.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct Route {
    pub ok: bool,
    #[serde(default)]
    pub hops: Vec<Hop>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// A system as visited by a route.
#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct Waypoint {
    pub id: SystemId,
    pub name: String,
    pub position: WorldPoint,
    /// Ordinal along the route; 0 is the origin.
    pub hop_index: usize,
}

/// One row of the route panel.
#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct RouteListItem {
    pub index: usize,
    pub name: String,
    pub position: WorldPoint,
    /// Length of the hop that arrives here.
    pub distance: Option<f64>,
    pub is_start: bool,
    pub is_end: bool,
}

impl Route {
    pub fn has_hops(&self) -> bool {
        !self.hops.is_empty()
    }

    /// Index of the first hop that does not start where the previous one
    /// ended, if any.
    pub fn first_gap(&self) -> Option<usize> {
        self.hops
            .windows(2)
            .position(|pair| pair[0].to.id != pair[1].from.id)
            .map(|i| i + 1)
    }

    /// Origin followed by every hop destination, in hop order.
    pub fn waypoints(&self) -> Vec<Waypoint> {
        let Some(first) = self.hops.first() else {
            return Vec::new();
        };
        let origin = std::iter::once(&first.from);
        origin
            .chain(self.hops.iter().map(|h| &h.to))
            .enumerate()
            .map(|(hop_index, s)| Waypoint {
                id: s.id,
                name: s.display_name(),
                position: s.position(),
                hop_index,
            })
            .collect()
    }

    pub fn list_items(&self) -> Vec<RouteListItem> {
        let last = self.hops.len();
        self.waypoints()
            .into_iter()
            .map(|wp| RouteListItem {
                index: wp.hop_index,
                distance: wp
                    .hop_index
                    .checked_sub(1)
                    .and_then(|i| self.hops[i].distance),
                is_start: wp.hop_index == 0,
                is_end: wp.hop_index == last,
                name: wp.name,
                position: wp.position,
            })
            .collect()
    }

    pub fn bounds(&self) -> Option<WorldBounds> {
        WorldBounds::from_points(
            self.hops
                .iter()
                .flat_map(|h| [h.from.position(), h.to.position()]),
        )
    }
}


#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use super::*;

    #[test]
    fn request_uses_wire_names() {
        let req = RouteRequest {
            from: 2244677,
            to: 2526077,
            metric: Metric::Spatial,
            ship_jump_max: Some(500.0),
            optimize: Optimize::Hops,
        };
        let json = serde_json::to_value(&req).expect("json");
        assert_eq!(json["metric"], "3d");
        assert_eq!(json["shipJumpMax"], 500.0);
        assert_eq!(json["optimize"], "hops");
    }

    #[test]
    fn parses_failed_route_without_hops() {
        let route: Route =
            serde_json::from_str(r#"{"ok":false,"error":"No path found"}"#).expect("route");
        assert!(!route.ok);
        assert!(route.hops.is_empty());
        assert_eq!(route.error.as_deref(), Some("No path found"));
    }

    #[test]
    fn waypoints_are_origin_then_destinations() {
        let route = three_hop_route();
        let wps = route.waypoints();
        let ids: Vec<_> = wps.iter().map(|w| w.id).collect();
        assert_eq!(ids, vec![2244677, 2300001, 2400002, 2526077]);
        assert_eq!(wps[3].hop_index, 3);
        assert!(route.first_gap().is_none());
    }

    #[test]
    fn unnamed_system_falls_back_to_id() {
        let s = RouteSystem { id: 42, name: None, x: 0.0, y: 0.0, z: 0.0 };
        assert_eq!(s.display_name(), "System 42");
    }

    #[test]
    fn list_items_carry_arrival_distance() {
        let items = three_hop_route().list_items();
        assert_eq!(items.len(), 4);
        assert!(items[0].is_start && items[0].distance.is_none());
        assert_eq!(items[1].distance, Some(500.0));
        assert!(items[3].is_end);
    }

    #[test]
    fn detects_gap_between_hops() {
        let mut route = three_hop_route();
        route.hops[2].from.id = 1;
        assert_eq!(route.first_gap(), Some(2));
    }
}
