//! The Westfield surface: a two-terminal west-side apron feeding one runway.
//!
//! Hand-drawn from the usual west-plan shape: gates connect to their flow
//! spots over short bidirectional pushback corridors (the only two-way edges
//! on the field), spots feed taxiway intersections, and a single taxi trunk
//! runs north to the 10L threshold.  Arrivals leave the runway at the east
//! exit and taxi back in over the same intersections.

use asim_core::{GeoPoint, LinkId, NodeId};
use asim_surface::{LinkKind, SurfaceGraph, SurfaceGraphBuilder};

/// Degrees per metre of latitude.
const DEG_PER_M: f64 = 1.0 / 111_195.0;

/// Field reference point, on the west apron.
const LAT0: f64 = 37.6160;
const LON0: f64 = -122.3920;

fn at(north_m: f64, east_m: f64) -> GeoPoint {
    // Longitude degrees shrink with latitude; correct so `east_m` is metres.
    let lon_per_m = DEG_PER_M / LAT0.to_radians().cos();
    GeoPoint::new(LAT0 + north_m * DEG_PER_M, LON0 + east_m * lon_per_m)
}

pub struct Westfield {
    pub surface: SurfaceGraph,
    pub gates: [NodeId; 4],
    pub runway: LinkId,
}

/// Build the Westfield surface.
///
/// Returns the graph plus the gates `[G51, G53, G55, G57]` and the runway.
pub fn build_surface() -> Westfield {
    let mut b = SurfaceGraphBuilder::new();

    // Terminal 1 (west): G51/G53 behind flow spot S9.
    let g51 = b.add_node("G51", at(-60.0, -40.0));
    let g53 = b.add_node("G53", at(-60.0, 40.0));
    let s9 = b.add_node("S9", at(0.0, 0.0));

    // Terminal 2 (east): G55/G57 behind flow spot S8.
    let g55 = b.add_node("G55", at(-60.0, 220.0));
    let g57 = b.add_node("G57", at(-60.0, 300.0));
    let s8 = b.add_node("S8", at(0.0, 260.0));

    // Taxiway intersections and the 10L runway.
    let i2 = b.add_node("I2", at(150.0, 0.0));
    let i3 = b.add_node("I3", at(150.0, 260.0));
    let threshold = b.add_node("10L", at(450.0, 0.0));
    let exit = b.add_node("10L-EXIT", at(450.0, 1200.0));

    // Gate corridors: the only bidirectional edges on the surface.
    b.add_two_way("G51-S9", LinkKind::Pushback, vec![g51, s9]).expect("gate corridor");
    b.add_two_way("G53-S9", LinkKind::Pushback, vec![g53, s9]).expect("gate corridor");
    b.add_two_way("G55-S8", LinkKind::Pushback, vec![g55, s8]).expect("gate corridor");
    b.add_two_way("G57-S8", LinkKind::Pushback, vec![g57, s8]).expect("gate corridor");

    // Spot-to-intersection ramps, both directions as separate one-ways.
    b.add_link("S9-I2", LinkKind::Ramp, vec![s9, i2]).expect("ramp");
    b.add_link("I2-S9", LinkKind::Ramp, vec![i2, s9]).expect("ramp");
    b.add_link("S8-I3", LinkKind::Ramp, vec![s8, i3]).expect("ramp");
    b.add_link("I3-S8", LinkKind::Ramp, vec![i3, s8]).expect("ramp");

    // Cross-field taxiway and the trunk to the threshold.
    b.add_link("I2-I3", LinkKind::Taxiway, vec![i2, i3]).expect("taxiway");
    b.add_link("I3-I2", LinkKind::Taxiway, vec![i3, i2]).expect("taxiway");
    b.add_link("I2-10L", LinkKind::Taxiway, vec![i2, threshold]).expect("taxiway");

    // Runway surface and the arrival path back in.
    let runway = b.add_link("10L", LinkKind::Runway, vec![threshold, exit]).expect("runway");
    b.add_link("EXIT-I3", LinkKind::Taxiway, vec![exit, i3]).expect("taxiway");

    b.mark_gate(g51, s9);
    b.mark_gate(g53, s9);
    b.mark_gate(g55, s8);
    b.mark_gate(g57, s8);
    b.mark_spot(s9);
    b.mark_spot(s8);
    b.mark_runway(runway);

    Westfield {
        surface: b.build(3.0),
        gates: [g51, g53, g55, g57],
        runway,
    }
}
