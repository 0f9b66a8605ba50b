//! Predicted or observed proximity violations between two aircraft.

use std::hash::{Hash, Hasher};

use rustc_hash::FxHasher;

use asim_core::{AircraftId, GeoPoint};

/// Two aircraft too close to each other, plus the two locations that
/// triggered detection.
///
/// Identity is a content hash of the sorted callsigns and the (rounded)
/// trigger locations — conflicts found in different speculative runs compare
/// equal without any reference identity, which is what the scheduler's
/// attempt counters and unsolvable set key on.
#[derive(Clone, Debug)]
pub struct Conflict {
    /// The pair, ordered by callsign (first sorts lower).
    pub first: AircraftId,
    pub second: AircraftId,
    /// Trigger locations, in the same order as the pair.
    pub locations: (GeoPoint, GeoPoint),
    id: u64,
}

impl Conflict {
    pub fn new(
        a: AircraftId,
        a_callsign: &str,
        a_pos: GeoPoint,
        b: AircraftId,
        b_callsign: &str,
        b_pos: GeoPoint,
    ) -> Self {
        let ((first, first_cs, first_pos), (second, second_cs, second_pos)) =
            if a_callsign <= b_callsign {
                ((a, a_callsign, a_pos), (b, b_callsign, b_pos))
            } else {
                ((b, b_callsign, b_pos), (a, a_callsign, a_pos))
            };

        let mut hasher = FxHasher::default();
        first_cs.hash(&mut hasher);
        second_cs.hash(&mut hasher);
        quantize(first_pos).hash(&mut hasher);
        quantize(second_pos).hash(&mut hasher);

        Self {
            first,
            second,
            locations: (first_pos, second_pos),
            id: hasher.finish(),
        }
    }

    /// Stable content identity.
    #[inline]
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Both aircraft of the pair.
    pub fn pair(&self) -> [AircraftId; 2] {
        [self.first, self.second]
    }

    /// `true` if `aircraft` is one of the pair.
    pub fn involves(&self, aircraft: AircraftId) -> bool {
        self.first == aircraft || self.second == aircraft
    }
}

impl PartialEq for Conflict {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Conflict {}

impl Hash for Conflict {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl std::fmt::Display for Conflict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "conflict {}/{} at {} | {}",
            self.first, self.second, self.locations.0, self.locations.1
        )
    }
}

/// Round a position to ~1 cm so float noise between speculative runs cannot
/// split one physical conflict into several identities.
fn quantize(p: GeoPoint) -> (i64, i64) {
    ((p.lat * 1e7).round() as i64, (p.lon * 1e7).round() as i64)
}
