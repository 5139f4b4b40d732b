//! Wheel layout: which wedge sits in which segment

use serde::{Deserialize, Serialize};

use super::state::{WedgeKind, WedgeResult};
use super::wheel::calculate_landing_segment;

/// One labeled sector of the wheel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Wedge {
    pub id: u32,
    pub kind: WedgeKind,
    /// Points per consonant (ignored for non-point wedges)
    #[serde(default)]
    pub value: u32,
}

impl Wedge {
    pub fn result(&self) -> WedgeResult {
        let value = match self.kind {
            WedgeKind::Points => self.value,
            _ => 0,
        };
        WedgeResult {
            kind: self.kind,
            value,
            wedge_id: self.id,
        }
    }
}

/// Ordered wedges, segment 0 first, going clockwise
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WheelLayout {
    pub wedges: Vec<Wedge>,
}

impl Default for WheelLayout {
    fn default() -> Self {
        Self::standard()
    }
}

impl WheelLayout {
    /// 24 wedges: point values 300-900 plus one each of
    /// bankrupt, lose-a-turn and free spin
    pub fn standard() -> Self {
        use WedgeKind::*;
        let pattern: [(WedgeKind, u32); 24] = [
            (Points, 500),
            (Points, 300),
            (Points, 900),
            (Bankrupt, 0),
            (Points, 600),
            (Points, 400),
            (Points, 700),
            (Points, 350),
            (FreeSpin, 0),
            (Points, 800),
            (Points, 300),
            (Points, 450),
            (Points, 600),
            (LoseTurn, 0),
            (Points, 500),
            (Points, 650),
            (Points, 300),
            (Points, 900),
            (Points, 400),
            (Points, 550),
            (Points, 300),
            (Points, 750),
            (Points, 500),
            (Points, 850),
        ];
        let wedges = pattern
            .iter()
            .enumerate()
            .map(|(i, &(kind, value))| Wedge {
                id: i as u32,
                kind,
                value,
            })
            .collect();
        Self { wedges }
    }

    pub fn len(&self) -> usize {
        self.wedges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.wedges.is_empty()
    }

    pub fn result_for_segment(&self, index: usize) -> Option<WedgeResult> {
        self.wedges.get(index).map(Wedge::result)
    }

    /// Wedge under the pointer at a given wheel rotation
    pub fn result_at(&self, rotation: f64) -> Option<WedgeResult> {
        self.result_for_segment(calculate_landing_segment(rotation, self.len()))
    }
}
