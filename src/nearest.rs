use crate::locate::Coordinates;
use crate::model::District;

/// District whose centroid is closest to `point`.
///
/// Distance is squared Euclidean over raw degrees, which is adequate at district scale.
/// On equal distances the earlier district wins.
pub fn nearest(point: Coordinates, districts: &[District]) -> Option<&District> {
    let mut best: Option<(&District, f64)> = None;
    for district in districts {
        let distance = squared_distance(point, district);
        if best.is_none_or(|(_, min)| distance < min) {
            best = Some((district, distance));
        }
    }
    best.map(|(district, _)| district)
}

/// `dx² + dy²` with two separate roundings; a fused multiply-add can flip near ties.
#[allow(clippy::suboptimal_flops)]
fn squared_distance(point: Coordinates, district: &District) -> f64 {
    let dx = district.centroid.lat - point.lat;
    let dy = district.centroid.lng - point.lng;
    dx * dx + dy * dy
}
