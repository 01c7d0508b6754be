//! Rooftop layout generation and safe-spawn selection

use glam::Vec2;
use rand::Rng;

use super::state::{Building, Realm, Tint};
use crate::tuning::{SkylineTuning, Span};

/// Rift building ids start here so ids stay unique across realms
const RIFT_ID_BASE: u32 = 1 << 16;

/// Horizontal clearance a roof needs beyond the fighter's width to be a safe spawn
pub const SAFE_SPAWN_MARGIN: f32 = 20.0;

fn tint_for(realm: Realm, rng: &mut impl Rng) -> Tint {
    match realm {
        Realm::Normal => Tint {
            hue: Span::new(230.0, 240.0).sample(rng),
            saturation: 40.0,
            lightness: Span::new(30.0, 50.0).sample(rng),
        },
        Realm::Rift => Tint {
            hue: Span::new(260.0, 300.0).sample(rng),
            saturation: 70.0,
            lightness: Span::new(40.0, 60.0).sample(rng),
        },
    }
}

/// Generate the skyline for one realm
///
/// Walks an X cursor left to right, sometimes leaving a gap, then appends a
/// building of random width/height. The result is X-sorted, non-overlapping,
/// never empty, and at least `min_span` long.
pub fn generate(realm: Realm, tuning: &SkylineTuning, rng: &mut impl Rng) -> Vec<Building> {
    let id_base = match realm {
        Realm::Normal => 0,
        Realm::Rift => RIFT_ID_BASE,
    };
    let count = tuning.count.max(1);
    let mut buildings = Vec::with_capacity(count as usize);
    let mut cursor = 0.0_f32;
    let mut i = 0u32;

    while i < count || cursor < tuning.min_span {
        // First building always starts at the origin
        if i > 0 && rng.random_bool(tuning.gap_chance.clamp(0.0, 1.0) as f64) {
            cursor += tuning.gap.sample(rng);
        }

        let width = tuning.width.sample(rng).max(1.0);
        let height = tuning.height.sample(rng).max(1.0);
        buildings.push(Building {
            id: id_base + i,
            x: cursor,
            width,
            height,
            realm,
            tint: tint_for(realm, rng),
        });

        cursor += width + tuning.spacing.sample(rng).max(0.0);
        i += 1;
    }

    buildings
}

/// Roof-top spawn points (top-left of a `size` box centred on each wide-enough roof)
pub fn safe_spawns(
    buildings: &[Building],
    floor_y: f32,
    size: Vec2,
) -> impl Iterator<Item = Vec2> + '_ {
    buildings
        .iter()
        .filter(move |b| b.width > size.x + SAFE_SPAWN_MARGIN)
        .map(move |b| roof_spawn(b, floor_y, size))
}

fn roof_spawn(b: &Building, floor_y: f32, size: Vec2) -> Vec2 {
    Vec2::new(b.x + b.width / 2.0 - size.x / 2.0, b.roof_y(floor_y) - size.y)
}

/// Fallback when no roof is wide enough: a content defect, so complain loudly in debug
fn fallback_spawn(buildings: &[Building], floor_y: f32, size: Vec2) -> Vec2 {
    debug_assert!(
        !buildings.is_empty(),
        "skyline has no buildings to spawn on"
    );
    log::warn!("No roof wide enough for a safe spawn, using the first building");
    match buildings.first() {
        Some(b) => roof_spawn(b, floor_y, size),
        None => Vec2::new(0.0, floor_y - size.y),
    }
}

/// Left-most safe spawn (deterministic player start)
pub fn first_safe_spawn(buildings: &[Building], floor_y: f32, size: Vec2) -> Vec2 {
    safe_spawns(buildings, floor_y, size)
        .next()
        .unwrap_or_else(|| fallback_spawn(buildings, floor_y, size))
}

/// Random safe spawn whose horizontal distance from `origin_x` falls inside `distance`.
/// Falls back to the nearest safe spawn outside the window, then to the first building.
pub fn safe_spawn_near(
    buildings: &[Building],
    floor_y: f32,
    size: Vec2,
    origin_x: f32,
    distance: Span,
    rng: &mut impl Rng,
) -> Vec2 {
    let in_window: Vec<Vec2> = safe_spawns(buildings, floor_y, size)
        .filter(|p| distance.contains((p.x - origin_x).abs()))
        .collect();

    if !in_window.is_empty() {
        return in_window[rng.random_range(0..in_window.len())];
    }

    safe_spawns(buildings, floor_y, size)
        .min_by(|a, b| {
            let da = ((a.x - origin_x).abs() - distance.min).abs();
            let db = ((b.x - origin_x).abs() - distance.min).abs();
            da.partial_cmp(&db).unwrap_or(std::cmp::Ordering::Equal)
        })
        .unwrap_or_else(|| fallback_spawn(buildings, floor_y, size))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    #[test]
    fn test_layout_sorted_and_non_overlapping() {
        let tuning = SkylineTuning::default();
        for seed in 0..20 {
            let mut rng = Pcg32::seed_from_u64(seed);
            let buildings = generate(Realm::Normal, &tuning, &mut rng);
            assert!(buildings.len() >= tuning.count as usize);
            for pair in buildings.windows(2) {
                assert!(pair[0].right() <= pair[1].x);
            }
            let last = buildings.last().unwrap();
            assert!(last.right() >= tuning.min_span);
        }
    }

    #[test]
    fn test_dimensions_within_bounds() {
        let tuning = SkylineTuning::default();
        let mut rng = Pcg32::seed_from_u64(3);
        for b in generate(Realm::Rift, &tuning, &mut rng) {
            assert!(tuning.width.contains(b.width));
            assert!(tuning.height.contains(b.height));
            assert_eq!(b.realm, Realm::Rift);
            assert!((260.0..=300.0).contains(&b.tint.hue));
            assert!(b.id >= RIFT_ID_BASE);
        }
    }

    #[test]
    fn test_min_span_extends_layout() {
        let tuning = SkylineTuning {
            count: 1,
            min_span: 5000.0,
            ..Default::default()
        };
        let mut rng = Pcg32::seed_from_u64(1);
        let buildings = generate(Realm::Normal, &tuning, &mut rng);
        assert!(buildings.len() > 1);
        assert!(buildings.last().unwrap().right() >= 5000.0);
    }

    #[test]
    fn test_never_empty() {
        let tuning = SkylineTuning {
            count: 0,
            min_span: 0.0,
            ..Default::default()
        };
        let mut rng = Pcg32::seed_from_u64(1);
        assert_eq!(generate(Realm::Normal, &tuning, &mut rng).len(), 1);
    }

    fn building(id: u32, x: f32, width: f32) -> Building {
        Building {
            id,
            x,
            width,
            height: 200.0,
            realm: Realm::Normal,
            tint: Tint { hue: 0.0, saturation: 0.0, lightness: 0.0 },
        }
    }

    #[test]
    fn test_safe_spawn_skips_narrow_roofs() {
        let size = Vec2::new(30.0, 70.0);
        let buildings = vec![building(0, 0.0, 40.0), building(1, 100.0, 200.0)];
        let spawn = first_safe_spawn(&buildings, 800.0, size);
        assert_eq!(spawn, Vec2::new(185.0, 530.0));
    }

    #[test]
    fn test_safe_spawn_near_respects_window() {
        let size = Vec2::new(30.0, 70.0);
        let buildings: Vec<_> = (0..10).map(|i| building(i, i as f32 * 300.0, 200.0)).collect();
        let mut rng = Pcg32::seed_from_u64(9);
        for _ in 0..50 {
            let p = safe_spawn_near(&buildings, 800.0, size, 0.0, Span::new(500.0, 1000.0), &mut rng);
            assert!((500.0..=1000.0).contains(&p.x));
        }
    }
}
