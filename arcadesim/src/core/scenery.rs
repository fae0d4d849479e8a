use crate::core::track_mask::TrackMask;
use rand::Rng;
use rand_distr::{Distribution, Normal};

/// (world units) Standard deviation of prop placement around a cluster center.
const CLUSTER_SPREAD: f64 = 120.0;
/// Props per cluster center.
const PROPS_PER_CLUSTER: usize = 4;
/// Placement attempts are capped at this multiple of the requested count so a mask with
/// little free background cannot spin forever.
const MAX_ATTEMPT_FACTOR: usize = 20;

/// scatter places decorative props on the unmarked background of the mask: cluster centers
/// are drawn uniformly over the world extents, prop positions normally around each center,
/// and every candidate landing on an authored marking (track, lines, barriers) is rejected.
pub fn scatter<R: Rng>(mask: &TrackMask, count: usize, rng: &mut R) -> Vec<(f64, f64)> {
    let (world_w, world_h) = mask.scaled_size();
    let offset = Normal::new(0.0, CLUSTER_SPREAD).unwrap();

    let mut props = Vec::with_capacity(count);
    let mut attempts = 0;
    let max_attempts = count * MAX_ATTEMPT_FACTOR;

    while props.len() < count && attempts < max_attempts {
        let center = (rng.gen_range(0.0..world_w), rng.gen_range(0.0..world_h));

        for _ in 0..PROPS_PER_CLUSTER {
            if props.len() >= count || attempts >= max_attempts {
                break;
            }
            attempts += 1;

            let candidate = (
                center.0 + offset.sample(rng),
                center.1 + offset.sample(rng),
            );
            if !mask.has_marking(candidate.0, candidate.1) {
                props.push(candidate);
            }
        }
    }

    props
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn props_never_land_on_marked_cells() {
        // left half track, middle band barrier, right half plain background
        let mut samples = Vec::new();
        for _ in 0..20 {
            samples.extend(std::iter::repeat(255).take(8));
            samples.extend(std::iter::repeat(200).take(4));
            samples.extend(std::iter::repeat(0).take(8));
        }
        let mask = TrackMask::new(20, 20, 10.0, samples).unwrap();

        let mut rng = StdRng::seed_from_u64(7);
        let props = scatter(&mask, 50, &mut rng);

        assert!(!props.is_empty());
        for (x, y) in props {
            assert!(!mask.has_marking(x, y));
        }
    }

    #[test]
    fn line_markings_are_rejected_too() {
        // alternate start/finish/checkpoint columns with background columns
        let mut samples = Vec::new();
        for _ in 0..12 {
            for x in 0..12 {
                samples.push(match x % 4 {
                    0 => 210,
                    1 => 220,
                    2 => 230,
                    _ => 0,
                });
            }
        }
        let mask = TrackMask::new(12, 12, 10.0, samples).unwrap();

        let mut rng = StdRng::seed_from_u64(11);
        for (x, y) in scatter(&mask, 40, &mut rng) {
            assert!(!mask.has_marking(x, y));
        }
    }

    #[test]
    fn attempt_cap_terminates_on_a_fully_marked_mask() {
        // a large all-track world rejects nearly every candidate; the attempt cap still
        // bounds the loop
        let mask = TrackMask::new(10, 10, 1000.0, vec![255; 100]).unwrap();
        let mut rng = StdRng::seed_from_u64(7);
        let props = scatter(&mask, 30, &mut rng);
        assert!(props.len() <= 30);
        for (x, y) in props {
            assert!(!mask.has_marking(x, y));
        }
    }
}
