//! Layout positioning algorithms
//!
//! Reusable row and angular distribution helpers shared by the layout
//! strategies.

use agentmap_core::{category::Sector, geometry::Size};

/// Distribute elements horizontally with appropriate spacing
///
/// Places elements in a row starting at x = 0 with `min_spacing` between
/// neighbors. `extra_spacings[i]`, when present, is the requested gap between
/// elements `i` and `i + 1`; the larger of the two is used.
///
/// # Returns
/// A vector of X positions for the centers of each element
pub fn distribute_horizontally(
    sizes: &[Size],
    min_spacing: f32,
    extra_spacings: Option<&[f32]>,
) -> Vec<f32> {
    let mut positions = Vec::with_capacity(sizes.len());
    let mut x_position: f32 = 0.0;

    for (i, size) in sizes.iter().enumerate() {
        if i == 0 {
            x_position += size.width() / 2.0;
        } else {
            let prev_width = sizes[i - 1].width();
            let additional_spacing = extra_spacings
                .and_then(|spacings| spacings.get(i - 1).copied())
                .unwrap_or(0.0);
            let effective_spacing = min_spacing.max(additional_spacing);

            x_position += (prev_width / 2.0) + effective_spacing + (size.width() / 2.0);
        }

        positions.push(x_position);
    }

    positions
}

/// Total width of a row laid out by [`distribute_horizontally`] with a uniform gap.
pub fn row_width(sizes: &[Size], spacing: f32) -> f32 {
    let widths: f32 = sizes.iter().map(|size| size.width()).sum();
    let gaps = sizes.len().saturating_sub(1) as f32 * spacing;
    widths + gaps
}

/// Bearings for `count` items spread across a sector.
///
/// A single item sits on the sector midpoint. Several items span the middle
/// 80% of the sector so the outermost ones keep clear of the neighboring
/// sectors.
pub fn spread_in_sector(sector: Sector, count: usize) -> Vec<f32> {
    match count {
        0 => Vec::new(),
        1 => vec![sector.midpoint()],
        _ => (0..count)
            .map(|i| {
                let fraction = 0.1 + 0.8 * i as f32 / (count - 1) as f32;
                sector.bearing_at(fraction)
            })
            .collect(),
    }
}

/// Bearings for `count` items evenly spaced on a full circle, starting at 12 o'clock.
pub fn spread_on_circle(count: usize) -> Vec<f32> {
    (0..count)
        .map(|i| 360.0 * i as f32 / count as f32)
        .collect()
}

#[cfg(test)]
mod tests {
    use float_cmp::assert_approx_eq;

    use super::*;

    #[test]
    fn test_distribute_horizontally_uses_larger_gap() {
        let sizes = [
            Size::new(100.0, 10.0),
            Size::new(50.0, 10.0),
            Size::new(100.0, 10.0),
        ];
        let extra = [80.0, 0.0];
        let xs = distribute_horizontally(&sizes, 40.0, Some(&extra[..]));

        assert_eq!(xs.len(), 3);
        assert_approx_eq!(f32, xs[0], 50.0);
        assert_approx_eq!(f32, xs[1], 100.0 + 80.0 + 25.0);
        assert_approx_eq!(f32, xs[2], 100.0 + 80.0 + 50.0 + 40.0 + 50.0);
    }

    #[test]
    fn test_distribute_horizontally_empty() {
        assert!(distribute_horizontally(&[], 10.0, None).is_empty());
    }

    #[test]
    fn test_row_width() {
        let sizes = [Size::new(30.0, 10.0), Size::new(20.0, 10.0)];
        assert_approx_eq!(f32, row_width(&sizes, 5.0), 55.0);
        assert_approx_eq!(f32, row_width(&[], 5.0), 0.0);
    }

    #[test]
    fn test_spread_in_sector() {
        let sector = Sector::new(90.0, 150.0);
        assert_eq!(spread_in_sector(sector, 0), Vec::<f32>::new());

        let single = spread_in_sector(sector, 1);
        assert_approx_eq!(f32, single[0], 120.0);

        let three = spread_in_sector(sector, 3);
        assert_approx_eq!(f32, three[0], 96.0, epsilon = 1e-4);
        assert_approx_eq!(f32, three[1], 120.0, epsilon = 1e-4);
        assert_approx_eq!(f32, three[2], 144.0, epsilon = 1e-4);
    }

    #[test]
    fn test_spread_in_wrapping_sector() {
        let bearings = spread_in_sector(Sector::new(330.0, 30.0), 2);
        assert_approx_eq!(f32, bearings[0], 336.0, epsilon = 1e-4);
        assert_approx_eq!(f32, bearings[1], 24.0, epsilon = 1e-4);
    }

    #[test]
    fn test_spread_on_circle() {
        let bearings = spread_on_circle(4);
        assert_eq!(bearings, vec![0.0, 90.0, 180.0, 270.0]);
        assert!(spread_on_circle(0).is_empty());
    }
}
