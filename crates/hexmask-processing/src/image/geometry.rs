//! Hexagon inscribed in a square pixel grid.

/// sqrt(3). `std::f64::consts::SQRT_3` is not stable.
const SQRT_3: f64 = 1.732_050_807_568_877_2;

/// Hexagon inscribed in a `size x size` square, centered at `(size/2, size/2)`.
///
/// Pixel `(x, y)` is sampled at its integer coordinate. With `dx = |x - c|` and
/// `dy = |y - c|` it is inside iff `dx <= half_width`, `dy <= radius` and
/// `dx + dy / sqrt(3) <= radius`. All comparisons are inclusive.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hexagon {
    center: f64,
    radius: f64,
    half_width: f64,
}

impl Hexagon {
    pub fn inscribed(size: u32) -> Self {
        let radius = f64::from(size) / 2.0;
        Self {
            center: radius,
            radius,
            half_width: radius * SQRT_3 / 2.0,
        }
    }

    pub fn radius(&self) -> f64 {
        self.radius
    }

    pub fn half_width(&self) -> f64 {
        self.half_width
    }

    pub fn contains(&self, x: u32, y: u32) -> bool {
        let dx = (f64::from(x) - self.center).abs();
        let dy = (f64::from(y) - self.center).abs();
        dx <= self.half_width && dy <= self.radius && dx + dy / SQRT_3 <= self.radius
    }

    /// Number of pixels of a `size x size` grid that fall inside the inscribed hexagon.
    pub fn interior_pixel_count(size: u32) -> u64 {
        let hex = Self::inscribed(size);
        let mut count = 0u64;
        for y in 0..size {
            for x in 0..size {
                if hex.contains(x, y) {
                    count += 1;
                }
            }
        }
        count
    }
}
