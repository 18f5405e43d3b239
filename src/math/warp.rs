// Copyright @yucwang 2023

use super::constants::{ Float, Rotation3f, Vector2f, Vector3f, PI };

use nalgebra::Unit;
use rand::Rng;

/// Uniform point in a disk of the given diameter, by rejection from the
/// bounding square.
pub fn sample_uniform_disk<R: Rng + ?Sized>(diameter: Float, rng: &mut R) -> Vector2f {
    let radius2 = diameter * diameter / 4.0;
    loop {
        let p = sample_uniform_square(diameter, rng);
        if p.x * p.x + p.y * p.y <= radius2 {
            return p;
        }
    }
}

/// Uniform point in a centered square with the given side.
pub fn sample_uniform_square<R: Rng + ?Sized>(side: Float, rng: &mut R) -> Vector2f {
    let x: Float = (rng.gen::<Float>() - 0.5) * side;
    let y: Float = (rng.gen::<Float>() - 0.5) * side;
    Vector2f::new(x, y)
}

/// A randomly rotated unit vector perpendicular to `v`, or `(1, 0, 0)` for a zero `v`.
pub fn random_perpendicular<R: Rng + ?Sized>(v: &Vector3f, rng: &mut R) -> Vector3f {
    if v.norm() == 0.0 {
        return Vector3f::new(1.0, 0.0, 0.0);
    }
    let axis = v.normalize();
    let helper = if axis.x.abs() < 0.9 {
        Vector3f::new(1.0, 0.0, 0.0)
    } else {
        Vector3f::new(0.0, 1.0, 0.0)
    };
    let normal = axis.cross(&helper).normalize();
    let angle = 2.0 * PI * rng.gen::<Float>();
    Rotation3f::from_axis_angle(&Unit::new_normalize(axis), angle) * normal
}

/// Value in `[0, max]` with a density growing linearly from zero.
pub fn rand_linear<R: Rng + ?Sized>(max: Float, rng: &mut R) -> Float {
    max * rng.gen::<Float>().sqrt()
}

/// Value in `[min, max]` with density proportional to `x^index`.
pub fn rand_power<R: Rng + ?Sized>(min: Float, max: Float, index: Float, rng: &mut R) -> Float {
    let u: Float = rng.gen();
    if (index + 1.0).abs() < 1e-12 {
        return min * (max / min).powf(u);
    }
    let a = index + 1.0;
    let lo = min.powf(a);
    let hi = max.powf(a);
    (lo + (hi - lo) * u).powf(1.0 / a)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::rng::LcgRng;

    #[test]
    fn test_disk_samples_inside() {
        let mut rng = LcgRng::new(7);
        for _ in 0..1000 {
            let p = sample_uniform_disk(4.0, &mut rng);
            assert!(p.norm() <= 2.0);
        }
    }

    #[test]
    fn test_square_samples_inside() {
        let mut rng = LcgRng::new(8);
        for _ in 0..1000 {
            let p = sample_uniform_square(4.0, &mut rng);
            assert!(p.x.abs() <= 2.0 && p.y.abs() <= 2.0);
        }
    }

    #[test]
    fn test_random_perpendicular() {
        let mut rng = LcgRng::new(9);
        let v = Vector3f::new(1.0, -2.0, 0.5);
        for _ in 0..100 {
            let p = random_perpendicular(&v, &mut rng);
            assert!(p.dot(&v).abs() < 1e-9);
            assert!((p.norm() - 1.0).abs() < 1e-9);
        }
        assert_eq!(random_perpendicular(&Vector3f::zeros(), &mut rng), Vector3f::new(1.0, 0.0, 0.0));
    }

    #[test]
    fn test_rand_linear_and_power_ranges() {
        let mut rng = LcgRng::new(10);
        let mut mean = 0.0;
        let n = 20000;
        for _ in 0..n {
            let x = rand_linear(3.0, &mut rng);
            assert!(x >= 0.0 && x <= 3.0);
            mean += x / n as Float;
        }
        // Mean of a linear density on [0, 3] is 2.
        assert!((mean - 2.0).abs() < 0.05);

        for index in [-1.0, -2.7, 0.5].iter() {
            for _ in 0..1000 {
                let x = rand_power(1e2, 1e8, *index, &mut rng);
                assert!(x >= 1e2 * 0.999999 && x <= 1e8 * 1.000001);
            }
        }
    }
}
