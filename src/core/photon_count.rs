// Copyright @yucwang 2026

use crate::math::bitmap::Bitmap;
use crate::math::constants::{Float, Vector3f};

use rand::Rng;
use rand_distr::{Distribution, Poisson};

/// Time-binned photon counts for a square-ish grid of pixels, each pixel
/// looking along a fixed direction in the detector frame.
///
/// Pixels whose centre lies outside the inscribed circle of the grid are
/// invalid; they are never written and never visited by `SignalIterator`.
#[derive(Debug, Clone)]
pub struct PhotonCount {
    nx: usize,
    ny: usize,
    start_time: Float,
    time_bin: Float,
    n_time_bins: usize,
    angular_size: Float,
    linear_size: Float,
    counts: Vec<u32>,
    valid: Bitmap<bool>,
}

impl PhotonCount {
    pub fn new(nx: usize,
               ny: usize,
               start_time: Float,
               time_bin: Float,
               n_time_bins: usize,
               angular_size: Float,
               linear_size: Float) -> Self {
        let radius = nx.min(ny) as Float / 2.0;
        let valid = Bitmap::from_fn(nx, ny, |x, y| {
            let dx = x as Float + 0.5 - nx as Float / 2.0;
            let dy = y as Float + 0.5 - ny as Float / 2.0;
            dx * dx + dy * dy <= radius * radius
        });
        Self {
            nx,
            ny,
            start_time,
            time_bin,
            n_time_bins,
            angular_size,
            linear_size,
            counts: vec![0; nx * ny * n_time_bins],
            valid,
        }
    }

    pub fn size(&self) -> (usize, usize) {
        (self.nx, self.ny)
    }

    pub fn n_bins(&self) -> usize {
        self.n_time_bins
    }

    pub fn start_time(&self) -> Float {
        self.start_time
    }

    pub fn time_bin(&self) -> Float {
        self.time_bin
    }

    pub fn angular_size(&self) -> Float {
        self.angular_size
    }

    pub fn linear_size(&self) -> Float {
        self.linear_size
    }

    /// Start of time bin `i`.
    pub fn time(&self, i: usize) -> Float {
        self.start_time + i as Float * self.time_bin
    }

    pub fn valid_pixels(&self) -> &Bitmap<bool> {
        &self.valid
    }

    pub fn is_valid(&self, x: usize, y: usize) -> bool {
        self.valid.get(x, y).copied().unwrap_or(false)
    }

    pub fn valid_count(&self) -> usize {
        self.iter().count()
    }

    /// Unit view direction through the centre of a pixel.
    pub fn direction(&self, x: usize, y: usize) -> Vector3f {
        let theta_x = (x as Float + 0.5 - self.nx as Float / 2.0) * self.angular_size;
        let theta_y = (y as Float + 0.5 - self.ny as Float / 2.0) * self.angular_size;
        Vector3f::new(theta_x.tan(), theta_y.tan(), 1.0).normalize()
    }

    pub fn signal(&self, x: usize, y: usize) -> Option<&[u32]> {
        if x >= self.nx || y >= self.ny {
            return None;
        }
        let start = self.offset(x, y);
        Some(&self.counts[start..start + self.n_time_bins])
    }

    pub fn sum_bins(&self, x: usize, y: usize) -> u32 {
        self.signal(x, y).map(|s| s.iter().sum()).unwrap_or(0)
    }

    /// Count-weighted mean of the bin centres; `None` without signal.
    pub fn average_time(&self, x: usize, y: usize) -> Option<Float> {
        let signal = self.signal(x, y)?;
        let mut weight = 0.0;
        let mut sum = 0.0;
        for (i, &count) in signal.iter().enumerate() {
            weight += count as Float;
            sum += count as Float * (self.time(i) + self.time_bin / 2.0);
        }
        if weight > 0.0 { Some(sum / weight) } else { None }
    }

    pub fn total(&self) -> u64 {
        self.counts.iter().map(|&c| c as u64).sum()
    }

    /// Bins one photon. Directions off the valid grid and times off the time
    /// axis are dropped; returns whether the photon was stored.
    pub fn add_photon(&mut self, time: Float, direction: &Vector3f) -> bool {
        let (x, y) = match self.pixel_of(direction) {
            Some(pixel) => pixel,
            None => return false,
        };
        let bin = ((time - self.start_time) / self.time_bin).floor();
        if !(bin >= 0.0 && bin < self.n_time_bins as Float) {
            return false;
        }
        let index = self.offset(x, y) + bin as usize;
        self.counts[index] += 1;
        true
    }

    /// Adds Poisson background to one pixel, spread uniformly over the time
    /// axis. `rate` is in photons / (s sr cm^2). Returns the number added.
    pub fn add_noise<R: Rng + ?Sized>(&mut self, rate: Float, pixel: (usize, usize), rng: &mut R) -> u64 {
        let (x, y) = pixel;
        if !self.is_valid(x, y) || self.n_time_bins == 0 {
            return 0;
        }
        let mean = rate
            * self.angular_size * self.angular_size
            * self.linear_size * self.linear_size
            * self.time_bin * self.n_time_bins as Float;
        if !(mean > 0.0) {
            return 0;
        }
        let poisson = match Poisson::new(mean) {
            Ok(p) => p,
            Err(_) => return 0,
        };
        let n: Float = poisson.sample(rng);
        let n = n as u64;
        let start = self.offset(x, y);
        for _ in 0..n {
            let bin = rng.gen_range(0..self.n_time_bins);
            self.counts[start + bin] += 1;
        }
        n
    }

    pub fn add_noise_all<R: Rng + ?Sized>(&mut self, rate: Float, rng: &mut R) -> u64 {
        let pixels: Vec<(usize, usize)> = self.iter().collect();
        let added: u64 = pixels.into_iter().map(|p| self.add_noise(rate, p, rng)).sum();
        log::debug!("Added {} noise photons at rate {}.", added, rate);
        added
    }

    pub fn iter(&self) -> SignalIterator<'_> {
        SignalIterator::new(&self.valid)
    }

    fn pixel_of(&self, direction: &Vector3f) -> Option<(usize, usize)> {
        if !(direction.z > 0.0) {
            return None;
        }
        let fx = (direction.x / direction.z).atan() / self.angular_size + self.nx as Float / 2.0;
        let fy = (direction.y / direction.z).atan() / self.angular_size + self.ny as Float / 2.0;
        let (fx, fy) = (fx.floor(), fy.floor());
        if !(fx >= 0.0 && fy >= 0.0 && fx < self.nx as Float && fy < self.ny as Float) {
            return None;
        }
        let (x, y) = (fx as usize, fy as usize);
        if self.valid[(x, y)] { Some((x, y)) } else { None }
    }

    fn offset(&self, x: usize, y: usize) -> usize {
        (x + self.nx * y) * self.n_time_bins
    }
}

/// Cursor over the valid pixels of a grid in row-major order.
#[derive(Debug, Clone)]
pub struct SignalIterator<'a> {
    valid: &'a Bitmap<bool>,
    next: usize,
    current: Option<usize>,
}

impl<'a> SignalIterator<'a> {
    pub fn new(valid: &'a Bitmap<bool>) -> Self {
        Self { valid, next: 0, current: None }
    }

    pub fn x(&self) -> usize {
        self.current.map(|i| i % self.valid.width()).unwrap_or(0)
    }

    pub fn y(&self) -> usize {
        self.current.map(|i| i / self.valid.width()).unwrap_or(0)
    }

    /// Moves to the next valid pixel; false once the grid is exhausted.
    pub fn next_pixel(&mut self) -> bool {
        let width = self.valid.width();
        let len = width * self.valid.height();
        while self.next < len {
            let index = self.next;
            self.next += 1;
            if self.valid[(index % width, index / width)] {
                self.current = Some(index);
                return true;
            }
        }
        self.current = None;
        false
    }

    pub fn reset(&mut self) {
        self.next = 0;
        self.current = None;
    }
}

impl<'a> Iterator for SignalIterator<'a> {
    type Item = (usize, usize);

    fn next(&mut self) -> Option<Self::Item> {
        if self.next_pixel() {
            Some((self.x(), self.y()))
        } else {
            None
        }
    }
}
