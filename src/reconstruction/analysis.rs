// Copyright @yucwang 2026

use crate::core::photon_count::PhotonCount;
use crate::math::bitmap::Bitmap;
use crate::math::constants::{Float, Vector3f};

/// Time axis of the readout and the count in each bin summed over all
/// valid pixels.
pub fn superimpose_times(data: &PhotonCount) -> (Vec<Float>, Vec<u32>) {
    let times: Vec<Float> = (0..data.n_bins()).map(|i| data.time(i)).collect();
    let mut counts = vec![0u32; data.n_bins()];
    for (x, y) in data.iter() {
        if let Some(signal) = data.signal(x, y) {
            for (total, &count) in counts.iter_mut().zip(signal.iter()) {
                *total += count;
            }
        }
    }
    (times, counts)
}

/// Summed signal per pixel; invalid pixels read zero.
pub fn sum_map(data: &PhotonCount) -> Bitmap<u32> {
    let (nx, ny) = data.size();
    let mut map = Bitmap::new(nx, ny);
    for (x, y) in data.iter() {
        map[(x, y)] = data.sum_bins(x, y);
    }
    map
}

pub fn valid_map(data: &PhotonCount) -> Bitmap<bool> {
    data.valid_pixels().clone()
}

/// Valid pixels whose summed signal reaches `threshold`.
pub fn triggered_pixels(data: &PhotonCount, threshold: u32) -> Bitmap<bool> {
    let (nx, ny) = data.size();
    let mut map = Bitmap::filled(nx, ny, false);
    for (x, y) in data.iter() {
        map[(x, y)] = data.sum_bins(x, y) >= threshold;
    }
    map
}

/// Signed angle of every valid pixel from the shower axis, measured inside
/// the shower-detector plane, paired with the pixel's summed signal. Pixels
/// `above` the projected axis get positive angles.
///
/// `sdp_normal` and `shower_axis` must be in the detector frame.
pub fn collapse_to_profile(data: &PhotonCount, sdp_normal: &Vector3f,
                           shower_axis: &Vector3f) -> Vec<(Float, u32)> {
    let normal = sdp_normal.normalize();
    let axis = shower_axis - shower_axis.dot(&normal) * normal;
    data.iter()
        .map(|(x, y)| {
            let direction = data.direction(x, y);
            let projection = direction - direction.dot(&normal) * normal;
            let angle = projection.angle(&axis);
            let signed = if above(&axis, &projection) { angle } else { -angle };
            (signed, data.sum_bins(x, y))
        })
        .collect()
}

/// Size of the largest 4-connected group of set pixels.
pub fn largest_cluster(mask: &Bitmap<bool>) -> usize {
    let (width, height) = (mask.width(), mask.height());
    let mut visited = Bitmap::filled(width, height, false);
    let mut stack: Vec<(usize, usize)> = Vec::new();
    let mut largest = 0;

    for y in 0..height {
        for x in 0..width {
            if !mask[(x, y)] || visited[(x, y)] {
                continue;
            }
            visited[(x, y)] = true;
            stack.push((x, y));
            let mut size = 0;
            while let Some((cx, cy)) = stack.pop() {
                size += 1;
                let mut neighbours = Vec::with_capacity(4);
                if cx > 0 { neighbours.push((cx - 1, cy)); }
                if cx + 1 < width { neighbours.push((cx + 1, cy)); }
                if cy > 0 { neighbours.push((cx, cy - 1)); }
                if cy + 1 < height { neighbours.push((cx, cy + 1)); }
                for n in neighbours {
                    if mask[n] && !visited[n] {
                        visited[n] = true;
                        stack.push(n);
                    }
                }
            }
            largest = largest.max(size);
        }
    }
    largest
}

// Higher z wins; equal heights fall back to y.
fn above(reference: &Vector3f, other: &Vector3f) -> bool {
    if other.z != reference.z {
        other.z > reference.z
    } else {
        other.y > reference.y
    }
}
