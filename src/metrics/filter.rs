use crate::foundation::error::{PageDiffError, PageDiffResult};

/// Normalized 1-D window weights; the 2-D window is their outer product.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct Kernel {
    weights: Vec<f64>,
}

impl Kernel {
    pub(crate) fn uniform(size: u32) -> PageDiffResult<Self> {
        check_size(size)?;
        let w = 1.0 / f64::from(size);
        Ok(Self {
            weights: vec![w; size as usize],
        })
    }

    pub(crate) fn gaussian(size: u32, sigma: f64) -> PageDiffResult<Self> {
        check_size(size)?;
        if !sigma.is_finite() || sigma <= 0.0 {
            return Err(PageDiffError::validation("gaussian sigma must be > 0"));
        }

        let r = (size / 2) as i32;
        let denom = 2.0 * sigma * sigma;
        let mut weights: Vec<f64> = (-r..=r)
            .map(|i| {
                let x = f64::from(i);
                (-x * x / denom).exp()
            })
            .collect();
        let sum: f64 = weights.iter().sum();
        if sum <= 0.0 {
            return Err(PageDiffError::validation("gaussian kernel sum is zero"));
        }
        for w in &mut weights {
            *w /= sum;
        }
        Ok(Self { weights })
    }

    pub(crate) fn radius(&self) -> usize {
        self.weights.len() / 2
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.weights.len()
    }
}

fn check_size(size: u32) -> PageDiffResult<()> {
    if size < 3 || size.is_multiple_of(2) {
        return Err(PageDiffError::validation(format!(
            "window size must be odd and >= 3, got {size}"
        )));
    }
    Ok(())
}

/// Weighted local mean of a single-channel `width x height` plane.
///
/// Out-of-range taps mirror about the edge including the edge sample (`d c b a | a b c d`),
/// so the output has the same shape as the input.
pub(crate) fn filter_plane(src: &[f64], width: usize, height: usize, k: &Kernel) -> Vec<f64> {
    debug_assert_eq!(src.len(), width * height);
    let mut tmp = vec![0.0; src.len()];
    let mut out = vec![0.0; src.len()];
    horizontal_pass(src, &mut tmp, width, height, k);
    vertical_pass(&tmp, &mut out, width, height, k);
    out
}

fn horizontal_pass(src: &[f64], dst: &mut [f64], width: usize, height: usize, k: &Kernel) {
    let radius = k.radius() as i64;
    for y in 0..height {
        let row = &src[y * width..(y + 1) * width];
        for x in 0..width {
            let mut acc = 0.0;
            for (ki, &kw) in k.weights.iter().enumerate() {
                let sx = reflect(x as i64 + ki as i64 - radius, width);
                acc += kw * row[sx];
            }
            dst[y * width + x] = acc;
        }
    }
}

fn vertical_pass(src: &[f64], dst: &mut [f64], width: usize, height: usize, k: &Kernel) {
    let radius = k.radius() as i64;
    for y in 0..height {
        for x in 0..width {
            let mut acc = 0.0;
            for (ki, &kw) in k.weights.iter().enumerate() {
                let sy = reflect(y as i64 + ki as i64 - radius, height);
                acc += kw * src[sy * width + x];
            }
            dst[y * width + x] = acc;
        }
    }
}

pub(crate) fn reflect(i: i64, n: usize) -> usize {
    let n = n as i64;
    let period = 2 * n;
    let m = i.rem_euclid(period);
    (if m >= n { period - 1 - m } else { m }) as usize
}

#[cfg(test)]
#[path = "../../tests/unit/metrics/filter.rs"]
mod tests;
