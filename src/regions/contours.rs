use imageproc::contours::{BorderType, find_contours};
use imageproc::point::Point;

use crate::foundation::core::Region;
use crate::metrics::threshold::BinaryMask;

/// Outer boundary of one connected foreground blob, as a compressed polyline.
///
/// Only straight-run endpoints are kept; intermediate collinear points are dropped.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExternalContour {
    /// Polyline vertices in tracing order.
    pub points: Vec<(u32, u32)>,
}

impl ExternalContour {
    /// Minimal axis-aligned rectangle enclosing every vertex.
    pub fn bounding_box(&self) -> Option<Region> {
        let (&(x0, y0), rest) = self.points.split_first()?;
        let (mut min_x, mut min_y, mut max_x, mut max_y) = (x0, y0, x0, y0);
        for &(x, y) in rest {
            min_x = min_x.min(x);
            min_y = min_y.min(y);
            max_x = max_x.max(x);
            max_y = max_y.max(y);
        }
        Some(Region {
            x: min_x,
            y: min_y,
            width: max_x - min_x + 1,
            height: max_y - min_y + 1,
        })
    }
}

/// Outermost contours of the mask's foreground.
///
/// Holes inside a blob, and blobs sitting inside those holes, are not reported.
pub fn external_contours(mask: &BinaryMask) -> Vec<ExternalContour> {
    find_contours::<i32>(mask.as_image())
        .into_iter()
        .filter(|c| c.border_type == BorderType::Outer && c.parent.is_none())
        .map(|c| ExternalContour {
            points: compress_chain(&c.points)
                .into_iter()
                .map(|p| (p.x as u32, p.y as u32))
                .collect(),
        })
        .collect()
}

/// Bounding boxes of every external contour, ordered top-to-bottom then left-to-right.
///
/// An all-background mask yields no regions.
#[tracing::instrument(skip_all, fields(width = mask.width(), height = mask.height()))]
pub fn extract_regions(mask: &BinaryMask) -> Vec<Region> {
    let mut regions: Vec<Region> = external_contours(mask)
        .iter()
        .filter_map(ExternalContour::bounding_box)
        .collect();
    regions.sort_by_key(|r| (r.y, r.x, r.height, r.width));
    tracing::debug!(count = regions.len(), "regions extracted");
    regions
}

/// Drop every point that continues a straight run started by its predecessor.
pub(crate) fn compress_chain(points: &[Point<i32>]) -> Vec<Point<i32>> {
    if points.len() < 3 {
        return points.to_vec();
    }
    let mut out = Vec::with_capacity(points.len());
    out.push(points[0]);
    for window in points.windows(3) {
        let (prev, cur, next) = (window[0], window[1], window[2]);
        let d1 = (cur.x - prev.x, cur.y - prev.y);
        let d2 = (next.x - cur.x, next.y - cur.y);
        let cross = d1.0 * d2.1 - d1.1 * d2.0;
        let dot = d1.0 * d2.0 + d1.1 * d2.1;
        if cross != 0 || dot <= 0 {
            out.push(cur);
        }
    }
    if let Some(&last) = points.last() {
        out.push(last);
    }
    out
}

#[cfg(test)]
#[path = "../../tests/unit/regions/contours.rs"]
mod tests;
