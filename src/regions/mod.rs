/// External contour tracing and bounding boxes.
pub mod contours;
