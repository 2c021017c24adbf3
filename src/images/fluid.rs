//! Responsive ("fluid") rendition calculations.
//!
//! A fluid image is shown at up to `max_width` CSS pixels and ships
//! renditions for 0.25x to 3x of that width so the browser can pick one
//! for the current viewport and pixel density.

use serde::Serialize;

/// Width multipliers relative to `max_width`
const DENSITIES: [f64; 6] = [0.25, 0.5, 1.0, 1.5, 2.0, 3.0];

/// One generated rendition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rendition {
    pub width: u32,
    pub height: u32,
}

/// A responsive image as consumed by the views
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FluidImage {
    /// Source width / height
    pub aspect_ratio: f64,
    /// Fallback URL, the rendition closest to `max_width`
    pub src: String,
    /// Candidate URLs with `w` descriptors, one per line
    pub src_set: String,
    /// CSS `sizes` attribute value
    pub sizes: String,
    /// Width the image is laid out at, `min(max_width, source width)`
    pub presentation_width: u32,
    /// CSS colour shown while the image loads
    pub placeholder: Option<String>,
}

/// Rendition widths for a source `original_width` pixels wide.
///
/// Candidates at or beyond the source width are dropped and the source
/// width itself is always included, so small images still get their
/// largest possible rendition. Result is sorted ascending.
pub fn fluid_widths(max_width: u32, original_width: u32) -> Vec<u32> {
    let mut widths: Vec<u32> = DENSITIES
        .iter()
        .map(|d| (max_width as f64 * d).round() as u32)
        .filter(|&w| w > 0 && w < original_width)
        .collect();
    widths.push(original_width);
    widths.sort_unstable();
    widths.dedup();
    widths
}

/// Renditions preserving the source aspect ratio
pub fn renditions(max_width: u32, original: (u32, u32)) -> Vec<Rendition> {
    let (orig_w, orig_h) = original;
    let aspect = orig_w as f64 / orig_h as f64;
    fluid_widths(max_width, orig_w)
        .into_iter()
        .map(|width| Rendition {
            width,
            height: ((width as f64 / aspect).round() as u32).max(1),
        })
        .collect()
}

/// `sizes` attribute for an image laid out at `presentation_width`
pub fn sizes_attr(presentation_width: u32) -> String {
    format!(
        "(max-width: {w}px) 100vw, {w}px",
        w = presentation_width
    )
}

/// `srcset` attribute from `(url, width)` pairs
pub fn src_set_attr<'a, I>(candidates: I) -> String
where
    I: IntoIterator<Item = (&'a str, u32)>,
{
    candidates
        .into_iter()
        .map(|(url, width)| format!("{} {}w", url, width))
        .collect::<Vec<_>>()
        .join(",\n")
}

/// Index of the rendition whose width is closest to `target`
pub fn closest_to(renditions: &[Rendition], target: u32) -> Option<usize> {
    renditions
        .iter()
        .enumerate()
        .min_by_key(|(_, r)| r.width.abs_diff(target))
        .map(|(i, _)| i)
}

/// Hex colour for a placeholder
pub fn hex_color([r, g, b]: [u8; 3]) -> String {
    format!("#{:02x}{:02x}{:02x}", r, g, b)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn widths_for_large_source() {
        assert_eq!(
            fluid_widths(250, 1000),
            vec![63, 125, 250, 375, 500, 750, 1000]
        );
    }

    #[test]
    fn widths_drop_candidates_beyond_source() {
        assert_eq!(fluid_widths(250, 300), vec![63, 125, 250, 300]);
    }

    #[test]
    fn widths_for_source_equal_to_a_candidate() {
        assert_eq!(fluid_widths(250, 250), vec![63, 125, 250]);
    }

    #[test]
    fn widths_for_tiny_source() {
        assert_eq!(fluid_widths(250, 40), vec![40]);
    }

    #[test]
    fn renditions_keep_aspect() {
        let r = renditions(250, (500, 250));
        assert_eq!(r.first(), Some(&Rendition { width: 63, height: 32 }));
        assert!(r.contains(&Rendition { width: 250, height: 125 }));
        assert_eq!(r.last(), Some(&Rendition { width: 500, height: 250 }));
    }

    #[test]
    fn sizes_attribute() {
        assert_eq!(sizes_attr(250), "(max-width: 250px) 100vw, 250px");
    }

    #[test]
    fn src_set_attribute() {
        let set = src_set_attr([("/a/63.jpg", 63), ("/a/125.jpg", 125)]);
        assert_eq!(set, "/a/63.jpg 63w,\n/a/125.jpg 125w");
    }

    #[test]
    fn closest_rendition() {
        let r = renditions(250, (1000, 500));
        assert_eq!(r[closest_to(&r, 250).unwrap()].width, 250);
        let small = renditions(250, (100, 100));
        assert_eq!(small[closest_to(&small, 250).unwrap()].width, 100);
    }

    #[test]
    fn placeholder_hex() {
        assert_eq!(hex_color([0x33, 0x66, 0x99]), "#336699");
    }
}
