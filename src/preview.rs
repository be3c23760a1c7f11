//! Local preview resources for the selected image.
//!
//! A preview is addressed by a [`PreviewUri`] handed out by a [`PreviewStore`].
//! URIs stay live until revoked; the store is how callers check that a replaced
//! selection did not leak its old preview.

use crate::model::ImageFile;
use std::collections::HashSet;
use std::fmt;

/// Thumbnail bounding box in pixels. Rendered two pixels per terminal cell
/// vertically, so this fills a 48x24 cell area.
pub const THUMBNAIL_WIDTH: u32 = 48;
pub const THUMBNAIL_HEIGHT: u32 = 48;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PreviewUri(String);

impl fmt::Display for PreviewUri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Downscaled RGB pixels, row-major.
#[derive(Debug, Clone, PartialEq)]
pub struct Thumbnail {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<[u8; 3]>,
}

impl Thumbnail {
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 3]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.pixels.get((y * self.width + x) as usize).copied()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Preview {
    pub uri: PreviewUri,
    /// Original pixel dimensions, when the image decodes.
    pub dimensions: Option<(u32, u32)>,
    pub thumbnail: Option<Thumbnail>,
}

/// Decode `bytes` and shrink them into the thumbnail bounding box.
pub fn render_thumbnail(bytes: &[u8]) -> Result<((u32, u32), Thumbnail), image::ImageError> {
    let img = image::load_from_memory(bytes)?;
    let dimensions = (img.width(), img.height());
    let small = img.thumbnail(THUMBNAIL_WIDTH, THUMBNAIL_HEIGHT).to_rgb8();
    let (width, height) = small.dimensions();
    let pixels = small.pixels().map(|p| p.0).collect();
    Ok((
        dimensions,
        Thumbnail {
            width,
            height,
            pixels,
        },
    ))
}

#[derive(Debug, Default)]
pub struct PreviewStore {
    next_id: u64,
    live: HashSet<PreviewUri>,
}

impl PreviewStore {
    #[cfg(test)]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a live preview for `file`. Undecodable images still get a URI,
    /// just no thumbnail.
    pub fn create(&mut self, file: &ImageFile) -> Preview {
        self.next_id += 1;
        let uri = PreviewUri(format!("preview://{}/{}", self.next_id, file.name()));

        let (dimensions, thumbnail) = match render_thumbnail(file.bytes()) {
            Ok((dims, thumb)) => (Some(dims), Some(thumb)),
            Err(e) => {
                tracing::debug!(file = file.name(), error = %e, "preview decode failed");
                (None, None)
            }
        };

        self.live.insert(uri.clone());
        Preview {
            uri,
            dimensions,
            thumbnail,
        }
    }

    /// Release a preview. Returns `false` if it was not live.
    pub fn revoke(&mut self, uri: &PreviewUri) -> bool {
        self.live.remove(uri)
    }

    #[cfg(test)]
    pub fn is_live(&self, uri: &PreviewUri) -> bool {
        self.live.contains(uri)
    }

    #[cfg(test)]
    pub fn live_count(&self) -> usize {
        self.live.len()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::model::MediaType;
    use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
    use std::io::Cursor;

    pub(crate) fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        let img = RgbImage::from_fn(width, height, |x, _| {
            if x < width / 2 {
                Rgb([255, 0, 0])
            } else {
                Rgb([0, 0, 255])
            }
        });
        let mut out = Cursor::new(Vec::new());
        DynamicImage::ImageRgb8(img)
            .write_to(&mut out, ImageFormat::Png)
            .unwrap();
        out.into_inner()
    }

    #[test]
    fn thumbnail_fits_bounding_box_and_keeps_aspect() {
        let (dims, thumb) = render_thumbnail(&png_bytes(200, 100)).unwrap();
        assert_eq!(dims, (200, 100));
        assert_eq!(thumb.width, THUMBNAIL_WIDTH);
        assert_eq!(thumb.height, THUMBNAIL_HEIGHT / 2);
        assert_eq!(thumb.pixels.len(), (thumb.width * thumb.height) as usize);
        let left = thumb.pixel(0, 0).unwrap();
        assert!(left[0] > 200 && left[2] < 50);
        assert_eq!(thumb.pixel(thumb.width, 0), None);
    }

    #[test]
    fn undecodable_image_still_gets_a_live_uri() {
        let mut store = PreviewStore::new();
        let file = ImageFile::from_bytes("broken.png", MediaType::Png, vec![0u8; 8]);
        let preview = store.create(&file);
        assert!(preview.thumbnail.is_none());
        assert!(store.is_live(&preview.uri));
        assert!(store.revoke(&preview.uri));
        assert!(!store.revoke(&preview.uri));
    }
}
