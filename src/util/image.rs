//! Thumbnail reference to displayable URL, with a generated SVG placeholder
//! when there is nothing to show.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use url::Url;

use super::url_validator::{join_path, validate_base_url, UrlValidationError};

const PLACEHOLDER_FILL: &str = "#e5e7eb";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlaceholderShape {
    Circle,
    #[default]
    Rect,
}

/// Minimal square SVG of `size` pixels (at least 1).
pub fn placeholder_svg(size: u32, shape: PlaceholderShape) -> String {
    let size = size.max(1);
    let half = f64::from(size) / 2.0;
    let body = match shape {
        PlaceholderShape::Circle => {
            format!(r#"<circle cx="{half}" cy="{half}" r="{half}" fill="{PLACEHOLDER_FILL}"/>"#)
        }
        PlaceholderShape::Rect => {
            format!(r#"<rect width="{size}" height="{size}" fill="{PLACEHOLDER_FILL}"/>"#)
        }
    };
    format!(
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{size}" height="{size}" viewBox="0 0 {size} {size}">{body}</svg>"#
    )
}

/// [`placeholder_svg`] as a base64 `data:` URI usable directly as an image source.
pub fn placeholder_data_uri(size: u32, shape: PlaceholderShape) -> String {
    format!(
        "data:image/svg+xml;base64,{}",
        STANDARD.encode(placeholder_svg(size, shape))
    )
}

/// Maps `thumbnail_ref` values to URLs.
///
/// Full URLs pass through untouched. Bare public ids become CDN transform
/// URLs sized to the request when a CDN base is configured. Anything else
/// resolves to the placeholder.
#[derive(Debug, Clone, Default)]
pub struct ImageResolver {
    cdn_base: Option<Url>,
    shape: PlaceholderShape,
}

impl ImageResolver {
    pub fn new(cdn_base: Option<&str>) -> Result<Self, UrlValidationError> {
        let cdn_base = cdn_base.map(validate_base_url).transpose()?;
        Ok(Self {
            cdn_base,
            shape: PlaceholderShape::default(),
        })
    }

    pub fn with_shape(mut self, shape: PlaceholderShape) -> Self {
        self.shape = shape;
        self
    }

    pub fn resolve(&self, thumbnail_ref: Option<&str>, size: u32) -> String {
        let Some(raw) = thumbnail_ref.map(str::trim).filter(|r| !r.is_empty()) else {
            return self.fallback(size);
        };

        if is_absolute_ref(raw) {
            return raw.to_owned();
        }

        match &self.cdn_base {
            Some(base) => {
                let size = size.max(1);
                join_path(
                    base,
                    &format!("image/upload/c_fill,w_{size},h_{size}/{}", raw.trim_start_matches('/')),
                )
            }
            None => {
                tracing::debug!(thumbnail_ref = %raw, "No image CDN configured, using placeholder");
                self.fallback(size)
            }
        }
    }

    /// URL to show when an image is missing or failed to load.
    pub fn fallback(&self, size: u32) -> String {
        placeholder_data_uri(size, self.shape)
    }
}

fn is_absolute_ref(raw: &str) -> bool {
    let lower = raw.to_ascii_lowercase();
    lower.starts_with("https://") || lower.starts_with("http://") || lower.starts_with("data:")
}
