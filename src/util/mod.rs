//! Utility functions for common operations.
//!
//! - **URL validation**: base URLs for the category API and image CDN
//! - **Text processing**: Unicode-aware width, truncation and control stripping
//! - **Images**: thumbnail resolution with an SVG placeholder fallback
//!
//! # Examples
//!
//! ```
//! use category_tree::util::{display_width, truncate_to_width, validate_base_url};
//!
//! let base = validate_base_url("https://api.shop.example").unwrap();
//! assert_eq!(base.host_str(), Some("api.shop.example"));
//!
//! assert_eq!(display_width("Giày 鞋"), 7);
//! assert_eq!(truncate_to_width("Accessories and Jewelry", 10), "Accesso...");
//! ```

mod image;
mod text;
mod url_validator;

pub use image::{placeholder_data_uri, placeholder_svg, ImageResolver, PlaceholderShape};
pub use text::{display_width, strip_control_chars, truncate_to_width};
pub use url_validator::{join_path, validate_base_url, UrlValidationError};

/// Maximum accepted length of a keyword typed into the search box.
pub const MAX_KEYWORD_LENGTH: usize = 256;
