//! Image filename generation.
//!
//! Uploaded images are stored under generated names so two uploads can
//! never collide and user-supplied names never reach the filesystem.

use uuid::Uuid;

/// Extension given to every stored image, regardless of the upload's format.
pub const IMAGE_EXTENSION: &str = "png";

/// Generate a fresh image filename.
///
/// Convention: `{uuid_v7_hex}.png`, where the UUID carries a millisecond
/// timestamp followed by random bits. Names therefore sort roughly by upload
/// time and collisions are negligible.
pub fn generate_image_filename() -> String {
    format!("{}.{IMAGE_EXTENSION}", Uuid::now_v7().simple())
}

/// Whether `name` is a bare filename that is safe to join onto the image
/// directory (no separators, no parent references, not hidden).
pub fn is_safe_image_filename(name: &str) -> bool {
    !name.is_empty()
        && !name.starts_with('.')
        && !name.contains(['/', '\\', '\0'])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_name_has_png_extension() {
        let name = generate_image_filename();
        assert!(name.ends_with(".png"));
        assert_eq!(name.len(), 32 + 4);
    }

    #[test]
    fn generated_names_are_unique() {
        let names: std::collections::HashSet<String> =
            (0..1000).map(|_| generate_image_filename()).collect();
        assert_eq!(names.len(), 1000);
    }

    #[test]
    fn generated_names_are_safe() {
        assert!(is_safe_image_filename(&generate_image_filename()));
    }

    #[test]
    fn unsafe_names_rejected() {
        assert!(!is_safe_image_filename(""));
        assert!(!is_safe_image_filename("../etc/passwd"));
        assert!(!is_safe_image_filename("a/b.png"));
        assert!(!is_safe_image_filename("a\\b.png"));
        assert!(!is_safe_image_filename(".hidden"));
        assert!(!is_safe_image_filename(".."));
    }
}
