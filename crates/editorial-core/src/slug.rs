//! Slug derivation.
//!
//! A slug is the slugified title plus a random lowercase alphanumeric
//! suffix, e.g. `budget-debate-k3x9qa`.

use rand::Rng;

const FALLBACK: &str = "article";
const SUFFIX_CHARSET: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";

/// Lower-case `text` and join its alphanumeric runs with `-`.
///
/// # Examples
///
/// ```
/// use editorial_core::slug::slugify;
///
/// assert_eq!(slugify("  Hello, World! "), "hello-world");
/// assert_eq!(slugify("Über  Straße 2024"), "über-straße-2024");
/// assert_eq!(slugify("!!!"), "");
/// ```
pub fn slugify(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    let mut pending_dash = false;

    for c in text.chars() {
        if c.is_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.extend(c.to_lowercase());
        } else {
            pending_dash = true;
        }
    }

    slug
}

/// Random lowercase alphanumeric string of `len` characters.
pub fn random_suffix(len: usize) -> String {
    let mut rng = rand::thread_rng();
    (0..len)
        .map(|_| SUFFIX_CHARSET[rng.gen_range(0..SUFFIX_CHARSET.len())] as char)
        .collect()
}

/// Derive a slug from a title: `slugify(title) + "-" + suffix`.
///
/// A title with nothing alphanumeric in it falls back to `article`.
pub fn derive(title: &str, suffix_len: usize) -> String {
    let base = slugify(title);
    let base = if base.is_empty() { FALLBACK } else { base.as_str() };
    format!("{}-{}", base, random_suffix(suffix_len))
}
