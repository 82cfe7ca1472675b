//! Path and literal helpers shared by the indexers and reference resolvers.

/// Canonical path of the module (bundle) that owns a document.
///
/// Everything from the first `marker` segment on is cut away, so
/// `/p/src/Acme/DemoBundle/Resources/config/services.yml` becomes
/// `/p/src/Acme/DemoBundle` for the default `/Resources/` marker.
/// Paths without the marker are returned unchanged.
pub fn module_root<'a>(document_path: &'a str, marker: &str) -> &'a str {
    match document_path.find(marker) {
        Some(idx) => &document_path[..idx],
        None => document_path,
    }
}

/// Whether a canonical path points into third-party code.
pub fn is_vendored(path: &str, vendor_marker: &str) -> bool {
    path.contains(vendor_marker)
}

/// Remove one pair of matching quotes around a literal.
///
/// `"'stepName'"` → `stepName`. Unbalanced quotes are left alone.
pub fn strip_quotes(text: &str) -> &str {
    let text = text.trim();
    let bytes = text.as_bytes();
    if bytes.len() >= 2 {
        let (first, last) = (bytes[0], bytes[bytes.len() - 1]);
        if first == last && (first == b'"' || first == b'\'') {
            return &text[1..text.len() - 1];
        }
    }
    text
}

/// Namespace of a fully-qualified class name, without leading separator.
///
/// `Acme\DemoBundle\Entity\Post` → `Acme\DemoBundle\Entity`.
pub fn namespace_of(fqn: &str) -> &str {
    let fqn = fqn.trim_start_matches('\\');
    match fqn.rfind('\\') {
        Some(idx) => &fqn[..idx],
        None => "",
    }
}

/// Simple (unqualified) part of a class reference.
///
/// Handles both namespace separators and the `Shortcut:Name` notation.
pub fn simple_name(reference: &str) -> &str {
    let after_colon = match reference.rfind(':') {
        Some(idx) => &reference[idx + 1..],
        None => reference,
    };
    match after_colon.rfind('\\') {
        Some(idx) => &after_colon[idx + 1..],
        None => after_colon,
    }
}
