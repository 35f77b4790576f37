//! Conversion between raw record indices and dense list positions.
//!
//! Name tables contain empty labels for values the record format never
//! assigns. A presentation list only shows the non-empty labels, so a raw
//! value and its position in that list differ once a hole has been passed.

/// Position of `raw` among the non-empty labels, or `None` when `raw` is out
/// of range or names an empty label.
pub fn normalize(raw: usize, labels: &[&str]) -> Option<usize> {
    let label = labels.get(raw)?;
    if label.is_empty() {
        return None;
    }
    Some(labels[..raw].iter().filter(|l| !l.is_empty()).count())
}

/// Raw index of the `dense`-th non-empty label.
pub fn denormalize(dense: usize, labels: &[&str]) -> Option<usize> {
    labels
        .iter()
        .enumerate()
        .filter(|(_, l)| !l.is_empty())
        .nth(dense)
        .map(|(raw, _)| raw)
}

/// Non-empty labels in raw order, as a presentation list shows them.
pub fn dense_labels<'a>(labels: &[&'a str]) -> Vec<&'a str> {
    labels.iter().copied().filter(|l| !l.is_empty()).collect()
}

pub fn dense_len(labels: &[&str]) -> usize {
    labels.iter().filter(|l| !l.is_empty()).count()
}

pub fn normalize_byte(raw: u8, labels: &[&str]) -> Option<usize> {
    normalize(usize::from(raw), labels)
}

pub fn denormalize_byte(dense: usize, labels: &[&str]) -> Option<u8> {
    denormalize(dense, labels).and_then(|raw| u8::try_from(raw).ok())
}

/// Dense index of the label equal to `name`, ignoring ASCII case.
pub fn find_dense(name: &str, labels: &[&str]) -> Option<usize> {
    dense_labels(labels)
        .iter()
        .position(|l| l.eq_ignore_ascii_case(name))
}
