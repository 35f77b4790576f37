//! Pet names live in the material bytes of the pet item's attributes, one
//! character per attribute.

use crate::character::Attribute;

const UNREPRESENTABLE: u8 = b'?';

/// Writes one character per attribute. Attributes past the end of `name` keep
/// whatever they held, so shortening a name leaves the old tail in place.
pub fn pack(name: &str, attributes: &mut [Attribute]) {
    for (attribute, ch) in attributes.iter_mut().zip(name.chars()) {
        attribute.material = u8::try_from(u32::from(ch)).unwrap_or(UNREPRESENTABLE);
    }
}

/// Reads every attribute's material byte. The result always has one character
/// per attribute; zero bytes are kept.
pub fn unpack(attributes: &[Attribute]) -> String {
    attributes
        .iter()
        .map(|attribute| char::from(attribute.material))
        .collect()
}

/// The unpacked name up to its first NUL, for display.
pub fn display_name(unpacked: &str) -> &str {
    unpacked.split('\0').next().unwrap_or_default()
}
