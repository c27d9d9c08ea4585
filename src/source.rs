//! Fixed catalog of selectable input sources.
//!
//! Consumers select a source by position, so the order of this table is part of
//! the public contract and must never change.

/// Known source input uris, in selector order
pub const SOURCE_URIS: [&str; 13] = [
    "extInput:source",
    "extInput:bd-dvd",
    "extInput:btAudio",
    "extInput:game",
    "extInput:hdmi",
    "extInput:line",
    "extInput:sacd-cd",
    "extInput:sat-catv",
    "extInput:tv",
    "extInput:video",
    "dlna:music",
    "storage:usb1",
    "radio:fm",
];

/// Position of a source uri in the catalog
pub fn source_index(uri: &str) -> Option<usize> {
    SOURCE_URIS.iter().position(|known| *known == uri)
}

/// Source uri at a catalog position
pub fn source_uri(index: usize) -> Option<&'static str> {
    SOURCE_URIS.get(index).copied()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_positions_are_stable() {
        assert_eq!(source_index("extInput:source"), Some(0));
        assert_eq!(source_index(SOURCE_URIS[2]), Some(2));
        assert_eq!(source_index("extInput:game"), Some(3));
        assert_eq!(source_index("radio:fm"), Some(12));
    }

    #[test]
    fn unknown_uri_has_no_index() {
        assert_eq!(source_index("extInput:hdmi?port=2"), None);
        assert_eq!(source_index(""), None);
    }

    #[test]
    fn every_entry_round_trips() {
        for (index, uri) in SOURCE_URIS.iter().enumerate() {
            assert_eq!(source_uri(index), Some(*uri));
            assert_eq!(source_index(uri), Some(index));
        }
        assert_eq!(source_uri(SOURCE_URIS.len()), None);
    }
}
