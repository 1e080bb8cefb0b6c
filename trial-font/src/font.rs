//! A font as a value: decoded character maps and names over the raw bytes
use std::path::Path;

use font_types::NameId;
use write_fonts::{
    read::{collections::IntSet, FontRef},
    types::GlyphId,
    FontBuilder,
};

use crate::{
    charmap::{CharacterMaps, GlyphOrder},
    names::{NameTable, Platform},
    subset::subset_font,
    Error,
};

/// A loaded font.
///
/// The `cmap` and `name` tables are held decoded; every other table stays
/// as raw bytes and is copied through unchanged on save. Edits return a new
/// value rather than mutating this one.
#[derive(Clone, Debug)]
pub struct FontObject {
    data: Vec<u8>,
    glyph_order: GlyphOrder,
    character_maps: CharacterMaps,
    names: NameTable,
}

impl FontObject {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, Error> {
        let path = path.as_ref();
        let data = std::fs::read(path).map_err(|e| Error::io(path, e))?;
        Self::from_bytes(data)
    }

    pub fn from_bytes(data: Vec<u8>) -> Result<Self, Error> {
        let font = FontRef::new(&data).map_err(Error::Read)?;
        let glyph_order = GlyphOrder::from_font(&font);
        let character_maps = CharacterMaps::from_font(&font, &glyph_order)?;
        let names = NameTable::from_font(&font)?;
        log::debug!(
            "Loaded font with {} glyphs, {} codepoints",
            glyph_order.len(),
            character_maps.codepoints().len()
        );
        Ok(FontObject {
            data,
            glyph_order,
            character_maps,
            names,
        })
    }

    pub fn glyph_order(&self) -> &GlyphOrder {
        &self.glyph_order
    }

    pub fn character_maps(&self) -> &CharacterMaps {
        &self.character_maps
    }

    pub fn with_character_maps(self, character_maps: CharacterMaps) -> Self {
        FontObject {
            character_maps,
            ..self
        }
    }

    pub fn names(&self) -> &NameTable {
        &self.names
    }

    pub fn with_names(self, names: NameTable) -> Self {
        FontObject { names, ..self }
    }

    pub fn name_record(&self, name_id: NameId, platform: Platform) -> Option<&str> {
        self.names.get(name_id, platform)
    }

    pub fn set_name_record(
        self,
        name_id: NameId,
        platform: Platform,
        value: impl Into<String>,
    ) -> Self {
        let mut names = self.names.clone();
        names.set(name_id, platform, value);
        self.with_names(names)
    }

    /// Keep only the outlines needed for `unicodes`.
    ///
    /// Mappings for other codepoints are removed from every character map.
    /// Glyph ids and names are unchanged.
    pub fn subset_to_codepoints(&self, unicodes: &IntSet<u32>) -> Result<Self, Error> {
        let font = FontRef::new(&self.data).map_err(Error::Read)?;
        let mapped: IntSet<GlyphId> = self
            .character_maps
            .iter()
            .flat_map(|map| {
                map.mappings.iter().filter(move |(code, _)| {
                    map.unicode(**code)
                        .is_some_and(|codepoint| unicodes.contains(codepoint))
                })
            })
            .filter_map(|(_, name)| self.glyph_order.glyph_id(name))
            .collect();
        let data = subset_font(&font, unicodes, &mapped)?;
        Ok(FontObject {
            data,
            glyph_order: self.glyph_order.clone(),
            character_maps: self.character_maps.retain_codepoints(unicodes),
            names: self.names.clone(),
        })
    }

    /// Compile the font, with the current character maps and names.
    pub fn to_bytes(&self) -> Result<Vec<u8>, Error> {
        let font = FontRef::new(&self.data).map_err(Error::Read)?;
        let cmap = self.character_maps.compile(&self.glyph_order)?;
        let name = self.names.compile();
        let mut builder = FontBuilder::new();
        builder.add_table(&cmap)?.add_table(&name)?;
        Ok(builder.copy_missing_tables(font).build())
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), Error> {
        let path = path.as_ref();
        let data = self.to_bytes()?;
        std::fs::write(path, data).map_err(|e| Error::io(path, e))
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use trial_font_test_data::TestFont;
    use write_fonts::read::TableProvider;

    use super::*;

    fn test_font() -> FontObject {
        FontObject::from_bytes(TestFont::default().build()).unwrap()
    }

    #[test]
    fn load_decodes_cmap_and_names() {
        let font = test_font();
        assert_eq!(font.character_maps().glyph_for(u32::from('á')), Some("aacute"));
        assert_eq!(font.glyph_order().name(GlyphId::new(4)), Some("X"));
        assert_eq!(
            font.name_record(NameId::POSTSCRIPT_NAME, Platform::WINDOWS),
            Some("Sans-Light")
        );
    }

    #[test]
    fn unchanged_font_round_trips() {
        let font = test_font();
        let reloaded = FontObject::from_bytes(font.to_bytes().unwrap()).unwrap();
        assert_eq!(reloaded.character_maps(), font.character_maps());
        assert_eq!(reloaded.names(), font.names());
        assert_eq!(reloaded.glyph_order(), font.glyph_order());
    }

    #[test]
    fn edits_return_new_values() {
        let font = test_font();
        let renamed = font
            .clone()
            .set_name_record(NameId::FAMILY_NAME, Platform::MACINTOSH, "Other");
        assert_eq!(
            font.name_record(NameId::FAMILY_NAME, Platform::MACINTOSH),
            Some("Sans Light")
        );
        let reloaded = FontObject::from_bytes(renamed.to_bytes().unwrap()).unwrap();
        assert_eq!(
            reloaded.name_record(NameId::FAMILY_NAME, Platform::MACINTOSH),
            Some("Other")
        );
    }

    #[test]
    fn subset_drops_other_mappings() {
        let font = test_font();
        let keep: IntSet<u32> = ['A', 'X'].into_iter().map(u32::from).collect();
        let subset = font.subset_to_codepoints(&keep).unwrap();
        assert_eq!(subset.character_maps().codepoints(), keep);

        let bytes = subset.to_bytes().unwrap();
        let compiled = FontRef::new(&bytes).unwrap();
        let cmap = compiled.cmap().unwrap();
        assert_eq!(cmap.map_codepoint('A'), Some(GlyphId::new(2)));
        assert_eq!(cmap.map_codepoint('a'), None);
    }

    #[test]
    fn output_is_deterministic() {
        let font = test_font();
        assert_eq!(font.to_bytes().unwrap(), font.to_bytes().unwrap());
    }
}
