//! Character maps keyed by glyph name, and remapping hidden codepoints
//!
//! Every codepoint-to-glyph subtable of the `cmap` table is decoded into a
//! [`CharacterMap`], a plain mapping from codepoint to glyph name. Glyph
//! names come from a [`GlyphOrder`], so the maps can be edited without
//! caring about glyph ids and compiled back once the edits are done.
//!
//! Keys are whatever the subtable's encoding uses. Only Unicode subtables
//! contribute to a font's codepoints; Mac Roman keys are decoded to Unicode
//! when deciding what to hide or keep.

use std::collections::{BTreeMap, HashMap};

use font_types::BigEndian;
use skrifa::GlyphNames;
use write_fonts::{
    from_obj::FromTableRef,
    read::{
        collections::IntSet,
        tables::{
            cmap::{Cmap as ReadCmap, CmapSubtable as ReadSubtable},
            name::MacRomanMapping,
        },
        FontRef, TableProvider, TopLevelTable,
    },
    tables::cmap::{
        Cmap, CmapSubtable, ConstantMapGroup, EncodingRecord, PlatformId, SequentialMapGroup,
    },
    types::GlyphId,
};

use crate::Error;

const WINDOWS_SYMBOL_ENCODING: u16 = 0;
const WINDOWS_BMP_ENCODING: u16 = 1;
const WINDOWS_FULL_REPERTOIRE_ENCODING: u16 = 10;
const UNICODE_FULL_ENCODING: u16 = 6;
const UNICODE_FULL_REPERTOIRE_ENCODING: u16 = 4;
const UNICODE_BMP_ENCODING: u16 = 3;
const MACINTOSH_ROMAN_ENCODING: u16 = 0;

/// The glyph order of a font: a unique name for every glyph id.
///
/// Names are taken from `post` or `CFF `, or synthesized. Duplicated names
/// get a `#1`, `#2`... suffix so that every name maps back to exactly one
/// glyph.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct GlyphOrder {
    names: Vec<String>,
    ids: HashMap<String, GlyphId>,
}

impl GlyphOrder {
    pub fn new(names: impl IntoIterator<Item = String>) -> Self {
        let mut order = GlyphOrder::default();
        for name in names {
            let mut unique = name.clone();
            let mut n = 0;
            while order.ids.contains_key(&unique) {
                n += 1;
                unique = format!("{name}#{n}");
            }
            order
                .ids
                .insert(unique.clone(), GlyphId::new(order.names.len() as u32));
            order.names.push(unique);
        }
        order
    }

    pub fn from_font(font: &FontRef) -> Self {
        let glyph_names = GlyphNames::new(font);
        let num_glyphs = font
            .maxp()
            .map(|maxp| maxp.num_glyphs() as u32)
            .unwrap_or_else(|_| glyph_names.num_glyphs());
        GlyphOrder::new((0..num_glyphs).map(|gid| {
            let gid = GlyphId::new(gid);
            glyph_names
                .get(gid)
                .map(|name| name.to_string())
                .unwrap_or_else(|| format!("gid{}", gid.to_u32()))
        }))
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn name(&self, gid: GlyphId) -> Option<&str> {
        self.names.get(gid.to_u32() as usize).map(String::as_str)
    }

    pub fn glyph_id(&self, name: &str) -> Option<GlyphId> {
        self.ids.get(name).copied()
    }

    fn require(&self, name: &str) -> Result<GlyphId, Error> {
        self.glyph_id(name)
            .ok_or_else(|| Error::UnknownGlyph(name.to_owned()))
    }
}

/// A single codepoint-to-glyph subtable.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CharacterMap {
    pub platform_id: PlatformId,
    pub encoding_id: u16,
    pub language: u32,
    /// The subtable format this map is compiled back into.
    pub format: u16,
    pub mappings: BTreeMap<u32, String>,
}

impl CharacterMap {
    /// Whether the keys of this map are Unicode codepoints.
    pub fn is_unicode(&self) -> bool {
        match self.platform_id {
            PlatformId::Unicode => true,
            PlatformId::Windows => matches!(
                self.encoding_id,
                WINDOWS_SYMBOL_ENCODING | WINDOWS_BMP_ENCODING | WINDOWS_FULL_REPERTOIRE_ENCODING
            ),
            _ => false,
        }
    }

    /// The Unicode codepoint a key of this map stands for, if known.
    pub fn unicode(&self, code: u32) -> Option<u32> {
        if self.is_unicode() {
            return Some(code);
        }
        if self.is(PlatformId::Macintosh, MACINTOSH_ROMAN_ENCODING) {
            return u8::try_from(code)
                .ok()
                .map(|byte| u32::from(MacRomanMapping.decode(byte)));
        }
        None
    }

    /// Point every hidden codepoint present in this map at `replacer_glyph`.
    ///
    /// Hidden codepoints the map does not contain are left alone, so the
    /// set of keys never changes. Keys with no known Unicode meaning are
    /// hidden too.
    pub fn remap(&mut self, hide: &IntSet<u32>, replacer_glyph: &str) {
        let mappings = std::mem::take(&mut self.mappings);
        self.mappings = mappings
            .into_iter()
            .map(|(code, glyph)| match self.unicode(code) {
                Some(codepoint) if !hide.contains(codepoint) => (code, glyph),
                _ => (code, replacer_glyph.to_owned()),
            })
            .collect();
    }

    /// Drop mappings whose Unicode codepoint is not in `unicodes`.
    ///
    /// Keys with no known Unicode meaning are dropped.
    pub fn retain(&mut self, unicodes: &IntSet<u32>) {
        let mappings = std::mem::take(&mut self.mappings);
        self.mappings = mappings
            .into_iter()
            .filter(|(code, _)| {
                self.unicode(*code)
                    .is_some_and(|codepoint| unicodes.contains(codepoint))
            })
            .collect();
    }

    fn is(&self, platform_id: PlatformId, encoding_id: u16) -> bool {
        self.platform_id == platform_id && self.encoding_id == encoding_id
    }

    fn compile(&self, glyphs: &GlyphOrder) -> Result<CmapSubtable, Error> {
        let mut entries = Vec::with_capacity(self.mappings.len());
        for (codepoint, name) in &self.mappings {
            entries.push((*codepoint, glyphs.require(name)?));
        }
        Ok(match self.format {
            0 => self.compile_format_0(&entries),
            4 => self.compile_format_4(&entries)?,
            6 => self.compile_format_6(&entries),
            10 => self.compile_format_10(&entries),
            13 => self.compile_format_13(&entries),
            _ => self.compile_format_12(&entries),
        })
    }

    fn compile_format_0(&self, entries: &[(u32, GlyphId)]) -> CmapSubtable {
        let mut glyph_ids = vec![0u8; 256];
        for (codepoint, gid) in entries {
            let Some(slot) = glyph_ids.get_mut(*codepoint as usize) else {
                continue;
            };
            match u8::try_from(gid.to_u32()) {
                Ok(gid) => *slot = gid,
                Err(_) => log::warn!(
                    "Glyph {gid} cannot be stored in a format 0 subtable, U+{codepoint:04X} is unmapped"
                ),
            }
        }
        CmapSubtable::format_0(self.language as u16, glyph_ids)
    }

    fn compile_format_4(&self, entries: &[(u32, GlyphId)]) -> Result<CmapSubtable, Error> {
        let chars = entries.iter().filter_map(|(codepoint, gid)| {
            match char::from_u32(*codepoint).filter(|c| u32::from(*c) <= 0xFFFF) {
                Some(c) => Some((c, *gid)),
                None => {
                    log::warn!("U+{codepoint:04X} cannot be stored in a format 4 subtable");
                    None
                }
            }
        });
        let cmap = Cmap::from_mappings(chars).map_err(Error::compile(Cmap::TAG))?;
        let mut subtable = cmap
            .encoding_records
            .into_iter()
            .find(|record| {
                record.platform_id == PlatformId::Windows
                    && record.encoding_id == WINDOWS_BMP_ENCODING
            })
            .map(|record| (*record.subtable).clone())
            .unwrap_or_else(|| {
                CmapSubtable::format_4(0, vec![0xFFFF], vec![0xFFFF], vec![1], vec![0], vec![])
            });
        if let CmapSubtable::Format4(format4) = &mut subtable {
            format4.language = self.language as u16;
        }
        Ok(subtable)
    }

    fn compile_format_6(&self, entries: &[(u32, GlyphId)]) -> CmapSubtable {
        let entries: Vec<_> = entries
            .iter()
            .filter(|(codepoint, _)| *codepoint <= 0xFFFF)
            .copied()
            .collect();
        let (first_code, glyph_ids) = dense_glyph_array(&entries);
        CmapSubtable::format_6(
            (10 + 2 * glyph_ids.len()) as u16,
            self.language as u16,
            first_code as u16,
            glyph_ids.len() as u16,
            glyph_ids,
        )
    }

    fn compile_format_10(&self, entries: &[(u32, GlyphId)]) -> CmapSubtable {
        let (start_char_code, glyph_ids) = dense_glyph_array(entries);
        CmapSubtable::format_10(
            (20 + 2 * glyph_ids.len()) as u32,
            self.language,
            start_char_code,
            glyph_ids,
        )
    }

    fn compile_format_12(&self, entries: &[(u32, GlyphId)]) -> CmapSubtable {
        let mut groups: Vec<SequentialMapGroup> = Vec::new();
        for (codepoint, gid) in entries {
            let gid = gid.to_u32();
            match groups.last_mut() {
                Some(group)
                    if group.end_char_code + 1 == *codepoint
                        && group.start_glyph_id + (group.end_char_code - group.start_char_code)
                            + 1
                            == gid =>
                {
                    group.end_char_code = *codepoint;
                }
                _ => groups.push(SequentialMapGroup::new(*codepoint, *codepoint, gid)),
            }
        }
        CmapSubtable::format_12(self.language, groups)
    }

    fn compile_format_13(&self, entries: &[(u32, GlyphId)]) -> CmapSubtable {
        let mut groups: Vec<ConstantMapGroup> = Vec::new();
        for (codepoint, gid) in entries {
            let gid = gid.to_u32();
            match groups.last_mut() {
                Some(group) if group.end_char_code + 1 == *codepoint && group.glyph_id == gid => {
                    group.end_char_code = *codepoint;
                }
                _ => groups.push(ConstantMapGroup::new(*codepoint, *codepoint, gid)),
            }
        }
        CmapSubtable::format_13(
            (16 + 12 * groups.len()) as u32,
            self.language,
            groups.len() as u32,
            groups,
        )
    }
}

/// A contiguous glyph id array starting at the first mapped codepoint.
///
/// Gaps between mapped codepoints are filled with glyph 0.
fn dense_glyph_array(entries: &[(u32, GlyphId)]) -> (u32, Vec<u16>) {
    let Some(first) = entries.first().map(|(codepoint, _)| *codepoint) else {
        return (0, Vec::new());
    };
    let mut glyph_ids = Vec::new();
    for (codepoint, gid) in entries {
        let index = (codepoint - first) as usize;
        glyph_ids.resize(index, 0);
        glyph_ids.push(gid.to_u32() as u16);
    }
    (first, glyph_ids)
}

/// One encoding record of the `cmap` table.
#[derive(Clone, Debug, PartialEq)]
pub enum CmapRecord {
    /// A codepoint-to-glyph subtable.
    Mapped(CharacterMap),
    /// A variation sequence subtable, carried through unchanged.
    Variations {
        platform_id: PlatformId,
        encoding_id: u16,
        subtable: CmapSubtable,
    },
}

/// All subtables of a font's `cmap` table, in encoding record order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CharacterMaps {
    records: Vec<CmapRecord>,
}

impl CharacterMaps {
    pub fn new(records: Vec<CmapRecord>) -> Self {
        CharacterMaps { records }
    }

    /// Decode the `cmap` table of `font`, naming glyphs with `glyphs`.
    ///
    /// Format 2 and format 8 subtables are dropped with a warning.
    pub fn from_font(font: &FontRef, glyphs: &GlyphOrder) -> Result<Self, Error> {
        let cmap = font.cmap().map_err(Error::read_table(ReadCmap::TAG))?;
        Self::from_table(&cmap, glyphs)
    }

    fn from_table(cmap: &ReadCmap, glyphs: &GlyphOrder) -> Result<Self, Error> {
        let mut records = Vec::new();
        for record in cmap.encoding_records() {
            let platform_id = record.platform_id();
            let encoding_id = record.encoding_id();
            let subtable = record
                .subtable(cmap.offset_data())
                .map_err(Error::read_table(ReadCmap::TAG))?;
            let language = subtable.language();
            let (format, pairs): (u16, Vec<(u32, GlyphId)>) = match &subtable {
                ReadSubtable::Format0(table) => (
                    0,
                    table
                        .glyph_id_array()
                        .iter()
                        .enumerate()
                        .map(|(codepoint, gid)| (codepoint as u32, GlyphId::new(*gid as u32)))
                        .collect(),
                ),
                ReadSubtable::Format4(table) => (4, table.iter().collect()),
                ReadSubtable::Format6(table) => (
                    6,
                    dense_pairs(table.first_code() as u32, table.glyph_id_array()),
                ),
                ReadSubtable::Format10(table) => (
                    10,
                    dense_pairs(table.start_char_code(), table.glyph_id_array()),
                ),
                ReadSubtable::Format12(table) => (12, table.iter().collect()),
                ReadSubtable::Format13(table) => (13, table.iter().collect()),
                ReadSubtable::Format14(_) => {
                    records.push(CmapRecord::Variations {
                        platform_id,
                        encoding_id,
                        subtable: CmapSubtable::from_table_ref(&subtable),
                    });
                    continue;
                }
                ReadSubtable::Format2(_) | ReadSubtable::Format8(_) => {
                    log::warn!(
                        "Dropping unsupported cmap subtable ({platform_id:?}, {encoding_id})"
                    );
                    continue;
                }
            };

            let mut mappings = BTreeMap::new();
            for (codepoint, gid) in pairs {
                // glyph 0 is how subtables spell "unmapped"
                if gid == GlyphId::NOTDEF {
                    continue;
                }
                match glyphs.name(gid) {
                    Some(name) => {
                        mappings.insert(codepoint, name.to_owned());
                    }
                    None => log::warn!(
                        "U+{codepoint:04X} maps to glyph {gid} which is not in the font, ignoring"
                    ),
                }
            }
            records.push(CmapRecord::Mapped(CharacterMap {
                platform_id,
                encoding_id,
                language,
                format,
                mappings,
            }));
        }
        Ok(CharacterMaps { records })
    }

    pub fn records(&self) -> &[CmapRecord] {
        &self.records
    }

    /// The codepoint-to-glyph subtables.
    pub fn iter(&self) -> impl Iterator<Item = &CharacterMap> + '_ {
        self.records.iter().filter_map(|record| match record {
            CmapRecord::Mapped(map) => Some(map),
            CmapRecord::Variations { .. } => None,
        })
    }

    fn unicode_maps(&self) -> impl Iterator<Item = &CharacterMap> + '_ {
        self.iter().filter(|map| map.is_unicode())
    }

    /// Every codepoint mapped by any Unicode subtable.
    pub fn codepoints(&self) -> IntSet<u32> {
        self.unicode_maps()
            .flat_map(|map| map.mappings.keys().copied())
            .collect()
    }

    /// For every mapped glyph name, the codepoints that reach it in any
    /// Unicode subtable.
    pub fn reverse_lookup(&self) -> BTreeMap<String, IntSet<u32>> {
        let mut reversed: BTreeMap<String, IntSet<u32>> = BTreeMap::new();
        for (codepoint, name) in self.unicode_maps().flat_map(|map| map.mappings.iter()) {
            reversed.entry(name.clone()).or_default().insert(*codepoint);
        }
        reversed
    }

    /// The most comprehensive Unicode subtable.
    ///
    /// Symbol subtables are preferred, then full repertoire ones, then BMP
    /// ones, then any other Unicode subtable.
    pub fn best(&self) -> Option<&CharacterMap> {
        let find = |platform_id, encoding_id| self.iter().find(|map| map.is(platform_id, encoding_id));
        find(PlatformId::Windows, WINDOWS_SYMBOL_ENCODING)
            .or_else(|| find(PlatformId::Windows, WINDOWS_FULL_REPERTOIRE_ENCODING))
            .or_else(|| find(PlatformId::Unicode, UNICODE_FULL_ENCODING))
            .or_else(|| find(PlatformId::Unicode, UNICODE_FULL_REPERTOIRE_ENCODING))
            .or_else(|| find(PlatformId::Windows, WINDOWS_BMP_ENCODING))
            .or_else(|| find(PlatformId::Unicode, UNICODE_BMP_ENCODING))
            .or_else(|| self.unicode_maps().next())
    }

    /// The glyph `codepoint` maps to, checking the best subtable first.
    pub fn glyph_for(&self, codepoint: u32) -> Option<&str> {
        self.best()
            .and_then(|map| map.mappings.get(&codepoint))
            .or_else(|| {
                self.unicode_maps()
                    .find_map(|map| map.mappings.get(&codepoint))
            })
            .map(String::as_str)
    }

    /// Return a copy with every hidden codepoint pointing at `replacer_glyph`
    /// in every subtable.
    ///
    /// Mac Roman keys are judged by the character they encode.
    pub fn remap(&self, hide: &IntSet<u32>, replacer_glyph: &str) -> CharacterMaps {
        let mut remapped = self.clone();
        for record in remapped.records.iter_mut() {
            if let CmapRecord::Mapped(map) = record {
                map.remap(hide, replacer_glyph);
            }
        }
        remapped
    }

    /// Return a copy without mappings for codepoints outside `unicodes`.
    ///
    /// Mac Roman keys are judged by the character they encode.
    pub fn retain_codepoints(&self, unicodes: &IntSet<u32>) -> CharacterMaps {
        let mut retained = self.clone();
        for record in retained.records.iter_mut() {
            if let CmapRecord::Mapped(map) = record {
                map.retain(unicodes);
            }
        }
        retained
    }

    /// Build the `cmap` table.
    pub fn compile(&self, glyphs: &GlyphOrder) -> Result<Cmap, Error> {
        let mut encoding_records = Vec::with_capacity(self.records.len());
        for record in &self.records {
            encoding_records.push(match record {
                CmapRecord::Mapped(map) => {
                    EncodingRecord::new(map.platform_id, map.encoding_id, map.compile(glyphs)?)
                }
                CmapRecord::Variations {
                    platform_id,
                    encoding_id,
                    subtable,
                } => EncodingRecord::new(*platform_id, *encoding_id, subtable.clone()),
            });
        }
        Ok(Cmap::new(encoding_records))
    }
}

fn dense_pairs(first: u32, glyph_ids: &[BigEndian<u16>]) -> Vec<(u32, GlyphId)> {
    glyph_ids
        .iter()
        .enumerate()
        .map(|(i, gid)| (first + i as u32, GlyphId::new(gid.get() as u32)))
        .collect()
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use write_fonts::{
        dump_table,
        read::{FontData, FontRead},
    };

    use super::*;

    fn glyph_order() -> GlyphOrder {
        GlyphOrder::new([".notdef", "A", "B", "X", "a", "b", "eacute", "smile"].map(String::from))
    }

    fn map(format: u16, entries: &[(u32, &str)]) -> CharacterMap {
        CharacterMap {
            platform_id: PlatformId::Windows,
            encoding_id: if format == 12 { 10 } else { 1 },
            language: 0,
            format,
            mappings: entries.iter().map(|(cp, name)| (*cp, name.to_string())).collect(),
        }
    }

    fn round_trip(maps: &CharacterMaps, glyphs: &GlyphOrder) -> CharacterMaps {
        let bytes = dump_table(&maps.compile(glyphs).unwrap()).unwrap();
        let cmap = ReadCmap::read(FontData::new(&bytes)).unwrap();
        CharacterMaps::from_table(&cmap, glyphs).unwrap()
    }

    #[test]
    fn duplicate_glyph_names_are_made_unique() {
        let order = GlyphOrder::new(["a", "b", "a", "a"].map(String::from));
        assert_eq!(order.name(GlyphId::new(2)), Some("a#1"));
        assert_eq!(order.name(GlyphId::new(3)), Some("a#2"));
        assert_eq!(order.glyph_id("a"), Some(GlyphId::new(0)));
        assert_eq!(order.glyph_id("a#2"), Some(GlyphId::new(3)));
        assert_eq!(order.len(), 4);
    }

    #[test]
    fn remap_only_touches_present_keys() {
        let mut cmap = map(4, &[(0x41, "A"), (0x61, "a"), (0x62, "b")]);
        let hide: IntSet<u32> = [0x61, 0x62, 0xE9].into_iter().collect();
        cmap.remap(&hide, "X");
        assert_eq!(
            cmap.mappings,
            BTreeMap::from([
                (0x41, "A".to_string()),
                (0x61, "X".to_string()),
                (0x62, "X".to_string())
            ])
        );
    }

    #[test]
    fn remap_is_idempotent() {
        let maps = CharacterMaps::new(vec![
            CmapRecord::Mapped(map(4, &[(0x41, "A"), (0x61, "a"), (0xE9, "eacute")])),
            CmapRecord::Mapped(map(12, &[(0x41, "A"), (0x61, "a"), (0x1F600, "smile")])),
        ]);
        let hide: IntSet<u32> = [0x61, 0xE9, 0x1F600].into_iter().collect();
        let once = maps.remap(&hide, "X");
        let twice = once.remap(&hide, "X");
        assert_eq!(once, twice);
        for cmap in once.iter() {
            for (codepoint, name) in &cmap.mappings {
                if hide.contains(*codepoint) {
                    assert_eq!(name, "X");
                } else {
                    assert_eq!(name, "A");
                }
            }
        }
        // the input is untouched
        assert_ne!(maps, once);
    }

    #[test]
    fn codepoints_and_reverse_lookup_cover_all_subtables() {
        let maps = CharacterMaps::new(vec![
            CmapRecord::Mapped(map(4, &[(0x41, "A"), (0x61, "a")])),
            CmapRecord::Mapped(map(12, &[(0x41, "A"), (0x1F600, "smile"), (0xFF21, "A")])),
        ]);
        let codepoints: Vec<_> = maps.codepoints().iter().collect();
        assert_eq!(codepoints, vec![0x41, 0x61, 0xFF21, 0x1F600]);
        let reversed = maps.reverse_lookup();
        assert_eq!(reversed["A"].iter().collect::<Vec<_>>(), vec![0x41, 0xFF21]);
        assert_eq!(reversed["smile"].len(), 1);
    }

    #[test]
    fn mac_roman_keys() {
        let mut roman = map(0, &[(0x41, "A"), (0x61, "a"), (0x8E, "eacute"), (0xD2, "b")]);
        roman.platform_id = PlatformId::Macintosh;
        roman.encoding_id = 0;
        assert!(!roman.is_unicode());
        assert_eq!(roman.unicode(0x8E), Some(0xE9));
        assert_eq!(roman.unicode(0xD2), Some(0x201C));
        assert_eq!(roman.unicode(0x100), None);

        let maps = CharacterMaps::new(vec![
            CmapRecord::Mapped(map(4, &[(0x41, "A"), (0xE9, "eacute")])),
            CmapRecord::Mapped(roman),
        ]);
        // byte codes are not codepoints of the font
        let codepoints: Vec<_> = maps.codepoints().iter().collect();
        assert_eq!(codepoints, vec![0x41, 0xE9]);
        assert!(!maps.reverse_lookup().contains_key("b"));
        assert_eq!(maps.glyph_for(0x61), None);

        let hide: IntSet<u32> = [0x61].into_iter().collect();
        let remapped = maps.remap(&hide, "X");
        let mac = remapped.iter().nth(1).unwrap();
        assert_eq!(mac.mappings[&0x8E], "eacute");
        assert_eq!(mac.mappings[&0xD2], "b");
        assert_eq!(mac.mappings[&0x61], "X");

        let keep: IntSet<u32> = [0x41, 0xE9].into_iter().collect();
        let retained = maps.retain_codepoints(&keep);
        let mac = retained.iter().nth(1).unwrap();
        assert_eq!(mac.mappings.keys().copied().collect::<Vec<_>>(), vec![0x41, 0x8E]);
    }

    #[test]
    fn unknown_encoding_keys_are_hidden() {
        let mut legacy = map(6, &[(0x41, "A"), (0x42, "B")]);
        legacy.platform_id = PlatformId::Macintosh;
        legacy.encoding_id = 1;
        assert_eq!(legacy.unicode(0x41), None);
        legacy.remap(&IntSet::empty(), "X");
        assert_eq!(legacy.mappings[&0x41], "X");
        legacy.retain(&IntSet::all());
        assert!(legacy.mappings.is_empty());
    }

    #[test]
    fn best_prefers_full_repertoire() {
        let maps = CharacterMaps::new(vec![
            CmapRecord::Mapped(map(4, &[(0x41, "A")])),
            CmapRecord::Mapped(map(12, &[(0x41, "B")])),
        ]);
        assert_eq!(maps.best().map(|map| map.format), Some(12));
        assert_eq!(maps.glyph_for(0x41), Some("B"));
        assert_eq!(maps.glyph_for(0x42), None);
    }

    #[test]
    fn compile_and_read_back() {
        let glyphs = glyph_order();
        let mut mac = map(6, &[(0x41, "A"), (0x42, "B"), (0x58, "X")]);
        mac.platform_id = PlatformId::Macintosh;
        mac.encoding_id = 0;
        let mut roman = map(0, &[(0x41, "A"), (0x61, "a"), (0x8E, "eacute")]);
        roman.platform_id = PlatformId::Macintosh;
        roman.encoding_id = 0;
        let maps = CharacterMaps::new(vec![
            CmapRecord::Mapped(map(
                4,
                &[(0x41, "A"), (0x42, "B"), (0x58, "X"), (0x61, "a"), (0xE9, "eacute")],
            )),
            CmapRecord::Mapped(map(12, &[(0x41, "A"), (0x42, "B"), (0x1F600, "smile")])),
            CmapRecord::Mapped(map(13, &[(0x30, "X"), (0x31, "X"), (0x32, "b")])),
            CmapRecord::Mapped(mac),
            CmapRecord::Mapped(roman),
        ]);
        assert_eq!(round_trip(&maps, &glyphs), maps);
    }

    #[test]
    fn compile_empty_format_4() {
        let glyphs = glyph_order();
        let maps = CharacterMaps::new(vec![CmapRecord::Mapped(map(4, &[]))]);
        assert_eq!(round_trip(&maps, &glyphs), maps);
    }

    #[test]
    fn compile_unknown_glyph() {
        let maps = CharacterMaps::new(vec![CmapRecord::Mapped(map(4, &[(0x41, "nope")]))]);
        assert!(matches!(
            maps.compile(&glyph_order()),
            Err(Error::UnknownGlyph(name)) if name == "nope"
        ));
    }

    #[test]
    fn format_4_keeps_language() {
        let glyphs = glyph_order();
        let mut cmap = map(4, &[(0x41, "A")]);
        cmap.platform_id = PlatformId::Macintosh;
        cmap.encoding_id = 0;
        cmap.language = 2;
        let maps = CharacterMaps::new(vec![CmapRecord::Mapped(cmap)]);
        let back = round_trip(&maps, &glyphs);
        assert_eq!(back.iter().next().map(|map| map.language), Some(2));
    }
}
