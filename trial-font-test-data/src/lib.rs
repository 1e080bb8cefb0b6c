//! Test fonts for trial-font, built in memory.
//!
//! Every font shares one glyph order and one character map. The names, the
//! presence of a small caps `GSUB` feature and of a legacy Mac Roman `cmap`
//! subtable can be changed per test.

use font_types::{GlyphId, GlyphId16, NameId, Tag};
use kurbo::{BezPath, Rect, Shape};
use write_fonts::{
    read::tables::name::MacRomanMapping,
    tables::{
        cmap::{Cmap, CmapSubtable, EncodingRecord, PlatformId},
        glyf::{
            Anchor, Bbox, Component, ComponentFlags, CompositeGlyph, GlyfLocaBuilder, Glyph,
            SimpleGlyph, Transform,
        },
        gsub::{Gsub, SingleSubst, SubstitutionLookup, SubstitutionLookupList},
        head::Head,
        layout::{
            CoverageTable, Feature, FeatureList, FeatureRecord, LangSys, Lookup, LookupFlag,
            Script, ScriptList, ScriptRecord,
        },
        maxp::Maxp,
        name::{Name, NameRecord},
        post::Post,
    },
    FontBuilder,
};

/// The glyph order of every test font.
pub static GLYPH_ORDER: &[&str] = &[
    ".notdef",
    "space",
    "A",
    "B",
    "X",
    "a",
    "b",
    "aacute",
    "acutecomb",
    "asterisk",
    "a.sc",
];

/// The character map of every test font. `a.sc` is only reachable via `smcp`.
pub static CHARACTER_MAP: &[(char, &str)] = &[
    (' ', "space"),
    ('*', "asterisk"),
    ('A', "A"),
    ('B', "B"),
    ('X', "X"),
    ('a', "a"),
    ('b', "b"),
    ('á', "aacute"),
    ('\u{0301}', "acutecomb"),
];

pub const MAC: (u16, u16, u16) = (1, 0, 0);
pub const WINDOWS: (u16, u16, u16) = (3, 1, 0x409);

/// Names for the Sans Light test font, stored for both Mac and Windows.
pub static SANS_LIGHT_NAMES: &[(u16, &str)] = &[
    (1, "Sans Light"),
    (2, "Regular"),
    (3, "1.000;ARRW;Sans-Light"),
    (4, "Sans Light"),
    (6, "Sans-Light"),
    (16, "Sans"),
    (17, "Light"),
];

pub fn glyph_id(name: &str) -> GlyphId {
    GLYPH_ORDER
        .iter()
        .position(|n| *n == name)
        .map(|idx| GlyphId::new(idx as u32))
        .unwrap_or_else(|| panic!("no glyph named '{name}'"))
}

/// Describes a test font.
#[derive(Clone, Debug)]
pub struct TestFont {
    pub names: Vec<((u16, u16, u16), u16, String)>,
    pub small_caps: bool,
    /// Add a (1, 0) format 0 subtable keyed by Mac Roman byte codes.
    pub mac_roman_cmap: bool,
}

impl Default for TestFont {
    fn default() -> Self {
        TestFont::with_names(SANS_LIGHT_NAMES)
    }
}

impl TestFont {
    /// A font with `names` on both the Mac and Windows platforms.
    pub fn with_names(names: &[(u16, &str)]) -> Self {
        TestFont {
            names: [MAC, WINDOWS]
                .into_iter()
                .flat_map(|platform| {
                    names
                        .iter()
                        .map(move |(id, value)| (platform, *id, value.to_string()))
                })
                .collect(),
            small_caps: true,
            mac_roman_cmap: false,
        }
    }

    pub fn build(&self) -> Vec<u8> {
        let mut glyf_builder = GlyfLocaBuilder::new();
        for name in GLYPH_ORDER {
            glyf_builder.add_glyph(&make_glyph(name)).unwrap();
        }
        let (glyf, loca, loca_format) = glyf_builder.build();

        let head = Head {
            units_per_em: 1000,
            index_to_loc_format: loca_format as i16,
            ..Default::default()
        };
        let mut cmap = Cmap::from_mappings(
            CHARACTER_MAP
                .iter()
                .map(|(c, name)| (*c, glyph_id(name))),
        )
        .unwrap();
        if self.mac_roman_cmap {
            // records are sorted by platform, Macintosh goes after Unicode
            let idx = cmap
                .encoding_records
                .iter()
                .position(|record| record.platform_id != PlatformId::Unicode)
                .unwrap_or(cmap.encoding_records.len());
            cmap.encoding_records.insert(
                idx,
                EncodingRecord::new(PlatformId::Macintosh, 0, mac_roman_subtable()),
            );
        }

        let mut builder = FontBuilder::new();
        builder
            .add_table(&head)
            .unwrap()
            .add_table(&Maxp::new(GLYPH_ORDER.len() as u16))
            .unwrap()
            .add_table(&Post::new_v2(GLYPH_ORDER.iter().copied()))
            .unwrap()
            .add_table(&cmap)
            .unwrap()
            .add_table(&self.name_table())
            .unwrap()
            .add_table(&glyf)
            .unwrap()
            .add_table(&loca)
            .unwrap();
        if self.small_caps {
            builder.add_table(&small_caps_gsub()).unwrap();
        }
        builder.build()
    }

    fn name_table(&self) -> Name {
        let mut records: Vec<_> = self
            .names
            .iter()
            .map(|((platform_id, encoding_id, language_id), id, value)| {
                NameRecord::new(
                    *platform_id,
                    *encoding_id,
                    *language_id,
                    NameId::new(*id),
                    value.clone().into(),
                )
            })
            .collect();
        records.sort();
        Name::new(records)
    }
}

/// `CHARACTER_MAP` re-keyed by Mac Roman byte, skipping what Mac Roman lacks.
fn mac_roman_subtable() -> CmapSubtable {
    let mut glyph_ids = vec![0u8; 256];
    for (c, name) in CHARACTER_MAP {
        if let Some(code) = MacRomanMapping.encode(*c) {
            glyph_ids[code as usize] = glyph_id(name).to_u32() as u8;
        }
    }
    CmapSubtable::format_0(0, glyph_ids)
}

fn square(size: f64) -> SimpleGlyph {
    let path: BezPath = Rect::new(0.0, 0.0, size, size).to_path(0.1);
    SimpleGlyph::from_bezpath(&path).unwrap()
}

fn make_glyph(name: &str) -> Glyph {
    match name {
        "space" => Glyph::Empty,
        "aacute" => {
            let base = Component::new(
                GlyphId16::new(glyph_id("a").to_u32() as u16),
                Anchor::Offset { x: 0, y: 0 },
                Transform::default(),
                ComponentFlags::default(),
            );
            let accent = Component::new(
                GlyphId16::new(glyph_id("acutecomb").to_u32() as u16),
                Anchor::Offset { x: 100, y: 500 },
                Transform::default(),
                ComponentFlags::default(),
            );
            let mut glyph = CompositeGlyph::new(
                base,
                Bbox {
                    x_min: 0,
                    y_min: 0,
                    x_max: 400,
                    y_max: 400,
                },
            );
            glyph.add_component(
                accent,
                Bbox {
                    x_min: 100,
                    y_min: 500,
                    x_max: 200,
                    y_max: 600,
                },
            );
            Glyph::Composite(glyph)
        }
        "acutecomb" => Glyph::Simple(square(100.0)),
        _ => Glyph::Simple(square(100.0 + 10.0 * glyph_id(name).to_u32() as f64)),
    }
}

/// A `smcp` feature mapping `a` to `a.sc`.
fn small_caps_gsub() -> Gsub {
    let coverage: CoverageTable = [GlyphId16::new(glyph_id("a").to_u32() as u16)]
        .into_iter()
        .collect();
    let subst = SingleSubst::format_2(
        coverage,
        vec![GlyphId16::new(glyph_id("a.sc").to_u32() as u16)],
    );
    let lookups = SubstitutionLookupList::new(vec![SubstitutionLookup::Single(Lookup::new(
        LookupFlag::empty(),
        vec![subst],
    ))]);
    let features = FeatureList::new(vec![FeatureRecord::new(
        Tag::new(b"smcp"),
        Feature::new(None, vec![0]),
    )]);
    let scripts = ScriptList::new(vec![ScriptRecord::new(
        Tag::new(b"DFLT"),
        Script::new(Some(LangSys::new(vec![0])), vec![]),
    )]);
    Gsub::new(scripts, features, lookups)
}
