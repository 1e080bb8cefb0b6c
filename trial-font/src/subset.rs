//! Reducing a font to the glyphs a set of codepoints needs
//!
//! Glyph ids never change: glyphs that are not retained lose their outlines
//! but keep their slot, so metrics, glyph names and layout tables stay valid
//! without being rewritten. Only `glyf`, `loca` and `head` are rebuilt.

use write_fonts::{
    from_obj::ToOwnedTable,
    read::{
        collections::IntSet,
        tables::{
            colr::Colr,
            glyf::{Glyf, Glyph},
            gsub::Gsub,
            gvar::Gvar,
            head::Head as ReadHead,
            loca::Loca,
        },
        FontRef, ReadError, TableProvider, TopLevelTable,
    },
    tables::{head::Head, loca::Loca as WriteLoca},
    types::GlyphId,
    FontBuilder,
};

use crate::Error;

const MAX_NESTING_LEVEL: u8 = 64;
const MAX_COMPOSITE_OPERATIONS_PER_GLYPH: u8 = 64;
const MAX_GID: GlyphId = GlyphId::new(0xFFFFFF);

/// Compute every glyph needed to render `unicodes`.
///
/// `mapped` holds the glyphs the kept codepoints map to. The result adds
/// `.notdef`, variation sequence glyphs, everything reachable through `GSUB`
/// substitutions and color layers, and the components of composite glyphs.
pub fn retained_glyphs(
    font: &FontRef,
    unicodes: &IntSet<u32>,
    mapped: &IntSet<GlyphId>,
) -> Result<IntSet<GlyphId>, Error> {
    let num_glyphs = font_num_glyphs(font);
    let mut glyphs = mapped.clone();
    glyphs.insert(GlyphId::NOTDEF);

    //variation sequences
    if let Ok(cmap) = font.cmap() {
        cmap.closure_glyphs(unicodes, &mut glyphs);
    }
    remove_invalid_gids(&mut glyphs, num_glyphs);

    if let Ok(gsub) = font.gsub() {
        let lookups = gsub
            .collect_lookups(&IntSet::all())
            .map_err(Error::read_table(Gsub::TAG))?;
        gsub.closure_glyphs(&lookups, &mut glyphs)
            .map_err(Error::read_table(Gsub::TAG))?;
        remove_invalid_gids(&mut glyphs, num_glyphs);
    }

    if let Ok(colr) = font.colr() {
        glyphs = colr_closure(&colr, &glyphs);
        remove_invalid_gids(&mut glyphs, num_glyphs);
    }

    if let (Ok(loca), Ok(glyf)) = (font.loca(None), font.glyf()) {
        let mut operation_count =
            (glyphs.len() as i32).saturating_mul(MAX_COMPOSITE_OPERATIONS_PER_GLYPH as i32);
        let mut with_components = IntSet::empty();
        for gid in glyphs.iter() {
            operation_count = glyf_closure_glyphs(
                &loca,
                &glyf,
                gid,
                &mut with_components,
                operation_count,
                0,
            );
        }
        glyphs = with_components;
        remove_invalid_gids(&mut glyphs, num_glyphs);
    }

    log::debug!("Retaining {} of {num_glyphs} glyphs", glyphs.len());
    Ok(glyphs)
}

/// Empty the outline of every glyph not in `retain`.
///
/// Returns `None` for fonts whose outlines cannot be stripped this way:
/// fonts without `glyf`, and variable fonts, whose `gvar` deltas are tied to
/// the original outlines.
pub fn strip_outlines(font: &FontRef, retain: &IntSet<GlyphId>) -> Result<Option<Vec<u8>>, Error> {
    if font.table_data(Gvar::TAG).is_some() {
        log::warn!("Font has a 'gvar' table, outlines are not subset");
        return Ok(None);
    }
    let Some(glyf_data) = font.table_data(Glyf::TAG) else {
        log::warn!("Font has no 'glyf' table, outlines are not subset");
        return Ok(None);
    };
    let loca = font.loca(None).map_err(Error::read_table(Loca::TAG))?;
    let glyf_bytes = glyf_data.as_bytes();

    let mut glyf_out = Vec::with_capacity(glyf_bytes.len());
    let mut offsets = Vec::with_capacity(loca.len() + 1);
    offsets.push(0u32);
    for idx in 0..loca.len() {
        if retain.contains(GlyphId::new(idx as u32)) {
            let glyph = loca
                .get_raw(idx)
                .zip(loca.get_raw(idx + 1))
                .and_then(|(start, end)| glyf_bytes.get(start as usize..end as usize))
                .ok_or(Error::ReadTable {
                    tag: Glyf::TAG,
                    error: ReadError::OutOfBounds,
                })?;
            glyf_out.extend_from_slice(glyph);
            glyf_out.resize(padded_size(glyf_out.len()), 0);
        }
        offsets.push(glyf_out.len() as u32);
    }
    // a zero length glyf table is rejected by some consumers
    if glyf_out.is_empty() {
        glyf_out.push(0);
    }

    let loca = WriteLoca::new(offsets);
    let mut head: Head = font
        .head()
        .map_err(Error::read_table(ReadHead::TAG))?
        .to_owned_table();
    head.index_to_loc_format = loca.format() as i16;

    let mut builder = FontBuilder::new();
    builder
        .add_raw(Glyf::TAG, glyf_out)
        .add_table(&loca)?
        .add_table(&head)?;
    Ok(Some(builder.copy_missing_tables(font.clone()).build()))
}

/// Keep only the outlines `unicodes` need; see [`retained_glyphs`].
///
/// Fonts that [`strip_outlines`] cannot handle are returned as they were.
pub fn subset_font(
    font: &FontRef,
    unicodes: &IntSet<u32>,
    mapped: &IntSet<GlyphId>,
) -> Result<Vec<u8>, Error> {
    let retain = retained_glyphs(font, unicodes, mapped)?;
    match strip_outlines(font, &retain)? {
        Some(data) => Ok(data),
        None => Ok(font.data().as_bytes().to_vec()),
    }
}

fn colr_closure(colr: &Colr, glyphs: &IntSet<GlyphId>) -> IntSet<GlyphId> {
    let mut colred = IntSet::empty();
    colr.v0_closure_glyphs(glyphs, &mut colred);
    let mut layer_indices = IntSet::empty();
    let mut palette_indices = IntSet::empty();
    let mut variation_indices = IntSet::empty();
    colr.v1_closure(
        &mut colred,
        &mut layer_indices,
        &mut palette_indices,
        &mut variation_indices,
    );
    colred
}

fn glyf_closure_glyphs(
    loca: &Loca,
    glyf: &Glyf,
    gid: GlyphId,
    gids_to_retain: &mut IntSet<GlyphId>,
    operation_count: i32,
    depth: u8,
) -> i32 {
    if gids_to_retain.contains(gid) {
        return operation_count;
    }
    gids_to_retain.insert(gid);

    if depth > MAX_NESTING_LEVEL {
        return operation_count;
    }
    let depth = depth + 1;

    let mut operation_count = operation_count - 1;
    if operation_count < 0 {
        return operation_count;
    }

    if let Some(Glyph::Composite(glyph)) = loca.get_glyf(gid, glyf).ok().flatten() {
        for child in glyph.components() {
            operation_count = glyf_closure_glyphs(
                loca,
                glyf,
                child.glyph.into(),
                gids_to_retain,
                operation_count,
                depth,
            );
        }
    }
    operation_count
}

fn remove_invalid_gids(gids: &mut IntSet<GlyphId>, num_glyphs: u32) {
    gids.remove_range(GlyphId::new(num_glyphs)..=MAX_GID);
}

fn font_num_glyphs(font: &FontRef) -> u32 {
    let from_loca = font.loca(None).map(|loca| loca.len() as u32).unwrap_or(0);
    let from_maxp = font
        .maxp()
        .map(|maxp| maxp.num_glyphs() as u32)
        .unwrap_or(0);
    from_loca.max(from_maxp)
}

fn padded_size(len: usize) -> usize {
    len + len % 2
}
