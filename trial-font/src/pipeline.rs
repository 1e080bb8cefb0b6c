//! Making trial fonts from files on disk
//!
//! Each input goes through the same steps: partition its codepoints, subset
//! it to the kept ones (through a temporary file next to the input), point
//! the hidden codepoints at the replacer, rename it and write it out. A
//! batch stops at the first font that fails.

use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use write_fonts::read::collections::IntSet;

use crate::{
    config::TrialConfig,
    font::FontObject,
    names::{synchronize, NameChange},
    partition::partition,
    BatchError, Error,
};

const TEMPORARY_TOKEN: &str = "temporary";

/// What was done to one font.
#[derive(Clone, Debug, PartialEq)]
pub struct FileReport {
    pub input: PathBuf,
    pub output: PathBuf,
    /// Codepoints that keep their own glyph.
    pub kept: IntSet<u32>,
    /// Codepoints now mapped to the replacer.
    pub hidden: IntSet<u32>,
    /// The replacer's codepoint, or `None` for extended trials.
    pub replacer: Option<u32>,
    pub name_changes: Vec<NameChange>,
}

/// Insert `token` between the file stem and the extension.
fn with_token(path: &Path, token: &str, dir: Option<&Path>) -> PathBuf {
    let stem = path.file_stem().unwrap_or_default().to_string_lossy();
    let file_name = match path.extension() {
        Some(ext) => format!("{stem}.{token}.{}", ext.to_string_lossy()),
        None => format!("{stem}.{token}"),
    };
    match dir.or_else(|| path.parent()) {
        Some(dir) => dir.join(file_name),
        None => PathBuf::from(file_name),
    }
}

/// Where the trial version of `input` is written: `Font.ttf` becomes
/// `Font.Trial.ttf`, in `output_dir` if one is given.
pub fn output_path(input: &Path, suffix: &str, output_dir: Option<&Path>) -> PathBuf {
    let token: String = suffix.chars().filter(|c| !c.is_whitespace()).collect();
    with_token(input, &token, output_dir)
}

/// Create the intermediate file for `input` next to it.
///
/// The name is `Font.temporary.<random>.ttf`, so it never matches an output
/// path. The file is deleted when the handle is dropped.
fn temporary_file(input: &Path) -> Result<NamedTempFile, Error> {
    let stem = input.file_stem().unwrap_or_default().to_string_lossy();
    let suffix = input
        .extension()
        .map(|ext| format!(".{}", ext.to_string_lossy()))
        .unwrap_or_default();
    let dir = match input.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };
    tempfile::Builder::new()
        .prefix(&format!("{stem}.{TEMPORARY_TOKEN}."))
        .suffix(&suffix)
        .tempfile_in(dir)
        .map_err(|e| Error::io(dir, e))
}

/// Make the trial version of one font.
pub fn process_file(input: &Path, config: &TrialConfig) -> Result<FileReport, Error> {
    log::info!("Making trial font from {}", input.display());
    let original = FontObject::load(input)?;
    let output = output_path(input, &config.suffix, config.output_dir.as_deref());
    let temporary = temporary_file(input)?;
    if output == temporary.path() {
        return Err(Error::OutputCollision(output));
    }

    let (font, kept, hidden, replacer) = if config.extended {
        std::fs::copy(input, temporary.path()).map_err(|e| Error::io(temporary.path(), e))?;
        let font = FontObject::load(temporary.path())?;
        let kept = font.character_maps().codepoints();
        (font, kept, IntSet::empty(), None)
    } else {
        let character_maps = original.character_maps();
        let split = partition(
            &config.unicodes,
            &character_maps.codepoints(),
            &config.replacer,
            &character_maps.reverse_lookup(),
        )?;
        let replacer_glyph = character_maps
            .glyph_for(split.replacer)
            .ok_or(Error::ReplacerNotMapped(split.replacer))?;
        log::info!(
            "Hiding {} codepoints behind '{replacer_glyph}' (U+{:04X})",
            split.hide.len(),
            split.replacer
        );
        let remapped = character_maps.remap(&split.hide, replacer_glyph);

        original
            .subset_to_codepoints(&split.keep)?
            .save(temporary.path())?;
        let font = FontObject::load(temporary.path())?.with_character_maps(remapped);
        (font, split.keep, split.hide, Some(split.replacer))
    };

    let renamed = synchronize(original.names(), &config.suffix);
    font.with_names(renamed.names).save(&output)?;
    log::info!("Saved {}", output.display());

    Ok(FileReport {
        input: input.to_owned(),
        output,
        kept,
        hidden,
        replacer,
        name_changes: renamed.changes,
    })
}

/// Make trial fonts for every input, in order.
///
/// The first failure stops the batch: later inputs are not attempted, and
/// the returned error lists the fonts already written.
pub fn run_batch<P: AsRef<Path>>(
    inputs: &[P],
    config: &TrialConfig,
) -> Result<Vec<FileReport>, BatchError> {
    let mut completed = Vec::with_capacity(inputs.len());
    for input in inputs {
        let input = input.as_ref();
        match process_file(input, config) {
            Ok(report) => completed.push(report),
            Err(source) => {
                return Err(BatchError {
                    completed,
                    path: input.to_owned(),
                    source,
                })
            }
        }
    }
    Ok(completed)
}
