//! The naming table, and renaming a font as its trial variant
//!
//! Names are written for two platforms: Macintosh Roman English and Windows
//! Unicode English (US). Every derived name is computed once from the
//! original table and then stored under both platforms, so a renamed font
//! never ends up with the platforms disagreeing.

use std::{collections::BTreeMap, fmt::Display};

use font_types::NameId;
use write_fonts::{
    read::{
        tables::name::{Encoding, MacRomanMapping, Name as ReadName},
        FontRef, TableProvider, TopLevelTable,
    },
    tables::name::{LangTagRecord, Name, NameRecord},
};

use crate::Error;

/// A platform, encoding and language triple that a name record is stored under.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Platform {
    pub platform_id: u16,
    pub encoding_id: u16,
    pub language_id: u16,
}

impl Platform {
    /// Macintosh, Roman, English.
    pub const MACINTOSH: Platform = Platform::new(1, 0, 0);
    /// Windows, Unicode BMP, English (United States).
    pub const WINDOWS: Platform = Platform::new(3, 1, 0x409);

    pub const fn new(platform_id: u16, encoding_id: u16, language_id: u16) -> Self {
        Platform {
            platform_id,
            encoding_id,
            language_id,
        }
    }

    fn encoding(&self) -> Encoding {
        Encoding::new(self.platform_id, self.encoding_id)
    }
}

impl Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match *self {
            Platform::MACINTOSH => f.write_str("Mac"),
            Platform::WINDOWS => f.write_str("Windows"),
            Platform {
                platform_id,
                encoding_id,
                language_id,
            } => write!(f, "({platform_id}, {encoding_id}, 0x{language_id:X})"),
        }
    }
}

/// Identifies one name record. Orders the way the `name` table must be sorted.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NameKey {
    pub platform: Platform,
    pub name_id: NameId,
}

/// The decoded `name` table.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct NameTable {
    records: BTreeMap<NameKey, String>,
    lang_tags: Option<Vec<String>>,
}

impl NameTable {
    pub fn from_font(font: &FontRef) -> Result<Self, Error> {
        let name = font.name().map_err(Error::read_table(ReadName::TAG))?;
        let data = name.string_data();
        let mut table = NameTable::default();
        for record in name.name_record() {
            let platform = Platform::new(
                record.platform_id(),
                record.encoding_id(),
                record.language_id(),
            );
            if platform.encoding() == Encoding::Unknown {
                log::warn!(
                    "Dropping name {} with unsupported encoding {platform}",
                    record.name_id().to_u16()
                );
                continue;
            }
            let string = record
                .string(data)
                .map_err(Error::read_table(ReadName::TAG))?;
            table.set(record.name_id(), platform, string.chars().collect::<String>());
        }
        if let Some(lang_tags) = name.lang_tag_record() {
            let mut tags = Vec::with_capacity(lang_tags.len());
            for record in lang_tags {
                let tag = record
                    .lang_tag(data)
                    .map_err(Error::read_table(ReadName::TAG))?;
                tags.push(tag.chars().collect());
            }
            table.lang_tags = Some(tags);
        }
        Ok(table)
    }

    pub fn get(&self, name_id: NameId, platform: Platform) -> Option<&str> {
        self.records
            .get(&NameKey { platform, name_id })
            .map(String::as_str)
    }

    /// Store a name, returning the value it replaced.
    pub fn set(
        &mut self,
        name_id: NameId,
        platform: Platform,
        value: impl Into<String>,
    ) -> Option<String> {
        self.records
            .insert(NameKey { platform, name_id }, value.into())
    }

    /// The Windows name, or the Mac one when Windows has none. Empty names
    /// count as missing.
    pub fn get_preferred(&self, name_id: NameId) -> Option<&str> {
        [Platform::WINDOWS, Platform::MACINTOSH]
            .into_iter()
            .filter_map(|platform| self.get(name_id, platform))
            .find(|value| !value.is_empty())
    }

    /// The typographic family name, falling back to the legacy family name.
    pub fn family_name(&self) -> Option<&str> {
        self.get_preferred(NameId::TYPOGRAPHIC_FAMILY_NAME)
            .or_else(|| self.get_preferred(NameId::FAMILY_NAME))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&NameKey, &str)> + '_ {
        self.records.iter().map(|(key, value)| (key, value.as_str()))
    }

    pub fn compile(&self) -> Name {
        let mut name = Name::new(
            self.records
                .iter()
                .map(|(key, value)| {
                    NameRecord::new(
                        key.platform.platform_id,
                        key.platform.encoding_id,
                        key.platform.language_id,
                        key.name_id,
                        value.clone().into(),
                    )
                })
                .collect(),
        );
        name.lang_tag_record = self.lang_tags.as_ref().map(|tags| {
            tags.iter()
                .map(|tag| LangTagRecord::new(tag.clone().into()))
                .collect()
        });
        name
    }
}

/// Why a name record was left as it was.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SkipReason {
    /// The font has no such record on this platform.
    MissingRecord,
    /// The new name has characters Mac Roman cannot encode.
    NotMacRoman,
    /// The old name does not contain the family or PostScript name it is
    /// derived from.
    FamilyNotFound,
}

impl Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            SkipReason::MissingRecord => "no such record",
            SkipReason::NotMacRoman => "not representable in Mac Roman",
            SkipReason::FamilyNotFound => "family name not found in old value",
        })
    }
}

/// One entry in the log of a rename.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NameChange {
    Updated {
        name_id: NameId,
        platform: Platform,
        old: String,
        new: String,
    },
    Skipped {
        name_id: NameId,
        platform: Platform,
        reason: SkipReason,
    },
}

impl Display for NameChange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NameChange::Updated {
                name_id,
                platform,
                old,
                new,
            } => write!(
                f,
                "name {} ({platform}): '{old}' -> '{new}'",
                name_id.to_u16()
            ),
            NameChange::Skipped {
                name_id,
                platform,
                reason,
            } => write!(
                f,
                "name {} ({platform}): skipped, {reason}",
                name_id.to_u16()
            ),
        }
    }
}

/// A renamed naming table and what changed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Renamed {
    pub names: NameTable,
    pub changes: Vec<NameChange>,
}

/// The family name with the suffix appended, as it appears in names with spaces.
pub fn trial_family_name(family: &str, suffix: &str) -> String {
    format!("{family} {suffix}")
}

/// Insert the suffix before the style part of a PostScript name.
///
/// `Sans-Light` becomes `SansTrial-Light`. Names without a style part get
/// the suffix appended. Spaces are removed from the suffix.
pub fn trial_postscript_name(postscript_name: &str, suffix: &str) -> String {
    let suffix = compact(suffix);
    match postscript_name.split_once('-') {
        Some((family, style)) => format!("{family}{suffix}-{style}"),
        None => format!("{postscript_name}{suffix}"),
    }
}

fn compact(s: &str) -> String {
    s.chars().filter(|c| !c.is_whitespace()).collect()
}

/// Rebuild a name that begins with the family, keeping whatever follows it.
fn replace_family(old: &str, family: &str, new_family: &str) -> Option<String> {
    if let Some(rest) = old.strip_prefix(family) {
        return Some(format!("{new_family}{rest}"));
    }
    old.contains(family)
        .then(|| old.replacen(family, new_family, 1))
}

fn replace_unique_id(
    old: &str,
    postscript_name: Option<&str>,
    new_postscript_name: Option<&str>,
    suffix: &str,
) -> Option<String> {
    if let (Some(ps), Some(new_ps)) = (postscript_name, new_postscript_name) {
        if let Some(pos) = old.rfind(ps) {
            return Some(format!("{}{new_ps}{}", &old[..pos], &old[pos + ps.len()..]));
        }
    }
    old.contains('-')
        .then(|| old.replacen('-', &format!("{}-", compact(suffix)), 1))
}

/// Rename the family, PostScript, full and unique names to their trial
/// variants.
///
/// Every value is derived from the original table: the typographic family
/// (or the legacy family when there is none) gets `suffix` appended, and the
/// other names are rebuilt around it. The result is written under the Mac
/// and Windows platforms wherever the font already has that record and the
/// stored value differs.
pub fn synchronize(names: &NameTable, suffix: &str) -> Renamed {
    let mut renamer = Renamer {
        original: names,
        names: names.clone(),
        changes: Vec::new(),
    };

    let family = names.family_name();
    let new_family = family.map(|family| trial_family_name(family, suffix));
    let postscript_name = names.get_preferred(NameId::POSTSCRIPT_NAME);
    let new_postscript_name = postscript_name.map(|ps| trial_postscript_name(ps, suffix));

    let with_family = |old: &str| match (family, new_family.as_deref()) {
        (Some(family), Some(new_family)) => replace_family(old, family, new_family),
        _ => None,
    };

    if names.get_preferred(NameId::TYPOGRAPHIC_FAMILY_NAME).is_some() {
        renamer.rename(NameId::TYPOGRAPHIC_FAMILY_NAME, |_| new_family.clone());
    }
    if names.get_preferred(NameId::WWS_FAMILY_NAME).is_some() {
        renamer.rename(NameId::WWS_FAMILY_NAME, with_family);
    }
    renamer.rename(NameId::POSTSCRIPT_NAME, |_| new_postscript_name.clone());
    renamer.rename(NameId::FULL_NAME, with_family);
    renamer.rename(NameId::UNIQUE_ID, |old| {
        replace_unique_id(old, postscript_name, new_postscript_name.as_deref(), suffix)
    });
    renamer.rename(NameId::FAMILY_NAME, with_family);
    if names
        .get_preferred(NameId::VARIATIONS_POSTSCRIPT_NAME_PREFIX)
        .is_some()
    {
        renamer.rename(NameId::VARIATIONS_POSTSCRIPT_NAME_PREFIX, |old| {
            Some(format!("{old}{}", compact(suffix)))
        });
    }

    Renamed {
        names: renamer.names,
        changes: renamer.changes,
    }
}

struct Renamer<'a> {
    original: &'a NameTable,
    names: NameTable,
    changes: Vec<NameChange>,
}

impl Renamer<'_> {
    /// Derive a new value from the preferred original and write it to both
    /// platforms.
    fn rename(&mut self, name_id: NameId, derive: impl FnOnce(&str) -> Option<String>) {
        let original = self.original;
        let derived = original.get_preferred(name_id).map(derive);
        for platform in [Platform::MACINTOSH, Platform::WINDOWS] {
            let reason = match &derived {
                None => SkipReason::MissingRecord,
                Some(None) => SkipReason::FamilyNotFound,
                Some(Some(new)) => match self.write(name_id, platform, new) {
                    Ok(()) => continue,
                    Err(reason) => reason,
                },
            };
            log::warn!("name {} ({platform}): skipped, {reason}", name_id.to_u16());
            self.changes.push(NameChange::Skipped {
                name_id,
                platform,
                reason,
            });
        }
    }

    fn write(&mut self, name_id: NameId, platform: Platform, new: &str) -> Result<(), SkipReason> {
        let original = self.original;
        let old = original
            .get(name_id, platform)
            .ok_or(SkipReason::MissingRecord)?;
        if old == new {
            return Ok(());
        }
        if platform.encoding() == Encoding::MacRoman
            && !new.chars().all(|c| MacRomanMapping.encode(c).is_some())
        {
            return Err(SkipReason::NotMacRoman);
        }
        self.names.set(name_id, platform, new);
        let change = NameChange::Updated {
            name_id,
            platform,
            old: old.to_owned(),
            new: new.to_owned(),
        };
        log::info!("{change}");
        self.changes.push(change);
        Ok(())
    }
}
