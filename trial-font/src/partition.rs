//! Splitting a font's codepoints into the ones a trial keeps and the ones it hides
use std::{collections::BTreeMap, fmt::Display, str::FromStr};

use write_fonts::read::collections::IntSet;

use crate::{unicodes::parse_codepoint_literal, Error};

/// How the glyph that stands in for hidden characters is identified.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Replacer {
    /// An explicit codepoint, written `U+XXXX` on the command line.
    Codepoint(u32),
    /// A glyph name, resolved through the font's character map.
    GlyphName(String),
}

impl FromStr for Replacer {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.starts_with("U+") {
            return parse_codepoint_literal(s)
                .map(Replacer::Codepoint)
                .ok_or_else(|| Error::InvalidReplacer(s.to_owned()));
        }
        if s.is_empty() {
            return Err(Error::InvalidReplacer(s.to_owned()));
        }
        Ok(Replacer::GlyphName(s.to_owned()))
    }
}

impl Default for Replacer {
    fn default() -> Self {
        Replacer::GlyphName("X".to_owned())
    }
}

impl Display for Replacer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Replacer::Codepoint(cp) => write!(f, "U+{cp:04X}"),
            Replacer::GlyphName(name) => f.write_str(name),
        }
    }
}

/// The result of partitioning one font's codepoints.
#[derive(Clone, Debug, PartialEq)]
pub struct Partition {
    /// The permitted codepoints plus the replacer.
    pub keep: IntSet<u32>,
    /// Codepoints the font maps that must resolve to the replacer.
    pub hide: IntSet<u32>,
    /// The codepoint of the replacer glyph.
    pub replacer: u32,
}

/// Split `font_codepoints` into kept and hidden sets and resolve the replacer.
///
/// `reverse_lookup` maps glyph names to the codepoints that reach them. When
/// a glyph is reached by several codepoints the smallest one is used.
pub fn partition(
    permitted: &IntSet<u32>,
    font_codepoints: &IntSet<u32>,
    replacer: &Replacer,
    reverse_lookup: &BTreeMap<String, IntSet<u32>>,
) -> Result<Partition, Error> {
    let mut hide = font_codepoints.clone();
    hide.subtract(permitted);

    let replacer = match replacer {
        Replacer::Codepoint(cp) if font_codepoints.contains(*cp) => *cp,
        Replacer::Codepoint(cp) => return Err(Error::ReplacerNotMapped(*cp)),
        Replacer::GlyphName(name) => reverse_lookup
            .get(name)
            .and_then(IntSet::first)
            .ok_or_else(|| Error::ReplacerNotFound(name.clone()))?,
    };

    hide.remove(replacer);
    let mut keep = permitted.clone();
    keep.insert(replacer);

    log::debug!(
        "Keeping {} codepoints, hiding {}, replacer U+{replacer:04X}",
        keep.len(),
        hide.len()
    );
    Ok(Partition {
        keep,
        hide,
        replacer,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::unicodes::parse_unicodes;

    fn set(items: impl IntoIterator<Item = char>) -> IntSet<u32> {
        items.into_iter().map(u32::from).collect()
    }

    fn lookup(entries: &[(&str, &[char])]) -> BTreeMap<String, IntSet<u32>> {
        entries
            .iter()
            .map(|(name, chars)| (name.to_string(), set(chars.iter().copied())))
            .collect()
    }

    #[test]
    fn parse_replacer() {
        assert_eq!("X".parse::<Replacer>().unwrap(), Replacer::GlyphName("X".into()));
        assert_eq!(
            " asterisk ".parse::<Replacer>().unwrap(),
            Replacer::GlyphName("asterisk".into())
        );
        assert_eq!("U+002A".parse::<Replacer>().unwrap(), Replacer::Codepoint(0x2A));
        assert!(matches!(
            "U+nope".parse::<Replacer>(),
            Err(Error::InvalidReplacer(_))
        ));
        assert!(matches!("".parse::<Replacer>(), Err(Error::InvalidReplacer(_))));
        assert_eq!(Replacer::Codepoint(0x2A).to_string(), "U+002A");
    }

    #[test]
    fn hides_everything_not_permitted() {
        let permitted = parse_unicodes("0041-005A").unwrap();
        let font = set(['A', 'B', 'X', 'a', 'b', 'é']);
        let reverse = lookup(&[("X", &['X'])]);

        let result = partition(&permitted, &font, &Replacer::default(), &reverse).unwrap();
        assert_eq!(result.replacer, u32::from('X'));
        assert_eq!(result.hide, set(['a', 'b', 'é']));
        assert!(result.keep.contains(u32::from('X')));
        assert!(!result.keep.intersects_set(&result.hide));
    }

    #[test]
    fn replacer_is_never_hidden() {
        let permitted = parse_unicodes("0061-007A").unwrap();
        let font = set(['a', 'z', '*', 'Q']);
        let reverse = lookup(&[("asterisk", &['*'])]);

        let result = partition(
            &permitted,
            &font,
            &Replacer::GlyphName("asterisk".into()),
            &reverse,
        )
        .unwrap();
        assert_eq!(result.replacer, u32::from('*'));
        assert_eq!(result.hide, set(['Q']));
        assert!(result.keep.contains(u32::from('*')));
        assert!(!result.keep.intersects_set(&result.hide));
    }

    #[test]
    fn codepoint_replacer() {
        let permitted = set(['a']);
        let font = set(['a', 'b', '?']);
        let result = partition(
            &permitted,
            &font,
            &Replacer::Codepoint(u32::from('?')),
            &BTreeMap::new(),
        )
        .unwrap();
        assert_eq!(result.hide, set(['b']));
        assert_eq!(result.keep, set(['a', '?']));
    }

    #[test]
    fn unmapped_codepoint_replacer() {
        let font = set(['a', 'b']);
        assert!(matches!(
            partition(&set(['a']), &font, &Replacer::Codepoint(0x2A), &BTreeMap::new()),
            Err(Error::ReplacerNotMapped(0x2A))
        ));
    }

    #[test]
    fn glyph_with_several_codepoints() {
        let font = set(['A', 'Ａ', 'b']);
        let reverse = lookup(&[("A", &['Ａ', 'A'])]);
        let result = partition(&set([]), &font, &Replacer::GlyphName("A".into()), &reverse).unwrap();
        assert_eq!(result.replacer, u32::from('A'));
        // the other codepoint for the same glyph is still hidden
        assert_eq!(result.hide, set(['Ａ', 'b']));
    }

    #[test]
    fn replacer_without_codepoint() {
        let font = set(['a']);
        let reverse = lookup(&[("a", &['a'])]);
        let err = partition(&set(['a']), &font, &Replacer::default(), &reverse).unwrap_err();
        assert!(matches!(err, Error::ReplacerNotFound(name) if name == "X"));
    }
}
