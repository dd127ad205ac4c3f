//! Content-addressed element identity.
//!
//! An element is identified by where it lives (file and kind), what it says
//! (content hash) and how many identical siblings precede it in the same
//! file (occurrence index). Editing an element therefore changes its key:
//! downstream code only ever asks "is this exact key still valid".

use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::str::FromStr;

use draftlint_ast::{Element, ElementKind};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::CacheError;

/// 32-bit rolling hash of element content.
///
/// This is not collision resistant. Two different contents in the same
/// `(file, kind)` bucket that hash alike are treated as the same element.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ContentHash(pub u32);

impl ContentHash {
    /// Hashes `content` with the classic `h * 31 + c` polynomial over chars.
    pub fn of(content: &str) -> Self {
        let hash = content
            .chars()
            .fold(0u32, |h, c| h.wrapping_mul(31).wrapping_add(c as u32));
        Self(hash)
    }
}

impl fmt::Display for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:08x}", self.0)
    }
}

impl FromStr for ContentHash {
    type Err = CacheError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        u32::from_str_radix(s, 16)
            .map(ContentHash)
            .map_err(|e| CacheError::corrupted(format!("invalid content hash '{}': {}", s, e)))
    }
}

impl Serialize for ContentHash {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ContentHash {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Stable identity of an element within one analysis pass.
///
/// Serialized as `kind:hash:occurrence:path` so it can be used as a JSON
/// object key. The path comes last because it may itself contain colons.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ElementKey {
    file_path: String,
    kind: ElementKind,
    hash: ContentHash,
    occurrence: u32,
}

impl ElementKey {
    /// Creates a key from its parts.
    pub fn new(
        file_path: impl Into<String>,
        kind: ElementKind,
        hash: ContentHash,
        occurrence: u32,
    ) -> Self {
        Self {
            file_path: file_path.into(),
            kind,
            hash,
            occurrence,
        }
    }

    /// Source file of the element.
    pub fn file_path(&self) -> &str {
        &self.file_path
    }

    /// Kind of the element.
    pub fn kind(&self) -> ElementKind {
        self.kind
    }

    /// Content hash of the element.
    pub fn hash(&self) -> ContentHash {
        self.hash
    }

    /// Number of earlier elements in the same file with the same kind and hash.
    pub fn occurrence(&self) -> u32 {
        self.occurrence
    }
}

impl fmt::Display for ElementKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}:{}:{}",
            self.kind, self.hash, self.occurrence, self.file_path
        )
    }
}

impl FromStr for ElementKey {
    type Err = CacheError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.splitn(4, ':');
        let (Some(kind), Some(hash), Some(occurrence), Some(file_path)) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return Err(CacheError::corrupted(format!("malformed element key '{}'", s)));
        };

        let kind = ElementKind::parse(kind)
            .ok_or_else(|| CacheError::corrupted(format!("unknown element kind '{}'", kind)))?;
        let occurrence = occurrence.parse().map_err(|e| {
            CacheError::corrupted(format!("invalid occurrence '{}': {}", occurrence, e))
        })?;

        Ok(Self {
            file_path: file_path.to_string(),
            kind,
            hash: hash.parse()?,
            occurrence,
        })
    }
}

impl Serialize for ElementKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ElementKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// An ordered element sequence together with the key of every element.
///
/// The ordered sequence is kept as a first-class value: order-dependent
/// planning and checks walk it directly instead of re-deriving order.
#[derive(Debug, Clone, Default)]
pub struct IdentifiedDocument {
    elements: Vec<Element>,
    keys: Vec<ElementKey>,
    positions: HashMap<ElementKey, usize>,
}

impl IdentifiedDocument {
    /// Number of elements.
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    /// Returns true if there are no elements.
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Elements in document order.
    pub fn elements(&self) -> &[Element] {
        &self.elements
    }

    /// Keys in document order.
    pub fn keys(&self) -> &[ElementKey] {
        &self.keys
    }

    /// Iterates `(key, element)` pairs in document order.
    pub fn iter(&self) -> impl Iterator<Item = (&ElementKey, &Element)> {
        self.keys.iter().zip(self.elements.iter())
    }

    /// Iterates sentences in document order.
    pub fn sentences(&self) -> impl Iterator<Item = (&ElementKey, &Element)> {
        self.iter()
            .filter(|(_, element)| element.kind == ElementKind::Sentence)
    }

    /// Returns the element for a key.
    pub fn get(&self, key: &ElementKey) -> Option<&Element> {
        self.positions.get(key).map(|&index| &self.elements[index])
    }

    /// Returns the document position of a key.
    pub fn position(&self, key: &ElementKey) -> Option<usize> {
        self.positions.get(key).copied()
    }

    /// Returns true if the key belongs to this document.
    pub fn contains(&self, key: &ElementKey) -> bool {
        self.positions.contains_key(key)
    }

    /// Returns the key at a document position.
    pub fn key_at(&self, index: usize) -> Option<&ElementKey> {
        self.keys.get(index)
    }

    /// All keys whose kind satisfies `predicate`.
    pub fn keys_where(&self, predicate: impl Fn(ElementKind) -> bool) -> BTreeSet<ElementKey> {
        self.keys
            .iter()
            .filter(|key| predicate(key.kind()))
            .cloned()
            .collect()
    }

    /// All keys as a set.
    pub fn key_set(&self) -> BTreeSet<ElementKey> {
        self.keys.iter().cloned().collect()
    }

    /// Gives back the ordered elements.
    pub fn into_elements(self) -> Vec<Element> {
        self.elements
    }
}

/// Derives the key of every element in an ordered sequence.
///
/// Occurrence indices count per `(file, kind, hash)` in first-seen order, so
/// keys are unique within the sequence.
pub fn identify(elements: Vec<Element>) -> IdentifiedDocument {
    let mut keys = Vec::with_capacity(elements.len());
    {
        let mut counters: HashMap<(&str, ElementKind, ContentHash), u32> = HashMap::new();
        for element in &elements {
            let hash = ContentHash::of(&element.content);
            let counter = counters
                .entry((element.file_path.as_str(), element.kind, hash))
                .or_insert(0);
            keys.push(ElementKey::new(
                element.file_path.clone(),
                element.kind,
                hash,
                *counter,
            ));
            *counter += 1;
        }
    }

    let positions = keys
        .iter()
        .enumerate()
        .map(|(index, key)| (key.clone(), index))
        .collect();

    IdentifiedDocument {
        elements,
        keys,
        positions,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use draftlint_ast::Range;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn element(kind: ElementKind, path: &str, line: u32, text: &str) -> Element {
        Element::new(kind, text, path, Range::from_coords(line, 0, line, 80))
    }

    #[rstest]
    #[case("", 0)]
    #[case("a", 97)]
    #[case("ab", 97 * 31 + 98)]
    fn test_content_hash_values(#[case] content: &str, #[case] expected: u32) {
        assert_eq!(ContentHash::of(content), ContentHash(expected));
    }

    #[test]
    fn test_content_hash_wraps_on_long_input() {
        let long = "x".repeat(10_000);
        assert_eq!(ContentHash::of(&long), ContentHash::of(&long));
        assert_ne!(ContentHash::of(&long), ContentHash::of(&format!("{}.", long)));
    }

    #[test]
    fn test_content_hash_display_is_fixed_width_hex() {
        assert_eq!(ContentHash(0xab).to_string(), "000000ab");
        assert_eq!("000000ab".parse::<ContentHash>().unwrap(), ContentHash(0xab));
    }

    #[test]
    fn test_element_key_string_form() {
        let key = ElementKey::new("dir/a:b.tex", ElementKind::Sentence, ContentHash(255), 2);

        let text = key.to_string();
        assert_eq!(text, "sentence:000000ff:2:dir/a:b.tex");
        assert_eq!(text.parse::<ElementKey>().unwrap(), key);
    }

    #[rstest]
    #[case("sentence:000000ff:2")]
    #[case("paragraph:000000ff:0:a.tex")]
    #[case("sentence:zz:0:a.tex")]
    #[case("sentence:000000ff:-1:a.tex")]
    fn test_element_key_rejects_malformed(#[case] text: &str) {
        assert!(text.parse::<ElementKey>().is_err());
    }

    #[test]
    fn test_element_key_as_json_map_key() {
        let key = ElementKey::new("a.tex", ElementKind::Figure, ContentHash(1), 0);
        let mut map = std::collections::BTreeMap::new();
        map.insert(key.clone(), 7);

        let json = serde_json::to_string(&map).unwrap();
        assert_eq!(json, r#"{"figure:00000001:0:a.tex":7}"#);

        let back: std::collections::BTreeMap<ElementKey, i32> =
            serde_json::from_str(&json).unwrap();
        assert_eq!(back.get(&key), Some(&7));
    }

    #[test]
    fn test_identify_assigns_occurrence_per_file_and_kind() {
        let doc = identify(vec![
            element(ElementKind::Sentence, "a.tex", 0, "Same."),
            element(ElementKind::Sentence, "a.tex", 1, "Same."),
            element(ElementKind::Section, "a.tex", 2, "Same."),
            element(ElementKind::Sentence, "b.tex", 0, "Same."),
            element(ElementKind::Sentence, "a.tex", 3, "Same."),
        ]);

        let occurrences: Vec<u32> = doc.keys().iter().map(|k| k.occurrence()).collect();
        assert_eq!(occurrences, vec![0, 1, 0, 0, 2]);
        assert_eq!(doc.key_set().len(), 5);
    }

    #[test]
    fn test_identify_is_deterministic() {
        let elements = vec![
            element(ElementKind::Sentence, "a.tex", 0, "One."),
            element(ElementKind::Sentence, "a.tex", 1, "Two."),
        ];

        let first = identify(elements.clone());
        let second = identify(elements);

        assert_eq!(first.keys(), second.keys());
    }

    #[test]
    fn test_key_survives_position_change() {
        let before = identify(vec![element(ElementKind::Sentence, "a.tex", 0, "Stable.")]);
        let after = identify(vec![element(ElementKind::Sentence, "a.tex", 9, "Stable.")]);

        assert_eq!(before.keys(), after.keys());
    }

    #[test]
    fn test_lookup_by_key_and_position() {
        let doc = identify(vec![
            element(ElementKind::Section, "a.tex", 0, "Intro"),
            element(ElementKind::Sentence, "a.tex", 1, "Body."),
        ]);

        let key = doc.keys()[1].clone();
        assert_eq!(doc.get(&key).unwrap().content, "Body.");
        assert_eq!(doc.position(&key), Some(1));

        assert_eq!(doc.key_at(1), Some(&key));
        assert_eq!(doc.key_at(2), None);
    }

    #[test]
    fn test_sentences_and_keys_where() {
        let doc = identify(vec![
            element(ElementKind::Section, "a.tex", 0, "Intro"),
            element(ElementKind::Sentence, "a.tex", 1, "Body."),
            element(ElementKind::Figure, "a.tex", 2, ""),
        ]);

        assert_eq!(doc.sentences().count(), 1);
        assert_eq!(doc.keys_where(|k| k.is_section()).len(), 1);
        assert_eq!(doc.keys_where(|_| true), doc.key_set());
    }
}
