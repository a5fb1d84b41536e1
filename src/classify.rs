//! Lookup tables for indicator categories and province regions.
//!
//! Both tables are explicit: an indicator or province that no rule covers is
//! reported as unclassified instead of landing in a catch-all bucket.

use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Category {
    Screening,
    Diagnosis,
    Treatment,
    ViralSuppression,
    Prevention,
    Unclassified,
}

impl Category {
    pub fn label(self) -> &'static str {
        match self {
            Category::Screening => "Dépistage",
            Category::Diagnosis => "Diagnostic",
            Category::Treatment => "Traitement",
            Category::ViralSuppression => "Suppression Virale",
            Category::Prevention => "Prévention",
            Category::Unclassified => "Non classé",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

enum Keyword {
    /// Matches anywhere in the folded name.
    Substring(&'static str),
    /// Matches a whole word only.
    Word(&'static str),
}

/// Rules are tried in order; the first match wins. Viral load comes before
/// treatment because its indicator names also mention TAR.
const CATEGORY_RULES: &[(Category, &[Keyword])] = &[
    (
        Category::ViralSuppression,
        &[Keyword::Substring("charge virale")],
    ),
    (
        Category::Screening,
        &[Keyword::Substring("test"), Keyword::Substring("depist")],
    ),
    (
        Category::Diagnosis,
        &[
            Keyword::Substring("vih+"),
            Keyword::Substring("diagnostiq"),
            Keyword::Word("pcr"),
        ],
    ),
    (
        Category::Treatment,
        &[
            Keyword::Word("tar"),
            Keyword::Word("arv"),
            Keyword::Substring("traitement"),
        ],
    ),
    (
        Category::Prevention,
        &[
            Keyword::Substring("preservatif"),
            Keyword::Substring("prevention"),
            Keyword::Word("prep"),
            Keyword::Word("ptme"),
        ],
    ),
];

/// Category of an indicator name.
pub fn categorize(indicator: &str) -> Category {
    let folded = fold(indicator);
    let words: Vec<&str> = folded
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .collect();

    CATEGORY_RULES
        .iter()
        .find(|(_, keywords)| {
            keywords.iter().any(|k| match k {
                Keyword::Substring(s) => folded.contains(s),
                Keyword::Word(w) => words.contains(w),
            })
        })
        .map_or(Category::Unclassified, |(category, _)| *category)
}

/// Categorize every indicator, warning once per unmatched name.
pub fn categorize_all<'a>(indicators: &'a [String]) -> Vec<(&'a str, Category)> {
    indicators
        .iter()
        .map(|name| {
            let category = categorize(name);
            if category == Category::Unclassified {
                log::warn!("Indicator not covered by any category rule: '{}'", name);
            }
            (name.as_str(), category)
        })
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Region {
    West,
    East,
    North,
    South,
    Centre,
}

impl Region {
    pub fn label(self) -> &'static str {
        match self {
            Region::West => "Ouest",
            Region::East => "Est",
            Region::North => "Nord",
            Region::South => "Sud",
            Region::Centre => "Centre",
        }
    }
}

/// The 26 provinces, keyed by their folded name.
const PROVINCE_REGIONS: &[(&str, Region)] = &[
    ("kinshasa", Region::West),
    ("kongo-central", Region::West),
    ("kwango", Region::West),
    ("kwilu", Region::West),
    ("mai-ndombe", Region::West),
    ("nord-kivu", Region::East),
    ("sud-kivu", Region::East),
    ("maniema", Region::East),
    ("ituri", Region::East),
    ("equateur", Region::North),
    ("mongala", Region::North),
    ("nord-ubangi", Region::North),
    ("sud-ubangi", Region::North),
    ("tshuapa", Region::North),
    ("tshopo", Region::North),
    ("haut-katanga", Region::South),
    ("haut-lomami", Region::South),
    ("lualaba", Region::South),
    ("tanganyika", Region::South),
    ("kasai", Region::Centre),
    ("kasai-central", Region::Centre),
    ("kasai-oriental", Region::Centre),
    ("lomami", Region::Centre),
    ("sankuru", Region::Centre),
    ("bas-uele", Region::Centre),
    ("haut-uele", Region::Centre),
];

/// Region of a province; `None` for a name outside the table.
pub fn region_of(province: &str) -> Option<Region> {
    let key = fold(province).replace(' ', "-");
    PROVINCE_REGIONS
        .iter()
        .find(|(name, _)| *name == key)
        .map(|(_, region)| *region)
}

/// Row of the province reference table.
#[derive(Debug, Clone, Serialize)]
pub struct ProvinceCode {
    pub code: String,
    pub province: String,
    pub region: Option<Region>,
}

impl ProvinceCode {
    pub fn region_label(&self) -> &'static str {
        self.region.map_or("Non classé", Region::label)
    }
}

/// Codes `P01`, `P02`, ... assigned in alphabetical order.
pub fn province_codes(provinces: &[String]) -> Vec<ProvinceCode> {
    let mut sorted = provinces.to_vec();
    sorted.sort();
    sorted.dedup();
    sorted
        .into_iter()
        .enumerate()
        .map(|(i, province)| {
            let region = region_of(&province);
            if region.is_none() {
                log::warn!("Province without a region: '{}'", province);
            }
            ProvinceCode {
                code: format!("P{:02}", i + 1),
                province,
                region,
            }
        })
        .collect()
}

/// Lowercase with French accents removed.
fn fold(text: &str) -> String {
    text.trim()
        .to_lowercase()
        .chars()
        .map(|c| match c {
            'à' | 'â' | 'ä' => 'a',
            'é' | 'è' | 'ê' | 'ë' => 'e',
            'î' | 'ï' => 'i',
            'ô' | 'ö' => 'o',
            'ù' | 'û' | 'ü' => 'u',
            'ç' => 'c',
            other => other,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_indicators_map_to_their_category() {
        let cases = [
            ("Nombre de clients testés", Category::Screening),
            ("Nombre de clients testés (Communautaire)", Category::Screening),
            ("Nombre de personnes dépistées", Category::Screening),
            ("Nombre de clients diagnostiqués VIH+", Category::Diagnosis),
            (
                "Nombre de nouveau-nés exposés ayant bénéficié de la PCR dans les deux mois de vie",
                Category::Diagnosis,
            ),
            ("Nombre de PVVIH sous TAR", Category::Treatment),
            (
                "Nombre de femmes enceintes séropositives ayant reçu des ARV pour la PTME",
                Category::Treatment,
            ),
            ("Nombre de patients mis sous traitement", Category::Treatment),
            (
                "Nombre  de PVVIH sous TAR qui ont supprimée la charge virale",
                Category::ViralSuppression,
            ),
            ("Nombre de préservatifs masculins distribués", Category::Prevention),
            ("Nombre de préservatifs féminins distribués", Category::Prevention),
            ("Nombre de clients sous PrEP", Category::Prevention),
            ("Activités de prévention réalisées", Category::Prevention),
        ];
        for (name, expected) in cases {
            assert_eq!(categorize(name), expected, "{name}");
        }
    }

    #[test]
    fn unknown_indicators_are_unclassified() {
        assert_eq!(categorize("Nombre de réunions tenues"), Category::Unclassified);
        // "tar" only counts as a whole word.
        assert_eq!(categorize("Nombre de retards signalés"), Category::Unclassified);
        assert_eq!(Category::Unclassified.label(), "Non classé");

        let names = vec!["Nombre de clients testés".to_string(), "Autre".to_string()];
        let all = categorize_all(&names);
        assert_eq!(all[1], ("Autre", Category::Unclassified));
    }

    #[test]
    fn every_province_has_a_region() {
        assert_eq!(PROVINCE_REGIONS.len(), 26);
        assert_eq!(region_of("Kinshasa"), Some(Region::West));
        assert_eq!(region_of("Équateur"), Some(Region::North));
        assert_eq!(region_of("Equateur"), Some(Region::North));
        assert_eq!(region_of("Kasaï-Oriental"), Some(Region::Centre));
        assert_eq!(region_of(" nord kivu "), Some(Region::East));
        assert_eq!(region_of("Haut-Katanga"), Some(Region::South));
        assert_eq!(region_of("Atlantide"), None);
    }

    #[test]
    fn province_codes_are_sequential() {
        let provinces: Vec<String> = ["Kinshasa", "Ituri", "Kinshasa", "Inconnue"]
            .map(String::from)
            .to_vec();
        let codes = province_codes(&provinces);
        assert_eq!(codes.len(), 3);
        assert_eq!(codes[0].code, "P01");
        assert_eq!(codes[0].province, "Inconnue");
        assert_eq!(codes[0].region_label(), "Non classé");
        assert_eq!(codes[2].code, "P03");
        assert_eq!(codes[2].region_label(), "Ouest");
    }
}
