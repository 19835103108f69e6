use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::timetable::model::Objective;

/// subject -> category -> objectives
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ObjectiveCatalog(pub BTreeMap<String, BTreeMap<String, Vec<Objective>>>);

/// subject -> year group -> ordered theme names
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ThemeTable(pub BTreeMap<String, BTreeMap<String, Vec<String>>>);

fn objective(id: &str, code: &str, description: &str) -> Objective {
    Objective {
        id: id.to_string(),
        code: code.to_string(),
        description: description.to_string(),
    }
}

impl Default for ObjectiveCatalog {
    fn default() -> Self {
        let mut subjects = BTreeMap::new();

        let mut english = BTreeMap::new();
        english.insert(
            "Reading".to_string(),
            vec![
                objective("eng-r1", "R1", "Identify and interpret explicit and implicit information"),
                objective("eng-r2", "R2", "Explain how writers use language and structure"),
                objective("eng-r3", "R3", "Compare writers' ideas and perspectives"),
            ],
        );
        english.insert(
            "Writing".to_string(),
            vec![
                objective("eng-w1", "W1", "Communicate clearly for purpose and audience"),
                objective("eng-w2", "W2", "Use a range of vocabulary and sentence structures"),
            ],
        );
        subjects.insert("English".to_string(), english);

        let mut maths = BTreeMap::new();
        maths.insert(
            "Number".to_string(),
            vec![
                objective("ma-n1", "N1", "Order positive and negative integers, decimals and fractions"),
                objective("ma-n2", "N2", "Apply the four operations to integers and fractions"),
            ],
        );
        maths.insert(
            "Algebra".to_string(),
            vec![
                objective("ma-a1", "A1", "Use and interpret algebraic notation"),
                objective("ma-a2", "A2", "Solve linear equations in one unknown"),
            ],
        );
        subjects.insert("Maths".to_string(), maths);

        let mut science = BTreeMap::new();
        science.insert(
            "Working Scientifically".to_string(),
            vec![
                objective("sc-ws1", "WS1", "Plan investigations and identify variables"),
                objective("sc-ws2", "WS2", "Present observations and data using appropriate methods"),
            ],
        );
        science.insert(
            "Biology".to_string(),
            vec![objective("sc-b1", "B1", "Describe cell structure and function")],
        );
        subjects.insert("Science".to_string(), science);

        Self(subjects)
    }
}

impl ObjectiveCatalog {
    pub fn for_subject(&self, subject: &str) -> Option<&BTreeMap<String, Vec<Objective>>> {
        self.0.get(subject)
    }

    pub fn find(&self, objective_id: &str) -> Option<&Objective> {
        self.0
            .values()
            .flat_map(|categories| categories.values())
            .flatten()
            .find(|o| o.id == objective_id)
    }
}

fn themes(names: &[&str]) -> Vec<String> {
    names.iter().map(|n| n.to_string()).collect()
}

impl Default for ThemeTable {
    fn default() -> Self {
        let mut subjects = BTreeMap::new();

        let mut english = BTreeMap::new();
        english.insert(
            "Year 7".to_string(),
            themes(&["Myths and Legends", "Poetry of Place", "Shakespeare Comedies"]),
        );
        english.insert(
            "Year 8".to_string(),
            themes(&["Gothic Fiction", "War Poetry", "Persuasive Writing"]),
        );
        english.insert(
            "Year 9".to_string(),
            themes(&["Dystopian Fiction", "Shakespeare Tragedies", "Non-fiction Voices"]),
        );
        subjects.insert("English".to_string(), english);

        let mut maths = BTreeMap::new();
        maths.insert(
            "Year 7".to_string(),
            themes(&["Place Value", "Fractions", "Algebraic Thinking"]),
        );
        maths.insert(
            "Year 8".to_string(),
            themes(&["Proportional Reasoning", "Linear Equations", "Geometry"]),
        );
        subjects.insert("Maths".to_string(), maths);

        let mut science = BTreeMap::new();
        science.insert("Year 7".to_string(), themes(&["Cells", "Particles", "Forces"]));
        science.insert(
            "Year 8".to_string(),
            themes(&["Digestion", "Chemical Reactions", "Energy"]),
        );
        subjects.insert("Science".to_string(), science);

        Self(subjects)
    }
}

impl ThemeTable {
    pub fn themes_for(&self, subject: &str, year_group: &str) -> &[String] {
        self.0
            .get(subject)
            .and_then(|by_year| by_year.get(year_group))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_lookup_by_subject_and_id() {
        let catalog = ObjectiveCatalog::default();
        let english = catalog.for_subject("English").expect("english");
        assert!(english.contains_key("Reading"));
        assert_eq!(catalog.find("ma-a2").map(|o| o.code.as_str()), Some("A2"));
        assert!(catalog.find("nope").is_none());
        assert!(catalog.for_subject("Latin").is_none());
    }

    #[test]
    fn theme_table_falls_back_to_empty() {
        let table = ThemeTable::default();
        assert_eq!(table.themes_for("Science", "Year 7").len(), 3);
        assert!(table.themes_for("Science", "Year 13").is_empty());
        assert!(table.themes_for("Latin", "Year 7").is_empty());
    }
}
