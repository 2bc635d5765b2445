use super::table::{CombRule, Forcefield, LabelKind, ModelKind, OrderRule, ParamName, TermType};
use crate::models::coords::CoordKind;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ParamLoadError {
    #[error("File I/O error for '{path}': {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("TOML parsing error for '{path}': {source}")]
    Toml {
        path: String,
        source: toml::de::Error,
    },
    #[error("CSV parsing error for '{path}': {source}")]
    Csv { path: String, source: csv::Error },
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "kebab-case")]
struct ForcefieldDocument {
    #[serde(default)]
    terms: Vec<TermSection>,
    #[serde(default)]
    combination_rules: Vec<CombRuleSection>,
    #[serde(default)]
    scale_factors: Vec<ScaleSection>,
    #[serde(default)]
    links: Vec<LinkSection>,
}

#[derive(Debug, Deserialize)]
struct TermSection {
    model: ModelKind,
    coord: CoordKind,
    #[serde(default)]
    labels: LabelKind,
    order: Option<OrderRule>,
    #[serde(default)]
    entries: Vec<EntrySection>,
}

#[derive(Debug, Deserialize)]
struct EntrySection {
    types: Vec<usize>,
    values: HashMap<ParamName, Vec<f64>>,
}

#[derive(Debug, Deserialize)]
struct CombRuleSection {
    model: ModelKind,
    param: ParamName,
    rule: CombRule,
}

#[derive(Debug, Deserialize)]
struct ScaleSection {
    model: ModelKind,
    coord: CoordKind,
    factor: f64,
}

#[derive(Debug, Deserialize)]
struct LinkSection {
    from: TermType,
    to: TermType,
}

#[derive(Debug, Deserialize)]
struct ClassRecord {
    #[serde(rename = "type")]
    atom_type: usize,
    class: usize,
}

impl Forcefield {
    /// Loads a force field from the crate's own TOML document (terms,
    /// rules, scale factors, links, parameter entries) plus a CSV table of
    /// `type,class` records.
    pub fn load(params_path: &Path, classes_path: &Path) -> Result<Self, ParamLoadError> {
        let document = Self::load_document(params_path)?;
        let type_to_class = Self::load_class_csv(classes_path)?;
        Ok(Self::from_document(document, type_to_class))
    }

    fn load_document(path: &Path) -> Result<ForcefieldDocument, ParamLoadError> {
        let content = std::fs::read_to_string(path).map_err(|e| ParamLoadError::Io {
            path: path.to_string_lossy().to_string(),
            source: e,
        })?;
        toml::from_str(&content).map_err(|e| ParamLoadError::Toml {
            path: path.to_string_lossy().to_string(),
            source: e,
        })
    }

    fn load_class_csv(path: &Path) -> Result<HashMap<usize, usize>, ParamLoadError> {
        let mut reader = csv::Reader::from_path(path).map_err(|e| ParamLoadError::Csv {
            path: path.to_string_lossy().to_string(),
            source: e,
        })?;

        let mut type_to_class = HashMap::new();
        for result in reader.deserialize::<ClassRecord>() {
            let record = result.map_err(|e| ParamLoadError::Csv {
                path: path.to_string_lossy().to_string(),
                source: e,
            })?;
            type_to_class.insert(record.atom_type, record.class);
        }
        Ok(type_to_class)
    }

    fn from_document(document: ForcefieldDocument, type_to_class: HashMap<usize, usize>) -> Self {
        let mut ff = Forcefield::new();
        ff.type_to_class = type_to_class;

        for section in document.terms {
            let term = TermType::new(section.model, section.coord);
            ff.register_term(term, section.labels, section.order);
            for entry in section.entries {
                for (param, values) in entry.values {
                    ff.params.insert(term, param, entry.types.clone(), values);
                }
            }
        }
        for rule in document.combination_rules {
            ff.comb_rules.insert((rule.model, rule.param), rule.rule);
        }
        for scale in document.scale_factors {
            ff.scale_factors
                .insert(TermType::new(scale.model, scale.coord), scale.factor);
        }
        // Links run last so every explicit entry is already in place.
        for link in document.links {
            ff.link_terms(link.to, link.from);
        }
        ff
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    const PARAMS_TOML: &str = r#"
        [[terms]]
        model = "harmonic-oscillator"
        coord = "bond"
        labels = "class"
        order = "sorted"

        [[terms.entries]]
        types = [1, 3]
        values = { force-constant = [600.0], equilibrium = [1.09] }

        [[terms]]
        model = "lennard-jones"
        coord = "pair"
        labels = "type"
        order = "sorted"

        [[terms.entries]]
        types = [7]
        values = { sigma = [3.4], epsilon = [0.1] }

        [[combination-rules]]
        model = "lennard-jones"
        param = "sigma"
        rule = "arithmetic-mean"

        [[combination-rules]]
        model = "lennard-jones"
        param = "epsilon"
        rule = "geometric-mean"

        [[scale-factors]]
        model = "lennard-jones"
        coord = "pair14"
        factor = 0.5

        [[links]]
        from = { model = "lennard-jones", coord = "pair" }
        to = { model = "lennard-jones", coord = "pair14" }
    "#;

    const CLASSES_CSV: &str = "type,class\n7,1\n8,1\n9,2\n";

    #[test]
    fn load_builds_terms_rules_and_classes() {
        let dir = tempdir().unwrap();
        let params_path = dir.path().join("forcefield.toml");
        let classes_path = dir.path().join("classes.csv");
        fs::write(&params_path, PARAMS_TOML).unwrap();
        fs::write(&classes_path, CLASSES_CSV).unwrap();

        let ff = Forcefield::load(&params_path, &classes_path).unwrap();

        assert!(ff.terms.contains(&TermType::HARMONIC_BOND));
        assert_eq!(
            ff.label_kinds.get(&TermType::HARMONIC_BOND),
            Some(&LabelKind::Class)
        );
        assert_eq!(
            ff.order_rules.get(&TermType::HARMONIC_BOND),
            Some(&OrderRule::Sorted)
        );
        assert_eq!(
            ff.params
                .get(TermType::HARMONIC_BOND, ParamName::ForceConstant, &[1, 3]),
            Some([600.0].as_slice())
        );
        assert_eq!(
            ff.comb_rules
                .get(&(ModelKind::LennardJones, ParamName::Sigma)),
            Some(&CombRule::ArithmeticMean)
        );
        assert_eq!(
            ff.scale_factors.get(&TermType::LENNARD_JONES_PAIR14),
            Some(&0.5)
        );
        assert_eq!(ff.type_to_class.get(&7), Some(&1));
        assert_eq!(ff.type_to_class.get(&9), Some(&2));
    }

    #[test]
    fn load_applies_links_after_entries() {
        let dir = tempdir().unwrap();
        let params_path = dir.path().join("forcefield.toml");
        let classes_path = dir.path().join("classes.csv");
        fs::write(&params_path, PARAMS_TOML).unwrap();
        fs::write(&classes_path, CLASSES_CSV).unwrap();

        let ff = Forcefield::load(&params_path, &classes_path).unwrap();

        // The 1-4 term inherits the general pair entries through the link.
        assert!(ff.terms.contains(&TermType::LENNARD_JONES_PAIR14));
        assert_eq!(
            ff.params
                .get(TermType::LENNARD_JONES_PAIR14, ParamName::Sigma, &[7]),
            Some([3.4].as_slice())
        );
    }

    #[test]
    fn load_fails_for_missing_params_file() {
        let dir = tempdir().unwrap();
        let params_path = dir.path().join("absent.toml");
        let classes_path = dir.path().join("classes.csv");
        fs::write(&classes_path, CLASSES_CSV).unwrap();

        let result = Forcefield::load(&params_path, &classes_path);
        assert!(matches!(result, Err(ParamLoadError::Io { .. })));
    }

    #[test]
    fn load_fails_for_malformed_toml() {
        let dir = tempdir().unwrap();
        let params_path = dir.path().join("forcefield.toml");
        let classes_path = dir.path().join("classes.csv");
        fs::write(&params_path, "this is not toml").unwrap();
        fs::write(&classes_path, CLASSES_CSV).unwrap();

        let result = Forcefield::load(&params_path, &classes_path);
        assert!(matches!(result, Err(ParamLoadError::Toml { .. })));
    }

    #[test]
    fn load_fails_for_malformed_csv() {
        let dir = tempdir().unwrap();
        let params_path = dir.path().join("forcefield.toml");
        let classes_path = dir.path().join("classes.csv");
        fs::write(&params_path, PARAMS_TOML).unwrap();
        fs::write(&classes_path, "type,class\n7\n").unwrap();

        let result = Forcefield::load(&params_path, &classes_path);
        assert!(matches!(result, Err(ParamLoadError::Csv { .. })));
    }
}
