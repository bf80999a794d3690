//! # bobsim-engine::scenario
//!
//! Loads a scenario file (YAML or TOML, chosen by extension) into a
//! validated `Scenario`, ready for `crate::network::Network::from_scenario`.

use bobsim_types::errors::LoadError;
use bobsim_types::scenario::Scenario;
use std::path::Path;

pub fn load(path: &Path) -> Result<Scenario, LoadError> {
    let content = std::fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.display().to_string(),
        source,
    })?;

    let scenario: Scenario = match path.extension().and_then(|s| s.to_str()) {
        Some("yaml") | Some("yml") => serde_yaml::from_str(&content).map_err(|source| LoadError::Parse {
            path: path.display().to_string(),
            format: "YAML",
            source: Box::new(source),
        })?,
        Some("toml") => toml::from_str(&content).map_err(|source| LoadError::Parse {
            path: path.display().to_string(),
            format: "TOML",
            source: Box::new(source),
        })?,
        other => {
            return Err(LoadError::UnknownFormat(
                other.map(|s| s.to_string()).unwrap_or_else(|| path.display().to_string()),
            ))
        }
    };

    scenario.validate()?;
    Ok(scenario)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn rejects_unknown_extension() {
        let mut f = tempfile::Builder::new().suffix(".txt").tempfile().unwrap();
        writeln!(f, "name: x").unwrap();
        let err = load(f.path()).unwrap_err();
        assert!(matches!(err, LoadError::UnknownFormat(_)));
    }

    #[test]
    fn loads_minimal_yaml_scenario() {
        let mut f = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
        writeln!(
            f,
            "name: t\nnodes:\n  - name: a\n    behavior: sink\n"
        )
        .unwrap();
        let scenario = load(f.path()).unwrap();
        assert_eq!(scenario.name, "t");
        assert_eq!(scenario.nodes.len(), 1);
    }

    #[test]
    fn rejects_yaml_with_duplicate_node_names() {
        let mut f = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
        writeln!(
            f,
            "name: t\nnodes:\n  - name: a\n    behavior: sink\n  - name: a\n    behavior: sink\n"
        )
        .unwrap();
        assert!(load(f.path()).is_err());
    }
}
