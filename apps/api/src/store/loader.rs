use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;

use tracing::info;

use crate::models::case::Case;
use crate::models::template::TemplateKind;
use crate::store::ResourceError;

pub const CODEBOOK_FILE: &str = "data/codebook.txt";
pub const CASES_FILE: &str = "data/tiered_weighted_cases.json";
pub const TEMPLATES_DIR: &str = "templates";

/// Searches an ordered list of roots for relative resource paths.
#[derive(Debug, Clone)]
pub struct ResourceLocator {
    roots: Vec<PathBuf>,
}

impl ResourceLocator {
    /// Default search order: the configured root (if any), the working
    /// directory, `apps/api` (running from the workspace root), the parent
    /// directory, then the crate's own directory.
    pub fn new(configured_root: Option<PathBuf>) -> Self {
        let mut roots: Vec<PathBuf> = configured_root.into_iter().collect();
        roots.extend([
            PathBuf::from("."),
            PathBuf::from("apps/api"),
            PathBuf::from(".."),
            PathBuf::from(env!("CARGO_MANIFEST_DIR")),
        ]);
        Self::with_roots(roots)
    }

    pub fn with_roots(roots: Vec<PathBuf>) -> Self {
        Self { roots }
    }

    pub fn candidates(&self, relative: &str) -> Vec<PathBuf> {
        self.roots.iter().map(|root| root.join(relative)).collect()
    }

    pub fn load_codebook(&self) -> Result<String, ResourceError> {
        let (path, text) = read_first("codebook.txt", &self.candidates(CODEBOOK_FILE))?;
        info!("Successfully loaded codebook from: {}", path.display());
        Ok(text)
    }

    pub fn load_cases(&self) -> Result<Vec<Case>, ResourceError> {
        let (path, text) =
            read_first("tiered_weighted_cases.json", &self.candidates(CASES_FILE))?;
        let cases: Vec<Case> =
            serde_json::from_str(&text).map_err(|source| ResourceError::Json {
                path: path.clone(),
                source,
            })?;
        info!(
            "Successfully loaded {} case studies from: {}",
            cases.len(),
            path.display()
        );
        Ok(cases)
    }

    pub fn load_template(&self, kind: TemplateKind) -> Result<String, ResourceError> {
        let relative = format!("{TEMPLATES_DIR}/{}", kind.file_name());
        let (path, text) = read_first(kind.file_name(), &self.candidates(&relative))?;
        info!("Successfully loaded template from: {}", path.display());
        Ok(text)
    }
}

/// Returns the first candidate that exists along with its contents.
/// Only "not found" moves on to the next candidate; any other I/O error is fatal.
pub fn read_first(
    resource: &str,
    candidates: &[PathBuf],
) -> Result<(PathBuf, String), ResourceError> {
    for path in candidates {
        match fs::read_to_string(path) {
            Ok(text) => return Ok((path.clone(), text)),
            Err(e) if e.kind() == ErrorKind::NotFound => continue,
            Err(source) => {
                return Err(ResourceError::Io {
                    path: path.clone(),
                    source,
                })
            }
        }
    }

    Err(ResourceError::NotFound {
        resource: resource.to_string(),
        attempted: candidates.to_vec(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write(dir: &TempDir, relative: &str, contents: &str) {
        let path = dir.path().join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, contents).unwrap();
    }

    #[test]
    fn test_first_existing_candidate_wins() {
        let first = TempDir::new().unwrap();
        let second = TempDir::new().unwrap();
        write(&first, CODEBOOK_FILE, "first codebook");
        write(&second, CODEBOOK_FILE, "second codebook");

        let locator = ResourceLocator::with_roots(vec![
            PathBuf::from("/nonexistent/root"),
            first.path().to_path_buf(),
            second.path().to_path_buf(),
        ]);
        assert_eq!(locator.load_codebook().unwrap(), "first codebook");
    }

    #[test]
    fn test_missing_codebook_names_every_attempted_path() {
        let empty_a = TempDir::new().unwrap();
        let empty_b = TempDir::new().unwrap();
        let locator = ResourceLocator::with_roots(vec![
            empty_a.path().to_path_buf(),
            empty_b.path().to_path_buf(),
        ]);

        let err = locator.load_codebook().unwrap_err();
        match &err {
            ResourceError::NotFound {
                resource,
                attempted,
            } => {
                assert_eq!(resource, "codebook.txt");
                assert_eq!(attempted.len(), 2);
            }
            other => panic!("expected NotFound, got {other:?}"),
        }
        let message = err.to_string();
        assert!(message.contains(&empty_a.path().join(CODEBOOK_FILE).display().to_string()));
        assert!(message.contains(&empty_b.path().join(CODEBOOK_FILE).display().to_string()));
    }

    #[test]
    fn test_cases_load_in_file_order_with_defaults() {
        let dir = TempDir::new().unwrap();
        write(
            &dir,
            CASES_FILE,
            r#"[
                {"id": "02", "gap_text": "b", "tier1_categories": "Cognitive"},
                {"id": "01", "gap_text": "a"}
            ]"#,
        );
        let locator = ResourceLocator::with_roots(vec![dir.path().to_path_buf()]);
        let cases = locator.load_cases().unwrap();
        assert_eq!(cases.len(), 2);
        assert_eq!(cases[0].id, "02");
        assert_eq!(cases[1].id, "01");
        assert_eq!(cases[1].tier1_categories, "");
    }

    #[test]
    fn test_malformed_case_file_is_a_json_error() {
        let dir = TempDir::new().unwrap();
        write(&dir, CASES_FILE, "{not json");
        let locator = ResourceLocator::with_roots(vec![dir.path().to_path_buf()]);
        assert!(matches!(
            locator.load_cases(),
            Err(ResourceError::Json { .. })
        ));
    }

    #[test]
    fn test_template_lookup_by_kind() {
        let dir = TempDir::new().unwrap();
        write(&dir, "templates/base_template.md", "# Base");
        write(&dir, "templates/assessing_risks_template.md", "# Risks");
        let locator = ResourceLocator::with_roots(vec![dir.path().to_path_buf()]);
        assert_eq!(locator.load_template(TemplateKind::Base).unwrap(), "# Base");
        assert_eq!(
            locator.load_template(TemplateKind::AssessingRisks).unwrap(),
            "# Risks"
        );
    }

    #[test]
    fn test_resources_load_from_bundled_data() {
        let locator = ResourceLocator::with_roots(vec![PathBuf::from(env!("CARGO_MANIFEST_DIR"))]);
        let resources = crate::store::Resources::load(&locator).unwrap();
        assert!(resources.codebook.contains("Assessing risks"));
        assert!(!resources.cases.is_empty());
        assert!(resources
            .template(TemplateKind::AssessingRisks)
            .contains("[LLM will insert"));
    }
}
