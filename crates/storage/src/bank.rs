//! Loads a question bank from a directory of JSON files.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use quiz_core::model::{BankError, QuestionBank, QuestionSet, QuestionSetId};
use thiserror::Error;

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum BankLoadError {
    #[error("cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid question set {path}: {source}")]
    Invalid {
        path: PathBuf,
        #[source]
        source: BankError,
    },

    #[error(transparent)]
    Bank(#[from] BankError),
}

/// Read every `*.json` file in `dir` as one question set.
///
/// Files are loaded in file-name order and each set's id is the file stem,
/// so `test1.json` becomes `test1`.
///
/// # Errors
///
/// Returns `BankLoadError` if the directory or a file cannot be read, or if a
/// file is not a valid question set.
pub fn load_bank_dir(dir: impl AsRef<Path>) -> Result<QuestionBank, BankLoadError> {
    let dir = dir.as_ref();
    let io_err = |path: &Path| {
        let path = path.to_path_buf();
        move |source| BankLoadError::Io { path, source }
    };

    let mut paths = Vec::new();
    for entry in fs::read_dir(dir).map_err(io_err(dir))? {
        let path = entry.map_err(io_err(dir))?.path();
        if path.is_file() && path.extension().is_some_and(|ext| ext == "json") {
            paths.push(path);
        }
    }
    paths.sort();

    let mut bank = QuestionBank::new();
    for path in paths {
        let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
            log::warn!("skipping bank file with non UTF-8 name: {}", path.display());
            continue;
        };
        let id = QuestionSetId::new(stem);
        let raw = fs::read_to_string(&path).map_err(io_err(&path))?;
        let set = QuestionSet::from_json(&raw).map_err(|source| BankLoadError::Invalid {
            path: path.clone(),
            source,
        })?;
        log::debug!("loaded {} ({} questions)", id, set.len());
        bank.insert(id, set)?;
    }

    Ok(bank)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SET_A: &str = r#"{"titulo": "Tema A", "preguntas": [
        {"enunciado": "Q1", "opciones": ["a", "b"], "respuesta": 1}
    ]}"#;

    const SET_B: &str = r#"{"titulo": "Tema B", "preguntas": [
        {"enunciado": "Q1", "opciones": ["a", "b"], "respuesta": 2},
        {"enunciado": "Q2", "opciones": ["a", "b"], "respuesta": 1}
    ]}"#;

    #[test]
    fn loads_json_files_in_name_order() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("test2.json"), SET_B).unwrap();
        fs::write(dir.path().join("test1.json"), SET_A).unwrap();
        fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let bank = load_bank_dir(dir.path()).unwrap();
        let ids: Vec<_> = bank.iter().map(|(id, set)| (id.as_str(), set.title())).collect();
        assert_eq!(ids, [("test1", "Tema A"), ("test2", "Tema B")]);
        assert_eq!(bank.total_questions(), 3);
    }

    #[test]
    fn invalid_file_reports_its_path() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("bad.json"), r#"{"titulo": "X", "preguntas": 3}"#).unwrap();

        let err = load_bank_dir(dir.path()).unwrap_err();
        match err {
            BankLoadError::Invalid { path, .. } => assert!(path.ends_with("bad.json")),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn missing_directory_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_bank_dir(dir.path().join("nope")).unwrap_err();
        assert!(matches!(err, BankLoadError::Io { .. }));
    }
}
