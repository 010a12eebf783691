use std::path::{Path, PathBuf};

use tracing::info;

use crate::error::ContentError;
use crate::packs::{DictionaryPack, QuestionPack, RankingPack};
use crate::validate::{validate_dictionary_pack, validate_question_pack, validate_ranking_pack};

/// Reads and validates the three content pack files for one locale out of
/// a `Content/` directory, once, at startup. Any I/O, parse, or validation
/// failure is returned rather than swallowed; the caller (the server's
/// `main`) is expected to treat it as fatal.
#[derive(Debug, Clone)]
pub struct ContentDir {
    root: PathBuf,
}

impl ContentDir {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn load_question_pack(&self, locale: &str) -> Result<QuestionPack, ContentError> {
        let path = self.root.join(format!("questions.{locale}.json"));
        let pack: QuestionPack = read_and_parse(&path)?;
        let problems = validate_question_pack(&pack);
        if !problems.is_empty() {
            return Err(ContentError::Invalid { path, problems });
        }
        info!(locale, count = pack.questions.len(), "loaded question pack");
        Ok(pack)
    }

    pub fn load_dictionary_pack(&self, locale: &str) -> Result<DictionaryPack, ContentError> {
        let path = self.root.join(format!("dictionary.{locale}.json"));
        let pack: DictionaryPack = read_and_parse(&path)?;
        let problems = validate_dictionary_pack(&pack);
        if !problems.is_empty() {
            return Err(ContentError::Invalid { path, problems });
        }
        info!(locale, count = pack.entries.len(), "loaded dictionary pack");
        Ok(pack)
    }

    pub fn load_ranking_pack(&self, locale: &str) -> Result<RankingPack, ContentError> {
        let path = self.root.join(format!("rankingstars.{locale}.json"));
        let pack: RankingPack = read_and_parse(&path)?;
        let problems = validate_ranking_pack(&pack);
        if !problems.is_empty() {
            return Err(ContentError::Invalid { path, problems });
        }
        info!(locale, count = pack.prompts.len(), "loaded ranking pack");
        Ok(pack)
    }
}

fn read_and_parse<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, ContentError> {
    let raw = std::fs::read_to_string(path).map_err(|source| ContentError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&raw).map_err(|source| ContentError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn fixture_dir() -> PathBuf {
        PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
    }

    fn write_fixture(name: &str, contents: &str) -> PathBuf {
        let dir = fixture_dir();
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join(name);
        let mut f = std::fs::File::create(&path).unwrap();
        f.write_all(contents.as_bytes()).unwrap();
        path
    }

    #[test]
    fn test_load_question_pack_missing_file_is_io_error() {
        let dir = ContentDir::new(fixture_dir().join("does-not-exist"));
        let err = dir.load_question_pack("en").unwrap_err();
        assert!(matches!(err, ContentError::Io { .. }));
    }

    #[test]
    fn test_load_question_pack_malformed_json_is_parse_error() {
        write_fixture("questions.zz.json", "{not json");
        let dir = ContentDir::new(fixture_dir());
        let err = dir.load_question_pack("zz").unwrap_err();
        assert!(matches!(err, ContentError::Parse { .. }));
    }

    #[test]
    fn test_load_question_pack_invalid_contents_names_file_and_problems() {
        write_fixture(
            "questions.yy.json",
            r#"{"schemaVersion":1,"packId":"p","title":"t","locale":"yy","tags":[],"questions":[]}"#,
        );
        let dir = ContentDir::new(fixture_dir());
        let err = dir.load_question_pack("yy").unwrap_err();
        match err {
            ContentError::Invalid { path, problems } => {
                assert!(path.to_string_lossy().contains("questions.yy.json"));
                assert!(problems.iter().any(|p| p.contains("no questions")));
            }
            other => panic!("expected Invalid, got {other:?}"),
        }
    }

    #[test]
    fn test_load_question_pack_accepts_well_formed_fixture() {
        write_fixture(
            "questions.xx.json",
            r#"{"schemaVersion":1,"packId":"p","title":"t","locale":"xx","tags":[],
               "questions":[{"id":"q1","text":"2+2?","difficulty":1,
               "options":[{"key":"A","text":"3"},{"key":"B","text":"4"},{"key":"C","text":"5"},{"key":"D","text":"6"}],
               "correctOptionKey":"B","category":"math"}]}"#,
        );
        let dir = ContentDir::new(fixture_dir());
        let pack = dir.load_question_pack("xx").unwrap();
        assert_eq!(pack.questions.len(), 1);
    }
}
