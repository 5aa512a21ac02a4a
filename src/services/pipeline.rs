use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use crate::error::{Error, Result};
use crate::model::block::Block;
use crate::model::settings::Settings;
use crate::parsers::pattern::{self, BlockPattern, SourceFile};
use crate::services::{
    backend::{BackendError, TranslationBackend},
    cache::{self, hash, store, Cache},
    encoding, rebuild,
    report::TickReport,
    scan::{self, Snapshot},
};

const DETECTION_SAMPLE: usize = 5;

/// Scan → extract → reconcile → translate → write, one tick at a time.
///
/// Owns the snapshot and the cache between ticks. A failing tick returns
/// before anything is merged, so the cache always reflects the last tick
/// that went through completely.
pub struct Pipeline<'a> {
    settings: &'a Settings,
    backend: &'a dyn TranslationBackend,
    pattern: BlockPattern,
    fingerprint: String,
    snapshot: Snapshot,
    cache: Cache,
}

impl<'a> Pipeline<'a> {
    pub fn new(settings: &'a Settings, backend: &'a dyn TranslationBackend) -> Result<Self> {
        let source = settings.pattern_source().ok_or_else(|| {
            Error::Settings(format!("no capture pattern for suffix `{}`", settings.suffix))
        })?;
        let pattern = BlockPattern::new(&source)?;
        let fingerprint = hash::settings_fingerprint(settings, pattern.as_str());

        let cache = match &settings.cache_path {
            Some(path) => store::load(Path::new(path), &fingerprint),
            None => Cache::default(),
        };

        Ok(Pipeline {
            settings,
            backend,
            pattern,
            fingerprint,
            snapshot: Snapshot::new(),
            cache,
        })
    }

    pub fn cache(&self) -> &Cache {
        &self.cache
    }

    pub fn tick(&mut self) -> Result<TickReport> {
        let (changed, snapshot) =
            scan::detect(&self.settings.root_dir(), &self.settings.suffix, &self.snapshot)?;
        let snapshot = self.without_outputs(snapshot);
        let changed: Vec<_> = changed
            .into_iter()
            .filter(|path| snapshot.contains_key(path))
            .collect();
        let removed = scan::removed(&self.snapshot, &snapshot);
        // Committed right away: a failed tick is only retried once a file changes again.
        self.snapshot = snapshot;

        if changed.is_empty() && removed.is_empty() {
            tracing::debug!(event = "tick_idle");
            return Ok(TickReport::default());
        }

        tracing::info!(
            event = "scan_changed",
            changed = changed.len(),
            removed = removed.len()
        );

        let files = self
            .snapshot
            .keys()
            .map(|path| -> Result<SourceFile> {
                Ok(SourceFile {
                    path: path.clone(),
                    content: encoding::read_source(path)?,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        for file in &files {
            tracing::trace!(event = "source_read", path = %file.path.display(), bytes = file.content.len());
        }

        let blocks = pattern::extract(&files, &self.pattern);

        let mut report = self.process(blocks)?;
        report.changed_files = changed.len();
        report.removed_files = removed.len();
        Ok(report)
    }

    /// Runs reconcile, translate and write for freshly extracted blocks.
    pub fn process(&mut self, blocks: Vec<Block>) -> Result<TickReport> {
        let (worklist, pruned) = cache::reconcile(&blocks, &self.cache);

        tracing::info!(
            event = "reconciled",
            extracted = blocks.len(),
            to_translate = worklist.len(),
            kept = pruned.main.len()
        );

        let mut report = TickReport {
            extracted: blocks.len(),
            translated: worklist.len(),
            ..TickReport::default()
        };

        let Some(source) = self.source_lang(&worklist)? else {
            // Nothing was ever translated and nothing is left to translate.
            self.cache = pruned;
            return Ok(report);
        };

        // Every language is translated before anything is merged.
        let mut translated = BTreeMap::new();
        for lang in &self.settings.to_langs {
            let mut pending = cache::backlog(&pruned, lang).to_vec();
            pending.extend(worklist.iter().cloned());

            let blocks = translate_blocks(self.backend, &pending, &source, lang)?;
            if !pending.is_empty() {
                tracing::info!(event = "language_translated", lang = %lang, blocks = blocks.len());
            }
            translated.insert(lang.clone(), blocks);
        }

        let merged = cache::merge(&pruned, &worklist, translated, &source);

        let resource_dir = self.settings.resource_dir();
        for lang in &self.settings.to_langs {
            let path = rebuild::output_path(&resource_dir, &source, lang, &self.settings.suffix);
            rebuild::write(merged.language(lang), &path)?;
            tracing::info!(event = "resource_written", path = %path.display(), blocks = merged.language(lang).len());
            report.written.push(path);
        }

        self.cache = merged;
        if let Some(path) = &self.settings.cache_path {
            store::save(Path::new(path), &self.fingerprint, &self.cache)?;
        }

        report.source_lang = Some(source);
        Ok(report)
    }

    /// Drops files under the resource directory. Generated resources carry
    /// the source suffix and may live inside the scanned root.
    fn without_outputs(&self, snapshot: Snapshot) -> Snapshot {
        let Ok(resource_dir) = fs::canonicalize(self.settings.resource_dir()) else {
            // Nothing has been written yet.
            return snapshot;
        };

        snapshot
            .into_iter()
            .filter(|(path, _)| match fs::canonicalize(path) {
                Ok(path) => !path.starts_with(&resource_dir),
                Err(_) => true,
            })
            .collect()
    }

    /// Configured language, else detected from the worklist, else the one
    /// remembered by the cache.
    fn source_lang(&self, worklist: &[Block]) -> Result<Option<String>> {
        if let Some(lang) = self.settings.main_lang() {
            return Ok(Some(lang.to_string()));
        }

        if worklist.is_empty() {
            return Ok(self.cache.source_lang.clone());
        }

        let sample: Vec<String> = worklist
            .iter()
            .take(DETECTION_SAMPLE)
            .map(|b| b.value.clone())
            .collect();
        let lang = self.backend.detect_language(&sample)?;
        tracing::info!(event = "language_detected", lang = %lang);

        Ok(Some(lang))
    }
}

/// Translates the values of `blocks` in one request and splices them back.
pub fn translate_blocks(
    backend: &dyn TranslationBackend,
    blocks: &[Block],
    source: &str,
    target: &str,
) -> Result<Vec<Block>> {
    if blocks.is_empty() {
        return Ok(Vec::new());
    }

    let texts: Vec<String> = blocks.iter().map(|b| b.value.clone()).collect();
    let translations = backend.translate(&texts, source, target)?;

    if translations.len() != texts.len() {
        return Err(BackendError::LengthMismatch {
            expected: texts.len(),
            got: translations.len(),
        }
        .into());
    }

    Ok(blocks
        .iter()
        .zip(translations)
        .map(|(block, text)| rebuild::splice(block, &text))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parsers::catalog::KEY_VALUE_PATTERN;
    use pretty_assertions::assert_eq;
    use std::cell::RefCell;
    use std::fs;
    use tempfile::{tempdir, TempDir};

    /// Prefixes every string with the target language and records each call.
    #[derive(Default)]
    struct FakeBackend {
        detected: Option<String>,
        fail_for: RefCell<Option<String>>,
        calls: RefCell<Vec<String>>,
    }

    impl FakeBackend {
        fn calls(&self) -> Vec<String> {
            self.calls.borrow().clone()
        }
    }

    impl TranslationBackend for FakeBackend {
        fn translate(
            &self,
            texts: &[String],
            _source: &str,
            target: &str,
        ) -> std::result::Result<Vec<String>, BackendError> {
            self.calls
                .borrow_mut()
                .push(format!("translate:{target}:{}", texts.len()));
            if self.fail_for.borrow().as_deref() == Some(target) {
                return Err(BackendError::Quota("limit reached".into()));
            }
            Ok(texts.iter().map(|t| format!("{target}:{t}")).collect())
        }

        fn detect_language(&self, sample: &[String]) -> std::result::Result<String, BackendError> {
            self.calls
                .borrow_mut()
                .push(format!("detect:{}", sample.len()));
            self.detected.clone().ok_or(BackendError::DetectionFailed)
        }
    }

    /// Returns a fixed number of strings whatever it is asked.
    struct ShortBackend;

    impl TranslationBackend for ShortBackend {
        fn translate(
            &self,
            _texts: &[String],
            _source: &str,
            _target: &str,
        ) -> std::result::Result<Vec<String>, BackendError> {
            Ok(vec!["only one".into()])
        }

        fn detect_language(&self, _sample: &[String]) -> std::result::Result<String, BackendError> {
            Ok("en".into())
        }
    }

    fn settings(dir: &TempDir, langs: &[&str]) -> Settings {
        let root = dir.path().join("src");
        fs::create_dir_all(&root).unwrap();
        Settings {
            api_key: "test".into(),
            root_path: root.to_string_lossy().to_string(),
            resource_path: dir.path().join("resources").to_string_lossy().to_string(),
            suffix: ".properties".into(),
            main_lang: "en".into(),
            to_langs: langs.iter().map(|l| l.to_string()).collect(),
            ..Settings::default()
        }
    }

    fn blocks(text: &str) -> Vec<Block> {
        BlockPattern::new(KEY_VALUE_PATTERN).unwrap().extract_text(text)
    }

    fn output(settings: &Settings, source: &str, target: &str) -> String {
        let path = rebuild::output_path(&settings.resource_dir(), source, target, &settings.suffix);
        fs::read_to_string(path).unwrap()
    }

    #[test]
    fn tick_writes_one_resource_per_language_then_idles() {
        let dir = tempdir().unwrap();
        let settings = settings(&dir, &["ru", "tt"]);
        fs::write(
            settings.root_dir().join("main.properties"),
            "# greeting\nhello=Hello\nbye=Bye\n",
        )
        .unwrap();
        let backend = FakeBackend::default();
        let mut pipeline = Pipeline::new(&settings, &backend).unwrap();

        let report = pipeline.tick().unwrap();

        assert_eq!(report.changed_files, 1);
        assert_eq!(report.translated, 2);
        assert_eq!(report.written.len(), 2);
        assert_eq!(
            output(&settings, "en", "ru"),
            "# greeting\nhello=ru:Hello\nbye=ru:Bye\n"
        );
        assert_eq!(output(&settings, "en", "tt"), "# greeting\nhello=tt:Hello\nbye=tt:Bye\n");

        let again = pipeline.tick().unwrap();
        assert!(again.is_idle());
        assert_eq!(backend.calls(), vec!["translate:ru:2", "translate:tt:2"]);
    }

    #[test]
    fn resources_inside_the_root_are_not_read_back() {
        let dir = tempdir().unwrap();
        let mut settings = settings(&dir, &["ru"]);
        settings.resource_path = settings
            .root_dir()
            .join("resources")
            .to_string_lossy()
            .to_string();
        fs::write(settings.root_dir().join("main.properties"), "a=One\n").unwrap();
        let backend = FakeBackend::default();
        let mut pipeline = Pipeline::new(&settings, &backend).unwrap();

        let first = pipeline.tick().unwrap();
        let second = pipeline.tick().unwrap();
        let third = pipeline.tick().unwrap();

        assert_eq!(first.translated, 1);
        assert!(second.is_idle());
        assert!(third.is_idle());
        assert_eq!(backend.calls(), vec!["translate:ru:1"]);
        assert_eq!(pipeline.cache().main.len(), 1);
        assert_eq!(output(&settings, "en", "ru"), "a=ru:One\n");

        // A real source edit still goes through, and only the source is extracted.
        fs::write(settings.root_dir().join("extra.properties"), "b=Two\n").unwrap();
        let fourth = pipeline.tick().unwrap();
        assert_eq!(fourth.changed_files, 1);
        assert_eq!(fourth.extracted, 2);
        assert_eq!(output(&settings, "en", "ru"), "a=ru:One\nb=ru:Two\n");
    }

    #[test]
    fn second_run_without_changes_translates_nothing_and_rewrites_identically() {
        let dir = tempdir().unwrap();
        let settings = settings(&dir, &["ru"]);
        let backend = FakeBackend::default();
        let mut pipeline = Pipeline::new(&settings, &backend).unwrap();
        let fresh = blocks("a=One\nb=Two\n");

        pipeline.process(fresh.clone()).unwrap();
        let first = output(&settings, "en", "ru");
        let report = pipeline.process(fresh).unwrap();

        assert_eq!(report.translated, 0);
        assert_eq!(output(&settings, "en", "ru"), first);
        assert_eq!(backend.calls(), vec!["translate:ru:2"]);
    }

    #[test]
    fn changed_value_is_the_only_string_sent_again() {
        let dir = tempdir().unwrap();
        let settings = settings(&dir, &["ru"]);
        let backend = FakeBackend::default();
        let mut pipeline = Pipeline::new(&settings, &backend).unwrap();

        pipeline.process(blocks("a=One\nb=Two\nc=Three\n")).unwrap();
        let report = pipeline.process(blocks("a=One\nb=Deux\nc=Three\n")).unwrap();

        assert_eq!(report.translated, 1);
        assert_eq!(backend.calls(), vec!["translate:ru:3", "translate:ru:1"]);
        assert_eq!(output(&settings, "en", "ru"), "a=ru:One\nc=ru:Three\nb=ru:Deux\n");
        assert_eq!(pipeline.cache().main.len(), 3);
        assert_eq!(pipeline.cache().language("ru").len(), 3);
    }

    #[test]
    fn removed_source_file_prunes_its_blocks() {
        let dir = tempdir().unwrap();
        let settings = settings(&dir, &["ru"]);
        let root = settings.root_dir();
        fs::write(root.join("a.properties"), "a=One\n").unwrap();
        fs::write(root.join("b.properties"), "b=Two\n").unwrap();
        let backend = FakeBackend::default();
        let mut pipeline = Pipeline::new(&settings, &backend).unwrap();

        pipeline.tick().unwrap();
        fs::remove_file(root.join("b.properties")).unwrap();
        let report = pipeline.tick().unwrap();

        assert_eq!(report.removed_files, 1);
        assert_eq!(report.translated, 0);
        assert_eq!(output(&settings, "en", "ru"), "a=ru:One\n");
        assert_eq!(pipeline.cache().language("ru").len(), 1);
    }

    #[test]
    fn empty_main_lang_detects_once_from_five_values() {
        let dir = tempdir().unwrap();
        let mut settings = settings(&dir, &["ru", "ja"]);
        settings.main_lang = String::new();
        let backend = FakeBackend {
            detected: Some("de".into()),
            ..FakeBackend::default()
        };
        let mut pipeline = Pipeline::new(&settings, &backend).unwrap();

        let report = pipeline
            .process(blocks("a=1\nb=2\nc=3\nd=4\ne=5\nf=6\ng=7\n"))
            .unwrap();

        assert_eq!(
            backend.calls(),
            vec!["detect:5", "translate:ru:7", "translate:ja:7"]
        );
        assert_eq!(report.source_lang.as_deref(), Some("de"));
        assert!(report.written.iter().all(|p| p
            .file_name()
            .unwrap()
            .to_string_lossy()
            .starts_with("de-")));
    }

    #[test]
    fn detected_language_is_reused_when_nothing_is_new() {
        let dir = tempdir().unwrap();
        let mut settings = settings(&dir, &["ru"]);
        settings.main_lang = String::new();
        let backend = FakeBackend {
            detected: Some("en".into()),
            ..FakeBackend::default()
        };
        let mut pipeline = Pipeline::new(&settings, &backend).unwrap();

        pipeline.process(blocks("a=One\nb=Two\n")).unwrap();
        let report = pipeline.process(blocks("a=One\n")).unwrap();

        assert_eq!(backend.calls(), vec!["detect:2", "translate:ru:2"]);
        assert_eq!(report.source_lang.as_deref(), Some("en"));
        assert_eq!(output(&settings, "en", "ru"), "a=ru:One\n");
    }

    #[test]
    fn failed_detection_aborts_before_any_translation() {
        let dir = tempdir().unwrap();
        let mut settings = settings(&dir, &["ru"]);
        settings.main_lang = String::new();
        let backend = FakeBackend::default();
        let mut pipeline = Pipeline::new(&settings, &backend).unwrap();

        let err = pipeline.process(blocks("a=One\n")).unwrap_err();

        assert!(matches!(err, Error::Backend(BackendError::DetectionFailed)));
        assert_eq!(backend.calls(), vec!["detect:1"]);
        assert_eq!(pipeline.cache(), &Cache::default());
    }

    #[test]
    fn failure_on_one_language_merges_nothing() {
        let dir = tempdir().unwrap();
        let settings = settings(&dir, &["ru", "tt", "ja"]);
        let backend = FakeBackend::default();
        let mut pipeline = Pipeline::new(&settings, &backend).unwrap();

        pipeline.process(blocks("a=One\n")).unwrap();
        let before = pipeline.cache().clone();
        let ru_before = output(&settings, "en", "ru");

        *backend.fail_for.borrow_mut() = Some("ja".into());
        let err = pipeline.process(blocks("a=One\nb=Two\n")).unwrap_err();

        assert!(matches!(err, Error::Backend(BackendError::Quota(_))));
        assert_eq!(pipeline.cache(), &before);
        assert_eq!(output(&settings, "en", "ru"), ru_before);
        assert_eq!(
            backend.calls()[3..],
            ["translate:ru:1", "translate:tt:1", "translate:ja:1"]
        );

        // The next successful run still sees `b` as new.
        *backend.fail_for.borrow_mut() = None;
        let report = pipeline.process(blocks("a=One\nb=Two\n")).unwrap();
        assert_eq!(report.translated, 1);
        assert_eq!(pipeline.cache().language("ja").len(), 2);
    }

    #[test]
    fn language_added_later_is_backfilled_from_persisted_cache() {
        let dir = tempdir().unwrap();
        let cache_path = dir.path().join("state/cache.json");
        let mut first = settings(&dir, &["ru"]);
        first.cache_path = Some(cache_path.to_string_lossy().to_string());
        let backend = FakeBackend::default();

        Pipeline::new(&first, &backend)
            .unwrap()
            .process(blocks("a=One\nb=Two\n"))
            .unwrap();

        let second = Settings {
            to_langs: vec!["ru".into(), "ja".into()],
            ..first.clone()
        };
        let mut pipeline = Pipeline::new(&second, &backend).unwrap();
        assert_eq!(pipeline.cache().main.len(), 2);

        let report = pipeline.process(blocks("a=One\nb=Two\nc=Three\n")).unwrap();

        assert_eq!(report.translated, 1);
        assert_eq!(
            backend.calls(),
            vec!["translate:ru:2", "translate:ru:1", "translate:ja:3"]
        );
        assert_eq!(output(&second, "en", "ja"), "a=ja:One\nb=ja:Two\nc=ja:Three\n");
        for lang in ["ru", "ja"] {
            assert_eq!(pipeline.cache().language(lang).len(), pipeline.cache().main.len());
        }
    }

    #[test]
    fn short_response_is_a_length_mismatch() {
        let fresh = blocks("a=One\nb=Two\n");

        let err = translate_blocks(&ShortBackend, &fresh, "en", "ru").unwrap_err();

        assert!(matches!(
            err,
            Error::Backend(BackendError::LengthMismatch {
                expected: 2,
                got: 1
            })
        ));
    }

    #[test]
    fn missing_pattern_for_suffix_is_rejected() {
        let dir = tempdir().unwrap();
        let mut settings = settings(&dir, &["ru"]);
        settings.suffix = ".xaml".into();
        let backend = FakeBackend::default();

        assert!(matches!(
            Pipeline::new(&settings, &backend),
            Err(Error::Settings(_))
        ));
    }
}
