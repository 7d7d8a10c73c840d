use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use log::{info, warn};
use rayon::prelude::*;

use crate::core::config::LayoutConfig;
use crate::core::model::PageRecord;
use crate::error::LayoutError;
use crate::export::page_xml::document_head;
use crate::export::{Exporter, JsonExporter, PageXmlExporter};
use crate::parser::parse_page;
use crate::reconstruct::{select_main_region, GeometricLineEngine};
use crate::transcript::{align_texts, page_lines, split_pages, TextPolicy, TranscriptFormat};

const IMAGE_PATTERNS: &[&str] = &["**/*.jpg", "**/*.jpeg", "**/*.png", "**/*.tif", "**/*.tiff"];

#[derive(Debug, Clone)]
pub struct TranscriptSource {
    pub path: PathBuf,
    pub format: TranscriptFormat,
    pub policy: TextPolicy,
}

#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub input: PathBuf,
    pub output: PathBuf,
    pub layout: LayoutConfig,
    pub transcript: Option<TranscriptSource>,
    pub debug_json: bool,
    pub jobs: Option<usize>,
}

impl PipelineConfig {
    pub fn new(input: PathBuf, output: PathBuf, layout: LayoutConfig) -> Self {
        Self {
            input,
            output,
            layout,
            transcript: None,
            debug_json: false,
            jobs: None,
        }
    }

    pub fn with_transcript(mut self, transcript: TranscriptSource) -> Self {
        self.transcript = Some(transcript);
        self
    }

    pub fn page_dir(&self) -> PathBuf {
        self.output.join("page")
    }
}

/// Outcome of a whole batch. Failed documents never stop their siblings.
#[derive(Debug, Default)]
pub struct BatchReport {
    pub written: usize,
    pub skipped: Vec<(PathBuf, String)>,
    /// Only [`LayoutError::TextCountMismatch`] values.
    pub mismatches: Vec<(PathBuf, LayoutError)>,
    pub assets_copied: usize,
    /// Images or resource files that could not be copied.
    pub asset_failures: Vec<(PathBuf, String)>,
}

impl BatchReport {
    pub fn all_failed(&self) -> bool {
        self.written == 0 && !self.skipped.is_empty()
    }
}

/// Layout documents under `<input>/page`, sorted by file name.
pub fn layout_files(input: &Path) -> Result<Vec<PathBuf>> {
    let page_dir = input.join("page");
    let mut files = Vec::new();
    for entry in fs::read_dir(&page_dir)
        .with_context(|| format!("failed to read layout directory {}", page_dir.display()))?
    {
        let path = entry?.path();
        if path.is_file() && path.extension().is_some_and(|ext| ext == "xml") {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Rebuilds one layout document held in memory.
///
/// Without `texts` every line gets an empty text. With `texts` a count
/// mismatch is returned next to the record rather than as an error.
pub fn build_page(
    xml: &str,
    stem: &str,
    engine: &GeometricLineEngine,
    texts: Option<(Vec<String>, TextPolicy)>,
) -> Result<(PageRecord, Option<LayoutError>)> {
    let layout = parse_page(xml)?;
    let (_, region) = select_main_region(&layout.regions)?;
    let lines = engine.reconstruct_region(region)?;

    let mut mismatch = None;
    let texts = match texts {
        None => vec![String::new(); lines.len()],
        Some((texts, policy)) => {
            if texts.len() != lines.len() {
                mismatch = Some(LayoutError::TextCountMismatch {
                    lines: lines.len(),
                    texts: texts.len(),
                });
            }
            align_texts(lines.len(), texts, policy)
        }
    };

    let record = PageRecord {
        stem: stem.to_string(),
        head: document_head(xml, &region.coords),
        lines,
        texts,
    };
    Ok((record, mismatch))
}

pub fn process_file(
    path: &Path,
    engine: &GeometricLineEngine,
    texts: Option<(Vec<String>, TextPolicy)>,
) -> Result<(PageRecord, Option<LayoutError>)> {
    let xml = fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    build_page(&xml, &file_stem(path), engine, texts)
        .with_context(|| format!("failed to rebuild {}", path.display()))
}

fn load_transcript_pages(source: &TranscriptSource) -> Result<Vec<Vec<String>>> {
    let text = fs::read_to_string(&source.path)
        .with_context(|| format!("failed to read transcript {}", source.path.display()))?;
    Ok(split_pages(&text, source.format)
        .iter()
        .map(|page| page_lines(page))
        .collect())
}

/// Copies page images (searched recursively) and top-level resource XML files
/// into the output directory.
///
/// A file that cannot be copied is logged and recorded in the report; only an
/// unusable output directory fails the call.
pub fn copy_assets(input: &Path, output: &Path, report: &mut BatchReport) -> Result<()> {
    fs::create_dir_all(output)
        .with_context(|| format!("failed to create {}", output.display()))?;
    let mut sources = Vec::new();
    for pattern in IMAGE_PATTERNS.iter().chain(&["*.xml"]) {
        let pattern = input.join(pattern);
        let pattern = pattern.to_string_lossy();
        for entry in glob::glob(&pattern).with_context(|| format!("bad glob {pattern}"))? {
            match entry {
                Ok(path) => sources.push(path),
                Err(e) => {
                    warn!("cannot read asset {}: {e}", e.path().display());
                    report
                        .asset_failures
                        .push((e.path().to_path_buf(), e.to_string()));
                }
            }
        }
    }

    for source in sources {
        if source.starts_with(output) {
            continue;
        }
        let Some(name) = source.file_name() else {
            continue;
        };
        match fs::copy(&source, output.join(name)) {
            Ok(_) => report.assets_copied += 1,
            Err(e) => {
                warn!("failed to copy {}: {e}", source.display());
                report.asset_failures.push((source, e.to_string()));
            }
        }
    }
    Ok(())
}

/// Rebuilds every layout document of `config.input` and writes the results.
pub fn run_batch(config: &PipelineConfig) -> Result<BatchReport> {
    config
        .layout
        .validate()
        .context("invalid layout configuration")?;
    let files = layout_files(&config.input)?;
    info!("found {} layout file(s) in {}", files.len(), config.input.display());

    let mut report = BatchReport::default();

    let jobs: Vec<(PathBuf, Option<(Vec<String>, TextPolicy)>)> = match &config.transcript {
        None => files.into_iter().map(|f| (f, None)).collect(),
        Some(source) => {
            let pages = load_transcript_pages(source)?;
            if pages.len() != files.len() {
                warn!(
                    "transcript has {} page(s) for {} layout file(s)",
                    pages.len(),
                    files.len()
                );
            }
            let mut pages = pages.into_iter();
            let mut jobs = Vec::with_capacity(files.len());
            for file in files {
                match pages.next() {
                    Some(texts) => jobs.push((file, Some((texts, source.policy)))),
                    None => report
                        .skipped
                        .push((file, "no transcript page left".to_string())),
                }
            }
            jobs
        }
    };

    let engine = GeometricLineEngine::new(config.layout.clone());
    let page_exporter = PageXmlExporter::new(config.page_dir());
    let json_exporter = JsonExporter::new(config.output.join("debug"));

    let work = || -> Vec<(PathBuf, Result<Option<LayoutError>>)> {
        jobs.into_par_iter()
            .map(|(path, texts)| {
                let result = process_file(&path, &engine, texts).and_then(|(record, mismatch)| {
                    page_exporter.export(&record)?;
                    if config.debug_json {
                        json_exporter.export(&record)?;
                    }
                    Ok(mismatch)
                });
                (path, result)
            })
            .collect()
    };
    let results = match config.jobs {
        Some(threads) => rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build()
            .context("failed to build worker pool")?
            .install(work),
        None => work(),
    };

    for (path, result) in results {
        match result {
            Ok(mismatch) => {
                report.written += 1;
                if let Some(mismatch) = mismatch {
                    warn!("{}: {mismatch}", path.display());
                    report.mismatches.push((path, mismatch));
                }
            }
            Err(e) => {
                warn!("skipping {}: {e:#}", path.display());
                report.skipped.push((path, format!("{e:#}")));
            }
        }
    }

    copy_assets(&config.input, &config.output, &mut report)?;
    info!(
        "wrote {} page(s), skipped {}, {} text mismatch(es), copied {} asset(s), {} asset failure(s)",
        report.written,
        report.skipped.len(),
        report.mismatches.len(),
        report.assets_copied,
        report.asset_failures.len()
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const PAGE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<PcGts>
<Page imageFilename="p1.jpg">
<ReadingOrder/>
<TextRegion id="r">
<Coords points="30,0 30,2000 1900,2000 1900,0"/>
<TextLine id="a"><Coords points="0,0 1,0 1,1 0,1"/><Baseline points="100,300 1500,300"/></TextLine>
<TextLine id="b"><Coords points="0,0 1,0 1,1 0,1"/><Baseline points="100,600 1500,600"/></TextLine>
</TextRegion>
</Page>
</PcGts>
"#;

    #[test]
    fn builds_page_with_empty_texts() {
        let engine = GeometricLineEngine::default();
        let (record, mismatch) = build_page(PAGE, "p1", &engine, None).unwrap();
        assert_eq!(record.lines.len(), 2);
        assert_eq!(record.texts, vec!["", ""]);
        assert!(mismatch.is_none());
        assert!(record.head.ends_with("<Coords points=\"30,0 30,2000 1900,2000 1900,0\"/>\n"));
    }

    #[test]
    fn reports_text_mismatch_without_failing() {
        let engine = GeometricLineEngine::default();
        let texts = vec!["one".to_string(), "two".to_string(), "three".to_string()];
        let (record, mismatch) =
            build_page(PAGE, "p1", &engine, Some((texts, TextPolicy::Truncate))).unwrap();
        assert_eq!(record.texts, vec!["one", "two"]);
        assert!(matches!(
            mismatch,
            Some(LayoutError::TextCountMismatch { lines: 2, texts: 3 })
        ));
    }

    #[test]
    fn page_without_region_is_an_error() {
        let engine = GeometricLineEngine::default();
        let err = build_page("<PcGts><Page/></PcGts>", "p", &engine, None).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<LayoutError>(),
            Some(LayoutError::NoRegionFound)
        ));
    }
}
