use std::path::{Path, PathBuf};

use qrsite_codec::{CodecError, Compressor, TokenTable};
use qrsite_frame::FrameError;
use qrsite_pipeline::{
    BuildPipeline, DecodeError, DecodePipeline, HtmlMinifier, PipelineError, RendererKind,
    SiteConfig,
};
use qrsite_render::{artifact_path, ErrorCorrection, PlainRenderer, QrRenderer};

fn unique_temp_dir(tag: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!(
        "qrsite-roundtrip-{tag}-{}-{}",
        std::process::id(),
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .expect("time should be after epoch")
            .as_nanos()
    ));
    std::fs::create_dir_all(&dir).expect("temp dir should be creatable");
    dir
}

/// Passes text through unchanged so stream length equals page length.
struct Identity;

impl Compressor for Identity {
    fn compress(&self, text: &str) -> qrsite_codec::Result<String> {
        Ok(text.to_string())
    }

    fn decompress(&self, stream: &str) -> qrsite_codec::Result<String> {
        Ok(stream.to_string())
    }
}

fn site_config(dir: &Path, kind: RendererKind, capacity: Option<usize>) -> SiteConfig {
    let mut config = SiteConfig {
        app_name: "site".to_string(),
        author: "ana".to_string(),
        license: "MIT".to_string(),
        input_path: dir.join("index.html"),
        output_path: dir.join("qrcode"),
        ..SiteConfig::default()
    };
    config.render.kind = kind;
    config.render.shard_capacity = capacity;
    config.render.workers = Some(4);
    config.minify_config.html.minify = false;
    config
}

fn artifact_names(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

#[test]
fn small_page_is_one_plain_artifact() {
    let dir = unique_temp_dir("plain");
    let page = "<div class=\"a\">hi</div>";
    std::fs::write(dir.join("index.html"), page).unwrap();
    let config = site_config(&dir, RendererKind::Plain, None);

    let report = BuildPipeline::new(&config).build().unwrap();
    assert!(report.is_success());
    assert_eq!(report.total, 1);
    assert_eq!(artifact_names(&config.output_path), vec!["qrcode_0.txt"]);

    let site = DecodePipeline::from_config(&config)
        .decode_dir(&config.output_path)
        .unwrap();
    assert_eq!(site.text, page);
    assert_eq!(site.metadata, config.metadata());

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn small_page_is_one_qr_code() {
    let dir = unique_temp_dir("qr");
    let page = "<div class=\"a\">hi</div>";
    std::fs::write(dir.join("index.html"), page).unwrap();
    let mut config = site_config(&dir, RendererKind::Qr, None);
    config.render.error_correction = ErrorCorrection::M;
    config.render.module_size = 4;

    let report = BuildPipeline::new(&config).build().unwrap();
    assert_eq!(report.total, 1);
    assert_eq!(artifact_names(&config.output_path), vec!["qrcode_0.png"]);

    let site = DecodePipeline::new(QrRenderer::new(ErrorCorrection::M))
        .decode_dir(&config.output_path)
        .unwrap();
    assert_eq!(site.text, page);

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn three_capacities_make_three_artifacts() {
    let dir = unique_temp_dir("three");
    let capacity = 32;
    let page = "x".repeat(capacity * 3);
    let config = site_config(&dir, RendererKind::Plain, Some(capacity));
    let empty = TokenTable::new(Vec::<&str>::new()).unwrap();

    let pipeline = BuildPipeline::new(&config)
        .with_minifier(HtmlMinifier::disabled())
        .with_compressor(Identity)
        .with_table(empty.clone());
    let prepared = pipeline.prepare(&page, &config.metadata()).unwrap();
    assert_eq!(prepared.stats.stream_len, capacity * 3);
    let report = pipeline.render(&prepared, &config.output_path).unwrap();

    assert_eq!(report.total, 3);
    assert_eq!(
        artifact_names(&config.output_path),
        vec!["qrcode_0.txt", "qrcode_1.txt", "qrcode_2.txt"]
    );

    // scan order must not matter
    let mut payloads: Vec<Vec<u8>> = report
        .artifacts
        .iter()
        .map(|a| std::fs::read(&a.path).unwrap())
        .collect();
    payloads.rotate_left(1);

    let decoder = DecodePipeline::new(PlainRenderer::new(4096))
        .with_compressor(Identity)
        .with_table(empty);
    assert_eq!(decoder.decode_payloads(&payloads).unwrap().text, page);
    assert_eq!(decoder.decode_dir(&config.output_path).unwrap().text, page);

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn deleted_artifact_is_reported_missing() {
    let dir = unique_temp_dir("missing");
    let page: String = (0..60)
        .map(|i| format!("<li data-n=\"{i}\">item {}</li>", i * 31))
        .collect();
    std::fs::write(dir.join("index.html"), &page).unwrap();
    let config = site_config(&dir, RendererKind::Plain, Some(40));

    let report = BuildPipeline::new(&config).build().unwrap();
    assert!(report.total > 2);
    std::fs::remove_file(artifact_path(&config.output_path, 1, "txt")).unwrap();

    let err = DecodePipeline::from_config(&config)
        .decode_dir(&config.output_path)
        .unwrap_err();
    match err {
        PipelineError::Frame(FrameError::MissingShards { total, missing }) => {
            assert_eq!(total, report.total);
            assert_eq!(missing, vec![1]);
        }
        other => panic!("unexpected error: {other}"),
    }

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn duplicated_shard_is_reported() {
    let dir = unique_temp_dir("dup");
    let page: String = (0..60)
        .map(|i| format!("<li data-n=\"{i}\">item {}</li>", i * 31))
        .collect();
    std::fs::write(dir.join("index.html"), &page).unwrap();
    let config = site_config(&dir, RendererKind::Plain, Some(40));

    BuildPipeline::new(&config).build().unwrap();
    let shard_two = std::fs::read(artifact_path(&config.output_path, 2, "txt")).unwrap();

    let payloads = vec![shard_two.clone(), shard_two];
    let err = DecodePipeline::from_config(&config)
        .decode_payloads(&payloads)
        .unwrap_err();
    assert!(matches!(
        err,
        PipelineError::Frame(FrameError::DuplicateShards { ref indices }) if indices == &[2]
    ));

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn oversize_capacity_fails_before_rendering() {
    let dir = unique_temp_dir("capacity");
    let page: String = (0..400)
        .map(|i| format!("<p id=\"{i}\">{}</p>", i * 7919))
        .collect();
    std::fs::write(dir.join("index.html"), &page).unwrap();
    let mut config = site_config(&dir, RendererKind::Plain, Some(4000));
    config.render.error_correction = ErrorCorrection::H;

    let err = BuildPipeline::new(&config).build().unwrap_err();
    assert!(matches!(
        err,
        PipelineError::Capacity(FrameError::PayloadTooLarge { max: 1273, .. })
    ));
    assert!(!config.output_path.exists());

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn corrupted_body_fails_to_decompress() {
    let dir = unique_temp_dir("corrupt");
    std::fs::write(dir.join("index.html"), "<p>hello there</p>").unwrap();
    let config = site_config(&dir, RendererKind::Plain, None);
    BuildPipeline::new(&config).build().unwrap();

    let path = artifact_path(&config.output_path, 0, "txt");
    let mut payload = std::fs::read(&path).unwrap();
    payload.truncate(payload.len() - 4);
    std::fs::write(&path, payload).unwrap();

    let err = DecodePipeline::from_config(&config)
        .decode_dir(&config.output_path)
        .unwrap_err();
    assert!(matches!(
        err,
        PipelineError::Encoding(CodecError::InvalidStream(_) | CodecError::Decompress(_))
    ));

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn unscannable_artifact_is_named() {
    let dir = unique_temp_dir("unscannable");
    let out = dir.join("qrcode");
    std::fs::create_dir_all(&out).unwrap();
    std::fs::write(artifact_path(&out, 0, "png"), b"not a png").unwrap();
    std::fs::write(artifact_path(&out, 3, "png"), b"not a png").unwrap();

    let err = DecodePipeline::new(QrRenderer::default())
        .with_workers(2)
        .decode_dir(&out)
        .unwrap_err();
    match err {
        PipelineError::Decode(DecodeError::ScanFailed { failures }) => {
            assert_eq!(
                failures.iter().map(|f| f.index).collect::<Vec<_>>(),
                vec![0, 3]
            );
        }
        other => panic!("unexpected error: {other}"),
    }

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn smaller_rebuild_replaces_earlier_artifacts() {
    let dir = unique_temp_dir("rebuild");
    let page: String = (0..60)
        .map(|i| format!("<li data-n=\"{i}\">item {}</li>", i * 31))
        .collect();
    std::fs::write(dir.join("index.html"), &page).unwrap();
    let config = site_config(&dir, RendererKind::Plain, Some(40));

    let first = BuildPipeline::new(&config).build().unwrap();
    assert!(first.total > 2, "expected several shards, got {}", first.total);
    std::fs::write(config.output_path.join("notes.md"), "keep me").unwrap();

    std::fs::write(dir.join("index.html"), "<p>hi</p>").unwrap();
    let second = BuildPipeline::new(&config).build().unwrap();
    assert_eq!(second.total, 1);
    assert_eq!(
        artifact_names(&config.output_path),
        vec!["notes.md", "qrcode_0.txt"]
    );

    let site = DecodePipeline::from_config(&config)
        .decode_dir(&config.output_path)
        .unwrap();
    assert_eq!(site.text, "<p>hi</p>");
    assert_eq!(site.total, 1);

    let _ = std::fs::remove_dir_all(&dir);
}
