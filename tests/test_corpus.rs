mod common;

use common::*;
use handshape::corpus::{self, Corpus};
use handshape::{
    EngineError, ExtractorConfig, HuMomentMetric, ImageSilhouetteExtractor, MatchMethod,
    ShapeDistance,
};
use image::{DynamicImage, GrayImage, Luma};
use std::fs;
use tempfile::TempDir;

const SIZE: u32 = 120;

fn init_logs() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn extractor() -> ImageSilhouetteExtractor {
    let config = ExtractorConfig {
        resize: false,
        ..Default::default()
    };
    ImageSilhouetteExtractor::new(&config)
}

/// Base images plus a gesture directory holding copies of them,
/// one corrupt file and one image without any shape.
fn setup_dirs() -> TempDir {
    let temp = TempDir::new().expect("Failed to create temp dir");
    let base = temp.path().join("base");
    let gestures = temp.path().join("gestures");
    fs::create_dir_all(&base).expect("Failed to create base dir");
    fs::create_dir_all(&gestures).expect("Failed to create gestures dir");

    save_png(&square(SIZE), &base.join("paper.png"));
    save_png(&disc(SIZE), &base.join("Rock.png"));
    save_png(&wedge(SIZE), &base.join("scissors.png"));

    save_png(&square(SIZE), &gestures.join("paper_1.png"));
    save_png(&disc(SIZE), &gestures.join("rock_1.png"));
    save_png(&wedge(SIZE), &gestures.join("scissors_1.png"));
    save_png(&GrayImage::from_pixel(SIZE, SIZE, Luma([225u8])), &gestures.join("paper_2.png"));
    fs::write(gestures.join("rock_2.png"), b"not an image").expect("Failed to write corrupt file");
    fs::write(gestures.join("notes.txt"), b"ignored").expect("Failed to write text file");

    temp
}

#[test]
fn test_corpus_lists_supported_files_in_order() {
    let temp = setup_dirs();
    let corpus = Corpus::open(&temp.path().join("gestures")).expect("corpus opens");

    let ids: Vec<&str> = corpus.entries().iter().map(|e| e.identifier.as_str()).collect();
    assert_eq!(ids, ["paper_1", "paper_2", "rock_1", "rock_2", "scissors_1"]);
    assert_eq!(corpus.entries()[2].truth(), Label::Rock);
}

#[test]
fn test_missing_corpus_is_fatal() {
    let temp = TempDir::new().expect("Failed to create temp dir");
    let result = Corpus::open(&temp.path().join("nope"));
    assert!(matches!(result, Err(EngineError::CorpusUnavailable { .. })));
}

#[test]
fn test_missing_base_exemplar_is_fatal() {
    init_logs();
    let temp = setup_dirs();
    let base = temp.path().join("base");
    fs::remove_file(base.join("scissors.png")).expect("Failed to remove base image");

    let result = corpus::load_base_exemplars(&base, &extractor(), false);
    assert!(matches!(
        result,
        Err(EngineError::BaseExemplarUnavailable {
            label: Label::Scissors,
            ..
        })
    ));
}

#[test]
fn test_images_end_to_end() {
    init_logs();
    let temp = setup_dirs();
    let extractor = extractor();

    let base = corpus::load_base_exemplars(&temp.path().join("base"), &extractor, false)
        .expect("base exemplars load");
    let batch = Corpus::open(&temp.path().join("gestures"))
        .expect("corpus opens")
        .load(&extractor, false);

    let unreadable: Vec<&str> = batch
        .reading_errors
        .iter()
        .map(|e| e.identifier.as_str())
        .collect();
    assert_eq!(unreadable, ["paper_2", "rock_2"]);
    assert_eq!(batch.samples.len(), 3);

    let outcome = Engine::new(EngineConfig::default(), HuMomentMetric::new(MatchMethod::I2), base)
        .expect("valid config")
        .run(batch)
        .expect("run succeeds");
    let report = &outcome.report;

    for sample in &report.samples {
        assert_eq!(sample.initial.label, sample.truth, "{}", sample.identifier);
        assert_eq!(sample.initial.distance, 0.0, "{}", sample.identifier);
    }
    assert_eq!(report.summary.population, 3);
    assert_eq!(report.summary.reading_errors, 2);
    assert_eq!(report.summary.initial_successes, 3);
    assert!(report.unresolved.is_empty());
    for label in Label::GESTURES {
        assert_eq!(outcome.store.len(label), 2);
    }
}

#[test]
fn test_debug_output_written_per_sample() {
    init_logs();
    let temp = setup_dirs();
    let gestures = temp.path().join("gestures");
    save_png(&disc(SIZE), &gestures.join("paper.png"));
    let debug_dir = temp.path().join("debug");
    fs::create_dir_all(&debug_dir).expect("Failed to create debug dir");

    let extractor = extractor().with_debug(debug_dir.clone()).expect("empty debug dir accepted");
    corpus::load_base_exemplars(&temp.path().join("base"), &extractor, false)
        .expect("base exemplars load");
    Corpus::open(&gestures).expect("corpus opens").load(&extractor, false);

    for label in ["paper", "rock", "scissors"] {
        assert!(debug_dir.join(format!("base_{label}")).join("00_input.png").is_file());
    }
    // A sample named like a base image keeps its own dump
    assert!(debug_dir.join("paper").join("00_input.png").is_file());
    assert!(debug_dir.join("rock_1").is_dir());
    let base_input = image::open(debug_dir.join("base_paper").join("00_input.png"))
        .expect("base dump readable")
        .to_luma8();
    assert_eq!(base_input, square(SIZE));
}

#[test]
fn test_stroke_intensity_does_not_change_distances() {
    let distances = |intensity: u8| -> Vec<f64> {
        let extractor = ImageSilhouetteExtractor::new(&ExtractorConfig {
            resize: false,
            stroke_intensity: intensity,
            ..Default::default()
        });
        let v_shape = extractor
            .extract_image(DynamicImage::ImageLuma8(wedge(SIZE)), "wedge", false)
            .expect("wedge has a silhouette");
        let block = extractor
            .extract_image(DynamicImage::ImageLuma8(square(SIZE)), "square", false)
            .expect("square has a silhouette");

        [MatchMethod::I1, MatchMethod::I2, MatchMethod::I3]
            .into_iter()
            .map(|method| HuMomentMetric::new(method).distance(&v_shape, &block))
            .collect()
    };

    let reference = distances(255);
    assert_eq!(distances(1), reference);
    assert_eq!(distances(40), reference);
}
