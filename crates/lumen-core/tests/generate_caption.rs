//! End-to-end captioning through `Captioner` with in-process fake models.

use std::io::Cursor;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use ndarray::Array4;

use lumen_core::{
    CaptionError, CaptionModel, Captioner, Config, FeatureExtractor, ImageEmbedding,
    PipelineError, PipelineResult, TokenId, Vocabulary,
};

const START: TokenId = 1;
const END: TokenId = 2;
const A: TokenId = 3;
const CAT: TokenId = 4;
const FEATURE_DIM: usize = 4;

struct CountingExtractor {
    dim: usize,
    calls: AtomicUsize,
}

impl FeatureExtractor for CountingExtractor {
    fn extract(&self, tensor: &Array4<f32>) -> PipelineResult<ImageEmbedding> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let mean = tensor.mean().unwrap_or(0.0);
        Ok(ImageEmbedding::new(vec![mean; self.dim]))
    }
}

/// Predicts from the last real token: start → `first`, a → cat, cat → end, end → end.
struct ChainModel {
    first: TokenId,
    calls: AtomicUsize,
}

impl CaptionModel for ChainModel {
    fn predict(&self, embedding: &ImageEmbedding, sequence: &[TokenId]) -> PipelineResult<Vec<f32>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        assert_eq!(embedding.dim(), FEATURE_DIM);

        let last = sequence.iter().rev().find(|&&t| t != 0).copied().unwrap_or(START);
        let next = match last {
            START => self.first,
            A => CAT,
            _ => END,
        };
        let mut distribution = vec![0.02; 5];
        distribution[next as usize] = 0.9;
        Ok(distribution)
    }
}

struct BrokenModel;

impl CaptionModel for BrokenModel {
    fn predict(&self, _: &ImageEmbedding, _: &[TokenId]) -> PipelineResult<Vec<f32>> {
        Err(PipelineError::decoder("session crashed"))
    }
}

struct Harness {
    captioner: Captioner,
    extractor: Arc<CountingExtractor>,
    model: Option<Arc<ChainModel>>,
}

fn config(beam_width: usize, max_length: usize) -> Config {
    let mut config = Config::default();
    config.encoder.image_size = 8;
    config.encoder.feature_dim = FEATURE_DIM;
    config.decoder.beam_width = beam_width;
    config.decoder.max_length = max_length;
    config
}

fn vocabulary() -> Arc<Vocabulary> {
    Arc::new(
        Vocabulary::from_pairs(
            [("start", START), ("end", END), ("a", A), ("cat", CAT)],
            "start",
            "end",
        )
        .unwrap(),
    )
}

fn harness(config: &Config, first: TokenId) -> Harness {
    let extractor = Arc::new(CountingExtractor {
        dim: config.encoder.feature_dim,
        calls: AtomicUsize::new(0),
    });
    let model = Arc::new(ChainModel {
        first,
        calls: AtomicUsize::new(0),
    });
    let captioner = Captioner::new(
        config,
        Box::new(extractor.clone()),
        Box::new(model.clone()),
        vocabulary(),
    )
    .unwrap();
    Harness {
        captioner,
        extractor,
        model: Some(model),
    }
}

fn png_bytes() -> Vec<u8> {
    let mut buffer = Cursor::new(Vec::new());
    DynamicImage::ImageRgb8(RgbImage::from_pixel(20, 10, Rgb([200, 120, 40])))
        .write_to(&mut buffer, ImageFormat::Png)
        .unwrap();
    buffer.into_inner()
}

#[test]
fn captions_a_cat() {
    let h = harness(&config(1, 4), A);
    let caption = h.captioner.generate_caption(&png_bytes()).unwrap();

    assert_eq!(caption, "a cat");
    assert_eq!(h.extractor.calls.load(Ordering::SeqCst), 1);
    assert!(h.model.unwrap().calls.load(Ordering::SeqCst) <= 4);
}

#[test]
fn immediate_end_gives_empty_caption() {
    let h = harness(&config(1, 4), END);
    assert_eq!(h.captioner.generate_caption(&png_bytes()).unwrap(), "");
}

#[test]
fn model_calls_bounded_by_length_times_width() {
    let h = harness(&config(3, 6), A);
    h.captioner.generate_caption(&png_bytes()).unwrap();
    assert!(h.model.unwrap().calls.load(Ordering::SeqCst) <= 6 * 3);
}

#[test]
fn malformed_bytes_never_reach_the_models() {
    let h = harness(&config(3, 25), A);
    let err = h
        .captioner
        .generate_caption(b"this is a text file, not a picture")
        .unwrap_err();

    assert!(matches!(err, PipelineError::Decode { .. }));
    assert!(err.is_client_error());
    assert_eq!(h.extractor.calls.load(Ordering::SeqCst), 0);
    assert_eq!(h.model.unwrap().calls.load(Ordering::SeqCst), 0);
}

#[test]
fn truncated_image_is_a_decode_error() {
    let h = harness(&config(3, 25), A);
    let bytes = png_bytes();
    let err = h.captioner.generate_caption(&bytes[..bytes.len() / 2]).unwrap_err();
    assert!(matches!(err, PipelineError::Decode { .. }));
    assert_eq!(h.extractor.calls.load(Ordering::SeqCst), 0);
}

#[test]
fn identical_inputs_give_identical_captions() {
    let h = harness(&config(3, 10), A);
    let bytes = png_bytes();
    let first = h.captioner.caption(&bytes).unwrap();
    let second = h.captioner.caption(&bytes).unwrap();
    assert_eq!(first, second);
}

#[test]
fn model_failure_is_a_server_error() {
    let config = config(3, 5);
    let extractor = Arc::new(CountingExtractor {
        dim: FEATURE_DIM,
        calls: AtomicUsize::new(0),
    });
    let h = Harness {
        captioner: Captioner::new(&config, Box::new(extractor.clone()), Box::new(BrokenModel), vocabulary())
            .unwrap(),
        extractor,
        model: None,
    };

    let err = h.captioner.generate_caption(&png_bytes()).unwrap_err();
    assert!(matches!(err, PipelineError::Inference { stage: "decoder", .. }));
    assert!(!err.is_client_error());
    assert_eq!(h.extractor.calls.load(Ordering::SeqCst), 1);
}

#[test]
fn wrong_embedding_width_is_an_inference_error() {
    let config = config(1, 4);
    let extractor = Arc::new(CountingExtractor {
        dim: FEATURE_DIM + 1,
        calls: AtomicUsize::new(0),
    });
    let model = Arc::new(ChainModel {
        first: A,
        calls: AtomicUsize::new(0),
    });
    let captioner =
        Captioner::new(&config, Box::new(extractor), Box::new(model.clone()), vocabulary()).unwrap();

    let err = captioner.generate_caption(&png_bytes()).unwrap_err();
    assert!(matches!(err, PipelineError::Inference { stage: "encoder", .. }));
    assert_eq!(model.calls.load(Ordering::SeqCst), 0);
}

#[test]
fn process_builds_capitalized_record() {
    let h = harness(&config(1, 4), A);
    let bytes = png_bytes();
    let record = h.captioner.process(Path::new("/photos/cat.png"), &bytes).unwrap();

    assert_eq!(record.caption, "A cat");
    assert_eq!(record.file_name, "cat.png");
    assert_eq!(record.format, "png");
    assert_eq!((record.width, record.height), (20, 10));
    assert_eq!(record.content_hash, lumen_core::pipeline::content_hash(&bytes));
}

#[test]
fn process_without_capitalization() {
    let mut config = config(1, 4);
    config.output.capitalize = false;
    let h = harness(&config, A);
    let record = h.captioner.process(Path::new("cat.png"), &png_bytes()).unwrap();
    assert_eq!(record.caption, "a cat");
}

#[test]
fn zero_beam_width_rejected_at_construction() {
    let config = config(0, 4);
    let extractor = Arc::new(CountingExtractor {
        dim: FEATURE_DIM,
        calls: AtomicUsize::new(0),
    });
    let result = Captioner::new(&config, Box::new(extractor), Box::new(BrokenModel), vocabulary());
    assert!(matches!(result, Err(CaptionError::Config(_))));
}
