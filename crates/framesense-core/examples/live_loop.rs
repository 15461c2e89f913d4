//! Live classification loop over synthetic camera frames.
//!
//! Demonstrates the full pipeline: a producer submitting frames at camera
//! rate with latest-wins backpressure, the dedicated inference worker, and a
//! consumer draining ranked results from the event channel.
//!
//! Usage:
//!
//! ```text
//! cargo run --example live_loop -- /path/to/model-dir
//! ```
//!
//! The model directory must contain `mobilenet_v1.onnx` and `labels.txt`.

use framesense_core::{
    ClassifyWorker, EngineConfig, Frame, OnnxEngineProvider, Rotation, SessionEvent,
};
use std::time::Duration;

const WIDTH: u32 = 640;
const HEIGHT: u32 = 480;

/// Moving diagonal-stripe pattern, tagged 90° to exercise orientation
/// normalization.
fn synthetic_frame(tick: u32) -> Frame {
    let mut pixels = vec![0u8; (WIDTH * HEIGHT * 4) as usize];
    for y in 0..HEIGHT {
        for x in 0..WIDTH {
            let offset = ((y * WIDTH + x) * 4) as usize;
            let stripe = ((x + y + tick * 8) / 32) % 2;
            let value = if stripe == 0 { 200 } else { 50 };
            pixels[offset] = value;
            pixels[offset + 1] = value / 2;
            pixels[offset + 2] = 255 - value;
            pixels[offset + 3] = 255;
        }
    }
    Frame::new(pixels, WIDTH, HEIGHT, Rotation::Deg90)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let model_dir = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "models".to_string());

    let provider = OnnxEngineProvider::new(&model_dir);
    let (worker, events) = ClassifyWorker::spawn(EngineConfig::default(), Box::new(provider))?;

    let printer = std::thread::spawn(move || {
        for event in events {
            match event {
                SessionEvent::Results {
                    categories,
                    inference_time_ms,
                } => {
                    let ranked: Vec<String> = categories
                        .iter()
                        .map(|c| format!("{} {:.2}", c.label, c.score))
                        .collect();
                    println!("[{inference_time_ms} ms] {}", ranked.join(" | "));
                }
                SessionEvent::Error { message } => {
                    eprintln!("error: {message}");
                }
            }
        }
    });

    // Produce frames at roughly 30 fps; the worker drops stale ones on its own.
    for tick in 0..60 {
        let displaced = worker.submit(synthetic_frame(tick))?;
        if displaced {
            log::debug!("frame {tick} displaced a stale frame");
        }
        std::thread::sleep(Duration::from_millis(33));
    }

    drop(worker);
    printer.join().expect("printer thread panicked");
    Ok(())
}
