//! Write the aligned, left and right symmetry images for one photo.
//!
//! Usage:
//!   cargo run --example mirror_photo -- <input> <output_dir> \
//!       <box_x0> <box_y0> <box_x1> <box_y1> \
//!       <left_eye_x> <left_eye_y> <right_eye_x> <right_eye_y> \
//!       <nose_x> <nose_y> <mouth_x> <mouth_y>
//!
//! Coordinates are in source-image pixels, as a face landmark detector
//! reports them.

use facemirror::{FaceDetection, FaceMirror, Point, Preset};
use std::path::Path;

fn main() {
    let args: Vec<String> = std::env::args().skip(1).collect();
    if args.len() != 14 {
        eprintln!("usage: mirror_photo <input> <output_dir> <box: 4 numbers> <landmarks: 8 numbers>");
        std::process::exit(2);
    }

    let numbers: Vec<f64> = args[2..]
        .iter()
        .map(|a| a.parse().expect("coordinates must be numbers"))
        .collect();
    let points: Vec<Point> = numbers
        .chunks(2)
        .map(|pair| Point::new(pair[0], pair[1]))
        .collect();

    let detection = FaceDetection {
        top_left: points[0],
        bottom_right: points[1],
        landmarks: points[2..].to_vec(),
        probability: 1.0,
    };

    let input = std::fs::read(&args[0]).expect("failed to read input");
    let output_dir = Path::new(&args[1]);
    std::fs::create_dir_all(output_dir).unwrap();

    let photos = FaceMirror::new(input)
        .unwrap()
        .preset(Preset::Lossless)
        .detection(detection)
        .process()
        .unwrap();

    if let Some(alignment) = photos.alignment {
        println!(
            "rotation {:.1}° (cost {:.3})",
            alignment.angle_degrees, alignment.cost
        );
    }

    for (name, image) in [
        ("aligned", &photos.aligned),
        ("left", &photos.left),
        ("right", &photos.right),
    ] {
        let path = output_dir.join(format!("{name}.png"));
        std::fs::write(&path, &image.data).unwrap();
        println!(
            "  {name}: {} ({}x{}, {} bytes)",
            path.display(),
            image.width,
            image.height,
            image.data.len()
        );
    }
}
