use facemirror::{
    rotate_point, AlignmentMode, CropRect, FaceDetection, FaceMirror, FaceMirrorError,
    LandmarkDetector, OutputFormat, Point, Preset, BACKGROUND,
};
use image::codecs::png::PngEncoder;
use image::{ExtendedColorType, ImageEncoder, Rgb, RgbImage, RgbaImage};

const RED: Rgb<u8> = Rgb([230, 20, 20]);
const SKIN: Rgb<u8> = Rgb([180, 150, 130]);

/// Canvas center for the synthetic face below: crop (90, 20, 220 x 380).
const CANVAS_CENTER: Point = Point::new(110.0, 190.0);

/// Upright landmarks in canvas coordinates. The eye distance is exactly
/// 0.3 x canvas width, so the upright pose costs nothing.
const UPRIGHT: [Point; 4] = [
    Point::new(77.0, 150.0),
    Point::new(143.0, 150.0),
    Point::new(110.0, 180.0),
    Point::new(110.0, 210.0),
];

/// A face tilted by `tilt` degrees, in 400 x 400 source coordinates.
fn tilted_face(tilt: f64) -> FaceDetection {
    let origin = Point::new(90.0, 20.0);
    FaceDetection {
        top_left: Point::new(140.0, 120.0),
        bottom_right: Point::new(260.0, 260.0),
        landmarks: UPRIGHT
            .iter()
            .map(|p| rotate_point(*p, CANVAS_CENTER, tilt) + origin)
            .collect(),
        probability: 0.93,
    }
}

/// Skin-coloured image with a red square painted on each landmark.
fn make_face_png(face: &FaceDetection) -> Vec<u8> {
    let mut img = RgbImage::from_pixel(400, 400, SKIN);
    for p in &face.landmarks {
        let (cx, cy) = (p.x.round() as i64, p.y.round() as i64);
        for y in cy - 3..=cy + 3 {
            for x in cx - 3..=cx + 3 {
                img.put_pixel(x as u32, y as u32, RED);
            }
        }
    }
    encode_png(&img)
}

fn make_gradient_png(width: u32, height: u32) -> Vec<u8> {
    let mut img = RgbImage::new(width, height);
    for (x, y, pixel) in img.enumerate_pixels_mut() {
        *pixel = Rgb([
            (x * 255 / width.max(1)) as u8,
            (y * 255 / height.max(1)) as u8,
            128,
        ]);
    }
    encode_png(&img)
}

fn encode_png(img: &RgbImage) -> Vec<u8> {
    let mut buffer = Vec::new();
    PngEncoder::new(&mut buffer)
        .write_image(img.as_raw(), img.width(), img.height(), ExtendedColorType::Rgb8)
        .unwrap();
    buffer
}

/// Mock landmark detector for integration tests.
struct MockDetector {
    faces: Vec<FaceDetection>,
}

impl LandmarkDetector for MockDetector {
    fn detect(&self, _image: &RgbaImage) -> Vec<FaceDetection> {
        self.faces.clone()
    }
}

#[test]
fn detector_face_is_leveled() {
    let face = tilted_face(-10.0);
    let input = make_face_png(&face);
    let rasters = FaceMirror::new(input)
        .unwrap()
        .detector(Box::new(MockDetector { faces: vec![face] }))
        .render()
        .unwrap();

    let alignment = rasters.alignment.unwrap();
    assert!(
        (alignment.angle_degrees - 10.0).abs() < 1e-6,
        "angle {}",
        alignment.angle_degrees
    );
    assert!(alignment.cost < 1e-6);
    assert_eq!(rasters.aligned.dimensions(), (220, 380));

    // The painted landmarks end up at their upright positions
    for p in &UPRIGHT {
        let pixel = rasters.aligned.get_pixel(p.x as u32, p.y as u32);
        assert_eq!(&pixel.0[..3], &RED.0, "landmark at {p:?}");
        assert_eq!(pixel.0[3], 255);
    }
}

#[test]
fn symmetry_images_keep_their_halves() {
    let face = tilted_face(6.0);
    let input = make_face_png(&face);
    let rasters = FaceMirror::new(input)
        .unwrap()
        .detection(face)
        .render()
        .unwrap();

    let (width, height) = rasters.aligned.dimensions();
    let half = width / 2;
    for y in 0..height {
        for x in 0..half {
            assert_eq!(rasters.left.get_pixel(x, y), rasters.aligned.get_pixel(x, y));
            assert_eq!(
                rasters.left.get_pixel(width - 1 - x, y),
                rasters.aligned.get_pixel(x, y)
            );
        }
        for x in half..width {
            assert_eq!(rasters.right.get_pixel(x, y), rasters.aligned.get_pixel(x, y));
            assert_eq!(
                rasters.right.get_pixel(width - 1 - x, y),
                rasters.aligned.get_pixel(x, y)
            );
        }
    }
}

#[test]
fn rotated_canvas_corners_are_transparent() {
    let face = tilted_face(20.0);
    let rasters = FaceMirror::new(make_face_png(&face))
        .unwrap()
        .detection(face)
        .render()
        .unwrap();
    assert_eq!(rasters.aligned.get_pixel(0, 0), &BACKGROUND);
    assert_eq!(rasters.aligned.get_pixel(219, 379), &BACKGROUND);
}

#[test]
fn lossless_output_decodes_to_the_same_rasters() {
    let face = tilted_face(-4.0);
    let mirror = FaceMirror::new(make_face_png(&face))
        .unwrap()
        .detection(face)
        .preset(Preset::Lossless);
    let rasters = mirror.render().unwrap();
    let photos = mirror.process().unwrap();

    let left = image::load_from_memory(&photos.left.data).unwrap().to_rgba8();
    assert_eq!(left, rasters.left);
    assert_eq!(photos.left.format, OutputFormat::Png);
}

#[test]
fn jpeg_output_is_flattened_onto_the_matte() {
    let face = tilted_face(25.0);
    let photos = FaceMirror::new(make_face_png(&face))
        .unwrap()
        .detection(face)
        .matte([255, 255, 255])
        .process()
        .unwrap();

    let aligned = image::load_from_memory(&photos.aligned.data)
        .unwrap()
        .to_rgb8();
    // Transparent corner becomes (near) white after JPEG round trip
    let corner = aligned.get_pixel(0, 0);
    assert!(corner.0.iter().all(|&c| c > 230), "corner {corner:?}");
}

#[test]
fn explicit_detection_wins_over_detector() {
    let face = tilted_face(0.0);
    let mut decoy = tilted_face(0.0);
    decoy.top_left = Point::new(0.0, 0.0);
    decoy.probability = 1.0;

    let rasters = FaceMirror::new(make_face_png(&face))
        .unwrap()
        .detector(Box::new(MockDetector { faces: vec![decoy] }))
        .detection(face.clone())
        .render()
        .unwrap();
    assert_eq!(rasters.detection, Some(face));
    assert_eq!(rasters.region.origin_x, 90.0);
}

#[test]
fn most_confident_face_is_used() {
    let face = tilted_face(-3.0);
    let mut weaker = tilted_face(12.0);
    weaker.probability = 0.5;

    let rasters = FaceMirror::new(make_face_png(&face))
        .unwrap()
        .detector(Box::new(MockDetector {
            faces: vec![weaker, face],
        }))
        .render()
        .unwrap();
    let angle = rasters.alignment.unwrap().angle_degrees;
    assert!((angle - 3.0).abs() < 1e-6, "angle {angle}");
}

#[test]
fn no_face_is_an_error() {
    let result = FaceMirror::new(make_gradient_png(200, 200))
        .unwrap()
        .detector(Box::new(MockDetector { faces: Vec::new() }))
        .process();
    assert!(matches!(result, Err(FaceMirrorError::NoFaceDetected)));
}

#[test]
fn face_box_outside_image_is_degenerate() {
    let mut face = tilted_face(0.0);
    face.top_left = Point::new(900.0, 900.0);
    face.bottom_right = Point::new(1000.0, 1000.0);
    let result = FaceMirror::new(make_gradient_png(200, 200))
        .unwrap()
        .detection(face)
        .process();
    assert!(matches!(
        result,
        Err(FaceMirrorError::DegenerateRegion { .. })
    ));
}

#[test]
fn manual_crop_needs_no_detector() {
    let photos = FaceMirror::new(make_gradient_png(300, 200))
        .unwrap()
        .mode(AlignmentMode::ManualCrop(CropRect {
            x: 50.0,
            y: 20.0,
            width: 120.0,
            height: 150.0,
        }))
        .process()
        .unwrap();

    assert!(photos.alignment.is_none());
    assert_eq!((photos.aligned.width, photos.aligned.height), (120, 150));
    assert_eq!((photos.left.width, photos.left.height), (120, 150));
    assert_eq!((photos.right.width, photos.right.height), (120, 150));
    assert_eq!(photos.region.origin_x, 50.0);
}

#[test]
fn manual_crop_outside_image_is_degenerate() {
    let result = FaceMirror::new(make_gradient_png(100, 100))
        .unwrap()
        .mode(AlignmentMode::ManualCrop(CropRect {
            x: 150.0,
            y: 0.0,
            width: 40.0,
            height: 40.0,
        }))
        .render();
    assert!(matches!(
        result,
        Err(FaceMirrorError::DegenerateRegion { .. })
    ));
}

#[test]
fn each_run_starts_fresh() {
    let first = tilted_face(8.0);
    let second = tilted_face(-15.0);
    let input = make_face_png(&first);

    let a = FaceMirror::new(input.clone())
        .unwrap()
        .detection(first)
        .render()
        .unwrap();
    let b = FaceMirror::new(input)
        .unwrap()
        .detection(second)
        .render()
        .unwrap();
    assert!((a.alignment.unwrap().angle_degrees + 8.0).abs() < 1e-6);
    assert!((b.alignment.unwrap().angle_degrees - 15.0).abs() < 1e-6);
}
