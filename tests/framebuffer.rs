use first_opengl::config::{Rgba, CLEAR_COLOR, TRIANGLE_COLOR};
use first_opengl::graphics::geometry::triangle_vertices;
use first_opengl::interface::headless::HeadlessPlatform;
use first_opengl::run;

fn after_frames(frames: usize) -> HeadlessPlatform {
    let mut platform = HeadlessPlatform::new().close_after(frames);
    run(&mut platform, &mut Vec::<u8>::new()).unwrap();
    platform
}

fn close_to(a: Rgba, b: Rgba) -> bool {
    let lsb = 1.0 / 255.0;
    a.to_array()
        .iter()
        .zip(b.to_array().iter())
        .all(|(x, y)| (x - y).abs() <= lsb)
}

#[test]
fn center_is_orange_and_corner_is_background() {
    let platform = after_frames(1);
    let gpu = platform.gpu();

    assert!(close_to(gpu.pixel(400, 400).unwrap(), TRIANGLE_COLOR));
    assert!(close_to(gpu.pixel(10, 10).unwrap(), CLEAR_COLOR));
    assert!(close_to(gpu.pixel(790, 790).unwrap(), CLEAR_COLOR));
}

#[test]
fn tenth_frame_center_is_orange() {
    let platform = after_frames(10);
    assert_eq!(platform.gpu().pixel(400, 400), Some(TRIANGLE_COLOR));
}

#[test]
fn triangle_covers_its_area() {
    let platform = after_frames(1);
    let gpu = platform.gpu();

    // Unit side in clip space is 400 px across an 800 px viewport.
    let expected = 3f64.sqrt() / 4.0 * 400.0 * 400.0;
    let covered = gpu.count_pixels(TRIANGLE_COLOR) as f64;
    assert!((covered - expected).abs() / expected < 0.02, "covered {} px", covered);

    let background = gpu.count_pixels(CLEAR_COLOR);
    assert_eq!(covered as usize + background, 800 * 800);
}

#[test]
fn vertices_land_where_expected() {
    let v = triangle_vertices();
    let to_window = |x: f32, y: f32| ((x + 1.0) * 400.0, (y + 1.0) * 400.0);

    let (ax, ay) = to_window(v[0], v[1]);
    let (bx, by) = to_window(v[3], v[4]);
    let (cx, cy) = to_window(v[6], v[7]);
    assert!((ax - 200.0).abs() < 1e-3 && (ay - 284.53).abs() < 1e-2);
    assert!((bx - 600.0).abs() < 1e-3 && (by - 284.53).abs() < 1e-2);
    assert!((cx - 400.0).abs() < 1e-3 && (cy - 630.94).abs() < 1e-2);

    let platform = after_frames(1);
    let gpu = platform.gpu();
    let orange = |x, y| gpu.pixel(x, y) == Some(TRIANGLE_COLOR);

    assert!(orange(400, 290) && !orange(400, 280));
    assert!(orange(210, 290) && !orange(190, 290));
    assert!(orange(590, 290) && !orange(610, 290));
    assert!(orange(400, 628) && !orange(400, 632));
}
