use glam::Vec2;
use image::{Rgba, RgbaImage};
use scratch_runtime::config::Screen;
use scratch_runtime::geometry::*;

fn stage() -> Screen {
    Screen::new(480, 360)
}

#[test]
fn small_sprite_is_fully_confined() {
    assert_eq!(fence_axis(300.0, 480, 32), 240.0);
    assert_eq!(fence_axis(-300.0, 480, 10), -240.0);
    assert_eq!(fence_axis(100.0, 480, 10), 100.0);
}

#[test]
fn large_sprite_may_overhang_sixteen_pixels() {
    // 240 + 64/2 - 16
    assert_eq!(fence_axis(300.0, 480, 64), 256.0);
    assert_eq!(fence_axis(-1000.0, 480, 64), -256.0);
    // 180 + 100/2 - 16
    assert_eq!(fence_axis(500.0, 360, 100), 214.0);
}

#[test]
fn fence_respects_bounds_for_all_sizes() {
    let screen = stage();
    for extent in [1u32, 16, 32, 33, 64, 200, 700] {
        for x in [-5000.0f32, -241.0, -10.0, 0.0, 239.5, 241.0, 5000.0] {
            let (fx, fy) = fence(x, x, &screen, extent, extent);
            let overhang = (extent as f32 / 2.0 - 16.0).max(0.0);
            assert!(fx.abs() <= 240.0 + overhang, "x={x} extent={extent} -> {fx}");
            assert!(fy.abs() <= 180.0 + overhang, "y={x} extent={extent} -> {fy}");
        }
    }
}

#[test]
fn fence_disabled_passes_through() {
    let screen = Screen { fencing: false, ..stage() };
    assert_eq!(fence(9000.0, -9000.0, &screen, 64, 64), (9000.0, -9000.0));
}

#[test]
fn screen_origin_unrotated_matches_linear_formula() {
    let screen = stage();
    let pivot = Vec2::new(12.0, 7.0);
    let (x, y) = screen_origin(30.0, -20.0, &screen, pivot, (40, 20), (40, 20), 0.0);
    assert_eq!(x, 30.0 + 240.0 - 12.0);
    assert_eq!(y, 180.0 + 20.0 - 7.0);
}

#[test]
fn screen_origin_centres_larger_rect_on_same_point() {
    let screen = stage();
    // Rect 10px wider/taller than the costume shifts the origin by half of that.
    let (x, y) = screen_origin(0.0, 0.0, &screen, Vec2::ZERO, (40, 20), (50, 30), 0.0);
    assert_eq!(x, 240.0 - 5.0);
    assert_eq!(y, 180.0 - 5.0);
}

#[test]
fn pivot_stays_fixed_under_rotation() {
    let screen = stage();
    let pivot = Vec2::new(10.0, 5.0);
    let sprite = (40u32, 20u32);
    for angle in [0.0f32, 30.0, 90.0, 135.0, -60.0, 180.0] {
        let rect = rotated_size(sprite.0, sprite.1, angle);
        let (ox, oy) = screen_origin(15.0, 25.0, &screen, pivot, sprite, rect, angle);
        let center = Vec2::new(ox + rect.0 as f32 / 2.0, oy + rect.1 as f32 / 2.0);
        let offset = rotate_screen_vec(pivot - Vec2::new(20.0, 10.0), angle);
        let pivot_on_screen = center + offset;
        assert!((pivot_on_screen.x - (15.0 + 240.0)).abs() < 1e-3, "angle {angle}");
        assert!((pivot_on_screen.y - (180.0 - 25.0)).abs() < 1e-3, "angle {angle}");
    }
}

#[test]
fn screen_to_stage_flips_y() {
    let screen = stage();
    assert_eq!(screen_to_stage(240.0, 180.0, &screen), (0, 0));
    assert_eq!(screen_to_stage(0.0, 0.0, &screen), (-240, 180));
    assert_eq!(screen_to_stage(480.0, 360.0, &screen), (240, -180));
}

#[test]
fn stage_bounds() {
    assert_eq!(scratch_runtime::geometry::stage_bounds(&stage()), (-240, 240, -180, 180));
}

#[test]
fn image_angle_follows_scratch_heading() {
    assert_eq!(image_angle(90.0), 0.0);
    assert_eq!(image_angle(0.0), 90.0);
    assert_eq!(image_angle(180.0), -90.0);
}

#[test]
fn rotate_image_zero_is_identity() {
    let mut img = RgbaImage::new(4, 2);
    img.put_pixel(3, 0, Rgba([1, 2, 3, 255]));
    assert_eq!(rotate_image(&img, 0.0), img);
    assert_eq!(rotate_image(&img, 360.0), img);
}

#[test]
fn rotate_image_quarter_turn_counter_clockwise() {
    let mut img = RgbaImage::new(4, 2);
    img.put_pixel(3, 0, Rgba([9, 9, 9, 255]));
    let out = rotate_image(&img, 90.0);
    assert_eq!(out.dimensions(), (2, 4));
    // Top-right corner moves to top-left.
    assert_eq!(out.get_pixel(0, 0).0, [9, 9, 9, 255]);
    assert_eq!(out.get_pixel(1, 3).0[3], 0);
}

#[test]
fn rotate_image_diagonal_leaves_transparent_corners() {
    let img = RgbaImage::from_pixel(10, 10, Rgba([255, 255, 255, 255]));
    let out = rotate_image(&img, 45.0);
    assert_eq!(out.dimensions(), (15, 15));
    assert_eq!(out.get_pixel(0, 0).0[3], 0);
    assert_eq!(out.get_pixel(7, 7).0[3], 255);
}
