use super::*;

fn frame_with_opaque_rect(width: i32, height: i32, rect: PixelRect) -> RasterFrame {
    let mut frame = RasterFrame::new(width, height).unwrap();
    for y in rect.y..rect.y + rect.height {
        for x in rect.x..rect.x + rect.width {
            frame.put_pixel(x, y, [10, 20, 30, 255]);
        }
    }
    frame
}

#[test]
fn clip_transparent_edge_finds_opaque_bounds() {
    let rect = PixelRect::new(3, 2, 5, 4);
    let frame = frame_with_opaque_rect(16, 16, rect);
    assert_eq!(clip_transparent_edge(&frame), rect);
}

#[test]
fn clip_transparent_edge_of_blank_frame_is_one_pixel() {
    let frame = RasterFrame::new(16, 16).unwrap();
    assert_eq!(clip_transparent_edge(&frame), PixelRect::new(0, 0, 1, 1));
}

#[test]
fn diff_rect_of_identical_frames_is_empty() {
    let a = frame_with_opaque_rect(16, 16, PixelRect::new(1, 1, 6, 6));
    let b = a.clone();
    let diff = diff_rect(&a, &b);
    assert!(diff.is_empty());
    assert_eq!(diff, PixelRect::zero());
    assert!(is_static(&a, &b));
}

#[test]
fn diff_rect_bounds_the_changed_pixels() {
    let a = RasterFrame::new(16, 16).unwrap();
    let mut b = a.clone();
    b.put_pixel(4, 5, [1, 2, 3, 4]);
    b.put_pixel(9, 11, [5, 6, 7, 8]);
    assert_eq!(diff_rect(&a, &b), PixelRect::new(4, 5, 6, 7));
    assert!(!is_static(&a, &b));
}

#[test]
fn expand_grows_only_edges_near_the_previous_rect() {
    let canvas = 100;
    let last = PixelRect::new(10, 10, 20, 20);
    // Fully inside the previous rect: every edge expands.
    let src = PixelRect::new(12, 12, 10, 10);
    let out = expand_rect_range(src, last, canvas, canvas, 4);
    assert_eq!(out, PixelRect::new(8, 8, 18, 18));
    assert!(out.contains_rect(src));

    // Far from the previous rect: nothing expands.
    let src = PixelRect::new(60, 60, 10, 10);
    assert_eq!(expand_rect_range(src, last, canvas, canvas, 4), src);
}

#[test]
fn expand_never_leaves_the_canvas() {
    let last = PixelRect::new(0, 0, 100, 100);
    let src = PixelRect::new(1, 1, 98, 98);
    let out = expand_rect_range(src, last, 100, 100, 4);
    assert!(PixelRect::full(100, 100).contains_rect(out));
    assert_eq!(out, PixelRect::full(100, 100));
}

#[test]
fn detect_alpha_ignores_fully_opaque_buffers() {
    let mut frame = RasterFrame::new(8, 8).unwrap();
    for y in 0..8 {
        for x in 0..8 {
            frame.put_pixel(x, y, [0, 0, 0, 255]);
        }
    }
    assert!(!detect_alpha(&frame));
    frame.put_pixel(7, 7, [0, 0, 0, 254]);
    assert!(detect_alpha(&frame));
}

#[test]
fn odd_padding_duplicates_last_column_and_row() {
    let mut frame = RasterFrame::new(3, 3).unwrap();
    for y in 0..3 {
        for x in 0..3 {
            frame.put_pixel(x, y, [x as u8, y as u8, 0, 255]);
        }
    }
    odd_padding_rgba(&mut frame);
    // Column 3 mirrors column 2 on every row.
    for y in 0..3 {
        assert_eq!(frame.pixel(3, y), frame.pixel(2, y));
    }
    // Row 3 mirrors row 2, padded column included.
    for x in 0..4 {
        assert_eq!(frame.pixel(x, 3), frame.pixel(x, 2));
    }
}

#[test]
fn odd_padding_leaves_even_frames_alone() {
    let mut frame = frame_with_opaque_rect(4, 4, PixelRect::full(4, 4));
    let before = frame.bytes().to_vec();
    odd_padding_rgba(&mut frame);
    assert_eq!(frame.bytes(), &before[..]);
}

#[test]
fn opaque_bounds_accumulate_across_frames() {
    let mut bounds = OpaqueBounds::new();
    assert_eq!(bounds.to_rect(), None);

    bounds.accumulate(&frame_with_opaque_rect(32, 32, PixelRect::new(2, 3, 4, 4)));
    assert_eq!(bounds.to_rect(), Some(PixelRect::new(2, 3, 4, 4)));

    bounds.accumulate(&frame_with_opaque_rect(32, 32, PixelRect::new(10, 1, 6, 2)));
    assert_eq!(bounds.to_rect(), Some(PixelRect::new(2, 1, 14, 6)));
    assert!(!bounds.covers(32, 32));

    bounds.accumulate(&frame_with_opaque_rect(32, 32, PixelRect::full(32, 32)));
    assert!(bounds.covers(32, 32));
}

#[test]
fn copy_rect_extracts_the_sub_rect() {
    let src = frame_with_opaque_rect(16, 16, PixelRect::new(5, 6, 3, 2));
    let mut dst = RasterFrame::new(3, 2).unwrap();
    copy_rect(&mut dst, &src, PixelRect::new(5, 6, 3, 2));
    for y in 0..2 {
        for x in 0..3 {
            assert_eq!(dst.pixel(x, y), [10, 20, 30, 255]);
        }
    }
}

#[test]
fn unity_scale_is_an_exact_copy() {
    let mut src = RasterFrame::new(6, 6).unwrap();
    for y in 0..6 {
        for x in 0..6 {
            src.put_pixel(x, y, [x as u8 * 40, y as u8 * 40, 7, 255]);
        }
    }
    let mut dst = RasterFrame::new(6, 6).unwrap();
    scale_bilinear(&mut dst, &src, PixelRect::full(6, 6));
    for y in 0..6 {
        for x in 0..6 {
            assert_eq!(dst.pixel(x, y), src.pixel(x, y));
        }
    }
}

#[test]
fn downscale_of_constant_color_stays_constant() {
    let src = frame_with_opaque_rect(8, 8, PixelRect::full(8, 8));
    let mut dst = RasterFrame::new(3, 3).unwrap();
    scale_bilinear(&mut dst, &src, PixelRect::full(8, 8));
    for y in 0..3 {
        for x in 0..3 {
            assert_eq!(dst.pixel(x, y), [10, 20, 30, 255]);
        }
    }
}
