use invitra::{LoadedImage, MemoryImageLoader, MockupCompositor, Surface, Template};

fn double_sided_template(json_positions: &str) -> Template {
    let json = format!(
        r#"{{
            "id": "wedding-001",
            "size": {{"w": 30, "h": 30}},
            "backBg": "back-bg",
            "mockupBg": "mockup-bg",
            "mockupLayout": {json_positions}
        }}"#
    );
    let t: Template = serde_json::from_str(&json).unwrap();
    t.validate().unwrap();
    t
}

fn solid_surface(w: u32, h: u32, rgba: [u8; 4]) -> Surface {
    let mut s = Surface::new(w, h).unwrap();
    let [r, g, b, a] = rgba;
    for px in s.data_mut().chunks_exact_mut(4) {
        px.copy_from_slice(&[r, g, b, a]);
    }
    s
}

fn px(surface: &Surface, x: u32, y: u32) -> [u8; 4] {
    let i = ((y * surface.width() + x) * 4) as usize;
    surface.data()[i..i + 4].try_into().unwrap()
}

#[test]
fn output_matches_mockup_background_dimensions() {
    let t = double_sided_template(
        r#"{"frontPosition": {"x": 40, "y": 40}, "backPosition": {"x": 20, "y": 20}}"#,
    );
    let mut loader = MemoryImageLoader::new();
    loader.insert("mockup-bg", LoadedImage::solid(100, 80, [255, 255, 255, 255]));

    let front = solid_surface(30, 30, [255, 0, 0, 255]);
    let back = solid_surface(30, 30, [0, 0, 255, 255]);

    let out = MockupCompositor::new(&loader)
        .compose(&front, Some(&back), &t)
        .unwrap();
    assert_eq!((out.width(), out.height()), (100, 80));
}

#[test]
fn front_layer_wins_where_footprints_overlap() {
    let t = double_sided_template(
        r#"{"frontPosition": {"x": 40, "y": 40}, "backPosition": {"x": 20, "y": 20}}"#,
    );
    let mut loader = MemoryImageLoader::new();
    loader.insert("mockup-bg", LoadedImage::solid(100, 100, [255, 255, 255, 255]));

    let front = solid_surface(30, 30, [255, 0, 0, 255]);
    let back = solid_surface(30, 30, [0, 0, 255, 255]);

    let out = MockupCompositor::new(&loader)
        .compose(&front, Some(&back), &t)
        .unwrap();

    // (45, 45) lies inside both layers' footprints: the front pixel wins.
    assert_eq!(px(&out, 45, 45), [255, 0, 0, 255]);
    // (25, 25) lies only inside the back layer.
    assert_eq!(px(&out, 25, 25), [0, 0, 255, 255]);
    // (90, 10) is untouched mockup background.
    assert_eq!(px(&out, 90, 10), [255, 255, 255, 255]);
}

#[test]
fn layers_cast_a_drop_shadow_on_the_backdrop() {
    let t = double_sided_template(
        r#"{"frontPosition": {"x": 60, "y": 10}, "backPosition": {"x": 10, "y": 10}}"#,
    );
    let mut loader = MemoryImageLoader::new();
    loader.insert("mockup-bg", LoadedImage::solid(120, 120, [255, 255, 255, 255]));

    let front = solid_surface(30, 30, [255, 0, 0, 255]);
    let back = solid_surface(30, 30, [0, 0, 255, 255]);

    let out = MockupCompositor::new(&loader)
        .compose(&front, Some(&back), &t)
        .unwrap();

    // Just below the back layer (offset +10 shifts the shadow down) the white
    // backdrop is darkened but still opaque.
    let p = px(&out, 25, 52);
    assert_eq!(p[3], 255);
    assert!(p[0] < 250, "expected shadow darkening, got {p:?}");
}

#[test]
fn scale_shrinks_the_layer_footprint() {
    let t = double_sided_template(
        r#"{"frontPosition": {"x": 50, "y": 50, "scale": 0.5}, "backPosition": {"x": 5, "y": 5}}"#,
    );
    let mut loader = MemoryImageLoader::new();
    loader.insert("mockup-bg", LoadedImage::solid(100, 100, [255, 255, 255, 255]));

    let front = solid_surface(30, 30, [255, 0, 0, 255]);
    let back = solid_surface(30, 30, [0, 0, 255, 255]);

    let out = MockupCompositor::new(&loader)
        .compose(&front, Some(&back), &t)
        .unwrap();

    // A 30px layer at 0.5 scale covers 15px: inside at (57, 57); (90, 90) is
    // beyond both the footprint and its shadow's reach.
    assert_eq!(px(&out, 57, 57), [255, 0, 0, 255]);
    assert_eq!(px(&out, 90, 90), [255, 255, 255, 255]);
}

#[test]
fn single_sided_template_copies_front_verbatim() {
    let t: Template = serde_json::from_str(r#"{"id": "s", "size": {"w": 6, "h": 6}}"#).unwrap();
    let loader = MemoryImageLoader::new();
    let front = solid_surface(6, 6, [12, 34, 56, 255]);

    let out = MockupCompositor::new(&loader)
        .compose(&front, None, &t)
        .unwrap();
    assert_eq!(out.data(), front.data());
    assert_eq!((out.width(), out.height()), (6, 6));
}

#[test]
fn missing_back_surface_fails_loudly() {
    let t = double_sided_template(
        r#"{"frontPosition": {"x": 0, "y": 0}, "backPosition": {"x": 0, "y": 0}}"#,
    );
    let mut loader = MemoryImageLoader::new();
    loader.insert("mockup-bg", LoadedImage::solid(50, 50, [255, 255, 255, 255]));

    let front = solid_surface(30, 30, [255, 0, 0, 255]);
    let err = MockupCompositor::new(&loader)
        .compose(&front, None, &t)
        .unwrap_err();
    assert!(err.to_string().contains("composite error:"));
}
