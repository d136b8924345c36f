use std::path::PathBuf;

fn write_fixture(dir: &PathBuf) -> PathBuf {
    std::fs::create_dir_all(dir).unwrap();

    let bg = image::RgbaImage::from_pixel(8, 8, image::Rgba([230, 220, 200, 255]));
    image::DynamicImage::ImageRgba8(bg)
        .save_with_format(dir.join("bg.png"), image::ImageFormat::Png)
        .unwrap();

    let manifest_path = dir.join("manifest.json");
    let manifest = serde_json::json!({
        "eventType": "birthday",
        "templates": [{
            "id": "b-001",
            "size": {"w": 32, "h": 40},
            "frontBg": "bg.png",
            "frontFields": [
                {"key": "name", "x": 16, "y": 20, "fontSize": 10}
            ]
        }]
    });
    std::fs::write(&manifest_path, serde_json::to_string_pretty(&manifest).unwrap()).unwrap();
    manifest_path
}

fn cli_exe() -> PathBuf {
    std::env::var_os("CARGO_BIN_EXE_invitra")
        .map(PathBuf::from)
        .unwrap_or_else(|| {
            let mut p = PathBuf::from("target").join("debug");
            p.push(if cfg!(windows) {
                "invitra.exe"
            } else {
                "invitra"
            });
            p
        })
}

#[test]
fn cli_validates_a_manifest() {
    let dir = PathBuf::from("target").join("cli_smoke_validate");
    let manifest_path = write_fixture(&dir);

    let status = std::process::Command::new(cli_exe())
        .args(["validate", "--manifest"])
        .arg(&manifest_path)
        .status()
        .unwrap();
    assert!(status.success());
}

#[test]
fn cli_mockup_writes_png() {
    let dir = PathBuf::from("target").join("cli_smoke_mockup");
    let manifest_path = write_fixture(&dir);
    let out_path = dir.join("out.png");
    let _ = std::fs::remove_file(&out_path);

    let values_path = dir.join("values.json");
    std::fs::write(&values_path, r#"{"name": "נועה"}"#).unwrap();

    let status = std::process::Command::new(cli_exe())
        .args(["mockup", "--template", "b-001", "--manifest"])
        .arg(&manifest_path)
        .args(["--values"])
        .arg(&values_path)
        .args(["--out"])
        .arg(&out_path)
        .status()
        .unwrap();

    assert!(status.success());
    assert!(out_path.exists());

    // Single-sided template: the composite keeps the template's dimensions.
    let png = image::open(&out_path).unwrap();
    assert_eq!((png.width(), png.height()), (32, 40));
}
