//! End-to-end tests against a real server on an ephemeral port.

use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use image_converter::config::ServerConfig;
use image_converter::web::{self, AppState};
use reqwest::header::LOCATION;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, StatusCode, Url};
use std::io::Cursor;
use std::path::Path;
use tempfile::TempDir;
use tokio::net::TcpListener;

struct TestServer {
    base: Url,
    client: Client,
    dir: TempDir,
}

impl TestServer {
    async fn start() -> Self {
        Self::start_with(|_| {}).await
    }

    async fn start_with(configure: impl FnOnce(&mut ServerConfig)) -> Self {
        let dir = TempDir::new().unwrap();
        let mut config = ServerConfig::default();
        config.storage.upload_dir = dir.path().join("uploads");
        config.storage.result_dir = dir.path().join("static");
        configure(&mut config);

        let state = AppState::new(&config).await.unwrap();
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(web::serve(listener, state));

        let client = Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .unwrap();
        Self {
            base: Url::parse(&format!("http://{addr}/")).unwrap(),
            client,
            dir,
        }
    }

    fn url(&self, path: &str) -> Url {
        self.base.join(path).unwrap()
    }

    fn upload_files(&self) -> Vec<String> {
        file_names(&self.dir.path().join("uploads"))
    }

    fn result_files(&self) -> Vec<String> {
        file_names(&self.dir.path().join("static"))
    }

    async fn submit(&self, form: Form) -> reqwest::Response {
        self.client
            .post(self.url("/"))
            .multipart(form)
            .send()
            .await
            .unwrap()
    }
}

fn file_names(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

fn png_bytes(img: &DynamicImage) -> Vec<u8> {
    let mut buf = Vec::new();
    img.write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)
        .unwrap();
    buf
}

fn red_png(width: u32, height: u32) -> Vec<u8> {
    png_bytes(&DynamicImage::ImageRgb8(RgbImage::from_pixel(
        width,
        height,
        Rgb([255, 0, 0]),
    )))
}

/// Every pixel distinct enough that PNG cannot compress it away.
fn gradient_png(width: u32, height: u32) -> Vec<u8> {
    png_bytes(&DynamicImage::ImageRgb8(RgbImage::from_fn(
        width,
        height,
        |x, y| Rgb([x as u8, y as u8, (x ^ y) as u8]),
    )))
}

fn grayscale_form(name: &str, bytes: Vec<u8>) -> Form {
    Form::new()
        .part("image", image_part(name, bytes))
        .text("operation", "grayscale")
}

fn image_part(name: &str, bytes: Vec<u8>) -> Part {
    Part::bytes(bytes).file_name(name.to_string())
}

fn location_query(response: &reqwest::Response, base: &Url) -> Vec<(String, String)> {
    let location = response.headers().get(LOCATION).unwrap().to_str().unwrap();
    let url = base.join(location).unwrap();
    assert_eq!(url.path(), "/result");
    url.query_pairs()
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect()
}

fn query_value<'a>(pairs: &'a [(String, String)], key: &str) -> &'a str {
    pairs
        .iter()
        .find(|(k, _)| k == key)
        .map(|(_, v)| v.as_str())
        .unwrap()
}

#[tokio::test]
async fn index_serves_upload_form() {
    let server = TestServer::start().await;
    let response = server.client.get(server.url("/")).send().await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = response.text().await.unwrap();
    assert!(body.contains(r#"enctype="multipart/form-data""#));
    assert!(body.contains(r#"value="grayscale""#));
    assert!(body.contains(r#"value="blur""#));
}

#[tokio::test]
async fn grayscale_upload_redirects_to_result() {
    let server = TestServer::start().await;
    let original = red_png(2, 2);
    let form = Form::new()
        .part("image", image_part("red.png", original.clone()))
        .text("operation", "grayscale");

    let response = server.submit(form).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    let pairs = location_query(&response, &server.base);
    let input = query_value(&pairs, "input_image").to_string();
    let output = query_value(&pairs, "output_image").to_string();
    assert_eq!(query_value(&pairs, "name"), "red.png");
    assert!(input.ends_with(".png"));
    assert!(output.starts_with("processed_"));
    assert!(output.ends_with("-grayscale.png"));

    assert_eq!(server.upload_files(), vec![input.clone()]);
    assert_eq!(server.result_files(), vec![output.clone()]);

    // Result page shows both images.
    let location = response.headers().get(LOCATION).unwrap().to_str().unwrap();
    let page = server.client.get(server.url(location)).send().await.unwrap();
    assert_eq!(page.status(), StatusCode::OK);
    let body = page.text().await.unwrap();
    assert!(body.contains(&format!("/uploads/{input}")));
    assert!(body.contains(&format!("/static/{output}")));
    assert!(body.contains("red.png"));

    // Raw upload is served unchanged.
    let raw = server
        .client
        .get(server.url(&format!("/uploads/{input}")))
        .send()
        .await
        .unwrap();
    assert_eq!(raw.status(), StatusCode::OK);
    assert_eq!(raw.bytes().await.unwrap().as_ref(), original.as_slice());

    // Processed image is a uniform unweighted mean.
    let processed = server
        .client
        .get(server.url(&format!("/static/{output}")))
        .send()
        .await
        .unwrap();
    assert_eq!(processed.status(), StatusCode::OK);
    let img = image::load_from_memory(&processed.bytes().await.unwrap())
        .unwrap()
        .to_rgb8();
    assert_eq!(img.dimensions(), (2, 2));
    assert!(img.pixels().all(|p| p.0 == [85, 85, 85]));
}

#[tokio::test]
async fn blur_keeps_dimensions() {
    let server = TestServer::start().await;
    let form = Form::new()
        .part("image", image_part("wide.png", red_png(32, 24)))
        .text("operation", "blur");

    let response = server.submit(form).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    let pairs = location_query(&response, &server.base);
    let output = query_value(&pairs, "output_image");
    assert!(output.ends_with("-blur.png"));

    let img = image::open(server.dir.path().join("static").join(output)).unwrap();
    assert_eq!((img.width(), img.height()), (32, 24));
}

#[tokio::test]
async fn missing_upload_is_rejected_without_writing() {
    let server = TestServer::start().await;

    let response = server
        .submit(Form::new().text("operation", "grayscale"))
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(response.text().await.unwrap().contains("Please upload an image!"));

    // What a browser sends when no file is chosen.
    let empty = Form::new()
        .part("image", image_part("", Vec::new()))
        .text("operation", "grayscale");
    let response = server.submit(empty).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    assert!(server.upload_files().is_empty());
    assert!(server.result_files().is_empty());
}

#[tokio::test]
async fn missing_operation_is_rejected_without_writing() {
    let server = TestServer::start().await;
    let form = Form::new().part("image", image_part("red.png", red_png(2, 2)));

    let response = server.submit(form).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(response.text().await.unwrap().contains("Please select an operation!"));
    assert!(server.upload_files().is_empty());
    assert!(server.result_files().is_empty());
}

#[tokio::test]
async fn unknown_operation_is_rejected_and_server_keeps_running() {
    let server = TestServer::start().await;
    let form = Form::new()
        .part("image", image_part("red.png", red_png(2, 2)))
        .text("operation", "sepia");

    let response = server.submit(form).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(response.text().await.unwrap().contains("sepia"));
    assert!(server.upload_files().is_empty());
    assert!(server.result_files().is_empty());

    let response = server.client.get(server.url("/")).send().await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn undecodable_upload_is_discarded() {
    let server = TestServer::start().await;
    let form = Form::new()
        .part("image", image_part("notes.png", b"definitely not pixels".to_vec()))
        .text("operation", "blur");

    let response = server.submit(form).await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert!(
        response
            .text()
            .await
            .unwrap()
            .contains("not a readable image")
    );
    assert!(server.upload_files().is_empty());
    assert!(server.result_files().is_empty());
}

#[tokio::test]
async fn result_page_without_query_is_bad_request() {
    let server = TestServer::start().await;
    let response = server.client.get(server.url("/result")).send().await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn oversized_upload_is_rejected_with_413() {
    let server = TestServer::start_with(|config| config.server.max_upload_bytes = 1024).await;
    let response = server
        .submit(grayscale_form("big.png", gradient_png(256, 256)))
        .await;

    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    assert!(response.text().await.unwrap().contains("That file is too large."));
    assert!(server.upload_files().is_empty());
    assert!(server.result_files().is_empty());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_identical_uploads_all_succeed() {
    let server = TestServer::start().await;
    let png = gradient_png(512, 512);

    let mut requests = Vec::new();
    for i in 0..24 {
        let client = server.client.clone();
        let url = server.url("/");
        let form = grayscale_form(&format!("same-{i}.png"), png.clone());
        requests.push(tokio::spawn(async move {
            client.post(url).multipart(form).send().await.unwrap()
        }));
    }

    let mut outputs = Vec::new();
    for request in requests {
        let response = request.await.unwrap();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        let pairs = location_query(&response, &server.base);
        outputs.push(query_value(&pairs, "output_image").to_string());
    }
    outputs.dedup();
    assert_eq!(outputs.len(), 1);

    let uploads = server.upload_files();
    assert_eq!(uploads.len(), 1);
    let stored = std::fs::read(server.dir.path().join("uploads").join(&uploads[0])).unwrap();
    assert_eq!(stored, png);

    assert_eq!(server.result_files(), outputs);
    let result = image::open(server.dir.path().join("static").join(&outputs[0]))
        .unwrap()
        .to_rgb8();
    assert_eq!(result.dimensions(), (512, 512));
    assert!(result.pixels().all(|p| p.0[0] == p.0[1] && p.0[1] == p.0[2]));
}
