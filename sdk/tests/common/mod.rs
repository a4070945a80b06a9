//! In-process stand-ins for the upload endpoint and the claim service.
#![allow(dead_code)]

use std::io::Cursor;
use std::sync::{Arc, Mutex};

use actix_web::http::StatusCode;
use actix_web::{web, App, HttpResponse, HttpServer};
use claim_sdk::{ClaimConfig, CompressedImage, Registrant};
use image::{DynamicImage, ImageBuffer, ImageFormat, Rgb};
use serde_json::Value;

/// Canned response for one endpoint.
#[derive(Clone)]
pub struct MockReply {
    pub status: u16,
    pub body: String,
}

impl MockReply {
    pub fn json(status: u16, body: Value) -> Self {
        Self {
            status,
            body: body.to_string(),
        }
    }

    pub fn text(status: u16, body: &str) -> Self {
        Self {
            status,
            body: body.to_string(),
        }
    }
}

/// What the mock endpoints received.
#[derive(Clone, Default)]
pub struct Recorded {
    pub uploads: Arc<Mutex<Vec<Vec<u8>>>>,
    pub claims: Arc<Mutex<Vec<Value>>>,
}

impl Recorded {
    pub fn upload_count(&self) -> usize {
        self.uploads.lock().unwrap().len()
    }

    pub fn claims(&self) -> Vec<Value> {
        self.claims.lock().unwrap().clone()
    }
}

#[derive(Clone)]
struct MockState {
    upload: MockReply,
    claim: MockReply,
    recorded: Recorded,
}

pub struct MockService {
    pub base_url: String,
    pub recorded: Recorded,
}

impl MockService {
    pub fn upload_url(&self) -> String {
        format!("{}/upload.php", self.base_url)
    }

    pub fn config(&self) -> ClaimConfig {
        ClaimConfig {
            campaign: "Campaña Test".to_string(),
            api_url: self.base_url.clone(),
            upload_url: self.upload_url(),
            ..ClaimConfig::default()
        }
    }
}

async fn upload(state: web::Data<MockState>, body: web::Bytes) -> HttpResponse {
    state.recorded.uploads.lock().unwrap().push(body.to_vec());
    reply(&state.upload)
}

async fn claim(state: web::Data<MockState>, body: web::Json<Value>) -> HttpResponse {
    state.recorded.claims.lock().unwrap().push(body.into_inner());
    reply(&state.claim)
}

fn reply(canned: &MockReply) -> HttpResponse {
    HttpResponse::build(StatusCode::from_u16(canned.status).unwrap())
        .content_type("application/json")
        .body(canned.body.clone())
}

/// Starts both endpoints on an ephemeral port. Must run inside an actix system.
pub fn start(upload_reply: MockReply, claim_reply: MockReply) -> MockService {
    let recorded = Recorded::default();
    let state = MockState {
        upload: upload_reply,
        claim: claim_reply,
        recorded: recorded.clone(),
    };
    let server = HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(state.clone()))
            .route("/upload.php", web::post().to(upload))
            .route("/api/v1/claim", web::post().to(claim))
    })
    .workers(1)
    .bind(("127.0.0.1", 0))
    .unwrap();
    let addr = server.addrs()[0];
    actix_rt::spawn(server.run());

    MockService {
        base_url: format!("http://{}", addr),
        recorded,
    }
}

/// A base URL nothing listens on.
pub fn unreachable_url() -> String {
    "http://127.0.0.1:1".to_string()
}

pub fn sample_png(width: u32, height: u32) -> Vec<u8> {
    let buffer = ImageBuffer::from_fn(width, height, |x, y| Rgb([x as u8, y as u8, 128]));
    let mut bytes = Cursor::new(Vec::new());
    DynamicImage::ImageRgb8(buffer)
        .write_to(&mut bytes, ImageFormat::Png)
        .unwrap();
    bytes.into_inner()
}

pub fn registrant(dni: Option<&str>) -> Registrant {
    Registrant {
        name: "Ana Torres".to_string(),
        phone_number: "987654321".to_string(),
        dni: dni.map(str::to_string),
        store_id: "store-42".to_string(),
        photo: CompressedImage {
            file_name: "selfie.jpg".to_string(),
            content_type: "image/jpeg".to_string(),
            bytes: b"jpeg-bytes".to_vec(),
            width: 1,
            height: 1,
        },
    }
}
