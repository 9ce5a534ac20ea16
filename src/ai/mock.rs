use super::{EditedImage, ImageEditService};
use crate::image::PreparedImage;
use crate::{Error, Result};
use async_trait::async_trait;
use image::{DynamicImage, ImageFormat, Rgba, RgbaImage};
use std::collections::VecDeque;
use std::io::Cursor;
use std::sync::{Arc, Mutex};

/// Scripted stand-in for the vendor edit API.
///
/// Scripted edit outcomes are consumed in order; once exhausted every call
/// succeeds with a generated URL. Clones share state so a test can keep a
/// probe after handing the client to the pipeline.
#[derive(Clone)]
pub struct MockImageEditClient {
    edit_responses: Arc<Mutex<VecDeque<std::result::Result<String, String>>>>,
    fetch_response: Arc<Mutex<Option<std::result::Result<Vec<u8>, String>>>>,
    prompts: Arc<Mutex<Vec<String>>>,
    call_count: Arc<Mutex<usize>>,
    fetch_count: Arc<Mutex<usize>>,
}

impl MockImageEditClient {
    pub fn new() -> Self {
        Self {
            edit_responses: Arc::new(Mutex::new(VecDeque::new())),
            fetch_response: Arc::new(Mutex::new(None)),
            prompts: Arc::new(Mutex::new(Vec::new())),
            call_count: Arc::new(Mutex::new(0)),
            fetch_count: Arc::new(Mutex::new(0)),
        }
    }

    pub fn with_edit_response(self, url: String) -> Self {
        self.edit_responses.lock().unwrap().push_back(Ok(url));
        self
    }

    pub fn with_edit_failure(self, message: String) -> Self {
        self.edit_responses.lock().unwrap().push_back(Err(message));
        self
    }

    pub fn with_fetch_response(self, bytes: Vec<u8>) -> Self {
        *self.fetch_response.lock().unwrap() = Some(Ok(bytes));
        self
    }

    pub fn with_fetch_failure(self, message: String) -> Self {
        *self.fetch_response.lock().unwrap() = Some(Err(message));
        self
    }

    pub fn get_call_count(&self) -> usize {
        *self.call_count.lock().unwrap()
    }

    pub fn get_fetch_count(&self) -> usize {
        *self.fetch_count.lock().unwrap()
    }

    /// Prompts in the order the edit calls received them.
    pub fn get_prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }

    /// A small opaque PNG standing in for a downloaded vendor result.
    pub fn sample_png() -> Vec<u8> {
        let img = RgbaImage::from_pixel(8, 8, Rgba([30, 144, 255, 255]));
        let mut buffer = Vec::new();
        DynamicImage::ImageRgba8(img)
            .write_to(&mut Cursor::new(&mut buffer), ImageFormat::Png)
            .expect("encode sample png");
        buffer
    }
}

impl Default for MockImageEditClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ImageEditService for MockImageEditClient {
    async fn edit_image(&self, _image: &PreparedImage, prompt: &str) -> Result<EditedImage> {
        let count = {
            let mut count = self.call_count.lock().unwrap();
            *count += 1;
            *count
        };
        self.prompts.lock().unwrap().push(prompt.to_string());

        match self.edit_responses.lock().unwrap().pop_front() {
            Some(Ok(url)) => Ok(EditedImage { url }),
            Some(Err(message)) => Err(Error::AiProvider(message)),
            None => Ok(EditedImage {
                url: format!("https://mock-images.example.com/edit-{}.png", count),
            }),
        }
    }

    async fn fetch_image(&self, _url: &str) -> Result<Vec<u8>> {
        *self.fetch_count.lock().unwrap() += 1;

        match self.fetch_response.lock().unwrap().clone() {
            Some(Ok(bytes)) => Ok(bytes),
            Some(Err(message)) => Err(Error::AiProvider(message)),
            None => Ok(Self::sample_png()),
        }
    }
}
