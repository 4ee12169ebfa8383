//! Glance - ask a vision model what is in an image
//!
//! The pipeline is strictly sequential: the image file is read and base64
//! encoded, a single-turn chat request is assembled, one request is sent to an
//! OpenAI-compatible chat completions endpoint, and the first returned choice
//! is written out.

pub mod chat;
pub mod config;
pub mod error;
pub mod image;
pub mod openai;
pub mod report;
pub mod transport;

use std::io::Write;
use std::path::Path;

use tracing::debug;

pub use chat::{ChatRequest, ChatResponse, Choice};
pub use config::GlanceConfig;
pub use error::{Error, LlmError, Result};
pub use image::{EncodedImage, ImageFormat};
pub use openai::OpenAI;
pub use transport::{ChatTransport, MockTransport};

/// Describe one image.
///
/// Encodes `image`, sends it with `prompt` to `model` through `transport`, and
/// writes the first choice to `out`. The file is read before anything is
/// sent, so a missing image never reaches the network.
///
/// # Errors
///
/// Returns the first failure of any step; nothing is retried.
pub async fn describe_image<T, W>(
    transport: &T,
    model: &str,
    prompt: &str,
    image: &Path,
    format: ImageFormat,
    out: &mut W,
) -> Result<()>
where
    T: ChatTransport + ?Sized,
    W: Write,
{
    let encoded = crate::image::encode_image(image, format).await?;
    let request = ChatRequest::vision(model, prompt, &encoded);

    debug!(transport = transport.name(), model, "requesting description");
    let response = transport.complete(&request).await?;

    report::report(&response, out)
}

/// Run the pipeline with a validated configuration against `transport`.
///
/// # Errors
///
/// Returns [`Error::Config`] if the configuration is incomplete, otherwise
/// the first failure of the pipeline.
pub async fn run<T, W>(config: &GlanceConfig, transport: &T, out: &mut W) -> Result<()>
where
    T: ChatTransport + ?Sized,
    W: Write,
{
    config.validate()?;
    let image = config
        .image
        .as_deref()
        .ok_or_else(|| Error::config("no image path given"))?;

    describe_image(
        transport,
        &config.model,
        &config.prompt,
        image,
        config.format,
        out,
    )
    .await
}
