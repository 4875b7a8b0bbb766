use onera_io::image_pipeline::{OneraImageIO, StripCopyConfig, StripCopyPipeline};
use onera_io::logger;

use anyhow::{Context, bail};
use tracing::{error, info};

fn main() -> anyhow::Result<()> {
    logger::init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let (input, output) = match args.as_slice() {
        [input] => (input.as_str(), None),
        [input, output] => (input.as_str(), Some(output.as_str())),
        _ => bail!("usage: onera_io <input.ent> [output.ent]"),
    };

    let mut codec = OneraImageIO::new(input);
    if !codec.can_read_file() {
        bail!("{} is not an ONERA image", input);
    }

    let geometry = codec
        .read_image_information()
        .with_context(|| format!("reading header of {}", input))?;
    info!("Image: {}x{} complex float pixels", geometry.width, geometry.height);
    if let Some(fields) = codec.header_fields() {
        info!("Look data: {}", fields.look_data.as_deref().unwrap_or("-"));
    }
    codec.finish()?;

    if let Some(output) = output {
        let pipeline = StripCopyPipeline::new(StripCopyConfig::default())?;
        info!("Strip rows: {}", pipeline.config().strip_rows);

        match pipeline.copy_file(input, output) {
            Ok(_) => info!("Copy successful!"),
            Err(e) => {
                error!("Copy failed: {}", e);
                return Err(e.into());
            }
        }
    }

    Ok(())
}
