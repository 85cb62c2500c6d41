use argh::FromArgs;
use std::path::{Path, PathBuf};
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use kuwahara::{
    image::{Image, ImageSize},
    imgproc::{
        kuwahara::{KuwaharaFilter, KuwaharaOutput, KuwaharaParams, KuwaharaVariant},
        parallel::ExecutionStrategy,
    },
};

#[derive(FromArgs)]
/// Apply the anisotropic kuwahara filter to an image
struct Args {
    /// path to the input image
    #[argh(option, short = 'i')]
    input: PathBuf,

    /// directory where the output images are written
    #[argh(option, short = 'o', default = "PathBuf::from(\".\")")]
    output_dir: PathBuf,

    /// JSON file with the filter parameters
    #[argh(option)]
    config: Option<PathBuf>,

    /// the standard deviation of the structure tensor blur
    #[argh(option)]
    blur_radius: Option<f32>,

    /// the standard deviation of the sector kernels
    #[argh(option)]
    kernel_radius: Option<f32>,

    /// the elongation of the sectors along edges, implies --anisotropic
    #[argh(option)]
    kernel_skew: Option<f32>,

    /// how strongly high variance sectors are suppressed
    #[argh(option)]
    sharpness: Option<f32>,

    /// warp the sector kernels by the local structure
    #[argh(switch)]
    anisotropic: bool,

    /// resize factor applied to the input; radii are given at scale 1
    #[argh(option, default = "1.0")]
    scale: f32,

    /// run every stage on the current thread
    #[argh(switch)]
    serial: bool,
}

fn load_params(args: &Args) -> Result<KuwaharaParams, Box<dyn std::error::Error>> {
    let mut params = match &args.config {
        Some(path) => serde_json::from_reader(std::fs::File::open(path)?)?,
        None => KuwaharaParams::default(),
    };

    if let Some(blur_radius) = args.blur_radius {
        params = params.with_blur_radius(blur_radius);
    }
    if let Some(kernel_radius) = args.kernel_radius {
        params = params.with_kernel_radius(kernel_radius);
    }
    if let Some(kernel_skew) = args.kernel_skew {
        params = params.with_kernel_skew(kernel_skew);
    }
    if let Some(sharpness) = args.sharpness {
        params = params.with_sharpness(sharpness);
    }
    if args.anisotropic {
        params = params.with_variant(KuwaharaVariant::Anisotropic);
    }

    Ok(params.scaled(args.scale))
}

fn read_rgb(path: &Path, scale: f32) -> Result<Image<f32, 3>, Box<dyn std::error::Error>> {
    let mut rgb = image::open(path)?.to_rgb8();

    if scale != 1.0 {
        let width = ((rgb.width() as f32 * scale).round() as u32).max(1);
        let height = ((rgb.height() as f32 * scale).round() as u32).max(1);
        rgb = image::imageops::resize(
            &rgb,
            width,
            height,
            image::imageops::FilterType::Triangle,
        );
    }

    let size = ImageSize {
        width: rgb.width() as usize,
        height: rgb.height() as usize,
    };
    let img = Image::<u8, 3>::new(size, rgb.into_raw())?;
    Ok(img.cast_and_scale::<f32>(1.0 / 255.0)?)
}

/// Scale a field to `[0, 1]` by its largest value.
fn normalize_max(src: &Image<f32, 3>) -> Result<Image<f32, 3>, Box<dyn std::error::Error>> {
    let max = src.as_slice().iter().fold(0.0f32, |acc, &v| acc.max(v.abs()));
    let scale = if max > 0.0 { 1.0 / max } else { 0.0 };
    Ok(Image::new(
        src.size(),
        src.as_slice().iter().map(|v| v.abs() * scale).collect(),
    )?)
}

fn write_rgb(path: &Path, src: &Image<f32, 3>) -> Result<(), Box<dyn std::error::Error>> {
    let data = src
        .as_slice()
        .iter()
        .map(|v| (v.clamp(0.0, 1.0) * 255.0).round() as u8)
        .collect::<Vec<_>>();
    let img = image::RgbImage::from_raw(src.width() as u32, src.height() as u32, data)
        .ok_or("image buffer does not match its size")?;
    img.save(path)?;
    log::info!("wrote {}", path.display());
    Ok(())
}

fn write_outputs(dir: &Path, out: &KuwaharaOutput) -> Result<(), Box<dyn std::error::Error>> {
    std::fs::create_dir_all(dir)?;
    write_rgb(
        &dir.join("structure_tensor.png"),
        &normalize_max(&out.structure_tensor)?,
    )?;
    write_rgb(
        &dir.join("blurred_structure_tensor.png"),
        &normalize_max(&out.blurred_structure_tensor)?,
    )?;
    write_rgb(&dir.join("anisotropy.png"), &out.anisotropy)?;
    write_rgb(&dir.join("filtered.png"), &out.filtered)?;
    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let args: Args = argh::from_env();

    if !args.scale.is_finite() || args.scale <= 0.0 {
        return Err(format!("Invalid scale: {}", args.scale).into());
    }

    let params = load_params(&args)?;
    log::debug!("parameters: {:?}", params);

    let src = read_rgb(&args.input, args.scale)?;
    log::info!("filtering {} image", src.size());

    let strategy = if args.serial {
        ExecutionStrategy::Serial
    } else {
        ExecutionStrategy::Auto
    };
    let mut filter = KuwaharaFilter::new(src.size(), params)?.with_strategy(strategy);
    let mut out = KuwaharaOutput::new(src.size())?;

    // create a cancel token to stop the filter between stages
    let cancel_token = Arc::new(AtomicBool::new(false));

    ctrlc::set_handler({
        let cancel_token = cancel_token.clone();
        move || {
            println!("Received Ctrl-C signal. Sending cancel signal !!");
            cancel_token.store(true, Ordering::SeqCst);
        }
    })?;

    filter.apply_with_cancel(&src, &mut out, &cancel_token)?;

    write_outputs(&args.output_dir, &out)?;

    Ok(())
}
